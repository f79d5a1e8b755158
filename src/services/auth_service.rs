use crate::domain::credentials::{Credentials, PresentedCredentials};
use crate::error::{AppError, Result};

#[derive(Clone, Debug)]
pub struct AuthService {
    credentials: Credentials,
}

impl AuthService {
    #[must_use]
    pub const fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Checks an `Authorization` header value against the configured pair.
    /// Every failure surfaces as the same `AppError::AuthError`; the reason is
    /// only logged.
    ///
    /// # Errors
    /// Returns `AppError::AuthError` if the header is absent, malformed or
    /// carries the wrong credentials.
    pub fn authenticate(&self, header: Option<&str>) -> Result<()> {
        let Some(value) = header else {
            tracing::debug!("Missing Authorization header");
            return Err(AppError::AuthError);
        };

        let presented = PresentedCredentials::from_header(value).map_err(|e| {
            tracing::debug!(reason = %e, "Rejected Authorization header");
            AppError::AuthError
        })?;

        if !self.credentials.verify(&presented) {
            tracing::warn!("Invalid Authorization data");
            return Err(AppError::AuthError);
        }

        Ok(())
    }
}
