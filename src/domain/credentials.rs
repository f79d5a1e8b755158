use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use subtle::ConstantTimeEq;
use thiserror::Error;

pub const BASIC_PREFIX: &str = "Basic ";

/// Challenge sent back with every 401.
pub const BASIC_CHALLENGE: &str = r#"Basic realm="restricted", charset="UTF-8""#;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("invalid Authorization header prefix")]
    InvalidPrefix,
    #[error("invalid Authorization header base64")]
    InvalidBase64,
    #[error("invalid Authorization header parts")]
    MissingSeparator,
}

/// The configured user/password pair callers must present.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    password: String,
}

impl Credentials {
    #[must_use]
    pub const fn new(user: String, password: String) -> Self {
        Self { user, password }
    }

    /// Compares a presented pair in constant time. Both fields are always
    /// compared so the timing does not reveal which one differs.
    #[must_use]
    pub fn verify(&self, presented: &PresentedCredentials) -> bool {
        let user_ok = self.user.as_bytes().ct_eq(&presented.user);
        let password_ok = self.password.as_bytes().ct_eq(&presented.password);
        (user_ok & password_ok).into()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("user", &self.user).field("password", &"<redacted>").finish()
    }
}

/// A structurally valid pair decoded from an `Authorization: Basic` header.
/// Kept as raw bytes: the decoded payload is not required to be UTF-8.
pub struct PresentedCredentials {
    user: Vec<u8>,
    password: Vec<u8>,
}

impl PresentedCredentials {
    /// Decodes an `Authorization` header value.
    ///
    /// # Errors
    /// Returns a `CredentialsError` describing the first structural problem.
    pub fn from_header(value: &str) -> Result<Self, CredentialsError> {
        let encoded = value.strip_prefix(BASIC_PREFIX).ok_or(CredentialsError::InvalidPrefix)?;
        let decoded = STANDARD.decode(encoded).map_err(|_| CredentialsError::InvalidBase64)?;

        let separator = decoded.iter().position(|&b| b == b':').ok_or(CredentialsError::MissingSeparator)?;
        let (user, rest) = decoded.split_at(separator);

        Ok(Self { user: user.to_vec(), password: rest[1..].to_vec() })
    }
}

impl std::fmt::Debug for PresentedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentedCredentials")
            .field("user", &String::from_utf8_lossy(&self.user))
            .field("password", &"<redacted>")
            .finish()
    }
}
