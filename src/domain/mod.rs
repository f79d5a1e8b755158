pub mod credentials;
pub mod event;
pub mod timestamp;
