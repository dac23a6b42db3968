//! Credential storage and sign-in session state.

pub mod credentials;
pub mod secret;
pub mod session;

pub use credentials::Credentials;
pub use secret::TokenSecret;
pub use session::{AuthorizationSession, SessionState};
