use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("Failed to send email: {0}")]
    Transport(String),

    #[error("Webhook call failed: {0}")]
    Webhook(String),

    #[error("Webhook call timed out")]
    Timeout,
}
