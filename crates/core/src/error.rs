/// Failure categories raised by gateway adapters.
///
/// Adapters map transport and status information onto these variants themselves, so callers
/// switch on the variant rather than inspecting message text.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
    #[error("caller is not authorised: {0}")]
    Unauthorized(String),
    #[error("gateway rejected the record: {0}")]
    Invalid(String),
    #[error("gateway fault: {0}")]
    Rejected(String),
    #[error("submission {0} not found")]
    NotFound(u64),
}

/// Stable category of a [`GatewayError`], used for log tagging and user-facing messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Authorization,
    Validation,
    Backend,
    NotFound,
}

impl ErrorKind {
    /// Short tag written into log events.
    pub fn tag(self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Authorization => "authorization",
            ErrorKind::Validation => "validation",
            ErrorKind::Backend => "backend",
            ErrorKind::NotFound => "not_found",
        }
    }

    /// Message suitable for a toast or banner. Every category leaves the user able to retry.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::Network => {
                "The records service is not reachable yet. Please wait a moment and try again."
            }
            ErrorKind::Authorization => "You are not allowed to perform this action.",
            ErrorKind::Validation => "Some details are missing or invalid. Please check the form.",
            ErrorKind::Backend => "The records service reported an error. Please try again.",
            ErrorKind::NotFound => "The requested submission could not be found.",
        }
    }
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Unavailable(_) => ErrorKind::Network,
            GatewayError::Unauthorized(_) => ErrorKind::Authorization,
            GatewayError::Invalid(_) => ErrorKind::Validation,
            GatewayError::Rejected(_) => ErrorKind::Backend,
            GatewayError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Text(#[from] intake_types::TextError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to read seed file: {0}")]
    SeedFileRead(std::io::Error),
    #[error("seed file schema mismatch at {path}: {message}")]
    SeedFileSchema { path: String, message: String },
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl IntakeError {
    /// Category for presentation. Errors raised before any gateway call are validation or
    /// configuration problems and report as [`ErrorKind::Validation`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            IntakeError::Gateway(e) => e.kind(),
            _ => ErrorKind::Validation,
        }
    }
}

pub type IntakeResult<T> = std::result::Result<T, IntakeError>;
