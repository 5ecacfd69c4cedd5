use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Please select an image first.")]
    NoImageSelected,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Message reported by the inference service, shown as-is.
    #[error("{0}")]
    JobFailed(String),

    #[error("Analysis job not found: {0}")]
    JobNotFound(String),

    #[error("Analysis not ready after {attempts} status checks")]
    Timeout { attempts: u32 },

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Invalid state transition: {current} -> {requested}")]
    InvalidTransition { current: String, requested: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Clone for Error {
    fn clone(&self) -> Self {
        match self {
            Self::Config(s) => Self::Config(s.clone()),
            Self::PermissionDenied(s) => Self::PermissionDenied(s.clone()),
            Self::NoImageSelected => Self::NoImageSelected,
            Self::Server { status, message } => Self::Server {
                status: *status,
                message: message.clone(),
            },
            Self::Protocol(s) => Self::Protocol(s.clone()),
            Self::JobFailed(s) => Self::JobFailed(s.clone()),
            Self::JobNotFound(s) => Self::JobNotFound(s.clone()),
            Self::Timeout { attempts } => Self::Timeout {
                attempts: *attempts,
            },
            Self::Cancelled => Self::Cancelled,
            Self::InvalidTransition { current, requested } => Self::InvalidTransition {
                current: current.clone(),
                requested: requested.clone(),
            },
            Self::Internal(s) => Self::Internal(s.clone()),
            // For errors that can't be cloned, convert to string representation
            Self::Network(e) => Self::Internal(format!("Network error: {}", e)),
            Self::Serialization(e) => Self::Internal(format!("Serialization error: {}", e)),
            Self::Yaml(e) => Self::Internal(format!("YAML error: {}", e)),
            Self::Io(e) => Self::Internal(format!("IO error: {}", e)),
        }
    }
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub fn server(status: u16, msg: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for failures raised before anything was sent to the service.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::NoImageSelected | Self::PermissionDenied(_))
    }
}
