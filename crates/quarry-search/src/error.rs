use std::fmt;

#[derive(Debug)]
pub enum ClientError {
    Transport(String),
    Serialization(String),
    Server { status: u16, message: String },
    UnknownCluster(String),
    ScrollExpired(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "transport error: {msg}"),
            ClientError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            ClientError::Server { status, message } => {
                write!(f, "server error ({status}): {message}")
            }
            ClientError::UnknownCluster(name) => write!(f, "unknown cluster: {name}"),
            ClientError::ScrollExpired(id) => write!(f, "scroll context expired: {id}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ureq::Error> for ClientError {
    fn from(e: ureq::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Serialization(e.to_string())
    }
}
