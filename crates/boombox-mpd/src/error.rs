use thiserror::Error;

#[derive(Debug, Error)]
pub enum MpdError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed by server")]
    ConnectionClosed,

    #[error("unexpected greeting: {0:?}")]
    BadGreeting(String),

    #[error("gave up connecting after {attempts} attempts: {last}")]
    ConnectFailed { attempts: u32, last: String },

    /// `ACK` line from the server. Aborts the in-progress operation
    /// but leaves the connection usable.
    #[error("server error {code} in {command:?}: {message}")]
    Server {
        code: u32,
        command: String,
        message: String,
    },

    #[error("malformed response line: {0:?}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, MpdError>;
