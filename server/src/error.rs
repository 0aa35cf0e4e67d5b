use std::{error::Error, fmt, io};

pub type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Debug)]
pub enum ServerError {
    Bind { addr: String, source: io::Error },
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Bind { addr, source } => {
                write!(f, "failed to listen on {}: {}", addr, source)
            }
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ServerError::Bind { source, .. } => Some(source),
        }
    }
}
