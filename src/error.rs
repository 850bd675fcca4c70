#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Platform probe failed: {0}")]
    ProbeFailed(String),

    #[error("Feature not available: {0}")]
    NotAvailable(String),
}

impl Error {
    pub(crate) fn probe_failed<S: Into<String>>(msg: S) -> Self {
        Error::ProbeFailed(msg.into())
    }

    pub(crate) fn not_available<S: Into<String>>(msg: S) -> Self {
        Error::NotAvailable(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
