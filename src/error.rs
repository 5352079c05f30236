use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to parse document: {message}")]
    Parse { message: String },

    #[error("malformed ContextObject pair without '=': {pair:?}")]
    MalformedContextObject { pair: String },

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
