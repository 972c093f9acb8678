#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The pool could not hand out a connection (network, auth, refused, timed out).
    #[error("Unable to acquire a database connection: {0}")]
    Connection(#[source] sqlx::Error),

    /// The tile query failed while executing, fetching or decoding rows.
    #[error("Tile query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Invalid YAML in client config.")]
    Config(#[from] serde_yaml::Error),

    #[error("Unable to read client config: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The underlying database error, if this is a connection or query failure.
    pub fn database_error(&self) -> Option<&sqlx::Error> {
        match self {
            Error::Connection(e) | Error::Query(e) => Some(e),
            _ => None,
        }
    }
}
