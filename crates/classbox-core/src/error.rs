pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid node: {message}")]
    InvalidNode { message: String },

    #[error("node JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
