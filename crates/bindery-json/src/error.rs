use bindery::BindError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("invalid number: cannot represent {0} as a JSON number")]
    InvalidNumber(f64),

    #[error(transparent)]
    Bind(#[from] BindError),
}
