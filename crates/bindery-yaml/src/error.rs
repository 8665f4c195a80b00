use bindery::BindError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum YamlError {
    #[error("invalid YAML: {0}")]
    Syntax(#[from] serde_yaml::Error),

    #[error("unsupported mapping key: {0}")]
    UnsupportedKey(String),

    #[error("unsupported YAML tag `{0}`")]
    UnsupportedTag(String),

    #[error(transparent)]
    Bind(#[from] BindError),
}
