use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Version arity must be at least 1")]
    InvalidArity,

    #[error("Invalid version pattern: {0}")]
    Pattern(#[from] regex::Error),
}
