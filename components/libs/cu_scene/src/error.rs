use cu_transform::TransformError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("Failed to load model from \"{url}\": {message}")]
    ModelLoad { url: String, message: String },
}

pub type SceneResult<T> = Result<T, SceneError>;
