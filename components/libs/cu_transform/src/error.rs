use crate::time::TfDuration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Matrix has a non-unit scale [{}, {}, {}]", .scale[0], .scale[1], .scale[2])]
    NonUnitScale { scale: [f64; 3] },

    #[error("Matrix is not a rigid transform (determinant {determinant}, bottom row {row:?})")]
    NotRigid { determinant: f64, row: [f64; 4] },

    #[error("Frame '{0}' does not exist")]
    FrameNotFound(String),

    #[error("Frame '{0}' has no transform history")]
    NoTransformHistory(String),

    #[error("Frame '{frame}' does not descend from root frame '{root}'")]
    NoCommonRoot { frame: String, root: String },

    #[error("Closest transform of frame '{frame}' is {delta} away, more than the allowed {max_delta}")]
    TimeOutOfRange {
        frame: String,
        delta: TfDuration,
        max_delta: TfDuration,
    },

    #[error("Cycle detected in transform tree while walking up from frame '{0}'")]
    CyclicTransformTree(String),
}

pub type TransformResult<T> = Result<T, TransformError>;
