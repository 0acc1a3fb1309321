//! Time aware coordinate frame tree.
//!
//! Frames are registered in a [`TransformTree`] as transforms arrive, each one
//! keeping a bounded, time ordered history of its transform to its parent. The
//! tree resolves a pose expressed in any frame into any other frame sharing the
//! same root, interpolating the histories at the requested times.

pub mod error;
pub mod frame;
pub mod history;
pub mod interpolation;
pub mod time;
pub mod transform;
pub mod tree;

pub use error::{TransformError, TransformResult};
pub use frame::{CoordinateFrame, FrameIndex};
pub use history::{StampedTransform, TransformHistory, DEFAULT_HISTORY_CAPACITY};
pub use interpolation::interpolate_transforms;
pub use time::{TfDuration, TfTime, TfTimeRange};
pub use transform::{matrix_to_pose, pose_to_matrix, Transform};
pub use tree::TransformTree;
