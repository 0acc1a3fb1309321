use crate::error::{TransformError, TransformResult};
use crate::history::TransformHistory;
use crate::interpolation::interpolate_transforms;
use crate::time::{TfDuration, TfTime};
use crate::transform::{matrix_to_pose, pose_to_matrix, Transform};
use cu_viz_payloads::Pose;
use glam::DMat4;
use std::fmt::{Display, Formatter};

/// Handle of a frame inside its tree arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameIndex(pub usize);

impl Display for FrameIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named coordinate frame and the history of its transform to its parent.
///
/// Frames are stored in the arena owned by [`crate::TransformTree`]; the
/// parent link is an index into that same arena. Operations that walk the
/// parent chain therefore take the arena as a slice.
#[derive(Clone, Debug)]
pub struct CoordinateFrame {
    id: String,
    index: FrameIndex,
    parent: Option<FrameIndex>,
    history: TransformHistory,
}

impl CoordinateFrame {
    pub fn new(id: impl Into<String>, index: FrameIndex, history_capacity: usize) -> Self {
        Self {
            id: id.into(),
            index,
            parent: None,
            history: TransformHistory::with_capacity(history_capacity),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn index(&self) -> FrameIndex {
        self.index
    }

    pub fn parent(&self) -> Option<FrameIndex> {
        self.parent
    }

    pub fn history(&self) -> &TransformHistory {
        &self.history
    }

    /// Replace the parent link. The history is kept as is: the last declared
    /// parent is used for every later resolution.
    pub fn set_parent(&mut self, parent: FrameIndex) {
        self.parent = Some(parent);
    }

    pub fn add_transform(&mut self, time: TfTime, transform: Transform) {
        self.history.add(time, transform);
    }

    /// Transform of this frame relative to its parent at `time`.
    ///
    /// Between two samples the result is interpolated, outside the history it
    /// holds the nearest sample. With `max_delta`, a request further than that
    /// from its nearest sample fails.
    pub fn transform_at(
        &self,
        time: TfTime,
        max_delta: Option<TfDuration>,
    ) -> TransformResult<Transform> {
        let (before, after) = self
            .history
            .bracketing(time)
            .ok_or_else(|| TransformError::NoTransformHistory(self.id.clone()))?;

        if let Some(max_delta) = max_delta {
            let delta = time.abs_diff(before.stamp).min(time.abs_diff(after.stamp));
            if delta > max_delta {
                return Err(TransformError::TimeOutOfRange {
                    frame: self.id.clone(),
                    delta,
                    max_delta,
                });
            }
        }

        Ok(interpolate_transforms(before, after, time))
    }

    /// Walk parent links up to the frame that has no parent.
    pub fn root(&self, frames: &[CoordinateFrame]) -> TransformResult<FrameIndex> {
        let mut current = self;
        for _ in 0..=frames.len() {
            match current.parent {
                None => return Ok(current.index),
                Some(parent) => current = frame_at(frames, parent)?,
            }
        }
        Err(TransformError::CyclicTransformTree(self.id.clone()))
    }

    /// Resolve `input`, expressed in `src` at `src_time`, into this frame at
    /// `dst_time`, using `root` as the common ancestor of both chains.
    ///
    /// Fails when a frame on either chain has no history, when `root` is not an
    /// ancestor of both frames, or when `max_delta` is exceeded on any link.
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &self,
        frames: &[CoordinateFrame],
        input: &Pose,
        root: FrameIndex,
        src: FrameIndex,
        dst_time: TfTime,
        src_time: TfTime,
        max_delta: Option<TfDuration>,
    ) -> TransformResult<Pose> {
        let dst_to_root = chain_to_root(frames, self.index, root, dst_time, max_delta)?;
        let src_to_root = chain_to_root(frames, src, root, src_time, max_delta)?;

        let output = dst_to_root.inverse() * src_to_root * pose_to_matrix(input);
        Ok(matrix_to_pose(&output))
    }
}

fn frame_at(frames: &[CoordinateFrame], index: FrameIndex) -> TransformResult<&CoordinateFrame> {
    frames
        .get(index.0)
        .ok_or_else(|| TransformError::FrameNotFound(index.to_string()))
}

/// Pose of `start` expressed in `root` coordinates at `time`.
fn chain_to_root(
    frames: &[CoordinateFrame],
    start: FrameIndex,
    root: FrameIndex,
    time: TfTime,
    max_delta: Option<TfDuration>,
) -> TransformResult<DMat4> {
    let start_frame = frame_at(frames, start)?;
    let mut accumulated = DMat4::IDENTITY;
    let mut current = start_frame;

    for _ in 0..=frames.len() {
        if current.index == root {
            return Ok(accumulated);
        }
        let parent = match current.parent {
            Some(parent) => parent,
            // never received a transform at all
            None if current.index == start => {
                return Err(TransformError::NoTransformHistory(current.id.clone()));
            }
            None => {
                return Err(TransformError::NoCommonRoot {
                    frame: start_frame.id.clone(),
                    root: frame_at(frames, root)
                        .map(|f| f.id.clone())
                        .unwrap_or_else(|_| root.to_string()),
                });
            }
        };

        let local = current.transform_at(time, max_delta)?;
        accumulated = *local.matrix() * accumulated;
        current = frame_at(frames, parent)?;
    }

    Err(TransformError::CyclicTransformTree(start_frame.id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::{DQuat, DVec3};

    fn translation(x: f64, y: f64) -> Transform {
        Transform::new(DVec3::new(x, y, 0.0), DQuat::IDENTITY)
    }

    /// map <- odom <- base_link, plus an unparented "orphan"
    fn make_frames() -> Vec<CoordinateFrame> {
        let map = CoordinateFrame::new("map", FrameIndex(0), 16);
        let mut odom = CoordinateFrame::new("odom", FrameIndex(1), 16);
        let mut base = CoordinateFrame::new("base_link", FrameIndex(2), 16);
        let orphan = CoordinateFrame::new("orphan", FrameIndex(3), 16);

        odom.set_parent(map.index());
        odom.add_transform(TfDuration(0), translation(1.0, 0.0));
        base.set_parent(odom.index());
        base.add_transform(TfDuration(0), translation(0.0, 2.0));
        base.add_transform(TfDuration(100), translation(10.0, 2.0));

        vec![map, odom, base, orphan]
    }

    #[test]
    fn test_root() {
        let frames = make_frames();
        assert_eq!(frames[2].root(&frames).unwrap(), FrameIndex(0));
        assert_eq!(frames[0].root(&frames).unwrap(), FrameIndex(0));
        assert_eq!(frames[3].root(&frames).unwrap(), FrameIndex(3));
    }

    #[test]
    fn test_root_detects_cycle() {
        let mut frames = make_frames();
        frames[0].set_parent(FrameIndex(2));
        let err = frames[1].root(&frames).unwrap_err();
        assert!(matches!(err, TransformError::CyclicTransformTree(_)));
    }

    #[test]
    fn test_apply_chain() {
        let frames = make_frames();
        let pose = frames[0]
            .apply(
                &frames,
                &Pose::default(),
                FrameIndex(0),
                FrameIndex(2),
                TfDuration(50),
                TfDuration(50),
                None,
            )
            .unwrap();
        assert_relative_eq!(pose.position.x, 6.0);
        assert_relative_eq!(pose.position.y, 2.0);

        // the inverse direction
        let pose = frames[2]
            .apply(
                &frames,
                &Pose::default(),
                FrameIndex(0),
                FrameIndex(0),
                TfDuration(50),
                TfDuration(50),
                None,
            )
            .unwrap();
        assert_relative_eq!(pose.position.x, -6.0);
        assert_relative_eq!(pose.position.y, -2.0);
    }

    #[test]
    fn test_apply_without_history_fails() {
        let frames = make_frames();
        let err = frames[0]
            .apply(
                &frames,
                &Pose::default(),
                FrameIndex(0),
                FrameIndex(3),
                TfDuration(0),
                TfDuration(0),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, TransformError::NoTransformHistory(_)));
    }

    #[test]
    fn test_apply_root_not_common_ancestor() {
        let frames = make_frames();
        // base_link is not an ancestor of map
        let err = frames[1]
            .apply(
                &frames,
                &Pose::default(),
                FrameIndex(2),
                FrameIndex(1),
                TfDuration(0),
                TfDuration(0),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, TransformError::NoCommonRoot { .. }));
    }

    #[test]
    fn test_max_delta() {
        let frames = make_frames();
        let err = frames[2]
            .transform_at(TfDuration(200), Some(TfDuration(50)))
            .unwrap_err();
        assert!(matches!(err, TransformError::TimeOutOfRange { .. }));

        // between two samples, the nearest one is 10ns away
        let inside = frames[2]
            .transform_at(TfDuration(90), Some(TfDuration(10)))
            .unwrap();
        assert_relative_eq!(inside.position().x, 9.0);
    }
}
