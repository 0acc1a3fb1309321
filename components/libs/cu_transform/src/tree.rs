use crate::error::{TransformError, TransformResult};
use crate::frame::{CoordinateFrame, FrameIndex};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::time::{TfDuration, TfTime};
use crate::transform::Transform;
use cu_viz_payloads::{Pose, TransformStamped};
use glam::{DQuat, DVec3};
use log::{debug, info};
use std::collections::HashMap;

/// Registry of coordinate frames, resolving poses between any two of them at
/// a given time.
///
/// Frames are created on first reference, either as a child or as a parent in
/// a transform, and are never removed.
#[derive(Clone, Debug)]
pub struct TransformTree {
    /// Frame arena, a frame's [`FrameIndex`] is its position in here
    frames: Vec<CoordinateFrame>,
    /// Map from frame id to its index in the arena
    frame_indices: HashMap<String, FrameIndex>,
    /// History bound given to every new frame
    max_capacity: usize,
}

impl TransformTree {
    pub const DEFAULT_HISTORY_CAPACITY: usize = DEFAULT_HISTORY_CAPACITY;

    pub fn new() -> Self {
        Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_history_capacity(max_capacity: usize) -> Self {
        Self {
            frames: Vec::new(),
            frame_indices: HashMap::new(),
            max_capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn has_frame(&self, frame_id: &str) -> bool {
        self.frame_indices.contains_key(frame_id)
    }

    pub fn frame_index(&self, frame_id: &str) -> Option<FrameIndex> {
        self.frame_indices.get(frame_id).copied()
    }

    pub fn frame(&self, frame_id: &str) -> Option<&CoordinateFrame> {
        self.frame_index(frame_id).map(|index| &self.frames[index.0])
    }

    pub fn frames(&self) -> impl Iterator<Item = &CoordinateFrame> {
        self.frames.iter()
    }

    pub fn frame_ids(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().map(|frame| frame.id())
    }

    /// Index of the frame named `frame_id`, creating it unparented if needed.
    pub fn get_or_create_frame(&mut self, frame_id: &str) -> FrameIndex {
        self.get_or_create(frame_id).0
    }

    fn get_or_create(&mut self, frame_id: &str) -> (FrameIndex, bool) {
        if let Some(index) = self.frame_indices.get(frame_id) {
            return (*index, false);
        }

        let index = FrameIndex(self.frames.len());
        self.frames
            .push(CoordinateFrame::new(frame_id, index, self.max_capacity));
        self.frame_indices.insert(frame_id.to_string(), index);
        info!("New frame {frame_id} added to the transform tree");
        (index, true)
    }

    /// Record the transform of `frame_id` relative to `parent_id` at `time`.
    ///
    /// Both frames are created if unknown and `frame_id` is reparented when its
    /// current parent differs. Returns true when the tree topology changed
    /// (a frame was created or reparented).
    pub fn add_transform(
        &mut self,
        frame_id: &str,
        parent_id: &str,
        time: TfTime,
        transform: Transform,
    ) -> bool {
        let (child, child_created) = self.get_or_create(frame_id);
        let (parent, parent_created) = self.get_or_create(parent_id);

        let previous_parent = self.frames[child.0].parent();
        let reparented = previous_parent != Some(parent);
        if reparented {
            if let Some(previous) = previous_parent {
                debug!(
                    "Frame {frame_id} reparented from {} to {parent_id}",
                    self.frames[previous.0].id()
                );
            }
            self.frames[child.0].set_parent(parent);
        }

        self.frames[child.0].add_transform(time, transform);
        child_created || parent_created || reparented
    }

    /// Record a `geometry_msgs/TransformStamped` style message.
    pub fn add_transform_stamped(&mut self, msg: &TransformStamped) -> bool {
        let t = msg.transform.translation;
        let r = msg.transform.rotation;
        let transform = Transform::new(
            DVec3::new(t.x, t.y, t.z),
            DQuat::from_xyzw(r.x, r.y, r.z, r.w),
        );
        self.add_transform(
            &msg.child_frame_id,
            &msg.header.frame_id,
            msg.header.stamp.into(),
            transform,
        )
    }

    /// Resolve `input`, expressed in `src_frame_id` at `src_time`, into
    /// `frame_id` at `dst_time`.
    ///
    /// `root_frame_id` is the common ancestor used to chain both frames; when it
    /// is absent or unknown, the root of `frame_id` is used instead.
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &self,
        input: &Pose,
        frame_id: &str,
        root_frame_id: Option<&str>,
        src_frame_id: &str,
        dst_time: TfTime,
        src_time: TfTime,
        max_delta: Option<TfDuration>,
    ) -> TransformResult<Pose> {
        let frame = self
            .frame(frame_id)
            .ok_or_else(|| TransformError::FrameNotFound(frame_id.to_string()))?;
        let src = self
            .frame_index(src_frame_id)
            .ok_or_else(|| TransformError::FrameNotFound(src_frame_id.to_string()))?;

        let root = match root_frame_id.and_then(|id| self.frame_index(id)) {
            Some(root) => root,
            None => frame.root(&self.frames)?,
        };

        frame.apply(
            &self.frames,
            input,
            root,
            src,
            dst_time,
            src_time,
            max_delta,
        )
    }
}

impl Default for TransformTree {
    fn default() -> Self {
        Self::new()
    }
}
