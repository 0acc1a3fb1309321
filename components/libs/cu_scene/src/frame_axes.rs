use crate::update_pose::{update_pose, PoseState};
use cu_transform::{TfDuration, TfTime, TransformTree};
use cu_viz_payloads::{Pose, TransformStamped};
use glam::DVec3;
use log::info;
use std::collections::BTreeMap;

pub const DEFAULT_AXIS_LENGTH: f64 = 1.0;

/// Axes triad drawn at the origin of a coordinate frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameAxis {
    frame_id: String,
    axis_length: f64,
    state: PoseState,
}

impl FrameAxis {
    pub fn new(frame_id: impl Into<String>) -> Self {
        Self {
            frame_id: frame_id.into(),
            axis_length: DEFAULT_AXIS_LENGTH,
            state: PoseState::default(),
        }
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    pub fn axis_length(&self) -> f64 {
        self.axis_length
    }

    pub fn pose_state(&self) -> &PoseState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    pub fn world_position(&self) -> DVec3 {
        self.state.position
    }
}

/// One [`FrameAxis`] per frame of the transform tree.
#[derive(Debug, Default)]
pub struct FrameAxes {
    axes: BTreeMap<String, FrameAxis>,
}

impl FrameAxes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `msg` in `tree`, adding axes for the frames it introduces.
    /// Returns true when the tree topology changed.
    pub fn add_transform_message(&mut self, tree: &mut TransformTree, msg: &TransformStamped) -> bool {
        for frame_id in [&msg.header.frame_id, &msg.child_frame_id] {
            if !self.axes.contains_key(frame_id.as_str()) {
                info!("Adding axes for frame {frame_id}");
                self.axes.insert(frame_id.clone(), FrameAxis::new(frame_id.as_str()));
            }
        }
        tree.add_transform_stamped(msg)
    }

    /// Place every frame origin in the render frame, both sides resolved at
    /// `current_time`.
    pub fn start_frame(
        &mut self,
        tree: &TransformTree,
        render_frame_id: &str,
        fixed_frame_id: &str,
        current_time: TfTime,
        max_delta: Option<TfDuration>,
    ) {
        let origin = Pose::default();
        for axis in self.axes.values_mut() {
            update_pose(
                &mut axis.state,
                &origin,
                tree,
                render_frame_id,
                fixed_frame_id,
                &axis.frame_id,
                current_time,
                current_time,
                max_delta,
            );
        }
    }

    pub fn get(&self, frame_id: &str) -> Option<&FrameAxis> {
        self.axes.get(frame_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameAxis> {
        self.axes.values()
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    pub fn dispose(&mut self) {
        self.axes.clear();
    }
}
