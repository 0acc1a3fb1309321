use cu_transform::{TfDuration, TfTime, TransformTree};
use cu_viz_payloads::Pose;
use glam::{DQuat, DVec3};
use log::trace;

/// Where a renderable was last placed in the render frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PoseState {
    pub position: DVec3,
    pub orientation: DQuat,
    /// Cleared whenever the pose cannot be resolved
    pub visible: bool,
}

impl Default for PoseState {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
            visible: false,
        }
    }
}

/// Resolve `pose`, expressed in `src_frame_id` at `src_time`, in the render
/// frame at `dst_time` and store it in `state`.
///
/// A failed resolution only hides the renderable, its last placement is kept.
/// Returns whether the renderable is visible.
#[allow(clippy::too_many_arguments)]
pub fn update_pose(
    state: &mut PoseState,
    pose: &Pose,
    tree: &TransformTree,
    render_frame_id: &str,
    fixed_frame_id: &str,
    src_frame_id: &str,
    dst_time: TfTime,
    src_time: TfTime,
    max_delta: Option<TfDuration>,
) -> bool {
    match tree.apply(
        pose,
        render_frame_id,
        Some(fixed_frame_id),
        src_frame_id,
        dst_time,
        src_time,
        max_delta,
    ) {
        Ok(resolved) => {
            let p = resolved.position;
            let q = resolved.orientation;
            state.position = DVec3::new(p.x, p.y, p.z);
            state.orientation = DQuat::from_xyzw(q.x, q.y, q.z, q.w);
            state.visible = true;
        }
        Err(e) => {
            trace!("Cannot place {src_frame_id} in {render_frame_id}: {e}");
            state.visible = false;
        }
    }
    state.visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cu_transform::Transform;
    use cu_viz_payloads::{Quaternion, Vector3};

    #[test]
    fn test_update_pose_visibility() {
        let mut tree = TransformTree::new();
        tree.add_transform(
            "base_link",
            "map",
            TfDuration(0),
            Transform::new(DVec3::new(1.0, 0.0, 0.0), DQuat::IDENTITY),
        );

        let pose = Pose::new(Vector3::new(0.0, 2.0, 0.0), Quaternion::IDENTITY);
        let mut state = PoseState::default();
        assert!(!state.visible);

        let visible = update_pose(
            &mut state,
            &pose,
            &tree,
            "map",
            "map",
            "base_link",
            TfDuration(5),
            TfDuration(5),
            None,
        );
        assert!(visible);
        assert_relative_eq!(state.position.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(state.position.y, 2.0, epsilon = 1e-9);

        // unknown source frame: hidden, last placement kept
        let visible = update_pose(
            &mut state,
            &pose,
            &tree,
            "map",
            "map",
            "laser",
            TfDuration(5),
            TfDuration(5),
            None,
        );
        assert!(!visible);
        assert!(!state.visible);
        assert_relative_eq!(state.position.x, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_update_pose_max_delta() {
        let mut tree = TransformTree::new();
        tree.add_transform("base_link", "map", TfDuration(100), Transform::identity());

        let mut state = PoseState::default();
        let pose = Pose::default();
        let visible = update_pose(
            &mut state,
            &pose,
            &tree,
            "map",
            "map",
            "base_link",
            TfDuration(1_000),
            TfDuration(1_000),
            Some(TfDuration(10)),
        );
        assert!(!visible);
    }
}
