use crate::error::{TransformError, TransformResult};
use cu_viz_payloads::{Pose, Quaternion, Vector3};
use glam::{DMat4, DQuat, DVec3};

/// Tolerance used when checking that a matrix carries no scaling.
const SCALE_EPSILON: f64 = 1e-5;

/// Transform represents a position and rotation in 3D space.
///
/// It can be set and read either as a position/rotation pair or as a 4x4
/// matrix; every setter keeps the three representations in sync and the
/// rotation is always stored normalized.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    position: DVec3,
    rotation: DQuat,
    matrix: DMat4,
}

impl Transform {
    pub fn new(position: DVec3, rotation: DQuat) -> Self {
        let rotation = normalize_rotation(rotation);
        Self {
            position,
            rotation,
            matrix: DMat4::from_rotation_translation(rotation, position),
        }
    }

    pub fn identity() -> Self {
        Self::new(DVec3::ZERO, DQuat::IDENTITY)
    }

    pub fn from_pose(pose: &Pose) -> Self {
        let (position, rotation) = pose_parts(pose);
        Self::new(position, rotation)
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn rotation(&self) -> DQuat {
        self.rotation
    }

    pub fn matrix(&self) -> &DMat4 {
        &self.matrix
    }

    pub fn set_position(&mut self, position: DVec3) -> &mut Self {
        self.position = position;
        self.rebuild_matrix();
        self
    }

    pub fn set_rotation(&mut self, rotation: DQuat) -> &mut Self {
        self.rotation = normalize_rotation(rotation);
        self.rebuild_matrix();
        self
    }

    /// Update position and rotation with a single matrix rebuild.
    pub fn set_position_rotation(&mut self, position: DVec3, rotation: DQuat) -> &mut Self {
        self.position = position;
        self.rotation = normalize_rotation(rotation);
        self.rebuild_matrix();
        self
    }

    pub fn set_pose(&mut self, pose: &Pose) -> &mut Self {
        let (position, rotation) = pose_parts(pose);
        self.set_position_rotation(position, rotation)
    }

    /// Update position and rotation from a rigid matrix.
    ///
    /// Matrices carrying a scale other than 1 on any axis, a reflection or a
    /// projective bottom row are rejected and the transform is left untouched.
    pub fn set_matrix(&mut self, matrix: DMat4) -> TransformResult<&mut Self> {
        let scale = [
            matrix.x_axis.truncate().length(),
            matrix.y_axis.truncate().length(),
            matrix.z_axis.truncate().length(),
        ];
        if scale.iter().any(|s| (s - 1.0).abs() > SCALE_EPSILON) {
            return Err(TransformError::NonUnitScale { scale });
        }

        let row = matrix.row(3).to_array();
        let determinant = matrix.determinant();
        let affine = row
            .iter()
            .zip([0.0, 0.0, 0.0, 1.0])
            .all(|(value, expected)| (value - expected).abs() <= SCALE_EPSILON);
        if !affine || determinant < 0.0 {
            return Err(TransformError::NotRigid { determinant, row });
        }

        self.matrix = matrix;
        self.position = matrix.w_axis.truncate();
        self.rotation = normalize_rotation(DQuat::from_mat4(&matrix));
        Ok(self)
    }

    /// Copy the values of another transform into this one.
    pub fn copy_from(&mut self, other: &Transform) -> &mut Self {
        *self = *other;
        self
    }

    pub fn to_pose(&self) -> Pose {
        Pose {
            position: Vector3::new(self.position.x, self.position.y, self.position.z),
            orientation: Quaternion::new(
                self.rotation.x,
                self.rotation.y,
                self.rotation.z,
                self.rotation.w,
            ),
        }
    }

    /// Interpolate between two rigid body transforms: linear on the position,
    /// spherical linear on the rotation.
    ///
    /// `t` is not clamped, values outside [0, 1] extrapolate.
    pub fn interpolate(a: &Transform, b: &Transform, t: f64) -> Transform {
        Transform::new(
            a.position.lerp(b.position, t),
            a.rotation.slerp(b.rotation, t),
        )
    }

    fn rebuild_matrix(&mut self) {
        self.matrix = DMat4::from_rotation_translation(self.rotation, self.position);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// A degenerate (zero length) quaternion carries no orientation, it is read as identity.
fn normalize_rotation(rotation: DQuat) -> DQuat {
    if rotation.length_squared() <= f64::EPSILON || !rotation.is_finite() {
        DQuat::IDENTITY
    } else {
        rotation.normalize()
    }
}

fn pose_parts(pose: &Pose) -> (DVec3, DQuat) {
    let p = pose.position;
    let q = pose.orientation;
    (
        DVec3::new(p.x, p.y, p.z),
        DQuat::from_xyzw(q.x, q.y, q.z, q.w),
    )
}

/// Rigid matrix of a pose.
pub fn pose_to_matrix(pose: &Pose) -> DMat4 {
    *Transform::from_pose(pose).matrix()
}

/// Decompose a rigid matrix into a pose. The matrix scale is not checked.
pub fn matrix_to_pose(matrix: &DMat4) -> Pose {
    let position = matrix.w_axis.truncate();
    let rotation = normalize_rotation(DQuat::from_mat4(matrix));
    Transform::new(position, rotation).to_pose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec4;
    use std::f64::consts::FRAC_PI_2;

    fn assert_same_rotation(a: DQuat, b: DQuat) {
        // q and -q encode the same rotation
        assert_relative_eq!(a.dot(b).abs(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_new_normalizes_rotation() {
        let t = Transform::new(DVec3::new(1.0, 2.0, 3.0), DQuat::from_xyzw(0.0, 0.0, 2.0, 2.0));
        assert_relative_eq!(t.rotation().length(), 1.0, epsilon = 1e-12);
        let expected = DMat4::from_rotation_translation(t.rotation(), t.position());
        assert!(t.matrix().abs_diff_eq(expected, 1e-12));
    }

    #[test]
    fn test_degenerate_rotation_is_identity() {
        let t = Transform::new(DVec3::ZERO, DQuat::from_xyzw(0.0, 0.0, 0.0, 0.0));
        assert_eq!(t.rotation(), DQuat::IDENTITY);
    }

    #[test]
    fn test_setters_keep_matrix_in_sync() {
        let mut t = Transform::identity();
        t.set_position(DVec3::new(4.0, 0.0, -1.0));
        assert_relative_eq!(t.matrix().w_axis.x, 4.0);
        assert_relative_eq!(t.matrix().w_axis.z, -1.0);

        t.set_rotation(DQuat::from_rotation_z(FRAC_PI_2));
        let x = t.matrix().transform_vector3(DVec3::X);
        assert_relative_eq!(x.y, 1.0, epsilon = 1e-12);

        t.set_position_rotation(DVec3::ZERO, DQuat::IDENTITY);
        assert!(t.matrix().abs_diff_eq(DMat4::IDENTITY, 1e-12));
    }

    #[test]
    fn test_matrix_round_trip() {
        let rotations = [
            DQuat::IDENTITY,
            DQuat::from_rotation_x(0.3),
            DQuat::from_rotation_y(-2.1),
            DQuat::from_euler(glam::EulerRot::ZYX, 1.0, 0.5, -0.25),
            DQuat::from_rotation_z(std::f64::consts::PI),
        ];
        for rotation in rotations {
            let position = DVec3::new(-3.0, 0.5, 12.0);
            let source = Transform::new(position, rotation);
            let mut decoded = Transform::identity();
            decoded.set_matrix(*source.matrix()).unwrap();
            assert!(decoded.position().abs_diff_eq(position, 1e-9));
            assert_same_rotation(decoded.rotation(), source.rotation());
        }
    }

    #[test]
    fn test_set_matrix_rejects_scale() {
        let mut t = Transform::new(DVec3::new(1.0, 1.0, 1.0), DQuat::from_rotation_y(0.4));
        let before = t;
        let scaled = DMat4::from_scale_rotation_translation(
            DVec3::new(1.0, 2.0, 1.0),
            DQuat::IDENTITY,
            DVec3::ZERO,
        );
        let err = t.set_matrix(scaled).unwrap_err();
        assert!(matches!(err, TransformError::NonUnitScale { .. }));
        assert_eq!(t, before);
    }

    #[test]
    fn test_set_matrix_rejects_reflection_and_projection() {
        let mut t = Transform::new(DVec3::new(0.0, 2.0, 0.0), DQuat::from_rotation_x(0.7));
        let before = t;

        let mirrored = DMat4::from_cols(
            DVec4::new(-1.0, 0.0, 0.0, 0.0),
            DVec4::Y,
            DVec4::Z,
            DVec4::new(1.0, 2.0, 3.0, 1.0),
        );
        let err = t.set_matrix(mirrored).unwrap_err();
        assert!(matches!(err, TransformError::NotRigid { determinant, .. } if determinant < 0.0));
        assert_eq!(t, before);

        let mut projective = DMat4::IDENTITY;
        projective.x_axis.w = 0.5;
        let err = t.set_matrix(projective).unwrap_err();
        assert!(matches!(
            err,
            TransformError::NotRigid { row, .. } if row == [0.5, 0.0, 0.0, 1.0]
        ));
        assert_eq!(t, before);
    }

    #[test]
    fn test_interpolate_endpoints() {
        let a = Transform::new(DVec3::new(0.0, 0.0, 0.0), DQuat::IDENTITY);
        let b = Transform::new(DVec3::new(10.0, -2.0, 4.0), DQuat::from_rotation_z(FRAC_PI_2));

        let start = Transform::interpolate(&a, &b, 0.0);
        assert!(start.position().abs_diff_eq(a.position(), 1e-12));
        assert_same_rotation(start.rotation(), a.rotation());

        let end = Transform::interpolate(&a, &b, 1.0);
        assert!(end.position().abs_diff_eq(b.position(), 1e-12));
        assert_same_rotation(end.rotation(), b.rotation());

        let mid = Transform::interpolate(&a, &b, 0.5);
        assert!(mid.position().abs_diff_eq(DVec3::new(5.0, -1.0, 2.0), 1e-12));
        assert_same_rotation(mid.rotation(), DQuat::from_rotation_z(FRAC_PI_2 / 2.0));
    }

    #[test]
    fn test_pose_conversions() {
        let pose = Pose::new(Vector3::new(1.0, 2.0, 3.0), Quaternion::new(0.0, 0.0, 0.0, 2.0));
        let t = Transform::from_pose(&pose);
        let back = t.to_pose();
        assert_relative_eq!(back.position.y, 2.0);
        assert_relative_eq!(back.orientation.w, 1.0);

        let m = pose_to_matrix(&pose);
        let decoded = matrix_to_pose(&m);
        assert_relative_eq!(decoded.position.z, 3.0);
        assert_relative_eq!(decoded.orientation.w.abs(), 1.0, epsilon = 1e-12);
    }
}
