use super::to_dvec3;
use crate::context::SceneContext;
use crate::geometry::{Geometry, Shape};
use crate::materials::{MarkerMaterial, MaterialRole};
use crate::math::rotation_to;
use cu_viz_payloads::{Marker, Pose, Quaternion, Vector3};
use glam::DVec3;
use std::rc::Rc;

// Proportions of a unit arrow along +X
pub const SHAFT_LENGTH: f64 = 0.77;
pub const SHAFT_DIAMETER: f64 = 1.0;
pub const HEAD_LENGTH: f64 = 0.23;
pub const HEAD_DIAMETER: f64 = 2.0;

/// Head share of the length of an arrow given by two points.
pub const HEAD_LENGTH_PROPORTION: f64 = 0.23;

/// Shaft or head of an arrow, placed in the arrow's own frame.
#[derive(Clone, Debug)]
pub struct ArrowPart {
    pub geometry: Rc<Geometry>,
    pub position: DVec3,
    pub scale: DVec3,
}

/// ARROW marker.
///
/// With exactly two points the arrow goes from the first point to the second:
/// `scale.x` is the shaft diameter, `scale.y` the head diameter and a non zero
/// `scale.z` the head length. Otherwise the arrow points along +X of the marker
/// pose, sized by `scale`.
#[derive(Debug)]
pub struct RenderableArrow {
    material: MarkerMaterial,
    shaft: ArrowPart,
    head: ArrowPart,
    pose_override: Option<Pose>,
}

impl RenderableArrow {
    pub fn new(marker: &Marker, ctx: &mut SceneContext) -> Self {
        let mut arrow = Self {
            material: MarkerMaterial::acquire(MaterialRole::Standard, marker, ctx.materials),
            shaft: ArrowPart {
                geometry: ctx.geometries.get(Shape::ArrowShaft, ctx.detail_level),
                position: DVec3::ZERO,
                scale: DVec3::ONE,
            },
            head: ArrowPart {
                geometry: ctx.geometries.get(Shape::ArrowHead, ctx.detail_level),
                position: DVec3::ZERO,
                scale: DVec3::ONE,
            },
            pose_override: None,
        };
        arrow.layout(marker);
        arrow
    }

    pub fn update(&mut self, prev: &Marker, marker: &Marker, ctx: &mut SceneContext) {
        self.material.update(prev, marker, ctx.materials);
        self.layout(marker);
    }

    pub fn dispose(self, marker: &Marker, ctx: &mut SceneContext) {
        self.material.release(marker, ctx.materials);
    }

    fn layout(&mut self, marker: &Marker) {
        let scale = marker.scale;
        if let [start, end] = marker.points.as_slice() {
            let start = to_dvec3(start);
            let direction = to_dvec3(end) - start;
            let distance = direction.length();

            let head_length = if scale.z != 0.0 {
                scale.z.max(0.0).min(distance)
            } else {
                HEAD_LENGTH_PROPORTION * distance
            };
            let shaft_length = distance - head_length;

            self.shaft.scale = DVec3::new(shaft_length, scale.x, scale.x);
            self.shaft.position = DVec3::new(shaft_length / 2.0, 0.0, 0.0);
            self.head.scale = DVec3::new(head_length, scale.y, scale.y);
            self.head.position = DVec3::new(shaft_length + head_length / 2.0, 0.0, 0.0);

            let orientation = rotation_to(DVec3::X, direction);
            self.pose_override = Some(Pose::new(
                Vector3::new(start.x, start.y, start.z),
                Quaternion::new(orientation.x, orientation.y, orientation.z, orientation.w),
            ));
        } else {
            self.shaft.scale = DVec3::new(SHAFT_LENGTH, SHAFT_DIAMETER, SHAFT_DIAMETER);
            self.shaft.position = DVec3::new(SHAFT_LENGTH / 2.0, 0.0, 0.0);
            self.head.scale = DVec3::new(HEAD_LENGTH, HEAD_DIAMETER, HEAD_DIAMETER);
            self.head.position = DVec3::new(SHAFT_LENGTH + HEAD_LENGTH / 2.0, 0.0, 0.0);
            self.pose_override = None;
        }
    }

    /// Pose replacing the marker pose, set for arrows given by two points.
    pub fn pose_override(&self) -> Option<Pose> {
        self.pose_override
    }

    pub fn material(&self) -> &MarkerMaterial {
        &self.material
    }

    pub fn shaft(&self) -> &ArrowPart {
        &self.shaft
    }

    pub fn head(&self) -> &ArrowPart {
        &self.head
    }
}
