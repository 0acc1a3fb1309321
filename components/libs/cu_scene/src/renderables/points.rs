use super::{set_point_colors, set_positions};
use crate::buffer::DynamicBuffer;
use crate::context::SceneContext;
use crate::materials::{MarkerMaterial, MaterialRole};
use cu_viz_payloads::Marker;

/// POINTS marker: `scale.x` by `scale.y` sprites, colored per point.
#[derive(Debug)]
pub struct RenderablePoints {
    material: MarkerMaterial,
    positions: DynamicBuffer<f32>,
    colors: DynamicBuffer<f32>,
}

impl RenderablePoints {
    pub fn new(marker: &Marker, ctx: &mut SceneContext) -> Self {
        let mut points = Self {
            material: MarkerMaterial::acquire(MaterialRole::Points, marker, ctx.materials),
            positions: DynamicBuffer::new(3),
            colors: DynamicBuffer::new(4),
        };
        points.set_points(marker);
        points
    }

    pub fn update(&mut self, prev: &Marker, marker: &Marker, ctx: &mut SceneContext) {
        self.material.update(prev, marker, ctx.materials);
        self.set_points(marker);
    }

    pub fn dispose(self, marker: &Marker, ctx: &mut SceneContext) {
        self.material.release(marker, ctx.materials);
    }

    fn set_points(&mut self, marker: &Marker) {
        set_positions(&mut self.positions, &marker.points);
        set_point_colors(&mut self.colors, marker);
    }

    pub fn material(&self) -> &MarkerMaterial {
        &self.material
    }

    pub fn positions(&self) -> &DynamicBuffer<f32> {
        &self.positions
    }

    pub fn colors(&self) -> &DynamicBuffer<f32> {
        &self.colors
    }
}
