use super::{set_point_colors, set_positions};
use crate::buffer::DynamicBuffer;
use crate::context::SceneContext;
use crate::materials::{MarkerMaterial, MaterialRole};
use cu_viz_payloads::Marker;

/// TRIANGLE_LIST marker: points taken three by three, colored per vertex.
#[derive(Debug)]
pub struct RenderableTriangleList {
    material: MarkerMaterial,
    positions: DynamicBuffer<f32>,
    colors: DynamicBuffer<f32>,
}

impl RenderableTriangleList {
    pub fn new(marker: &Marker, ctx: &mut SceneContext) -> Self {
        let mut triangles = Self {
            material: MarkerMaterial::acquire(MaterialRole::StandardVertex, marker, ctx.materials),
            positions: DynamicBuffer::new(3),
            colors: DynamicBuffer::new(4),
        };
        triangles.set_vertices(marker);
        triangles
    }

    pub fn update(&mut self, prev: &Marker, marker: &Marker, ctx: &mut SceneContext) {
        self.material.update(prev, marker, ctx.materials);
        self.set_vertices(marker);
    }

    pub fn dispose(self, marker: &Marker, ctx: &mut SceneContext) {
        self.material.release(marker, ctx.materials);
    }

    fn set_vertices(&mut self, marker: &Marker) {
        set_positions(&mut self.positions, &marker.points);
        set_point_colors(&mut self.colors, marker);
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.count() / 3
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
