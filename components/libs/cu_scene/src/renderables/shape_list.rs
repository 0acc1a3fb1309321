use crate::buffer::DynamicInstances;
use crate::context::SceneContext;
use crate::geometry::{Geometry, Shape};
use crate::materials::{MarkerMaterial, MaterialRole};
use cu_viz_payloads::Marker;
use std::rc::Rc;

/// CUBE_LIST or SPHERE_LIST marker: one instance of the shape per point, each
/// `scale` sized and colored by its point color.
#[derive(Debug)]
pub struct RenderableShapeList {
    geometry: Rc<Geometry>,
    material: MarkerMaterial,
    instances: DynamicInstances,
}

impl RenderableShapeList {
    pub fn new(shape: Shape, marker: &Marker, ctx: &mut SceneContext) -> Self {
        let mut list = Self {
            geometry: ctx.geometries.get(shape, ctx.detail_level),
            material: MarkerMaterial::acquire(MaterialRole::StandardInstanced, marker, ctx.materials),
            instances: DynamicInstances::new(marker.points.len()),
        };
        list.set_instances(marker);
        list
    }

    pub fn update(&mut self, prev: &Marker, marker: &Marker, ctx: &mut SceneContext) {
        self.material.update(prev, marker, ctx.materials);
        self.set_instances(marker);
    }

    pub fn dispose(self, marker: &Marker, ctx: &mut SceneContext) {
        self.material.release(marker, ctx.materials);
    }

    fn set_instances(&mut self, marker: &Marker) {
        self.instances
            .set(&marker.points, &marker.scale, &marker.colors, &marker.color);
    }

    pub fn geometry(&self) -> &Rc<Geometry> {
        &self.geometry
    }

    pub fn material(&self) -> &MarkerMaterial {
        &self.material
    }

    pub fn instances(&self) -> &DynamicInstances {
        &self.instances
    }
}
