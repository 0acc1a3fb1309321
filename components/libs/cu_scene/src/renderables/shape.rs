use crate::context::SceneContext;
use crate::geometry::{Geometry, Shape};
use crate::materials::{Material, MarkerMaterial, MaterialRole};
use cu_viz_payloads::Marker;
use std::rc::Rc;

/// CUBE, SPHERE or CYLINDER marker: one unit shape scaled by `scale`.
#[derive(Debug)]
pub struct RenderableShape {
    geometry: Rc<Geometry>,
    material: MarkerMaterial,
    /// Edges drawn with the outline material, cubes only
    outline: Option<(Rc<Geometry>, Rc<Material>)>,
}

impl RenderableShape {
    pub fn new(shape: Shape, marker: &Marker, ctx: &mut SceneContext) -> Self {
        let outline = match shape {
            Shape::Cube => Some((
                ctx.geometries.get(Shape::CubeEdges, ctx.detail_level),
                ctx.materials.outline_material(),
            )),
            _ => None,
        };
        Self {
            geometry: ctx.geometries.get(shape, ctx.detail_level),
            material: MarkerMaterial::acquire(MaterialRole::Standard, marker, ctx.materials),
            outline,
        }
    }

    pub fn update(&mut self, prev: &Marker, marker: &Marker, ctx: &mut SceneContext) {
        self.material.update(prev, marker, ctx.materials);
    }

    pub fn dispose(self, marker: &Marker, ctx: &mut SceneContext) {
        self.material.release(marker, ctx.materials);
    }

    pub fn geometry(&self) -> &Rc<Geometry> {
        &self.geometry
    }

    pub fn material(&self) -> &MarkerMaterial {
        &self.material
    }

    pub fn outline(&self) -> Option<&(Rc<Geometry>, Rc<Material>)> {
        self.outline.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SceneResources;
    use crate::geometry::DetailLevel;
    use crate::materials::MaterialKind;
    use cu_viz_payloads::{ColorRGBA, MarkerType};

    #[test]
    fn test_shapes_share_geometry_and_material() {
        let mut resources = SceneResources::default();
        resources.detail_level = DetailLevel::Low;
        let marker = Marker {
            marker_type: MarkerType::Sphere as i32,
            color: ColorRGBA::new(0.0, 0.0, 1.0, 0.5),
            ..Default::default()
        };

        let a = RenderableShape::new(Shape::Sphere, &marker, &mut resources.context());
        let b = RenderableShape::new(Shape::Sphere, &marker, &mut resources.context());
        assert!(Rc::ptr_eq(a.geometry(), b.geometry()));
        assert!(Rc::ptr_eq(a.material().material(), b.material().material()));
        assert_eq!(a.geometry().subdivisions, 10);
        assert!(a.material().material().transparent);
        assert_eq!(a.material().material().kind, MaterialKind::StandardColor);
        assert!(a.outline().is_none());

        let cube = RenderableShape::new(Shape::Cube, &marker, &mut resources.context());
        let (edges, outline) = cube.outline().unwrap();
        assert_eq!(edges.shape, Shape::CubeEdges);
        assert_eq!(outline.kind, MaterialKind::Outline);

        a.dispose(&marker, &mut resources.context());
        b.dispose(&marker, &mut resources.context());
        assert_eq!(resources.materials.len(), 1);
        cube.dispose(&marker, &mut resources.context());
        assert!(resources.materials.is_empty());
    }
}
