//! Marker renderables.
//!
//! A [`RenderableMarker`] is the live scene object of one marker key. It keeps
//! the last marker received for that key, the pose it must be placed at and
//! where it was placed on the last tick. The [`MarkerShape`] carries what a
//! render backend needs to draw it: shared geometry, cached materials and per
//! point buffers.

mod arrow;
mod lines;
mod mesh_resource;
mod points;
mod shape;
mod shape_list;
mod text;
mod triangle_list;

pub use arrow::{
    ArrowPart, RenderableArrow, HEAD_DIAMETER, HEAD_LENGTH, HEAD_LENGTH_PROPORTION,
    SHAFT_DIAMETER, SHAFT_LENGTH,
};
pub use lines::{LineMode, RenderableLines};
pub use mesh_resource::RenderableMeshResource;
pub use points::RenderablePoints;
pub use shape::RenderableShape;
pub use shape_list::RenderableShapeList;
pub use text::RenderableText;
pub use triangle_list::RenderableTriangleList;

use crate::buffer::DynamicBuffer;
use crate::color::marker_colors_to_linear;
use crate::context::SceneContext;
use crate::geometry::Shape;
use crate::model_cache::ModelDelivery;
use crate::update_pose::{update_pose, PoseState};
use cu_transform::{TfDuration, TfTime, TransformTree};
use cu_viz_payloads::{Marker, MarkerKey, MarkerType, Pose, Vector3};
use glam::{DMat4, DVec3};

pub(crate) fn to_dvec3(v: &Vector3) -> DVec3 {
    DVec3::new(v.x, v.y, v.z)
}

/// xyz per point.
pub(crate) fn set_positions(buffer: &mut DynamicBuffer<f32>, points: &[Vector3]) {
    buffer.resize(points.len());
    let data = buffer.data_mut();
    for (i, p) in points.iter().enumerate() {
        data[i * 3..i * 3 + 3].copy_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
    }
}

/// Linear rgba per point.
pub(crate) fn set_point_colors(buffer: &mut DynamicBuffer<f32>, marker: &Marker) {
    buffer.resize(marker.points.len());
    let data = buffer.data_mut();
    for (i, color) in marker_colors_to_linear(marker).enumerate() {
        data[i * 4..i * 4 + 4].copy_from_slice(&color);
    }
}

/// Drawable content of a renderable, one variant per marker type.
#[derive(Debug)]
pub enum MarkerShape {
    Arrow(RenderableArrow),
    Cube(RenderableShape),
    Sphere(RenderableShape),
    Cylinder(RenderableShape),
    LineStrip(RenderableLines),
    LineList(RenderableLines),
    CubeList(RenderableShapeList),
    SphereList(RenderableShapeList),
    Points(RenderablePoints),
    Text(RenderableText),
    MeshResource(RenderableMeshResource),
    TriangleList(RenderableTriangleList),
}

#[derive(Debug)]
pub struct RenderableMarker {
    name: String,
    key: MarkerKey,
    kind: MarkerType,
    marker: Marker,
    src_time: TfTime,
    /// Pose resolved every tick, the marker pose unless the shape overrides it
    pose: Pose,
    scale: DVec3,
    state: PoseState,
    shape: MarkerShape,
}

impl RenderableMarker {
    /// Build the renderable of `marker`, which must be valid for `kind`.
    pub fn new(key: MarkerKey, kind: MarkerType, marker: Marker, ctx: &mut SceneContext) -> Self {
        let name = key.to_string();
        let shape = match kind {
            MarkerType::Arrow => MarkerShape::Arrow(RenderableArrow::new(&marker, ctx)),
            MarkerType::Cube => MarkerShape::Cube(RenderableShape::new(Shape::Cube, &marker, ctx)),
            MarkerType::Sphere => {
                MarkerShape::Sphere(RenderableShape::new(Shape::Sphere, &marker, ctx))
            }
            MarkerType::Cylinder => {
                MarkerShape::Cylinder(RenderableShape::new(Shape::Cylinder, &marker, ctx))
            }
            MarkerType::LineStrip => {
                MarkerShape::LineStrip(RenderableLines::new(LineMode::Strip, &marker, ctx))
            }
            MarkerType::LineList => {
                MarkerShape::LineList(RenderableLines::new(LineMode::List, &marker, ctx))
            }
            MarkerType::CubeList => {
                MarkerShape::CubeList(RenderableShapeList::new(Shape::Cube, &marker, ctx))
            }
            MarkerType::SphereList => {
                MarkerShape::SphereList(RenderableShapeList::new(Shape::Sphere, &marker, ctx))
            }
            MarkerType::Points => MarkerShape::Points(RenderablePoints::new(&marker, ctx)),
            MarkerType::TextViewFacing => {
                MarkerShape::Text(RenderableText::new(name.clone(), &marker, ctx))
            }
            MarkerType::MeshResource => {
                MarkerShape::MeshResource(RenderableMeshResource::new(&key, &marker, ctx))
            }
            MarkerType::TriangleList => {
                MarkerShape::TriangleList(RenderableTriangleList::new(&marker, ctx))
            }
        };
        ctx.renderables.insert(name.clone(), key.clone());

        let mut renderable = Self {
            name,
            key,
            kind,
            src_time: marker.header.stamp.into(),
            pose: marker.pose,
            scale: DVec3::ONE,
            state: PoseState::default(),
            shape,
            marker,
        };
        renderable.refresh_placement();
        renderable
    }

    /// Take in a newer marker of the same key and type.
    pub fn update(&mut self, marker: Marker, ctx: &mut SceneContext) {
        let prev = std::mem::replace(&mut self.marker, marker);
        self.src_time = self.marker.header.stamp.into();

        let marker = &self.marker;
        match &mut self.shape {
            MarkerShape::Arrow(arrow) => arrow.update(&prev, marker, ctx),
            MarkerShape::Cube(shape) | MarkerShape::Sphere(shape) | MarkerShape::Cylinder(shape) => {
                shape.update(&prev, marker, ctx)
            }
            MarkerShape::LineStrip(lines) | MarkerShape::LineList(lines) => {
                lines.update(&prev, marker, ctx)
            }
            MarkerShape::CubeList(list) | MarkerShape::SphereList(list) => {
                list.update(&prev, marker, ctx)
            }
            MarkerShape::Points(points) => points.update(&prev, marker, ctx),
            MarkerShape::Text(text) => text.update(&prev, marker, ctx),
            MarkerShape::MeshResource(mesh) => mesh.update(&self.key, &prev, marker, ctx),
            MarkerShape::TriangleList(triangles) => triangles.update(&prev, marker, ctx),
        }
        self.refresh_placement();
    }

    /// Give back every shared resource held by this renderable.
    pub fn dispose(self, ctx: &mut SceneContext) {
        let marker = &self.marker;
        match self.shape {
            MarkerShape::Arrow(arrow) => arrow.dispose(marker, ctx),
            MarkerShape::Cube(shape) | MarkerShape::Sphere(shape) | MarkerShape::Cylinder(shape) => {
                shape.dispose(marker, ctx)
            }
            MarkerShape::LineStrip(lines) | MarkerShape::LineList(lines) => {
                lines.dispose(marker, ctx)
            }
            MarkerShape::CubeList(list) | MarkerShape::SphereList(list) => {
                list.dispose(marker, ctx)
            }
            MarkerShape::Points(points) => points.dispose(marker, ctx),
            MarkerShape::Text(text) => text.dispose(ctx),
            MarkerShape::MeshResource(mesh) => mesh.dispose(marker, ctx),
            MarkerShape::TriangleList(triangles) => triangles.dispose(marker, ctx),
        }
        // ids are lossy, another key may have taken this entry over
        if ctx.renderables.get(&self.name) == Some(&self.key) {
            ctx.renderables.remove(&self.name);
        }
    }

    /// Place the renderable in the render frame at `current_time`.
    ///
    /// Frame locked markers are resolved with the source frame at
    /// `current_time` too, others at their own stamp.
    pub fn update_pose(
        &mut self,
        tree: &TransformTree,
        render_frame_id: &str,
        fixed_frame_id: &str,
        current_time: TfTime,
        max_delta: Option<TfDuration>,
    ) -> bool {
        let src_time = if self.marker.frame_locked {
            current_time
        } else {
            self.src_time
        };
        update_pose(
            &mut self.state,
            &self.pose,
            tree,
            render_frame_id,
            fixed_frame_id,
            &self.marker.header.frame_id,
            current_time,
            src_time,
            max_delta,
        )
    }

    /// Hand a completed model load to a mesh renderable. Anything else
    /// ignores it.
    pub fn apply_model_delivery(&mut self, delivery: &ModelDelivery, ctx: &mut SceneContext) -> bool {
        match &mut self.shape {
            MarkerShape::MeshResource(mesh) => mesh.apply_delivery(&self.key.topic, delivery, ctx),
            _ => false,
        }
    }

    fn refresh_placement(&mut self) {
        let marker_scale = to_dvec3(&self.marker.scale);
        self.pose = self.marker.pose;
        self.scale = DVec3::ONE;
        match &self.shape {
            MarkerShape::Arrow(arrow) => match arrow.pose_override() {
                Some(pose) => self.pose = pose,
                None => self.scale = marker_scale,
            },
            MarkerShape::Cube(_)
            | MarkerShape::Sphere(_)
            | MarkerShape::Cylinder(_)
            | MarkerShape::MeshResource(_) => self.scale = marker_scale,
            _ => {}
        }
    }

    /// Marker id, see [`cu_viz_payloads::marker_id`].
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &MarkerKey {
        &self.key
    }

    pub fn kind(&self) -> MarkerType {
        self.kind
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    pub fn src_time(&self) -> TfTime {
        self.src_time
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn scale(&self) -> DVec3 {
        self.scale
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

    /// Placement of the renderable in the render frame, scale included.
    pub fn world_matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(
            self.scale,
            self.state.orientation,
            self.state.position,
        )
    }

    pub fn shape(&self) -> &MarkerShape {
        &self.shape
    }
}
