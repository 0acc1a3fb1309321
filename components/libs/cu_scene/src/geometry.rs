//! Unit shapes shared by every renderable of a scene.
//!
//! Geometry is built once per (shape, detail level) and handed out as `Rc`
//! clones; renderables only scale and place it.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::rc::Rc;

/// Tessellation level of curved shapes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetailLevel {
    Low,
    Medium,
    #[default]
    High,
}

impl DetailLevel {
    pub fn sphere_subdivisions(self) -> u32 {
        match self {
            DetailLevel::Low => 10,
            DetailLevel::Medium => 24,
            DetailLevel::High => 32,
        }
    }

    /// Radial segments of cylinders, arrow shafts and arrow heads.
    pub fn radial_subdivisions(self) -> u32 {
        match self {
            DetailLevel::Low => 12,
            DetailLevel::Medium => 20,
            DetailLevel::High => 32,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// 1x1x1 box centered on the origin
    Cube,
    /// The 12 edges of [`Shape::Cube`] as line segments
    CubeEdges,
    /// Sphere of radius 0.5
    Sphere,
    /// Cylinder of radius 0.5 and height 1 standing along the Z axis
    Cylinder,
    /// Cylinder of radius 0.5 and length 1 along the X axis
    ArrowShaft,
    /// Cone of radius 0.5 and length 1 pointing toward +X
    ArrowHead,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Topology {
    Triangles,
    Lines,
}

#[derive(Clone, Debug)]
pub struct Geometry {
    pub shape: Shape,
    pub subdivisions: u32,
    pub topology: Topology,
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    /// Radius of the bounding sphere centered on the origin
    pub bounding_radius: f32,
}

impl Geometry {
    pub fn new(shape: Shape, detail: DetailLevel) -> Self {
        let (subdivisions, topology, positions, indices) = match shape {
            Shape::Cube => (1, Topology::Triangles, cube_positions(), cube_indices()),
            Shape::CubeEdges => (1, Topology::Lines, cube_positions(), cube_edge_indices()),
            Shape::Sphere => {
                let n = detail.sphere_subdivisions();
                let (p, i) = sphere(n, n);
                (n, Topology::Triangles, p, i)
            }
            Shape::Cylinder => {
                let n = detail.radial_subdivisions();
                let (p, i) = cylinder(0.5, 0.5, n);
                (n, Topology::Triangles, rotate(p, Quat::from_rotation_x(FRAC_PI_2)), i)
            }
            Shape::ArrowShaft => {
                let n = detail.radial_subdivisions();
                let (p, i) = cylinder(0.5, 0.5, n);
                (n, Topology::Triangles, rotate(p, Quat::from_rotation_z(-FRAC_PI_2)), i)
            }
            Shape::ArrowHead => {
                let n = detail.radial_subdivisions();
                let (p, i) = cylinder(0.0, 0.5, n);
                (n, Topology::Triangles, rotate(p, Quat::from_rotation_z(-FRAC_PI_2)), i)
            }
        };
        let bounding_radius = positions.iter().map(|p| p.length()).fold(0.0, f32::max);
        Self {
            shape,
            subdivisions,
            topology,
            positions,
            indices,
            bounding_radius,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn primitive_count(&self) -> usize {
        match self.topology {
            Topology::Triangles => self.indices.len() / 3,
            Topology::Lines => self.indices.len() / 2,
        }
    }
}

/// Detail level keyed geometry store, owned by one scene.
#[derive(Debug, Default)]
pub struct GeometryCache {
    geometries: HashMap<(Shape, DetailLevel), Rc<Geometry>>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, shape: Shape, detail: DetailLevel) -> Rc<Geometry> {
        self.geometries
            .entry((shape, detail))
            .or_insert_with(|| Rc::new(Geometry::new(shape, detail)))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    pub fn clear(&mut self) {
        self.geometries.clear();
    }
}

fn cube_positions() -> Vec<Vec3> {
    let mut positions = Vec::with_capacity(8);
    for i in 0..8u32 {
        let x = if i & 1 == 0 { -0.5 } else { 0.5 };
        let y = if i & 2 == 0 { -0.5 } else { 0.5 };
        let z = if i & 4 == 0 { -0.5 } else { 0.5 };
        positions.push(Vec3::new(x, y, z));
    }
    positions
}

fn cube_indices() -> Vec<u32> {
    // two counter clockwise triangles per face, seen from outside
    vec![
        0, 2, 1, 1, 2, 3, // -z
        4, 5, 6, 5, 7, 6, // +z
        0, 1, 4, 1, 5, 4, // -y
        2, 6, 3, 3, 6, 7, // +y
        0, 4, 2, 2, 4, 6, // -x
        1, 3, 5, 3, 7, 5, // +x
    ]
}

fn cube_edge_indices() -> Vec<u32> {
    vec![
        0, 1, 2, 3, 4, 5, 6, 7, // along x
        0, 2, 1, 3, 4, 6, 5, 7, // along y
        0, 4, 1, 5, 2, 6, 3, 7, // along z
    ]
}

/// UV sphere of radius 0.5.
fn sphere(width_segments: u32, height_segments: u32) -> (Vec<Vec3>, Vec<u32>) {
    let mut positions = Vec::new();
    for iy in 0..=height_segments {
        let theta = iy as f32 / height_segments as f32 * PI;
        for ix in 0..=width_segments {
            let phi = ix as f32 / width_segments as f32 * TAU;
            positions.push(Vec3::new(
                -0.5 * phi.cos() * theta.sin(),
                0.5 * theta.cos(),
                0.5 * phi.sin() * theta.sin(),
            ));
        }
    }

    let row = width_segments + 1;
    let mut indices = Vec::new();
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    (positions, indices)
}

/// Capped cylinder (or cone when `radius_top` is 0) of height 1 along Y.
fn cylinder(radius_top: f32, radius_bottom: f32, radial_segments: u32) -> (Vec<Vec3>, Vec<u32>) {
    let mut positions = Vec::new();
    for (y, radius) in [(0.5, radius_top), (-0.5, radius_bottom)] {
        for i in 0..radial_segments {
            let angle = i as f32 / radial_segments as f32 * TAU;
            positions.push(Vec3::new(radius * angle.sin(), y, radius * angle.cos()));
        }
    }
    let top_center = positions.len() as u32;
    positions.push(Vec3::new(0.0, 0.5, 0.0));
    let bottom_center = top_center + 1;
    positions.push(Vec3::new(0.0, -0.5, 0.0));

    let mut indices = Vec::new();
    for i in 0..radial_segments {
        let next = (i + 1) % radial_segments;
        let (t0, t1) = (i, next);
        let (b0, b1) = (i + radial_segments, next + radial_segments);
        indices.extend_from_slice(&[t0, b0, t1, t1, b0, b1]);
        if radius_top > 0.0 {
            indices.extend_from_slice(&[top_center, t0, t1]);
        }
        indices.extend_from_slice(&[bottom_center, b1, b0]);
    }
    (positions, indices)
}

fn rotate(positions: Vec<Vec3>, rotation: Quat) -> Vec<Vec3> {
    positions.into_iter().map(|p| rotation * p).collect()
}
