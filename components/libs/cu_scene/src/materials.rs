//! Material descriptors and the shared material cache.
//!
//! A material here is the full description a render backend needs to build
//! its own GPU object. Each kind has a key format so that markers with the
//! same look share one material.

use crate::color::{rgba_to_hex_string, rgba_to_linear, LinearRgba};
use crate::resource_cache::ResourceCache;
use cu_viz_payloads::{ColorRGBA, Marker, MarkerType, Vector3};
use log::debug;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    BasicColor,
    StandardColor,
    StandardInstancedColor,
    StandardVertexColor,
    LineBasicColor,
    PointsVertexColor,
    LineVertexColorPrepass,
    LineVertexColor,
    Outline,
}

/// Stencil setup of the two pass line rendering. The prepass only writes depth
/// and stencil, the color pass draws where the prepass did not.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StencilPass {
    None,
    Prepass,
    Color,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub kind: MaterialKind,
    /// Linear base color, `None` when colors come from vertices or instances
    pub color: Option<LinearRgba>,
    pub opacity: f32,
    pub transparent: bool,
    pub depth_write: bool,
    pub color_write: bool,
    pub vertex_colors: bool,
    pub metalness: f32,
    pub roughness: f32,
    pub line_width: Option<f64>,
    pub point_size: Option<f64>,
    pub stencil: StencilPass,
    /// Render target size in pixels, only used by line materials
    pub resolution: Cell<[f64; 2]>,
}

impl Material {
    fn base(name: String, kind: MaterialKind, transparent: bool) -> Self {
        Self {
            name,
            kind,
            color: None,
            opacity: 1.0,
            transparent,
            depth_write: !transparent,
            color_write: true,
            vertex_colors: false,
            metalness: 0.0,
            roughness: 1.0,
            line_width: None,
            point_size: None,
            stencil: StencilPass::None,
            resolution: Cell::new([1.0, 1.0]),
        }
    }

    fn colored(name: String, kind: MaterialKind, color: &ColorRGBA) -> Self {
        let mut material = Self::base(name, kind, color.a < 1.0);
        material.color = Some(rgba_to_linear(color));
        material.opacity = color.a;
        material
    }

    pub fn basic_color(color: &ColorRGBA) -> Self {
        Self::colored(basic_color_id(color), MaterialKind::BasicColor, color)
    }

    pub fn standard_color(color: &ColorRGBA) -> Self {
        Self::colored(standard_color_id(color), MaterialKind::StandardColor, color)
    }

    pub fn standard_instanced_color(transparent: bool) -> Self {
        Self::base(
            standard_instanced_color_id(transparent),
            MaterialKind::StandardInstancedColor,
            transparent,
        )
    }

    pub fn standard_vertex_color(transparent: bool) -> Self {
        let mut material = Self::base(
            standard_vertex_color_id(transparent),
            MaterialKind::StandardVertexColor,
            transparent,
        );
        material.vertex_colors = true;
        material
    }

    pub fn line_basic_color(color: &ColorRGBA) -> Self {
        Self::colored(line_basic_color_id(color), MaterialKind::LineBasicColor, color)
    }

    pub fn points_vertex_color(scale: &Vector3, transparent: bool) -> Self {
        let mut material = Self::base(
            points_vertex_color_id(scale, transparent),
            MaterialKind::PointsVertexColor,
            transparent,
        );
        material.vertex_colors = true;
        material.point_size = Some(scale.x);
        material
    }

    pub fn line_vertex_color_prepass(line_width: f64, transparent: bool) -> Self {
        let mut material = Self::base(
            line_vertex_color_prepass_id(line_width, transparent),
            MaterialKind::LineVertexColorPrepass,
            transparent,
        );
        material.color_write = false;
        material.line_width = Some(line_width);
        material.stencil = StencilPass::Prepass;
        material
    }

    pub fn line_vertex_color(line_width: f64, transparent: bool) -> Self {
        let mut material = Self::base(
            line_vertex_color_id(line_width, transparent),
            MaterialKind::LineVertexColor,
            transparent,
        );
        material.vertex_colors = true;
        material.line_width = Some(line_width);
        material.stencil = StencilPass::Color;
        material
    }

    pub fn outline() -> Self {
        Self::base("Outline".to_string(), MaterialKind::Outline, false)
    }

    pub fn is_line(&self) -> bool {
        matches!(
            self.kind,
            MaterialKind::LineVertexColor | MaterialKind::LineVertexColorPrepass
        )
    }
}

fn transparent_suffix(transparent: bool) -> &'static str {
    if transparent {
        "-t"
    } else {
        ""
    }
}

pub fn basic_color_id(color: &ColorRGBA) -> String {
    format!("BasicColor-{}", rgba_to_hex_string(color))
}

pub fn standard_color_id(color: &ColorRGBA) -> String {
    format!("StandardColor-{}", rgba_to_hex_string(color))
}

pub fn standard_instanced_color_id(transparent: bool) -> String {
    format!("StandardInstancedColor{}", transparent_suffix(transparent))
}

pub fn standard_vertex_color_id(transparent: bool) -> String {
    format!("StandardVertexColor{}", transparent_suffix(transparent))
}

pub fn line_basic_color_id(color: &ColorRGBA) -> String {
    format!("LineBasicColor-{}", rgba_to_hex_string(color))
}

pub fn points_vertex_color_id(scale: &Vector3, transparent: bool) -> String {
    format!(
        "PointsVertexColor-{}x{}{}",
        scale.x,
        scale.y,
        transparent_suffix(transparent)
    )
}

pub fn line_vertex_color_prepass_id(line_width: f64, transparent: bool) -> String {
    format!(
        "LineVertexColorPrepass-{line_width:.4}-{}",
        transparent_suffix(transparent)
    )
}

pub fn line_vertex_color_id(line_width: f64, transparent: bool) -> String {
    format!(
        "LineVertexColor-{line_width:.4}-{}",
        transparent_suffix(transparent)
    )
}

/// Whether a marker needs blending.
///
/// Single shape markers look at `color`. Multi point markers are transparent if
/// any per point color is, or if some points fall back to a transparent `color`.
pub fn marker_has_transparency(marker: &Marker) -> bool {
    match marker.kind() {
        Ok(
            MarkerType::Arrow
            | MarkerType::Cube
            | MarkerType::Sphere
            | MarkerType::Cylinder
            | MarkerType::TextViewFacing
            | MarkerType::MeshResource,
        ) => marker.color.a < 1.0,
        _ => {
            if marker.colors.iter().any(|c| c.a < 1.0) {
                return true;
            }
            if marker.colors.len() >= marker.points.len() {
                false
            } else {
                marker.color.a < 1.0
            }
        }
    }
}

fn dispose_material(material: &Material) {
    debug!("Disposing material {}", material.name);
}

/// Shared materials of a scene.
#[derive(Debug)]
pub struct MaterialCache {
    materials: ResourceCache<Material>,
    outline_material: Rc<Material>,
    resolution: [f64; 2],
}

impl MaterialCache {
    pub fn new() -> Self {
        Self {
            materials: ResourceCache::new(),
            outline_material: Rc::new(Material::outline()),
            resolution: [1.0, 1.0],
        }
    }

    /// See [`ResourceCache::acquire`].
    pub fn acquire<C, D>(&mut self, id: &str, create: C, dispose: D) -> Rc<Material>
    where
        C: FnOnce() -> Material,
        D: FnOnce(&Material) + 'static,
    {
        let resolution = self.resolution;
        self.materials.acquire(
            id,
            || {
                let material = create();
                material.resolution.set(resolution);
                debug!("Created material {}", material.name);
                material
            },
            dispose,
        )
    }

    pub fn release(&mut self, id: &str) -> usize {
        self.materials.release(id)
    }

    pub fn ref_count(&self, id: &str) -> usize {
        self.materials.ref_count(id)
    }

    pub fn get(&self, id: &str) -> Option<&Rc<Material>> {
        self.materials.get(id)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Material used by shape outlines. It lives as long as the cache and is
    /// not reference counted.
    pub fn outline_material(&self) -> Rc<Material> {
        self.outline_material.clone()
    }

    /// Push the render target size to every line material.
    pub fn update_resolution(&mut self, width: f64, height: f64) {
        self.resolution = [width, height];
        for (_, material) in self.materials.iter() {
            if material.is_line() {
                material.resolution.set(self.resolution);
            }
        }
    }

    pub fn resolution(&self) -> [f64; 2] {
        self.resolution
    }

    pub fn clear(&mut self) {
        self.materials.clear();
    }
}

impl Default for MaterialCache {
    fn default() -> Self {
        Self::new()
    }
}

pub fn standard_material_id(marker: &Marker) -> String {
    standard_color_id(&marker.color)
}

pub fn standard_material(marker: &Marker, cache: &mut MaterialCache) -> Rc<Material> {
    let color = marker.color;
    cache.acquire(
        &standard_material_id(marker),
        || Material::standard_color(&color),
        dispose_material,
    )
}

pub fn standard_instanced_material_id(marker: &Marker) -> String {
    standard_instanced_color_id(marker_has_transparency(marker))
}

pub fn standard_instanced_material(marker: &Marker, cache: &mut MaterialCache) -> Rc<Material> {
    let transparent = marker_has_transparency(marker);
    cache.acquire(
        &standard_instanced_color_id(transparent),
        || Material::standard_instanced_color(transparent),
        dispose_material,
    )
}

pub fn standard_vertex_material_id(marker: &Marker) -> String {
    standard_vertex_color_id(marker_has_transparency(marker))
}

pub fn standard_vertex_material(marker: &Marker, cache: &mut MaterialCache) -> Rc<Material> {
    let transparent = marker_has_transparency(marker);
    cache.acquire(
        &standard_vertex_color_id(transparent),
        || Material::standard_vertex_color(transparent),
        dispose_material,
    )
}

pub fn line_prepass_material_id(marker: &Marker) -> String {
    line_vertex_color_prepass_id(marker.scale.x, marker_has_transparency(marker))
}

pub fn line_prepass_material(marker: &Marker, cache: &mut MaterialCache) -> Rc<Material> {
    let line_width = marker.scale.x;
    let transparent = marker_has_transparency(marker);
    cache.acquire(
        &line_vertex_color_prepass_id(line_width, transparent),
        || Material::line_vertex_color_prepass(line_width, transparent),
        dispose_material,
    )
}

pub fn line_material_id(marker: &Marker) -> String {
    line_vertex_color_id(marker.scale.x, marker_has_transparency(marker))
}

pub fn line_material(marker: &Marker, cache: &mut MaterialCache) -> Rc<Material> {
    let line_width = marker.scale.x;
    let transparent = marker_has_transparency(marker);
    cache.acquire(
        &line_vertex_color_id(line_width, transparent),
        || Material::line_vertex_color(line_width, transparent),
        dispose_material,
    )
}

pub fn points_material_id(marker: &Marker) -> String {
    points_vertex_color_id(&marker.scale, marker_has_transparency(marker))
}

pub fn points_material(marker: &Marker, cache: &mut MaterialCache) -> Rc<Material> {
    let scale = marker.scale;
    let transparent = marker_has_transparency(marker);
    cache.acquire(
        &points_vertex_color_id(&scale, transparent),
        || Material::points_vertex_color(&scale, transparent),
        dispose_material,
    )
}

/// Which cached material a marker holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MaterialRole {
    Standard,
    StandardInstanced,
    StandardVertex,
    LinePrepass,
    Line,
    Points,
}

impl MaterialRole {
    pub fn id(self, marker: &Marker) -> String {
        match self {
            MaterialRole::Standard => standard_material_id(marker),
            MaterialRole::StandardInstanced => standard_instanced_material_id(marker),
            MaterialRole::StandardVertex => standard_vertex_material_id(marker),
            MaterialRole::LinePrepass => line_prepass_material_id(marker),
            MaterialRole::Line => line_material_id(marker),
            MaterialRole::Points => points_material_id(marker),
        }
    }

    pub fn acquire(self, marker: &Marker, cache: &mut MaterialCache) -> Rc<Material> {
        match self {
            MaterialRole::Standard => standard_material(marker, cache),
            MaterialRole::StandardInstanced => standard_instanced_material(marker, cache),
            MaterialRole::StandardVertex => standard_vertex_material(marker, cache),
            MaterialRole::LinePrepass => line_prepass_material(marker, cache),
            MaterialRole::Line => line_material(marker, cache),
            MaterialRole::Points => points_material(marker, cache),
        }
    }
}

/// One reference to a cached material, held for a marker.
///
/// The cache key is derived from the marker the reference was taken for, so
/// the marker given to [`MarkerMaterial::update`] and
/// [`MarkerMaterial::release`] must be the one last used.
#[derive(Clone, Debug)]
pub struct MarkerMaterial {
    role: MaterialRole,
    material: Rc<Material>,
}

impl MarkerMaterial {
    pub fn acquire(role: MaterialRole, marker: &Marker, cache: &mut MaterialCache) -> Self {
        Self {
            role,
            material: role.acquire(marker, cache),
        }
    }

    /// Move to the entry of `marker` if its key differs from the one of
    /// `prev`. The new entry is acquired before the old one is released.
    pub fn update(&mut self, prev: &Marker, marker: &Marker, cache: &mut MaterialCache) -> bool {
        let prev_id = self.role.id(prev);
        if prev_id == self.role.id(marker) {
            return false;
        }
        self.material = self.role.acquire(marker, cache);
        cache.release(&prev_id);
        true
    }

    pub fn release(&self, marker: &Marker, cache: &mut MaterialCache) {
        cache.release(&self.role.id(marker));
    }

    pub fn role(&self) -> MaterialRole {
        self.role
    }

    pub fn material(&self) -> &Rc<Material> {
        &self.material
    }
}
