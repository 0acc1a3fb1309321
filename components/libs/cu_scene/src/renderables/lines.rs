use super::{set_point_colors, set_positions};
use crate::buffer::DynamicBuffer;
use crate::color::marker_colors_to_linear;
use crate::context::SceneContext;
use crate::materials::{MarkerMaterial, MaterialRole};
use cu_viz_payloads::Marker;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LineMode {
    /// Consecutive points joined, colors given per segment as (start, end) pairs
    Strip,
    /// Points taken two by two, colors given per point
    List,
}

/// LINE_STRIP or LINE_LIST marker, `scale.x` wide.
///
/// Drawn in two passes sharing the same buffers: a depth and stencil prepass
/// then the color pass, so overlapping transparent segments blend once.
#[derive(Debug)]
pub struct RenderableLines {
    mode: LineMode,
    prepass: MarkerMaterial,
    material: MarkerMaterial,
    positions: DynamicBuffer<f32>,
    colors: DynamicBuffer<f32>,
}

impl RenderableLines {
    pub fn new(mode: LineMode, marker: &Marker, ctx: &mut SceneContext) -> Self {
        let color_size = match mode {
            LineMode::Strip => 8,
            LineMode::List => 4,
        };
        let mut lines = Self {
            mode,
            prepass: MarkerMaterial::acquire(MaterialRole::LinePrepass, marker, ctx.materials),
            material: MarkerMaterial::acquire(MaterialRole::Line, marker, ctx.materials),
            positions: DynamicBuffer::new(3),
            colors: DynamicBuffer::new(color_size),
        };
        set_positions(&mut lines.positions, &marker.points);
        lines.set_colors(marker);
        lines
    }

    pub fn update(&mut self, prev: &Marker, marker: &Marker, ctx: &mut SceneContext) {
        self.prepass.update(prev, marker, ctx.materials);
        self.material.update(prev, marker, ctx.materials);
        set_positions(&mut self.positions, &marker.points);
        self.set_colors(marker);
    }

    pub fn dispose(self, marker: &Marker, ctx: &mut SceneContext) {
        self.prepass.release(marker, ctx.materials);
        self.material.release(marker, ctx.materials);
    }

    fn set_colors(&mut self, marker: &Marker) {
        match self.mode {
            LineMode::Strip => {
                self.colors.resize(marker.points.len().saturating_sub(1));
                let data = self.colors.data_mut();
                let mut start = [0.0; 4];
                for (i, end) in marker_colors_to_linear(marker).enumerate() {
                    if i > 0 {
                        let segment = &mut data[(i - 1) * 8..i * 8];
                        segment[..4].copy_from_slice(&start);
                        segment[4..].copy_from_slice(&end);
                    }
                    start = end;
                }
            }
            LineMode::List => set_point_colors(&mut self.colors, marker),
        }
    }

    pub fn mode(&self) -> LineMode {
        self.mode
    }

    pub fn segment_count(&self) -> usize {
        let points = self.positions.count();
        match self.mode {
            LineMode::Strip => points.saturating_sub(1),
            LineMode::List => points / 2,
        }
    }

    pub fn prepass_material(&self) -> &MarkerMaterial {
        &self.prepass
    }

    pub fn material(&self) -> &MarkerMaterial {
        &self.material
    }

    /// xyz per point
    pub fn positions(&self) -> &DynamicBuffer<f32> {
        &self.positions
    }

    /// Linear rgba, see [`LineMode`] for the layout
    pub fn colors(&self) -> &DynamicBuffer<f32> {
        &self.colors
    }
}
