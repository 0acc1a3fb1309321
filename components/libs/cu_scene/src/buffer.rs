//! Growable vertex and instance storage.

use crate::color::{rgba_to_linear, LinearRgba};
use cu_viz_payloads::{ColorRGBA, Vector3};
use glam::{Mat4, Vec3};

/// Initial number of instances of a [`DynamicInstances`].
pub const INITIAL_CAPACITY: usize = 4;

/// Flat attribute buffer of `item_size` components per item.
///
/// Only grows: shrinking the item count keeps the allocation so that a
/// fluctuating point count does not reallocate every update.
#[derive(Clone, Debug)]
pub struct DynamicBuffer<T: Copy + Default> {
    data: Vec<T>,
    item_size: usize,
    count: usize,
    item_capacity: usize,
    /// Bumped on every write, lets a backend know when to re-upload
    version: u64,
}

impl<T: Copy + Default> DynamicBuffer<T> {
    pub fn new(item_size: usize) -> Self {
        Self {
            data: Vec::new(),
            item_size,
            count: 0,
            item_capacity: 0,
            version: 0,
        }
    }

    pub fn resize(&mut self, item_count: usize) {
        self.count = item_count;
        if item_count <= self.item_capacity {
            return;
        }
        self.data = vec![T::default(); item_count * self.item_size];
        self.item_capacity = item_count;
    }

    pub fn item_size(&self) -> usize {
        self.item_size
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn item_capacity(&self) -> usize {
        self.item_capacity
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// The `count` items in use.
    pub fn data(&self) -> &[T] {
        &self.data[..self.count * self.item_size]
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        self.version += 1;
        &mut self.data[..self.count * self.item_size]
    }

    /// Write item `index`.
    pub fn set_item(&mut self, index: usize, item: &[T]) {
        let start = index * self.item_size;
        self.data_mut()[start..start + item.len()].copy_from_slice(item);
    }
}

/// Per instance transforms and colors of an instanced shape list.
#[derive(Clone, Debug)]
pub struct DynamicInstances {
    capacity: usize,
    count: usize,
    matrices: Vec<Mat4>,
    colors: Vec<LinearRgba>,
}

impl DynamicInstances {
    pub fn new(initial_capacity: usize) -> Self {
        let mut instances = Self {
            capacity: initial_capacity,
            count: 0,
            matrices: Vec::new(),
            colors: Vec::new(),
        };
        instances.resize();
        instances
    }

    /// Place one instance of `scale` at each point, colored by the matching
    /// entry of `colors` or by `default_color`.
    pub fn set(
        &mut self,
        points: &[Vector3],
        scale: &Vector3,
        colors: &[ColorRGBA],
        default_color: &ColorRGBA,
    ) {
        let count = points.len();
        self.set_count(count);

        let scale = Vec3::new(scale.x as f32, scale.y as f32, scale.z as f32);
        for (i, point) in points.iter().enumerate() {
            let translation = Vec3::new(point.x as f32, point.y as f32, point.z as f32);
            self.matrices[i] = Mat4::from_translation(translation) * Mat4::from_scale(scale);
            self.colors[i] = rgba_to_linear(colors.get(i).unwrap_or(default_color));
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices[..self.count]
    }

    pub fn colors(&self) -> &[LinearRgba] {
        &self.colors[..self.count]
    }

    fn set_count(&mut self, count: usize) {
        while count >= self.capacity {
            self.expand();
        }
        self.count = count;
    }

    fn expand(&mut self) {
        self.capacity = self.capacity + self.capacity / 2 + 16;
        self.resize();
    }

    fn resize(&mut self) {
        self.matrices.resize(self.capacity, Mat4::IDENTITY);
        self.colors.resize(self.capacity, [0.0; 4]);
    }
}

impl Default for DynamicInstances {
    fn default() -> Self {
        Self::new(INITIAL_CAPACITY)
    }
}
