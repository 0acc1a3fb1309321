use crate::time::{TfTime, TfTimeRange};
use crate::transform::Transform;
use std::collections::VecDeque;

/// Default number of samples kept per frame.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10_000;

/// A transform to the parent frame, valid at `stamp`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StampedTransform {
    pub stamp: TfTime,
    pub transform: Transform,
}

impl StampedTransform {
    pub fn new(stamp: TfTime, transform: Transform) -> Self {
        Self { stamp, transform }
    }
}

/// Time ordered samples of a frame's transform to its parent.
///
/// Samples are kept sorted on insert, so sources publishing out of order do not
/// need to be re-sorted at lookup. Once `max_capacity` is reached the oldest
/// samples are evicted first.
#[derive(Clone, Debug)]
pub struct TransformHistory {
    transforms: VecDeque<StampedTransform>,
    max_capacity: usize,
}

impl TransformHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            // do not preallocate the whole bound, most frames see few samples
            transforms: VecDeque::with_capacity(capacity.min(64)),
            max_capacity: capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_capacity
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn clear(&mut self) {
        self.transforms.clear();
    }

    /// Insert a sample at its time position. Equal stamps keep insertion order.
    pub fn add(&mut self, stamp: TfTime, transform: Transform) {
        let pos = self.transforms.partition_point(|t| t.stamp <= stamp);
        self.transforms
            .insert(pos, StampedTransform::new(stamp, transform));

        while self.transforms.len() > self.max_capacity {
            self.transforms.pop_front();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &StampedTransform> {
        self.transforms.iter()
    }

    pub fn latest(&self) -> Option<&StampedTransform> {
        self.transforms.back()
    }

    pub fn earliest(&self) -> Option<&StampedTransform> {
        self.transforms.front()
    }

    pub fn time_range(&self) -> Option<TfTimeRange> {
        Some(TfTimeRange {
            start: self.earliest()?.stamp,
            end: self.latest()?.stamp,
        })
    }

    pub fn transforms_in_range(&self, start: TfTime, end: TfTime) -> Vec<&StampedTransform> {
        self.transforms
            .iter()
            .filter(|t| t.stamp >= start && t.stamp <= end)
            .collect()
    }

    /// Sample whose stamp is the nearest to `time`. Ties go to the later sample.
    pub fn closest(&self, time: TfTime) -> Option<&StampedTransform> {
        let (before, after) = self.bracketing(time)?;
        if time.abs_diff(before.stamp) < after.stamp.abs_diff(time) {
            Some(before)
        } else {
            Some(after)
        }
    }

    /// The pair of samples surrounding `time`.
    ///
    /// Outside of the covered range both members of the pair are the nearest
    /// endpoint, which holds the transform constant instead of extrapolating.
    pub fn bracketing(&self, time: TfTime) -> Option<(&StampedTransform, &StampedTransform)> {
        let first = self.transforms.front()?;
        let last = self.transforms.back()?;

        let pos = self.transforms.partition_point(|t| t.stamp <= time);
        match pos {
            0 => Some((first, first)),
            p if p == self.transforms.len() => Some((last, last)),
            p => Some((&self.transforms[p - 1], &self.transforms[p])),
        }
    }
}

impl Default for TransformHistory {
    fn default() -> Self {
        Self::new()
    }
}
