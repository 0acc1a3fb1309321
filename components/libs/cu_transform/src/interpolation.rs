use crate::history::StampedTransform;
use crate::time::TfTime;
use crate::transform::Transform;

/// Interpolate between two stamped transforms at a specific time point.
///
/// The position is interpolated linearly and the rotation spherically. The
/// ratio is clamped to the `[before, after]` span so a time outside of it
/// holds the nearest sample.
///
/// # Arguments
/// * `before` - The transform at an earlier time
/// * `after` - The transform at a later time
/// * `time` - The time at which to interpolate
pub fn interpolate_transforms(
    before: &StampedTransform,
    after: &StampedTransform,
    time: TfTime,
) -> Transform {
    let start = before.stamp.as_nanos();
    let end = after.stamp.as_nanos();

    if end <= start {
        return before.transform;
    }

    let ratio = (time.as_nanos().saturating_sub(start)) as f64 / (end - start) as f64;
    Transform::interpolate(&before.transform, &after.transform, ratio.clamp(0.0, 1.0))
}
