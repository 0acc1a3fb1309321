use cu_transform::{TfDuration, Transform, TransformTree};
use cu_viz_payloads::{Pose, Quaternion, Vector3};
use glam::{DQuat, DVec3};
use std::f64::consts::FRAC_PI_2;

fn main() {
    println!("Cu Transform - Frame Tree Demo");
    println!("==============================");

    let mut tree = TransformTree::new();

    // The robot drives 10m along x in map between t=0s and t=10s
    let start = Transform::new(DVec3::ZERO, DQuat::IDENTITY);
    let end = Transform::new(DVec3::new(10.0, 0.0, 0.0), DQuat::IDENTITY);
    tree.add_transform("base_link", "map", TfDuration::from_secs_f64(0.0), start);
    tree.add_transform("base_link", "map", TfDuration::from_secs_f64(10.0), end);

    // A camera mounted 0.5m above the base, looking left
    let mount = Transform::new(DVec3::new(0.0, 0.0, 0.5), DQuat::from_rotation_z(FRAC_PI_2));
    tree.add_transform("camera", "base_link", TfDuration(0), mount);

    println!("Frames in tree:");
    for frame in tree.frames() {
        println!("  {} ({} samples)", frame.id(), frame.history().len());
    }

    // A point 2m in front of the camera
    let seen = Pose::new(Vector3::new(2.0, 0.0, 0.0), Quaternion::IDENTITY);

    for secs in [0.0, 2.5, 5.0, 12.0] {
        let time = TfDuration::from_secs_f64(secs);
        match tree.apply(&seen, "map", None, "camera", time, time, None) {
            Ok(pose) => println!(
                "t={time}: point at [{:.2}, {:.2}, {:.2}] in map",
                pose.position.x, pose.position.y, pose.position.z
            ),
            Err(e) => println!("t={time}: {e}"),
        }
    }

    // With a staleness bound, lookups far from any sample are rejected
    let late = TfDuration::from_secs_f64(12.0);
    let bound = Some(TfDuration::from_secs_f64(1.0));
    if let Err(e) = tree.apply(&seen, "map", None, "camera", late, late, bound) {
        println!("Bounded lookup failed as expected: {e}");
    }
}
