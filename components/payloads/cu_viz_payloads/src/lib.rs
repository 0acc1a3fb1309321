//! Normalized visualization payloads.
//!
//! These mirror the shapes of the ROS `geometry_msgs` / `visualization_msgs`
//! messages the 3D scene consumes. The scene itself is schema-agnostic: any
//! source that can fill these structures (ROS bridge, log replay, a test) can
//! drive it.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// ROS style timestamp split in seconds and nanoseconds.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Encode, Decode,
)]
pub struct RosTime {
    pub sec: u32,
    pub nsec: u32,
}

/// Durations share the time layout (ie. `lifetime` in a marker).
pub type RosDuration = RosTime;

impl RosTime {
    pub fn new(sec: u32, nsec: u32) -> Self {
        Self { sec, nsec }
    }

    /// Total number of nanoseconds represented by this stamp.
    pub fn as_nanos(&self) -> u64 {
        self.sec as u64 * NANOS_PER_SEC + self.nsec as u64
    }
}

impl From<u64> for RosTime {
    fn from(nanos: u64) -> Self {
        Self {
            sec: (nanos / NANOS_PER_SEC) as u32,
            nsec: (nanos % NANOS_PER_SEC) as u32,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// sRGB color with a linear alpha, every channel in [0, 1].
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct ColorRGBA {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRGBA {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Pose {
    pub position: Vector3,
    pub orientation: Quaternion,
}

impl Pose {
    pub fn new(position: Vector3, orientation: Quaternion) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Header {
    pub frame_id: String,
    pub stamp: RosTime,
    pub seq: u32,
}

impl Header {
    pub fn new(frame_id: impl Into<String>, stamp: RosTime) -> Self {
        Self {
            frame_id: frame_id.into(),
            stamp,
            seq: 0,
        }
    }
}

/// Rigid transform as carried by `geometry_msgs/Transform`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct TfTransform {
    pub translation: Vector3,
    pub rotation: Quaternion,
}

/// `geometry_msgs/TransformStamped`: pose of `child_frame_id` expressed in `header.frame_id`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct TransformStamped {
    pub header: Header,
    pub child_frame_id: String,
    pub transform: TfTransform,
}

impl TransformStamped {
    pub fn new(
        parent_frame_id: impl Into<String>,
        child_frame_id: impl Into<String>,
        stamp: RosTime,
        transform: TfTransform,
    ) -> Self {
        Self {
            header: Header::new(parent_frame_id, stamp),
            child_frame_id: child_frame_id.into(),
            transform,
        }
    }
}

/// `tf2_msgs/TFMessage`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct TfMessage {
    pub transforms: Vec<TransformStamped>,
}

/// Primitive kinds understood by the scene.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum MarkerType {
    Arrow = 0,
    Cube = 1,
    Sphere = 2,
    Cylinder = 3,
    LineStrip = 4,
    LineList = 5,
    CubeList = 6,
    SphereList = 7,
    Points = 8,
    TextViewFacing = 9,
    MeshResource = 10,
    TriangleList = 11,
}

impl TryFrom<i32> for MarkerType {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => MarkerType::Arrow,
            1 => MarkerType::Cube,
            2 => MarkerType::Sphere,
            3 => MarkerType::Cylinder,
            4 => MarkerType::LineStrip,
            5 => MarkerType::LineList,
            6 => MarkerType::CubeList,
            7 => MarkerType::SphereList,
            8 => MarkerType::Points,
            9 => MarkerType::TextViewFacing,
            10 => MarkerType::MeshResource,
            11 => MarkerType::TriangleList,
            other => return Err(other),
        })
    }
}

/// Lifecycle action carried by a marker.
///
/// `ADD` and `MODIFY` share the wire value 0 and behave identically.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum MarkerAction {
    Add = 0,
    Delete = 2,
    DeleteAll = 3,
}

impl MarkerAction {
    pub const MODIFY: MarkerAction = MarkerAction::Add;
}

impl TryFrom<i32> for MarkerAction {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MarkerAction::Add),
            2 => Ok(MarkerAction::Delete),
            3 => Ok(MarkerAction::DeleteAll),
            other => Err(other),
        }
    }
}

/// `visualization_msgs/Marker`.
///
/// `marker_type` and `action` are kept as raw wire values so the scene can
/// report unknown ones instead of failing to decode the whole message.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Marker {
    pub header: Header,
    pub ns: String,
    pub id: i32,
    #[serde(rename = "type")]
    pub marker_type: i32,
    pub action: i32,
    pub pose: Pose,
    pub scale: Vector3,
    pub color: ColorRGBA,
    pub lifetime: RosDuration,
    pub frame_locked: bool,
    pub points: Vec<Vector3>,
    pub colors: Vec<ColorRGBA>,
    pub text: String,
    pub mesh_resource: String,
    pub mesh_use_embedded_materials: bool,
}

impl Marker {
    pub fn kind(&self) -> Result<MarkerType, i32> {
        MarkerType::try_from(self.marker_type)
    }

    pub fn lifecycle(&self) -> Result<MarkerAction, i32> {
        MarkerAction::try_from(self.action)
    }
}

/// `visualization_msgs/MarkerArray`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct MarkerArray {
    pub markers: Vec<Marker>,
}

/// Identity of a marker inside the scene: (topic, namespace, id).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerKey {
    pub topic: String,
    pub ns: String,
    pub id: i32,
}

impl MarkerKey {
    pub fn new(topic: impl Into<String>, ns: impl Into<String>, id: i32) -> Self {
        Self {
            topic: topic.into(),
            ns: ns.into(),
            id,
        }
    }
}

impl Display for MarkerKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", marker_id(&self.topic, &self.ns, self.id))
    }
}

/// Stable string identity of a marker, used for label overlays and world
/// position queries. Whitespace is replaced so the id is a single token.
pub fn marker_id(topic: &str, ns: &str, id: i32) -> String {
    let raw = if ns.is_empty() {
        format!("{topic}:{id}")
    } else {
        format!("{topic}:{ns}:{id}")
    };
    raw.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}
