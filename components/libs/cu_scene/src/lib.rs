//! Marker and frame scene of a Copper 3D view.
//!
//! A [`Scene`] takes `tf` and `visualization_msgs/Marker` style messages,
//! keeps one renderable per marker key with its shared materials and
//! geometry, and resolves where everything sits in the render frame once per
//! [`Scene::tick`]. Drawing is left to the host: it reads the renderables and
//! reacts to the [`SceneEvent`]s the scene queues.
//!
//! ```
//! use cu_scene::{Scene, SceneConfig, SceneEvent};
//! use cu_transform::TfTime;
//! use cu_viz_payloads::{Header, Marker, MarkerType, RosTime, TfTransform, TransformStamped, Vector3};
//!
//! let mut scene = Scene::new(SceneConfig {
//!     render_frame_id: "map".to_string(),
//!     fixed_frame_id: "map".to_string(),
//!     ..Default::default()
//! });
//! scene.add_transform_message(&TransformStamped::new(
//!     "map",
//!     "base_link",
//!     RosTime::new(0, 0),
//!     TfTransform {
//!         translation: Vector3::new(2.0, 0.0, 0.0),
//!         ..Default::default()
//!     },
//! ));
//! scene.add_marker_message(
//!     "/markers",
//!     &Marker {
//!         header: Header::new("base_link", RosTime::new(0, 0)),
//!         marker_type: MarkerType::Cube as i32,
//!         scale: Vector3::new(1.0, 1.0, 1.0),
//!         ..Default::default()
//!     },
//! );
//!
//! scene.tick(TfTime::default());
//! let position = scene.marker_world_position("/markers:0").unwrap();
//! assert_eq!(position.x, 2.0);
//! assert!(scene
//!     .drain_events()
//!     .contains(&SceneEvent::TransformTreeUpdated));
//! ```

pub mod buffer;
pub mod color;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod frame_axes;
pub mod geometry;
pub mod markers;
pub mod materials;
pub mod math;
pub mod model_cache;
pub mod renderables;
pub mod resource_cache;
pub mod scene;
pub mod topic_errors;
pub mod topic_markers;
pub mod update_pose;

pub use config::{read_configuration, SceneConfig};
pub use context::{SceneContext, SceneResources};
pub use error::{SceneError, SceneResult};
pub use events::SceneEvent;
pub use frame_axes::{FrameAxes, FrameAxis};
pub use geometry::{DetailLevel, Geometry, GeometryCache, Shape};
pub use markers::Markers;
pub use materials::{Material, MaterialCache, MaterialKind};
pub use model_cache::{
    BlockingModelLoader, Model, ModelCache, ModelLoader, ModelResponder, NullModelLoader,
    ThreadedModelLoader,
};
pub use renderables::{MarkerShape, RenderableMarker};
pub use resource_cache::ResourceCache;
pub use scene::Scene;
pub use topic_errors::TopicErrors;
pub use topic_markers::TopicMarkers;
pub use update_pose::{update_pose, PoseState};
