//! The per tick orchestrator.

use crate::config::{read_configuration, SceneConfig};
use crate::context::SceneResources;
use crate::error::SceneResult;
use crate::events::SceneEvent;
use crate::frame_axes::FrameAxes;
use crate::markers::Markers;
use crate::model_cache::{ModelCache, ModelLoader, NullModelLoader};
use crate::topic_errors::TopicErrors;
use cu_transform::{TfTime, TransformTree};
use cu_viz_payloads::{Marker, MarkerArray, Pose, TfMessage, TransformStamped};
use glam::DVec3;
use log::info;
use std::path::Path;

/// Transform tree, marker renderables and shared resources of one 3D view.
///
/// Messages can be fed at any time between ticks; poses are only resolved by
/// [`Scene::tick`].
pub struct Scene {
    config: SceneConfig,
    tree: TransformTree,
    resources: SceneResources,
    markers: Markers,
    frame_axes: FrameAxes,
    resolution: [f64; 2],
    current_time: TfTime,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        Self::with_model_loader(config, Box::new(NullModelLoader))
    }

    pub fn with_model_loader(config: SceneConfig, loader: Box<dyn ModelLoader>) -> Self {
        info!(
            "Creating scene rendering in {} with fixed frame {}",
            config.render_frame_id, config.fixed_frame_id
        );
        Self {
            tree: TransformTree::with_history_capacity(config.max_transform_history),
            resources: SceneResources::new(ModelCache::new(loader), config.detail_level),
            markers: Markers::new(),
            frame_axes: FrameAxes::new(),
            resolution: [1.0, 1.0],
            current_time: TfTime::default(),
            config,
        }
    }

    /// Build a scene from a RON configuration file.
    pub fn from_config_file(path: impl AsRef<Path>) -> SceneResult<Self> {
        Ok(Self::new(read_configuration(path)?))
    }

    pub fn add_transform_message(&mut self, msg: &TransformStamped) {
        if self.frame_axes.add_transform_message(&mut self.tree, msg) {
            self.resources.events.push(SceneEvent::TransformTreeUpdated);
        }
    }

    pub fn add_tf_message(&mut self, msg: &TfMessage) {
        for transform in &msg.transforms {
            self.add_transform_message(transform);
        }
    }

    pub fn add_marker_message(&mut self, topic: &str, marker: &Marker) {
        self.markers
            .add_marker_message(topic, marker.clone(), &mut self.resources.context());
    }

    pub fn add_marker_array(&mut self, topic: &str, msg: &MarkerArray) {
        for marker in &msg.markers {
            self.add_marker_message(topic, marker);
        }
    }

    /// Forget a topic: its renderables are disposed and its errors cleared.
    pub fn remove_topic(&mut self, topic: &str) {
        self.markers
            .remove_topic(topic, &mut self.resources.context());
    }

    /// Run one frame: apply completed model loads, then resolve the pose of
    /// every frame axis and renderable at `current_time`.
    pub fn tick(&mut self, current_time: TfTime) {
        self.current_time = current_time;
        self.resources
            .events
            .push(SceneEvent::StartFrame { current_time });

        let deliveries = self.resources.models.poll();
        if !deliveries.is_empty() {
            self.markers
                .apply_model_deliveries(&deliveries, &mut self.resources.context());
        }

        let [width, height] = self.resolution;
        self.resources.materials.update_resolution(width, height);

        let render_frame_id = self.config.render_frame_id.as_str();
        let fixed_frame_id = self.config.fixed_frame_id.as_str();
        let max_delta = self.config.max_delta();
        if self.config.show_frame_axes {
            self.frame_axes.start_frame(
                &self.tree,
                render_frame_id,
                fixed_frame_id,
                current_time,
                max_delta,
            );
        }
        self.markers.start_frame(
            &self.tree,
            render_frame_id,
            fixed_frame_id,
            current_time,
            max_delta,
        );

        self.resources
            .events
            .push(SceneEvent::EndFrame { current_time });
    }

    pub fn set_render_frame_id(&mut self, frame_id: impl Into<String>) {
        let frame_id = frame_id.into();
        if frame_id != self.config.render_frame_id {
            info!("Render frame set to {frame_id}");
            self.config.render_frame_id = frame_id;
        }
    }

    pub fn set_fixed_frame_id(&mut self, frame_id: impl Into<String>) {
        let frame_id = frame_id.into();
        if frame_id != self.config.fixed_frame_id {
            info!("Fixed frame set to {frame_id}");
            self.config.fixed_frame_id = frame_id;
        }
    }

    /// Size of the render target in pixels, pushed to line materials on the
    /// next tick.
    pub fn set_resolution(&mut self, width: f64, height: f64) {
        self.resolution = [width, height];
    }

    /// Position of the renderable named `marker_id` in the render frame, as of
    /// the last tick. `None` when unknown or hidden.
    pub fn marker_world_position(&self, marker_id: &str) -> Option<DVec3> {
        let key = self.resources.renderables.get(marker_id)?;
        let renderable = self.markers.get(key)?;
        renderable
            .is_visible()
            .then(|| renderable.world_position())
    }

    /// Origin of `frame_id` in the render frame at the last tick time.
    pub fn frame_pose(&self, frame_id: &str) -> SceneResult<Pose> {
        Ok(self.tree.apply(
            &Pose::default(),
            &self.config.render_frame_id,
            Some(&self.config.fixed_frame_id),
            frame_id,
            self.current_time,
            self.current_time,
            self.config.max_delta(),
        )?)
    }

    /// Take the events queued since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.resources.events)
    }

    /// Release every renderable and cached resource.
    pub fn dispose(&mut self) {
        self.markers.dispose(&mut self.resources.context());
        self.frame_axes.dispose();
        self.resources.materials.clear();
        self.resources.geometries.clear();
        self.resources.topic_errors.clear();
        info!("Scene disposed");
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn render_frame_id(&self) -> &str {
        &self.config.render_frame_id
    }

    pub fn fixed_frame_id(&self) -> &str {
        &self.config.fixed_frame_id
    }

    pub fn current_time(&self) -> TfTime {
        self.current_time
    }

    pub fn transform_tree(&self) -> &TransformTree {
        &self.tree
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn frame_axes(&self) -> &FrameAxes {
        &self.frame_axes
    }

    pub fn topic_errors(&self) -> &TopicErrors {
        &self.resources.topic_errors
    }

    pub fn resources(&self) -> &SceneResources {
        &self.resources
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}
