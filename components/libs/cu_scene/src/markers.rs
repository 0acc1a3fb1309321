use crate::context::SceneContext;
use crate::model_cache::ModelDelivery;
use crate::renderables::RenderableMarker;
use crate::topic_markers::TopicMarkers;
use cu_transform::{TfDuration, TfTime, TransformTree};
use cu_viz_payloads::{Marker, MarkerKey};
use log::{debug, info};
use std::collections::BTreeMap;

/// Every marker renderable of the scene, grouped by topic.
#[derive(Debug, Default)]
pub struct Markers {
    topics: BTreeMap<String, TopicMarkers>,
}

impl Markers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a marker received on `topic` to its topic registry.
    pub fn add_marker_message(&mut self, topic: &str, marker: Marker, ctx: &mut SceneContext) {
        if !self.topics.contains_key(topic) {
            debug!("New marker topic {topic}");
            self.topics
                .insert(topic.to_string(), TopicMarkers::new(topic));
        }
        if let Some(topic_markers) = self.topics.get_mut(topic) {
            topic_markers.add_marker_message(marker, ctx);
        }
    }

    /// Place every renderable for `current_time`. Nothing moves until both
    /// the render and the fixed frame are known.
    pub fn start_frame(
        &mut self,
        tree: &TransformTree,
        render_frame_id: &str,
        fixed_frame_id: &str,
        current_time: TfTime,
        max_delta: Option<TfDuration>,
    ) {
        if render_frame_id.is_empty() || fixed_frame_id.is_empty() {
            return;
        }
        for topic_markers in self.topics.values_mut() {
            topic_markers.start_frame(tree, render_frame_id, fixed_frame_id, current_time, max_delta);
        }
    }

    /// Route completed model loads to their renderables. Loads for
    /// renderables deleted in the meantime are dropped.
    pub fn apply_model_deliveries(&mut self, deliveries: &[ModelDelivery], ctx: &mut SceneContext) {
        for delivery in deliveries {
            match self.get_mut(&delivery.ticket.key) {
                Some(renderable) => {
                    renderable.apply_model_delivery(delivery, ctx);
                }
                None => debug!(
                    "Dropping model {} for deleted marker {}",
                    delivery.url, delivery.ticket.key
                ),
            }
        }
    }

    pub fn get(&self, key: &MarkerKey) -> Option<&RenderableMarker> {
        self.topics
            .get(&key.topic)
            .and_then(|topic| topic.get(&key.ns, key.id))
    }

    pub fn get_mut(&mut self, key: &MarkerKey) -> Option<&mut RenderableMarker> {
        self.topics
            .get_mut(&key.topic)
            .and_then(|topic| topic.get_mut(&key.ns, key.id))
    }

    pub fn topic(&self, topic: &str) -> Option<&TopicMarkers> {
        self.topics.get(topic)
    }

    pub fn topics(&self) -> impl Iterator<Item = &TopicMarkers> {
        self.topics.values()
    }

    pub fn renderables(&self) -> impl Iterator<Item = &RenderableMarker> {
        self.topics.values().flat_map(TopicMarkers::renderables)
    }

    /// Drop every renderable of `topic` along with its errors.
    pub fn remove_topic(&mut self, topic: &str, ctx: &mut SceneContext) {
        if let Some(mut topic_markers) = self.topics.remove(topic) {
            info!("Removing marker topic {topic}");
            topic_markers.delete_all(ctx);
            ctx.topic_errors.clear_topic(topic);
        }
    }

    pub fn len(&self) -> usize {
        self.topics.values().map(TopicMarkers::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dispose(&mut self, ctx: &mut SceneContext) {
        for (_, mut topic_markers) in std::mem::take(&mut self.topics) {
            topic_markers.delete_all(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SceneResources;
    use crate::error::SceneError;
    use crate::geometry::DetailLevel;
    use crate::model_cache::{BlockingModelLoader, Model, ModelCache};
    use crate::topic_errors::INVALID_CUBE_LIST;
    use cu_transform::Transform;
    use cu_viz_payloads::{Header, MarkerType, RosTime, Vector3};

    fn sphere(ns: &str, id: i32) -> Marker {
        Marker {
            header: Header::new("base_link", RosTime::new(0, 0)),
            ns: ns.to_string(),
            id,
            marker_type: MarkerType::Sphere as i32,
            scale: Vector3::new(1.0, 1.0, 1.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_topics_are_independent() {
        let mut resources = SceneResources::default();
        let mut markers = Markers::new();
        markers.add_marker_message("/a", sphere("", 1), &mut resources.context());
        markers.add_marker_message("/b", sphere("", 1), &mut resources.context());
        assert_eq!(markers.len(), 2);
        assert_eq!(markers.topics().count(), 2);

        let mut delete_all = sphere("", 0);
        delete_all.action = cu_viz_payloads::MarkerAction::DeleteAll as i32;
        markers.add_marker_message("/a", delete_all, &mut resources.context());
        assert_eq!(markers.len(), 1);
        assert!(markers.get(&MarkerKey::new("/b", "", 1)).is_some());
        assert!(markers.get(&MarkerKey::new("/a", "", 1)).is_none());
    }

    #[test]
    fn test_start_frame_needs_both_frames() {
        let mut resources = SceneResources::default();
        let mut tree = TransformTree::new();
        tree.add_transform("base_link", "map", TfDuration(0), Transform::identity());
        let mut markers = Markers::new();
        markers.add_marker_message("/a", sphere("", 1), &mut resources.context());
        let key = MarkerKey::new("/a", "", 1);

        markers.start_frame(&tree, "", "map", TfDuration(0), None);
        assert!(!markers.get(&key).unwrap().is_visible());

        markers.start_frame(&tree, "map", "map", TfDuration(0), None);
        assert!(markers.get(&key).unwrap().is_visible());
    }

    #[test]
    fn test_remove_topic_clears_errors() {
        let mut resources = SceneResources::default();
        let mut markers = Markers::new();
        let empty_list = Marker {
            marker_type: MarkerType::CubeList as i32,
            ..sphere("", 2)
        };
        markers.add_marker_message("/a", sphere("", 1), &mut resources.context());
        markers.add_marker_message("/a", empty_list, &mut resources.context());
        assert!(resources.topic_errors.has_error("/a", INVALID_CUBE_LIST));

        markers.remove_topic("/a", &mut resources.context());
        assert!(markers.is_empty());
        assert!(resources.topic_errors.is_empty());
        assert!(resources.materials.is_empty());
    }

    #[test]
    fn test_delivery_for_deleted_marker_is_dropped() {
        let loader = BlockingModelLoader::new(|_: &str| Ok::<_, SceneError>(Model::new(vec![])));
        let mut resources =
            SceneResources::new(ModelCache::new(Box::new(loader)), DetailLevel::Medium);
        let mut markers = Markers::new();
        let mesh = Marker {
            marker_type: MarkerType::MeshResource as i32,
            mesh_resource: "package://robot/base.dae".to_string(),
            ..sphere("", 5)
        };
        markers.add_marker_message("/meshes", mesh.clone(), &mut resources.context());

        let mut delete = mesh;
        delete.action = cu_viz_payloads::MarkerAction::Delete as i32;
        markers.add_marker_message("/meshes", delete, &mut resources.context());

        let deliveries = resources.models.poll();
        assert_eq!(deliveries.len(), 1);
        markers.apply_model_deliveries(&deliveries, &mut resources.context());
        assert!(markers.is_empty());
        assert!(resources.events.is_empty());
    }
}
