use crate::events::SceneEvent;
use crate::geometry::{DetailLevel, GeometryCache};
use crate::materials::MaterialCache;
use crate::model_cache::ModelCache;
use crate::topic_errors::TopicErrors;
use cu_viz_payloads::MarkerKey;
use std::collections::HashMap;

/// Scene services lent to renderables while they are built, updated or disposed.
pub struct SceneContext<'a> {
    pub materials: &'a mut MaterialCache,
    pub geometries: &'a mut GeometryCache,
    pub models: &'a mut ModelCache,
    pub topic_errors: &'a mut TopicErrors,
    pub events: &'a mut Vec<SceneEvent>,
    /// Live renderables by marker id
    pub renderables: &'a mut HashMap<String, MarkerKey>,
    pub detail_level: DetailLevel,
}

impl SceneContext<'_> {
    /// Record an error against `topic` and let the host know about it.
    pub fn report_error(&mut self, topic: &str, error_id: &str, message: impl Into<String>) {
        let message = message.into();
        self.topic_errors.add(topic, error_id, &message);
        self.events.push(SceneEvent::TopicError {
            topic: topic.to_string(),
            error_id: error_id.to_string(),
            message,
        });
    }

    pub fn emit(&mut self, event: SceneEvent) {
        self.events.push(event);
    }
}

/// Owned storage behind a [`SceneContext`], handy for driving renderables
/// without a full scene.
#[derive(Default)]
pub struct SceneResources {
    pub materials: MaterialCache,
    pub geometries: GeometryCache,
    pub models: ModelCache,
    pub topic_errors: TopicErrors,
    pub events: Vec<SceneEvent>,
    pub renderables: HashMap<String, MarkerKey>,
    pub detail_level: DetailLevel,
}

impl SceneResources {
    pub fn new(models: ModelCache, detail_level: DetailLevel) -> Self {
        Self {
            models,
            detail_level,
            ..Default::default()
        }
    }

    pub fn context(&mut self) -> SceneContext<'_> {
        SceneContext {
            materials: &mut self.materials,
            geometries: &mut self.geometries,
            models: &mut self.models,
            topic_errors: &mut self.topic_errors,
            events: &mut self.events,
            renderables: &mut self.renderables,
            detail_level: self.detail_level,
        }
    }
}
