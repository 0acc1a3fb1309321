use log::warn;
use std::collections::BTreeMap;

pub const INVALID_CUBE_LIST: &str = "INVALID_CUBE_LIST";
pub const INVALID_LINE_LIST: &str = "INVALID_LINE_LIST";
pub const INVALID_LINE_STRIP: &str = "INVALID_LINE_STRIP";
pub const INVALID_MARKER_ACTION: &str = "INVALID_MARKER_ACTION";
pub const INVALID_MARKER_TYPE: &str = "INVALID_MARKER_TYPE";
pub const INVALID_POINTS_LIST: &str = "INVALID_POINTS_LIST";
pub const INVALID_SPHERE_LIST: &str = "INVALID_SPHERE_LIST";
pub const INVALID_TRIANGLE_LIST: &str = "INVALID_TRIANGLE_LIST";
pub const MESH_FETCH_FAILED: &str = "MESH_FETCH_FAILED";

/// Last message of every error code, per topic.
#[derive(Clone, Debug, Default)]
pub struct TopicErrors {
    errors: BTreeMap<String, BTreeMap<String, String>>,
}

impl TopicErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, topic: &str, error_id: &str, message: &str) {
        self.errors
            .entry(topic.to_string())
            .or_default()
            .insert(error_id.to_string(), message.to_string());
        warn!("[TopicError][{topic}] {error_id}: {message}");
    }

    pub fn remove(&mut self, topic: &str, error_id: &str) {
        if let Some(errors) = self.errors.get_mut(topic) {
            errors.remove(error_id);
        }
    }

    pub fn clear_topic(&mut self, topic: &str) {
        self.errors.remove(topic);
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn get(&self, topic: &str, error_id: &str) -> Option<&str> {
        self.errors
            .get(topic)
            .and_then(|errors| errors.get(error_id))
            .map(String::as_str)
    }

    pub fn has_error(&self, topic: &str, error_id: &str) -> bool {
        self.get(topic, error_id).is_some()
    }

    /// Errors of `topic` as (code, message) pairs, sorted by code.
    pub fn topic(&self, topic: &str) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .get(topic)
            .into_iter()
            .flat_map(|errors| errors.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Total number of recorded errors.
    pub fn len(&self) -> usize {
        self.errors.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
