use crate::context::SceneContext;
use crate::renderables::RenderableMarker;
use crate::topic_errors::{
    INVALID_CUBE_LIST, INVALID_LINE_LIST, INVALID_LINE_STRIP, INVALID_MARKER_ACTION,
    INVALID_MARKER_TYPE, INVALID_POINTS_LIST, INVALID_SPHERE_LIST, INVALID_TRIANGLE_LIST,
};
use cu_transform::{TfDuration, TfTime, TransformTree};
use cu_viz_payloads::{Marker, MarkerAction, MarkerKey, MarkerType};
use log::debug;
use std::collections::HashMap;

/// Check the point count constraints of `kind`, returning the error code and
/// message of the first violated one.
pub fn validate_marker(kind: MarkerType, marker: &Marker) -> Result<(), (&'static str, &'static str)> {
    let count = marker.points.len();
    match kind {
        MarkerType::LineStrip if count < 2 => Err((
            INVALID_LINE_STRIP,
            "LINE_STRIP marker has fewer than 2 points",
        )),
        MarkerType::LineList if count < 2 => Err((
            INVALID_LINE_LIST,
            "LINE_LIST marker has fewer than 2 points",
        )),
        MarkerType::LineList if count % 2 != 0 => Err((
            INVALID_LINE_LIST,
            "LINE_LIST marker has an odd number of points",
        )),
        MarkerType::CubeList if count == 0 => {
            Err((INVALID_CUBE_LIST, "CUBE_LIST marker has no points"))
        }
        MarkerType::SphereList if count == 0 => {
            Err((INVALID_SPHERE_LIST, "SPHERE_LIST marker has no points"))
        }
        MarkerType::Points if count == 0 => Err((INVALID_POINTS_LIST, "POINTS marker has no points")),
        MarkerType::TriangleList if count == 0 => Err((
            INVALID_TRIANGLE_LIST,
            "TRIANGLE_LIST marker has no points",
        )),
        MarkerType::TriangleList if count % 3 != 0 => Err((
            INVALID_TRIANGLE_LIST,
            "TRIANGLE_LIST marker point count is not a multiple of 3",
        )),
        _ => Ok(()),
    }
}

/// Renderables of one topic, by namespace then id.
#[derive(Debug)]
pub struct TopicMarkers {
    topic: String,
    namespaces: HashMap<String, HashMap<i32, RenderableMarker>>,
}

impl TopicMarkers {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            namespaces: HashMap::new(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn add_marker_message(&mut self, marker: Marker, ctx: &mut SceneContext) {
        match marker.lifecycle() {
            Ok(MarkerAction::Add) => self.add_or_update(marker, ctx),
            Ok(MarkerAction::Delete) => self.delete(&marker.ns, marker.id, ctx),
            Ok(MarkerAction::DeleteAll) => self.delete_all(ctx),
            Err(action) => ctx.report_error(
                &self.topic,
                INVALID_MARKER_ACTION,
                format!("Invalid marker action {action}"),
            ),
        }
    }

    fn add_or_update(&mut self, marker: Marker, ctx: &mut SceneContext) {
        let kind = match marker.kind() {
            Ok(kind) => kind,
            Err(kind) => {
                ctx.report_error(
                    &self.topic,
                    INVALID_MARKER_TYPE,
                    format!("Invalid marker type {kind}"),
                );
                return;
            }
        };
        if let Err((error_id, message)) = validate_marker(kind, &marker) {
            ctx.report_error(&self.topic, error_id, message);
            return;
        }

        let id = marker.id;
        let ns = self.namespaces.entry(marker.ns.clone()).or_default();
        if let Some(renderable) = ns.get_mut(&id) {
            if renderable.kind() == kind {
                renderable.update(marker, ctx);
                return;
            }
        }
        if let Some(stale) = ns.remove(&id) {
            debug!("Marker {} changed type to {kind:?}", stale.name());
            stale.dispose(ctx);
        }

        let key = MarkerKey::new(self.topic.as_str(), marker.ns.as_str(), id);
        ns.insert(id, RenderableMarker::new(key, kind, marker, ctx));
    }

    pub fn delete(&mut self, ns: &str, id: i32, ctx: &mut SceneContext) {
        let Some(namespace) = self.namespaces.get_mut(ns) else {
            return;
        };
        if let Some(renderable) = namespace.remove(&id) {
            renderable.dispose(ctx);
        }
        if namespace.is_empty() {
            self.namespaces.remove(ns);
        }
    }

    pub fn delete_all(&mut self, ctx: &mut SceneContext) {
        for (_, namespace) in self.namespaces.drain() {
            for (_, renderable) in namespace {
                renderable.dispose(ctx);
            }
        }
    }

    /// Place every renderable of the topic for `current_time`.
    pub fn start_frame(
        &mut self,
        tree: &TransformTree,
        render_frame_id: &str,
        fixed_frame_id: &str,
        current_time: TfTime,
        max_delta: Option<TfDuration>,
    ) {
        for renderable in self.namespaces.values_mut().flat_map(HashMap::values_mut) {
            renderable.update_pose(tree, render_frame_id, fixed_frame_id, current_time, max_delta);
        }
    }

    pub fn get(&self, ns: &str, id: i32) -> Option<&RenderableMarker> {
        self.namespaces.get(ns).and_then(|namespace| namespace.get(&id))
    }

    pub fn get_mut(&mut self, ns: &str, id: i32) -> Option<&mut RenderableMarker> {
        self.namespaces
            .get_mut(ns)
            .and_then(|namespace| namespace.get_mut(&id))
    }

    pub fn renderables(&self) -> impl Iterator<Item = &RenderableMarker> {
        self.namespaces.values().flat_map(HashMap::values)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    /// Number of live renderables.
    pub fn len(&self) -> usize {
        self.namespaces.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
