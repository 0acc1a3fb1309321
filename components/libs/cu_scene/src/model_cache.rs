//! Mesh resources, loaded once per URL.
//!
//! Fetching and decoding a model is up to a [`ModelLoader`]. Loaders answer
//! through a channel, possibly from another thread; answers are collected by
//! [`ModelCache::poll`] on the scene thread and handed back to the markers that
//! asked for them.

use crate::color::LinearRgba;
use crate::error::{SceneError, SceneResult};
use cu_viz_payloads::MarkerKey;
use glam::{DQuat, Vec3};
use log::debug;
use std::collections::HashMap;
use std::f64::consts::FRAC_PI_2;
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub struct ModelMaterial {
    pub name: String,
    pub base_color: LinearRgba,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    /// Material embedded in the model file, if any
    pub material: Option<ModelMaterial>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    pub meshes: Vec<ModelMesh>,
    /// Orientation of the model root
    pub orientation: DQuat,
}

impl Model {
    pub fn new(meshes: Vec<ModelMesh>) -> Self {
        Self {
            meshes,
            orientation: DQuat::IDENTITY,
        }
    }
}

type ModelAnswer = (String, SceneResult<Model>);

/// One shot answer channel for a model request.
pub struct ModelResponder {
    url: String,
    sender: Sender<ModelAnswer>,
}

impl ModelResponder {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn respond(self, result: SceneResult<Model>) {
        // the cache owns the receiver, a send can only fail once it is gone
        if self.sender.send((self.url, result)).is_err() {
            debug!("Model cache dropped before a load completed");
        }
    }
}

/// Fetches and decodes models.
pub trait ModelLoader {
    /// Start loading `url`. The answer goes through `responder`, either right
    /// away or later from any thread.
    fn load(&self, url: &str, responder: ModelResponder);
}

/// Loader of scenes without mesh support: every load fails.
#[derive(Debug, Default)]
pub struct NullModelLoader;

impl ModelLoader for NullModelLoader {
    fn load(&self, url: &str, responder: ModelResponder) {
        responder.respond(Err(SceneError::ModelLoad {
            url: url.to_string(),
            message: "no model loader configured".to_string(),
        }));
    }
}

/// Runs a loading function inline. The answer is still only seen at the next poll.
pub struct BlockingModelLoader<F> {
    load_fn: F,
}

impl<F> BlockingModelLoader<F>
where
    F: Fn(&str) -> SceneResult<Model>,
{
    pub fn new(load_fn: F) -> Self {
        Self { load_fn }
    }
}

impl<F> ModelLoader for BlockingModelLoader<F>
where
    F: Fn(&str) -> SceneResult<Model>,
{
    fn load(&self, url: &str, responder: ModelResponder) {
        responder.respond((self.load_fn)(url));
    }
}

/// Runs a loading function on a thread per request.
pub struct ThreadedModelLoader<F> {
    load_fn: Arc<F>,
}

impl<F> ThreadedModelLoader<F>
where
    F: Fn(&str) -> SceneResult<Model> + Send + Sync + 'static,
{
    pub fn new(load_fn: F) -> Self {
        Self {
            load_fn: Arc::new(load_fn),
        }
    }
}

impl<F> ModelLoader for ThreadedModelLoader<F>
where
    F: Fn(&str) -> SceneResult<Model> + Send + Sync + 'static,
{
    fn load(&self, url: &str, responder: ModelResponder) {
        let load_fn = self.load_fn.clone();
        let url = url.to_string();
        std::thread::spawn(move || responder.respond(load_fn(&url)));
    }
}

/// Identifies the marker waiting for a model and which of its requests it is.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelTicket {
    pub key: MarkerKey,
    pub generation: u64,
}

#[derive(Clone, Debug)]
pub enum ModelOutcome {
    Loaded(Rc<Model>),
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct ModelDelivery {
    pub ticket: ModelTicket,
    pub url: String,
    pub outcome: ModelOutcome,
}

#[derive(Clone, Debug)]
pub enum ModelRequest {
    /// Already resolved. `None` is a cached failure.
    Ready(Option<Rc<Model>>),
    /// Will be part of a later [`ModelCache::poll`].
    Pending,
}

enum ModelSlot {
    Pending(Vec<ModelTicket>),
    Loaded(Rc<Model>),
    Failed,
}

/// Models by URL. Failures are cached too, a failed URL is not fetched again.
pub struct ModelCache {
    loader: Box<dyn ModelLoader>,
    models: HashMap<String, ModelSlot>,
    sender: Sender<ModelAnswer>,
    receiver: Receiver<ModelAnswer>,
    generation: u64,
}

impl ModelCache {
    pub fn new(loader: Box<dyn ModelLoader>) -> Self {
        let (sender, receiver) = channel();
        Self {
            loader,
            models: HashMap::new(),
            sender,
            receiver,
            generation: 0,
        }
    }

    /// Generation for a new [`ModelTicket`]. Never handed out twice by one
    /// cache, so a renderable rebuilt under the same key cannot be confused
    /// with the one it replaced.
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn request(&mut self, url: &str, ticket: ModelTicket) -> ModelRequest {
        match self.models.get_mut(url) {
            Some(ModelSlot::Loaded(model)) => return ModelRequest::Ready(Some(model.clone())),
            Some(ModelSlot::Failed) => return ModelRequest::Ready(None),
            Some(ModelSlot::Pending(waiters)) => {
                waiters.push(ticket);
                return ModelRequest::Pending;
            }
            None => {}
        }

        debug!("Loading model {url}");
        self.models
            .insert(url.to_string(), ModelSlot::Pending(vec![ticket]));
        self.loader.load(
            url,
            ModelResponder {
                url: url.to_string(),
                sender: self.sender.clone(),
            },
        );
        ModelRequest::Pending
    }

    /// Collect the loads completed since the last poll, one delivery per
    /// waiting ticket.
    pub fn poll(&mut self) -> Vec<ModelDelivery> {
        let mut deliveries = Vec::new();
        while let Ok((url, result)) = self.receiver.try_recv() {
            let waiters = match self.models.remove(&url) {
                Some(ModelSlot::Pending(waiters)) => waiters,
                _ => Vec::new(),
            };

            let (slot, outcome) = match result {
                Ok(mut model) => {
                    // Y-up to Z-up
                    model.orientation = DQuat::from_rotation_x(FRAC_PI_2) * model.orientation;
                    let model = Rc::new(model);
                    (
                        ModelSlot::Loaded(model.clone()),
                        ModelOutcome::Loaded(model),
                    )
                }
                Err(SceneError::ModelLoad { message, .. }) => {
                    (ModelSlot::Failed, ModelOutcome::Failed(message))
                }
                Err(e) => (ModelSlot::Failed, ModelOutcome::Failed(e.to_string())),
            };
            self.models.insert(url.clone(), slot);

            deliveries.extend(waiters.into_iter().map(|ticket| ModelDelivery {
                ticket,
                url: url.clone(),
                outcome: outcome.clone(),
            }));
        }
        deliveries
    }

    pub fn get(&self, url: &str) -> Option<Rc<Model>> {
        match self.models.get(url) {
            Some(ModelSlot::Loaded(model)) => Some(model.clone()),
            _ => None,
        }
    }

    pub fn is_pending(&self, url: &str) -> bool {
        matches!(self.models.get(url), Some(ModelSlot::Pending(_)))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new(Box::new(NullModelLoader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec3;
    use std::cell::Cell;
    use std::time::Duration;

    fn triangle() -> Model {
        Model::new(vec![ModelMesh {
            name: "tri".to_string(),
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            indices: vec![0, 1, 2],
            material: None,
        }])
    }

    fn ticket(id: i32, generation: u64) -> ModelTicket {
        ModelTicket {
            key: MarkerKey::new("/markers", "", id),
            generation,
        }
    }

    struct CountingLoader {
        calls: Rc<Cell<usize>>,
    }

    impl ModelLoader for CountingLoader {
        fn load(&self, url: &str, responder: ModelResponder) {
            self.calls.set(self.calls.get() + 1);
            if url.ends_with(".glb") {
                responder.respond(Ok(triangle()));
            } else {
                responder.respond(Err(SceneError::ModelLoad {
                    url: url.to_string(),
                    message: "404".to_string(),
                }));
            }
        }
    }

    #[test]
    fn test_load_once_and_deliver_to_all_waiters() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = ModelCache::new(Box::new(CountingLoader {
            calls: calls.clone(),
        }));

        assert!(matches!(cache.request("a.glb", ticket(1, 1)), ModelRequest::Pending));
        assert!(matches!(cache.request("a.glb", ticket(2, 1)), ModelRequest::Pending));
        assert_eq!(calls.get(), 1);
        assert!(cache.is_pending("a.glb"));

        let deliveries = cache.poll();
        assert_eq!(deliveries.len(), 2);
        assert!(deliveries
            .iter()
            .all(|d| matches!(d.outcome, ModelOutcome::Loaded(_))));

        // later requests are served from the cache
        match cache.request("a.glb", ticket(3, 1)) {
            ModelRequest::Ready(Some(model)) => {
                let up = model.orientation * DVec3::Y;
                assert_relative_eq!(up.z, 1.0, epsilon = 1e-12);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(calls.get(), 1);
        assert!(cache.poll().is_empty());
    }

    #[test]
    fn test_failure_is_cached() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = ModelCache::new(Box::new(CountingLoader {
            calls: calls.clone(),
        }));

        cache.request("missing.dae", ticket(1, 1));
        let deliveries = cache.poll();
        assert_eq!(deliveries.len(), 1);
        match &deliveries[0].outcome {
            ModelOutcome::Failed(message) => assert_eq!(message, "404"),
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            cache.request("missing.dae", ticket(1, 2)),
            ModelRequest::Ready(None)
        ));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_threaded_loader() {
        let mut cache = ModelCache::new(Box::new(ThreadedModelLoader::new(|_url: &str| {
            Ok(triangle())
        })));
        cache.request("remote.glb", ticket(7, 3));

        let mut deliveries = Vec::new();
        for _ in 0..400 {
            deliveries = cache.poll();
            if !deliveries.is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].ticket, ticket(7, 3));
        assert!(cache.get("remote.glb").is_some());
    }
}
