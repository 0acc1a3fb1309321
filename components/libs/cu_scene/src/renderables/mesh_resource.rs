use crate::context::SceneContext;
use crate::materials::{MarkerMaterial, MaterialRole};
use crate::model_cache::{Model, ModelDelivery, ModelOutcome, ModelRequest, ModelTicket};
use crate::topic_errors::MESH_FETCH_FAILED;
use cu_viz_payloads::{Marker, MarkerKey};
use log::debug;
use std::rc::Rc;

/// MESH_RESOURCE marker: a model fetched from `mesh_resource`, scaled by `scale`.
///
/// Every change of URL starts a new load generation, drawn from the scene wide
/// counter of the [`crate::model_cache::ModelCache`]. A load completing for
/// another generation or URL is dropped, the last requested URL always wins.
#[derive(Debug)]
pub struct RenderableMeshResource {
    url: String,
    generation: u64,
    model: Option<Rc<Model>>,
    material: MarkerMaterial,
    use_embedded_materials: bool,
}

impl RenderableMeshResource {
    pub fn new(key: &MarkerKey, marker: &Marker, ctx: &mut SceneContext) -> Self {
        let mut mesh = Self {
            url: String::new(),
            generation: 0,
            model: None,
            material: MarkerMaterial::acquire(MaterialRole::Standard, marker, ctx.materials),
            use_embedded_materials: marker.mesh_use_embedded_materials,
        };
        mesh.load(key, &marker.mesh_resource, ctx);
        mesh
    }

    pub fn update(&mut self, key: &MarkerKey, prev: &Marker, marker: &Marker, ctx: &mut SceneContext) {
        self.material.update(prev, marker, ctx.materials);
        self.use_embedded_materials = marker.mesh_use_embedded_materials;
        if marker.mesh_resource != prev.mesh_resource {
            self.load(key, &marker.mesh_resource, ctx);
        }
    }

    pub fn dispose(self, marker: &Marker, ctx: &mut SceneContext) {
        self.material.release(marker, ctx.materials);
    }

    fn load(&mut self, key: &MarkerKey, url: &str, ctx: &mut SceneContext) {
        self.generation = ctx.models.next_generation();
        self.url = url.to_string();
        self.model = None;

        let ticket = ModelTicket {
            key: key.clone(),
            generation: self.generation,
        };
        match ctx.models.request(url, ticket) {
            ModelRequest::Ready(model) => self.model = model,
            ModelRequest::Pending => {}
        }
    }

    /// Apply a completed load. Returns false when it was superseded.
    pub fn apply_delivery(
        &mut self,
        topic: &str,
        delivery: &ModelDelivery,
        ctx: &mut SceneContext,
    ) -> bool {
        if delivery.ticket.generation != self.generation || delivery.url != self.url {
            debug!(
                "Dropping model {} for {}, generation {} superseded by {}",
                delivery.url, delivery.ticket.key, delivery.ticket.generation, self.generation
            );
            return false;
        }
        match &delivery.outcome {
            ModelOutcome::Loaded(model) => self.model = Some(model.clone()),
            ModelOutcome::Failed(message) => ctx.report_error(
                topic,
                MESH_FETCH_FAILED,
                format!("Failed to load mesh resource from \"{}\": {message}", delivery.url),
            ),
        }
        true
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The loaded model, `None` while loading or after a failure.
    pub fn model(&self) -> Option<&Rc<Model>> {
        self.model.as_ref()
    }

    /// Material applied to every mesh of the model, unless the model's
    /// embedded materials are used.
    pub fn material(&self) -> &MarkerMaterial {
        &self.material
    }

    pub fn use_embedded_materials(&self) -> bool {
        self.use_embedded_materials
    }
}
