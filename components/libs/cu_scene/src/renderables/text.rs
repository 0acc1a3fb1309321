use crate::context::SceneContext;
use crate::events::SceneEvent;
use cu_viz_payloads::Marker;

/// TEXT_VIEW_FACING marker.
///
/// The text itself is drawn by the host as a label overlay; this only tells it
/// when the label shows up, changes or goes away.
#[derive(Debug)]
pub struct RenderableText {
    label_id: String,
    shown: bool,
}

impl RenderableText {
    pub fn new(label_id: String, marker: &Marker, ctx: &mut SceneContext) -> Self {
        let mut text = Self {
            label_id,
            shown: false,
        };
        text.sync_label(None, marker, ctx);
        text
    }

    pub fn update(&mut self, prev: &Marker, marker: &Marker, ctx: &mut SceneContext) {
        self.sync_label(Some(prev), marker, ctx);
    }

    pub fn dispose(self, ctx: &mut SceneContext) {
        if self.shown {
            ctx.emit(SceneEvent::RemoveLabel {
                label_id: self.label_id,
            });
        }
    }

    fn sync_label(&mut self, prev: Option<&Marker>, marker: &Marker, ctx: &mut SceneContext) {
        if marker.text.is_empty() {
            if self.shown {
                self.shown = false;
                ctx.emit(SceneEvent::RemoveLabel {
                    label_id: self.label_id.clone(),
                });
            }
            return;
        }

        let changed = prev.map_or(true, |prev| {
            prev.text != marker.text || prev.color != marker.color || prev.scale != marker.scale
        });
        if !self.shown || changed {
            self.shown = true;
            ctx.emit(SceneEvent::ShowLabel {
                label_id: self.label_id.clone(),
                marker: Box::new(marker.clone()),
            });
        }
    }

    pub fn label_id(&self) -> &str {
        &self.label_id
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }
}
