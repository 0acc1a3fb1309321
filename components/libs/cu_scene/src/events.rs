use cu_transform::TfTime;
use cu_viz_payloads::Marker;

/// Notifications emitted by a [`crate::Scene`] for its host, in emission order.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneEvent {
    /// A tick is starting.
    StartFrame { current_time: TfTime },
    /// Every pose of the tick has been resolved.
    EndFrame { current_time: TfTime },
    /// A frame appeared in the transform tree or changed parent.
    TransformTreeUpdated,
    /// A text marker wants its label drawn, or redrawn with new content.
    ShowLabel { label_id: String, marker: Box<Marker> },
    /// The label of a text marker must go away.
    RemoveLabel { label_id: String },
    /// A marker of `topic` could not be built.
    TopicError {
        topic: String,
        error_id: String,
        message: String,
    },
}
