//! Scene configuration, stored in RON.

use crate::error::{SceneError, SceneResult};
use crate::geometry::DetailLevel;
use cu_transform::{TfDuration, DEFAULT_HISTORY_CAPACITY};
use ron::extensions::Extensions;
use ron::Options;
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;

const DEFAULT_FRAME_ID: &str = "base_link";

/// Knobs of a [`crate::Scene`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Frame the scene is rendered in.
    pub render_frame_id: String,
    /// Frame considered static over time, used as common ancestor when resolving poses.
    pub fixed_frame_id: String,
    /// Tessellation of curved shapes.
    pub detail_level: DetailLevel,
    /// Maximum number of transforms kept per frame.
    pub max_transform_history: usize,
    /// Reject poses resolved from transforms further away in time than this.
    pub max_delta_ns: Option<u64>,
    /// Draw an axes triad for every known frame.
    pub show_frame_axes: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            render_frame_id: DEFAULT_FRAME_ID.to_string(),
            fixed_frame_id: DEFAULT_FRAME_ID.to_string(),
            detail_level: DetailLevel::default(),
            max_transform_history: DEFAULT_HISTORY_CAPACITY,
            max_delta_ns: None,
            show_frame_axes: true,
        }
    }
}

impl SceneConfig {
    fn get_options() -> Options {
        Options::default().with_default_extension(Extensions::IMPLICIT_SOME)
    }

    pub fn max_delta(&self) -> Option<TfDuration> {
        self.max_delta_ns.map(TfDuration)
    }

    pub fn serialize_ron(&self) -> SceneResult<String> {
        let pretty = ron::ser::PrettyConfig::default();
        Self::get_options()
            .to_string_pretty(self, pretty)
            .map_err(|e| SceneError::Config(e.to_string()))
    }

    pub fn deserialize_ron(ron: &str) -> SceneResult<Self> {
        Self::get_options()
            .from_str(ron)
            .map_err(|e| SceneError::Config(format!("Syntax Error in config: {e}")))
    }
}

/// Read a scene configuration from a file.
pub fn read_configuration(config_filename: impl AsRef<Path>) -> SceneResult<SceneConfig> {
    let config_content = read_to_string(config_filename.as_ref())?;
    SceneConfig::deserialize_ron(&config_content)
}
