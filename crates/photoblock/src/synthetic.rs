//! Self-contained stand-in sensor models for tests and examples.
//!
//! [`GridModel`] maps pixels to ground through a flat-earth affine mapping
//! and persists itself as a JSON state string; [`SyntheticProvider`] hands
//! out registered models the way the production provider serves real ones.
//! No geometric fidelity is intended.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sensor::{
    SensorModelError, SensorModelHandle, SensorModelProvider, UNKNOWN_IDENTIFIER,
};

/// Model name reported by the synthetic plugin.
pub const GRID_MODEL_NAME: &str = "GRID";

const PLUGIN_NAME: &str = "synthetic";

/// Flat-earth sensor model: ground = origin + gsd * pixel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridModel {
    #[serde(default = "unknown_identifier")]
    identifier: String,
    origin: [f64; 2],
    gsd: f64,
}

fn unknown_identifier() -> String {
    UNKNOWN_IDENTIFIER.to_owned()
}

impl GridModel {
    pub fn new(identifier: impl Into<String>, origin: [f64; 2], gsd: f64) -> Self {
        Self {
            identifier: identifier.into(),
            origin,
            gsd,
        }
    }

    /// Ground coordinates of a pixel under the flat-earth mapping.
    pub fn ground_for_pixel(&self, column: f64, row: f64) -> [f64; 2] {
        [
            self.origin[0] + self.gsd * column,
            self.origin[1] + self.gsd * row,
        ]
    }
}

impl SensorModelHandle for GridModel {
    fn state(&self) -> String {
        serde_json::to_string(self).expect("GridModel state serializes")
    }

    fn identifier(&self) -> String {
        self.identifier.clone()
    }

    fn set_identifier(&mut self, identifier: &str) {
        self.identifier = identifier.to_owned();
    }

    fn clone_box(&self) -> Box<dyn SensorModelHandle> {
        Box::new(self.clone())
    }
}

/// Registry-backed provider: serves grid models for filenames registered
/// up front and reconstructs any grid model from its state string.
#[derive(Debug, Default)]
pub struct SyntheticProvider {
    registry: Vec<(PathBuf, GridModel)>,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `filename` resolvable to a copy of `model`.
    pub fn register(&mut self, filename: impl Into<PathBuf>, model: GridModel) {
        self.registry.push((filename.into(), model));
    }

    fn lookup(&self, filename: &Path) -> Option<&GridModel> {
        self.registry
            .iter()
            .find(|(name, _)| name == filename)
            .map(|(_, model)| model)
    }
}

impl SensorModelProvider for SyntheticProvider {
    fn create_from_state(
        &self,
        state: &str,
    ) -> Result<Box<dyn SensorModelHandle>, SensorModelError> {
        let model: GridModel = serde_json::from_str(state)
            .map_err(|e| SensorModelError::MalformedState(e.to_string()))?;
        Ok(Box::new(model))
    }

    fn create_from_file(
        &self,
        filename: &Path,
        model_name: Option<&str>,
        _entry_index: u32,
    ) -> Result<Box<dyn SensorModelHandle>, SensorModelError> {
        if model_name.is_some_and(|name| name != GRID_MODEL_NAME) {
            return Err(SensorModelError::Unsupported {
                filename: filename.to_path_buf(),
            });
        }
        let model = self
            .lookup(filename)
            .ok_or_else(|| SensorModelError::Unsupported {
                filename: filename.to_path_buf(),
            })?;
        Ok(model.clone_box())
    }

    fn create_from_isd(
        &self,
        isd: &str,
        _model_name: Option<&str>,
    ) -> Result<Box<dyn SensorModelHandle>, SensorModelError> {
        // Synthetic support data is the same JSON the state uses.
        self.create_from_state(isd)
    }

    fn list_supported_models(
        &self,
        filename: &Path,
    ) -> Result<Vec<(String, String)>, SensorModelError> {
        if self.lookup(filename).is_some() {
            Ok(vec![(PLUGIN_NAME.to_owned(), GRID_MODEL_NAME.to_owned())])
        } else {
            Ok(Vec::new())
        }
    }
}
