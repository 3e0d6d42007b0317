//! Sensor model provider seam.
//!
//! The geometric sensor-model mathematics live behind an external service;
//! this layer only ever asks a model for its persisted state string and its
//! image identifier. Both sides of the seam are traits so the block assembly
//! code stays independent of any concrete provider (an RPC-backed service in
//! production, [`crate::synthetic`] in tests).

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Identifier a freshly built model reports when its source data carries no
/// image id. Exact-string sentinel; only this literal token means "unset".
pub const UNKNOWN_IDENTIFIER: &str = "UNKNOWN";

/// Opaque handle to an instantiated sensor model.
pub trait SensorModelHandle: std::fmt::Debug {
    /// Persisted state string; feeding it back through
    /// [`SensorModelProvider::create_from_state`] reconstructs the model.
    fn state(&self) -> String;

    /// The image identifier this model reports.
    fn identifier(&self) -> String;

    fn set_identifier(&mut self, identifier: &str);

    /// Deep copy behind the trait object.
    fn clone_box(&self) -> Box<dyn SensorModelHandle>;
}

impl Clone for Box<dyn SensorModelHandle> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Errors surfaced by a [`SensorModelProvider`].
#[derive(Debug, Error)]
pub enum SensorModelError {
    /// No plugin/model combination can handle the given image data.
    #[error("no sensor model available for `{}`", .filename.display())]
    Unsupported { filename: PathBuf },

    /// A persisted state (or support-data) string failed to parse.
    #[error("malformed sensor model state: {0}")]
    MalformedState(String),

    /// The underlying provider call itself failed.
    #[error("sensor model provider failed")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Factory for sensor model handles.
///
/// Calls are synchronous and opaque; timeout/retry policy, if any, belongs
/// to the provider implementation, not to this layer.
pub trait SensorModelProvider {
    /// Reconstruct a model from its persisted state string.
    fn create_from_state(&self, state: &str) -> Result<Box<dyn SensorModelHandle>, SensorModelError>;

    /// Build a model from image data on disk. An empty `model_name` hint
    /// (`None`) asks for the most accurate model available.
    fn create_from_file(
        &self,
        filename: &Path,
        model_name: Option<&str>,
        entry_index: u32,
    ) -> Result<Box<dyn SensorModelHandle>, SensorModelError>;

    /// Build a model from inline image support data.
    fn create_from_isd(
        &self,
        isd: &str,
        model_name: Option<&str>,
    ) -> Result<Box<dyn SensorModelHandle>, SensorModelError>;

    /// All `(plugin, model)` name pairs able to handle the given image data.
    fn list_supported_models(
        &self,
        filename: &Path,
    ) -> Result<Vec<(String, String)>, SensorModelError>;
}
