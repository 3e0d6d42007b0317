//! Error taxonomy for photoblock assembly.
//!
//! Structural document errors (`MissingField`, `ListLengthMismatch`) abort
//! the enclosing load; no partial block is ever returned. Sensor-model
//! provider failures surface as `ModelResolution` from the operation that
//! triggered them and leave the rest of the block intact.

use std::path::PathBuf;

use thiserror::Error;

use crate::sensor::SensorModelError;

#[derive(Debug, Error)]
pub enum BlockError {
    /// A required document field is absent (or carries the wrong type).
    #[error("document missing required field `{field}`")]
    MissingField { field: &'static str },

    /// Two parallel lists that must pair index-for-index have different lengths.
    #[error("`{left}` has {left_len} entries but `{right}` has {right_len}")]
    ListLengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    /// A batch model assignment is not order-synchronized with the image list.
    #[error(
        "model list not synchronized with image list at index {index}: \
         image `{image_id}` vs model `{model_id}`"
    )]
    IdentifierMismatch {
        index: usize,
        image_id: String,
        model_id: String,
    },

    /// The sensor model provider failed to produce a usable handle.
    #[error("failed to resolve sensor model for `{}`", .filename.display())]
    ModelResolution {
        filename: PathBuf,
        #[source]
        source: SensorModelError,
    },
}
