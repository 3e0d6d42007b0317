//! A single sensor image and its lazily resolved sensor model.

use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use crate::doc;
use crate::error::BlockError;
use crate::sensor::{SensorModelError, SensorModelHandle, SensorModelProvider, UNKNOWN_IDENTIFIER};

/// One image of a photoblock: file reference, active band, chosen model
/// name, and the cached sensor model handle.
///
/// The image id is unique within a block and, once a model is resolved, is
/// kept consistent with the model's own reported identifier: the model's id
/// wins unless it is the `"UNKNOWN"` sentinel, in which case the model
/// adopts the image's id.
#[derive(Debug, Clone)]
pub struct Image {
    image_id: String,
    filename: PathBuf,
    entry_index: u32,
    active_band: u32,
    /// Empty means "most accurate model available".
    model_name: String,
    model: Option<Box<dyn SensorModelHandle>>,
}

impl Image {
    pub fn new(
        image_id: impl Into<String>,
        filename: impl Into<PathBuf>,
        model_name: impl Into<String>,
        entry_index: u32,
        band: u32,
    ) -> Self {
        Self {
            image_id: image_id.into(),
            filename: filename.into(),
            entry_index,
            active_band: band,
            model_name: model_name.into(),
            model: None,
        }
    }

    /// Parse an image from its document node.
    ///
    /// `filename` is required. `entryIndex` defaults to 0 and `band` to 1
    /// when absent or non-integer; `imageId` and `sensorModel` are optional.
    /// The indexed-dialect aliases (`imageName`, `imageIndex`,
    /// `activeSensorModel`) are accepted and win when present.
    ///
    /// When the node carries a non-empty `modelState` the model is
    /// reconstructed from it immediately; a non-empty `imageSupportData`
    /// string is used the same way as a fallback. Otherwise resolution is
    /// deferred until [`Image::resolve_model`].
    ///
    /// # Errors
    ///
    /// `MissingField` when `filename` is absent; `ModelResolution` when a
    /// carried state or support-data string fails to reconstruct.
    pub fn from_document(
        node: &Value,
        provider: &dyn SensorModelProvider,
    ) -> Result<Self, BlockError> {
        let mut image = Self {
            image_id: String::new(),
            filename: PathBuf::from(doc::req_str(node, "filename")?),
            entry_index: 0,
            active_band: 1,
            model_name: String::new(),
            model: None,
        };

        if let Some(v) = doc::opt_u32(node, "entryIndex") {
            image.entry_index = v;
        }
        if let Some(v) = doc::opt_u32(node, "imageIndex") {
            image.entry_index = v;
        }
        if let Some(v) = doc::opt_u32(node, "band") {
            image.active_band = v;
        }
        if let Some(s) = doc::opt_str(node, "sensorModel") {
            image.model_name = s.to_owned();
        }
        if let Some(s) = doc::opt_str(node, "activeSensorModel") {
            image.model_name = s.to_owned();
        }
        if let Some(s) = doc::opt_str(node, "imageId") {
            image.image_id = s.to_owned();
        }
        if let Some(s) = doc::opt_str(node, "imageName") {
            image.image_id = s.to_owned();
        }

        let state = doc::opt_str(node, "modelState").unwrap_or("");
        let isd = doc::opt_str(node, "imageSupportData").unwrap_or("");
        if !state.is_empty() {
            let model = provider
                .create_from_state(state)
                .map_err(|source| image.resolution_error(source))?;
            image.adopt_model(model);
        } else if !isd.is_empty() {
            let hint = image.model_name_hint().map(str::to_owned);
            let model = provider
                .create_from_isd(isd, hint.as_deref())
                .map_err(|source| image.resolution_error(source))?;
            image.adopt_model(model);
        }

        Ok(image)
    }

    /// Emit the canonical document node.
    ///
    /// `sensorModel` is written only when a model name is set, `modelState`
    /// only when a model has been resolved. Saving never resolves a model as
    /// a side effect.
    pub fn to_document(&self) -> Value {
        let mut node = Map::new();
        node.insert("imageId".into(), json!(self.image_id));
        node.insert(
            "filename".into(),
            json!(self.filename.to_string_lossy().into_owned()),
        );
        node.insert("entryIndex".into(), json!(self.entry_index));

        if !self.model_name.is_empty() {
            node.insert("sensorModel".into(), json!(self.model_name));
        }
        if let Some(model) = &self.model {
            node.insert("modelState".into(), json!(model.state()));
        }

        Value::Object(node)
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn entry_index(&self) -> u32 {
        self.entry_index
    }

    pub fn active_band(&self) -> u32 {
        self.active_band
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// The cached model handle, if one has been resolved.
    pub fn model(&self) -> Option<&dyn SensorModelHandle> {
        self.model.as_deref()
    }

    /// Resolve the sensor model, instantiating it on first call.
    ///
    /// Idempotent: a cached handle is returned as-is. Otherwise the provider
    /// builds one from `(filename, model_name or default, entry_index)` and
    /// the image identifier is reconciled with the model's.
    ///
    /// # Errors
    ///
    /// `ModelResolution` wrapping the provider failure; the image stays
    /// unresolved and a later call may retry.
    pub fn resolve_model(
        &mut self,
        provider: &dyn SensorModelProvider,
    ) -> Result<&dyn SensorModelHandle, BlockError> {
        let model = match self.model.take() {
            Some(model) => model,
            None => {
                let hint = self.model_name_hint().map(str::to_owned);
                let mut fresh = provider
                    .create_from_file(&self.filename, hint.as_deref(), self.entry_index)
                    .map_err(|source| self.resolution_error(source))?;
                self.reconcile_identifier(fresh.as_mut());
                fresh
            }
        };
        Ok(&**self.model.insert(model))
    }

    /// Replace the cached model with one re-derived from `model`'s persisted
    /// state, so the image never aliases a caller-owned handle.
    ///
    /// # Errors
    ///
    /// `ModelResolution` when the provider cannot rebuild from the state;
    /// the previously cached model is kept in that case.
    pub fn replace_model(
        &mut self,
        provider: &dyn SensorModelProvider,
        model: &dyn SensorModelHandle,
    ) -> Result<(), BlockError> {
        let fresh = provider
            .create_from_state(&model.state())
            .map_err(|source| self.resolution_error(source))?;
        self.adopt_model(fresh);
        Ok(())
    }

    /// All `(plugin, model)` pairs compatible with this image's data,
    /// independent of any currently resolved model.
    ///
    /// # Errors
    ///
    /// `ModelResolution` when the provider query fails.
    pub fn available_models(
        &self,
        provider: &dyn SensorModelProvider,
    ) -> Result<Vec<(String, String)>, BlockError> {
        provider
            .list_supported_models(&self.filename)
            .map_err(|source| BlockError::ModelResolution {
                filename: self.filename.clone(),
                source,
            })
    }

    fn model_name_hint(&self) -> Option<&str> {
        (!self.model_name.is_empty()).then_some(self.model_name.as_str())
    }

    fn adopt_model(&mut self, mut model: Box<dyn SensorModelHandle>) {
        self.reconcile_identifier(model.as_mut());
        self.model = Some(model);
    }

    /// The model's reported id wins unless it is the `"UNKNOWN"` sentinel,
    /// in which case the model adopts the image's id.
    fn reconcile_identifier(&mut self, model: &mut dyn SensorModelHandle) {
        let id = model.identifier();
        if id == UNKNOWN_IDENTIFIER {
            model.set_identifier(&self.image_id);
        } else {
            self.image_id = id;
        }
    }

    fn resolution_error(&self, source: SensorModelError) -> BlockError {
        BlockError::ModelResolution {
            filename: self.filename.clone(),
            source,
        }
    }
}
