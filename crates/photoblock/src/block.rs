//! The photoblock aggregate: images, ground control points, tie points and
//! the joint covariance, with two-dialect document load and canonical save.

use serde_json::{json, Map, Value};

use crate::covariance::JointCovariance;
use crate::doc;
use crate::error::BlockError;
use crate::ground::GroundControlPoint;
use crate::image::Image;
use crate::resolver::{self, PointRecord};
use crate::sensor::{SensorModelHandle, SensorModelProvider};
use crate::tiepoint::{ImagePoint, TiePoint};

/// Metadata string fields shared by both dialects, in canonical emit order.
const METADATA_FIELDS: [&str; 8] = [
    "name",
    "type",
    "date",
    "description",
    "ownerProducer",
    "classification",
    "derivedFrom",
    "disseminationCtrls",
];

/// A photogrammetric block.
///
/// Owns exactly one ordered list each of images, ground control points and
/// tie points. Image list order is stable and is the canonical index space
/// other documents refer to (the indexed dialect's parallel state list in
/// particular). Cloning deep-copies every owned entity.
#[derive(Debug, Clone, Default)]
pub struct PhotoBlock {
    pub name: String,
    pub block_type: String,
    pub date: String,
    pub description: String,
    pub owner_producer: String,
    pub classification: String,
    pub derived_from: String,
    pub dissemination_ctrls: String,

    images: Vec<Image>,
    ground_points: Vec<GroundControlPoint>,
    tie_points: Vec<TiePoint>,
    joint_covariance: JointCovariance,
}

impl PhotoBlock {
    /// A new, blank block.
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Document load
    // ─────────────────────────────────────────────────────────────────────

    /// Load a block from either document dialect, auto-detected by the
    /// presence of a `header` member.
    ///
    /// Images are always materialized first; tie-point references are only
    /// rebound once the image list is complete and every identifier is
    /// final.
    ///
    /// # Errors
    ///
    /// Structural errors (`MissingField`, `ListLengthMismatch`) and model
    /// reconstruction failures abort the load; no partial block is
    /// returned. Unresolvable tie-point references are dropped silently.
    pub fn from_document(
        node: &Value,
        provider: &dyn SensorModelProvider,
    ) -> Result<Self, BlockError> {
        if node.get("header").is_some() {
            Self::load_indexed(node, provider)
        } else {
            Self::load_plain(node, provider)
        }
    }

    /// Plain dialect: self-describing `images`, `groundPoints` and
    /// `tiePoints` arrays, metadata at the top level.
    fn load_plain(node: &Value, provider: &dyn SensorModelProvider) -> Result<Self, BlockError> {
        let mut block = Self::new();
        block.load_metadata(node);

        if let Some(items) = doc::arr(node, "images") {
            for item in items {
                block.images.push(Image::from_document(item, provider)?);
            }
        }

        if let Some(items) = doc::arr(node, "groundPoints") {
            for item in items {
                block
                    .ground_points
                    .push(GroundControlPoint::from_document(item)?);
            }
        }

        let mut records = Vec::new();
        if let Some(items) = doc::arr(node, "tiePoints") {
            for item in items {
                let point_id = doc::req_str(item, "tiePointId")?;
                if let Some(points) = doc::arr(item, "imagePoints") {
                    for point in points {
                        records.push(PointRecord {
                            point_id: point_id.to_owned(),
                            image_point: ImagePoint::from_document(point)?,
                        });
                    }
                }
            }
        }
        block.tie_points = resolver::resolve_tie_points(records, &block.images);

        block.load_joint_covariance(node)?;
        Ok(block)
    }

    /// Indexed dialect: a `header` object with the metadata, `imageList`
    /// paired index-for-index with `sensorModelStateList`, `groundPointList`
    /// paired with an optional `crossCovarianceList`, and a flat
    /// `imagePointList` keyed by `pointId`.
    fn load_indexed(node: &Value, provider: &dyn SensorModelProvider) -> Result<Self, BlockError> {
        let mut block = Self::new();
        if let Some(header) = node.get("header") {
            block.load_metadata(header);
        }

        let image_docs = doc::arr(node, "imageList").unwrap_or(&[]);
        let states = doc::arr(node, "sensorModelStateList").unwrap_or(&[]);
        if image_docs.len() != states.len() {
            return Err(BlockError::ListLengthMismatch {
                left: "imageList",
                left_len: image_docs.len(),
                right: "sensorModelStateList",
                right_len: states.len(),
            });
        }
        for (image_doc, state) in image_docs.iter().zip(states) {
            // Graft the paired state onto the image node before parsing so
            // the image loader sees one self-describing document.
            let mut image_node = image_doc.clone();
            if let (Value::Object(map), Some(state)) = (&mut image_node, state.as_str()) {
                if !state.is_empty() {
                    map.insert("modelState".into(), Value::String(state.to_owned()));
                }
            }
            block.images.push(Image::from_document(&image_node, provider)?);
        }

        let ground_docs = doc::arr(node, "groundPointList").unwrap_or(&[]);
        let cross = doc::arr(node, "crossCovarianceList");
        if let Some(cross) = cross {
            if cross.len() != ground_docs.len() {
                return Err(BlockError::ListLengthMismatch {
                    left: "groundPointList",
                    left_len: ground_docs.len(),
                    right: "crossCovarianceList",
                    right_len: cross.len(),
                });
            }
        }
        for (i, ground_doc) in ground_docs.iter().enumerate() {
            let mut point = GroundControlPoint::from_document(ground_doc)?;
            if let Some(cross) = cross {
                point.cross_covariance = Some(cross[i].clone());
            }
            block.ground_points.push(point);
        }

        let mut records = Vec::new();
        if let Some(items) = doc::arr(node, "imagePointList") {
            for item in items {
                records.push(PointRecord {
                    point_id: doc::req_str(item, "pointId")?.to_owned(),
                    image_point: ImagePoint::from_document(item)?,
                });
            }
        }
        block.tie_points = resolver::resolve_tie_points(records, &block.images);

        block.load_joint_covariance(node)?;
        Ok(block)
    }

    fn load_metadata(&mut self, node: &Value) {
        let fields = [
            &mut self.name,
            &mut self.block_type,
            &mut self.date,
            &mut self.description,
            &mut self.owner_producer,
            &mut self.classification,
            &mut self.derived_from,
            &mut self.dissemination_ctrls,
        ];
        for (slot, key) in fields.into_iter().zip(METADATA_FIELDS) {
            if let Some(s) = doc::opt_str(node, key) {
                *slot = s.to_owned();
            }
        }
    }

    fn load_joint_covariance(&mut self, node: &Value) -> Result<(), BlockError> {
        if let Some(cov) = node.get("jointCovariance") {
            self.joint_covariance = JointCovariance::from_document(cov)?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Document save
    // ─────────────────────────────────────────────────────────────────────

    /// Emit the canonical (plain-dialect) document.
    ///
    /// Load is dialect-tolerant, save is not: every block serializes to the
    /// same single form regardless of what it was loaded from. Saving never
    /// resolves sensor models as a side effect.
    pub fn to_document(&self) -> Value {
        let mut root = Map::new();

        let values = [
            &self.name,
            &self.block_type,
            &self.date,
            &self.description,
            &self.owner_producer,
            &self.classification,
            &self.derived_from,
            &self.dissemination_ctrls,
        ];
        for (value, key) in values.into_iter().zip(METADATA_FIELDS) {
            if !value.is_empty() {
                root.insert(key.into(), json!(value));
            }
        }

        root.insert(
            "images".into(),
            Value::Array(self.images.iter().map(Image::to_document).collect()),
        );
        root.insert(
            "groundPoints".into(),
            Value::Array(
                self.ground_points
                    .iter()
                    .map(GroundControlPoint::to_document)
                    .collect(),
            ),
        );
        root.insert(
            "tiePoints".into(),
            Value::Array(self.tie_points.iter().map(TiePoint::to_document).collect()),
        );

        if !self.joint_covariance.is_empty() {
            root.insert("jointCovariance".into(), self.joint_covariance.to_document());
        }

        Value::Object(root)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Entity access
    // ─────────────────────────────────────────────────────────────────────

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn ground_points(&self) -> &[GroundControlPoint] {
        &self.ground_points
    }

    pub fn tie_points(&self) -> &[TiePoint] {
        &self.tie_points
    }

    pub fn image(&self, image_id: &str) -> Option<&Image> {
        self.images.iter().find(|i| i.image_id() == image_id)
    }

    pub fn image_mut(&mut self, image_id: &str) -> Option<&mut Image> {
        self.images.iter_mut().find(|i| i.image_id() == image_id)
    }

    pub fn ground_point(&self, gcp_id: &str) -> Option<&GroundControlPoint> {
        self.ground_points.iter().find(|g| g.gcp_id == gcp_id)
    }

    pub fn tie_point(&self, index: usize) -> Option<&TiePoint> {
        self.tie_points.get(index)
    }

    /// Append an image at the last position; returns its block index.
    pub fn add_image(&mut self, image: Image) -> usize {
        self.images.push(image);
        self.images.len() - 1
    }

    pub fn add_ground_point(&mut self, point: GroundControlPoint) -> usize {
        self.ground_points.push(point);
        self.ground_points.len() - 1
    }

    pub fn add_tie_point(&mut self, tie_point: TiePoint) -> usize {
        self.tie_points.push(tie_point);
        self.tie_points.len() - 1
    }

    pub fn add_tie_points(&mut self, tie_points: Vec<TiePoint>) {
        self.tie_points.extend(tie_points);
    }

    pub fn joint_covariance(&self) -> &JointCovariance {
        &self.joint_covariance
    }

    pub fn set_joint_covariance(&mut self, covariance: JointCovariance) {
        self.joint_covariance = covariance;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Batch sensor-model access
    // ─────────────────────────────────────────────────────────────────────

    /// Resolve and return one model handle per image, in image-list order.
    ///
    /// # Errors
    ///
    /// `ModelResolution` from the first image whose model cannot be built.
    pub fn models(
        &mut self,
        provider: &dyn SensorModelProvider,
    ) -> Result<Vec<&dyn SensorModelHandle>, BlockError> {
        for image in &mut self.images {
            image.resolve_model(provider)?;
        }
        Ok(self.images.iter().filter_map(Image::model).collect())
    }

    /// Assign a model to every image from an order-synchronized list.
    ///
    /// The whole list is validated before any image is touched: lengths
    /// must match and `models[i]` must report exactly `images[i]`'s
    /// identifier. Each accepted handle is applied through
    /// [`Image::replace_model`], so the block never aliases caller-owned
    /// handles.
    ///
    /// # Errors
    ///
    /// `ListLengthMismatch` or `IdentifierMismatch` before any mutation;
    /// `ModelResolution` if the provider fails during application.
    pub fn set_models(
        &mut self,
        provider: &dyn SensorModelProvider,
        models: &[Box<dyn SensorModelHandle>],
    ) -> Result<(), BlockError> {
        if models.len() != self.images.len() {
            return Err(BlockError::ListLengthMismatch {
                left: "images",
                left_len: self.images.len(),
                right: "models",
                right_len: models.len(),
            });
        }
        for (index, (image, model)) in self.images.iter().zip(models).enumerate() {
            if image.image_id() != model.identifier() {
                return Err(BlockError::IdentifierMismatch {
                    index,
                    image_id: image.image_id().to_owned(),
                    model_id: model.identifier(),
                });
            }
        }

        for (image, model) in self.images.iter_mut().zip(models) {
            image.replace_model(provider, model.as_ref())?;
        }
        Ok(())
    }
}
