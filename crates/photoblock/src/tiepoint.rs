//! Tie points: the same ground feature observed in two or more images.

use serde_json::{json, Map, Value};

use crate::doc;
use crate::error::BlockError;
use crate::Mat2;

/// One pixel observation of a tie point in a named image.
///
/// `image_id` is a weak reference by identifier; it is rebound to the
/// owning block's image list by the cross-reference resolver after all
/// images are loaded, never chased lazily.
#[derive(Debug, Clone)]
pub struct ImagePoint {
    pub image_id: String,
    pub column: f64,
    pub row: f64,
    /// 2x2 symmetric measurement covariance in pixels².
    pub covariance: Mat2,
}

impl ImagePoint {
    /// Build an observation from per-axis sigmas and a correlation
    /// coefficient:
    /// `cov = [[sc², rho·sc·sr], [rho·sc·sr, sr²]]`.
    pub fn from_sigmas(
        image_id: impl Into<String>,
        column: f64,
        row: f64,
        sigma_column: f64,
        sigma_row: f64,
        rho: f64,
    ) -> Self {
        let off_diag = rho * sigma_column * sigma_row;
        Self {
            image_id: image_id.into(),
            column,
            row,
            covariance: Mat2::new(
                sigma_column * sigma_column,
                off_diag,
                off_diag,
                sigma_row * sigma_row,
            ),
        }
    }

    pub fn sigma_column(&self) -> f64 {
        self.covariance[(0, 0)].sqrt()
    }

    pub fn sigma_row(&self) -> f64 {
        self.covariance[(1, 1)].sqrt()
    }

    /// Correlation coefficient; 0 when either sigma is degenerate.
    pub fn rho(&self) -> f64 {
        let denom = self.sigma_column() * self.sigma_row();
        if denom > 0.0 {
            self.covariance[(0, 1)] / denom
        } else {
            0.0
        }
    }

    /// Parse an observation node. `imageId`, `column` and `row` are
    /// required; sigmas default to 1.0 pixel and `rho` to 0.
    pub(crate) fn from_document(node: &Value) -> Result<Self, BlockError> {
        let image_id = doc::req_str(node, "imageId")?;
        let column = doc::req_f64(node, "column")?;
        let row = doc::req_f64(node, "row")?;
        let sigma_column = doc::opt_f64(node, "sigmaColumn").unwrap_or(1.0);
        let sigma_row = doc::opt_f64(node, "sigmaRow").unwrap_or(1.0);
        let rho = doc::opt_f64(node, "rho").unwrap_or(0.0);

        Ok(Self::from_sigmas(
            image_id,
            column,
            row,
            sigma_column,
            sigma_row,
            rho,
        ))
    }

    pub(crate) fn to_document(&self) -> Value {
        let mut node = Map::new();
        node.insert("imageId".into(), json!(self.image_id));
        node.insert("column".into(), json!(self.column));
        node.insert("row".into(), json!(self.row));
        node.insert("sigmaColumn".into(), json!(self.sigma_column()));
        node.insert("sigmaRow".into(), json!(self.sigma_row()));
        node.insert("rho".into(), json!(self.rho()));
        Value::Object(node)
    }
}

/// A resolved tie point: at least two image observations of one feature.
///
/// Instances are only ever constructed by the cross-reference resolver (or
/// explicitly by callers holding already-valid observations); an
/// under-populated group never becomes a `TiePoint`.
#[derive(Debug, Clone)]
pub struct TiePoint {
    pub tie_point_id: String,
    pub image_points: Vec<ImagePoint>,
}

impl TiePoint {
    pub fn new(tie_point_id: impl Into<String>, image_points: Vec<ImagePoint>) -> Self {
        Self {
            tie_point_id: tie_point_id.into(),
            image_points,
        }
    }

    pub fn image_count(&self) -> usize {
        self.image_points.len()
    }

    /// The observation made in the named image, if any.
    pub fn image_point(&self, image_id: &str) -> Option<&ImagePoint> {
        self.image_points.iter().find(|p| p.image_id == image_id)
    }

    pub fn to_document(&self) -> Value {
        let mut node = Map::new();
        node.insert("tiePointId".into(), json!(self.tie_point_id));
        node.insert(
            "imagePoints".into(),
            Value::Array(self.image_points.iter().map(ImagePoint::to_document).collect()),
        );
        Value::Object(node)
    }
}
