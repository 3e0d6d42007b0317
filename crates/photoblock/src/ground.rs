//! Ground control points: absolute geographic references.

use serde_json::{json, Map, Value};

use crate::doc;
use crate::error::BlockError;
use crate::Mat3;

/// A point with independently known ground coordinates.
///
/// Geographic position is geodetic: latitude/longitude in degrees, height
/// in meters above the ellipsoid. The cross-covariance blob, when present
/// (indexed dialect), is carried opaquely and re-emitted on save.
#[derive(Debug, Clone, Default)]
pub struct GroundControlPoint {
    pub gcp_id: String,
    pub lat: f64,
    pub lon: f64,
    pub hgt: f64,
    /// 3x3 symmetric position covariance, meters².
    pub covariance: Option<Mat3>,
    /// Free-form per-point metadata, passed through untouched.
    pub metadata: Map<String, Value>,
    /// Opaque correlation blob against other block entities.
    pub cross_covariance: Option<Value>,
}

impl GroundControlPoint {
    pub fn new(gcp_id: impl Into<String>, lat: f64, lon: f64, hgt: f64) -> Self {
        Self {
            gcp_id: gcp_id.into(),
            lat,
            lon,
            hgt,
            covariance: None,
            metadata: Map::new(),
            cross_covariance: None,
        }
    }

    /// Parse a ground point node. `gcpId`, `lat`, `lon` and `hgt` are
    /// required; `covariance` is the upper triangle `[c00, c01, c02, c11,
    /// c12, c22]` when present.
    ///
    /// # Errors
    ///
    /// `MissingField` for any absent required field or a malformed
    /// covariance triangle.
    pub fn from_document(node: &Value) -> Result<Self, BlockError> {
        let mut point = Self::new(
            doc::req_str(node, "gcpId")?,
            doc::req_f64(node, "lat")?,
            doc::req_f64(node, "lon")?,
            doc::req_f64(node, "hgt")?,
        );

        if let Some(values) = doc::arr(node, "covariance") {
            let tri: Vec<f64> = values.iter().filter_map(Value::as_f64).collect();
            if tri.len() != 6 {
                return Err(BlockError::MissingField {
                    field: "covariance",
                });
            }
            point.covariance = Some(Mat3::new(
                tri[0], tri[1], tri[2], //
                tri[1], tri[3], tri[4], //
                tri[2], tri[4], tri[5],
            ));
        }

        if let Some(Value::Object(map)) = node.get("metadata") {
            point.metadata = map.clone();
        }
        if let Some(cross) = node.get("crossCovariance") {
            point.cross_covariance = Some(cross.clone());
        }

        Ok(point)
    }

    pub fn to_document(&self) -> Value {
        let mut node = Map::new();
        node.insert("gcpId".into(), json!(self.gcp_id));
        node.insert("lat".into(), json!(self.lat));
        node.insert("lon".into(), json!(self.lon));
        node.insert("hgt".into(), json!(self.hgt));

        if let Some(cov) = &self.covariance {
            node.insert(
                "covariance".into(),
                json!([
                    cov[(0, 0)],
                    cov[(0, 1)],
                    cov[(0, 2)],
                    cov[(1, 1)],
                    cov[(1, 2)],
                    cov[(2, 2)]
                ]),
            );
        }
        if !self.metadata.is_empty() {
            node.insert("metadata".into(), Value::Object(self.metadata.clone()));
        }
        if let Some(cross) = &self.cross_covariance {
            node.insert("crossCovariance".into(), cross.clone());
        }

        Value::Object(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_requires_id_and_coordinates() {
        let err =
            GroundControlPoint::from_document(&json!({"lat": 1.0, "lon": 2.0, "hgt": 3.0}))
                .unwrap_err();
        assert!(matches!(err, BlockError::MissingField { field: "gcpId" }));

        let err = GroundControlPoint::from_document(&json!({"gcpId": "G1", "lat": 1.0}))
            .unwrap_err();
        assert!(matches!(err, BlockError::MissingField { field: "lon" }));
    }

    #[test]
    fn covariance_triangle_roundtrip() {
        let node = json!({
            "gcpId": "G1",
            "lat": 34.1, "lon": -117.2, "hgt": 410.0,
            "covariance": [1.0, 0.1, 0.2, 2.0, 0.3, 3.0],
        });
        let point = GroundControlPoint::from_document(&node).unwrap();

        let cov = point.covariance.unwrap();
        assert!((cov[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((cov[(1, 0)] - 0.1).abs() < 1e-12);
        assert!((cov[(2, 1)] - 0.3).abs() < 1e-12);

        let out = point.to_document();
        assert_eq!(out["covariance"], node["covariance"]);
    }

    #[test]
    fn malformed_covariance_is_structural() {
        let node = json!({
            "gcpId": "G1", "lat": 0.0, "lon": 0.0, "hgt": 0.0,
            "covariance": [1.0, 2.0],
        });
        assert!(GroundControlPoint::from_document(&node).is_err());
    }

    #[test]
    fn metadata_and_cross_covariance_pass_through() {
        let node = json!({
            "gcpId": "G1", "lat": 0.0, "lon": 0.0, "hgt": 0.0,
            "metadata": {"surveyor": "crew 5"},
            "crossCovariance": {"cells": [0.0, 0.1]},
        });
        let point = GroundControlPoint::from_document(&node).unwrap();
        let out = point.to_document();

        assert_eq!(out["metadata"]["surveyor"], "crew 5");
        assert_eq!(out["crossCovariance"], node["crossCovariance"]);
    }

    #[test]
    fn save_omits_absent_optionals() {
        let out = GroundControlPoint::new("G1", 1.0, 2.0, 3.0).to_document();
        assert!(out.get("covariance").is_none());
        assert!(out.get("metadata").is_none());
        assert!(out.get("crossCovariance").is_none());
    }
}
