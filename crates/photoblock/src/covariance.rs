//! Joint covariance blob: correlation across all block adjustment
//! parameters, carried as pass-through data.

use nalgebra::DMatrix;
use serde_json::{json, Map, Value};

use crate::doc;
use crate::error::BlockError;
use crate::Real;

/// Named-cell square matrix. This layer never interprets the numbers; it
/// only preserves them across a load/save cycle and offers cell lookup by
/// parameter label.
#[derive(Debug, Clone)]
pub struct JointCovariance {
    parameters: Vec<String>,
    values: DMatrix<Real>,
}

impl Default for JointCovariance {
    fn default() -> Self {
        Self {
            parameters: Vec::new(),
            values: DMatrix::zeros(0, 0),
        }
    }
}

impl JointCovariance {
    /// # Errors
    ///
    /// `ListLengthMismatch` unless `values` is square with one row per
    /// parameter label.
    pub fn new(parameters: Vec<String>, values: DMatrix<Real>) -> Result<Self, BlockError> {
        if values.nrows() != parameters.len() || values.ncols() != parameters.len() {
            return Err(BlockError::ListLengthMismatch {
                left: "parameters",
                left_len: parameters.len(),
                right: "values",
                right_len: values.nrows().max(values.ncols()),
            });
        }
        Ok(Self { parameters, values })
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn matrix(&self) -> &DMatrix<Real> {
        &self.values
    }

    /// Cell addressed by a pair of parameter labels.
    pub fn cell(&self, row: &str, col: &str) -> Option<Real> {
        let r = self.parameters.iter().position(|p| p == row)?;
        let c = self.parameters.iter().position(|p| p == col)?;
        Some(self.values[(r, c)])
    }

    /// Parse the side-document form
    /// `{ "parameters": [..labels..], "values": [[..row..], ..] }`.
    pub(crate) fn from_document(node: &Value) -> Result<Self, BlockError> {
        let labels: Vec<String> = doc::arr(node, "parameters")
            .ok_or(BlockError::MissingField {
                field: "parameters",
            })?
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect();

        let rows = doc::arr(node, "values").ok_or(BlockError::MissingField { field: "values" })?;
        if rows.len() != labels.len() {
            return Err(BlockError::ListLengthMismatch {
                left: "parameters",
                left_len: labels.len(),
                right: "values",
                right_len: rows.len(),
            });
        }

        let mut values = DMatrix::zeros(labels.len(), labels.len());
        for (r, row) in rows.iter().enumerate() {
            let cells: Vec<f64> = row
                .as_array()
                .map(|a| a.iter().filter_map(Value::as_f64).collect())
                .unwrap_or_default();
            if cells.len() != labels.len() {
                return Err(BlockError::ListLengthMismatch {
                    left: "parameters",
                    left_len: labels.len(),
                    right: "values",
                    right_len: cells.len(),
                });
            }
            for (c, cell) in cells.iter().enumerate() {
                values[(r, c)] = *cell;
            }
        }

        Ok(Self {
            parameters: labels,
            values,
        })
    }

    pub(crate) fn to_document(&self) -> Value {
        let rows: Vec<Value> = (0..self.values.nrows())
            .map(|r| {
                Value::Array(
                    (0..self.values.ncols())
                        .map(|c| json!(self.values[(r, c)]))
                        .collect(),
                )
            })
            .collect();

        let mut node = Map::new();
        node.insert("parameters".into(), json!(self.parameters));
        node.insert("values".into(), Value::Array(rows));
        Value::Object(node)
    }
}
