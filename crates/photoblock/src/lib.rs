//! Photogrammetric block assembly.
//!
//! This crate turns a hierarchical JSON document into a strongly-typed
//! [`PhotoBlock`] — images, ground control points, tie points and a joint
//! covariance blob — and back again:
//!
//! - two load dialects (plain and indexed/header), one canonical save form,
//! - identifier-based weak references from tie points to images, rebound by
//!   an explicit cross-reference resolution pass after all images load,
//! - lazy, cached sensor-model instantiation behind the
//!   [`SensorModelProvider`] seam, with identifier reconciliation between
//!   image and model.
//!
//! The sensor-model mathematics themselves are external; models are only
//! ever asked for their persisted state string and their identifier.

/// The photoblock aggregate and its document dialects.
pub mod block;
/// Joint covariance pass-through blob.
pub mod covariance;
mod doc;
/// Error taxonomy.
pub mod error;
/// Ground control points.
pub mod ground;
/// Images and their cached sensor models.
pub mod image;
/// Tie point / image cross-reference resolution.
pub mod resolver;
/// Sensor model provider traits.
pub mod sensor;
/// Stand-in provider and models for tests and examples.
pub mod synthetic;
/// Tie points and pixel observations.
pub mod tiepoint;

pub use block::PhotoBlock;
pub use covariance::JointCovariance;
pub use error::BlockError;
pub use ground::GroundControlPoint;
pub use image::Image;
pub use sensor::{SensorModelError, SensorModelHandle, SensorModelProvider, UNKNOWN_IDENTIFIER};
pub use tiepoint::{ImagePoint, TiePoint};

pub type Real = f64;
pub type Mat2 = nalgebra::Matrix2<Real>;
pub type Mat3 = nalgebra::Matrix3<Real>;
