//! Cross-reference resolution between tie-point observations and images.
//!
//! Observations name their image by identifier string; after the image list
//! is fully populated the references are rebound here, at a single explicit
//! phase boundary. Must not run earlier: image identifiers are not stable
//! until every image has been loaded (a carried model state may have
//! overridden the document's id).

use tracing::debug;

use crate::image::Image;
use crate::tiepoint::{ImagePoint, TiePoint};

/// A not-yet-grouped observation: a point-group id plus one image point.
#[derive(Debug, Clone)]
pub struct PointRecord {
    pub point_id: String,
    pub image_point: ImagePoint,
}

/// Group flat observation records by point id, preserving the first-seen
/// order of groups and the record order within each group.
pub fn group_by_point_id(records: Vec<PointRecord>) -> Vec<(String, Vec<ImagePoint>)> {
    // Linear scan over group keys; blocks are tens to low hundreds of
    // points, not worth an index.
    let mut groups: Vec<(String, Vec<ImagePoint>)> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|(id, _)| *id == record.point_id) {
            Some((_, points)) => points.push(record.image_point),
            None => groups.push((record.point_id, vec![record.image_point])),
        }
    }
    groups
}

/// Resolve one observation group against the loaded image list.
///
/// Image lookup compares whitespace-trimmed identifiers. An observation
/// whose image cannot be found is dropped on its own; the group survives.
/// A group left with fewer than two resolved observations yields `None` —
/// unresolvable groups are expected noise, not failures.
///
/// Resolved observations are rewritten to carry the matched image's
/// canonical identifier.
pub fn resolve_tie_point(
    point_id: &str,
    observations: Vec<ImagePoint>,
    images: &[Image],
) -> Option<TiePoint> {
    let mut resolved = Vec::with_capacity(observations.len());
    for mut obs in observations {
        match images
            .iter()
            .find(|image| image.image_id().trim() == obs.image_id.trim())
        {
            Some(image) => {
                obs.image_id = image.image_id().to_owned();
                resolved.push(obs);
            }
            None => {
                debug!(
                    "dropping observation of point `{}` against unknown image `{}`",
                    point_id, obs.image_id
                );
            }
        }
    }

    if resolved.len() < 2 {
        debug!(
            "discarding point group `{}`: {} resolved observation(s)",
            point_id,
            resolved.len()
        );
        return None;
    }
    Some(TiePoint::new(point_id, resolved))
}

/// Group flat records and resolve every group, keeping first-seen group
/// order. The resulting list contains only fully valid tie points.
pub fn resolve_tie_points(records: Vec<PointRecord>, images: &[Image]) -> Vec<TiePoint> {
    group_by_point_id(records)
        .into_iter()
        .filter_map(|(point_id, observations)| resolve_tie_point(&point_id, observations, images))
        .collect()
}
