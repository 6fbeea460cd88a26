//! Vector type alias for 3D quantities.

use nalgebra::Vector3;

/// 3D vector type, used for terrain surface normals and gradients
/// ([`crate::grid::terrain::TerrainData::gradient_at`]).
pub type Vec3 = Vector3<f32>;
