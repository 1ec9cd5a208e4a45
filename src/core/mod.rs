// Core algorithm exports
pub mod distance;
pub mod engine;
pub mod export;
pub mod tiers;

pub use distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box};
pub use engine::{NeighborEngine, NeighborQueryResult};
pub use export::{csv_bytes, export_filename, project_rows, write_csv, ExportError, ExportRow};
pub use tiers::{build_tiers, TierError};
