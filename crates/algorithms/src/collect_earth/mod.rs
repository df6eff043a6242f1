//! Collect Earth CSV exports
//!
//! - **schema**: column filtering and the 21-field plot schema
//! - **convert**: reprojection and square plot buffering

mod convert;
mod schema;

pub use convert::{
    collect_earth_to_vector, run_collect_earth_to_vector, CollectEarthParams,
    CollectEarthToVector,
};
pub use schema::{
    coerce, is_dropped_column, plot_fields, remap_record, PlotRow, DROPPED_COLUMNS,
    PLOT_FIELDS, YEARLY_COLUMNS,
};
