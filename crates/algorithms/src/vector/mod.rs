//! Vector geometry operations
//!
//! - Buffer: turn point plots into circular or square polygons

mod buffer;

pub use buffer::{buffer_features, buffer_point, BufferParams, EndCapStyle};
