//! I/O operations for reading and writing geospatial data

mod csv_io;
mod geojson_io;
mod geotiff;

pub use csv_io::{parse_csv, read_csv, CsvRecord};
pub use geojson_io::{parse_geojson, read_geojson, to_geojson_string, write_geojson};
pub use geotiff::{read_geotiff, write_geotiff};
