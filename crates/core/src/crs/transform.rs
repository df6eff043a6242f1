//! Pure-Rust WGS84 → projected coordinate transforms.
//!
//! Covers EPSG 326xx (UTM North), 327xx (UTM South) and 3857 (Web Mercator)
//! using the Snyder 1987 (USGS Prof. Paper 1395) formulas. No libproj.

use super::CRS;
use crate::error::{Error, Result};

// ── WGS84 ellipsoid constants ────────────────────────────────────────────

const A: f64 = 6_378_137.0; // semi-major axis (m)
const F: f64 = 1.0 / 298.257_223_563; // flattening
const E2: f64 = 2.0 * F - F * F; // eccentricity squared
const E_PRIME2: f64 = E2 / (1.0 - E2); // second eccentricity squared
const K0: f64 = 0.9996; // UTM scale factor
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;
const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Projection {
    Identity,
    Utm { zone: u32, north: bool },
    WebMercator,
}

/// A transform from one CRS to another.
///
/// Only WGS84 (EPSG:4326) sources are supported; the set of targets is
/// WGS84 itself, UTM zones and Web Mercator.
#[derive(Debug, Clone)]
pub struct CoordinateTransform {
    source: CRS,
    target: CRS,
    projection: Projection,
}

impl CoordinateTransform {
    /// Build a transform, failing with [`Error::UnsupportedCrs`] when the pair
    /// is not covered.
    pub fn new(source: &CRS, target: &CRS) -> Result<Self> {
        let unsupported = || {
            Error::UnsupportedCrs(format!("{} -> {}", source.identifier(), target.identifier()))
        };

        let projection = if source.is_equivalent(target) {
            Projection::Identity
        } else {
            if source.epsg() != Some(4326) {
                return Err(unsupported());
            }
            let code = target.epsg().ok_or_else(unsupported)?;
            if code == 3857 {
                Projection::WebMercator
            } else if let Some((zone, north)) = parse_utm_epsg(code) {
                Projection::Utm { zone, north }
            } else {
                return Err(unsupported());
            }
        };

        Ok(Self {
            source: source.clone(),
            target: target.clone(),
            projection,
        })
    }

    pub fn source(&self) -> &CRS {
        &self.source
    }

    pub fn target(&self) -> &CRS {
        &self.target
    }

    /// Transform a single `(x, y)` coordinate (longitude, latitude in degrees
    /// for WGS84 sources).
    pub fn transform(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        if self.projection == Projection::Identity {
            return Ok((x, y));
        }

        if !(-180.0..=180.0).contains(&x) || !(-90.0..=90.0).contains(&y) {
            return Err(Error::InvalidValue {
                field: "location".into(),
                value: format!("({}, {})", x, y),
                reason: "longitude/latitude out of range".into(),
            });
        }

        match self.projection {
            Projection::Identity => Ok((x, y)),
            Projection::Utm { zone, north } => Ok(wgs84_to_utm(x, y, zone, north)),
            Projection::WebMercator => {
                if y.abs() > WEB_MERCATOR_MAX_LAT {
                    return Err(Error::InvalidValue {
                        field: "location".into(),
                        value: format!("({}, {})", x, y),
                        reason: "latitude outside the Web Mercator domain".into(),
                    });
                }
                Ok(wgs84_to_web_mercator(x, y))
            }
        }
    }
}

/// Parse an EPSG code into UTM zone info: `Some((zone, is_north))`.
///
/// - EPSG 326xx → zone xx, North hemisphere
/// - EPSG 327xx → zone xx, South hemisphere
pub fn parse_utm_epsg(epsg: u32) -> Option<(u32, bool)> {
    if (32601..=32660).contains(&epsg) {
        Some((epsg - 32600, true))
    } else if (32701..=32760).contains(&epsg) {
        Some((epsg - 32700, false))
    } else {
        None
    }
}

// ── Core projections ─────────────────────────────────────────────────────

/// WGS84 (lon, lat) degrees → UTM (easting, northing) metres.
fn wgs84_to_utm(lon_deg: f64, lat_deg: f64, zone: u32, north: bool) -> (f64, f64) {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();

    // Central meridian of the zone
    let lon0 = ((zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians();

    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let tan_lat = lat.tan();

    let n = A / (1.0 - E2 * sin_lat * sin_lat).sqrt();
    let t = tan_lat * tan_lat;
    let c = E_PRIME2 * cos_lat * cos_lat;
    let a_coeff = cos_lat * (lon - lon0);

    let m = meridional_arc(lat);

    let a2 = a_coeff * a_coeff;
    let a4 = a2 * a2;
    let a6 = a4 * a2;

    // Snyder eq. 8-9
    let easting = K0 * n
        * (a_coeff
            + (1.0 - t + c) * a2 * a_coeff / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * E_PRIME2) * a4 * a_coeff / 120.0)
        + FALSE_EASTING;

    // Snyder eq. 8-10
    let northing = K0
        * (m + n
            * tan_lat
            * (a2 / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * E_PRIME2) * a6 / 720.0));

    let northing = if north {
        northing
    } else {
        northing + FALSE_NORTHING_SOUTH
    };

    (easting, northing)
}

/// Meridional arc from equator to latitude `lat` (radians). Snyder eq. 3-21.
fn meridional_arc(lat: f64) -> f64 {
    let e2 = E2;
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    A * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
        - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
}

/// Spherical Mercator on the WGS84 semi-major axis.
fn wgs84_to_web_mercator(lon_deg: f64, lat_deg: f64) -> (f64, f64) {
    let x = A * lon_deg.to_radians();
    let y = A * (std::f64::consts::FRAC_PI_4 + lat_deg.to_radians() / 2.0).tan().ln();
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn wgs84_to(code: u32) -> CoordinateTransform {
        CoordinateTransform::new(&CRS::wgs84(), &CRS::from_epsg(code)).unwrap()
    }

    #[test]
    fn parse_utm_codes() {
        assert_eq!(parse_utm_epsg(32630), Some((30, true)));
        assert_eq!(parse_utm_epsg(32760), Some((60, false)));
        assert_eq!(parse_utm_epsg(32600), None);
        assert_eq!(parse_utm_epsg(32661), None);
        assert_eq!(parse_utm_epsg(3857), None);
    }

    // Reference values from PROJ 9.x:
    //   Transformer.from_crs(4326, 32630, always_xy=True).transform(-3.7037, 40.4168)
    #[test]
    fn madrid_to_utm30n() {
        let (e, n) = wgs84_to(32630).transform(-3.7037, 40.4168).unwrap();
        assert_abs_diff_eq!(e, 440_298.94, epsilon = 1.0);
        assert_abs_diff_eq!(n, 4_474_257.31, epsilon = 1.0);
    }

    #[test]
    fn buenos_aires_to_utm21s() {
        let (e, n) = wgs84_to(32721).transform(-58.3816, -34.6037).unwrap();
        assert_abs_diff_eq!(e, 373_317.50, epsilon = 1.0);
        assert_abs_diff_eq!(n, 6_170_036.17, epsilon = 1.0);
    }

    #[test]
    fn equator_central_meridian() {
        let (e, n) = wgs84_to(32630).transform(-3.0, 0.0).unwrap();
        assert_abs_diff_eq!(e, 500_000.0, epsilon = 0.01);
        assert_abs_diff_eq!(n, 0.0, epsilon = 0.01);
    }

    #[test]
    fn web_mercator_reference() {
        let t = wgs84_to(3857);
        let (x, y) = t.transform(10.0, 0.0).unwrap();
        assert_abs_diff_eq!(x, 1_113_194.91, epsilon = 0.01);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-6);

        let (_, y) = t.transform(0.0, 45.0).unwrap();
        assert_abs_diff_eq!(y, 5_621_521.49, epsilon = 0.01);

        assert!(t.transform(0.0, 89.0).is_err());
    }

    #[test]
    fn identity_when_equivalent() {
        let t = wgs84_to(4326);
        assert_eq!(t.transform(1.5, 2.5).unwrap(), (1.5, 2.5));
    }

    #[test]
    fn out_of_range_coordinates_rejected() {
        let t = wgs84_to(32630);
        assert!(t.transform(200.0, 0.0).is_err());
        assert!(t.transform(0.0, f64::NAN).is_err());
    }

    #[test]
    fn unsupported_pairs() {
        assert!(CoordinateTransform::new(&CRS::wgs84(), &CRS::from_epsg(2154)).is_err());
        assert!(CoordinateTransform::new(&CRS::from_epsg(32630), &CRS::from_epsg(3857)).is_err());
        assert!(CoordinateTransform::new(&CRS::wgs84(), &CRS::from_proj("+proj=utm")).is_err());
    }
}
