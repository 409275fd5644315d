// geo.rs - Great-circle proximity on a spherical earth
// Fixed-point (1e18) haversine so that contract types stay integer-only.
// Points are bucketed into a fixed lat/lon grid; queries visit only the
// cells a search circle can touch.

use crate::error::ContractError;
use crate::types::GeoPoint;
use soroban_sdk::{Env, Vec};

pub const SCALE: i128 = 1_000_000_000_000_000_000;
pub const PI: i128 = 3_141_592_653_589_793_238;
pub const HALF_PI: i128 = 1_570_796_326_794_896_619;
pub const TWO_PI: i128 = 6_283_185_307_179_586_477;

/// Mean earth radius in meters
pub const EARTH_RADIUS_M: i128 = 6_371_008;

pub const MICRO_DEGREES: i64 = 1_000_000;
pub const MAX_LATITUDE_E6: i64 = 90 * MICRO_DEGREES;
pub const MAX_LONGITUDE_E6: i64 = 180 * MICRO_DEGREES;

/// Largest radius accepted by proximity queries
pub const MAX_SEARCH_RADIUS_KM: u32 = 100;

/// Grid cell edge: 0.2 degrees, about 22 km of latitude
pub const CELL_SIZE_E6: i64 = 200_000;
pub const GRID_COLUMNS: i32 = (2 * MAX_LONGITUDE_E6 / CELL_SIZE_E6) as i32;

/// Micro-degrees of latitude per kilometer, rounded up
const LAT_E6_PER_KM: i64 = 8_994;

/// Build a point from latitude/longitude in micro-degrees
pub fn point(latitude_e6: i64, longitude_e6: i64) -> Result<GeoPoint, ContractError> {
    if !(-MAX_LATITUDE_E6..=MAX_LATITUDE_E6).contains(&latitude_e6)
        || !(-MAX_LONGITUDE_E6..=MAX_LONGITUDE_E6).contains(&longitude_e6)
    {
        return Err(ContractError::InvalidCoordinates);
    }
    Ok(GeoPoint {
        longitude_e6,
        latitude_e6,
    })
}

fn mul(a: i128, b: i128) -> i128 {
    a * b / SCALE
}

fn to_radians(micro_degrees: i64) -> i128 {
    (micro_degrees as i128) * PI / (180 * MICRO_DEGREES as i128)
}

/// sin(x) for x in radians, both scaled by 1e18
pub fn sin(x: i128) -> i128 {
    let mut x = x % TWO_PI;
    if x > PI {
        x -= TWO_PI;
    } else if x < -PI {
        x += TWO_PI;
    }
    // Fold into [-pi/2, pi/2] where the series converges quickly
    if x > HALF_PI {
        x = PI - x;
    } else if x < -HALF_PI {
        x = -PI - x;
    }

    let x2 = mul(x, x);
    let mut term = x;
    let mut sum = x;
    let mut n: i128 = 1;
    loop {
        term = -mul(term, x2) / ((n + 1) * (n + 2));
        if term == 0 {
            break;
        }
        sum += term;
        n += 2;
    }
    sum
}

pub fn cos(x: i128) -> i128 {
    sin(x + HALF_PI)
}

/// Haversine term `hav(d / R)` between two points, scaled by 1e18.
/// Monotonic in great-circle distance, so it doubles as a sort key.
pub fn haversine(a: &GeoPoint, b: &GeoPoint) -> i128 {
    let lat_a = to_radians(a.latitude_e6);
    let lat_b = to_radians(b.latitude_e6);
    let half_dlat = to_radians(b.latitude_e6 - a.latitude_e6) / 2;
    let half_dlon = to_radians(b.longitude_e6 - a.longitude_e6) / 2;

    let s_lat = sin(half_dlat);
    let s_lon = sin(half_dlon);
    let h = mul(s_lat, s_lat) + mul(mul(cos(lat_a), cos(lat_b)), mul(s_lon, s_lon));
    h.clamp(0, SCALE)
}

/// Haversine term of a circle with the given radius in kilometers
pub fn radius_limit(radius_km: u32) -> i128 {
    let radius_m = radius_km as i128 * 1000;
    let half_angle = radius_m * SCALE / (2 * EARTH_RADIUS_M);
    let s = sin(half_angle);
    mul(s, s)
}

fn row_of(latitude_e6: i64) -> i32 {
    (latitude_e6 + MAX_LATITUDE_E6).div_euclid(CELL_SIZE_E6) as i32
}

fn column_of(longitude_e6: i64) -> i32 {
    ((longitude_e6 + MAX_LONGITUDE_E6).div_euclid(CELL_SIZE_E6) as i32).rem_euclid(GRID_COLUMNS)
}

/// Grid cell `(row, col)` holding `point`; +180 and -180 share a column
pub fn cell_of(point: &GeoPoint) -> (i32, i32) {
    (row_of(point.latitude_e6), column_of(point.longitude_e6))
}

/// Every cell that can hold a point within `radius_km` of `center`.
///
/// The latitude band is exact. The longitude half-width is widened by
/// `1 / cos` of the band's most polar latitude, plus 1%; a band touching a
/// pole covers the whole ring.
pub fn covering_cells(env: &Env, center: &GeoPoint, radius_km: u32) -> Vec<(i32, i32)> {
    let span_lat = radius_km as i64 * LAT_E6_PER_KM;
    let south = (center.latitude_e6 - span_lat).max(-MAX_LATITUDE_E6);
    let north = (center.latitude_e6 + span_lat).min(MAX_LATITUDE_E6);

    let polar = south.abs().max(north.abs());
    let cos_polar = cos(to_radians(polar));

    let mut columns = GRID_COLUMNS as i64;
    let mut first_column = 0i64;
    if polar < MAX_LATITUDE_E6 && cos_polar > 0 {
        let span_lon = (span_lat as i128 * SCALE / cos_polar) * 101 / 100 + 1;
        if span_lon < MAX_LONGITUDE_E6 as i128 {
            let span_lon = span_lon as i64;
            let west = (center.longitude_e6 - span_lon + MAX_LONGITUDE_E6).div_euclid(CELL_SIZE_E6);
            let east = (center.longitude_e6 + span_lon + MAX_LONGITUDE_E6).div_euclid(CELL_SIZE_E6);
            first_column = west;
            columns = columns.min(east - west + 1);
        }
    }

    let mut cells = Vec::new(env);
    for row in row_of(south)..=row_of(north) {
        for offset in 0..columns {
            let col = (first_column + offset).rem_euclid(GRID_COLUMNS as i64) as i32;
            cells.push_back((row, col));
        }
    }
    cells
}

pub fn validate_radius(radius_km: u32) -> Result<(), ContractError> {
    if radius_km == 0 || radius_km > MAX_SEARCH_RADIUS_KM {
        return Err(ContractError::InvalidRadius);
    }
    Ok(())
}

/// Sort key of `candidate` when it lies inside the circle (boundary included)
pub fn within(center: &GeoPoint, candidate: &GeoPoint, limit: i128) -> Option<i128> {
    let h = haversine(center, candidate);
    if h <= limit {
        Some(h)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: i128, b: i128, tolerance: i128) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn test_sin_cos_reference_values() {
        let tolerance = 1_000;
        assert!(approx(sin(0), 0, tolerance));
        assert!(approx(sin(HALF_PI), SCALE, tolerance));
        assert!(approx(sin(-HALF_PI), -SCALE, tolerance));
        assert!(approx(sin(PI), 0, tolerance));
        assert!(approx(cos(0), SCALE, tolerance));
        assert!(approx(cos(PI), -SCALE, tolerance));
        // sin(pi/6) = 0.5
        assert!(approx(sin(PI / 6), SCALE / 2, tolerance));
        // periodicity
        assert!(approx(sin(PI / 6 + TWO_PI), SCALE / 2, tolerance));
    }

    #[test]
    fn test_point_validation() {
        assert!(point(30_700_000, 76_750_000).is_ok());
        assert!(point(90_000_000, 180_000_000).is_ok());
        assert!(point(-90_000_000, -180_000_000).is_ok());
        assert_eq!(
            point(90_000_001, 0),
            Err(ContractError::InvalidCoordinates)
        );
        assert_eq!(
            point(0, -180_000_001),
            Err(ContractError::InvalidCoordinates)
        );
    }

    #[test]
    fn test_same_point_has_zero_distance() {
        let p = point(30_700_000, 76_750_000).unwrap();
        assert_eq!(haversine(&p, &p), 0);
        assert!(within(&p, &p, radius_limit(1)).is_some());
    }

    #[test]
    fn test_radius_membership() {
        // One degree of latitude is ~111.195 km on the mean sphere
        let center = point(30_700_000, 76_750_000).unwrap();
        let north_4_0km = point(30_736_000, 76_750_000).unwrap(); // ~4.003 km
        let north_4_9km = point(30_744_900, 76_750_000).unwrap(); // ~4.993 km
        let north_5_0km = point(30_745_000, 76_750_000).unwrap(); // ~5.004 km

        let five_km = radius_limit(5);
        assert!(within(&center, &north_4_0km, five_km).is_some());
        assert!(within(&center, &north_4_9km, five_km).is_some());
        assert!(within(&center, &north_5_0km, five_km).is_none());
        assert!(within(&center, &north_4_0km, radius_limit(4)).is_none());
    }

    #[test]
    fn test_longitude_distance_shrinks_with_latitude() {
        // 0.05 degrees of longitude: ~5.56 km at the equator, ~4.78 km at 30.7N
        let equator = point(0, 0).unwrap();
        let equator_east = point(0, 50_000).unwrap();
        let north = point(30_700_000, 76_750_000).unwrap();
        let north_east = point(30_700_000, 76_800_000).unwrap();

        assert!(within(&equator, &equator_east, radius_limit(5)).is_none());
        assert!(within(&north, &north_east, radius_limit(5)).is_some());
    }

    #[test]
    fn test_haversine_orders_by_distance() {
        let center = point(30_700_000, 76_750_000).unwrap();
        let near = point(30_710_000, 76_750_000).unwrap();
        let far = point(30_720_000, 76_760_000).unwrap();
        assert!(haversine(&center, &near) < haversine(&center, &far));
    }

    #[test]
    fn test_radius_bounds() {
        assert_eq!(validate_radius(0), Err(ContractError::InvalidRadius));
        assert_eq!(validate_radius(101), Err(ContractError::InvalidRadius));
        assert!(validate_radius(1).is_ok());
        assert!(validate_radius(100).is_ok());
    }

    #[test]
    fn test_cell_of() {
        assert_eq!(cell_of(&point(-90_000_000, -180_000_000).unwrap()), (0, 0));
        assert_eq!(cell_of(&point(0, 0).unwrap()), (450, 900));
        assert_eq!(cell_of(&point(-1, -1).unwrap()), (449, 899));
        // The antimeridian wraps onto column zero
        assert_eq!(cell_of(&point(0, 180_000_000).unwrap()), (450, 0));
        assert_eq!(cell_of(&point(90_000_000, 0).unwrap()), (900, 900));
    }

    #[test]
    fn test_urgent_radius_touches_few_cells() {
        let env = Env::default();
        // Inside a cell: only that cell
        let inner = point(30_700_000, 76_700_000).unwrap();
        assert_eq!(covering_cells(&env, &inner, 5).len(), 1);

        // Near a corner: the four neighbours
        let corner = point(30_799_000, 76_799_000).unwrap();
        let cells = covering_cells(&env, &corner, 5);
        assert_eq!(cells.len(), 4);
        assert!(cells.contains((cell_of(&corner).0 + 1, cell_of(&corner).1 + 1)));
    }

    #[test]
    fn test_covering_cells_contain_boundary_points() {
        let env = Env::default();
        let center = point(59_950_000, 10_750_000).unwrap();
        let limit = radius_limit(20);
        let cells = covering_cells(&env, &center, 20);

        // Walk a ring just inside 20 km and check each point's cell is covered
        let candidates = [
            point(60_129_000, 10_750_000).unwrap(),
            point(59_771_000, 10_750_000).unwrap(),
            point(59_950_000, 11_107_000).unwrap(),
            point(59_950_000, 10_393_000).unwrap(),
            point(60_076_000, 11_002_000).unwrap(),
        ];
        for candidate in candidates {
            assert!(within(&center, &candidate, limit).is_some());
            assert!(cells.contains(cell_of(&candidate)));
        }
    }

    #[test]
    fn test_polar_band_covers_whole_ring() {
        let env = Env::default();
        let center = point(89_950_000, 0).unwrap();
        let cells = covering_cells(&env, &center, 10);
        // Two rows (89.8-90.0 and the pole row), every column
        assert_eq!(cells.len(), 2 * GRID_COLUMNS as u32);
    }

    #[test]
    fn test_antimeridian_wraps() {
        let env = Env::default();
        let center = point(0, 179_990_000).unwrap();
        let cells = covering_cells(&env, &center, 5);
        assert!(cells.contains((450, GRID_COLUMNS - 1)));
        assert!(cells.contains((450, 0)));
    }
}
