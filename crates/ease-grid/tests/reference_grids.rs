//! Dimension coordinates of the bundled grids against published values.

use ease_grid::{compute_dims, CrsRecord, GridStore};
use test_utils::assert_approx_eq;

const TOLERANCE: f64 = 1e-4;

#[test]
fn test_m09km_x_coordinates() {
    let definition = GridStore::bundled().definition("M09km").unwrap();
    let (x, _) = compute_dims(&definition).unwrap();

    assert_eq!(x.len(), 3856);
    let expected = [
        (0, -17363026.417556427),
        (482, -13021143.806266051),
        (964, -8679261.194975676),
        (1446, -4337378.5836853012),
        (1928, 4504.0276050753891),
        (2409, 4337378.583685305),
        (2891, 8679261.194975678),
        (3373, 13021143.806266055),
        (3855, 17363026.417556427),
    ];
    for (index, value) in expected {
        assert_approx_eq!(x[index], value, TOLERANCE);
    }
}

#[test]
fn test_m09km_y_coordinates() {
    let definition = GridStore::bundled().definition("M09km").unwrap();
    let (_, y) = compute_dims(&definition).unwrap();

    assert_eq!(y.len(), 1624);
    let expected = [
        (0, 7310036.803033527),
        (203, 5481401.5953738764),
        (406, 3652766.3877142267),
        (609, 1824131.1800545761),
        (812, -4504.0276050735265),
        (1014, -1824131.1800545771),
        (1217, -3652766.3877142277),
        (1420, -5481401.5953738783),
        (1623, -7310036.803033527),
    ];
    for (index, value) in expected {
        assert_approx_eq!(y[index], value, TOLERANCE);
    }
}

#[test]
fn test_every_bundled_grid_is_monotonic() {
    let store = GridStore::bundled();
    for entry in store.entries() {
        let definition = entry.definition().unwrap();
        let (x, y) = compute_dims(&definition).unwrap();
        assert_eq!(x.len(), definition.width as usize);
        assert_eq!(y.len(), definition.height as usize);
        assert!(x.windows(2).all(|w| w[1] > w[0]), "{} x", entry.name);
        assert!(y.windows(2).all(|w| w[1] < w[0]), "{} y", entry.name);
    }
}

#[test]
fn test_global_grids_are_symmetric() {
    for name in ["M03km", "M09km", "M36km"] {
        let definition = GridStore::bundled().definition(name).unwrap();
        let (x, y) = compute_dims(&definition).unwrap();
        assert_approx_eq!(x[0], -x[x.len() - 1], TOLERANCE);
        assert_approx_eq!(y[0], -y[y.len() - 1], TOLERANCE);
    }
}

#[test]
fn test_grid_crs_names() {
    let store = GridStore::bundled();
    let global: CrsRecord = store.crs("M36km").unwrap();
    let north: CrsRecord = store.crs("N09km").unwrap();
    assert_eq!(global.projected_crs_name(), "WGS 84 / NSIDC EASE-Grid 2.0 Global");
    assert_eq!(north.projected_crs_name(), "WGS 84 / NSIDC EASE-Grid 2.0 North");
}
