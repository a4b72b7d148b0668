//! Lookup of real SMAP L2 granules for the optional end-to-end tests.
//!
//! Granules are too large to keep in the repository. They are searched for
//! under `$SMAP_GRANULE_DIR`, then `testdata/granules/` at the workspace
//! root, in one subdirectory per collection short name:
//!
//! ```text
//! testdata/granules/
//! ├── SPL2SMP_E/SMAP_L2_SM_P_E_36365_D_20210101T000000_R18240_001.h5
//! ├── SPL2SMP/SMAP_L2_SM_P_36365_D_20210101T000000_R18240_001.h5
//! └── SPL2SMAP/...
//! ```

use std::path::{Path, PathBuf};

/// Environment variable naming an extra granule root, searched first.
pub const GRANULE_DIR_ENV: &str = "SMAP_GRANULE_DIR";

/// File extensions accepted as SMAP L2 granules.
const GRANULE_EXTENSIONS: [&str; 2] = ["h5", "nc"];

/// The workspace root, two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or(manifest_dir)
}

/// Directories holding per-collection granule folders, in search order.
pub fn granule_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(dir) = std::env::var(GRANULE_DIR_ENV) {
        roots.push(PathBuf::from(dir));
    }
    roots.push(workspace_root().join("testdata").join("granules"));
    roots
}

/// First granule of `short_name` found under any granule root.
pub fn find_granule(short_name: &str) -> Option<PathBuf> {
    granule_roots()
        .iter()
        .find_map(|root| find_granule_under(root, short_name))
}

/// First granule, by file name, in `root/short_name`.
pub fn find_granule_under(root: &Path, short_name: &str) -> Option<PathBuf> {
    let mut granules: Vec<PathBuf> = std::fs::read_dir(root.join(short_name))
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_granule(path))
        .collect();
    granules.sort();
    granules.into_iter().next()
}

fn is_granule(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| GRANULE_EXTENSIONS.contains(&ext))
}
