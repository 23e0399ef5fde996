//! Path utilities for locating optional test data.
//!
//! The workspace ships no font files. Glyph-level tests look for one in a
//! few well-known places and skip when none exists.

use std::path::PathBuf;

/// Font file names tried in each search directory.
const FONT_CANDIDATES: &[&str] = &[
    "DejaVuSans.ttf",
    "LiberationSans-Regular.ttf",
    "Roboto-Regular.ttf",
];

/// System font directories searched after the workspace testdata.
const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/TTF",
    "/usr/share/fonts/dejavu",
];

/// Workspace root, two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    let here = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    match here.ancestors().nth(2) {
        Some(root) => root.to_path_buf(),
        None => here,
    }
}

/// Searches for a TrueType font usable in glyph tests.
///
/// Checks, in order:
/// 1. Environment variable `TEST_FONT` (a file path)
/// 2. Environment variable `MARKER_FONT` (the CLI's font setting)
/// 3. Workspace-level `testdata/`
/// 4. Common system font directories
pub fn find_test_font() -> Option<PathBuf> {
    for var in ["TEST_FONT", "MARKER_FONT"] {
        if let Ok(path) = std::env::var(var) {
            let path = PathBuf::from(path);
            if path.is_file() {
                return Some(path);
            }
        }
    }

    let mut dirs = vec![workspace_root().join("testdata")];
    dirs.extend(SYSTEM_FONT_DIRS.iter().map(PathBuf::from));

    dirs.iter()
        .flat_map(|dir| FONT_CANDIDATES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

/// Scratch directory for PNG output, removed on drop.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("marker_out_")
        .tempdir()
        .expect("tempdir")
}
