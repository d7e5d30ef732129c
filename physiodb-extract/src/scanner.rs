//! Data file discovery
//!
//! Enumerates `<root>/<participant>/<session>/<sensor>.{csv,txt}` paths where
//! both directory names are strictly numeric and the file stem is a catalog
//! sensor. Anything else is skipped without comment; sensor directories often
//! carry readme files, exports, and other clutter.

use physiodb_common::{catalog, Error, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// One discovered sensor file, tagged with its origin
#[derive(Debug, Clone)]
pub struct DataFile {
    pub participant_id: String,
    pub session_id: i64,
    pub sensor_name: &'static str,
    pub path: PathBuf,
}

/// Recursively enumerate sensor data files under the data root
///
/// The result is eagerly materialized; file counts are bounded (one file per
/// sensor per session) so there is no need to stream.
pub fn scan_data_files(data_root: &Path) -> Result<Vec<DataFile>> {
    if !data_root.is_dir() {
        return Err(Error::Config(format!(
            "Data root is not a directory: {}",
            data_root.display()
        )));
    }

    let mut files = Vec::new();

    // Exactly three levels deep: participant / session / file
    let walker = WalkDir::new(data_root)
        .min_depth(3)
        .max_depth(3)
        .follow_links(false);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Error accessing entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(data_file) = classify(data_root, entry.path()) else {
            continue;
        };
        files.push(data_file);
    }

    info!("Discovered {} data files", files.len());
    Ok(files)
}

/// Match a path against the `<participant>/<session>/<sensor>.<ext>` shape
fn classify(data_root: &Path, path: &Path) -> Option<DataFile> {
    let ext = path.extension()?.to_str()?;
    if ext != "csv" && ext != "txt" {
        return None;
    }

    let stem = path.file_stem()?.to_str()?;
    let def = catalog::lookup(stem)?;

    let relative = path.strip_prefix(data_root).ok()?;
    let mut components = relative.components();
    let participant = components.next()?.as_os_str().to_str()?;
    let session = components.next()?.as_os_str().to_str()?;

    if !is_numeric(participant) || !is_numeric(session) {
        return None;
    }

    Some(DataFile {
        participant_id: participant.to_string(),
        session_id: session.parse().ok()?,
        sensor_name: def.name,
        path: path.to_path_buf(),
    })
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
