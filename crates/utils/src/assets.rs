use std::path::PathBuf;

use directories::ProjectDirs;

const DEV_DATA_DIR: &str = "dev_data";

/// Directory holding the local database file.
///
/// Debug builds keep data next to the workspace so development databases
/// never mix with an installed instance.
pub fn data_dir() -> PathBuf {
    let path = if cfg!(debug_assertions) {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../").join(DEV_DATA_DIR)
    } else {
        ProjectDirs::from("org", "coop", "coop-housing")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".").join(DEV_DATA_DIR))
    };

    if !path.exists() {
        if let Err(e) = std::fs::create_dir_all(&path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to create data directory");
        }
    }
    path
}

pub fn default_database_path() -> PathBuf {
    data_dir().join("db.sqlite")
}
