use std::path::{Path, PathBuf};

/// Root of the workspace, one level above this crate.
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".."))
}

/// Path of a config file shipped in the repository `configs` directory,
/// `None` when no such file exists.
pub fn repository_config(name: &str) -> Option<PathBuf> {
    let path = workspace_root().join("configs").join(name);
    path.is_file().then_some(path)
}
