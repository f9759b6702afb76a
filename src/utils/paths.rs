use std::path::PathBuf;

/// Resolve the Claude data directories to scan
///
/// `override_dirs` is a comma-separated list; when it names at least one
/// existing directory only those are used. Otherwise the default locations
/// under the home directory are checked.
pub fn get_claude_paths(override_dirs: Option<&str>) -> Vec<PathBuf> {
    if let Some(list) = override_dirs {
        let paths: Vec<PathBuf> = list
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .filter(|p| p.is_dir())
            .collect();
        if !paths.is_empty() {
            return paths;
        }
        log::warn!("none of the configured data directories exist: {list}");
    }

    let Some(home_path) = home::home_dir() else {
        return Vec::new();
    };

    [
        // Primary path
        home_path.join(".claude"),
        // macOS
        home_path.join("Library/Application Support/Claude"),
        // Linux
        home_path.join(".config/claude"),
        home_path.join(".local/share/Claude"),
    ]
    .into_iter()
    .filter(|p| p.is_dir())
    .collect()
}
