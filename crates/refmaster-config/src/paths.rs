//! Platform-specific paths for mastering profiles.
//!
//! - **User profiles**: `~/.config/refmaster/profiles/` (Linux),
//!   `~/Library/Application Support/refmaster/profiles/` (macOS),
//!   `%APPDATA%\refmaster\profiles\` (Windows)
//! - **System profiles**: `/usr/share/refmaster/profiles/` (Linux),
//!   `/Library/Application Support/refmaster/profiles/` (macOS)
//!
//! ```rust,no_run
//! use refmaster_config::paths;
//!
//! if let Some(path) = paths::find_profile("club") {
//!     println!("Found profile at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

const APP_NAME: &str = "refmaster";

const PROFILES_SUBDIR: &str = "profiles";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the user-specific profiles directory.
pub fn user_profiles_dir() -> PathBuf {
    user_config_dir().join(PROFILES_SUBDIR)
}

/// Returns the system-wide profiles directory.
pub fn system_profiles_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        PathBuf::from("/usr/share")
            .join(APP_NAME)
            .join(PROFILES_SUBDIR)
    }
    #[cfg(target_os = "macos")]
    {
        PathBuf::from("/Library/Application Support")
            .join(APP_NAME)
            .join(PROFILES_SUBDIR)
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
            .join(PROFILES_SUBDIR)
    }
}

/// Find a profile file by path or name.
///
/// Searches in order:
/// 1. `name` as a file path
/// 2. User profiles directory
/// 3. System profiles directory
///
/// A `.toml` extension is added to bare names.
pub fn find_profile(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };

    [user_profiles_dir(), system_profiles_dir()]
        .into_iter()
        .map(|dir| dir.join(&filename))
        .find(|candidate| candidate.is_file())
}

/// Ensure the user profiles directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_profiles_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_profiles_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// List profile files in the user profiles directory.
pub fn list_user_profiles() -> Vec<PathBuf> {
    list_profiles_in_dir(&user_profiles_dir())
}

/// List profile files in the system profiles directory.
pub fn list_system_profiles() -> Vec<PathBuf> {
    list_profiles_in_dir(&system_profiles_dir())
}

/// List user profiles followed by system profiles.
///
/// Duplicate names are not filtered; user files come first and take
/// precedence in [`find_profile`].
pub fn list_all_profiles() -> Vec<PathBuf> {
    let mut profiles = list_user_profiles();
    profiles.extend(list_system_profiles());
    profiles
}

fn list_profiles_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();
    paths
}

/// Profile name from a file path (the file stem).
///
/// ```rust
/// use refmaster_config::paths::profile_name_from_path;
/// use std::path::Path;
///
/// let name = profile_name_from_path(Path::new("/path/to/club.toml"));
/// assert_eq!(name, Some("club".to_string()));
/// ```
pub fn profile_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dirs_contain_app_name() {
        assert!(user_config_dir().to_string_lossy().contains("refmaster"));
        assert!(user_profiles_dir().ends_with("refmaster/profiles"));
        assert!(system_profiles_dir().to_string_lossy().contains("refmaster"));
    }

    #[test]
    fn test_find_profile_by_path() {
        let temp_dir = TempDir::new().unwrap();
        let profile_path = temp_dir.path().join("club.toml");
        fs::write(&profile_path, "name = \"club\"").unwrap();

        let found = find_profile(profile_path.to_str().unwrap());
        assert_eq!(found, Some(profile_path));
    }

    #[test]
    fn test_find_profile_not_found() {
        assert!(find_profile("nonexistent_profile_12345").is_none());
    }

    #[test]
    fn test_list_profiles_in_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.toml"), "").unwrap();
        fs::write(temp_dir.path().join("a.toml"), "").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "").unwrap();

        let profiles = list_profiles_in_dir(temp_dir.path());
        assert_eq!(profiles.len(), 2);
        assert_eq!(profile_name_from_path(&profiles[0]).as_deref(), Some("a"));
    }

    #[test]
    fn test_list_profiles_nonexistent_dir() {
        assert!(list_profiles_in_dir(Path::new("/nonexistent/path/12345")).is_empty());
    }
}
