//! Multi-file auth state
//!
//! The gateway owns the session credentials; we only file them. Each
//! `creds.update` payload is written to its own JSON file in the session
//! directory, the whole set is replayed on connect, and everything is
//! removed after a logout so the next connection starts a fresh pairing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One stored credential file, as exchanged with the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthFile {
    pub file: String,
    pub contents: serde_json::Value,
}

/// Handle on the session directory
#[derive(Debug, Clone)]
pub struct AuthState {
    dir: PathBuf,
}

impl AuthState {
    /// Open the session directory, creating it if needed
    pub fn open(dir: &Path) -> Result<Self, AuthError> {
        fs::create_dir_all(dir).map_err(|e| AuthError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Whether any credential files are stored
    pub fn has_credentials(&self) -> bool {
        self.stored_paths().map(|p| !p.is_empty()).unwrap_or(false)
    }

    /// Load every stored credential file for session resume
    pub fn load(&self) -> Result<Vec<AuthFile>, AuthError> {
        let mut files = Vec::new();
        for path in self.stored_paths()? {
            let raw = fs::read_to_string(&path).map_err(|e| AuthError::Io {
                path: path.clone(),
                source: e,
            })?;
            let contents = match serde_json::from_str(&raw) {
                Ok(v) => v,
                Err(e) => {
                    // A torn write from a previous run; skip it rather than
                    // refuse to start
                    warn!(path = %path.display(), error = %e, "Skipping unreadable credential file");
                    continue;
                }
            };
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            files.push(AuthFile {
                file: name,
                contents,
            });
        }
        Ok(files)
    }

    /// Persist one `creds.update` payload
    pub fn store(&self, file: &str, contents: &serde_json::Value) -> Result<(), AuthError> {
        let name = sanitize_file_name(file).ok_or_else(|| AuthError::BadFileName {
            name: file.to_string(),
        })?;
        let path = self.dir.join(format!("{}.json", name));
        let raw = serde_json::to_string(contents).map_err(AuthError::Encode)?;
        fs::write(&path, raw).map_err(|e| AuthError::Io {
            path,
            source: e,
        })?;
        debug!(file = %name, "Stored credential file");
        Ok(())
    }

    /// Remove all stored credential files, returning how many were deleted
    pub fn clear(&self) -> Result<usize, AuthError> {
        let paths = self.stored_paths()?;
        let count = paths.len();
        for path in paths {
            fs::remove_file(&path).map_err(|e| AuthError::Io {
                path: path.clone(),
                source: e,
            })?;
        }
        Ok(count)
    }

    fn stored_paths(&self) -> Result<Vec<PathBuf>, AuthError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| AuthError::Io {
            path: self.dir.clone(),
            source: e,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|ext| ext == "json").unwrap_or(false))
            .collect();
        paths.sort();
        Ok(paths)
    }
}

/// Restrict gateway-supplied key names to a flat set of safe file names
fn sanitize_file_name(name: &str) -> Option<String> {
    let cleaned: String = name
        .trim_end_matches(".json")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Session dir I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Refusing credential file name: {name:?}")]
    BadFileName { name: String },

    #[error("Failed to encode credentials: {0}")]
    Encode(serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_ordinary_names() {
        assert_eq!(sanitize_file_name("creds"), Some("creds".to_string()));
        assert_eq!(
            sanitize_file_name("app-state-sync-key-AAAAAA"),
            Some("app-state-sync-key-AAAAAA".to_string())
        );
    }

    #[test]
    fn sanitize_strips_json_suffix() {
        assert_eq!(sanitize_file_name("creds.json"), Some("creds".to_string()));
    }

    #[test]
    fn sanitize_defangs_path_separators() {
        let name = sanitize_file_name("../../etc/passwd").unwrap();
        assert!(!name.contains('/'));
        assert!(!name.starts_with('.'));
    }

    #[test]
    fn sanitize_rejects_empty() {
        assert_eq!(sanitize_file_name(""), None);
        assert_eq!(sanitize_file_name("..."), None);
    }

    #[test]
    fn open_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("auth_info");
        let auth = AuthState::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert!(!auth.has_credentials());
    }

    #[test]
    fn store_then_load_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let auth = AuthState::open(tmp.path()).unwrap();

        let creds = serde_json::json!({"noiseKey": "abc", "registered": true});
        auth.store("creds", &creds).unwrap();
        auth.store("app-state-sync-key-AAA", &serde_json::json!({"keyData": "xyz"}))
            .unwrap();

        assert!(auth.has_credentials());
        let files = auth.load().unwrap();
        assert_eq!(files.len(), 2);
        let stored = files.iter().find(|f| f.file == "creds").unwrap();
        assert_eq!(stored.contents, creds);
    }

    #[test]
    fn store_overwrites_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let auth = AuthState::open(tmp.path()).unwrap();

        auth.store("creds", &serde_json::json!({"v": 1})).unwrap();
        auth.store("creds", &serde_json::json!({"v": 2})).unwrap();

        let files = auth.load().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].contents["v"], 2);
    }

    #[test]
    fn clear_removes_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let auth = AuthState::open(tmp.path()).unwrap();

        auth.store("creds", &serde_json::json!({})).unwrap();
        auth.store("pre-key-1", &serde_json::json!({})).unwrap();

        let removed = auth.clear().unwrap();
        assert_eq!(removed, 2);
        assert!(!auth.has_credentials());
        assert!(auth.load().unwrap().is_empty());
    }

    #[test]
    fn load_skips_torn_files() {
        let tmp = tempfile::tempdir().unwrap();
        let auth = AuthState::open(tmp.path()).unwrap();

        auth.store("creds", &serde_json::json!({"ok": true})).unwrap();
        std::fs::write(tmp.path().join("torn.json"), "{\"trunc").unwrap();

        let files = auth.load().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file, "creds");
    }

    #[test]
    fn non_json_files_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let auth = AuthState::open(tmp.path()).unwrap();

        std::fs::write(tmp.path().join("README.txt"), "not creds").unwrap();
        assert!(!auth.has_credentials());
    }
}
