use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::CacheError;
use super::token::AccessToken;

const CACHE_FILE_VERSION: u32 = 1;

/// Best-effort local persistence of the last issued access token.
///
/// Nothing here is critical: `load` reports any failure as a miss, and callers
/// log and ignore `save` errors rather than failing an authorization.
pub trait TokenCache: Send + Sync {
    fn load(&self) -> Option<AccessToken>;
    fn save(&self, token: &AccessToken) -> Result<(), CacheError>;
    fn clear(&self) -> Result<(), CacheError>;
}

/// Cache that never remembers anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTokenCache;

impl TokenCache for NoopTokenCache {
    fn load(&self) -> Option<AccessToken> {
        None
    }

    fn save(&self, _token: &AccessToken) -> Result<(), CacheError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// TOML file cache holding a single token.
///
/// # Example
/// ```no_run
/// use oathbridge::auth::{AccessToken, FileTokenCache, TokenCache};
///
/// let cache = FileTokenCache::new("/tmp/oathbridge/access-token.toml");
/// cache.save(&AccessToken::new("github", "gho_abc"))?;
/// assert!(cache.load().is_some());
/// # Ok::<(), oathbridge::auth::CacheError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileTokenCache {
    path: PathBuf,
}

impl FileTokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.oathbridge/access-token.toml`, or a relative fallback without a home directory.
    pub fn new_default() -> Self {
        Self::new(default_cache_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<AccessToken>, CacheError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let file: TokenFile = toml::from_str(&raw)?;
        if file.version != CACHE_FILE_VERSION {
            return Err(CacheError::Serialization(format!(
                "unsupported cache version {}",
                file.version
            )));
        }
        Ok(Some(file.token).filter(|t| !t.is_empty()))
    }

    fn ensure_parent(path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

impl TokenCache for FileTokenCache {
    fn load(&self) -> Option<AccessToken> {
        match self.read() {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "failed reading cached access token, will regenerate"
                );
                None
            }
        }
    }

    fn save(&self, token: &AccessToken) -> Result<(), CacheError> {
        Self::ensure_parent(&self.path)?;
        let file = TokenFile {
            version: CACHE_FILE_VERSION,
            saved_at: Utc::now(),
            token: token.clone(),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&self.path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenFile {
    version: u32,
    saved_at: DateTime<Utc>,
    token: AccessToken,
}

pub fn default_cache_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".oathbridge"))
        .unwrap_or_else(|| PathBuf::from(".oathbridge"))
        .join("access-token.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_cache() -> (TempDir, FileTokenCache) {
        let dir = TempDir::new().unwrap();
        let cache = FileTokenCache::new(dir.path().join("nested").join("token.toml"));
        (dir, cache)
    }

    #[test]
    fn token_survives_save_and_load() {
        let (_dir, cache) = temp_cache();
        let token = AccessToken::new("github", "gho_abc")
            .with_token_type("bearer")
            .with_scope_list("read:user,user:email");
        cache.save(&token).unwrap();
        assert_eq!(cache.load(), Some(token));
    }

    #[test]
    fn missing_file_is_a_miss() {
        let (_dir, cache) = temp_cache();
        assert!(cache.load().is_none());
        cache.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_a_miss() {
        let (_dir, cache) = temp_cache();
        FileTokenCache::ensure_parent(cache.path()).unwrap();
        fs::write(cache.path(), "not = [valid").unwrap();
        assert!(cache.load().is_none());
    }

    #[test]
    fn clear_removes_token() {
        let (_dir, cache) = temp_cache();
        cache.save(&AccessToken::new("github", "gho_abc")).unwrap();
        cache.clear().unwrap();
        assert!(cache.load().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, cache) = temp_cache();
        cache.save(&AccessToken::new("github", "gho_abc")).unwrap();
        let mode = fs::metadata(cache.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn save_into_unwritable_location_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let cache = FileTokenCache::new(blocker.join("token.toml"));
        assert!(cache.save(&AccessToken::new("github", "gho_abc")).is_err());
    }
}
