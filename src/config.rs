use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the database path (container deployments
/// mount the persistent volume and point this at it).
pub const DATABASE_ENV: &str = "IDCACHE_DATABASE";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IdcacheConfig {
    pub database: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("idcache.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".idcache").join("cache.db")
}

/// Resolve the database path: CLI flag, then environment, then config file,
/// then the default data directory.
pub fn resolve_database_path(flag: Option<PathBuf>, config: Option<&IdcacheConfig>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Ok(path) = std::env::var(DATABASE_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    if let Some(db) = config.and_then(|c| c.database.as_deref()) {
        return PathBuf::from(db);
    }
    default_database_path_in(Path::new("."))
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<IdcacheConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: IdcacheConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &IdcacheConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idcache.toml");

        assert!(load_config(Some(&path)).unwrap().is_none());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idcache.toml");

        let config = IdcacheConfig {
            database: Some("/data/cache.db".to_string()),
        };
        write_config(&path, &config, false).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.database.as_deref(), Some("/data/cache.db"));

        // Overwriting without --force is rejected
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();
    }

    #[test]
    fn test_ensure_db_dir_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("deeper").join("cache.db");

        ensure_db_dir(&db_path).unwrap();
        assert!(db_path.parent().unwrap().exists());
    }

    #[test]
    fn test_resolve_database_path_precedence() {
        let config = IdcacheConfig {
            database: Some("/from/config.db".to_string()),
        };

        let flagged = resolve_database_path(Some(PathBuf::from("/from/flag.db")), Some(&config));
        assert_eq!(flagged, PathBuf::from("/from/flag.db"));

        let from_config = resolve_database_path(None, Some(&config));
        assert_eq!(from_config, PathBuf::from("/from/config.db"));

        let fallback = resolve_database_path(None, None);
        assert_eq!(fallback, default_database_path_in(Path::new(".")));
    }
}
