//! Route persistence.
//!
//! # Responsibilities
//! - Load and persist the entire route collection
//! - Naive read-modify-write primitives keyed by route name
//!
//! # Design Decisions
//! - Whole-collection granularity: every mutation rewrites the file
//! - Writes go to a sibling temp file and are renamed into place, so
//!   readers never see a partial file
//! - Mutations of one repository are serialized by an async mutex
//! - Uniqueness and existence are NOT enforced here

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::routes::error::RepositoryError;
use crate::routes::model::RouteItem;

/// Storage backend for the route collection.
#[async_trait]
pub trait RouteRepository: Send + Sync {
    /// Full collection in persisted order. Empty if nothing was stored yet.
    async fn get_all(&self) -> Result<Vec<RouteItem>, RepositoryError>;

    /// First record with the given name.
    async fn get_one(&self, name: &str) -> Result<RouteItem, RepositoryError>;

    /// Appends `route` without checking for duplicates.
    async fn create(&self, route: RouteItem) -> Result<RouteItem, RepositoryError>;

    /// Replaces every record named `route.name` with `route`, inserting it
    /// if none existed.
    async fn update(&self, route: RouteItem) -> Result<RouteItem, RepositoryError>;

    /// Removes every record with the given name. Succeeds if none matched.
    async fn delete(&self, name: &str) -> Result<(), RepositoryError>;
}

/// On-disk layout of the routes file.
#[derive(Debug, Default, Deserialize, Serialize)]
struct RoutesFile {
    #[serde(default)]
    routes: Vec<RouteItem>,
}

/// Route repository backed by a single TOML file.
pub struct FileRouteRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileRouteRepository {
    /// Create a repository storing routes at `path`. The file is not touched
    /// until the first read or write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<RouteItem>, RepositoryError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let file: RoutesFile = toml::from_str(&content)?;
        Ok(file.routes)
    }

    async fn save(&self, routes: Vec<RouteItem>) -> Result<(), RepositoryError> {
        let count = routes.len();
        let content = toml::to_string_pretty(&RoutesFile { routes })?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }

        let tmp = self.tmp_path();
        if let Err(e) = replace_file(&tmp, &self.path, content.as_bytes()).await {
            // Never leave a half-written temp file behind.
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::debug!(path = %self.path.display(), routes = count, "Routes file written");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "routes.toml".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Writes `content` to `tmp`, flushes it to disk and renames it over `path`.
async fn replace_file(tmp: &Path, path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp).await?;
    file.write_all(content).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(tmp, path).await
}

#[async_trait]
impl RouteRepository for FileRouteRepository {
    async fn get_all(&self) -> Result<Vec<RouteItem>, RepositoryError> {
        self.load().await
    }

    async fn get_one(&self, name: &str) -> Result<RouteItem, RepositoryError> {
        self.load()
            .await?
            .into_iter()
            .find(|r| r.name == name)
            .ok_or_else(|| RepositoryError::NotFound(name.to_string()))
    }

    async fn create(&self, route: RouteItem) -> Result<RouteItem, RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut routes = self.load().await?;
        routes.push(route.clone());
        self.save(routes).await?;
        Ok(route)
    }

    async fn update(&self, route: RouteItem) -> Result<RouteItem, RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut routes = self.load().await?;
        routes.retain(|r| r.name != route.name);
        routes.push(route.clone());
        self.save(routes).await?;
        Ok(route)
    }

    async fn delete(&self, name: &str) -> Result<(), RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut routes = self.load().await?;
        routes.retain(|r| r.name != name);
        self.save(routes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn route(name: &str, host: &str) -> RouteItem {
        RouteItem {
            name: name.to_string(),
            host: host.to_string(),
            path: "/".to_string(),
            backend: "http://127.0.0.1:9000".to_string(),
            enabled: true,
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let repo = FileRouteRepository::new(dir.path().join("routes.toml"));
        assert!(repo.get_all().await.unwrap().is_empty());
        assert!(matches!(
            repo.get_one("svc-a").await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("routes.toml");
        std::fs::write(&path, "").unwrap();
        let repo = FileRouteRepository::new(path);
        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_preserves_order() {
        let dir = tempdir().unwrap();
        let repo = FileRouteRepository::new(dir.path().join("routes.toml"));
        repo.create(route("svc-a", "a.example.com")).await.unwrap();
        repo.create(route("svc-b", "b.example.com")).await.unwrap();

        let names: Vec<_> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["svc-a", "svc-b"]);
    }

    #[tokio::test]
    async fn test_create_does_not_check_duplicates() {
        let dir = tempdir().unwrap();
        let repo = FileRouteRepository::new(dir.path().join("routes.toml"));
        repo.create(route("svc-a", "a.example.com")).await.unwrap();
        repo.create(route("svc-a", "b.example.com")).await.unwrap();

        assert_eq!(repo.get_all().await.unwrap().len(), 2);
        // First match wins.
        assert_eq!(repo.get_one("svc-a").await.unwrap().host, "a.example.com");
    }

    #[tokio::test]
    async fn test_update_replaces_and_moves_to_end() {
        let dir = tempdir().unwrap();
        let repo = FileRouteRepository::new(dir.path().join("routes.toml"));
        repo.create(route("svc-a", "a.example.com")).await.unwrap();
        repo.create(route("svc-b", "b.example.com")).await.unwrap();

        repo.update(route("svc-a", "c.example.com")).await.unwrap();

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].name, "svc-a");
        assert_eq!(all[1].host, "c.example.com");
    }

    #[tokio::test]
    async fn test_update_missing_inserts() {
        let dir = tempdir().unwrap();
        let repo = FileRouteRepository::new(dir.path().join("routes.toml"));
        repo.update(route("svc-a", "a.example.com")).await.unwrap();
        assert_eq!(repo.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let repo = FileRouteRepository::new(dir.path().join("routes.toml"));
        repo.create(route("svc-a", "a.example.com")).await.unwrap();

        repo.delete("svc-a").await.unwrap();
        repo.delete("svc-a").await.unwrap();
        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_creates_parent_dir_and_cleans_tmp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("routes.toml");
        let repo = FileRouteRepository::new(&path);
        repo.create(route("svc-a", "a.example.com")).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_file_name("routes.toml.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_rename_removes_tmp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("routes.toml");
        // A non-empty directory cannot be replaced by a file.
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();
        let repo = FileRouteRepository::new(&path);

        let err = repo.create(route("svc-a", "a.example.com")).await;
        assert!(matches!(err, Err(RepositoryError::Io(_))));
        assert!(!path.with_file_name("routes.toml.tmp").exists());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_failed_write_removes_tmp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("routes.toml");
        let tmp = path.with_file_name("routes.toml.tmp");
        // Every write to /dev/full fails with ENOSPC.
        std::os::unix::fs::symlink("/dev/full", &tmp).unwrap();
        let repo = FileRouteRepository::new(&path);

        let err = repo.create(route("svc-a", "a.example.com")).await;
        assert!(matches!(err, Err(RepositoryError::Io(_))));
        assert!(std::fs::symlink_metadata(&tmp).is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_file_format_is_toml_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("routes.toml");
        let repo = FileRouteRepository::new(&path);
        repo.create(route("svc-a", "a.example.com")).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[[routes]]"));
        assert!(content.contains("name = \"svc-a\""));
        assert!(content.contains("enabled = true"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("routes.toml");
        std::fs::write(&path, "routes = 42").unwrap();
        let repo = FileRouteRepository::new(path);

        assert!(matches!(
            repo.get_all().await,
            Err(RepositoryError::Decode(_))
        ));
        assert!(matches!(
            repo.create(route("svc-a", "a.example.com")).await,
            Err(RepositoryError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_creates_keep_every_write() {
        use std::sync::Arc;

        let dir = tempdir().unwrap();
        let repo = Arc::new(FileRouteRepository::new(dir.path().join("routes.toml")));
        let mut handles = vec![];

        for i in 0..16 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.create(route(&format!("svc-{}", i), "a.example.com"))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(repo.get_all().await.unwrap().len(), 16);
    }
}
