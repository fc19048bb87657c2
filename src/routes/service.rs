//! Business rules for the route lifecycle.
//!
//! # Responsibilities
//! - Uniqueness of names on create
//! - Existence of the target on update and delete
//! - Key immutability on update
//! - Translate repository failures into [`RouteError`]
//!
//! # Design Decisions
//! - A single mutation lock spans the rule check and the write, so two
//!   concurrent creates of one name cannot both pass the check
//! - Reads never take the lock
//! - Not-found is preserved on every lookup; any other repository failure
//!   is an internal error

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::routes::error::{RepositoryError, RouteError, RouteResult};
use crate::routes::model::RouteItem;
use crate::routes::repository::RouteRepository;

/// Route operations exposed to the delivery layer.
pub struct RouteService {
    repo: Arc<dyn RouteRepository>,
    mutation_lock: Mutex<()>,
}

impl RouteService {
    pub fn new(repo: Arc<dyn RouteRepository>) -> Self {
        Self {
            repo,
            mutation_lock: Mutex::new(()),
        }
    }

    /// Whether a route with this name is currently stored.
    async fn exists(&self, name: &str) -> RouteResult<bool> {
        match self.repo.get_one(name).await {
            Ok(_) => Ok(true),
            Err(RepositoryError::NotFound(_)) => Ok(false),
            Err(e) => Err(storage_failure("lookup", name, e)),
        }
    }

    /// Store a new route. Fails with [`RouteError::Conflict`] if the name is taken.
    pub async fn create(&self, route: RouteItem) -> RouteResult<RouteItem> {
        let _guard = self.mutation_lock.lock().await;

        if self.exists(&route.name).await? {
            tracing::warn!(route = %route.name, "Create rejected: name already exists");
            return Err(RouteError::Conflict(route.name));
        }

        let name = route.name.clone();
        let created = self
            .repo
            .create(route)
            .await
            .map_err(|e| storage_failure("create", &name, e))?;

        tracing::info!(route = %created.name, host = %created.host, path = %created.path, "Route created");
        Ok(created)
    }

    /// Replace the route stored under `target` with `route`.
    ///
    /// `route.name` must equal `target`; the name of a route never changes.
    pub async fn update(&self, target: &str, route: RouteItem) -> RouteResult<RouteItem> {
        if route.name != target {
            tracing::warn!(target = %target, name = %route.name, "Update rejected: name change");
            return Err(RouteError::NameMismatch {
                target: target.to_string(),
                name: route.name,
            });
        }

        let _guard = self.mutation_lock.lock().await;

        if !self.exists(target).await? {
            tracing::warn!(route = %target, "Update rejected: route not found");
            return Err(RouteError::NotFound(target.to_string()));
        }

        let updated = self
            .repo
            .update(route)
            .await
            .map_err(|e| storage_failure("update", target, e))?;

        tracing::info!(route = %updated.name, "Route updated");
        Ok(updated)
    }

    /// Remove the route named `name`.
    pub async fn delete(&self, name: &str) -> RouteResult<()> {
        let _guard = self.mutation_lock.lock().await;

        if !self.exists(name).await? {
            tracing::warn!(route = %name, "Delete rejected: route not found");
            return Err(RouteError::NotFound(name.to_string()));
        }

        self.repo
            .delete(name)
            .await
            .map_err(|e| storage_failure("delete", name, e))?;

        tracing::info!(route = %name, "Route deleted");
        Ok(())
    }

    /// All routes in persisted order.
    pub async fn get_all(&self) -> RouteResult<Vec<RouteItem>> {
        self.repo
            .get_all()
            .await
            .map_err(|e| storage_failure("list", "*", e))
    }

    /// The route named `name`.
    pub async fn get_one(&self, name: &str) -> RouteResult<RouteItem> {
        match self.repo.get_one(name).await {
            Ok(route) => Ok(route),
            Err(RepositoryError::NotFound(_)) => {
                tracing::debug!(route = %name, "Route not found");
                Err(RouteError::NotFound(name.to_string()))
            }
            Err(e) => Err(storage_failure("get", name, e)),
        }
    }
}

fn storage_failure(op: &'static str, name: &str, err: RepositoryError) -> RouteError {
    tracing::error!(operation = op, route = %name, error = %err, "Route storage failure");
    RouteError::Storage(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::tempdir;

    use crate::routes::repository::FileRouteRepository;

    fn route(name: &str, host: &str) -> RouteItem {
        RouteItem {
            name: name.to_string(),
            host: host.to_string(),
            path: "/a".to_string(),
            backend: "http://10.0.0.1:9000".to_string(),
            enabled: true,
        }
    }

    /// Repository whose every call fails with an I/O error.
    struct BrokenRepository;

    fn broken() -> RepositoryError {
        RepositoryError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ))
    }

    #[async_trait]
    impl RouteRepository for BrokenRepository {
        async fn get_all(&self) -> Result<Vec<RouteItem>, RepositoryError> {
            Err(broken())
        }
        async fn get_one(&self, _name: &str) -> Result<RouteItem, RepositoryError> {
            Err(broken())
        }
        async fn create(&self, _route: RouteItem) -> Result<RouteItem, RepositoryError> {
            Err(broken())
        }
        async fn update(&self, _route: RouteItem) -> Result<RouteItem, RepositoryError> {
            Err(broken())
        }
        async fn delete(&self, _name: &str) -> Result<(), RepositoryError> {
            Err(broken())
        }
    }

    fn file_service(dir: &tempfile::TempDir) -> RouteService {
        let repo = FileRouteRepository::new(dir.path().join("routes.toml"));
        RouteService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let dir = tempdir().unwrap();
        let service = file_service(&dir);
        let item = route("svc-a", "a.example.com");

        let created = service.create(item.clone()).await.unwrap();
        assert_eq!(created, item);
        assert_eq!(service.get_one("svc-a").await.unwrap(), item);
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts_without_change() {
        let dir = tempdir().unwrap();
        let service = file_service(&dir);
        service.create(route("svc-a", "a.example.com")).await.unwrap();

        let err = service
            .create(route("svc-a", "b.example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RouteError::Conflict(_)));

        let all = service.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].host, "a.example.com");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let service = file_service(&dir);

        let err = service
            .update("svc-a", route("svc-a", "a.example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RouteError::NotFound(_)));
        assert!(service.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_name_mismatch_rejected_before_storage() {
        let service = RouteService::new(Arc::new(BrokenRepository));

        let err = service
            .update("svc-a", route("svc-b", "a.example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RouteError::NameMismatch { .. }));
    }

    #[tokio::test]
    async fn test_update_replaces_record() {
        let dir = tempdir().unwrap();
        let service = file_service(&dir);
        service.create(route("svc-a", "a.example.com")).await.unwrap();

        service
            .update("svc-a", route("svc-a", "b.example.com"))
            .await
            .unwrap();
        assert_eq!(service.get_one("svc-a").await.unwrap().host, "b.example.com");
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let service = file_service(&dir);
        service.create(route("svc-a", "a.example.com")).await.unwrap();

        let err = service.delete("svc-b").await.unwrap_err();
        assert!(matches!(err, RouteError::NotFound(_)));
        assert_eq!(service.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_then_get_not_found() {
        let dir = tempdir().unwrap();
        let service = file_service(&dir);
        service.create(route("svc-a", "a.example.com")).await.unwrap();

        service.delete("svc-a").await.unwrap();
        assert!(matches!(
            service.get_one("svc-a").await,
            Err(RouteError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_storage_failures_are_internal() {
        let service = RouteService::new(Arc::new(BrokenRepository));

        let errs = vec![
            service.get_all().await.unwrap_err(),
            service.get_one("svc-a").await.unwrap_err(),
            service.create(route("svc-a", "a.example.com")).await.unwrap_err(),
            service
                .update("svc-a", route("svc-a", "a.example.com"))
                .await
                .unwrap_err(),
            service.delete("svc-a").await.unwrap_err(),
        ];
        for err in errs {
            assert!(matches!(err, RouteError::Storage(_)), "unexpected {err:?}");
            assert_eq!(err.status().code(), 500);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_same_name_creates_once() {
        let dir = tempdir().unwrap();
        let service = Arc::new(file_service(&dir));
        let mut handles = vec![];

        for i in 0..10 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service
                    .create(route("svc-a", &format!("h{}.example.com", i)))
                    .await
            }));
        }

        let mut ok = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(RouteError::Conflict(_)) => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(ok, 1);
        assert_eq!(conflicts, 9);
        assert_eq!(service.get_all().await.unwrap().len(), 1);
    }
}
