use async_trait::async_trait;

use super::domain::{Service, ServiceVersion, SortDirection, SortField};
use crate::errors::StoreError;

/// Store capability backing the catalog.
///
/// Implementations must treat `search`, `limit` and `offset` as bound values and
/// map `SortField` onto a fixed column; nothing caller-controlled may reach query text.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Services whose name or description contains `search`; empty matches all.
    async fn count_matching(&self, search: &str) -> Result<u64, StoreError>;

    async fn list_matching(
        &self,
        search: &str,
        sort_by: SortField,
        sort_dir: SortDirection,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Service>, StoreError>;

    /// Versions of one service, newest first.
    async fn versions_of(&self, service_id: i32) -> Result<Vec<ServiceVersion>, StoreError>;

    /// `Ok(None)` when no such service exists.
    async fn get_by_id(&self, id: i32) -> Result<Option<Service>, StoreError>;
}

/// In-memory repository for tests, benches and doc examples
pub mod mock {
    use super::*;
    use std::cmp::Ordering;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::{Mutex, PoisonError};

    use chrono::{DateTime, Duration, Utc};

    #[derive(Default)]
    struct Tables {
        services: Vec<Service>,
        versions: Vec<ServiceVersion>,
    }

    #[derive(Default)]
    pub struct InMemoryCatalogRepository {
        tables: Mutex<Tables>,
        calls: AtomicUsize,
        failing: AtomicBool,
    }

    impl InMemoryCatalogRepository {
        /// Repository pre-filled with the demo catalog (8 services, 3 versions each).
        pub fn with_demo_data() -> Self {
            let repo = Self::default();
            let base = Utc::now() - Duration::hours(1);
            for (i, seed) in models::seed::DEMO_SERVICES.iter().enumerate() {
                let created = base + Duration::minutes(i as i64);
                let svc = repo.insert_service(seed.name, seed.description, created);
                for (j, label) in seed.versions.iter().enumerate() {
                    repo.insert_version(svc.id, label, created + Duration::seconds(j as i64 + 1));
                }
            }
            repo
        }

        pub fn insert_service(&self, name: &str, description: &str, created_at: DateTime<Utc>) -> Service {
            let mut t = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
            let svc = Service {
                id: t.services.len() as i32 + 1,
                name: name.to_string(),
                description: description.to_string(),
                created_at,
                updated_at: created_at,
            };
            t.services.push(svc.clone());
            svc
        }

        pub fn insert_version(&self, service_id: i32, version: &str, created_at: DateTime<Utc>) -> ServiceVersion {
            let mut t = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
            let v = ServiceVersion {
                id: t.versions.len() as i32 + 1,
                service_id,
                version: version.to_string(),
                created_at,
            };
            t.versions.push(v.clone());
            v
        }

        /// Number of store operations invoked so far
        pub fn calls(&self) -> usize {
            self.calls.load(AtomicOrdering::SeqCst)
        }

        /// When set, every operation fails with a `StoreError`
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, AtomicOrdering::SeqCst);
        }

        fn enter(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StoreError> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            if self.failing.load(AtomicOrdering::SeqCst) {
                return Err(StoreError::new("in-memory store configured to fail"));
            }
            Ok(self.tables.lock().unwrap_or_else(PoisonError::into_inner))
        }
    }

    fn matches(svc: &Service, search: &str) -> bool {
        search.is_empty() || svc.name.contains(search) || svc.description.contains(search)
    }

    fn compare(a: &Service, b: &Service, sort_by: SortField) -> Ordering {
        match sort_by {
            SortField::Name => a.name.cmp(&b.name),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }

    #[async_trait]
    impl CatalogRepository for InMemoryCatalogRepository {
        async fn count_matching(&self, search: &str) -> Result<u64, StoreError> {
            let t = self.enter()?;
            Ok(t.services.iter().filter(|s| matches(s, search)).count() as u64)
        }

        async fn list_matching(
            &self,
            search: &str,
            sort_by: SortField,
            sort_dir: SortDirection,
            limit: u64,
            offset: u64,
        ) -> Result<Vec<Service>, StoreError> {
            let t = self.enter()?;
            let mut rows: Vec<Service> = t.services.iter().filter(|s| matches(s, search)).cloned().collect();
            rows.sort_by(|a, b| {
                let ord = compare(a, b, sort_by);
                match sort_dir {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
            Ok(rows.into_iter().skip(offset as usize).take(limit as usize).collect())
        }

        async fn versions_of(&self, service_id: i32) -> Result<Vec<ServiceVersion>, StoreError> {
            let t = self.enter()?;
            let mut rows: Vec<ServiceVersion> =
                t.versions.iter().filter(|v| v.service_id == service_id).cloned().collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(rows)
        }

        async fn get_by_id(&self, id: i32) -> Result<Option<Service>, StoreError> {
            let t = self.enter()?;
            Ok(t.services.iter().find(|s| s.id == id).cloned())
        }
    }
}
