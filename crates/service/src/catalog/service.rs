use std::sync::Arc;

use common::pagination::PaginationPolicy;
use tracing::{debug, info, instrument};

use super::domain::{ListQuery, ListResult, ServiceWithVersions};
use super::repository::CatalogRepository;
use crate::errors::ServiceError;

/// Read-side catalog queries, independent of the web framework
pub struct CatalogService<R: CatalogRepository + ?Sized = dyn CatalogRepository> {
    repo: Arc<R>,
    policy: PaginationPolicy,
}

impl<R: CatalogRepository + ?Sized> Clone for CatalogService<R> {
    fn clone(&self) -> Self {
        Self { repo: self.repo.clone(), policy: self.policy }
    }
}

impl<R: CatalogRepository + ?Sized> CatalogService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo, policy: PaginationPolicy::default() } }

    pub fn with_policy(repo: Arc<R>, policy: PaginationPolicy) -> Self { Self { repo, policy } }

    pub fn policy(&self) -> PaginationPolicy { self.policy }

    /// One page of services with their versions.
    ///
    /// # Examples
    /// ```
    /// use service::catalog::{CatalogService, ListQuery};
    /// use service::catalog::repository::mock::InMemoryCatalogRepository;
    /// use std::sync::Arc;
    /// let svc = CatalogService::new(Arc::new(InMemoryCatalogRepository::with_demo_data()));
    /// let query = ListQuery { page: 1, page_size: 5, ..Default::default() };
    /// let page = tokio_test::block_on(svc.list_services(&query)).unwrap();
    /// assert_eq!(page.total, 8);
    /// assert_eq!(page.items.len(), 5);
    /// assert_eq!(page.total_pages, 2);
    /// ```
    #[instrument(skip(self, query), fields(search = query.search.as_deref().unwrap_or("")))]
    pub async fn list_services(&self, query: &ListQuery) -> Result<ListResult, ServiceError> {
        let params = query.normalize(self.policy);
        let page = params.page;

        let total = self.repo.count_matching(&params.search).await?;
        let rows = self
            .repo
            .list_matching(&params.search, params.sort_by, params.sort_dir, page.page_size, page.offset())
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for service in rows {
            let versions = self.repo.versions_of(service.id).await?;
            items.push(ServiceWithVersions { service, versions });
        }

        debug!(
            sort_by = params.sort_by.as_str(),
            sort_dir = params.sort_dir.as_str(),
            page = page.page,
            page_size = page.page_size,
            "list parameters"
        );
        info!(total, returned = items.len(), "services_listed");
        Ok(ListResult {
            items,
            total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages(total),
        })
    }

    /// One service with its versions; `id` must be positive.
    ///
    /// # Examples
    /// ```
    /// use service::catalog::CatalogService;
    /// use service::catalog::repository::mock::InMemoryCatalogRepository;
    /// use service::errors::ServiceError;
    /// use std::sync::Arc;
    /// let svc = CatalogService::new(Arc::new(InMemoryCatalogRepository::with_demo_data()));
    /// let found = tokio_test::block_on(svc.get_service_by_id(1)).unwrap();
    /// assert_eq!(found.versions.len(), 3);
    /// let err = tokio_test::block_on(svc.get_service_by_id(0)).unwrap_err();
    /// assert!(matches!(err, ServiceError::InvalidArgument(_)));
    /// ```
    #[instrument(skip(self))]
    pub async fn get_service_by_id(&self, id: i64) -> Result<ServiceWithVersions, ServiceError> {
        if id <= 0 {
            return Err(ServiceError::InvalidArgument(format!("invalid service id {}", id)));
        }
        // 超出存储主键范围的 id 不可能存在
        let Ok(id) = i32::try_from(id) else {
            return Err(ServiceError::not_found("service"));
        };

        let service = self.repo.get_by_id(id).await?.ok_or_else(|| ServiceError::not_found("service"))?;
        let versions = self.repo.versions_of(id).await?;
        info!(service_id = id, versions = versions.len(), "service_fetched");
        Ok(ServiceWithVersions { service, versions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repository::mock::InMemoryCatalogRepository;
    use crate::catalog::repo::SeaOrmCatalogRepository;
    use crate::catalog::SortField;
    use crate::test_support::get_db;
    use chrono::{Duration, Utc};

    fn demo() -> (Arc<InMemoryCatalogRepository>, CatalogService<InMemoryCatalogRepository>) {
        let repo = Arc::new(InMemoryCatalogRepository::with_demo_data());
        (repo.clone(), CatalogService::new(repo))
    }

    fn names(result: &ListResult) -> Vec<&str> {
        result.items.iter().map(|i| i.service.name.as_str()).collect()
    }

    #[tokio::test]
    async fn first_page_contains_whole_demo_catalog() {
        let (_, svc) = demo();
        let res = svc.list_services(&ListQuery { page: 1, page_size: 10, ..Default::default() }).await.unwrap();
        assert_eq!(res.total, 8);
        assert_eq!(res.items.len(), 8);
        assert_eq!(res.total_pages, 1);
        for item in &res.items {
            assert_eq!(item.versions.len(), 3);
            assert!(item.versions.windows(2).all(|w| w[0].created_at >= w[1].created_at));
            assert!(item.versions.iter().all(|v| v.service_id == item.service.id));
        }
    }

    #[tokio::test]
    async fn oversized_page_is_capped() {
        let (_, svc) = demo();
        let res = svc.list_services(&ListQuery { page_size: 1000, ..Default::default() }).await.unwrap();
        assert_eq!(res.page_size, 100);
        assert_eq!(res.page, 1);
    }

    #[tokio::test]
    async fn non_positive_values_use_defaults() {
        let (_, svc) = demo();
        let res = svc.list_services(&ListQuery { page: -4, page_size: 0, ..Default::default() }).await.unwrap();
        assert_eq!(res.page, 1);
        assert_eq!(res.page_size, 12);
    }

    #[tokio::test]
    async fn total_pages_rounds_up() {
        let (_, svc) = demo();
        let res = svc.list_services(&ListQuery { page: 2, page_size: 5, ..Default::default() }).await.unwrap();
        assert_eq!(res.total, 8);
        assert_eq!(res.total_pages, 2);
        assert_eq!(res.items.len(), 3);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let (_, svc) = demo();
        let res = svc.list_services(&ListQuery { page: 9, page_size: 5, ..Default::default() }).await.unwrap();
        assert!(res.items.is_empty());
        assert_eq!(res.total, 8);
    }

    #[tokio::test]
    async fn empty_catalog_has_zero_pages() {
        let svc = CatalogService::new(Arc::new(InMemoryCatalogRepository::default()));
        let res = svc.list_services(&ListQuery::default()).await.unwrap();
        assert_eq!(res.total, 0);
        assert_eq!(res.total_pages, 0);
        assert!(res.items.is_empty());
    }

    #[tokio::test]
    async fn search_contact_finds_exactly_contact_us() {
        let (_, svc) = demo();
        let res = svc.list_services(&ListQuery { search: Some("Contact".into()), ..Default::default() }).await.unwrap();
        assert_eq!(names(&res), ["Contact Us"]);
        assert_eq!(res.total, 1);
    }

    #[tokio::test]
    async fn search_covers_description() {
        let repo = Arc::new(InMemoryCatalogRepository::default());
        let now = Utc::now();
        repo.insert_service("Billing", "invoices and receipts", now);
        repo.insert_service("Ledger", "double entry", now);
        let svc = CatalogService::new(repo);
        let res = svc.list_services(&ListQuery { search: Some("receipts".into()), ..Default::default() }).await.unwrap();
        assert_eq!(names(&res), ["Billing"]);
    }

    #[tokio::test]
    async fn sorts_by_name_descending() {
        let (_, svc) = demo();
        let q = ListQuery { sort_by: Some("name".into()), sort_dir: Some("DESC".into()), ..Default::default() };
        let res = svc.list_services(&q).await.unwrap();
        let got = names(&res);
        let mut expected = got.clone();
        expected.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(got.len(), 8);
        assert_eq!(got, expected);
    }

    #[tokio::test]
    async fn unknown_sort_inputs_fall_back_to_name_asc() {
        let (_, svc) = demo();
        let fallback = ListQuery { sort_by: Some("popularity".into()), sort_dir: Some("sideways".into()), ..Default::default() };
        let explicit = ListQuery { sort_by: Some(SortField::Name.as_str().into()), sort_dir: Some("asc".into()), ..Default::default() };
        let a = svc.list_services(&fallback).await.unwrap();
        let b = svc.list_services(&explicit).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(names(&a)[0], "Collect Monday");
    }

    #[tokio::test]
    async fn repeated_queries_are_identical() {
        let (_, svc) = demo();
        let q = ListQuery { search: Some("Us".into()), sort_by: Some("createdAt".into()), page_size: 2, ..Default::default() };
        let first = svc.list_services(&q).await.unwrap();
        let second = svc.list_services(&q).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn store_failure_aborts_list() {
        let (repo, svc) = demo();
        repo.set_failing(true);
        let err = svc.list_services(&ListQuery::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
    }

    #[tokio::test]
    async fn non_positive_id_is_rejected_without_store_call() {
        let (repo, svc) = demo();
        for id in [0, -1] {
            let err = svc.get_service_by_id(id).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidArgument(_)));
        }
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn missing_id_is_not_found() {
        let (_, svc) = demo();
        assert!(matches!(svc.get_service_by_id(999).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.get_service_by_id(i64::MAX).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn version_ties_break_on_newest_insert() {
        let repo = Arc::new(InMemoryCatalogRepository::default());
        let at = Utc::now() - Duration::minutes(5);
        let svc_row = repo.insert_service("Reporting", "d", at);
        repo.insert_version(svc_row.id, "1.0.0", at);
        repo.insert_version(svc_row.id, "1.0.1", at);
        let svc = CatalogService::new(repo);
        let found = svc.get_service_by_id(svc_row.id as i64).await.unwrap();
        let labels: Vec<&str> = found.versions.iter().map(|v| v.version.as_str()).collect();
        assert_eq!(labels, ["1.0.1", "1.0.0"]);
    }

    #[tokio::test]
    async fn custom_policy_changes_defaults() {
        let repo = Arc::new(InMemoryCatalogRepository::with_demo_data());
        let svc = CatalogService::with_policy(repo, PaginationPolicy { default_page_size: 3, max_page_size: 4 });
        let res = svc.list_services(&ListQuery::default()).await.unwrap();
        assert_eq!(res.page_size, 3);
        assert_eq!(res.total_pages, 3);
        let capped = svc.list_services(&ListQuery { page_size: 50, ..Default::default() }).await.unwrap();
        assert_eq!(capped.page_size, 4);
    }

    #[tokio::test]
    async fn loose_policy_still_caps_at_one_hundred() {
        let repo = Arc::new(InMemoryCatalogRepository::with_demo_data());
        let svc = CatalogService::with_policy(repo, PaginationPolicy { default_page_size: 12, max_page_size: 500 });
        let res = svc.list_services(&ListQuery { page_size: 300, ..Default::default() }).await.unwrap();
        assert_eq!(res.page_size, 100);
    }

    #[tokio::test]
    async fn works_over_trait_object_and_sqlite() -> anyhow::Result<()> {
        let repo: Arc<dyn CatalogRepository> = Arc::new(SeaOrmCatalogRepository::new(get_db().await?));
        let svc: CatalogService = CatalogService::new(repo);
        let res = svc.list_services(&ListQuery { page: 1, page_size: 10, ..Default::default() }).await?;
        assert_eq!(res.total, 8);
        assert_eq!(res.items.len(), 8);
        assert!(res.items.iter().all(|i| i.versions.len() == 3));

        let id = res.items[0].service.id as i64;
        let one = svc.get_service_by_id(id).await?;
        assert_eq!(one.service.name, res.items[0].service.name);
        Ok(())
    }
}
