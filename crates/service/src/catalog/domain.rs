use chrono::{DateTime, Utc};
use common::pagination::{Page, Pagination, PaginationPolicy};
use serde::{Deserialize, Serialize};

/// Catalog entry (business view of `models::service`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Released version of a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceVersion {
    pub id: i32,
    pub service_id: i32,
    pub version: String,
    pub created_at: DateTime<Utc>,
}

/// A service with its versions, newest first. Serialized flat: service fields plus `versions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceWithVersions {
    #[serde(flatten)]
    pub service: Service,
    pub versions: Vec<ServiceVersion>,
}

/// Sortable columns. Anything outside this set falls back to `Name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Name,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Accepts both `created_at` and `createdAt` spellings.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("name") => SortField::Name,
            Some("created_at") | Some("createdAt") => SortField::CreatedAt,
            Some("updated_at") | Some("updatedAt") => SortField::UpdatedAt,
            _ => SortField::Name,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive; anything other than asc/desc is `Asc`.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Raw list request as received from a transport. Nothing here is trusted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
    /// `<= 0` means "use the default"
    pub page: i64,
    /// `<= 0` means "use the default"
    pub page_size: i64,
}

/// Validated list parameters handed to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub search: String,
    pub sort_by: SortField,
    pub sort_dir: SortDirection,
    pub page: Page,
}

impl ListQuery {
    pub fn normalize(&self, policy: PaginationPolicy) -> ListParams {
        ListParams {
            search: self.search.clone().unwrap_or_default(),
            sort_by: SortField::parse_lenient(self.sort_by.as_deref()),
            sort_dir: SortDirection::parse_lenient(self.sort_dir.as_deref()),
            page: Pagination::new(self.page, self.page_size).normalize(policy),
        }
    }
}

/// One page of services plus pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResult {
    pub items: Vec<ServiceWithVersions>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl From<models::service::Model> for Service {
    fn from(m: models::service::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<models::service_version::Model> for ServiceVersion {
    fn from(m: models::service_version::Model) -> Self {
        Self {
            id: m.id,
            service_id: m.service_id,
            version: m.version,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}
