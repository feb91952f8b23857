use chrono::{DateTime, Utc};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorResponse { pub error: String, pub message: String }

#[derive(ToSchema)]
pub struct ServiceVersionDoc {
    pub id: i32,
    pub service_id: i32,
    pub version: String,
    pub created_at: DateTime<Utc>,
}

/// Service fields flattened next to `versions` (newest first)
#[derive(ToSchema)]
pub struct ServiceWithVersionsDoc {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub versions: Vec<ServiceVersionDoc>,
}

#[derive(ToSchema)]
pub struct ListResultDoc {
    pub items: Vec<ServiceWithVersionsDoc>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::services::list_services,
        crate::routes::services::get_service,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            ServiceVersionDoc,
            ServiceWithVersionsDoc,
            ListResultDoc,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "services")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_catalog_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/services"));
        assert!(doc.paths.paths.contains_key("/api/v1/services/{id}"));
        assert!(doc.paths.paths.contains_key("/health"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
