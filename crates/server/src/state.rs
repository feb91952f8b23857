use std::sync::Arc;

use service::catalog::{CatalogRepository, CatalogService};

use crate::routes::auth::TokenVerifier;

/// Shared per-process state handed to handlers and the auth guard
#[derive(Clone)]
pub struct ServerState {
    pub catalog: CatalogService,
    pub verifier: Arc<TokenVerifier>,
}

impl ServerState {
    pub fn new(catalog: CatalogService, verifier: TokenVerifier) -> Self {
        Self { catalog, verifier: Arc::new(verifier) }
    }

    /// Convenience for wiring any repository implementation
    pub fn from_repository(repo: Arc<dyn CatalogRepository>, verifier: TokenVerifier) -> Self {
        Self::new(CatalogService::new(repo), verifier)
    }
}
