//! Catalog module: domain types, store capability and query service.
//!
//! The service never touches SQL; the repository owns every query and maps
//! sort fields onto a fixed set of columns.

pub mod domain;
pub mod repository;
pub mod service;
pub mod repo;

pub use domain::{ListQuery, ListResult, Service, ServiceVersion, ServiceWithVersions, SortDirection, SortField};
pub use repository::CatalogRepository;
pub use service::CatalogService;
