//! Service layer: the catalog query contract on top of `models`.
//! - `catalog::repository` is the store capability (SeaORM and in-memory implementations).
//! - `catalog::service` validates list parameters and assembles paginated results.
//! - Errors distinguish caller mistakes from store failures.

pub mod errors;
pub mod catalog;
#[cfg(test)]
pub mod test_support;
