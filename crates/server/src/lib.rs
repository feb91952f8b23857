//! HTTP transport for the service catalog: routing, bearer-role guard, error mapping,
//! metrics and OpenAPI docs on top of `service::catalog`.

pub mod errors;
pub mod observability;
pub mod openapi;
pub mod routes;
pub mod startup;
pub mod state;

pub use startup::run;
