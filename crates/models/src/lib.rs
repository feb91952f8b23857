pub mod errors;
pub mod db;
pub mod service;
pub mod service_version;
pub mod seed;

#[cfg(test)]
mod tests;
