// Library for tests to access modules

pub mod config;
pub mod docker_repo;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod snapshot;
pub mod store;
pub mod sysinfo_repo;
pub mod worker;

pub use error::{Error, Result};
