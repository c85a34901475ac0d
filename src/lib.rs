//! Data source selection library.
//!
//! Picks which of several interchangeable database connection pools serves a
//! request and opens a connection from it.

pub mod config;
pub mod load_balancer;
pub mod observability;
pub mod registry;

pub use config::schema::RouterConfig;
pub use load_balancer::{Policy, PolicyCatalog};
pub use registry::{DataSourceRegistry, RegistryError, RoutedConnection, TrafficClass};
