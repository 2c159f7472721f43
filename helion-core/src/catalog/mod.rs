//! The persistent event-sourced catalog: `files` and `events`, accessed
//! transactionally, plus the "latest event per file" projection that both
//! the Finder and the Ingester depend on.

mod names;
mod postgres;

pub use names::{TableName, TableNames};
pub use postgres::{Catalog, CatalogTransaction};
