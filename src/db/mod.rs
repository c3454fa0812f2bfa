mod client;
mod dialect;
mod models;
mod mysql;
mod postgres;
mod sqlite;
mod sqlserver;

pub use client::list_tables_scoped;
pub use dialect::Dialect;
pub use models::{Column, Table};
