pub mod connection;
pub mod mssql;
pub mod postgres;

pub use self::{mssql::MssqlCatalog, postgres::PostgresCatalog};

use crate::{
	entity::{DbType, Entity, EntityKind},
	Error, Result,
};
use async_trait::async_trait;
use itertools::Itertools;
use sqlx::{Database, Pool};
use std::collections::HashMap;

/// Reads tables and views out of a database catalog.
///
/// Every backend returns the same `Entity` shape so callers stay polymorphic over `DbType`.
/// A reader holds at most one open connection; `connect` replaces it.
#[async_trait]
pub trait CatalogReader: Send + Sync {
	fn db_type(&self) -> DbType;

	async fn connect(&mut self, connection_string: &str) -> Result<()>;

	/// Entities ordered by `(schema, name)`, columns by ordinal position.
	async fn list_entities(&self) -> Result<Vec<Entity>>;

	async fn disconnect(&mut self);
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct TableRow {
	pub table_schema: String,
	pub table_name: String,
	pub table_type: String,
}

/// One column of a table, either from the column listing or from the primary key listing.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ColumnRow {
	pub table_schema: String,
	pub table_name: String,
	pub column_name: String,
}

/// The reader's pool, unless it was never opened or has since been closed.
pub(crate) fn live_pool<DB: Database>(pool: &Option<Pool<DB>>) -> Result<&Pool<DB>> {
	pool.as_ref().filter(|pool| !pool.is_closed()).ok_or(Error::NotConnected)
}

/// Joins column and key rows onto table rows by exact `(schema, table)` match.
///
/// Entities come out ordered by `(schema, name)` whatever order the catalog returned.
/// Columns and key columns keep their row order. Key columns missing from the column
/// list are dropped.
pub(crate) fn assemble(tables: Vec<TableRow>, columns: Vec<ColumnRow>, keys: Vec<ColumnRow>) -> Vec<Entity> {
	let mut columns = group_by_table(columns);
	let mut keys = group_by_table(keys);

	let mut entities = tables
		.into_iter()
		.map(|table| {
			let id = (table.table_schema, table.table_name);
			let kind = EntityKind::from_table_type(&table.table_type);
			let columns = columns.remove(&id).unwrap_or_default();
			let mut key = keys.remove(&id).unwrap_or_default();
			key.retain(|column| columns.contains(column));
			Entity { primary_key_columns: key, columns, kind, schema: id.0, name: id.1 }
		})
		.collect::<Vec<_>>();
	entities.sort_by(Entity::cmp_key);
	entities
}

fn group_by_table(rows: Vec<ColumnRow>) -> HashMap<(String, String), Vec<String>> {
	rows.into_iter().map(|row| ((row.table_schema, row.table_name), row.column_name)).into_group_map()
}
