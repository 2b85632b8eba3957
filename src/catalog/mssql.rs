use super::{
	assemble,
	connection::{is_url, ConnectParams},
	live_pool, CatalogReader, ColumnRow, TableRow,
};
use crate::{
	entity::{DbType, Entity},
	Error, Result,
};
use async_trait::async_trait;
use sqlx::{
	mssql::{Mssql, MssqlConnectOptions, MssqlPool},
	pool::PoolOptions,
	query_as,
};

type MssqlPoolOptions = PoolOptions<Mssql>;

const TABLES_SQL: &str = "SELECT CAST(TABLE_SCHEMA AS NVARCHAR(128)) AS table_schema,
		CAST(TABLE_NAME AS NVARCHAR(128)) AS table_name,
		CAST(TABLE_TYPE AS NVARCHAR(32)) AS table_type
	FROM INFORMATION_SCHEMA.TABLES
	WHERE TABLE_TYPE IN ('BASE TABLE', 'VIEW')
	ORDER BY TABLE_SCHEMA, TABLE_NAME;";

const COLUMNS_SQL: &str = "SELECT CAST(TABLE_SCHEMA AS NVARCHAR(128)) AS table_schema,
		CAST(TABLE_NAME AS NVARCHAR(128)) AS table_name,
		CAST(COLUMN_NAME AS NVARCHAR(128)) AS column_name
	FROM INFORMATION_SCHEMA.COLUMNS
	ORDER BY TABLE_SCHEMA, TABLE_NAME, ORDINAL_POSITION;";

const KEYS_SQL: &str = "SELECT CAST(SCHEMA_NAME(t.schema_id) AS NVARCHAR(128)) AS table_schema,
		CAST(t.name AS NVARCHAR(128)) AS table_name,
		CAST(c.name AS NVARCHAR(128)) AS column_name
	FROM sys.tables t
	INNER JOIN sys.indexes i ON t.object_id = i.object_id
	INNER JOIN sys.index_columns ic ON i.object_id = ic.object_id AND i.index_id = ic.index_id
	INNER JOIN sys.columns c ON ic.object_id = c.object_id AND ic.column_id = c.column_id
	WHERE i.is_primary_key = 1
	ORDER BY SCHEMA_NAME(t.schema_id), t.name, ic.key_ordinal;";

/// Accepts SqlClient strings (`Server=host,port;Database=..;User Id=..;Password=..`), the
/// form written into the generated config, and `mssql://` URLs.
fn connect_options(connection_string: &str) -> Result<MssqlConnectOptions> {
	if is_url(connection_string) {
		return connection_string.parse::<MssqlConnectOptions>().map_err(Error::Connect);
	}
	let params = ConnectParams::sql_server(connection_string)?;
	let mut options = MssqlConnectOptions::new();
	if let Some(host) = &params.host {
		options = options.host(host);
	}
	if let Some(port) = params.port {
		options = options.port(port);
	}
	if let Some(database) = &params.database {
		options = options.database(database);
	}
	if let Some(username) = &params.username {
		options = options.username(username);
	}
	if let Some(password) = &params.password {
		options = options.password(password);
	}
	Ok(options)
}

/// Catalog reader for SQL Server. Sees every schema the credential can see.
#[derive(Default)]
pub struct MssqlCatalog {
	pool: Option<MssqlPool>,
}
impl MssqlCatalog {
	pub fn new() -> Self {
		Self::default()
	}
}
#[async_trait]
impl CatalogReader for MssqlCatalog {
	fn db_type(&self) -> DbType {
		DbType::Mssql
	}

	async fn connect(&mut self, connection_string: &str) -> Result<()> {
		self.disconnect().await;
		let options = connect_options(connection_string)?;
		let pool = MssqlPoolOptions::new().max_connections(1).connect_with(options).await.map_err(Error::Connect)?;
		self.pool = Some(pool);
		Ok(())
	}

	async fn list_entities(&self) -> Result<Vec<Entity>> {
		let pool = live_pool(&self.pool)?;

		let tables = query_as::<_, TableRow>(TABLES_SQL).fetch_all(pool).await.map_err(Error::Query)?;
		let columns = query_as::<_, ColumnRow>(COLUMNS_SQL).fetch_all(pool).await.map_err(Error::Query)?;
		let keys = query_as::<_, ColumnRow>(KEYS_SQL).fetch_all(pool).await.map_err(Error::Query)?;

		log::debug!("mssql catalog: {} tables/views, {} columns, {} key columns", tables.len(), columns.len(), keys.len());
		Ok(assemble(tables, columns, keys))
	}

	async fn disconnect(&mut self) {
		if let Some(pool) = self.pool.take() {
			pool.close().await;
		}
	}
}
