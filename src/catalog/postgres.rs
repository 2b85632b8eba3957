use super::{
	assemble,
	connection::{invalid, is_url, ConnectParams},
	live_pool, CatalogReader, ColumnRow, TableRow,
};
use crate::{
	entity::{DbType, Entity},
	Error, Result,
};
use async_trait::async_trait;
use sqlx::{
	postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
	query_as, PgPool,
};

const TABLES_SQL: &str = "SELECT table_schema::text AS table_schema, table_name::text AS table_name,
		table_type::text AS table_type
	FROM information_schema.tables
	WHERE table_schema::text = ANY($1)
	ORDER BY table_schema, table_name;";

const COLUMNS_SQL: &str = "SELECT table_schema::text AS table_schema, table_name::text AS table_name,
		column_name::text AS column_name
	FROM information_schema.columns
	WHERE table_schema::text = ANY($1)
	ORDER BY table_schema, table_name, ordinal_position;";

const KEYS_SQL: &str = "SELECT kcu.table_schema::text AS table_schema, kcu.table_name::text AS table_name,
		kcu.column_name::text AS column_name
	FROM information_schema.table_constraints tc
	JOIN information_schema.key_column_usage kcu
		ON tc.constraint_name = kcu.constraint_name
		AND tc.table_schema = kcu.table_schema
		AND tc.table_name = kcu.table_name
	WHERE tc.constraint_type = 'PRIMARY KEY'
		AND tc.table_schema::text = ANY($1)
	ORDER BY kcu.table_schema, kcu.table_name, kcu.ordinal_position;";

/// Accepts `postgres://` URLs as well as Npgsql `Host=..;Database=..` strings.
fn connect_options(connection_string: &str) -> Result<PgConnectOptions> {
	if is_url(connection_string) {
		return connection_string.parse::<PgConnectOptions>().map_err(Error::Connect);
	}
	let params = ConnectParams::npgsql(connection_string)?;
	let mut options = PgConnectOptions::new();
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
	if let Some(mode) = &params.ssl_mode {
		options = options.ssl_mode(ssl_mode(mode)?);
	}
	Ok(options)
}

fn ssl_mode(mode: &str) -> Result<PgSslMode> {
	Ok(match mode {
		"disable" => PgSslMode::Disable,
		"allow" => PgSslMode::Allow,
		"prefer" => PgSslMode::Prefer,
		"require" => PgSslMode::Require,
		"verifyca" => PgSslMode::VerifyCa,
		"verifyfull" => PgSslMode::VerifyFull,
		other => return Err(invalid(format!("unsupported SSL mode `{}`", other))),
	})
}

/// Catalog reader for PostgreSQL, limited to an explicit set of schemas.
pub struct PostgresCatalog {
	schemas: Vec<String>,
	pool: Option<PgPool>,
}
impl PostgresCatalog {
	pub fn new(schemas: Vec<String>) -> Self {
		Self { schemas, pool: None }
	}

	pub fn schemas(&self) -> &[String] {
		&self.schemas
	}
}
impl Default for PostgresCatalog {
	fn default() -> Self {
		Self::new(vec!["public".to_string()])
	}
}
#[async_trait]
impl CatalogReader for PostgresCatalog {
	fn db_type(&self) -> DbType {
		DbType::Postgres
	}

	async fn connect(&mut self, connection_string: &str) -> Result<()> {
		self.disconnect().await;
		let options = connect_options(connection_string)?;
		let pool = PgPoolOptions::new().max_connections(1).connect_with(options).await.map_err(Error::Connect)?;
		self.pool = Some(pool);
		Ok(())
	}

	async fn list_entities(&self) -> Result<Vec<Entity>> {
		let pool = live_pool(&self.pool)?;

		let tables =
			query_as::<_, TableRow>(TABLES_SQL).bind(&self.schemas).fetch_all(pool).await.map_err(Error::Query)?;
		let columns =
			query_as::<_, ColumnRow>(COLUMNS_SQL).bind(&self.schemas).fetch_all(pool).await.map_err(Error::Query)?;
		let keys =
			query_as::<_, ColumnRow>(KEYS_SQL).bind(&self.schemas).fetch_all(pool).await.map_err(Error::Query)?;

		log::debug!(
			"postgres catalog: {} tables/views, {} columns, {} key columns in {:?}",
			tables.len(),
			columns.len(),
			keys.len(),
			self.schemas
		);
		Ok(assemble(tables, columns, keys))
	}

	async fn disconnect(&mut self) {
		if let Some(pool) = self.pool.take() {
			pool.close().await;
		}
	}
}
