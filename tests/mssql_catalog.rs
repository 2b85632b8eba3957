// Live test runs against the SQL Server named by MSSQL_CONNECTION_STRING: `cargo test -- --ignored`.

use anyhow::Result;
use dab_scaffolder::{
	catalog::{CatalogReader, MssqlCatalog},
	DbType, EntityKind, Error,
};
use std::env;

#[tokio::test]
async fn listing_without_connection_fails() {
	let catalog = MssqlCatalog::new();
	assert_eq!(catalog.db_type(), DbType::Mssql);
	assert!(matches!(catalog.list_entities().await, Err(Error::NotConnected)));
}

#[tokio::test]
async fn failed_connect_leaves_reader_disconnected() {
	let mut catalog = MssqlCatalog::new();
	assert!(matches!(catalog.connect("Server=db.internal,port;Database=app").await, Err(Error::Connect(_))));
	assert!(matches!(catalog.list_entities().await, Err(Error::NotConnected)));
	catalog.disconnect().await;
}

#[tokio::test]
#[ignore]
async fn lists_sorted_entities_with_keys_among_columns() -> Result<()> {
	let connection_string = env::var("MSSQL_CONNECTION_STRING")?;
	let mut catalog = MssqlCatalog::new();
	catalog.connect(&connection_string).await?;
	let entities = catalog.list_entities().await?;
	catalog.disconnect().await;

	assert!(entities.windows(2).all(|pair| pair[0].cmp_key(&pair[1]).is_lt()));
	for entity in &entities {
		assert!(entity.primary_key_columns.iter().all(|key| entity.columns.contains(key)), "{:?}", entity);
		if entity.kind == EntityKind::View {
			assert!(entity.primary_key_columns.is_empty());
		}
	}
	assert!(matches!(catalog.list_entities().await, Err(Error::NotConnected)));
	Ok(())
}
