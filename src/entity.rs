use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};

/// Database backend a session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
	Mssql,
	Postgres,
}
impl DbType {
	/// Token the external CLI expects for `init --database-type`.
	pub fn cli_token(self) -> &'static str {
		match self {
			DbType::Mssql => "mssql",
			DbType::Postgres => "postgresql",
		}
	}
}
impl Default for DbType {
	fn default() -> Self {
		DbType::Mssql
	}
}
impl fmt::Display for DbType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DbType::Mssql => f.write_str("mssql"),
			DbType::Postgres => f.write_str("postgres"),
		}
	}
}
impl FromStr for DbType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"mssql" | "sqlserver" => Ok(DbType::Mssql),
			"postgres" | "postgresql" | "pg" => Ok(DbType::Postgres),
			other => Err(format!("unsupported database type `{}`", other)),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
	Table,
	View,
}
impl EntityKind {
	pub fn from_table_type(table_type: &str) -> Self {
		if table_type == "VIEW" { EntityKind::View } else { EntityKind::Table }
	}
}

/// A table or view discovered in the catalog. `(schema, name)` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
	pub schema: String,
	pub name: String,
	#[serde(rename = "type")]
	pub kind: EntityKind,
	#[serde(rename = "keyFields", alias = "primaryKeyColumns", default)]
	pub primary_key_columns: Vec<String>,
	#[serde(default)]
	pub columns: Vec<String>,
}
impl Entity {
	pub fn new(schema: impl Into<String>, name: impl Into<String>, kind: EntityKind) -> Self {
		Self { schema: schema.into(), name: name.into(), kind, primary_key_columns: vec![], columns: vec![] }
	}

	pub fn with_columns<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.columns = columns.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_key<I, S>(mut self, key: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.primary_key_columns = key.into_iter().map(Into::into).collect();
		self
	}

	/// `schema.name`, used both as the selection id and as the config `source`.
	pub fn source(&self) -> String {
		format!("{}.{}", self.schema, self.name)
	}

	pub fn friendly_name(&self) -> &str {
		&self.name
	}

	pub fn is_view(&self) -> bool {
		self.kind == EntityKind::View
	}

	pub fn cmp_key(&self, other: &Self) -> Ordering {
		(&self.schema, &self.name).cmp(&(&other.schema, &other.name))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn entity_uses_wire_field_names() {
		let users = Entity::new("public", "users", EntityKind::Table).with_columns(["id", "name"]).with_key(["id"]);
		let value = serde_json::to_value(&users).unwrap();
		assert_eq!(
			value,
			json!({"schema": "public", "name": "users", "type": "table", "keyFields": ["id"], "columns": ["id", "name"]})
		);
	}

	#[test]
	fn entity_accepts_primary_key_alias() {
		let entity: Entity = serde_json::from_value(json!({
			"schema": "dbo",
			"name": "v_orders",
			"type": "view",
			"primaryKeyColumns": ["order_id"],
		}))
		.unwrap();
		assert!(entity.is_view());
		assert_eq!(entity.primary_key_columns, vec!["order_id"]);
		assert!(entity.columns.is_empty());
	}

	#[test]
	fn only_view_table_type_maps_to_view() {
		assert_eq!(EntityKind::from_table_type("VIEW"), EntityKind::View);
		assert_eq!(EntityKind::from_table_type("BASE TABLE"), EntityKind::Table);
		assert_eq!(EntityKind::from_table_type("FOREIGN"), EntityKind::Table);
	}

	#[test]
	fn db_type_tokens() {
		assert_eq!(DbType::Postgres.cli_token(), "postgresql");
		assert_eq!(DbType::Mssql.cli_token(), "mssql");
		assert_eq!("postgres".parse::<DbType>().unwrap(), DbType::Postgres);
		assert_eq!(serde_json::to_value(DbType::Postgres).unwrap(), json!("postgres"));
		assert!("oracle".parse::<DbType>().is_err());
	}
}
