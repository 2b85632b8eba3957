// Fakes shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use dab_scaffolder::{
	catalog::CatalogReader,
	synth::cli::{CliError, CliRunner, DabCommand, SourceSpec},
	DbType, Entity, EntityKind, Error, Result,
};
use serde_json::{json, Map, Value};
use std::{
	collections::HashSet,
	fs, io,
	path::{Path, PathBuf},
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc, Mutex,
	},
};

/// Stands in for the `dab` executable, editing the config file the way the real tool does.
#[derive(Clone, Default)]
pub struct FakeDab {
	pub missing: bool,
	pub fail_init: bool,
	pub fail_map_for: HashSet<String>,
	pub fail_update_for: HashSet<String>,
	pub calls: Arc<Mutex<Vec<DabCommand>>>,
}
impl FakeDab {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn missing() -> Self {
		Self { missing: true, ..Self::default() }
	}

	pub fn calls(&self) -> Vec<DabCommand> {
		self.calls.lock().unwrap().clone()
	}

	pub fn clear_calls(&self) {
		self.calls.lock().unwrap().clear();
	}

	fn failed(stderr: impl Into<String>) -> CliError {
		CliError::Failed { code: Some(1), stderr: stderr.into() }
	}

	fn load(path: &Path) -> Result<Value, CliError> {
		let content = fs::read_to_string(path).map_err(|e| Self::failed(e.to_string()))?;
		serde_json::from_str(&content).map_err(|e| Self::failed(e.to_string()))
	}

	fn store(path: &Path, config: &Value) -> Result<(), CliError> {
		fs::write(path, serde_json::to_string_pretty(config).unwrap()).map_err(|e| Self::failed(e.to_string()))
	}

	fn entities(config: &mut Value) -> &mut Map<String, Value> {
		config["entities"].as_object_mut().expect("entities object")
	}

	fn write_source(entity: &mut Value, source: &SourceSpec) {
		entity["source"]["object"] = json!(source.object);
		entity["source"]["type"] = json!(match source.kind {
			EntityKind::Table => "table",
			EntityKind::View => "view",
		});
		if !source.key_fields.is_empty() {
			entity["source"]["key-fields"] = json!(source.key_fields);
		}
	}
}
#[async_trait]
impl CliRunner for FakeDab {
	async fn run(&self, command: &DabCommand, cwd: &Path) -> Result<String, CliError> {
		self.calls.lock().unwrap().push(command.clone());
		if self.missing {
			return Err(CliError::Spawn {
				program: "dab".into(),
				source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
			});
		}

		match command {
			DabCommand::Version => Ok("Microsoft.DataApiBuilder 1.2.10\n".into()),
			DabCommand::Init { database_type, connection_string, config } => {
				if self.fail_init {
					return Err(Self::failed("Config file creation failed."));
				}
				let path = cwd.join(config);
				if path.exists() {
					return Err(Self::failed(format!("Config file: {} already exists.", config)));
				}
				Self::store(
					&path,
					&json!({
						"$schema": "https://github.com/Azure/data-api-builder/releases/latest/download/dab.draft.schema.json",
						"data-source": {
							"database-type": database_type.cli_token(),
							"connection-string": connection_string,
						},
						"runtime": {"rest": {"enabled": true, "path": "/api"}},
						"entities": {},
					}),
				)?;
				Ok(String::new())
			},
			DabCommand::Add { entity, source, config } => {
				let path = cwd.join(config);
				let mut value = Self::load(&path)?;
				let entities = Self::entities(&mut value);
				if entities.contains_key(entity) {
					return Err(Self::failed(format!("Entity '{}' is already present.", entity)));
				}
				let mut definition = json!({
					"source": {},
					"rest": {"enabled": true, "path": format!("/{}", entity)},
					"permissions": [{"role": "anonymous", "actions": [{"action": "*"}]}],
				});
				Self::write_source(&mut definition, source);
				entities.insert(entity.clone(), definition);
				Self::store(&path, &value)?;
				Ok(String::new())
			},
			DabCommand::Update { entity, source, config } => {
				if self.fail_update_for.contains(entity) {
					return Err(Self::failed(format!("Could not update entity {}", entity)));
				}
				let path = cwd.join(config);
				let mut value = Self::load(&path)?;
				let definition = Self::entities(&mut value)
					.get_mut(entity)
					.ok_or_else(|| Self::failed(format!("Entity '{}' not found.", entity)))?;
				Self::write_source(definition, source);
				Self::store(&path, &value)?;
				Ok(String::new())
			},
			DabCommand::Map { entity, columns, config } => {
				if self.fail_map_for.contains(entity) {
					return Err(Self::failed(format!("Invalid mapping for {}", entity)));
				}
				let path = cwd.join(config);
				let mut value = Self::load(&path)?;
				let definition = Self::entities(&mut value)
					.get_mut(entity)
					.ok_or_else(|| Self::failed(format!("Entity '{}' not found.", entity)))?;
				let mappings = columns.iter().map(|c| (c.clone(), json!(c))).collect::<Map<_, _>>();
				definition["mappings"] = Value::Object(mappings);
				Self::store(&path, &value)?;
				Ok(String::new())
			},
		}
	}
}

/// Catalog reader serving a fixed entity list.
#[derive(Clone)]
pub struct FakeCatalog {
	pub db_type: DbType,
	pub entities: Vec<Entity>,
	pub refuse: bool,
	pub connected: Arc<Mutex<Option<String>>>,
	pub disconnects: Arc<AtomicUsize>,
}
impl FakeCatalog {
	pub fn new(db_type: DbType, entities: Vec<Entity>) -> Self {
		Self {
			db_type,
			entities,
			refuse: false,
			connected: Arc::default(),
			disconnects: Arc::default(),
		}
	}

	pub fn refusing(db_type: DbType) -> Self {
		Self { refuse: true, ..Self::new(db_type, vec![]) }
	}

	pub fn disconnects(&self) -> usize {
		self.disconnects.load(Ordering::SeqCst)
	}
}
#[async_trait]
impl CatalogReader for FakeCatalog {
	fn db_type(&self) -> DbType {
		self.db_type
	}

	async fn connect(&mut self, connection_string: &str) -> Result<()> {
		self.disconnect().await;
		if self.refuse {
			return Err(Error::Connect(sqlx::Error::PoolTimedOut));
		}
		*self.connected.lock().unwrap() = Some(connection_string.to_string());
		Ok(())
	}

	async fn list_entities(&self) -> Result<Vec<Entity>> {
		if self.connected.lock().unwrap().is_none() {
			return Err(Error::NotConnected);
		}
		Ok(self.entities.clone())
	}

	async fn disconnect(&mut self) {
		if self.connected.lock().unwrap().take().is_some() {
			self.disconnects.fetch_add(1, Ordering::SeqCst);
		}
	}
}

pub fn users() -> Entity {
	Entity::new("public", "users", EntityKind::Table).with_columns(["id", "name"]).with_key(["id"])
}

pub fn active_users() -> Entity {
	Entity::new("public", "v_active_users", EntityKind::View).with_columns(["id", "name"])
}

pub fn orders() -> Entity {
	Entity::new("public", "orders", EntityKind::Table).with_columns(["id", "user_id", "total"]).with_key(["id"])
}

pub fn read_config(path: &Path) -> Value {
	serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

pub fn entity_keys(config: &Value) -> Vec<String> {
	config["entities"].as_object().unwrap().keys().cloned().collect()
}

pub fn canonical(path: &Path) -> PathBuf {
	fs::canonicalize(path).unwrap()
}
