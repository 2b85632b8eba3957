pub mod cli;

use self::cli::{CliRunner, DabCommand, SourceSpec};
use crate::{
	entity::{DbType, Entity},
	Error, Result,
};
use serde_json::{Map, Value};
use std::{
	ffi::OsStr,
	path::{Path, PathBuf},
	sync::Arc,
};
use tokio::fs;

pub const DEFAULT_CONFIG_FILENAME: &str = "dab-config.json";

/// Drives the data API builder CLI to create or update a config file for a set of entities.
#[derive(Clone)]
pub struct ConfigSynthesizer {
	runner: Arc<dyn CliRunner>,
}
impl ConfigSynthesizer {
	pub fn new(runner: impl CliRunner + 'static) -> Self {
		Self { runner: Arc::new(runner) }
	}

	pub fn from_arc(runner: Arc<dyn CliRunner>) -> Self {
		Self { runner }
	}

	/// Creates `output` if it does not exist, then adds or updates every entity in `(schema, name)`
	/// order and finally sorts the `entities` map. Returns the absolute path of the config file.
	///
	/// Only a missing CLI and a failed `init` are fatal. Per-entity failures are logged and skipped.
	pub async fn synthesize(
		&self,
		db_type: DbType,
		connection_string: &str,
		entities: &[Entity],
		output: &Path,
	) -> Result<PathBuf> {
		let (cwd, config) = split_output(output).await?;
		let config_path = cwd.join(&config);

		self.runner.run(&DabCommand::Version, &cwd).await.map_err(Error::CliNotFound)?;

		if fs::metadata(&config_path).await.is_err() {
			let init = DabCommand::Init {
				database_type: db_type,
				connection_string: connection_string.to_string(),
				config: config.clone(),
			};
			self.runner
				.run(&init, &cwd)
				.await
				.map_err(|source| Error::Synthesis { command: init.to_string(), source })?;
			log::info!("initialized {}", config_path.display());
		}

		let mut sorted = entities.iter().collect::<Vec<_>>();
		sorted.sort_by(|a, b| a.cmp_key(b));
		for entity in sorted {
			self.apply_entity(entity, &config, &cwd).await;
		}

		if let Err(err) = canonicalize_entities(&config_path).await {
			log::warn!("failed to sort entities in {}: {}", config_path.display(), err);
		}

		Ok(config_path)
	}

	async fn apply_entity(&self, entity: &Entity, config: &str, cwd: &Path) {
		let name = entity.friendly_name().to_string();
		let source = SourceSpec::from(entity);

		let add = DabCommand::Add { entity: name.clone(), source: source.clone(), config: config.to_string() };
		if let Err(add_err) = self.runner.run(&add, cwd).await {
			log::debug!("add {} failed ({}), updating instead", name, add_err);
			let update = DabCommand::Update { entity: name.clone(), source, config: config.to_string() };
			if let Err(err) = self.runner.run(&update, cwd).await {
				log::warn!("failed to add or update entity {}: {}", name, err);
			}
		}

		if !entity.columns.is_empty() {
			let map = DabCommand::Map { entity: name.clone(), columns: entity.columns.clone(), config: config.to_string() };
			if let Err(err) = self.runner.run(&map, cwd).await {
				log::warn!("failed to update mapping for {}: {}", name, err);
			}
		}
	}
}

/// Splits the output path into an absolute working directory (created if missing) and the
/// file name passed to `--config`.
async fn split_output(output: &Path) -> Result<(PathBuf, String)> {
	let config = output
		.file_name()
		.and_then(OsStr::to_str)
		.map(str::to_string)
		.unwrap_or_else(|| DEFAULT_CONFIG_FILENAME.to_string());
	let folder = match output.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
		_ => PathBuf::from("."),
	};
	fs::create_dir_all(&folder).await?;
	Ok((fs::canonicalize(&folder).await?, config))
}

/// Rewrites the config file with the keys of its `entities` map in lexicographic order.
/// Everything else keeps the order it was written in. Files without an `entities` object are
/// left untouched.
pub async fn canonicalize_entities(path: &Path) -> Result<()> {
	let content = fs::read_to_string(path).await?;
	let mut config: Value = serde_json::from_str(&content)?;

	let entities = match config.get_mut("entities") {
		Some(Value::Object(entities)) => entities,
		_ => return Ok(()),
	};
	let mut sorted = std::mem::take(entities).into_iter().collect::<Vec<_>>();
	sorted.sort_by(|a, b| a.0.cmp(&b.0));
	*entities = sorted.into_iter().collect::<Map<_, _>>();

	fs::write(path, serde_json::to_string_pretty(&config)?).await?;
	Ok(())
}
