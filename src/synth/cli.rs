use crate::entity::{DbType, Entity, EntityKind};
use async_trait::async_trait;
use std::{
	fmt, io,
	path::{Path, PathBuf},
	time::Duration,
};
use thiserror::Error;
use tokio::process::Command;

/// Stderr fragments the tool prints on runs that still succeed.
const BENIGN_STDERR: &[&str] = &["Suggested update", "already exists"];

/// What goes into an entity's `source` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
	pub object: String,
	pub kind: EntityKind,
	pub key_fields: Vec<String>,
}
impl From<&Entity> for SourceSpec {
	fn from(entity: &Entity) -> Self {
		Self { object: entity.source(), kind: entity.kind, key_fields: entity.primary_key_columns.clone() }
	}
}
impl SourceSpec {
	fn push_args(&self, args: &mut Vec<String>) {
		args.push("--source".into());
		args.push(self.object.clone());
		if self.kind == EntityKind::View {
			args.push("--source.type".into());
			args.push("view".into());
		}
		if !self.key_fields.is_empty() {
			args.push("--source.key-fields".into());
			args.push(self.key_fields.join(","));
		}
	}
}

/// One invocation of the data API builder CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DabCommand {
	Version,
	Init { database_type: DbType, connection_string: String, config: String },
	Add { entity: String, source: SourceSpec, config: String },
	Update { entity: String, source: SourceSpec, config: String },
	Map { entity: String, columns: Vec<String>, config: String },
}
impl DabCommand {
	pub fn args(&self) -> Vec<String> {
		let mut args = vec![];
		match self {
			DabCommand::Version => args.push("--version".into()),
			DabCommand::Init { database_type, connection_string, config } => {
				args.extend([
					"init".into(),
					"--database-type".into(),
					database_type.cli_token().into(),
					"--connection-string".into(),
					connection_string.clone(),
					"--config".into(),
					config.clone(),
				]);
			},
			DabCommand::Add { entity, source, config } => {
				args.push("add".into());
				args.push(entity.clone());
				source.push_args(&mut args);
				args.extend(["--rest".into(), entity.clone(), "--permissions".into(), "anonymous:*".into()]);
				args.extend(["--config".into(), config.clone()]);
			},
			DabCommand::Update { entity, source, config } => {
				args.push("update".into());
				args.push(entity.clone());
				source.push_args(&mut args);
				args.extend(["--rest".into(), entity.clone(), "--config".into(), config.clone()]);
			},
			DabCommand::Map { entity, columns, config } => {
				let map = columns.iter().map(|column| format!("{}:{}", column, column)).collect::<Vec<_>>();
				args.extend([
					"update".into(),
					entity.clone(),
					"--map".into(),
					map.join(","),
					"--config".into(),
					config.clone(),
				]);
			},
		}
		args
	}
}
/// Renders the command line with the connection string masked.
impl fmt::Display for DabCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut args = self.args();
		if let DabCommand::Init { .. } = self {
			if let Some(idx) = args.iter().position(|arg| arg == "--connection-string") {
				if let Some(value) = args.get_mut(idx + 1) {
					*value = "***".into();
				}
			}
		}
		write!(f, "dab {}", args.join(" "))
	}
}

#[derive(Debug, Error)]
pub enum CliError {
	#[error("could not start `{program}`: {source}")]
	Spawn {
		program: String,
		#[source]
		source: io::Error,
	},
	#[error("exited with {}: {stderr}", exit_label(.code))]
	Failed { code: Option<i32>, stderr: String },
	#[error("timed out after {0:?}")]
	TimedOut(Duration),
}

fn exit_label(code: &Option<i32>) -> String {
	match code {
		Some(code) => format!("code {}", code),
		None => "signal".into(),
	}
}

/// Runs data API builder commands against a config file in `cwd`.
#[async_trait]
pub trait CliRunner: Send + Sync {
	async fn run(&self, command: &DabCommand, cwd: &Path) -> Result<String, CliError>;
}

/// Spawns the real `dab` executable.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
	program: PathBuf,
	timeout: Option<Duration>,
}
impl ProcessRunner {
	pub fn new(program: impl Into<PathBuf>) -> Self {
		Self { program: program.into(), timeout: None }
	}

	pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.timeout = timeout;
		self
	}
}
impl Default for ProcessRunner {
	fn default() -> Self {
		Self::new("dab")
	}
}
#[async_trait]
impl CliRunner for ProcessRunner {
	async fn run(&self, command: &DabCommand, cwd: &Path) -> Result<String, CliError> {
		log::debug!("running `{}` in {}", command, cwd.display());

		let mut process = Command::new(&self.program);
		process.args(command.args()).current_dir(cwd).kill_on_drop(true);
		let output = process.output();
		let output = match self.timeout {
			Some(timeout) => {
				tokio::time::timeout(timeout, output).await.map_err(|_| CliError::TimedOut(timeout))?
			},
			None => output.await,
		}
		.map_err(|source| CliError::Spawn { program: self.program.display().to_string(), source })?;

		let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
		if !output.status.success() {
			return Err(CliError::Failed { code: output.status.code(), stderr });
		}
		if !stderr.is_empty() && !BENIGN_STDERR.iter().any(|marker| stderr.contains(marker)) {
			log::info!("dab stderr: {}", stderr);
		}
		Ok(String::from_utf8_lossy(&output.stdout).into_owned())
	}
}
