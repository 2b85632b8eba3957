use crate::synth::cli::CliError;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
	#[error("Not connected to database.")]
	NotConnected,
	#[error("Connection failed: {0}")]
	Connect(#[source] sqlx::Error),
	#[error("Catalog query failed: {0}")]
	Query(#[source] sqlx::Error),
	#[error(
		"DAB CLI is not installed or not in PATH. Please run \"dotnet tool install -g Microsoft.DataApiBuilder\"."
	)]
	CliNotFound(#[source] CliError),
	#[error("`{command}` failed: {source}")]
	Synthesis {
		command: String,
		#[source]
		source: CliError,
	},
	#[error("{0}")]
	FolderPick(String),
	#[error(transparent)]
	Io(#[from] std::io::Error),
	#[error(transparent)]
	Json(#[from] serde_json::Error),
}
