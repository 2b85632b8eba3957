mod folder;
mod headless;
pub mod serve;

pub use folder::NativeFolderPicker;

use anyhow::{Error, Result};
use clap::{Parser, Subcommand};
use dab_scaffolder::{
	catalog::PostgresCatalog,
	channel::MessageChannel,
	state::{file::DEFAULT_STATE_FILENAME, FileStateStore},
	synth::cli::ProcessRunner,
	ConfigSynthesizer, DbType, Session,
};
use dotenv::dotenv;
use headless::GenerateOptions;
use std::{env, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
	/// File remembering the last connection and output folder
	#[clap(long, default_value = DEFAULT_STATE_FILENAME)]
	state_file: PathBuf,

	/// Data API builder executable
	#[clap(long, env = "DAB_CLI", default_value = "dab")]
	dab: PathBuf,

	/// PostgreSQL schemas to list (defaults to `public`)
	#[clap(long = "schema")]
	schemas: Vec<String>,

	/// Give up on a single `dab` invocation after this many seconds
	#[clap(long)]
	cli_timeout: Option<u64>,

	#[clap(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Serve the wizard over HTTP
	Serve {
		#[clap(long, default_value_t = 5000)]
		port: u16,
		/// Open the wizard in a browser once listening
		#[clap(long)]
		open: bool,
	},
	/// Print the tables and views of a database
	List {
		#[clap(long)]
		db_type: DbType,
		#[clap(long, env = "DATABASE_URL", hide_env_values = true)]
		connection_string: String,
	},
	/// Write a config file without the UI
	Generate {
		#[clap(long)]
		db_type: DbType,
		#[clap(long, env = "DATABASE_URL", hide_env_values = true)]
		connection_string: String,
		/// `schema.name` to include; every table when omitted
		#[clap(long = "table")]
		tables: Vec<String>,
		/// Key columns for an entity, as `schema.name=col1,col2`
		#[clap(long = "key")]
		keys: Vec<String>,
		#[clap(long)]
		folder: Option<PathBuf>,
		#[clap(long)]
		filename: Option<String>,
	},
}

pub async fn run() -> Result<(), Error> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	dotenv().ok();

	let cli = Cli::parse();
	let session = build_session(&cli)?;

	match cli.command {
		Commands::Serve { port, open } => {
			let session = session.with_folder_picker(Arc::new(NativeFolderPicker));
			serve::serve(SocketAddr::from(([127, 0, 0, 1], port)), session, open).await?
		},
		Commands::List { db_type, connection_string } => {
			let mut channel = MessageChannel::spawn(session);
			let result = headless::list(&mut channel, db_type, connection_string).await;
			channel.dispose().await;
			result?
		},
		Commands::Generate { db_type, connection_string, tables, keys, folder, filename } => {
			let options = GenerateOptions { db_type, connection_string, tables, keys, folder, filename };
			let mut channel = MessageChannel::spawn(session);
			let result = headless::generate(&mut channel, options).await;
			channel.dispose().await;
			println!("Generated config at: {}", result?.display());
		},
	}

	Ok(())
}

fn build_session(cli: &Cli) -> Result<Session> {
	let store = FileStateStore::new(&cli.state_file, env::current_dir()?);
	let runner = ProcessRunner::new(&cli.dab).with_timeout(cli.cli_timeout.map(Duration::from_secs));
	let schemas = if cli.schemas.is_empty() { vec!["public".to_string()] } else { cli.schemas.clone() };
	Ok(Session::new(Arc::new(store), ConfigSynthesizer::new(runner)).with_reader(PostgresCatalog::new(schemas)))
}
