use crate::{
	catalog::{CatalogReader, MssqlCatalog, PostgresCatalog},
	entity::{DbType, Entity},
	message::{Request, Response},
	state::{ProfilePatch, StateStore},
	synth::{ConfigSynthesizer, DEFAULT_CONFIG_FILENAME},
	Error, Result,
};
use async_trait::async_trait;
use std::{path::PathBuf, sync::Arc};

/// Native folder chooser offered by some hosts.
#[async_trait]
pub trait FolderPicker: Send + Sync {
	/// `Ok(None)` when the user dismisses the dialog.
	async fn pick_folder(&self) -> Result<Option<PathBuf>>;
}

/// Handles wizard commands for one UI session, whatever the transport.
pub struct Session {
	store: Arc<dyn StateStore>,
	postgres: Box<dyn CatalogReader>,
	mssql: Box<dyn CatalogReader>,
	synthesizer: ConfigSynthesizer,
	picker: Option<Arc<dyn FolderPicker>>,
}
impl Session {
	pub fn new(store: Arc<dyn StateStore>, synthesizer: ConfigSynthesizer) -> Self {
		Self {
			store,
			postgres: Box::new(PostgresCatalog::default()),
			mssql: Box::new(MssqlCatalog::new()),
			synthesizer,
			picker: None,
		}
	}

	/// Replaces the reader used for `reader.db_type()`.
	pub fn with_reader(mut self, reader: impl CatalogReader + 'static) -> Self {
		match reader.db_type() {
			DbType::Postgres => self.postgres = Box::new(reader),
			DbType::Mssql => self.mssql = Box::new(reader),
		}
		self
	}

	pub fn with_folder_picker(mut self, picker: Arc<dyn FolderPicker>) -> Self {
		self.picker = Some(picker);
		self
	}

	/// Picker for `pickFolder`, for hosts that run the dialog without holding the session.
	pub fn folder_picker(&self) -> Option<Arc<dyn FolderPicker>> {
		self.picker.clone()
	}

	/// Never fails: errors are logged and answered with `Response::Error`.
	pub async fn handle(&mut self, request: Request) -> Response {
		let command = request.name();
		log::info!("received command: {}", command);
		answer(command, self.dispatch(request).await)
	}

	async fn dispatch(&mut self, request: Request) -> Result<Response> {
		match request {
			Request::Ready => Ok(self.store.load().await?.into()),
			Request::Connect { db_type, connection_string } => {
				let tables = self.connect(db_type, &connection_string).await?;
				self.store
					.merge(ProfilePatch {
						db_type: Some(db_type),
						connection_string: Some(connection_string),
						..Default::default()
					})
					.await?;
				Ok(Response::TablesLoaded { tables })
			},
			Request::GenerateConfig { selected_tables, filename, target_folder } => {
				let path = self.generate(&selected_tables, filename, target_folder).await?;
				Ok(Response::Generated { path })
			},
			Request::PickFolder => pick(self.picker.as_deref()).await,
		}
	}

	async fn connect(&mut self, db_type: DbType, connection_string: &str) -> Result<Vec<Entity>> {
		let reader = match db_type {
			DbType::Postgres => &mut self.postgres,
			DbType::Mssql => &mut self.mssql,
		};
		reader.connect(connection_string).await?;
		let tables = reader.list_entities().await?;
		log::info!("loaded {} tables and views from {}", tables.len(), db_type);
		Ok(tables)
	}

	async fn generate(
		&mut self,
		entities: &[Entity],
		filename: Option<String>,
		target_folder: Option<PathBuf>,
	) -> Result<PathBuf> {
		let profile = self.store.load().await?;
		let filename = filename
			.filter(|name| !name.trim().is_empty())
			.or(profile.filename)
			.unwrap_or_else(|| DEFAULT_CONFIG_FILENAME.to_string());
		let folder = target_folder
			.filter(|folder| !folder.as_os_str().is_empty())
			.or(Some(profile.target_folder))
			.filter(|folder| !folder.as_os_str().is_empty())
			.unwrap_or_else(|| PathBuf::from("."));

		let path = self
			.synthesizer
			.synthesize(profile.db_type, &profile.connection_string, entities, &folder.join(&filename))
			.await?;
		log::info!("generated config at: {}", path.display());

		self.store
			.merge(ProfilePatch {
				target_folder: path.parent().map(PathBuf::from),
				filename: Some(filename),
				..Default::default()
			})
			.await?;
		Ok(path)
	}

	/// Closes every open database connection.
	pub async fn close(&mut self) {
		self.postgres.disconnect().await;
		self.mssql.disconnect().await;
	}
}

/// Answers `pickFolder` with `picker`, the way `Session::handle` would.
pub async fn pick_folder(picker: Option<Arc<dyn FolderPicker>>) -> Response {
	log::info!("received command: pickFolder");
	answer("pickFolder", pick(picker.as_deref()).await)
}

async fn pick(picker: Option<&dyn FolderPicker>) -> Result<Response> {
	let picker = picker.ok_or_else(|| Error::FolderPick("Folder picking is not available in this host".into()))?;
	match picker.pick_folder().await? {
		Some(path) => Ok(Response::FolderPicked { path }),
		None => Err(Error::FolderPick("Folder selection canceled".into())),
	}
}

fn answer(command: &str, result: Result<Response>) -> Response {
	result.unwrap_or_else(|err| {
		log::error!("error handling {}: {}", command, err);
		Response::Error { error: err.to_string() }
	})
}
