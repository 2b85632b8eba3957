//! Connect → select → generate flow, independent of how it is rendered.

use crate::{
	entity::{DbType, Entity},
	message::{Request, Response},
	state::Profile,
};
use std::{collections::HashMap, path::PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
	Connecting,
	Selecting,
}

/// Which entities to generate, by `schema.name` id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
	pub ids: Vec<String>,
	/// Key columns supplied by the user, mostly for views.
	pub keys: HashMap<String, Vec<String>>,
}
impl Selection {
	pub fn add(&mut self, id: impl Into<String>) -> &mut Self {
		self.ids.push(id.into());
		self
	}

	pub fn with_key<I, S>(&mut self, id: impl Into<String>, columns: I) -> &mut Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.keys.insert(id.into(), columns.into_iter().map(Into::into).collect());
		self
	}

	/// Selected entities in catalog order. Views take their key from `keys` (empty if none was
	/// given); tables keep their discovered key unless one is supplied.
	pub fn resolve(&self, tables: &[Entity]) -> Vec<Entity> {
		tables
			.iter()
			.filter(|entity| self.ids.iter().any(|id| *id == entity.source()))
			.map(|entity| {
				let mut entity = entity.clone();
				match self.keys.get(&entity.source()) {
					Some(key) => entity.primary_key_columns = key.clone(),
					None if entity.is_view() => entity.primary_key_columns.clear(),
					None => {},
				}
				entity
			})
			.collect()
	}

	pub fn unknown_ids<'a>(&'a self, tables: &'a [Entity]) -> impl Iterator<Item = &'a String> + 'a {
		self.ids.iter().filter(move |id| !tables.iter().any(|entity| entity.source() == **id))
	}
}

#[derive(Debug, Clone)]
pub struct Wizard {
	pub screen: Screen,
	pub loading: bool,
	pub profile: Option<Profile>,
	pub tables: Vec<Entity>,
	pub last_error: Option<String>,
	pub last_generated: Option<PathBuf>,
}
impl Default for Wizard {
	fn default() -> Self {
		Self::new()
	}
}
impl Wizard {
	pub fn new() -> Self {
		Self {
			screen: Screen::Connecting,
			loading: false,
			profile: None,
			tables: vec![],
			last_error: None,
			last_generated: None,
		}
	}

	pub fn ready(&self) -> Request {
		Request::Ready
	}

	pub fn connect(&mut self, db_type: DbType, connection_string: impl Into<String>) -> Request {
		self.loading = true;
		self.last_error = None;
		Request::Connect { db_type, connection_string: connection_string.into() }
	}

	/// `None` unless the entity list is on screen and nothing is in flight.
	pub fn generate(
		&mut self,
		selection: &Selection,
		filename: Option<String>,
		target_folder: Option<PathBuf>,
	) -> Option<Request> {
		if self.screen != Screen::Selecting || self.loading {
			return None;
		}
		self.loading = true;
		self.last_error = None;
		Some(Request::GenerateConfig { selected_tables: selection.resolve(&self.tables), filename, target_folder })
	}

	pub fn back(&mut self) {
		self.screen = Screen::Connecting;
		self.loading = false;
	}

	pub fn receive(&mut self, response: &Response) {
		match response {
			Response::Init { db_type, connection_string, target_folder, filename } => {
				self.profile = Some(Profile {
					db_type: *db_type,
					connection_string: connection_string.clone(),
					target_folder: target_folder.clone(),
					filename: filename.clone(),
				});
			},
			Response::TablesLoaded { tables } => {
				self.tables = tables.clone();
				self.loading = false;
				self.screen = Screen::Selecting;
			},
			Response::Generated { path } => {
				self.loading = false;
				self.last_generated = Some(path.clone());
			},
			Response::FolderPicked { path } => {
				if let Some(profile) = &mut self.profile {
					profile.target_folder = path.clone();
				}
			},
			Response::Error { error } => {
				self.loading = false;
				self.last_error = Some(error.clone());
			},
		}
	}
}
