//! Commands exchanged between the wizard UI and the backend, identical on every transport.

use crate::{
	entity::{DbType, Entity},
	state::Profile,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Request {
	Ready,
	#[serde(rename_all = "camelCase")]
	Connect { db_type: DbType, connection_string: String },
	#[serde(rename_all = "camelCase")]
	GenerateConfig {
		selected_tables: Vec<Entity>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		filename: Option<String>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		target_folder: Option<PathBuf>,
	},
	PickFolder,
}
impl Request {
	pub fn name(&self) -> &'static str {
		match self {
			Request::Ready => "ready",
			Request::Connect { .. } => "connect",
			Request::GenerateConfig { .. } => "generateConfig",
			Request::PickFolder => "pickFolder",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Response {
	#[serde(rename_all = "camelCase")]
	Init {
		db_type: DbType,
		connection_string: String,
		target_folder: PathBuf,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		filename: Option<String>,
	},
	TablesLoaded { tables: Vec<Entity> },
	Generated { path: PathBuf },
	FolderPicked { path: PathBuf },
	Error { error: String },
}
impl From<Profile> for Response {
	fn from(profile: Profile) -> Self {
		Response::Init {
			db_type: profile.db_type,
			connection_string: profile.connection_string,
			target_folder: profile.target_folder,
			filename: profile.filename,
		}
	}
}
