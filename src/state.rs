pub mod file;

pub use self::file::FileStateStore;

use crate::{entity::DbType, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Last-used connection settings, remembered across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
	#[serde(default)]
	pub db_type: DbType,
	#[serde(default)]
	pub connection_string: String,
	#[serde(default)]
	pub target_folder: PathBuf,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filename: Option<String>,
}
impl Profile {
	pub fn new(target_folder: impl Into<PathBuf>) -> Self {
		Self {
			db_type: DbType::default(),
			connection_string: String::new(),
			target_folder: target_folder.into(),
			filename: None,
		}
	}
}

/// Fields to overwrite in a stored `Profile`; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
	pub db_type: Option<DbType>,
	pub connection_string: Option<String>,
	pub target_folder: Option<PathBuf>,
	pub filename: Option<String>,
}
impl ProfilePatch {
	pub fn apply_to(self, profile: &mut Profile) {
		if let Some(db_type) = self.db_type {
			profile.db_type = db_type;
		}
		if let Some(connection_string) = self.connection_string {
			profile.connection_string = connection_string;
		}
		if let Some(target_folder) = self.target_folder {
			profile.target_folder = target_folder;
		}
		if let Some(filename) = self.filename {
			profile.filename = Some(filename);
		}
	}
}

#[async_trait]
pub trait StateStore: Send + Sync {
	/// The stored profile, or defaults when nothing has been saved yet.
	async fn load(&self) -> Result<Profile>;

	async fn save(&self, profile: &Profile) -> Result<()>;

	/// Read-merge-write. Last writer wins.
	async fn merge(&self, patch: ProfilePatch) -> Result<Profile> {
		let mut profile = self.load().await?;
		patch.apply_to(&mut profile);
		self.save(&profile).await?;
		Ok(profile)
	}
}

/// Store backed by memory, for hosts that persist state themselves.
pub struct MemoryStateStore {
	profile: Mutex<Profile>,
}
impl MemoryStateStore {
	pub fn new(profile: Profile) -> Self {
		Self { profile: Mutex::new(profile) }
	}
}
#[async_trait]
impl StateStore for MemoryStateStore {
	async fn load(&self) -> Result<Profile> {
		Ok(self.profile.lock().await.clone())
	}

	async fn save(&self, profile: &Profile) -> Result<()> {
		*self.profile.lock().await = profile.clone();
		Ok(())
	}
}
