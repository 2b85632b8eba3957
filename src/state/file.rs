use super::{Profile, StateStore};
use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

pub const DEFAULT_STATE_FILENAME: &str = ".dab-scaffolder-state.json";

/// Keeps the profile in a small JSON file.
pub struct FileStateStore {
	pub path: PathBuf,
	default_folder: PathBuf,
}
impl FileStateStore {
	pub fn new(path: impl Into<PathBuf>, default_folder: impl Into<PathBuf>) -> Self {
		Self { path: path.into(), default_folder: default_folder.into() }
	}
}
#[async_trait]
impl StateStore for FileStateStore {
	async fn load(&self) -> Result<Profile> {
		match fs::read_to_string(&self.path).await {
			Ok(content) => Ok(serde_json::from_str(&content)?),
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Profile::new(&self.default_folder)),
			Err(err) => Err(err.into()),
		}
	}

	async fn save(&self, profile: &Profile) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent).await?;
			}
		}
		fs::write(&self.path, serde_json::to_string_pretty(profile)?).await?;
		Ok(())
	}
}
