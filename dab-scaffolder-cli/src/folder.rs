use async_trait::async_trait;
use dab_scaffolder::{session::FolderPicker, Error, Result};
use std::path::PathBuf;
use tokio::process::Command;

#[cfg(windows)]
const PICKER: (&str, &[&str]) = (
	"powershell",
	&[
		"-NoProfile",
		"-Command",
		"Add-Type -AssemblyName System.Windows.Forms; $f = New-Object System.Windows.Forms.FolderBrowserDialog; \
		 if ($f.ShowDialog() -eq 'OK') { $f.SelectedPath }",
	],
);
#[cfg(target_os = "macos")]
const PICKER: (&str, &[&str]) = ("osascript", &["-e", "POSIX path of (choose folder)"]);
#[cfg(not(any(windows, target_os = "macos")))]
const PICKER: (&str, &[&str]) = ("zenity", &["--file-selection", "--directory"]);

/// Opens the platform's folder dialog on the machine running the server.
pub struct NativeFolderPicker;
#[async_trait]
impl FolderPicker for NativeFolderPicker {
	async fn pick_folder(&self) -> Result<Option<PathBuf>> {
		let (program, args) = PICKER;
		let output = Command::new(program)
			.args(args)
			.output()
			.await
			.map_err(|err| Error::FolderPick(format!("could not start {}: {}", program, err)))?;

		// Dismissing the dialog exits non-zero with nothing on stdout.
		let picked = String::from_utf8_lossy(&output.stdout).trim().to_string();
		Ok(if picked.is_empty() { None } else { Some(PathBuf::from(picked)) })
	}
}

/// Best effort; failures are only logged.
pub fn open_in_browser(url: &str) {
	let mut command = if cfg!(windows) {
		let mut command = Command::new("cmd");
		command.args(["/C", "start", url]);
		command
	} else if cfg!(target_os = "macos") {
		let mut command = Command::new("open");
		command.arg(url);
		command
	} else {
		let mut command = Command::new("xdg-open");
		command.arg(url);
		command
	};
	if let Err(err) = command.spawn() {
		log::warn!("could not open a browser: {}", err);
	}
}
