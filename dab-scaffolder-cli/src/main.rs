use anyhow::{Error, Result};

#[tokio::main]
async fn main() -> Result<(), Error> {
	dab_scaffolder_cli::run().await
}
