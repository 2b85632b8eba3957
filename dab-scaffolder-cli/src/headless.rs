use anyhow::{anyhow, bail, Context, Result};
use dab_scaffolder::{
	channel::MessageChannel,
	wizard::{Selection, Wizard},
	DbType, EntityKind, Request,
};
use std::path::PathBuf;

pub struct GenerateOptions {
	pub db_type: DbType,
	pub connection_string: String,
	pub tables: Vec<String>,
	pub keys: Vec<String>,
	pub folder: Option<PathBuf>,
	pub filename: Option<String>,
}

async fn exchange(channel: &mut MessageChannel, wizard: &mut Wizard, request: Request) -> Result<()> {
	let response = channel.request(request).await.context("session stopped unexpectedly")?;
	wizard.receive(&response);
	match wizard.last_error.take() {
		Some(error) => Err(anyhow!(error)),
		None => Ok(()),
	}
}

async fn connect(channel: &mut MessageChannel, db_type: DbType, connection_string: String) -> Result<Wizard> {
	let mut wizard = Wizard::new();
	let request = wizard.ready();
	exchange(channel, &mut wizard, request).await?;
	let request = wizard.connect(db_type, connection_string);
	exchange(channel, &mut wizard, request).await?;
	Ok(wizard)
}

pub async fn list(channel: &mut MessageChannel, db_type: DbType, connection_string: String) -> Result<()> {
	let wizard = connect(channel, db_type, connection_string).await?;
	for entity in &wizard.tables {
		let kind = match entity.kind {
			EntityKind::Table => "table",
			EntityKind::View => "view",
		};
		println!(
			"{:<5} {:<40} key: [{}] columns: [{}]",
			kind,
			entity.source(),
			entity.primary_key_columns.join(", "),
			entity.columns.join(", ")
		);
	}
	if wizard.tables.is_empty() {
		println!("No tables or views found");
	}
	Ok(())
}

pub async fn generate(channel: &mut MessageChannel, options: GenerateOptions) -> Result<PathBuf> {
	let mut wizard = connect(channel, options.db_type, options.connection_string).await?;

	let selection = selection(&wizard, &options.tables, &options.keys)?;
	let request = wizard
		.generate(&selection, options.filename, options.folder)
		.ok_or_else(|| anyhow!("nothing to generate from"))?;
	exchange(channel, &mut wizard, request).await?;

	wizard.last_generated.take().context("no config path returned")
}

fn selection(wizard: &Wizard, tables: &[String], keys: &[String]) -> Result<Selection> {
	let mut selection = Selection::default();
	if tables.is_empty() {
		for entity in wizard.tables.iter().filter(|entity| !entity.is_view()) {
			selection.add(entity.source());
		}
	} else {
		for id in tables {
			selection.add(id.as_str());
		}
		if let Some(id) = selection.unknown_ids(&wizard.tables).next() {
			bail!("no table or view named `{}`", id);
		}
	}
	for key in keys {
		let (id, columns) = parse_key(key)?;
		selection.with_key(id, columns);
	}
	Ok(selection)
}

fn parse_key(arg: &str) -> Result<(&str, Vec<&str>)> {
	let (id, columns) = arg.split_once('=').with_context(|| format!("expected `schema.name=col1,col2`, got `{}`", arg))?;
	let columns = columns.split(',').map(str::trim).filter(|column| !column.is_empty()).collect::<Vec<_>>();
	if columns.is_empty() {
		bail!("no key columns given for `{}`", id);
	}
	Ok((id, columns))
}

#[cfg(test)]
mod tests {
	use super::*;
	use dab_scaffolder::{Entity, Response};

	fn wizard() -> Wizard {
		let mut wizard = Wizard::new();
		wizard.receive(&Response::TablesLoaded {
			tables: vec![
				Entity::new("dbo", "Orders", EntityKind::Table).with_key(["Id"]),
				Entity::new("dbo", "OrderSummary", EntityKind::View),
			],
		});
		wizard
	}

	#[test]
	fn default_selection_is_every_table() {
		let selection = selection(&wizard(), &[], &[]).unwrap();
		assert_eq!(selection.ids, ["dbo.Orders"]);
	}

	#[test]
	fn keys_attach_to_views() {
		let selection =
			selection(&wizard(), &["dbo.OrderSummary".into()], &["dbo.OrderSummary=OrderId, Line".into()]).unwrap();
		let resolved = selection.resolve(&wizard().tables);
		assert_eq!(resolved[0].primary_key_columns, ["OrderId", "Line"]);
	}

	#[test]
	fn unknown_table_is_rejected() {
		assert!(selection(&wizard(), &["dbo.Nope".into()], &[]).is_err());
	}

	#[test]
	fn malformed_key_is_rejected() {
		assert!(parse_key("dbo.Orders").is_err());
		assert!(parse_key("dbo.Orders=").is_err());
	}
}
