//! `key=value;` connection strings in the form the data API builder itself expects
//! (SqlClient for SQL Server, Npgsql for PostgreSQL).

use crate::{Error, Result};

const SERVER_KEYS: &[&str] = &["server", "datasource", "address", "addr", "networkaddress"];
const DATABASE_KEYS: &[&str] = &["database", "initialcatalog", "db"];
const USER_KEYS: &[&str] = &["userid", "uid", "user", "username"];
const PASSWORD_KEYS: &[&str] = &["password", "pwd"];

/// Anything with a scheme is left to the driver's own URL parser.
pub fn is_url(connection_string: &str) -> bool {
	connection_string.contains("://")
}

pub(crate) fn invalid(message: impl Into<String>) -> Error {
	let message: String = message.into();
	Error::Connect(sqlx::Error::Configuration(message.into()))
}

/// Ordered `key=value` pairs. Keys are lowercased with whitespace removed, so `User Id`
/// and `userid` are the same key. Values may be quoted with `"` or `'`, doubling the quote
/// to escape it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValues {
	pairs: Vec<(String, String)>,
}
impl KeyValues {
	pub fn parse(connection_string: &str) -> Result<Self> {
		let mut pairs = vec![];
		let mut chars = connection_string.chars().peekable();

		loop {
			let mut key = String::new();
			while let Some(&c) = chars.peek() {
				if c == '=' || c == ';' {
					break;
				}
				key.push(c);
				chars.next();
			}
			let key = key.split_whitespace().collect::<String>().to_ascii_lowercase();
			match chars.next() {
				Some('=') if !key.is_empty() => {},
				None if key.is_empty() => break,
				Some(';') if key.is_empty() => continue,
				_ if key.is_empty() => return Err(invalid("connection string has a value without a key")),
				_ => return Err(invalid(format!("connection string key `{}` has no value", key))),
			}

			while chars.peek().map_or(false, |c| c.is_whitespace()) {
				chars.next();
			}
			let value = match chars.peek().copied() {
				Some(quote @ ('"' | '\'')) => {
					chars.next();
					let mut value = String::new();
					loop {
						match chars.next() {
							None => return Err(invalid(format!("unterminated quote in value of `{}`", key))),
							Some(c) if c == quote => {
								if chars.peek() == Some(&quote) {
									chars.next();
									value.push(quote);
								} else {
									break;
								}
							},
							Some(c) => value.push(c),
						}
					}
					for c in chars.by_ref() {
						if c == ';' {
							break;
						}
						if !c.is_whitespace() {
							return Err(invalid(format!("unexpected text after quoted value of `{}`", key)));
						}
					}
					value
				},
				_ => {
					let mut value = String::new();
					for c in chars.by_ref() {
						if c == ';' {
							break;
						}
						value.push(c);
					}
					value.trim().to_string()
				},
			};
			pairs.push((key, value));
		}

		Ok(Self { pairs })
	}

	/// The last non-empty value stored under any of `keys`.
	pub fn get(&self, keys: &[&str]) -> Option<&str> {
		self.pairs
			.iter()
			.rev()
			.find(|(key, value)| !value.is_empty() && keys.contains(&key.as_str()))
			.map(|(_, value)| value.as_str())
	}
}

/// The subset of connection settings the catalog readers can pass to sqlx.
/// `None` leaves the driver default in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectParams {
	pub host: Option<String>,
	pub port: Option<u16>,
	pub database: Option<String>,
	pub username: Option<String>,
	pub password: Option<String>,
	/// Lowercased without separators, e.g. `verifyfull`.
	pub ssl_mode: Option<String>,
}
impl ConnectParams {
	/// `Server=[tcp:]host[,port];Database=..;User Id=..;Password=..`
	pub fn sql_server(connection_string: &str) -> Result<Self> {
		let values = KeyValues::parse(connection_string)?;
		let mut params = Self::credentials(&values);

		if let Some(server) = values.get(SERVER_KEYS) {
			let server = server.strip_prefix("tcp:").unwrap_or(server);
			let (host, port) = match server.rsplit_once(',') {
				Some((host, port)) => (host.trim(), Some(port)),
				None => (server.trim(), None),
			};
			if host.contains('\\') {
				return Err(invalid(format!("named instance `{}` is not supported, use `host,port`", host)));
			}
			params.host = Some(local_host(host).to_string());
			params.port = port.map(parse_port).transpose()?;
		}
		Ok(params)
	}

	/// `Host=..;Port=..;Database=..;Username=..;Password=..;SSL Mode=..`
	pub fn npgsql(connection_string: &str) -> Result<Self> {
		let values = KeyValues::parse(connection_string)?;
		let mut params = Self::credentials(&values);

		// Npgsql takes a comma separated failover list; the first host is the primary.
		params.host = values
			.get(&["host", "server"])
			.and_then(|hosts| hosts.split(',').map(str::trim).find(|host| !host.is_empty()))
			.map(str::to_string);
		params.port = values.get(&["port"]).map(parse_port).transpose()?;
		params.ssl_mode = values.get(&["sslmode"]).map(|mode| mode.replace(['-', '_', ' '], "").to_ascii_lowercase());
		Ok(params)
	}

	fn credentials(values: &KeyValues) -> Self {
		Self {
			database: values.get(DATABASE_KEYS).map(str::to_string),
			username: values.get(USER_KEYS).map(str::to_string),
			password: values.get(PASSWORD_KEYS).map(str::to_string),
			..Self::default()
		}
	}
}

fn local_host(host: &str) -> &str {
	match host {
		"." | "(local)" | "(localdb)" => "localhost",
		host => host,
	}
}

fn parse_port(port: &str) -> Result<u16> {
	port.trim().parse().map_err(|_| invalid(format!("invalid port `{}`", port.trim())))
}
