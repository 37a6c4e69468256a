use structopt::StructOpt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	ClearSessions,
	CreateFolders,
	DropTables,
	InstallSchema,
	RunServer,
}

impl std::default::Default for Action {
	fn default() -> Action {
		Action::RunServer
	}
}

impl std::str::FromStr for Action {
	type Err = &'static str;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let res = match s {
			"clear-sessions" => Action::ClearSessions,
			"create-folders" => Action::CreateFolders,
			"drop-tables" => Action::DropTables,
			"install-schema" => Action::InstallSchema,
			"run" => Action::RunServer,
			_ => return Err("unknown action"),
		};
		Ok(res)
	}
}

#[derive(StructOpt)]
struct CliOptions {
	#[structopt(long = "action", default_value = "run")]
	action: Action,
}

pub struct Settings {
	pub server_host: std::net::SocketAddr,
	pub database_host: std::net::SocketAddrV4,
	pub database_credentials: (String, String),
	pub database_name: String,
	pub storage_root: String,
	/// Origin cover image URLs are built against
	pub public_url: String,
	pub redis_uri: String,
	/// Max payload of multipart structures in KiB
	pub max_payload: usize,
	pub allowed_origins: Vec<String>,
	/// Session lifetime in seconds
	pub session_ttl: usize,

	pub action: Action,
}

impl std::default::Default for Settings {
	fn default() -> Settings {
		Settings {
			server_host: std::net::SocketAddr::from(([127, 0, 0, 1], 5000)),
			database_host: std::net::SocketAddrV4::new([127, 0, 0, 1].into(), 5432),
			database_credentials: ("postgres".to_owned(), "password".to_owned()),
			database_name: "devconnect".to_owned(),
			storage_root: "./storage/".to_owned(),
			public_url: "http://127.0.0.1:5000".to_owned(),
			redis_uri: "redis://127.0.0.1:6379".to_owned(),
			max_payload: 1024 * 10, // 10MiB
			allowed_origins: vec!["http://localhost:5173".to_owned()],
			session_ttl: 60 * 60 * 24 * 7,
			action: Action::default(),
		}
	}
}

impl Settings {
	pub fn parse() -> Settings {
		let mut settings = Self::from_vars(|key| std::env::var(key).ok());
		settings.merge_cli_opts(CliOptions::from_args());
		settings
	}

	/// Builds settings from `DEVCONNECT_*` variables, keeping the default for
	/// anything missing or malformed.
	pub fn from_vars<F: Fn(&str) -> Option<String>>(var: F) -> Settings {
		let mut settings = Self::default();
		if let Some(v) = var("DEVCONNECT_HOST") {
			match v.parse() {
				Ok(v) => settings.server_host = v,
				Err(_) => log::warn!("invalid host address format: '{}'", v),
			}
		}
		if let Some(v) = var("DEVCONNECT_DB_HOST") {
			match v.parse() {
				Ok(v) => settings.database_host = v,
				Err(_) => log::warn!("invalid database address format: '{}'", v),
			}
		}
		if let Some(v) = var("DEVCONNECT_DB_USER") {
			settings.database_credentials.0 = v;
		}
		if let Some(v) = var("DEVCONNECT_DB_PASS") {
			settings.database_credentials.1 = v;
		}
		if let Some(v) = var("DEVCONNECT_DB_NAME") {
			settings.database_name = v;
		}
		if let Some(v) = var("DEVCONNECT_REDIS_URI") {
			settings.redis_uri = v;
		}
		if let Some(v) = var("DEVCONNECT_STORAGE_ROOT") {
			settings.storage_root = v;
		}
		if let Some(v) = var("DEVCONNECT_PUBLIC_URL") {
			settings.public_url = v.trim_end_matches('/').to_owned();
		}
		if let Some(v) = var("DEVCONNECT_MAX_PAYLOAD") {
			match v.parse() {
				Ok(v) => settings.max_payload = v,
				Err(_) => log::warn!("invalid max payload size: '{}'", v),
			}
		}
		if let Some(v) = var("DEVCONNECT_ALLOWED_ORIGINS") {
			settings.allowed_origins = v
				.split(',')
				.map(str::trim)
				.filter(|s| !s.is_empty())
				.map(str::to_owned)
				.collect();
		}
		if let Some(v) = var("DEVCONNECT_SESSION_TTL") {
			match v.parse() {
				Ok(v) => settings.session_ttl = v,
				Err(_) => log::warn!("invalid session ttl: '{}'", v),
			}
		}
		settings
	}

	fn merge_cli_opts(&mut self, opts: CliOptions) {
		self.action = opts.action;
	}
}

#[derive(Clone)]
pub struct RunSettings {
	pub max_payload: usize,
	pub session_ttl: usize,
}

impl RunSettings {
	pub fn from(settings: &Settings) -> Self {
		Self {
			max_payload: settings.max_payload,
			session_ttl: settings.session_ttl,
		}
	}
}
