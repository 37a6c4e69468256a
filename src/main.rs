use std::io::Read;

use actix_cors::Cors;
#[cfg(feature = "host-storage")]
use actix_files::Files;
use actix_web::{middleware, web::Data, App, HttpServer};
use log::LevelFilter;

mod auth;
mod database;
mod error;
mod pages;
mod settings;
mod storage;

use settings::{Action, RunSettings, Settings};

fn fail(what: &str, err: impl std::fmt::Display) -> ! {
	log::error!("{}: {}", what, err);
	std::process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
	if let Err(e) = simple_logger::SimpleLogger::new()
		.with_level(LevelFilter::Info)
		.init()
	{
		eprintln!("failed to start logger: {}", e);
	}
	dotenv::dotenv().ok();

	let settings = Settings::parse();

	// Decide what are need to do
	match settings.action {
		Action::RunServer => run_server(settings).await?,
		Action::InstallSchema => {
			println!("Installing database schema...");
			if let Err(e) = database::install_schema(settings).await {
				fail("failed to install schema", e);
			}
		}
		Action::DropTables => {
			println!("CAUTION: Are you sure you want to drop all the tables? This will delete any data stored, image data will be unaffected (y/N)");
			let mut answer = [0];
			std::io::stdin().read_exact(&mut answer)?;
			let answer = answer[0] as char;
			if answer == 'Y' || answer == 'y' {
				println!("Dropping tables...");
				if let Err(e) = auth::AuthDbCreator::clear_sessions(&settings.redis_uri).await {
					fail("failed to clear sessions", e);
				}
				if let Err(e) = database::drop_tables(settings).await {
					fail("failed to drop tables", e);
				}
			} else {
				println!("Cancelled, tables not dropped");
			}
		}
		Action::ClearSessions => {
			println!("Clearing User Sessions...");
			if let Err(e) = auth::AuthDbCreator::clear_sessions(&settings.redis_uri).await {
				fail("failed to clear sessions", e);
			}
		}
		Action::CreateFolders => {
			println!("Creating folders...");
			let covers = storage::CoverStore::new(&settings.storage_root, &settings.public_url);
			for path in covers.image_dirs() {
				if let Err(e) = std::fs::create_dir_all(&path) {
					fail(&format!("failed to create dir {}", path.display()), e);
				}
			}
		}
	}
	Ok(())
}

async fn run_server(mut settings: Settings) -> std::io::Result<()> {
	// Connect to the database and create a connection pool
	let db_pool = match database::establish_pool(&mut settings) {
		Ok(pool) => pool,
		Err(e) => fail("failed to create database pool", e),
	};
	let auth_db = match auth::AuthDbCreator::new(&settings.redis_uri).await {
		Ok(auth_db) => auth_db,
		Err(e) => fail("failed to connect to redis", e),
	};
	// Settings that handlers can access
	let run_settings = RunSettings::from(&settings);
	let covers = storage::CoverStore::new(&settings.storage_root, &settings.public_url);
	// Create a listener so we can log what port we are operating on
	let http_listener = std::net::TcpListener::bind(settings.server_host)?;
	log::info!("devconnect server listening on {}", http_listener.local_addr()?);

	let allowed_origins = std::mem::take(&mut settings.allowed_origins);
	#[cfg(feature = "host-storage")]
	let storage_root = std::mem::take(&mut settings.storage_root);
	HttpServer::new(move || {
		use actix_web::web::{get, post, resource, scope};
		use pages::*;

		let cors = allowed_origins
			.iter()
			.fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
			.allow_any_method()
			.allow_any_header()
			.supports_credentials()
			.max_age(3600);

		let app = App::new()
			.wrap(cors)
			.wrap(middleware::Logger::new("\t%a\t\"%r\"\t%s\t%b\t%Dms"))
			.wrap(auth::AuthMiddlewareFactory::new(auth::AuthDb::new(
				auth_db.clone(),
			)))
			.app_data(Data::new(db_pool.clone()))
			.app_data(Data::new(auth::AuthDb::new(auth_db.clone())))
			.app_data(Data::new(run_settings.clone()))
			.app_data(Data::new(covers.clone()))
			.app_data(json_config())
			.app_data(path_config())
			.app_data(query_config())
			.service(resource("/").route(get().to(get_health)))
			.service(
				scope("/api/auth")
					.service(resource("/signup").route(post().to(user::post_signup)))
					.service(resource("/login").route(post().to(user::post_login)))
					.service(resource("/logout").route(post().to(user::post_logout))),
			)
			.service(
				scope("/api/post")
					.service(resource("").route(get().to(post::get_feed)))
					.service(resource("/create-post").route(post().to(post::post_create)))
					.service(resource("/{id}").route(get().to(post::get_post))),
			)
			.service(
				scope("/api/projects").service(
					resource("")
						.route(get().to(project::get_projects))
						.route(post().to(project::post_project)),
				),
			);

		#[cfg(feature = "host-storage")]
		let app = app.service(Files::new("/s", &storage_root));

		app
	})
	.listen(http_listener)?
	.run()
	.await
}
