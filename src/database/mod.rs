pub mod error;
pub mod post;
pub mod project;
pub mod user;

pub use deadpool_postgres::tokio_postgres as pg;
pub use deadpool_postgres::Pool;

pub use error::DatabaseError;

pub fn establish_pool(
	settings: &mut crate::settings::Settings,
) -> Result<Pool, deadpool_postgres::CreatePoolError> {
	let mut cfg = deadpool_postgres::Config::new();
	cfg.dbname = Some(std::mem::take(&mut settings.database_name));
	cfg.host = Some(settings.database_host.ip().to_string());
	cfg.password = Some(std::mem::take(&mut settings.database_credentials.1));
	cfg.port = Some(settings.database_host.port());
	cfg.user = Some(std::mem::take(&mut settings.database_credentials.0));

	cfg.create_pool(Some(deadpool_postgres::Runtime::Tokio1), pg::NoTls)
}

async fn run_scripts(
	mut settings: crate::settings::Settings,
	scripts: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
	let pool = establish_pool(&mut settings)?;
	let db = pool.get().await?;
	for script in scripts {
		db.batch_execute(script).await?;
	}
	Ok(())
}

pub async fn install_schema(
	settings: crate::settings::Settings,
) -> Result<(), Box<dyn std::error::Error>> {
	let scripts = [
		include_str!("../../sql/create_users.sql"),
		include_str!("../../sql/create_posts.sql"),
		include_str!("../../sql/create_projects.sql"),
	];
	run_scripts(settings, &scripts).await
}

pub async fn drop_tables(
	settings: crate::settings::Settings,
) -> Result<(), Box<dyn std::error::Error>> {
	run_scripts(settings, &[include_str!("../../sql/drop_all.sql")]).await
}
