pub use deadpool_postgres::tokio_postgres as pg;

use crate::database::DatabaseError;

use devconnect::model::UserProfile;

pub struct User {
	pub id: i32,
	pub email: String,
	pub full_name: String,
	pub title: String,
	pub pass: String,
	pub profile_pic: String,
	pub created_at: chrono::DateTime<chrono::offset::Utc>,
}

impl User {
	pub async fn select_id(
		client: &pg::Client,
		uid: i32,
	) -> Result<Option<User>, DatabaseError> {
		let query = "SELECT * FROM users WHERE id=$1";
		let row = client.query_opt(query, &[&uid]).await?;
		Ok(row.as_ref().map(Self::deserialise))
	}

	pub async fn select_email(
		client: &pg::Client,
		email: &str,
	) -> Result<Option<User>, DatabaseError> {
		let query = "SELECT * FROM users WHERE email=$1";
		let row = client.query_opt(query, &[&email]).await?;
		Ok(row.as_ref().map(Self::deserialise))
	}

	pub async fn check_existence(
		client: &pg::Client,
		email: &str,
	) -> Result<bool, DatabaseError> {
		let query = "SELECT id FROM users WHERE email=$1";
		let row = client.query_opt(query, &[&email]).await?;
		Ok(row.is_some())
	}

	/// The public view, without the password hash
	pub fn profile(&self) -> UserProfile {
		UserProfile {
			id: self.id,
			email: self.email.clone(),
			full_name: self.full_name.clone(),
			title: self.title.clone(),
			profile_pic: self.profile_pic.clone(),
			created_at: self.created_at,
		}
	}

	fn deserialise(row: &pg::row::Row) -> Self {
		User {
			id: row.get("id"),
			email: row.get("email"),
			full_name: row.get("full_name"),
			title: row.get("title"),
			pass: row.get("pass"),
			profile_pic: row.get("profile_pic"),
			created_at: row.get("created_at"),
		}
	}
}

#[derive(Debug)]
pub struct NewUser<'a> {
	pub email: &'a str,
	pub full_name: &'a str,
	pub pass: &'a str,
}

impl<'a> NewUser<'a> {
	pub async fn insert_into(&self, client: &pg::Client) -> Result<User, DatabaseError> {
		let query = "INSERT INTO users (email, full_name, pass) VALUES($1, $2, $3) RETURNING *";
		let row = client
			.query_one(query, &[&self.email, &self.full_name, &self.pass])
			.await?;
		Ok(User::deserialise(&row))
	}
}
