use crate::auth::{self, AuthDb, AuthInfo, Authenticated};
use crate::database::{
	user::{NewUser, User},
	Pool as DbPool,
};
use crate::pages::json_response;
use crate::settings::RunSettings;
use crate::{error::APIError, try500};

use actix_web::{http::StatusCode, web, HttpResponse};
use argon2::{self, Config};

use rand::Rng;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupQuery {
	full_name: String,
	email: String,
	password: String,
}

impl SignupQuery {
	fn check(&self) -> Result<(), APIError> {
		if self.full_name.trim().is_empty() {
			return Err(APIError::BadRequestData);
		}
		let email = self.email.trim();
		match email.split_once('@') {
			Some((user, domain)) if !user.is_empty() && !domain.is_empty() => {}
			_ => return Err(APIError::BadEmail),
		}
		if self.password.chars().count() < MIN_PASSWORD_LEN {
			return Err(APIError::BadPassword);
		}
		Ok(())
	}
}

pub async fn post_signup(
	query: web::Json<SignupQuery>,
	pool: web::Data<DbPool>,
) -> Result<HttpResponse, APIError> {
	query.check()?;
	let email = query.email.trim().to_lowercase();

	let conn = try500!(pool.get().await, "post_signup:db pool");
	if try500!(
		User::check_existence(&conn, &email).await,
		"post_signup:check_existence"
	) {
		return Err(APIError::UserExists);
	}

	let config = Config::default();
	let salt = rand::thread_rng().gen::<[u8; 16]>();
	let hash = try500!(
		argon2::hash_encoded(query.password.as_bytes(), &salt, &config),
		"post_signup:hash"
	);

	let new_user = NewUser {
		email: &email,
		full_name: query.full_name.trim(),
		pass: &hash,
	};

	let user = match new_user.insert_into(&conn).await {
		Ok(user) => user,
		// Someone registered the same email between our check and insert
		Err(e) if e.is_unique_violation() => return Err(APIError::UserExists),
		Err(e) => {
			log::error!("post_signup:insert_into {:?}: {:?}", new_user.email, e);
			return Err(APIError::InternalError);
		}
	};

	json_response(StatusCode::CREATED, &user.profile())
}

#[derive(serde::Deserialize)]
pub struct LoginQuery {
	email: String,
	password: String,
}

pub async fn post_login(
	pool: web::Data<DbPool>,
	auth_db: web::Data<AuthDb>,
	settings: web::Data<RunSettings>,
	query: web::Json<LoginQuery>,
) -> Result<HttpResponse, APIError> {
	// Attempt to get our user from the database
	let email = query.email.trim().to_lowercase();
	let conn = try500!(pool.get().await, "post_login:db pool");
	let user = try500!(
		User::select_email(&conn, &email).await,
		"post_login:select_email {:?}",
		email
	);
	// Check to see we found a user, otherwise return bad credentials
	let user = match user {
		Some(x) => x,
		None => return Err(APIError::BadCredentials),
	};

	// Check that our password matches the hash
	if !try500!(argon2::verify_encoded(&user.pass, query.password.as_bytes())) {
		return Err(APIError::BadCredentials);
	}

	// Don't bother retrying a taken token, just error
	let token = auth::new_token();
	if !auth_db
		.remember(&token, &AuthInfo::from(&user), settings.session_ttl)
		.await?
	{
		log::error!("post_login: generated token collided");
		return Err(APIError::InternalError);
	}

	let mut res = json_response(StatusCode::OK, &user.profile())?;
	try500!(
		res.add_cookie(&auth::session_cookie(&token, settings.session_ttl)),
		"post_login:add_cookie"
	);
	Ok(res)
}

pub async fn post_logout(auth: Authenticated) -> Result<HttpResponse, APIError> {
	auth.forget().await?;
	let mut res = json_response(
		StatusCode::OK,
		&serde_json::json!({ "message": "user logged out" }),
	)?;
	try500!(
		res.add_cookie(&auth::expired_cookie()),
		"post_logout:add_cookie"
	);
	Ok(res)
}
