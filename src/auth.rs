use crate::database::{user::User, Pool as DbPool};
use crate::{error::APIError, try500};

use actix_web::{
	cookie::{time::Duration as CookieDuration, Cookie, SameSite},
	dev::{self, Service, ServiceRequest, ServiceResponse},
	web::Data,
	Error, HttpMessage, HttpRequest,
};
use devconnect::model::PostAuthor;
use futures::future::{ready, FutureExt, LocalBoxFuture, Ready};
use rand::Rng;
use serde::{Deserialize, Serialize};

use std::future::Future;
use std::rc::Rc;

pub const SESSION_COOKIE: &str = "token";
const MAX_TOKEN_LEN: usize = 512;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthInfo {
	uid: i32,
}

impl core::convert::From<&User> for AuthInfo {
	fn from(user: &User) -> Self {
		Self { uid: user.id }
	}
}

/// What the middleware made of the request's session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
	Missing,
	Invalid,
	Active(AuthInfo),
}

#[derive(Clone)]
struct SessionToken(String);

fn session_key(token: &str) -> String {
	format!("user:{}", token)
}

/// Tokens are the base64 of 40 random bytes, anything else can't be ours
pub fn well_formed(token: &str) -> bool {
	!token.is_empty() && token.len() <= MAX_TOKEN_LEN && base64::decode(token).is_ok()
}

/// The session token a request presents, or the session state when the cookie
/// alone settles it
pub fn presented_token(req: &HttpRequest) -> Result<String, Session> {
	match req.cookie(SESSION_COOKIE) {
		None => Err(Session::Missing),
		Some(cookie) if well_formed(cookie.value()) => Ok(cookie.value().to_owned()),
		Some(_) => Err(Session::Invalid),
	}
}

pub fn new_token() -> String {
	let mut token = [0u8; 40];
	rand::thread_rng().fill(&mut token[..]);
	base64::encode(token)
}

pub fn session_cookie(token: &str, ttl: usize) -> Cookie<'static> {
	Cookie::build(SESSION_COOKIE, token.to_owned())
		.path("/")
		.http_only(true)
		.same_site(SameSite::Lax)
		.max_age(CookieDuration::seconds(ttl as i64))
		.finish()
}

pub fn expired_cookie() -> Cookie<'static> {
	let mut cookie = session_cookie("", 0);
	cookie.make_removal();
	cookie
}

// This isn't really a factory, but it's done this way so we don't have to use
// an Atomic reference counter
#[derive(Clone)]
pub struct AuthDbCreator {
	conn: redis::aio::MultiplexedConnection,
}

impl AuthDbCreator {
	pub async fn new(uri: &str) -> Result<Self, redis::RedisError> {
		let client = redis::Client::open(uri)?;
		let conn = client.get_multiplexed_tokio_connection().await?;
		Ok(Self { conn })
	}

	pub async fn clear_sessions(uri: &str) -> Result<(), redis::RedisError> {
		let mut auth_db = Self::new(uri).await?;
		let keys: Vec<String> = redis::cmd("KEYS")
			.arg(session_key("*"))
			.query_async(&mut auth_db.conn)
			.await?;
		if !keys.is_empty() {
			let _: () = redis::cmd("DEL")
				.arg(&keys)
				.query_async(&mut auth_db.conn)
				.await?;
		}
		log::info!("cleared {} sessions", keys.len());
		Ok(())
	}
}

#[derive(Clone)]
pub struct AuthDb(Rc<AuthDbCreator>);

impl AuthDb {
	pub fn new(auth_db: AuthDbCreator) -> Self {
		Self(Rc::new(auth_db))
	}

	/// Stores a session, returns false if the token was already taken
	pub async fn remember(&self, token: &str, user: &AuthInfo, ttl: usize) -> Result<bool, APIError> {
		let key = session_key(token);
		let value = try500!(serde_json::to_string(user), "authdb:remember serialise");
		let mut conn = self.0.conn.clone();
		let res: Option<String> = try500!(
			redis::cmd("SET")
				.arg(&key)
				.arg(value)
				.arg("NX")
				.arg("EX")
				.arg(ttl)
				.query_async(&mut conn)
				.await,
			"authdb:remember SET {:?} {:?}",
			key,
			user
		);

		Ok(res.is_some())
	}

	/// Looks up a well formed token
	pub async fn resolve(&self, token: &str) -> Result<Session, APIError> {
		let key = session_key(token);

		let mut conn = self.0.conn.clone();
		let exists: Option<String> = try500!(
			redis::cmd("GET").arg(&key).query_async(&mut conn).await,
			"authdb:resolve GET {:?}",
			key
		);

		match exists {
			Some(v) => Ok(Session::Active(try500!(
				serde_json::from_str(&v),
				"authdb:resolve bad session {:?}",
				v
			))),
			None => Ok(Session::Invalid),
		}
	}

	pub async fn forget(&self, token: &str) -> Result<(), APIError> {
		let key = session_key(token);
		let mut conn = self.0.conn.clone();
		let _: () = try500!(
			redis::cmd("DEL").arg(&key).query_async(&mut conn).await,
			"authdb:forget DEL {:?}",
			key
		);
		Ok(())
	}
}

pub struct AuthMiddleware<S> {
	auth_db: AuthDb,
	service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddleware<S>
where
	S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
{
	type Response = ServiceResponse<B>;
	type Error = Error;
	type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

	actix_service::forward_ready!(service);

	fn call(&self, req: ServiceRequest) -> Self::Future {
		let srv = self.service.clone();
		let auth_db = self.auth_db.clone();

		async move {
			let (session, token) = match presented_token(req.request()) {
				Ok(token) => (auth_db.resolve(&token).await?, Some(token)),
				Err(session) => (session, None),
			};
			// Handlers decide whether they need a session, we only record it
			req.extensions_mut().insert(session);
			if let Some(token) = token {
				req.extensions_mut().insert(SessionToken(token));
			}

			let res = srv.call(req).await?;
			Ok(res)
		}
		.boxed_local()
	}
}

pub struct AuthMiddlewareFactory {
	auth_db: AuthDb,
}

impl AuthMiddlewareFactory {
	pub fn new(auth_db: AuthDb) -> Self {
		Self { auth_db }
	}
}

impl<S, B> dev::Transform<S, ServiceRequest> for AuthMiddlewareFactory
where
	S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
{
	type Response = ServiceResponse<B>;
	type Error = Error;
	type Transform = AuthMiddleware<S>;
	type InitError = ();
	type Future = Ready<Result<Self::Transform, Self::InitError>>;

	fn new_transform(&self, service: S) -> Self::Future {
		ready(Ok(AuthMiddleware {
			auth_db: self.auth_db.clone(),
			service: Rc::new(service),
		}))
	}
}

/// A request carrying a live session whose user still exists
pub struct Authenticated {
	user: User,
	token: String,
	auth_db: AuthDb,
}

impl Authenticated {
	pub fn author(&self) -> PostAuthor {
		PostAuthor {
			id: self.user.id,
			full_name: self.user.full_name.clone(),
			profile_pic: self.user.profile_pic.clone(),
		}
	}

	pub async fn forget(&self) -> Result<(), APIError> {
		self.auth_db.forget(&self.token).await
	}
}

fn missing_app_data() -> APIError {
	log::error!("auth extractor is missing AuthDb or Pool app data");
	APIError::InternalError
}

/// Resolves a session to its user, fetched with `find`. A session whose user
/// is gone is refused.
async fn session_user<F, Fut>(session: Session, find: F) -> Result<User, APIError>
where
	F: FnOnce(i32) -> Fut,
	Fut: Future<Output = Result<Option<User>, APIError>>,
{
	let info = match session {
		Session::Missing => return Err(APIError::MissingToken),
		Session::Invalid => return Err(APIError::InvalidToken),
		Session::Active(info) => info,
	};
	find(info.uid).await?.ok_or(APIError::UnknownUser)
}

impl actix_web::FromRequest for Authenticated {
	type Error = APIError;
	type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

	fn from_request(req: &HttpRequest, _payload: &mut dev::Payload) -> Self::Future {
		let session = req
			.extensions()
			.get::<Session>()
			.copied()
			.unwrap_or(Session::Missing);
		let token = req.extensions().get::<SessionToken>().cloned();
		let auth_db = req.app_data::<Data<AuthDb>>().map(|d| d.get_ref().clone());
		let pool = req.app_data::<Data<DbPool>>().cloned();

		async move {
			let user = session_user(session, |uid| async move {
				let pool = pool.ok_or_else(missing_app_data)?;
				let conn = try500!(pool.get().await, "authenticated:db pool");
				let user = try500!(
					User::select_id(&conn, uid).await,
					"authenticated:select_id {}",
					uid
				);
				Ok::<_, APIError>(user)
			})
			.await?;

			match (auth_db, token) {
				(Some(auth_db), Some(token)) => Ok(Authenticated {
					user,
					token: token.0,
					auth_db,
				}),
				_ => Err(missing_app_data()),
			}
		}
		.boxed_local()
	}
}
