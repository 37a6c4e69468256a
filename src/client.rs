use async_trait::async_trait;
use derive_more::{Display, Error};
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::Serialize;

use crate::model::{fields, ErrorMessage, Post, PostForm, UserProfile};
use crate::store::PostApi;

#[derive(Debug, Display, Error)]
pub enum ClientError {
	#[display(fmt = "request failed: {}", _0)]
	Transport(reqwest::Error),
	#[display(
		fmt = "server responded {}: {}",
		status,
		r#"message.as_deref().unwrap_or("(no message)")"#
	)]
	Server { status: u16, message: Option<String> },
}

impl From<reqwest::Error> for ClientError {
	fn from(err: reqwest::Error) -> Self {
		Self::Transport(err)
	}
}

impl ClientError {
	/// The human readable message the server sent back, if any
	pub fn server_message(&self) -> Option<&str> {
		match self {
			ClientError::Server { message, .. } => message.as_deref(),
			ClientError::Transport(_) => None,
		}
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignupBody<'a> {
	full_name: &'a str,
	email: &'a str,
	password: &'a str,
}

#[derive(Serialize)]
struct LoginBody<'a> {
	email: &'a str,
	password: &'a str,
}

/// Talks to a devconnect server, keeping the session cookie between calls
pub struct HttpClient {
	base: String,
	http: reqwest::Client,
}

impl HttpClient {
	pub fn new(base: &str) -> Result<Self, ClientError> {
		let http = reqwest::Client::builder().cookie_store(true).build()?;
		Ok(Self {
			base: base.trim_end_matches('/').to_owned(),
			http,
		})
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base, path)
	}

	pub async fn signup(
		&self,
		full_name: &str,
		email: &str,
		password: &str,
	) -> Result<UserProfile, ClientError> {
		let res = self
			.http
			.post(self.url("/api/auth/signup"))
			.json(&SignupBody {
				full_name,
				email,
				password,
			})
			.send()
			.await?;
		Ok(check(res).await?.json().await?)
	}

	pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
		let res = self
			.http
			.post(self.url("/api/auth/login"))
			.json(&LoginBody { email, password })
			.send()
			.await?;
		Ok(check(res).await?.json().await?)
	}

	pub async fn logout(&self) -> Result<(), ClientError> {
		let res = self.http.post(self.url("/api/auth/logout")).send().await?;
		check(res).await?;
		Ok(())
	}
}

/// Turns non-2xx responses into `ClientError::Server`, pulling the message out
/// of the body when it has one.
async fn check(res: Response) -> Result<Response, ClientError> {
	let status = res.status();
	if status.is_success() {
		return Ok(res);
	}
	let message = res
		.json::<ErrorMessage>()
		.await
		.ok()
		.map(|body| body.message);
	Err(ClientError::Server {
		status: status.as_u16(),
		message,
	})
}

fn multipart(form: PostForm) -> Result<Form, ClientError> {
	let cover = Part::bytes(form.cover.data.to_vec())
		.file_name(form.cover.name)
		.mime_str(&form.cover.mime)?;
	Ok(Form::new()
		.text(fields::TITLE, form.title)
		.text(fields::DESCRIPTION, form.description)
		.text(fields::CONTENT, form.content)
		.text(fields::TAGS, form.tags)
		.text(fields::REQUEST_TOKEN, form.request_token.to_string())
		.part(fields::COVER, cover))
}

#[async_trait(?Send)]
impl PostApi for HttpClient {
	async fn create_post(&self, form: PostForm) -> Result<Post, ClientError> {
		let res = self
			.http
			.post(self.url("/api/post/create-post"))
			.multipart(multipart(form)?)
			.send()
			.await?;
		Ok(check(res).await?.json().await?)
	}

	async fn list_posts(&self, page: u32, limit: u32) -> Result<Vec<Post>, ClientError> {
		let res = self
			.http
			.get(self.url("/api/post"))
			.query(&[("p", page), ("l", limit)])
			.send()
			.await?;
		Ok(check(res).await?.json().await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn server_message_only_for_server_errors() {
		let err = ClientError::Server {
			status: 500,
			message: Some("DB write failed".into()),
		};
		assert_eq!(err.server_message(), Some("DB write failed"));
		assert_eq!(err.to_string(), "server responded 500: DB write failed");

		let err = ClientError::Server {
			status: 502,
			message: None,
		};
		assert_eq!(err.server_message(), None);
		assert_eq!(err.to_string(), "server responded 502: (no message)");
		assert!(std::error::Error::source(&err).is_none());
	}

	#[test]
	fn base_url_is_normalised() {
		let client = HttpClient::new("http://127.0.0.1:5000/").unwrap();
		assert_eq!(client.url("/api/post"), "http://127.0.0.1:5000/api/post");
	}
}
