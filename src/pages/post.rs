use crate::auth::Authenticated;
use crate::database::post::{NewPost, PostRepo, Posts};
use crate::database::Pool as DbPool;
use crate::error::APIError;
use crate::pages::{check_page_size, json_response};
use crate::settings::RunSettings;
use crate::storage::CoverStore;
use crate::try500;

use actix_multipart::{Multipart, MultipartError};
use actix_web::{http::StatusCode, web, HttpResponse};
use devconnect::model::{fields, Post, PostAuthor};
use devconnect::validation::{self, CoverError, DraftError};
use futures::TryStreamExt;
use uuid::Uuid;

#[derive(Debug)]
pub struct UploadedCover {
	pub data: Vec<u8>,
	pub filename: String,
	pub content_type: Option<String>,
}

/// Multipart fields as they arrived, nothing checked yet
#[derive(Debug, Default)]
pub struct RawPostForm {
	pub title: Option<String>,
	pub description: Option<String>,
	pub content: Option<String>,
	pub tags: Option<String>,
	pub request_token: Option<String>,
	pub cover: Option<UploadedCover>,
}

#[derive(Debug)]
pub struct CheckedPost {
	pub title: String,
	pub description: String,
	pub content: String,
	pub tags: Vec<String>,
	pub cover: UploadedCover,
	pub ext: &'static str,
	pub request_token: Option<Uuid>,
}

fn image_ext(data: &[u8]) -> Option<&'static str> {
	use image::ImageFormat;
	let ext = match image::guess_format(data).ok()? {
		ImageFormat::Png => "png",
		ImageFormat::Jpeg => "jpg",
		ImageFormat::Gif => "gif",
		ImageFormat::WebP => "webp",
		ImageFormat::Bmp => "bmp",
		ImageFormat::Tiff => "tiff",
		ImageFormat::Ico => "ico",
		_ => return None,
	};
	Some(ext)
}

impl RawPostForm {
	/// Runs the same checks the composer does, then the ones only the server
	/// can do on the image bytes.
	pub fn check(self) -> Result<CheckedPost, APIError> {
		let title = self.title.unwrap_or_default();
		let description = self.description.unwrap_or_default();
		let content = self.content.unwrap_or_default();
		validation::validate_text(&title, &description, &content)?;

		let cover = self.cover.ok_or(DraftError::CoverMissing)?;
		if cover.data.len() > validation::MAX_COVER_BYTES {
			return Err(CoverError::TooLarge.into());
		}
		if let Some(mime) = &cover.content_type {
			if !validation::is_image_mime(mime) {
				return Err(CoverError::NotAnImage.into());
			}
		}
		let ext = image_ext(&cover.data).ok_or(APIError::MimeType)?;

		let tags = validation::split_tags(self.tags.as_deref().unwrap_or(""))?;
		let request_token = match self.request_token.as_deref().map(str::trim) {
			None | Some("") => None,
			Some(token) => Some(Uuid::parse_str(token).map_err(|_| APIError::BadRequestData)?),
		};

		Ok(CheckedPost {
			title: title.trim().to_owned(),
			description: description.trim().to_owned(),
			content: content.trim().to_owned(),
			tags,
			cover,
			ext,
			request_token,
		})
	}
}

fn multipart_error(err: MultipartError) -> APIError {
	log::warn!("malformed multipart body: {}", err);
	APIError::BadRequestData
}

pub async fn process_multipart(
	mut payload: Multipart,
	maximum_size: usize,
) -> Result<RawPostForm, APIError> {
	let mut form = RawPostForm::default();
	let mut bytes_read = 0;
	// Iterate over incoming data
	while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
		let disposition = field.content_disposition();
		let name = disposition
			.get_name()
			.ok_or(APIError::BadRequestData)?
			.to_owned();
		let filename = disposition.get_filename().map(sanitize_filename::sanitize);
		let content_type = field.content_type().map(|m| m.essence_str().to_owned());

		// Read the whole field, keeping count of the request as a whole
		let mut data = Vec::new();
		while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
			bytes_read += chunk.len();
			if bytes_read > maximum_size * 1024 {
				return Err(APIError::PayloadSize);
			}
			if name == fields::COVER && data.len() + chunk.len() > validation::MAX_COVER_BYTES {
				return Err(CoverError::TooLarge.into());
			}
			// Unknown fields are drained but not kept
			if is_known_field(&name) {
				data.extend_from_slice(&chunk);
			}
		}

		let text = |data: Vec<u8>| String::from_utf8(data).map_err(|_| APIError::BadRequestData);
		match name.as_str() {
			fields::TITLE => form.title = Some(text(data)?),
			fields::DESCRIPTION => form.description = Some(text(data)?),
			fields::CONTENT => form.content = Some(text(data)?),
			fields::TAGS => form.tags = Some(text(data)?),
			fields::REQUEST_TOKEN => form.request_token = Some(text(data)?),
			fields::COVER => {
				// Only the one file is accepted
				if form.cover.is_some() {
					return Err(APIError::BadRequestData);
				}
				form.cover = Some(UploadedCover {
					data,
					filename: filename.unwrap_or_default(),
					content_type,
				});
			}
			_ => {}
		}
	}
	Ok(form)
}

fn is_known_field(name: &str) -> bool {
	matches!(
		name,
		fields::TITLE
			| fields::DESCRIPTION
			| fields::CONTENT
			| fields::TAGS
			| fields::REQUEST_TOKEN
			| fields::COVER
	)
}

/// Stores a checked post for `author`. A replayed request token gets back the
/// post it already made, and a written cover that ends up unreferenced is
/// removed again.
pub async fn create_post<R: PostRepo>(
	repo: &R,
	covers: &CoverStore,
	author: &PostAuthor,
	form: CheckedPost,
) -> Result<(StatusCode, Post), APIError> {
	if let Some(token) = form.request_token {
		let existing = try500!(
			repo.post_by_request_token(author.id, token).await,
			"create_post:post_by_request_token {}",
			token
		);
		if let Some(post) = existing {
			log::info!("replayed submission {} for post {}", token, post.id);
			return Ok((StatusCode::OK, post));
		}
	}

	let stored = try500!(
		covers
			.save(&form.cover.data, &form.cover.filename, form.ext)
			.await,
		"create_post:save cover {:?}",
		form.cover.filename
	);

	let new_post = NewPost {
		title: &form.title,
		description: &form.description,
		content: &form.content,
		tags: &form.tags,
		cover_img_url: &stored.url,
		author,
		request_token: form.request_token,
	};
	let inserted = match repo.insert_post(&new_post).await {
		Ok(inserted) => inserted,
		Err(e) => {
			log::error!(
				"internal error has occurred!\n[MESSAGE]: create_post:insert_post {:?}\n[ERROR]: {:?}",
				new_post,
				e
			);
			covers.discard(&stored).await;
			return Err(APIError::InternalError);
		}
	};

	match inserted {
		Some(post) => Ok((StatusCode::CREATED, post)),
		None => {
			// Lost a race with a concurrent retry of the same submission
			covers.discard(&stored).await;
			let token = form.request_token.ok_or(APIError::InternalError)?;
			let existing = try500!(
				repo.post_by_request_token(author.id, token).await,
				"create_post:post_by_request_token {}",
				token
			);
			let post = existing.ok_or(APIError::InternalError)?;
			Ok((StatusCode::OK, post))
		}
	}
}

pub async fn post_create(
	auth: Authenticated,
	payload: Multipart,
	pool: web::Data<DbPool>,
	covers: web::Data<CoverStore>,
	settings: web::Data<RunSettings>,
) -> Result<HttpResponse, APIError> {
	let form = process_multipart(payload, settings.max_payload)
		.await?
		.check()?;
	let conn = try500!(pool.get().await, "post_create:db pool");
	let (status, post) = create_post(&conn, covers.get_ref(), &auth.author(), form).await?;
	json_response(status, &post)
}

fn default_limit() -> u32 {
	20
}

#[derive(Debug, serde::Deserialize)]
pub struct FeedQuery {
	#[serde(alias = "p", default)]
	page: u32,
	#[serde(alias = "l", default = "default_limit")]
	limit: u32,
}

pub async fn get_feed(
	_auth: Authenticated,
	query: web::Query<FeedQuery>,
	pool: web::Data<DbPool>,
) -> Result<HttpResponse, APIError> {
	check_page_size(query.limit)?;

	let conn = try500!(pool.get().await, "get_feed:db pool");
	let posts = try500!(
		Posts::select_page(&conn, query.page, query.limit).await,
		"get_feed:select_page {:?}",
		query
	);
	json_response(StatusCode::OK, &posts)
}

pub async fn get_post(
	_auth: Authenticated,
	id: web::Path<i64>,
	pool: web::Data<DbPool>,
) -> Result<HttpResponse, APIError> {
	let id = id.into_inner();
	let conn = try500!(pool.get().await, "get_post:db pool");
	let post = try500!(
		Posts::select_post(&conn, id).await,
		"get_post:select_post {}",
		id
	);

	match post {
		Some(post) => json_response(StatusCode::OK, &post),
		None => Err(APIError::PostNotFound),
	}
}
