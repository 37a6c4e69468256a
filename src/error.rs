use actix_web::{error, http::header, http::StatusCode, HttpResponse, HttpResponseBuilder};
use derive_more::{Display, Error};

use devconnect::validation::{CoverError, DraftError, LinkError, TagError};

#[macro_export]
macro_rules! try500 {
	($e:expr) => {
		$e.map_err(|err| {
			log::error!(
				"internal error has occurred!\n[MESSAGE]: {}\n[ERROR]: {:?}",
				"(no message provided)",
				err
			);
			APIError::InternalError
		})?
	};
	($e:expr,$($args:tt)+) => {
		$e.map_err(|err| {
			log::error!(
				"internal error has occurred!\n[MESSAGE]: {}\n[ERROR]: {:?}",
				format_args!($($args)+),
				err
			);
			APIError::InternalError
		})?
	};
}

#[derive(Debug, Display, Error)]
pub enum APIError {
	#[display(fmt = "internal server error")]
	InternalError,
	#[display(fmt = "bad request")]
	BadRequestData,
	#[display(fmt = "User not authenticated - Please provide token")]
	MissingToken,
	#[display(fmt = "User not authenticated - Please provide Valid token")]
	InvalidToken,
	#[display(fmt = "User not authenticated - Try again later")]
	UnknownUser,
	#[display(fmt = "payload too large")]
	PayloadSize,
	#[display(fmt = "unsupported mime type")]
	MimeType,
	#[display(fmt = "{}", _0)]
	Draft(DraftError),
	#[display(fmt = "{}", _0)]
	Cover(CoverError),
	#[display(fmt = "{}", _0)]
	Tags(TagError),
	#[display(fmt = "{}", _0)]
	Link(LinkError),
	#[display(fmt = "too many items per page, please reduce amount")]
	PageSize,
	#[display(fmt = "post not found")]
	PostNotFound,
	#[display(fmt = "account details have already been used")]
	UserExists,
	#[display(fmt = "password must be at least 6 characters")]
	BadPassword,
	#[display(fmt = "email address is not valid")]
	BadEmail,
	#[display(fmt = "email or password was not correct")]
	BadCredentials,
}

impl From<DraftError> for APIError {
	fn from(err: DraftError) -> Self {
		Self::Draft(err)
	}
}

impl From<CoverError> for APIError {
	fn from(err: CoverError) -> Self {
		Self::Cover(err)
	}
}

impl From<TagError> for APIError {
	fn from(err: TagError) -> Self {
		Self::Tags(err)
	}
}

impl From<LinkError> for APIError {
	fn from(err: LinkError) -> Self {
		Self::Link(err)
	}
}

impl error::ResponseError for APIError {
	fn error_response(&self) -> HttpResponse {
		let body = serde_json::json!({ "message": self.to_string() });
		HttpResponseBuilder::new(self.status_code())
			.insert_header((header::CONTENT_TYPE, "application/json; charset=utf-8"))
			.body(body.to_string())
	}

	fn status_code(&self) -> StatusCode {
		match *self {
			Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
			Self::BadRequestData => StatusCode::BAD_REQUEST,
			Self::MissingToken => StatusCode::UNAUTHORIZED,
			Self::InvalidToken => StatusCode::BAD_REQUEST,
			Self::UnknownUser => StatusCode::FORBIDDEN,
			Self::PayloadSize => StatusCode::PAYLOAD_TOO_LARGE,
			Self::Cover(CoverError::TooLarge) => StatusCode::PAYLOAD_TOO_LARGE,
			Self::MimeType | Self::Cover(CoverError::NotAnImage) => {
				StatusCode::UNSUPPORTED_MEDIA_TYPE
			}
			Self::Draft(_) => StatusCode::BAD_REQUEST,
			Self::Tags(_) => StatusCode::BAD_REQUEST,
			Self::Link(_) => StatusCode::BAD_REQUEST,
			Self::PageSize => StatusCode::BAD_REQUEST,
			Self::PostNotFound => StatusCode::NOT_FOUND,
			Self::UserExists => StatusCode::BAD_REQUEST,
			Self::BadPassword => StatusCode::BAD_REQUEST,
			Self::BadEmail => StatusCode::BAD_REQUEST,
			Self::BadCredentials => StatusCode::BAD_REQUEST,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::body::MessageBody;
	use actix_web::ResponseError;

	fn body_of(err: APIError) -> (StatusCode, serde_json::Value) {
		let res = err.error_response();
		let status = res.status();
		let bytes = res.into_body().try_into_bytes().unwrap();
		(status, serde_json::from_slice(&bytes).unwrap())
	}

	#[test]
	fn errors_render_a_message() {
		let (status, body) = body_of(APIError::Draft(DraftError::TitleTooLong));
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["message"], "Title must be less than 200 characters");
	}

	#[test]
	fn auth_failures_have_distinct_statuses() {
		let statuses = [
			APIError::MissingToken.status_code(),
			APIError::InvalidToken.status_code(),
			APIError::UnknownUser.status_code(),
		];
		assert_eq!(
			statuses,
			[
				StatusCode::UNAUTHORIZED,
				StatusCode::BAD_REQUEST,
				StatusCode::FORBIDDEN
			]
		);
		let (_, body) = body_of(APIError::MissingToken);
		assert_eq!(body["message"], "User not authenticated - Please provide token");
	}

	#[test]
	fn cover_errors_map_to_upload_statuses() {
		assert_eq!(
			APIError::from(CoverError::TooLarge).status_code(),
			StatusCode::PAYLOAD_TOO_LARGE
		);
		assert_eq!(
			APIError::from(CoverError::NotAnImage).status_code(),
			StatusCode::UNSUPPORTED_MEDIA_TYPE
		);
	}
}
