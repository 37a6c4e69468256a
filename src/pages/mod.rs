pub mod post;
pub mod project;
pub mod user;

use actix_web::{http::header, http::StatusCode, web, HttpRequest, HttpResponse, HttpResponseBuilder};
use serde::Serialize;

use crate::{error::APIError, try500};

const MAX_PAGE_SIZE: u32 = 50;

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<HttpResponse, APIError> {
	Ok(HttpResponseBuilder::new(status)
		.append_header((header::CONTENT_TYPE, "application/json; charset=utf-8"))
		.body(try500!(serde_json::to_string(body), "json serialise")))
}

/// Page sizes above the limit are refused rather than clamped
pub fn check_page_size(limit: u32) -> Result<(), APIError> {
	if limit > MAX_PAGE_SIZE {
		return Err(APIError::PageSize);
	}
	Ok(())
}

fn bad_extract(req: &HttpRequest, err: impl std::fmt::Display) -> actix_web::Error {
	log::warn!("{} {}: {}", req.method(), req.path(), err);
	APIError::BadRequestData.into()
}

// Extractor failures use the same `{"message"}` body as handler errors
pub fn json_config() -> web::JsonConfig {
	web::JsonConfig::default().error_handler(|err, req| bad_extract(req, err))
}

pub fn path_config() -> web::PathConfig {
	web::PathConfig::default().error_handler(|err, req| bad_extract(req, err))
}

pub fn query_config() -> web::QueryConfig {
	web::QueryConfig::default().error_handler(|err, req| bad_extract(req, err))
}

pub async fn get_health() -> Result<HttpResponse, APIError> {
	json_response(
		StatusCode::OK,
		&serde_json::json!({ "message": "Server is running perfectly" }),
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::{http::header::ContentType, test, App};

	#[actix_web::test]
	async fn extractor_failures_render_a_message() {
		let app = test::init_service(
			App::new()
				.app_data(json_config())
				.app_data(path_config())
				.app_data(query_config())
				.route(
					"/login",
					web::post().to(|_: web::Json<user::LoginQuery>| async { HttpResponse::Ok().finish() }),
				)
				.route(
					"/post/{id}",
					web::get().to(|_: web::Path<i64>| async { HttpResponse::Ok().finish() }),
				)
				.route(
					"/feed",
					web::get().to(|_: web::Query<post::FeedQuery>| async { HttpResponse::Ok().finish() }),
				),
		)
		.await;

		let requests = vec![
			test::TestRequest::post()
				.uri("/login")
				.insert_header(ContentType::json())
				.set_payload("{not json"),
			// Not JSON at all
			test::TestRequest::post()
				.uri("/login")
				.insert_header(ContentType::plaintext())
				.set_payload("email=a"),
			test::TestRequest::get().uri("/post/abc"),
			test::TestRequest::get().uri("/feed?p=-1"),
		];
		for req in requests {
			let res = test::call_service(&app, req.to_request()).await;
			assert_eq!(res.status(), StatusCode::BAD_REQUEST);
			let body: serde_json::Value = test::read_body_json(res).await;
			assert_eq!(body["message"], "bad request");
		}
	}

	#[actix_web::test]
	async fn well_formed_requests_reach_the_handler() {
		let app = test::init_service(App::new().app_data(path_config()).route(
			"/post/{id}",
			web::get().to(|id: web::Path<i64>| async move { HttpResponse::Ok().body(id.to_string()) }),
		))
		.await;
		let res = test::call_service(&app, test::TestRequest::get().uri("/post/42").to_request()).await;
		assert_eq!(res.status(), StatusCode::OK);
		assert_eq!(test::read_body(res).await, "42");
	}

	#[::core::prelude::v1::test]
	fn page_size_is_capped() {
		assert!(check_page_size(50).is_ok());
		assert!(matches!(check_page_size(51), Err(APIError::PageSize)));
	}
}
