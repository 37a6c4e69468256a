use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of each multipart field on the create-post request
pub mod fields {
	pub const TITLE: &str = "title";
	pub const DESCRIPTION: &str = "description";
	pub const CONTENT: &str = "content";
	pub const TAGS: &str = "tags";
	pub const COVER: &str = "coverImg";
	pub const REQUEST_TOKEN: &str = "requestToken";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAuthor {
	pub id: i32,
	pub full_name: String,
	pub profile_pic: String,
}

/// A post as the API hands it out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
	pub id: i64,
	pub title: String,
	pub description: String,
	pub content: String,
	pub tags: Vec<String>,
	pub cover_img_url: String,
	pub author: PostAuthor,
	pub upvotes: Vec<i32>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// A project a user shows off, with the stack it was built on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
	pub id: i64,
	pub title: String,
	pub description: String,
	pub tech_stack: Vec<String>,
	pub github_url: Option<String>,
	pub live_url: Option<String>,
	pub author: PostAuthor,
	pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	pub id: i32,
	pub email: String,
	pub full_name: String,
	pub title: String,
	pub profile_pic: String,
	pub created_at: DateTime<Utc>,
}

/// An image picked for upload, before any checks
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
	pub name: String,
	pub mime: String,
	pub data: Bytes,
}

impl ImageFile {
	pub fn new(name: impl Into<String>, mime: impl Into<String>, data: impl Into<Bytes>) -> Self {
		Self {
			name: name.into(),
			mime: mime.into(),
			data: data.into(),
		}
	}

	pub fn size(&self) -> usize {
		self.data.len()
	}
}

/// The serialised draft, one value per multipart field
#[derive(Debug, Clone, PartialEq)]
pub struct PostForm {
	pub title: String,
	pub description: String,
	pub content: String,
	/// Comma-joined
	pub tags: String,
	pub cover: ImageFile,
	pub request_token: Uuid,
}

/// Body of an error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
	pub message: String,
}

/// Best guess of the mime type of encoded image data, used when a file comes
/// off disk without one.
pub fn sniff_image_mime(data: &[u8]) -> Option<&'static str> {
	use image::ImageFormat;
	let mime = match image::guess_format(data).ok()? {
		ImageFormat::Png => "image/png",
		ImageFormat::Jpeg => "image/jpeg",
		ImageFormat::Gif => "image/gif",
		ImageFormat::WebP => "image/webp",
		ImageFormat::Bmp => "image/bmp",
		ImageFormat::Tiff => "image/tiff",
		ImageFormat::Ico => "image/x-icon",
		_ => return None,
	};
	Some(mime)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn post_serialises_camel_case() {
		let now = Utc::now();
		let post = Post {
			id: 7,
			title: "Hello".into(),
			description: "World".into(),
			content: "Body text".into(),
			tags: vec!["a".into(), "b".into()],
			cover_img_url: "http://localhost/s/img/00/x.png".into(),
			author: PostAuthor {
				id: 1,
				full_name: "Sam".into(),
				profile_pic: "pic".into(),
			},
			upvotes: vec![],
			created_at: now,
			updated_at: now,
		};
		let json = serde_json::to_value(&post).unwrap();
		assert_eq!(json["coverImgUrl"], "http://localhost/s/img/00/x.png");
		assert_eq!(json["author"]["fullName"], "Sam");
		assert!(json.get("requestToken").is_none());

		let back: Post = serde_json::from_value(json).unwrap();
		assert_eq!(back, post);
	}

	#[test]
	fn sniff_png_header() {
		let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];
		assert_eq!(sniff_image_mime(&png), Some("image/png"));
		assert_eq!(sniff_image_mime(b"plain text"), None);
	}
}
