//! Field rules shared by the composer and the ingestion endpoint, so a draft
//! the composer accepts is exactly a draft the server accepts.

use derive_more::{Display, Error};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const MAX_CONTENT_CHARS: usize = 50_000;
pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_CHARS: usize = 30;
/// 5MiB
pub const MAX_COVER_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum DraftError {
	#[display(fmt = "Title is required")]
	TitleMissing,
	#[display(fmt = "Title must be less than 200 characters")]
	TitleTooLong,
	#[display(fmt = "Description is required")]
	DescriptionMissing,
	#[display(fmt = "Description must be less than 500 characters")]
	DescriptionTooLong,
	#[display(fmt = "Content is required")]
	ContentMissing,
	#[display(fmt = "Content is too long")]
	ContentTooLong,
	#[display(fmt = "Please upload a cover image")]
	CoverMissing,
}

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum CoverError {
	#[display(fmt = "Please upload an image file")]
	NotAnImage,
	#[display(fmt = "Image size should be less than 5MB")]
	TooLarge,
}

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display(fmt = "links must start with http:// or https://")]
pub struct LinkError;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum TagError {
	#[display(fmt = "too many tags, please reduce amount")]
	TooMany,
	#[display(fmt = "tags must be less than 30 characters")]
	TooLong,
}

fn check_field(
	value: &str,
	max: usize,
	missing: DraftError,
	too_long: DraftError,
) -> Result<(), DraftError> {
	let value = value.trim();
	if value.is_empty() {
		return Err(missing);
	}
	if value.chars().count() > max {
		return Err(too_long);
	}
	Ok(())
}

/// Title then description, as posts and projects both carry them
pub fn validate_summary(title: &str, description: &str) -> Result<(), DraftError> {
	check_field(
		title,
		MAX_TITLE_CHARS,
		DraftError::TitleMissing,
		DraftError::TitleTooLong,
	)?;
	check_field(
		description,
		MAX_DESCRIPTION_CHARS,
		DraftError::DescriptionMissing,
		DraftError::DescriptionTooLong,
	)
}

/// Checks the text fields in order, stopping at the first failure. The cover
/// image is checked separately since the two sides hold it differently.
pub fn validate_text(title: &str, description: &str, content: &str) -> Result<(), DraftError> {
	validate_summary(title, description)?;
	check_field(
		content,
		MAX_CONTENT_CHARS,
		DraftError::ContentMissing,
		DraftError::ContentTooLong,
	)
}

pub fn is_image_mime(mime: &str) -> bool {
	mime.starts_with("image/")
}

pub fn check_cover(mime: &str, size: usize) -> Result<(), CoverError> {
	if !is_image_mime(mime) {
		return Err(CoverError::NotAnImage);
	}
	if size > MAX_COVER_BYTES {
		return Err(CoverError::TooLarge);
	}
	Ok(())
}

/// Normalises a tag the way the tag input commits it: surrounding whitespace
/// and any trailing commas are removed.
pub fn normalise_tag(raw: &str) -> &str {
	raw.trim().trim_end_matches(',')
}

pub fn join_tags(tags: &[String]) -> String {
	tags.join(",")
}

/// Splits the comma-joined wire form back into tags. Empty entries and later
/// duplicates are dropped, order is otherwise kept.
pub fn split_tags(joined: &str) -> Result<Vec<String>, TagError> {
	collect_tags(joined.split(','))
}

/// Trims and dedupes a list of tags under the same limits as a post's
pub fn collect_tags<'a>(raw: impl IntoIterator<Item = &'a str>) -> Result<Vec<String>, TagError> {
	let mut tags: Vec<String> = Vec::new();
	for tag in raw.into_iter().map(str::trim).filter(|t| !t.is_empty()) {
		if tag.chars().count() > MAX_TAG_CHARS {
			return Err(TagError::TooLong);
		}
		if !tags.iter().any(|t| t == tag) {
			tags.push(tag.to_owned());
		}
	}
	if tags.len() > MAX_TAGS {
		return Err(TagError::TooMany);
	}
	Ok(tags)
}

/// Returns the trimmed link, `None` when blank
pub fn check_link(link: &str) -> Result<Option<String>, LinkError> {
	let link = link.trim();
	if link.is_empty() {
		return Ok(None);
	}
	let rest = link
		.strip_prefix("https://")
		.or_else(|| link.strip_prefix("http://"))
		.ok_or(LinkError)?;
	if rest.is_empty() || rest.chars().any(char::is_whitespace) {
		return Err(LinkError);
	}
	Ok(Some(link.to_owned()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn text_checks_run_in_order() {
		assert_eq!(validate_text("", "", ""), Err(DraftError::TitleMissing));
		assert_eq!(validate_text("  ", "d", "c"), Err(DraftError::TitleMissing));
		assert_eq!(
			validate_text("t", " \n", "c"),
			Err(DraftError::DescriptionMissing)
		);
		assert_eq!(validate_text("t", "d", "\t"), Err(DraftError::ContentMissing));
		assert_eq!(validate_text("Hello", "World", "Body text"), Ok(()));
	}

	#[test]
	fn length_limits_are_inclusive() {
		let title = "a".repeat(MAX_TITLE_CHARS);
		assert_eq!(validate_text(&title, "d", "c"), Ok(()));
		let title = "a".repeat(MAX_TITLE_CHARS + 1);
		let err = validate_text(&title, "d", "c").unwrap_err();
		assert_eq!(err.to_string(), "Title must be less than 200 characters");

		let description = "d".repeat(MAX_DESCRIPTION_CHARS + 1);
		assert_eq!(
			validate_text("t", &description, "c"),
			Err(DraftError::DescriptionTooLong)
		);
		let content = "c".repeat(MAX_CONTENT_CHARS + 1);
		assert_eq!(
			validate_text("t", "d", &content),
			Err(DraftError::ContentTooLong)
		);
	}

	#[test]
	fn lengths_count_trimmed_chars() {
		// Padding doesn't count, multibyte characters count once
		let title = format!("  {}  ", "é".repeat(MAX_TITLE_CHARS));
		assert_eq!(validate_text(&title, "d", "c"), Ok(()));
	}

	#[test]
	fn cover_checks() {
		assert_eq!(check_cover("image/png", 1024 * 1024), Ok(()));
		assert_eq!(check_cover("image/gif", MAX_COVER_BYTES), Ok(()));
		assert_eq!(
			check_cover("image/png", MAX_COVER_BYTES + 1),
			Err(CoverError::TooLarge)
		);
		assert_eq!(check_cover("text/plain", 10), Err(CoverError::NotAnImage));
		assert_eq!(check_cover("", 10), Err(CoverError::NotAnImage));
	}

	#[test]
	fn normalise_strips_trailing_commas() {
		assert_eq!(normalise_tag("  rust,,"), "rust");
		assert_eq!(normalise_tag(",,"), "");
		assert_eq!(normalise_tag("a,b"), "a,b");
	}

	#[test]
	fn split_tags_from_wire() {
		assert_eq!(split_tags("a,b").unwrap(), vec!["a", "b"]);
		assert_eq!(split_tags("").unwrap(), Vec::<String>::new());
		assert_eq!(split_tags(" a , ,b,a,A").unwrap(), vec!["a", "b", "A"]);
	}

	#[test]
	fn split_tags_limits() {
		let eleven = (0..11).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
		assert_eq!(split_tags(&eleven), Err(TagError::TooMany));
		let long = "x".repeat(MAX_TAG_CHARS + 1);
		assert_eq!(split_tags(&long), Err(TagError::TooLong));
	}

	#[test]
	fn links_must_be_web_urls() {
		assert_eq!(check_link("  "), Ok(None));
		assert_eq!(
			check_link(" https://github.com/sam/app "),
			Ok(Some("https://github.com/sam/app".to_owned()))
		);
		assert_eq!(check_link("http://localhost:3000").map(|l| l.is_some()), Ok(true));
		assert_eq!(check_link("ftp://files.example.com"), Err(LinkError));
		assert_eq!(check_link("https://"), Err(LinkError));
		assert_eq!(check_link("https://a b"), Err(LinkError));
	}

	#[test]
	fn listed_tags_follow_split_rules() {
		let stack = ["Rust", " actix ", "", "Rust"];
		assert_eq!(collect_tags(stack), Ok(vec!["Rust".to_owned(), "actix".to_owned()]));
		let too_many: Vec<String> = (0..=MAX_TAGS).map(|i| i.to_string()).collect();
		assert_eq!(
			collect_tags(too_many.iter().map(String::as_str)),
			Err(TagError::TooMany)
		);
	}
}
