//! The post composer: holds the draft a user is writing, checks it, and turns
//! it into a create-post request.

mod preview;
mod tags;

pub use preview::{ObjectUrls, Preview, PreviewRegistry};
pub use tags::{TagEditor, TagKey};

use std::rc::Rc;
use std::time::Duration;

use uuid::Uuid;

use crate::client::ClientError;
use crate::model::{ImageFile, Post, PostForm};
use crate::store::{PostApi, PostStore};
use crate::validation::{self, CoverError, DraftError};

pub const FEED_ROUTE: &str = "/home";
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);
pub const PUBLISHING_MESSAGE: &str = "Publishing your post...";
pub const PUBLISHED_MESSAGE: &str = "Your post has been published successfully.";
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to create post. Please try again.";

pub type NoticeId = u64;

/// Transient, non-blocking notifications
pub trait Notifier {
	fn loading(&self, message: &str) -> NoticeId;
	fn dismiss(&self, id: NoticeId);
	fn success(&self, message: &str);
	fn error(&self, message: &str);
}

pub trait Navigator {
	/// Change view to `route` once `delay` has passed
	fn navigate_after(&self, route: &str, delay: Duration);
}

/// Everything the composer talks to, passed in by whoever builds it
pub struct ComposerContext<A> {
	pub store: Rc<PostStore<A>>,
	pub notifier: Rc<dyn Notifier>,
	pub navigator: Rc<dyn Navigator>,
	pub previews: Rc<dyn PreviewRegistry>,
}

impl<A> Clone for ComposerContext<A> {
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			notifier: self.notifier.clone(),
			navigator: self.navigator.clone(),
			previews: self.previews.clone(),
		}
	}
}

#[derive(Debug)]
pub struct CoverImage {
	pub file: ImageFile,
	pub preview: Preview,
}

#[derive(Debug)]
pub enum SubmitOutcome {
	/// A submission is already in flight
	Busy,
	Invalid(DraftError),
	Published(Post),
	Failed(ClientError),
}

pub struct Composer<A> {
	ctx: ComposerContext<A>,
	title: String,
	description: String,
	content: String,
	tags: TagEditor,
	cover: Option<CoverImage>,
	is_submitting: bool,
	// Stays the same across retries of one draft so the server can spot replays
	request_token: Uuid,
}

impl<A: PostApi> Composer<A> {
	pub fn new(ctx: ComposerContext<A>) -> Self {
		Self {
			ctx,
			title: String::new(),
			description: String::new(),
			content: String::new(),
			tags: TagEditor::default(),
			cover: None,
			is_submitting: false,
			request_token: Uuid::new_v4(),
		}
	}

	pub fn title(&self) -> &str {
		&self.title
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	pub fn content(&self) -> &str {
		&self.content
	}

	pub fn tags(&self) -> &[String] {
		self.tags.tags()
	}

	pub fn tag_input(&self) -> &str {
		self.tags.input()
	}

	pub fn tag_input_enabled(&self) -> bool {
		!self.tags.is_full()
	}

	pub fn cover(&self) -> Option<&CoverImage> {
		self.cover.as_ref()
	}

	pub fn preview_url(&self) -> Option<&str> {
		self.cover.as_ref().map(|c| c.preview.url())
	}

	pub fn is_submitting(&self) -> bool {
		self.is_submitting
	}

	/// Whether the submit control should be enabled
	pub fn can_submit(&self) -> bool {
		!self.is_submitting
	}

	pub fn request_token(&self) -> Uuid {
		self.request_token
	}

	pub fn set_title(&mut self, title: &str) {
		self.title = title.to_owned();
	}

	pub fn set_description(&mut self, description: &str) {
		self.description = description.to_owned();
	}

	pub fn set_content(&mut self, content: &str) {
		self.content = content.to_owned();
	}

	pub fn set_tag_input(&mut self, text: &str) {
		self.tags.set_input(text);
	}

	pub fn tag_key(&mut self, key: TagKey) -> bool {
		self.tags.key(key)
	}

	pub fn remove_tag(&mut self, index: usize) -> Option<String> {
		self.tags.remove(index)
	}

	pub fn clear_tags(&mut self) {
		self.tags.clear_tags();
	}

	/// Picks a new cover image. A rejected file leaves the current one in
	/// place.
	pub fn change_image(&mut self, file: ImageFile) -> Result<(), CoverError> {
		if let Err(e) = validation::check_cover(&file.mime, file.size()) {
			self.ctx.notifier.error(&e.to_string());
			return Err(e);
		}
		let preview = Preview::new(self.ctx.previews.clone(), &file);
		// The old preview is revoked as it drops here
		self.cover = Some(CoverImage { file, preview });
		Ok(())
	}

	pub fn remove_image(&mut self) {
		self.cover = None;
	}

	pub fn validate(&self) -> Result<(), DraftError> {
		validation::validate_text(&self.title, &self.description, &self.content)?;
		if self.cover.is_none() {
			return Err(DraftError::CoverMissing);
		}
		Ok(())
	}

	/// Serialises the draft, trimming the text fields. `None` without a
	/// cover image.
	pub fn to_form(&self) -> Option<PostForm> {
		let cover = self.cover.as_ref()?;
		Some(PostForm {
			title: self.title.trim().to_owned(),
			description: self.description.trim().to_owned(),
			content: self.content.trim().to_owned(),
			tags: validation::join_tags(self.tags.tags()),
			cover: cover.file.clone(),
			request_token: self.request_token,
		})
	}

	pub async fn submit(&mut self) -> SubmitOutcome {
		if self.is_submitting {
			return SubmitOutcome::Busy;
		}
		if let Err(e) = self.validate() {
			self.ctx.notifier.error(&e.to_string());
			return SubmitOutcome::Invalid(e);
		}
		let form = match self.to_form() {
			Some(form) => form,
			None => return SubmitOutcome::Invalid(DraftError::CoverMissing),
		};

		self.is_submitting = true;
		let notifier = self.ctx.notifier.clone();
		let loading = notifier.loading(PUBLISHING_MESSAGE);
		let res = self.ctx.store.create_post(form).await;
		notifier.dismiss(loading);
		self.is_submitting = false;

		match res {
			Ok(post) => {
				notifier.success(PUBLISHED_MESSAGE);
				self.ctx.navigator.navigate_after(FEED_ROUTE, REDIRECT_DELAY);
				self.reset();
				SubmitOutcome::Published(post)
			}
			Err(e) => {
				log::error!("error creating post: {}", e);
				notifier.error(e.server_message().unwrap_or(SUBMIT_FAILED_MESSAGE));
				SubmitOutcome::Failed(e)
			}
		}
	}

	/// Back to an empty draft. Nothing is sent.
	pub fn reset(&mut self) {
		self.title.clear();
		self.description.clear();
		self.content.clear();
		self.tags.reset();
		self.cover = None;
		self.request_token = Uuid::new_v4();
	}
}
