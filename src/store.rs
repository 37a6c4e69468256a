//! Client side post state, shared by whichever views need it. Views are handed
//! an `Rc<PostStore<_>>` rather than reaching for a global.

use std::cell::{Ref, RefCell};

use async_trait::async_trait;

use crate::client::ClientError;
use crate::model::{Post, PostForm};

#[async_trait(?Send)]
pub trait PostApi {
	async fn create_post(&self, form: PostForm) -> Result<Post, ClientError>;
	async fn list_posts(&self, page: u32, limit: u32) -> Result<Vec<Post>, ClientError>;
}

pub const FEED_PAGE_SIZE: u32 = 20;

pub struct PostStore<A> {
	api: A,
	feed: RefCell<Vec<Post>>,
}

impl<A: PostApi> PostStore<A> {
	pub fn new(api: A) -> Self {
		Self {
			api,
			feed: RefCell::new(Vec::new()),
		}
	}

	pub fn api(&self) -> &A {
		&self.api
	}

	/// Posts currently cached, newest first
	pub fn feed(&self) -> Ref<'_, Vec<Post>> {
		self.feed.borrow()
	}

	pub async fn create_post(&self, form: PostForm) -> Result<Post, ClientError> {
		let post = self.api.create_post(form).await?;
		let mut feed = self.feed.borrow_mut();
		// A replayed submission hands back a post we may already hold
		feed.retain(|p| p.id != post.id);
		feed.insert(0, post.clone());
		Ok(post)
	}

	pub async fn refresh_feed(&self) -> Result<(), ClientError> {
		let posts = self.api.list_posts(0, FEED_PAGE_SIZE).await?;
		*self.feed.borrow_mut() = posts;
		Ok(())
	}
}

#[cfg(test)]
pub(crate) mod testing {
	use super::*;
	use crate::model::PostAuthor;
	use chrono::Utc;
	use std::cell::Cell;

	/// Records every form it receives and answers from a queue of responses,
	/// echoing the form back as a post once the queue runs dry.
	#[derive(Default)]
	pub struct FakeApi {
		pub sent: RefCell<Vec<PostForm>>,
		pub failures: RefCell<Vec<ClientError>>,
		pub next_id: Cell<i64>,
		pub listed: RefCell<Vec<Post>>,
	}

	pub fn post_from_form(id: i64, form: &PostForm) -> Post {
		let now = Utc::now();
		Post {
			id,
			title: form.title.clone(),
			description: form.description.clone(),
			content: form.content.clone(),
			tags: crate::validation::split_tags(&form.tags).unwrap_or_default(),
			cover_img_url: format!("http://localhost/s/img/00/{}", form.cover.name),
			author: PostAuthor {
				id: 1,
				full_name: "Tester".into(),
				profile_pic: String::new(),
			},
			upvotes: vec![],
			created_at: now,
			updated_at: now,
		}
	}

	#[async_trait(?Send)]
	impl PostApi for FakeApi {
		async fn create_post(&self, form: PostForm) -> Result<Post, ClientError> {
			self.sent.borrow_mut().push(form.clone());
			if let Some(err) = self.failures.borrow_mut().pop() {
				return Err(err);
			}
			self.next_id.set(self.next_id.get() + 1);
			Ok(post_from_form(self.next_id.get(), &form))
		}

		async fn list_posts(&self, _page: u32, _limit: u32) -> Result<Vec<Post>, ClientError> {
			Ok(self.listed.borrow().clone())
		}
	}
}
