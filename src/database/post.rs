pub use deadpool_postgres::tokio_postgres as pg;

use crate::database::DatabaseError;

use async_trait::async_trait;
use devconnect::model::{Post, PostAuthor};
use uuid::Uuid;

const SELECT_POSTS: &str = "SELECT p.id, p.title, p.description, p.content, p.tags, \
                            p.cover_img_url, p.upvotes, p.created_at, p.updated_at, \
                            u.id AS author_id, u.full_name AS author_name, \
                            u.profile_pic AS author_pic FROM posts p JOIN users u ON u.id = p.author";

/// Queries over `posts`, joined with the author's public details
pub struct Posts;

impl Posts {
	pub async fn select_post(client: &pg::Client, id: i64) -> Result<Option<Post>, DatabaseError> {
		let query = format!("{} WHERE p.id=$1", SELECT_POSTS);
		let row = client.query_opt(query.as_str(), &[&id]).await?;
		Ok(row.as_ref().map(Self::deserialise))
	}

	/// Newest first
	pub async fn select_page(
		client: &pg::Client,
		page: u32,
		limit: u32,
	) -> Result<Vec<Post>, DatabaseError> {
		let query = format!(
			"{} ORDER BY p.created_at DESC, p.id DESC OFFSET $1 LIMIT $2",
			SELECT_POSTS
		);
		let offset = i64::from(page) * i64::from(limit);
		let rows = client
			.query(query.as_str(), &[&offset, &i64::from(limit)])
			.await?;
		Ok(rows.iter().map(Self::deserialise).collect())
	}

	pub async fn select_request_token(
		client: &pg::Client,
		author: i32,
		token: Uuid,
	) -> Result<Option<Post>, DatabaseError> {
		let query = format!("{} WHERE p.author=$1 AND p.request_token=$2", SELECT_POSTS);
		let row = client.query_opt(query.as_str(), &[&author, &token]).await?;
		Ok(row.as_ref().map(Self::deserialise))
	}

	fn deserialise(row: &pg::row::Row) -> Post {
		Post {
			id: row.get("id"),
			title: row.get("title"),
			description: row.get("description"),
			content: row.get("content"),
			tags: row.get("tags"),
			cover_img_url: row.get("cover_img_url"),
			author: PostAuthor {
				id: row.get("author_id"),
				full_name: row.get("author_name"),
				profile_pic: row.get("author_pic"),
			},
			upvotes: row.get("upvotes"),
			created_at: row.get("created_at"),
			updated_at: row.get("updated_at"),
		}
	}
}

#[derive(Debug)]
pub struct NewPost<'a> {
	pub title: &'a str,
	pub description: &'a str,
	pub content: &'a str,
	pub tags: &'a [String],
	pub cover_img_url: &'a str,
	pub author: &'a PostAuthor,
	pub request_token: Option<Uuid>,
}

impl NewPost<'_> {
	/// Inserts the post. `None` means another post by the same author already
	/// holds this request token.
	pub async fn insert_into(&self, client: &pg::Client) -> Result<Option<Post>, DatabaseError> {
		let query = "INSERT INTO posts (title, description, content, tags, cover_img_url, author, \
		             request_token) VALUES ($1, $2, $3, $4, $5, $6, $7) ON CONFLICT (author, \
		             request_token) DO NOTHING RETURNING id, title, description, content, tags, \
		             cover_img_url, upvotes, created_at, updated_at";
		let row = client
			.query_opt(
				query,
				&[
					&self.title,
					&self.description,
					&self.content,
					&self.tags,
					&self.cover_img_url,
					&self.author.id,
					&self.request_token,
				],
			)
			.await?;
		Ok(row.map(|row| Post {
			id: row.get("id"),
			title: row.get("title"),
			description: row.get("description"),
			content: row.get("content"),
			tags: row.get("tags"),
			cover_img_url: row.get("cover_img_url"),
			author: self.author.clone(),
			upvotes: row.get("upvotes"),
			created_at: row.get("created_at"),
			updated_at: row.get("updated_at"),
		}))
	}
}

/// The queries create-post runs, kept apart so the flow can be driven
/// without a database
#[async_trait(?Send)]
pub trait PostRepo {
	async fn post_by_request_token(
		&self,
		author: i32,
		token: Uuid,
	) -> Result<Option<Post>, DatabaseError>;
	async fn insert_post(&self, post: &NewPost<'_>) -> Result<Option<Post>, DatabaseError>;
}

#[async_trait(?Send)]
impl PostRepo for deadpool_postgres::Client {
	async fn post_by_request_token(
		&self,
		author: i32,
		token: Uuid,
	) -> Result<Option<Post>, DatabaseError> {
		Posts::select_request_token(self, author, token).await
	}

	async fn insert_post(&self, post: &NewPost<'_>) -> Result<Option<Post>, DatabaseError> {
		post.insert_into(self).await
	}
}
