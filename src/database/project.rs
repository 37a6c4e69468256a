pub use deadpool_postgres::tokio_postgres as pg;

use crate::database::DatabaseError;

use devconnect::model::{PostAuthor, Project};

const SELECT_PROJECTS: &str = "SELECT p.id, p.title, p.description, p.tech_stack, p.github_url, \
                               p.live_url, p.created_at, u.id AS author_id, \
                               u.full_name AS author_name, u.profile_pic AS author_pic \
                               FROM projects p JOIN users u ON u.id = p.author";

pub struct Projects;

impl Projects {
	/// Newest first, `page` counted from zero
	pub async fn select_page(
		client: &pg::Client,
		page: u32,
		limit: u32,
	) -> Result<Vec<Project>, DatabaseError> {
		let query = format!(
			"{} ORDER BY p.created_at DESC, p.id DESC OFFSET $1 LIMIT $2",
			SELECT_PROJECTS
		);
		let offset = i64::from(page) * i64::from(limit);
		let rows = client
			.query(query.as_str(), &[&offset, &i64::from(limit)])
			.await?;
		Ok(rows.iter().map(Self::deserialise).collect())
	}

	fn deserialise(row: &pg::row::Row) -> Project {
		Project {
			id: row.get("id"),
			title: row.get("title"),
			description: row.get("description"),
			tech_stack: row.get("tech_stack"),
			github_url: row.get("github_url"),
			live_url: row.get("live_url"),
			author: PostAuthor {
				id: row.get("author_id"),
				full_name: row.get("author_name"),
				profile_pic: row.get("author_pic"),
			},
			created_at: row.get("created_at"),
		}
	}
}

#[derive(Debug)]
pub struct NewProject<'a> {
	pub title: &'a str,
	pub description: &'a str,
	pub tech_stack: &'a [String],
	pub github_url: Option<&'a str>,
	pub live_url: Option<&'a str>,
	pub author: &'a PostAuthor,
}

impl NewProject<'_> {
	pub async fn insert_into(&self, client: &pg::Client) -> Result<Project, DatabaseError> {
		let query = "INSERT INTO projects (title, description, tech_stack, github_url, live_url, \
		             author) VALUES ($1, $2, $3, $4, $5, $6) RETURNING id, created_at";
		let row = client
			.query_one(
				query,
				&[
					&self.title,
					&self.description,
					&self.tech_stack,
					&self.github_url,
					&self.live_url,
					&self.author.id,
				],
			)
			.await?;
		Ok(Project {
			id: row.get("id"),
			title: self.title.to_owned(),
			description: self.description.to_owned(),
			tech_stack: self.tech_stack.to_vec(),
			github_url: self.github_url.map(str::to_owned),
			live_url: self.live_url.map(str::to_owned),
			author: self.author.clone(),
			created_at: row.get("created_at"),
		})
	}
}
