use crate::auth::Authenticated;
use crate::database::project::{NewProject, Projects};
use crate::database::Pool as DbPool;
use crate::pages::{check_page_size, json_response};
use crate::{error::APIError, try500};

use actix_web::{http::StatusCode, web, HttpResponse};
use devconnect::validation;

fn default_page() -> u32 {
	1
}

fn default_limit() -> u32 {
	10
}

/// Pages count from one here
#[derive(Debug, serde::Deserialize)]
pub struct ProjectListQuery {
	#[serde(alias = "p", default = "default_page")]
	page: u32,
	#[serde(alias = "l", default = "default_limit")]
	limit: u32,
}

impl ProjectListQuery {
	fn offset_page(&self) -> u32 {
		self.page.saturating_sub(1)
	}
}

pub async fn get_projects(
	query: web::Query<ProjectListQuery>,
	pool: web::Data<DbPool>,
) -> Result<HttpResponse, APIError> {
	check_page_size(query.limit)?;

	let conn = try500!(pool.get().await, "get_projects:db pool");
	let projects = try500!(
		Projects::select_page(&conn, query.offset_page(), query.limit).await,
		"get_projects:select_page {:?}",
		query
	);
	json_response(StatusCode::OK, &projects)
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectQuery {
	title: String,
	description: String,
	#[serde(default)]
	tech_stack: Vec<String>,
	#[serde(default)]
	github_url: Option<String>,
	#[serde(default)]
	live_url: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct CheckedProject {
	pub title: String,
	pub description: String,
	pub tech_stack: Vec<String>,
	pub github_url: Option<String>,
	pub live_url: Option<String>,
}

impl ProjectQuery {
	fn check(&self) -> Result<CheckedProject, APIError> {
		validation::validate_summary(&self.title, &self.description)?;
		let tech_stack = validation::collect_tags(self.tech_stack.iter().map(String::as_str))?;
		let link = |l: &Option<String>| validation::check_link(l.as_deref().unwrap_or(""));
		Ok(CheckedProject {
			title: self.title.trim().to_owned(),
			description: self.description.trim().to_owned(),
			tech_stack,
			github_url: link(&self.github_url)?,
			live_url: link(&self.live_url)?,
		})
	}
}

pub async fn post_project(
	auth: Authenticated,
	query: web::Json<ProjectQuery>,
	pool: web::Data<DbPool>,
) -> Result<HttpResponse, APIError> {
	let project = query.check()?;
	let author = auth.author();

	let new_project = NewProject {
		title: &project.title,
		description: &project.description,
		tech_stack: &project.tech_stack,
		github_url: project.github_url.as_deref(),
		live_url: project.live_url.as_deref(),
		author: &author,
	};
	let conn = try500!(pool.get().await, "post_project:db pool");
	let created = try500!(
		new_project.insert_into(&conn).await,
		"post_project:insert_into {:?}",
		new_project
	);
	json_response(StatusCode::CREATED, &created)
}

#[cfg(test)]
mod tests {
	use super::*;
	use devconnect::validation::{DraftError, LinkError, TagError};

	fn query(json: &str) -> ProjectQuery {
		serde_json::from_str(json).unwrap()
	}

	#[test]
	fn project_body_is_checked_and_trimmed() {
		let project = query(
			r#"{"title":" DevConnect ","description":"A place for devs","techStack":["Rust"," actix","Rust"],"githubUrl":"https://github.com/sam/devconnect","liveUrl":""}"#,
		)
		.check()
		.unwrap();
		assert_eq!(
			project,
			CheckedProject {
				title: "DevConnect".into(),
				description: "A place for devs".into(),
				tech_stack: vec!["Rust".into(), "actix".into()],
				github_url: Some("https://github.com/sam/devconnect".into()),
				live_url: None,
			}
		);
	}

	#[test]
	fn optional_fields_may_be_left_out() {
		let project = query(r#"{"title":"t","description":"d"}"#).check().unwrap();
		assert!(project.tech_stack.is_empty());
		assert_eq!(project.github_url, None);
	}

	#[test]
	fn bad_projects_are_rejected() {
		assert!(matches!(
			query(r#"{"title":"","description":"d"}"#).check(),
			Err(APIError::Draft(DraftError::TitleMissing))
		));
		assert!(matches!(
			query(r#"{"title":"t","description":"d","liveUrl":"javascript:alert(1)"}"#).check(),
			Err(APIError::Link(LinkError))
		));
		let stack: Vec<String> = (0..11).map(|i| format!("\"t{}\"", i)).collect();
		let json = format!(r#"{{"title":"t","description":"d","techStack":[{}]}}"#, stack.join(","));
		assert!(matches!(query(&json).check(), Err(APIError::Tags(TagError::TooMany))));
	}

	#[test]
	fn pages_count_from_one() {
		let first: ProjectListQuery = serde_json::from_str("{}").unwrap();
		assert_eq!((first.page, first.limit), (1, 10));
		assert_eq!(first.offset_page(), 0);
		let zero = ProjectListQuery { page: 0, limit: 10 };
		assert_eq!(zero.offset_page(), 0);
		let third = ProjectListQuery { page: 3, limit: 10 };
		assert_eq!(third.offset_page(), 2);
	}
}
