//! Writes a post from the command line: logs in, fills a composer with the
//! given fields, submits it, then shows the feed.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use devconnect::client::HttpClient;
use devconnect::composer::{
	Composer, ComposerContext, Navigator, NoticeId, Notifier, ObjectUrls, SubmitOutcome, TagKey,
};
use devconnect::model::{sniff_image_mime, ImageFile};
use devconnect::store::{PostApi, PostStore};
use devconnect::validation::MAX_TAG_CHARS;
use log::LevelFilter;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(name = "devconnect-compose")]
struct Options {
	#[structopt(long, default_value = "http://127.0.0.1:5000")]
	server: String,
	#[structopt(long, env = "DEVCONNECT_EMAIL")]
	email: String,
	#[structopt(long, env = "DEVCONNECT_PASSWORD", hide_env_values = true)]
	password: String,
	#[structopt(long)]
	title: String,
	#[structopt(long)]
	description: String,
	/// Post body, read from `--content-file` when absent
	#[structopt(long)]
	content: Option<String>,
	#[structopt(long, parse(from_os_str))]
	content_file: Option<PathBuf>,
	/// May be repeated, or given comma separated
	#[structopt(long = "tag")]
	tags: Vec<String>,
	#[structopt(long, parse(from_os_str))]
	cover: PathBuf,
}

#[derive(Default)]
struct ConsoleNotifier {
	next: Cell<NoticeId>,
}

impl Notifier for ConsoleNotifier {
	fn loading(&self, message: &str) -> NoticeId {
		println!("... {}", message);
		self.next.set(self.next.get() + 1);
		self.next.get()
	}

	fn dismiss(&self, _id: NoticeId) {}

	fn success(&self, message: &str) {
		println!("ok: {}", message);
	}

	fn error(&self, message: &str) {
		eprintln!("error: {}", message);
	}
}

/// Remembers where the composer wants to go; the caller follows it
#[derive(Default)]
struct PendingRoute(RefCell<Option<(String, Duration)>>);

impl Navigator for PendingRoute {
	fn navigate_after(&self, route: &str, delay: Duration) {
		*self.0.borrow_mut() = Some((route.to_owned(), delay));
	}
}

fn read_cover(path: &PathBuf) -> std::io::Result<ImageFile> {
	let data = std::fs::read(path)?;
	let mime = sniff_image_mime(&data).unwrap_or("application/octet-stream");
	let name = path
		.file_name()
		.and_then(|n| n.to_str())
		.unwrap_or("cover")
		.to_owned();
	Ok(ImageFile::new(name, mime, data))
}

/// Commits each `--tag` value through the tag editor, returning the ones it
/// had to leave out
fn add_tags<A: PostApi>(composer: &mut Composer<A>, raw: &[String]) -> Vec<String> {
	let mut skipped = Vec::new();
	let tags = raw
		.iter()
		.flat_map(|t| t.split(','))
		.map(str::trim)
		.filter(|t| !t.is_empty());
	for tag in tags {
		if !composer.tag_input_enabled() {
			log::warn!("maximum of 10 tags reached, dropping '{}'", tag);
			skipped.push(tag.to_owned());
			continue;
		}
		if tag.chars().count() > MAX_TAG_CHARS {
			log::warn!("skipping tag over {} characters '{}'", MAX_TAG_CHARS, tag);
			skipped.push(tag.to_owned());
			continue;
		}
		composer.set_tag_input(tag);
		composer.tag_key(TagKey::Enter);
		if !composer.tag_input().is_empty() {
			log::warn!("skipping duplicate tag '{}'", tag);
			skipped.push(tag.to_owned());
			composer.set_tag_input("");
		}
	}
	skipped
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
	if let Err(e) = simple_logger::SimpleLogger::new()
		.with_level(LevelFilter::Info)
		.init()
	{
		eprintln!("failed to start logger: {}", e);
	}
	dotenv::dotenv().ok();

	let opts = Options::from_args();
	if let Err(code) = run(opts).await {
		std::process::exit(code);
	}
}

async fn run(opts: Options) -> Result<(), i32> {
	let content = match (&opts.content, &opts.content_file) {
		(Some(content), _) => content.clone(),
		(None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
			log::error!("failed to read {}: {}", path.display(), e);
			2
		})?,
		(None, None) => String::new(),
	};
	let cover = read_cover(&opts.cover).map_err(|e| {
		log::error!("failed to read {}: {}", opts.cover.display(), e);
		2
	})?;

	let client = HttpClient::new(&opts.server).map_err(|e| {
		log::error!("{}", e);
		2
	})?;
	let user = client.login(&opts.email, &opts.password).await.map_err(|e| {
		eprintln!(
			"error: {}",
			e.server_message().unwrap_or("could not log in")
		);
		log::error!("{}", e);
		1
	})?;
	log::info!("logged in as {}", user.full_name);

	let store = Rc::new(PostStore::new(client));
	let route = Rc::new(PendingRoute::default());
	let mut composer = Composer::new(ComposerContext {
		store: store.clone(),
		notifier: Rc::new(ConsoleNotifier::default()),
		navigator: route.clone(),
		previews: Rc::new(ObjectUrls::new()),
	});

	composer.set_title(&opts.title);
	composer.set_description(&opts.description);
	composer.set_content(&content);
	add_tags(&mut composer, &opts.tags);
	if composer.change_image(cover).is_err() {
		return Err(1);
	}

	match composer.submit().await {
		SubmitOutcome::Published(post) => {
			println!("published post {}: {}", post.id, post.cover_img_url);
		}
		_ => return Err(1),
	}

	let pending = route.0.borrow_mut().take();
	if let Some((route, delay)) = pending {
		tokio::time::sleep(delay).await;
		log::info!("navigating to {}", route);
		if let Err(e) = store.refresh_feed().await {
			log::error!("failed to load feed: {}", e);
			return Err(1);
		}
		for post in store.feed().iter() {
			println!(
				"#{} {} by {} [{}]",
				post.id,
				post.title,
				post.author.full_name,
				post.tags.join(", ")
			);
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn composer() -> Composer<HttpClient> {
		// Never contacted, tags stay local
		let client = HttpClient::new("http://127.0.0.1:9").unwrap();
		Composer::new(ComposerContext {
			store: Rc::new(PostStore::new(client)),
			notifier: Rc::new(ConsoleNotifier::default()),
			navigator: Rc::new(PendingRoute::default()),
			previews: Rc::new(ObjectUrls::new()),
		})
	}

	fn strings(values: &[&str]) -> Vec<String> {
		values.iter().map(|v| v.to_string()).collect()
	}

	#[test]
	fn tags_are_split_and_committed() {
		let mut composer = composer();
		let skipped = add_tags(&mut composer, &strings(&["rust, web", "cli", " ,"]));
		assert!(skipped.is_empty());
		assert_eq!(composer.tags(), ["rust", "web", "cli"]);
		assert_eq!(composer.tag_input(), "");
	}

	#[test]
	fn long_tags_are_skipped_not_cut() {
		let long = "x".repeat(MAX_TAG_CHARS + 1);
		let mut composer = composer();
		let skipped = add_tags(&mut composer, &strings(&[&long, "ok"]));
		assert_eq!(skipped, vec![long]);
		assert_eq!(composer.tags(), ["ok"]);
	}

	#[test]
	fn duplicates_and_overflow_are_reported() {
		let mut composer = composer();
		let mut raw: Vec<String> = (0..10).map(|i| format!("t{}", i)).collect();
		raw.insert(1, "t0".into());
		raw.push("t10".into());
		let skipped = add_tags(&mut composer, &raw);
		assert_eq!(skipped, strings(&["t0", "t10"]));
		assert_eq!(composer.tags().len(), 10);
	}
}
