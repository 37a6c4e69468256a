use async_std::fs;
use std::path::PathBuf;

use uuid::Uuid;

/// Cover images live under `{root}/img/{xx}/`, with `xx` taken from the first
/// byte of the stored name so no one directory grows too large.
#[derive(Clone)]
pub struct CoverStore {
	root: PathBuf,
	public_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredCover {
	pub path: PathBuf,
	pub url: String,
}

impl CoverStore {
	pub fn new(root: &str, public_url: &str) -> Self {
		Self {
			root: PathBuf::from(root),
			public_url: public_url.trim_end_matches('/').to_owned(),
		}
	}

	fn subfolder(id: &Uuid) -> String {
		format!("{:02x}", id.as_bytes()[0])
	}

	pub fn image_dirs(&self) -> impl Iterator<Item = PathBuf> + '_ {
		(0..256).map(move |i| self.root.join("img").join(format!("{:02x}", i)))
	}

	pub async fn save(
		&self,
		data: &[u8],
		filename: &str,
		ext: &str,
	) -> Result<StoredCover, std::io::Error> {
		let id = Uuid::new_v4();
		let subfolder = Self::subfolder(&id);
		let stem = std::path::Path::new(filename)
			.file_stem()
			.and_then(|s| s.to_str())
			.filter(|s| !s.is_empty())
			.unwrap_or("cover");
		let stem: String = stem
			.chars()
			.map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '-' })
			.collect();
		let name = format!("{}-{}.{}", id.simple(), stem, ext);

		let dir = self.root.join("img").join(&subfolder);
		fs::create_dir_all(&dir).await?;
		let path = dir.join(&name);
		fs::write(&path, data).await?;

		Ok(StoredCover {
			path,
			url: format!("{}/s/img/{}/{}", self.public_url, subfolder, name),
		})
	}

	/// Removes a cover that never made it into the database
	pub async fn discard(&self, cover: &StoredCover) {
		if let Err(e) = fs::remove_file(&cover.path).await {
			log::warn!("failed to remove orphaned cover {}: {}", cover.path.display(), e);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn temp_root() -> PathBuf {
		std::env::temp_dir().join(format!("devconnect-test-{}", Uuid::new_v4().simple()))
	}

	#[actix_web::test]
	async fn save_writes_file_and_builds_url() {
		let root = temp_root();
		let root_str = root.to_str().unwrap().to_owned();
		let store = CoverStore::new(&root_str, "http://localhost:5000/");

		let cover = store.save(b"png bytes", "my cover.png", "png").await.unwrap();
		assert_eq!(std::fs::read(&cover.path).unwrap(), b"png bytes");
		assert!(cover.url.starts_with("http://localhost:5000/s/img/"));
		assert!(cover.url.ends_with("-my-cover.png"));
		assert!(cover.path.starts_with(root.join("img")));

		store.discard(&cover).await;
		assert!(!cover.path.exists());
		std::fs::remove_dir_all(root).unwrap();
	}

	#[actix_web::test]
	async fn empty_filename_gets_a_stem() {
		let root = temp_root();
		let store = CoverStore::new(root.to_str().unwrap(), "http://h");
		let cover = store.save(b"x", "", "gif").await.unwrap();
		assert!(cover.url.ends_with("-cover.gif"));
		std::fs::remove_dir_all(root).unwrap();
	}

	#[test]
	fn image_dirs_cover_every_prefix() {
		let store = CoverStore::new("/srv", "http://h");
		let dirs: Vec<_> = store.image_dirs().collect();
		assert_eq!(dirs.len(), 256);
		assert_eq!(dirs[0], PathBuf::from("/srv/img/00"));
		assert_eq!(dirs[255], PathBuf::from("/srv/img/ff"));
	}
}
