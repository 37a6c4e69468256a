use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use bytes::Bytes;

use crate::model::ImageFile;

/// Hands out displayable URLs for picked images
pub trait PreviewRegistry {
	fn create(&self, image: &ImageFile) -> String;
	fn revoke(&self, url: &str);
}

/// A live preview URL. The URL is revoked when the handle is dropped, so
/// replacing or clearing the image releases it.
pub struct Preview {
	url: String,
	registry: Rc<dyn PreviewRegistry>,
}

impl Preview {
	pub fn new(registry: Rc<dyn PreviewRegistry>, image: &ImageFile) -> Self {
		let url = registry.create(image);
		Self { url, registry }
	}

	pub fn url(&self) -> &str {
		&self.url
	}
}

impl Drop for Preview {
	fn drop(&mut self) {
		self.registry.revoke(&self.url);
	}
}

impl std::fmt::Debug for Preview {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Preview").field(&self.url).finish()
	}
}

/// Keeps preview data in memory behind `blob:` style URLs
#[derive(Default)]
pub struct ObjectUrls {
	entries: RefCell<HashMap<String, Bytes>>,
}

impl ObjectUrls {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn resolve(&self, url: &str) -> Option<Bytes> {
		self.entries.borrow().get(url).cloned()
	}

	pub fn live(&self) -> usize {
		self.entries.borrow().len()
	}
}

impl PreviewRegistry for ObjectUrls {
	fn create(&self, image: &ImageFile) -> String {
		let url = format!("blob:{}", uuid::Uuid::new_v4());
		self.entries
			.borrow_mut()
			.insert(url.clone(), image.data.clone());
		url
	}

	fn revoke(&self, url: &str) {
		self.entries.borrow_mut().remove(url);
	}
}
