use crate::validation::{normalise_tag, MAX_TAGS, MAX_TAG_CHARS};

/// Keys the tag input reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKey {
	Enter,
	Comma,
	Backspace,
	Other,
}

/// Committed tags plus the text still being typed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagEditor {
	tags: Vec<String>,
	input: String,
}

impl TagEditor {
	pub fn tags(&self) -> &[String] {
		&self.tags
	}

	pub fn input(&self) -> &str {
		&self.input
	}

	/// The input is swapped for a "maximum reached" notice once full
	pub fn is_full(&self) -> bool {
		self.tags.len() >= MAX_TAGS
	}

	pub fn set_input(&mut self, text: &str) {
		if self.is_full() {
			return;
		}
		self.input = text.chars().take(MAX_TAG_CHARS).collect();
	}

	/// Returns true if the key was consumed
	pub fn key(&mut self, key: TagKey) -> bool {
		match key {
			TagKey::Enter | TagKey::Comma if !self.input.trim().is_empty() && !self.is_full() => {
				self.commit();
				true
			}
			TagKey::Backspace if self.input.is_empty() && !self.tags.is_empty() => {
				self.tags.pop();
				true
			}
			_ => false,
		}
	}

	fn commit(&mut self) {
		let tag = normalise_tag(&self.input);
		if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
			return;
		}
		self.tags.push(tag.to_owned());
		self.input.clear();
	}

	pub fn remove(&mut self, index: usize) -> Option<String> {
		if index < self.tags.len() {
			Some(self.tags.remove(index))
		} else {
			None
		}
	}

	pub fn clear_tags(&mut self) {
		self.tags.clear();
	}

	pub fn reset(&mut self) {
		self.tags.clear();
		self.input.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn type_tag(editor: &mut TagEditor, text: &str) -> bool {
		editor.set_input(text);
		editor.key(TagKey::Enter)
	}

	#[test]
	fn enter_and_comma_commit() {
		let mut editor = TagEditor::default();
		type_tag(&mut editor, "  rust ");
		editor.set_input("web,");
		assert!(editor.key(TagKey::Comma));
		assert_eq!(editor.tags(), ["rust", "web"]);
		assert_eq!(editor.input(), "");
	}

	#[test]
	fn whitespace_input_is_ignored() {
		let mut editor = TagEditor::default();
		editor.set_input("   ");
		assert!(!editor.key(TagKey::Enter));
		editor.set_input(",,");
		editor.key(TagKey::Enter);
		assert!(editor.tags().is_empty());
	}

	#[test]
	fn duplicates_are_case_sensitive_noops() {
		let mut editor = TagEditor::default();
		type_tag(&mut editor, "Rust");
		type_tag(&mut editor, "Rust");
		// The duplicate stays in the input for the user to fix
		assert_eq!(editor.input(), "Rust");
		type_tag(&mut editor, "rust");
		assert_eq!(editor.tags(), ["Rust", "rust"]);
	}

	#[test]
	fn eleventh_tag_is_a_noop() {
		let mut editor = TagEditor::default();
		for i in 0..MAX_TAGS {
			type_tag(&mut editor, &format!("t{}", i));
		}
		assert!(editor.is_full());
		editor.set_input("extra");
		assert_eq!(editor.input(), "");
		assert!(!editor.key(TagKey::Enter));
		assert_eq!(editor.tags().len(), MAX_TAGS);
	}

	#[test]
	fn input_is_capped() {
		let mut editor = TagEditor::default();
		editor.set_input(&"x".repeat(MAX_TAG_CHARS + 5));
		assert_eq!(editor.input().chars().count(), MAX_TAG_CHARS);
	}

	#[test]
	fn backspace_on_empty_input_pops_last() {
		let mut editor = TagEditor::default();
		type_tag(&mut editor, "a");
		type_tag(&mut editor, "b");
		type_tag(&mut editor, "c");
		assert!(editor.key(TagKey::Backspace));
		assert_eq!(editor.tags(), ["a", "b"]);

		editor.set_input("x");
		assert!(!editor.key(TagKey::Backspace));
		assert_eq!(editor.tags(), ["a", "b"]);
	}

	#[test]
	fn backspace_without_tags_does_nothing() {
		let mut editor = TagEditor::default();
		assert!(!editor.key(TagKey::Backspace));
	}

	#[test]
	fn remove_by_index_keeps_order() {
		let mut editor = TagEditor::default();
		for t in ["a", "b", "c", "d"] {
			type_tag(&mut editor, t);
		}
		assert_eq!(editor.remove(1).as_deref(), Some("b"));
		assert_eq!(editor.tags(), ["a", "c", "d"]);
		assert_eq!(editor.remove(9), None);
		assert_eq!(editor.tags(), ["a", "c", "d"]);
	}

	#[test]
	fn removing_from_full_reenables_input() {
		let mut editor = TagEditor::default();
		for i in 0..MAX_TAGS {
			type_tag(&mut editor, &i.to_string());
		}
		editor.remove(0);
		assert!(type_tag(&mut editor, "new"));
		assert_eq!(editor.tags().last().map(String::as_str), Some("new"));
	}
}
