//! Link domain model.
//!
//! # Responsibility
//! - Define the bookmark card record and the user-submitted draft.
//! - Enforce the local validation rule (url and title are required).
//!
//! # Invariants
//! - A `Link` only changes after creation through its `note`.
//! - A valid draft has non-blank `url` and `title` after trimming.

use super::id::EntityId;
use super::wire::{blank_as_none, null_as_empty};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One published bookmark card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: EntityId,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Data URI or URL produced by the image capture utility.
    #[serde(default, with = "blank_as_none")]
    pub image: Option<String>,
    #[serde(default, with = "blank_as_none")]
    pub favicon: Option<String>,
    #[serde(default, with = "blank_as_none")]
    pub note: Option<String>,
}

impl Link {
    /// Materializes a validated draft under a backend-assigned id.
    pub fn from_draft(id: EntityId, draft: LinkDraft) -> Self {
        Self {
            id,
            url: draft.url,
            title: draft.title,
            description: draft.description,
            image: draft.image,
            favicon: draft.favicon,
            note: draft.note,
        }
    }
}

/// Link fields as submitted by the user, before a backend assigns an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDraft {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "blank_as_none")]
    pub image: Option<String>,
    #[serde(default, with = "blank_as_none")]
    pub favicon: Option<String>,
    #[serde(default, with = "blank_as_none")]
    pub note: Option<String>,
}

impl LinkDraft {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Returns a trimmed copy of this draft, or the first missing field.
    ///
    /// Blank optional fields collapse to `None`.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ValidationError::MissingUrl);
        }
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }

        Ok(Self {
            url: url.to_string(),
            title: title.to_string(),
            description: self.description.trim().to_string(),
            image: trimmed_option(self.image.as_deref()),
            favicon: trimmed_option(self.favicon.as_deref()),
            note: trimmed_option(self.note.as_deref()),
        })
    }
}

fn trimmed_option(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Local validation failures. These never reach a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    MissingUrl,
    MissingTitle,
    EmptyNotice,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingUrl | Self::MissingTitle => write!(f, "URL and title are required"),
            Self::EmptyNotice => write!(f, "notice text is empty"),
        }
    }
}

impl Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::{LinkDraft, ValidationError};

    #[test]
    fn normalized_trims_fields_and_drops_blank_options() {
        let draft = LinkDraft::new("  https://a.test ", " A ")
            .with_description("  desc ")
            .with_image("   ")
            .with_note(" 5/1 launch ");

        let normalized = draft.normalized().expect("draft should be valid");
        assert_eq!(normalized.url, "https://a.test");
        assert_eq!(normalized.title, "A");
        assert_eq!(normalized.description, "desc");
        assert_eq!(normalized.image, None);
        assert_eq!(normalized.note.as_deref(), Some("5/1 launch"));
    }

    #[test]
    fn normalized_requires_url_then_title() {
        assert_eq!(
            LinkDraft::new(" ", "A").normalized(),
            Err(ValidationError::MissingUrl)
        );
        assert_eq!(
            LinkDraft::new("https://a.test", "").normalized(),
            Err(ValidationError::MissingTitle)
        );
    }
}
