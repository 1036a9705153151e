//! Parsed content as returned by a plugin.

use crate::{MediaRef, MediaSet};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Which delivery strategy applies to a parse result.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
pub enum ContentShape {
    /// A single video
    Video,
    /// A set of still images
    Image,
    /// A mix of images, videos and animations
    Multimedia,
}

/// Extracted content: text, source link and media tagged with its shape.
///
/// Construct through [`ParseResult::video`], [`ParseResult::images`] or
/// [`ParseResult::multimedia`] so the shape always agrees with the media.
///
/// # Examples
///
/// ```
/// use siphon_core::{ContentShape, MediaKind, MediaRef, ParseResult};
///
/// let result = ParseResult::images(
///     "A day out",
///     vec![MediaRef::remote(MediaKind::Image, "https://cdn.ex.com/1.jpg")],
/// )
/// .with_description("Pictures from the park")
/// .with_source_url("https://ex.com/p/1");
///
/// assert_eq!(*result.shape(), ContentShape::Image);
/// assert_eq!(result.media().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct ParseResult {
    title: String,
    description: String,
    source_url: Option<String>,
    #[setters(skip)]
    shape: ContentShape,
    #[setters(skip)]
    media: MediaSet,
    /// Pre-rendered HTML body for long-form posts.
    article: Option<String>,
}

impl ParseResult {
    fn build(title: impl Into<String>, shape: ContentShape, media: MediaSet) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            source_url: None,
            shape,
            media,
            article: None,
        }
    }

    /// A single-video result.
    pub fn video(title: impl Into<String>, media: MediaRef) -> Self {
        Self::build(title, ContentShape::Video, MediaSet::Single(media))
    }

    /// An image-set result (possibly empty).
    pub fn images(title: impl Into<String>, media: Vec<MediaRef>) -> Self {
        Self::build(title, ContentShape::Image, MediaSet::Many(media))
    }

    /// A mixed-media result (possibly empty).
    pub fn multimedia(title: impl Into<String>, media: Vec<MediaRef>) -> Self {
        Self::build(title, ContentShape::Multimedia, MediaSet::Many(media))
    }
}
