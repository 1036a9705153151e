//! Media references produced by plugins.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What a media item renders as.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image
    Image,
    /// Video with audio
    Video,
    /// Looping animation (gif-like)
    Animation,
}

impl MediaKind {
    /// File extension used when the plugin did not declare one.
    pub fn default_ext(self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
            MediaKind::Animation => "gif",
        }
    }
}

/// Where a media item lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaLocation {
    /// Remote URL still to be downloaded
    Remote(String),
    /// File on local disk
    Local(PathBuf),
}

/// One timed subtitle line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// Start offset in seconds
    pub begin: f64,
    /// End offset in seconds
    pub end: f64,
    /// Spoken text
    pub text: String,
}

/// Subtitle track attached to a video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subtitles {
    /// Cues in playback order
    pub cues: Vec<SubtitleCue>,
}

impl Subtitles {
    /// Flatten the track to one `begin - end: text` line per cue.
    ///
    /// ```
    /// use siphon_core::{SubtitleCue, Subtitles};
    ///
    /// let subs = Subtitles {
    ///     cues: vec![SubtitleCue { begin: 0.0, end: 1.5, text: "hi".into() }],
    /// };
    /// assert_eq!(subs.to_text(), "0 - 1.5: hi");
    /// ```
    pub fn to_text(&self) -> String {
        self.cues
            .iter()
            .map(|cue| format!("{} - {}: {}", cue.begin, cue.end, cue.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A remote locator or local file, plus display metadata.
///
/// Immutable once built. A downloaded copy is a new `MediaRef` pointing at
/// the local file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct MediaRef {
    #[setters(skip)]
    kind: MediaKind,
    #[setters(skip)]
    location: MediaLocation,
    ext: Option<String>,
    thumbnail: Option<String>,
    duration: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
    subtitles: Option<Subtitles>,
}

impl MediaRef {
    /// Remote media of the given kind.
    pub fn remote(kind: MediaKind, url: impl Into<String>) -> Self {
        Self::at(kind, MediaLocation::Remote(url.into()))
    }

    /// Media already on local disk.
    pub fn local(kind: MediaKind, path: impl Into<PathBuf>) -> Self {
        Self::at(kind, MediaLocation::Local(path.into()))
    }

    fn at(kind: MediaKind, location: MediaLocation) -> Self {
        Self {
            kind,
            location,
            ext: None,
            thumbnail: None,
            duration: None,
            width: None,
            height: None,
            subtitles: None,
        }
    }

    /// Declared extension, or the default for the kind.
    pub fn extension(&self) -> &str {
        self.ext.as_deref().unwrap_or(self.kind.default_ext())
    }

    /// True when the item still has to be fetched.
    pub fn is_remote(&self) -> bool {
        matches!(self.location, MediaLocation::Remote(_))
    }

    /// Local path, if the item lives on disk.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            MediaLocation::Local(path) => Some(path),
            MediaLocation::Remote(_) => None,
        }
    }

    /// Remote URL, if the item still lives remotely.
    pub fn url(&self) -> Option<&str> {
        match &self.location {
            MediaLocation::Remote(url) => Some(url),
            MediaLocation::Local(_) => None,
        }
    }

    /// True when the item is local and its file is present.
    pub fn exists(&self) -> bool {
        self.path().is_some_and(Path::exists)
    }

    /// Same metadata, new location.
    pub fn relocated(&self, path: impl Into<PathBuf>) -> Self {
        Self {
            location: MediaLocation::Local(path.into()),
            ..self.clone()
        }
    }
}

/// One or many media items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MediaSet {
    /// Exactly one item
    Single(MediaRef),
    /// Zero or more items
    Many(Vec<MediaRef>),
}

impl MediaSet {
    /// Items as a slice regardless of arity.
    pub fn items(&self) -> &[MediaRef] {
        match self {
            MediaSet::Single(media) => std::slice::from_ref(media),
            MediaSet::Many(items) => items,
        }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// True when there is nothing to deliver.
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}
