//! Tag reading via symphonia.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, MetadataRevision, StandardTagKey};
use symphonia::core::probe::Hint;
use thiserror::Error;

/// Metadata fields the table knows how to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKey {
    Title,
    Artist,
    AlbumArtist,
    Album,
    DiscNumber,
    TrackNumber,
    Genre,
    Date,
    Composer,
    Comment,
}

impl TagKey {
    /// Map a symphonia standard key onto one of ours.
    pub fn from_standard(key: StandardTagKey) -> Option<Self> {
        match key {
            StandardTagKey::TrackTitle => Some(Self::Title),
            StandardTagKey::Artist => Some(Self::Artist),
            StandardTagKey::AlbumArtist => Some(Self::AlbumArtist),
            StandardTagKey::Album => Some(Self::Album),
            StandardTagKey::DiscNumber => Some(Self::DiscNumber),
            StandardTagKey::TrackNumber => Some(Self::TrackNumber),
            StandardTagKey::Genre => Some(Self::Genre),
            StandardTagKey::Date => Some(Self::Date),
            StandardTagKey::Composer => Some(Self::Composer),
            StandardTagKey::Comment => Some(Self::Comment),
            _ => None,
        }
    }
}

/// All values found for each tag of a single file, in file order.
pub type TagMap = HashMap<TagKey, Vec<String>>;

/// Tag reading errors.
#[derive(Debug, Error)]
pub enum TagError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported or corrupt audio file {path}: {source}")]
    Probe {
        path: PathBuf,
        #[source]
        source: symphonia::core::errors::Error,
    },
}

/// Something that can look up the tags of a file.
pub trait TagReader: Send + Sync {
    fn read_tags(&self, path: &Path) -> Result<TagMap, TagError>;
}

/// Reads tags by probing the file with symphonia.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaTagReader;

impl TagReader for SymphoniaTagReader {
    fn read_tags(&self, path: &Path) -> Result<TagMap, TagError> {
        let file = File::open(path).map_err(|source| TagError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(OsStr::to_str) {
            hint.with_extension(ext);
        }

        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let mut probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|source| TagError::Probe {
                path: path.to_path_buf(),
                source,
            })?;

        // Container metadata wins; a leading ID3 block only counts when the
        // container itself carries nothing.
        if let Some(rev) = probed.format.metadata().current() {
            return Ok(collect_tags(rev));
        }
        if let Some(metadata) = probed.metadata.get() {
            if let Some(rev) = metadata.current() {
                return Ok(collect_tags(rev));
            }
        }

        Ok(TagMap::new())
    }
}

fn collect_tags(rev: &MetadataRevision) -> TagMap {
    let mut tags = TagMap::new();
    for tag in rev.tags() {
        if let Some(key) = tag.std_key.and_then(TagKey::from_standard) {
            // RIFF INFO strings keep their NUL terminator
            let value = tag.value.to_string();
            tags.entry(key)
                .or_default()
                .push(value.trim_end_matches('\0').to_string());
        }
    }
    tags
}

/// The value of `key` if, and only if, the file carries exactly one.
pub fn single_value(tags: &TagMap, key: TagKey) -> Option<&str> {
    match tags.get(&key).map(Vec::as_slice) {
        Some([value]) => Some(value.as_str()),
        _ => None,
    }
}
