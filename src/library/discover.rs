//! Audio file discovery: list a directory and keep what sniffs as audio.
//!
//! Classification looks only at the first bytes of each file, so an audio
//! file with a misleading extension is still found and `notes.mp3` full of
//! text is not.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

/// Number of header bytes read from each candidate.
pub const HEADER_LEN: u64 = 261;

/// Discovery errors.
#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("cannot list directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read header of {path}: {source}")]
    ReadHeader {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is empty")]
    Empty { path: PathBuf },
}

/// Audio container formats recognised from their leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Flac,
    Ogg,
    Wav,
    Aiff,
    M4a,
    Aac,
    Amr,
    Midi,
    Ape,
    Dsf,
}

impl AudioFormat {
    /// Detect the format from the first bytes of a file.
    ///
    /// | Format | Signature                                   |
    /// |--------|---------------------------------------------|
    /// | MP3    | `ID3`, or MPEG sync `FF Fx` (layer bits set) |
    /// | FLAC   | `fLaC`                                      |
    /// | OGG    | `OggS`                                      |
    /// | WAV    | `RIFF` .... `WAVE`                          |
    /// | AIFF   | `FORM` .... `AIFF`                          |
    /// | M4A    | .... `ftypM4A`                              |
    /// | AAC    | ADTS sync `FF F1` / `FF F9`                 |
    /// | AMR    | `#!AMR`                                     |
    /// | MIDI   | `MThd`                                      |
    /// | APE    | `MAC `                                      |
    /// | DSF    | `DSD `                                      |
    pub fn detect(header: &[u8]) -> Option<Self> {
        if header.starts_with(b"ID3") {
            return Some(Self::Mp3);
        }
        if header.starts_with(b"fLaC") {
            return Some(Self::Flac);
        }
        if header.starts_with(b"OggS") {
            return Some(Self::Ogg);
        }
        if header.starts_with(b"RIFF") && header.get(8..12) == Some(b"WAVE".as_slice()) {
            return Some(Self::Wav);
        }
        if header.starts_with(b"FORM") && header.get(8..12) == Some(b"AIFF".as_slice()) {
            return Some(Self::Aiff);
        }
        if header.get(4..11) == Some(b"ftypM4A".as_slice()) {
            return Some(Self::M4a);
        }
        if header.starts_with(b"#!AMR") {
            return Some(Self::Amr);
        }
        if header.starts_with(b"MThd") {
            return Some(Self::Midi);
        }
        if header.starts_with(b"MAC ") {
            return Some(Self::Ape);
        }
        if header.starts_with(b"DSD ") {
            return Some(Self::Dsf);
        }

        match header {
            // ADTS: layer bits are always zero.
            [0xFF, 0xF1, ..] | [0xFF, 0xF9, ..] => Some(Self::Aac),
            // MPEG audio frame sync with a non-reserved layer.
            [0xFF, b, ..] if b & 0xE0 == 0xE0 && b & 0x06 != 0 => Some(Self::Mp3),
            _ => None,
        }
    }
}

/// Decides whether a file holds audio.
pub trait AudioClassifier {
    fn is_audio(&self, path: &Path) -> Result<bool, DiscoverError>;
}

/// Classifies files by their byte signature.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignatureClassifier;

impl AudioClassifier for SignatureClassifier {
    fn is_audio(&self, path: &Path) -> Result<bool, DiscoverError> {
        let read_header = || -> std::io::Result<Vec<u8>> {
            let mut header = Vec::with_capacity(HEADER_LEN as usize);
            File::open(path)?.take(HEADER_LEN).read_to_end(&mut header)?;
            Ok(header)
        };
        let header = read_header().map_err(|source| DiscoverError::ReadHeader {
            path: path.to_path_buf(),
            source,
        })?;

        if header.is_empty() {
            return Err(DiscoverError::Empty {
                path: path.to_path_buf(),
            });
        }

        Ok(AudioFormat::detect(&header).is_some())
    }
}

/// List the audio files directly inside `dir`, sorted by file name.
///
/// Only failing to list `dir` itself is an error. A file that cannot be
/// classified is logged and left out.
pub fn scan_files(
    dir: &Path,
    classifier: &impl AudioClassifier,
) -> Result<Vec<PathBuf>, DiscoverError> {
    let entries = fs::read_dir(dir).map_err(|source| DiscoverError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| DiscoverError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        match classifier.is_audio(&path) {
            Ok(true) => {
                debug!("Found audio file: {}", path.display());
                files.push(path);
            }
            Ok(false) => {}
            Err(e) => warn!("Skipping file: {}", e),
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
