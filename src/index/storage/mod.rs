
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::VectorIndex;
use crate::{DocQaError, Result};

pub const INDEX_FILE_NAME: &str = "index.bin";
pub const TEXTS_FILE_NAME: &str = "texts.json";
const INDEX_TMP_FILE_NAME: &str = "index.bin.tmp";
const TEXTS_TMP_FILE_NAME: &str = "texts.json.tmp";

const MAGIC: u32 = 0x5849_5144; // "DQIX" little-endian
const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = 4 + 2 + 4 + 4;

#[inline]
pub fn index_path(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILE_NAME)
}

#[inline]
pub fn texts_path(dir: &Path) -> PathBuf {
    dir.join(TEXTS_FILE_NAME)
}

/// Whether both persisted artifacts are present in `dir`
#[inline]
pub fn artifacts_exist(dir: &Path) -> bool {
    index_path(dir).is_file() && texts_path(dir).is_file()
}

/// Persist `index` and its chunk texts side by side in `dir`, creating it if needed.
///
/// Both artifacts are first written to temporary files. A failed write
/// leaves any previously saved pair untouched. The old `index.bin` is removed
/// before the renames, so an interrupted commit leaves the pair incomplete
/// and [`load`] reports it as corrupt instead of mixing two generations.
#[inline]
pub fn save(index: &VectorIndex, chunk_texts: &[String], dir: &Path) -> Result<()> {
    if index.len() != chunk_texts.len() {
        return Err(DocQaError::CorruptIndex(format!(
            "refusing to save {} vectors with {} chunk texts",
            index.len(),
            chunk_texts.len()
        )));
    }

    let index_bytes = encode_index(index)?;
    let texts_json = serde_json::to_vec(chunk_texts)
        .map_err(|e| DocQaError::Other(anyhow::anyhow!("Failed to serialize chunk texts: {}", e)))?;

    fs::create_dir_all(dir)?;

    let index_tmp = dir.join(INDEX_TMP_FILE_NAME);
    let texts_tmp = dir.join(TEXTS_TMP_FILE_NAME);
    if let Err(e) = fs::write(&index_tmp, index_bytes).and_then(|()| fs::write(&texts_tmp, texts_json)) {
        discard(&index_tmp);
        discard(&texts_tmp);
        return Err(e.into());
    }

    match fs::remove_file(index_path(dir)) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            discard(&index_tmp);
            discard(&texts_tmp);
            return Err(e.into());
        }
    }
    fs::rename(&texts_tmp, texts_path(dir))?;
    fs::rename(&index_tmp, index_path(dir))?;

    info!(
        "Saved index with {} vectors (dimension {}) to {}",
        index.len(),
        index.dimension(),
        dir.display()
    );
    Ok(())
}

fn discard(path: &Path) {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            warn!("Could not remove temporary file {}: {}", path.display(), e);
        }
        _ => {}
    }
}

/// Load the index and chunk texts written by [`save`].
///
/// # Errors
///
/// Returns [`DocQaError::CorruptIndex`] if either artifact is missing,
/// malformed, or the two disagree on the number of entries.
#[inline]
pub fn load(dir: &Path) -> Result<(VectorIndex, Vec<String>)> {
    let index_file = index_path(dir);
    let texts_file = texts_path(dir);

    let index_bytes = read_artifact(&index_file)?;
    let texts_bytes = read_artifact(&texts_file)?;

    let index = decode_index(&index_bytes)?;
    let chunk_texts: Vec<String> = serde_json::from_slice(&texts_bytes).map_err(|e| {
        DocQaError::CorruptIndex(format!("{} is not a JSON string list: {}", texts_file.display(), e))
    })?;

    if index.len() != chunk_texts.len() {
        return Err(DocQaError::CorruptIndex(format!(
            "{} holds {} vectors but {} holds {} chunk texts",
            index_file.display(),
            index.len(),
            texts_file.display(),
            chunk_texts.len()
        )));
    }

    debug!(
        "Loaded index with {} vectors (dimension {}) from {}",
        index.len(),
        index.dimension(),
        dir.display()
    );
    Ok((index, chunk_texts))
}

fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            DocQaError::CorruptIndex(format!("missing artifact {}", path.display()))
        } else {
            DocQaError::Io(e)
        }
    })
}

/// Layout: magic u32, version u16, dimension u32, count u32, then `count * dimension` f32, all little-endian
fn encode_index(index: &VectorIndex) -> Result<Vec<u8>> {
    let dimension = u32::try_from(index.dimension())
        .map_err(|_| DocQaError::Configuration("vector dimension exceeds u32".to_string()))?;
    let count = u32::try_from(index.len())
        .map_err(|_| DocQaError::Configuration("vector count exceeds u32".to_string()))?;

    let values = index.raw_values();
    let mut buffer = Vec::with_capacity(HEADER_LEN + values.len() * 4);
    buffer.extend_from_slice(&MAGIC.to_le_bytes());
    buffer.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buffer.extend_from_slice(&dimension.to_le_bytes());
    buffer.extend_from_slice(&count.to_le_bytes());
    for value in values {
        buffer.extend_from_slice(&value.to_le_bytes());
    }
    Ok(buffer)
}

fn decode_index(bytes: &[u8]) -> Result<VectorIndex> {
    let (header, body) = bytes
        .split_at_checked(HEADER_LEN)
        .ok_or_else(|| DocQaError::CorruptIndex("index file is shorter than its header".to_string()))?;

    let mut fields = Cursor { bytes: header };
    if fields.u32() != Some(MAGIC) {
        return Err(DocQaError::CorruptIndex("index file has an invalid magic number".to_string()));
    }

    let version = fields.u16();
    if version != Some(FORMAT_VERSION) {
        return Err(DocQaError::CorruptIndex(format!(
            "unsupported index format version {:?}",
            version
        )));
    }

    let (Some(dimension), Some(count)) = (fields.u32(), fields.u32()) else {
        return Err(DocQaError::CorruptIndex("truncated index header".to_string()));
    };
    let dimension = dimension as usize;
    let count = count as usize;

    let expected_len = dimension
        .checked_mul(count)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| DocQaError::CorruptIndex("index header sizes overflow".to_string()))?;
    if body.len() != expected_len {
        return Err(DocQaError::CorruptIndex(format!(
            "expected {} bytes of vector data for {} x {}, found {}",
            expected_len,
            count,
            dimension,
            body.len()
        )));
    }

    let data = body
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    VectorIndex::from_raw(dimension, data)
}

struct Cursor<'a> {
    bytes: &'a [u8],
}

impl Cursor<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let (head, rest) = self.bytes.split_first_chunk::<N>()?;
        self.bytes = rest;
        Some(*head)
    }

    fn u16(&mut self) -> Option<u16> {
        self.take::<2>().map(u16::from_le_bytes)
    }

    fn u32(&mut self) -> Option<u32> {
        self.take::<4>().map(u32::from_le_bytes)
    }
}
