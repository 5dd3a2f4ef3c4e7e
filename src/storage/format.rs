//! Journal file format
//!
//! One file holds one user's whole journal and is rewritten in full on save.
//!
//! Layout:
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ HEADER (32 bytes)                       │
//! │   magic: [u8; 4] = "DBHT"               │
//! │   version: u16                          │
//! │   compression: u8                       │
//! │   reserved: [u8; 13]                    │
//! │   payload_len: u32                      │
//! │   payload_crc: u32                      │
//! │   header_crc: u32                       │
//! ├─────────────────────────────────────────┤
//! │ PAYLOAD (payload_len bytes)             │
//! │   bincode(JournalFile), LZ4 compressed  │
//! │   with prepended size when enabled      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Days are stored in head-to-tail order; links are rebuilt on load.
//!
//! Version 1 files store days as morning/evening/night. They are upgraded to
//! the current morning/afternoon/evening layout once, while decoding, and are
//! written back as the current version on the next save.

use crate::journal::{ChronologicalStore, Day, Journal, LegacyDay};
use crate::storage::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};

/// Magic bytes for journal file identification
const FILE_MAGIC: [u8; 4] = *b"DBHT";

/// Current journal format version
pub const FORMAT_VERSION: u16 = 2;

/// Format version with the morning/evening/night day layout
pub const LEGACY_FORMAT_VERSION: u16 = 1;

/// Header size in bytes
pub const HEADER_SIZE: usize = 32;

/// Compression type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CompressionType {
    None = 0,
    Lz4 = 1,
}

impl TryFrom<u8> for CompressionType {
    type Error = StorageError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CompressionType::None),
            1 => Ok(CompressionType::Lz4),
            _ => Err(StorageError::InvalidFormat(format!(
                "Unknown compression type: {}",
                value
            ))),
        }
    }
}

/// Journal file header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Format version
    pub version: u16,
    /// Compression applied to the payload
    pub compression: CompressionType,
    /// Stored payload length in bytes
    pub payload_len: u32,
    /// CRC32 of the stored payload
    pub payload_crc: u32,
}

impl FileHeader {
    /// Serialize header to bytes
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];

        buf[0..4].copy_from_slice(&FILE_MAGIC);
        buf[4..6].copy_from_slice(&self.version.to_le_bytes());
        buf[6] = self.compression as u8;
        // bytes 7-19 reserved
        buf[20..24].copy_from_slice(&self.payload_len.to_le_bytes());
        buf[24..28].copy_from_slice(&self.payload_crc.to_le_bytes());

        let checksum = crc32fast::hash(&buf[0..28]);
        buf[28..32].copy_from_slice(&checksum.to_le_bytes());

        buf
    }

    /// Parse header from bytes
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> StorageResult<Self> {
        if buf[0..4] != FILE_MAGIC {
            return Err(StorageError::InvalidFormat(format!(
                "Invalid magic: {:?}",
                &buf[0..4]
            )));
        }

        let stored_checksum = u32::from_le_bytes([buf[28], buf[29], buf[30], buf[31]]);
        let computed_checksum = crc32fast::hash(&buf[0..28]);
        if stored_checksum != computed_checksum {
            return Err(StorageError::Corruption(format!(
                "Header checksum mismatch: stored={}, computed={}",
                stored_checksum, computed_checksum
            )));
        }

        let version = u16::from_le_bytes([buf[4], buf[5]]);
        if version == 0 || version > FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion(version));
        }

        Ok(Self {
            version,
            compression: CompressionType::try_from(buf[6])?,
            payload_len: u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]),
            payload_crc: u32::from_le_bytes([buf[24], buf[25], buf[26], buf[27]]),
        })
    }
}

/// Current payload layout
#[derive(Debug, Serialize, Deserialize)]
struct JournalFile {
    name: String,
    days: Vec<Day>,
}

/// Version 1 payload layout
#[derive(Debug, Serialize, Deserialize)]
struct LegacyJournalFile {
    name: String,
    days: Vec<LegacyDay>,
}

/// A decoded journal and the format version it was stored in
#[derive(Debug)]
pub struct DecodedJournal {
    pub journal: Journal,
    pub source_version: u16,
}

impl DecodedJournal {
    /// True if the file went through the legacy upgrade
    pub fn was_migrated(&self) -> bool {
        self.source_version < FORMAT_VERSION
    }
}

/// Encode a journal in the current format
pub fn encode_journal(journal: &Journal, compression: CompressionType) -> StorageResult<Vec<u8>> {
    let file = JournalFile {
        name: journal.name().to_string(),
        days: journal.store().iter().cloned().collect(),
    };
    let payload = bincode::serialize(&file)?;
    Ok(frame(FORMAT_VERSION, &payload, compression))
}

/// Decode a journal file, upgrading legacy layouts
pub fn decode_journal(bytes: &[u8]) -> StorageResult<DecodedJournal> {
    if bytes.len() < HEADER_SIZE {
        return Err(StorageError::Corruption(format!(
            "File too short for header: {} bytes",
            bytes.len()
        )));
    }

    let mut header_buf = [0u8; HEADER_SIZE];
    header_buf.copy_from_slice(&bytes[..HEADER_SIZE]);
    let header = FileHeader::from_bytes(&header_buf)?;

    let stored = &bytes[HEADER_SIZE..];
    if stored.len() != header.payload_len as usize {
        return Err(StorageError::Corruption(format!(
            "Payload length mismatch: header={}, actual={}",
            header.payload_len,
            stored.len()
        )));
    }

    let computed_crc = crc32fast::hash(stored);
    if computed_crc != header.payload_crc {
        return Err(StorageError::Corruption(format!(
            "Payload checksum mismatch: stored={}, computed={}",
            header.payload_crc, computed_crc
        )));
    }

    let payload = match header.compression {
        CompressionType::None => stored.to_vec(),
        CompressionType::Lz4 => lz4_flex::decompress_size_prepended(stored)
            .map_err(|e| StorageError::Compression(format!("LZ4 decompression failed: {}", e)))?,
    };

    let file = match header.version {
        LEGACY_FORMAT_VERSION => {
            let legacy: LegacyJournalFile = bincode::deserialize(&payload)?;
            tracing::info!(
                name = %legacy.name,
                days = legacy.days.len(),
                "Upgrading legacy journal layout"
            );
            JournalFile {
                name: legacy.name,
                days: legacy.days.into_iter().map(Day::from).collect(),
            }
        }
        _ => bincode::deserialize(&payload)?,
    };

    let day_count = file.days.len();
    let store: ChronologicalStore = file.days.into_iter().collect();
    if store.len() != day_count {
        tracing::warn!(
            stored = day_count,
            kept = store.len(),
            "Journal file contained repeated dates; kept the first of each"
        );
    }

    Ok(DecodedJournal {
        journal: Journal::with_store(file.name, store),
        source_version: header.version,
    })
}

/// Wrap a serialized payload with its header
fn frame(version: u16, payload: &[u8], compression: CompressionType) -> Vec<u8> {
    let stored = match compression {
        CompressionType::None => payload.to_vec(),
        CompressionType::Lz4 => lz4_flex::compress_prepend_size(payload),
    };

    let header = FileHeader {
        version,
        compression,
        payload_len: stored.len() as u32,
        payload_crc: crc32fast::hash(&stored),
    };

    let mut bytes = Vec::with_capacity(HEADER_SIZE + stored.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&stored);
    bytes
}
