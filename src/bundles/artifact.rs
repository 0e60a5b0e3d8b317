//! Bundle artifact format and encoding.
//!
//! ```json
//! {"messages": [...], "metadata": {"generated_at": "...", "number_of_snippets": 1,
//!   "channel": "release", "locale": "en-us", "distribution_bundle": "default"}}
//! ```
//!
//! The whole document is serialized in memory and optionally Brotli-compressed
//! before a single storage write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{Read, Write};

use crate::constants::bundles::{CONTENT_ENCODING_BROTLI, CONTENT_TYPE_JSON};
use crate::error::{Result, SnippetsError};

const BROTLI_BUFFER_SIZE: usize = 4096;
const BROTLI_WINDOW: u32 = 22;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleMetadata {
    pub generated_at: DateTime<Utc>,
    pub number_of_snippets: usize,
    pub channel: String,
    pub locale: String,
    pub distribution_bundle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub messages: Vec<Value>,
    pub metadata: BundleMetadata,
}

impl Bundle {
    pub fn new(
        messages: Vec<Value>,
        channel: &str,
        locale: &str,
        distribution_bundle: &str,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let number_of_snippets = messages.len();
        Self {
            messages,
            metadata: BundleMetadata {
                generated_at,
                number_of_snippets,
                channel: channel.to_string(),
                locale: locale.to_string(),
                distribution_bundle: distribution_bundle.to_string(),
            },
        }
    }

    /// Serialize, then Brotli-compress when `quality` is set
    pub fn encode(&self, quality: Option<u32>) -> Result<EncodedBundle> {
        let json = serde_json::to_vec(self)?;
        match quality {
            None => Ok(EncodedBundle {
                data: json,
                content_encoding: None,
            }),
            Some(quality) => Ok(EncodedBundle {
                data: brotli_compress(&json, quality)?,
                content_encoding: Some(CONTENT_ENCODING_BROTLI),
            }),
        }
    }
}

/// Serialized bundle ready for storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBundle {
    pub data: Vec<u8>,
    pub content_encoding: Option<&'static str>,
}

impl EncodedBundle {
    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE_JSON
    }

    pub fn decode(&self) -> Result<Bundle> {
        decode_bundle(&self.data, self.content_encoding)
    }
}

/// Decode stored bytes according to their recorded content encoding
pub fn decode_bundle(data: &[u8], content_encoding: Option<&str>) -> Result<Bundle> {
    match content_encoding {
        None => Ok(serde_json::from_slice(data)?),
        Some(CONTENT_ENCODING_BROTLI) => {
            let json = brotli_decompress(data)?;
            Ok(serde_json::from_slice(&json)?)
        }
        Some(other) => Err(SnippetsError::Compression(format!(
            "unsupported content encoding '{other}'"
        ))),
    }
}

fn brotli_compress(data: &[u8], quality: u32) -> Result<Vec<u8>> {
    let mut writer = brotli::CompressorWriter::new(
        Vec::with_capacity(data.len() / 4),
        BROTLI_BUFFER_SIZE,
        quality.min(11),
        BROTLI_WINDOW,
    );
    writer
        .write_all(data)
        .map_err(|err| SnippetsError::Compression(err.to_string()))?;
    writer
        .flush()
        .map_err(|err| SnippetsError::Compression(err.to_string()))?;
    Ok(writer.into_inner())
}

fn brotli_decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    brotli::Decompressor::new(data, BROTLI_BUFFER_SIZE)
        .read_to_end(&mut out)
        .map_err(|err| SnippetsError::Compression(err.to_string()))?;
    Ok(out)
}
