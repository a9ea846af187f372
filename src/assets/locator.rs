use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use url::Url;

use crate::foundation::error::{SplashError, SplashResult};

const BUNDLED_MOTIF_PNG: &[u8] = include_bytes!("../../assets/motif-fallback.png");

/// Where a motif image comes from.
///
/// Supported forms:
/// - `http://`, `https://`: fetched over the network
/// - `file://` URLs and bare paths: read from the local filesystem
/// - `data:` URIs: inline payload, base64 or plain
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MotifLocator {
    /// Remote resource.
    Http(Url),
    /// Local file.
    File(PathBuf),
    /// Inline bytes, e.g. an in-memory upload.
    Data {
        /// Declared media type; informational only, decoding sniffs the bytes.
        mime: String,
        /// Encoded image bytes.
        bytes: Arc<[u8]>,
    },
}

impl MotifLocator {
    /// Parse a locator string.
    pub fn parse(s: &str) -> SplashResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SplashError::validation("motif locator must be non-empty"));
        }
        if let Some(rest) = s.strip_prefix("data:") {
            return parse_data_uri(rest);
        }
        if !s.contains("://") {
            return Ok(Self::File(PathBuf::from(s)));
        }

        let url = Url::parse(s)
            .map_err(|e| SplashError::validation(format!("invalid motif URL '{s}': {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(Self::Http(url)),
            "file" => url
                .to_file_path()
                .map(Self::File)
                .map_err(|()| SplashError::validation(format!("invalid file URL '{s}'"))),
            other => Err(SplashError::validation(format!(
                "unsupported motif URL scheme '{other}'"
            ))),
        }
    }

    /// Wrap uploaded bytes. The bytes live exactly as long as the returned locator (and its
    /// clones); dropping them releases the upload.
    pub fn from_upload(bytes: impl Into<Arc<[u8]>>, mime: impl Into<String>) -> Self {
        Self::Data {
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    /// The fallback motif compiled into the crate.
    pub fn bundled() -> Self {
        Self::from_upload(BUNDLED_MOTIF_PNG, "image/png")
    }
}

impl FromStr for MotifLocator {
    type Err = SplashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for MotifLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Data { mime, bytes } => write!(f, "data:{mime} ({} bytes)", bytes.len()),
        }
    }
}

fn parse_data_uri(rest: &str) -> SplashResult<MotifLocator> {
    let Some((header, payload)) = rest.split_once(',') else {
        return Err(SplashError::validation("data URI is missing ','"));
    };
    let (mime, is_base64) = match header.strip_suffix(";base64") {
        Some(m) => (m, true),
        None => (header, false),
    };
    let mime = if mime.is_empty() {
        "application/octet-stream"
    } else {
        mime
    };
    let bytes = if is_base64 {
        BASE64_STANDARD
            .decode(payload.trim())
            .map_err(|e| SplashError::validation(format!("invalid base64 in data URI: {e}")))?
    } else {
        payload.as_bytes().to_vec()
    };
    Ok(MotifLocator::Data {
        mime: mime.to_owned(),
        bytes: bytes.into(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/locator.rs"]
mod tests;
