use std::time::Duration;

use anyhow::Context as _;

use crate::assets::locator::MotifLocator;
use crate::foundation::error::{SplashError, SplashResult};

/// Cross-origin mode of a fetch, mirroring the `crossorigin` image attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrossOrigin {
    /// No CORS request. Foreign responses load but are not readable.
    None,
    /// CORS request without credentials. Foreign responses must grant access or the fetch fails.
    Anonymous,
}

/// One fetch attempt.
#[derive(Clone, Debug)]
pub struct FetchRequest {
    /// Source to read.
    pub locator: MotifLocator,
    /// Requested cross-origin mode.
    pub cross_origin: CrossOrigin,
    /// Transport-level timeout hint. The resolver enforces its own bound on top.
    pub timeout: Duration,
}

/// Raw bytes returned by a fetcher.
#[derive(Clone, Debug)]
pub struct Fetched {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// `false` when the bytes are from a foreign origin without read permission.
    pub origin_clean: bool,
}

/// Byte source for motif images.
///
/// Implementations may block; the resolver runs every fetch on a worker thread.
pub trait ImageFetcher: Send + Sync {
    /// Fetch the bytes for `req`.
    fn fetch(&self, req: &FetchRequest) -> SplashResult<Fetched>;
}

/// Default fetcher: HTTP(S) through `reqwest`, filesystem, and inline data.
#[derive(Clone, Debug)]
pub struct StdFetcher {
    origin: String,
}

impl StdFetcher {
    /// Create a fetcher acting on behalf of the page `origin` (e.g. `http://localhost`).
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
        }
    }

    fn fetch_http(&self, url: &url::Url, req: &FetchRequest) -> SplashResult<Fetched> {
        let same_origin = url.origin().ascii_serialization() == self.origin;
        let client = reqwest::blocking::Client::builder()
            .timeout(req.timeout)
            .build()
            .context("build http client")?;

        let mut rb = client.get(url.clone());
        if req.cross_origin == CrossOrigin::Anonymous && !same_origin {
            rb = rb.header(reqwest::header::ORIGIN, self.origin.as_str());
        }
        let response = rb
            .send()
            .map_err(|e| SplashError::image_load(format!("fetch '{url}': {e}")))?;
        if !response.status().is_success() {
            return Err(SplashError::image_load(format!(
                "fetch '{url}': status {}",
                response.status()
            )));
        }

        let acao = response
            .headers()
            .get(reqwest::header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok());
        let origin_clean = cors_outcome(same_origin, acao, &self.origin, req.cross_origin)?;

        let bytes = response
            .bytes()
            .map_err(|e| SplashError::image_load(format!("read body '{url}': {e}")))?;
        Ok(Fetched {
            bytes: bytes.to_vec(),
            origin_clean,
        })
    }
}

impl ImageFetcher for StdFetcher {
    fn fetch(&self, req: &FetchRequest) -> SplashResult<Fetched> {
        match &req.locator {
            MotifLocator::Http(url) => self.fetch_http(url, req),
            MotifLocator::File(path) => {
                let bytes = std::fs::read(path).map_err(|e| {
                    SplashError::image_load(format!("read '{}': {e}", path.display()))
                })?;
                Ok(Fetched {
                    bytes,
                    origin_clean: true,
                })
            }
            MotifLocator::Data { bytes, .. } => Ok(Fetched {
                bytes: bytes.to_vec(),
                origin_clean: true,
            }),
        }
    }
}

/// Whether a response may be read back, given its `Access-Control-Allow-Origin` header.
///
/// Same-origin responses are always readable. A cross-origin response is readable when the header
/// is `*` or equals `origin`; without that grant an anonymous CORS request fails and a no-CORS
/// request loads as not origin-clean.
fn cors_outcome(
    same_origin: bool,
    acao: Option<&str>,
    origin: &str,
    mode: CrossOrigin,
) -> SplashResult<bool> {
    if same_origin {
        return Ok(true);
    }
    let granted = acao.is_some_and(|v| {
        let v = v.trim();
        v == "*" || v == origin
    });
    match mode {
        CrossOrigin::Anonymous if granted => Ok(true),
        CrossOrigin::Anonymous => Err(SplashError::image_load(format!(
            "cross-origin access denied for {origin}"
        ))),
        CrossOrigin::None => Ok(false),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
