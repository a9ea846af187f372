use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::assets::decode::{MotifImage, decode_motif};
use crate::assets::fetch::{CrossOrigin, FetchRequest, ImageFetcher};
use crate::assets::locator::MotifLocator;
use crate::foundation::error::{SplashError, SplashResult};
use crate::scene::config::MotifParams;

/// Which fallback source supplied the motif.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// User-supplied locator.
    User,
    /// Fixed remote default.
    Remote,
    /// Bundled local fallback.
    Local,
    /// Nothing loaded; render a placeholder.
    None,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Remote => "remote",
            Self::Local => "local",
            Self::None => "none",
        })
    }
}

/// Outcome of one resolution request. Replaced wholesale, never patched.
#[derive(Clone, Debug)]
pub struct ResolvedMotif {
    /// Decoded image, absent only for [`Tier::None`].
    pub image: Option<Arc<MotifImage>>,
    /// Tier that succeeded.
    pub tier: Tier,
}

impl ResolvedMotif {
    /// The all-tiers-failed result.
    pub fn unavailable() -> Self {
        Self {
            image: None,
            tier: Tier::None,
        }
    }

    /// Short non-blocking notice for hosts to show, if any.
    pub fn advisory(&self) -> Option<&'static str> {
        match self.tier {
            Tier::Local => Some("Preferred motif unavailable; showing the bundled fallback."),
            _ => None,
        }
    }
}

/// Fixed part of the fallback chain.
#[derive(Clone, Debug)]
pub struct ResolverOpts {
    /// Tried after the user tier, with cross-origin access requested.
    pub remote_default: MotifLocator,
    /// Tried last, same-origin.
    pub local_fallback: MotifLocator,
    /// Upper bound for each tier's fetch and decode.
    pub timeout: Duration,
}

impl ResolverOpts {
    /// Build options from configuration.
    pub fn from_params(params: &MotifParams) -> SplashResult<Self> {
        Ok(Self {
            remote_default: MotifLocator::parse(&params.remote_default)?,
            local_fallback: match &params.local_fallback {
                Some(s) => MotifLocator::parse(s)?,
                None => MotifLocator::bundled(),
            },
            timeout: params.timeout(),
        })
    }
}

#[derive(Default)]
struct ResolverState {
    generation: u64,
    latest: Option<ResolvedMotif>,
}

/// Resolves motif images through the user → remote → local chain.
///
/// Asynchronous requests are ordered by a generation counter: starting a request bumps it, and a
/// finished request is applied only if its generation is still current. The last request started
/// wins regardless of completion order.
#[derive(Clone)]
pub struct MotifResolver {
    fetcher: Arc<dyn ImageFetcher>,
    opts: Arc<ResolverOpts>,
    state: Arc<Mutex<ResolverState>>,
}

/// Handle to an in-flight [`MotifResolver::resolve_async`] request.
#[derive(Debug)]
pub struct ResolveHandle {
    generation: u64,
    join: JoinHandle<bool>,
}

impl ResolveHandle {
    /// Generation captured when the request started.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Block until the request finishes. Returns `true` if its result was applied.
    pub fn wait(self) -> bool {
        self.join.join().unwrap_or(false)
    }
}

impl MotifResolver {
    /// Create a resolver over `fetcher`.
    pub fn new(fetcher: Arc<dyn ImageFetcher>, opts: ResolverOpts) -> Self {
        Self {
            fetcher,
            opts: Arc::new(opts),
            state: Arc::new(Mutex::new(ResolverState::default())),
        }
    }

    /// Run the chain on the calling thread. Does not touch the currency state.
    pub fn resolve(&self, user: Option<&MotifLocator>) -> ResolvedMotif {
        run_chain(&self.fetcher, &self.opts, user)
    }

    /// Run the chain on a background thread.
    ///
    /// `on_current` is called with the result only if no newer request started in the meantime.
    /// It runs while the resolver state is locked, so it must not call back into this resolver.
    pub fn resolve_async<F>(
        &self,
        user: Option<MotifLocator>,
        on_current: F,
    ) -> SplashResult<ResolveHandle>
    where
        F: FnOnce(&ResolvedMotif) + Send + 'static,
    {
        let generation = {
            let mut st = self.lock();
            st.generation += 1;
            st.generation
        };
        tracing::debug!(generation, "motif resolution started");

        let fetcher = Arc::clone(&self.fetcher);
        let opts = Arc::clone(&self.opts);
        let state = Arc::clone(&self.state);
        let join = std::thread::Builder::new()
            .name(format!("splashback-resolve-{generation}"))
            .spawn(move || {
                let resolved = run_chain(&fetcher, &opts, user.as_ref());
                let mut st = state.lock().unwrap_or_else(PoisonError::into_inner);
                if st.generation != generation {
                    tracing::debug!(
                        generation,
                        current = st.generation,
                        "dropping stale motif resolution"
                    );
                    return false;
                }
                on_current(&resolved);
                st.latest = Some(resolved);
                true
            })
            .map_err(|e| SplashError::Other(anyhow::Error::new(e).context("spawn resolver")))?;

        Ok(ResolveHandle { generation, join })
    }

    /// Most recently applied result of an asynchronous request.
    pub fn latest(&self) -> Option<ResolvedMotif> {
        self.lock().latest.clone()
    }

    /// Generation of the most recently started asynchronous request.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    fn lock(&self) -> MutexGuard<'_, ResolverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn run_chain(
    fetcher: &Arc<dyn ImageFetcher>,
    opts: &ResolverOpts,
    user: Option<&MotifLocator>,
) -> ResolvedMotif {
    let chain = [
        (Tier::User, user, CrossOrigin::Anonymous),
        (Tier::Remote, Some(&opts.remote_default), CrossOrigin::Anonymous),
        (Tier::Local, Some(&opts.local_fallback), CrossOrigin::None),
    ];
    for (tier, locator, cross_origin) in chain {
        let Some(locator) = locator else { continue };
        let req = FetchRequest {
            locator: locator.clone(),
            cross_origin,
            timeout: opts.timeout,
        };
        match attempt(fetcher, req, tier, opts.timeout) {
            Ok(image) => {
                tracing::debug!(%tier, %locator, "motif resolved");
                return ResolvedMotif {
                    image: Some(Arc::new(image)),
                    tier,
                };
            }
            Err(e) => tracing::warn!(%tier, %locator, error = %e, "motif tier failed"),
        }
    }
    ResolvedMotif::unavailable()
}

// A timed-out worker keeps running detached; its late result hits a closed channel.
fn attempt(
    fetcher: &Arc<dyn ImageFetcher>,
    req: FetchRequest,
    tier: Tier,
    timeout: Duration,
) -> SplashResult<MotifImage> {
    let (tx, rx) = mpsc::sync_channel::<SplashResult<MotifImage>>(1);
    let fetcher = Arc::clone(fetcher);
    std::thread::Builder::new()
        .name(format!("splashback-fetch-{tier}"))
        .spawn(move || {
            let res = fetcher
                .fetch(&req)
                .and_then(|f| decode_motif(&f.bytes, f.origin_clean));
            let _ = tx.send(res);
        })
        .map_err(|e| SplashError::Other(anyhow::Error::new(e).context("spawn fetch worker")))?;

    match rx.recv_timeout(timeout) {
        Ok(res) => res,
        Err(RecvTimeoutError::Timeout) => Err(SplashError::image_load_timeout(
            tier,
            u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        )),
        Err(RecvTimeoutError::Disconnected) => Err(SplashError::image_load(
            "fetch worker exited without a result",
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/resolver.rs"]
mod tests;
