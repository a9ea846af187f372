use std::collections::HashMap;
use std::io::Cursor;
use std::time::Duration;

use super::*;
use crate::assets::fetch::Fetched;

#[derive(Clone)]
enum Behavior {
    Png { px: [u8; 4], delay: Duration },
    Fail,
    Garbage,
    Hang,
}

struct FakeFetcher {
    by_locator: HashMap<String, Behavior>,
    calls: Mutex<Vec<(String, CrossOrigin)>>,
}

impl FakeFetcher {
    fn new(entries: &[(&str, Behavior)]) -> Arc<Self> {
        Arc::new(Self {
            by_locator: entries
                .iter()
                .map(|(k, v)| ((*k).to_owned(), v.clone()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        })
    }
}

impl FakeFetcher {
    fn calls(&self) -> Vec<(String, CrossOrigin)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ImageFetcher for FakeFetcher {
    fn fetch(&self, req: &FetchRequest) -> SplashResult<Fetched> {
        self.calls
            .lock()
            .unwrap()
            .push((req.locator.to_string(), req.cross_origin));
        match self.by_locator.get(&req.locator.to_string()) {
            Some(Behavior::Png { px, delay }) => {
                std::thread::sleep(*delay);
                Ok(Fetched {
                    bytes: png(*px),
                    origin_clean: true,
                })
            }
            Some(Behavior::Garbage) => Ok(Fetched {
                bytes: b"nope".to_vec(),
                origin_clean: true,
            }),
            Some(Behavior::Hang) => {
                std::thread::sleep(Duration::from_secs(5));
                Err(SplashError::image_load("hung"))
            }
            Some(Behavior::Fail) | None => Err(SplashError::image_load("unreachable")),
        }
    }
}

fn png(px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 2, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn ok(px: [u8; 4]) -> Behavior {
    Behavior::Png {
        px,
        delay: Duration::ZERO,
    }
}

fn opts(timeout_ms: u64) -> ResolverOpts {
    ResolverOpts {
        remote_default: MotifLocator::parse("https://remote.test/m.png").unwrap(),
        local_fallback: MotifLocator::parse("bundled/m.png").unwrap(),
        timeout: Duration::from_millis(timeout_ms),
    }
}

fn user() -> MotifLocator {
    MotifLocator::parse("https://user.test/u.png").unwrap()
}

fn first_px(m: &ResolvedMotif) -> [u8; 4] {
    m.image.as_ref().unwrap().pixels().get_pixel(0, 0).0
}

#[test]
fn valid_user_locator_wins() {
    let f = FakeFetcher::new(&[
        ("https://user.test/u.png", ok([1, 0, 0, 255])),
        ("https://remote.test/m.png", ok([2, 0, 0, 255])),
    ]);
    let r = MotifResolver::new(f.clone(), opts(1000));
    let out = r.resolve(Some(&user()));
    assert_eq!(out.tier, Tier::User);
    assert_eq!(first_px(&out), [1, 0, 0, 255]);
    assert_eq!(f.calls().len(), 1);
}

#[test]
fn user_failure_falls_to_remote() {
    let f = FakeFetcher::new(&[
        ("https://user.test/u.png", Behavior::Fail),
        ("https://remote.test/m.png", ok([2, 0, 0, 255])),
    ]);
    let out = MotifResolver::new(f, opts(1000)).resolve(Some(&user()));
    assert_eq!(out.tier, Tier::Remote);
    assert!(out.advisory().is_none());
}

#[test]
fn absent_user_locator_starts_at_remote() {
    let f = FakeFetcher::new(&[("https://remote.test/m.png", ok([2, 0, 0, 255]))]);
    let out = MotifResolver::new(f.clone(), opts(1000)).resolve(None);
    assert_eq!(out.tier, Tier::Remote);
    assert_eq!(f.calls().len(), 1);
}

#[test]
fn decode_failure_and_failure_fall_to_local() {
    let f = FakeFetcher::new(&[
        ("https://user.test/u.png", Behavior::Garbage),
        ("https://remote.test/m.png", Behavior::Fail),
        ("bundled/m.png", ok([3, 0, 0, 255])),
    ]);
    let out = MotifResolver::new(f, opts(1000)).resolve(Some(&user()));
    assert_eq!(out.tier, Tier::Local);
    assert_eq!(first_px(&out), [3, 0, 0, 255]);
    assert!(out.advisory().is_some());
}

#[test]
fn timeout_advances_to_next_tier() {
    let f = FakeFetcher::new(&[
        ("https://user.test/u.png", Behavior::Hang),
        ("https://remote.test/m.png", ok([2, 0, 0, 255])),
    ]);
    let started = std::time::Instant::now();
    let out = MotifResolver::new(f, opts(100)).resolve(Some(&user()));
    assert_eq!(out.tier, Tier::Remote);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn all_tiers_failing_yields_none() {
    let f = FakeFetcher::new(&[]);
    let out = MotifResolver::new(f.clone(), opts(1000)).resolve(Some(&user()));
    assert_eq!(out.tier, Tier::None);
    assert!(out.image.is_none());
    assert_eq!(
        f.calls(),
        vec![
            ("https://user.test/u.png".to_owned(), CrossOrigin::Anonymous),
            ("https://remote.test/m.png".to_owned(), CrossOrigin::Anonymous),
            ("bundled/m.png".to_owned(), CrossOrigin::None),
        ]
    );
}

#[test]
fn later_request_wins_when_earlier_finishes_last() {
    let f = FakeFetcher::new(&[
        (
            "https://user.test/slow.png",
            Behavior::Png {
                px: [10, 0, 0, 255],
                delay: Duration::from_millis(300),
            },
        ),
        ("https://user.test/fast.png", ok([20, 0, 0, 255])),
    ]);
    let r = MotifResolver::new(f, opts(3000));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let s1 = Arc::clone(&seen);
    let h1 = r
        .resolve_async(
            Some(MotifLocator::parse("https://user.test/slow.png").unwrap()),
            move |m| s1.lock().unwrap().push(first_px(m)),
        )
        .unwrap();
    let s2 = Arc::clone(&seen);
    let h2 = r
        .resolve_async(
            Some(MotifLocator::parse("https://user.test/fast.png").unwrap()),
            move |m| s2.lock().unwrap().push(first_px(m)),
        )
        .unwrap();
    assert!(h2.generation() > h1.generation());

    assert!(h2.wait());
    assert!(!h1.wait());
    assert_eq!(*seen.lock().unwrap(), vec![[20, 0, 0, 255]]);
    assert_eq!(first_px(&r.latest().unwrap()), [20, 0, 0, 255]);
}

#[test]
fn later_request_wins_when_earlier_finishes_first() {
    let f = FakeFetcher::new(&[
        (
            "https://user.test/a.png",
            Behavior::Png {
                px: [10, 0, 0, 255],
                delay: Duration::from_millis(50),
            },
        ),
        (
            "https://user.test/b.png",
            Behavior::Png {
                px: [20, 0, 0, 255],
                delay: Duration::from_millis(400),
            },
        ),
    ]);
    let r = MotifResolver::new(f, opts(3000));
    let h1 = r
        .resolve_async(
            Some(MotifLocator::parse("https://user.test/a.png").unwrap()),
            |_| {},
        )
        .unwrap();
    let h2 = r
        .resolve_async(
            Some(MotifLocator::parse("https://user.test/b.png").unwrap()),
            |_| {},
        )
        .unwrap();

    let g2 = h2.generation();
    assert!(!h1.wait());
    assert!(r.latest().is_none());
    assert!(h2.wait());
    assert_eq!(first_px(&r.latest().unwrap()), [20, 0, 0, 255]);
    assert_eq!(r.generation(), g2);
}

#[test]
fn tier_display_is_lowercase() {
    assert_eq!(Tier::User.to_string(), "user");
    assert_eq!(Tier::None.to_string(), "none");
}

#[test]
fn default_params_fall_back_to_embedded_motif() {
    let opts = ResolverOpts::from_params(&MotifParams::default()).unwrap();
    assert_eq!(opts.local_fallback, MotifLocator::bundled());

    let params = MotifParams {
        local_fallback: Some("/srv/motifs/fallback.png".to_owned()),
        ..MotifParams::default()
    };
    let opts = ResolverOpts::from_params(&params).unwrap();
    assert_eq!(
        opts.local_fallback,
        MotifLocator::File("/srv/motifs/fallback.png".into())
    );
}
