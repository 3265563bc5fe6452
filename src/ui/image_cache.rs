// Remote image loading for tiles and the detail overlay
// Downloads and decodes off the main thread, caches textures per URL

use gdk4::Texture;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, warn};

use crate::image_loader;

const LOADER_THREADS: usize = 4;
const LOADER_QUEUE: usize = 512;
const CACHE_ENTRIES: usize = 512;

/// Longest side of a decoded tile image.
pub const TILE_PREVIEW_SIZE: u32 = 512;
/// Longest side of the overlay hero image.
pub const DETAIL_PREVIEW_SIZE: u32 = 1280;

// Placeholder texture - generated once and reused
pub fn placeholder_texture() -> &'static Texture {
    static PLACEHOLDER: OnceLock<Texture> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| solid_texture(64, 64, [0x1a, 0x1a, 0x1a, 0xff]))
}

// Badge used for every branded item: a rounded light plate on transparent
fn branding_texture() -> &'static Texture {
    static BRANDING: OnceLock<Texture> = OnceLock::new();
    BRANDING.get_or_init(|| {
        let width: usize = 96;
        let height: usize = 32;
        let radius = 8usize;
        let mut pixels = vec![0u8; width * height * 4];

        for y in 0..height {
            for x in 0..width {
                // Distance into the nearest corner square, if any
                let cx = if x < radius {
                    Some(radius - x)
                } else if x >= width - radius {
                    Some(x + 1 + radius - width)
                } else {
                    None
                };
                let cy = if y < radius {
                    Some(radius - y)
                } else if y >= height - radius {
                    Some(y + 1 + radius - height)
                } else {
                    None
                };
                let inside = match (cx, cy) {
                    (Some(dx), Some(dy)) => dx * dx + dy * dy <= radius * radius,
                    _ => true,
                };
                if inside {
                    let idx = (y * width + x) * 4;
                    pixels[idx..idx + 4].copy_from_slice(&[0xf0, 0xf0, 0xf0, 0xe6]);
                }
            }
        }

        memory_texture(pixels, width as u32, height as u32)
    })
}

/// Texture for a branding logo URL. The fixed local asset is drawn in code;
/// anything else goes through the network loader like any other image.
pub fn logo_texture(url: &str) -> Option<&'static Texture> {
    (url == crate::models::DEFAULT_BRANDING_LOGO).then(branding_texture)
}

fn solid_texture(width: u32, height: u32, rgba: [u8; 4]) -> Texture {
    let mut pixels = vec![0u8; (width * height * 4) as usize];
    for chunk in pixels.chunks_exact_mut(4) {
        chunk.copy_from_slice(&rgba);
    }
    memory_texture(pixels, width, height)
}

fn memory_texture(pixels: Vec<u8>, width: u32, height: u32) -> Texture {
    let bytes = glib::Bytes::from_owned(pixels);
    gdk::MemoryTexture::new(
        width as i32,
        height as i32,
        gdk::MemoryFormat::R8g8b8a8,
        &bytes,
        (width * 4) as usize,
    )
    .upcast()
}

fn create_texture_from_rgba(rgba: Vec<u8>, width: u32, height: u32) -> Option<Texture> {
    if width == 0 || height == 0 {
        return None;
    }
    let expected = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4);
    if rgba.len() < expected {
        return None;
    }
    Some(memory_texture(rgba, width, height))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ImageKey {
    url: String,
    max_side: u32,
}

#[derive(Debug)]
struct DecodeResult {
    key: ImageKey,
    rgba: Option<Vec<u8>>,
    width: u32,
    height: u32,
}

type Waiter = Box<dyn FnOnce(Option<&Texture>)>;

struct LoaderState {
    pending: HashSet<ImageKey>,
    waiters: HashMap<ImageKey, Vec<Waiter>>,
    cache: lru::LruCache<ImageKey, Texture>,
}

pub struct ImageCache {
    request_tx: flume::Sender<ImageKey>,
    result_rx: flume::Receiver<DecodeResult>,
    state: RefCell<LoaderState>,
}

static NEXT_LOAD_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Fresh token for tagging a request; a widget keeps the latest token per
/// slot and ignores results carrying an older one.
pub fn next_token() -> u64 {
    NEXT_LOAD_TOKEN.fetch_add(1, Ordering::Relaxed)
}

thread_local! {
    static IMAGE_CACHE: Rc<ImageCache> = ImageCache::new();
}

/// Request a texture on the GTK main thread. `done` runs on the main
/// thread with `None` when the image cannot be loaded.
pub fn request<F>(url: &str, max_side: u32, done: F)
where
    F: FnOnce(Option<&Texture>) + 'static,
{
    IMAGE_CACHE.with(|cache| cache.request(url, max_side, Box::new(done)));
}

impl ImageCache {
    fn new() -> Rc<Self> {
        let (request_tx, request_rx) = flume::bounded::<ImageKey>(LOADER_QUEUE);
        let (result_tx, result_rx) = flume::unbounded::<DecodeResult>();

        let http = reqwest::Client::new();
        for worker in 0..LOADER_THREADS {
            let rx = request_rx.clone();
            let tx = result_tx.clone();
            let http = http.clone();
            std::thread::spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        warn!(worker, "Image worker has no runtime: {}", err);
                        return;
                    }
                };
                while let Ok(key) = rx.recv() {
                    let decoded = runtime.block_on(fetch_preview(&http, &key));
                    let (rgba, width, height) = match decoded {
                        Ok((data, w, h)) => (Some(data), w, h),
                        Err(err) => {
                            debug!(url = %key.url, "Image load failed: {:#}", err);
                            (None, 0, 0)
                        }
                    };
                    let _ = tx.send(DecodeResult {
                        key,
                        rgba,
                        width,
                        height,
                    });
                }
            });
        }

        let cache = Rc::new(Self {
            request_tx,
            result_rx,
            state: RefCell::new(LoaderState {
                pending: HashSet::new(),
                waiters: HashMap::new(),
                cache: lru::LruCache::new(NonZeroUsize::new(CACHE_ENTRIES).unwrap()),
            }),
        });

        let cache_weak = Rc::downgrade(&cache);
        glib::timeout_add_local(Duration::from_millis(16), move || {
            if let Some(cache) = cache_weak.upgrade() {
                cache.process_results();
                glib::ControlFlow::Continue
            } else {
                glib::ControlFlow::Break
            }
        });

        cache
    }

    fn request(&self, url: &str, max_side: u32, done: Waiter) {
        let key = ImageKey {
            url: url.to_string(),
            max_side,
        };
        let mut state = self.state.borrow_mut();

        if let Some(texture) = state.cache.get(&key).cloned() {
            glib::idle_add_local_once(move || done(Some(&texture)));
            return;
        }

        state.waiters.entry(key.clone()).or_default().push(done);

        if state.pending.insert(key.clone()) && self.request_tx.try_send(key.clone()).is_err() {
            warn!(url, "Image queue full, dropping request");
            state.pending.remove(&key);
            state.waiters.remove(&key);
        }
    }

    fn process_results(&self) {
        while let Ok(result) = self.result_rx.try_recv() {
            let texture = result
                .rgba
                .and_then(|rgba| create_texture_from_rgba(rgba, result.width, result.height));

            let waiters = {
                let mut state = self.state.borrow_mut();
                state.pending.remove(&result.key);
                if let Some(ref texture) = texture {
                    state.cache.put(result.key.clone(), texture.clone());
                }
                state.waiters.remove(&result.key).unwrap_or_default()
            };

            for waiter in waiters {
                waiter(texture.as_ref());
            }
        }
    }
}

async fn fetch_preview(http: &reqwest::Client, key: &ImageKey) -> Result<(Vec<u8>, u32, u32)> {
    let response = http
        .get(&key.url)
        .send()
        .await
        .with_context(|| format!("GET {}", key.url))?;
    if !response.status().is_success() {
        return Err(anyhow!("HTTP {}", response.status().as_u16()));
    }
    let bytes = response.bytes().await.context("Failed to read image body")?;
    image_loader::decode_preview(&bytes, key.max_side)
}
