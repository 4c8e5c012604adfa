//! Sample cache — process-wide, lazily populated, deduplicated fetches.
//!
//! Loading and decoding run on a dedicated loader thread so a `note_on` never
//! blocks on disk I/O. Callers `lookup` for an immediate hit, `request` to
//! start a fetch, and drain the completion channel for results. At most one
//! fetch per key is ever in flight; entries are never evicted.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use super::data::{SampleData, SampleError};

/// Provides the recorded audio for a sampled pitch. Implementations run on
/// the loader thread; tests install fakes.
pub trait SampleSource: Send + 'static {
    fn load(&self, key: u8) -> Result<SampleData, SampleError>;
}

/// Loads `<dir>/<pitch>.wav` from a fixed, pre-known sample directory.
pub struct DirSampleSource {
    dir: PathBuf,
}

impl DirSampleSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SampleSource for DirSampleSource {
    fn load(&self, key: u8) -> Result<SampleData, SampleError> {
        SampleData::from_wav_path(&self.dir.join(format!("{key}.wav")))
    }
}

/// Source for running without any recordings: every fetch fails, so the
/// engine falls back to synthesis for every note.
pub struct NoSampleSource;

impl SampleSource for NoSampleSource {
    fn load(&self, key: u8) -> Result<SampleData, SampleError> {
        Err(SampleError::Unavailable(key))
    }
}

/// Completion notice published by the loader thread. `data` is None when the
/// fetch failed; the failure is not memoized, so a later request retries.
#[derive(Debug, Clone)]
pub struct SampleFetched {
    pub key: u8,
    pub data: Option<Arc<SampleData>>,
}

#[derive(Default)]
struct Inner {
    loaded: HashMap<u8, Arc<SampleData>>,
    in_flight: HashSet<u8>,
}

/// Shared handle to the cache. Cloning shares the same mapping; the loader
/// thread exits once every handle is dropped.
#[derive(Clone)]
pub struct SampleCache {
    inner: Arc<Mutex<Inner>>,
    requests: mpsc::Sender<u8>,
}

impl SampleCache {
    /// Start the cache with its loader thread. Returns the handle and the
    /// completion channel the owner drains.
    pub fn spawn<S: SampleSource>(source: S) -> (Self, mpsc::Receiver<SampleFetched>) {
        let inner = Arc::new(Mutex::new(Inner::default()));
        let (request_tx, request_rx) = mpsc::channel::<u8>();
        let (done_tx, done_rx) = mpsc::channel::<SampleFetched>();

        let loader_inner = Arc::clone(&inner);
        thread::spawn(move || {
            // Ends when the last cache handle drops the request sender.
            for key in request_rx.iter() {
                let data = match source.load(key) {
                    Ok(data) => Some(Arc::new(data)),
                    Err(e) => {
                        log::warn!("sample fetch for pitch {key} failed: {e}");
                        None
                    }
                };
                {
                    let mut inner = lock(&loader_inner);
                    inner.in_flight.remove(&key);
                    if let Some(ref data) = data {
                        inner.loaded.insert(key, Arc::clone(data));
                    }
                }
                if done_tx.send(SampleFetched { key, data }).is_err() {
                    break;
                }
            }
        });

        (
            Self {
                inner,
                requests: request_tx,
            },
            done_rx,
        )
    }

    /// Immediate lookup. Some only once the key has resolved.
    pub fn lookup(&self, key: u8) -> Option<Arc<SampleData>> {
        lock(&self.inner).loaded.get(&key).cloned()
    }

    /// Request a fetch for `key`. Returns true when a new fetch was started;
    /// false when the key is already loaded or a fetch is already in flight
    /// (the caller awaits the same completion — no duplicate work).
    pub fn request(&self, key: u8) -> bool {
        let mut inner = lock(&self.inner);
        if inner.loaded.contains_key(&key) || inner.in_flight.contains(&key) {
            return false;
        }
        inner.in_flight.insert(key);
        if self.requests.send(key).is_err() {
            // Loader thread is gone; leave the key eligible for retry.
            inner.in_flight.remove(&key);
            log::warn!("sample loader unavailable, dropping request for pitch {key}");
            return false;
        }
        true
    }

    /// Whether a fetch for `key` is currently in flight.
    pub fn is_in_flight(&self, key: u8) -> bool {
        lock(&self.inner).in_flight.contains(&key)
    }

    /// Number of resolved entries.
    pub fn loaded_count(&self) -> usize {
        lock(&self.inner).loaded.len()
    }
}

fn lock(inner: &Mutex<Inner>) -> std::sync::MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
