//! Background texture decoding.
//!
//! One worker thread takes [`LoadRequest`]s over a channel, decodes the file
//! and sends the outcome back. The UI thread drains results through
//! [`TextureLoader::try_recv`] without ever blocking.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use corelib::{LoadCompletion, LoadError, LoadRequest, RequestToken, TextureLoader};

use crate::paths::AssetRoot;
use crate::texture::TextureData;

pub type TextureCompletion = LoadCompletion<Arc<TextureData>>;

pub struct ThreadedTextureLoader {
    jobs: Option<Sender<LoadRequest>>,
    results: Receiver<TextureCompletion>,
    /// Requests handed to the worker that have not come back yet.
    in_flight: VecDeque<(RequestToken, String)>,
    /// Failures produced on this thread (worker gone).
    local: VecDeque<TextureCompletion>,
    /// Largest width/height the worker accepts; shared with the worker.
    max_dimension: Arc<AtomicU32>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadedTextureLoader {
    /// Start the worker. Images wider or taller than `max_dimension` are
    /// rejected as decode failures.
    pub fn spawn(root: AssetRoot, max_dimension: u32) -> Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<LoadRequest>();
        let (result_tx, result_rx) = mpsc::channel::<TextureCompletion>();
        let max_dimension = Arc::new(AtomicU32::new(max_dimension));
        let limit = Arc::clone(&max_dimension);

        let worker = thread::Builder::new()
            .name("texture-loader".to_string())
            .spawn(move || {
                log::debug!("Texture loader started, root={:?}", root.root());
                for request in job_rx {
                    let completion = load_one(&root, limit.load(Ordering::Relaxed), request);
                    if result_tx.send(completion).is_err() {
                        break;
                    }
                }
                log::debug!("Texture loader stopped");
            })
            .context("Failed to spawn texture loader thread")?;

        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            in_flight: VecDeque::new(),
            local: VecDeque::new(),
            max_dimension,
            worker: Some(worker),
        })
    }

    /// Tighten or relax the size limit once the device limits are known.
    /// Applies to requests the worker has not started yet.
    pub fn set_max_dimension(&self, max_dimension: u32) {
        log::debug!("Texture size limit set to {max_dimension}");
        self.max_dimension.store(max_dimension, Ordering::Relaxed);
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension.load(Ordering::Relaxed)
    }

    fn disconnected(token: RequestToken, path: String) -> TextureCompletion {
        LoadCompletion {
            token,
            path,
            result: Err(LoadError::Disconnected),
        }
    }

    /// The worker is gone: everything still in flight fails.
    fn abandon_in_flight(&mut self) {
        if self.jobs.take().is_some() {
            log::error!("Texture loader thread is gone");
        }
        for (token, path) in self.in_flight.drain(..) {
            self.local.push_back(Self::disconnected(token, path));
        }
    }
}

fn load_one(root: &AssetRoot, max_dimension: u32, request: LoadRequest) -> TextureCompletion {
    let LoadRequest { token, path } = request;
    let result = match root.resolve(&path) {
        Ok(file) if file.is_file() => TextureData::load(&file)
            .map_err(|e| LoadError::Decode {
                path: path.clone(),
                reason: format!("{e:#}"),
            })
            .and_then(|texture| check_size(&path, texture, max_dimension))
            .map(Arc::new),
        Ok(file) => {
            log::debug!("No texture file at {:?}", file);
            Err(LoadError::NotFound { path: path.clone() })
        }
        Err(e) => {
            log::debug!("Unresolvable texture path {path:?}: {e:#}");
            Err(LoadError::NotFound { path: path.clone() })
        }
    };
    LoadCompletion {
        token,
        path,
        result,
    }
}

fn check_size(
    path: &str,
    texture: TextureData,
    max_dimension: u32,
) -> Result<TextureData, LoadError> {
    if texture.width > max_dimension || texture.height > max_dimension {
        return Err(LoadError::Decode {
            path: path.to_string(),
            reason: format!(
                "{}x{} exceeds the {max_dimension}px texture limit",
                texture.width, texture.height
            ),
        });
    }
    Ok(texture)
}

impl TextureLoader for ThreadedTextureLoader {
    type Image = Arc<TextureData>;

    fn request(&mut self, request: LoadRequest) {
        let Some(jobs) = &self.jobs else {
            self.local
                .push_back(Self::disconnected(request.token, request.path));
            return;
        };
        let entry = (request.token, request.path.clone());
        match jobs.send(request) {
            Ok(()) => self.in_flight.push_back(entry),
            Err(mpsc::SendError(request)) => {
                self.abandon_in_flight();
                self.local
                    .push_back(Self::disconnected(request.token, request.path));
            }
        }
    }

    fn try_recv(&mut self) -> Option<TextureCompletion> {
        if let Some(done) = self.local.pop_front() {
            return Some(done);
        }
        match self.results.try_recv() {
            Ok(done) => {
                if let Some(i) = self.in_flight.iter().position(|(t, _)| *t == done.token) {
                    self.in_flight.remove(i);
                }
                Some(done)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.abandon_in_flight();
                self.local.pop_front()
            }
        }
    }
}

impl Drop for ThreadedTextureLoader {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Texture loader thread panicked");
            }
        }
    }
}
