//! Background chunk generation and caching.
//!
//! A [`GenerationService`] owns the chunk cache, the set of pending
//! coordinates, the FIFO job queue and the single worker thread that drains
//! it. Callers never wait on generation: a request either returns a
//! committed chunk or reports it as pending and queues it once.
//!
//! Every coordinate is in exactly one of three states: unknown, pending, or
//! cached. The worker commits a chunk and clears its pending mark while
//! holding the scheduler lock, and `request` re-checks the cache under the
//! same lock before deciding to enqueue, so a coordinate is never observed
//! as neither pending nor cached once it has been requested.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use ahash::AHashSet;
use crossbeam_channel::{unbounded, Receiver, Sender};
use maze_common::{ChunkCoord, MazeError, MazeResult};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, warn};

use crate::cache::ChunkCache;
use crate::chunk::Chunk;
use crate::generation::ChunkSource;

/// Name given to the worker thread.
pub const WORKER_THREAD_NAME: &str = "maze-chunk-gen";

/// Outcome of a chunk request.
#[derive(Debug, Clone)]
pub enum ChunkRequest {
    /// Chunk is committed and can be read freely
    Ready(Arc<Chunk>),
    /// Chunk is queued or being generated
    Pending,
}

impl ChunkRequest {
    /// Returns the chunk if it is ready.
    #[must_use]
    pub fn ready(self) -> Option<Arc<Chunk>> {
        match self {
            Self::Ready(chunk) => Some(chunk),
            Self::Pending => None,
        }
    }

    /// Returns true if the chunk is not committed yet.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Point-in-time service counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Total calls to `request`
    pub requests: u64,
    /// Requests answered from the cache
    pub cache_hits: u64,
    /// Coordinates pushed onto the queue
    pub enqueued: u64,
    /// Chunks generated and committed by the worker
    pub generated: u64,
    /// Coordinates currently queued or in flight
    pub pending: usize,
    /// Chunks currently cached
    pub cached: usize,
}

enum Job {
    Generate(ChunkCoord),
    Shutdown,
}

#[derive(Default)]
struct SchedulerState {
    pending: AHashSet<ChunkCoord>,
    stopping: bool,
}

#[derive(Default)]
struct Counters {
    requests: AtomicU64,
    cache_hits: AtomicU64,
    enqueued: AtomicU64,
    generated: AtomicU64,
}

/// State shared between the service handle and its worker thread.
#[derive(Default)]
struct Shared {
    state: Mutex<SchedulerState>,
    /// Signalled after every commit and when the worker exits
    committed: Condvar,
    cache: ChunkCache,
    counters: Counters,
}

impl Shared {
    fn is_stopping(&self) -> bool {
        self.state.lock().stopping
    }

    fn commit(&self, coord: ChunkCoord, chunk: Chunk) {
        let mut state = self.state.lock();
        self.cache.insert(coord, chunk);
        state.pending.remove(&coord);
        self.counters.generated.fetch_add(1, Ordering::Relaxed);
        drop(state);
        self.committed.notify_all();
    }

    /// Forgets queued work once the worker is gone.
    fn abandon_pending(&self) {
        let mut state = self.state.lock();
        let dropped = state.pending.len();
        state.pending.clear();
        state.stopping = true;
        drop(state);
        if dropped > 0 {
            debug!("Discarded {dropped} queued chunks on shutdown");
        }
        self.committed.notify_all();
    }
}

/// Owns the chunk cache and the background generation worker.
///
/// Share it behind an `Arc` between the world query façade and whatever
/// drives shutdown. Dropping the last handle stops and joins the worker.
pub struct GenerationService {
    shared: Arc<Shared>,
    source: Arc<dyn ChunkSource>,
    jobs: Sender<Job>,
    /// Handed to the worker when it is first needed
    job_receiver: Mutex<Option<Receiver<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl GenerationService {
    /// Creates a service around a chunk source. The worker is not started
    /// until the first chunk is queued.
    #[must_use]
    pub fn new(source: impl ChunkSource + 'static) -> Self {
        Self::with_shared_source(Arc::new(source))
    }

    /// Creates a service from an already shared chunk source.
    #[must_use]
    pub fn with_shared_source(source: Arc<dyn ChunkSource>) -> Self {
        let (jobs, job_receiver) = unbounded();
        Self {
            shared: Arc::new(Shared::default()),
            source,
            jobs,
            job_receiver: Mutex::new(Some(job_receiver)),
            worker: Mutex::new(None),
        }
    }

    /// Side length of the chunks this service produces.
    #[must_use]
    pub fn chunk_size(&self) -> u32 {
        self.source.chunk_size()
    }

    /// Returns the chunk at `coord`, or queues it for generation.
    ///
    /// Never blocks on generation. Repeated requests for a pending chunk do
    /// not queue it again.
    pub fn request(&self, coord: ChunkCoord) -> MazeResult<ChunkRequest> {
        let counters = &self.shared.counters;
        counters.requests.fetch_add(1, Ordering::Relaxed);

        if let Some(chunk) = self.shared.cache.get(coord) {
            counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(ChunkRequest::Ready(chunk));
        }

        let mut state = self.shared.state.lock();
        // The worker may have committed between the lookup above and
        // acquiring the lock.
        if let Some(chunk) = self.shared.cache.get(coord) {
            counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(ChunkRequest::Ready(chunk));
        }
        if state.pending.contains(&coord) {
            return Ok(ChunkRequest::Pending);
        }
        if state.stopping {
            warn!("Chunk {coord} requested after shutdown");
            return Err(MazeError::ServiceStopped);
        }

        self.ensure_worker()?;
        if self.jobs.send(Job::Generate(coord)).is_err() {
            state.stopping = true;
            return Err(MazeError::ServiceStopped);
        }
        state.pending.insert(coord);
        counters.enqueued.fetch_add(1, Ordering::Relaxed);
        debug!("Queued chunk {coord}");
        Ok(ChunkRequest::Pending)
    }

    /// Requests every chunk in the square of `radius` around `center`.
    /// Returns how many of them are not ready yet.
    pub fn prefetch(&self, center: ChunkCoord, radius: u32) -> MazeResult<usize> {
        let mut pending = 0;
        for coord in center.square(radius) {
            if self.request(coord)?.is_pending() {
                pending += 1;
            }
        }
        Ok(pending)
    }

    /// Returns a committed chunk without queueing anything.
    #[must_use]
    pub fn cached(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        self.shared.cache.get(coord)
    }

    /// Checks if a chunk is queued or being generated.
    #[must_use]
    pub fn is_pending(&self, coord: ChunkCoord) -> bool {
        self.shared.state.lock().pending.contains(&coord)
    }

    /// Blocks until `coord` is committed or the timeout elapses.
    ///
    /// Returns `None` on timeout, or straight away if the chunk was never
    /// requested.
    pub fn wait_for(&self, coord: ChunkCoord, timeout: Duration) -> Option<Arc<Chunk>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        loop {
            if let Some(chunk) = self.shared.cache.get(coord) {
                return Some(chunk);
            }
            if !state.pending.contains(&coord) {
                return None;
            }
            if self
                .shared
                .committed
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return self.shared.cache.get(coord);
            }
        }
    }

    /// Blocks until nothing is pending or the timeout elapses.
    /// Returns true if the queue drained.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        while !state.pending.is_empty() {
            if self
                .shared
                .committed
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return state.pending.is_empty();
            }
        }
        true
    }

    /// Returns current counters.
    #[must_use]
    pub fn stats(&self) -> GenerationStats {
        let counters = &self.shared.counters;
        let pending = self.shared.state.lock().pending.len();
        GenerationStats {
            requests: counters.requests.load(Ordering::Relaxed),
            cache_hits: counters.cache_hits.load(Ordering::Relaxed),
            enqueued: counters.enqueued.load(Ordering::Relaxed),
            generated: counters.generated.load(Ordering::Relaxed),
            pending,
            cached: self.shared.cache.len(),
        }
    }

    /// Asks the worker to stop without waiting for it.
    ///
    /// The chunk currently being generated still commits; queued chunks are
    /// dropped. Later requests for uncached chunks fail with
    /// [`MazeError::ServiceStopped`].
    pub fn signal_stop(&self) {
        let mut state = self.shared.state.lock();
        if state.stopping {
            return;
        }
        state.stopping = true;
        drop(state);
        // Wakes the worker if it is parked on an empty queue.
        let _ = self.jobs.send(Job::Shutdown);
        info!("Chunk generation stop requested");
    }

    /// Stops the worker and waits for it to exit.
    pub fn shutdown(&self) -> MazeResult<()> {
        self.signal_stop();
        let handle = self.worker.lock().take();
        let Some(handle) = handle else {
            return Ok(());
        };
        if handle.join().is_err() {
            error!("Chunk generation worker panicked");
            self.shared.abandon_pending();
            return Err(MazeError::WorkerPanicked);
        }
        info!("Chunk generation worker joined");
        Ok(())
    }

    /// Returns true once a worker thread has been started.
    #[must_use]
    pub fn worker_started(&self) -> bool {
        self.job_receiver.lock().is_none()
    }

    fn ensure_worker(&self) -> MazeResult<()> {
        let mut receiver = self.job_receiver.lock();
        let Some(jobs) = receiver.take() else {
            return Ok(());
        };

        let shared = Arc::clone(&self.shared);
        let source = Arc::clone(&self.source);
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_worker(&shared, source.as_ref(), &jobs))
            .map_err(MazeError::WorkerSpawn)?;

        *self.worker.lock() = Some(handle);
        info!("Chunk generation worker started");
        Ok(())
    }
}

impl Drop for GenerationService {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("Failed to shut down chunk generation: {e}");
        }
    }
}

/// Clears the pending set when the worker exits, including by unwinding
/// out of a panicking [`ChunkSource`].
struct ExitGuard<'a>(&'a Shared);

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!("Chunk generation worker panicked, abandoning queued chunks");
        }
        self.0.abandon_pending();
    }
}

fn run_worker(shared: &Shared, source: &dyn ChunkSource, jobs: &Receiver<Job>) {
    let _guard = ExitGuard(shared);
    while let Ok(job) = jobs.recv() {
        let coord = match job {
            Job::Generate(coord) => coord,
            Job::Shutdown => break,
        };
        if shared.is_stopping() {
            break;
        }

        let started = Instant::now();
        let chunk = source.generate(coord);
        shared.commit(coord, chunk);
        debug!(
            "Generated chunk {coord} in {:.2}ms",
            started.elapsed().as_secs_f64() * 1000.0
        );
    }
    info!("Chunk generation worker stopped");
}
