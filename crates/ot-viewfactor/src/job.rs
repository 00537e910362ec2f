//! Background view-factor job driven by messages.

use std::sync::mpsc::{Receiver, RecvError, Sender, SyncSender, TryRecvError, TrySendError, channel, sync_channel};
use std::thread::{self, JoinHandle};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{ViewFactorResult, WorkerError};
use crate::estimate::{ViewFactorEstimate, ViewFactorRequest, finish, resolve, trace_chunk};
use crate::geometry::Geometry;

/// Bound of the progress queue; progress beyond it is dropped, never waited on.
const PROGRESS_CAPACITY: usize = 64;

/// Messages emitted by a running job. Exactly one terminal message ends a job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobMessage {
    Progress { percent: f64, rays_completed: usize },
    Completed(Vec<ViewFactorEstimate>),
    Failed(crate::error::ViewFactorError),
    Cancelled,
}

impl JobMessage {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobMessage::Progress { .. })
    }
}

enum Control {
    Cancel,
}

/// Worker-side view of the job.
pub(crate) struct JobContext {
    control: Receiver<Control>,
    progress: SyncSender<JobMessage>,
}

impl JobContext {
    /// True once the owner cancelled or dropped the handle.
    pub(crate) fn cancelled(&self) -> bool {
        match self.control.try_recv() {
            Ok(Control::Cancel) | Err(TryRecvError::Disconnected) => true,
            Err(TryRecvError::Empty) => false,
        }
    }

    pub(crate) fn report(&self, percent: f64, rays_completed: usize) {
        match self.progress.try_send(JobMessage::Progress {
            percent,
            rays_completed,
        }) {
            Ok(()) | Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

/// What a job body returns: estimates, or `None` when it stopped on cancellation.
pub(crate) type JobOutput = ViewFactorResult<Option<Vec<ViewFactorEstimate>>>;

/// Handle to a view-factor job running on its own thread.
///
/// Dropping the handle cancels the job.
pub struct ViewFactorJob {
    messages: Receiver<JobMessage>,
    control: Sender<Control>,
    handle: Option<JoinHandle<()>>,
}

impl ViewFactorJob {
    /// Estimate every request against `geometry` in the background.
    pub fn spawn(geometry: Geometry, requests: Vec<ViewFactorRequest>) -> Self {
        Self::spawn_task(move |ctx| run_requests(&geometry, &requests, ctx))
    }

    pub(crate) fn spawn_task<F>(task: F) -> Self
    where
        F: FnOnce(&JobContext) -> JobOutput + Send + 'static,
    {
        let (control_tx, control_rx) = channel();
        let (tx, rx) = sync_channel(PROGRESS_CAPACITY);
        let handle = thread::spawn(move || {
            let ctx = JobContext {
                control: control_rx,
                progress: tx,
            };
            let message = match task(&ctx) {
                Ok(Some(estimates)) => JobMessage::Completed(estimates),
                Ok(None) => JobMessage::Cancelled,
                Err(e) => JobMessage::Failed(e),
            };
            // Terminal messages wait for queue space; the owner may already be gone.
            let _ = ctx.progress.send(message);
        });

        Self {
            messages: rx,
            control: control_tx,
            handle: Some(handle),
        }
    }

    /// Ask the worker to stop at the next chunk boundary. Partial results are discarded.
    pub fn cancel(&self) {
        let _ = self.control.send(Control::Cancel);
    }

    /// Next message if one is waiting.
    pub fn try_next(&self) -> Option<JobMessage> {
        self.messages.try_recv().ok()
    }

    /// Block until the job ends, passing progress to `on_progress`.
    pub fn wait_with_progress(
        mut self,
        mut on_progress: impl FnMut(f64, usize),
    ) -> Result<Vec<ViewFactorEstimate>, WorkerError> {
        loop {
            match self.messages.recv() {
                Ok(JobMessage::Progress {
                    percent,
                    rays_completed,
                }) => on_progress(percent, rays_completed),
                Ok(JobMessage::Completed(estimates)) => {
                    self.join();
                    return Ok(estimates);
                }
                Ok(JobMessage::Failed(e)) => {
                    self.join();
                    return Err(WorkerError::Failed(e));
                }
                Ok(JobMessage::Cancelled) => {
                    self.join();
                    return Err(WorkerError::Cancelled);
                }
                Err(RecvError) => {
                    // The worker hung up without a terminal message: it panicked.
                    let message = match self.handle.take().map(JoinHandle::join) {
                        Some(Err(payload)) => panic_message(payload.as_ref()),
                        _ => "worker exited without a result".to_string(),
                    };
                    warn!(%message, "view-factor worker crashed");
                    return Err(WorkerError::Crashed { message });
                }
            }
        }
    }

    pub fn wait(self) -> Result<Vec<ViewFactorEstimate>, WorkerError> {
        self.wait_with_progress(|_, _| {})
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ViewFactorJob {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel();
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Trace every request in waves of chunks, checking for cancellation between waves.
fn run_requests(geometry: &Geometry, requests: &[ViewFactorRequest], ctx: &JobContext) -> JobOutput {
    geometry.validate()?;
    let pairs = requests
        .iter()
        .map(|r| resolve(geometry, r))
        .collect::<ViewFactorResult<Vec<_>>>()?;
    let total_rays: usize = requests.iter().map(|r| r.n_rays).sum();
    let wave = rayon::current_num_threads().max(1) * 4;
    info!(requests = requests.len(), total_rays, "view-factor job started");

    let mut done = 0;
    let mut estimates = Vec::with_capacity(requests.len());
    for (request, &pair) in requests.iter().zip(&pairs) {
        let cdf = geometry.surfaces[pair.from].area_cdf();
        let chunks = request.chunk_count();
        let mut hits = 0;
        let mut next = 0;
        while next < chunks {
            if ctx.cancelled() {
                debug!(rays_completed = done, "view-factor job cancelled");
                return Ok(None);
            }
            let end = (next + wave).min(chunks);
            hits += (next..end)
                .into_par_iter()
                .map(|chunk| trace_chunk(geometry, pair, &cdf, request, chunk))
                .sum::<usize>();
            done += (next..end).map(|c| request.chunk_rays(c)).sum::<usize>();
            next = end;
            ctx.report(100.0 * done as f64 / total_rays as f64, done);
        }
        estimates.push(finish(geometry, pair, request, hits));
    }
    info!(requests = estimates.len(), "view-factor job completed");
    Ok(Some(estimates))
}
