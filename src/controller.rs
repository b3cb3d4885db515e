//! The shell: one controller owning the view state and every transition.
//!
//! ```text
//!            submit (valid)              pipeline ok
//!   Idle ─────────────────▶ Loading ─────────────────▶ Ready
//!    ▲  ▲                    │   │                       │
//!    │  └──── cancel ────────┘   │ pipeline err          │ submit (valid)
//!    │                           ▼                       ▼
//!    └──── dismiss_error ──── Error(msg)              Loading
//! ```
//!
//! * Invalid submissions (no file, or a declared type other than
//!   `application/pdf`) return the alert error and change nothing.
//! * Submissions while Loading are refused with
//!   [`Pdf2JpgError::ConversionInProgress`].
//! * Every accepted submission bumps a generation counter. A running
//!   conversion checks it after each page and stops once it is stale, and
//!   any result it still delivers for an old generation is discarded.
//!
//! State lives in a [`tokio::sync::watch`] channel, so observers call
//! [`Controller::subscribe`] and are woken on every change.

use crate::config::ConversionConfig;
use crate::convert;
use crate::error::Pdf2JpgError;
use crate::output::RenderedImage;
use crate::pipeline::decode::Decoder;
use crate::pipeline::input::{self, UploadedFile};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Which of the four shell states is showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "message", rename_all = "snake_case")]
pub enum Phase {
    /// Nothing converted yet (or the last error was dismissed / run cancelled).
    Idle,
    /// A conversion is running.
    Loading,
    /// The last conversion finished; its images are on display.
    Ready,
    /// The last conversion failed with this user-facing message.
    Error(String),
}

/// Everything the presentation layer needs to draw the shell.
#[derive(Debug, Clone)]
pub struct ShellView {
    pub phase: Phase,
    /// Displayed images. Non-empty only in [`Phase::Ready`].
    pub images: Arc<[RenderedImage]>,
    /// The drop target is being hovered.
    pub highlight: bool,
    /// Generation of the latest accepted submission.
    pub generation: u64,
}

impl Default for ShellView {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            images: Arc::from(Vec::new()),
            highlight: false,
            generation: 0,
        }
    }
}

impl ShellView {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error(msg) => Some(msg),
            _ => None,
        }
    }

    // ── Transition functions ─────────────────────────────────────────────
    // Each returns whether the view changed, so it can be handed straight to
    // `watch::Sender::send_if_modified`.

    fn begin(&mut self) -> Result<u64, Pdf2JpgError> {
        if self.is_loading() {
            return Err(Pdf2JpgError::ConversionInProgress);
        }
        self.generation += 1;
        self.phase = Phase::Loading;
        self.images = Arc::from(Vec::new());
        Ok(self.generation)
    }

    fn complete(&mut self, generation: u64, images: Vec<RenderedImage>) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.phase = Phase::Ready;
        self.images = Arc::from(images);
        true
    }

    fn fail(&mut self, generation: u64, message: String) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.phase = Phase::Error(message);
        true
    }

    fn cancel(&mut self) -> bool {
        if !self.is_loading() {
            return false;
        }
        self.generation += 1;
        self.phase = Phase::Idle;
        true
    }

    fn dismiss_error(&mut self) -> bool {
        if self.error_message().is_none() {
            return false;
        }
        self.phase = Phase::Idle;
        true
    }

    fn set_highlight(&mut self, on: bool) -> bool {
        let changed = self.highlight != on;
        self.highlight = on;
        changed
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && self.is_loading()
    }
}

/// A running conversion started by [`Controller::drop_file`] or
/// [`Controller::select_file`].
#[derive(Debug)]
pub struct ConversionHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl ConversionHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait until the conversion has settled (Ready, Error, or discarded).
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            warn!(
                "Conversion task {} ended abnormally: {}",
                self.generation, e
            );
        }
    }
}

struct Inner {
    decoder: Arc<dyn Decoder>,
    config: ConversionConfig,
    state: watch::Sender<ShellView>,
}

impl Inner {
    fn current_generation(&self) -> u64 {
        self.state.borrow().generation
    }

    fn finish(&self, generation: u64, result: Result<Option<Vec<RenderedImage>>, Pdf2JpgError>) {
        let applied = match result {
            Ok(Some(images)) => {
                let pages = images.len();
                let applied = self
                    .state
                    .send_if_modified(|view| view.complete(generation, images));
                if applied {
                    info!("Conversion {} ready: {} pages", generation, pages);
                }
                applied
            }
            Ok(None) => false,
            Err(e) => {
                let message = e.to_string();
                let applied = self
                    .state
                    .send_if_modified(|view| view.fail(generation, message));
                if applied {
                    warn!("Conversion {} failed: {}", generation, e);
                }
                applied
            }
        };
        if !applied {
            debug!("Discarded outcome of stale conversion {}", generation);
        }
    }
}

/// Owns the shell state and drives the pipeline.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<Inner>,
}

impl Controller {
    pub fn new(decoder: Arc<dyn Decoder>, config: ConversionConfig) -> Self {
        let (state, _) = watch::channel(ShellView::default());
        Self {
            inner: Arc::new(Inner {
                decoder,
                config,
                state,
            }),
        }
    }

    /// Snapshot of the current view.
    pub fn view(&self) -> ShellView {
        self.inner.state.borrow().clone()
    }

    /// Receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ShellView> {
        self.inner.state.subscribe()
    }

    /// A drag entered the drop target.
    pub fn drag_enter(&self) {
        self.inner.state.send_if_modified(|v| v.set_highlight(true));
    }

    /// A drag left the drop target.
    pub fn drag_leave(&self) {
        self.inner
            .state
            .send_if_modified(|v| v.set_highlight(false));
    }

    /// Something was dropped on the target. Clears the highlight, then
    /// behaves like [`Controller::select_file`].
    pub fn drop_file(
        &self,
        file: Option<UploadedFile>,
    ) -> Result<ConversionHandle, Pdf2JpgError> {
        self.drag_leave();
        self.submit(file)
    }

    /// The file picker returned.
    ///
    /// On success the shell is in Loading and the returned handle resolves
    /// once it has settled. Must be called from within a Tokio runtime.
    pub fn select_file(
        &self,
        file: Option<UploadedFile>,
    ) -> Result<ConversionHandle, Pdf2JpgError> {
        self.submit(file)
    }

    /// Abandon the running conversion and return to Idle.
    ///
    /// Returns `false` if nothing was running.
    pub fn cancel(&self) -> bool {
        let cancelled = self.inner.state.send_if_modified(ShellView::cancel);
        if cancelled {
            info!("Conversion cancelled");
        }
        cancelled
    }

    /// Leave the Error state. Returns `false` if not in Error.
    pub fn dismiss_error(&self) -> bool {
        self.inner.state.send_if_modified(ShellView::dismiss_error)
    }

    fn submit(&self, file: Option<UploadedFile>) -> Result<ConversionHandle, Pdf2JpgError> {
        let file = input::accept(file)?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Pdf2JpgError::Internal(format!("no tokio runtime: {e}")))?;

        let mut begun = Err(Pdf2JpgError::ConversionInProgress);
        self.inner.state.send_if_modified(|view| {
            begun = view.begin();
            begun.is_ok()
        });
        let generation = begun?;
        info!("Converting '{}' (generation {})", file.name, generation);

        let inner = Arc::clone(&self.inner);
        let task = runtime.spawn(async move {
            let result = run(&inner, file, generation).await;
            inner.finish(generation, result);
        });

        Ok(ConversionHandle { generation, task })
    }
}

async fn run(
    inner: &Arc<Inner>,
    file: UploadedFile,
    generation: u64,
) -> Result<Option<Vec<RenderedImage>>, Pdf2JpgError> {
    let bytes = file.read_bytes().await?;
    if inner.current_generation() != generation {
        return Ok(None);
    }

    let watcher = Arc::clone(inner);
    let keep_going = move || watcher.current_generation() == generation;
    let decoder = Arc::clone(&inner.decoder);
    let output = convert::convert_while(decoder, bytes, &inner.config, keep_going).await?;
    Ok(output.map(|o| o.images))
}
