// Real-time driver: runs a controller on tokio, mapping its virtual clock onto tokio's clock.
// All mutations go through one lock, timers are fired by a single background task.

use crate::catalog::DestinationId;
use crate::controller::{GalleryController, GallerySnapshot};
use crate::display::DisplaySurface;
use crate::error::GalleryError;
use crate::input::{Shortcut, UserAction};
use crate::random::RandomSource;
use crate::scheduler::Scheduler;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;

// Interaction surface for callers on other tasks
#[async_trait]
pub trait GalleryClient: Send + Sync + 'static {
    async fn book(&self, id: DestinationId) -> Result<(), GalleryError>;

    async fn toggle_favorite(&self, id: DestinationId) -> Result<bool, GalleryError>;

    async fn press_key(&self, key: &str) -> Option<Shortcut>;

    async fn dispatch(&self, action: UserAction);

    async fn snapshot(&self) -> GallerySnapshot;
}

struct Shared<D, R, C> {
    controller: Mutex<GalleryController<D, R, C>>,
    wake: Notify,
    shutdown: AtomicBool,
    origin: Instant,
    // Controller time at `origin`
    base: Duration,
}

impl<D, R, C> Shared<D, R, C>
where
    D: DisplaySurface,
    R: RandomSource,
    C: Scheduler,
{
    fn virtual_now(&self) -> Duration {
        self.base + self.origin.elapsed()
    }

    fn deadline_instant(&self, deadline: Duration) -> Instant {
        self.origin + deadline.saturating_sub(self.base)
    }

    // Catches the controller up to the current time, then applies `f`
    fn with_controller<T>(&self, f: impl FnOnce(&mut GalleryController<D, R, C>) -> T) -> T {
        let result = {
            let mut controller = self.controller.lock();
            controller.advance_to(self.virtual_now());
            f(&mut *controller)
        };
        self.wake.notify_one();
        result
    }
}

pub struct GalleryHandle<D, R, C> {
    shared: Arc<Shared<D, R, C>>,
}

impl<D, R, C> Clone for GalleryHandle<D, R, C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

#[async_trait]
impl<D, R, C> GalleryClient for GalleryHandle<D, R, C>
where
    D: DisplaySurface + Send + 'static,
    R: RandomSource + Send + 'static,
    C: Scheduler + Send + 'static,
{
    async fn book(&self, id: DestinationId) -> Result<(), GalleryError> {
        self.shared.with_controller(|c| c.book_destination(id))
    }

    async fn toggle_favorite(&self, id: DestinationId) -> Result<bool, GalleryError> {
        self.shared.with_controller(|c| c.toggle_favorite(id))
    }

    async fn press_key(&self, key: &str) -> Option<Shortcut> {
        self.shared.with_controller(|c| c.handle_key(key))
    }

    async fn dispatch(&self, action: UserAction) {
        self.shared.with_controller(|c| c.handle_action(action))
    }

    async fn snapshot(&self) -> GallerySnapshot {
        self.shared.with_controller(|c| c.snapshot())
    }
}

pub struct GalleryRuntime<D, R, C> {
    shared: Arc<Shared<D, R, C>>,
    task: JoinHandle<()>,
}

impl<D, R, C> GalleryRuntime<D, R, C>
where
    D: DisplaySurface + Send + 'static,
    R: RandomSource + Send + 'static,
    C: Scheduler + Send + 'static,
{
    // Must be called from within a tokio runtime
    pub fn start(controller: GalleryController<D, R, C>) -> Self {
        let shared = Arc::new(Shared {
            base: controller.now(),
            controller: Mutex::new(controller),
            wake: Notify::new(),
            shutdown: AtomicBool::new(false),
            origin: Instant::now(),
        });
        let task = tokio::spawn(run_timers(Arc::clone(&shared)));
        tracing::debug!("gallery runtime started");
        Self { shared, task }
    }

    pub fn handle(&self) -> GalleryHandle<D, R, C> {
        GalleryHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    // Stops the timer task. Gives the controller back if no handle is still alive.
    pub async fn shutdown(self) -> Option<GalleryController<D, R, C>> {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.wake.notify_one();
        if let Err(e) = self.task.await {
            tracing::warn!("gallery timer task failed: {}", e);
        }
        Arc::try_unwrap(self.shared)
            .ok()
            .map(|shared| shared.controller.into_inner())
    }
}

async fn run_timers<D, R, C>(shared: Arc<Shared<D, R, C>>)
where
    D: DisplaySurface + Send + 'static,
    R: RandomSource + Send + 'static,
    C: Scheduler + Send + 'static,
{
    loop {
        if shared.shutdown.load(Ordering::SeqCst) {
            break;
        }
        let next = shared.controller.lock().next_deadline();
        match next {
            Some(deadline) => {
                tokio::select! {
                    _ = tokio::time::sleep_until(shared.deadline_instant(deadline)) => {
                        let fired = shared.controller.lock().advance_to(shared.virtual_now());
                        tracing::trace!(fired, "timers fired");
                    }
                    _ = shared.wake.notified() => {}
                }
            }
            None => shared.wake.notified().await,
        }
    }
    tracing::debug!("gallery runtime stopped");
}
