use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use input_watcher::InputWatcher;
use portable_atomic::{AtomicBool, Ordering};

/// Cross-task controls for one game: running or not, and whether a flap is
/// waiting for the next tick.
pub struct GameSession<'a, M: RawMutex> {
    active: AtomicBool,
    flap_pending: AtomicBool,
    started: Signal<M, ()>,
    watcher: &'a InputWatcher<M>,
}

impl<'a, M: RawMutex> GameSession<'a, M> {
    pub const fn new(watcher: &'a InputWatcher<M>) -> Self {
        Self {
            active: AtomicBool::new(false),
            flap_pending: AtomicBool::new(false),
            started: Signal::new(),
            watcher,
        }
    }

    /// Start ticking and listening to the button. Returns `false` if the
    /// game is already running.
    pub fn start(&self) -> bool {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.flap_pending.store(false, Ordering::Release);
        self.watcher.start_listening();
        self.started.signal(());
        info!("game started");
        true
    }

    /// Stop ticking and listening. The tick loop notices on its next tick.
    /// Returns `false` if the game was not running.
    pub fn stop(&self) -> bool {
        if self
            .active
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.watcher.stop_listening();
        info!("game stopped");
        true
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Queue a flap for the next tick. Ignored while stopped.
    pub fn request_flap(&self) {
        if self.is_active() {
            self.flap_pending.store(true, Ordering::Release);
        }
    }

    /// Consume the queued flap, if any.
    pub fn take_flap(&self) -> bool {
        self.flap_pending.swap(false, Ordering::AcqRel)
    }

    pub async fn wait_started(&self) {
        self.started.wait().await
    }

    /// Consume a start that arrived while the tick loop was still running,
    /// i.e. a `stop` followed by a `start` within one tick.
    pub fn take_restart(&self) -> bool {
        self.started.try_take().is_some()
    }
}
