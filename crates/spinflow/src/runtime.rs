//! Cooperative animator loops
//!
//! Two tokio tasks share one [`VolumeAnimator`]: the sampling loop ticks at
//! the display frame rate and feeds snapshots through the animator, and the
//! decay loop ages ripples on its own fixed 16 ms cadence. The decay loop
//! parks while no ripples are alive and is woken by the first peak.
//!
//! Attaching a source cancels any pending ticks for BOTH loops and waits for
//! them to stop before resetting state, so a stale callback can never mutate
//! state that belongs to a source that no longer exists.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use spinflow_core::ripple::DECAY_TICK;
use spinflow_core::{SpectrumSource, VisualFrame, VolumeAnimator};

/// Owner of the animator state and the two loop tasks.
pub struct AnimatorRuntime {
    animator: Arc<Mutex<VolumeAnimator>>,
    frames: broadcast::Sender<VisualFrame>,
    ripple_wake: Arc<Notify>,
    frame_interval: Duration,
    sampling: Option<JoinHandle<()>>,
    decay: Option<JoinHandle<()>>,
}

impl AnimatorRuntime {
    /// Create a runtime around an animator. No loops run until a source is
    /// attached.
    pub fn new(
        animator: VolumeAnimator,
        frame_rate: u32,
        frames: broadcast::Sender<VisualFrame>,
    ) -> Self {
        Self {
            animator: Arc::new(Mutex::new(animator)),
            frames,
            ripple_wake: Arc::new(Notify::new()),
            frame_interval: Duration::from_secs(1) / frame_rate.max(1),
            sampling: None,
            decay: None,
        }
    }

    /// Attach a new audio source, replacing any current one.
    ///
    /// Ordering is the correctness-critical part: cancel pending ticks
    /// first, then reset, then start the fresh loops.
    pub async fn attach_source(&mut self, mut source: Box<dyn SpectrumSource>) {
        self.detach().await;
        self.animator.lock().reset();
        info!(bins = source.bin_count(), "audio source attached");

        let animator = Arc::clone(&self.animator);
        let frames = self.frames.clone();
        let wake = Arc::clone(&self.ripple_wake);
        let period = self.frame_interval;
        self.sampling = Some(tokio::spawn(async move {
            let mut bins = vec![0u8; source.bin_count()];
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                source.frequency_snapshot(&mut bins);
                let frame = {
                    let mut animator = animator.lock();
                    let frame = animator.ingest(&bins);
                    if animator.has_ripples() {
                        wake.notify_one();
                    }
                    frame
                };
                if let Some(frame) = frame {
                    // Nobody listening is fine; the feed is best-effort.
                    let _ = frames.send(frame);
                }
            }
        }));

        let animator = Arc::clone(&self.animator);
        let wake = Arc::clone(&self.ripple_wake);
        self.decay = Some(tokio::spawn(async move {
            let mut ticker = interval(DECAY_TICK);
            loop {
                while !animator.lock().has_ripples() {
                    wake.notified().await;
                    // Don't burst-replay the ticks that elapsed while
                    // parked.
                    ticker.reset();
                }
                ticker.tick().await;
                animator.lock().decay_ripples();
            }
        }));
    }

    /// Cancel both loops and wait for them to stop.
    pub async fn detach(&mut self) {
        let tasks = [self.sampling.take(), self.decay.take()];
        for task in tasks.into_iter().flatten() {
            task.abort();
            let _ = task.await;
        }
        debug!("animator loops stopped");
    }
}
