//! Wall-clock driver for a [`SentinelSession`].
//!
//! One virtual time unit is mapped to `tick_millis` of real time. The session
//! moves into a spawned task that owns it exclusively; consumers read
//! snapshots from a `watch` channel and steer the task over a control channel.

use std::time::Duration;

use log::debug;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant};

use crate::session::SentinelSession;
use crate::snapshot::FleetSnapshot;

#[derive(Debug, Clone, Copy)]
enum Control {
    Stop,
    Shutdown,
}

/// Handle to a session running on the tokio runtime.
#[derive(Debug)]
pub struct RealtimeHandle {
    snapshots: watch::Receiver<FleetSnapshot>,
    control: mpsc::UnboundedSender<Control>,
    task: JoinHandle<SentinelSession>,
}

/// Start `session` and drive it in real time on a spawned task.
///
/// Must be called from within a tokio runtime.
#[must_use]
pub fn spawn_realtime(mut session: SentinelSession) -> RealtimeHandle {
    let period = Duration::from_millis(session.config().tick_millis.max(1));
    let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());
    let (control_tx, mut control_rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        session.start();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        let mut published = session.revision();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    session.advance_by(1);
                    if session.revision() != published {
                        published = session.revision();
                        snapshot_tx.send_replace(session.snapshot());
                    }
                }
                control = control_rx.recv() => match control {
                    Some(Control::Stop) => {
                        session.stop();
                    }
                    Some(Control::Shutdown) | None => break,
                },
            }
        }

        debug!("realtime driver exiting at t={}", session.now());
        session.stop();
        session
    });

    RealtimeHandle {
        snapshots: snapshot_rx,
        control: control_tx,
        task,
    }
}

impl RealtimeHandle {
    /// New receiver that wakes on every published change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FleetSnapshot> {
        self.snapshots.clone()
    }

    /// Most recently published snapshot.
    #[must_use]
    pub fn latest(&self) -> FleetSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Stop generating events; queued heals keep firing on schedule.
    /// Safe to call repeatedly.
    pub fn stop(&self) {
        // A closed channel means the task already exited.
        let _ = self.control.send(Control::Stop);
    }

    /// End the driver task and take the session back.
    ///
    /// # Errors
    ///
    /// Returns the `JoinError` if the driver task panicked or was cancelled.
    pub async fn shutdown(self) -> Result<SentinelSession, JoinError> {
        let _ = self.control.send(Control::Shutdown);
        self.task.await
    }
}
