//! Streaming channel sessions.
//!
//! A [`StreamSession`] owns one long-lived event-stream connection. While
//! open it can emit an initial envelope frame, a single delayed completion
//! notification, or periodic heartbeats. Closing the session (explicit
//! completion, client disconnect, or server shutdown) cancels every pending
//! timer; a closed session never emits another frame.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::core::config::StreamingConfig;

/// Observable session state. Sessions start `Open` (the `Idle` phase ends
/// when [`StreamSession::open`] hands out the channel) and end `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Frames may still be emitted.
    Open,
    /// No further frames will be emitted; timers are cancelled.
    Closed,
}

/// One open streaming connection.
///
/// The transport holds the receiving end of the frame channel; dropping it
/// (client disconnect) closes the session on the next send attempt.
#[derive(Debug, Clone)]
pub struct StreamSession {
    tx: mpsc::Sender<Value>,
    cancel: CancellationToken,
    heartbeat_interval: Duration,
    completion_delay: Duration,
}

impl StreamSession {
    /// Open a session, returning it together with the frame receiver the
    /// transport turns into the response stream.
    pub fn open(config: &StreamingConfig) -> (Self, mpsc::Receiver<Value>) {
        let (tx, rx) = mpsc::channel(16);
        let session = Self {
            tx,
            cancel: CancellationToken::new(),
            heartbeat_interval: config.heartbeat_interval(),
            completion_delay: config.completion_delay(),
        };
        (session, rx)
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        if self.cancel.is_cancelled() {
            SessionState::Closed
        } else {
            SessionState::Open
        }
    }

    /// Whether the session has been closed.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Close the session, cancelling all pending timers. Idempotent.
    pub fn close(&self) {
        if !self.cancel.is_cancelled() {
            debug!("Closing stream session");
            self.cancel.cancel();
        }
    }

    /// Emit a frame on the channel.
    ///
    /// Returns `false` without sending if the session is closed; a send
    /// failure means the client disconnected and closes the session.
    pub async fn send(&self, frame: Value) -> bool {
        if self.is_closed() {
            return false;
        }
        match self.tx.send(frame).await {
            Ok(()) => true,
            Err(_) => {
                debug!("Stream receiver dropped; closing session");
                self.close();
                false
            }
        }
    }

    /// Schedule the single delayed completion notification.
    ///
    /// After the configured delay the frame is emitted and the session
    /// closes. Closing the session first cancels the timer and the frame is
    /// never sent.
    pub fn spawn_completion(&self, frame: Value) {
        let session = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = session.cancel.cancelled() => {
                    trace!("Completion timer cancelled before firing");
                }
                () = tokio::time::sleep(session.completion_delay) => {
                    let _ = session.send(frame).await;
                }
            }
            session.close();
        });
    }

    /// Emit the given frame every heartbeat interval until the session
    /// closes. The first heartbeat fires one full interval after the call.
    pub fn spawn_heartbeat(&self, frame: Value) {
        let session = self.clone();
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + session.heartbeat_interval;
            let mut interval = tokio::time::interval_at(start, session.heartbeat_interval);
            loop {
                tokio::select! {
                    () = session.cancel.cancelled() => break,
                    _ = interval.tick() => {
                        if !session.send(frame.clone()).await {
                            break;
                        }
                    }
                }
            }
            trace!("Heartbeat task finished");
        });
    }
}
