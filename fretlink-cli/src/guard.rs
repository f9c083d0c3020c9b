use fretlink_client::{SessionEvent, SessionHandle};
use std::ops::Deref;
use tokio::task::JoinHandle;
use tracing::debug;

/// Aborts a background task when dropped.
pub struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> AbortOnDrop<T> {
    pub fn new(task: JoinHandle<T>) -> Self {
        Self(task)
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A joined session plus the task printing its events.
///
/// Dropping it stops the printer and disconnects the session, so every early
/// return and Ctrl-C tears the peer connection down.
pub struct LiveSession {
    handle: SessionHandle,
    _printer: AbortOnDrop<()>,
}

impl LiveSession {
    pub fn new(handle: SessionHandle, printer: JoinHandle<()>) -> Self {
        Self {
            handle,
            _printer: AbortOnDrop::new(printer),
        }
    }

    /// Resolves once the session has closed for good.
    pub async fn closed(&self) {
        let mut state = self.handle.watch_state();
        let _ = state.wait_for(|s| s.is_terminal()).await;
    }

    /// Disconnects and waits for the teardown to finish.
    pub async fn close(self) {
        debug!("Closing session for room {}", self.handle.room_id());
        self.handle.disconnect().await;
    }
}

impl Deref for LiveSession {
    type Target = SessionHandle;

    fn deref(&self) -> &SessionHandle {
        &self.handle
    }
}

/// Whether `event` is worth a line on the terminal.
pub fn is_notable(event: &SessionEvent) -> bool {
    !matches!(
        event,
        SessionEvent::StateChanged(_) | SessionEvent::Message(_)
    )
}
