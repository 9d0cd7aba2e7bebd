//! Cancellable status poll loop.
//!
//! One task per processing job: sleep, check cancellation, query `/status`,
//! check cancellation again (a response that lands after teardown is simply
//! dropped), deliver the tick. Because the next sleep only starts after the
//! previous request resolved, at most one status request is ever in flight.

use std::cell::Cell;
use std::rc::Rc;

use common::requests::StatusResponse;
use gloo_timers::future::TimeoutFuture;
use yew::platform::spawn_local;

use crate::api;

pub const POLL_INTERVAL_MS: u32 = 2_000;

/// Cancellation token for a running poll loop.
///
/// The hosting view keeps the handle and cancels it when the machine says to
/// stop, when a new upload replaces the job, or when the view is torn down.
/// Cancelling is idempotent; clones observe the same token.
#[derive(Clone)]
pub struct PollHandle {
    cancelled: Rc<Cell<bool>>,
}

impl PollHandle {
    pub fn new() -> Self {
        PollHandle {
            cancelled: Rc::new(Cell::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Spawns the poll loop on the current-thread executor. Each settled status
/// request is handed to `on_tick` as an explicit `Result`; the loop itself
/// never interprets the outcome, that is the transition function's job.
pub fn start<F>(handle: &PollHandle, email: String, on_tick: F)
where
    F: Fn(Result<StatusResponse, String>) + 'static,
{
    let cancelled = handle.cancelled.clone();
    spawn_local(async move {
        loop {
            TimeoutFuture::new(POLL_INTERVAL_MS).await;
            if cancelled.get() {
                break;
            }
            let result = api::fetch_status(&email).await;
            // Late-response guard: never deliver into a torn-down or
            // already-settled view.
            if cancelled.get() {
                break;
            }
            on_tick(result);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_shared_and_idempotent() {
        let handle = PollHandle::new();
        let observer = handle.clone();
        assert!(!observer.is_cancelled());

        handle.cancel();
        handle.cancel();
        assert!(observer.is_cancelled());
    }
}
