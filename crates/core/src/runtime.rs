//! Single-threaded task and timer primitives
//!
//! Natively these run on a tokio `LocalSet`; in the browser they run on the
//! JS event loop. Every timer is an abortable task owned by a [`TimerHandle`].

use futures::future::{AbortHandle, Abortable};
use std::future::Future;
use std::time::Duration;

/// Spawn a `!Send` task on the current thread.
///
/// # Panics
///
/// Natively, panics when called outside a tokio `LocalSet`.
pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::task::spawn_local(future);
    }

    #[cfg(target_arch = "wasm32")]
    wasm_bindgen_futures::spawn_local(future);
}

/// Wait for `duration`
pub async fn sleep(duration: Duration) {
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;

    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(duration).await;
}

/// Owner of a pending timer; dropping it stops the timer
#[derive(Debug)]
pub struct TimerHandle {
    abort: AbortHandle,
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// Run the future produced by `task` once, after `delay`
pub fn spawn_timer<F, Fut>(delay: Duration, task: F) -> TimerHandle
where
    F: FnOnce() -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    let (abort, registration) = AbortHandle::new_pair();
    let timer = async move {
        sleep(delay).await;
        task().await;
    };
    spawn_local(async move {
        let _ = Abortable::new(timer, registration).await;
    });
    TimerHandle { abort }
}

/// Call `tick` every `period` until the handle is dropped
pub fn spawn_interval<F>(period: Duration, mut tick: F) -> TimerHandle
where
    F: FnMut() + 'static,
{
    let (abort, registration) = AbortHandle::new_pair();
    let ticker = async move {
        loop {
            sleep(period).await;
            tick();
        }
    };
    spawn_local(async move {
        let _ = Abortable::new(ticker, registration).await;
    });
    TimerHandle { abort }
}
