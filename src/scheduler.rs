//! On-demand frame scheduling
//!
//! Bridges "something changed, redraw please" (any call site, any rate) and
//! the host's once-per-refresh callback. Any number of
//! [`FrameScheduler::request_frame`] calls between two refreshes collapse to
//! a single host registration, and the render loop pulls timestamps from a
//! [`Frames`] stream with plain `while let` control flow.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`). Only one consumer
//! may await frames at a time: the scheduler keeps a single waker, so a
//! second consumer takes resumption away from the first (with a warning).

use std::cell::RefCell;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll, Waker};

use futures::Stream;

/// Handle returned by the host for a registered callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub i32);

/// Callback handed to the host, invoked with the frame timestamp (ms)
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// The host's per-refresh notification facility
///
/// Implementations must not invoke the callback before `schedule` returns.
/// `schedule` returns `None` when the host could not register the callback,
/// which is then dropped unrun.
pub trait FrameHost {
    fn schedule(&self, callback: FrameCallback) -> Option<FrameToken>;
    fn cancel(&self, token: FrameToken);
}

#[derive(Debug, Default)]
struct SchedulerState {
    /// Outstanding registration and its generation
    pending: Option<(FrameToken, u64)>,
    generation: u64,
    destroyed: bool,
    /// Consumer suspended on the next frame
    waiter: Option<Waker>,
    /// Timestamp handed to the waiter but not yet consumed
    delivered: Option<f64>,
}

/// Coalescing scheduler over a [`FrameHost`]
///
/// Cloning yields another handle to the same scheduler.
#[derive(Clone)]
pub struct FrameScheduler {
    state: Rc<RefCell<SchedulerState>>,
    host: Rc<dyn FrameHost>,
}

impl std::fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("state", &self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl FrameScheduler {
    pub fn new(host: Rc<dyn FrameHost>) -> Self {
        Self {
            state: Rc::new(RefCell::new(SchedulerState::default())),
            host,
        }
    }

    /// Make sure one host callback is registered
    ///
    /// No-op while a frame is already pending or after shutdown. Returns
    /// whether a new registration was made; a refused registration leaves
    /// nothing pending, so the next request tries again.
    pub fn request_frame(&self) -> bool {
        let generation = {
            let mut state = self.state.borrow_mut();
            if state.destroyed || state.pending.is_some() {
                return false;
            }
            state.generation += 1;
            state.generation
        };

        let weak = Rc::downgrade(&self.state);
        let Some(token) = self
            .host
            .schedule(Box::new(move |time| fire(&weak, generation, time)))
        else {
            log::warn!("Frame host refused the request");
            return false;
        };
        self.state.borrow_mut().pending = Some((token, generation));
        log::trace!("Frame requested ({:?})", token);
        true
    }

    /// Unregister the pending callback, if any
    pub fn cancel_pending(&self) {
        let pending = self.state.borrow_mut().pending.take();
        if let Some((token, _)) = pending {
            self.host.cancel(token);
            log::trace!("Frame cancelled ({:?})", token);
        }
    }

    /// Stop for good
    ///
    /// Later requests are ignored and a consumer awaiting a frame is woken
    /// to find its stream ended.
    pub fn shutdown(&self) {
        self.cancel_pending();
        let waiter = {
            let mut state = self.state.borrow_mut();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            state.delivered = None;
            state.waiter.take()
        };
        if let Some(waker) = waiter {
            waker.wake();
        }
        log::info!("Frame scheduler shut down");
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }

    /// Render-every-frame sequence: each poll requests the next frame itself
    pub fn frames(&self) -> Frames {
        Frames {
            scheduler: self.clone(),
            request_each: true,
        }
    }

    /// Sequence of frames requested elsewhere via [`request_frame`]
    ///
    /// This is the on-demand render loop: it sleeps until someone asks for
    /// a redraw.
    ///
    /// [`request_frame`]: FrameScheduler::request_frame
    pub fn on_demand(&self) -> Frames {
        Frames {
            scheduler: self.clone(),
            request_each: false,
        }
    }
}

/// Host callback body
fn fire(state: &Weak<RefCell<SchedulerState>>, generation: u64, time: f64) {
    let Some(state) = state.upgrade() else {
        return;
    };

    let waiter = {
        let mut state = state.borrow_mut();
        // Cancelled or superseded registration
        if state.pending.map(|(_, current)| current) != Some(generation) {
            return;
        }
        state.pending = None;
        if state.destroyed {
            return;
        }
        let waiter = state.waiter.take();
        if waiter.is_some() {
            state.delivered = Some(time);
        }
        waiter
    };

    match waiter {
        Some(waker) => waker.wake(),
        None => log::trace!("Frame at {:.1} had no waiting consumer", time),
    }
}

/// Stream of frame timestamps (ms), ends after shutdown
///
/// At most one timestamp is buffered. Dropping the stream and calling
/// [`FrameScheduler::frames`] again starts a fresh sequence.
#[must_use = "streams do nothing unless polled"]
pub struct Frames {
    scheduler: FrameScheduler,
    request_each: bool,
}

impl Stream for Frames {
    type Item = f64;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<f64>> {
        let this = self.get_mut();
        {
            let mut state = this.scheduler.state.borrow_mut();
            if state.destroyed {
                return Poll::Ready(None);
            }
            if let Some(time) = state.delivered.take() {
                return Poll::Ready(Some(time));
            }
            if let Some(previous) = &state.waiter
                && !previous.will_wake(cx.waker())
            {
                log::warn!("Another consumer is awaiting frames; it will not be resumed");
            }
            state.waiter = Some(cx.waker().clone());
        }

        if this.request_each {
            this.scheduler.request_frame();
        }
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ManualHost;
    use std::cell::Cell;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::StreamExt;
    use futures::task::{ArcWake, noop_waker, waker};

    fn poll(frames: &mut Frames) -> Poll<Option<f64>> {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        frames.poll_next_unpin(&mut cx)
    }

    fn setup() -> (Rc<ManualHost>, FrameScheduler) {
        let host = ManualHost::new();
        let scheduler = FrameScheduler::new(host.clone());
        (host, scheduler)
    }

    #[test]
    fn test_burst_collapses_to_one_frame() {
        let (host, scheduler) = setup();
        let mut frames = scheduler.on_demand();
        assert_eq!(poll(&mut frames), Poll::Pending);

        assert!(scheduler.request_frame());
        for _ in 0..9 {
            assert!(!scheduler.request_frame());
        }
        assert_eq!(host.scheduled_count(), 1);
        assert_eq!(host.queued(), 1);

        assert_eq!(host.fire(16.0), 1);
        assert!(!scheduler.is_pending());
        assert_eq!(poll(&mut frames), Poll::Ready(Some(16.0)));
        assert_eq!(poll(&mut frames), Poll::Pending);
    }

    #[test]
    fn test_on_demand_does_not_request() {
        let (host, scheduler) = setup();
        let mut frames = scheduler.on_demand();
        assert_eq!(poll(&mut frames), Poll::Pending);
        assert_eq!(poll(&mut frames), Poll::Pending);
        assert_eq!(host.scheduled_count(), 0);
    }

    #[test]
    fn test_frames_requests_each_step() {
        let (host, scheduler) = setup();
        let mut frames = scheduler.frames();
        assert_eq!(poll(&mut frames), Poll::Pending);
        assert_eq!(host.queued(), 1);

        host.fire(10.0);
        assert_eq!(poll(&mut frames), Poll::Ready(Some(10.0)));
        assert_eq!(poll(&mut frames), Poll::Pending);
        host.fire(26.0);
        assert_eq!(poll(&mut frames), Poll::Ready(Some(26.0)));
        assert_eq!(host.scheduled_count(), 2);
    }

    #[test]
    fn test_frame_without_consumer_is_dropped() {
        let (host, scheduler) = setup();
        scheduler.request_frame();
        host.fire(5.0);
        let mut frames = scheduler.on_demand();
        assert_eq!(poll(&mut frames), Poll::Pending);
    }

    #[test]
    fn test_cancel_pending() {
        let (host, scheduler) = setup();
        scheduler.cancel_pending();
        assert_eq!(host.cancelled_count(), 0);

        scheduler.request_frame();
        scheduler.cancel_pending();
        scheduler.cancel_pending();
        assert_eq!(host.cancelled_count(), 1);
        assert_eq!(host.queued(), 0);
        assert!(!scheduler.is_pending());

        // A new request works after cancelling
        assert!(scheduler.request_frame());
    }

    #[test]
    fn test_shutdown_blocks_requests() {
        let (host, scheduler) = setup();
        scheduler.request_frame();
        scheduler.shutdown();
        assert_eq!(host.queued(), 0);
        assert!(scheduler.is_destroyed());

        assert!(!scheduler.request_frame());
        assert_eq!(host.scheduled_count(), 1);
        assert_eq!(host.queued(), 0);
    }

    #[test]
    fn test_shutdown_ends_waiting_stream() {
        let (_host, scheduler) = setup();
        let mut frames = scheduler.frames();
        assert_eq!(poll(&mut frames), Poll::Pending);
        scheduler.shutdown();
        assert_eq!(poll(&mut frames), Poll::Ready(None));
        // Re-entering from the top stays ended
        assert_eq!(poll(&mut scheduler.frames()), Poll::Ready(None));
    }

    /// Host that ignores cancellation, so stale callbacks still fire
    #[derive(Default)]
    struct LeakyHost {
        queue: RefCell<Vec<FrameCallback>>,
    }

    impl FrameHost for LeakyHost {
        fn schedule(&self, callback: FrameCallback) -> Option<FrameToken> {
            let mut queue = self.queue.borrow_mut();
            queue.push(callback);
            Some(FrameToken(queue.len() as i32))
        }

        fn cancel(&self, _token: FrameToken) {}
    }

    #[test]
    fn test_stale_callback_cannot_resume() {
        let host = Rc::new(LeakyHost::default());
        let scheduler = FrameScheduler::new(host.clone());
        let mut frames = scheduler.on_demand();
        assert_eq!(poll(&mut frames), Poll::Pending);

        scheduler.request_frame();
        scheduler.cancel_pending();
        scheduler.request_frame();

        let callbacks = std::mem::take(&mut *host.queue.borrow_mut());
        let mut callbacks = callbacks.into_iter();
        let stale = callbacks.next().unwrap();
        let live = callbacks.next().unwrap();

        stale(1.0);
        assert!(scheduler.is_pending());
        assert_eq!(poll(&mut frames), Poll::Pending);

        live(2.0);
        assert_eq!(poll(&mut frames), Poll::Ready(Some(2.0)));
    }

    #[test]
    fn test_late_callback_after_shutdown_is_ignored() {
        let host = Rc::new(LeakyHost::default());
        let scheduler = FrameScheduler::new(host.clone());
        let mut frames = scheduler.on_demand();
        assert_eq!(poll(&mut frames), Poll::Pending);
        scheduler.request_frame();
        scheduler.shutdown();

        let callbacks = std::mem::take(&mut *host.queue.borrow_mut());
        for callback in callbacks {
            callback(3.0);
        }
        assert_eq!(poll(&mut frames), Poll::Ready(None));
    }

    /// Host that refuses registrations until told otherwise
    #[derive(Default)]
    struct FlakyHost {
        refuse: Cell<bool>,
        inner: ManualHost,
    }

    impl FrameHost for FlakyHost {
        fn schedule(&self, callback: FrameCallback) -> Option<FrameToken> {
            if self.refuse.get() {
                return None;
            }
            self.inner.schedule(callback)
        }

        fn cancel(&self, token: FrameToken) {
            self.inner.cancel(token);
        }
    }

    #[test]
    fn test_refused_registration_is_retried() {
        let host = Rc::new(FlakyHost::default());
        host.refuse.set(true);
        let scheduler = FrameScheduler::new(host.clone());
        let mut frames = scheduler.on_demand();
        assert_eq!(poll(&mut frames), Poll::Pending);

        assert!(!scheduler.request_frame());
        assert!(!scheduler.is_pending());
        assert!(!scheduler.request_frame());

        host.refuse.set(false);
        assert!(scheduler.request_frame());
        assert!(scheduler.is_pending());
        assert_eq!(host.inner.fire(12.0), 1);
        assert_eq!(poll(&mut frames), Poll::Ready(Some(12.0)));
    }

    /// Waker that counts how often it was woken
    #[derive(Default)]
    struct CountingWaker(AtomicUsize);

    impl ArcWake for CountingWaker {
        fn wake_by_ref(arc_self: &Arc<Self>) {
            arc_self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_second_consumer_takes_over() {
        let (host, scheduler) = setup();
        let first_count = Arc::new(CountingWaker::default());
        let second_count = Arc::new(CountingWaker::default());
        let first_waker = waker(first_count.clone());
        let second_waker = waker(second_count.clone());
        let mut first_cx = Context::from_waker(&first_waker);
        let mut second_cx = Context::from_waker(&second_waker);

        let mut first = scheduler.on_demand();
        let mut second = scheduler.on_demand();
        assert_eq!(first.poll_next_unpin(&mut first_cx), Poll::Pending);
        assert_eq!(second.poll_next_unpin(&mut second_cx), Poll::Pending);

        scheduler.request_frame();
        host.fire(7.0);
        assert_eq!(first_count.0.load(Ordering::SeqCst), 0);
        assert_eq!(second_count.0.load(Ordering::SeqCst), 1);

        assert_eq!(second.poll_next_unpin(&mut second_cx), Poll::Ready(Some(7.0)));
        assert_eq!(first.poll_next_unpin(&mut first_cx), Poll::Pending);
    }

    #[test]
    fn test_loop_drains_with_local_pool() {
        use futures::executor::LocalPool;
        use futures::task::LocalSpawnExt;

        let (host, scheduler) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut pool = LocalPool::new();
        {
            let seen = seen.clone();
            let mut frames = scheduler.frames();
            pool.spawner()
                .spawn_local(async move {
                    while let Some(time) = frames.next().await {
                        seen.borrow_mut().push(time);
                    }
                })
                .unwrap();
        }

        pool.run_until_stalled();
        for time in [16.0, 32.0, 48.0] {
            host.fire(time);
            pool.run_until_stalled();
        }
        scheduler.shutdown();
        pool.run();

        assert_eq!(*seen.borrow(), vec![16.0, 32.0, 48.0]);
    }
}
