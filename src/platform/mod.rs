//! Platform frame hosts
//!
//! - `ManualHost`: frames fired by hand (headless runs, tests)
//! - `web::RafHost`: `requestAnimationFrame` in the browser

#[cfg(target_arch = "wasm32")]
pub mod web;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::scheduler::{FrameCallback, FrameHost, FrameToken};

/// Frame host driven explicitly through [`ManualHost::fire`]
#[derive(Default)]
pub struct ManualHost {
    next_token: Cell<i32>,
    queue: RefCell<Vec<(FrameToken, FrameCallback)>>,
    scheduled: Cell<usize>,
    cancelled: Cell<usize>,
}

impl ManualHost {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Run every registered callback with `time`, returning how many ran
    ///
    /// Callbacks registered while firing wait for the next call.
    pub fn fire(&self, time: f64) -> usize {
        let batch = std::mem::take(&mut *self.queue.borrow_mut());
        let count = batch.len();
        for (_, callback) in batch {
            callback(time);
        }
        count
    }

    /// Callbacks waiting for the next `fire`
    pub fn queued(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Total registrations ever made
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.get()
    }

    /// Total registrations withdrawn before firing
    pub fn cancelled_count(&self) -> usize {
        self.cancelled.get()
    }
}

impl FrameHost for ManualHost {
    fn schedule(&self, callback: FrameCallback) -> Option<FrameToken> {
        let token = FrameToken(self.next_token.get() + 1);
        self.next_token.set(token.0);
        self.scheduled.set(self.scheduled.get() + 1);
        self.queue.borrow_mut().push((token, callback));
        Some(token)
    }

    fn cancel(&self, token: FrameToken) {
        let mut queue = self.queue.borrow_mut();
        let before = queue.len();
        queue.retain(|(t, _)| *t != token);
        if queue.len() != before {
            self.cancelled.set(self.cancelled.get() + 1);
        }
    }
}
