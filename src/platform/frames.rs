//! Frame Port - Next-frame scheduling hook
//!
//! The single place rendering is deferred. Components hand the hook a
//! callback to run "before the next repaint"; coalescing on top of this
//! is the component scheduler's job, the hook just queues.

use std::cell::RefCell;
use std::rc::Rc;

/// Callback queued for the next frame.
pub type FrameCallback = Box<dyn FnOnce()>;

/// "Run before next repaint" hook, the shape of `requestAnimationFrame`.
pub trait FrameHook {
    /// Queue `callback` for the next frame. Never runs it synchronously.
    fn request_frame(&self, callback: FrameCallback);
}

// =============================================================================
// Manual pump double
// =============================================================================

/// Manually pumped [`FrameHook`] double.
///
/// [`run_frame`](ManualFrames::run_frame) drains only the callbacks that
/// were queued before the call; callbacks queued *during* the flush land
/// in the next frame. That boundary is what defines a scheduling window
/// in tests.
#[derive(Default)]
pub struct ManualFrames {
    queue: RefCell<Vec<FrameCallback>>,
}

impl ManualFrames {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run one frame: drain and invoke the currently queued callbacks.
    /// Returns how many callbacks ran.
    pub fn run_frame(&self) -> usize {
        let drained: Vec<FrameCallback> = self.queue.borrow_mut().drain(..).collect();
        let count = drained.len();
        for callback in drained {
            callback();
        }
        count
    }

    /// Pump frames until the queue stays empty (bounded, for tests).
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        // A runaway schedule-from-render loop would otherwise spin forever.
        for _ in 0..64 {
            let ran = self.run_frame();
            if ran == 0 {
                break;
            }
            total += ran;
        }
        total
    }
}

impl FrameHook for ManualFrames {
    fn request_frame(&self, callback: FrameCallback) {
        self.queue.borrow_mut().push(callback);
    }
}

// =============================================================================
// Tests
// =============================================================================
