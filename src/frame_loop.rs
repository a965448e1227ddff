//! The display-refresh scheduler. Whoever owns the screen calls
//! [FrameScheduler::tick] once per refresh; views register a callback and
//! hold on to the returned [FrameHandle] for as long as they are visible.
//! Dropping the handle is the only way to unregister, so a torn-down view
//! can never be called again.
//!
//! Everything here is single-threaded: one loop, cooperative, no locks.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// What a frame callback is told about the frame it is running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    /// Index of this frame since the scheduler was created
    pub frame: u64,
    /// Time since the previous frame
    pub dt: Duration,
}

type FrameCallback = Box<dyn FnMut(FrameTick)>;

struct Registration {
    id: u64,
    // `None` only while the callback is being run
    callback: Option<FrameCallback>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    registrations: Vec<Registration>,
}

/// Drives registered frame callbacks. Each scheduler is independent; there
/// is no process-wide instance.
#[derive(Default)]
pub struct FrameScheduler {
    registry: Rc<RefCell<Registry>>,
    frame: u64,
    invocations: u64,
}

/// A live registration. Unregisters its callback when dropped.
#[must_use = "dropping the handle immediately unregisters the callback"]
pub struct FrameHandle {
    registry: Weak<RefCell<Registry>>,
    id: u64,
}

impl FrameScheduler {
    /// A scheduler with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` to run once per [FrameScheduler::tick], starting
    /// with the next one.
    pub fn register<F>(&self, callback: F) -> FrameHandle
    where
        F: FnMut(FrameTick) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.registrations.push(Registration {
            id,
            callback: Some(Box::new(callback)),
        });
        FrameHandle {
            registry: Rc::downgrade(&self.registry),
            id,
        }
    }

    /// Run one frame: call every callback that is registered when the tick
    /// starts and still registered when its turn comes. Returns how many ran.
    pub fn tick(&mut self, dt: Duration) -> usize {
        let tick = FrameTick {
            frame: self.frame,
            dt,
        };
        self.frame += 1;

        let ids: Vec<u64> = self
            .registry
            .borrow()
            .registrations
            .iter()
            .map(|r| r.id)
            .collect();

        let mut ran = 0;
        for id in ids {
            // The callback is taken out of the registry while it runs, so it
            // is free to register or drop handles itself.
            let callback = self
                .registry
                .borrow_mut()
                .registrations
                .iter_mut()
                .find(|r| r.id == id)
                .and_then(|r| r.callback.take());

            if let Some(mut callback) = callback {
                callback(tick);
                ran += 1;
                if let Some(r) = self
                    .registry
                    .borrow_mut()
                    .registrations
                    .iter_mut()
                    .find(|r| r.id == id)
                {
                    r.callback = Some(callback);
                }
            }
        }

        self.invocations += ran as u64;
        ran
    }

    /// Number of live registrations.
    pub fn active(&self) -> usize {
        self.registry.borrow().registrations.len()
    }

    /// Total callback invocations over the scheduler's lifetime.
    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    /// Frames ticked so far.
    pub fn frames(&self) -> u64 {
        self.frame
    }
}

impl FrameHandle {
    /// Whether the callback is still registered.
    pub fn is_registered(&self) -> bool {
        self.registry
            .upgrade()
            .map(|r| r.borrow().registrations.iter().any(|reg| reg.id == self.id))
            .unwrap_or(false)
    }
}

impl Drop for FrameHandle {
    fn drop(&mut self) {
        let Some(shared) = self.registry.upgrade() else {
            return;
        };
        // A callback dropping its own handle runs while the registry is not
        // borrowed, see `tick`.
        let removed = {
            let Ok(mut registry) = shared.try_borrow_mut() else {
                return;
            };
            let index = registry.registrations.iter().position(|r| r.id == self.id);
            let removed = index.map(|i| registry.registrations.remove(i));
            removed
        };
        // The callback may own handles of its own, which need the registry
        // released before they can unregister.
        drop(removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const FRAME: Duration = Duration::from_micros(16_667);

    #[test]
    fn registered_callback_runs_each_tick() {
        let mut scheduler = FrameScheduler::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let _handle = scheduler.register(move |_| c.set(c.get() + 1));

        for _ in 0..3 {
            assert_eq!(scheduler.tick(FRAME), 1);
        }
        assert_eq!(count.get(), 3);
        assert_eq!(scheduler.invocations(), 3);
    }

    #[test]
    fn dropping_handle_stops_callbacks() {
        let mut scheduler = FrameScheduler::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let handle = scheduler.register(move |_| c.set(c.get() + 1));

        scheduler.tick(FRAME);
        scheduler.tick(FRAME);
        drop(handle);
        assert_eq!(scheduler.active(), 0);

        for _ in 0..10 {
            assert_eq!(scheduler.tick(FRAME), 0);
        }
        assert_eq!(count.get(), 2);
        assert_eq!(scheduler.invocations(), 2);
        assert_eq!(scheduler.frames(), 12);
    }

    #[test]
    fn callback_can_cancel_itself() {
        let mut scheduler = FrameScheduler::new();
        let slot: Rc<RefCell<Option<FrameHandle>>> = Rc::new(RefCell::new(None));
        let count = Rc::new(Cell::new(0));

        let s = slot.clone();
        let c = count.clone();
        let handle = scheduler.register(move |tick| {
            c.set(c.get() + 1);
            if tick.frame == 1 {
                s.borrow_mut().take();
            }
        });
        *slot.borrow_mut() = Some(handle);

        for _ in 0..5 {
            scheduler.tick(FRAME);
        }
        assert_eq!(count.get(), 2);
        assert_eq!(scheduler.active(), 0);
    }

    #[test]
    fn callback_dropped_mid_tick_is_skipped() {
        let mut scheduler = FrameScheduler::new();
        let victim: Rc<RefCell<Option<FrameHandle>>> = Rc::new(RefCell::new(None));
        let victim_runs = Rc::new(Cell::new(0));

        let v = victim.clone();
        let _killer = scheduler.register(move |_| {
            v.borrow_mut().take();
        });
        let r = victim_runs.clone();
        *victim.borrow_mut() = Some(scheduler.register(move |_| r.set(r.get() + 1)));

        assert_eq!(scheduler.tick(FRAME), 1);
        assert_eq!(victim_runs.get(), 0);
    }

    #[test]
    fn handles_owned_by_a_dropped_callback_unregister() {
        let mut scheduler = FrameScheduler::new();
        let inner_runs = Rc::new(Cell::new(0));
        let r = inner_runs.clone();
        let inner = scheduler.register(move |_| r.set(r.get() + 1));
        let outer = scheduler.register(move |_| {
            let _owned = &inner;
        });
        assert_eq!(scheduler.active(), 2);

        drop(outer);
        assert_eq!(scheduler.active(), 0);
        assert_eq!(scheduler.tick(FRAME), 0);
        assert_eq!(inner_runs.get(), 0);
    }

    #[test]
    fn schedulers_are_independent() {
        let mut a = FrameScheduler::new();
        let b = FrameScheduler::new();
        let _ha = a.register(|_| {});
        let _hb = b.register(|_| {});
        assert_eq!(a.tick(FRAME), 1);
        assert_eq!(b.active(), 1);
        assert_eq!(b.invocations(), 0);
    }

    #[test]
    fn handle_outliving_scheduler_is_harmless() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.register(|_| {});
        assert!(handle.is_registered());
        drop(scheduler);
        assert!(!handle.is_registered());
        drop(handle);
    }

    #[test]
    fn ticks_report_frame_and_dt() {
        let mut scheduler = FrameScheduler::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _h = scheduler.register(move |tick| s.borrow_mut().push(tick));
        scheduler.tick(FRAME);
        scheduler.tick(FRAME * 2);
        assert_eq!(
            *seen.borrow(),
            vec![
                FrameTick { frame: 0, dt: FRAME },
                FrameTick {
                    frame: 1,
                    dt: FRAME * 2
                },
            ]
        );
    }
}
