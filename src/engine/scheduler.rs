// Delayed and repeating timers driven by the game tick
//
// Timers carry a payload instead of a closure. The owner advances the
// queue once per tick and dispatches each due payload itself, so timer
// handlers run on the tick thread in a deterministic order.

use std::time::Duration;

/// Smallest interval a repeating timer may use
const MIN_REPEAT_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Something that can run payloads later
pub trait Scheduler<T> {
    /// Fire `payload` once after `delay`
    fn schedule_once(&mut self, delay: Duration, payload: T) -> TimerHandle;

    /// Fire `payload` every `interval` until cancelled
    fn schedule_repeating(&mut self, interval: Duration, payload: T) -> TimerHandle;

    /// Cancel a timer; returns false if it already fired or was cancelled
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Current scheduler time
    fn now(&self) -> Duration;
}

#[derive(Debug)]
struct Timer<T> {
    id: u64,
    due: Duration,
    interval: Option<Duration>,
    payload: T,
}

/// Timer queue advanced by the game loop
#[derive(Debug)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer<T>>,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            timers: Vec::new(),
        }
    }

    /// Move the clock forward
    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;
    }

    /// Check if a timer is still pending
    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.id == handle.0)
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Check if no timers are pending
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Cancel every pending timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    fn push(&mut self, delay: Duration, interval: Option<Duration>, payload: T) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due: self.now + delay,
            interval,
            payload,
        });
        TimerHandle(id)
    }
}

impl<T: Clone> TimerQueue<T> {
    /// Take the next due payload, earliest first, ties in scheduling order
    ///
    /// Call repeatedly until it returns `None`; timers scheduled while
    /// handling a payload fire in the same pass if they are already due.
    pub fn pop_due(&mut self) -> Option<T> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= self.now)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;

        match self.timers[index].interval {
            Some(interval) => {
                let timer = &mut self.timers[index];
                timer.due += interval;
                Some(timer.payload.clone())
            }
            None => Some(self.timers.swap_remove(index).payload),
        }
    }
}

impl<T> Scheduler<T> for TimerQueue<T> {
    fn schedule_once(&mut self, delay: Duration, payload: T) -> TimerHandle {
        self.push(delay, None, payload)
    }

    fn schedule_repeating(&mut self, interval: Duration, payload: T) -> TimerHandle {
        let interval = interval.max(MIN_REPEAT_INTERVAL);
        self.push(interval, Some(interval), payload)
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != handle.0);
        self.timers.len() != before
    }

    fn now(&self) -> Duration {
        self.now
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
