//! Deterministic timer queue that stands in for timeouts and intervals.
//!
//! Time only moves when the owner says so. `pop_due` hands back one expired timer at
//! a time and moves the queue clock to that timer's deadline, so anything scheduled
//! while handling it is measured from the moment it fired, not from the end of the
//! frame that noticed it.

use std::time::Duration;

/// Handle for cancelling a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry<E> {
    id: TimerId,
    due: Duration,
    /// Set for repeating timers.
    interval: Option<Duration>,
    event: E,
}

/// A timer that reached its deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<E> {
    pub id: TimerId,
    /// Deadline the timer fired at.
    pub at: Duration,
    pub event: E,
}

#[derive(Debug, Clone)]
pub struct Timers<E> {
    now: Duration,
    next_id: u64,
    pending: Vec<Entry<E>>,
}

impl<E: Clone> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> Timers<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Current queue time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `event` once, `delay` after the current queue time.
    pub fn after(&mut self, delay: Duration, event: E) -> TimerId {
        self.schedule(self.now + delay, None, event)
    }

    /// Fire `event` every `interval`, first one `interval` from now. Runs until cancelled.
    pub fn every(&mut self, interval: Duration, event: E) -> TimerId {
        // A zero interval would fire forever within a single pop loop.
        if interval.is_zero() {
            log::warn!("Zero timer interval clamped to 1ms");
        }
        let interval = interval.max(Duration::from_millis(1));
        self.schedule(self.now + interval, Some(interval), event)
    }

    fn schedule(&mut self, due: Duration, interval: Option<Duration>, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Entry {
            id,
            due,
            interval,
            event,
        });
        id
    }

    /// Remove a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|entry| entry.id != id);
        self.pending.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pop the earliest timer due at or before `until`.
    ///
    /// Ties fire in scheduling order. Repeating timers are rescheduled one interval
    /// after the deadline they just hit.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired<E>> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= until)
            .min_by_key(|(_, entry)| (entry.due, entry.id))
            .map(|(index, _)| index)?;

        let due = self.pending[index].due;
        self.now = self.now.max(due);

        let fired = match self.pending[index].interval {
            Some(interval) => {
                let entry = &mut self.pending[index];
                entry.due += interval;
                Fired {
                    id: entry.id,
                    at: due,
                    event: entry.event.clone(),
                }
            }
            None => {
                let entry = self.pending.swap_remove(index);
                Fired {
                    id: entry.id,
                    at: due,
                    event: entry.event,
                }
            }
        };
        Some(fired)
    }

    /// Move the queue clock forward once every due timer has been popped.
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn drain(timers: &mut Timers<&'static str>, until: Duration) -> Vec<(u64, &'static str)> {
        let mut fired = Vec::new();
        while let Some(f) = timers.pop_due(until) {
            fired.push((f.at.as_millis() as u64, f.event));
        }
        timers.advance_to(until);
        fired
    }

    #[test]
    fn one_shot_fires_once_at_deadline() {
        let mut timers = Timers::new();
        timers.after(ms(3000), "loaded");
        assert!(drain(&mut timers, ms(2999)).is_empty());
        assert_eq!(drain(&mut timers, ms(3000)), vec![(3000, "loaded")]);
        assert!(drain(&mut timers, ms(9000)).is_empty());
        assert!(timers.is_empty());
    }

    #[test]
    fn interval_catches_up_across_a_long_frame() {
        let mut timers = Timers::new();
        timers.every(ms(100), "type");
        let fired = drain(&mut timers, ms(350));
        assert_eq!(fired, vec![(100, "type"), (200, "type"), (300, "type")]);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn events_fire_in_deadline_order_then_schedule_order() {
        let mut timers = Timers::new();
        timers.after(ms(200), "b");
        timers.after(ms(100), "a");
        timers.after(ms(200), "c");
        let fired: Vec<_> = drain(&mut timers, ms(200)).into_iter().map(|(_, e)| e).collect();
        assert_eq!(fired, vec!["a", "b", "c"]);
    }

    #[test]
    fn timers_scheduled_while_handling_start_from_fire_time() {
        let mut timers = Timers::new();
        timers.after(ms(100), "first");
        let fired = timers.pop_due(ms(1000)).unwrap();
        assert_eq!(fired.at, ms(100));
        timers.after(ms(50), "second");
        let next = timers.pop_due(ms(1000)).unwrap();
        assert_eq!(next.at, ms(150));
    }

    #[test]
    fn cancelled_interval_stops_firing() {
        let mut timers = Timers::new();
        let id = timers.every(ms(10), "tick");
        assert_eq!(drain(&mut timers, ms(25)).len(), 2);
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(!timers.is_pending(id));
        assert!(drain(&mut timers, ms(1000)).is_empty());
    }
}
