// Deferred work for the gallery. Timers carry a TimerEvent instead of a closure so the
// controller can dispatch them against its own state when virtual time advances.

use crate::catalog::DestinationId;
use crate::display::Highlight;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    CardEntrance(DestinationId),
    BookingComplete(DestinationId),
    BookedMarkerExpired(DestinationId),
    FavoriteMarkerExpired(DestinationId),
    HighlightStart {
        id: DestinationId,
        highlight: Highlight,
    },
    HighlightEnd(DestinationId),
    HideNotification,
    DemoComplete,
}

// Schedule/cancel capability. Time is a monotonic offset from the scheduler's origin.
pub trait Scheduler {
    fn now(&self) -> Duration;

    fn schedule(&mut self, delay: Duration, event: TimerEvent) -> TimerHandle;

    // Returns false if the timer already fired or was cancelled
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    fn next_deadline(&self) -> Option<Duration>;

    // Removes the earliest timer due at or before `until` and moves the clock to its deadline
    fn pop_due(&mut self, until: Duration) -> Option<(TimerHandle, TimerEvent)>;

    // Moves the clock forward once no more timers are due before `until`
    fn settle(&mut self, until: Duration);

    fn pending(&self) -> usize;
}

// Manually driven clock. Nothing fires until someone calls pop_due.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Duration,
    next_id: u64,
    // (deadline, handle) keeps equal deadlines in scheduling order
    queue: BTreeMap<(Duration, TimerHandle), TimerEvent>,
    deadlines: HashMap<TimerHandle, Duration>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for VirtualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, delay: Duration, event: TimerEvent) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        let deadline = self.now + delay;
        self.queue.insert((deadline, handle), event);
        self.deadlines.insert(handle, deadline);
        tracing::trace!(?handle, ?event, ?deadline, "timer scheduled");
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.deadlines.remove(&handle) {
            Some(deadline) => {
                self.queue.remove(&(deadline, handle));
                tracing::trace!(?handle, "timer cancelled");
                true
            }
            None => false,
        }
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    fn pop_due(&mut self, until: Duration) -> Option<(TimerHandle, TimerEvent)> {
        let (deadline, handle) = *self.queue.keys().next()?;
        if deadline > until {
            return None;
        }
        let event = self.queue.remove(&(deadline, handle))?;
        self.deadlines.remove(&handle);
        if deadline > self.now {
            self.now = deadline;
        }
        Some((handle, event))
    }

    fn settle(&mut self, until: Duration) {
        if until > self.now {
            self.now = until;
        }
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}
