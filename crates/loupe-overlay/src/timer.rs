//! One-shot timers on a virtual clock.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

/// Page signal that caused a deferred scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Load,
    SoftNavigation,
}

/// Work a timer performs when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimerTask {
    Scan(Trigger),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Scheduled {
    due: Duration,
    seq: u64,
    task: TimerTask,
}

/// Pending one-shot timers, fired in deadline order.
///
/// Timers cannot be cancelled; timers with equal deadlines fire in the order
/// they were scheduled.
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<Scheduled>>,
    seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to fire at `due`.
    pub fn schedule(&mut self, due: Duration, task: TimerTask) {
        self.seq += 1;
        self.heap.push(Reverse(Scheduled {
            due,
            seq: self.seq,
            task,
        }));
    }

    /// Deadline of the earliest pending timer.
    pub fn next_due(&self) -> Option<Duration> {
        self.heap.peek().map(|Reverse(s)| s.due)
    }

    /// Remove and return the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, TimerTask)> {
        if self.next_due()? > now {
            return None;
        }
        self.heap.pop().map(|Reverse(s)| (s.due, s.task))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_deadline_then_schedule_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(Duration::from_millis(500), TimerTask::Scan(Trigger::SoftNavigation));
        queue.schedule(Duration::from_millis(100), TimerTask::Scan(Trigger::Load));
        queue.schedule(Duration::from_millis(500), TimerTask::Scan(Trigger::Load));

        assert_eq!(queue.pop_due(Duration::from_millis(50)), None);

        let now = Duration::from_secs(1);
        let fired: Vec<TimerTask> = std::iter::from_fn(|| queue.pop_due(now))
            .map(|(_, task)| task)
            .collect();

        assert_eq!(
            fired,
            vec![
                TimerTask::Scan(Trigger::Load),
                TimerTask::Scan(Trigger::SoftNavigation),
                TimerTask::Scan(Trigger::Load),
            ]
        );
        assert!(queue.is_empty());
    }
}
