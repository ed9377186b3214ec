use std::{
    collections::VecDeque,
    num::NonZeroUsize,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use uuid::Uuid;

use crate::sensor::{Metric, Reading};

pub const DEFAULT_WINDOW_CAPACITY: usize = 100;

/// `avg`, `max` and `min` of the valid values of one metric, at full
/// precision. All three are zero when the window holds no valid value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub avg: f64,
    pub max: f64,
    pub min: f64,
}

#[derive(Debug, Clone)]
pub struct ReadingWindow {
    readings: VecDeque<Reading>,
    capacity: usize,
}

impl Default for ReadingWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingWindow {
    pub fn new() -> Self {
        Self {
            readings: VecDeque::with_capacity(DEFAULT_WINDOW_CAPACITY),
            capacity: DEFAULT_WINDOW_CAPACITY,
        }
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            readings: VecDeque::with_capacity(capacity.get()),
            capacity: capacity.get(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Oldest first, in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    /// Appends a reading, evicting the oldest arrival when full. Timestamps
    /// are not consulted.
    pub fn push(&mut self, reading: Reading) {
        if self.readings.len() == self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.readings.iter().rev().any(|r| r.id == id)
    }

    /// Pushes a reading unless one with the same id is already in the
    /// window. Returns whether it was pushed.
    pub fn push_new(&mut self, reading: Reading) -> bool {
        if self.contains(reading.id) {
            return false;
        }
        self.push(reading);
        true
    }

    /// Pushes a most-recent-first batch, as returned by a bulk fetch, in
    /// chronological order.
    pub fn extend_most_recent_first<I>(&mut self, readings: I)
    where
        I: IntoIterator<Item = Reading>,
        I::IntoIter: DoubleEndedIterator,
    {
        for reading in readings.into_iter().rev() {
            self.push(reading);
        }
    }

    pub fn summary(&self, metric: Metric) -> Summary {
        let mut count = 0usize;
        let mut sum = 0f64;
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;

        for value in self.readings.iter().filter_map(|r| r.valid_value(metric)) {
            count += 1;
            sum += value;
            max = max.max(value);
            min = min.min(value);
        }

        if count == 0 {
            return Summary::default();
        }

        Summary {
            avg: sum / count as f64,
            max,
            min,
        }
    }
}

/// A window shared between an ingesting task and readers. Every operation
/// holds the one lock for its whole duration.
#[derive(Debug, Clone, Default)]
pub struct SharedWindow {
    inner: Arc<Mutex<ReadingWindow>>,
}

impl SharedWindow {
    pub fn new(window: ReadingWindow) -> Self {
        Self {
            inner: Arc::new(Mutex::new(window)),
        }
    }

    // A panic while holding the lock cannot leave the deque half-updated,
    // so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, ReadingWindow> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, reading: Reading) {
        self.lock().push(reading);
    }

    pub fn push_new(&self, reading: Reading) -> bool {
        self.lock().push_new(reading)
    }

    pub fn extend_most_recent_first(&self, readings: Vec<Reading>) {
        self.lock().extend_most_recent_first(readings);
    }

    pub fn summary(&self, metric: Metric) -> Summary {
        self.lock().summary(metric)
    }

    pub fn latest(&self) -> Option<Reading> {
        self.lock().latest().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// A consistent copy of the current window.
    pub fn snapshot(&self) -> ReadingWindow {
        self.lock().clone()
    }
}
