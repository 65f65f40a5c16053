use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Shared cancellation flag scoped to an owner generation.
///
/// Clones observe the same flag. The generation lets a consumer reject a
/// token issued to an earlier incarnation of the same owner even if nobody
/// cancelled it.
#[derive(Debug, Clone)]
pub struct CancelToken {
    generation: u64,
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            cancelled: Rc::new(Cell::new(false)),
        }
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

struct Entry<T> {
    due: Duration,
    token: Option<CancelToken>,
    payload: T,
}

/// Deferred payloads released once their due time passes.
///
/// Cancelled entries are dropped silently when they come due.
pub struct DelayQueue<T> {
    entries: Vec<Entry<T>>,
}

impl<T> DelayQueue<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Schedules `payload` to be released at `now + delay`.
    pub fn schedule(&mut self, now: Duration, delay: Duration, token: Option<CancelToken>, payload: T) {
        self.entries.push(Entry {
            due: now + delay,
            token,
            payload,
        });
    }

    /// Removes and returns every live payload due at or before `now`,
    /// in due order. Ties keep scheduling order.
    pub fn drain_due(&mut self, now: Duration) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|e| e.due <= now);
        self.entries = pending;

        due.sort_by_key(|e| e.due);
        due.into_iter()
            .filter(|e| !e.token.as_ref().is_some_and(CancelToken::is_cancelled))
            .map(|e| e.payload)
            .collect()
    }

    /// Number of scheduled entries, cancelled ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for DelayQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
