//! Fixed-capacity FIFO with blocking `put`/`get` and a one-way close signal.
//!
//! ## States
//!
//! ```text
//! Open (closed = false) ──close()──▶ Closed (closed = true)
//! ```
//!
//! The transition is irreversible and `close()` is idempotent.
//!
//! ## Locking
//!
//! One mutex guards both the item queue and the `closed` flag. The put-side
//! (`not_full`) and get-side (`not_empty`) condition variables share that
//! mutex, so closing is atomic with respect to every capacity/emptiness check.
//!
//! ## Close while a producer is blocked
//!
//! A `put` that is still waiting for capacity when `close()` runs does not
//! append its item: the item is dropped and the call returns
//! [`Delivery::Discarded`]. Producers must not `put` after they themselves
//! called `close()`, or data is lost.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use lockstep_core::{DomainError, DomainResult};
use tracing::{debug, trace};

use crate::error::{BufferError, PutTimeout};

/// Outcome of a `put`.
#[must_use = "a discarded item is lost; check whether the buffer was closed"]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The item was appended and will be returned by a later `get`.
    Accepted,
    /// The buffer was closed; the item was dropped without being appended.
    Discarded,
}

impl Delivery {
    pub fn is_accepted(self) -> bool {
        matches!(self, Delivery::Accepted)
    }
}

#[derive(Debug)]
struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Bounded blocking buffer.
///
/// Specified for exactly one producer thread and one consumer thread. Share it
/// with `Arc<BoundedBuffer<T>>`.
#[derive(Debug)]
pub struct BoundedBuffer<T> {
    state: Mutex<State<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
}

impl<T> BoundedBuffer<T> {
    /// Create an open, empty buffer holding at most `max_size` items.
    pub fn new(max_size: usize) -> DomainResult<Self> {
        if max_size == 0 {
            return Err(DomainError::validation("buffer capacity must be at least 1"));
        }

        Ok(Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(max_size),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity: max_size,
        })
    }

    /// Append `item`, blocking while the buffer is full and still open.
    pub fn put(&self, item: T) -> Delivery {
        let state = self
            .not_full
            .wait_while(self.lock(), |s| self.must_wait_to_put(&*s))
            .unwrap_or_else(PoisonError::into_inner);

        self.store(state, item)
    }

    /// Like [`put`](Self::put), but gives up after `timeout`.
    ///
    /// On timeout the item is handed back inside [`PutTimeout`].
    pub fn put_timeout(&self, item: T, timeout: Duration) -> Result<Delivery, PutTimeout<T>> {
        let (state, _) = self
            .not_full
            .wait_timeout_while(self.lock(), timeout, |s| self.must_wait_to_put(&*s))
            .unwrap_or_else(PoisonError::into_inner);

        if self.must_wait_to_put(&state) {
            return Err(PutTimeout(item));
        }

        Ok(self.store(state, item))
    }

    /// Remove and return the oldest item, blocking while the buffer is empty
    /// and still open.
    ///
    /// Returns `None` (end of stream) once the buffer is closed and drained,
    /// on this and every later call.
    pub fn get(&self) -> Option<T> {
        let state = self
            .not_empty
            .wait_while(self.lock(), |s| must_wait_to_get(&*s))
            .unwrap_or_else(PoisonError::into_inner);

        self.take(state)
    }

    /// Like [`get`](Self::get), but fails with [`BufferError::Timeout`] if
    /// nothing arrives and the buffer stays open for `timeout`.
    pub fn get_timeout(&self, timeout: Duration) -> Result<Option<T>, BufferError> {
        let (state, _) = self
            .not_empty
            .wait_timeout_while(self.lock(), timeout, |s| must_wait_to_get(&*s))
            .unwrap_or_else(PoisonError::into_inner);

        if must_wait_to_get(&state) {
            return Err(BufferError::Timeout);
        }

        Ok(self.take(state))
    }

    /// Signal that no more input will arrive and wake every blocked caller.
    ///
    /// Idempotent.
    pub fn close(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        let remaining = state.items.len();
        drop(state);

        debug!(remaining, "buffer closed");
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of buffered items right now. Never exceeds [`capacity`](Self::capacity).
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Blocking iterator that yields items until end of stream.
    pub fn iter(&self) -> Drain<'_, T> {
        Drain { buffer: self }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        // Only queue operations run under the lock, so a poisoned guard still
        // holds a valid queue.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn must_wait_to_put(&self, state: &State<T>) -> bool {
        state.items.len() >= self.capacity && !state.closed
    }

    fn store(&self, mut state: MutexGuard<'_, State<T>>, item: T) -> Delivery {
        if state.closed {
            drop(state);
            debug!("buffer closed; discarding item");
            return Delivery::Discarded;
        }

        state.items.push_back(item);
        trace!(len = state.items.len(), "item stored");
        drop(state);
        self.not_empty.notify_one();
        Delivery::Accepted
    }

    fn take(&self, mut state: MutexGuard<'_, State<T>>) -> Option<T> {
        let item = state.items.pop_front();
        drop(state);

        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }
}

fn must_wait_to_get<T>(state: &State<T>) -> bool {
    state.items.is_empty() && !state.closed
}

/// Consumer-side iterator returned by [`BoundedBuffer::iter`].
#[derive(Debug)]
pub struct Drain<'a, T> {
    buffer: &'a BoundedBuffer<T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.buffer.get()
    }
}

impl<'a, T> IntoIterator for &'a BoundedBuffer<T> {
    type Item = T;
    type IntoIter = Drain<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    #[test]
    fn zero_capacity_is_rejected() {
        let err = BoundedBuffer::<u32>::new(0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn items_come_out_in_insertion_order() {
        let buffer = BoundedBuffer::new(4).unwrap();
        for i in 0..4 {
            assert_eq!(buffer.put(i), Delivery::Accepted);
        }
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.get(), Some(0));
        assert_eq!(buffer.get(), Some(1));
        assert_eq!(buffer.put(4), Delivery::Accepted);
        assert_eq!(buffer.get(), Some(2));
        assert_eq!(buffer.get(), Some(3));
        assert_eq!(buffer.get(), Some(4));
        assert!(buffer.is_empty());
    }

    #[test]
    fn close_drains_then_reports_end_of_stream_forever() {
        let buffer = BoundedBuffer::new(3).unwrap();
        let _ = buffer.put("a");
        let _ = buffer.put("b");
        buffer.close();

        assert_eq!(buffer.get(), Some("a"));
        assert_eq!(buffer.get(), Some("b"));
        assert_eq!(buffer.get(), None);
        assert_eq!(buffer.get(), None);
        assert_eq!(buffer.get_timeout(Duration::from_millis(1)), Ok(None));
    }

    #[test]
    fn close_is_idempotent_and_irreversible() {
        let buffer = BoundedBuffer::<u8>::new(1).unwrap();
        assert!(!buffer.is_closed());
        buffer.close();
        buffer.close();
        assert!(buffer.is_closed());
        assert_eq!(buffer.get(), None);
    }

    #[test]
    fn put_after_close_is_discarded() {
        let buffer = BoundedBuffer::new(2).unwrap();
        buffer.close();
        assert_eq!(buffer.put(1), Delivery::Discarded);
        assert!(buffer.is_empty());
        assert_eq!(buffer.get(), None);
    }

    #[test]
    fn third_put_blocks_until_consumer_makes_room() {
        let buffer = Arc::new(BoundedBuffer::new(2).unwrap());
        let third_stored = Arc::new(AtomicBool::new(false));

        let producer = {
            let buffer = Arc::clone(&buffer);
            let third_stored = Arc::clone(&third_stored);
            thread::spawn(move || {
                assert!(buffer.put(1).is_accepted());
                assert!(buffer.put(2).is_accepted());
                assert!(buffer.put(3).is_accepted());
                third_stored.store(true, Ordering::SeqCst);
            })
        };

        while buffer.len() < 2 {
            thread::yield_now();
        }
        thread::sleep(Duration::from_millis(50));
        assert!(!third_stored.load(Ordering::SeqCst));
        assert_eq!(buffer.len(), 2);

        assert_eq!(buffer.get(), Some(1));
        producer.join().unwrap();
        assert!(third_stored.load(Ordering::SeqCst));

        buffer.close();
        assert_eq!(buffer.get(), Some(2));
        assert_eq!(buffer.get(), Some(3));
        assert_eq!(buffer.get(), None);
    }

    #[test]
    fn close_wakes_blocked_consumer() {
        let buffer = Arc::new(BoundedBuffer::<u64>::new(1).unwrap());
        let consumer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || buffer.get())
        };

        thread::sleep(Duration::from_millis(20));
        buffer.close();
        assert_eq!(consumer.join().unwrap(), None);
    }

    #[test]
    fn close_while_put_is_blocked_drops_the_item() {
        let buffer = Arc::new(BoundedBuffer::new(1).unwrap());
        assert!(buffer.put(1).is_accepted());

        let producer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || buffer.put(2))
        };

        thread::sleep(Duration::from_millis(20));
        buffer.close();

        assert_eq!(producer.join().unwrap(), Delivery::Discarded);
        assert_eq!(buffer.get(), Some(1));
        assert_eq!(buffer.get(), None);
    }

    #[test]
    fn timed_operations_give_up_and_return_ownership() {
        let buffer = BoundedBuffer::new(1).unwrap();
        assert_eq!(
            buffer.get_timeout(Duration::from_millis(5)),
            Err(BufferError::Timeout)
        );

        assert_eq!(
            buffer.put_timeout(String::from("first"), Duration::from_millis(5)),
            Ok(Delivery::Accepted)
        );
        let rejected = buffer
            .put_timeout(String::from("second"), Duration::from_millis(5))
            .unwrap_err();
        assert_eq!(rejected.into_inner(), "second");
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn iterator_consumes_until_close() {
        let buffer = Arc::new(BoundedBuffer::new(2).unwrap());
        let producer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                for i in 0..10u32 {
                    let _ = buffer.put(i);
                }
                buffer.close();
            })
        };

        let seen: Vec<u32> = buffer.iter().collect();
        producer.join().unwrap();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: with one producer and one consumer, every item arrives
        /// exactly once, in order, and the observed length never exceeds the
        /// capacity.
        #[test]
        fn spsc_handoff_is_fifo_and_bounded(
            capacity in 1usize..8,
            items in prop::collection::vec(any::<i64>(), 0..200)
        ) {
            let buffer = Arc::new(BoundedBuffer::new(capacity).unwrap());
            let expected = items.clone();

            let producer = {
                let buffer = Arc::clone(&buffer);
                thread::spawn(move || {
                    for item in items {
                        assert!(buffer.put(item).is_accepted());
                        assert!(buffer.len() <= capacity);
                    }
                    buffer.close();
                })
            };

            let mut received = Vec::with_capacity(expected.len());
            loop {
                prop_assert!(buffer.len() <= capacity);
                match buffer.get() {
                    Some(item) => received.push(item),
                    None => break,
                }
            }
            producer.join().unwrap();

            prop_assert_eq!(received, expected);
        }
    }
}
