//! Bounded connection pool.
//!
//! Sized by configuration, independently of request concurrency. A pooled
//! value returns to the pool on drop.

use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

type Factory<T> = Box<dyn Fn() -> Result<T, String> + Send + Sync>;

struct PoolState<T> {
    idle: Vec<T>,
}

pub struct Pool<T> {
    max: usize,
    factory: Factory<T>,
    state: Mutex<PoolState<T>>,
    available: Condvar,
    in_flight: AtomicUsize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AcquireError {
    Timeout,
    Cancelled,
    Connect(String),
}

pub struct Pooled<T> {
    pool: Arc<Pool<T>>,
    value: Option<T>,
}

impl<T> Pool<T> {
    pub fn new<F>(max: usize, factory: F) -> Arc<Self>
    where
        F: Fn() -> Result<T, String> + Send + Sync + 'static,
    {
        Arc::new(Self {
            max: max.max(1),
            factory: Box::new(factory),
            state: Mutex::new(PoolState { idle: Vec::new() }),
            available: Condvar::new(),
            in_flight: AtomicUsize::new(0),
        })
    }

    fn lock(&self) -> MutexGuard<'_, PoolState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take an idle value or open a new one, waiting at most `timeout`.
    ///
    /// `cancel_check` is polled while waiting; returning `true` abandons the
    /// acquisition.
    pub fn acquire_with_cancel<F>(
        self: &Arc<Self>,
        timeout: Duration,
        mut cancel_check: F,
    ) -> Result<Pooled<T>, AcquireError>
    where
        F: FnMut() -> bool,
    {
        let deadline = Instant::now() + timeout;
        let poll = Duration::from_millis(5);
        let mut state = self.lock();
        loop {
            if cancel_check() {
                return Err(AcquireError::Cancelled);
            }

            if let Some(item) = state.idle.pop() {
                return Ok(Pooled {
                    pool: Arc::clone(self),
                    value: Some(item),
                });
            }

            if self.in_flight.load(Ordering::SeqCst) < self.max {
                self.in_flight.fetch_add(1, Ordering::SeqCst);
                drop(state);
                return match (self.factory)() {
                    Ok(item) => Ok(Pooled {
                        pool: Arc::clone(self),
                        value: Some(item),
                    }),
                    Err(msg) => {
                        self.discard();
                        Err(AcquireError::Connect(msg))
                    }
                };
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(AcquireError::Timeout);
            }
            let wait = poll.min(deadline - now);
            let (guard, _) = self
                .available
                .wait_timeout(state, wait)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
    }

    pub fn acquire(self: &Arc<Self>, timeout: Duration) -> Result<Pooled<T>, AcquireError> {
        self.acquire_with_cancel(timeout, || false)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn idle_count(&self) -> usize {
        self.lock().idle.len()
    }

    fn release(&self, item: T) {
        let mut state = self.lock();
        state.idle.push(item);
        self.available.notify_one();
    }

    fn discard(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.available.notify_one();
    }
}

impl<T> Pooled<T> {
    /// Drop the value instead of returning it, freeing its slot
    pub fn discard(mut self) {
        if self.value.take().is_some() {
            self.pool.discard();
        }
    }
}

impl<T> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only `discard` and `drop` take the value, and both consume self
        match self.value.as_ref() {
            Some(value) => value,
            None => unreachable!("pooled value already released"),
        }
    }
}

impl<T> Drop for Pooled<T> {
    fn drop(&mut self) {
        if let Some(item) = self.value.take() {
            self.pool.release(item);
        }
    }
}
