//! Concurrency pool
//!
//! Bounded admission control for suite pipelines: a counting semaphore with
//! scoped slots. Waiters are admitted in FIFO order of arrival.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting semaphore bounding how many suite pipelines run at once
#[derive(Clone, Debug)]
pub struct Pool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl Pool {
    /// Create a pool with `size` slots, clamped to at least 1
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Total number of slots
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of slots currently free
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Acquire a slot, suspending until one frees up.
    ///
    /// The slot is released when the returned [`PoolSlot`] is dropped. The
    /// semaphore is never closed, so acquisition cannot fail.
    pub async fn acquire(&self) -> PoolSlot {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .expect("pool semaphore closed");
        PoolSlot { _permit: permit }
    }
}

/// Scoped token for one pool slot; dropping it frees the slot
#[derive(Debug)]
pub struct PoolSlot {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_pool_clamps_to_one_slot() {
        let pool = Pool::new(0);
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.available(), 1);
    }

    #[tokio::test]
    async fn test_slot_released_on_drop() {
        let pool = Pool::new(2);

        let first = pool.acquire().await;
        let second = pool.acquire().await;
        assert_eq!(pool.available(), 0);

        drop(first);
        assert_eq!(pool.available(), 1);
        drop(second);
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test]
    async fn test_acquire_blocks_when_exhausted() {
        let pool = Pool::new(1);
        let held = pool.acquire().await;

        let blocked = timeout(Duration::from_millis(50), pool.acquire()).await;
        assert!(blocked.is_err(), "second acquire must suspend");

        drop(held);
        timeout(Duration::from_millis(50), pool.acquire())
            .await
            .expect("released slot must unblock the next waiter");
    }

    #[tokio::test]
    async fn test_waiters_admitted_in_arrival_order() {
        let pool = Pool::new(1);
        let held = pool.acquire().await;

        let order = Arc::new(Mutex::new(Vec::new()));
        let mut waiters = Vec::new();
        for index in 0..3 {
            let pool = pool.clone();
            let order = order.clone();
            waiters.push(tokio::spawn(async move {
                let slot = pool.acquire().await;
                order.lock().unwrap().push(index);
                drop(slot);
            }));
            // park this waiter before the next one arrives
            tokio::task::yield_now().await;
        }

        drop(held);
        for waiter in waiters {
            waiter.await.unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }
}
