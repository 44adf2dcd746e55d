//! # Per-Customer Critical Sections
//!
//! Every balance or status mutation for a customer runs while holding that
//! customer's lock. Different customers never contend.
//!
//! ```text
//!   apply(CUST-1) ──► acquire("CUST-1") ──► read → rules → write ──► drop guard
//!   apply(CUST-1) ──► acquire("CUST-1") ··· waits ···············──► read → ...
//!   apply(CUST-2) ──► acquire("CUST-2") ──► runs in parallel
//! ```
//!
//! The outer `std::sync::Mutex` only guards the map and is never held across
//! an `.await`. Entries nobody holds or waits on are dropped on the next
//! `acquire`, so the map tracks busy customers rather than every customer seen.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Map of customer id to its async mutex.
#[derive(Debug, Default)]
pub struct CustomerLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl CustomerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and returns the guard for `customer_id`.
    pub async fn acquire(&self, customer_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // Holders and waiters each own a clone; a count of 1 is the map's own.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(customer_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Customers with a live entry: held, waited on, or released since the
    /// last `acquire`.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_customer_serializes() {
        let locks = Arc::new(CustomerLocks::new());
        let guard = locks.acquire("CUST-1").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("CUST-1").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_customers_do_not_contend() {
        let locks = CustomerLocks::new();
        let _first = locks.acquire("CUST-1").await;
        let _second = locks.acquire("CUST-2").await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_released_entries_are_pruned() {
        let locks = CustomerLocks::new();
        for i in 0..100 {
            let _guard = locks.acquire(&format!("CUST-{i}")).await;
        }
        // Only the last customer is left; it was released after its acquire.
        assert_eq!(locks.len(), 1);

        let held = locks.acquire("CUST-A").await;
        let _other = locks.acquire("CUST-B").await;
        assert_eq!(locks.len(), 2);

        drop(held);
        let _again = locks.acquire("CUST-A").await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_waiter_keeps_entry_alive() {
        let locks = Arc::new(CustomerLocks::new());
        let guard = locks.acquire("CUST-1").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("CUST-1").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Pruning on another customer's acquire must not split CUST-1's lock.
        let _other = locks.acquire("CUST-2").await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }
}
