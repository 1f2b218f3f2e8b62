use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Single-entry cache holding a value together with its expiry instant.
/// Reads within the TTL return the cached value; `clear` drops the entry so
/// the next read goes back to the backing service. There is one cell for the
/// whole process, shared by every user of the page.
pub struct TtlCell<T> {
    ttl: Duration,
    slot: RwLock<Option<(T, Instant)>>,
}

impl<T: Clone> TtlCell<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    pub async fn get(&self) -> Option<T> {
        let slot = self.slot.read().await;
        match slot.as_ref() {
            Some((value, expires_at)) if *expires_at > Instant::now() => Some(value.clone()),
            _ => None,
        }
    }

    pub async fn put(&self, value: T) {
        let mut slot = self.slot.write().await;
        *slot = Some((value, Instant::now() + self.ttl));
    }

    pub async fn clear(&self) {
        let mut slot = self.slot.write().await;
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_cell_returns_none() {
        let cell: TtlCell<u32> = TtlCell::new(Duration::from_secs(5));
        assert_eq!(cell.get().await, None);
    }

    #[tokio::test]
    async fn value_is_returned_within_ttl() {
        let cell = TtlCell::new(Duration::from_secs(5));
        cell.put(42u32).await;
        assert_eq!(cell.get().await, Some(42));
    }

    #[tokio::test]
    async fn value_expires_after_ttl() {
        let cell = TtlCell::new(Duration::from_millis(20));
        cell.put(42u32).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cell.get().await, None);
    }

    #[tokio::test]
    async fn clear_drops_value_immediately() {
        let cell = TtlCell::new(Duration::from_secs(5));
        cell.put(42u32).await;
        cell.clear().await;
        assert_eq!(cell.get().await, None);
    }
}
