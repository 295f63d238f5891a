//! Scoped, bounded fetch pool.

use tokio::sync::Semaphore;

use super::fetcher::ItemSource;
use crate::error::{AppError, Result};
use crate::models::{Item, ItemId};

/// Caps the number of in-flight fetches for one tree expansion.
///
/// A permit is held only for the duration of a single network call, never
/// while waiting on children. The pool is closed when dropped, so any fetch
/// still queued after the owning expansion ends fails with
/// [`AppError::PoolClosed`] instead of running.
pub struct FetchPool {
    permits: Semaphore,
}

impl FetchPool {
    pub fn new(size: usize) -> Self {
        Self {
            permits: Semaphore::new(size.max(1)),
        }
    }

    /// Fetch one item while holding a pool slot.
    pub async fn fetch(&self, source: &dyn ItemSource, id: ItemId) -> Result<Item> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| AppError::PoolClosed)?;
        source.fetch(id).await
    }
}

impl Drop for FetchPool {
    fn drop(&mut self) {
        self.permits.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl ItemSource for Echo {
        async fn fetch(&self, id: ItemId) -> Result<Item> {
            Ok(Item::MissingChild(id))
        }
    }

    #[tokio::test]
    async fn test_zero_size_is_clamped() {
        let pool = FetchPool::new(0);
        assert_eq!(pool.permits.available_permits(), 1);
        assert_eq!(pool.fetch(&Echo, 3).await.unwrap().id(), 3);
    }

    #[tokio::test]
    async fn test_closed_pool_rejects_fetches() {
        let pool = FetchPool::new(2);
        pool.permits.close();
        assert!(matches!(pool.fetch(&Echo, 1).await, Err(AppError::PoolClosed)));
    }
}
