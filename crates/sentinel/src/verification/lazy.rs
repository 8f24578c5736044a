//! Initialize-once service handle.

use anyhow::{Result, anyhow};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

type InitFn<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// Builds `T` on first access and hands the same instance to every caller
/// for the life of the process.
///
/// Concurrent first callers wait for a single initializer to finish. A
/// failed initialization is not cached; the next caller runs it again.
pub struct LazyService<T> {
    cell: OnceCell<Arc<T>>,
    init: InitFn<T>,
}

impl<T: Send + Sync + 'static> LazyService<T> {
    pub fn new<F, Fut>(init: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            init: Box::new(move || -> BoxFuture<'static, Result<T>> { init().boxed() }),
        }
    }

    /// Handle that is already initialized
    pub fn ready(value: T) -> Self {
        Self {
            cell: OnceCell::from(Arc::new(value)),
            init: Box::new(|| -> BoxFuture<'static, Result<T>> {
                async { Err(anyhow!("service already initialized")) }.boxed()
            }),
        }
    }

    pub async fn get(&self) -> Result<Arc<T>> {
        self.cell
            .get_or_try_init(|| async { (self.init)().await.map(Arc::new) })
            .await
            .cloned()
    }

    #[cfg(test)]
    pub(crate) fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}
