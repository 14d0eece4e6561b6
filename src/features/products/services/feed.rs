use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::{watch, Mutex};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;

use crate::core::error::Result;
use crate::features::products::models::Product;
use crate::features::products::services::product_service::{ProductService, Subscription};

/// Latest product list published by [`ProductFeed`]
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    /// Bumped on every publish
    pub version: u64,
    /// False until the first list arrives
    pub loaded: bool,
    pub products: Arc<Vec<Product>>,
}

struct FeedState {
    subscription: Option<Subscription>,
    /// Cancelled by `stop`; ends every stream handed out by `updates`
    streams: CancellationToken,
}

/// Process-wide live view of the products table.
///
/// Owns at most one change subscription. Readers either take the current
/// snapshot or follow new ones through [`ProductFeed::updates`], whose
/// streams end once the feed is stopped.
pub struct ProductFeed {
    service: Arc<ProductService>,
    state: Mutex<FeedState>,
    snapshot_tx: Arc<watch::Sender<FeedSnapshot>>,
}

impl ProductFeed {
    pub fn new(service: Arc<ProductService>) -> Self {
        let (snapshot_tx, _) = watch::channel(FeedSnapshot::default());
        Self {
            service,
            state: Mutex::new(FeedState {
                subscription: None,
                streams: CancellationToken::new(),
            }),
            snapshot_tx: Arc::new(snapshot_tx),
        }
    }

    /// Open the subscription unless one is already open
    pub async fn start(&self) -> Result<()> {
        let mut guard = self.state.lock().await;
        if guard.subscription.is_some() {
            tracing::debug!("Product feed already running");
            return Ok(());
        }
        if guard.streams.is_cancelled() {
            guard.streams = CancellationToken::new();
        }

        let tx = Arc::clone(&self.snapshot_tx);
        let subscription = self.service.subscribe_to_products(move |products| {
            tx.send_modify(|snapshot| {
                snapshot.version += 1;
                snapshot.loaded = true;
                snapshot.products = Arc::new(products);
            });
        })?;

        guard.subscription = Some(subscription);
        tracing::info!("Product feed started");
        Ok(())
    }

    /// Close the subscription if one is open and end all update streams
    pub async fn stop(&self) {
        let subscription = {
            let mut guard = self.state.lock().await;
            guard.streams.cancel();
            guard.subscription.take()
        };
        if let Some(subscription) = subscription {
            subscription.unsubscribe().await;
            tracing::info!("Product feed stopped");
        }
    }

    #[cfg(test)]
    pub async fn is_running(&self) -> bool {
        self.state.lock().await.subscription.is_some()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Current snapshot followed by every later one, until `stop`
    pub async fn updates(&self) -> impl Stream<Item = FeedSnapshot> + Send + 'static {
        let closed = self.state.lock().await.streams.clone();
        WatchStream::new(self.watch()).take_until(closed.cancelled_owned())
    }

    /// The live list when the feed has one, otherwise a direct fetch
    pub async fn current_products(&self) -> Arc<Vec<Product>> {
        let snapshot = self.snapshot();
        if snapshot.loaded {
            snapshot.products
        } else {
            Arc::new(self.service.get_all_products().await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{admin_session, product_input, InMemoryProductRepository};
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_test::assert_ok;

    async fn wait_for_version(rx: &mut watch::Receiver<FeedSnapshot>, version: u64) -> FeedSnapshot {
        rx.wait_for(|snapshot| snapshot.version >= version)
            .await
            .unwrap()
            .clone()
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let repo = Arc::new(InMemoryProductRepository::new());
        let service = Arc::new(ProductService::new(repo.clone()));
        let feed = ProductFeed::new(service);

        assert_ok!(feed.start().await);
        assert_ok!(feed.start().await);

        assert!(feed.is_running().await);
        assert_eq!(repo.open_feeds(), 1);

        feed.stop().await;
        feed.stop().await;
        assert!(!feed.is_running().await);
    }

    #[tokio::test]
    async fn test_snapshot_follows_changes() {
        let repo = Arc::new(InMemoryProductRepository::new());
        let service = Arc::new(ProductService::new(repo.clone()));
        let feed = ProductFeed::new(Arc::clone(&service));
        let mut rx = feed.watch();

        assert!(!feed.snapshot().loaded);
        feed.start().await.unwrap();

        let first = wait_for_version(&mut rx, 1).await;
        assert!(first.loaded);
        assert!(first.products.is_empty());

        service
            .add_product(&admin_session(), product_input("Dolo 650", "30", 10))
            .await
            .unwrap();

        let second = wait_for_version(&mut rx, 2).await;
        assert_eq!(second.products.len(), 1);
        assert_eq!(feed.current_products().await.len(), 1);

        feed.stop().await;
    }

    #[tokio::test]
    async fn test_current_products_falls_back_to_fetch() {
        let repo = Arc::new(InMemoryProductRepository::new());
        repo.seed(vec![crate::shared::test_helpers::product("Dolo 650", 4)]);
        let feed = ProductFeed::new(Arc::new(ProductService::new(repo.clone())));

        let products = feed.current_products().await;
        assert_eq!(products.len(), 1);
        assert_eq!(repo.select_calls(), 1);
    }

    #[tokio::test]
    async fn test_updates_end_when_feed_stops() {
        let repo = Arc::new(InMemoryProductRepository::new());
        let feed = ProductFeed::new(Arc::new(ProductService::new(repo)));
        feed.start().await.unwrap();

        let updates = feed.updates().await;
        tokio::pin!(updates);
        let first = timeout(Duration::from_secs(5), updates.next()).await.unwrap();
        assert!(first.is_some());

        feed.stop().await;
        let mut ended = false;
        for _ in 0..3 {
            if timeout(Duration::from_secs(5), updates.next()).await.unwrap().is_none() {
                ended = true;
                break;
            }
        }
        assert!(ended);

        // Opened after stop: nothing to wait for
        let late = feed.updates().await;
        tokio::pin!(late);
        assert!(timeout(Duration::from_secs(5), late.next()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restart_opens_fresh_streams() {
        let repo = Arc::new(InMemoryProductRepository::new());
        let feed = ProductFeed::new(Arc::new(ProductService::new(repo)));
        feed.start().await.unwrap();
        feed.stop().await;
        feed.start().await.unwrap();

        let updates = feed.updates().await;
        tokio::pin!(updates);
        let snapshot = timeout(Duration::from_secs(5), updates.next()).await.unwrap();
        assert!(snapshot.is_some());

        feed.stop().await;
    }
}
