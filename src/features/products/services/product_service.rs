use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::Session;
use crate::features::products::dtos::ProductInput;
use crate::features::products::models::{Product, ProductPatch};
use crate::features::products::services::repository::ProductRepository;
use crate::modules::supabase::RealtimeEvent;

/// Typed operations over the products table
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    /// Insert a product and return the stored row with its generated id
    pub async fn add_product(&self, session: &Session, input: ProductInput) -> Result<Product> {
        let new_product = input.into_new_product(Utc::now());
        let product = self
            .repository
            .insert(&new_product, &session.access_token)
            .await?;

        tracing::info!("Product created: id={}, name={}", product.id, product.name);
        Ok(product)
    }

    /// Apply a partial update and stamp `updatedAt`
    pub async fn update_product(
        &self,
        session: &Session,
        id: Uuid,
        mut patch: ProductPatch,
    ) -> Result<Product> {
        patch.updated_at = Some(Utc::now());

        let product = self
            .repository
            .update(id, &patch, &session.access_token)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;

        tracing::info!("Product updated: id={}", product.id);
        Ok(product)
    }

    /// Delete a product. An id that matches nothing is not an error.
    pub async fn delete_product(&self, session: &Session, id: Uuid) -> Result<bool> {
        self.repository.delete(id, &session.access_token).await?;
        tracing::info!("Product deleted: id={}", id);
        Ok(true)
    }

    /// Every product, newest first. Backend failures are logged and yield an
    /// empty list; use [`Self::try_get_all_products`] to see them.
    pub async fn get_all_products(&self) -> Vec<Product> {
        fetch_all_or_empty(self.repository.as_ref()).await
    }

    pub async fn try_get_all_products(&self) -> Result<Vec<Product>> {
        self.repository.select_all().await
    }

    /// Add `delta` to the current stock.
    ///
    /// Read and write are two separate requests, so a concurrent adjustment
    /// between them is lost. The result is not clamped at zero.
    pub async fn update_stock(&self, session: &Session, id: Uuid, delta: i64) -> Result<Product> {
        let current = self
            .repository
            .select_stock(id, &session.access_token)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;

        let mut patch = ProductPatch::stock(current + delta);
        patch.updated_at = Some(Utc::now());

        let product = self
            .repository
            .update(id, &patch, &session.access_token)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;

        tracing::info!(
            "Stock adjusted: id={}, {} -> {}",
            id,
            current,
            product.stock
        );
        Ok(product)
    }

    /// Open a change channel on the products table.
    ///
    /// Once the channel is joined, and again after every insert, update or
    /// delete, the full list is re-fetched and handed to `callback`. Events
    /// are handled one at a time, so callbacks see lists in event order.
    /// Every call opens a separate channel.
    pub fn subscribe_to_products<F>(&self, mut callback: F) -> Result<Subscription>
    where
        F: FnMut(Vec<Product>) + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let mut events = self.repository.open_change_feed(cancel.child_token())?;
        let repository = Arc::clone(&self.repository);
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    biased;
                    _ = task_cancel.cancelled() => break,
                    event = events.recv() => event,
                };

                match event {
                    Ok(event) => {
                        match event.as_ref() {
                            RealtimeEvent::Subscribed => {
                                tracing::debug!("Products channel joined, loading list")
                            }
                            RealtimeEvent::Change { change_type, .. } => {
                                tracing::debug!("Products changed ({:?}), reloading list", change_type)
                            }
                        }
                        callback(fetch_all_or_empty(repository.as_ref()).await);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Products channel skipped {} events, reloading list", skipped);
                        callback(fetch_all_or_empty(repository.as_ref()).await);
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Products channel closed");
                        break;
                    }
                }
            }
        });

        Ok(Subscription {
            cancel,
            handle: Some(handle),
        })
    }
}

async fn fetch_all_or_empty(repository: &dyn ProductRepository) -> Vec<Product> {
    match repository.select_all().await {
        Ok(products) => products,
        Err(e) => {
            tracing::error!("Error fetching products: {}", e);
            Vec::new()
        }
    }
}

/// Handle to an open products channel. Dropping it closes the channel.
pub struct Subscription {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Close the channel and wait for the listener task to finish
    pub async fn unsubscribe(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Products listener ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
