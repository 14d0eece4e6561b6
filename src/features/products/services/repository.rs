use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::config::SupabaseConfig;
use crate::core::error::{AppError, Result};
use crate::features::products::models::{NewProduct, Product, ProductPatch, StockRow};
use crate::modules::supabase::postgrest::{eq, PostgrestClient};
use crate::modules::supabase::realtime::{self, RealtimeConfig, RealtimeEvent, ReconnectConfig};

/// Storage seam for the products table.
///
/// Reads use the public key; writes carry the admin's access token so the
/// backend's row-level security decides what is allowed.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: &NewProduct, access_token: &str) -> Result<Product>;

    /// `Ok(None)` when no row has this id
    async fn update(
        &self,
        id: Uuid,
        patch: &ProductPatch,
        access_token: &str,
    ) -> Result<Option<Product>>;

    async fn delete(&self, id: Uuid, access_token: &str) -> Result<()>;

    /// Every product, newest first
    async fn select_all(&self) -> Result<Vec<Product>>;

    /// Current stock of one product; `Ok(None)` when no row has this id
    async fn select_stock(&self, id: Uuid, access_token: &str) -> Result<Option<i64>>;

    /// Open a change channel on the table. It stays open until `cancel` fires.
    fn open_change_feed(
        &self,
        cancel: CancellationToken,
    ) -> Result<broadcast::Receiver<Arc<RealtimeEvent>>>;
}

pub struct SupabaseProductRepository {
    client: PostgrestClient,
    table: String,
    realtime: Option<RealtimeConfig>,
}

impl SupabaseProductRepository {
    pub fn new(client: PostgrestClient, config: &SupabaseConfig) -> Self {
        let realtime = if config.is_configured() {
            match realtime::socket_url(&config.url, &config.anon_key) {
                Ok(socket_url) => Some(RealtimeConfig {
                    socket_url,
                    access_token: config.anon_key.clone(),
                    schema: config.schema.clone(),
                    table: config.products_table.clone(),
                    heartbeat: config.realtime_heartbeat,
                    reconnect: ReconnectConfig::default(),
                }),
                Err(e) => {
                    tracing::error!("Realtime disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            client,
            table: config.products_table.clone(),
            realtime,
        }
    }
}

#[async_trait]
impl ProductRepository for SupabaseProductRepository {
    async fn insert(&self, product: &NewProduct, access_token: &str) -> Result<Product> {
        let rows: Vec<Product> = self
            .client
            .insert(&self.table, product, Some(access_token))
            .await?;

        rows.into_iter().next().ok_or_else(|| {
            AppError::ExternalServiceError("Insert returned no row".to_string())
        })
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &ProductPatch,
        access_token: &str,
    ) -> Result<Option<Product>> {
        let rows: Vec<Product> = self
            .client
            .update(&self.table, &[eq("id", id)], patch, Some(access_token))
            .await?;

        Ok(rows.into_iter().next())
    }

    async fn delete(&self, id: Uuid, access_token: &str) -> Result<()> {
        self.client
            .delete(&self.table, &[eq("id", id)], Some(access_token))
            .await
    }

    async fn select_all(&self) -> Result<Vec<Product>> {
        self.client
            .select(&self.table, "*", &[], Some("created_at.desc"), None)
            .await
    }

    async fn select_stock(&self, id: Uuid, access_token: &str) -> Result<Option<i64>> {
        let rows: Vec<StockRow> = self
            .client
            .select(&self.table, "stock", &[eq("id", id)], None, Some(access_token))
            .await?;

        Ok(rows.into_iter().next().map(|row| row.stock.unwrap_or(0)))
    }

    fn open_change_feed(
        &self,
        cancel: CancellationToken,
    ) -> Result<broadcast::Receiver<Arc<RealtimeEvent>>> {
        let config = self.realtime.clone().ok_or_else(|| {
            AppError::ExternalServiceError("Supabase is not configured".to_string())
        })?;

        Ok(realtime::subscribe_table(config, cancel))
    }
}
