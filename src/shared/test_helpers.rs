use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use fake::faker::lorem::en::Word;
use fake::Fake;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::Session;
use crate::features::products::dtos::ProductInput;
use crate::features::products::models::{NewProduct, Product, ProductPatch};
use crate::features::products::services::ProductRepository;
use crate::modules::supabase::realtime::{ChangeType, RealtimeEvent};

pub fn admin_session() -> Session {
    Session {
        access_token: "test-access-token".to_string(),
    }
}

pub fn product_input(name: &str, price: &str, stock: i64) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        price: price.parse().unwrap(),
        stock,
        category: None,
        description: None,
        image_url: None,
    }
}

pub fn product(name: &str, stock: i64) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price: "99.00".parse().unwrap(),
        stock,
        category: None,
        description: None,
        image_url: None,
        updated_at: None,
        created_at: Utc::now(),
    }
}

/// Product with a generated name
pub fn fake_product(stock: i64) -> Product {
    let name: String = Word().fake();
    product(&format!("{} tablets", name), stock)
}

/// Products table kept in memory, newest first.
///
/// Every write emits a change event to open feeds, as the hosted backend
/// does. Reads and writes can be made to fail.
pub struct InMemoryProductRepository {
    products: Mutex<Vec<Product>>,
    events: broadcast::Sender<Arc<RealtimeEvent>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    select_calls: AtomicUsize,
    open_feeds: AtomicUsize,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            products: Mutex::new(Vec::new()),
            events,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            select_calls: AtomicUsize::new(0),
            open_feeds: AtomicUsize::new(0),
        }
    }

    /// Replace the table; `products` must already be newest first
    pub fn seed(&self, products: Vec<Product>) {
        *self.products.lock().unwrap() = products;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of list or stock reads served so far
    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }

    pub fn open_feeds(&self) -> usize {
        self.open_feeds.load(Ordering::SeqCst)
    }

    pub fn all(&self) -> Vec<Product> {
        self.products.lock().unwrap().clone()
    }

    fn check_write(&self, access_token: &str) -> Result<()> {
        if access_token.is_empty() {
            return Err(AppError::Unauthorized("missing token".to_string()));
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::ExternalServiceError("write failed".to_string()));
        }
        Ok(())
    }

    fn check_read(&self) -> Result<()> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::ExternalServiceError("read failed".to_string()));
        }
        Ok(())
    }

    fn emit(&self, change_type: ChangeType) {
        let _ = self.events.send(Arc::new(RealtimeEvent::Change {
            change_type,
            commit_timestamp: Some(Utc::now().to_rfc3339()),
        }));
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, new: &NewProduct, access_token: &str) -> Result<Product> {
        self.check_write(access_token)?;

        let product = Product {
            id: Uuid::new_v4(),
            name: new.name.clone(),
            price: new.price,
            stock: new.stock,
            category: new.category.clone(),
            description: new.description.clone(),
            image_url: new.image_url.clone(),
            updated_at: Some(new.updated_at),
            created_at: Utc::now(),
        };
        self.products.lock().unwrap().insert(0, product.clone());
        self.emit(ChangeType::Insert);
        Ok(product)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &ProductPatch,
        access_token: &str,
    ) -> Result<Option<Product>> {
        self.check_write(access_token)?;

        let updated = {
            let mut products = self.products.lock().unwrap();
            products.iter_mut().find(|p| p.id == id).map(|product| {
                patch.apply_to(product);
                product.clone()
            })
        };
        if updated.is_some() {
            self.emit(ChangeType::Update);
        }
        Ok(updated)
    }

    async fn delete(&self, id: Uuid, access_token: &str) -> Result<()> {
        self.check_write(access_token)?;

        let removed = {
            let mut products = self.products.lock().unwrap();
            let before = products.len();
            products.retain(|p| p.id != id);
            before != products.len()
        };
        if removed {
            self.emit(ChangeType::Delete);
        }
        Ok(())
    }

    async fn select_all(&self) -> Result<Vec<Product>> {
        self.check_read()?;
        Ok(self.all())
    }

    async fn select_stock(&self, id: Uuid, _access_token: &str) -> Result<Option<i64>> {
        self.check_read()?;
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.stock))
    }

    fn open_change_feed(
        &self,
        _cancel: CancellationToken,
    ) -> Result<broadcast::Receiver<Arc<RealtimeEvent>>> {
        self.open_feeds.fetch_add(1, Ordering::SeqCst);
        let rx = self.events.subscribe();
        let _ = self.events.send(Arc::new(RealtimeEvent::Subscribed));
        Ok(rx)
    }
}
