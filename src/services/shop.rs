use std::sync::Arc;

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::services::catalog::CatalogService;
use crate::shop::session::{CartLineItem, ShopSession, WishlistEntry};
use crate::shop::storage::ShopStore;

/// Upper bound on cached sessions before arbitrary eviction kicks in.
const DEFAULT_SESSION_CAPACITY: usize = 8192;

/// Server-side shop sessions keyed by scope (one per shopper). Sessions are
/// opened lazily, cached, and serialized per scope so concurrent requests for
/// the same shopper cannot interleave cart writes. The cache is bounded:
/// every mutation persists to the store, so an evicted session only costs a
/// re-hydrate on the shopper's next request.
#[derive(Clone)]
pub struct ShopService {
    sessions: Arc<DashMap<String, Arc<Mutex<ShopSession>>>>,
    store: Arc<dyn ShopStore>,
    catalog: Arc<CatalogService>,
    session_capacity: usize,
}

/// Snapshot of a session, returned by every mutating call so the client never
/// needs a follow-up read.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShopView {
    pub cart: Vec<CartLineItem>,
    pub wishlist: Vec<WishlistEntry>,
    pub cart_total: Decimal,
    pub cart_count: u32,
}

impl ShopService {
    pub fn new(store: Arc<dyn ShopStore>, catalog: Arc<CatalogService>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            store,
            catalog,
            session_capacity: DEFAULT_SESSION_CAPACITY,
        }
    }

    pub fn with_session_capacity(mut self, capacity: usize) -> Self {
        self.session_capacity = capacity;
        self
    }

    async fn session(&self, scope: &str) -> Result<Arc<Mutex<ShopSession>>, ServiceError> {
        if let Some(existing) = self.sessions.get(scope) {
            return Ok(existing.clone());
        }
        let opened = ShopSession::open(self.store.clone(), scope, self.catalog.as_ref()).await?;
        while self.sessions.len() >= self.session_capacity {
            let victim = self
                .sessions
                .iter()
                .map(|entry| entry.key().clone())
                .find(|key| key != scope);
            match victim {
                Some(key) => {
                    self.sessions.remove(&key);
                }
                None => break,
            }
        }
        let entry = self
            .sessions
            .entry(scope.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(opened)));
        Ok(entry.clone())
    }

    fn view(session: &ShopSession) -> ShopView {
        ShopView {
            cart: session.cart().to_vec(),
            wishlist: session.wishlist().to_vec(),
            cart_total: session.cart_total(),
            cart_count: session.cart_count(),
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, scope: &str) -> Result<ShopView, ServiceError> {
        let session = self.session(scope).await?;
        let guard = session.lock().await;
        Ok(Self::view(&guard))
    }

    /// Looks the product up in the catalog and adds product+size to the cart.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        scope: &str,
        product_id: Uuid,
        quantity: u32,
        size: &str,
    ) -> Result<ShopView, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::InvalidInput(
                "Quantity must be at least 1".to_string(),
            ));
        }
        let product = self.catalog.get_by_id(product_id).await?;
        let product_ref = CatalogService::to_product_ref(&product);

        let session = self.session(scope).await?;
        let mut guard = session.lock().await;
        guard.add_to_cart(product_ref, quantity, size).await?;
        Ok(Self::view(&guard))
    }

    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        scope: &str,
        product_id: Uuid,
        size: &str,
    ) -> Result<ShopView, ServiceError> {
        let session = self.session(scope).await?;
        let mut guard = session.lock().await;
        guard.remove_from_cart(product_id, size).await?;
        Ok(Self::view(&guard))
    }

    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        scope: &str,
        product_id: Uuid,
        size: &str,
        quantity: u32,
    ) -> Result<ShopView, ServiceError> {
        let session = self.session(scope).await?;
        let mut guard = session.lock().await;
        guard.update_quantity(product_id, size, quantity).await?;
        Ok(Self::view(&guard))
    }

    /// Flips wishlist membership; the returned view reflects the new state.
    #[instrument(skip(self))]
    pub async fn toggle_wishlist(
        &self,
        scope: &str,
        product_id: Uuid,
    ) -> Result<ShopView, ServiceError> {
        let product = self.catalog.get_by_id(product_id).await?;
        let product_ref = CatalogService::to_product_ref(&product);

        let session = self.session(scope).await?;
        let mut guard = session.lock().await;
        guard.toggle_wishlist(product_ref).await?;
        Ok(Self::view(&guard))
    }

    /// Empties the cart, typically after a verified payment. The wishlist is
    /// untouched.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, scope: &str) -> Result<ShopView, ServiceError> {
        let session = self.session(scope).await?;
        let mut guard = session.lock().await;
        guard.clear_cart().await?;
        Ok(Self::view(&guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventSender;
    use crate::shop::storage::MemoryStore;
    use sea_orm::Database;
    use tokio::sync::mpsc;

    async fn service_with_capacity(capacity: usize) -> ShopService {
        let db = Arc::new(Database::connect("sqlite::memory:").await.unwrap());
        let (tx, _rx) = mpsc::channel(8);
        let catalog = Arc::new(CatalogService::new(db, EventSender::new(tx)));
        ShopService::new(Arc::new(MemoryStore::new()), catalog).with_session_capacity(capacity)
    }

    #[tokio::test]
    async fn session_cache_stays_within_its_capacity() {
        let service = service_with_capacity(2).await;
        for scope in ["alpha", "beta", "gamma", "delta"] {
            service.get(scope).await.unwrap();
        }
        assert!(service.sessions.len() <= 2);

        // An evicted scope re-hydrates from the store on its next request.
        let view = service.get("alpha").await.unwrap();
        assert!(view.cart.is_empty());
        assert!(service.sessions.len() <= 2);
    }
}
