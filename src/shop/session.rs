use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use super::storage::{ShopStore, CART_KEY, WISHLIST_KEY};
use crate::errors::ServiceError;

/// Product fields a session snapshots when an item is added. Line items are
/// not live-linked to the catalog; reconciliation refreshes them explicitly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductRef {
    pub id: Uuid,
    pub title: String,
    pub handle: String,
    pub price: Decimal,
    pub image: String,
}

/// One cart line. Uniqueness key is (product id, selected size); adding the
/// same pair again merges quantities instead of duplicating.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLineItem {
    pub id: Uuid,
    pub title: String,
    pub handle: String,
    pub price: Decimal,
    pub image: String,
    pub selected_size: String,
    pub quantity: u32,
}

/// Wishlist entries carry the product snapshot only; no size or quantity.
pub type WishlistEntry = ProductRef;

/// Batched catalog lookup used to refresh hydrated carts.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ProductRef>, ServiceError>;
}

/// A shopper's in-progress selections, mirrored to a [`ShopStore`].
///
/// Construction hydrates prior state before any persistence write is allowed;
/// the `loaded` flag gates writes so a failed or partial hydration can never
/// clobber stored state with an empty session.
pub struct ShopSession {
    scope: String,
    store: Arc<dyn ShopStore>,
    cart: Vec<CartLineItem>,
    wishlist: Vec<WishlistEntry>,
    loaded: bool,
}

impl ShopSession {
    /// Hydrates a session from the store, then refreshes cart snapshots from
    /// the catalog. A failed reconciliation leaves the as-loaded values in
    /// place (logged, surfaced nowhere else).
    pub async fn open(
        store: Arc<dyn ShopStore>,
        scope: impl Into<String>,
        prices: &dyn PriceSource,
    ) -> Result<Self, ServiceError> {
        let scope = scope.into();
        let cart = hydrate(store.as_ref(), &scope, CART_KEY).await?;
        let wishlist = hydrate(store.as_ref(), &scope, WISHLIST_KEY).await?;

        let mut session = Self {
            scope,
            store,
            cart,
            wishlist,
            loaded: true,
        };
        if !session.cart.is_empty() {
            session.reconcile_prices(prices).await?;
        }
        Ok(session)
    }

    pub fn cart(&self) -> &[CartLineItem] {
        &self.cart
    }

    pub fn wishlist(&self) -> &[WishlistEntry] {
        &self.wishlist
    }

    /// Sum of price × quantity over all lines. Recomputed on every read.
    pub fn cart_total(&self) -> Decimal {
        self.cart
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum()
    }

    /// Sum of quantities. Recomputed on every read.
    pub fn cart_count(&self) -> u32 {
        self.cart.iter().map(|item| item.quantity).sum()
    }

    /// Adds a product+size to the cart, merging quantities when the same pair
    /// already exists. Stock is not checked here; merged quantities saturate
    /// instead of overflowing.
    pub async fn add_to_cart(
        &mut self,
        product: ProductRef,
        quantity: u32,
        size: &str,
    ) -> Result<(), ServiceError> {
        if let Some(existing) = self
            .cart
            .iter_mut()
            .find(|item| item.id == product.id && item.selected_size == size)
        {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            self.cart.push(CartLineItem {
                id: product.id,
                title: product.title,
                handle: product.handle,
                price: product.price,
                image: product.image,
                selected_size: size.to_string(),
                quantity,
            });
        }
        self.persist().await
    }

    /// Removes the matching line; no-op if absent.
    pub async fn remove_from_cart(
        &mut self,
        product_id: Uuid,
        size: &str,
    ) -> Result<(), ServiceError> {
        self.cart
            .retain(|item| !(item.id == product_id && item.selected_size == size));
        self.persist().await
    }

    /// Overwrites the matching line's quantity. Quantities below 1 are
    /// rejected as a no-op; removal is a separate, explicit operation.
    pub async fn update_quantity(
        &mut self,
        product_id: Uuid,
        size: &str,
        quantity: u32,
    ) -> Result<(), ServiceError> {
        if quantity < 1 {
            return Ok(());
        }
        if let Some(item) = self
            .cart
            .iter_mut()
            .find(|item| item.id == product_id && item.selected_size == size)
        {
            item.quantity = quantity;
        }
        self.persist().await
    }

    /// Adds the product to the wishlist, or removes it if already present.
    /// Returns whether the product is in the wishlist afterwards.
    pub async fn toggle_wishlist(&mut self, product: ProductRef) -> Result<bool, ServiceError> {
        let present = self.wishlist.iter().any(|entry| entry.id == product.id);
        if present {
            self.wishlist.retain(|entry| entry.id != product.id);
        } else {
            self.wishlist.push(product);
        }
        self.persist().await?;
        Ok(!present)
    }

    pub fn is_in_wishlist(&self, product_id: Uuid) -> bool {
        self.wishlist.iter().any(|entry| entry.id == product_id)
    }

    pub async fn clear_cart(&mut self) -> Result<(), ServiceError> {
        self.cart.clear();
        self.persist().await
    }

    /// Refreshes price/title/image of every line from the catalog in one
    /// batched query. Quantity and selected size are untouched. Products no
    /// longer in the catalog keep their stale snapshot rather than vanishing
    /// from the cart.
    pub async fn reconcile_prices(&mut self, prices: &dyn PriceSource) -> Result<(), ServiceError> {
        let mut ids: Vec<Uuid> = self.cart.iter().map(|item| item.id).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(());
        }

        let fresh = match prices.products_by_ids(&ids).await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(scope = %self.scope, "cart price refresh failed, keeping stored values: {e}");
                return Ok(());
            }
        };

        for item in &mut self.cart {
            if let Some(current) = fresh.iter().find(|p| p.id == item.id) {
                item.price = current.price;
                item.title = current.title.clone();
                item.image = current.image.clone();
            }
        }
        self.persist().await
    }

    /// Mirrors both collections to the store. Gated on the loaded flag so the
    /// initial empty state can never overwrite stored state mid-hydration.
    async fn persist(&self) -> Result<(), ServiceError> {
        if !self.loaded {
            return Ok(());
        }
        let cart_json = serde_json::to_string(&self.cart)?;
        let wishlist_json = serde_json::to_string(&self.wishlist)?;
        self.store.save(&self.scope, CART_KEY, &cart_json).await?;
        self.store
            .save(&self.scope, WISHLIST_KEY, &wishlist_json)
            .await
    }
}

/// Loads one collection from the store. Missing keys hydrate as empty;
/// malformed stored JSON is logged and treated as empty rather than poisoning
/// the session.
async fn hydrate<T: DeserializeOwned>(
    store: &dyn ShopStore,
    scope: &str,
    key: &str,
) -> Result<Vec<T>, ServiceError> {
    match store.load(scope, key).await? {
        None => Ok(Vec::new()),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!(scope, key, "discarding malformed stored state: {e}");
                Ok(Vec::new())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::storage::MemoryStore;
    use rust_decimal_macros::dec;

    struct StaticPrices(Vec<ProductRef>);

    #[async_trait]
    impl PriceSource for StaticPrices {
        async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ProductRef>, ServiceError> {
            Ok(self
                .0
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect())
        }
    }

    struct FailingPrices;

    #[async_trait]
    impl PriceSource for FailingPrices {
        async fn products_by_ids(&self, _ids: &[Uuid]) -> Result<Vec<ProductRef>, ServiceError> {
            Err(ServiceError::InternalError("catalog offline".into()))
        }
    }

    fn product(price: Decimal) -> ProductRef {
        ProductRef {
            id: Uuid::new_v4(),
            title: "Oxford Heritage Knit".into(),
            handle: "oxford-heritage-knit".into(),
            price,
            image: "/assets/knit.png".into(),
        }
    }

    async fn empty_session(store: Arc<dyn ShopStore>) -> ShopSession {
        ShopSession::open(store, "sess", &StaticPrices(vec![]))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn adding_same_product_and_size_merges_quantities() {
        let mut session = empty_session(Arc::new(MemoryStore::new())).await;
        let p = product(dec!(3499));

        session.add_to_cart(p.clone(), 2, "M").await.unwrap();
        session.add_to_cart(p.clone(), 3, "M").await.unwrap();

        assert_eq!(session.cart().len(), 1);
        assert_eq!(session.cart()[0].quantity, 5);
    }

    #[tokio::test]
    async fn merged_quantities_saturate_instead_of_overflowing() {
        let mut session = empty_session(Arc::new(MemoryStore::new())).await;
        let p = product(dec!(3499));

        session.add_to_cart(p.clone(), u32::MAX - 1, "M").await.unwrap();
        session.add_to_cart(p.clone(), 2, "M").await.unwrap();

        assert_eq!(session.cart()[0].quantity, u32::MAX);
    }

    #[tokio::test]
    async fn different_sizes_are_separate_lines() {
        let mut session = empty_session(Arc::new(MemoryStore::new())).await;
        let p = product(dec!(3499));

        session.add_to_cart(p.clone(), 1, "M").await.unwrap();
        session.add_to_cart(p.clone(), 1, "L").await.unwrap();

        assert_eq!(session.cart().len(), 2);
    }

    #[tokio::test]
    async fn removing_an_absent_pair_is_a_no_op() {
        let mut session = empty_session(Arc::new(MemoryStore::new())).await;
        let p = product(dec!(2999));
        session.add_to_cart(p.clone(), 1, "M").await.unwrap();

        session.remove_from_cart(p.id, "XL").await.unwrap();
        session.remove_from_cart(Uuid::new_v4(), "M").await.unwrap();

        assert_eq!(session.cart().len(), 1);
    }

    #[tokio::test]
    async fn update_quantity_rejects_values_below_one() {
        let mut session = empty_session(Arc::new(MemoryStore::new())).await;
        let p = product(dec!(2999));
        session.add_to_cart(p.clone(), 4, "S").await.unwrap();

        session.update_quantity(p.id, "S", 0).await.unwrap();
        assert_eq!(session.cart()[0].quantity, 4);

        session.update_quantity(p.id, "S", 2).await.unwrap();
        assert_eq!(session.cart()[0].quantity, 2);
    }

    #[tokio::test]
    async fn totals_hold_after_mixed_operations() {
        let mut session = empty_session(Arc::new(MemoryStore::new())).await;
        let a = product(dec!(3499));
        let b = product(dec!(1200));

        session.add_to_cart(a.clone(), 2, "M").await.unwrap();
        session.add_to_cart(b.clone(), 1, "S").await.unwrap();
        session.update_quantity(b.id, "S", 3).await.unwrap();
        session.remove_from_cart(a.id, "M").await.unwrap();

        assert_eq!(session.cart_total(), dec!(3600));
        assert_eq!(session.cart_count(), 3);
    }

    #[tokio::test]
    async fn wishlist_toggle_round_trips() {
        let mut session = empty_session(Arc::new(MemoryStore::new())).await;
        let p = product(dec!(3200));

        assert!(session.toggle_wishlist(p.clone()).await.unwrap());
        assert!(session.is_in_wishlist(p.id));
        assert!(!session.toggle_wishlist(p.clone()).await.unwrap());
        assert!(!session.is_in_wishlist(p.id));
        assert!(session.wishlist().is_empty());
    }

    #[tokio::test]
    async fn state_survives_reopen_through_the_store() {
        let store: Arc<dyn ShopStore> = Arc::new(MemoryStore::new());
        let p = product(dec!(3499));
        {
            let mut session = empty_session(store.clone()).await;
            session.add_to_cart(p.clone(), 2, "M").await.unwrap();
            session.toggle_wishlist(p.clone()).await.unwrap();
        }

        let reopened = ShopSession::open(store, "sess", &StaticPrices(vec![p.clone()]))
            .await
            .unwrap();
        assert_eq!(reopened.cart_count(), 2);
        assert!(reopened.is_in_wishlist(p.id));
    }

    #[tokio::test]
    async fn reconciliation_rewrites_snapshot_fields_only() {
        let store: Arc<dyn ShopStore> = Arc::new(MemoryStore::new());
        let mut stale = product(dec!(3499));
        {
            let mut session = empty_session(store.clone()).await;
            session.add_to_cart(stale.clone(), 2, "M").await.unwrap();
        }

        stale.price = dec!(2999);
        stale.title = "Oxford Heritage Knit (Reworked)".into();
        stale.image = "/assets/knit-v2.png".into();

        let session = ShopSession::open(store, "sess", &StaticPrices(vec![stale.clone()]))
            .await
            .unwrap();
        let line = &session.cart()[0];
        assert_eq!(line.price, dec!(2999));
        assert_eq!(line.title, "Oxford Heritage Knit (Reworked)");
        assert_eq!(line.image, "/assets/knit-v2.png");
        assert_eq!(line.quantity, 2);
        assert_eq!(line.selected_size, "M");
    }

    #[tokio::test]
    async fn discontinued_products_keep_their_stale_snapshot() {
        let store: Arc<dyn ShopStore> = Arc::new(MemoryStore::new());
        let p = product(dec!(3499));
        {
            let mut session = empty_session(store.clone()).await;
            session.add_to_cart(p.clone(), 1, "M").await.unwrap();
        }

        // Catalog no longer knows this product; the line stays as loaded.
        let session = ShopSession::open(store, "sess", &StaticPrices(vec![]))
            .await
            .unwrap();
        assert_eq!(session.cart().len(), 1);
        assert_eq!(session.cart()[0].price, dec!(3499));
    }

    #[tokio::test]
    async fn failed_reconciliation_leaves_the_cart_stale() {
        let store: Arc<dyn ShopStore> = Arc::new(MemoryStore::new());
        let p = product(dec!(3499));
        {
            let mut session = empty_session(store.clone()).await;
            session.add_to_cart(p.clone(), 1, "M").await.unwrap();
        }

        let session = ShopSession::open(store, "sess", &FailingPrices)
            .await
            .unwrap();
        assert_eq!(session.cart()[0].price, dec!(3499));
    }

    #[tokio::test]
    async fn malformed_stored_state_hydrates_as_empty() {
        let store = Arc::new(MemoryStore::new());
        store.save("sess", CART_KEY, "{not json").await.unwrap();

        let session = empty_session(store).await;
        assert!(session.cart().is_empty());
    }
}
