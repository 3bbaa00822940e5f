//! Cart/wishlist state manager.
//!
//! One [`ShopSession`] holds a shopper's in-progress selections and mirrors
//! them to a durable [`ShopStore`] under the keys `"cart"` and `"wishlist"`
//! within the session's storage scope. Hydration runs before any write is
//! allowed, and a freshly hydrated cart has its price/title/image snapshots
//! refreshed from the catalog in one batched query.

pub mod session;
pub mod storage;

pub use session::{CartLineItem, PriceSource, ProductRef, ShopSession, WishlistEntry};
pub use storage::{FileStore, MemoryStore, ShopStore, CART_KEY, WISHLIST_KEY};
