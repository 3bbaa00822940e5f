pub mod blog;
pub mod catalog;
pub mod checkout;
pub mod content;
pub mod coupons;
pub mod emails;
pub mod orders;
pub mod payments;
pub mod reviews;
pub mod settings;
pub mod shop;

pub use blog::BlogService;
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use content::ContentService;
pub use coupons::CouponService;
pub use emails::EmailService;
pub use orders::OrderService;
pub use payments::RazorpayClient;
pub use reviews::ReviewService;
pub use settings::SettingsService;
pub use shop::ShopService;
