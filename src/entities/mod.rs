pub mod blog_post;
pub mod cms_content;
pub mod coupon;
pub mod order;
pub mod product;
pub mod review;
pub mod store_settings;

pub use blog_post::Entity as BlogPost;
pub use cms_content::Entity as CmsContent;
pub use coupon::Entity as Coupon;
pub use order::Entity as Order;
pub use product::Entity as Product;
pub use review::Entity as Review;
pub use store_settings::Entity as StoreSettings;
