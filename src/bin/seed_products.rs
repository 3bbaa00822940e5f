//! Seeds the catalog with the launch collection. Safe to re-run: products
//! whose handle already exists are skipped.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{error, info, warn};

use doree_api as api;
use api::services::catalog::ProductInput;
use api::services::CatalogService;

struct Seed {
    title: &'static str,
    handle: &'static str,
    price: Decimal,
    original_price: Option<Decimal>,
    image: &'static str,
    image_count: usize,
    tag: Option<&'static str>,
    category: &'static str,
    description: &'static str,
    sizes: &'static [&'static str],
    colors: &'static [&'static str],
    details: &'static [&'static str],
    rating: f64,
    review_count: i32,
}

fn launch_collection() -> Vec<Seed> {
    vec![
        Seed {
            title: "The Oxford Heritage Knit",
            handle: "oxford-heritage-knit",
            price: dec!(3499),
            original_price: None,
            image: "/assets/IMG_2355.PNG",
            image_count: 3,
            tag: Some("New"),
            category: "Knitwear",
            description: "A classic reborn. The Oxford Heritage Knit combines traditional craftsmanship with modern comfort. Made from 100% premium wool, it features a timeless textured weave that provides potential warmth without the bulk. Perfect for layering over a crisp shirt.",
            sizes: &["S", "M", "L", "XL"],
            colors: &["Navy", "Grey", "Cream"],
            details: &["100% Premium Wool", "Textured Weave", "Regular Fit", "Hand Wash Only"],
            rating: 4.8,
            review_count: 124,
        },
        Seed {
            title: "Cambridge Cable-Knit",
            handle: "cambridge-cable-knit",
            price: dec!(2999),
            original_price: Some(dec!(4500)),
            image: "/assets/IMG_2204.PNG",
            image_count: 3,
            tag: Some("Sale"),
            category: "Knitwear",
            description: "The Cambridge Cable-Knit is a testament to timeless style. Crafted from a luxurious blend of wool and cashmere, it offers unparalleled softness and warmth. The intricate cable pattern adds texture and depth, making it a versatile piece for both casual and formal occasions.",
            sizes: &["XS", "S", "M", "L", "XL"],
            colors: &["Beige", "Brown"],
            details: &["Premium Wool & Cashmere Blend", "Ribbed cuffs and hem", "Relaxed fit", "Dry clean only"],
            rating: 4.9,
            review_count: 89,
        },
        Seed {
            title: "Lucas Cotton Sweater",
            handle: "lucas-cotton-sweater",
            price: dec!(3200),
            original_price: None,
            image: "/assets/IMG_2354.PNG",
            image_count: 2,
            tag: None,
            category: "Knitwear",
            description: "Lightweight, breathable, and effortlessly stylish. The Lucas Cotton Sweater is designed for transitional weather. Featuring a fine gauge knit and a soft hand feel, it's an essential staple for any wardrobe.",
            sizes: &["S", "M", "L", "XL"],
            colors: &["Black", "Charcoal"],
            details: &["100% Organic Cotton", "Fine Gauge Knit", "Crew Neck", "Machine Washable"],
            rating: 4.7,
            review_count: 56,
        },
        Seed {
            title: "Alcott Fine-Gauge Crewneck",
            handle: "alcott-fine-gauge",
            price: dec!(2800),
            original_price: None,
            image: "/assets/IMG_2369.PNG",
            image_count: 2,
            tag: None,
            category: "Knitwear",
            description: "Simplicity at its finest. The Alcott Crewneck offers a sleek silhouette with its fine-gauge construction. Ideal for wearing under blazers or on its own for a sharp, minimalist look.",
            sizes: &["S", "M", "L", "XL"],
            colors: &["Navy", "Black", "Grey"],
            details: &["Merino Wool Blend", "Slim Fit", "Ribbed Trims", "Dry Clean Recommended"],
            rating: 4.6,
            review_count: 32,
        },
        Seed {
            title: "Merino Wool Turtle Neck",
            handle: "merino-turtle-neck",
            price: dec!(4200),
            original_price: None,
            image: "/assets/IMG_2363.PNG",
            image_count: 2,
            tag: None,
            category: "Knitwear",
            description: "Elevate your winter style with our Merino Wool Turtle Neck. Exceptionally soft and warm, this piece offers a sophisticated look that pairs perfectly with tailored trousers or denim.",
            sizes: &["S", "M", "L", "XL"],
            colors: &["Cream", "Black"],
            details: &["100% Merino Wool", "Roll Neck", "Regular Fit", "Hand Wash Cold"],
            rating: 5.0,
            review_count: 15,
        },
        Seed {
            title: "Classic Pleated Trousers",
            handle: "classic-pleated-trousers",
            price: dec!(3800),
            original_price: None,
            image: "/assets/IMG_2258.PNG",
            image_count: 2,
            tag: None,
            category: "Trousers",
            description: "Tailored for the modern gentleman. These Classic Pleated Trousers feature a high waist and a single pleat for a comfortable yet refined fit. Cut from a premium wool blend fabric.",
            sizes: &["30", "32", "34", "36"],
            colors: &["Grey", "Navy", "Khaki"],
            details: &["Wool Blend", "Single Pleat", "Tapered Leg", "Dry Clean Only"],
            rating: 4.8,
            review_count: 42,
        },
        Seed {
            title: "Tailored Linen Shirt",
            handle: "tailored-linen-shirt",
            price: dec!(2500),
            original_price: None,
            image: "/assets/IMG_2256.PNG",
            image_count: 2,
            tag: None,
            category: "Shirts",
            description: "Breezy and sophisticated. Our Tailored Linen Shirt is crafted from the finest European linen, offering breathable comfort for warmer days. Finished with mother-of-pearl buttons.",
            sizes: &["S", "M", "L", "XL"],
            colors: &["White", "Blue", "Beige"],
            details: &["100% Linen", "Tailored Fit", "Button-down Collar", "Machine Wash Cold"],
            rating: 4.5,
            review_count: 28,
        },
        Seed {
            title: "Textured Knit Polo",
            handle: "textured-knit-polo",
            price: dec!(3100),
            original_price: None,
            image: "/assets/IMG_2366.PNG",
            image_count: 2,
            tag: None,
            category: "Accessories",
            description: "A retro-inspired classic. This Textured Knit Polo features a unique open weave pattern and a vintage style collar. It brings texture and character to any outfit.",
            sizes: &["S", "M", "L", "XL"],
            colors: &["Brown", "Cream"],
            details: &["Cotton Blend", "Open Weave Texture", "Polo Collar", "Hand Wash"],
            rating: 4.7,
            review_count: 38,
        },
    ]
}

impl Seed {
    fn into_input(self, sort_order: i32) -> ProductInput {
        ProductInput {
            title: self.title.to_string(),
            handle: self.handle.to_string(),
            price: self.price,
            original_price: self.original_price,
            image: self.image.to_string(),
            images: vec![self.image.to_string(); self.image_count],
            tag: self.tag.map(str::to_string),
            category: Some(self.category.to_string()),
            description: Some(self.description.to_string()),
            sizes: self.sizes.iter().map(|s| s.to_string()).collect(),
            colors: self.colors.iter().map(|s| s.to_string()).collect(),
            details: self.details.iter().map(|s| s.to_string()).collect(),
            rating: Some(self.rating),
            review_count: Some(self.review_count),
            in_stock: true,
            sort_order,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let db = std::sync::Arc::new(api::db::establish_connection(&cfg).await?);
    api::db::run_migrations(&db).await?;

    let (event_tx, mut event_rx) = tokio::sync::mpsc::channel(64);
    tokio::spawn(async move { while event_rx.recv().await.is_some() {} });
    let catalog = CatalogService::new(db, api::events::EventSender::new(event_tx));

    let mut created = 0u32;
    let mut skipped = 0u32;
    let mut errors = 0u32;

    for (i, seed) in launch_collection().into_iter().enumerate() {
        let handle = seed.handle;
        if catalog.get_by_handle(handle).await.is_ok() {
            warn!(handle, "already present, skipping");
            skipped += 1;
            continue;
        }
        match catalog.create_product(seed.into_input(i as i32)).await {
            Ok(product) => {
                info!(handle, id = %product.id, "created");
                created += 1;
            }
            Err(e) => {
                error!(handle, "failed: {e}");
                errors += 1;
            }
        }
    }

    info!(created, skipped, errors, "seeding finished");
    if errors > 0 {
        return Err(format!("{errors} products failed to seed").into());
    }
    Ok(())
}
