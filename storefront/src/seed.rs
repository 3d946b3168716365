// storefront/src/seed.rs

use crate::errors::Result;
use crate::models::Product;
use crate::store::Store;
use tracing::info;

fn demo_catalog() -> Vec<Product> {
  vec![
    Product::new("Ceramic Mug", 1_250, 40)
      .with_description("350 ml stoneware mug, dishwasher safe.")
      .with_image_url("/images/ceramic-mug.jpg"),
    Product::new("Pour-Over Kettle", 4_999, 12)
      .with_description("Gooseneck kettle with built-in thermometer.")
      .with_image_url("/images/pour-over-kettle.jpg"),
    Product::new("Burr Grinder", 12_900, 5)
      .with_description("Conical burr grinder with 40 grind settings.")
      .with_image_url("/images/burr-grinder.jpg"),
    Product::new("Paper Filters (100)", 599, 200).with_description("Unbleached cone filters, size 02."),
    Product::new("Espresso Beans 1kg", 2_450, 25)
      .with_description("Medium roast blend.")
      .with_image_url("/images/espresso-beans.jpg"),
  ]
}

/// Inserts the demo catalog if the store has no products yet.
/// Returns how many products were inserted.
pub async fn seed_catalog(store: &dyn Store) -> Result<usize> {
  if !store.list_products().await?.is_empty() {
    info!("Catalog already populated, skipping seed.");
    return Ok(0);
  }

  let catalog = demo_catalog();
  for product in &catalog {
    store.upsert_product(product).await?;
  }
  info!(count = catalog.len(), "Seeded demo catalog.");
  Ok(catalog.len())
}
