// storefront/src/models/mod.rs

//! Catalog, cart and order entities plus the response shapes built from them.

pub mod cart;
pub mod order;
pub mod product;

pub use cart::{Cart, CartItem, CartLineView, CartView};
pub use order::{Order, OrderItem, OrderStatus};
pub use product::{Product, ProductSummary};
