pub mod product;

pub use product::{max_price, NewProduct, Product, ProductPatch, PRICE_SCALE};
