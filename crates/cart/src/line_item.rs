use serde::{Deserialize, Serialize};

use techno_catalog::Product;
use techno_core::{Price, ProductId, ValueObject};

/// A product as it was when it went into the cart.
///
/// Price and name are copied, so reloading the catalog with new prices never
/// changes what the cart already totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ProductId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "preco")]
    pub price: Price,
}

impl CartLineItem {
    pub fn new(id: ProductId, name: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            name: name.into(),
            price,
        }
    }

    pub fn snapshot(product: &Product) -> Self {
        Self::new(product.id_typed().clone(), product.name(), product.price())
    }
}

impl ValueObject for CartLineItem {}
