use serde::{Deserialize, Serialize};

use techno_core::{DomainError, DomainResult, Entity, Price, ProductId};

/// Catalog product.
///
/// Field names on the wire follow the catalog data files (`nome`, `preco`,
/// `estoque`, ...). Stock is only ever changed through [`Product::take_one`]
/// (an accepted add-to-cart) and [`Product::withhold`] (reconciliation
/// against the session cart).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    #[serde(rename = "nome")]
    name: String,
    #[serde(rename = "preco")]
    price: Price,
    /// Listing payloads may omit stock; detail payloads always carry it.
    #[serde(rename = "estoque", default)]
    stock: u32,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    img: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alt: Option<String>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: Price, stock: u32) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            stock,
            description: None,
            img: None,
            alt: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_image(mut self, img: impl Into<String>, alt: impl Into<String>) -> Self {
        self.img = Some(img.into());
        self.alt = Some(alt.into());
        self
    }

    pub fn id_typed(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn img(&self) -> Option<&str> {
        self.img.as_deref()
    }

    pub fn alt(&self) -> Option<&str> {
        self.alt.as_deref()
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Remove one unit from stock.
    pub fn take_one(&mut self) -> DomainResult<()> {
        if self.stock == 0 {
            return Err(DomainError::OutOfStock(self.id.clone()));
        }
        self.stock -= 1;
        Ok(())
    }

    /// Subtract units already reserved elsewhere, clamping at zero.
    pub fn withhold(&mut self, reserved: u32) {
        self.stock = self.stock.saturating_sub(reserved);
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
