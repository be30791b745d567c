use techno_catalog::Product;

use crate::cart::Cart;

/// Subtract what the session cart already holds from a freshly fetched
/// product's stock.
///
/// The catalog source is static and always reports pristine stock, so every
/// time a product is opened its displayed stock has to be re-derived locally.
/// Returns the number of units withheld.
pub fn reconcile_stock(product: &mut Product, cart: &Cart) -> u32 {
    let reserved = cart.reserved(product.id_typed());
    product.withhold(reserved);
    reserved
}
