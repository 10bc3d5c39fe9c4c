//! Cart commands.

use mercado_client::context::StoreContext;
use mercado_client::error::Result;
use mercado_client::{Backend, HttpBackend};
use mercado_core::ProductId;

pub async fn show(ctx: &StoreContext<HttpBackend>) -> Result<()> {
    let items = ctx.cart().refresh().await;

    if items.is_empty() {
        println!("Your cart is empty.");
        return Ok(());
    }

    for item in &items {
        println!(
            "{:>4} x {:<40} {:>12}  (id {})",
            item.quantity,
            item.product.name,
            item.line_total().display(),
            item.product.id
        );
    }
    println!("{:>60}", format!("Total: {}", ctx.cart().total().display()));
    Ok(())
}

pub async fn add(
    ctx: &StoreContext<HttpBackend>,
    product_id: ProductId,
    quantity: u32,
) -> Result<()> {
    let product = ctx.backend().fetch_product(product_id).await?;
    let name = product.name.clone();
    ctx.cart().add_item(product, quantity).await;
    println!("Added {quantity} x {name} to your cart.");
    Ok(())
}

pub async fn set_quantity(
    ctx: &StoreContext<HttpBackend>,
    product_id: ProductId,
    quantity: u32,
) -> Result<()> {
    ctx.cart().set_quantity(product_id, quantity).await;
    if quantity == 0 {
        println!("Removed product {product_id} from your cart.");
    } else {
        println!("Set product {product_id} to quantity {quantity}.");
    }
    Ok(())
}

pub async fn remove(ctx: &StoreContext<HttpBackend>, product_id: ProductId) -> Result<()> {
    ctx.cart().remove_item(product_id).await;
    println!("Removed product {product_id} from your cart.");
    Ok(())
}

pub async fn clear(ctx: &StoreContext<HttpBackend>) -> Result<()> {
    ctx.cart().clear().await;
    println!("Cart cleared.");
    Ok(())
}
