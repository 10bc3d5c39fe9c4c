//! Favorites commands.
//!
//! A logged-out `add` parks the product as a pending favorite; it is
//! attached to the account on the next successful login.

use mercado_client::context::StoreContext;
use mercado_client::error::Result;
use mercado_client::HttpBackend;
use mercado_core::ProductId;

pub fn list(ctx: &StoreContext<HttpBackend>) -> Result<()> {
    if !ctx.session().is_logged_in() {
        println!("Log in to see your favorites.");
        return Ok(());
    }

    let favorites = ctx.favorites().list();
    if favorites.is_empty() {
        println!("No favorites yet.");
    } else {
        for product_id in favorites {
            println!("{product_id}");
        }
    }
    Ok(())
}

pub async fn add(ctx: &StoreContext<HttpBackend>, product_id: ProductId) -> Result<()> {
    if ctx.session().is_logged_in() {
        ctx.favorites().add(product_id).await;
        println!("Added product {product_id} to your favorites.");
    } else {
        ctx.favorites().mark_pending(product_id);
        println!("Saved. Product {product_id} will be favorited when you log in.");
    }
    Ok(())
}

pub async fn remove(ctx: &StoreContext<HttpBackend>, product_id: ProductId) -> Result<()> {
    ctx.favorites().remove(product_id).await;
    println!("Removed product {product_id} from your favorites.");
    Ok(())
}
