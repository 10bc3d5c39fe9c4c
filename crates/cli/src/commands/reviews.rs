//! Product review commands.

use mercado_client::context::StoreContext;
use mercado_client::error::Result;
use mercado_client::HttpBackend;
use mercado_core::ProductId;

pub async fn list(ctx: &StoreContext<HttpBackend>, product_id: ProductId) -> Result<()> {
    let reviews = ctx.reviews().list(product_id).await?;
    if reviews.is_empty() {
        println!("No reviews yet for product {product_id}.");
        return Ok(());
    }

    for review in &reviews {
        println!(
            "{} {} - {}",
            "*".repeat(usize::from(review.rating)),
            review.author,
            review.comment
        );
    }
    Ok(())
}

pub async fn submit(
    ctx: &StoreContext<HttpBackend>,
    product_id: ProductId,
    rating: u8,
    comment: &str,
) -> Result<()> {
    let review = ctx.reviews().submit(product_id, rating, comment).await?;
    println!("Review submitted ({} stars).", review.rating);
    Ok(())
}
