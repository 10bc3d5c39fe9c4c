//! Product review flows: guest reads, authenticated writes, rating clamp.

use mercado_client::ClientError;
use mercado_core::ProductId;
use mercado_integration_tests::test_context;

#[tokio::test]
async fn test_guest_can_read_reviews() {
    let (ctx, _store) = test_context();

    let reviews = ctx
        .reviews()
        .list(ProductId::new(1))
        .await
        .expect("guest review read should succeed");
    assert!(reviews.is_empty());
}

#[tokio::test]
async fn test_submit_requires_session() {
    let (ctx, _store) = test_context();

    let err = ctx
        .reviews()
        .submit(ProductId::new(1), 4, "Muy bueno")
        .await
        .expect_err("guest submission should fail");

    assert!(matches!(err, ClientError::NotAuthenticated));
}

#[tokio::test]
async fn test_submitted_review_is_listed() {
    let (ctx, _store) = test_context();
    ctx.backend().seed_user("ana@example.com", "pw12345678", "Ana");
    ctx.login("ana@example.com", "pw12345678")
        .await
        .expect("login should succeed");

    ctx.reviews()
        .submit(ProductId::new(1), 4, "Muy bueno")
        .await
        .expect("submission should succeed");

    let reviews = ctx
        .reviews()
        .list(ProductId::new(1))
        .await
        .expect("review read should succeed");
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].author, "Ana");
    assert_eq!(reviews[0].rating, 4);
}

#[tokio::test]
async fn test_out_of_range_rating_is_clamped() {
    let (ctx, _store) = test_context();
    ctx.backend().seed_user("ana@example.com", "pw12345678", "Ana");
    ctx.login("ana@example.com", "pw12345678")
        .await
        .expect("login should succeed");

    let high = ctx
        .reviews()
        .submit(ProductId::new(1), 9, "Demasiado bueno")
        .await
        .expect("submission should succeed");
    assert_eq!(high.rating, 5);

    let low = ctx
        .reviews()
        .submit(ProductId::new(2), 0, "Malo")
        .await
        .expect("submission should succeed");
    assert_eq!(low.rating, 1);
}

#[tokio::test]
async fn test_blank_comment_rejected_before_network() {
    let (ctx, _store) = test_context();
    ctx.backend().seed_user("ana@example.com", "pw12345678", "Ana");
    ctx.login("ana@example.com", "pw12345678")
        .await
        .expect("login should succeed");

    ctx.backend().set_offline(true);
    let err = ctx
        .reviews()
        .submit(ProductId::new(1), 4, "   ")
        .await
        .expect_err("blank comment should fail");

    // Fails on validation, not on the (offline) backend.
    assert!(matches!(err, ClientError::Validation(_)));
}
