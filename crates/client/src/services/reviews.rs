//! Product review service.
//!
//! Reviews are remote-only: reading needs no session, writing does. The
//! only local processing is clamping the rating into the 1-5 scale before
//! it reaches the backend.

use std::sync::Arc;

use tracing::instrument;

use mercado_core::ProductId;

use crate::backend::Backend;
use crate::error::{ClientError, Result};
use crate::models::review::{Review, clamp_rating};
use crate::services::session::SessionService;

/// Remote-backed product reviews.
pub struct ReviewService<B> {
    backend: Arc<B>,
    session: Arc<SessionService<B>>,
}

impl<B: Backend> ReviewService<B> {
    pub fn new(backend: Arc<B>, session: Arc<SessionService<B>>) -> Self {
        Self { backend, session }
    }

    /// Reviews for a product, newest ordering as the backend returns them.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Backend` when the fetch fails; reviews have no
    /// local fallback.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn list(&self, product_id: ProductId) -> Result<Vec<Review>> {
        Ok(self.backend.fetch_reviews(product_id).await?)
    }

    /// Submit a review for a product.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a session,
    /// `ClientError::Validation` for an empty comment, and
    /// `ClientError::Backend` when the backend rejects the review.
    #[instrument(skip(self, comment), fields(product_id = %product_id, rating))]
    pub async fn submit(
        &self,
        product_id: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<Review> {
        if !self.session.is_logged_in() {
            return Err(ClientError::NotAuthenticated);
        }

        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ClientError::Validation(
                "Please write a comment for your review.".to_owned(),
            ));
        }

        let review = self
            .backend
            .create_review(product_id, clamp_rating(rating), comment)
            .await?;
        Ok(review)
    }
}
