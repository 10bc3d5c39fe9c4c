//! Product review model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mercado_core::{ProductId, ReviewId};

/// Lowest accepted rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted rating.
pub const MAX_RATING: u8 = 5;

/// A product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Backend review ID.
    pub id: ReviewId,
    /// Reviewed product.
    pub product_id: ProductId,
    /// Star rating, 1-5.
    pub rating: u8,
    /// Free-form comment.
    pub comment: String,
    /// Display name of the author.
    pub author: String,
    /// When the review was submitted.
    pub created_at: DateTime<Utc>,
}

/// Clamp a rating into the accepted 1-5 range.
#[must_use]
pub const fn clamp_rating(rating: u8) -> u8 {
    if rating < MIN_RATING {
        MIN_RATING
    } else if rating > MAX_RATING {
        MAX_RATING
    } else {
        rating
    }
}
