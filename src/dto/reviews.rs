use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{RatingDistribution, ReviewWithAuthor};

/// `rating` is taken as any JSON number so that fractional and missing
/// values surface as validation errors instead of body rejections.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitReviewRequest {
    pub rating: Option<f64>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitReviewResponse {
    pub review: ReviewWithAuthor,
    pub item_average_rating: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewStats {
    pub total_reviews: i64,
    pub average_rating: f64,
    pub rating_distribution: RatingDistribution,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemReviews {
    pub reviews: Vec<ReviewWithAuthor>,
    pub stats: ReviewStats,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SellerStats {
    pub total_reviews: i64,
    pub average_rating: f64,
    pub items_listed: i64,
    pub items_sold: i64,
    pub rating_distribution: RatingDistribution,
}
