use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::reviews::{ItemReviews, ReviewStats, SellerStats, SubmitReviewRequest, SubmitReviewResponse},
    entity::{
        items::{Column as ItemCol, Entity as Items},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{ItemStatus, Review, ReviewWithAuthor},
    rating,
    response::{ApiResponse, Meta},
    services::{
        item_service,
        rating_aggregator,
        review_store::{self, UpsertKind},
    },
    state::AppState,
    validation,
};

/// Create or replace the caller's review of an item, then refresh the
/// item and seller averages from the full review set.
///
/// If a recompute fails the review stays committed; the next successful
/// recompute for that item or seller converges the aggregate.
pub async fn submit_review(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    payload: SubmitReviewRequest,
) -> AppResult<ApiResponse<SubmitReviewResponse>> {
    let rating = validation::validate_rating(payload.rating)?;
    let comment = validation::validate_comment(payload.comment)?;

    // item existence, removal and self-review are checked by the store
    let upserted = review_store::upsert(&state.orm, item_id, user.user_id, rating, comment).await?;
    let seller_id = upserted.item.seller_id;
    tracing::info!(
        review_id = %upserted.review.id,
        %item_id,
        user_id = %user.user_id,
        rating,
        created = upserted.kind == UpsertKind::Created,
        "review stored"
    );

    let item_average = rating_aggregator::recompute_item_rating(&state.orm, item_id).await?;
    let seller_average =
        rating_aggregator::recompute_seller_rating(&state.orm, seller_id).await?;
    tracing::info!(
        %item_id,
        %seller_id,
        item_average,
        seller_average,
        "ratings recomputed"
    );

    let author = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .map(Into::into);

    audit::record(
        &state.pool,
        user.user_id,
        AuditAction::ReviewSubmit,
        serde_json::json!({
            "item_id": item_id,
            "review_id": upserted.review.id,
            "rating": rating,
        }),
    )
    .await;

    let message = match upserted.kind {
        UpsertKind::Created => "Review added successfully",
        UpsertKind::Updated => "Review updated successfully",
    };

    Ok(ApiResponse::success(
        message,
        SubmitReviewResponse {
            review: ReviewWithAuthor {
                review: upserted.review,
                author,
            },
            item_average_rating: item_average,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_item_reviews(
    state: &AppState,
    item_id: Uuid,
) -> AppResult<ApiResponse<ItemReviews>> {
    // removed items still expose their review history
    item_service::lookup_item(&state.orm, item_id).await?;

    let reviews = review_store::find_by_item_with_authors(&state.orm, item_id).await?;
    let stats = stats_of(reviews.iter().map(|r| &r.review));

    let meta = Meta::count(reviews.len());
    Ok(ApiResponse::success(
        "Reviews",
        ItemReviews { reviews, stats },
        Some(meta),
    ))
}

pub async fn get_seller_stats(
    state: &AppState,
    seller_id: Uuid,
) -> AppResult<ApiResponse<SellerStats>> {
    Users::find_by_id(seller_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items_listed = Items::find()
        .filter(ItemCol::SellerId.eq(seller_id))
        .count(&state.orm)
        .await? as i64;
    let items_sold = Items::find()
        .filter(ItemCol::SellerId.eq(seller_id))
        .filter(ItemCol::Status.eq(ItemStatus::Sold))
        .count(&state.orm)
        .await? as i64;

    let reviews = review_store::find_by_seller_items(&state.orm, seller_id).await?;
    let stats = stats_of(reviews.iter());

    Ok(ApiResponse::success(
        "Seller stats",
        SellerStats {
            total_reviews: stats.total_reviews,
            average_rating: stats.average_rating,
            items_listed,
            items_sold,
            rating_distribution: stats.rating_distribution,
        },
        Some(Meta::empty()),
    ))
}

fn stats_of<'a, I>(reviews: I) -> ReviewStats
where
    I: IntoIterator<Item = &'a Review> + Clone,
{
    let rating_distribution = rating_aggregator::distribution(reviews.clone());
    ReviewStats {
        total_reviews: rating_distribution.total(),
        average_rating: rating::average_rating(reviews.into_iter().map(|r| r.rating)),
        rating_distribution,
    }
}
