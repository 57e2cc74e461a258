use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::reviews::{ItemReviews, SellerStats, SubmitReviewRequest, SubmitReviewResponse},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::review_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/item/{item_id}", get(get_item_reviews))
        .route("/seller/{seller_id}", get(get_seller_stats))
        .route("/{item_id}", post(submit_review))
}

#[utoipa::path(
    post,
    path = "/api/reviews/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Item ID")
    ),
    request_body = SubmitReviewRequest,
    responses(
        (status = 201, description = "Review stored, averages refreshed", body = ApiResponse<SubmitReviewResponse>),
        (status = 400, description = "Rating is not an integer between 1 and 5"),
        (status = 403, description = "Sellers cannot review their own items"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn submit_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<SubmitReviewRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SubmitReviewResponse>>)> {
    let resp = review_service::submit_review(&state, &user, item_id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/reviews/item/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Reviews newest first with stats", body = ApiResponse<ItemReviews>),
        (status = 404, description = "Item not found")
    ),
    tag = "Reviews"
)]
pub async fn get_item_reviews(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ItemReviews>>> {
    let resp = review_service::get_item_reviews(&state, item_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reviews/seller/{seller_id}",
    params(
        ("seller_id" = Uuid, Path, description = "Seller (user) ID")
    ),
    responses(
        (status = 200, description = "Seller reputation", body = ApiResponse<SellerStats>),
        (status = 404, description = "Seller not found")
    ),
    tag = "Reviews"
)]
pub async fn get_seller_stats(
    State(state): State<AppState>,
    Path(seller_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SellerStats>>> {
    let resp = review_service::get_seller_stats(&state, seller_id).await?;
    Ok(Json(resp))
}
