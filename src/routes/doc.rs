use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, UserProfile},
        items::{CreateItemRequest, ItemDetail, ItemList, ItemWithSeller, UpdateItemRequest},
        reviews::{ItemReviews, ReviewStats, SellerStats, SubmitReviewRequest, SubmitReviewResponse},
    },
    models::{
        Category, Item, ItemStatus, RatingDistribution, Review, ReviewAuthor, ReviewWithAuthor,
        SellerSummary, User,
    },
    response::{ApiResponse, Meta},
    routes::{auth, health, items, params, reviews},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        auth::profile,
        items::list_items,
        items::get_item,
        items::create_item,
        items::update_item,
        items::delete_item,
        items::my_items,
        reviews::submit_review,
        reviews::get_item_reviews,
        reviews::get_seller_stats
    ),
    components(
        schemas(
            User,
            SellerSummary,
            Item,
            ItemStatus,
            Category,
            Review,
            ReviewAuthor,
            ReviewWithAuthor,
            RatingDistribution,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UserProfile,
            CreateItemRequest,
            UpdateItemRequest,
            ItemWithSeller,
            ItemList,
            ItemDetail,
            SubmitReviewRequest,
            SubmitReviewResponse,
            ReviewStats,
            ItemReviews,
            SellerStats,
            params::Pagination,
            params::ItemSortBy,
            params::ItemQuery,
            health::HealthData,
            Meta,
            ApiResponse<User>,
            ApiResponse<Item>,
            ApiResponse<ItemList>,
            ApiResponse<ItemDetail>,
            ApiResponse<SubmitReviewResponse>,
            ApiResponse<ItemReviews>,
            ApiResponse<SellerStats>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Campus sign-up, login and profiles"),
        (name = "Items", description = "Marketplace listings"),
        (name = "Reviews", description = "Item reviews and seller reputation"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
