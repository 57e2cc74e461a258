use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Category, Item, ItemStatus, ReviewWithAuthor, SellerSummary};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub category: Category,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub category: Option<Category>,
    pub image_url: Option<String>,
    pub status: Option<ItemStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemWithSeller {
    pub item: Item,
    pub seller: Option<SellerSummary>,
}

#[derive(Serialize, ToSchema)]
pub struct ItemList {
    pub items: Vec<ItemWithSeller>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemDetail {
    pub item: Item,
    pub seller: Option<SellerSummary>,
    pub reviews: Vec<ReviewWithAuthor>,
    pub review_count: i64,
}
