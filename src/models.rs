use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use sea_orm::Iterable;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Listing category. Stored as its display name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Category {
    #[sea_orm(string_value = "Books")]
    Books,
    #[sea_orm(string_value = "Electronics")]
    Electronics,
    #[sea_orm(string_value = "Furniture")]
    Furniture,
    #[sea_orm(string_value = "Clothing")]
    Clothing,
    #[sea_orm(string_value = "Sports")]
    Sports,
    #[sea_orm(string_value = "Other")]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Books => "Books",
            Category::Electronics => "Electronics",
            Category::Furniture => "Furniture",
            Category::Clothing => "Clothing",
            Category::Sports => "Sports",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// Listing lifecycle. `Removed` is a soft delete and is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "sold")]
    Sold,
    #[sea_orm(string_value = "removed")]
    Removed,
}

impl ItemStatus {
    /// Status changes a seller may make through an item update.
    pub fn can_transition_to(self, next: ItemStatus) -> bool {
        matches!(
            (self, next),
            (ItemStatus::Active, ItemStatus::Active | ItemStatus::Sold)
                | (ItemStatus::Sold, ItemStatus::Sold | ItemStatus::Active)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub average_rating: f64,
    pub items_sold: i32,
    pub created_at: DateTime<Utc>,
}

/// Seller fields attached to listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SellerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub average_rating: f64,
    pub items_sold: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Minor currency units.
    pub price: i64,
    pub category: Category,
    pub image_url: Option<String>,
    pub seller_id: Uuid,
    pub status: ItemStatus,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Display fields of a review's author.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewAuthor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewWithAuthor {
    pub review: Review,
    pub author: Option<ReviewAuthor>,
}

/// Histogram of ratings. Always carries all five buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RatingDistribution {
    #[serde(rename = "5")]
    pub five: i64,
    #[serde(rename = "4")]
    pub four: i64,
    #[serde(rename = "3")]
    pub three: i64,
    #[serde(rename = "2")]
    pub two: i64,
    #[serde(rename = "1")]
    pub one: i64,
}

impl RatingDistribution {
    pub fn get(&self, rating: i16) -> i64 {
        match rating {
            5 => self.five,
            4 => self.four,
            3 => self.three,
            2 => self.two,
            1 => self.one,
            _ => 0,
        }
    }

    pub(crate) fn bump(&mut self, rating: i16) {
        match rating {
            5 => self.five += 1,
            4 => self.four += 1,
            3 => self.three += 1,
            2 => self.two += 1,
            1 => self.one += 1,
            _ => {}
        }
    }

    pub fn total(&self) -> i64 {
        self.five + self.four + self.three + self.two + self.one
    }
}

impl From<crate::entity::users::Model> for User {
    fn from(model: crate::entity::users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            photo_url: model.photo_url,
            average_rating: model.average_rating,
            items_sold: model.items_sold,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<crate::entity::users::Model> for SellerSummary {
    fn from(model: crate::entity::users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            photo_url: model.photo_url,
            average_rating: model.average_rating,
            items_sold: model.items_sold,
        }
    }
}

impl From<crate::entity::users::Model> for ReviewAuthor {
    fn from(model: crate::entity::users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            photo_url: model.photo_url,
        }
    }
}

impl From<crate::entity::items::Model> for Item {
    fn from(model: crate::entity::items::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            price: model.price,
            category: model.category,
            image_url: model.image_url,
            seller_id: model.seller_id,
            status: model.status,
            average_rating: model.average_rating,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<crate::entity::reviews::Model> for Review {
    fn from(model: crate::entity::reviews::Model) -> Self {
        Self {
            id: model.id,
            item_id: model.item_id,
            user_id: model.user_id,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
