//! Recomputes the denormalized rating columns on `items` and `users`.
//!
//! Both recomputes re-read every relevant review row while holding a row
//! lock on the entity they write, so writers for the same item (or the
//! same seller) serialise and the last recompute always reflects every
//! committed review. These are the only writers of `average_rating`.

use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity::{
        items::{ActiveModel as ItemActive, Entity as Items},
        users::{ActiveModel as UserActive, Entity as Users},
    },
    error::{AppError, AppResult},
    models::{RatingDistribution, Review},
    rating,
    services::review_store,
};

/// Recompute and persist `items.average_rating` for `item_id`.
pub async fn recompute_item_rating(orm: &DatabaseConnection, item_id: Uuid) -> AppResult<f64> {
    let txn = orm.begin().await?;

    let item = Items::find_by_id(item_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let reviews = review_store::find_by_item(&txn, item_id).await?;
    let average = rating::average_rating(reviews.iter().map(|r| r.rating));

    if item.average_rating != average {
        let mut active: ItemActive = item.into();
        active.average_rating = Set(average);
        active.update(&txn).await?;
    }

    txn.commit().await?;

    tracing::debug!(%item_id, reviews = reviews.len(), average, "item rating recomputed");
    Ok(average)
}

/// Recompute and persist `users.average_rating` for `seller_id` across all
/// of the seller's items, removed ones included.
pub async fn recompute_seller_rating(
    orm: &DatabaseConnection,
    seller_id: Uuid,
) -> AppResult<f64> {
    let txn = orm.begin().await?;

    let seller = Users::find_by_id(seller_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let reviews = review_store::find_by_seller_items(&txn, seller_id).await?;
    let average = rating::average_rating(reviews.iter().map(|r| r.rating));

    if seller.average_rating != average {
        let mut active: UserActive = seller.into();
        active.average_rating = Set(average);
        active.update(&txn).await?;
    }

    txn.commit().await?;

    tracing::debug!(%seller_id, reviews = reviews.len(), average, "seller rating recomputed");
    Ok(average)
}

/// Rating histogram for display; not persisted.
pub fn distribution<'a, I>(reviews: I) -> RatingDistribution
where
    I: IntoIterator<Item = &'a Review>,
{
    rating::distribution(reviews)
}
