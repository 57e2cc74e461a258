//! Review rows keyed by (item_id, user_id).

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, SqlErr,
};
use uuid::Uuid;

use crate::{
    entity::{
        items::Column as ItemCol,
        reviews::{
            ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews,
            Model as ReviewModel, Relation as ReviewRelation,
        },
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    models::{Review, ReviewWithAuthor},
    rating::is_valid_rating,
    services::item_service::{self, ItemOwnership},
};

/// Whether an upsert created the row or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertKind {
    Created,
    Updated,
}

#[derive(Debug, Clone)]
pub struct Upserted {
    pub review: Review,
    pub kind: UpsertKind,
    /// The reviewed item as seen by the precondition checks.
    pub item: ItemOwnership,
}

/// Create or overwrite the single review for `(item_id, user_id)`.
///
/// The item must exist and not be removed, and the reviewer must not be its
/// seller. An existing row keeps its id and `created_at`.
pub async fn upsert<C>(
    conn: &C,
    item_id: Uuid,
    user_id: Uuid,
    rating: i16,
    comment: String,
) -> AppResult<Upserted>
where
    C: ConnectionTrait,
{
    if !is_valid_rating(rating) {
        return Err(AppError::validation(
            "Rating must be an integer between 1 and 5",
        ));
    }

    let item = item_service::lookup_item(conn, item_id).await?;
    if !item.is_reviewable() {
        return Err(AppError::NotFound);
    }
    if item.seller_id == user_id {
        return Err(AppError::Forbidden(
            "You cannot review your own items".into(),
        ));
    }

    if let Some(existing) = find_one(conn, item_id, user_id).await? {
        let review = overwrite(conn, existing, rating, comment).await?;
        return Ok(Upserted {
            review,
            kind: UpsertKind::Updated,
            item,
        });
    }

    let active = ReviewActive {
        id: Set(Uuid::new_v4()),
        item_id: Set(item_id),
        user_id: Set(user_id),
        rating: Set(rating),
        comment: Set(comment.clone()),
        created_at: NotSet,
        updated_at: NotSet,
    };

    match active.insert(conn).await {
        Ok(model) => Ok(Upserted {
            review: model.into(),
            kind: UpsertKind::Created,
            item,
        }),
        Err(err) if is_unique_violation(&err) => {
            // A concurrent submission with the same key won the insert.
            tracing::debug!(%item_id, %user_id, "review insert raced, retrying as update");
            let existing = find_one(conn, item_id, user_id)
                .await?
                .ok_or(AppError::Conflict)?;
            let review = overwrite(conn, existing, rating, comment).await?;
            Ok(Upserted {
                review,
                kind: UpsertKind::Updated,
                item,
            })
        }
        Err(err) => Err(err.into()),
    }
}

async fn overwrite<C>(
    conn: &C,
    existing: ReviewModel,
    rating: i16,
    comment: String,
) -> AppResult<Review>
where
    C: ConnectionTrait,
{
    let mut active: ReviewActive = existing.into();
    active.rating = Set(rating);
    active.comment = Set(comment);
    active.updated_at = Set(Utc::now().into());
    let model = active.update(conn).await?;
    Ok(model.into())
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

pub async fn find_one<C>(conn: &C, item_id: Uuid, user_id: Uuid) -> AppResult<Option<ReviewModel>>
where
    C: ConnectionTrait,
{
    let review = Reviews::find()
        .filter(
            Condition::all()
                .add(ReviewCol::ItemId.eq(item_id))
                .add(ReviewCol::UserId.eq(user_id)),
        )
        .one(conn)
        .await?;
    Ok(review)
}

/// All reviews of one item, unordered.
pub async fn find_by_item<C>(conn: &C, item_id: Uuid) -> AppResult<Vec<Review>>
where
    C: ConnectionTrait,
{
    let reviews = Reviews::find()
        .filter(ReviewCol::ItemId.eq(item_id))
        .all(conn)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();
    Ok(reviews)
}

/// Reviews across every item the seller has listed, whatever its status.
pub async fn find_by_seller_items<C>(conn: &C, seller_id: Uuid) -> AppResult<Vec<Review>>
where
    C: ConnectionTrait,
{
    let reviews = Reviews::find()
        .join(JoinType::InnerJoin, ReviewRelation::Items.def())
        .filter(ItemCol::SellerId.eq(seller_id))
        .all(conn)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();
    Ok(reviews)
}

/// Reviews of one item with their authors, newest first.
pub async fn find_by_item_with_authors<C>(
    conn: &C,
    item_id: Uuid,
) -> AppResult<Vec<ReviewWithAuthor>>
where
    C: ConnectionTrait,
{
    let rows = Reviews::find()
        .filter(ReviewCol::ItemId.eq(item_id))
        .order_by_desc(ReviewCol::CreatedAt)
        .order_by_desc(ReviewCol::Id)
        .find_also_related(Users)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(review, author)| ReviewWithAuthor {
            review: review.into(),
            author: author.map(Into::into),
        })
        .collect())
}
