use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::items::{CreateItemRequest, ItemDetail, ItemList, ItemWithSeller, UpdateItemRequest},
    entity::{
        items::{ActiveModel, Column, Entity as Items, Model as ItemModel},
        users::{ActiveModel as UserActive, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner},
    models::{Item, ItemStatus},
    response::{ApiResponse, Meta},
    routes::params::{ItemQuery, ItemSortBy},
    services::review_store,
    state::AppState,
    validation,
};

/// What the review core needs to know about an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemOwnership {
    pub item_id: Uuid,
    pub seller_id: Uuid,
    pub status: ItemStatus,
}

impl ItemOwnership {
    /// Removed listings accept no new reviews.
    pub fn is_reviewable(&self) -> bool {
        self.status != ItemStatus::Removed
    }
}

pub async fn lookup_item<C>(conn: &C, item_id: Uuid) -> AppResult<ItemOwnership>
where
    C: ConnectionTrait,
{
    let item = Items::find_by_id(item_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ItemOwnership {
        item_id: item.id,
        seller_id: item.seller_id,
        status: item.status,
    })
}

pub async fn list_items(state: &AppState, query: ItemQuery) -> AppResult<ApiResponse<ItemList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(Column::Status.eq(ItemStatus::Active));

    if let Some(search) = query.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col((Items, Column::Title)).ilike(pattern.clone()))
                .add(Expr::col((Items, Column::Description)).ilike(pattern)),
        );
    }

    if let Some(category) = validation::parse_category_filter(query.category.as_deref())? {
        condition = condition.add(Column::Category.eq(category));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let mut finder = Items::find().filter(condition);
    finder = match query.sort.unwrap_or(ItemSortBy::Newest) {
        ItemSortBy::Newest => finder.order_by_desc(Column::CreatedAt),
        ItemSortBy::PriceAsc => finder.order_by_asc(Column::Price),
        ItemSortBy::PriceDesc => finder.order_by_desc(Column::Price),
        ItemSortBy::Rating => finder
            .order_by_desc(Column::AverageRating)
            .order_by_desc(Column::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .find_also_related(Users)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(item, seller)| ItemWithSeller {
            item: item.into(),
            seller: seller.map(Into::into),
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Items fetched successfully",
        ItemList { items },
        Some(meta),
    ))
}

pub async fn get_item(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ItemDetail>> {
    let found = Items::find_by_id(id)
        .find_also_related(Users)
        .one(&state.orm)
        .await?;
    let (item, seller) = match found {
        Some((item, _)) if item.status == ItemStatus::Removed => return Err(AppError::NotFound),
        Some(found) => found,
        None => return Err(AppError::NotFound),
    };

    let reviews = review_store::find_by_item_with_authors(&state.orm, item.id).await?;
    let review_count = reviews.len() as i64;

    Ok(ApiResponse::success(
        "Item",
        ItemDetail {
            item: item.into(),
            seller: seller.map(Into::into),
            reviews,
            review_count,
        },
        None,
    ))
}

pub async fn create_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateItemRequest,
) -> AppResult<ApiResponse<Item>> {
    let title = validation::validate_title(&payload.title)?;
    let description = validation::validate_description(&payload.description)?;
    let price = validation::validate_price(payload.price)?;

    // the seller must be a known user, tokens can outlive accounts
    Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        description: Set(description),
        price: Set(price),
        category: Set(payload.category),
        image_url: Set(payload.image_url.filter(|u| !u.trim().is_empty())),
        seller_id: Set(user.user_id),
        status: Set(ItemStatus::Active),
        average_rating: NotSet,
        created_at: NotSet,
        updated_at: NotSet,
    };
    let item = active.insert(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        AuditAction::ItemCreate,
        serde_json::json!({ "item_id": item.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Item created successfully",
        Item::from(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateItemRequest,
) -> AppResult<ApiResponse<Item>> {
    let existing = find_live_item(state, id).await?;
    ensure_owner(user, existing.seller_id)?;

    let previous_status = existing.status;
    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(validation::validate_title(&title)?);
    }
    if let Some(description) = payload.description {
        active.description = Set(validation::validate_description(&description)?);
    }
    if let Some(price) = payload.price {
        active.price = Set(validation::validate_price(price)?);
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url).filter(|u| !u.trim().is_empty()));
    }
    if let Some(status) = payload.status {
        if !previous_status.can_transition_to(status) {
            return Err(AppError::validation(format!(
                "cannot change status from {previous_status:?} to {status:?}; use delete to remove an item"
            )));
        }
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now().into());

    let item = active.update(&state.orm).await?;

    if item.status != previous_status {
        refresh_items_sold(state, item.seller_id).await?;
    }

    audit::record(
        &state.pool,
        user.user_id,
        AuditAction::ItemUpdate,
        serde_json::json!({ "item_id": item.id, "status": item.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Item updated successfully",
        Item::from(item),
        Some(Meta::empty()),
    ))
}

/// Soft delete: the row and its reviews are kept so seller reputation
/// survives delisting.
pub async fn delete_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = find_live_item(state, id).await?;
    ensure_owner(user, existing.seller_id)?;

    let previous_status = existing.status;
    let seller_id = existing.seller_id;
    let mut active: ActiveModel = existing.into();
    active.status = Set(ItemStatus::Removed);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    if previous_status == ItemStatus::Sold {
        refresh_items_sold(state, seller_id).await?;
    }

    audit::record(
        &state.pool,
        user.user_id,
        AuditAction::ItemRemove,
        serde_json::json!({ "item_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Item deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn my_items(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ItemList>> {
    let items: Vec<ItemWithSeller> = Items::find()
        .filter(Column::SellerId.eq(user.user_id))
        .order_by_desc(Column::CreatedAt)
        .find_also_related(Users)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(item, seller)| ItemWithSeller {
            item: item.into(),
            seller: seller.map(Into::into),
        })
        .collect();

    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Items", ItemList { items }, Some(meta)))
}

/// Recount the seller's sold listings into `users.items_sold`.
///
/// Runs under a row lock on the seller so concurrent recounts serialise and
/// the last one sees every committed status change.
pub async fn refresh_items_sold(state: &AppState, seller_id: Uuid) -> AppResult<i32> {
    let txn = state.orm.begin().await?;

    let seller = Users::find_by_id(seller_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let sold = Items::find()
        .filter(
            Condition::all()
                .add(Column::SellerId.eq(seller_id))
                .add(Column::Status.eq(ItemStatus::Sold)),
        )
        .count(&txn)
        .await?;
    let sold = i32::try_from(sold).map_err(|e| AppError::Internal(e.into()))?;

    if seller.items_sold != sold {
        let mut active: UserActive = seller.into();
        active.items_sold = Set(sold);
        active.update(&txn).await?;
    }

    txn.commit().await?;

    tracing::debug!(%seller_id, items_sold = sold, "items sold recounted");
    Ok(sold)
}

async fn find_live_item(state: &AppState, id: Uuid) -> AppResult<ItemModel> {
    let item = Items::find_by_id(id).one(&state.orm).await?;
    match item {
        Some(item) if item.status != ItemStatus::Removed => Ok(item),
        _ => Err(AppError::NotFound),
    }
}
