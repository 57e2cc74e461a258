mod common;

use campus_classifieds_api::{
    dto::items::UpdateItemRequest,
    entity::users::Entity as Users,
    error::AppError,
    models::ItemStatus,
    routes::params::ItemQuery,
    services::{auth_service, item_service, review_service},
    state::AppState,
};
use common::{create_item, create_user, setup_state, submit};
use sea_orm::EntityTrait;
use tokio::task::JoinSet;
use uuid::Uuid;

async fn items_sold(state: &AppState, user_id: Uuid) -> i32 {
    Users::find_by_id(user_id)
        .one(&state.orm)
        .await
        .expect("query user")
        .expect("user exists")
        .items_sold
}

fn set_status(status: ItemStatus) -> UpdateItemRequest {
    UpdateItemRequest {
        status: Some(status),
        ..Default::default()
    }
}

#[tokio::test]
async fn listing_search_finds_active_items() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let seller = create_user(&state, "Seller").await?;
    let marker = Uuid::new_v4().simple().to_string();
    let item_id = create_item(&state, &seller, &format!("Organic chemistry {marker}")).await?;

    let found = item_service::list_items(
        &state,
        ItemQuery {
            q: Some(marker.to_uppercase()),
            category: Some("books".into()),
            ..Default::default()
        },
    )
    .await?
    .into_data()
    .expect("items");
    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].item.id, item_id);
    let listed_by = found.items[0].seller.as_ref().expect("seller");
    assert_eq!(listed_by.id, seller.user_id);

    let other_category = item_service::list_items(
        &state,
        ItemQuery {
            q: Some(marker.clone()),
            category: Some("Furniture".into()),
            ..Default::default()
        },
    )
    .await?
    .into_data()
    .expect("items");
    assert!(other_category.items.is_empty());

    item_service::update_item(&state, &seller, item_id, set_status(ItemStatus::Sold)).await?;
    let after_sale = item_service::list_items(
        &state,
        ItemQuery {
            q: Some(marker),
            ..Default::default()
        },
    )
    .await?
    .into_data()
    .expect("items");
    assert!(after_sale.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_category_filter_is_rejected() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let err = item_service::list_items(
        &state,
        ItemQuery {
            category: Some("Vehicles".into()),
            ..Default::default()
        },
    )
    .await
    .err()
    .expect("unknown category");
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn marking_sold_updates_the_sellers_counter() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let seller = create_user(&state, "Seller").await?;
    let item_id = create_item(&state, &seller, "Scientific calculator").await?;
    assert_eq!(items_sold(&state, seller.user_id).await, 0);

    let sold = item_service::update_item(&state, &seller, item_id, set_status(ItemStatus::Sold))
        .await?
        .into_data()
        .expect("item");
    assert_eq!(sold.status, ItemStatus::Sold);
    assert_eq!(items_sold(&state, seller.user_id).await, 1);

    item_service::update_item(&state, &seller, item_id, set_status(ItemStatus::Active)).await?;
    assert_eq!(items_sold(&state, seller.user_id).await, 0);

    item_service::update_item(&state, &seller, item_id, set_status(ItemStatus::Sold)).await?;
    item_service::delete_item(&state, &seller, item_id).await?;
    assert_eq!(items_sold(&state, seller.user_id).await, 0);
    Ok(())
}

#[tokio::test]
async fn concurrent_sales_are_all_counted() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let seller = create_user(&state, "Seller").await?;
    let mut item_ids = Vec::new();
    for i in 0..8 {
        item_ids.push(create_item(&state, &seller, &format!("Notebook {i}")).await?);
    }

    let mut tasks = JoinSet::new();
    for item_id in item_ids.iter().copied() {
        let state = state.clone();
        tasks.spawn(async move {
            item_service::update_item(&state, &seller, item_id, set_status(ItemStatus::Sold))
                .await
                .map(|_| ())
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined??;
    }
    assert_eq!(items_sold(&state, seller.user_id).await, 8);

    let mut tasks = JoinSet::new();
    for item_id in item_ids.iter().copied().take(5) {
        let state = state.clone();
        tasks.spawn(async move {
            item_service::update_item(&state, &seller, item_id, set_status(ItemStatus::Active))
                .await
                .map(|_| ())
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined??;
    }
    assert_eq!(items_sold(&state, seller.user_id).await, 3);
    Ok(())
}

#[tokio::test]
async fn only_the_seller_may_change_a_listing() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let seller = create_user(&state, "Seller").await?;
    let stranger = create_user(&state, "Stranger").await?;
    let item_id = create_item(&state, &seller, "Study table").await?;

    let err = item_service::update_item(
        &state,
        &stranger,
        item_id,
        UpdateItemRequest {
            price: Some(1),
            ..Default::default()
        },
    )
    .await
    .err()
    .expect("non-owner update");
    assert!(matches!(err, AppError::Forbidden(_)), "got {err:?}");

    let err = item_service::delete_item(&state, &stranger, item_id)
        .await
        .err()
        .expect("non-owner delete");
    assert!(matches!(err, AppError::Forbidden(_)), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn removal_only_happens_through_delete() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let seller = create_user(&state, "Seller").await?;
    let item_id = create_item(&state, &seller, "Winter jacket").await?;

    let err = item_service::update_item(&state, &seller, item_id, set_status(ItemStatus::Removed))
        .await
        .err()
        .expect("removed via update");
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");

    item_service::delete_item(&state, &seller, item_id).await?;

    let err = item_service::get_item(&state, item_id)
        .await
        .err()
        .expect("removed item is hidden");
    assert!(matches!(err, AppError::NotFound), "got {err:?}");

    let err = item_service::update_item(
        &state,
        &seller,
        item_id,
        UpdateItemRequest {
            title: Some("Back again".into()),
            ..Default::default()
        },
    )
    .await
    .err()
    .expect("removed item cannot be edited");
    assert!(matches!(err, AppError::NotFound), "got {err:?}");

    let mine = item_service::my_items(&state, &seller)
        .await?
        .into_data()
        .expect("items");
    let listed = mine
        .items
        .iter()
        .find(|i| i.item.id == item_id)
        .expect("removed item still listed for its seller");
    assert_eq!(listed.item.status, ItemStatus::Removed);

    let profile = auth_service::user_profile(&state, seller.user_id)
        .await?
        .into_data()
        .expect("profile");
    assert_eq!(profile.items_count, 0);
    Ok(())
}

#[tokio::test]
async fn item_detail_includes_seller_and_reviews() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let seller = create_user(&state, "Seller").await?;
    let buyer = create_user(&state, "Buyer").await?;
    let item_id = create_item(&state, &seller, "Cricket bat").await?;
    submit(&state, &buyer, item_id, 4.0).await?;

    let detail = item_service::get_item(&state, item_id)
        .await?
        .into_data()
        .expect("detail");
    assert_eq!(detail.item.average_rating, 4.0);
    assert_eq!(detail.review_count, 1);
    assert_eq!(detail.reviews[0].review.user_id, buyer.user_id);
    let listed_by = detail.seller.expect("seller");
    assert_eq!(listed_by.id, seller.user_id);
    assert_eq!(listed_by.average_rating, 4.0);
    Ok(())
}

#[tokio::test]
async fn seller_stats_cover_every_listing() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let seller = create_user(&state, "Seller").await?;
    let alice = create_user(&state, "Alice").await?;
    let bob = create_user(&state, "Bob").await?;

    let sofa = create_item(&state, &seller, "Sofa").await?;
    let rack = create_item(&state, &seller, "Shoe rack").await?;
    let desk = create_item(&state, &seller, "Desk").await?;

    submit(&state, &alice, sofa, 5.0).await?;
    submit(&state, &bob, sofa, 5.0).await?;
    submit(&state, &alice, rack, 2.0).await?;
    item_service::update_item(&state, &seller, rack, set_status(ItemStatus::Sold)).await?;
    item_service::delete_item(&state, &seller, desk).await?;

    let stats = review_service::get_seller_stats(&state, seller.user_id)
        .await?
        .into_data()
        .expect("stats");
    assert_eq!(stats.items_listed, 3);
    assert_eq!(stats.items_sold, 1);
    assert_eq!(stats.total_reviews, 3);
    assert_eq!(stats.average_rating, 4.0);
    assert_eq!(stats.rating_distribution.get(5), 2);
    assert_eq!(stats.rating_distribution.get(2), 1);
    Ok(())
}

#[tokio::test]
async fn login_returns_a_bearer_token() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let email = format!("login-{}@{}", Uuid::new_v4(), common::CAMPUS_DOMAIN);
    auth_service::register_user(
        &state,
        campus_classifieds_api::dto::auth::RegisterRequest {
            name: "Login".into(),
            email: email.clone(),
            password: "correct horse battery".into(),
            photo_url: None,
        },
    )
    .await?;

    let login = auth_service::login_user(
        &state,
        campus_classifieds_api::dto::auth::LoginRequest {
            email: email.to_uppercase(),
            password: "correct horse battery".into(),
        },
    )
    .await?
    .into_data()
    .expect("login");
    assert!(login.token.starts_with("Bearer "));
    assert_eq!(login.user.email, email);

    let err = auth_service::login_user(
        &state,
        campus_classifieds_api::dto::auth::LoginRequest {
            email,
            password: "wrong password".into(),
        },
    )
    .await
    .err()
    .expect("bad password");
    assert!(matches!(err, AppError::BadRequest(_)), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn concurrent_registrations_with_one_email_yield_one_account() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let email = format!("twice-{}@{}", Uuid::new_v4(), common::CAMPUS_DOMAIN);
    let request = || campus_classifieds_api::dto::auth::RegisterRequest {
        name: "Twice".into(),
        email: email.clone(),
        password: "correct horse battery".into(),
        photo_url: None,
    };

    let (first, second) = tokio::join!(
        auth_service::register_user(&state, request()),
        auth_service::register_user(&state, request()),
    );
    let outcomes = [first.map(|_| ()), second.map(|_| ())];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    for outcome in outcomes {
        if let Err(err) = outcome {
            assert!(matches!(err, AppError::BadRequest(_)), "got {err:?}");
        }
    }
    Ok(())
}
