use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use campus_classifieds_api::{
    config::AppConfig,
    db::run_migrations,
    dto::reviews::SubmitReviewRequest,
    entity::{
        items::{ActiveModel as ItemActive, Column as ItemCol, Entity as Items},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    middleware::auth::AuthUser,
    models::{Category, ItemStatus},
    services::review_service,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,campus_classifieds_api=debug".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let state = AppState::connect(&config.database_url, config.auth.clone()).await?;
    run_migrations(&state.orm).await?;

    let domain = config.auth.campus_email_domain.clone();
    let seller_id = ensure_user(&state, "Asha Seller", &format!("seller@{domain}"), "seller123").await?;
    let buyer_id = ensure_user(&state, "Ravi Buyer", &format!("buyer@{domain}"), "buyer1234").await?;

    let listings = [
        ("Engineering Mathematics, 10th ed.", "Lightly annotated, no torn pages", 45000, Category::Books),
        ("Study Lamp", "LED desk lamp with three brightness levels", 80000, Category::Electronics),
        ("Hostel Chair", "Folding chair, sturdy", 60000, Category::Furniture),
        ("Badminton Racquet", "Used for one semester", 120000, Category::Sports),
    ];

    let mut item_ids = Vec::new();
    for (title, description, price, category) in listings {
        item_ids.push(ensure_item(&state, seller_id, title, description, price, category).await?);
    }

    // reviews go through the submission path so every average is recomputed
    let buyer = AuthUser { user_id: buyer_id };
    let reviews = [
        (5.0, "Exactly as described"),
        (4.0, "Works well"),
        (3.0, "A bit wobbly"),
    ];
    for (item_id, (rating, comment)) in item_ids.iter().copied().zip(reviews) {
        review_service::submit_review(
            &state,
            &buyer,
            item_id,
            SubmitReviewRequest {
                rating: Some(rating),
                comment: Some(comment.to_string()),
            },
        )
        .await?;
    }

    tracing::info!(%seller_id, %buyer_id, items = item_ids.len(), "seed completed");
    Ok(())
}

async fn ensure_user(
    state: &AppState,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(&state.orm)
        .await?
    {
        return Ok(existing.id);
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        photo_url: Set(None),
        average_rating: NotSet,
        items_sold: NotSet,
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(email, "seeded user");
    Ok(user.id)
}

async fn ensure_item(
    state: &AppState,
    seller_id: Uuid,
    title: &str,
    description: &str,
    price: i64,
    category: Category,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Items::find()
        .filter(
            Condition::all()
                .add(ItemCol::SellerId.eq(seller_id))
                .add(ItemCol::Title.eq(title)),
        )
        .one(&state.orm)
        .await?
    {
        return Ok(existing.id);
    }

    let item = ItemActive {
        id: Set(Uuid::new_v4()),
        title: Set(title.to_string()),
        description: Set(description.to_string()),
        price: Set(price),
        category: Set(category),
        image_url: Set(None),
        seller_id: Set(seller_id),
        status: Set(ItemStatus::Active),
        average_rating: NotSet,
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(title, "seeded item");
    Ok(item.id)
}
