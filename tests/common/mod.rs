#![allow(dead_code)]

use campus_classifieds_api::{
    config::AuthSettings,
    db::run_migrations,
    dto::{auth::RegisterRequest, items::CreateItemRequest, reviews::SubmitReviewRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Category,
    services::{auth_service, item_service, review_service},
    state::AppState,
};
use tokio::sync::OnceCell;
use uuid::Uuid;

pub const CAMPUS_DOMAIN: &str = "campus.edu";

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Connect to the test database, or `None` when none is configured.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run database flow tests."
            );
            return Ok(None);
        }
    };

    let state = AppState::connect(&database_url, test_auth()).await?;
    MIGRATED
        .get_or_try_init(|| async { run_migrations(&state.orm).await })
        .await?;
    Ok(Some(state))
}

pub fn test_auth() -> AuthSettings {
    AuthSettings {
        jwt_secret: "test-secret".into(),
        campus_email_domain: CAMPUS_DOMAIN.into(),
        token_ttl_hours: 1,
    }
}

/// Register a user with a unique campus address.
pub async fn create_user(state: &AppState, name: &str) -> anyhow::Result<AuthUser> {
    let resp = auth_service::register_user(
        state,
        RegisterRequest {
            name: name.to_string(),
            email: format!("{}-{}@{CAMPUS_DOMAIN}", name.to_lowercase(), Uuid::new_v4()),
            password: "correct horse battery".into(),
            photo_url: None,
        },
    )
    .await?;
    let user = resp.into_data().expect("registered user");
    Ok(AuthUser { user_id: user.id })
}

pub async fn create_item(state: &AppState, seller: &AuthUser, title: &str) -> anyhow::Result<Uuid> {
    let resp = item_service::create_item(
        state,
        seller,
        CreateItemRequest {
            title: title.to_string(),
            description: "Used for one semester".into(),
            price: 25000,
            category: Category::Books,
            image_url: None,
        },
    )
    .await?;
    Ok(resp.into_data().expect("created item").id)
}

pub async fn submit(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    rating: f64,
) -> AppResult<f64> {
    let resp = review_service::submit_review(
        state,
        user,
        item_id,
        SubmitReviewRequest {
            rating: Some(rating),
            comment: Some(format!("rated {rating}")),
        },
    )
    .await?;
    Ok(resp
        .into_data()
        .map(|d| d.item_average_rating)
        .unwrap_or_default())
}
