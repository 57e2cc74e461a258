use axum::{http::StatusCode, response::IntoResponse};
use campus_classifieds_api::{
    error::AppError,
    models::{Category, ItemStatus},
    validation::{
        MAX_COMMENT_CHARS, ensure_campus_email, parse_category_filter, validate_comment,
        validate_password, validate_price, validate_rating, validate_title,
    },
};

#[test]
fn out_of_range_and_fractional_ratings_are_rejected() {
    for bad in [Some(0.0), Some(6.0), Some(3.5), Some(-1.0), Some(f64::NAN), None] {
        let err = validate_rating(bad).expect_err("rating should be rejected");
        assert!(matches!(err, AppError::Validation(_)), "{bad:?} gave {err:?}");
    }
}

#[test]
fn whole_ratings_in_range_pass() {
    for (input, expected) in [(1.0, 1), (3.0, 3), (5.0, 5)] {
        assert_eq!(validate_rating(Some(input)).unwrap(), expected);
    }
}

#[test]
fn comment_is_trimmed_and_optional() {
    assert_eq!(validate_comment(None).unwrap(), "");
    assert_eq!(validate_comment(Some("  nice  ".into())).unwrap(), "nice");

    let long = "x".repeat(MAX_COMMENT_CHARS + 1);
    assert!(matches!(
        validate_comment(Some(long)),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn campus_email_only() {
    assert_eq!(
        ensure_campus_email(" Student@Campus.EDU ", "campus.edu").unwrap(),
        "student@campus.edu"
    );
    assert!(matches!(
        ensure_campus_email("someone@gmail.com", "campus.edu"),
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        ensure_campus_email("someone@sub.campus.edu.evil.com", "campus.edu"),
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        ensure_campus_email("not-an-email", "campus.edu"),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn item_field_rules() {
    assert!(validate_title("   ").is_err());
    assert_eq!(validate_title(" Desk ").unwrap(), "Desk");
    assert!(validate_price(0).is_err());
    assert!(validate_price(-5).is_err());
    assert_eq!(validate_price(1).unwrap(), 1);
    assert!(validate_password("short").is_err());
    assert!(validate_password("long enough").is_ok());
}

#[test]
fn category_filter_parsing() {
    assert_eq!(parse_category_filter(None).unwrap(), None);
    assert_eq!(parse_category_filter(Some("All")).unwrap(), None);
    assert_eq!(parse_category_filter(Some("")).unwrap(), None);
    assert_eq!(
        parse_category_filter(Some("books")).unwrap(),
        Some(Category::Books)
    );
    assert!(matches!(
        parse_category_filter(Some("Cars")),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn every_category_parses_from_its_name() {
    let all = [
        Category::Books,
        Category::Electronics,
        Category::Furniture,
        Category::Clothing,
        Category::Sports,
        Category::Other,
    ];
    for category in all {
        assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        assert_eq!(
            category.as_str().to_uppercase().parse::<Category>(),
            Ok(category)
        );
    }
    assert!(" sports ".parse::<Category>().is_ok());
    assert!("Vehicles".parse::<Category>().is_err());
}

#[test]
fn status_transitions() {
    assert!(ItemStatus::Active.can_transition_to(ItemStatus::Sold));
    assert!(ItemStatus::Sold.can_transition_to(ItemStatus::Active));
    assert!(!ItemStatus::Active.can_transition_to(ItemStatus::Removed));
    assert!(!ItemStatus::Removed.can_transition_to(ItemStatus::Active));
}

#[test]
fn errors_map_to_status_codes() {
    let cases = [
        (AppError::validation("bad"), StatusCode::BAD_REQUEST),
        (AppError::NotFound, StatusCode::NOT_FOUND),
        (AppError::Forbidden("no".into()), StatusCode::FORBIDDEN),
        (AppError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
        (AppError::Conflict, StatusCode::CONFLICT),
        (
            AppError::Internal(anyhow::anyhow!("boom")),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];
    for (err, status) in cases {
        assert_eq!(err.into_response().status(), status);
    }
}
