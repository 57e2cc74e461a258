use crate::{
    error::{AppError, AppResult},
    models::Category,
    rating::{MAX_RATING, MIN_RATING},
};

pub const MAX_COMMENT_CHARS: usize = 1000;
pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 5000;
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Accepts any JSON number; only whole numbers in `1..=5` pass.
pub fn validate_rating(rating: Option<f64>) -> AppResult<i16> {
    let rating = rating.ok_or_else(|| AppError::validation("rating is required"))?;
    if !rating.is_finite() || rating.fract() != 0.0 {
        return Err(AppError::validation(
            "Rating must be an integer between 1 and 5",
        ));
    }
    if rating < f64::from(MIN_RATING) || rating > f64::from(MAX_RATING) {
        return Err(AppError::validation(
            "Rating must be an integer between 1 and 5",
        ));
    }
    Ok(rating as i16)
}

/// Trims the comment; a missing comment becomes the empty string.
pub fn validate_comment(comment: Option<String>) -> AppResult<String> {
    let comment = comment.map(|c| c.trim().to_string()).unwrap_or_default();
    if comment.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::validation(format!(
            "comment must be at most {MAX_COMMENT_CHARS} characters"
        )));
    }
    Ok(comment)
}

pub fn validate_title(title: &str) -> AppResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::validation("title is required"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::validation(format!(
            "title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

pub fn validate_description(description: &str) -> AppResult<String> {
    let description = description.trim();
    if description.is_empty() {
        return Err(AppError::validation("description is required"));
    }
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(AppError::validation(format!(
            "description must be at most {MAX_DESCRIPTION_CHARS} characters"
        )));
    }
    Ok(description.to_string())
}

pub fn validate_price(price: i64) -> AppResult<i64> {
    if price <= 0 {
        return Err(AppError::validation("Price must be a positive number"));
    }
    Ok(price)
}

/// `None`, empty and `All` mean "no category filter".
pub fn parse_category_filter(category: Option<&str>) -> AppResult<Option<Category>> {
    match category.map(str::trim) {
        None | Some("") => Ok(None),
        Some(c) if c.eq_ignore_ascii_case("all") => Ok(None),
        Some(c) => c.parse::<Category>().map(Some).map_err(AppError::Validation),
    }
}

/// Lower-cases the address and checks it belongs to the campus domain.
pub fn ensure_campus_email(email: &str, campus_domain: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    let (local, domain) = email
        .rsplit_once('@')
        .ok_or_else(|| AppError::validation("email is invalid"))?;
    if local.is_empty() || domain.is_empty() {
        return Err(AppError::validation("email is invalid"));
    }
    if !domain.eq_ignore_ascii_case(campus_domain) {
        return Err(AppError::Forbidden(format!(
            "Only @{campus_domain} email addresses are allowed to sign up"
        )));
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("name is required"));
    }
    Ok(name.to_string())
}
