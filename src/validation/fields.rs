use crate::core::error::ApiError;

const MAX_USERNAME_LEN: usize = 150;
const MAX_EMAIL_LEN: usize = 254;
const MAX_SLUG_LEN: usize = 50;

/// Username rules: non-empty, at most 150 chars, letters/digits/`.`/`_`/
/// `-`/`@` only, and never `"me"` in any case (reserved for the
/// self-profile endpoint).
pub fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() || username.len() > MAX_USERNAME_LEN {
        return Err(ApiError::InvalidFormat("username"));
    }
    if username.eq_ignore_ascii_case("me") {
        return Err(ApiError::ReservedUsername);
    }
    let valid = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | '@'));
    if !valid {
        return Err(ApiError::InvalidFormat("username"));
    }
    Ok(())
}

/// Structural email check: one `@`, non-empty local part, dotted domain,
/// no whitespace. Deliverability is the mail collaborator's problem.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() || email.len() > MAX_EMAIL_LEN {
        return Err(ApiError::InvalidFormat("email"));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(ApiError::InvalidFormat("email"));
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ApiError::InvalidFormat("email"));
    }
    let dot_ok = domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.');
    if !dot_ok {
        return Err(ApiError::InvalidFormat("email"));
    }
    Ok(())
}

/// Slugs are lowercase-ish URL path segments: ASCII letters, digits,
/// `-` and `_`.
pub fn validate_slug(slug: &str) -> Result<(), ApiError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return Err(ApiError::InvalidFormat("slug"));
    }
    let valid = slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if !valid {
        return Err(ApiError::InvalidFormat("slug"));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::InvalidFormat("name"));
    }
    Ok(())
}

/// Titles cannot be dated in the future.
pub fn validate_year(year: i32, current_year: i32) -> Result<(), ApiError> {
    if year > current_year {
        return Err(ApiError::InvalidFormat("year"));
    }
    Ok(())
}

/// Review and comment bodies must contain something besides whitespace.
pub fn validate_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::InvalidFormat("text"));
    }
    Ok(())
}

/// Review scores are 1..=10 inclusive.
pub fn validate_score(score: u8) -> Result<(), ApiError> {
    if !(1..=10).contains(&score) {
        return Err(ApiError::InvalidFormat("score"));
    }
    Ok(())
}
