//! Storage-independent request validation.
//!
//! Predicates return `bool`; the `validate_*` entry points fail fast with a
//! [`ValidationError::Input`] (HTTP 400) naming the first offending value.

use chrono::{NaiveDate, Utc};
use image::ImageFormat;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;
use url::Host;
use uuid::Uuid;

use crate::entities::{CreateUserRequest, NewsRequest, UpdateUserRequest};
use crate::error::ValidationError;
use crate::images;
use crate::model::{City, NewsKey, DATE_FORMAT};

/// Longest address accepted before the pattern is even tried.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Inclusive range of accepted vote values.
pub const VOTE_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r#"(?i)^(?:"(?:[^"\\]|\\.)+"|[0-9a-z](?:(?:\.?[-!#$%&'*+/=?^`{}|~\w])*\.?[0-9a-z])?)@(?:\[(?:\d{1,3}\.){3}\d{1,3}\]|(?:[0-9a-z][-\w]*[0-9a-z]*\.)+[a-z0-9][-a-z0-9]{0,22}[a-z0-9])$"#
    )
    .expect("email pattern is valid");
    static ref DATE_REGEX: Regex =
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern is valid");
}

// =============================================================================
// Field Predicates
// =============================================================================

fn is_present(value: Option<&str>) -> bool {
    value.map(|v| !v.trim().is_empty()).unwrap_or(false)
}

pub fn is_valid_nickname(nickname: Option<&str>) -> bool {
    is_present(nickname)
}

pub fn is_valid_password(password: Option<&str>) -> bool {
    is_present(password)
}

pub fn is_valid_title(title: Option<&str>) -> bool {
    is_present(title)
}

pub fn is_valid_content(content: Option<&str>) -> bool {
    is_present(content)
}

pub fn is_valid_city(city: &str) -> bool {
    city.parse::<City>().is_ok()
}

/// A name is optional, but when given it must not be blank.
pub fn is_valid_name(name: Option<&str>) -> bool {
    name.map(|n| !n.trim().is_empty()).unwrap_or(true)
}

/// Absent or blank addresses are accepted.
///
/// Otherwise the domain is mapped to its ASCII (punycode) form and the whole
/// address is matched against the address pattern. Addresses longer than
/// [`MAX_EMAIL_LENGTH`] are rejected without running the pattern.
pub fn is_valid_email(email: Option<&str>) -> bool {
    let email = match email.map(str::trim) {
        None | Some("") => return true,
        Some(e) => e,
    };

    if email.len() > MAX_EMAIL_LENGTH {
        return false;
    }

    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };

    let ascii_domain = if domain.starts_with('[') {
        domain.to_string()
    } else {
        match Host::parse(domain) {
            Ok(Host::Domain(d)) => d,
            Ok(other) => other.to_string(),
            Err(_) => return false,
        }
    };

    if ascii_domain.len() + local.len() + 1 > MAX_EMAIL_LENGTH {
        return false;
    }

    EMAIL_REGEX.is_match(&format!("{}@{}", local, ascii_domain))
}

/// Birth dates cannot be in the future.
pub fn is_valid_birth_date(birth_date: NaiveDate) -> bool {
    birth_date <= Utc::now().date_naive()
}

pub fn is_valid_news_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

/// Parse a strict `yyyy-MM-dd` date.
pub fn parse_news_date(date: &str) -> Option<NaiveDate> {
    if !DATE_REGEX.is_match(date) {
        return None;
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

pub fn is_valid_news_date(date: &str) -> bool {
    parse_news_date(date).is_some()
}

pub fn is_valid_vote(value: i32) -> bool {
    VOTE_RANGE.contains(&value)
}

// =============================================================================
// Composite Predicates
// =============================================================================

/// Validate the profile fields shared by user creation and update.
///
/// Short-circuits on the first failing field.
pub fn is_valid_user_profile(profile: Option<&UpdateUserRequest>) -> bool {
    let Some(profile) = profile else {
        return false;
    };

    is_valid_password(profile.password.as_deref())
        && profile.city.as_deref().map(is_valid_city).unwrap_or(false)
        && is_valid_name(profile.name.as_deref())
        && is_valid_email(profile.email.as_deref())
        && profile.birth_date.map(is_valid_birth_date).unwrap_or(true)
}

/// Validate a registration body: nickname first, then the profile.
pub fn is_valid_user(user: Option<&CreateUserRequest>) -> bool {
    let Some(user) = user else {
        return false;
    };

    is_valid_nickname(user.nickname.as_deref()) && is_valid_user_profile(Some(&user.profile))
}

pub fn is_valid_news(news: Option<&NewsRequest>) -> bool {
    let Some(news) = news else {
        return false;
    };

    is_valid_title(news.title.as_deref()) && is_valid_content(news.content.as_deref())
}

// =============================================================================
// Parameter Validation
// =============================================================================

pub fn validate_nickname(nickname: &str) -> Result<(), ValidationError> {
    if is_valid_nickname(Some(nickname)) {
        Ok(())
    } else {
        Err(ValidationError::input(format!(
            "'{}' is not a valid nickname.",
            nickname
        )))
    }
}

/// Validate and parse the `(city, date)` path parameters of a diary entry.
pub fn validate_diary_entry_parameters(
    city: &str,
    date: &str,
) -> Result<(City, NaiveDate), ValidationError> {
    let city = city
        .parse::<City>()
        .map_err(|_| ValidationError::input(format!("'{}' is not a valid city.", city)))?;

    let date = parse_news_date(date)
        .ok_or_else(|| ValidationError::input(format!("'{}' is not a valid date.", date)))?;

    Ok((city, date))
}

/// Validate and parse the `(city, date, id)` path parameters of a news item.
pub fn validate_news_parameters(
    city: &str,
    date: &str,
    id: &str,
) -> Result<NewsKey, ValidationError> {
    let (city, date) = validate_diary_entry_parameters(city, date)?;

    let id = Uuid::parse_str(id).map_err(|_| {
        ValidationError::input(format!("'{}' is not a valid identifier for news.", id))
    })?;

    Ok(NewsKey::new(city, date, id))
}

/// Validate an uploaded image against its declared content type.
pub fn validate_image(data: &[u8], content_type: &str) -> Result<ImageFormat, ValidationError> {
    images::validate_image(data, content_type).map_err(|e| {
        debug!(content_type = content_type, "Rejected image upload: {}", e);
        ValidationError::input("The image is not valid")
    })
}
