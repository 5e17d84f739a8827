//! User request and response bodies.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{City, User};

use super::links::{absolute, user_path, Link};

/// Body of `POST /api/user`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    pub nickname: Option<String>,

    #[serde(flatten)]
    pub profile: UpdateUserRequest,
}

/// Body of `PATCH /api/user/{nickname}`. Also the profile part of a create.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub password: Option<String>,
    pub city: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl UpdateUserRequest {
    /// Build a business `User` from a profile that has already passed input
    /// validation.
    pub fn to_user(
        &self,
        nickname: &str,
        registration_date: DateTime<Utc>,
    ) -> Result<User, ValidationError> {
        let password = self
            .password
            .clone()
            .ok_or_else(|| ValidationError::input("The user format is incorrect"))?;
        let city = self
            .city
            .as_deref()
            .unwrap_or_default()
            .parse::<City>()
            .map_err(|_| ValidationError::input("The user format is incorrect"))?;

        Ok(User {
            nickname: nickname.to_string(),
            password,
            city,
            name: non_blank(self.name.as_deref()),
            email: non_blank(self.email.as_deref()),
            birth_date: self.birth_date,
            registration_date,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// User representation returned by `GET /api/user/{nickname}`.
///
/// The password is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub nickname: String,
    pub city: City,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    pub registration_date: DateTime<Utc>,
    pub links: Vec<Link>,
}

impl UserResponse {
    pub fn from_user(user: User, base_url: &str) -> Self {
        let links = vec![Link::new("self", absolute(base_url, &user_path(&user.nickname)))];
        Self {
            nickname: user.nickname,
            city: user.city,
            name: user.name,
            email: user.email,
            birth_date: user.birth_date,
            registration_date: user.registration_date,
            links,
        }
    }
}
