//! Wire-format request and response types.
//!
//! Requests keep every field optional so that a missing field is reported
//! by input validation with a 400 instead of a deserialization rejection.

pub mod links;
pub mod news;
pub mod user;

pub use links::{
    absolute, base_url, diary_entry_path, news_image_path, news_path, news_thumbnail_path,
    user_path, Link,
};
pub use news::{NewsRequest, NewsResponse, VoteRequest};
pub use user::{CreateUserRequest, UpdateUserRequest, UserResponse};
