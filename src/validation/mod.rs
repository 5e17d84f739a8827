//! Request validation.
//!
//! - [`input`] checks request shape without touching storage.
//! - [`business`] checks existence, duplicates and ownership against storage.

pub mod business;
pub mod input;

pub use input::{
    validate_diary_entry_parameters, validate_image, validate_news_parameters, validate_nickname,
};
