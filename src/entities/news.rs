//! News request and response bodies.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{City, News};

use super::links::{absolute, diary_entry_path, news_image_path, news_path, user_path, Link};

/// Body of news create and update requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Body of `POST .../news/{id}/vote`.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteRequest {
    pub value: i32,
}

/// News representation returned by the news endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: String,
    pub city: City,
    pub date: NaiveDate,
    pub rating: i64,
    pub links: Vec<Link>,
}

impl NewsResponse {
    pub fn from_news(news: News, base_url: &str) -> Self {
        let key = news.key();
        let links = vec![
            Link::new("self", absolute(base_url, &news_path(&key))),
            Link::new(
                "diary",
                absolute(base_url, &diary_entry_path(news.city, news.date)),
            ),
            Link::new("author", absolute(base_url, &user_path(&news.author))),
            Link::new("image", absolute(base_url, &news_image_path(&key))),
        ];

        Self {
            id: news.id,
            title: news.title,
            content: news.content,
            author: news.author,
            city: news.city,
            date: news.date,
            rating: news.rating,
            links,
        }
    }
}
