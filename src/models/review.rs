use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub title_id: u64,
    pub author: String,
    pub text: String,
    /// 1..=10 inclusive.
    pub score: u8,
    /// Unix timestamp, seconds.
    pub pub_date: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReviewCreate {
    pub text: String,
    pub score: u8,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewPatch {
    pub text: Option<String>,
    pub score: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "crate::models::page::default_page")]
    pub page: usize,
    #[serde(default = "crate::models::page::default_page_size")]
    pub page_size: usize,
}
