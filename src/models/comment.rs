use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub review_id: u64,
    pub author: String,
    pub text: String,
    /// Unix timestamp, seconds.
    pub pub_date: i64,
}

#[derive(Debug, Deserialize)]
pub struct CommentCreate {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentPatch {
    pub text: Option<String>,
}
