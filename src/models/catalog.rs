use serde::{Deserialize, Serialize};

/// Genre and category records are slug-addressed catalog dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct CatalogItemCreate {
    pub name: String,
    pub slug: String,
}

/// Query parameters for genre/category listings.
#[derive(Debug, Deserialize)]
pub struct CatalogListQuery {
    pub search: Option<String>,
    #[serde(default = "crate::models::page::default_page")]
    pub page: usize,
    #[serde(default = "crate::models::page::default_page_size")]
    pub page_size: usize,
}
