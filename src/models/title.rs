use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub id: u64,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    /// Genre slugs. Must reference existing genres at write time.
    #[serde(default)]
    pub genre: Vec<String>,
    /// Category slug. Must reference an existing category at write time.
    pub category: Option<String>,
}

/// Read representation: the stored title plus the aggregated review rating.
#[derive(Debug, Serialize, Deserialize)]
pub struct TitleOut {
    pub id: u64,
    pub name: String,
    pub year: i32,
    /// Average review score rounded to the nearest integer, absent while
    /// the title has no reviews.
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub genre: Vec<String>,
    pub category: Option<String>,
}

impl TitleOut {
    pub fn from_title(title: &Title, rating: Option<f64>) -> Self {
        Self {
            id: title.id,
            name: title.name.clone(),
            year: title.year,
            rating: rating.map(f64::round),
            description: title.description.clone(),
            genre: title.genre.clone(),
            category: title.category.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TitleCreate {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Vec<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TitlePatch {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub genre: Option<Vec<String>>,
    pub category: Option<String>,
}

/// List query: optional filters plus pagination.
#[derive(Debug, Deserialize)]
pub struct TitleListQuery {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub name: Option<String>,
    #[serde(default = "crate::models::page::default_page")]
    pub page: usize,
    #[serde(default = "crate::models::page::default_page_size")]
    pub page_size: usize,
}

/// Filter half of [`TitleListQuery`], consumed by the catalog store.
#[derive(Debug, Default)]
pub struct TitleFilter {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub name: Option<String>,
}

impl TitleFilter {
    pub fn matches(&self, title: &Title) -> bool {
        if let Some(category) = &self.category {
            if title.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(genre) = &self.genre {
            if !title.genre.iter().any(|slug| slug == genre) {
                return false;
            }
        }
        if let Some(year) = self.year {
            if title.year != year {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if !title.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_title() -> Title {
        Title {
            id: 1,
            name: "The Seventh Seal".to_string(),
            year: 1957,
            description: None,
            genre: vec!["drama".to_string(), "fantasy".to_string()],
            category: Some("movie".to_string()),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(TitleFilter::default().matches(&sample_title()));
    }

    #[test]
    fn test_filter_by_category() {
        let mut filter = TitleFilter::default();
        filter.category = Some("movie".to_string());
        assert!(filter.matches(&sample_title()));

        filter.category = Some("book".to_string());
        assert!(!filter.matches(&sample_title()));
    }

    #[test]
    fn test_filter_by_genre_membership() {
        let mut filter = TitleFilter::default();
        filter.genre = Some("fantasy".to_string());
        assert!(filter.matches(&sample_title()));

        filter.genre = Some("comedy".to_string());
        assert!(!filter.matches(&sample_title()));
    }

    #[test]
    fn test_filter_by_year() {
        let mut filter = TitleFilter::default();
        filter.year = Some(1957);
        assert!(filter.matches(&sample_title()));

        filter.year = Some(1958);
        assert!(!filter.matches(&sample_title()));
    }

    #[test]
    fn test_filter_by_name_is_substring_case_insensitive() {
        let mut filter = TitleFilter::default();
        filter.name = Some("seventh".to_string());
        assert!(filter.matches(&sample_title()));

        filter.name = Some("eighth".to_string());
        assert!(!filter.matches(&sample_title()));
    }

    #[test]
    fn test_title_out_rounds_rating() {
        let out = TitleOut::from_title(&sample_title(), Some(7.5));
        assert_eq!(out.rating, Some(8.0));
        assert_eq!(out.id, 1);

        let unrated = TitleOut::from_title(&sample_title(), None);
        assert!(unrated.rating.is_none());
    }
}
