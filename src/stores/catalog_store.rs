use crate::models::catalog::{Category, Genre};
use crate::models::title::{Title, TitleFilter};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// In-memory catalog: genres and categories by slug, titles by id.
/// Slug uniqueness is enforced atomically via insert-if-vacant.
pub struct CatalogStore {
    genres: DashMap<String, Genre>,
    categories: DashMap<String, Category>,
    titles: DashMap<u64, Arc<Title>>,
    next_title_id: AtomicU64,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            genres: DashMap::new(),
            categories: DashMap::new(),
            titles: DashMap::new(),
            next_title_id: AtomicU64::new(1),
        }
    }

    // Genres

    /// Returns false when the slug is already taken.
    pub fn insert_genre(&self, genre: Genre) -> bool {
        match self.genres.entry(genre.slug.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(genre);
                true
            }
        }
    }

    pub fn genre_exists(&self, slug: &str) -> bool {
        self.genres.contains_key(slug)
    }

    pub fn remove_genre(&self, slug: &str) -> Option<Genre> {
        self.genres.remove(slug).map(|(_, genre)| genre)
    }

    /// Genres ordered by slug, optionally filtered by a case-insensitive
    /// name substring.
    pub fn list_genres(&self, search: Option<&str>) -> Vec<Genre> {
        let needle = search.map(str::to_lowercase);
        let mut genres: Vec<Genre> = self
            .genres
            .iter()
            .filter(|entry| match &needle {
                Some(needle) => entry.value().name.to_lowercase().contains(needle),
                None => true,
            })
            .map(|entry| entry.value().clone())
            .collect();
        genres.sort_by(|a, b| a.slug.cmp(&b.slug));
        genres
    }

    // Categories

    pub fn insert_category(&self, category: Category) -> bool {
        match self.categories.entry(category.slug.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(category);
                true
            }
        }
    }

    pub fn category_exists(&self, slug: &str) -> bool {
        self.categories.contains_key(slug)
    }

    pub fn get_category(&self, slug: &str) -> Option<Category> {
        self.categories.get(slug).map(|entry| entry.value().clone())
    }

    pub fn remove_category(&self, slug: &str) -> Option<Category> {
        self.categories.remove(slug).map(|(_, category)| category)
    }

    pub fn list_categories(&self, search: Option<&str>) -> Vec<Category> {
        let needle = search.map(str::to_lowercase);
        let mut categories: Vec<Category> = self
            .categories
            .iter()
            .filter(|entry| match &needle {
                Some(needle) => entry.value().name.to_lowercase().contains(needle),
                None => true,
            })
            .map(|entry| entry.value().clone())
            .collect();
        categories.sort_by(|a, b| a.slug.cmp(&b.slug));
        categories
    }

    // Titles

    /// Insert a new title, allocating its id.
    pub fn add_title(&self, mut title: Title) -> Arc<Title> {
        title.id = self.next_title_id.fetch_add(1, Ordering::Relaxed);
        let title = Arc::new(title);
        self.titles.insert(title.id, Arc::clone(&title));
        title
    }

    /// Insert a title that already has an id (WAL replay). Keeps the id
    /// counter ahead of every replayed id.
    pub fn insert_title_record(&self, title: Title) {
        self.next_title_id.fetch_max(title.id + 1, Ordering::Relaxed);
        self.titles.insert(title.id, Arc::new(title));
    }

    pub fn get_title(&self, id: u64) -> Option<Arc<Title>> {
        self.titles.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Replace an existing title. Returns None when the id is unknown.
    pub fn replace_title(&self, title: Title) -> Option<Arc<Title>> {
        if !self.titles.contains_key(&title.id) {
            return None;
        }
        let title = Arc::new(title);
        self.titles.insert(title.id, Arc::clone(&title));
        Some(title)
    }

    pub fn remove_title(&self, id: u64) -> Option<Arc<Title>> {
        self.titles.remove(&id).map(|(_, title)| title)
    }

    /// Matching titles, newest id first.
    pub fn list_titles(&self, filter: &TitleFilter) -> Vec<Arc<Title>> {
        let mut titles: Vec<Arc<Title>> = self
            .titles
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        titles.sort_by(|a, b| b.id.cmp(&a.id));
        titles
    }

    pub fn title_count(&self) -> usize {
        self.titles.len()
    }

    pub fn genre_count(&self) -> usize {
        self.genres.len()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}
