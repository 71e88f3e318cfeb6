use crate::models::comment::Comment;
use crate::models::review::Review;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// In-memory review and comment store.
///
/// The one-review-per-(title, author) invariant is enforced atomically
/// through the `by_title_author` index: the index slot is claimed with
/// insert-if-vacant before the review record is created.
pub struct ReviewStore {
    reviews: DashMap<u64, Arc<Review>>,
    by_title_author: DashMap<(u64, String), u64>,
    comments: DashMap<u64, Arc<Comment>>,
    next_review_id: AtomicU64,
    next_comment_id: AtomicU64,
}

impl ReviewStore {
    pub fn new() -> Self {
        Self {
            reviews: DashMap::new(),
            by_title_author: DashMap::new(),
            comments: DashMap::new(),
            next_review_id: AtomicU64::new(1),
            next_comment_id: AtomicU64::new(1),
        }
    }

    // Reviews

    /// Create a review. Returns None when the author already reviewed
    /// this title.
    pub fn add_review(
        &self,
        title_id: u64,
        author: String,
        text: String,
        score: u8,
        pub_date: i64,
    ) -> Option<Arc<Review>> {
        let id = self.next_review_id.fetch_add(1, Ordering::Relaxed);

        match self.by_title_author.entry((title_id, author.clone())) {
            Entry::Occupied(_) => return None,
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let review = Arc::new(Review {
            id,
            title_id,
            author,
            text,
            score,
            pub_date,
        });
        self.reviews.insert(id, Arc::clone(&review));
        Some(review)
    }

    /// Insert a review that already has an id (WAL replay). Returns false
    /// when the (title, author) slot is already claimed.
    pub fn insert_review_record(&self, review: Review) -> bool {
        self.next_review_id
            .fetch_max(review.id + 1, Ordering::Relaxed);

        match self
            .by_title_author
            .entry((review.title_id, review.author.clone()))
        {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(review.id);
                self.reviews.insert(review.id, Arc::new(review));
                true
            }
        }
    }

    pub fn get_review(&self, id: u64) -> Option<Arc<Review>> {
        self.reviews.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Replace an existing review. Title and author never change, so the
    /// uniqueness index stays valid.
    pub fn replace_review(&self, review: Review) -> Option<Arc<Review>> {
        if !self.reviews.contains_key(&review.id) {
            return None;
        }
        let review = Arc::new(review);
        self.reviews.insert(review.id, Arc::clone(&review));
        Some(review)
    }

    /// Remove a review, its index entry, and its comments.
    pub fn remove_review(&self, id: u64) -> Option<Arc<Review>> {
        let (_, review) = self.reviews.remove(&id)?;
        self.by_title_author
            .remove(&(review.title_id, review.author.clone()));
        self.remove_comments_for_review(id);
        Some(review)
    }

    /// Cascade delete for a removed title. Returns the number of reviews
    /// removed.
    pub fn remove_for_title(&self, title_id: u64) -> usize {
        let ids: Vec<u64> = self
            .reviews
            .iter()
            .filter(|entry| entry.value().title_id == title_id)
            .map(|entry| *entry.key())
            .collect();
        for id in &ids {
            self.remove_review(*id);
        }
        ids.len()
    }

    /// Reviews for a title, oldest first.
    pub fn list_for_title(&self, title_id: u64) -> Vec<Arc<Review>> {
        let mut reviews: Vec<Arc<Review>> = self
            .reviews
            .iter()
            .filter(|entry| entry.value().title_id == title_id)
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        reviews.sort_by_key(|review| review.id);
        reviews
    }

    /// Average review score for a title; None when unreviewed.
    pub fn average_for_title(&self, title_id: u64) -> Option<f64> {
        let mut sum = 0u64;
        let mut count = 0u64;
        for entry in self.reviews.iter() {
            if entry.value().title_id == title_id {
                sum += entry.value().score as u64;
                count += 1;
            }
        }
        if count == 0 {
            None
        } else {
            Some(sum as f64 / count as f64)
        }
    }

    pub fn review_count(&self) -> usize {
        self.reviews.len()
    }

    // Comments

    pub fn add_comment(
        &self,
        review_id: u64,
        author: String,
        text: String,
        pub_date: i64,
    ) -> Arc<Comment> {
        let id = self.next_comment_id.fetch_add(1, Ordering::Relaxed);
        let comment = Arc::new(Comment {
            id,
            review_id,
            author,
            text,
            pub_date,
        });
        self.comments.insert(id, Arc::clone(&comment));
        comment
    }

    /// Insert a comment that already has an id (WAL replay).
    pub fn insert_comment_record(&self, comment: Comment) {
        self.next_comment_id
            .fetch_max(comment.id + 1, Ordering::Relaxed);
        self.comments.insert(comment.id, Arc::new(comment));
    }

    pub fn get_comment(&self, id: u64) -> Option<Arc<Comment>> {
        self.comments
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn replace_comment(&self, comment: Comment) -> Option<Arc<Comment>> {
        if !self.comments.contains_key(&comment.id) {
            return None;
        }
        let comment = Arc::new(comment);
        self.comments.insert(comment.id, Arc::clone(&comment));
        Some(comment)
    }

    pub fn remove_comment(&self, id: u64) -> Option<Arc<Comment>> {
        self.comments.remove(&id).map(|(_, comment)| comment)
    }

    pub fn remove_comments_for_review(&self, review_id: u64) -> usize {
        let before = self.comments.len();
        self.comments
            .retain(|_, comment| comment.review_id != review_id);
        before - self.comments.len()
    }

    /// Comments for a review, oldest first.
    pub fn list_comments(&self, review_id: u64) -> Vec<Arc<Comment>> {
        let mut comments: Vec<Arc<Comment>> = self
            .comments
            .iter()
            .filter(|entry| entry.value().review_id == review_id)
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        comments.sort_by_key(|comment| comment.id);
        comments
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }
}

impl Default for ReviewStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_review_and_lookup() {
        let store = ReviewStore::new();
        let review = store
            .add_review(1, "alice".to_string(), "Great".to_string(), 9, 1000)
            .unwrap();
        assert_eq!(review.id, 1);
        assert_eq!(store.get_review(1).unwrap().score, 9);
    }

    #[test]
    fn test_second_review_same_title_author_rejected() {
        let store = ReviewStore::new();
        store
            .add_review(1, "alice".to_string(), "Great".to_string(), 9, 1000)
            .unwrap();
        assert!(store
            .add_review(1, "alice".to_string(), "Changed my mind".to_string(), 2, 1001)
            .is_none());

        // Same author on another title is fine.
        assert!(store
            .add_review(2, "alice".to_string(), "Also great".to_string(), 8, 1002)
            .is_some());
    }

    #[test]
    fn test_remove_review_frees_slot_and_comments() {
        let store = ReviewStore::new();
        let review = store
            .add_review(1, "alice".to_string(), "Great".to_string(), 9, 1000)
            .unwrap();
        store.add_comment(review.id, "bob".to_string(), "Agreed".to_string(), 1001);

        store.remove_review(review.id).unwrap();
        assert_eq!(store.comment_count(), 0);

        // Author can review the title again after deletion.
        assert!(store
            .add_review(1, "alice".to_string(), "Again".to_string(), 7, 1002)
            .is_some());
    }

    #[test]
    fn test_remove_for_title_cascades() {
        let store = ReviewStore::new();
        store
            .add_review(1, "alice".to_string(), "A".to_string(), 9, 1000)
            .unwrap();
        store
            .add_review(1, "bob".to_string(), "B".to_string(), 5, 1001)
            .unwrap();
        store
            .add_review(2, "alice".to_string(), "C".to_string(), 6, 1002)
            .unwrap();

        assert_eq!(store.remove_for_title(1), 2);
        assert_eq!(store.review_count(), 1);
        assert!(store.list_for_title(1).is_empty());
    }

    #[test]
    fn test_average_for_title() {
        let store = ReviewStore::new();
        assert!(store.average_for_title(1).is_none());

        store
            .add_review(1, "alice".to_string(), "A".to_string(), 10, 1000)
            .unwrap();
        store
            .add_review(1, "bob".to_string(), "B".to_string(), 5, 1001)
            .unwrap();

        assert_eq!(store.average_for_title(1), Some(7.5));
    }

    #[test]
    fn test_insert_review_record_advances_counter() {
        let store = ReviewStore::new();
        let replayed = Review {
            id: 10,
            title_id: 1,
            author: "alice".to_string(),
            text: "Replayed".to_string(),
            score: 8,
            pub_date: 1000,
        };
        assert!(store.insert_review_record(replayed.clone()));
        assert!(!store.insert_review_record(replayed));

        let fresh = store
            .add_review(1, "bob".to_string(), "Fresh".to_string(), 6, 1001)
            .unwrap();
        assert_eq!(fresh.id, 11);
    }

    #[test]
    fn test_comments_listing_ordered() {
        let store = ReviewStore::new();
        store.add_comment(1, "alice".to_string(), "first".to_string(), 1000);
        store.add_comment(1, "bob".to_string(), "second".to_string(), 1001);
        store.add_comment(2, "carol".to_string(), "other review".to_string(), 1002);

        let comments = store.list_comments(1);
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "first");
        assert_eq!(comments[1].text, "second");
    }
}
