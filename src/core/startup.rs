use crate::core::state::AppState;
use crate::wal::wal::WalOperation;
use anyhow::Result;
use tracing::warn;

/// Rebuild store state from replayed WAL operations at boot. Individual
/// inconsistencies (e.g. a duplicate left by a truncated log) are logged
/// and skipped; replay itself never aborts startup.
pub fn apply_wal_operations(state: &AppState, operations: &[WalOperation]) -> Result<()> {
    for op in operations {
        match op {
            WalOperation::AddUser { user } => {
                if let Err(e) = state.users.insert(user.clone()) {
                    warn!(username = %user.username, error = %e, "Skipping replayed user insert");
                }
            }
            WalOperation::UpdateUser { user } => {
                if let Err(e) = state.users.replace(user.clone()) {
                    warn!(username = %user.username, error = %e, "Skipping replayed user update");
                }
            }
            WalOperation::RemoveUser { username } => {
                state.users.remove(username);
            }
            WalOperation::AddGenre { genre } => {
                if !state.catalog.insert_genre(genre.clone()) {
                    warn!(slug = %genre.slug, "Skipping replayed duplicate genre");
                }
            }
            WalOperation::RemoveGenre { slug } => {
                state.catalog.remove_genre(slug);
            }
            WalOperation::AddCategory { category } => {
                if !state.catalog.insert_category(category.clone()) {
                    warn!(slug = %category.slug, "Skipping replayed duplicate category");
                }
            }
            WalOperation::RemoveCategory { slug } => {
                state.catalog.remove_category(slug);
            }
            WalOperation::AddTitle { title } => {
                state.catalog.insert_title_record(title.clone());
            }
            WalOperation::UpdateTitle { title } => {
                if state.catalog.replace_title(title.clone()).is_none() {
                    warn!(title_id = title.id, "Skipping replayed update of unknown title");
                }
            }
            WalOperation::RemoveTitle { id } => {
                state.reviews.remove_for_title(*id);
                state.catalog.remove_title(*id);
            }
            WalOperation::AddReview { review } => {
                if !state.reviews.insert_review_record(review.clone()) {
                    warn!(review_id = review.id, "Skipping replayed duplicate review");
                }
            }
            WalOperation::UpdateReview { review } => {
                if state.reviews.replace_review(review.clone()).is_none() {
                    warn!(review_id = review.id, "Skipping replayed update of unknown review");
                }
            }
            WalOperation::RemoveReview { id } => {
                state.reviews.remove_review(*id);
            }
            WalOperation::AddComment { comment } => {
                state.reviews.insert_comment_record(comment.clone());
            }
            WalOperation::UpdateComment { comment } => {
                if state.reviews.replace_comment(comment.clone()).is_none() {
                    warn!(comment_id = comment.id, "Skipping replayed update of unknown comment");
                }
            }
            WalOperation::RemoveComment { id } => {
                state.reviews.remove_comment(*id);
            }
        }
    }
    Ok(())
}
