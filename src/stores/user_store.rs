use crate::models::user::User;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UserStoreError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Username already registered")]
    DuplicateUsername,

    #[error("Unknown user")]
    UnknownUser,
}

/// In-memory user store.
///
/// Uniqueness of usernames and emails is enforced here with atomic
/// insert-if-vacant on the concurrent maps, not by pre-check-then-insert,
/// so two concurrent registrations with the same email cannot both win.
/// Emails are compared case-insensitively.
pub struct UserStore {
    /// Keyed by exact username.
    users: DashMap<String, Arc<User>>,
    /// Lowercased email -> owning username.
    emails: DashMap<String, String>,
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            emails: DashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            users: DashMap::with_capacity(capacity),
            emails: DashMap::with_capacity(capacity),
        }
    }

    /// Insert a new user. The email slot is reserved first; if the
    /// username then turns out to be taken, the reservation is released.
    pub fn insert(&self, user: User) -> Result<Arc<User>, UserStoreError> {
        let email_key = user.email.to_lowercase();

        match self.emails.entry(email_key.clone()) {
            Entry::Occupied(_) => return Err(UserStoreError::DuplicateEmail),
            Entry::Vacant(slot) => {
                slot.insert(user.username.clone());
            }
        }

        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => {
                self.emails.remove(&email_key);
                Err(UserStoreError::DuplicateUsername)
            }
            Entry::Vacant(slot) => {
                let user = Arc::new(user);
                slot.insert(Arc::clone(&user));
                Ok(user)
            }
        }
    }

    pub fn get(&self, username: &str) -> Option<Arc<User>> {
        self.users.get(username).map(|entry| Arc::clone(entry.value()))
    }

    pub fn email_taken(&self, email: &str) -> bool {
        self.emails.contains_key(&email.to_lowercase())
    }

    /// Replace an existing user record. Moves the email index entry when
    /// the email changed; a changed email colliding with another account
    /// fails with `DuplicateEmail` and leaves the record untouched.
    pub fn replace(&self, updated: User) -> Result<Arc<User>, UserStoreError> {
        let old = self
            .users
            .get(&updated.username)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(UserStoreError::UnknownUser)?;

        let old_key = old.email.to_lowercase();
        let new_key = updated.email.to_lowercase();

        if new_key != old_key {
            match self.emails.entry(new_key) {
                Entry::Occupied(_) => return Err(UserStoreError::DuplicateEmail),
                Entry::Vacant(slot) => {
                    slot.insert(updated.username.clone());
                }
            }
            self.emails.remove(&old_key);
        }

        let updated = Arc::new(updated);
        self.users
            .insert(updated.username.clone(), Arc::clone(&updated));
        Ok(updated)
    }

    /// Remove a user and free their email slot.
    pub fn remove(&self, username: &str) -> Option<Arc<User>> {
        let (_, user) = self.users.remove(username)?;
        self.emails.remove(&user.email.to_lowercase());
        Some(user)
    }

    /// All users, ordered by username.
    pub fn list(&self) -> Vec<Arc<User>> {
        let mut users: Vec<Arc<User>> = self
            .users
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, email: &str) -> User {
        User::new(username.to_string(), email.to_string())
    }

    #[test]
    fn test_insert_and_get() {
        let store = UserStore::new();
        store.insert(user("alice", "a@x.com")).unwrap();

        let found = store.get("alice").unwrap();
        assert_eq!(found.email, "a@x.com");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_email_rejected_case_insensitively() {
        let store = UserStore::new();
        store.insert(user("alice", "a@x.com")).unwrap();

        let err = store.insert(user("bob", "A@X.COM")).unwrap_err();
        assert_eq!(err, UserStoreError::DuplicateEmail);
        assert!(store.get("bob").is_none());
    }

    #[test]
    fn test_duplicate_username_releases_email_reservation() {
        let store = UserStore::new();
        store.insert(user("alice", "a@x.com")).unwrap();

        let err = store.insert(user("alice", "other@x.com")).unwrap_err();
        assert_eq!(err, UserStoreError::DuplicateUsername);

        // The reserved email slot must be free again.
        assert!(!store.email_taken("other@x.com"));
        store.insert(user("carol", "other@x.com")).unwrap();
    }

    #[test]
    fn test_replace_moves_email_index() {
        let store = UserStore::new();
        store.insert(user("alice", "a@x.com")).unwrap();

        let mut updated = (*store.get("alice").unwrap()).clone();
        updated.email = "new@x.com".to_string();
        store.replace(updated).unwrap();

        assert!(!store.email_taken("a@x.com"));
        assert!(store.email_taken("new@x.com"));
        assert_eq!(store.get("alice").unwrap().email, "new@x.com");
    }

    #[test]
    fn test_replace_rejects_email_collision() {
        let store = UserStore::new();
        store.insert(user("alice", "a@x.com")).unwrap();
        store.insert(user("bob", "b@x.com")).unwrap();

        let mut updated = (*store.get("bob").unwrap()).clone();
        updated.email = "A@x.com".to_string();
        let err = store.replace(updated).unwrap_err();
        assert_eq!(err, UserStoreError::DuplicateEmail);
        assert_eq!(store.get("bob").unwrap().email, "b@x.com");
    }

    #[test]
    fn test_replace_unknown_user() {
        let store = UserStore::new();
        let err = store.replace(user("ghost", "g@x.com")).unwrap_err();
        assert_eq!(err, UserStoreError::UnknownUser);
    }

    #[test]
    fn test_remove_frees_email() {
        let store = UserStore::new();
        store.insert(user("alice", "a@x.com")).unwrap();

        let removed = store.remove("alice").unwrap();
        assert_eq!(removed.username, "alice");
        assert!(store.is_empty());

        store.insert(user("bob", "a@x.com")).unwrap();
    }

    #[test]
    fn test_list_sorted_by_username() {
        let store = UserStore::new();
        store.insert(user("carol", "c@x.com")).unwrap();
        store.insert(user("alice", "a@x.com")).unwrap();
        store.insert(user("bob", "b@x.com")).unwrap();

        let names: Vec<String> = store
            .list()
            .iter()
            .map(|u| u.username.clone())
            .collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }
}
