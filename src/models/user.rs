use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User role. Closed set; admin and moderator are distinct capability
/// sets, there is no privilege ordering between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Moderators and admins may edit or delete any review or comment.
    pub fn can_moderate(self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub bio: Option<String>,
    #[serde(default)]
    pub role: Role,
    /// Single-use secret exchanged for an access token. Exactly one value
    /// is valid per user at a time.
    pub confirmation_code: String,
}

impl User {
    pub fn new(username: String, email: String) -> Self {
        Self {
            username,
            email,
            first_name: String::new(),
            last_name: String::new(),
            bio: None,
            role: Role::default(),
            confirmation_code: Uuid::new_v4().to_string(),
        }
    }

    pub fn regenerate_code(&mut self) {
        self.confirmation_code = Uuid::new_v4().to_string();
    }
}

/// Client-visible view of a user record. Never carries the confirmation code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub role: Role,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            bio: user.bio.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(rename = "Token")]
    pub token: String,
}

/// Partial self-profile update. Absent fields are left unchanged. The
/// role field is applied only when the caller is an admin; otherwise it
/// is silently ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

/// Admin-side user creation payload.
#[derive(Debug, Deserialize)]
pub struct AdminCreateUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub bio: Option<String>,
    #[serde(default)]
    pub role: Role,
}
