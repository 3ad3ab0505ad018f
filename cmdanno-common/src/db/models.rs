//! Database row models

use serde::{Deserialize, Serialize};

/// A registered annotator. Identified by access code in the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub access_code: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

impl User {
    /// Derive the access code for a name pair
    pub fn derive_access_code(first_name: &str, last_name: &str) -> String {
        format!("{}-{}", first_name.to_lowercase(), last_name.to_lowercase())
    }
}

/// Per-(annotator, url) completion state row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AnnotationProgress {
    pub annotator_id: i64,
    pub url_id: i64,
    pub status: String,
}

/// Progress status strings written by the collection UI. Stored as free
/// text; the store does not reject other values.
pub mod status {
    pub const IN_PROGRESS: &str = "in-progress";
    pub const COMPLETED: &str = "completed";
    /// Synthetic status shown on the URL panel when another annotator has
    /// submitted for a URL the current user has not started.
    pub const OTHERS_IN_PROGRESS: &str = "others-in-progress";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_code_is_lowercased_hyphenated() {
        assert_eq!(User::derive_access_code("Ann", "Lee"), "ann-lee");
        assert_eq!(User::derive_access_code("MARY", "O'Hara"), "mary-o'hara");
    }
}
