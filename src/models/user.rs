use serde::{Deserialize, Serialize};

/// The profile the backend returns for the signed-in reader.
///
/// `book_mbti` doubles as the onboarding marker: a reader who never picked a
/// reading type has not finished onboarding yet.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub book_mbti: Option<String>,
}

impl UserProfile {
    pub fn new(username: impl Into<String>) -> Self {
        UserProfile {
            username: username.into(),
            ..Default::default()
        }
    }

    /// True while the reader still has to go through onboarding.
    pub fn needs_onboarding(&self) -> bool {
        self.book_mbti
            .as_deref()
            .map(str::trim)
            .map_or(true, str::is_empty)
    }

    /// Apply the fields echoed back by a profile update.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(email) = &update.email {
            self.email = Some(email.clone());
        }
        if let Some(nickname) = &update.nickname {
            self.nickname = Some(nickname.clone());
        }
        if let Some(age) = update.age {
            self.age = Some(age);
        }
        if let Some(book_mbti) = &update.book_mbti {
            self.book_mbti = Some(book_mbti.clone());
        }
    }
}

/// Partial profile update; only the fields that are set are sent.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_mbti: Option<String>,
}

/// Registration form for a new account.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}
