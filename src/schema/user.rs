use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::schema::field::{readable_form, FieldDefault, FieldSpec};

pub const USER_SCHEMA: &str = "User";
pub const USER_TABLE: &str = "users";

/// Field layout of the `User` shape
pub const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("firstName", "first_name"),
    FieldSpec::text("lastName", "last_name"),
    FieldSpec::text("email", "email"),
    FieldSpec::text("username", "username"),
    FieldSpec::text("password", "password"),
    FieldSpec::timestamp("created", "created").with_default(FieldDefault::Now),
    FieldSpec::text("website", "website").with_getter(normalize_website),
];

/// Read-time projection of the `website` field.
///
/// Empty stays empty, `http://` and `https://` URLs are returned as-is, and
/// anything else gets `https://` prepended.
pub fn normalize_website(url: &str) -> String {
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Errors from optional record validation
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Malformed field '{field}': {reason}")]
    MalformedField { field: &'static str, reason: String },
}

/// Stored user row. `Serialize` yields the stored values; use
/// [`User::readable`] for the externally visible form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub created: DateTime<Utc>,
    pub website: Option<String>,
}

/// Input for creating a user; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub website: Option<String>,
}

impl NewUser {
    /// Opt-in checks; inserts never call this on their own
    pub fn validate(&self) -> Result<(), RecordError> {
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            let well_formed = email
                .split_once('@')
                .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.ends_with('.'))
                .unwrap_or(false);
            if !well_formed {
                return Err(RecordError::MalformedField {
                    field: "email",
                    reason: format!("'{}' is not an email address", email),
                });
            }
        }

        if let Some(username) = self.username.as_deref() {
            if username.trim().is_empty() {
                return Err(RecordError::MalformedField {
                    field: "username",
                    reason: "must not be blank".to_string(),
                });
            }
        }

        if let Some(website) = self.website.as_deref() {
            if website.chars().any(char::is_whitespace) {
                return Err(RecordError::MalformedField {
                    field: "website",
                    reason: "must not contain whitespace".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl User {
    /// Materialize a new record, stamping `created` with `now` when unset
    pub fn create(input: NewUser, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            username: input.username,
            password: input.password,
            created: input.created.unwrap_or(now),
            website: input.website,
        }
    }

    /// Website as presented to readers
    pub fn display_website(&self) -> Option<String> {
        self.website.as_deref().map(normalize_website)
    }

    /// Externally visible form with all field getters applied
    pub fn readable(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(stored)) => readable_form(USER_FIELDS, &stored),
            Ok(_) | Err(_) => {
                tracing::error!("User {} did not serialize to an object", self.id);
                Map::new()
            }
        }
    }
}
