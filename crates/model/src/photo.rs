use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::HasId;

/// Search results carry at most this many photos per carpark.
pub const SEARCH_RESULT_PHOTOS: usize = 2;

/// A public suggestion may attach at most this many photos.
pub const MAX_SUGGESTION_PHOTOS: usize = 2;

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub url: String,
    pub caption: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl HasId for Photo {
    type IdType = String;
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPhoto {
    pub url: String,
    pub caption: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
}

impl NewPhoto {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            caption: None,
            taken_at: None,
        }
    }

    pub fn with_caption<S: Into<String>>(mut self, caption: S) -> Self {
        self.caption = Some(caption.into());
        self
    }
}
