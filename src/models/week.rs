use serde::{Deserialize, Deserializer, Serialize};

use super::resource::Resource;

pub const DEFAULT_PREVIEW_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub id: i64,
    pub week_number: i32,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub resources: Vec<Resource>,
}

impl Week {
    /// Completion is derived from content, never stored.
    pub fn is_complete(&self) -> bool {
        !self.content.trim().is_empty()
    }

    pub fn content_preview(&self, max_len: usize) -> String {
        if self.content.trim().is_empty() {
            return "No content yet".to_string();
        }
        if self.content.chars().count() <= max_len {
            return self.content.clone();
        }
        let head: String = self.content.chars().take(max_len).collect();
        format!("{}...", head)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Resource>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Resource>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWeekRequest {
    pub content: String,
}
