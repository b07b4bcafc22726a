//! Waste item types

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Collection status of a waste item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Pending,
    Collected,
    Processed,
}

impl ItemStatus {
    /// All accepted statuses, in lifecycle order
    pub const ALL: [ItemStatus; 3] = [
        ItemStatus::Pending,
        ItemStatus::Collected,
        ItemStatus::Processed,
    ];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Collected => "collected",
            ItemStatus::Processed => "processed",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ItemStatus::Pending),
            "collected" => Ok(ItemStatus::Collected),
            "processed" => Ok(ItemStatus::Processed),
            other => Err(format!("invalid item status: {:?}", other)),
        }
    }
}

/// A waste item as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ItemStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Postgres numeric columns come back as strings.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Request body for creating or updating an item
///
/// Unset fields are left out of the JSON, so a payload can also describe
/// partial or deliberately incomplete input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

impl ItemPayload {
    /// A payload with only a title
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    /// Set the title
    pub fn with_title(mut self, value: &str) -> Self {
        self.title = Some(value.to_string());
        self
    }

    /// Set the description
    pub fn with_description(mut self, value: &str) -> Self {
        self.description = Some(value.to_string());
        self
    }

    /// Set the location
    pub fn with_location(mut self, value: &str) -> Self {
        self.location = Some(value.to_string());
        self
    }

    /// Set the weight
    pub fn with_weight(mut self, value: f64) -> Self {
        self.weight = Some(value);
        self
    }

    /// Set the status
    pub fn with_status(mut self, value: ItemStatus) -> Self {
        self.status = Some(value);
        self
    }

    /// Fill every unset field from `defaults`
    pub fn merge_over(self, defaults: ItemPayload) -> ItemPayload {
        ItemPayload {
            title: self.title.or(defaults.title),
            description: self.description.or(defaults.description),
            location: self.location.or(defaults.location),
            weight: self.weight.or(defaults.weight),
            status: self.status.or(defaults.status),
        }
    }
}

/// Body of a successful `DELETE /items/:id`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedItem {
    pub message: String,
    pub deleted_item_id: String,
}

/// Items touched by a create → update → delete run
#[derive(Debug, Clone)]
pub struct ItemWorkflow {
    pub created: Item,
    pub updated: Item,
    pub deleted: DeletedItem,
}
