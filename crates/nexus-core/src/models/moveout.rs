//! Moveout list model

use std::fmt;

use serde::{Deserialize, Serialize};

const STATUS_DRAFT: &str = "draft";
const STATUS_ACTIVE: &str = "active";
const STATUS_COMPLETED: &str = "completed";

/// Server-assigned moveout list identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveoutListId(String);

impl MoveoutListId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MoveoutListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MoveoutListId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Lifecycle status of a moveout list.
///
/// Anything the client does not recognise is kept verbatim in `Other` and
/// belongs to neither the pending nor the completed partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ListStatus {
    Draft,
    Active,
    Completed,
    Other(String),
}

impl ListStatus {
    /// Draft and active lists still have work left.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Draft | Self::Active)
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Draft => STATUS_DRAFT,
            Self::Active => STATUS_ACTIVE,
            Self::Completed => STATUS_COMPLETED,
            Self::Other(value) => value,
        }
    }
}

/// A missing status is unknown, not pending.
impl Default for ListStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

fn status_or_other<'de, D>(deserializer: D) -> Result<ListStatus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(ListStatus::from).unwrap_or_default())
}

impl From<String> for ListStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            STATUS_DRAFT => Self::Draft,
            STATUS_ACTIVE => Self::Active,
            STATUS_COMPLETED => Self::Completed,
            _ => Self::Other(value),
        }
    }
}

impl From<ListStatus> for String {
    fn from(value: ListStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A list of items to move out of stock, generated by a manager and worked
/// through by staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveoutList {
    pub id: MoveoutListId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Creation timestamp as reported by the server (RFC 3339)
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "status_or_other")]
    pub status: ListStatus,
    #[serde(default)]
    pub items: Vec<MoveoutItem>,
}

impl MoveoutList {
    /// Display title, falling back to a generic label.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Moveout List")
    }

    /// Completed and total item counts.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        let completed = self
            .items
            .iter()
            .filter(|item| item.status.as_deref() == Some(STATUS_COMPLETED))
            .count();
        (completed, self.items.len())
    }

    pub fn item(&self, item_id: &str) -> Option<&MoveoutItem> {
        self.items.iter().find(|item| item.item_id == item_id)
    }
}

/// One line of a moveout list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveoutItem {
    pub item_id: String,
    pub item_name: String,
    pub request_amount: u32,
    #[serde(default)]
    pub available_amount: Option<u32>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "completed_by")]
    pub processed_by: Option<String>,
    #[serde(default, alias = "completed_at")]
    pub processed_at: Option<String>,
}

impl MoveoutItem {
    /// Whether the server has marked this line as done.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.completed || self.status.as_deref() == Some(STATUS_COMPLETED)
    }
}

/// A line the user is assembling in the "generate moveout list" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftLine {
    pub item_id: String,
    pub item_name: String,
    pub category: String,
    /// Stock on hand when the line was added.
    pub current_quantity: u32,
    pub requesting_quantity: u32,
}

impl DraftLine {
    pub fn new(
        item_id: impl Into<String>,
        item_name: impl Into<String>,
        current_quantity: u32,
        requesting_quantity: u32,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            item_name: item_name.into(),
            category: "General".to_string(),
            current_quantity,
            requesting_quantity,
        }
    }

    #[must_use]
    pub const fn is_within_stock(&self) -> bool {
        self.requesting_quantity >= 1 && self.requesting_quantity <= self.current_quantity
    }
}

/// Request body for creating a moveout list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateMoveoutListRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub items: Vec<MoveoutItemRequest>,
}

/// One requested line in [`CreateMoveoutListRequest`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveoutItemRequest {
    pub item_id: String,
    pub item_name: String,
    pub available_amount: u32,
    pub request_amount: u32,
    pub category: String,
}

impl From<&DraftLine> for MoveoutItemRequest {
    fn from(line: &DraftLine) -> Self {
        Self {
            item_id: line.item_id.clone(),
            item_name: line.item_name.clone(),
            available_amount: line.current_quantity,
            request_amount: line.requesting_quantity,
            category: line.category.clone(),
        }
    }
}

/// Server acknowledgement of a created list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedList {
    pub id: MoveoutListId,
}
