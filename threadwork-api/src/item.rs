use chrono::SecondsFormat;
use uuid::Uuid;

use crate::{AccountId, Tag, Time, STUB_UUID};

pub const MIME_URL: &str = "application/url";

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn stub() -> ItemId {
        ItemId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ItemMetadata {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub mentions: Vec<Tag>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Item {
    pub id: ItemId,

    /// Item this one replies to, None for top-level submissions
    pub parent_id: Option<ItemId>,

    /// Top-level submission of the thread this item belongs to
    pub op_id: Option<ItemId>,

    pub author_id: AccountId,
    pub author_handle: String,

    pub title: Option<String>,
    pub mime_type: String,
    pub data: String,

    /// Sum of the vote weights, pre-multiplied by SCORE_MULTIPLIER
    pub score: i64,

    pub submitted_at: Time,
    pub updated_at: Time,
    pub deleted: bool,

    #[serde(default)]
    pub metadata: ItemMetadata,
}

impl Item {
    pub fn is_top(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_link(&self) -> bool {
        self.mime_type == MIME_URL
    }

    /// Host part of a link submission
    pub fn domain(&self) -> Option<&str> {
        if !self.is_link() {
            return None;
        }
        self.data.split('/').nth(2).filter(|d| !d.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.title.as_deref().map_or(true, str::is_empty)
    }

    pub fn permalink(&self) -> String {
        format!("/~{}/{}", self.author_handle, self.id.0)
    }

    pub fn parent_link(&self) -> String {
        match self.parent_id {
            Some(p) => format!("/parent/{}/{}", self.id.0, p.0),
            None => String::from("/"),
        }
    }

    pub fn op_link(&self) -> String {
        match self.op_id {
            Some(op) => format!("/op/{}/{}", self.id.0, op.0),
            None => String::from("/"),
        }
    }

    pub fn iso_date(&self) -> String {
        self.submitted_at.to_rfc3339_opts(SecondsFormat::Millis, false)
    }
}
