use crate::{AccountId, ItemId, Time, SCORE_MULTIPLIER};

/// Storage identity of a vote record, distinct from the voted item's id
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct VoteId(pub i64);

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Vote {
    pub id: VoteId,
    pub submitted_by: AccountId,
    pub item_id: ItemId,

    /// Positive for an upvote, negative for a downvote, in SCORE_MULTIPLIER units
    pub weight: i64,

    pub submitted_at: Time,
    pub updated_at: Time,
}

impl Vote {
    pub fn is_yay(&self) -> bool {
        self.weight > 0
    }

    pub fn is_nay(&self) -> bool {
        self.weight < 0
    }

    pub fn direction(&self) -> Option<VoteDirection> {
        match self.weight {
            w if w > 0 => Some(VoteDirection::Yay),
            w if w < 0 => Some(VoteDirection::Nay),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Yay,
    Nay,
}

impl VoteDirection {
    pub fn weight(&self) -> i64 {
        match self {
            VoteDirection::Yay => SCORE_MULTIPLIER,
            VoteDirection::Nay => -SCORE_MULTIPLIER,
        }
    }

    pub fn parse(s: &str) -> Option<VoteDirection> {
        match s {
            "yay" => Some(VoteDirection::Yay),
            "nay" => Some(VoteDirection::Nay),
            _ => None,
        }
    }
}
