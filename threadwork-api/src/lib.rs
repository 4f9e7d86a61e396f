use chrono::Utc;

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

mod account;
pub use account::{Account, AccountId};

mod auth;
pub use auth::AuthToken;

mod db;
pub use db::{AccountFilter, Db, ItemFilter, VoteFilter};

mod error;
pub use error::Error;

mod item;
pub use item::{Item, ItemId, ItemMetadata};

mod tag;
pub use tag::{Tag, TagKind};

mod vote;
pub use vote::{Vote, VoteDirection, VoteId};

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

/// Vote weights and item scores are stored multiplied by this
pub const SCORE_MULTIPLIER: i64 = 10_000;

pub const SCORE_MAX_K: f64 = 10_000.0;
pub const SCORE_MAX_M: f64 = 10_000_000.0;
pub const SCORE_MAX_B: f64 = 10_000_000_000.0;

/// Maximum number of items loaded for one thread or listing
pub const MAX_CONTENT_ITEMS: usize = 200;
