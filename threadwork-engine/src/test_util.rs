use std::future::Future;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::api::{
    Account, AccountFilter, AccountId, Db, Item, ItemFilter, ItemId, ItemMetadata, Time, Uuid,
    Vote, VoteFilter,
};

pub fn at(secs: i64) -> Time {
    Utc.timestamp_opt(1_600_000_000 + secs, 0).unwrap()
}

pub fn run<F: Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(f)
}

/// An item written by alice. Every reply belongs to the thread of item 1.
pub fn item(n: u128, parent: Option<u128>) -> Item {
    Item {
        id: ItemId(Uuid::from_u128(n)),
        parent_id: parent.map(|p| ItemId(Uuid::from_u128(p))),
        op_id: parent.map(|_| ItemId(Uuid::from_u128(1))),
        author_id: AccountId(Uuid::from_u128(1000)),
        author_handle: String::from("alice"),
        title: None,
        mime_type: String::from(crate::MIME_HTML),
        data: format!("item {n}"),
        score: 0,
        submitted_at: at(0),
        updated_at: at(0),
        deleted: false,
        metadata: ItemMetadata::default(),
    }
}

pub fn account(n: u128, invited_by: Option<u128>) -> Account {
    Account {
        id: AccountId(Uuid::from_u128(n)),
        handle: format!("user{n}"),
        created_by: invited_by.map(|p| AccountId(Uuid::from_u128(p))),
        created_at: at(0),
        updated_at: at(0),
        score: 0,
        deleted: false,
        private: false,
    }
}

#[derive(Debug, Default)]
pub struct Fixture {
    pub items: Vec<Item>,
    pub votes: Vec<Vote>,
    pub accounts: Vec<Account>,
    pub fail_votes: bool,
}

#[async_trait]
impl Db for &Fixture {
    async fn load_item(&mut self, id: ItemId) -> anyhow::Result<Option<Item>> {
        Ok(self.items.iter().find(|i| i.id == id).cloned())
    }

    async fn load_items(&mut self, filter: &ItemFilter) -> anyhow::Result<Vec<Item>> {
        Ok(self
            .items
            .iter()
            .filter(|i| !filter.top_only || i.is_top())
            .filter(|i| filter.context.map_or(true, |op| i.op_id == Some(op)))
            .take(filter.max_items)
            .cloned()
            .collect())
    }

    async fn load_votes(&mut self, filter: &VoteFilter) -> anyhow::Result<Vec<Vote>> {
        if self.fail_votes {
            anyhow::bail!("vote storage is unavailable");
        }
        Ok(self
            .votes
            .iter()
            .filter(|v| v.submitted_by == filter.submitted_by)
            .filter(|v| filter.items.contains(&v.item_id))
            .take(filter.max_items)
            .cloned()
            .collect())
    }

    async fn load_accounts(&mut self, filter: &AccountFilter) -> anyhow::Result<Vec<Account>> {
        Ok(self
            .accounts
            .iter()
            .filter(|a| filter.handle.as_ref().map_or(true, |h| a.handle == *h))
            .take(filter.max_items)
            .cloned()
            .collect())
    }
}
