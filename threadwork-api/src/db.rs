use async_trait::async_trait;

use crate::{Account, AccountId, Item, ItemId, Vote, MAX_CONTENT_ITEMS};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ItemFilter {
    /// Only items belonging to the thread of this top-level item
    pub context: Option<ItemId>,

    /// Only top-level items
    pub top_only: bool,

    pub max_items: usize,
}

impl ItemFilter {
    pub fn context(op: ItemId) -> ItemFilter {
        ItemFilter {
            context: Some(op),
            top_only: false,
            max_items: MAX_CONTENT_ITEMS,
        }
    }

    pub fn top_level() -> ItemFilter {
        ItemFilter {
            context: None,
            top_only: true,
            max_items: MAX_CONTENT_ITEMS,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoteFilter {
    pub submitted_by: AccountId,
    pub items: Vec<ItemId>,
    pub max_items: usize,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccountFilter {
    pub handle: Option<String>,
    pub max_items: usize,
}

impl AccountFilter {
    pub fn all() -> AccountFilter {
        AccountFilter {
            handle: None,
            max_items: MAX_CONTENT_ITEMS,
        }
    }
}

/// Storage collaborator the render pipeline loads its flat collections from
#[async_trait]
pub trait Db {
    async fn load_item(&mut self, id: ItemId) -> anyhow::Result<Option<Item>>;
    async fn load_items(&mut self, filter: &ItemFilter) -> anyhow::Result<Vec<Item>>;
    async fn load_votes(&mut self, filter: &VoteFilter) -> anyhow::Result<Vec<Vote>>;
    async fn load_accounts(&mut self, filter: &AccountFilter) -> anyhow::Result<Vec<Account>>;
}
