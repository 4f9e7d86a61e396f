use std::{
    collections::{btree_map, BTreeMap, HashMap},
    path::Path,
};

use anyhow::Context;
use async_trait::async_trait;
use threadwork_api::{
    Account, AccountFilter, AccountId, AuthToken, Db, Error, Item, ItemFilter, ItemId, Time,
    Vote, VoteDirection, VoteFilter, VoteId,
};

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct Session {
    pub token: AuthToken,
    pub account: AccountId,
}

/// Serialized form of a whole store, as written by `generate-test-data`
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct Dump {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub votes: Vec<Vote>,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

/// In-memory storage for accounts, items and votes
#[derive(Debug, Default)]
pub struct MemStore {
    accounts: BTreeMap<AccountId, Account>,
    items: BTreeMap<ItemId, Item>,
    votes: BTreeMap<VoteId, Vote>,
    sessions: HashMap<AuthToken, AccountId>,
}

impl MemStore {
    pub fn new() -> MemStore {
        MemStore::default()
    }

    pub fn from_dump(dump: Dump) -> MemStore {
        MemStore {
            accounts: dump.accounts.into_iter().map(|a| (a.id, a)).collect(),
            items: dump.items.into_iter().map(|i| (i.id, i)).collect(),
            votes: dump.votes.into_iter().map(|v| (v.id, v)).collect(),
            sessions: dump
                .sessions
                .into_iter()
                .map(|s| (s.token, s.account))
                .collect(),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<MemStore> {
        let data = std::fs::read(path)
            .with_context(|| format!("reading store dump from {path:?}"))?;
        let dump: Dump = serde_json::from_slice(&data)
            .with_context(|| format!("parsing store dump from {path:?}"))?;
        tracing::info!(
            accounts = dump.accounts.len(),
            items = dump.items.len(),
            votes = dump.votes.len(),
            "loaded store dump"
        );
        Ok(MemStore::from_dump(dump))
    }

    pub fn dump(&self) -> Dump {
        Dump {
            accounts: self.accounts.values().cloned().collect(),
            items: self.items.values().cloned().collect(),
            votes: self.votes.values().cloned().collect(),
            sessions: self
                .sessions
                .iter()
                .map(|(&token, &account)| Session { token, account })
                .collect(),
        }
    }

    pub fn add_account(&mut self, a: Account) {
        self.accounts.insert(a.id, a);
    }

    pub fn add_item(&mut self, i: Item) {
        self.items.insert(i.id, i);
    }

    pub fn add_session(&mut self, token: AuthToken, account: AccountId) {
        self.sessions.insert(token, account);
    }

    pub fn resolve(&self, tok: AuthToken) -> Result<Account, Error> {
        self.sessions
            .get(&tok)
            .and_then(|id| self.accounts.get(id))
            .filter(|a| !a.deleted)
            .cloned()
            .ok_or(Error::PermissionDenied)
    }

    /// Records `account`'s vote on `item`, replacing any previous vote of that
    /// account on that item, and updates the item's score accordingly
    pub fn save_vote(
        &mut self,
        account: AccountId,
        item: ItemId,
        direction: VoteDirection,
        now: Time,
    ) -> Result<Vote, Error> {
        let target = self
            .items
            .get_mut(&item)
            .filter(|i| !i.deleted)
            .ok_or_else(|| Error::NotFound(format!("item {}", item.0)))?;
        let weight = direction.weight();
        let existing = self
            .votes
            .values_mut()
            .find(|v| v.submitted_by == account && v.item_id == item);
        let (vote, delta) = match existing {
            Some(v) if v.weight == weight => (v.clone(), 0),
            Some(v) => {
                let delta = weight - v.weight;
                v.weight = weight;
                v.updated_at = now;
                (v.clone(), delta)
            }
            None => {
                let id = VoteId(self.votes.keys().next_back().map_or(1, |v| v.0 + 1));
                let vote = Vote {
                    id,
                    submitted_by: account,
                    item_id: item,
                    weight,
                    submitted_at: now,
                    updated_at: now,
                };
                match self.votes.entry(id) {
                    btree_map::Entry::Vacant(e) => e.insert(vote.clone()),
                    btree_map::Entry::Occupied(_) => {
                        return Err(Error::Unknown(format!("vote id {} already used", id.0)))
                    }
                };
                (vote, weight)
            }
        };
        target.score = target.score.saturating_add(delta);
        tracing::debug!(?account, ?item, ?direction, delta, "saved vote");
        Ok(vote)
    }

    /// Whether `item` is `op` or one of its replies, walking at most as many
    /// parents as there are items
    fn in_thread(&self, item: &Item, op: ItemId) -> bool {
        if item.op_id == Some(op) {
            return true;
        }
        let mut cur = Some(item);
        for _ in 0..=self.items.len() {
            match cur {
                Some(i) if i.id == op => return true,
                Some(i) => cur = i.parent_id.and_then(|p| self.items.get(&p)),
                None => return false,
            }
        }
        false
    }
}

#[async_trait]
impl Db for &MemStore {
    async fn load_item(&mut self, id: ItemId) -> anyhow::Result<Option<Item>> {
        Ok(self.items.get(&id).cloned())
    }

    async fn load_items(&mut self, filter: &ItemFilter) -> anyhow::Result<Vec<Item>> {
        let mut res = self
            .items
            .values()
            .filter(|i| !filter.top_only || i.is_top())
            .filter(|i| filter.context.map_or(true, |op| self.in_thread(i, op)))
            .cloned()
            .collect::<Vec<_>>();
        if filter.top_only {
            res.sort_by(|a, b| {
                b.score
                    .cmp(&a.score)
                    .then(b.submitted_at.cmp(&a.submitted_at))
            });
        } else {
            res.sort_by_key(|i| (i.submitted_at, i.id));
        }
        res.truncate(filter.max_items);
        Ok(res)
    }

    async fn load_votes(&mut self, filter: &VoteFilter) -> anyhow::Result<Vec<Vote>> {
        Ok(self
            .votes
            .values()
            .filter(|v| v.submitted_by == filter.submitted_by)
            .filter(|v| filter.items.contains(&v.item_id))
            .take(filter.max_items)
            .cloned()
            .collect())
    }

    async fn load_accounts(&mut self, filter: &AccountFilter) -> anyhow::Result<Vec<Account>> {
        let mut res = self
            .accounts
            .values()
            .filter(|a| !a.deleted && !a.private)
            .filter(|a| filter.handle.as_ref().map_or(true, |h| a.handle == *h))
            .cloned()
            .collect::<Vec<_>>();
        res.sort_by_key(|a| (a.created_at, a.id));
        res.truncate(filter.max_items);
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use threadwork_api::{ItemMetadata, Uuid, SCORE_MULTIPLIER};
    use threadwork_engine::{render_thread, RenderContext};

    use super::*;

    fn at(secs: i64) -> Time {
        Utc.timestamp_opt(1_600_000_000 + secs, 0).unwrap()
    }

    fn run<F: std::future::Future>(f: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f)
    }

    fn account(n: u128, invited_by: Option<u128>) -> Account {
        Account {
            id: AccountId(Uuid::from_u128(n)),
            handle: format!("user{n}"),
            created_by: invited_by.map(|p| AccountId(Uuid::from_u128(p))),
            created_at: at(n as i64),
            updated_at: at(n as i64),
            score: 0,
            deleted: false,
            private: false,
        }
    }

    fn item(n: u128, parent: Option<u128>, op: Option<u128>) -> Item {
        Item {
            id: ItemId(Uuid::from_u128(n)),
            parent_id: parent.map(|p| ItemId(Uuid::from_u128(p))),
            op_id: op.map(|p| ItemId(Uuid::from_u128(p))),
            author_id: AccountId(Uuid::from_u128(1)),
            author_handle: String::from("user1"),
            title: None,
            mime_type: String::from("text/html"),
            data: format!("item {n}"),
            score: 0,
            submitted_at: at(n as i64),
            updated_at: at(n as i64),
            deleted: false,
            metadata: ItemMetadata::default(),
        }
    }

    fn store() -> MemStore {
        let mut s = MemStore::new();
        s.add_account(account(1, None));
        s.add_account(account(2, Some(1)));
        s.add_item(item(10, None, None));
        s.add_item(item(11, Some(10), Some(10)));
        // op_id missing, only reachable through its parent
        s.add_item(item(12, Some(11), None));
        s.add_item(item(20, None, None));
        s.add_session(AuthToken(Uuid::from_u128(100)), AccountId(Uuid::from_u128(2)));
        s
    }

    fn ids(items: &[Item]) -> Vec<u128> {
        items.iter().map(|i| i.id.0.as_u128()).collect()
    }

    #[test]
    fn resolves_sessions() {
        let s = store();
        assert_eq!(s.resolve(AuthToken(Uuid::from_u128(100))).unwrap().handle, "user2");
        assert_eq!(
            s.resolve(AuthToken(Uuid::from_u128(101))).unwrap_err(),
            Error::PermissionDenied
        );
    }

    #[test]
    fn thread_context_includes_all_replies() {
        let s = store();
        let items = run((&s).load_items(&ItemFilter::context(ItemId(Uuid::from_u128(10)))))
            .unwrap();
        assert_eq!(ids(&items), vec![10, 11, 12]);
    }

    #[test]
    fn top_level_is_sorted_by_score() {
        let mut s = store();
        s.save_vote(
            AccountId(Uuid::from_u128(2)),
            ItemId(Uuid::from_u128(10)),
            VoteDirection::Yay,
            at(50),
        )
        .unwrap();
        let items = run((&s).load_items(&ItemFilter::top_level())).unwrap();
        assert_eq!(ids(&items), vec![10, 20]);
    }

    #[test]
    fn votes_are_upserted() {
        let mut s = store();
        let (voter, target) = (AccountId(Uuid::from_u128(2)), ItemId(Uuid::from_u128(11)));
        let first = s.save_vote(voter, target, VoteDirection::Yay, at(50)).unwrap();
        let again = s.save_vote(voter, target, VoteDirection::Yay, at(60)).unwrap();
        assert_eq!(first, again);
        assert_eq!(s.items[&target].score, SCORE_MULTIPLIER);

        let flipped = s.save_vote(voter, target, VoteDirection::Nay, at(70)).unwrap();
        assert_eq!(flipped.id, first.id);
        assert_eq!(flipped.updated_at, at(70));
        assert_eq!(s.items[&target].score, -SCORE_MULTIPLIER);
        assert_eq!(s.votes.len(), 1);

        let other = s
            .save_vote(AccountId(Uuid::from_u128(1)), target, VoteDirection::Nay, at(80))
            .unwrap();
        assert_ne!(other.id, first.id);
        assert_eq!(s.items[&target].score, -2 * SCORE_MULTIPLIER);
    }

    #[test]
    fn voting_on_missing_item_fails() {
        let mut s = store();
        let res = s.save_vote(
            AccountId(Uuid::from_u128(2)),
            ItemId(Uuid::from_u128(999)),
            VoteDirection::Yay,
            at(0),
        );
        assert!(matches!(res, Err(Error::NotFound(_))));
    }

    #[test]
    fn private_accounts_are_hidden() {
        let mut s = store();
        let mut hidden = account(3, Some(1));
        hidden.private = true;
        s.add_account(hidden);
        let accounts = run((&s).load_accounts(&AccountFilter::all())).unwrap();
        assert_eq!(accounts.len(), 2);
        let filtered = run((&s).load_accounts(&AccountFilter {
            handle: Some(String::from("user2")),
            ..AccountFilter::all()
        }))
        .unwrap();
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn dump_survives_a_file() {
        let mut s = store();
        s.save_vote(
            AccountId(Uuid::from_u128(2)),
            ItemId(Uuid::from_u128(12)),
            VoteDirection::Nay,
            at(50),
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");
        std::fs::write(&path, serde_json::to_vec(&s.dump()).unwrap()).unwrap();
        let loaded = MemStore::load(&path).unwrap();
        assert_eq!(loaded.items, s.items);
        assert_eq!(loaded.votes, s.votes);
        assert_eq!(loaded.accounts, s.accounts);
        assert_eq!(loaded.sessions, s.sessions);
        assert!(MemStore::load(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn renders_thread_with_viewer_votes() {
        let mut s = store();
        let viewer = s.resolve(AuthToken(Uuid::from_u128(100))).unwrap();
        s.save_vote(viewer.id, ItemId(Uuid::from_u128(12)), VoteDirection::Yay, at(50))
            .unwrap();
        let mut ctx = RenderContext::for_account(viewer, at(0) + Duration::days(2));
        let mut db = &s;
        let thread = run(render_thread(&mut db, &mut ctx, ItemId(Uuid::from_u128(10)))).unwrap();
        assert_eq!(thread.title, "user1's comment");
        let reply = &thread.items[0].children[0].children[0];
        assert_eq!(reply.level, 2);
        assert_eq!(reply.value.score, "1");
        assert_eq!(reply.value.vote, Some(VoteDirection::Yay));
        assert_eq!(reply.value.from_now, "2 days ago");
    }
}
