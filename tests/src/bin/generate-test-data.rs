use std::collections::HashSet;

use chrono::{Duration, Utc};
use rand::{seq::SliceRandom, Rng};
use threadwork_api::{
    Account, AccountId, AuthToken, Item, ItemId, ItemMetadata, Tag, Time, Vote, VoteId,
    SCORE_MULTIPLIER,
};
use threadwork_store::{Dump, Session};
use uuid::Uuid;

const NUM_ACCOUNTS: usize = 20;
const NUM_THREADS: usize = 30;
const MAX_REPLIES_PER_THREAD: usize = 25;
const NUM_VOTES: usize = 600;

const COMMENT_WORD_COUNT: usize = 30;
const MAX_AGE_MINUTES: i64 = 60 * 24 * 365;

fn gen_time(rng: &mut impl Rng, after: Time) -> Time {
    let since = (Utc::now() - after).num_minutes().max(1);
    after + Duration::minutes(rng.gen_range(0..since))
}

fn gen_tags(rng: &mut impl Rng, handles: &[String]) -> (String, ItemMetadata) {
    let mut text = lipsum::lipsum_words(rng.gen_range(1..COMMENT_WORD_COUNT));
    let mut metadata = ItemMetadata::default();
    if rng.gen_bool(0.3) {
        let word = lipsum::lipsum_words(1).to_lowercase();
        let word = word.trim_matches(|c: char| !c.is_alphanumeric());
        let name = format!("#{word}");
        text = format!("{text} {name}");
        metadata.tags.push(Tag {
            url: format!("/t/{word}"),
            name,
        });
    }
    if rng.gen_bool(0.2) {
        if let Some(handle) = handles.choose(rng) {
            let name = format!("~{handle}");
            text = format!("{name} {text}");
            metadata.mentions.push(Tag {
                url: format!("/~{handle}"),
                name,
            });
        }
    }
    (text, metadata)
}

fn main() {
    let mut rng = rand::thread_rng();
    let epoch = Utc::now() - Duration::minutes(MAX_AGE_MINUTES);

    // Generate accounts, each invited by an earlier one
    let mut accounts: Vec<Account> = Vec::new();
    for i in 0..NUM_ACCOUNTS {
        let created_by = match i {
            0 => None,
            _ => Some(accounts[rng.gen_range(0..i)].id),
        };
        let created_at = gen_time(&mut rng, epoch);
        let word = lipsum::lipsum_words(1).to_lowercase();
        let word = word.trim_matches(|c: char| !c.is_alphanumeric());
        accounts.push(Account {
            id: AccountId(Uuid::new_v4()),
            handle: format!("{word}{i}"),
            created_by,
            created_at,
            updated_at: created_at,
            score: 0,
            deleted: false,
            private: rng.gen_bool(0.05),
        });
    }
    let handles = accounts.iter().map(|a| a.handle.clone()).collect::<Vec<_>>();
    let sessions = accounts
        .iter()
        .map(|a| Session {
            token: AuthToken(Uuid::new_v4()),
            account: a.id,
        })
        .collect::<Vec<_>>();

    // Generate threads, replies pointing to earlier items of the same thread
    let mut items: Vec<Item> = Vec::new();
    for _ in 0..NUM_THREADS {
        let author = &accounts[rng.gen_range(0..accounts.len())];
        let op_id = ItemId(Uuid::new_v4());
        let submitted_at = gen_time(&mut rng, author.created_at);
        let (title, mime_type, data) = match rng.gen_bool(0.5) {
            true => (
                lipsum::lipsum_title(),
                String::from("application/url"),
                format!("https://example.org/{}", Uuid::new_v4()),
            ),
            false => (
                lipsum::lipsum_title(),
                String::from("text/markdown"),
                lipsum::lipsum(COMMENT_WORD_COUNT),
            ),
        };
        let thread_start = items.len();
        items.push(Item {
            id: op_id,
            parent_id: None,
            op_id: None,
            author_id: author.id,
            author_handle: author.handle.clone(),
            title: Some(title),
            mime_type,
            data,
            score: 0,
            submitted_at,
            updated_at: submitted_at,
            deleted: false,
            metadata: ItemMetadata::default(),
        });

        for _ in 0..rng.gen_range(0..MAX_REPLIES_PER_THREAD) {
            let parent = &items[rng.gen_range(thread_start..items.len())];
            let (parent_id, parent_time) = (parent.id, parent.submitted_at);
            let author = &accounts[rng.gen_range(0..accounts.len())];
            let (data, metadata) = gen_tags(&mut rng, &handles);
            let submitted_at = gen_time(&mut rng, parent_time);
            items.push(Item {
                id: ItemId(Uuid::new_v4()),
                parent_id: Some(parent_id),
                op_id: Some(op_id),
                author_id: author.id,
                author_handle: author.handle.clone(),
                title: None,
                mime_type: String::from(match rng.gen_bool(0.5) {
                    true => "text/markdown",
                    false => "text/html",
                }),
                data,
                score: 0,
                submitted_at,
                updated_at: submitted_at,
                deleted: rng.gen_bool(0.02),
                metadata,
            });
        }
    }

    // Generate votes, at most one per account and item
    let mut voted = HashSet::new();
    let mut votes = Vec::new();
    for _ in 0..NUM_VOTES {
        let voter = rng.gen_range(0..accounts.len());
        let target = rng.gen_range(0..items.len());
        if !voted.insert((voter, target)) {
            continue;
        }
        let weight = match rng.gen_bool(0.8) {
            true => SCORE_MULTIPLIER,
            false => -SCORE_MULTIPLIER,
        };
        let submitted_at = gen_time(&mut rng, items[target].submitted_at);
        items[target].score += weight;
        votes.push(Vote {
            id: VoteId(votes.len() as i64 + 1),
            submitted_by: accounts[voter].id,
            item_id: items[target].id,
            weight,
            submitted_at,
            updated_at: submitted_at,
        });
    }

    let dump = Dump {
        accounts,
        items,
        votes,
        sessions,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&dump).expect("serializing generated data")
    );
}
