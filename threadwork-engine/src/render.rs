use anyhow::Context;

use crate::{
    api::{
        Account, AccountFilter, AccountId, Db, Error as ApiError, Item, ItemFilter, ItemId, Time,
        Vote, VoteDirection, VoteFilter, MAX_CONTENT_ITEMS,
    },
    format_score, humanize, merge_votes, rewrite_item_tags, Error, Forest, Tree, Viewer,
};

/// Everything a response is rendered relative to
#[derive(Clone, Debug)]
pub struct RenderContext {
    /// None for anonymous requests
    pub viewer: Option<Viewer>,

    /// Reference point for relative times, fixed for the whole response
    pub now: Time,
}

impl RenderContext {
    pub fn anonymous(now: Time) -> RenderContext {
        RenderContext { viewer: None, now }
    }

    pub fn for_account(account: Account, now: Time) -> RenderContext {
        RenderContext {
            viewer: Some(Viewer::new(account)),
            now,
        }
    }

    fn is_logged(&self) -> bool {
        self.viewer
            .as_ref()
            .map_or(false, |v| v.account.is_logged())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct RenderedItem {
    pub id: ItemId,
    pub parent_id: Option<ItemId>,
    pub title: Option<String>,
    pub author: String,
    pub mime_type: String,
    pub data: String,
    pub domain: Option<String>,
    pub deleted: bool,

    pub score: String,
    pub raw_score: i64,
    pub vote: Option<VoteDirection>,

    pub submitted_at: String,
    pub from_now: String,

    pub permalink: String,
    pub parent_link: String,
    pub op_link: String,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct RenderedThread {
    pub title: String,
    pub items: Vec<Tree<RenderedItem>>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct RenderedAccount {
    pub id: AccountId,
    pub handle: String,
    pub link: String,
    pub score: String,
    pub created: String,
}

fn render_item(ctx: &RenderContext, item: &Item) -> RenderedItem {
    let (title, data) = match item.deleted {
        true => (None, String::new()),
        false => (item.title.clone(), item.data.clone()),
    };
    RenderedItem {
        id: item.id,
        parent_id: item.parent_id,
        title,
        author: item.author_handle.clone(),
        mime_type: item.mime_type.clone(),
        data,
        domain: item.domain().map(String::from),
        deleted: item.deleted,
        score: format_score(item.score),
        raw_score: item.score,
        vote: ctx
            .viewer
            .as_ref()
            .and_then(|v| v.voted_on(&item.id))
            .and_then(Vote::direction),
        submitted_at: item.iso_date(),
        from_now: humanize(item.submitted_at, ctx.now),
        permalink: item.permalink(),
        parent_link: item.parent_link(),
        op_link: item.op_link(),
    }
}

fn render_account(ctx: &RenderContext, account: &Account) -> RenderedAccount {
    RenderedAccount {
        id: account.id,
        handle: account.handle.clone(),
        link: account.link(),
        score: format_score(account.score),
        created: humanize(account.created_at, ctx.now),
    }
}

fn genitive(name: &str) -> String {
    match name.ends_with('s') {
        true => format!("{name}'"),
        false if name.is_empty() => String::new(),
        false => format!("{name}'s"),
    }
}

fn page_title(item: &Item) -> String {
    match item.title.as_deref() {
        Some(t) if !t.is_empty() => String::from(t),
        _ => format!("{} comment", genitive(&item.author_handle)),
    }
}

/// Loads the viewer's votes on `targets` and merges them into the viewer
pub async fn load_votes<'v, D: Db>(
    db: &mut D,
    viewer: Option<&'v mut Viewer>,
    targets: &[ItemId],
) -> Result<&'v [Vote], Error> {
    let viewer = viewer
        .filter(|v| v.account.is_logged())
        .ok_or(ApiError::NoAccount)?;
    if targets.is_empty() {
        return Err(ApiError::NoTargets.into());
    }
    let filter = VoteFilter {
        submitted_by: viewer.account.id,
        items: targets.to_vec(),
        max_items: MAX_CONTENT_ITEMS,
    };
    let incoming = db
        .load_votes(&filter)
        .await
        .with_context(|| format!("loading votes of {:?}", viewer.account.id))?;
    Ok(merge_votes(Some(viewer), targets, incoming)?)
}

/// Attaches the viewer's votes for the forest's items, if there is a viewer.
/// Failing to load votes does not prevent rendering.
async fn attach_votes<D: Db>(db: &mut D, ctx: &mut RenderContext, forest: &Forest<Item>) {
    if !ctx.is_logged() || forest.is_empty() {
        return;
    }
    let targets = forest.iter().map(|(_, i)| i.id).collect::<Vec<_>>();
    if let Err(err) = load_votes(db, ctx.viewer.as_mut(), &targets).await {
        tracing::error!(?err, "failed loading votes, rendering without them");
    }
}

async fn render_items<D: Db>(
    db: &mut D,
    ctx: &mut RenderContext,
    items: Vec<Item>,
) -> Vec<Tree<RenderedItem>> {
    let mut forest = Forest::build(items);
    forest.assign_levels();
    forest.payloads_mut().for_each(rewrite_item_tags);
    attach_votes(db, ctx, &forest).await;
    forest.to_trees(|i| render_item(ctx, i))
}

/// Renders an item along with all the replies in its thread
pub async fn render_thread<D: Db>(
    db: &mut D,
    ctx: &mut RenderContext,
    id: ItemId,
) -> Result<RenderedThread, Error> {
    let item = db
        .load_item(id)
        .await
        .with_context(|| format!("loading item {id:?}"))?
        .filter(|i| !i.is_empty())
        .ok_or_else(|| Error::not_found(format!("item {}", id.0)))?;
    let title = page_title(&item);

    let replies = db
        .load_items(&ItemFilter::context(id))
        .await
        .with_context(|| format!("loading thread of item {id:?}"))?;
    let mut items = Vec::with_capacity(replies.len() + 1);
    items.push(item);
    items.extend(replies.into_iter().filter(|i| i.id != id));
    tracing::debug!(?id, num_items = items.len(), "rendering thread");

    let items = render_items(db, ctx, items).await;
    Ok(RenderedThread { title, items })
}

/// Renders the list of top-level submissions
pub async fn render_index<D: Db>(
    db: &mut D,
    ctx: &mut RenderContext,
) -> Result<Vec<Tree<RenderedItem>>, Error> {
    let items = db
        .load_items(&ItemFilter::top_level())
        .await
        .context("loading top-level items")?;
    Ok(render_items(db, ctx, items).await)
}

/// Renders accounts as a forest where each account is a child of the account
/// that invited it
pub async fn render_accounts<D: Db>(
    db: &mut D,
    ctx: &RenderContext,
    filter: &AccountFilter,
) -> Result<Vec<Tree<RenderedAccount>>, Error> {
    let accounts = db
        .load_accounts(filter)
        .await
        .with_context(|| format!("loading accounts with {filter:?}"))?;
    let mut forest = Forest::build(accounts);
    forest.assign_levels();
    Ok(forest.to_trees(|a| render_account(ctx, a)))
}
