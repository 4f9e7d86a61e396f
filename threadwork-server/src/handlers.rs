use axum::{
    extract::{Path, Query, State},
    Json,
};
use threadwork_api::{Account, AccountFilter, AccountId, ItemId, Uuid, Vote, VoteDirection};
use threadwork_engine::{
    render_accounts, render_index, render_thread, RenderContext, RenderedAccount, RenderedItem,
    RenderedThread, Tree,
};

use crate::{extractors::*, Error};

fn context(viewer: Option<Account>) -> RenderContext {
    let now = chrono::Utc::now();
    match viewer {
        Some(account) => RenderContext::for_account(account, now),
        None => RenderContext::anonymous(now),
    }
}

pub async fn index(
    MaybeAuth(viewer): MaybeAuth,
    State(store): State<Store>,
) -> Result<Json<Vec<Tree<RenderedItem>>>, Error> {
    let store = store.read().await;
    let mut ctx = context(viewer);
    Ok(Json(render_index(&mut &*store, &mut ctx).await?))
}

pub async fn show_item(
    MaybeAuth(viewer): MaybeAuth,
    State(store): State<Store>,
    Path(id): Path<Uuid>,
) -> Result<Json<RenderedThread>, Error> {
    let store = store.read().await;
    let mut ctx = context(viewer);
    Ok(Json(render_thread(&mut &*store, &mut ctx, ItemId(id)).await?))
}

pub async fn vote(
    Auth(account): Auth,
    State(store): State<Store>,
    Path((id, direction)): Path<(Uuid, String)>,
) -> Result<Json<Vote>, Error> {
    let direction =
        VoteDirection::parse(&direction).ok_or_else(|| Error::invalid_direction(direction))?;
    let vote = store
        .write()
        .await
        .save_vote(account.id, ItemId(id), direction, chrono::Utc::now())?;
    Ok(Json(vote))
}

#[derive(Debug, serde::Deserialize)]
pub struct AccountsQuery {
    handle: Option<String>,
}

pub async fn accounts(
    State(store): State<Store>,
    Query(query): Query<AccountsQuery>,
) -> Result<Json<Vec<Tree<RenderedAccount>>>, Error> {
    let store = store.read().await;
    let filter = AccountFilter {
        handle: query.handle,
        ..AccountFilter::all()
    };
    let ctx = context(None);
    Ok(Json(render_accounts(&mut &*store, &ctx, &filter).await?))
}

pub async fn whoami(Auth(account): Auth) -> Json<AccountId> {
    Json(account.id)
}
