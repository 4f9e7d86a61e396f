use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use threadwork_store::MemStore;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

mod error;
mod extractors;
mod fuzz;
mod handlers;

use error::Error;
use extractors::AppState;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Address to listen on
    #[structopt(long, env = "THREADWORK_LISTEN", default_value = "127.0.0.1:3000")]
    listen: SocketAddr,

    /// JSON dump to load the store from, as written by generate-test-data
    #[structopt(long, env = "THREADWORK_DATA", parse(from_os_str))]
    data: Option<PathBuf>,
}

pub fn app(store: MemStore) -> Router {
    let state = AppState {
        store: Arc::new(RwLock::new(store)),
    };
    Router::new()
        .route("/api/index", get(handlers::index))
        .route("/api/items/:id", get(handlers::show_item))
        .route("/api/items/:id/:direction", post(handlers::vote))
        .route("/api/accounts", get(handlers::accounts))
        .route("/api/whoami", get(handlers::whoami))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let store = match &opt.data {
        Some(path) => MemStore::load(path)?,
        None => {
            tracing::warn!("no data file given, starting with an empty store");
            MemStore::new()
        }
    };

    let app = app(store).layer(TraceLayer::new_for_http());

    tracing::info!("listening on {}", opt.listen);
    axum::Server::bind(&opt.listen)
        .serve(app.into_make_service())
        .await
        .context("serving axum webserver")
}
