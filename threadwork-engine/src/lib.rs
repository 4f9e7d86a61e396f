mod error;
pub use error::Error;

mod forest;
pub use forest::{Forest, Node, NodeIdx, Tree};

mod format;
pub use format::{format_score, humanize};

mod render;
pub use render::{
    load_votes, render_accounts, render_index, render_thread, RenderContext, RenderedAccount,
    RenderedItem, RenderedThread,
};

mod tags;
pub use tags::{rewrite_item_tags, rewrite_tags, MIME_HTML, MIME_MARKDOWN};

mod votes;
pub use votes::{merge_votes, Viewer};

pub mod api {
    pub use threadwork_api::*;
}

#[cfg(test)]
mod test_util;
