use std::collections::HashSet;

use crate::api::{Item, ItemMetadata, Tag, TagKind};

pub const MIME_MARKDOWN: &str = "text/markdown";
pub const MIME_HTML: &str = "text/html";

fn markup(mime_type: &str, tag: &Tag) -> Option<String> {
    let (name, url) = (tag.bare_name(), &tag.url);
    Some(match (mime_type, tag.kind()?) {
        (MIME_MARKDOWN, TagKind::Hashtag) => format!("[&#35;{name}]({url})"),
        (MIME_MARKDOWN, TagKind::Mention) => format!("[&#126;{name}]({url})"),
        (MIME_HTML, TagKind::Hashtag) => format!("<a href='{url}'>&#35;{name}</a>"),
        (MIME_HTML, TagKind::Mention) => format!("<a href='{url}'>&#126;{name}</a>"),
        _ => return None,
    })
}

/// Turns the first occurrence of every tag and mention name in `data` into a
/// link, in the markup language of `mime_type`.
///
/// Occurrences are looked up in `data` as given, never in inserted links, and
/// each distinct name is rewritten once. A name whose only occurrences overlap
/// an earlier tag's occurrence is left alone.
pub fn rewrite_tags(mime_type: &str, data: &str, metadata: &ItemMetadata) -> String {
    let mut seen = HashSet::new();
    let mut spans: Vec<(usize, usize, String)> = Vec::new();
    for tag in metadata.tags.iter().chain(metadata.mentions.iter()) {
        if tag.name.is_empty() || !seen.insert(tag.name.as_str()) {
            continue;
        }
        let link = match markup(mime_type, tag) {
            Some(link) => link,
            None => continue,
        };
        let free = data
            .match_indices(tag.name.as_str())
            .map(|(start, name)| (start, start + name.len()))
            .find(|&(start, end)| spans.iter().all(|s| end <= s.0 || start >= s.1));
        if let Some((start, end)) = free {
            spans.push((start, end, link));
        }
    }
    spans.sort_by_key(|s| s.0);

    let mut res = String::with_capacity(data.len());
    let mut last = 0;
    for (start, end, link) in spans {
        res.push_str(&data[last..start]);
        res.push_str(&link);
        last = end;
    }
    res.push_str(&data[last..]);
    res
}

pub fn rewrite_item_tags(item: &mut Item) {
    item.data = rewrite_tags(&item.mime_type, &item.data, &item.metadata);
}
