#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Tag {
    /// Literal marker as it appears in the item text, eg. `#rust` or `~marius`
    pub name: String,
    pub url: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TagKind {
    Hashtag,
    Mention,
}

impl Tag {
    pub fn kind(&self) -> Option<TagKind> {
        match self.name.chars().next() {
            Some('#') => Some(TagKind::Hashtag),
            Some('@') | Some('~') => Some(TagKind::Mention),
            _ => None,
        }
    }

    /// The name without its leading marker character
    pub fn bare_name(&self) -> &str {
        let mut chars = self.name.chars();
        chars.next();
        chars.as_str()
    }
}
