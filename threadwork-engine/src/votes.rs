use crate::api::{Account, Error, ItemId, Vote};

/// The authenticated account a response is being rendered for, along with
/// the votes it cast on the items loaded so far in this request
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Viewer {
    pub account: Account,
    pub votes: Vec<Vote>,
}

impl Viewer {
    pub fn new(account: Account) -> Viewer {
        Viewer {
            account,
            votes: Vec::new(),
        }
    }

    /// First vote of this viewer on `item`, if any
    pub fn voted_on(&self, item: &ItemId) -> Option<&Vote> {
        self.votes.iter().find(|v| v.item_id == *item)
    }
}

/// Merges freshly loaded vote records into the viewer's votes.
///
/// A record whose id is already known updates the existing vote's weight and
/// update time in place, any other record is appended. Merging the same
/// records again is a no-op.
pub fn merge_votes<'a>(
    viewer: Option<&'a mut Viewer>,
    targets: &[ItemId],
    incoming: impl IntoIterator<Item = Vote>,
) -> Result<&'a [Vote], Error> {
    let viewer = viewer
        .filter(|v| v.account.is_logged())
        .ok_or(Error::NoAccount)?;
    if targets.is_empty() {
        return Err(Error::NoTargets);
    }
    for mut record in incoming {
        match viewer.votes.iter_mut().find(|v| v.id == record.id) {
            Some(existing) => {
                existing.weight = record.weight;
                existing.updated_at = record.updated_at;
            }
            None => {
                record.submitted_by = viewer.account.id;
                viewer.votes.push(record);
            }
        }
    }
    Ok(&viewer.votes)
}
