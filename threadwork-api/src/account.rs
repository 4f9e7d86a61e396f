use uuid::Uuid;

use crate::{Time, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct AccountId(pub Uuid);

impl AccountId {
    pub fn stub() -> AccountId {
        AccountId(STUB_UUID)
    }

    pub fn anonymous() -> AccountId {
        AccountId(Uuid::nil())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Account {
    pub id: AccountId,
    pub handle: String,

    /// Account that invited this one, if any
    pub created_by: Option<AccountId>,

    pub created_at: Time,
    pub updated_at: Time,
    pub score: i64,
    pub deleted: bool,
    pub private: bool,
}

impl Account {
    pub fn anonymous() -> Account {
        Account {
            id: AccountId::anonymous(),
            handle: String::from("anonymous"),
            created_by: None,
            created_at: Time::from(std::time::UNIX_EPOCH),
            updated_at: Time::from(std::time::UNIX_EPOCH),
            score: 0,
            deleted: false,
            private: false,
        }
    }

    pub fn is_logged(&self) -> bool {
        self.id != AccountId::anonymous() && !self.handle.is_empty()
    }

    pub fn link(&self) -> String {
        format!("/~{}", self.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_is_not_logged() {
        assert!(!Account::anonymous().is_logged());
        let mut acc = Account::anonymous();
        acc.id = AccountId(Uuid::new_v4());
        assert!(acc.is_logged());
        acc.handle = String::new();
        assert!(!acc.is_logged());
    }
}
