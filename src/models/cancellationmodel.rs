use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::usermodel::UserRole;

/// Reserved for no-show cancellations; never offered to users directly.
pub const NO_SHOW_REASON_CODE: &str = "no_show";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "cancellation_party", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CancellationParty {
    Worker,
    Business,
    Both,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CancellationReason {
    pub id: Uuid,
    pub code: String,
    pub label: String,
    pub applies_to: CancellationParty,
    pub is_active: bool,
}

impl CancellationReason {
    pub fn is_system_reason(&self) -> bool {
        self.code == NO_SHOW_REASON_CODE
    }

    pub fn applies_to_role(&self, role: UserRole) -> bool {
        if !self.is_active || self.is_system_reason() {
            return false;
        }
        match (self.applies_to, role) {
            (CancellationParty::Both, _) => true,
            (_, UserRole::Admin) => true,
            (CancellationParty::Worker, UserRole::Worker) => true,
            (CancellationParty::Business, UserRole::Business) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(applies_to: CancellationParty, is_active: bool) -> CancellationReason {
        CancellationReason {
            id: Uuid::new_v4(),
            code: "x".into(),
            label: "X".into(),
            applies_to,
            is_active,
        }
    }

    #[test]
    fn reasons_are_scoped_by_role() {
        assert!(reason(CancellationParty::Worker, true).applies_to_role(UserRole::Worker));
        assert!(!reason(CancellationParty::Worker, true).applies_to_role(UserRole::Business));
        assert!(reason(CancellationParty::Both, true).applies_to_role(UserRole::Business));
        assert!(reason(CancellationParty::Business, true).applies_to_role(UserRole::Admin));
    }

    #[test]
    fn no_show_is_not_user_selectable() {
        let mut no_show = reason(CancellationParty::Business, true);
        no_show.code = NO_SHOW_REASON_CODE.into();

        assert!(no_show.is_system_reason());
        assert!(!no_show.applies_to_role(UserRole::Business));
        assert!(!no_show.applies_to_role(UserRole::Admin));
    }

    #[test]
    fn inactive_reasons_never_apply() {
        assert!(!reason(CancellationParty::Both, false).applies_to_role(UserRole::Worker));
    }
}
