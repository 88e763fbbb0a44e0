use crate::models::lobby::{Lobby, LobbyRole};
use crate::models::types::AccountId;
use serde::Serialize;

/// What an actor may do with one owner's inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Access {
    pub can_view: bool,
    pub can_edit: bool,
    pub is_master: bool,
}

/// Lobby facts needed to evaluate access, loaded by the caller.
#[derive(Debug, Clone)]
pub struct LobbyContext {
    pub lobby: Lobby,
    pub actor_role: Option<LobbyRole>,
    pub owner_role: Option<LobbyRole>,
}

impl LobbyContext {
    pub fn actor_is_master(&self, actor: AccountId) -> bool {
        self.lobby.admin_id == actor || self.actor_role == Some(LobbyRole::Master)
    }

    pub fn owner_is_member(&self, owner: AccountId) -> bool {
        self.owner_role.is_some() || self.lobby.admin_id == owner
    }
}

pub fn evaluate(actor: AccountId, owner: AccountId, lobby: Option<&LobbyContext>) -> Access {
    let is_master = lobby.is_some_and(|ctx| ctx.actor_is_master(actor));
    let is_spectator = !is_master && lobby.is_some_and(|ctx| ctx.actor_role == Some(LobbyRole::Spectator));

    if actor == owner {
        return Access {
            can_view: true,
            can_edit: !is_spectator,
            is_master,
        };
    }

    let owner_is_member = lobby.is_some_and(|ctx| ctx.owner_is_member(owner));
    if !owner_is_member {
        return Access {
            is_master,
            ..Access::default()
        };
    }

    Access {
        can_view: is_master || is_spectator,
        can_edit: is_master,
        is_master,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::LobbyId;

    fn ctx(admin: AccountId, actor_role: Option<LobbyRole>, owner_role: Option<LobbyRole>) -> LobbyContext {
        LobbyContext {
            lobby: Lobby {
                id: LobbyId::new(),
                name: "Crypt".into(),
                admin_id: admin,
            },
            actor_role,
            owner_role,
        }
    }

    #[test]
    fn owners_edit_their_own_inventory() {
        let me = AccountId::new();
        let access = evaluate(me, me, None);
        assert!(access.can_view && access.can_edit && !access.is_master);
    }

    #[test]
    fn spectators_never_edit() {
        let me = AccountId::new();
        let other = AccountId::new();
        let lobby = ctx(AccountId::new(), Some(LobbyRole::Spectator), Some(LobbyRole::Player));

        let own = evaluate(me, me, Some(&lobby));
        assert!(own.can_view && !own.can_edit);

        let theirs = evaluate(me, other, Some(&lobby));
        assert!(theirs.can_view && !theirs.can_edit);
    }

    #[test]
    fn masters_edit_members() {
        let admin = AccountId::new();
        let player = AccountId::new();

        let lobby = ctx(admin, Some(LobbyRole::Master), Some(LobbyRole::Player));
        let access = evaluate(admin, player, Some(&lobby));
        assert_eq!(
            access,
            Access {
                can_view: true,
                can_edit: true,
                is_master: true
            }
        );

        // Promoted member, not the admin
        let lobby = ctx(AccountId::new(), Some(LobbyRole::Master), Some(LobbyRole::Player));
        assert!(evaluate(AccountId::new(), player, Some(&lobby)).can_edit);
    }

    #[test]
    fn strangers_see_nothing() {
        let lobby = ctx(AccountId::new(), Some(LobbyRole::Player), Some(LobbyRole::Player));
        assert_eq!(evaluate(AccountId::new(), AccountId::new(), Some(&lobby)), Access::default());
        assert_eq!(evaluate(AccountId::new(), AccountId::new(), None), Access::default());

        // Master of the lobby, but the owner is not in it
        let lobby = ctx(AccountId::new(), Some(LobbyRole::Master), None);
        let access = evaluate(AccountId::new(), AccountId::new(), Some(&lobby));
        assert!(!access.can_view && !access.can_edit);
    }
}
