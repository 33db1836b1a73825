use enum_map::{EnumMap, enum_map};
use strum::IntoEnumIterator;

use crate::role::{Force, Participant};
use crate::server::ClientId;


// Binds player roles to connections. Each role is held by at most one client and each client
// holds at most one role. Roles are handed out first come, first served, and a role only becomes
// free again when its holder leaves.
#[derive(Clone, Debug)]
pub struct ConnectionRegistry {
    holders: EnumMap<Force, Option<ClientId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self { ConnectionRegistry { holders: enum_map! { _ => None } } }

    // Gives the client the first free role, in `Force` order. Clients arriving when all roles
    // are taken become observers. Observers are not tracked.
    pub fn assign_role(&mut self, client_id: ClientId) -> Participant {
        if let Participant::Player(force) = self.role_of(client_id) {
            return Participant::Player(force);
        }
        for force in Force::iter() {
            if self.holders[force].is_none() {
                self.holders[force] = Some(client_id);
                return Participant::Player(force);
            }
        }
        Participant::Observer
    }

    // Frees the role held by the client, if any. Waiting observers are not promoted: the role
    // goes to the next client that connects.
    pub fn release_role(&mut self, client_id: ClientId) -> Option<Force> {
        let force = self.role_of(client_id).as_player()?;
        self.holders[force] = None;
        Some(force)
    }

    pub fn role_of(&self, client_id: ClientId) -> Participant {
        self.holders
            .iter()
            .find(|(_, holder)| **holder == Some(client_id))
            .map_or(Participant::Observer, |(force, _)| Participant::Player(force))
    }

    pub fn holder(&self, force: Force) -> Option<ClientId> { self.holders[force] }
    pub fn num_players(&self) -> usize { self.holders.values().flatten().count() }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn first_come_first_served() {
        let mut registry = ConnectionRegistry::new();
        let (a, b, c) = (ClientId(1), ClientId(2), ClientId(3));
        assert_eq!(registry.assign_role(a), Participant::Player(Force::White));
        assert_eq!(registry.assign_role(b), Participant::Player(Force::Black));
        assert_eq!(registry.assign_role(c), Participant::Observer);
        assert_eq!(registry.role_of(a), Participant::Player(Force::White));
        assert_eq!(registry.role_of(c), Participant::Observer);
        assert_eq!(registry.num_players(), 2);
    }

    #[test]
    fn reassigning_keeps_existing_role() {
        let mut registry = ConnectionRegistry::new();
        let (a, b) = (ClientId(1), ClientId(2));
        registry.assign_role(a);
        assert_eq!(registry.assign_role(a), Participant::Player(Force::White));
        assert_eq!(registry.holder(Force::Black), None);
        assert_eq!(registry.assign_role(b), Participant::Player(Force::Black));
    }

    #[test]
    fn release_frees_role_for_next_client() {
        let mut registry = ConnectionRegistry::new();
        let (a, b, c, d) = (ClientId(1), ClientId(2), ClientId(3), ClientId(4));
        registry.assign_role(a);
        registry.assign_role(b);
        registry.assign_role(c);
        assert_eq!(registry.release_role(a), Some(Force::White));
        // The observer is not promoted.
        assert_eq!(registry.role_of(c), Participant::Observer);
        assert_eq!(registry.holder(Force::White), None);
        assert_eq!(registry.assign_role(d), Participant::Player(Force::White));
        assert_eq!(registry.holder(Force::Black), Some(b));
    }

    #[test]
    fn release_is_idempotent() {
        let mut registry = ConnectionRegistry::new();
        let (a, c) = (ClientId(1), ClientId(3));
        registry.assign_role(a);
        assert_eq!(registry.release_role(c), None);
        assert_eq!(registry.release_role(a), Some(Force::White));
        assert_eq!(registry.release_role(a), None);
        assert_eq!(registry.num_players(), 0);
    }
}
