//! Player roster and the lobby end of the phase machine.

use crate::error::CommandError;
use crate::utils::validate_name;
use log::info;
use shared::{Element, Phase, PlayerId, PlayerState, MAX_PLAYERS};
use std::collections::BTreeMap;

pub struct GameRoom {
    players: BTreeMap<PlayerId, PlayerState>,
    max_players: usize,
}

impl Default for GameRoom {
    fn default() -> Self {
        Self::new(MAX_PLAYERS)
    }
}

impl GameRoom {
    pub fn new(max_players: usize) -> Self {
        Self {
            players: BTreeMap::new(),
            max_players,
        }
    }

    /// Seats a player. Joining is only possible before the match starts.
    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: &str,
        phase: Phase,
    ) -> Result<&PlayerState, CommandError> {
        ensure_pre_game("join", phase)?;
        if self.players.contains_key(&id) {
            return Err(CommandError::AlreadyJoined(id));
        }
        if self.players.len() >= self.max_players {
            return Err(CommandError::RoomFull(self.max_players));
        }
        let name = validate_name(name)?;

        info!("Player {} joined as {}", id, name);
        Ok(self
            .players
            .entry(id)
            .or_insert_with(|| PlayerState::new(id, name)))
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Option<PlayerState> {
        let player = self.players.remove(&id)?;
        info!("Player {} ({}) left", id, player.name);
        Some(player)
    }

    pub fn select_class(
        &mut self,
        id: PlayerId,
        element: Element,
        phase: Phase,
    ) -> Result<(), CommandError> {
        ensure_pre_game("select a class", phase)?;
        let player = self
            .players
            .get_mut(&id)
            .ok_or(CommandError::PlayerNotFound(id))?;
        player.element_class = Some(element);
        Ok(())
    }

    /// Marks the player ready and returns the phase the match should be in:
    /// the first ready moves the lobby to class selection.
    pub fn ready_up(&mut self, id: PlayerId, phase: Phase) -> Result<Phase, CommandError> {
        ensure_pre_game("ready up", phase)?;
        let player = self
            .players
            .get_mut(&id)
            .ok_or(CommandError::PlayerNotFound(id))?;
        player.ready = true;

        Ok(match phase {
            Phase::Lobby => Phase::ClassSelect,
            other => other,
        })
    }

    /// True when at least one player is seated and every player is ready.
    pub fn all_ready(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|p| p.ready)
    }

    pub fn all_classed(&self) -> bool {
        self.players.values().all(|p| p.element_class.is_some())
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.get(&id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    /// Players in id order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.values()
    }
}

fn ensure_pre_game(action: &'static str, phase: Phase) -> Result<(), CommandError> {
    match phase {
        Phase::Lobby | Phase::ClassSelect => Ok(()),
        _ => Err(CommandError::WrongPhase { action, phase }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_player() {
        let mut room = GameRoom::default();
        let player = room.add_player(1, "  Ada ", Phase::Lobby).unwrap();
        assert_eq!(player.name, "Ada");
        assert!(player.connected);
        assert!(!player.ready);
        assert!(player.element_class.is_none());
        assert_eq!(room.player_count(), 1);
    }

    #[test]
    fn test_add_player_rejections() {
        let mut room = GameRoom::new(2);
        room.add_player(1, "Ada", Phase::Lobby).unwrap();

        assert_eq!(
            room.add_player(1, "Ada again", Phase::Lobby).unwrap_err(),
            CommandError::AlreadyJoined(1)
        );
        assert!(matches!(
            room.add_player(2, "   ", Phase::Lobby),
            Err(CommandError::InvalidName(_))
        ));
        room.add_player(2, "Bob", Phase::ClassSelect).unwrap();
        assert_eq!(
            room.add_player(3, "Cy", Phase::Lobby).unwrap_err(),
            CommandError::RoomFull(2)
        );
        assert_eq!(room.player_count(), 2);
    }

    #[test]
    fn test_join_rejected_after_match_start() {
        let mut room = GameRoom::default();
        let err = room.add_player(1, "Late", Phase::Prep).unwrap_err();
        assert_eq!(
            err,
            CommandError::WrongPhase {
                action: "join",
                phase: Phase::Prep
            }
        );
        assert_eq!(err.to_string(), "cannot join during the prep phase");
    }

    #[test]
    fn test_first_ready_moves_to_class_select() {
        let mut room = GameRoom::default();
        room.add_player(1, "Ada", Phase::Lobby).unwrap();
        room.add_player(2, "Bob", Phase::Lobby).unwrap();

        assert_eq!(room.ready_up(1, Phase::Lobby).unwrap(), Phase::ClassSelect);
        assert!(!room.all_ready());
        assert_eq!(
            room.ready_up(2, Phase::ClassSelect).unwrap(),
            Phase::ClassSelect
        );
        assert!(room.all_ready());
        assert_eq!(
            room.ready_up(9, Phase::ClassSelect),
            Err(CommandError::PlayerNotFound(9))
        );
    }

    #[test]
    fn test_select_class() {
        let mut room = GameRoom::default();
        room.add_player(1, "Ada", Phase::Lobby).unwrap();
        assert!(!room.all_classed());

        room.select_class(1, Element::Fire, Phase::Lobby).unwrap();
        assert_eq!(room.get(1).unwrap().element_class, Some(Element::Fire));
        assert!(room.all_classed());

        assert!(room.select_class(1, Element::Ice, Phase::Combat).is_err());
        assert_eq!(room.get(1).unwrap().element_class, Some(Element::Fire));
    }

    #[test]
    fn test_remove_player() {
        let mut room = GameRoom::default();
        room.add_player(1, "Ada", Phase::Lobby).unwrap();
        assert_eq!(room.remove_player(1).unwrap().name, "Ada");
        assert!(room.remove_player(1).is_none());
        assert!(!room.all_ready());
    }
}
