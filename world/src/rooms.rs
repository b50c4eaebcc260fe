//! Registry of independent rooms, each hosting one match.

use std::{collections::BTreeMap, time::Duration};

use card_defence_core::{ConfigError, JoinError, MatchConfig, Outbound, PlayerId, RoomId};

use crate::Match;

/// Rooms keyed by name, created on first join and dropped when empty.
#[derive(Debug)]
pub struct Rooms {
    config: MatchConfig,
    rooms: BTreeMap<RoomId, Match>,
    members: BTreeMap<PlayerId, RoomId>,
    created: u64,
    scratch: Vec<Outbound>,
}

impl Rooms {
    /// Creates an empty registry whose matches share `config`.
    ///
    /// Each room derives its own seed from the configured one so rooms never
    /// share random streams.
    pub fn new(config: MatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rooms: BTreeMap::new(),
            members: BTreeMap::new(),
            created: 0,
            scratch: Vec::new(),
        })
    }

    /// Adds `player` to `room`, creating the room when it does not exist.
    ///
    /// A player may only be in one room at a time.
    pub fn join(
        &mut self,
        room: RoomId,
        player: PlayerId,
        name: impl Into<String>,
        out: &mut Vec<Outbound>,
    ) -> Result<(), JoinError> {
        if self.members.contains_key(&player) {
            return Err(JoinError::DuplicatePlayer { player });
        }

        if !self.rooms.contains_key(&room) {
            let mut config = self.config.clone();
            config.rng_seed = config.rng_seed.wrapping_add(self.created);
            self.created += 1;
            let game = Match::with_valid_config(room.clone(), config);
            tracing::info!(room = %room, "room created");
            let _ = self.rooms.insert(room.clone(), game);
        }

        let Some(game) = self.rooms.get_mut(&room) else {
            return Err(JoinError::GameInProgress);
        };
        match game.add_player(player, name, out) {
            Ok(()) => {
                let _ = self.members.insert(player, room);
                Ok(())
            }
            Err(error) => {
                if game.players.is_empty() {
                    let _ = self.rooms.remove(&room);
                }
                tracing::debug!(room = %room, player = player.get(), %error, "join rejected");
                Err(error)
            }
        }
    }

    /// Removes `player` from their room, dropping the room once it is empty.
    ///
    /// Returns the room the player left, if any.
    pub fn leave(&mut self, player: PlayerId, out: &mut Vec<Outbound>) -> Option<RoomId> {
        let room = self.members.remove(&player)?;
        if let Some(game) = self.rooms.get_mut(&room) {
            let _ = game.remove_player(player, out);
            if game.players.is_empty() {
                let _ = self.rooms.remove(&room);
                tracing::info!(room = %room, "room closed");
            }
        }
        Some(room)
    }

    /// Looks up a room.
    #[must_use]
    pub fn get(&self, room: &RoomId) -> Option<&Match> {
        self.rooms.get(room)
    }

    /// Runs `action` against the match hosted in `room`.
    ///
    /// Players the action removes from the match also leave the registry, and
    /// the room closes once it is empty. Joining still goes through
    /// [`Rooms::join`].
    pub fn with_room<R>(
        &mut self,
        room: &RoomId,
        action: impl FnOnce(&mut Match) -> R,
    ) -> Option<R> {
        let game = self.rooms.get_mut(room)?;
        let result = action(game);
        self.members
            .retain(|player, joined| joined != room || game.players.contains_key(player));
        if game.players.is_empty() {
            let _ = self.rooms.remove(room);
            tracing::info!(room = %room, "room closed");
        }
        Some(result)
    }

    /// Room the player is currently in.
    #[must_use]
    pub fn room_of(&self, player: PlayerId) -> Option<&RoomId> {
        self.members.get(&player)
    }

    /// Advances every room by `dt`, tagging each notification with its room.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<(RoomId, Outbound)>) {
        for (room, game) in &mut self.rooms {
            game.advance(dt, &mut self.scratch);
            out.extend(self.scratch.drain(..).map(|outbound| (room.clone(), outbound)));
        }
    }

    /// Number of open rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Reports whether no room is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
