#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative match state for Card Defence.
//!
//! A [`Match`] owns every mutable piece of a room: players, towers, enemies,
//! paths, the clock and the seeded random streams. Hosts drive it through
//! [`apply`] or the equivalent methods and forward the produced [`Outbound`]
//! notifications. Time only moves when the host advances it, so a match
//! replays identically for the same seed and command sequence.

mod cards;
mod placement;
mod rooms;
mod scheduler;
mod towers;

use std::{collections::BTreeMap, time::Duration};

use card_defence_core::{
    millis, ActionError, Card, CardId, CardKind, Command, ConfigError, EnemyId, Event, JoinError,
    MapDimensions, MatchConfig, MatchSnapshot, Outbound, Path, PathId, Phase, PlacementError,
    PlayerId, PlayerSnapshot, Point, RoomId, TargetingMode, TowerId,
};
use card_defence_system_movement::{
    self as movement, Departure, Enemy, EnemyTable, Movement, MovementEvent,
};
use card_defence_system_path_generation::{self as path_generation, PathGenerator};
use card_defence_system_tower_combat::{CombatEvent, Tower, TowerCombat};
use card_defence_system_wave_generation::WaveComposer;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use cards::CardDealer;
use scheduler::{PreparationTimer, TickLoop};
use towers::TowerRegistry;

pub use rooms::Rooms;
pub use scheduler::PreparationHandle;

/// Salt separating the card stream from the match seed.
const CARD_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;
/// Salt separating the path stream from the match seed.
const PATH_STREAM: u64 = 0xc2b2_ae3d_27d4_eb4f;

/// Base health lost per enemy reaching the end of its route.
const BASE_DAMAGE_PER_ENEMY: i32 = 1;

/// Reasons a tower placement request failed.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PlaceTowerError {
    /// The request itself was invalid.
    #[error(transparent)]
    Action(#[from] ActionError),
    /// The requested location broke a placement rule.
    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// Participant of a match.
#[derive(Clone, Debug)]
pub struct Player {
    id: PlayerId,
    name: String,
    inventory: Vec<Card>,
    current_cards: Vec<Card>,
    is_ready: bool,
}

impl Player {
    /// Identifier of the player.
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owned cards that were not played yet.
    #[must_use]
    pub fn inventory(&self) -> &[Card] {
        &self.inventory
    }

    /// Cards currently offered for selection.
    #[must_use]
    pub fn current_cards(&self) -> &[Card] {
        &self.current_cards
    }

    /// Whether the player signalled readiness.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.is_ready
    }

    fn inventory_slot(&self, card: CardId) -> Result<usize, ActionError> {
        self.inventory
            .iter()
            .position(|owned| owned.id == card)
            .ok_or(ActionError::CardNotOwned { card })
    }

    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            name: self.name.clone(),
            inventory: self.inventory.clone(),
            current_cards: self.current_cards.clone(),
            is_ready: self.is_ready,
        }
    }
}

/// Server-authoritative state of a single room.
#[derive(Debug)]
pub struct Match {
    room: RoomId,
    config: MatchConfig,
    phase: Phase,
    wave: u32,
    base_health: i32,
    map: MapDimensions,
    players: BTreeMap<PlayerId, Player>,
    towers: TowerRegistry,
    enemies: EnemyTable,
    next_enemy_id: u32,
    paths: Vec<Path>,
    next_path_id: u32,
    clock: Duration,
    accumulator: Duration,
    preparation: PreparationTimer,
    tick_loop: TickLoop,
    rng: ChaCha8Rng,
    dealer: CardDealer,
    composer: WaveComposer,
    path_generator: PathGenerator,
    movement: Movement,
    combat: TowerCombat,
    movement_events: Vec<MovementEvent>,
    combat_events: Vec<CombatEvent>,
    departures: Vec<Departure>,
}

impl Match {
    /// Creates an empty match waiting in the lobby.
    pub fn new(room: RoomId, config: MatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(room, config))
    }

    fn with_valid_config(room: RoomId, config: MatchConfig) -> Self {
        let seed = config.rng_seed;
        let initial = Path::new(PathId::new(0), config.map.initial_path.clone(), 0);
        Self {
            room,
            phase: Phase::Lobby,
            wave: 0,
            base_health: config.base_health,
            map: config.map.dimensions(),
            players: BTreeMap::new(),
            towers: TowerRegistry::default(),
            enemies: EnemyTable::new(),
            next_enemy_id: 0,
            paths: vec![initial],
            next_path_id: 1,
            clock: Duration::ZERO,
            accumulator: Duration::ZERO,
            preparation: PreparationTimer::default(),
            tick_loop: TickLoop::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            dealer: CardDealer::new(seed ^ CARD_STREAM),
            composer: WaveComposer::from_config(&config.waves),
            path_generator: PathGenerator::new(config.paths.clone(), seed ^ PATH_STREAM),
            movement: Movement::new(movement::Config::default()),
            combat: TowerCombat::new(),
            movement_events: Vec::new(),
            combat_events: Vec::new(),
            departures: Vec::new(),
            config,
        }
    }

    /// Advances the match clock by `dt` in fixed simulation steps.
    ///
    /// Any remainder shorter than one step carries over to the next call.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<Outbound>) {
        let step = self.config.tick_interval();
        self.accumulator += dt;
        while self.accumulator >= step {
            self.accumulator -= step;
            self.clock += step;
            if let Some(handle) = self.preparation.take_due(self.clock) {
                self.fire_preparation(handle, out);
            }
            if self.tick_loop.is_running() {
                self.tick(step, out);
            }
        }
    }

    /// Launches the wave when the preparation timer behind `handle` fires.
    ///
    /// Handles that were cancelled or replaced, or that fire outside the
    /// preparation phase, are ignored.
    pub fn fire_preparation(&mut self, handle: PreparationHandle, out: &mut Vec<Outbound>) {
        if !self.preparation.is_current(handle) || self.phase != Phase::Preparation {
            tracing::debug!(
                room = %self.room,
                generation = handle.generation(),
                phase = ?self.phase,
                "ignoring stale preparation timer"
            );
            return;
        }
        let _ = self.preparation.cancel();
        self.launch_wave(out);
    }

    /// Admits a player into the lobby.
    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
        out: &mut Vec<Outbound>,
    ) -> Result<(), JoinError> {
        if self.players.contains_key(&id) {
            return Err(JoinError::DuplicatePlayer { player: id });
        }
        if self.players.len() >= self.config.max_players {
            return Err(JoinError::RoomFull {
                capacity: self.config.max_players,
            });
        }
        if self.phase != Phase::Lobby {
            return Err(JoinError::GameInProgress);
        }

        let player = Player {
            id,
            name: name.into(),
            inventory: self.dealer.starting_inventory(),
            current_cards: Vec::new(),
            is_ready: false,
        };
        tracing::info!(room = %self.room, player = id.get(), name = %player.name, "player joined");
        let _ = self.players.insert(id, player);
        self.deal_to_empty_hands();

        out.push(Outbound::player(
            id,
            Event::RoomJoined {
                room: self.room.clone(),
                player: id,
            },
        ));
        self.broadcast_snapshot(out);
        Ok(())
    }

    /// Removes a player. Returns whether the player was present.
    ///
    /// The ready check runs again so the remaining players are not stalled.
    pub fn remove_player(&mut self, id: PlayerId, out: &mut Vec<Outbound>) -> bool {
        if self.players.remove(&id).is_none() {
            return false;
        }
        tracing::info!(room = %self.room, player = id.get(), "player left");
        out.push(Outbound::room(Event::PlayerLeft { player: id }));
        self.broadcast_snapshot(out);
        let _ = self.check_all_ready(out);
        true
    }

    /// Marks the player ready. Repeated calls have no further effect.
    pub fn set_player_ready(
        &mut self,
        id: PlayerId,
        out: &mut Vec<Outbound>,
    ) -> Result<(), ActionError> {
        self.ensure_not_over()?;
        let player = self.player_mut(id)?;
        if player.is_ready {
            return Ok(());
        }
        player.is_ready = true;
        if !self.check_all_ready(out) {
            self.broadcast_snapshot(out);
        }
        Ok(())
    }

    /// Moves the offered card at `index` into the inventory and marks the
    /// player ready.
    pub fn select_card(
        &mut self,
        id: PlayerId,
        index: usize,
        out: &mut Vec<Outbound>,
    ) -> Result<Card, ActionError> {
        self.ensure_not_over()?;
        let player = self.player_mut(id)?;
        let card = player
            .current_cards
            .get(index)
            .copied()
            .ok_or(ActionError::InvalidCardIndex { index })?;
        player.inventory.push(card);
        player.current_cards.clear();
        player.is_ready = true;
        tracing::debug!(
            player = id.get(),
            card = card.id.get(),
            kind = ?card.kind,
            "card selected"
        );

        if !self.check_all_ready(out) {
            self.broadcast_snapshot(out);
        }
        Ok(card)
    }

    /// Spends a tower card to build a tower at the grid cell containing
    /// `position`.
    pub fn place_tower(
        &mut self,
        id: PlayerId,
        card: CardId,
        position: Point,
        out: &mut Vec<Outbound>,
    ) -> Result<TowerId, PlaceTowerError> {
        self.ensure_not_over()?;
        let player = self.player(id)?;
        let slot = player.inventory_slot(card)?;
        let CardKind::Tower(kind) = player.inventory[slot].kind else {
            return Err(ActionError::NotATowerCard { card }.into());
        };

        let position = placement::validate(
            position,
            &self.config.placement,
            self.map,
            &self.paths,
            self.towers.positions(),
        )?;

        let tower = self.towers.allocate();
        self.towers
            .insert(Tower::new(tower, kind, position, id, self.clock));
        self.spend_card(id, slot);
        tracing::debug!(
            player = id.get(),
            tower = tower.get(),
            ?kind,
            x = position.x,
            y = position.y,
            "tower placed"
        );
        self.broadcast_snapshot(out);
        Ok(tower)
    }

    /// Spends an effect card on an existing tower.
    ///
    /// Returns whether the effect changed the tower; the card is consumed
    /// either way.
    pub fn apply_effect(
        &mut self,
        id: PlayerId,
        card: CardId,
        tower: TowerId,
        out: &mut Vec<Outbound>,
    ) -> Result<bool, ActionError> {
        self.ensure_not_over()?;
        let player = self.player(id)?;
        let slot = player.inventory_slot(card)?;
        let CardKind::Effect(effect) = player.inventory[slot].kind else {
            return Err(ActionError::NotAnEffectCard { card });
        };
        let target = self
            .towers
            .get_mut(tower)
            .ok_or(ActionError::UnknownTower { tower })?;

        let changed = target.apply_effect(effect);
        self.spend_card(id, slot);
        self.broadcast_snapshot(out);
        Ok(changed)
    }

    /// Switches the targeting policy of a tower by mode name.
    pub fn change_targeting_mode(
        &mut self,
        id: PlayerId,
        tower: TowerId,
        mode: &str,
        out: &mut Vec<Outbound>,
    ) -> Result<TargetingMode, ActionError> {
        self.ensure_not_over()?;
        let _ = self.player(id)?;
        let mode: TargetingMode = mode.parse()?;
        let target = self
            .towers
            .get_mut(tower)
            .ok_or(ActionError::UnknownTower { tower })?;
        target.set_targeting(mode);
        tracing::debug!(player = id.get(), tower = tower.get(), %mode, "targeting changed");
        self.broadcast_snapshot(out);
        Ok(mode)
    }

    /// Sends a derived report about a tower to the requesting player only.
    pub fn inspect_tower(
        &self,
        id: PlayerId,
        tower: TowerId,
        out: &mut Vec<Outbound>,
    ) -> Result<(), ActionError> {
        let _ = self.player(id)?;
        let target = self
            .towers
            .get(tower)
            .ok_or(ActionError::UnknownTower { tower })?;
        out.push(Outbound::player(
            id,
            Event::TowerInfo {
                info: Box::new(target.info(self.clock)),
            },
        ));
        Ok(())
    }

    /// Abandons the current wave and prepares `wave` directly, applying every
    /// map expansion crossed on the way.
    pub fn debug_skip_to_wave(
        &mut self,
        wave: u32,
        out: &mut Vec<Outbound>,
    ) -> Result<(), ActionError> {
        self.ensure_not_over()?;
        if wave == 0 {
            return Err(ActionError::InvalidWave { wave });
        }
        let _ = self.tick_loop.stop();
        let _ = self.preparation.cancel();
        self.enemies.clear();
        self.clear_projectiles();
        tracing::warn!(room = %self.room, from = self.wave, to = wave, "skipping to wave");
        self.prepare_wave(wave, out);
        Ok(())
    }

    fn ensure_not_over(&self) -> Result<(), ActionError> {
        if self.phase.is_over() {
            return Err(ActionError::MatchOver);
        }
        Ok(())
    }

    fn player(&self, id: PlayerId) -> Result<&Player, ActionError> {
        self.players
            .get(&id)
            .ok_or(ActionError::UnknownPlayer { player: id })
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, ActionError> {
        self.players
            .get_mut(&id)
            .ok_or(ActionError::UnknownPlayer { player: id })
    }

    fn spend_card(&mut self, id: PlayerId, slot: usize) {
        if let Some(player) = self.players.get_mut(&id) {
            let _ = player.inventory.remove(slot);
        }
    }

    fn deal_to_empty_hands(&mut self) {
        let count = self.config.offer_size;
        for player in self.players.values_mut() {
            if player.current_cards.is_empty() {
                player.current_cards = self.dealer.deal(count);
            }
        }
    }

    fn deal_new_offers(&mut self) {
        let count = self.config.offer_size;
        for player in self.players.values_mut() {
            player.current_cards = self.dealer.deal(count);
            player.is_ready = false;
        }
    }

    fn clear_projectiles(&mut self) {
        for tower in self.towers.table_mut().values_mut() {
            tower.clear_projectiles();
        }
    }

    /// Advances the lobby or the preparation phase once every player is
    /// ready. Returns whether a transition happened.
    fn check_all_ready(&mut self, out: &mut Vec<Outbound>) -> bool {
        if self.players.is_empty() || !self.players.values().all(Player::is_ready) {
            return false;
        }
        match self.phase {
            Phase::Lobby => {
                self.prepare_wave(self.wave + 1, out);
                true
            }
            Phase::Preparation => {
                let _ = self.preparation.cancel();
                self.launch_wave(out);
                true
            }
            Phase::WaveActive | Phase::GameOver => false,
        }
    }

    fn prepare_wave(&mut self, wave: u32, out: &mut Vec<Outbound>) {
        for crossed in self.wave + 1..=wave {
            if self.config.map.expands_on(crossed) {
                self.expand_map(crossed, out);
            }
        }

        self.wave = wave;
        self.phase = Phase::Preparation;
        self.deal_new_offers();
        let handle = self
            .preparation
            .schedule(self.clock + self.config.preparation_time());
        tracing::info!(
            room = %self.room,
            wave,
            generation = handle.generation(),
            "preparation started"
        );

        self.broadcast_snapshot(out);
        out.push(Outbound::room(Event::WaveStarted {
            wave,
            preparation_ms: self.config.preparation_ms,
            roster: self.composer.roster(wave),
        }));
    }

    fn expand_map(&mut self, wave: u32, out: &mut Vec<Outbound>) {
        self.map = path_generation::grow_map(self.map, &self.config.map);
        let id = PathId::new(self.next_path_id);
        self.next_path_id += 1;

        let generated = self.path_generator.generate(
            id,
            wave,
            self.map,
            self.config.base_position(),
            &self.paths,
        );
        let destroyed = path_generation::towers_in_clearance(
            generated.path.points(),
            self.towers.positions(),
            self.path_generator.config().tower_clearance,
        );
        for tower in &destroyed {
            let _ = self.towers.remove(*tower);
        }
        tracing::info!(
            room = %self.room,
            wave,
            path = id.get(),
            origin = ?generated.origin,
            attempts = generated.attempts,
            destroyed = destroyed.len(),
            width = self.map.width,
            height = self.map.height,
            "map expanded"
        );

        out.push(Outbound::room(Event::MapExpanded {
            wave,
            map: self.map,
            path: generated.path.clone(),
            destroyed_towers: destroyed,
        }));
        path_generation::register(&mut self.paths, generated.path);
    }

    fn launch_wave(&mut self, out: &mut Vec<Outbound>) {
        let path_ids: Vec<PathId> = self.paths.iter().map(Path::id).collect();
        let plans = self.composer.compose(self.wave, &path_ids);

        self.enemies.clear();
        let launch = self.clock;
        for plan in &plans {
            let Some(path) = self.paths.iter().find(|path| path.id() == plan.path) else {
                continue;
            };
            let id = EnemyId::new(self.next_enemy_id);
            self.next_enemy_id += 1;
            let enemy = Enemy::from_plan(id, plan, path.movement_points().to_vec(), launch);
            let _ = self.enemies.insert(id, enemy);
        }

        self.phase = Phase::WaveActive;
        self.tick_loop.start();
        tracing::info!(
            room = %self.room,
            wave = self.wave,
            enemies = self.enemies.len(),
            "wave launched"
        );
        out.push(Outbound::room(Event::WaveLaunched {
            wave: self.wave,
            enemies: self.enemies.len(),
        }));
        self.broadcast_snapshot(out);
    }

    fn tick(&mut self, dt: Duration, out: &mut Vec<Outbound>) {
        if self.phase != Phase::WaveActive {
            let _ = self.tick_loop.stop();
            return;
        }
        self.tick_loop.record_tick();
        let now = self.clock;

        self.movement
            .advance(&mut self.enemies, now, dt, &mut self.movement_events);
        let spawned = self
            .movement_events
            .drain(..)
            .any(|event| matches!(event, MovementEvent::Spawned { .. }));

        self.combat.handle(
            self.towers.table_mut(),
            &mut self.enemies,
            now,
            dt,
            &mut self.rng,
            &mut self.combat_events,
        );
        for event in self.combat_events.drain(..) {
            if let CombatEvent::Hit {
                tower,
                enemy,
                damage,
                killed,
            } = event
            {
                tracing::trace!(tower = tower.get(), enemy = enemy.get(), damage, killed, "hit");
            }
        }

        movement::reap(&mut self.enemies, &mut self.departures);
        let mut arrived = 0;
        for departure in self.departures.drain(..) {
            match departure {
                Departure::Killed {
                    enemy,
                    kind,
                    reward,
                    tower,
                } => {
                    if let Some(credited) = tower.and_then(|id| self.towers.get_mut(id)) {
                        credited.record_kill();
                    }
                    out.push(Outbound::room(Event::EnemyKilled {
                        enemy,
                        kind,
                        tower,
                        reward,
                    }));
                }
                Departure::Arrived { .. } => arrived += 1,
            }
        }

        if arrived > 0 {
            let damage = arrived * BASE_DAMAGE_PER_ENEMY;
            self.base_health -= damage;
            out.push(Outbound::room(Event::BaseDamaged {
                damage,
                health: self.base_health,
            }));
        }

        if self.base_health <= 0 {
            self.end_game(false, out);
            return;
        }
        if movement::wave_cleared(&self.enemies) {
            self.end_wave(out);
            return;
        }

        if spawned {
            self.broadcast_snapshot(out);
        }
        out.push(Outbound::room(Event::StateDelta {
            time_ms: millis(now),
            base_health: self.base_health,
            enemies: self
                .enemies
                .values()
                .filter(|enemy| enemy.is_spawned())
                .map(Enemy::snapshot)
                .collect(),
            projectiles: self
                .towers
                .iter()
                .flat_map(Tower::projectiles)
                .map(|projectile| projectile.snapshot())
                .collect(),
        }));
    }

    fn end_wave(&mut self, out: &mut Vec<Outbound>) {
        let _ = self.tick_loop.stop();
        self.enemies.clear();
        self.clear_projectiles();
        tracing::info!(
            room = %self.room,
            wave = self.wave,
            base_health = self.base_health,
            "wave ended"
        );
        out.push(Outbound::room(Event::WaveEnded { wave: self.wave }));

        if self
            .config
            .victory_wave
            .is_some_and(|victory| self.wave >= victory)
        {
            self.end_game(true, out);
            return;
        }

        self.phase = Phase::Lobby;
        self.deal_new_offers();
        self.broadcast_snapshot(out);
    }

    fn end_game(&mut self, victory: bool, out: &mut Vec<Outbound>) {
        let _ = self.tick_loop.stop();
        let _ = self.preparation.cancel();
        self.phase = Phase::GameOver;
        tracing::info!(room = %self.room, wave = self.wave, victory, "game over");
        out.push(Outbound::room(Event::GameOver {
            wave: self.wave,
            victory,
        }));
        self.broadcast_snapshot(out);
    }

    fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            room: self.room.clone(),
            phase: self.phase,
            wave: self.wave,
            base_health: self.base_health,
            map: self.map,
            players: self.players.values().map(Player::snapshot).collect(),
            towers: self.towers.iter().map(Tower::snapshot).collect(),
            enemies: self.enemies.values().map(Enemy::snapshot).collect(),
            paths: self.paths.clone(),
        }
    }

    fn broadcast_snapshot(&self, out: &mut Vec<Outbound>) {
        out.push(Outbound::room(Event::StateSnapshot {
            snapshot: Box::new(self.snapshot()),
        }));
    }
}

/// Applies the provided command to the match, mutating state deterministically.
///
/// Refused actions are reported to the acting player and leave the match
/// untouched.
pub fn apply(game: &mut Match, command: Command, out: &mut Vec<Outbound>) {
    match command {
        Command::Tick { dt } => game.advance(dt, out),
        Command::SelectCard { player, index } => {
            let result = game.select_card(player, index, out);
            report(player, result, out);
        }
        Command::PlaceTower {
            player,
            card,
            position,
        } => match game.place_tower(player, card, position, out) {
            Ok(_) => {}
            Err(PlaceTowerError::Placement(error)) => {
                tracing::debug!(player = player.get(), %error, "placement rejected");
                out.push(Outbound::player(player, Event::PlacementRejected { error }));
            }
            Err(PlaceTowerError::Action(error)) => report::<()>(player, Err(error), out),
        },
        Command::ApplyEffect {
            player,
            card,
            tower,
        } => {
            let result = game.apply_effect(player, card, tower, out);
            report(player, result, out);
        }
        Command::SetReady { player } => {
            let result = game.set_player_ready(player, out);
            report(player, result, out);
        }
        Command::InspectTower { player, tower } => {
            let result = game.inspect_tower(player, tower, out);
            report(player, result, out);
        }
        Command::ChangeTargetingMode {
            player,
            tower,
            mode,
        } => {
            let result = game.change_targeting_mode(player, tower, &mode, out);
            report(player, result, out);
        }
        Command::DebugSkipToWave { wave } => {
            if let Err(error) = game.debug_skip_to_wave(wave, out) {
                tracing::debug!(wave, %error, "wave skip rejected");
            }
        }
    }
}

fn report<T>(player: PlayerId, result: Result<T, ActionError>, out: &mut Vec<Outbound>) {
    if let Err(error) = result {
        tracing::debug!(player = player.get(), %error, "action rejected");
        out.push(Outbound::player(player, Event::ActionRejected { error }));
    }
}

/// Read-only queries over match state.
pub mod query {
    use std::time::Duration;

    use card_defence_core::{
        MapDimensions, MatchConfig, MatchSnapshot, Path, Phase, PlayerId, RoomId, TowerId,
    };
    use card_defence_system_movement::Enemy;
    use card_defence_system_tower_combat::Tower;

    use super::{Match, Player, PreparationHandle};

    /// Room hosting the match.
    #[must_use]
    pub fn room(game: &Match) -> &RoomId {
        &game.room
    }

    /// Configuration the match runs with.
    #[must_use]
    pub fn config(game: &Match) -> &MatchConfig {
        &game.config
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(game: &Match) -> Phase {
        game.phase
    }

    /// Current wave number; zero before the first wave.
    #[must_use]
    pub fn wave(game: &Match) -> u32 {
        game.wave
    }

    /// Remaining base health.
    #[must_use]
    pub fn base_health(game: &Match) -> i32 {
        game.base_health
    }

    /// Current map extent.
    #[must_use]
    pub fn map(game: &Match) -> MapDimensions {
        game.map
    }

    /// Active paths in creation order.
    #[must_use]
    pub fn paths(game: &Match) -> &[Path] {
        &game.paths
    }

    /// Players in identifier order.
    pub fn players(game: &Match) -> impl Iterator<Item = &Player> {
        game.players.values()
    }

    /// Looks up a single player.
    #[must_use]
    pub fn player(game: &Match, id: PlayerId) -> Option<&Player> {
        game.players.get(&id)
    }

    /// Towers in identifier order.
    pub fn towers(game: &Match) -> impl Iterator<Item = &Tower> {
        game.towers.iter()
    }

    /// Looks up a single tower.
    #[must_use]
    pub fn tower(game: &Match, id: TowerId) -> Option<&Tower> {
        game.towers.get(id)
    }

    /// Enemies of the running wave in identifier order.
    pub fn enemies(game: &Match) -> impl Iterator<Item = &Enemy> {
        game.enemies.values()
    }

    /// Match time.
    #[must_use]
    pub fn clock(game: &Match) -> Duration {
        game.clock
    }

    /// Whether the simulation loop is running.
    #[must_use]
    pub fn is_loop_running(game: &Match) -> bool {
        game.tick_loop.is_running()
    }

    /// Simulation steps executed since the current wave launched.
    #[must_use]
    pub fn ticks(game: &Match) -> u64 {
        game.tick_loop.ticks()
    }

    /// Handle of the pending preparation timer.
    #[must_use]
    pub fn preparation_handle(game: &Match) -> Option<PreparationHandle> {
        game.preparation.pending()
    }

    /// Match time at which the pending preparation timer fires.
    #[must_use]
    pub fn preparation_deadline(game: &Match) -> Option<Duration> {
        game.preparation.deadline()
    }

    /// Complete state of the match.
    #[must_use]
    pub fn snapshot(game: &Match) -> MatchSnapshot {
        game.snapshot()
    }
}
