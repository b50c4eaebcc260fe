use std::time::Duration;

use card_defence_core::{
    ActionError, Audience, CardId, CardKind, Command, EnemyKind, Event, JoinError, MatchConfig,
    Outbound, Phase, PlacementError, PlayerId, Point, RoomId, TowerId, TowerType,
};
use card_defence_world::{apply, query, Match, PlaceTowerError};

const ADA: PlayerId = PlayerId::new(1);
const BO: PlayerId = PlayerId::new(2);

fn new_match(config: MatchConfig) -> Match {
    Match::new(RoomId::new("test"), config).expect("valid configuration")
}

fn run(game: &mut Match, duration: Duration, out: &mut Vec<Outbound>) {
    let step = Duration::from_millis(100);
    let mut elapsed = Duration::ZERO;
    while elapsed < duration {
        game.advance(step, out);
        elapsed += step;
    }
}

fn events(out: &[Outbound]) -> impl Iterator<Item = &Event> {
    out.iter().map(|outbound| &outbound.event)
}

fn tower_card(game: &Match, player: PlayerId, kind: TowerType) -> CardId {
    query::player(game, player)
        .and_then(|player| {
            player
                .inventory()
                .iter()
                .find(|card| card.kind == CardKind::Tower(kind))
        })
        .map(|card| card.id)
        .expect("starting inventory holds every tower")
}

/// Places every starting tower card on the first accepted cell, scanning the
/// map row by row.
fn build_everything(game: &mut Match, player: PlayerId, out: &mut Vec<Outbound>) -> Vec<TowerId> {
    let sites: Vec<Point> = (0..15)
        .flat_map(|row| {
            (0..20).map(move |col| Point::new(20.0 + 40.0 * col as f32, 20.0 + 40.0 * row as f32))
        })
        .collect();
    TowerType::ALL
        .into_iter()
        .map(|kind| {
            let card = tower_card(game, player, kind);
            sites
                .iter()
                .find_map(|site| game.place_tower(player, card, *site, out).ok())
                .expect("a free site for every tower")
        })
        .collect()
}

/// Joins a single player and launches the first wave without waiting.
fn launched_single_player(config: MatchConfig) -> (Match, Vec<Outbound>) {
    let mut game = new_match(config);
    let mut out = Vec::new();
    game.add_player(ADA, "ada", &mut out).expect("join");
    game.set_player_ready(ADA, &mut out).expect("ready");
    game.set_player_ready(ADA, &mut out).expect("ready");
    (game, out)
}

#[test]
fn first_wave_schedules_seven_goblins() {
    let mut game = new_match(MatchConfig::default());
    let mut out = Vec::new();
    game.add_player(ADA, "ada", &mut out).expect("join");
    game.set_player_ready(ADA, &mut out).expect("ready");

    assert_eq!(query::phase(&game), Phase::Preparation);
    assert_eq!(query::wave(&game), 1);
    assert_eq!(
        query::preparation_deadline(&game),
        Some(Duration::from_secs(30))
    );
    let roster = events(&out)
        .find_map(|event| match event {
            Event::WaveStarted { roster, .. } => Some(roster.clone()),
            _ => None,
        })
        .expect("wave started");
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].kind, EnemyKind::Goblin);
    assert_eq!(roster[0].count, 7);
    assert_eq!(roster[0].health, 100.0);

    game.set_player_ready(ADA, &mut out).expect("ready");
    assert_eq!(query::phase(&game), Phase::WaveActive);
    assert!(query::is_loop_running(&game));
    assert!(query::preparation_handle(&game).is_none());

    let scheduled: Vec<_> = query::enemies(&game)
        .map(|enemy| (enemy.kind(), enemy.spawn_time(), enemy.is_spawned()))
        .collect();
    let expected: Vec<_> = (0..7)
        .map(|i| (EnemyKind::Goblin, Duration::from_millis(1_200 * i), false))
        .collect();
    assert_eq!(scheduled, expected);
}

#[test]
fn preparation_timer_launches_the_wave() {
    let mut game = new_match(MatchConfig::default());
    let mut out = Vec::new();
    game.add_player(ADA, "ada", &mut out).expect("join");
    game.set_player_ready(ADA, &mut out).expect("ready");

    run(&mut game, Duration::from_secs(29), &mut out);
    assert_eq!(query::phase(&game), Phase::Preparation);

    run(&mut game, Duration::from_secs(2), &mut out);
    assert_eq!(query::phase(&game), Phase::WaveActive);
    assert!(events(&out).any(|event| matches!(event, Event::WaveLaunched { wave: 1, enemies: 7 })));
}

#[test]
fn cleared_wave_returns_to_the_lobby() {
    let (mut game, mut out) = launched_single_player(MatchConfig::default());
    run(&mut game, Duration::from_secs(40), &mut out);

    assert_eq!(query::phase(&game), Phase::Lobby);
    assert_eq!(query::wave(&game), 1);
    assert_eq!(query::base_health(&game), 93);
    assert!(!query::is_loop_running(&game));
    assert_eq!(query::enemies(&game).count(), 0);
    assert!(events(&out).any(|event| matches!(event, Event::WaveEnded { wave: 1 })));

    let player = query::player(&game, ADA).expect("player");
    assert_eq!(player.current_cards().len(), 3);
    assert!(!player.is_ready());
}

#[test]
fn base_falling_ends_the_game_and_stops_the_loop() {
    let mut config = MatchConfig::default();
    config.base_health = 5;
    let (mut game, mut out) = launched_single_player(config);
    run(&mut game, Duration::from_secs(40), &mut out);

    assert_eq!(query::phase(&game), Phase::GameOver);
    assert_eq!(query::base_health(&game), 0);
    assert!(!query::is_loop_running(&game));
    assert!(query::preparation_handle(&game).is_none());
    let endings: Vec<_> = events(&out)
        .filter_map(|event| match event {
            Event::GameOver { wave, victory } => Some((*wave, *victory)),
            _ => None,
        })
        .collect();
    assert_eq!(endings, vec![(1, false)]);

    let mut after = Vec::new();
    assert_eq!(
        game.set_player_ready(ADA, &mut after),
        Err(ActionError::MatchOver)
    );
    run(&mut game, Duration::from_secs(1), &mut after);
    assert!(after.is_empty());
}

#[test]
fn completing_the_victory_wave_wins_the_match() {
    let mut config = MatchConfig::default();
    config.victory_wave = Some(1);
    let (mut game, mut out) = launched_single_player(config);
    run(&mut game, Duration::from_secs(40), &mut out);

    assert_eq!(query::phase(&game), Phase::GameOver);
    assert!(events(&out).any(|event| matches!(
        event,
        Event::GameOver {
            wave: 1,
            victory: true
        }
    )));
}

#[test]
fn readiness_is_idempotent() {
    let mut game = new_match(MatchConfig::default());
    let mut out = Vec::new();
    game.add_player(ADA, "ada", &mut out).expect("join");
    game.add_player(BO, "bo", &mut out).expect("join");

    game.set_player_ready(ADA, &mut out).expect("ready");
    out.clear();
    game.set_player_ready(ADA, &mut out).expect("ready");
    assert!(out.is_empty());
    assert_eq!(query::phase(&game), Phase::Lobby);

    game.set_player_ready(BO, &mut out).expect("ready");
    assert_eq!(query::phase(&game), Phase::Preparation);
}

#[test]
fn replaced_preparation_handles_are_ignored() {
    let mut game = new_match(MatchConfig::default());
    let mut out = Vec::new();
    game.add_player(ADA, "ada", &mut out).expect("join");
    game.set_player_ready(ADA, &mut out).expect("ready");
    let first = query::preparation_handle(&game).expect("timer scheduled");

    game.debug_skip_to_wave(2, &mut out).expect("skip");
    let second = query::preparation_handle(&game).expect("timer rescheduled");
    assert_ne!(first, second);

    game.fire_preparation(first, &mut out);
    assert_eq!(query::phase(&game), Phase::Preparation);
    assert_eq!(query::wave(&game), 2);

    game.fire_preparation(second, &mut out);
    assert_eq!(query::phase(&game), Phase::WaveActive);

    game.fire_preparation(second, &mut out);
    assert_eq!(query::phase(&game), Phase::WaveActive);
}

#[test]
fn early_readiness_cancels_the_timer() {
    let (mut game, mut out) = launched_single_player(MatchConfig::default());
    assert!(query::preparation_deadline(&game).is_none());

    run(&mut game, Duration::from_secs(31), &mut out);
    let launches = events(&out)
        .filter(|event| matches!(event, Event::WaveLaunched { .. }))
        .count();
    assert_eq!(launches, 1);
}

#[test]
fn joining_is_limited_to_the_lobby_and_capacity() {
    let mut config = MatchConfig::default();
    config.max_players = 2;
    let mut game = new_match(config);
    let mut out = Vec::new();

    game.add_player(ADA, "ada", &mut out).expect("join");
    assert!(out.contains(&Outbound::player(
        ADA,
        Event::RoomJoined {
            room: RoomId::new("test"),
            player: ADA
        }
    )));
    assert_eq!(
        game.add_player(ADA, "ada", &mut out),
        Err(JoinError::DuplicatePlayer { player: ADA })
    );
    game.add_player(BO, "bo", &mut out).expect("join");
    assert_eq!(
        game.add_player(PlayerId::new(3), "cy", &mut out),
        Err(JoinError::RoomFull { capacity: 2 })
    );

    assert!(game.remove_player(BO, &mut out));
    game.set_player_ready(ADA, &mut out).expect("ready");
    assert_eq!(
        game.add_player(BO, "bo", &mut out),
        Err(JoinError::GameInProgress)
    );
}

#[test]
fn new_players_receive_a_full_tower_set_and_an_offer() {
    let mut game = new_match(MatchConfig::default());
    let mut out = Vec::new();
    game.add_player(ADA, "ada", &mut out).expect("join");

    let player = query::player(&game, ADA).expect("player");
    let towers: Vec<_> = player.inventory().iter().map(|card| card.kind).collect();
    let expected: Vec<_> = TowerType::ALL.iter().copied().map(CardKind::Tower).collect();
    assert_eq!(towers, expected);
    assert_eq!(player.current_cards().len(), 3);
}

#[test]
fn leaving_reruns_the_ready_check() {
    let mut game = new_match(MatchConfig::default());
    let mut out = Vec::new();
    game.add_player(ADA, "ada", &mut out).expect("join");
    game.add_player(BO, "bo", &mut out).expect("join");
    game.set_player_ready(ADA, &mut out).expect("ready");
    assert_eq!(query::phase(&game), Phase::Lobby);

    assert!(game.remove_player(BO, &mut out));
    assert!(events(&out)
        .any(|event| matches!(event, Event::PlayerLeft { player } if *player == BO)));
    assert_eq!(query::phase(&game), Phase::Preparation);
    assert!(!game.remove_player(BO, &mut out));
}

#[test]
fn selecting_a_card_moves_it_to_the_inventory() {
    let mut game = new_match(MatchConfig::default());
    let mut out = Vec::new();
    game.add_player(ADA, "ada", &mut out).expect("join");
    game.add_player(BO, "bo", &mut out).expect("join");
    let offered = query::player(&game, ADA).expect("player").current_cards()[1];

    let selected = game.select_card(ADA, 1, &mut out).expect("select");
    assert_eq!(selected, offered);

    let player = query::player(&game, ADA).expect("player");
    assert_eq!(player.inventory().len(), 8);
    assert_eq!(player.inventory().last(), Some(&offered));
    assert!(player.current_cards().is_empty());
    assert!(player.is_ready());

    out.clear();
    apply(
        &mut game,
        Command::SelectCard {
            player: ADA,
            index: 0,
        },
        &mut out,
    );
    assert_eq!(
        out,
        vec![Outbound::player(
            ADA,
            Event::ActionRejected {
                error: ActionError::InvalidCardIndex { index: 0 }
            }
        )]
    );
}

#[test]
fn towers_are_snapped_validated_and_paid_for() {
    let mut game = new_match(MatchConfig::default());
    let mut out = Vec::new();
    game.add_player(ADA, "ada", &mut out).expect("join");
    let fire = tower_card(&game, ADA, TowerType::Fire);

    let tower = game
        .place_tower(ADA, fire, Point::new(115.0, 275.0), &mut out)
        .expect("placement");
    assert_eq!(tower, TowerId::new(0));
    let placed = query::tower(&game, tower).expect("tower");
    assert_eq!(placed.position(), Point::new(100.0, 260.0));
    assert_eq!(placed.owner(), ADA);
    assert_eq!(
        query::player(&game, ADA).expect("player").inventory().len(),
        6
    );

    assert_eq!(
        game.place_tower(ADA, fire, Point::new(140.0, 260.0), &mut out),
        Err(PlaceTowerError::Action(ActionError::CardNotOwned { card: fire }))
    );

    let ice = tower_card(&game, ADA, TowerType::Ice);
    out.clear();
    apply(
        &mut game,
        Command::PlaceTower {
            player: ADA,
            card: ice,
            position: Point::new(100.0, 260.0),
        },
        &mut out,
    );
    assert_eq!(
        out,
        vec![Outbound::player(
            ADA,
            Event::PlacementRejected {
                error: PlacementError::TowerTooClose { tower }
            }
        )]
    );
    assert!(matches!(
        game.place_tower(ADA, ice, Point::new(100.0, 300.0), &mut out),
        Err(PlaceTowerError::Placement(PlacementError::TooCloseToPath { .. }))
    ));
    assert_eq!(
        query::player(&game, ADA).expect("player").inventory().len(),
        6
    );
}

#[test]
fn effect_cards_upgrade_towers() {
    let mut config = MatchConfig::default();
    config.offer_size = 40;
    let mut game = new_match(config);
    let mut out = Vec::new();
    game.add_player(ADA, "ada", &mut out).expect("join");
    game.add_player(BO, "bo", &mut out).expect("join");

    let fire = tower_card(&game, ADA, TowerType::Fire);
    let tower = game
        .place_tower(ADA, fire, Point::new(100.0, 260.0), &mut out)
        .expect("placement");
    let ice = tower_card(&game, ADA, TowerType::Ice);
    assert_eq!(
        game.apply_effect(ADA, ice, tower, &mut out),
        Err(ActionError::NotAnEffectCard { card: ice })
    );

    let offer = query::player(&game, ADA).expect("player").current_cards();
    let index = offer
        .iter()
        .position(|card| matches!(card.kind, CardKind::Effect(_)))
        .expect("forty draws include an effect card");
    let card = game.select_card(ADA, index, &mut out).expect("select");
    let CardKind::Effect(effect) = card.kind else {
        panic!("selected an effect card");
    };

    assert_eq!(
        game.apply_effect(ADA, card.id, TowerId::new(9), &mut out),
        Err(ActionError::UnknownTower {
            tower: TowerId::new(9)
        })
    );
    assert!(game
        .apply_effect(ADA, card.id, tower, &mut out)
        .expect("effect"));
    assert_eq!(
        query::tower(&game, tower).expect("tower").effects(),
        &[effect]
    );
    assert_eq!(
        game.apply_effect(ADA, card.id, tower, &mut out),
        Err(ActionError::CardNotOwned { card: card.id })
    );
}

#[test]
fn targeting_modes_are_parsed_case_insensitively() {
    let mut game = new_match(MatchConfig::default());
    let mut out = Vec::new();
    game.add_player(ADA, "ada", &mut out).expect("join");
    let fire = tower_card(&game, ADA, TowerType::Fire);
    let tower = game
        .place_tower(ADA, fire, Point::new(100.0, 260.0), &mut out)
        .expect("placement");

    let mode = game
        .change_targeting_mode(ADA, tower, "strongest", &mut out)
        .expect("mode");
    assert_eq!(mode.as_str(), "STRONGEST");
    assert_eq!(
        game.change_targeting_mode(ADA, tower, "nearest", &mut out),
        Err(ActionError::UnknownTargetingMode {
            mode: "nearest".to_owned()
        })
    );

    out.clear();
    apply(&mut game, Command::InspectTower { player: ADA, tower }, &mut out);
    match &out[..] {
        [Outbound {
            audience,
            event: Event::TowerInfo { info },
        }] => {
            assert_eq!(*audience, Audience::Player(ADA));
            assert_eq!(info.tower.targeting.as_str(), "STRONGEST");
            assert_eq!(info.dps, 15.0);
        }
        other => panic!("unexpected notifications: {other:?}"),
    }
}

#[test]
fn kills_and_arrivals_account_for_every_enemy() {
    let mut game = new_match(MatchConfig::default());
    let mut out = Vec::new();
    game.add_player(ADA, "ada", &mut out).expect("join");
    for (kind, position) in [
        (TowerType::Fire, Point::new(100.0, 260.0)),
        (TowerType::Darkness, Point::new(180.0, 340.0)),
        (TowerType::Earth, Point::new(260.0, 260.0)),
    ] {
        let card = tower_card(&game, ADA, kind);
        let _ = game
            .place_tower(ADA, card, position, &mut out)
            .expect("placement");
    }
    game.set_player_ready(ADA, &mut out).expect("ready");
    game.set_player_ready(ADA, &mut out).expect("ready");
    out.clear();
    run(&mut game, Duration::from_secs(40), &mut out);

    let killed = events(&out)
        .filter(|event| matches!(event, Event::EnemyKilled { .. }))
        .count();
    let credited: u32 = query::towers(&game)
        .map(|tower| tower.statistics().kills)
        .sum();
    let arrived = 100 - query::base_health(&game);

    assert_eq!(killed as i32 + arrived, 7);
    assert_eq!(credited as usize, killed);
    assert_eq!(query::phase(&game), Phase::Lobby);
}

#[test]
fn skipping_ahead_grows_the_map() {
    let mut game = new_match(MatchConfig::default());
    let mut out = Vec::new();
    game.add_player(ADA, "ada", &mut out).expect("join");

    assert_eq!(
        game.debug_skip_to_wave(0, &mut out),
        Err(ActionError::InvalidWave { wave: 0 })
    );
    game.debug_skip_to_wave(6, &mut out).expect("skip");

    assert_eq!(query::wave(&game), 6);
    assert_eq!(query::phase(&game), Phase::Preparation);
    let map = query::map(&game);
    assert_eq!((map.width, map.height), (960.0, 720.0));
    assert_eq!(query::paths(&game).len(), 2);
    let expansions = events(&out)
        .filter(|event| matches!(event, Event::MapExpanded { wave: 6, .. }))
        .count();
    assert_eq!(expansions, 1);

    game.debug_skip_to_wave(11, &mut out).expect("skip");
    assert_eq!(query::paths(&game).len(), 3);
}

#[test]
fn towers_in_the_way_of_a_new_path_are_removed() {
    for seed in [3, 13, 21] {
        let mut config = MatchConfig::default();
        config.rng_seed = seed;
        let mut game = new_match(config);
        let mut out = Vec::new();
        game.add_player(ADA, "ada", &mut out).expect("join");
        let built = build_everything(&mut game, ADA, &mut out);
        out.clear();

        game.debug_skip_to_wave(6, &mut out).expect("skip");
        let destroyed = events(&out)
            .find_map(|event| match event {
                Event::MapExpanded {
                    destroyed_towers, ..
                } => Some(destroyed_towers.clone()),
                _ => None,
            })
            .expect("map expanded");

        for tower in &destroyed {
            assert!(built.contains(tower));
            assert!(query::tower(&game, *tower).is_none());
        }
        assert_eq!(query::towers(&game).count(), built.len() - destroyed.len());
    }
}

#[test]
fn wind_towers_cannot_stall_a_wave_on_a_branched_map() {
    for seed in [13, 21] {
        let mut config = MatchConfig::default();
        config.rng_seed = seed;
        let mut game = new_match(config);
        let mut out = Vec::new();
        game.add_player(ADA, "ada", &mut out).expect("join");
        let _ = build_everything(&mut game, ADA, &mut out);

        game.debug_skip_to_wave(6, &mut out).expect("skip");
        game.set_player_ready(ADA, &mut out).expect("ready");
        assert_eq!(query::phase(&game), Phase::WaveActive);
        out.clear();
        run(&mut game, Duration::from_secs(400), &mut out);

        assert_eq!(query::phase(&game), Phase::Lobby, "seed {seed}");
        assert!(events(&out).any(|event| matches!(event, Event::WaveEnded { wave: 6 })));
        assert_eq!(query::enemies(&game).count(), 0);
    }
}

#[test]
fn ticks_are_applied_through_commands() {
    let (mut game, mut out) = launched_single_player(MatchConfig::default());
    out.clear();
    apply(
        &mut game,
        Command::Tick {
            dt: Duration::from_millis(50),
        },
        &mut out,
    );

    assert_eq!(query::ticks(&game), 3);
    assert!(query::clock(&game) < Duration::from_millis(50));
    assert!(events(&out).any(|event| matches!(event, Event::StateDelta { .. })));
    assert_eq!(
        query::enemies(&game)
            .filter(|enemy| enemy.is_spawned())
            .count(),
        1
    );
}

#[test]
fn identical_seeds_replay_identically() {
    fn play(seed: u64) -> Vec<Outbound> {
        let mut config = MatchConfig::default();
        config.rng_seed = seed;
        let mut game = new_match(config);
        let mut out = Vec::new();
        game.add_player(ADA, "ada", &mut out).expect("join");
        let card = tower_card(&game, ADA, TowerType::Wind);
        let _ = game
            .place_tower(ADA, card, Point::new(100.0, 260.0), &mut out)
            .expect("placement");
        let _ = game
            .change_targeting_mode(ADA, TowerId::new(0), "random", &mut out)
            .expect("mode");
        game.set_player_ready(ADA, &mut out).expect("ready");
        game.set_player_ready(ADA, &mut out).expect("ready");
        run(&mut game, Duration::from_secs(20), &mut out);
        out
    }

    assert_eq!(play(7), play(7));
}
