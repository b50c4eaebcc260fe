//! Scripted players that drive a match without a transport.

use card_defence_core::{
    Card, CardId, CardKind, Command, Outbound, Phase, PlayerId, Point, TowerId,
};
use card_defence_world::{apply, query, Match, PlaceTowerError};

/// Placement sites tried per tower card before giving up.
const PLACEMENT_ATTEMPTS: usize = 32;

/// Player that builds every tower card, upgrades its least upgraded tower and
/// readies up.
#[derive(Debug)]
pub(crate) struct Bot {
    player: PlayerId,
}

impl Bot {
    pub(crate) const fn new(player: PlayerId) -> Self {
        Self { player }
    }

    pub(crate) const fn player(&self) -> PlayerId {
        self.player
    }

    /// Plays the bot's turn while the match waits for players.
    pub(crate) fn act(&self, game: &mut Match, out: &mut Vec<Outbound>) {
        if !matches!(query::phase(game), Phase::Lobby | Phase::Preparation) {
            return;
        }
        let Some(player) = query::player(game, self.player) else {
            return;
        };
        if player.is_ready() {
            return;
        }
        let inventory = player.inventory().to_vec();
        let offers = player.current_cards().to_vec();

        for card in inventory {
            match card.kind {
                CardKind::Tower(_) => self.build(game, card.id, out),
                CardKind::Effect(_) => {
                    if let Some(tower) = self.upgrade_target(game) {
                        apply(
                            game,
                            Command::ApplyEffect {
                                player: self.player,
                                card: card.id,
                                tower,
                            },
                            out,
                        );
                    }
                }
            }
        }

        let command = match preferred_offer(&offers) {
            Some(index) => Command::SelectCard {
                player: self.player,
                index,
            },
            None => Command::SetReady {
                player: self.player,
            },
        };
        apply(game, command, out);
    }

    fn build(&self, game: &mut Match, card: CardId, out: &mut Vec<Outbound>) {
        for site in candidate_sites(game).into_iter().take(PLACEMENT_ATTEMPTS) {
            match game.place_tower(self.player, card, site, out) {
                Ok(tower) => {
                    tracing::debug!(player = self.player.get(), tower = tower.get(), "bot built");
                    return;
                }
                Err(PlaceTowerError::Placement(_)) => continue,
                Err(PlaceTowerError::Action(error)) => {
                    tracing::warn!(player = self.player.get(), %error, "bot could not build");
                    return;
                }
            }
        }
        tracing::debug!(player = self.player.get(), "no free placement site");
    }

    fn upgrade_target(&self, game: &Match) -> Option<TowerId> {
        query::towers(game)
            .filter(|tower| tower.owner() == self.player)
            .min_by_key(|tower| (tower.effects().len(), tower.id()))
            .map(|tower| tower.id())
    }
}

/// Tower cards are taken first, otherwise the first offer.
fn preferred_offer(offers: &[Card]) -> Option<usize> {
    if offers.is_empty() {
        return None;
    }
    let tower = offers
        .iter()
        .position(|card| matches!(card.kind, CardKind::Tower(_)));
    Some(tower.unwrap_or(0))
}

/// Free cell centres inside the placement window, closest to the inner edge
/// of the window first.
fn candidate_sites(game: &Match) -> Vec<Point> {
    let placement = &query::config(game).placement;
    let map = query::map(game);
    let cell = placement.cell_size;
    let ideal = placement.min_path_distance + cell / 2.0;
    let towers: Vec<Point> = query::towers(game).map(|tower| tower.position()).collect();

    let mut sites = Vec::new();
    let mut y = cell / 2.0;
    while y < map.height {
        let mut x = cell / 2.0;
        while x < map.width {
            let site = Point::new(x, y);
            let distance = query::paths(game)
                .iter()
                .map(|path| path.distance_to(site))
                .fold(f32::INFINITY, f32::min);
            let in_window = (placement.min_path_distance..=placement.max_path_distance)
                .contains(&distance);
            let spaced = towers.iter().all(|tower| tower.distance(site) >= cell);
            if in_window && spaced && map.contains_with_margin(site, placement.bounds_margin) {
                sites.push(((distance - ideal).abs(), site));
            }
            x += cell;
        }
        y += cell;
    }

    sites.sort_by(|(a_score, a), (b_score, b)| {
        a_score
            .total_cmp(b_score)
            .then(a.x.total_cmp(&b.x))
            .then(a.y.total_cmp(&b.y))
    });
    sites.into_iter().map(|(_, site)| site).collect()
}
