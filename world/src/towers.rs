//! Authoritative tower storage and identifier allocation.

use card_defence_core::{Point, TowerId};
use card_defence_system_tower_combat::{Tower, TowerTable};

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug, Default)]
pub(crate) struct TowerRegistry {
    entries: TowerTable,
    next_tower_id: u32,
}

impl TowerRegistry {
    /// Reserves the identifier for the next tower.
    pub(crate) fn allocate(&mut self) -> TowerId {
        let id = TowerId::new(self.next_tower_id);
        self.next_tower_id += 1;
        id
    }

    pub(crate) fn insert(&mut self, tower: Tower) {
        let _ = self.entries.insert(tower.id(), tower);
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<Tower> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&Tower> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut Tower> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.entries.values()
    }

    pub(crate) fn positions(&self) -> impl Iterator<Item = (TowerId, Point)> + '_ {
        self.entries
            .values()
            .map(|tower| (tower.id(), tower.position()))
    }

    pub(crate) fn table_mut(&mut self) -> &mut TowerTable {
        &mut self.entries
    }
}
