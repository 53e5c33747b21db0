//! Ordered collection of session entities.
//!
//! The host appends joiners to the end and clients rebuild the same order
//! from the join handshake. Snapshots carry entity ids, so applying one
//! does not depend on both sides agreeing on that order.

use crate::entity::{Entity, PeerId};
use crate::protocol::{EntitySnapshot, PeerInfo};

/// Outcome of applying a snapshot to a roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    /// Entries written onto a local entity.
    pub applied: usize,
    /// Snapshot ids with no local entity.
    pub unknown: Vec<PeerId>,
    /// Local entities the snapshot did not mention.
    pub stale: Vec<PeerId>,
}

impl SnapshotReport {
    pub fn is_consistent(&self) -> bool {
        self.unknown.is_empty() && self.stale.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    entities: Vec<Entity>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entity. Returns false, leaving the roster untouched, when
    /// the id is already present.
    pub fn push(&mut self, entity: Entity) -> bool {
        if self.contains(&entity.id) {
            return false;
        }
        self.entities.push(entity);
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<Entity> {
        let index = self.index_of(id)?;
        Some(self.entities.remove(index))
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entities.iter().position(|entity| entity.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entity> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Ids and names in roster order.
    pub fn peers(&self) -> Vec<PeerInfo> {
        self.entities.iter().map(PeerInfo::from).collect()
    }

    /// Kinematic state of every entity in roster order.
    pub fn snapshot(&self) -> Vec<EntitySnapshot> {
        self.entities.iter().map(EntitySnapshot::from).collect()
    }

    /// Overwrites position and velocity of each entity named in `entries`.
    pub fn apply_snapshot(&mut self, entries: &[EntitySnapshot]) -> SnapshotReport {
        let mut report = SnapshotReport::default();

        for entry in entries {
            match self.get_mut(&entry.id) {
                Some(entity) => {
                    entity.position = entry.position();
                    entity.velocity = entry.velocity();
                    report.applied += 1;
                }
                None => report.unknown.push(entry.id.clone()),
            }
        }

        if report.applied < self.entities.len() {
            report.stale = self
                .entities
                .iter()
                .filter(|entity| !entries.iter().any(|entry| entry.id == entity.id))
                .map(|entity| entity.id.clone())
                .collect();
        }

        report
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Vec2;

    fn roster_of(ids: &[&str]) -> Roster {
        let mut roster = Roster::new();
        for id in ids {
            roster.push(Entity::new(*id, id.to_uppercase(), Vec2::ZERO));
        }
        roster
    }

    fn entry(id: &str, x: f64, y: f64) -> EntitySnapshot {
        EntitySnapshot {
            id: id.to_string(),
            x,
            y,
            vx: x / 10.0,
            vy: y / 10.0,
        }
    }

    #[test]
    fn test_push_keeps_order_and_rejects_duplicates() {
        let mut roster = roster_of(&["h", "a"]);
        assert!(!roster.push(Entity::new("a", "Again", Vec2::ZERO)));
        assert!(roster.push(Entity::new("b", "B", Vec2::ZERO)));

        let ids: Vec<&str> = roster.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["h", "a", "b"]);
        assert_eq!(roster.get("a").unwrap().display_name, "A");
    }

    #[test]
    fn test_remove_middle_entry() {
        let mut roster = roster_of(&["h", "a", "b"]);
        let removed = roster.remove("a").unwrap();

        assert_eq!(removed.id, "a");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.index_of("b"), Some(1));
        assert!(roster.remove("a").is_none());
    }

    #[test]
    fn test_peers_in_roster_order() {
        let roster = roster_of(&["h", "a", "b"]);
        let peers = roster.peers();
        assert_eq!(peers.len(), 3);
        assert_eq!(peers[0].id, "h");
        assert_eq!(peers[0].name, "H");
        assert_eq!(peers[2].id, "b");
    }

    #[test]
    fn test_apply_snapshot_index_for_index() {
        let mut roster = roster_of(&["h", "a", "b"]);
        let snapshot = vec![entry("h", 1.0, 2.0), entry("a", 3.0, 4.0), entry("b", 5.0, 6.0)];

        let report = roster.apply_snapshot(&snapshot);

        assert!(report.is_consistent());
        assert_eq!(report.applied, 3);
        for (i, entity) in roster.iter().enumerate() {
            assert_eq!(entity.position, snapshot[i].position());
            assert_eq!(entity.velocity, snapshot[i].velocity());
        }
    }

    #[test]
    fn test_apply_snapshot_by_id_when_order_differs() {
        let mut roster = roster_of(&["h", "a", "b"]);
        let snapshot = vec![entry("b", 5.0, 6.0), entry("h", 1.0, 2.0), entry("a", 3.0, 4.0)];

        roster.apply_snapshot(&snapshot);

        assert_eq!(roster.get("h").unwrap().position, Vec2::new(1.0, 2.0));
        assert_eq!(roster.get("a").unwrap().position, Vec2::new(3.0, 4.0));
        assert_eq!(roster.get("b").unwrap().position, Vec2::new(5.0, 6.0));
    }

    #[test]
    fn test_apply_snapshot_reports_mismatch() {
        let mut roster = roster_of(&["h", "a", "b"]);
        let snapshot = vec![entry("h", 1.0, 2.0), entry("a", 3.0, 4.0), entry("z", 9.0, 9.0)];

        let report = roster.apply_snapshot(&snapshot);

        assert_eq!(report.applied, 2);
        assert_eq!(report.unknown, vec!["z".to_string()]);
        assert_eq!(report.stale, vec!["b".to_string()]);
        assert_eq!(roster.get("b").unwrap().position, Vec2::ZERO);
    }
}
