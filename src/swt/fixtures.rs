//! Per-round pairings and opponent resolution.
//!
//! Fixture slots are stored entity by entity, round by round:
//! ```text
//! slot 0      entity 0, round 1
//! slot 1      entity 0, round 2
//! ...
//! slot R-1    entity 0, round R
//! slot R      entity 1, round 1
//! ```
//! The section holds `entities × R × m` slots for a round multiplier `m`,
//! but the round counter still wraps every `R` slots and each wrap moves on
//! to the next entity. Slots left over once every entity has its `R` rounds
//! are skipped and counted.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use super::layout::Section;
use super::records::RecordSet;
use crate::Result;
use crate::region::{DecodedRegion, Provenance, RegionDecoder};
use crate::schema::TableSource;

/// Opponent identifier meaning "no opponent".
pub const NO_OPPONENT: &str = "00";

/// One round's pairing for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Fixture {
    pub region: DecodedRegion,
    /// Opponent's display name, `""` for no opponent, or
    /// `"UNKNOWN <id>"` if the identifier matches no card.
    pub opponent_label: String,
}

/// Entity identifier → round number → fixture.
pub type FixtureMap = IndexMap<String, BTreeMap<usize, Fixture>>;

/// Decoded fixtures of one entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureSet {
    pub fixtures: FixtureMap,
    /// Slots dropped because they fall past the last known entity.
    pub skipped: usize,
    /// Provenance of every decoded slot, in decode order.
    pub provenance: Vec<Provenance>,
}

impl FixtureSet {
    /// Decode the slots of `section` and attach them to the entities of
    /// `records`, which must already be fully decoded.
    pub fn resolve<S: TableSource>(
        regions: RegionDecoder<'_, S>,
        buffer: &[u8],
        records: &RecordSet,
        section: &Section,
        rounds: usize,
    ) -> Result<Self> {
        let kind = records.kind;
        let mut set = Self::default();
        let mut round = 1;
        let mut position: Option<usize> = None;

        for slot in 0..section.count {
            if round == 1 {
                position = Some(position.map_or(0, |p| p + 1));
            }
            let Some(id) = position.and_then(|p| records.id_at(p)) else {
                set.skipped += 1;
                continue;
            };

            let region = regions.decode(
                buffer,
                kind.pairing_part(),
                Some((section.offset(slot), section.stride)),
            )?;
            let opponent_label = opponent_label(records, &region.text(kind.opponent_key()));
            set.provenance.extend(region.provenance.iter().cloned());
            set.fixtures.entry(id.to_owned()).or_default().insert(
                round,
                Fixture {
                    region,
                    opponent_label,
                },
            );

            round = if round >= rounds { 1 } else { round + 1 };
        }

        if set.skipped > 0 {
            log::warn!(
                "{} {:?} fixture slots past the last of {} entities",
                set.skipped,
                kind,
                records.len()
            );
        }
        Ok(set)
    }
}

/// Display label for an opponent identifier.
pub fn opponent_label(records: &RecordSet, id: &str) -> String {
    if id == NO_OPPONENT {
        return String::new();
    }
    match records.get(id) {
        Some(card) => card.text(records.kind.name_key()),
        None => format!("UNKNOWN {id}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::schema::{MemorySource, SchemaResolver};
    use crate::swt::records::EntityKind;
    use crate::value::Value;

    fn schema() -> SchemaResolver<MemorySource> {
        let source = MemorySource::new()
            .with("", "player", "00\t03\tasc\t2000\n04\t\tbin\t2020\n")
            .with("", "individual-pairings", "00\t\tbin\t4001\n01\t\tint\tBoard\n");
        SchemaResolver::new(Arc::new(source), None)
    }

    fn players(schema: &SchemaResolver<MemorySource>) -> RecordSet {
        let cards = b"Amy\0\x01Bob\0\x02";
        let section = Section {
            start: 0,
            count: 2,
            stride: 5,
        };
        RecordSet::decode(RegionDecoder::new(schema), cards, EntityKind::Player, &section).unwrap()
    }

    #[test]
    fn labels() {
        let schema = schema();
        let players = players(&schema);
        assert_eq!(opponent_label(&players, "02"), "Bob");
        assert_eq!(opponent_label(&players, "00"), "");
        assert_eq!(opponent_label(&players, "2A"), "UNKNOWN 2A");
    }

    #[test]
    fn no_opponent_wins_over_a_matching_card() {
        let schema = schema();
        let cards = b"Nil\0\x00";
        let section = Section {
            start: 0,
            count: 1,
            stride: 5,
        };
        let set =
            RecordSet::decode(RegionDecoder::new(&schema), cards, EntityKind::Player, &section)
                .unwrap();
        assert!(set.get("00").is_some());
        assert_eq!(opponent_label(&set, "00"), "");
    }

    #[test]
    fn slots_map_to_entity_and_round() {
        let schema = schema();
        let players = players(&schema);
        // two players, two rounds: (opponent, board) per slot
        let slots: [u8; 8] = [0x02, 1, 0x00, 3, 0x01, 1, 0x09, 2];
        let section = Section {
            start: 0,
            count: 4,
            stride: 2,
        };
        let set = FixtureSet::resolve(RegionDecoder::new(&schema), &slots, &players, &section, 2)
            .unwrap();

        assert_eq!(set.skipped, 0);
        assert_eq!(set.fixtures.keys().collect::<Vec<_>>(), ["01", "02"]);
        let amy = &set.fixtures["01"];
        assert_eq!(amy[&1].opponent_label, "Bob");
        assert_eq!(amy[&2].opponent_label, "");
        assert_eq!(amy[&2].region.fields["Board"], Value::Int(3));
        let bob = &set.fixtures["02"];
        assert_eq!(bob[&1].opponent_label, "Amy");
        assert_eq!(bob[&2].opponent_label, "UNKNOWN 09");
        assert_eq!(set.provenance.last().map(|p| (p.begin, p.end)), Some((7, 7)));
    }

    #[test]
    fn slots_past_known_entities_are_skipped() {
        let schema = schema();
        let players = players(&schema);
        let slots: [u8; 6] = [0x02, 1, 0x01, 1, 0x01, 1];
        let section = Section {
            start: 0,
            count: 3,
            stride: 2,
        };
        let set = FixtureSet::resolve(RegionDecoder::new(&schema), &slots, &players, &section, 1)
            .unwrap();
        assert_eq!(set.skipped, 1);
        assert_eq!(set.fixtures.len(), 2);
        assert_eq!(set.provenance.len(), 4);
    }

    #[test]
    fn repeated_card_ids_take_one_position() {
        let schema = schema();
        let cards = b"Ann\0\x01Ben\0\x01Cid\0\x02";
        let section = Section {
            start: 0,
            count: 3,
            stride: 5,
        };
        let players =
            RecordSet::decode(RegionDecoder::new(&schema), cards, EntityKind::Player, &section)
                .unwrap();
        // one round, three slots for three cards but only two distinct ids
        let slots: [u8; 6] = [0x0A, 1, 0x0B, 2, 0x0C, 3];
        let section = Section {
            start: 0,
            count: 3,
            stride: 2,
        };
        let set = FixtureSet::resolve(RegionDecoder::new(&schema), &slots, &players, &section, 1)
            .unwrap();
        assert_eq!(set.skipped, 1);
        assert_eq!(set.fixtures["01"][&1].opponent_label, "UNKNOWN 0A");
        assert_eq!(set.fixtures["02"][&1].opponent_label, "UNKNOWN 0B");
        assert_eq!(set.fixtures["02"][&1].region.fields["Board"], Value::Int(2));
    }
}
