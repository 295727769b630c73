//! Player and team index cards.

use indexmap::IndexMap;

use super::layout::Section;
use crate::Result;
use crate::fields::FieldKey;
use crate::region::{DecodedRegion, Provenance, RegionDecoder};
use crate::schema::TableSource;

/// The two kinds of entities that own cards and fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EntityKind {
    Player,
    Team,
}

impl EntityKind {
    /// Schema part describing one card.
    pub const fn card_part(self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Team => "team",
        }
    }

    /// Schema part describing one fixture slot.
    pub const fn pairing_part(self) -> &'static str {
        match self {
            EntityKind::Player => "individual-pairings",
            EntityKind::Team => "team-pairings",
        }
    }

    /// Card field holding the entity's identifier.
    pub const fn id_key(self) -> FieldKey {
        match self {
            EntityKind::Player => FieldKey::PlayerId,
            EntityKind::Team => FieldKey::TeamId,
        }
    }

    /// Card field holding the entity's display name.
    pub const fn name_key(self) -> FieldKey {
        match self {
            EntityKind::Player => FieldKey::PlayerName,
            EntityKind::Team => FieldKey::TeamName,
        }
    }

    /// Fixture field holding the opponent's identifier.
    pub const fn opponent_key(self) -> FieldKey {
        match self {
            EntityKind::Player => FieldKey::PlayerOpponent,
            EntityKind::Team => FieldKey::TeamOpponent,
        }
    }
}

/// Decoded cards of one entity kind.
///
/// Cards are keyed by their identifier field. A repeated identifier keeps
/// the position of its first card and the content of its last one. Fixture
/// slots are assigned to entities by that position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    pub kind: EntityKind,
    /// Identifier → card, in first-decoded order.
    pub records: IndexMap<String, DecodedRegion>,
    /// Provenance of every decoded card, in decode order.
    pub provenance: Vec<Provenance>,
}

impl RecordSet {
    /// An empty set, for files without cards of this kind.
    pub fn empty(kind: EntityKind) -> Self {
        Self {
            kind,
            records: IndexMap::new(),
            provenance: Vec::new(),
        }
    }

    /// Decode `section.count` consecutive cards.
    pub fn decode<S: TableSource>(
        regions: RegionDecoder<'_, S>,
        buffer: &[u8],
        kind: EntityKind,
        section: &Section,
    ) -> Result<Self> {
        let mut set = Self::empty(kind);
        for card in decode_cards(regions, buffer, kind.card_part(), section)? {
            let id = card.text(kind.id_key());
            set.provenance.extend(card.provenance.iter().cloned());
            set.records.insert(id, card);
        }
        log::debug!(
            "{} {:?} cards at {:#x}, {} distinct",
            section.count,
            kind,
            section.start,
            set.records.len()
        );
        Ok(set)
    }

    /// Card with identifier `id`.
    pub fn get(&self, id: &str) -> Option<&DecodedRegion> {
        self.records.get(id)
    }

    /// Identifier at `position` among the distinct identifiers.
    pub fn id_at(&self, position: usize) -> Option<&str> {
        self.records.get_index(position).map(|(id, _)| id.as_str())
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(not(feature = "parallel"))]
fn decode_cards<S: TableSource>(
    regions: RegionDecoder<'_, S>,
    buffer: &[u8],
    part: &str,
    section: &Section,
) -> Result<Vec<DecodedRegion>> {
    (0..section.count)
        .map(|i| regions.decode(buffer, part, Some((section.offset(i), section.stride))))
        .collect()
}

/// Cards are independent of each other, so they decode on the rayon pool.
/// The schema cache tolerates concurrent first access.
#[cfg(feature = "parallel")]
fn decode_cards<S: TableSource>(
    regions: RegionDecoder<'_, S>,
    buffer: &[u8],
    part: &str,
    section: &Section,
) -> Result<Vec<DecodedRegion>> {
    use rayon::prelude::*;

    (0..section.count)
        .into_par_iter()
        .map(|i| regions.decode(buffer, part, Some((section.offset(i), section.stride))))
        .collect()
}
