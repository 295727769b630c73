//! Where each record section starts, derived from the header counts.
//!
//! ## Section order
//! ```text
//! [fixtures_start]
//!        player fixtures  rounds × mult × players × pairing   (if a round is fixed)
//!        team fixtures    rounds × mult × teams × pairing     (if also a team tournament)
//!        player cards     players × player_card
//!        team cards       teams × team_card                   (if a team tournament)
//! ```
//! Absent sections take no space; the next present one starts where the
//! previous present one ended.

use crate::Result;
use crate::fields::FieldKey;
use crate::region::DecodedRegion;
use crate::schema::ConstantTable;
use crate::value::Value;

/// Header counts that drive the layout. Read once per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HeaderCounts {
    pub rounds: usize,
    /// At least one round has been paired, so fixture blocks exist.
    pub rounds_fixed: bool,
    pub players: usize,
    pub team_tournament: bool,
    pub teams: usize,
    /// Per-round slot multiplier; [`None`] when the header does not carry
    /// one (legacy format). Zero means no fixture slots are stored.
    pub multiplier: Option<usize>,
}

impl HeaderCounts {
    pub fn from_header(header: &DecodedRegion) -> Self {
        let count = |key| header.get(key).map_or(0, Value::as_count);
        let flag = |key| header.get(key).is_some_and(Value::is_truthy);
        Self {
            rounds: count(FieldKey::Rounds),
            rounds_fixed: flag(FieldKey::RoundsFixed),
            players: count(FieldKey::PlayerCount),
            team_tournament: flag(FieldKey::TeamTournament),
            teams: count(FieldKey::TeamCount),
            multiplier: header.get(FieldKey::RoundMultiplier).map(Value::as_count),
        }
    }
}

/// Record lengths and base offset for one file format generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutProfile {
    /// Bytes per fixture slot.
    pub pairing_len: usize,
    /// Bytes per player card.
    pub player_card_len: usize,
    /// Bytes per team card.
    pub team_card_len: usize,
    /// Absolute offset of the first fixture block.
    pub fixtures_start: usize,
    /// Fixture slots per entity and round.
    pub multiplier: usize,
}

impl LayoutProfile {
    /// Constants of files written before the extended layout.
    pub const LEGACY: Self = Self {
        pairing_len: 19,
        player_card_len: 655,
        team_card_len: 655,
        fixtures_start: 13384,
        multiplier: 1,
    };

    /// Constants from a `structure` table.
    pub fn from_constants(table: &ConstantTable, multiplier: usize) -> Result<Self> {
        Ok(Self {
            pairing_len: table.require("length:pairing")?,
            player_card_len: table.require("length:player")?,
            team_card_len: table.require("length:team")?,
            fixtures_start: table.require("start:fixtures_players")?,
            multiplier,
        })
    }
}

/// A run of fixed-size records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Section {
    /// Absolute offset of the first record.
    pub start: usize,
    /// Number of records.
    pub count: usize,
    /// Bytes per record.
    pub stride: usize,
}

impl Section {
    /// Total size in bytes.
    pub fn len(&self) -> usize {
        self.count.saturating_mul(self.stride)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One past the last byte.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.len())
    }

    /// Absolute offset of record `i`.
    pub fn offset(&self, i: usize) -> usize {
        self.start.saturating_add(i.saturating_mul(self.stride))
    }

    /// The records of this section that start before `available`.
    /// Zero-length records are never counted as present.
    pub fn clamp(&self, available: usize) -> Self {
        let present = match available.checked_sub(self.start) {
            Some(room) if self.stride > 0 => room.div_ceil(self.stride),
            _ => 0,
        };
        Self {
            count: self.count.min(present),
            ..*self
        }
    }
}

/// Planned sections of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Layout {
    pub player_fixtures: Option<Section>,
    pub team_fixtures: Option<Section>,
    pub player_cards: Section,
    pub team_cards: Option<Section>,
}

impl Layout {
    pub fn plan(counts: &HeaderCounts, profile: &LayoutProfile) -> Self {
        let mut cursor = profile.fixtures_start;
        let mut next = |count: usize, stride: usize| {
            let section = Section {
                start: cursor,
                count,
                stride,
            };
            cursor = section.end();
            section
        };

        let slots_per_entity = counts.rounds.saturating_mul(profile.multiplier);
        let player_fixtures = counts.rounds_fixed.then(|| {
            next(
                slots_per_entity.saturating_mul(counts.players),
                profile.pairing_len,
            )
        });
        let team_fixtures = (counts.rounds_fixed && counts.team_tournament).then(|| {
            next(
                slots_per_entity.saturating_mul(counts.teams),
                profile.pairing_len,
            )
        });
        let player_cards = next(counts.players, profile.player_card_len);
        let team_cards = counts
            .team_tournament
            .then(|| next(counts.teams, profile.team_card_len));

        Self {
            player_fixtures,
            team_fixtures,
            player_cards,
            team_cards,
        }
    }

    /// One past the last byte of the last section.
    pub fn end(&self) -> usize {
        self.team_cards.unwrap_or(self.player_cards).end()
    }

    /// The same plan restricted to records that start inside a buffer of
    /// `available` bytes.
    pub fn clamp(&self, available: usize) -> Self {
        Self {
            player_fixtures: self.player_fixtures.map(|s| s.clamp(available)),
            team_fixtures: self.team_fixtures.map(|s| s.clamp(available)),
            player_cards: self.player_cards.clamp(available),
            team_cards: self.team_cards.map(|s| s.clamp(available)),
        }
    }
}
