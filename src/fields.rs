//! Symbolic names for the schema fields the decoder itself depends on.
//!
//! Schema tables label fields with short numeric codes. Most of them are
//! only passed through to the caller, but a few drive the layout and the
//! fixture cross-referencing. Those are named here so no other module
//! spells out a bare code.

use std::fmt;

/// A schema field consumed by the decoding pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    /// Header: number of rounds.
    Rounds,
    /// Header: nonzero once at least one round has been paired.
    RoundsFixed,
    /// Header: number of players.
    PlayerCount,
    /// Header: per-round slot multiplier of the extended layout.
    RoundMultiplier,
    /// Header: set for team tournaments.
    TeamTournament,
    /// Header: number of teams.
    TeamCount,
    /// Team card: display name.
    TeamName,
    /// Team card: identifier.
    TeamId,
    /// Player card: display name.
    PlayerName,
    /// Player card: identifier.
    PlayerId,
    /// Team pairing: opponent team identifier.
    TeamOpponent,
    /// Player pairing: opponent player identifier.
    PlayerOpponent,
}

impl FieldKey {
    /// The label this field carries in the schema tables.
    pub const fn label(self) -> &'static str {
        match self {
            FieldKey::Rounds => "1",
            FieldKey::RoundsFixed => "3",
            FieldKey::PlayerCount => "4",
            FieldKey::RoundMultiplier => "33",
            FieldKey::TeamTournament => "35",
            FieldKey::TeamCount => "80",
            FieldKey::TeamName => "1000",
            FieldKey::TeamId => "1018",
            FieldKey::PlayerName => "2000",
            FieldKey::PlayerId => "2020",
            FieldKey::TeamOpponent => "3002",
            FieldKey::PlayerOpponent => "4001",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
