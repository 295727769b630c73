//! SWT tournament files.
//!
//! ## Decode order
//! 1. Format version from the raw bytes (selects the schema variant).
//! 2. Header (`general` part), decoded over the whole file.
//! 3. Layout profile and section plan from the header counts. A file cut
//!    short keeps only the records that start inside it.
//! 4. Team cards (team tournaments only), then player cards.
//! 5. Team fixtures, then player fixtures, once at least one round is paired.
//!
//! Fixtures reference opponents by card identifier, so every card of a kind
//! is decoded before any fixture of that kind.
//!
//! ## Schema parts
//! | Part | Describes |
//! |------|-----------|
//! | `general` | tournament header |
//! | `structure` | record lengths and the fixture base offset |
//! | `player` / `team` | one index card |
//! | `individual-pairings` / `team-pairings` | one fixture slot |
//! | `<area>-selection` | code → text lookups for `sel` fields |

pub mod fixtures;
pub mod layout;
pub mod records;

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;

pub use fixtures::{Fixture, FixtureMap, FixtureSet};
pub use layout::{HeaderCounts, Layout, LayoutProfile, Section};
pub use records::{EntityKind, RecordSet};

use crate::region::{DecodedRegion, Provenance, RegionDecoder};
use crate::schema::{SchemaResolver, TableSource};
use crate::utils::{be_uint, inclusive};
use crate::value::Value;
use crate::{Error, Result};

/// Header part name.
pub const HEADER_PART: &str = "general";
/// Layout constants part name.
pub const STRUCTURE_PART: &str = "structure";

/// Absolute, inclusive byte range of the format version (bytes reversed).
const VERSION_BEGIN: usize = 0x261;
const VERSION_END: usize = 0x262;

/// Read the format version. Files too short to contain it are version 0.
pub fn format_version(bytes: &[u8]) -> u32 {
    be_uint(inclusive(bytes, VERSION_BEGIN, VERSION_END).iter().rev())
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

/// Decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Largest file [`TournamentDecoder::decode_file`] will read.
    pub max_file_size: u64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_file_size: 16 * 1024 * 1024,
        }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }
}

/// A fully decoded tournament file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tournament {
    /// Format version read from the file.
    pub version: u32,
    /// Header fields.
    pub header: IndexMap<String, Value>,
    /// Counts the layout was planned from.
    pub counts: HeaderCounts,
    /// Planned sections, as the header describes them.
    pub layout: Layout,
    /// Player cards keyed by player identifier, in decode order.
    pub players: IndexMap<String, DecodedRegion>,
    /// Team cards keyed by team identifier; [`None`] for individual
    /// tournaments.
    pub teams: Option<IndexMap<String, DecodedRegion>>,
    /// Player identifier → round → fixture.
    pub player_fixtures: FixtureMap,
    /// Team identifier → round → fixture.
    pub team_fixtures: FixtureMap,
    /// Fixture slots dropped because they fall past the last known entity.
    pub skipped_slots: usize,
    /// The file ends before the planned layout does. Only records that
    /// start inside the file were decoded; the last one may be partial.
    pub truncated: bool,
    /// Provenance of every decoded field, in decode order.
    pub provenance: Vec<Provenance>,
}

/// Decodes SWT files against the tables of a [`TableSource`].
///
/// Schema tables are cached per format version for the lifetime of the
/// decoder, so one decoder can be reused across many files (and threads).
#[derive(Debug)]
pub struct TournamentDecoder<S> {
    source: Arc<S>,
    config: DecoderConfig,
    schemas: RwLock<HashMap<u32, Arc<SchemaResolver<S>>>>,
}

impl<S: TableSource> TournamentDecoder<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, DecoderConfig::default())
    }

    pub fn with_config(source: S, config: DecoderConfig) -> Self {
        Self {
            source: Arc::new(source),
            config,
            schemas: RwLock::default(),
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Schema resolver for `version`, created on first use.
    pub fn schema(&self, version: u32) -> Arc<SchemaResolver<S>> {
        if let Some(schema) = self
            .schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&version)
        {
            return Arc::clone(schema);
        }
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        let schema = schemas.entry(version).or_insert_with(|| {
            Arc::new(SchemaResolver::new(Arc::clone(&self.source), Some(version)))
        });
        Arc::clone(schema)
    }

    /// Read and decode the file at `path`.
    ///
    /// Files larger than [`DecoderConfig::max_file_size`] are rejected
    /// before being read.
    pub fn decode_file(&self, path: impl AsRef<Path>) -> Result<Tournament> {
        let file = File::open(path.as_ref())?;
        let size = file.metadata()?.len();
        let limit = self.config.max_file_size;
        if size > limit {
            return Err(Error::FileTooLarge { size, limit });
        }
        let mut bytes = Vec::new();
        file.take(limit).read_to_end(&mut bytes)?;
        self.decode(&bytes)
    }

    /// Decode an in-memory file.
    pub fn decode(&self, bytes: &[u8]) -> Result<Tournament> {
        if bytes.is_empty() {
            return Err(Error::EmptyInput);
        }
        let version = format_version(bytes);
        let schema = self.schema(version);
        let regions = RegionDecoder::new(&*schema);
        log::debug!("format version {version}, {} bytes", bytes.len());

        let header = regions.decode(bytes, HEADER_PART, None)?;
        let counts = HeaderCounts::from_header(&header);
        let profile = match counts.multiplier {
            Some(multiplier) => {
                let constants = schema.constants(STRUCTURE_PART)?;
                LayoutProfile::from_constants(&constants, multiplier)?
            }
            None => {
                log::warn!("header has no round multiplier, using legacy layout constants");
                LayoutProfile::LEGACY
            }
        };
        let layout = Layout::plan(&counts, &profile);
        log::debug!("{counts:?} -> {layout:?}");
        let truncated = layout.end() > bytes.len();
        let present = if truncated {
            log::warn!(
                "layout needs {} bytes, file has {}; decoding the records present",
                layout.end(),
                bytes.len()
            );
            layout.clamp(bytes.len())
        } else {
            layout
        };

        let DecodedRegion {
            fields: header,
            mut provenance,
        } = header;
        let teams = present
            .team_cards
            .map(|section| RecordSet::decode(regions, bytes, EntityKind::Team, &section))
            .transpose()?;
        let players = RecordSet::decode(regions, bytes, EntityKind::Player, &present.player_cards)?;

        let team_fixtures = match (&teams, present.team_fixtures) {
            (Some(teams), Some(section)) => {
                FixtureSet::resolve(regions, bytes, teams, &section, counts.rounds)?
            }
            _ => FixtureSet::default(),
        };
        let player_fixtures = match present.player_fixtures {
            Some(section) => {
                FixtureSet::resolve(regions, bytes, &players, &section, counts.rounds)?
            }
            None => FixtureSet::default(),
        };

        if let Some(teams) = &teams {
            provenance.extend_from_slice(&teams.provenance);
        }
        provenance.extend(players.provenance);
        provenance.extend(team_fixtures.provenance);
        provenance.extend(player_fixtures.provenance);

        Ok(Tournament {
            version,
            header,
            counts,
            layout,
            players: players.records,
            teams: teams.map(|t| t.records),
            player_fixtures: player_fixtures.fixtures,
            team_fixtures: team_fixtures.fixtures,
            skipped_slots: team_fixtures.skipped + player_fixtures.skipped,
            truncated,
            provenance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MemorySource;

    #[test]
    fn version_bytes_are_reversed() {
        let mut bytes = vec![0u8; 0x263];
        bytes[0x261] = 0x05;
        bytes[0x262] = 0x01;
        assert_eq!(format_version(&bytes), 0x0105);
        assert_eq!(format_version(&bytes[..0x100]), 0);
    }

    #[test]
    fn empty_input_is_an_error() {
        let decoder = TournamentDecoder::new(MemorySource::new());
        assert!(matches!(decoder.decode(&[]), Err(Error::EmptyInput)));
    }

    #[test]
    fn missing_header_table_is_fatal() {
        let decoder = TournamentDecoder::new(MemorySource::new());
        assert!(matches!(
            decoder.decode(&[1, 2, 3]),
            Err(Error::MissingTable(part)) if part == HEADER_PART
        ));
    }

    #[test]
    fn schemas_are_shared_per_version() {
        let decoder = TournamentDecoder::new(MemorySource::new());
        assert!(Arc::ptr_eq(&decoder.schema(261), &decoder.schema(261)));
        assert!(!Arc::ptr_eq(&decoder.schema(261), &decoder.schema(262)));
        assert_eq!(decoder.schema(261).variants()[0], "-v261");
    }

    #[test]
    fn config_builder() {
        let config = DecoderConfig::new().with_max_file_size(10);
        assert_eq!(config.max_file_size, 10);
        assert_eq!(DecoderConfig::default().max_file_size, 16 << 20);
    }
}
