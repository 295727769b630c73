//! **swtkit** - a schema-driven decoder for Swiss-system chess tournament
//! (SWT) files.
//!
//! The byte layout is not hard-coded. External, versioned schema tables map
//! byte ranges to types and labels, and the decoder uses counts read from
//! the file's own header to find the variable-length record sections.
//!
//! # Modules
//! | Module | Role |
//! |--------|------|
//! | [`value`]  | byte slice + type tag → typed value |
//! | [`schema`] | versioned field / selection tables with a load-once cache |
//! | [`region`] | field table applied to a byte window, with provenance |
//! | [`swt`]    | layout planning, cards, fixtures, and the whole-file decoder |
//! | [`fields`] | symbolic names for the fields the pipeline consumes |
//!
//! # Example
//! ```no_run
//! use swtkit::schema::DirSource;
//! use swtkit::swt::TournamentDecoder;
//!
//! let decoder = TournamentDecoder::new(DirSource::new("definitions"));
//! let tournament = decoder.decode_file("open-2012.swt")?;
//! for (id, card) in &tournament.players {
//!     println!("{id}: {:?}", card.fields);
//! }
//! # Ok::<(), swtkit::Error>(())
//! ```

pub mod error;
pub mod fields;
pub mod region;
pub mod schema;
pub mod swt;
pub(crate) mod utils;
pub mod value;

pub use error::{Error, Result};
pub use swt::{DecoderConfig, Tournament, TournamentDecoder};
pub use value::Value;
