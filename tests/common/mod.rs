//! Synthetic SWT files and matching schema tables.
//!
//! Extended layout used throughout:
//! ```text
//! [0x00] header (32 bytes)
//! [0x20] player fixtures, team fixtures (4 bytes per slot)
//!        player cards, team cards (16 bytes each)
//! ```

#![allow(dead_code)]

use swtkit::schema::MemorySource;

pub const GENERAL: &str = "\
# begin\tend\ttype\tcontent
00\t\tint\t1
01\t\tboo\t3
02\t\tint\t4
03\t\tboo\t35
04\t\tint\t80
05\t\tint\t33
06\t15\tasc\tTitle
";

/// Header table of files that predate the round multiplier.
pub const GENERAL_LEGACY: &str = "\
00\t\tint\t1
01\t\tboo\t3
02\t\tint\t4
03\t\tboo\t35
04\t\tint\t80
06\t15\tasc\tTitle
";

pub const STRUCTURE: &str = "\
# layout constants
start:fixtures_players\t32
length:pairing\t4
length:player\t16
length:team\t16
";

pub const PLAYER: &str = "\
00\t0B\tasc\t2000
0C\t\tbin\t2020
0D\t0E\tdat\tBorn
0F\t\tboo\tActive
";

pub const TEAM: &str = "\
00\t0B\tasc\t1000
0C\t\tbin\t1018
";

pub const INDIVIDUAL_PAIRINGS: &str = "\
00\t\tbin\t4001
01\t\tsel\tColor
02\t03\tinb\tBoard
";

pub const TEAM_PAIRINGS: &str = "\
00\t\tbin\t3002
01\t03\tint\tPoints
";

pub const COLOR_SELECTION: &str = "01\tw\n02\tb\n";

/// Every part a decode may ask for, stored as `(part, text)`.
pub fn tables() -> Vec<(&'static str, &'static str)> {
    vec![
        ("general", GENERAL),
        ("structure", STRUCTURE),
        ("player", PLAYER),
        ("team", TEAM),
        ("individual-pairings", INDIVIDUAL_PAIRINGS),
        ("team-pairings", TEAM_PAIRINGS),
        ("color-selection", COLOR_SELECTION),
    ]
}

pub fn source() -> MemorySource {
    tables()
        .into_iter()
        .fold(MemorySource::new(), |source, (part, text)| source.with("", part, text))
}

/// Header counts of a synthetic file.
#[derive(Debug, Clone, Copy)]
pub struct Header {
    pub rounds: u8,
    pub fixed: bool,
    pub players: u8,
    pub team: bool,
    pub teams: u8,
    pub multiplier: u8,
}

impl Header {
    pub fn bytes(&self, title: &str) -> Vec<u8> {
        let mut out = vec![0u8; 32];
        out[0] = self.rounds;
        out[1] = flag(self.fixed);
        out[2] = self.players;
        out[3] = flag(self.team);
        out[4] = self.teams;
        out[5] = self.multiplier;
        out[6..6 + title.len()].copy_from_slice(title.as_bytes());
        out
    }
}

fn flag(set: bool) -> u8 {
    if set { 0xFF } else { 0x00 }
}

/// 16-byte player card.
pub fn player_card(name: &str, id: u8, born_days: u16, active: bool) -> Vec<u8> {
    let mut out = vec![0u8; 16];
    out[..name.len()].copy_from_slice(name.as_bytes());
    out[0x0C] = id;
    out[0x0D..=0x0E].copy_from_slice(&born_days.to_le_bytes());
    out[0x0F] = flag(active);
    out
}

/// 16-byte team card.
pub fn team_card(name: &str, id: u8) -> Vec<u8> {
    let mut out = vec![0u8; 16];
    out[..name.len()].copy_from_slice(name.as_bytes());
    out[0x0C] = id;
    out
}

/// 4-byte individual pairing slot.
pub fn pairing(opponent: u8, color: u8, board: u16) -> Vec<u8> {
    let mut out = vec![opponent, color];
    out.extend_from_slice(&board.to_le_bytes());
    out
}

/// 4-byte team pairing slot.
pub fn team_pairing(opponent: u8, points: u8) -> Vec<u8> {
    vec![opponent, 0, 0, points]
}

/// Two players, one round, each paired against the other.
pub fn two_player_file() -> Vec<u8> {
    let header = Header {
        rounds: 1,
        fixed: true,
        players: 2,
        team: false,
        teams: 0,
        multiplier: 1,
    };
    [
        header.bytes("Club Open"),
        pairing(0x02, 0x01, 1),
        pairing(0x01, 0x02, 1),
        player_card("Anna", 0x01, 2, true),
        player_card("Boris", 0x02, 0, false),
    ]
    .concat()
}
