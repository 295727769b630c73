use std::env;

use swtkit::Result;
use swtkit::fields::FieldKey;
use swtkit::schema::DirSource;
use swtkit::swt::TournamentDecoder;

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let schema_dir = args.next().unwrap_or_else(|| "definitions".to_owned());
    let file = args.next().unwrap_or_else(|| "tournament.swt".to_owned());

    let decoder = TournamentDecoder::new(DirSource::new(schema_dir));
    let tournament = decoder.decode_file(&file)?;

    println!("format version: {}", tournament.version);
    println!(
        "rounds: {}, players: {}, teams: {}",
        tournament.counts.rounds,
        tournament.players.len(),
        tournament.teams.as_ref().map_or(0, |t| t.len())
    );

    for (id, card) in &tournament.players {
        let name = card.text(FieldKey::PlayerName);
        let opponents: Vec<String> = tournament
            .player_fixtures
            .get(id)
            .map(|rounds| {
                rounds
                    .iter()
                    .map(|(round, fixture)| format!("{round}:{}", fixture.opponent_label))
                    .collect()
            })
            .unwrap_or_default();
        println!("{id:>4}  {name:<30} {}", opponents.join("  "));
    }

    if tournament.truncated {
        println!("file is shorter than its header describes");
    }
    if tournament.skipped_slots > 0 {
        println!("skipped fixture slots: {}", tournament.skipped_slots);
    }

    Ok(())
}
