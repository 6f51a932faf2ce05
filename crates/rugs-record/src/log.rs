//! Line-delimited game log reading.

use std::io::{self, BufRead};

use tracing::{debug, warn};

use crate::{ParseError, game::GameRecord};

/// Games read from a log, in file order, with the number of rejected lines.
#[derive(Debug, Clone, Default)]
pub struct GameLog {
    pub games: Vec<GameRecord>,
    /// Lines that were not valid JSON objects.
    pub skipped_lines: usize,
}

/// Reads every game from a line-delimited JSON log.
///
/// Blank lines and empty objects are ignored. Lines that fail to parse, including
/// lines that are not UTF-8, are logged and counted in [`GameLog::skipped_lines`]; only
/// I/O failures abort the read.
pub fn read_game_log<R>(reader: R) -> io::Result<GameLog>
where
    R: BufRead,
{
    let mut log = GameLog::default();
    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let line_number = index + 1;
        let parsed = std::str::from_utf8(&line)
            .map_err(ParseError::NotUtf8)
            .map(str::trim);
        if matches!(parsed, Ok("" | "{}")) {
            debug!(line = line_number, "ignoring empty log line");
            continue;
        }
        match parsed.and_then(GameRecord::parse_line) {
            Ok(game) => log.games.push(game),
            Err(err) => {
                warn!(line = line_number, error = %err, "skipping unparsable log line");
                log.skipped_lines += 1;
            }
        }
    }
    Ok(log)
}
