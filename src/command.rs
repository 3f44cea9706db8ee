//! Free-text chat commands understood by the dispatcher.

use crate::common::GridError;
use crate::coordinate::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartSession,
    /// Shot with its parsed target, or the parse error to report back.
    Hit(Result<Coordinate, GridError>),
    Leaderboard,
    MyStatistics,
}

impl Command {
    /// Recognise a command. Verbs are case-insensitive and may carry a leading
    /// `/` and a trailing `@botname`. Returns `None` for anything else.
    pub fn parse(text: &str) -> Option<Command> {
        let text = text.trim();
        let (verb, rest) = match text.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (text, ""),
        };
        let verb = verb.strip_prefix('/').unwrap_or(verb);
        let verb = verb.split('@').next().unwrap_or(verb).to_ascii_lowercase();
        match verb.as_str() {
            "start-session" | "startseabattle" => Some(Command::StartSession),
            "hit" => Some(Command::Hit(rest.parse())),
            "leaderboard" => Some(Command::Leaderboard),
            "my-statistics" => Some(Command::MyStatistics),
            _ => None,
        }
    }
}
