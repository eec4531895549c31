// SPDX-License-Identifier: MIT OR Apache-2.0

//! Commands typed on stdin

use kgsgo_network::ChannelId;
use thiserror::Error;

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `join <id>`
    Join(ChannelId),
    /// `unjoin <id>`
    Unjoin(ChannelId),
    /// `say <id> <text>`
    Say {
        /// Channel
        channel_id: ChannelId,
        /// Text
        text: String,
    },
    /// `move <id> <point|pass>`; the point is resolved against the board size
    Move {
        /// Game channel
        channel_id: ChannelId,
        /// Point as typed, e.g. `D4`
        point: String,
    },
    /// `undo <id>`
    Undo(ChannelId),
    /// `allow-undo <id>`
    AllowUndo(ChannelId),
    /// `deny-undo <id>`
    DenyUndo(ChannelId),
    /// `prev <id>`
    Prev(ChannelId),
    /// `next <id>`
    Next(ChannelId),
    /// `live <id>`
    Live(ChannelId),
    /// `show <id>`
    Show(ChannelId),
    /// `help`
    Help,
    /// `quit`
    Quit,
}

/// Why a line could not be parsed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Nothing typed
    #[error("empty command")]
    Empty,
    /// First word is not a command
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    /// A required argument is missing
    #[error("`{command}` needs {argument}")]
    Missing {
        /// Command name
        command: &'static str,
        /// What is missing
        argument: &'static str,
    },
    /// Channel id is not a number
    #[error("`{0}` is not a channel id")]
    BadChannel(String),
}

/// Usage summary printed by `help`
pub const HELP: &str = "\
join <id>              join a room, game or challenge
unjoin <id>            leave a channel
say <id> <text>        chat in a channel
move <id> <point>      play a move such as D4, or pass
undo <id>              ask to take back your last move
allow-undo <id>        grant the opponent's undo
deny-undo <id>         refuse the opponent's undo
prev|next|live <id>    browse a game record
show <id>              print a game
quit                   log out and exit";

impl Command {
    /// Parse one input line
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim_start();

        let command: &'static str = match word {
            "" => return Err(CommandError::Empty),
            "help" | "?" => return Ok(Command::Help),
            "quit" | "exit" => return Ok(Command::Quit),
            "join" => "join",
            "unjoin" | "leave" => "unjoin",
            "say" => "say",
            "move" | "play" => "move",
            "undo" => "undo",
            "allow-undo" => "allow-undo",
            "deny-undo" => "deny-undo",
            "prev" => "prev",
            "next" => "next",
            "live" => "live",
            "show" => "show",
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        let (channel, rest) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        if channel.is_empty() {
            return Err(CommandError::Missing {
                command,
                argument: "a channel id",
            });
        }
        let channel_id: ChannelId = channel
            .parse()
            .map_err(|_| CommandError::BadChannel(channel.to_string()))?;
        let rest = rest.trim();

        Ok(match command {
            "join" => Command::Join(channel_id),
            "unjoin" => Command::Unjoin(channel_id),
            "say" if rest.is_empty() => {
                return Err(CommandError::Missing {
                    command,
                    argument: "some text",
                })
            }
            "say" => Command::Say {
                channel_id,
                text: rest.to_string(),
            },
            "move" if rest.is_empty() => {
                return Err(CommandError::Missing {
                    command,
                    argument: "a point or `pass`",
                })
            }
            "move" => Command::Move {
                channel_id,
                point: rest.to_string(),
            },
            "undo" => Command::Undo(channel_id),
            "allow-undo" => Command::AllowUndo(channel_id),
            "deny-undo" => Command::DenyUndo(channel_id),
            "prev" => Command::Prev(channel_id),
            "next" => Command::Next(channel_id),
            "live" => Command::Live(channel_id),
            _ => Command::Show(channel_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_channel_commands() {
        assert_eq!(Command::parse("join 12"), Ok(Command::Join(12)));
        assert_eq!(Command::parse("  leave 12 "), Ok(Command::Unjoin(12)));
        assert_eq!(Command::parse("undo 7"), Ok(Command::Undo(7)));
        assert_eq!(Command::parse("live 7"), Ok(Command::Live(7)));
        assert_eq!(Command::parse("quit"), Ok(Command::Quit));
    }

    #[test]
    fn keeps_chat_text_whole() {
        assert_eq!(
            Command::parse("say 3 hello  there, all"),
            Ok(Command::Say {
                channel_id: 3,
                text: "hello  there, all".into()
            })
        );
    }

    #[test]
    fn move_keeps_point_text() {
        assert_eq!(
            Command::parse("move 40 D4"),
            Ok(Command::Move {
                channel_id: 40,
                point: "D4".into()
            })
        );
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("dance 3"),
            Err(CommandError::Unknown("dance".into()))
        );
        assert_eq!(
            Command::parse("join"),
            Err(CommandError::Missing {
                command: "join",
                argument: "a channel id"
            })
        );
        assert_eq!(
            Command::parse("join lobby"),
            Err(CommandError::BadChannel("lobby".into()))
        );
        assert!(matches!(
            Command::parse("say 3"),
            Err(CommandError::Missing { command: "say", .. })
        ));
    }
}
