// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slash command parsing.
//!
//! Commands arrive as plain text through the transport; parsing here keeps
//! the engine independent of any platform command framework. Unknown
//! commands parse to `None` and are ignored upstream; known commands with
//! malformed arguments parse to [`Parsed::Malformed`] so the dispatcher can
//! reply with usage.

use roundup_core::types::ParticipantId;

/// A recognized operator or participant command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Greeting plus the start-form button. Open to everyone.
    Start,
    /// Command summary. Open to everyone.
    Help,
    /// Explicitly rotate to a new week. Any admin.
    NewWeek,
    /// Export the active week's sheet as CSV. Any admin.
    ExportCsv,
    /// List all known weeks with their sheet links. Any admin.
    ListWeeks,
    /// Show a participant's latest submission. Any admin.
    Answers(ParticipantId),
    /// Send a message to every known participant. Any admin.
    Broadcast(String),
    /// Add a sub-admin. Main admin only.
    AddAdmin(ParticipantId),
    /// Remove a sub-admin. Main admin only.
    RemoveAdmin(ParticipantId),
    /// List the roster. Any admin.
    Admins,
    /// Inspect or mutate the question catalog.
    Questions(CatalogAction),
}

/// Sub-commands of `/questions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogAction {
    /// List the catalog. Any admin.
    List,
    /// Append a question. Main admin only.
    Add(String),
    /// Remove the question at this 1-based position. Main admin only.
    Remove(usize),
}

/// Outcome of parsing a slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Command(Command),
    /// A known command with missing or malformed arguments; the payload is
    /// the usage line to show the sender.
    Malformed(&'static str),
}

/// Parses a text message into a command.
///
/// Returns `None` when the text is not a slash command at all, or names a
/// command this bot does not know (those are silently ignored, matching
/// how a platform dispatcher without a registered handler behaves).
pub fn parse(text: &str) -> Option<Parsed> {
    let text = text.trim();
    let mut parts = text.splitn(2, char::is_whitespace);
    let head = parts.next()?;
    let rest = parts.next().map(str::trim).unwrap_or("");

    let command = head.strip_prefix('/')?;
    // Group chats suffix the addressee: "/start@roundup_bot".
    let command = command.split('@').next().unwrap_or(command);

    let parsed = match command {
        "start" => Parsed::Command(Command::Start),
        "help" => Parsed::Command(Command::Help),
        "newweek" => Parsed::Command(Command::NewWeek),
        "exportcsv" => Parsed::Command(Command::ExportCsv),
        "listweeks" => Parsed::Command(Command::ListWeeks),
        "answers" => match parse_id(rest) {
            Some(id) => Parsed::Command(Command::Answers(id)),
            None => Parsed::Malformed("Usage: /answers <user id>"),
        },
        "broadcast" => {
            if rest.is_empty() {
                Parsed::Malformed("Usage: /broadcast <message>")
            } else {
                Parsed::Command(Command::Broadcast(rest.to_string()))
            }
        }
        "addadmin" => match parse_id(rest) {
            Some(id) => Parsed::Command(Command::AddAdmin(id)),
            None => Parsed::Malformed("Usage: /addadmin <user id>"),
        },
        "removeadmin" => match parse_id(rest) {
            Some(id) => Parsed::Command(Command::RemoveAdmin(id)),
            None => Parsed::Malformed("Usage: /removeadmin <user id>"),
        },
        "admins" => Parsed::Command(Command::Admins),
        "questions" => parse_questions(rest),
        _ => return None,
    };

    Some(parsed)
}

/// A user id argument: a single non-empty token of digits.
///
/// Ids are numeric on the platform; rejecting anything else keeps a typo'd
/// `/addadmin bob` from silently registering a never-matching admin.
fn parse_id(rest: &str) -> Option<ParticipantId> {
    if !rest.is_empty()
        && !rest.contains(char::is_whitespace)
        && rest.chars().all(|c| c.is_ascii_digit())
    {
        Some(ParticipantId(rest.to_string()))
    } else {
        None
    }
}

fn parse_questions(rest: &str) -> Parsed {
    const USAGE: &str =
        "Usage: /questions | /questions add <question> | /questions remove <number>";

    if rest.is_empty() {
        return Parsed::Command(Command::Questions(CatalogAction::List));
    }

    let mut parts = rest.splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or("");
    let arg = parts.next().map(str::trim).unwrap_or("");

    match verb {
        "add" if !arg.is_empty() => {
            Parsed::Command(Command::Questions(CatalogAction::Add(arg.to_string())))
        }
        "remove" => match arg.parse::<usize>() {
            Ok(n) if n >= 1 => Parsed::Command(Command::Questions(CatalogAction::Remove(n))),
            _ => Parsed::Malformed(USAGE),
        },
        _ => Parsed::Malformed(USAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(text: &str) -> Command {
        match parse(text) {
            Some(Parsed::Command(c)) => c,
            other => panic!("expected command for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn parses_bare_commands() {
        assert_eq!(cmd("/start"), Command::Start);
        assert_eq!(cmd("/help"), Command::Help);
        assert_eq!(cmd("/newweek"), Command::NewWeek);
        assert_eq!(cmd("/exportcsv"), Command::ExportCsv);
        assert_eq!(cmd("/listweeks"), Command::ListWeeks);
        assert_eq!(cmd("/admins"), Command::Admins);
    }

    #[test]
    fn strips_bot_mention_suffix() {
        assert_eq!(cmd("/start@roundup_bot"), Command::Start);
    }

    #[test]
    fn parses_argument_commands() {
        assert_eq!(
            cmd("/answers 12345"),
            Command::Answers(ParticipantId("12345".into()))
        );
        assert_eq!(
            cmd("/addadmin 67"),
            Command::AddAdmin(ParticipantId("67".into()))
        );
        assert_eq!(
            cmd("/broadcast Please submit your roundup today!"),
            Command::Broadcast("Please submit your roundup today!".into())
        );
    }

    #[test]
    fn parses_questions_subcommands() {
        assert_eq!(cmd("/questions"), Command::Questions(CatalogAction::List));
        assert_eq!(
            cmd("/questions add 5) What did you learn?"),
            Command::Questions(CatalogAction::Add("5) What did you learn?".into()))
        );
        assert_eq!(
            cmd("/questions remove 2"),
            Command::Questions(CatalogAction::Remove(2))
        );
    }

    #[test]
    fn malformed_arguments_yield_usage() {
        assert!(matches!(parse("/answers"), Some(Parsed::Malformed(_))));
        assert!(matches!(parse("/answers bob"), Some(Parsed::Malformed(_))));
        assert!(matches!(parse("/addadmin"), Some(Parsed::Malformed(_))));
        assert!(matches!(parse("/broadcast"), Some(Parsed::Malformed(_))));
        assert!(matches!(parse("/questions remove zero"), Some(Parsed::Malformed(_))));
        assert!(matches!(parse("/questions remove 0"), Some(Parsed::Malformed(_))));
        assert!(matches!(parse("/questions add"), Some(Parsed::Malformed(_))));
    }

    #[test]
    fn unknown_and_non_commands_are_none() {
        assert_eq!(parse("hello there"), None);
        assert_eq!(parse("/frobnicate"), None);
        assert_eq!(parse(""), None);
    }
}
