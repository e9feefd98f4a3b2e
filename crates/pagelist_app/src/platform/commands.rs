use std::str::FromStr;

use clap::{CommandFactory, Parser, Subcommand};

use crate::repository::{FolderId, PatientId};

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Reload the first page, keeping what is shown until it arrives
    #[command(visible_alias = "r")]
    Refresh,
    /// Next patient page, or older messages in a chat
    #[command(visible_alias = "m")]
    More,
    /// Drop what is loaded and start over
    Restart,
    /// Give up on the request in flight
    Stop,
    /// Filter patients by folder id, or `all`
    #[command(visible_alias = "f")]
    Folder {
        #[arg(default_value = "all")]
        folder: FolderFilter,
    },
    /// Open a loaded patient's chat
    #[command(visible_alias = "p")]
    Pick { id: PatientId },
    /// Scroll the chat back
    #[command(visible_alias = "o")]
    Older,
    /// Scroll the chat forward
    #[command(visible_alias = "n")]
    Newer,
    /// Post to the open chat
    #[command(visible_alias = "s")]
    Send {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Leave the chat
    #[command(visible_alias = "b")]
    Back,
    /// Show this list
    #[command(visible_alias = "?")]
    Help,
    /// Save and exit
    #[command(visible_aliases = ["q", "exit"])]
    Quit,
}

#[derive(Debug, Parser)]
#[command(
    name = "pagelist",
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    help_template = "commands:\n{subcommands}"
)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

/// `None` selects every folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FolderFilter(pub Option<FolderId>);

impl FromStr for FolderFilter {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.eq_ignore_ascii_case("all") {
            return Ok(Self(None));
        }
        text.parse()
            .map(|id| Self(Some(id)))
            .map_err(|_| format!("expected a folder id or 'all', got '{text}'"))
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace().map(str::to_string);
        let verb = words.next().map(|word| word.to_ascii_lowercase());
        Line::try_parse_from(verb.into_iter().chain(words))
            .map(|parsed| parsed.command)
            .map_err(|err| err.to_string().trim_end().to_string())
    }
}

pub fn help() -> String {
    Line::command().render_help().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_arguments() {
        assert_eq!(
            Command::parse("folder 2"),
            Ok(Command::Folder {
                folder: FolderFilter(Some(2))
            })
        );
        assert_eq!(
            Command::parse("folder"),
            Ok(Command::Folder {
                folder: FolderFilter(None)
            })
        );
        assert_eq!(Command::parse(" PICK 14 "), Ok(Command::Pick { id: 14 }));
        assert_eq!(
            Command::parse("send see you  tomorrow"),
            Ok(Command::Send {
                text: vec!["see".into(), "you".into(), "tomorrow".into()]
            })
        );
        assert_eq!(Command::parse("q"), Ok(Command::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Command::parse("pick someone").is_err());
        assert!(Command::parse("folder cardiology").is_err());
        assert!(Command::parse("more 3").is_err());
        assert!(Command::parse("send").is_err());
        assert!(Command::parse("dance").is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        Line::command().debug_assert();
    }

    #[test]
    fn help_lists_commands() {
        let text = help();
        assert!(text.contains("refresh"));
        assert!(text.contains("Open a loaded patient's chat"));
    }
}
