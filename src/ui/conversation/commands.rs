use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Show or hide the help panel
    Help,
    /// Exit the application
    Bye,
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Help => "show or hide this help",
            SlashCommand::Bye => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Parse a slash command from user input. Unknown commands are `None` and
/// are sent as ordinary queries.
pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let rest = input.trim().strip_prefix('/')?;
    let head = rest.split_whitespace().next()?;

    SlashCommand::from_str(head)
        .ok()
        .or_else(|| match head.to_lowercase().as_str() {
            "q" | "quit" | "exit" => Some(SlashCommand::Bye),
            "h" | "?" => Some(SlashCommand::Help),
            _ => None,
        })
}

/// Help text for the keys and commands available in the chat view
pub fn get_help_text() -> String {
    let mut help = String::from("Commands:\n");
    for command in SlashCommand::iter() {
        help.push_str(&format!("  /{} - {}\n", command.command(), command.description()));
    }

    help.push_str("\nKeys:\n");
    help.push_str("  Enter - send the question\n");
    help.push_str("  PgUp/PgDn, Up/Down - scroll the conversation\n");
    help.push_str("  Esc, Ctrl+C - quit\n");
    help.push_str("\nAliases: /q, /quit and /exit for /bye");

    help
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!(parse_slash_command("/help"), Some(SlashCommand::Help));
        assert_eq!(parse_slash_command("  /bye now"), Some(SlashCommand::Bye));
        assert_eq!(parse_slash_command("/quit"), Some(SlashCommand::Bye));
        assert_eq!(parse_slash_command("/Q"), Some(SlashCommand::Bye));
    }

    #[test]
    fn ordinary_text_is_not_a_command() {
        assert_eq!(parse_slash_command("what is /dev/null rated for?"), None);
        assert_eq!(parse_slash_command("/unknown"), None);
        assert_eq!(parse_slash_command("/"), None);
    }

    #[test]
    fn help_lists_every_command() {
        let help = get_help_text();
        for command in SlashCommand::iter() {
            assert!(help.contains(&format!("/{}", command.command())));
        }
    }
}
