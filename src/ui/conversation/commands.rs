use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Queue one or more local images
    Attach,
    /// Discard a queued image
    Detach,
    /// Chat with a merchant
    Store,
    /// Start over with the assistant
    New,
    /// Show the user profile
    Profile,
    /// Show help
    Help,
    /// Exit the application
    Bye,
}

pub fn command_entries() -> Vec<CommandEntry> {
    SlashCommand::iter()
        .map(|command| CommandEntry {
            command,
            keyword: command.command(),
            description: command.description(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    pub argument: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    pub command: SlashCommand,
    pub keyword: &'static str,
    pub description: &'static str,
}

impl ParsedCommand {
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// Paths given to `/attach`, split on whitespace
    pub fn paths(&self) -> Vec<&str> {
        self.argument()
            .map(|arg| arg.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Zero-based index from the one-based number given to `/detach`
    pub fn attachment_index(&self) -> Option<usize> {
        if self.command != SlashCommand::Detach {
            return None;
        }

        let number = self.argument()?.trim().parse::<usize>().ok()?;
        number.checked_sub(1)
    }
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Attach => "attach images: /attach <path> [path...]",
            SlashCommand::Detach => "remove a pending image: /detach <number>",
            SlashCommand::Store => "chat with a merchant: /store <id or name>",
            SlashCommand::New => "start a new chat with Amy",
            SlashCommand::Profile => "show your profile",
            SlashCommand::Help => "show available commands",
            SlashCommand::Bye => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }

    /// Whether this command can run before a merchant is chosen.
    pub fn available_without_store(self) -> bool {
        !matches!(self, SlashCommand::Attach | SlashCommand::Detach)
    }
}

/// Return all built-in commands in a Vec paired with their command string.
pub fn built_in_slash_commands() -> Vec<(&'static str, SlashCommand)> {
    SlashCommand::iter().map(|c| (c.command(), c)).collect()
}

/// Parse a slash command from user input
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let rest = input.trim_start().strip_prefix('/')?;

    let mut parts = rest.split_whitespace();
    let head = parts.next()?;
    let tail: Vec<&str> = parts.collect();

    let command = SlashCommand::from_str(head).ok().or_else(|| match head.to_lowercase().as_str() {
        "q" | "quit" | "exit" => Some(SlashCommand::Bye),
        "img" | "image" => Some(SlashCommand::Attach),
        "rm" | "remove" => Some(SlashCommand::Detach),
        "s" | "shop" => Some(SlashCommand::Store),
        "reset" | "clear" => Some(SlashCommand::New),
        "me" => Some(SlashCommand::Profile),
        _ => None,
    })?;

    let argument = if tail.is_empty() {
        None
    } else {
        Some(tail.join(" "))
    };

    Some(ParsedCommand { command, argument })
}

/// Get help text for all available commands
pub fn get_help_text() -> String {
    let mut help = String::from("Available commands:\n\n");
    for (command_str, command) in built_in_slash_commands() {
        help.push_str(&format!("/{} - {}\n", command_str, command.description()));
    }

    help.push_str("\nAliases: /q for /bye, /img for /attach, /rm for /detach, /s for /store, /reset for /new");
    help.push_str("\nTab switches between the store list and the composer; Ctrl+B hides the store list.");

    help
}
