//! Shell completions generation.
//!
//! `periphery-installer completions <shell>` writes a completion script to
//! stdout.

use clap::CommandFactory;
use std::io::Write;

use crate::cli::args::{Cli, CompletionsArgs};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

const BIN_NAME: &str = "periphery-installer";

/// The completions command implementation.
pub struct CompletionsCommand {
    args: CompletionsArgs,
}

impl CompletionsCommand {
    /// Create a new completions command.
    pub fn new(args: CompletionsArgs) -> Self {
        Self { args }
    }

    fn render(&self, out: &mut dyn Write) {
        clap_complete::generate(self.args.shell, &mut Cli::command(), BIN_NAME, out);
    }
}

impl Command for CompletionsCommand {
    fn execute(&self, _ui: &mut dyn UserInterface) -> crate::error::Result<CommandResult> {
        self.render(&mut std::io::stdout());
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap_complete::Shell;

    fn completions_for(shell: Shell) -> String {
        let mut buf = Vec::new();
        CompletionsCommand::new(CompletionsArgs { shell }).render(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn bash_completes_subcommands() {
        let output = completions_for(Shell::Bash);
        assert!(output.contains("periphery-installer"));
        assert!(output.contains("probe"));
    }

    #[test]
    fn zsh_mentions_binary() {
        assert!(completions_for(Shell::Zsh).contains("periphery-installer"));
    }

    #[test]
    fn fish_lists_global_flags() {
        let output = completions_for(Shell::Fish);
        assert!(output.contains("production"));
    }
}
