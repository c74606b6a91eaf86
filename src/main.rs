//! periphery-installer CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use periphery_installer::cli::{Cli, CommandDispatcher};
use periphery_installer::shell::is_ci;
use periphery_installer::ui::{create_ui, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// `--debug` forces DEBUG, otherwise `RUST_LOG` wins, otherwise INFO.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("periphery_installer=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("periphery_installer=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("periphery-installer starting with args: {:?}", cli);

    let output_mode = OutputMode::from_flags(cli.verbose, cli.quiet);

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let is_interactive = !cli.non_interactive && !is_ci();
    let mut ui = create_ui(is_interactive, output_mode);

    let project_root = match cli.project.clone().map_or_else(std::env::current_dir, Ok) {
        Ok(path) => path,
        Err(e) => {
            ui.error(&format!("Error: cannot determine the project directory: {}", e));
            return ExitCode::from(1);
        }
    };

    let dispatcher = CommandDispatcher::new(project_root);

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
