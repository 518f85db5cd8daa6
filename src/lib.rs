//! togglenote - notes made of collapsible sections, with autosave and undo

pub mod cli;
pub mod domain;
pub mod editor;
pub mod history;
pub mod store;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::Level;

use cli::{
    Cli, Command,
    config::Config,
    handlers::{handle_edit, handle_list, handle_new, handle_remove, handle_show},
};

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load()?;
    let notes_dir = config.notes_dir(cli.dir.as_ref());

    match &cli.command {
        Command::List(args) => handle_list(args, &notes_dir, &config),
        Command::New(args) => handle_new(args, &notes_dir, &config),
        Command::Show(args) => handle_show(args, &notes_dir, &config),
        Command::Remove(args) => handle_remove(args, &notes_dir, &config),
        Command::Edit(args) => handle_edit(args, &notes_dir, &config),
        Command::Completions(args) => {
            clap_complete::generate(
                args.shell,
                &mut Cli::command(),
                "togglenote",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}

/// Sends log output to stderr so it never mixes with command output.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
