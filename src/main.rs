// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, run the command.
// - Returns `anyhow::Result` so any error is printed with its causes and
//   the process exits with a non-zero status.

use clap::Parser;
use imgup::{cli, commands, logging};

fn main() -> anyhow::Result<()> {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            err.print()?;
            std::process::exit(cli::exit_code(&err));
        }
    };
    logging::init(cli.verbose)?;
    commands::run(&cli)
}
