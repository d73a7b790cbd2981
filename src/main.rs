use std::io;
use std::path::PathBuf;

use clap::Parser as ClapParser;

use treelox::lox::Lox;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Lox script to execute; starts a REPL when omitted
    scripts: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Cli = Cli::parse();

    let mut lox = Lox::new(io::stdout());

    match args.scripts.as_slice() {
        [] => lox.run_prompt()?,

        [script] => lox.run_file(script)?,

        _ => println!("Usage: treelox [script]"),
    }

    Ok(())
}
