use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser as ClapParser;

use loxide::error::LoxError;
use loxide::lox::Lox;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Script to execute; omit to start the interactive prompt.
    scripts: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Cli = Cli::parse();

    match args.scripts.as_slice() {
        [] => run_prompt()?,

        [script] => run_file(script)?,

        _ => {
            println!("Usage: loxide [script]");
            std::process::exit(64);
        }
    }

    Ok(())
}

fn run_file(path: &PathBuf) -> anyhow::Result<()> {
    let mut buf: Vec<u8> = Vec::new();
    let mut reader: BufReader<File> = BufReader::new(File::open(path)?);
    reader.read_to_end(&mut buf)?;

    let source: String = String::from_utf8(buf).map_err(LoxError::from)?;

    let mut lox = Lox::new(io::stdout());
    lox.run(&source);

    if lox.had_compile_error() {
        std::process::exit(65);
    }
    if lox.had_runtime_error() {
        std::process::exit(70);
    }

    Ok(())
}

fn run_prompt() -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut lox = Lox::new(io::stdout());
    let mut line: String = String::new();

    loop {
        print!(":> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            // EOF ends the session normally.
            break;
        }

        lox.run(&line);
        lox.clear_compile_error();
    }

    Ok(())
}
