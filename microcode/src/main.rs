mod builder;
mod cli;
mod ds;
mod emitter;
mod error;
mod parser;

use std::io::{self, BufRead, BufReader, BufWriter, Write};

use clap::Parser;
use cli::Cli;
use error::RomError;
use parser::ParserState;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    run(&cli)?;
    Ok(())
}

fn run(cli: &Cli) -> Result<(), RomError> {
    let reader: Box<dyn BufRead> = if cli.input == "-" {
        log::info!("Reading microcode from stdin");
        Box::new(BufReader::new(io::stdin()))
    } else {
        log::info!("Reading microcode from '{}'", cli.input);
        Box::new(BufReader::new(std::fs::File::open(&cli.input)?))
    };

    let mut parser = ParserState::new();
    parser.parse(reader)?;
    let program = parser.into_program();
    let roms = builder::build(&program)?;
    log::info!(
        "Compiled {} microcode steps into {} control words",
        program.steps.len(),
        roms.controls.pairs.len()
    );

    let mut writer: Box<dyn Write> = match &cli.output {
        Some(filename) => {
            log::info!("Writing ROM tables to '{}'", filename);
            Box::new(BufWriter::new(std::fs::File::create(filename)?))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    };
    emitter::emit(&roms, &mut writer)?;

    Ok(())
}
