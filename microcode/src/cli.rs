use clap::Parser;

#[derive(Parser)]
#[command(name = "genrom")]
#[command(version = "0.1.0")]
#[command(about = "Compiles a microcode table into opcode, state and control ROM images", long_about = None)]
pub(crate) struct Cli {
    /// Input file ("-" reads stdin)
    #[arg(short, long, default_value = "input.dat")]
    pub(crate) input: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub(crate) output: Option<String>,
}
