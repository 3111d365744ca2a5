use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
}

// Top-level CLI parser for the nestargs binary.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Parse a command line against a nested command definition"
)]
pub struct Args {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Command definition file (toml/yaml/json)"
    )]
    pub schema: String,

    #[arg(
        short,
        long,
        value_enum,
        default_value_t = OutputFormat::Json,
        help = "How to print the parsed result"
    )]
    pub format: OutputFormat,

    #[arg(long, help = "Collect unrecognised tokens instead of failing")]
    pub known: bool,

    #[arg(long, help = "Print the flat keys of every command instead of parsing")]
    pub keys: bool,

    #[arg(short, long, help = "Enable debug logging on stderr")]
    pub debug: bool,

    #[arg(
        last = true,
        value_name = "ARGS",
        help = "Command line to parse, program name excluded"
    )]
    pub argv: Vec<String>,
}
