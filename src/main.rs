use std::process::ExitCode;

use clap::Parser;
use nestargs::args::{Args, OutputFormat};
use nestargs::error::NestError;
use nestargs::namespace::Namespace;
use nestargs::schema::errors::SchemaError;
use nestargs::schema::load_schema;
use nestargs::visuals;
use serde::Serialize;
use tracing::Level;

#[derive(Serialize)]
struct Report<'a> {
    result: &'a Namespace,
    unknown: &'a [String],
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(SchemaError::Nest(NestError::Parse(err))) => err.exit(),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), SchemaError> {
    let schema = load_schema(&args.schema)?;
    let root = schema.build()?;

    if args.keys {
        visuals::print_keys(&root);
        return Ok(());
    }

    let argv = std::iter::once(schema.name.clone()).chain(args.argv.iter().cloned());
    let (namespace, unknown) = if args.known {
        root.try_parse_known_from(argv)?
    } else {
        (root.try_parse_from(argv)?, Vec::new())
    };
    tracing::debug!("parsed {} top-level entries", namespace.len());

    match args.format {
        OutputFormat::Json => {
            let report = Report {
                result: &namespace,
                unknown: &unknown,
            };
            let text = serde_json::to_string_pretty(&report)
                .map_err(|e| SchemaError::FileError(format!("failed to render result: {e}")))?;
            println!("{text}");
        }
        OutputFormat::Table => {
            visuals::print_result(&namespace);
            visuals::print_unknown(&unknown);
        }
    }
    Ok(())
}
