use clap::{Parser as ClapParser, Subcommand};
use sprig_lang::cli::{self, CliError, QueryOptions};
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(ClapParser)]
#[command(name = "sprig")]
#[command(about = "Sprig - an indented-tree document format with path queries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a document
    Check {
        /// Document file (reads from stdin if not provided)
        file: Option<PathBuf>,
    },

    /// Run a path query against a document, starting at its root
    Query {
        /// The path query to run
        query: String,

        /// Document file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Emit matches as JSON instead of tree source
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Convert a document to JSON
    Convert {
        /// Document file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { file } => run_check(file),
        Commands::Query {
            query,
            file,
            json,
            pretty,
        } => run_query(query, file, json, pretty),
        Commands::Convert { file, pretty } => run_convert(file, pretty),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_input(file: Option<PathBuf>) -> Result<String, CliError> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path).map_err(CliError::Io)?),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(CliError::Io)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}

fn run_check(file: Option<PathBuf>) -> Result<(), CliError> {
    let input = read_input(file)?;
    cli::execute_check(&input)?;
    println!("Document is valid");
    Ok(())
}

fn run_query(
    query: String,
    file: Option<PathBuf>,
    json: bool,
    pretty: bool,
) -> Result<(), CliError> {
    let input = read_input(file)?;
    let options = QueryOptions {
        query,
        input,
        json,
        pretty,
    };
    print!("{}", cli::execute_query(&options)?);
    Ok(())
}

fn run_convert(file: Option<PathBuf>, pretty: bool) -> Result<(), CliError> {
    let input = read_input(file)?;
    println!("{}", cli::execute_convert(&input, pretty)?);
    Ok(())
}
