//! `shapekit` CLI — safe JSON parsing, nullish pruning, and enum lookups from the
//! command line.
//!
//! ## Usage
//!
//! ```sh
//! # Parse untrusted JSON, dropping __proto__/constructor members (stdin → stdout)
//! echo '{"a":1,"__proto__":{"admin":true}}' | shapekit parse
//!
//! # Parse and prune nulls, pretty-printed with 2 spaces
//! shapekit parse --prune --indent 2 -i data.json -o clean.json
//!
//! # Prune nulls only
//! echo '{"a":null,"b":[1,null]}' | shapekit prune
//!
//! # Enum lookups against a JSON object of name → value
//! shapekit enum keys -i status.json
//! shapekit enum key 2 -i status.json
//! shapekit enum value Active -i status.json
//! ```
//!
//! Set `RUST_LOG=debug` (or pass `-v`) to see which members were dropped.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use shapekit::enums::{self, EnumObject, EnumValue};
use shapekit::json::{self, Space};
use std::io::{self, Read};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "shapekit",
    version,
    about = "Safe JSON parsing, nullish pruning and enum lookups"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log dropped members and other decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse JSON, stripping __proto__ and constructor members at every depth
    Parse {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Also remove null members and array elements
        #[arg(long)]
        prune: bool,
        /// Indent output with this many spaces (compact if omitted)
        #[arg(long)]
        indent: Option<usize>,
    },
    /// Parse JSON safely and remove null members and array elements
    Prune {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Indent output with this many spaces (compact if omitted)
        #[arg(long)]
        indent: Option<usize>,
    },
    /// Inspect an enum mapping given as a JSON object of name → string/number
    Enum {
        #[command(subcommand)]
        query: EnumQuery,
        /// Input file with the enum mapping (reads from stdin if omitted)
        #[arg(short, long, global = true)]
        input: Option<String>,
    },
}

#[derive(Subcommand)]
enum EnumQuery {
    /// Declared member names
    Keys,
    /// Declared member values
    Values,
    /// Declared [name, value] pairs
    Entries,
    /// Name of the first member holding VALUE
    Key { value: String },
    /// Value stored under KEY
    Value { key: String },
    /// VALUE itself if it is a member
    Parse { value: String },
    /// Whether KEY is a declared member name
    HasKey { key: String },
    /// Whether VALUE is a declared member value
    HasValue { value: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Parse {
            input,
            output,
            prune,
            indent,
        } => {
            let text = read_input(input.as_deref())?;
            let mut value = json::parse(&text).context("Failed to parse JSON")?;
            if prune {
                shapekit::remove_nullish_values(&mut value);
            }
            write_output(output.as_deref(), &render(&value, indent)?)?;
        }
        Commands::Prune {
            input,
            output,
            indent,
        } => {
            let text = read_input(input.as_deref())?;
            let value = json::parse(&text).context("Failed to parse JSON")?;
            let value = shapekit::without_nullish_values(value);
            write_output(output.as_deref(), &render(&value, indent)?)?;
        }
        Commands::Enum { query, input } => {
            let text = read_input(input.as_deref())?;
            let mapping = json::parse(&text).context("Failed to parse JSON")?;
            let enum_obj =
                EnumObject::try_from(mapping).context("Input is not an enum mapping")?;

            let (answer, found) = run_enum_query(&enum_obj, &query)?;
            println!("{}", answer);
            if !found {
                process::exit(1);
            }
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Evaluate an enum query. Returns the answer as JSON text and whether the lookup matched.
fn run_enum_query(enum_obj: &EnumObject, query: &EnumQuery) -> Result<(String, bool)> {
    let answer = match query {
        EnumQuery::Keys => (json::stringify(&enums::get_keys(enum_obj))?, true),
        EnumQuery::Values => (json::stringify(&enums::get_values(enum_obj))?, true),
        EnumQuery::Entries => (json::stringify(&enums::get_entries(enum_obj))?, true),
        EnumQuery::Key { value } => {
            let key = enums::get_key(enum_obj, parse_member(value));
            (json::stringify(&key)?, key.is_some())
        }
        EnumQuery::Value { key } => {
            let value = enums::get_value(enum_obj, key);
            (json::stringify(&value)?, value.is_some())
        }
        EnumQuery::Parse { value } => {
            let member = enums::parse(enum_obj, parse_member(value));
            (json::stringify(&member)?, member.is_some())
        }
        EnumQuery::HasKey { key } => {
            let has = enums::has_key(enum_obj, key);
            (json::stringify(&has)?, has)
        }
        EnumQuery::HasValue { value } => {
            let has = enums::has_value(enum_obj, parse_member(value));
            (json::stringify(&has)?, has)
        }
    };
    tracing::debug!(found = answer.1, "enum query evaluated");
    Ok(answer)
}

/// Read a command-line member value: JSON numbers and quoted strings are taken
/// literally, anything else is a bare string.
///
/// - `2` → number 2
/// - `"2"` → string "2"
/// - `active` → string "active"
fn parse_member(raw: &str) -> EnumValue {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Number(n)) => n.as_f64().map_or_else(|| EnumValue::from(raw), EnumValue::from),
        Ok(Value::String(s)) => EnumValue::String(s),
        _ => EnumValue::from(raw),
    }
}

fn render(value: &Value, indent: Option<usize>) -> Result<String> {
    json::stringify_with(value, None, indent.map(Space::Count))
        .context("Failed to serialize JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
