//! Command-line front end: run selectors or a JSON mapping against an HTML
//! or XML file and print what they extract.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use treematch::parser;
use treematch::{Context, Extractor, Matcher, ParseMode, PathSpec, Value};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// treematch -- extract data from HTML and XML documents.
///
/// Every match of the first pattern is printed; each further pattern
/// collects all of its matches below every match of the one before it.
/// With `-s` the patterns are chained from the first match onward instead.
#[derive(Parser, Debug)]
#[command(name = "treematch", version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Document to read (use `-` for stdin).
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    file: String,

    /// Selector to evaluate; repeat to descend further.
    #[arg(
        short = 'p',
        long = "pattern",
        value_name = "PATTERN",
        required_unless_present = "mapping"
    )]
    patterns: Vec<String>,

    /// Single mode: first match only, patterns chained.
    #[arg(short = 's', long)]
    single: bool,

    /// JSON file describing a record layout to extract.
    #[arg(long, value_name = "FILE", conflicts_with = "patterns")]
    mapping: Option<PathBuf>,

    /// Patterns are CSS selectors instead of `XPath`.
    #[arg(long)]
    css: bool,

    // -- Input options -----------------------------------------------------
    /// Parse the input as XML.
    #[arg(long, conflicts_with = "html")]
    xml: bool,

    /// Parse the input as HTML (the default).
    #[arg(long)]
    html: bool,

    /// Bind a namespace prefix for use in patterns.
    #[arg(long = "ns", value_name = "PREFIX=URI", value_parser = parse_namespace)]
    namespaces: Vec<(String, String)>,

    /// How matched nodes become text: text, oneline or normalize.
    #[arg(long, value_name = "NAME", default_value = "text")]
    extractor: Extractor,

    // -- Output options ----------------------------------------------------
    /// Print the result as pretty JSON.
    #[arg(long, conflicts_with = "dump")]
    json: bool,

    /// Print the result's debug representation.
    #[arg(long)]
    dump: bool,

    /// Log document loading and queries to stderr.
    #[arg(short, long)]
    verbose: bool,
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

const EXIT_SUCCESS: u8 = 0;
const EXIT_INPUT_ERROR: u8 = 1;
const EXIT_EVAL_ERROR: u8 = 2;

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    ExitCode::from(run(&cli))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> u8 {
    let matcher = match build_matcher(cli) {
        Ok(m) => m,
        Err(msg) => {
            eprintln!("treematch: {msg}");
            return EXIT_INPUT_ERROR;
        }
    };

    let input = match read_input(&cli.file) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("{}: failed to read: {e}", cli.file);
            return EXIT_INPUT_ERROR;
        }
    };

    let mode = if cli.xml { ParseMode::Xml } else { ParseMode::Html };
    let doc = match parser::parse(&input, mode) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{}: {e}", cli.file);
            return EXIT_INPUT_ERROR;
        }
    };

    let context = build_context(cli);
    let start = Instant::now();
    let value = match matcher.invoke(doc.root(), Some(&context)) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("{}: {e}", cli.file);
            return EXIT_EVAL_ERROR;
        }
    };
    debug!(elapsed = ?start.elapsed(), kind = value.kind(), "evaluation finished");

    write_output(cli, &value)
}

// ---------------------------------------------------------------------------
// Matcher and context construction
// ---------------------------------------------------------------------------

fn build_matcher(cli: &Cli) -> Result<Matcher, String> {
    if let Some(path) = &cli.mapping {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("{}: failed to read: {e}", path.display()))?;
        let json: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| format!("{}: invalid JSON: {e}", path.display()))?;
        let spec = PathSpec::try_from(json).map_err(|e| format!("{}: {e}", path.display()))?;
        return Ok(Matcher::single(spec));
    }

    if cli.single {
        let (first, rest) = cli
            .patterns
            .split_first()
            .ok_or_else(|| "no pattern given".to_string())?;
        return Ok(Matcher::chain(
            first.as_str(),
            rest.iter().map(|p| PathSpec::from(p.as_str())),
        ));
    }

    // Innermost pattern first: `-p a -p b -p c` is `multi_each(a, multi_each(b, multi(c)))`.
    let mut patterns = cli.patterns.iter().rev();
    let last = patterns.next().ok_or_else(|| "no pattern given".to_string())?;
    Ok(patterns.fold(Matcher::multi(last.as_str()), |inner, pattern| {
        Matcher::multi_each(pattern.as_str(), inner)
    }))
}

fn build_context(cli: &Cli) -> Context {
    let base = if cli.css { Context::css() } else { Context::new() };
    base.with_namespaces(cli.namespaces.iter().cloned())
        .with_extractor(cli.extractor.clone())
}

fn parse_namespace(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((prefix, uri)) if !prefix.is_empty() && !uri.is_empty() => {
            Ok((prefix.to_string(), uri.to_string()))
        }
        _ => Err(format!("expected PREFIX=URI, got `{arg}`")),
    }
}

// ---------------------------------------------------------------------------
// Input and output
// ---------------------------------------------------------------------------

/// Reads input from a file or stdin (when filename is `-`).
fn read_input(filename: &str) -> io::Result<Vec<u8>> {
    if filename == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(filename)
    }
}

fn write_output(cli: &Cli, value: &Value<'_>) -> u8 {
    if cli.json {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("treematch: cannot serialize result: {e}");
                return EXIT_EVAL_ERROR;
            }
        }
    } else if cli.dump {
        println!("{value:#?}");
    } else {
        match value {
            Value::List(items) => items.iter().for_each(|item| println!("{item}")),
            Value::Record(entries) => entries.values().for_each(|item| println!("{item}")),
            scalar => println!("{scalar}"),
        }
    }
    EXIT_SUCCESS
}
