//! redcheck command line entry point.
//!
//! ```text
//! redcheck <URI> [-H 'Name: value']... [--descend] [--check NAME]... [--save]
//! redcheck --load <ID>
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use redcheck::active_check::CheckKind;
use redcheck::config::loader::load_or_default;
use redcheck::notes::Subject;
use redcheck::observability::{logging, metrics};
use redcheck::{Analyzer, CheckRequest, ResourceCheckResult, SnapshotStore};

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "redcheck")]
#[command(about = "Check an HTTP resource for protocol problems", long_about = None)]
struct Cli {
    /// Resource to check
    #[arg(required_unless_present = "load")]
    uri: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extra request header, as 'Name: value'
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Also check resources linked from the page
    #[arg(short, long)]
    descend: bool,

    /// Only run these active checks (etag-validate, lm-validate, range)
    #[arg(long = "check")]
    checks: Vec<CheckKind>,

    /// Save the result and print its id
    #[arg(long)]
    save: bool,

    /// Print a saved result instead of checking
    #[arg(long, conflicts_with = "uri")]
    load: Option<String>,

    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("'{}' is not 'Name: value'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("'{}' has no header name", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);
    tracing::debug!("redcheck v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr)?;
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let store = SnapshotStore::new(&config.storage.save_dir);

    let result = match (&cli.load, cli.uri) {
        (Some(id), _) => store.load(id)?,
        (None, Some(uri)) => {
            let mut request = CheckRequest::new(uri).descend(cli.descend);
            request.headers = cli.headers;
            if !cli.checks.is_empty() {
                request = request.only(cli.checks);
            }
            Analyzer::new(config)?.check(request).await
        }
        (None, None) => return Err("a URI or --load is required".into()),
    };

    match cli.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        Format::Text => print_text(&result, 0),
    }

    if cli.save && cli.load.is_none() {
        let id = store.save(&result)?;
        println!("saved: {}", id);
    }

    Ok(())
}

fn print_text(result: &ResourceCheckResult, indent: usize) {
    let pad = "  ".repeat(indent);
    let response = &result.exchange.response;

    match (&response.error, response.status) {
        (Some(error), _) => println!("{}{} [{}]", pad, result.uri, error),
        (None, Some(status)) => println!("{}{} {} {}", pad, result.uri, status, response.reason),
        (None, None) => println!("{}{}", pad, result.uri),
    }

    let mut subjects: Vec<&Subject> = response.notes.iter().map(|n| &n.subject).collect();
    subjects.sort();
    subjects.dedup();
    for subject in subjects {
        println!("{}  {}", pad, subject);
        for note in response.notes.notes_for(subject) {
            println!("{}    [{}] {}", pad, note.level().as_str(), note.render());
        }
    }

    for child in result.children.values() {
        print_text(child, indent + 1);
    }
}
