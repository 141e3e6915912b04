use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{CommandFactory, Parser as ClapParser, Subcommand};

use wireframe_core::bcrypt::{self, Version as BcryptVersion};
use wireframe_core::output::{format_debug, format_headers_only, format_json};
use wireframe_core::parser::{ParserConfig, RequestParser};
use wireframe_core::router::Pattern;
use wireframe_core::service::ServiceContainer;

/// wireframe-cli — HTTP/1 parser, bcrypt, and router pattern toolkit.
///
/// With no subcommand, reads a raw HTTP request from a file, --raw
/// string, or stdin and prints a structured representation of it.
#[derive(ClapParser)]
#[command(name = "wireframe-cli", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to a file containing a raw HTTP request.
    /// Reads from stdin when neither FILE nor --raw is given.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Raw HTTP request string (escape sequences \r \n \t \\ are expanded).
    #[arg(long)]
    raw: Option<String>,

    /// Output format.
    #[arg(short, long, default_value = "json", value_enum)]
    format: OutputFormat,

    /// Pretty-print JSON output (ignored for other formats).
    #[arg(short, long)]
    pretty: bool,

    /// Maximum allowed decoded body size in bytes.
    #[arg(long, default_value = "10485760")]
    max_body_size: u64,

    /// Maximum number of headers allowed.
    #[arg(long, default_value = "128")]
    max_headers: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Hash or verify a password with bcrypt.
    Bcrypt {
        #[command(subcommand)]
        action: BcryptAction,
    },
    /// Check whether a path matches a route pattern.
    Route {
        /// A route pattern, e.g. `/users/:id`.
        pattern: String,
        /// A concrete request path to test against it.
        path: String,
    },
}

#[derive(Subcommand)]
enum BcryptAction {
    /// Hash a password, printing the resulting `$2b$...` string.
    Hash {
        password: String,
        #[arg(long, default_value = "12")]
        cost: u32,
        #[arg(long, default_value = "2b")]
        version: String,
    },
    /// Verify a password against a stored hash.
    Verify { password: String, hash: String },
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable debug output
    Debug,
    /// Request-line + headers only
    Headers,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Bcrypt { action }) => run_bcrypt(action),
        Some(Command::Route { pattern, path }) => run_route(&pattern, &path),
        None => run_parse(cli),
    }
}

fn run_bcrypt(action: BcryptAction) {
    match action {
        BcryptAction::Hash {
            password,
            cost,
            version,
        } => {
            let version = match version.as_str() {
                "2a" => BcryptVersion::V2a,
                "2b" => BcryptVersion::V2b,
                other => {
                    eprintln!("Unknown bcrypt version '{other}' (expected 2a or 2b)");
                    process::exit(1);
                }
            };
            match bcrypt::hash(&password, cost, version) {
                Ok(hash) => println!("{hash}"),
                Err(e) => {
                    eprintln!("bcrypt error: {e}");
                    process::exit(2);
                }
            }
        }
        BcryptAction::Verify { password, hash } => match bcrypt::compare(&password, &hash) {
            Ok(true) => {
                println!("match");
            }
            Ok(false) => {
                println!("no match");
                process::exit(1);
            }
            Err(e) => {
                eprintln!("bcrypt error: {e}");
                process::exit(2);
            }
        },
    }
}

fn run_route(pattern: &str, path: &str) {
    match Pattern::compile(pattern) {
        Ok(compiled) => match compiled.matches(path) {
            None => {
                println!("no match");
                process::exit(1);
            }
            Some(captures) if captures.is_empty() => println!("match"),
            Some(captures) => {
                println!("match");
                for (name, value) in captures {
                    println!("  {name} = {value}");
                }
            }
        },
        Err(e) => {
            eprintln!("invalid pattern: {e}");
            process::exit(2);
        }
    }
}

fn run_parse(cli: Cli) {
    if cli.file.is_none() && cli.raw.is_none() && std::io::stdin().is_terminal() {
        Cli::command().print_help().ok();
        println!();
        process::exit(0);
    }

    let data = match read_input(&cli) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading input: {e}");
            process::exit(1);
        }
    };

    if data.is_empty() {
        eprintln!("Error: empty input");
        process::exit(1);
    }

    let config = ParserConfig {
        body_limit: cli.max_body_size,
        max_headers_count: cli.max_headers,
        ..ParserConfig::default()
    };

    let services = ServiceContainer::new();
    let prepared = match config.prepare(&services) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            eprintln!("Configuration error: {e}");
            process::exit(2);
        }
    };

    let mut parser = RequestParser::new(prepared);
    if let Err(e) = parser.start() {
        eprintln!("Parse error: {e}");
        process::exit(2);
    }

    let mut offset = 0;
    loop {
        let dst = parser.prepare();
        let remaining = data.len() - offset;
        let n = remaining.min(dst.len());
        dst[..n].copy_from_slice(&data[offset..offset + n]);
        parser.commit(n);
        offset += n;
        if n == 0 {
            parser.commit_eof();
        }

        match parser.parse() {
            Ok(_) if parser.is_complete() => break,
            Ok(_) => {
                if n == 0 {
                    eprintln!("Parse error: incomplete HTTP message");
                    process::exit(2);
                }
            }
            Err(e) => {
                eprintln!("Parse error: {e}");
                process::exit(2);
            }
        }
    }

    let body = parser.pull_body().to_vec();
    let output = match cli.format {
        OutputFormat::Json => format_json(&parser, &body, cli.pretty),
        OutputFormat::Debug => format_debug(&parser, &body),
        OutputFormat::Headers => format_headers_only(&parser),
    };

    print!("{output}");
}

/// Read raw HTTP bytes from --raw, a file, or stdin.
fn read_input(cli: &Cli) -> Result<Vec<u8>, std::io::Error> {
    if let Some(raw) = &cli.raw {
        return Ok(unescape(raw).into_bytes());
    }
    match &cli.file {
        Some(path) => std::fs::read(path),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Expand C-style escape sequences (`\r`, `\n`, `\t`, `\\`) in a string.
///
/// Any other `\X` sequence is kept as-is (both the backslash and `X`).
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('r') => out.push('\r'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
