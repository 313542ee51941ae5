use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use siteswap_core::{all_transitions_of_length, Jif, JifOptions, Siteswap, State};
use siteswap_notation::{
    format, parse, parse_khss, parse_siteswap, parse_stack, parse_vanilla, ParseError,
};
use std::fs;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "siteswap")]
#[command(about = "Siteswap juggling notation validator and toolkit", long_about = None)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a pattern can be juggled
    Validate {
        /// Pattern to validate
        pattern: String,
    },
    /// Show statistics and the state of a pattern
    Info {
        pattern: String,
    },
    /// Normalize the notation of a pattern
    Fmt {
        /// Pattern to format
        pattern: String,
    },
    /// Generate AST for a pattern
    Ast {
        /// Pattern to parse
        pattern: String,

        /// Output format (json or debug)
        #[arg(short, long, default_value = "debug")]
        output_format: String,
    },
    /// Mirror a pattern left to right
    Flip {
        pattern: String,
    },
    /// Shortest transition from the ground state into a pattern
    Entry {
        pattern: String,

        /// Start from the synchronous ground state
        #[arg(long)]
        sync: bool,

        /// Do not consider mirrored states
        #[arg(long)]
        no_flip: bool,
    },
    /// Shortest transition from a pattern back to the ground state
    Exit {
        pattern: String,

        /// End in the synchronous ground state
        #[arg(long)]
        sync: bool,

        /// Do not consider mirrored states
        #[arg(long)]
        no_flip: bool,
    },
    /// List every transition of a given length between two patterns
    Transitions {
        /// Pattern whose state the transitions start from
        from: String,

        /// Pattern whose state the transitions end in
        to: String,

        /// Number of beats in each transition
        #[arg(short, long)]
        length: usize,

        /// Stop after this many transitions
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Convert a pattern to JIF
    Jif {
        pattern: String,

        /// JSON file with JIF options
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Read a pattern from a JIF file
    FromJif {
        /// Path to .jif file
        file: String,
    },
    /// Stack notation of a vanilla pattern
    Stack {
        pattern: String,
    },
    /// Vanilla pattern from stack notation
    FromStack {
        stack: String,
    },
    /// Share a vanilla pattern between several jugglers
    Khss {
        pattern: String,

        /// Total number of hands
        #[arg(long, default_value = "4")]
        hands: usize,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("✗ {}", message);
    std::process::exit(1);
}

/// The error, then the pattern with the offending characters underlined
fn describe_parse_error(pattern: &str, error: &ParseError) -> String {
    match error.span() {
        Some(span) => format!(
            "Parse error: {}\n  {}\n  {}",
            error,
            pattern,
            span.underline(pattern)
        ),
        None => format!("Parse error: {}", error),
    }
}

fn parse_failure(pattern: &str, error: &ParseError) -> ! {
    fail(describe_parse_error(pattern, error))
}

/// Parse a pattern, exiting on syntax errors or when it cannot be juggled
fn valid_siteswap(pattern: &str) -> Siteswap {
    match parse_siteswap(pattern) {
        Ok(ss) if ss.is_valid() => ss,
        Ok(ss) => fail(format_args!("Invalid pattern: {}", ss.error_message())),
        Err(e) => parse_failure(pattern, &e),
    }
}

fn print_info(ss: &Siteswap) {
    println!("Pattern:   {}", ss);
    println!("Jugglers:  {}", ss.num_jugglers());
    if ss.num_jugglers() > 1 {
        let delays: Vec<String> = ss.delays().iter().map(|d| d.to_string()).collect();
        println!("Delays:    {}", delays.join(", "));
    }
    println!("Period:    {}", ss.period());
    println!("Objects:   {}", ss.num_objects());
    println!("Max:       {}", ss.max_height());
    println!("Multiplex: {}", ss.max_multiplex());
    println!("Sync:      {}", ss.has_sync());
    println!("Passing:   {}", ss.has_pass());
    println!("State:     {}", ss.state());
    println!("Ground:    {}", ss.state().is_ground());
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate { pattern } => {
            match parse_siteswap(&pattern) {
                Ok(ss) if ss.is_valid() => {
                    println!("✓ Pattern is valid");
                    Ok(())
                }
                Ok(ss) => fail(ss.error_message()),
                Err(e) => parse_failure(&pattern, &e),
            }
        }
        Commands::Info { pattern } => {
            print_info(&valid_siteswap(&pattern));
            Ok(())
        }
        Commands::Fmt { pattern } => {
            match parse(&pattern) {
                Ok(ast) => {
                    println!("{}", format(&ast));
                    Ok(())
                }
                Err(e) => parse_failure(&pattern, &e),
            }
        }
        Commands::Ast { pattern, output_format } => {
            match parse(&pattern) {
                Ok(ast) => {
                    match output_format.as_str() {
                        "json" => {
                            let json = serde_json::to_string_pretty(&ast)?;
                            println!("{}", json);
                        }
                        _ => {
                            println!("{:#?}", ast);
                        }
                    }
                    Ok(())
                }
                Err(e) => parse_failure(&pattern, &e),
            }
        }
        Commands::Flip { pattern } => {
            println!("{}", valid_siteswap(&pattern).flip());
            Ok(())
        }
        Commands::Entry { pattern, sync, no_flip } => {
            let ss = valid_siteswap(&pattern);
            let entry = ss.state().entry(None, sync, !no_flip)?;
            println!("{}", entry);
            Ok(())
        }
        Commands::Exit { pattern, sync, no_flip } => {
            let ss = valid_siteswap(&pattern);
            let exit = ss.state().exit(None, sync, !no_flip)?;
            println!("{}", exit);
            Ok(())
        }
        Commands::Transitions { from, to, length, limit } => {
            let from: State = valid_siteswap(&from).state().clone();
            let to: State = valid_siteswap(&to).state().clone();
            let transitions = all_transitions_of_length(&from, &to, length)?;
            let mut count = 0;
            for transition in transitions.take(limit.unwrap_or(usize::MAX)) {
                println!("{}", transition);
                count += 1;
            }
            if count == 0 {
                println!("No transitions of length {}", length);
            }
            Ok(())
        }
        Commands::Jif { pattern, config } => {
            let ss = valid_siteswap(&pattern);
            let options = match config {
                Some(path) => {
                    let text = fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read config '{}'", path))?;
                    serde_json::from_str::<JifOptions>(&text)
                        .with_context(|| format!("Invalid config '{}'", path))?
                }
                None => JifOptions::default(),
            };
            let jif = ss.to_jif_with(&options)?;
            println!("{}", serde_json::to_string_pretty(&jif)?);
            Ok(())
        }
        Commands::FromJif { file } => {
            let text = fs::read_to_string(&file)
                .map_err(|e| anyhow::anyhow!("Failed to read file '{}': {}", file, e))?;
            let jif: Jif = serde_json::from_str(&text)
                .with_context(|| format!("Invalid JIF in '{}'", file))?;
            match Siteswap::from_jif(&jif) {
                Ok(ss) if ss.is_valid() => println!("{}", ss),
                Ok(ss) => fail(format_args!("{} ({})", ss, ss.error_message())),
                Err(e) => fail(e),
            }
            Ok(())
        }
        Commands::Stack { pattern } => {
            let vanilla = match parse_vanilla(&pattern) {
                Ok(v) => v,
                Err(e) => parse_failure(&pattern, &e),
            };
            if !vanilla.is_valid() {
                fail(format_args!("Invalid pattern: {}", pattern));
            }
            println!("{}", vanilla.to_stack_string()?);
            Ok(())
        }
        Commands::FromStack { stack } => {
            match parse_stack(&stack) {
                Ok(vanilla) => {
                    println!("{}", vanilla);
                    Ok(())
                }
                Err(e) => parse_failure(&stack, &e),
            }
        }
        Commands::Khss { pattern, hands } => {
            match parse_khss(&pattern, hands) {
                Ok(ss) => {
                    print_info(&ss);
                    if !ss.is_valid() {
                        fail(ss.error_message());
                    }
                    Ok(())
                }
                Err(e) => fail(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use siteswap_core::VanillaSiteswap;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_transitions_args() {
        let cli = Cli::try_parse_from(["siteswap", "transitions", "3", "51", "--length", "2", "--limit", "5"])
            .unwrap();
        match cli.command {
            Commands::Transitions { from, to, length, limit } => {
                assert_eq!(from, "3");
                assert_eq!(to, "51");
                assert_eq!(length, 2);
                assert_eq!(limit, Some(5));
            }
            _ => panic!("expected transitions"),
        }
    }

    #[test]
    fn test_valid_siteswap_returns_pattern() {
        assert_eq!(valid_siteswap("531").num_objects(), 3);
    }

    #[test]
    fn test_parse_errors_point_at_the_input() {
        let error = parse("531#").unwrap_err();
        assert_eq!(
            describe_parse_error("531#", &error),
            format!("Parse error: {}\n  531#\n     ^", error)
        );
        let eof = parse("").unwrap_err();
        assert_eq!(describe_parse_error("", &eof), format!("Parse error: {}", eof));
    }

    #[test]
    fn test_vanilla_helpers() {
        let vanilla: VanillaSiteswap = parse_vanilla("531").unwrap();
        assert_eq!(vanilla.to_stack_string().unwrap(), "321");
    }
}
