use clap::{ArgAction, Parser, ValueEnum};
use eqeval::symbols::{parse_definition, SymbolTable};
use eqeval::vhdl::{self, Entity};
use eqeval::{sources, Evaluator};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn, Level};

#[derive(Parser)]
#[command(
    name = "eqeval",
    version,
    about = "Evaluate integer equations from VHDL generics and IP-XACT parameters"
)]
struct Cli {
    #[arg(long, env = "EQEVAL_SYMBOLS", help = "YAML file mapping symbol names to expressions")]
    symbols: Option<PathBuf>,

    #[arg(short = 'D', long = "define", value_name = "NAME=EXPR", help = "Define a symbol (repeatable)")]
    defines: Vec<String>,

    #[arg(long, env = "EQEVAL_VHDL", help = "VHDL file or directory whose generics become symbols")]
    vhdl: Option<PathBuf>,

    #[arg(long, help = "Read VHDL file paths from stdin")]
    stdin: bool,

    #[arg(long, help = "Report why an expression is unresolved instead of printing -1")]
    strict: bool,

    #[arg(long, value_enum, default_value_t = Format::Text, help = "Output format for entity listings")]
    format: Format,

    #[arg(short, long, action = ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,

    #[arg(help = "Expressions to evaluate")]
    expressions: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Yaml,
}

#[derive(Serialize)]
struct Listing<'a> {
    file: String,
    entity: &'a Entity,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let entities = load_entities(&cli);

    if cli.expressions.is_empty() {
        if cli.vhdl.is_none() && !cli.stdin {
            eprintln!("Error: No expression provided");
            return ExitCode::from(2);
        }
        return run_listing_mode(&entities, cli.vhdl.as_deref(), cli.format);
    }

    let symbols = match build_symbols(&cli, &entities) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    run_eval_mode(&symbols, &cli.expressions, cli.strict)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_entities(cli: &Cli) -> Vec<(PathBuf, Entity)> {
    let files = if cli.stdin {
        sources::read_paths_from_stdin()
    } else if let Some(path) = &cli.vhdl {
        sources::collect_vhdl_files(path)
    } else {
        Vec::new()
    };

    files
        .into_iter()
        .filter_map(|path| match vhdl::read_entity(&path) {
            Ok(Some(entity)) => Some((path, entity)),
            Ok(None) => {
                debug!(path = %path.display(), "no entity declaration");
                None
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        })
        .collect()
}

/// Symbol file first, then VHDL generics, then `-D` definitions; later
/// sources override earlier names.
fn build_symbols(cli: &Cli, entities: &[(PathBuf, Entity)]) -> eqeval::Result<SymbolTable> {
    let mut symbols = match &cli.symbols {
        Some(path) => SymbolTable::load_yaml(path)?,
        None => SymbolTable::new(),
    };

    for (_, entity) in entities {
        symbols.extend(entity.symbols().iter());
    }

    for definition in &cli.defines {
        let (name, expression) = parse_definition(definition)?;
        symbols.insert(name, expression);
    }

    debug!(symbols = symbols.len(), "symbol table ready");
    Ok(symbols)
}

fn run_eval_mode(symbols: &SymbolTable, expressions: &[String], strict: bool) -> ExitCode {
    let eval = Evaluator::new(symbols);

    if !strict {
        for expression in expressions {
            println!("{}", eval.evaluate(expression));
        }
        return ExitCode::from(0);
    }

    let mut failed = false;
    for expression in expressions {
        match eval.try_evaluate(expression) {
            Ok(value) => println!("{}", value),
            Err(e) => {
                failed = true;
                eprintln!("error: {}: {}", expression, e);
            }
        }
    }

    if failed {
        ExitCode::from(1)
    } else {
        ExitCode::from(0)
    }
}

fn run_listing_mode(entities: &[(PathBuf, Entity)], root: Option<&Path>, format: Format) -> ExitCode {
    if entities.is_empty() {
        return ExitCode::from(1);
    }

    let display = |path: &Path| {
        root.and_then(|r| path.strip_prefix(r).ok())
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(path)
            .display()
            .to_string()
    };

    match format {
        Format::Text => {
            for (path, entity) in entities {
                println!("{}:", display(path));
                for line in vhdl::format_entity(entity) {
                    println!("  {}", line);
                }
            }
        }
        Format::Yaml => {
            let listings: Vec<Listing> = entities
                .iter()
                .map(|(path, entity)| Listing {
                    file: display(path),
                    entity,
                })
                .collect();
            match serde_yaml::to_string(&listings) {
                Ok(yaml) => print!("{}", yaml),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::from(2);
                }
            }
        }
    }

    ExitCode::from(0)
}
