use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox as lox;

use lox::ast_printer::AstPrinter;
use lox::config::Config;
use lox::error::{Diagnostic, Reporter};
use lox::parser::Parser;
use lox::repl::{Command, LineBuffer};
use lox::scanner::{scan_tokens, Scanner};
use lox::{Lox, Status};

#[derive(ClapParser, Debug)]
#[command(version, about = "Rox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,

    /// Emit tokens and diagnostics as JSON lines
    #[arg(long, global = true)]
    json: bool,

    /// Make `#expr` print an inspection block
    #[arg(long, global = true)]
    introspect: bool,

    /// Halt any single loop running longer than this many milliseconds
    #[arg(long, global = true, value_name = "MS")]
    loop_timeout_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize { filename: Option<PathBuf> },

    /// Parses input from a file as a program and prints its AST
    Parse { filename: Option<PathBuf> },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Rox program
    Run { filename: Option<PathBuf> },

    /// Starts an interactive prompt
    Repl,
}

impl Cli {
    fn config(&self) -> Config {
        Config::default()
            .with_introspection(self.introspect)
            .with_loop_timeout(self.loop_timeout_ms.map(Duration::from_millis))
            .with_echo(!self.json)
    }
}

/// Reads the contents of a file into a String
fn read_file(filename: PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = String::new();

    let bytes = reader
        .read_to_string(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Print everything collected so far as JSON lines on stderr.
fn dump_json(diagnostics: &[Diagnostic]) -> Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    for diagnostic in diagnostics {
        let line = serde_json::to_string(diagnostic).context("Failed to encode diagnostic")?;
        writeln!(out, "{}", line)?;
    }

    Ok(())
}

/// Static failures exit 65, runtime failures 70.
fn exit_code(diagnostics: &[Diagnostic]) -> i32 {
    if diagnostics.iter().all(|d| d.label == "Runtime Error") {
        70
    } else {
        65
    }
}

fn tokenize(source: &str, json: bool) -> Result<i32> {
    let mut tokenized = true;

    for token in Scanner::new(source) {
        match token {
            Ok(token) => {
                debug!("Scanned token: {}", token);

                if json {
                    println!(
                        "{}",
                        serde_json::to_string(&token).context("Failed to encode token")?
                    );
                } else {
                    println!("{}", token);
                }
            }

            Err(e) => {
                tokenized = false;

                debug!("Tokenization debug: {}", e);

                if json {
                    if let Some(diagnostic) = e.diagnostic() {
                        dump_json(std::slice::from_ref(diagnostic))?;
                    }
                } else {
                    eprintln!("{}", e);
                }
            }
        }
    }

    Ok(if tokenized { 0 } else { 65 })
}

fn parse(source: &str, json: bool) -> Result<i32> {
    let reporter = Reporter::new(!json);

    let tokens = match scan_tokens(source) {
        Ok(tokens) => tokens,
        Err(errors) => {
            reporter.report_all(errors);
            if json {
                dump_json(&reporter.take())?;
            }
            return Ok(65);
        }
    };

    match Parser::new(&tokens).parse() {
        Ok(statements) => {
            info!("Parsed {} statements", statements.len());

            for stmt in &statements {
                println!("{}", AstPrinter::print_stmt(stmt));
            }

            Ok(0)
        }

        Err(errors) => {
            reporter.report_all(errors);
            if json {
                dump_json(&reporter.take())?;
            }
            Ok(65)
        }
    }
}

fn evaluate(source: &str, config: Config, json: bool) -> Result<i32> {
    let mut session = Lox::new(config);

    let code = match session.evaluate_expression(source) {
        Some(value) => {
            debug!("Evaluated to: {}", value);
            println!("{}", value);
            0
        }
        None => exit_code(&session.reporter().snapshot()),
    };

    if json {
        dump_json(&session.reporter().take())?;
    }

    Ok(code)
}

fn run(source: &str, config: Config, json: bool) -> Result<i32> {
    let mut session = Lox::new(config);

    let code = match session.execute(source) {
        Status::Completed(_) => {
            info!("Program executed successfully");
            0
        }
        Status::StaticErrors => 65,
        Status::Halted => 70,
    };

    io::stdout().flush()?;

    if json {
        dump_json(&session.reporter().take())?;
    }

    Ok(code)
}

fn repl(config: Config, json: bool) -> Result<i32> {
    const PROMPT: &str = "> ";
    const CONTINUATION: &str = "   ";

    let mut session = Lox::new(config);
    let mut buffer = LineBuffer::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{}", if buffer.is_continuing() { CONTINUATION } else { PROMPT });
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line.context("Failed to read from stdin")?,
            None => break,
        };

        match buffer.push(&line) {
            Command::Quit => break,

            Command::Clear => session.clear(),

            Command::Incomplete => {}

            Command::Rejected(reason) => eprintln!("{}", reason),

            Command::Source(source) => {
                if let Some(trace) = session.run(&source) {
                    if !trace.is_empty() {
                        println!("{}", trace);
                    }
                }

                if json {
                    dump_json(&session.reporter().take())?;
                } else {
                    session.reporter().take();
                }
            }
        }
    }

    Ok(0)
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();
    }

    info!("CLI arguments: {:?}", args);

    let config: Config = args.config();
    let json: bool = args.json;

    let code = match args.commands {
        Commands::Repl => repl(config, json)?,

        Commands::Tokenize {
            filename: Some(filename),
        } => tokenize(&read_file(filename)?, json)?,

        Commands::Parse {
            filename: Some(filename),
        } => parse(&read_file(filename)?, json)?,

        Commands::Evaluate {
            filename: Some(filename),
        } => evaluate(&read_file(filename)?, config, json)?,

        Commands::Run {
            filename: Some(filename),
        } => run(&read_file(filename)?, config, json)?,

        _ => {
            info!("No filepath provided");
            println!("No input filepath was provided. Exiting...");
            0
        }
    };

    if code != 0 {
        debug!("Exiting with code {}", code);
        std::process::exit(code);
    }

    Ok(())
}
