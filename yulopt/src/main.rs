//! Yul optimizer CLI

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use yulopt::dialect::EvmDialect;
use yulopt::error::report_error;
use yulopt::opt::LoadForwarding;
use yulopt::smt::{LinearSolver, Solver, Z3Solver};
use yulopt::{CompileError, Result};

#[derive(Parser)]
#[command(name = "yulopt", version, about = "SMT-backed Yul memory optimizer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run memory load forwarding and print the optimized program
    Optimize {
        /// Source file to optimize
        file: PathBuf,
        /// Solver backend for disjointness proofs
        #[arg(long, value_enum, default_value = "builtin")]
        solver: SolverChoice,
        /// Path to the z3 binary
        #[arg(long, default_value = "z3")]
        z3_path: String,
        /// Per-query solver timeout in milliseconds
        #[arg(long, default_value_t = 10_000)]
        timeout: u64,
    },
    /// Parse and dump AST (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SolverChoice {
    Builtin,
    Z3,
}

fn main() {
    let cli = Cli::parse();

    let (file, result) = match cli.command {
        Command::Optimize {
            file,
            solver,
            z3_path,
            timeout,
        } => {
            let result = optimize_file(&file, solver, &z3_path, timeout);
            (file, result)
        }
        Command::Parse { file } => {
            let result = parse_file(&file);
            (file, result)
        }
        Command::Tokens { file } => {
            let result = tokenize_file(&file);
            (file, result)
        }
    };

    if let Err(error) = result {
        let filename = file.display().to_string();
        let source = std::fs::read_to_string(&file).unwrap_or_default();
        report_error(&filename, &source, &error);
        std::process::exit(1);
    }
}

fn read_source(path: &PathBuf) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|error| CompileError::io_error(format!("{}: {error}", path.display())))
}

fn optimize_file(
    path: &PathBuf,
    solver: SolverChoice,
    z3_path: &str,
    timeout: u64,
) -> Result<()> {
    let source = read_source(path)?;
    let tokens = yulopt::lexer::tokenize(&source)?;
    let mut block = yulopt::parser::parse(&source, tokens)?;

    if !yulopt::analysis::has_unique_names(&block) {
        return Err(CompileError::analysis(
            "input must have globally unique variable names",
        ));
    }

    let solver: Box<dyn Solver> = match solver {
        SolverChoice::Builtin => Box::new(LinearSolver::new()),
        SolverChoice::Z3 => {
            let z3 = Z3Solver::with_path(z3_path).with_timeout(timeout);
            if !z3.is_available() {
                return Err(CompileError::io_error(format!(
                    "z3 binary not found at '{z3_path}'"
                )));
            }
            Box::new(z3)
        }
    };

    let dialect = EvmDialect::new();
    LoadForwarding::run_with_solver(&dialect, &mut block, solver);

    println!("{block}");
    Ok(())
}

fn parse_file(path: &PathBuf) -> Result<()> {
    let source = read_source(path)?;
    let tokens = yulopt::lexer::tokenize(&source)?;
    let block = yulopt::parser::parse(&source, tokens)?;

    let json = serde_json::to_string_pretty(&block)
        .map_err(|error| CompileError::io_error(error.to_string()))?;
    println!("{json}");
    Ok(())
}

fn tokenize_file(path: &PathBuf) -> Result<()> {
    let source = read_source(path)?;

    let tokens = yulopt::lexer::tokenize(&source)?;
    for (token, span) in &tokens {
        println!("{:?} @ {}..{}", token, span.start, span.end);
    }
    Ok(())
}
