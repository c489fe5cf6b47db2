mod render;

use clap::{Parser, Subcommand, ValueEnum};
use log::{LevelFilter, info};
use std::path::{Path, PathBuf};
use tabula_solver::{ConstraintOp, LpProblem, Method, Solver};

#[derive(Parser)]
#[command(name = "tabula")]
#[command(about = "Tableau simplex solver for linear programs", long_about = None)]
struct Cli {
    /// Print solver progress (repeat for pivot-level detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem and print every tableau along the way
    Solve {
        /// Problem file (.json, anything else is read as the text format)
        file: PathBuf,
        /// Tableau construction method
        #[arg(short, long, value_enum, default_value = "two-phase")]
        method: MethodArg,
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
        /// Tolerance for optimality, feasibility and pivot checks
        #[arg(long, default_value_t = 1e-9)]
        tolerance: f64,
        /// Maximum pivots per phase
        #[arg(long, default_value_t = 10000)]
        max_iterations: usize,
        /// Penalty on artificial variables for the Big-M method
        #[arg(long, default_value_t = 1e6)]
        big_m: f64,
    },
    /// Check a problem file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Standard,
    BigM,
    TwoPhase,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Standard => Method::Standard,
            MethodArg::BigM => Method::BigM,
            MethodArg::TwoPhase => Method::TwoPhase,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn load_problem(file: &Path) -> Result<LpProblem, String> {
    let source = std::fs::read_to_string(file).map_err(|e| format!("Error reading file: {}", e))?;

    let is_json = file.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&source).map_err(|e| format!("JSON error: {}", e))
    } else {
        tabula_lang::parse_problem(&source).map_err(|e| e.to_string())
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::builder().filter_level(level).parse_env("TABULA_LOG").init();

    match cli.command {
        Commands::Solve {
            file,
            method,
            format,
            tolerance,
            max_iterations,
            big_m,
        } => {
            let problem = match load_problem(&file) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            };
            info!("loaded {}", file.display());

            let solver = Solver::new()
                .with_tolerance(tolerance)
                .with_max_iterations(max_iterations)
                .with_big_m(big_m);

            let solution = match solver.solve(&problem, method.into()) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Solver error: {}", e);
                    std::process::exit(1);
                }
            };

            match format {
                Format::Json => match serde_json::to_string_pretty(&solution) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error encoding result: {}", e);
                        std::process::exit(1);
                    }
                },
                Format::Text => print!("{}", render::report(&problem, &solver, &solution)),
            }

            if !solution.status.is_optimal() {
                std::process::exit(1);
            }
        }
        Commands::Check { file } => {
            let problem = match load_problem(&file) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("✗ {} has errors:", file.display());
                    eprintln!("  {}", e);
                    std::process::exit(1);
                }
            };

            if let Err(e) = problem.validate() {
                eprintln!("✗ {} has errors:", file.display());
                eprintln!("  {}", e);
                std::process::exit(1);
            }

            let count = |op: ConstraintOp| problem.constraints.iter().filter(|c| c.op == op).count();
            println!("✓ {} is valid", file.display());
            println!(
                "  {} ({} variables)",
                if problem.maximize() { "maximize" } else { "minimize" },
                problem.num_variables()
            );
            println!("  {} <= constraints", count(ConstraintOp::Le));
            println!("  {} >= constraints", count(ConstraintOp::Ge));
            println!("  {} = constraints", count(ConstraintOp::Eq));
        }
    }
}
