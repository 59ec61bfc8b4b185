use anyhow::{bail, Context, Result};
use schedule_solver::config::{read_config, Config};
use schedule_solver::error::SolveError;
use schedule_solver::export::write_timetable_csv;
use schedule_solver::loader::{load_input, read_csv_dir};
use schedule_solver::{server, solver};
use std::env;
use std::path::{Path, PathBuf};

const USAGE: &str = "usage: schedule_solver solve (<input.json> | --csv-dir <dir>) \
                     [--config <config.json>] [--timetable <out.csv>]";

/// Timetable written by `--csv-dir` runs when `--timetable` is not given.
const DEFAULT_TIMETABLE: &str = "timetable_output.csv";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Json(PathBuf),
    CsvDir(PathBuf),
}

#[derive(Debug, PartialEq, Eq)]
struct SolveArgs {
    input: Input,
    config: Option<PathBuf>,
    timetable: Option<PathBuf>,
}

/// Parses the arguments after `solve`. A bare second path is still taken as
/// the config file.
fn parse_solve_args(args: &[String]) -> Result<SolveArgs> {
    let mut input = None;
    let mut config = None;
    let mut timetable = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = || iter.next().map(PathBuf::from).context(USAGE);
        match arg.as_str() {
            "--csv-dir" => input = Some(Input::CsvDir(value()?)),
            "--config" => config = Some(value()?),
            "--timetable" => timetable = Some(value()?),
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
            path if input.is_none() => input = Some(Input::Json(PathBuf::from(path))),
            path if config.is_none() => config = Some(PathBuf::from(path)),
            path => bail!("unexpected argument {path}\n{USAGE}"),
        }
    }
    let input = input.context(USAGE)?;
    if timetable.is_none() && matches!(input, Input::CsvDir(_)) {
        timetable = Some(PathBuf::from(DEFAULT_TIMETABLE));
    }
    Ok(SolveArgs {
        input,
        config,
        timetable,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("solve") => {
            let solve_args = parse_solve_args(&args[1..])?;
            let config = load_config(solve_args.config.as_deref())?;
            solve_file(&solve_args, &config)
        }
        config_path => {
            let config = load_config(config_path.map(Path::new))?;
            server::run_server(&config)
                .await
                .context("server terminated with an error")
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => read_config(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn solve_file(args: &SolveArgs, config: &Config) -> Result<()> {
    let input = match &args.input {
        Input::Json(path) => load_input(path),
        Input::CsvDir(dir) => read_csv_dir(dir),
    }
    .context("failed to load input")?;

    let output = match solver::solve(&input, &config.solver) {
        Ok(output) => output,
        Err(failure) => {
            for warning in &failure.warnings {
                eprintln!("{}", warning);
            }
            if let SolveError::EmptyDomains { diagnostics } = &failure.error {
                for diagnostic in diagnostics {
                    eprintln!("EMPTY DOMAIN: {}", diagnostic);
                }
            }
            return Err(failure.into());
        }
    };
    for warning in &output.warnings {
        eprintln!("{}", warning);
    }
    if let Some(path) = &args.timetable {
        write_timetable_csv(&output.entries, path)
            .with_context(|| format!("failed to write timetable to {}", path.display()))?;
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
