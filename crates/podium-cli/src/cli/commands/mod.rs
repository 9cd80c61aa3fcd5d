use super::args::*;
use podium_core::config::{load_config, ScoreConfig};
use podium_core::engine::runner::{expand_inputs, PreparedResults, Runner};
use podium_core::model::{FamilyRule, ScoringPolicy};
use std::path::{Path, PathBuf};

pub mod disagreements;
pub mod rankings;
pub mod score;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const TEST_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub const DEFAULT_CONFIG: &str = "podium.yaml";

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Score(args) => score::run(args),
        Command::Rankings(args) => rankings::run(args),
        Command::Disagreements(args) => disagreements::run(args),
        Command::Init(args) => cmd_init(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    write_sample_config_if_missing(&args.config)?;

    if args.with_inputs {
        let dir = args.config.parent().unwrap_or(Path::new("."));
        write_file_if_missing(&dir.join("divisions.yaml"), crate::templates::DIVISIONS_YAML)?;
        write_file_if_missing(&dir.join("solvers.csv"), crate::templates::SOLVERS_CSV)?;
    }

    Ok(exit_codes::OK)
}

fn write_file_if_missing(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::write(path, content)?;
        eprintln!("created {}", path.display());
    } else {
        eprintln!("note: {} already exists (skipped)", path.display());
    }
    Ok(())
}

fn write_sample_config_if_missing(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        podium_core::config::write_sample_config(path)?;
        eprintln!("created {}", path.display());
    } else {
        eprintln!("note: {} already exists", path.display());
    }
    Ok(())
}

/// Config file (explicit, or ./podium.yaml when present) with command-line
/// overrides applied on top.
pub fn load_score_config(args: &InputArgs) -> anyhow::Result<ScoreConfig> {
    let mut cfg = match &args.config {
        Some(path) => load_config(path, args.strict)?,
        None if Path::new(DEFAULT_CONFIG).exists() => {
            load_config(Path::new(DEFAULT_CONFIG), args.strict)?
        }
        None => ScoreConfig::default(),
    };

    if let Some(year) = args.year {
        cfg.year = year;
    }
    if let Some(t) = args.time_limit {
        cfg.time_limit = t;
    }
    if let Some(family) = &args.family {
        cfg.family = parse_family(family)?;
    }
    if args.use_families {
        cfg.use_families = true;
    }
    if args.skip_unknown {
        cfg.skip_unknown = true;
    }
    if let Some(track) = &args.track {
        cfg.track = track.clone();
    }
    if let Some(p) = &args.registrations {
        cfg.registrations = Some(p.clone());
    }
    if let Some(p) = &args.division_map {
        cfg.division_map = Some(p.clone());
    }

    cfg.validate()?;
    Ok(cfg)
}

fn parse_family(raw: &str) -> anyhow::Result<FamilyRule> {
    match raw.to_ascii_lowercase().as_str() {
        "top" => Ok(FamilyRule::Top),
        "bot" | "bottom" => Ok(FamilyRule::Bottom),
        other => anyhow::bail!("config error: unknown family rule '{}' (expected top|bot)", other),
    }
}

/// Everything a command needs after loading: runner, prepared records and
/// the expanded input list.
pub struct Loaded {
    pub runner: Runner,
    pub prepared: PreparedResults,
    pub inputs: Vec<PathBuf>,
}

pub fn load_inputs(args: &InputArgs) -> anyhow::Result<Loaded> {
    let cfg = load_score_config(args)?;
    let inputs = expand_inputs(&args.results)?;
    if inputs.is_empty() {
        anyhow::bail!("no results files found in {:?}", args.results);
    }
    let runner = Runner::from_config(cfg)?;
    let prepared = runner.prepare(&inputs)?;
    Ok(Loaded {
        runner,
        prepared,
        inputs,
    })
}

pub fn find_policy(cfg: &ScoreConfig, name: &str) -> anyhow::Result<ScoringPolicy> {
    cfg.policy(name).ok_or_else(|| {
        let known: Vec<String> = cfg.policies().into_iter().map(|p| p.name).collect();
        anyhow::anyhow!(
            "config error: unknown scoring '{}' (known: {})",
            name,
            known.join(", ")
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_family() {
        assert_eq!(parse_family("TOP").unwrap(), FamilyRule::Top);
        assert_eq!(parse_family("bottom").unwrap(), FamilyRule::Bottom);
        assert!(parse_family("middle").is_err());
    }
}
