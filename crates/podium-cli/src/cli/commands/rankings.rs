use super::exit_codes;
use super::{find_policy, load_inputs};
use crate::cli::args::RankingsArgs;
use anyhow::Context;
use podium_core::rankings_api::{DivisionHighlight, RankingInput};
use podium_core::report::markdown;
use serde_json::json;

pub fn run(args: RankingsArgs) -> anyhow::Result<i32> {
    let loaded = load_inputs(&args.input)?;
    let cfg = &loaded.runner.config;
    let policy = find_policy(cfg, &args.scoring)?;
    let run = loaded.runner.score(&loaded.prepared, &policy);

    let input = RankingInput {
        competition: &cfg.competition,
        year: cfg.year,
        policy: &policy,
        standings: &run.standings,
        scored: &run.scored,
    };

    let mut results: Vec<(String, Vec<DivisionHighlight>)> = Vec::new();
    for ranking in podium_metrics::default_rankings() {
        let rows = ranking
            .compute(&input)
            .with_context(|| format!("ranking '{}' failed", ranking.name()))?;
        results.push((ranking.name().to_string(), rows));
    }

    let rendered = if args.format == "md" {
        markdown::rankings_markdown(&policy.name, &results)
    } else {
        let mut rankings = serde_json::Map::new();
        for (name, rows) in &results {
            rankings.insert(name.clone(), serde_json::to_value(rows)?);
        }
        serde_json::to_string_pretty(&json!({
            "competition": cfg.competition,
            "year": cfg.year,
            "scoring": policy.name,
            "rankings": rankings,
        }))?
    };

    match &args.out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{}", rendered),
    }

    let empty = results.iter().all(|(_, rows)| rows.is_empty());
    if empty {
        tracing::warn!(
            event = "podium.rankings.empty",
            scoring = %policy.name,
            "no competitive division"
        );
        if args.fail_on_empty {
            return Ok(exit_codes::TEST_FAILED);
        }
    }
    Ok(exit_codes::OK)
}
