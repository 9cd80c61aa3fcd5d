use super::exit_codes;
use super::{find_policy, load_inputs};
use crate::cli::args::ScoreArgs;
use anyhow::Context;
use podium_core::report::{self, console, markdown, standings};

pub fn run(args: ScoreArgs) -> anyhow::Result<i32> {
    let loaded = load_inputs(&args.input)?;
    let cfg = &loaded.runner.config;

    let policies = if args.scorings.is_empty() {
        cfg.policies()
    } else {
        args.scorings
            .iter()
            .map(|name| find_policy(cfg, name))
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    let artifacts = loaded
        .runner
        .run_prepared(&loaded.prepared, &loaded.inputs, &policies)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    for run in &artifacts.runs {
        let out = args.out_dir.join(format!("{}.csv", run.policy.name));
        standings::write_csv(&run.standings, &out)?;
        eprintln!("wrote {}", out.display());
    }

    if args.format == "md" {
        let out = args.out_dir.join("report.md");
        std::fs::write(&out, markdown::generate_markdown(&artifacts))
            .with_context(|| format!("failed to write {}", out.display()))?;
        eprintln!("wrote {}", out.display());
    } else {
        let out = args.out_dir.join("report.json");
        report::write_json(&artifacts, &out)?;
        eprintln!("wrote {}", out.display());
    }

    if !args.quiet {
        console::print_disagreements(&artifacts.disagreements);
        for run in &artifacts.runs {
            console::print_summary(run);
        }
    }

    Ok(exit_codes::OK)
}
