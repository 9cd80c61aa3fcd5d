use super::exit_codes;
use super::load_inputs;
use crate::cli::args::DisagreementsArgs;

pub fn run(args: DisagreementsArgs) -> anyhow::Result<i32> {
    let loaded = load_inputs(&args.input)?;
    let report = &loaded.prepared.disagreements;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(exit_codes::OK);
    }

    if report.unsound_solvers.is_empty() && report.excluded.is_empty() {
        println!("no disagreements");
        return Ok(exit_codes::OK);
    }
    for s in &report.unsound_solvers {
        println!("unsound\t{}", s);
    }
    for e in &report.excluded {
        println!(
            "excluded\t{}\t{}\tsat={}\tunsat={}",
            e.division,
            e.benchmark,
            e.sat_solvers.join(","),
            e.unsat_solvers.join(",")
        );
    }
    Ok(exit_codes::OK)
}
