use super::ScoringRun;
use crate::disagreement::DisagreementReport;

pub fn print_disagreements(d: &DisagreementReport) {
    if d.unsound_solvers.is_empty() && d.excluded.is_empty() {
        return;
    }
    for s in &d.unsound_solvers {
        eprintln!("⚠️  unsound solver: {}", s);
    }
    for e in &d.excluded {
        eprintln!(
            "⏭️  {:<40} EXCLUDED (sat: {}; unsat: {})",
            e.benchmark,
            e.sat_solvers.join(", "),
            e.unsat_solvers.join(", ")
        );
    }
}

pub fn print_summary(run: &ScoringRun) {
    let divisions = run.divisions();
    eprintln!(
        "\nScoring '{}' over {} division(s)...",
        run.policy.name,
        divisions.len()
    );

    let mut competitive = 0;
    for division in &divisions {
        let rows = run.division(division);
        let Some(first) = rows.first() else {
            continue;
        };

        if first.division_competitive {
            competitive += 1;
            let winner = rows
                .iter()
                .find(|s| s.competitive && s.rank == 1)
                .map(|s| s.solver_name.as_str())
                .unwrap_or("-");
            eprintln!(
                "🏆 {:<24} {}  ({} solvers, {} benchmarks)",
                division,
                winner,
                rows.len(),
                first.division_size
            );
        } else {
            eprintln!(
                "➖ {:<24} not competitive  ({} solvers, {} benchmarks)",
                division,
                rows.len(),
                first.division_size
            );
        }

        for s in &rows {
            let tag = if s.competitive { "" } else { " (n/c)" };
            let err = if s.error > 0.0 {
                format!("  ❌ {} wrong", s.error)
            } else {
                String::new()
            };
            eprintln!(
                "    {:>2}. {:<28} {:>10.3}  {:.1}s{}",
                s.rank,
                format!("{}{}", s.solver_name, tag),
                s.score_correct,
                if run.policy.sequential {
                    s.score_cpu_time
                } else {
                    s.score_wallclock_time
                },
                err
            );
        }
    }

    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!(
        "Summary: {} divisions, {} competitive, {} not competitive",
        divisions.len(),
        competitive,
        divisions.len() - competitive
    );
}
