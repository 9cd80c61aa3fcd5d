use super::RunArtifacts;
use crate::rankings_api::DivisionHighlight;

fn mark(competitive: bool) -> &'static str {
    if competitive {
        ""
    } else {
        " (n/c)"
    }
}

/// Full run report: metadata, excluded benchmarks, one table per division
/// and scoring kind.
pub fn generate_markdown(a: &RunArtifacts) -> String {
    let m = &a.meta;
    let mut md = format!(
        "# {} {} ({})\n\n\
        | Field | Value |\n\
        |-------|-------|\n\
        | Track kind | {:?} |\n\
        | Records | {} |\n\
        | Reruns collapsed | {} |\n\
        | Fingerprint | `{}` |\n\
        | Created | {} |\n\n",
        m.competition,
        m.year,
        m.track,
        m.track_kind,
        m.records,
        m.reruns_collapsed,
        m.fingerprint,
        m.created_at,
    );

    let d = &a.disagreements;
    if !d.unsound_solvers.is_empty() || !d.excluded.is_empty() {
        md.push_str("## Disagreements\n\n");
        for s in &d.unsound_solvers {
            md.push_str(&format!("- unsound solver `{}`\n", s));
        }
        for e in &d.excluded {
            md.push_str(&format!(
                "- excluded `{}` ({}): sat by {}, unsat by {}\n",
                e.benchmark,
                e.division,
                e.sat_solvers.join(", "),
                e.unsat_solvers.join(", ")
            ));
        }
        md.push('\n');
    }

    for run in &a.runs {
        md.push_str(&format!(
            "## Scoring: {} (T = {}s, {})\n\n",
            run.policy.name,
            run.policy.time_limit,
            if run.policy.sequential {
                "cpu time"
            } else {
                "wallclock time"
            }
        ));
        for division in run.divisions() {
            let rows = run.division(division);
            let competitive = rows.first().is_some_and(|s| s.division_competitive);
            md.push_str(&format!(
                "### {}{}\n\n\
                | Rank | Solver | Correct | Errors | Score | CPU time | Wallclock time |\n\
                |------|--------|---------|--------|-------|----------|----------------|\n",
                division,
                if competitive { "" } else { " (not competitive)" }
            ));
            for s in rows {
                md.push_str(&format!(
                    "| {} | {}{} | {} | {} | {:.3} | {:.2} | {:.2} |\n",
                    s.rank,
                    s.solver_name,
                    mark(s.competitive),
                    s.correct,
                    s.error,
                    s.score_correct,
                    s.score_cpu_time,
                    s.score_wallclock_time,
                ));
            }
            md.push('\n');
        }
    }
    md
}

pub fn rankings_markdown(scoring: &str, rankings: &[(String, Vec<DivisionHighlight>)]) -> String {
    let mut md = format!("# Aggregate rankings ({})\n\n", scoring);
    for (name, rows) in rankings {
        md.push_str(&format!(
            "## {}\n\n\
            | # | Division | Solver | Score | Secondary | Size |\n\
            |---|----------|--------|-------|-----------|------|\n",
            name
        ));
        if rows.is_empty() {
            md.push_str("| - | _no competitive division_ | | | | |\n");
        }
        for (i, h) in rows.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} | {:.4} | {:.4} | {} |\n",
                i + 1,
                h.division,
                h.solver_name,
                h.score,
                h.secondary,
                h.division_size
            ));
        }
        md.push('\n');
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rankings_markdown_lists_rows_in_order() {
        let rows = vec![
            DivisionHighlight {
                division: "QF_BV".into(),
                division_size: 10,
                solver: "a".into(),
                solver_name: "A".into(),
                runner_up: Some("b".into()),
                score: 4.636363,
                secondary: 0.0,
            },
            DivisionHighlight {
                division: "QF_LIA".into(),
                division_size: 3,
                solver: "c".into(),
                solver_name: "C".into(),
                runner_up: None,
                score: 1.5,
                secondary: 0.0,
            },
        ];
        let md = rankings_markdown("sequential", &[("biggest_lead".into(), rows)]);
        assert!(md.contains("## biggest_lead"));
        assert!(md.contains("| 1 | QF_BV | A | 4.6364 |"));
        let first = md.find("QF_BV").unwrap();
        let second = md.find("QF_LIA").unwrap();
        assert!(first < second);
    }
}
