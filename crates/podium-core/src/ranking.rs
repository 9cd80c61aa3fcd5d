use crate::model::{ScoredRecord, SolverStanding};
use crate::scoring::ScoringContext;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Sums scored records per (division, solver).
pub fn aggregate(scored: &[ScoredRecord], ctx: &ScoringContext<'_>) -> Vec<SolverStanding> {
    let mut acc: BTreeMap<(&str, &str), SolverStanding> = BTreeMap::new();

    for s in scored {
        let r = &s.record;
        let row = acc
            .entry((r.division.as_str(), r.solver.as_str()))
            .or_insert_with(|| SolverStanding {
                division: r.division.clone(),
                solver: r.solver.clone(),
                solver_name: ctx
                    .registry
                    .display_name(&r.solver, &r.solver_name)
                    .to_string(),
                rank: 0,
                competitive: s.competitive,
                division_competitive: false,
                division_size: s.division_size,
                correct: 0.0,
                correct_sat: 0.0,
                correct_unsat: 0.0,
                error: 0.0,
                score_correct: 0.0,
                score_error: 0.0,
                score_cpu_time: 0.0,
                score_wallclock_time: 0.0,
            });

        row.correct += s.correct;
        row.correct_sat += s.correct_sat;
        row.correct_unsat += s.correct_unsat;
        row.error += s.error;
        row.score_correct += s.score_correct;
        row.score_error += s.score_error;
        row.score_cpu_time += s.score_cpu_time;
        row.score_wallclock_time += s.score_wallclock_time;
    }

    acc.into_values().collect()
}

/// Ranking order within a division: fewer errors, more credit, less time
/// on the authoritative clock, less time on the other clock, then name/id.
pub fn compare_standings(a: &SolverStanding, b: &SolverStanding, sequential: bool) -> Ordering {
    let (a_primary, a_other, b_primary, b_other) = if sequential {
        (
            a.score_cpu_time,
            a.score_wallclock_time,
            b.score_cpu_time,
            b.score_wallclock_time,
        )
    } else {
        (
            a.score_wallclock_time,
            a.score_cpu_time,
            b.score_wallclock_time,
            b.score_cpu_time,
        )
    };

    a.error
        .total_cmp(&b.error)
        .then_with(|| b.score_correct.total_cmp(&a.score_correct))
        .then_with(|| a_primary.total_cmp(&b_primary))
        .then_with(|| a_other.total_cmp(&b_other))
        .then_with(|| a.solver_name.cmp(&b.solver_name))
        .then_with(|| a.solver.cmp(&b.solver))
}

/// Assigns ranks to an already sorted division.
///
/// Non-competitive solvers take the rank of the closest competitive solver
/// above them (1 if there is none) and never advance the counter, so a run
/// of non-competitive solvers shares one rank.
pub fn assign_ranks(sorted: &mut [SolverStanding]) {
    let mut competitive_seen = 0u32;
    for s in sorted.iter_mut() {
        if s.competitive {
            competitive_seen += 1;
            s.rank = competitive_seen;
        } else {
            s.rank = competitive_seen.max(1);
        }
    }
}

/// A division is competitive when its competing solvers stem from at least
/// two distinct base solvers.
pub fn is_division_competitive(standings: &[SolverStanding], ctx: &ScoringContext<'_>) -> bool {
    standings
        .iter()
        .filter(|s| s.competitive)
        .map(|s| ctx.registry.base_identity(&s.solver))
        .collect::<BTreeSet<_>>()
        .len()
        >= 2
}

/// Aggregates, sorts and ranks every division. Output is ordered by
/// division name, then rank order.
pub fn rank(scored: &[ScoredRecord], sequential: bool, ctx: &ScoringContext<'_>) -> Vec<SolverStanding> {
    let mut by_division: BTreeMap<String, Vec<SolverStanding>> = BTreeMap::new();
    for s in aggregate(scored, ctx) {
        by_division.entry(s.division.clone()).or_default().push(s);
    }

    let mut out = Vec::new();
    for (division, mut rows) in by_division {
        rows.sort_by(|a, b| compare_standings(a, b, sequential));
        assign_ranks(&mut rows);

        let competitive = is_division_competitive(&rows, ctx);
        if !competitive {
            tracing::info!(
                event = "podium.ranking.not_competitive",
                division = %division,
                solvers = rows.len()
            );
        }
        for r in rows.iter_mut() {
            r.division_competitive = competitive;
        }
        out.extend(rows);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ResultRecord, RunStatus, ScoringPolicy, SolverRegistration, TrackData, Verdict,
        VerdictFilter,
    };
    use crate::registry::SolverRegistry;
    use crate::scoring::score_records;

    fn standing(solver: &str, competitive: bool, correct: f64, error: f64, cpu: f64) -> SolverStanding {
        SolverStanding {
            division: "D".into(),
            solver: solver.into(),
            solver_name: solver.into(),
            rank: 0,
            competitive,
            division_competitive: false,
            division_size: 10,
            correct,
            correct_sat: 0.0,
            correct_unsat: 0.0,
            error,
            score_correct: correct,
            score_error: error,
            score_cpu_time: cpu,
            score_wallclock_time: cpu,
        }
    }

    fn rec(bench: &str, solver: &str, cpu: f64, result: Verdict, expected: Verdict) -> ResultRecord {
        ResultRecord {
            division: "QF_LIA".into(),
            logic: "QF_LIA".into(),
            family: "f".into(),
            benchmark: format!("QF_LIA/f/{bench}"),
            solver: solver.into(),
            solver_name: solver.into(),
            configuration: None,
            pair_id: None,
            cpu_time: cpu,
            wallclock_time: cpu,
            status: if cpu > 1200.0 {
                RunStatus::Timeout
            } else {
                RunStatus::Complete
            },
            result,
            expected,
            track: TrackData::Standard,
        }
    }

    fn sequential() -> ScoringPolicy {
        ScoringPolicy {
            name: "sequential".into(),
            time_limit: 1200.0,
            sequential: true,
            verdict: VerdictFilter::All,
            skip_unknown: false,
            use_families: false,
            year: 2021,
        }
    }

    #[test]
    fn test_non_competitive_solver_does_not_advance_rank() {
        let mut rows = vec![
            standing("C", true, 5.0, 0.0, 1.0),
            standing("A", true, 9.0, 0.0, 1.0),
            standing("B", false, 7.0, 0.0, 1.0),
        ];
        rows.sort_by(|a, b| compare_standings(a, b, true));
        assign_ranks(&mut rows);

        let ranks: Vec<_> = rows.iter().map(|s| (s.solver.as_str(), s.rank)).collect();
        assert_eq!(ranks, vec![("A", 1), ("B", 1), ("C", 2)]);
    }

    #[test]
    fn test_consecutive_non_competitive_share_rank() {
        let mut rows = vec![
            standing("N1", false, 9.0, 0.0, 1.0),
            standing("N2", false, 8.0, 0.0, 1.0),
            standing("A", true, 7.0, 0.0, 1.0),
            standing("N3", false, 6.0, 0.0, 1.0),
            standing("N4", false, 5.0, 0.0, 1.0),
            standing("B", true, 4.0, 0.0, 1.0),
        ];
        assign_ranks(&mut rows);
        let ranks: Vec<_> = rows.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 1, 1, 1, 1, 2]);
    }

    #[test]
    fn test_errors_dominate_credit_and_time() {
        let fast_wrong = standing("F", true, 10.0, 1.0, 1.0);
        let slow_right = standing("S", true, 2.0, 0.0, 999.0);
        assert_eq!(compare_standings(&slow_right, &fast_wrong, true), Ordering::Less);

        let quick = standing("Q", true, 2.0, 0.0, 5.0);
        assert_eq!(compare_standings(&quick, &slow_right, true), Ordering::Less);
    }

    #[test]
    fn test_parallel_uses_wallclock_first() {
        let mut a = standing("A", true, 2.0, 0.0, 0.0);
        a.score_cpu_time = 100.0;
        a.score_wallclock_time = 10.0;
        let mut b = standing("B", true, 2.0, 0.0, 0.0);
        b.score_cpu_time = 50.0;
        b.score_wallclock_time = 20.0;
        assert_eq!(compare_standings(&a, &b, false), Ordering::Less);
        assert_eq!(compare_standings(&a, &b, true), Ordering::Greater);
    }

    #[test]
    fn test_qf_lia_scenario() {
        use Verdict::*;
        let records = vec![
            rec("b1", "X", 10.0, Sat, Sat),
            rec("b2", "X", 5.0, Unsat, Unsat),
            rec("b3", "X", 1300.0, Unknown, Sat),
            rec("b1", "Y", 20.0, Sat, Sat),
            rec("b2", "Y", 3.0, Sat, Unsat),
            rec("b3", "Y", 15.0, Sat, Sat),
        ];
        let reg = SolverRegistry::default();
        let ctx = ScoringContext { registry: &reg };
        let scored = score_records(&records, &sequential(), &ctx);
        let standings = rank(&scored, true, &ctx);

        let x = &standings[0];
        let y = &standings[1];
        assert_eq!(x.solver, "X");
        assert_eq!((x.correct, x.error), (2.0, 0.0));
        // the time-out is charged at the limit
        assert_eq!(x.score_cpu_time, 10.0 + 5.0 + 1200.0);
        assert_eq!((y.correct, y.error), (2.0, 1.0));
        assert_eq!((x.rank, y.rank), (1, 2));
        assert!(x.division_competitive);

        // every solver has one record per benchmark
        for s in &standings {
            let n = scored
                .iter()
                .filter(|r| r.record.solver == s.solver)
                .count();
            assert_eq!(n, s.division_size);
        }
    }

    #[test]
    fn test_ranking_is_deterministic() {
        use Verdict::*;
        let mut records = vec![
            rec("b1", "A", 1.0, Sat, Sat),
            rec("b1", "B", 1.0, Sat, Sat),
            rec("b1", "C", 1.0, Sat, Sat),
        ];
        let reg = SolverRegistry::default();
        let ctx = ScoringContext { registry: &reg };
        let first = rank(&score_records(&records, &sequential(), &ctx), true, &ctx);
        records.reverse();
        let second = rank(&score_records(&records, &sequential(), &ctx), true, &ctx);
        assert_eq!(first, second);
        let ranks: Vec<_> = first.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_weighted_scoring_still_ranks_by_wrong_answers() {
        use Verdict::*;
        let in_family = |family: &str, bench: &str, solver: &str, result: Verdict| {
            let mut r = rec(bench, solver, 1.0, result, Sat);
            r.family = family.to_string();
            r.benchmark = format!("QF_LIA/{family}/{bench}");
            r
        };

        let mut records = Vec::new();
        for i in 0..20 {
            let bench = format!("b{i}");
            records.push(in_family("big", &bench, "A", Sat));
            records.push(in_family("big", &bench, "B", if i < 2 { Unsat } else { Sat }));
        }
        // A's only wrong answer sits in a single-benchmark family
        records.push(in_family("lone", "only", "A", Unsat));
        records.push(in_family("lone", "only", "B", Sat));

        let policy = ScoringPolicy {
            use_families: true,
            ..sequential()
        };
        let reg = SolverRegistry::default();
        let ctx = ScoringContext { registry: &reg };
        let standings = rank(&score_records(&records, &policy, &ctx), true, &ctx);

        let a = &standings[0];
        let b = &standings[1];
        assert_eq!((a.solver.as_str(), a.rank, a.error), ("A", 1, 1.0));
        assert_eq!((b.solver.as_str(), b.rank, b.error), ("B", 2, 2.0));
        // the weighted error alone would have put B first
        assert!(a.score_error > b.score_error);
    }

    #[test]
    fn test_variant_cycle_counts_as_one_base() {
        let reg = SolverRegistry::new(vec![
            SolverRegistration {
                id: "a".into(),
                name: "A".into(),
                competing: true,
                variant_of: Some("b".into()),
            },
            SolverRegistration {
                id: "b".into(),
                name: "B".into(),
                competing: true,
                variant_of: Some("a".into()),
            },
        ]);
        let ctx = ScoringContext { registry: &reg };
        let rows = vec![
            standing("a", true, 2.0, 0.0, 1.0),
            standing("b", true, 1.0, 0.0, 1.0),
        ];
        assert!(!is_division_competitive(&rows, &ctx));
    }

    #[test]
    fn test_variants_of_one_solver_are_not_competition() {
        use Verdict::*;
        let reg = SolverRegistry::new(vec![
            SolverRegistration {
                id: "z3".into(),
                name: "Z3".into(),
                competing: true,
                variant_of: None,
            },
            SolverRegistration {
                id: "z3-fixed".into(),
                name: "Z3 fixed".into(),
                competing: true,
                variant_of: Some("z3".into()),
            },
            SolverRegistration {
                id: "ref".into(),
                name: "Reference".into(),
                competing: false,
                variant_of: None,
            },
        ]);
        let ctx = ScoringContext { registry: &reg };
        let records = vec![
            rec("b1", "z3", 1.0, Sat, Sat),
            rec("b1", "z3-fixed", 2.0, Sat, Sat),
            rec("b1", "ref", 0.5, Sat, Sat),
        ];
        let standings = rank(&score_records(&records, &sequential(), &ctx), true, &ctx);
        assert!(standings.iter().all(|s| !s.division_competitive));
        assert_eq!(standings[0].solver_name, "Reference");
        assert_eq!(standings[0].rank, 1);
    }
}
