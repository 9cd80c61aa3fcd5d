//! Detection and removal of benchmarks on which sound solvers disagree.
//!
//! A solver is unsound when it contradicts a known expected status anywhere
//! in the input. Among the remaining solvers, a benchmark of unknown status
//! that receives both `sat` and `unsat` cannot be trusted and is dropped from
//! the run entirely. Everything here is set arithmetic, so solver and row
//! order never change the outcome.

use crate::model::{ResultRecord, SolverId, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedBenchmark {
    pub division: String,
    pub benchmark: String,
    pub sat_solvers: Vec<SolverId>,
    pub unsat_solvers: Vec<SolverId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisagreementReport {
    pub unsound_solvers: Vec<SolverId>,
    pub excluded: Vec<ExcludedBenchmark>,
}

impl DisagreementReport {
    pub fn is_excluded(&self, division: &str, benchmark: &str) -> bool {
        self.excluded
            .iter()
            .any(|e| e.division == division && e.benchmark == benchmark)
    }
}

pub fn unsound_solvers(records: &[ResultRecord]) -> BTreeSet<SolverId> {
    records
        .iter()
        .filter(|r| r.is_wrong())
        .map(|r| r.solver.clone())
        .collect()
}

pub fn find_disagreements(records: &[ResultRecord]) -> DisagreementReport {
    let unsound = unsound_solvers(records);

    let mut verdicts: BTreeMap<(&str, &str), BTreeMap<Verdict, BTreeSet<&str>>> = BTreeMap::new();
    for r in records {
        if r.expected.is_definitive() || !r.result.is_definitive() || unsound.contains(&r.solver) {
            continue;
        }
        verdicts
            .entry((r.division.as_str(), r.benchmark.as_str()))
            .or_default()
            .entry(r.result)
            .or_default()
            .insert(r.solver.as_str());
    }

    let excluded = verdicts
        .into_iter()
        .filter(|(_, by_verdict)| by_verdict.len() > 1)
        .map(|((division, benchmark), by_verdict)| ExcludedBenchmark {
            division: division.to_string(),
            benchmark: benchmark.to_string(),
            sat_solvers: solvers_for(&by_verdict, Verdict::Sat),
            unsat_solvers: solvers_for(&by_verdict, Verdict::Unsat),
        })
        .collect();

    DisagreementReport {
        unsound_solvers: unsound.into_iter().collect(),
        excluded,
    }
}

fn solvers_for(by_verdict: &BTreeMap<Verdict, BTreeSet<&str>>, v: Verdict) -> Vec<SolverId> {
    by_verdict
        .get(&v)
        .map(|s| s.iter().map(|id| id.to_string()).collect())
        .unwrap_or_default()
}

/// Drops every record of a disagreeing benchmark.
pub fn filter_disagreements(records: Vec<ResultRecord>) -> (Vec<ResultRecord>, DisagreementReport) {
    let report = find_disagreements(&records);

    for solver in &report.unsound_solvers {
        tracing::warn!(event = "podium.disagreement.unsound_solver", solver = %solver);
    }
    for e in &report.excluded {
        tracing::warn!(
            event = "podium.disagreement.excluded",
            division = %e.division,
            benchmark = %e.benchmark,
            sat = ?e.sat_solvers,
            unsat = ?e.unsat_solvers,
            "excluding benchmark with contradictory verdicts"
        );
    }

    if report.excluded.is_empty() {
        return (records, report);
    }

    let dropped: HashSet<(&str, &str)> = report
        .excluded
        .iter()
        .map(|e| (e.division.as_str(), e.benchmark.as_str()))
        .collect();
    let kept = records
        .into_iter()
        .filter(|r| !dropped.contains(&(r.division.as_str(), r.benchmark.as_str())))
        .collect();

    (kept, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RunStatus, TrackData};

    fn rec(bench: &str, solver: &str, result: Verdict, expected: Verdict) -> ResultRecord {
        ResultRecord {
            division: "QF_LIA".into(),
            logic: "QF_LIA".into(),
            family: "f".into(),
            benchmark: format!("QF_LIA/f/{bench}"),
            solver: solver.into(),
            solver_name: solver.into(),
            configuration: None,
            pair_id: None,
            cpu_time: 1.0,
            wallclock_time: 1.0,
            status: RunStatus::Complete,
            result,
            expected,
            track: TrackData::Standard,
        }
    }

    #[test]
    fn test_sound_solvers_disagreeing_excludes_benchmark() {
        use Verdict::*;
        let records = vec![
            rec("b1", "P", Sat, Sat),
            rec("b1", "Q", Sat, Sat),
            rec("b4", "P", Sat, Unknown),
            rec("b4", "Q", Unsat, Unknown),
        ];
        let (kept, report) = filter_disagreements(records);
        assert!(report.unsound_solvers.is_empty());
        assert_eq!(report.excluded.len(), 1);
        assert_eq!(report.excluded[0].benchmark, "QF_LIA/f/b4");
        assert_eq!(report.excluded[0].sat_solvers, vec!["P".to_string()]);
        assert_eq!(report.excluded[0].unsat_solvers, vec!["Q".to_string()]);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| !r.benchmark.ends_with("b4")));
    }

    #[test]
    fn test_unsound_solver_verdict_is_disregarded() {
        use Verdict::*;
        let records = vec![
            rec("b1", "U", Unsat, Sat), // U is unsound
            rec("b4", "P", Sat, Unknown),
            rec("b4", "U", Unsat, Unknown),
        ];
        let (kept, report) = filter_disagreements(records);
        assert_eq!(report.unsound_solvers, vec!["U".to_string()]);
        assert!(report.excluded.is_empty());
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn test_unknown_answers_never_disagree() {
        use Verdict::*;
        let records = vec![rec("b4", "P", Sat, Unknown), rec("b4", "Q", Unknown, Unknown)];
        assert!(find_disagreements(&records).excluded.is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        use Verdict::*;
        let records = vec![
            rec("b1", "U", Unsat, Sat),
            rec("b2", "P", Sat, Unknown),
            rec("b2", "Q", Unsat, Unknown),
            rec("b3", "P", Unsat, Unknown),
            rec("b3", "Q", Unsat, Unknown),
        ];
        let (once, _) = filter_disagreements(records);
        let (twice, report) = filter_disagreements(once.clone());
        assert_eq!(once, twice);
        assert!(report.excluded.is_empty());
    }

    #[test]
    fn test_order_does_not_matter() {
        use Verdict::*;
        let mut records = vec![
            rec("b2", "P", Sat, Unknown),
            rec("b2", "Q", Unsat, Unknown),
            rec("b3", "R", Sat, Unsat),
        ];
        let a = find_disagreements(&records);
        records.reverse();
        let b = find_disagreements(&records);
        assert_eq!(a, b);
    }
}
