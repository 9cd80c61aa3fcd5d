//! Solvers whose absence would hurt the virtual best solver the most.
//!
//! The virtual best solver (VBS) takes, per benchmark, the best remaining
//! competitive record: highest `score_correct`, then lowest cpu time.
//! Times are always cpu times, whatever clock the scoring kind ranks on.
//! Unsolved records are charged the full time limit. A solver's impact
//! is how much the VBS loses when that solver's records are removed.

use podium_core::errors::InputError;
use podium_core::model::ScoredRecord;
use podium_core::rankings_api::{AggregateRanking, DivisionHighlight, RankingInput};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

pub struct LargestContributionRanking;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vbs {
    pub score: f64,
    pub time: f64,
}

#[derive(Debug, Clone, Copy)]
struct Entry<'a> {
    solver: &'a str,
    score: f64,
    time: f64,
}

/// Per-benchmark candidates of one division.
pub struct VbsTable<'a> {
    limit: f64,
    benchmarks: BTreeMap<&'a str, Vec<Entry<'a>>>,
}

impl<'a> VbsTable<'a> {
    /// `benchmarks` lists every benchmark of the division, `records` the
    /// competitive records taking part.
    pub fn new(
        benchmarks: impl IntoIterator<Item = &'a str>,
        records: impl IntoIterator<Item = &'a ScoredRecord>,
        limit: f64,
    ) -> Self {
        let mut table: BTreeMap<&str, Vec<Entry>> =
            benchmarks.into_iter().map(|b| (b, Vec::new())).collect();
        for s in records {
            let time = if s.correct == 0.0 {
                limit
            } else {
                s.record.cpu_time
            };
            table
                .entry(s.record.benchmark.as_str())
                .or_default()
                .push(Entry {
                    solver: s.record.solver.as_str(),
                    score: s.score_correct,
                    time,
                });
        }
        Self {
            limit,
            benchmarks: table,
        }
    }

    /// VBS over all solvers except `without`.
    pub fn compute(&self, without: Option<&str>) -> Vbs {
        let mut total = Vbs {
            score: 0.0,
            time: 0.0,
        };
        for entries in self.benchmarks.values() {
            let best = entries
                .iter()
                .filter(|e| Some(e.solver) != without)
                .min_by(|a, b| {
                    b.score
                        .total_cmp(&a.score)
                        .then_with(|| a.time.total_cmp(&b.time))
                });
            match best {
                Some(e) => {
                    total.score += e.score;
                    total.time += e.time;
                }
                None => total.time += self.limit,
            }
        }
        total
    }

    pub fn solvers(&self) -> BTreeSet<&'a str> {
        self.benchmarks
            .values()
            .flat_map(|v| v.iter().map(|e| e.solver))
            .collect()
    }
}

/// `(impact_score, impact_time)` of removing a solver; a zero denominator
/// yields 0.
pub fn impact(full: Vbs, without: Vbs) -> (f64, f64) {
    let score = if full.score == 0.0 {
        0.0
    } else {
        1.0 - without.score / full.score
    };
    let time = if without.time == 0.0 {
        0.0
    } else {
        1.0 - full.time / without.time
    };
    (score, time)
}

fn division_winner(
    input: &RankingInput<'_>,
    division: &str,
) -> Option<DivisionHighlight> {
    let all: Vec<&ScoredRecord> = input.scored_in(division).collect();
    let benchmarks: BTreeSet<&str> = all.iter().map(|s| s.record.benchmark.as_str()).collect();
    let division_size = all.first().map(|s| s.division_size).unwrap_or(benchmarks.len());

    let table = VbsTable::new(
        benchmarks,
        all.iter().copied().filter(|s| s.competitive),
        input.policy.time_limit,
    );
    let full = table.compute(None);

    let names: BTreeMap<&str, &str> = input
        .competitive_standings(division)
        .into_iter()
        .map(|s| (s.solver.as_str(), s.solver_name.as_str()))
        .collect();

    table
        .solvers()
        .into_iter()
        .map(|solver| {
            let (score, time) = impact(full, table.compute(Some(solver)));
            (solver, names.get(solver).copied().unwrap_or(solver), score, time)
        })
        .min_by(|a, b| {
            b.2.total_cmp(&a.2)
                .then_with(|| b.3.total_cmp(&a.3))
                .then_with(|| a.1.cmp(&b.1))
        })
        .map(|(solver, name, score, time)| DivisionHighlight {
            division: division.to_string(),
            division_size,
            solver: solver.to_string(),
            solver_name: name.to_string(),
            runner_up: None,
            score,
            secondary: time,
        })
}

fn global_order(a: &DivisionHighlight, b: &DivisionHighlight) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.secondary.total_cmp(&a.secondary))
        .then_with(|| b.division_size.cmp(&a.division_size))
        .then_with(|| a.division.cmp(&b.division))
}

impl AggregateRanking for LargestContributionRanking {
    fn name(&self) -> &'static str {
        "largest_contribution"
    }

    fn compute(&self, input: &RankingInput<'_>) -> Result<Vec<DivisionHighlight>, InputError> {
        let mut out = Vec::new();
        for division in input.competitive_divisions() {
            match division_winner(input, division) {
                Some(h) => out.push(h),
                None => {
                    return Err(InputError::Ranking(format!(
                        "division '{}' is flagged competitive but has no competitive records",
                        division
                    )))
                }
            }
        }
        out.sort_by(global_order);
        tracing::debug!(
            event = "podium.rankings.largest_contribution",
            divisions = out.len()
        );
        Ok(out)
    }
}
