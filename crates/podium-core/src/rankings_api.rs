use crate::errors::InputError;
use crate::model::{ScoredRecord, ScoringPolicy, SolverStanding};
use serde::{Deserialize, Serialize};

/// Everything a cross-division ranking sees: the standings and scored
/// records of one scoring kind.
pub struct RankingInput<'a> {
    pub competition: &'a str,
    pub year: u32,
    pub policy: &'a ScoringPolicy,
    pub standings: &'a [SolverStanding],
    pub scored: &'a [ScoredRecord],
}

impl<'a> RankingInput<'a> {
    /// Names of divisions flagged competitive, sorted.
    pub fn competitive_divisions(&self) -> Vec<&'a str> {
        let mut out: Vec<&str> = self
            .standings
            .iter()
            .filter(|s| s.division_competitive)
            .map(|s| s.division.as_str())
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Competitive solvers of `division`, in rank order.
    pub fn competitive_standings(&self, division: &str) -> Vec<&'a SolverStanding> {
        self.standings
            .iter()
            .filter(|s| s.division == division && s.competitive)
            .collect()
    }

    pub fn scored_in(&self, division: &str) -> impl Iterator<Item = &'a ScoredRecord> + '_ {
        let division = division.to_string();
        self.scored
            .iter()
            .filter(move |s| s.record.division == division)
    }
}

/// One division's entry in a cross-division ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionHighlight {
    pub division: String,
    pub division_size: usize,
    /// The solver the entry is about (winner, most impactful solver).
    pub solver: String,
    pub solver_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_up: Option<String>,
    /// Primary sort value (lead score, impact score).
    pub score: f64,
    /// Secondary value (impact time); 0 when the ranking has none.
    #[serde(default)]
    pub secondary: f64,
}

pub trait AggregateRanking: Send + Sync {
    fn name(&self) -> &'static str;
    fn compute(&self, input: &RankingInput<'_>) -> Result<Vec<DivisionHighlight>, InputError>;
}
