use crate::disagreement::DisagreementReport;
use crate::model::{ScoredRecord, ScoringPolicy, SolverStanding, TrackKind};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod console;
pub mod markdown;
pub mod standings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub competition: String,
    pub year: u32,
    pub track: String,
    pub track_kind: TrackKind,
    pub created_at: String,
    pub fingerprint: String,
    pub inputs: Vec<String>,
    pub records: usize,
    pub reruns_collapsed: usize,
    pub podium_version: String,
}

/// Result of one scoring kind over the whole input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringRun {
    pub policy: ScoringPolicy,
    #[serde(skip)]
    pub scored: Vec<ScoredRecord>,
    pub standings: Vec<SolverStanding>,
}

impl ScoringRun {
    pub fn divisions(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.standings.iter().map(|s| s.division.as_str()).collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Standings of `division` in rank order.
    pub fn division(&self, division: &str) -> Vec<&SolverStanding> {
        self.standings
            .iter()
            .filter(|s| s.division == division)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunArtifacts {
    pub meta: RunMeta,
    pub disagreements: DisagreementReport,
    pub runs: Vec<ScoringRun>,
}

impl RunArtifacts {
    pub fn run(&self, name: &str) -> Option<&ScoringRun> {
        self.runs.iter().find(|r| r.policy.name == name)
    }
}

pub fn write_json(artifacts: &RunArtifacts, out: &Path) -> anyhow::Result<()> {
    let f = std::fs::File::create(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    serde_json::to_writer_pretty(f, artifacts).context("failed to write report JSON")?;
    Ok(())
}
