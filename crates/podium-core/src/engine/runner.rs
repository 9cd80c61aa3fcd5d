use crate::config::ScoreConfig;
use crate::disagreement::{filter_disagreements, DisagreementReport};
use crate::divisions::{DivisionMap, DivisionResolver};
use crate::errors::InputError;
use crate::fingerprint;
use crate::ingest::{ensure_unique, load_results, resolve_reruns, NormalizeOptions};
use crate::model::{ResultRecord, ScoringPolicy, TrackKind};
use crate::ranking;
use crate::report::{RunArtifacts, RunMeta, ScoringRun};
use crate::registry::SolverRegistry;
use crate::scoring::{score_records, ScoringContext};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Normalized, rerun-resolved, disagreement-filtered input shared by every
/// scoring kind of a run.
#[derive(Debug, Clone)]
pub struct PreparedResults {
    pub track: TrackKind,
    pub records: Vec<ResultRecord>,
    pub reruns_collapsed: usize,
    pub disagreements: DisagreementReport,
}

pub struct Runner {
    pub config: ScoreConfig,
    pub registry: SolverRegistry,
    pub divisions: Option<DivisionMap>,
}

impl Runner {
    pub fn new(config: ScoreConfig, registry: SolverRegistry, divisions: Option<DivisionMap>) -> Self {
        Self {
            config,
            registry,
            divisions,
        }
    }

    /// Loads the registry and division map referenced by `config`.
    pub fn from_config(config: ScoreConfig) -> anyhow::Result<Self> {
        let registry = match &config.registrations {
            Some(p) => SolverRegistry::load(p)
                .with_context(|| format!("failed to load registrations {}", p.display()))?,
            None => SolverRegistry::default(),
        };
        let divisions = match &config.division_map {
            Some(p) => Some(DivisionMap::load(p)?),
            None => None,
        };
        if let Some(map) = &divisions {
            if !map.has_track(&config.track) {
                tracing::warn!(
                    event = "podium.divisions.track_missing",
                    track = %config.track,
                    "division map has no entry for track; divisions equal logics"
                );
            }
        }
        Ok(Self::new(config, registry, divisions))
    }

    fn resolver(&self) -> DivisionResolver<'_> {
        match &self.divisions {
            Some(map) => map.for_track(&self.config.track),
            None => DivisionResolver::identity(),
        }
    }

    pub fn context(&self) -> ScoringContext<'_> {
        ScoringContext {
            registry: &self.registry,
        }
    }

    /// Reads every results file, merges them and drops disagreeing
    /// benchmarks. All files must belong to the same track kind.
    pub fn prepare<P: AsRef<Path>>(&self, inputs: &[P]) -> anyhow::Result<PreparedResults> {
        let opts = NormalizeOptions {
            family_rule: self.config.family,
            divisions: self.resolver(),
        };

        let mut track: Option<TrackKind> = None;
        let mut records = Vec::new();
        let mut reruns_collapsed = 0;
        for p in inputs {
            let p = p.as_ref();
            let table = load_results(p, &opts)
                .with_context(|| format!("failed to load results {}", p.display()))?;
            match track {
                Some(t) if t != table.track => {
                    return Err(InputError::Consistency(format!(
                        "{} holds {:?} results but earlier inputs hold {:?}",
                        p.display(),
                        table.track,
                        t
                    ))
                    .into());
                }
                _ => track = Some(table.track),
            }
            reruns_collapsed += table.reruns_collapsed;
            records.extend(table.records);
        }

        // the same pair may be split over several files
        let (records, collapsed) = resolve_reruns(records);
        reruns_collapsed += collapsed;
        ensure_unique(&records)?;

        let (records, disagreements) = filter_disagreements(records);

        Ok(PreparedResults {
            track: track.unwrap_or(TrackKind::Standard),
            records,
            reruns_collapsed,
            disagreements,
        })
    }

    pub fn score(&self, prepared: &PreparedResults, policy: &ScoringPolicy) -> ScoringRun {
        let ctx = self.context();
        tracing::info!(
            event = "podium.scoring.start",
            scoring = %policy.name,
            time_limit = policy.time_limit,
            sequential = policy.sequential,
            verdict = ?policy.verdict
        );

        let scored = score_records(&prepared.records, policy, &ctx);
        let standings = ranking::rank(&scored, policy.sequential, &ctx);

        tracing::info!(
            event = "podium.scoring.done",
            scoring = %policy.name,
            records = scored.len(),
            standings = standings.len()
        );
        ScoringRun {
            policy: policy.clone(),
            scored,
            standings,
        }
    }

    /// Full pipeline: prepare once, then score and rank under each policy.
    pub fn run<P: AsRef<Path>>(&self, inputs: &[P], policies: &[ScoringPolicy]) -> anyhow::Result<RunArtifacts> {
        if inputs.is_empty() {
            anyhow::bail!("no results files given");
        }
        let prepared = self.prepare(inputs)?;
        self.run_prepared(&prepared, inputs, policies)
    }

    pub fn run_prepared<P: AsRef<Path>>(
        &self,
        prepared: &PreparedResults,
        inputs: &[P],
        policies: &[ScoringPolicy],
    ) -> anyhow::Result<RunArtifacts> {
        let fp = fingerprint::compute(inputs, policies)?;
        let runs = policies.iter().map(|p| self.score(prepared, p)).collect();

        Ok(RunArtifacts {
            meta: RunMeta {
                competition: self.config.competition.clone(),
                year: self.config.year,
                track: self.config.track.clone(),
                track_kind: prepared.track,
                created_at: chrono::Utc::now().to_rfc3339(),
                fingerprint: fp.tagged(),
                inputs: inputs
                    .iter()
                    .map(|p| p.as_ref().display().to_string())
                    .collect(),
                records: prepared.records.len(),
                reruns_collapsed: prepared.reruns_collapsed,
                podium_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            disagreements: prepared.disagreements.clone(),
            runs,
        })
    }
}

/// Results files named on the command line, or every `*.csv` inside a
/// directory, sorted.
pub fn expand_inputs(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for p in paths {
        if p.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(p)
                .with_context(|| format!("failed to list {}", p.display()))?
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|f| f.extension().is_some_and(|ext| ext == "csv"))
                .collect();
            found.sort();
            out.extend(found);
        } else {
            out.push(p.clone());
        }
    }
    Ok(out)
}
