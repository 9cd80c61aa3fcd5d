//! Per-record scoring under a [`ScoringPolicy`].
//!
//! Each record goes through, in order:
//! 1. verdict filtering (sat-only / unsat-only scorings zero out the other class),
//! 2. memout penalty (both times set to the limit),
//! 3. time-out rewriting (authoritative time above the limit),
//! 4. track-specific correct / error credit,
//! 5. family weighting.
//!
//! Nothing is aggregated here; see [`crate::ranking`].

use crate::families::FamilyWeights;
use crate::model::{
    ResultRecord, RunStatus, ScoredRecord, ScoringPolicy, TrackData, ValidatorStatus, Verdict,
};
use crate::registry::SolverRegistry;
use std::collections::{BTreeMap, HashSet};

/// Read-only lookups shared by every stage of a run.
#[derive(Clone, Copy)]
pub struct ScoringContext<'a> {
    pub registry: &'a SolverRegistry,
}

/// Whether a verdict-filtered scoring drops this record from consideration.
pub fn excluded_by_verdict(r: &ResultRecord, policy: &ScoringPolicy) -> bool {
    let Some(opposite) = policy.verdict.target().and_then(|v| v.opposite()) else {
        return false;
    };
    if policy.result_based_exclusion() {
        // a wrong answer of the scored class stays in and is penalized
        r.result == opposite || (!r.result.is_definitive() && r.expected == opposite)
    } else {
        r.expected == opposite || (r.expected == Verdict::Unknown && r.result == opposite)
    }
}

/// Applies verdict filtering and the time limit, returning the rewritten
/// record and whether it was filtered out.
fn apply_limits(record: &ResultRecord, policy: &ScoringPolicy) -> (ResultRecord, bool) {
    let mut r = record.clone();
    let limit = policy.time_limit;

    if excluded_by_verdict(&r, policy) {
        r.cpu_time = 0.0;
        r.wallclock_time = 0.0;
        r.result = Verdict::Unknown;
        return (r, true);
    }

    if r.status == RunStatus::Memout {
        r.cpu_time = limit;
        r.wallclock_time = limit;
    }

    if r.time(policy.sequential) > limit {
        r.status = RunStatus::Timeout;
        r.cpu_time = limit;
        r.wallclock_time = limit;
        // incremental answer counts were produced before the limit hit
        if !matches!(r.track, TrackData::Incremental { .. }) {
            r.result = Verdict::Unknown;
        }
    }

    (r, false)
}

/// (correct, error) credit of a record that already went through
/// [`apply_limits`].
fn credit(r: &ResultRecord, policy: &ScoringPolicy) -> (f64, f64) {
    let wrong = if r.is_wrong() { 1.0 } else { 0.0 };
    let solved_standard = r.result.is_definitive()
        && ((!policy.skip_unknown && r.expected == Verdict::Unknown) || r.result == r.expected);

    match &r.track {
        TrackData::Standard => (if solved_standard { 1.0 } else { 0.0 }, wrong),
        TrackData::Incremental {
            correct_answers,
            wrong_answers,
            ..
        } => (*correct_answers, *wrong_answers),
        TrackData::UnsatCore {
            reduction,
            erroneous,
        } => {
            if *erroneous {
                (0.0, 1.0)
            } else if r.result == Verdict::Unsat && solved_standard {
                (*reduction, wrong)
            } else {
                (0.0, wrong)
            }
        }
        TrackData::ModelValidation {
            validator_status, ..
        } => {
            let valid = r.result == Verdict::Sat && *validator_status == ValidatorStatus::Valid;
            let invalid = *validator_status == ValidatorStatus::Invalid;
            (
                if valid { 1.0 } else { 0.0 },
                if invalid { 1.0 } else { wrong },
            )
        }
        TrackData::ProofExhibition { reason } => {
            let checked = r.result == Verdict::Unsat && reason.is_none() && wrong == 0.0;
            (if checked { 1.0 } else { 0.0 }, wrong)
        }
    }
}

pub fn division_size(records: &[ResultRecord]) -> usize {
    records
        .iter()
        .map(|r| r.benchmark.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Scores every record of one division.
pub fn score_division(
    records: &[ResultRecord],
    policy: &ScoringPolicy,
    ctx: &ScoringContext<'_>,
) -> Vec<ScoredRecord> {
    let size = division_size(records);
    let weights = FamilyWeights::compute(records, policy.use_families);
    if weights.is_enabled() {
        tracing::debug!(
            event = "podium.families.weighted",
            families = weights.family_count(),
            benchmarks = size
        );
    }

    records
        .iter()
        .map(|original| {
            let (r, filtered) = apply_limits(original, policy);
            let (correct, error) = if filtered {
                (0.0, 0.0)
            } else {
                credit(&r, policy)
            };

            let alpha = weights.weight(&r.family);
            let modifier = if policy.use_families {
                alpha * size as f64
            } else {
                1.0
            };

            ScoredRecord {
                competitive: ctx.registry.is_competing(&r.solver),
                division_size: size,
                family_weight: alpha,
                correct,
                correct_sat: if r.result == Verdict::Sat { correct } else { 0.0 },
                correct_unsat: if r.result == Verdict::Unsat { correct } else { 0.0 },
                error,
                score_correct: correct * modifier,
                score_error: error * modifier,
                score_cpu_time: r.cpu_time * alpha,
                score_wallclock_time: r.wallclock_time * alpha,
                record: r,
            }
        })
        .collect()
}

/// Groups records by division and scores each division independently.
/// Output is ordered by division name, input order within a division.
pub fn score_records(
    records: &[ResultRecord],
    policy: &ScoringPolicy,
    ctx: &ScoringContext<'_>,
) -> Vec<ScoredRecord> {
    let mut by_division: BTreeMap<&str, Vec<ResultRecord>> = BTreeMap::new();
    for r in records {
        by_division
            .entry(r.division.as_str())
            .or_default()
            .push(r.clone());
    }

    let mut out = Vec::with_capacity(records.len());
    for (division, recs) in by_division {
        let scored = score_division(&recs, policy, ctx);
        tracing::debug!(
            event = "podium.scoring.division",
            scoring = %policy.name,
            division = %division,
            records = scored.len()
        );
        out.extend(scored);
    }
    out
}
