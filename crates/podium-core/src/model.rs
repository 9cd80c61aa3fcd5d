use serde::{Deserialize, Serialize};

pub type SolverId = String;

/// A solver's answer, or a benchmark's known status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Sat,
    Unsat,
    #[serde(rename = "starexec-unknown", alias = "unknown")]
    Unknown,
}

impl Verdict {
    /// Parses the values found in `result` / `expected` columns.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sat" => Some(Verdict::Sat),
            "unsat" => Some(Verdict::Unsat),
            "starexec-unknown" | "unknown" | "" | "--" => Some(Verdict::Unknown),
            _ => None,
        }
    }

    pub fn is_definitive(&self) -> bool {
        !matches!(self, Verdict::Unknown)
    }

    pub fn opposite(&self) -> Option<Self> {
        match self {
            Verdict::Sat => Some(Verdict::Unsat),
            Verdict::Unsat => Some(Verdict::Sat),
            Verdict::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Sat => "sat",
            Verdict::Unsat => "unsat",
            Verdict::Unknown => "starexec-unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Complete,
    Timeout,
    Memout,
    Unknown,
}

impl RunStatus {
    /// Status strings carry suffixes such as `timeout (wallclock)`; only the
    /// prefix is significant.
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim().to_ascii_lowercase();
        if s.starts_with("complete") {
            Some(RunStatus::Complete)
        } else if s.starts_with("timeout") {
            Some(RunStatus::Timeout)
        } else if s.starts_with("memout") {
            Some(RunStatus::Memout)
        } else if s.starts_with("unknown") {
            Some(RunStatus::Unknown)
        } else {
            None
        }
    }
}

/// Which competition track a results table belongs to. Chosen once per table
/// from the columns it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Standard,
    Incremental,
    UnsatCore,
    ModelValidation,
    ProofExhibition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorStatus {
    Valid,
    Invalid,
    Unknown,
}

impl ValidatorStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "VALID" => ValidatorStatus::Valid,
            "INVALID" => ValidatorStatus::Invalid,
            _ => ValidatorStatus::Unknown,
        }
    }
}

/// Track-specific columns of a single row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TrackData {
    Standard,
    Incremental {
        correct_answers: f64,
        wrong_answers: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        num_check_sat: Option<f64>,
    },
    UnsatCore {
        reduction: f64,
        erroneous: bool,
    },
    ModelValidation {
        validator_status: ValidatorStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        validator_error: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        validator_exception: Option<String>,
    },
    ProofExhibition {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl TrackData {
    pub fn kind(&self) -> TrackKind {
        match self {
            TrackData::Standard => TrackKind::Standard,
            TrackData::Incremental { .. } => TrackKind::Incremental,
            TrackData::UnsatCore { .. } => TrackKind::UnsatCore,
            TrackData::ModelValidation { .. } => TrackKind::ModelValidation,
            TrackData::ProofExhibition { .. } => TrackKind::ProofExhibition,
        }
    }
}

/// One (solver, benchmark) outcome after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub division: String,
    pub logic: String,
    pub family: String,
    /// Path starting at the logic component; unique within a division.
    pub benchmark: String,
    pub solver: SolverId,
    pub solver_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_id: Option<u64>,
    pub cpu_time: f64,
    pub wallclock_time: f64,
    pub status: RunStatus,
    pub result: Verdict,
    pub expected: Verdict,
    pub track: TrackData,
}

impl ResultRecord {
    /// The timing column that decides time-outs under the given mode.
    pub fn time(&self, sequential: bool) -> f64 {
        if sequential {
            self.cpu_time
        } else {
            self.wallclock_time
        }
    }

    /// A definitive answer that contradicts a known expected status.
    pub fn is_wrong(&self) -> bool {
        self.result.is_definitive() && self.expected.is_definitive() && self.result != self.expected
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverRegistration {
    pub id: SolverId,
    pub name: String,
    pub competing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_of: Option<SolverId>,
}

/// A record after the scorer has applied time limits, verdict filtering and
/// family weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: ResultRecord,
    pub competitive: bool,
    pub division_size: usize,
    pub family_weight: f64,
    pub correct: f64,
    pub correct_sat: f64,
    pub correct_unsat: f64,
    pub error: f64,
    pub score_correct: f64,
    pub score_error: f64,
    pub score_cpu_time: f64,
    pub score_wallclock_time: f64,
}

/// Aggregate of one solver's scored records within a division, plus its rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverStanding {
    pub division: String,
    pub solver: SolverId,
    pub solver_name: String,
    pub rank: u32,
    pub competitive: bool,
    pub division_competitive: bool,
    pub division_size: usize,
    pub correct: f64,
    pub correct_sat: f64,
    pub correct_unsat: f64,
    pub error: f64,
    pub score_correct: f64,
    pub score_error: f64,
    pub score_cpu_time: f64,
    pub score_wallclock_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictFilter {
    #[default]
    All,
    Sat,
    Unsat,
}

impl VerdictFilter {
    pub fn target(&self) -> Option<Verdict> {
        match self {
            VerdictFilter::All => None,
            VerdictFilter::Sat => Some(Verdict::Sat),
            VerdictFilter::Unsat => Some(Verdict::Unsat),
        }
    }
}

/// How the family of a benchmark is read off its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FamilyRule {
    /// First directory below the division.
    #[default]
    #[serde(rename = "top")]
    Top,
    /// Last directory before the file name.
    #[serde(rename = "bot", alias = "bottom")]
    Bottom,
}

/// Year in which verdict-filtered scoring switched to result-based exclusion.
pub const RESULT_BASED_EXCLUSION_SINCE: u32 = 2021;

/// One scoring kind (sequential, parallel, sat, unsat, 24s, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub name: String,
    pub time_limit: f64,
    pub sequential: bool,
    pub verdict: VerdictFilter,
    pub skip_unknown: bool,
    pub use_families: bool,
    pub year: u32,
}

impl ScoringPolicy {
    pub fn result_based_exclusion(&self) -> bool {
        self.year >= RESULT_BASED_EXCLUSION_SINCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_prefixes() {
        assert_eq!(RunStatus::parse("complete"), Some(RunStatus::Complete));
        assert_eq!(RunStatus::parse("timeout (wallclock)"), Some(RunStatus::Timeout));
        assert_eq!(RunStatus::parse("memout"), Some(RunStatus::Memout));
        assert_eq!(RunStatus::parse("unknown status"), Some(RunStatus::Unknown));
        assert_eq!(RunStatus::parse("enqueued"), None);
    }

    #[test]
    fn test_verdict_aliases() {
        assert_eq!(Verdict::parse("SAT"), Some(Verdict::Sat));
        assert_eq!(Verdict::parse("starexec-unknown"), Some(Verdict::Unknown));
        assert_eq!(Verdict::parse("--"), Some(Verdict::Unknown));
        assert_eq!(Verdict::parse("maybe"), None);
        assert_eq!(Verdict::Sat.opposite(), Some(Verdict::Unsat));
    }
}
