//! Turns a raw results table into typed [`ResultRecord`]s.
//!
//! Column presence decides the track kind once per table; every row is then
//! parsed with that kind. Benchmark paths are split into division, family and
//! benchmark name according to a [`FamilyRule`].

use crate::divisions::DivisionResolver;
use crate::errors::InputError;
use crate::model::{
    FamilyRule, ResultRecord, RunStatus, TrackData, TrackKind, ValidatorStatus, Verdict,
};
use crate::table::{Column, Row, Table};
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Clone, Copy)]
pub struct NormalizeOptions<'a> {
    pub family_rule: FamilyRule,
    pub divisions: DivisionResolver<'a>,
}

impl Default for NormalizeOptions<'_> {
    fn default() -> Self {
        Self {
            family_rule: FamilyRule::Top,
            divisions: DivisionResolver::identity(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResultsTable {
    pub track: TrackKind,
    pub records: Vec<ResultRecord>,
    pub reruns_collapsed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkPath {
    pub logic: String,
    pub family: String,
    pub relative: String,
}

/// Logic names are upper-case identifiers such as `QF_LIA` or `QF_ABVFP`.
pub fn is_logic_segment(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        && s.chars().any(|c| c.is_ascii_uppercase())
}

/// Splits `[wrapper/]LOGIC/dir/.../file` into its parts.
pub fn split_benchmark(path: &str, rule: FamilyRule) -> Result<BenchmarkPath, InputError> {
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let division_err = |reason: &str| InputError::Division {
        benchmark: path.to_string(),
        reason: reason.to_string(),
    };

    let logic_idx = match parts.as_slice() {
        [first, ..] if is_logic_segment(first) => 0,
        [_, second, ..] if is_logic_segment(second) => 1,
        [] => return Err(division_err("empty benchmark path")),
        _ => {
            return Err(division_err(
                "no upper-case logic segment in the first two path components",
            ))
        }
    };

    let logic = parts[logic_idx];
    let rest = &parts[logic_idx + 1..];
    if rest.is_empty() {
        return Err(division_err("no benchmark below the division"));
    }

    let family = match rule {
        FamilyRule::Top => rest[0],
        FamilyRule::Bottom if rest.len() >= 2 => rest[rest.len() - 2],
        FamilyRule::Bottom => logic,
    };

    Ok(BenchmarkPath {
        logic: logic.to_string(),
        family: family.to_string(),
        relative: rest.join("/"),
    })
}

/// Selects the track kind from the columns present, checking that
/// companion columns come together.
pub fn detect_track(table: &Table) -> Result<TrackKind, InputError> {
    let require_pair = |a: &str, b: &str| -> Result<(), InputError> {
        if table.has(a) && !table.has(b) {
            return Err(InputError::Consistency(format!(
                "{}: column '{}' requires column '{}'",
                table.file(),
                a,
                b
            )));
        }
        Ok(())
    };

    require_pair("reduction", "result_is_erroneous")?;
    require_pair("wrong_answers", "correct_answers")?;
    require_pair("correct_answers", "wrong_answers")?;

    Ok(if table.has("reduction") {
        TrackKind::UnsatCore
    } else if table.has("wrong_answers") {
        TrackKind::Incremental
    } else if table.has("model_validator_status") {
        TrackKind::ModelValidation
    } else if table.has("reason") {
        TrackKind::ProofExhibition
    } else {
        TrackKind::Standard
    })
}

struct Columns {
    benchmark: Column,
    solver: Column,
    solver_name: Option<Column>,
    configuration: Option<Column>,
    pair_id: Option<Column>,
    cpu_time: Column,
    wallclock_time: Column,
    status: Column,
    result: Option<Column>,
    expected: Option<Column>,
    track: TrackColumns,
}

enum TrackColumns {
    Standard,
    Incremental {
        correct: Column,
        wrong: Column,
        check_sats: Option<Column>,
    },
    UnsatCore {
        reduction: Column,
        erroneous: Column,
    },
    ModelValidation {
        status: Column,
        error: Option<Column>,
        exception: Option<Column>,
    },
    ProofExhibition {
        reason: Column,
    },
}

impl Columns {
    fn resolve(table: &Table, kind: TrackKind) -> Result<Self, InputError> {
        let track = match kind {
            TrackKind::Standard => TrackColumns::Standard,
            TrackKind::Incremental => TrackColumns::Incremental {
                correct: table.require("correct_answers")?,
                wrong: table.require("wrong_answers")?,
                check_sats: table.column("num_check_sat"),
            },
            TrackKind::UnsatCore => TrackColumns::UnsatCore {
                reduction: table.require("reduction")?,
                erroneous: table.require("result_is_erroneous")?,
            },
            TrackKind::ModelValidation => TrackColumns::ModelValidation {
                status: table.require("model_validator_status")?,
                error: table.column("model_validator_error"),
                exception: table.column("model_validator_exception"),
            },
            TrackKind::ProofExhibition => TrackColumns::ProofExhibition {
                reason: table.require("reason")?,
            },
        };

        // incremental jobs report answer counts rather than a single verdict
        let result = if kind == TrackKind::Incremental {
            table.column("result")
        } else {
            Some(table.require("result")?)
        };

        Ok(Self {
            benchmark: table.require("benchmark")?,
            solver: table.require_any(&["solver_id", "solver"])?,
            solver_name: table.column("solver"),
            configuration: table.first_of(&["configuration_id", "configuration"]),
            pair_id: table.column("pair_id"),
            cpu_time: table.require("cpu_time")?,
            wallclock_time: table.require("wallclock_time")?,
            status: table.require("status")?,
            result,
            expected: table.column("expected"),
            track,
        })
    }
}

fn parse_verdict(row: &Row<'_>, col: Option<&Column>) -> Result<Verdict, InputError> {
    match col {
        None => Ok(Verdict::Unknown),
        Some(c) => Verdict::parse(row.get(c))
            .ok_or_else(|| row.invalid(c, "sat, unsat or starexec-unknown")),
    }
}

fn parse_track(row: &Row<'_>, cols: &TrackColumns) -> Result<TrackData, InputError> {
    Ok(match cols {
        TrackColumns::Standard => TrackData::Standard,
        TrackColumns::Incremental {
            correct,
            wrong,
            check_sats,
        } => TrackData::Incremental {
            correct_answers: row.parse_f64(correct)?,
            wrong_answers: row.parse_f64(wrong)?,
            num_check_sat: match check_sats {
                Some(c) if !row.get(c).is_empty() => Some(row.parse_f64(c)?),
                _ => None,
            },
        },
        TrackColumns::UnsatCore {
            reduction,
            erroneous,
        } => TrackData::UnsatCore {
            // unsolved rows leave the reduction empty
            reduction: if row.get(reduction).is_empty() {
                0.0
            } else {
                row.parse_f64(reduction)?
            },
            erroneous: row.parse_bool(erroneous)?,
        },
        TrackColumns::ModelValidation {
            status,
            error,
            exception,
        } => TrackData::ModelValidation {
            validator_status: ValidatorStatus::parse(row.get(status)),
            validator_error: row.get_opt(error.as_ref()).map(str::to_string),
            validator_exception: row.get_opt(exception.as_ref()).map(str::to_string),
        },
        TrackColumns::ProofExhibition { reason } => TrackData::ProofExhibition {
            reason: row.get_opt(Some(reason)).map(str::to_string),
        },
    })
}

fn parse_row(
    row: &Row<'_>,
    cols: &Columns,
    opts: &NormalizeOptions<'_>,
) -> Result<ResultRecord, InputError> {
    let path = row.get(&cols.benchmark);
    let split = split_benchmark(path, opts.family_rule)?;
    let division = opts.divisions.resolve(path, &split.logic)?;

    let solver = row.get(&cols.solver);
    if solver.is_empty() {
        return Err(row.invalid(&cols.solver, "a solver identifier"));
    }

    let pair_id = match &cols.pair_id {
        Some(c) if !row.get(c).is_empty() => Some(
            row.get(c)
                .parse::<u64>()
                .map_err(|_| row.invalid(c, "an integer pair id"))?,
        ),
        _ => None,
    };

    let status = RunStatus::parse(row.get(&cols.status))
        .ok_or_else(|| row.invalid(&cols.status, "complete, timeout, memout or unknown"))?;

    Ok(ResultRecord {
        division,
        family: split.family,
        benchmark: format!("{}/{}", split.logic, split.relative),
        logic: split.logic,
        solver: solver.to_string(),
        solver_name: row
            .get_opt(cols.solver_name.as_ref())
            .unwrap_or(solver)
            .to_string(),
        configuration: row.get_opt(cols.configuration.as_ref()).map(str::to_string),
        pair_id,
        cpu_time: row.parse_f64(&cols.cpu_time)?,
        wallclock_time: row.parse_f64(&cols.wallclock_time)?,
        status,
        result: parse_verdict(row, cols.result.as_ref())?,
        expected: parse_verdict(row, cols.expected.as_ref())?,
        track: parse_track(row, &cols.track)?,
    })
}

pub fn normalize(table: &Table, opts: &NormalizeOptions<'_>) -> Result<ResultsTable, InputError> {
    let track = detect_track(table)?;
    let cols = Columns::resolve(table, track)?;

    let mut records = Vec::with_capacity(table.len());
    for row in table.rows() {
        records.push(parse_row(&row, &cols, opts)?);
    }

    let (records, reruns_collapsed) = resolve_reruns(records);
    ensure_unique(&records)?;

    tracing::info!(
        event = "podium.ingest.loaded",
        file = %table.file(),
        track = ?track,
        rows = table.len(),
        records = records.len(),
        reruns_collapsed
    );

    Ok(ResultsTable {
        track,
        records,
        reruns_collapsed,
    })
}

pub fn load_results(path: &Path, opts: &NormalizeOptions<'_>) -> Result<ResultsTable, InputError> {
    let table = Table::read_path(path)?;
    normalize(&table, opts)
}

type PairKey = (String, String, String);

fn pair_key(r: &ResultRecord) -> PairKey {
    (r.division.clone(), r.benchmark.clone(), r.solver.clone())
}

/// Keeps one record per (division, benchmark, solver): the highest pair id
/// when both rows carry one, otherwise the later row.
pub fn resolve_reruns(records: Vec<ResultRecord>) -> (Vec<ResultRecord>, usize) {
    let mut slot: HashMap<PairKey, usize> = HashMap::new();
    let mut out: Vec<ResultRecord> = Vec::with_capacity(records.len());
    let mut collapsed = 0;

    for rec in records {
        match slot.get(&pair_key(&rec)) {
            Some(&i) => {
                collapsed += 1;
                let newer = match (out[i].pair_id, rec.pair_id) {
                    (Some(old), Some(new)) => new > old,
                    _ => true,
                };
                if newer {
                    out[i] = rec;
                }
            }
            None => {
                slot.insert(pair_key(&rec), out.len());
                out.push(rec);
            }
        }
    }

    if collapsed > 0 {
        tracing::debug!(event = "podium.ingest.reruns", collapsed);
    }
    (out, collapsed)
}

pub fn ensure_unique(records: &[ResultRecord]) -> Result<(), InputError> {
    let mut seen = HashSet::new();
    for r in records {
        if !seen.insert((&r.division, &r.benchmark, &r.solver)) {
            return Err(InputError::Duplicate {
                division: r.division.clone(),
                benchmark: r.benchmark.clone(),
                solver: r.solver.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::divisions::DivisionMap;

    fn table(data: &str) -> Table {
        Table::from_reader("results.csv", data.as_bytes()).unwrap()
    }

    #[test]
    fn test_split_top_and_bottom() {
        let p = "non-incremental/QF_LIA/CAV2009/cut/ex1.smt2";
        let top = split_benchmark(p, FamilyRule::Top).unwrap();
        assert_eq!(top.logic, "QF_LIA");
        assert_eq!(top.family, "CAV2009");
        assert_eq!(top.relative, "CAV2009/cut/ex1.smt2");

        let bot = split_benchmark(p, FamilyRule::Bottom).unwrap();
        assert_eq!(bot.family, "cut");

        let flat = split_benchmark("QF_BV/x.smt2", FamilyRule::Bottom).unwrap();
        assert_eq!(flat.family, "QF_BV");
    }

    #[test]
    fn test_split_rejects_unrecognized_division() {
        let err = split_benchmark("benchmarks/qf_lia/a/b.smt2", FamilyRule::Top).unwrap_err();
        assert!(matches!(err, InputError::Division { .. }));
        assert!(split_benchmark("QF_LIA", FamilyRule::Top).is_err());
        assert!(split_benchmark("", FamilyRule::Top).is_err());
    }

    #[test]
    fn test_normalize_standard_table() {
        let t = table(
            "Pair ID,Benchmark,Solver,Solver ID,Configuration ID,Status,CPU time,Wallclock time,Result,Expected\n\
             1,QF_LIA/fam/a.smt2,Yices,7,70,complete,1.5,1.6,sat,sat\n\
             2,QF_LIA/fam/b.smt2,Yices,7,70,timeout (wallclock),1200,1200.2,starexec-unknown,unsat\n",
        );
        let out = normalize(&t, &NormalizeOptions::default()).unwrap();
        assert_eq!(out.track, TrackKind::Standard);
        assert_eq!(out.records.len(), 2);
        let a = &out.records[0];
        assert_eq!(a.division, "QF_LIA");
        assert_eq!(a.benchmark, "QF_LIA/fam/a.smt2");
        assert_eq!(a.solver, "7");
        assert_eq!(a.solver_name, "Yices");
        assert_eq!(a.configuration.as_deref(), Some("70"));
        assert_eq!(out.records[1].status, RunStatus::Timeout);
        assert_eq!(out.records[1].expected, Verdict::Unsat);
    }

    #[test]
    fn test_missing_expected_means_unknown() {
        let t = table(
            "benchmark,solver,cpu time,wallclock time,status,result\n\
             QF_BV/f/a.smt2,s1,1,1,complete,sat\n",
        );
        let out = normalize(&t, &NormalizeOptions::default()).unwrap();
        assert_eq!(out.records[0].expected, Verdict::Unknown);
    }

    #[test]
    fn test_track_detection() {
        let inc = table(
            "benchmark,solver,cpu time,wallclock time,status,wrong-answers,correct-answers,num_check_sat\n\
             incremental/QF_BV/f/a.smt2,s1,3,3,complete,0,12,15\n",
        );
        let out = normalize(&inc, &NormalizeOptions::default()).unwrap();
        assert_eq!(out.track, TrackKind::Incremental);
        assert_eq!(
            out.records[0].track,
            TrackData::Incremental {
                correct_answers: 12.0,
                wrong_answers: 0.0,
                num_check_sat: Some(15.0)
            }
        );

        let core = table(
            "benchmark,solver,cpu time,wallclock time,status,result,expected,reduction,result-is-erroneous\n\
             QF_BV/f/a.smt2,s1,3,3,complete,unsat,unsat,40,false\n",
        );
        assert_eq!(detect_track(&core).unwrap(), TrackKind::UnsatCore);

        let mv = table("benchmark,solver,cpu time,wallclock time,status,result,model_validator_status\n");
        assert_eq!(detect_track(&mv).unwrap(), TrackKind::ModelValidation);

        let pe = table("benchmark,solver,cpu time,wallclock time,status,result,reason\n");
        assert_eq!(detect_track(&pe).unwrap(), TrackKind::ProofExhibition);
    }

    #[test]
    fn test_reduction_without_erroneous_column_is_fatal() {
        let t = table(
            "benchmark,solver,cpu time,wallclock time,status,result,reduction\n\
             QF_BV/f/a.smt2,s1,3,3,complete,unsat,40\n",
        );
        let err = normalize(&t, &NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, InputError::Consistency(_)));
    }

    #[test]
    fn test_bad_status_reports_row() {
        let t = table(
            "benchmark,solver,cpu time,wallclock time,status,result\n\
             QF_BV/f/a.smt2,s1,1,1,complete,sat\n\
             QF_BV/f/b.smt2,s1,1,1,exploded,sat\n",
        );
        match normalize(&t, &NormalizeOptions::default()).unwrap_err() {
            InputError::InvalidValue { row, column, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "status");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reruns_keep_highest_pair_id() {
        let t = table(
            "pair id,benchmark,solver,cpu time,wallclock time,status,result,expected\n\
             9,QF_BV/f/a.smt2,s1,5,5,complete,unsat,sat\n\
             4,QF_BV/f/a.smt2,s1,1,1,complete,sat,sat\n\
             12,QF_BV/f/a.smt2,s1,2,2,complete,sat,sat\n",
        );
        let out = normalize(&t, &NormalizeOptions::default()).unwrap();
        assert_eq!(out.reruns_collapsed, 2);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].pair_id, Some(12));
        assert_eq!(out.records[0].cpu_time, 2.0);
    }

    #[test]
    fn test_division_map_applies() {
        let map: DivisionMap = serde_yaml::from_str("single_query:\n  Arith: [LIA, LRA]\n").unwrap();
        let opts = NormalizeOptions {
            family_rule: FamilyRule::Top,
            divisions: map.for_track("single_query"),
        };
        let t = table(
            "benchmark,solver,cpu time,wallclock time,status,result\n\
             LIA/f/a.smt2,s1,1,1,complete,sat\n\
             LRA/f/a.smt2,s1,1,1,complete,sat\n",
        );
        let out = normalize(&t, &opts).unwrap();
        assert!(out.records.iter().all(|r| r.division == "Arith"));
        // same relative path, different logic: still distinct benchmarks
        assert_ne!(out.records[0].benchmark, out.records[1].benchmark);
    }
}
