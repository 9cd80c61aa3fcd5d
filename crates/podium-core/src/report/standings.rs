use crate::model::SolverStanding;
use anyhow::Context;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Column layout of a standings CSV.
#[derive(Debug, Serialize)]
struct StandingRow<'a> {
    division: &'a str,
    solver_id: &'a str,
    solver: &'a str,
    rank: u32,
    competitive: bool,
    division_competitive: bool,
    division_size: usize,
    correct: f64,
    correct_sat: f64,
    correct_unsat: f64,
    error: f64,
    score_correct: f64,
    score_error: f64,
    score_cpu_time: f64,
    score_wallclock_time: f64,
}

impl<'a> From<&'a SolverStanding> for StandingRow<'a> {
    fn from(s: &'a SolverStanding) -> Self {
        Self {
            division: &s.division,
            solver_id: &s.solver,
            solver: &s.solver_name,
            rank: s.rank,
            competitive: s.competitive,
            division_competitive: s.division_competitive,
            division_size: s.division_size,
            correct: s.correct,
            correct_sat: s.correct_sat,
            correct_unsat: s.correct_unsat,
            error: s.error,
            score_correct: s.score_correct,
            score_error: s.score_error,
            score_cpu_time: s.score_cpu_time,
            score_wallclock_time: s.score_wallclock_time,
        }
    }
}

pub fn write_to<W: Write>(standings: &[SolverStanding], w: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    for s in standings {
        wtr.serialize(StandingRow::from(s))
            .context("failed to serialize standings row")?;
    }
    wtr.flush().context("failed to flush standings")?;
    Ok(())
}

pub fn write_csv(standings: &[SolverStanding], out: &Path) -> anyhow::Result<()> {
    let f = std::fs::File::create(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    write_to(standings, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standings_header_and_row() {
        let s = SolverStanding {
            division: "QF_LIA".into(),
            solver: "x-1".into(),
            solver_name: "X".into(),
            rank: 1,
            competitive: true,
            division_competitive: true,
            division_size: 3,
            correct: 2.0,
            correct_sat: 1.0,
            correct_unsat: 1.0,
            error: 0.0,
            score_correct: 2.0,
            score_error: 0.0,
            score_cpu_time: 15.0,
            score_wallclock_time: 15.5,
        };
        let mut buf = Vec::new();
        write_to(&[s], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "division,solver_id,solver,rank,competitive,division_competitive,division_size,correct,correct_sat,correct_unsat,error,score_correct,score_error,score_cpu_time,score_wallclock_time"
        );
        assert_eq!(
            lines.next().unwrap(),
            "QF_LIA,x-1,X,1,true,true,3,2.0,1.0,1.0,0.0,2.0,0.0,15.0,15.5"
        );
    }
}
