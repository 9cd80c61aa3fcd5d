use podium_core::errors::InputError;
use podium_core::rankings_api::{AggregateRanking, DivisionHighlight, RankingInput};

/// Winners that beat the runner-up by the widest margin.
pub struct BiggestLeadRanking;

pub fn lead_score(first: f64, second: f64) -> f64 {
    (1.0 + first) / (1.0 + second)
}

impl AggregateRanking for BiggestLeadRanking {
    fn name(&self) -> &'static str {
        "biggest_lead"
    }

    fn compute(&self, input: &RankingInput<'_>) -> Result<Vec<DivisionHighlight>, InputError> {
        let mut out = Vec::new();
        for division in input.competitive_divisions() {
            let ranked = input.competitive_standings(division);
            let (first, second) = match ranked.as_slice() {
                [first, second, ..] => (*first, *second),
                _ => {
                    return Err(InputError::Ranking(format!(
                        "division '{}' is flagged competitive but has {} competitive solver(s)",
                        division,
                        ranked.len()
                    )))
                }
            };

            out.push(DivisionHighlight {
                division: division.to_string(),
                division_size: first.division_size,
                solver: first.solver.clone(),
                solver_name: first.solver_name.clone(),
                runner_up: Some(second.solver.clone()),
                score: lead_score(first.score_correct, second.score_correct),
                secondary: 0.0,
            });
        }

        out.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.division.cmp(&b.division))
        });
        tracing::debug!(event = "podium.rankings.biggest_lead", divisions = out.len());
        Ok(out)
    }
}
