use std::sync::Arc;

use podium_core::rankings_api::AggregateRanking;

pub mod biggest_lead;
pub mod largest_contribution;

pub fn default_rankings() -> Vec<Arc<dyn AggregateRanking>> {
    vec![
        Arc::new(biggest_lead::BiggestLeadRanking),
        Arc::new(largest_contribution::LargestContributionRanking),
    ]
}
