use crate::model::ResultRecord;
use std::collections::{BTreeMap, HashSet};

/// Un-normalized weight of a family holding `size` benchmarks:
/// `(1 + ln size) / size`.
pub fn raw_weight(size: usize) -> f64 {
    let n = size as f64;
    (1.0 + n.ln()) / n
}

/// Normalized per-family weights α′ for one division. When weighting is
/// disabled every family weighs 1.
#[derive(Debug, Clone, Default)]
pub struct FamilyWeights {
    enabled: bool,
    sizes: BTreeMap<String, usize>,
    weights: BTreeMap<String, f64>,
}

impl FamilyWeights {
    pub fn compute<'a>(records: impl IntoIterator<Item = &'a ResultRecord>, enabled: bool) -> Self {
        let mut members: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
        for r in records {
            members
                .entry(r.family.as_str())
                .or_default()
                .insert(r.benchmark.as_str());
        }

        let sizes: BTreeMap<String, usize> = members
            .into_iter()
            .map(|(family, benchmarks)| (family.to_string(), benchmarks.len()))
            .collect();

        let total: f64 = sizes
            .values()
            .map(|&size| size as f64 * raw_weight(size))
            .sum();

        let weights = sizes
            .iter()
            .map(|(family, &size)| (family.clone(), raw_weight(size) / total))
            .collect();

        Self {
            enabled,
            sizes,
            weights,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn family_count(&self) -> usize {
        self.sizes.len()
    }

    pub fn size(&self, family: &str) -> usize {
        self.sizes.get(family).copied().unwrap_or(0)
    }

    /// α′ of `family`; 1 when weighting is off or the family is unknown.
    pub fn weight(&self, family: &str) -> f64 {
        if !self.enabled {
            return 1.0;
        }
        self.weights.get(family).copied().unwrap_or(1.0)
    }

    /// Σ F_b × α′_b over all families.
    pub fn normalization_sum(&self) -> f64 {
        self.sizes
            .iter()
            .map(|(family, &size)| size as f64 * self.weight(family))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RunStatus, TrackData, Verdict};

    fn rec(family: &str, bench: &str, solver: &str) -> ResultRecord {
        ResultRecord {
            division: "QF_BV".into(),
            logic: "QF_BV".into(),
            family: family.into(),
            benchmark: format!("QF_BV/{family}/{bench}"),
            solver: solver.into(),
            solver_name: solver.into(),
            configuration: None,
            pair_id: None,
            cpu_time: 0.0,
            wallclock_time: 0.0,
            status: RunStatus::Complete,
            result: Verdict::Sat,
            expected: Verdict::Sat,
            track: TrackData::Standard,
        }
    }

    #[test]
    fn test_single_benchmark_family_raw_weight_is_one() {
        assert_eq!(raw_weight(1), 1.0);
        assert!((raw_weight(10) - (1.0 + 10f64.ln()) / 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_weights_normalize_to_one() {
        let mut records = Vec::new();
        for i in 0..50 {
            // two solvers per benchmark: sizes count distinct benchmarks
            records.push(rec("big", &format!("b{i}"), "s1"));
            records.push(rec("big", &format!("b{i}"), "s2"));
        }
        for i in 0..3 {
            records.push(rec("small", &format!("b{i}"), "s1"));
        }
        records.push(rec("single", "only", "s1"));

        let w = FamilyWeights::compute(&records, true);
        assert_eq!(w.family_count(), 3);
        assert_eq!(w.size("big"), 50);
        assert!((w.normalization_sum() - 1.0).abs() < 1e-9);
        // larger families weigh less per benchmark
        assert!(w.weight("big") < w.weight("small"));
        assert!(w.weight("small") < w.weight("single"));
    }

    #[test]
    fn test_disabled_weights_are_one() {
        let records = vec![rec("a", "x", "s"), rec("a", "y", "s"), rec("b", "z", "s")];
        let w = FamilyWeights::compute(&records, false);
        assert_eq!(w.weight("a"), 1.0);
        assert_eq!(w.weight("b"), 1.0);
    }
}
