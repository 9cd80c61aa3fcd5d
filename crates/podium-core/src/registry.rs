use crate::errors::InputError;
use crate::model::{SolverId, SolverRegistration};
use crate::table::Table;
use std::collections::BTreeMap;
use std::path::Path;

/// Registered solvers keyed by id. Solvers missing from the registry are
/// competitive and their own base identity.
#[derive(Debug, Clone, Default)]
pub struct SolverRegistry {
    by_id: BTreeMap<SolverId, SolverRegistration>,
}

impl SolverRegistry {
    pub fn new(registrations: impl IntoIterator<Item = SolverRegistration>) -> Self {
        Self {
            by_id: registrations
                .into_iter()
                .map(|r| (r.id.clone(), r))
                .collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, InputError> {
        let table = Table::read_path(path)?;
        Self::from_table(&table)
    }

    pub fn from_table(table: &Table) -> Result<Self, InputError> {
        let id_col = table.require_any(&["solver_id", "final_solver_id", "id"])?;
        let name_col = table.first_of(&["solver_name", "name", "solver"]);
        let competing_col = table.column("competing");
        let variant_col = table.column("variant_of");

        let mut regs = Vec::with_capacity(table.len());
        for row in table.rows() {
            let id = row.get(&id_col);
            if id.is_empty() {
                return Err(row.invalid(&id_col, "a solver id"));
            }
            let competing = match &competing_col {
                Some(c) if !row.get(c).is_empty() => row.parse_bool(c)?,
                _ => true,
            };
            regs.push(SolverRegistration {
                id: id.to_string(),
                name: row.get_opt(name_col.as_ref()).unwrap_or(id).to_string(),
                competing,
                variant_of: row.get_opt(variant_col.as_ref()).map(str::to_string),
            });
        }

        tracing::debug!(
            event = "podium.registry.loaded",
            file = %table.file(),
            solvers = regs.len()
        );
        Ok(Self::new(regs))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SolverRegistration> {
        self.by_id.get(id)
    }

    pub fn is_competing(&self, id: &str) -> bool {
        self.get(id).map(|r| r.competing).unwrap_or(true)
    }

    pub fn display_name<'a>(&'a self, id: &'a str, fallback: &'a str) -> &'a str {
        self.get(id).map(|r| r.name.as_str()).unwrap_or(fallback)
    }

    /// Follows `variant_of` links to the root solver. Every member of a
    /// `variant_of` cycle resolves to the smallest id in that cycle.
    pub fn base_identity<'a>(&'a self, id: &'a str) -> &'a str {
        let mut path: Vec<&str> = Vec::new();
        let mut current = id;
        loop {
            if let Some(start) = path.iter().position(|p| *p == current) {
                return path[start..].iter().copied().min().unwrap_or(current);
            }
            path.push(current);
            match self.get(current).and_then(|r| r.variant_of.as_deref()) {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_from_csv() {
        let data = "Solver ID,Solver Name,Competing,Variant Of\n\
                    10,Z3,no,\n\
                    11,cvc5,yes,\n\
                    12,cvc5-fixed,YES,11\n";
        let t = Table::from_reader("solvers.csv", data.as_bytes()).unwrap();
        let reg = SolverRegistry::from_table(&t).unwrap();
        assert_eq!(reg.len(), 3);
        assert!(!reg.is_competing("10"));
        assert!(reg.is_competing("12"));
        assert!(reg.is_competing("unregistered"));
        assert_eq!(reg.display_name("11", "x"), "cvc5");
        assert_eq!(reg.display_name("99", "fallback"), "fallback");
        assert_eq!(reg.base_identity("12"), "11");
        assert_eq!(reg.base_identity("99"), "99");
    }

    #[test]
    fn test_variant_cycle_resolves_to_one_base() {
        let reg = SolverRegistry::new(vec![
            SolverRegistration {
                id: "a".into(),
                name: "a".into(),
                competing: true,
                variant_of: Some("b".into()),
            },
            SolverRegistration {
                id: "b".into(),
                name: "b".into(),
                competing: true,
                variant_of: Some("a".into()),
            },
            SolverRegistration {
                id: "c".into(),
                name: "c".into(),
                competing: true,
                variant_of: Some("b".into()),
            },
        ]);
        assert_eq!(reg.base_identity("a"), "a");
        assert_eq!(reg.base_identity("b"), "a");
        assert_eq!(reg.base_identity("c"), "a");
    }

    #[test]
    fn test_bad_competing_flag() {
        let data = "solver id,competing\n1,perhaps\n";
        let t = Table::from_reader("solvers.csv", data.as_bytes()).unwrap();
        let err = SolverRegistry::from_table(&t).unwrap_err();
        assert!(matches!(err, InputError::InvalidValue { row: 1, .. }));
    }
}
