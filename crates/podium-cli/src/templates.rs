pub const DIVISIONS_YAML: &str = r#"# track -> division -> logics
single_query:
  Arith: [LIA, LRA, NIA, NRA]
  QF_LinearIntArith: [QF_LIA, QF_IDL, QF_LIRA]
  QF_Bitvec: [QF_BV, QF_ABV]
incremental:
  QF_Bitvec: [QF_BV]
"#;

pub const SOLVERS_CSV: &str = r#"solver_id,solver_name,competing,variant_of
12345,Example Solver,yes,
12346,Example Solver (fixed),yes,12345
99999,Last Year's Winner,no,
"#;
