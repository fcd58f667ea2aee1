//! Random operation sequences agree with the snapshot-stack model.

use memdb_core::{Config, Database};
use memdb_protocol::{Command, NO_TRANSACTION, NULL};
use memdb_testkit::prelude::*;
use proptest::prelude::*;

fn reply_for(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Done => String::new(),
        Outcome::Value(Some(value)) => value.clone(),
        Outcome::Value(None) => NULL.to_owned(),
        Outcome::Count(count) => count.to_string(),
        Outcome::NoTransaction => NO_TRANSACTION.to_owned(),
    }
}

fn check_engine(config: Config, ops: &[Operation]) -> Result<(), TestCaseError> {
    let mut model = Model::new();
    let mut db = Database::with_config(config);

    for (i, op) in ops.iter().enumerate() {
        let expected = model.apply(op);
        let actual = apply_to_database(&mut db, op);
        prop_assert_eq!(actual, expected, "step {}: {:?}", i, op);
        prop_assert_eq!(db.depth(), model.depth());
    }
    Ok(())
}

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    #[test]
    fn engine_matches_model(ops in operation_sequence_strategy(1, 80)) {
        check_engine(Config::default(), &ops)?;
    }

    #[test]
    fn engine_without_compaction_matches_model(ops in operation_sequence_strategy(1, 80)) {
        check_engine(Config::new().compact_history(false), &ops)?;
    }

    #[test]
    fn protocol_matches_model(ops in operation_sequence_strategy(1, 60)) {
        let mut model = Model::new();
        let expected: Vec<String> = ops.iter().map(|op| reply_for(&model.apply(op))).collect();

        let mut input = String::new();
        for op in &ops {
            input.push_str(&op.to_command().to_string());
            input.push('\n');
        }
        input.push_str(&Command::End.to_string());

        let output = run_transcript(&input).unwrap();
        let actual: Vec<&str> = output.lines().collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn rollback_restores_parent_view(
        setup in operation_sequence_strategy(0, 20),
        inner in operation_sequence_strategy(0, 20),
        probes in prop::collection::vec(key_strategy(), 1..5),
    ) {
        let writes_only = |ops: Vec<Operation>| -> Vec<Operation> {
            ops.into_iter()
                .filter(|op| matches!(op, Operation::Set { .. } | Operation::Unset { .. }))
                .collect()
        };

        let mut db = Database::new();
        for op in &writes_only(setup) {
            apply_to_database(&mut db, op);
        }
        let before: Vec<_> = probes.iter().map(|k| db.get(k).ok()).collect();
        let counts_before: Vec<_> = ["0", "1", "2", "10", "x y"]
            .iter()
            .map(|v| db.num_equal_to(v))
            .collect();

        let tx = db.begin();
        let mut scope = tx.clone();
        for op in &writes_only(inner) {
            apply_to_database(&mut scope, op);
        }
        let db = tx.rollback().unwrap();

        let after: Vec<_> = probes.iter().map(|k| db.get(k).ok()).collect();
        let counts_after: Vec<_> = ["0", "1", "2", "10", "x y"]
            .iter()
            .map(|v| db.num_equal_to(v))
            .collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(counts_before, counts_after);
    }
}
