#[cfg(test)]
mod tests {
    use crate::{
        memory::MemoryExecutor,
        utils::{
            commit, delete, dest_ids, dest_ref, ok, orders, rows, run_session, seed_orders,
            staging_ref,
        },
    };
    use engine_core::error::SinkError;
    use engine_processing::{consumer::SessionReport, error::PipelineError};
    use model::{core::value::Value, execution::mode::WriteMode};
    use std::sync::Arc;
    use tracing_test::traced_test;

    // Scenario: Append mode, batches of 3 and 2 rows, a commit after each.
    // Expected Outcome: 5 rows, both offsets in input order, no staging table left.
    #[traced_test]
    #[tokio::test]
    async fn append_two_batches() {
        let executor = Arc::new(MemoryExecutor::new());

        let outcome = run_session(
            executor.clone(),
            orders(None, None),
            WriteMode::Append,
            ok(vec![rows(&[1, 2, 3]), commit(3), rows(&[4, 5]), commit(5)]),
        )
        .await;

        let report = outcome.result.unwrap();
        assert_eq!(
            report,
            SessionReport {
                batches: 2,
                rows: 5,
                deleted_keys: 0,
                commits: 2
            }
        );
        assert_eq!(outcome.offsets, [crate::utils::offset(3), crate::utils::offset(5)]);
        assert_eq!(dest_ids(&executor), [1, 2, 3, 4, 5]);
        assert!(executor.table(&staging_ref()).is_none());
        assert_eq!(executor.table_names(), ["dbo.orders"]);
    }

    // Scenario: Append mode keeps rows already in the destination.
    #[traced_test]
    #[tokio::test]
    async fn append_keeps_existing_rows() {
        let executor = Arc::new(MemoryExecutor::new());
        seed_orders(&executor, &[10, 11]);

        let outcome = run_session(
            executor.clone(),
            orders(None, None),
            WriteMode::Append,
            ok(vec![rows(&[1]), commit(1)]),
        )
        .await;

        outcome.result.unwrap();
        assert_eq!(dest_ids(&executor), [1, 10, 11]);
    }

    // Scenario: Upsert with id column `id`; first commit has ids 1 and 2,
    // second commit carries a new value for id 2.
    // Expected Outcome: exactly 2 rows, id 2 holding the updated value.
    #[traced_test]
    #[tokio::test]
    async fn upsert_replaces_matching_keys() {
        let executor = Arc::new(MemoryExecutor::new());
        let updated = model::events::data::DataEvent::Rows {
            rows: vec![crate::utils::row(2, "updated")],
        };

        let outcome = run_session(
            executor.clone(),
            orders(Some("id"), None),
            WriteMode::Append,
            ok(vec![rows(&[1, 2]), commit(2), updated, commit(3)]),
        )
        .await;

        outcome.result.unwrap();
        assert_eq!(outcome.offsets.len(), 2);

        let table = executor.table(&dest_ref()).unwrap();
        assert_eq!(table.rows.len(), 2);
        let id2 = table
            .rows
            .iter()
            .find(|r| r[0] == Value::Int(2))
            .expect("id 2 present");
        assert_eq!(id2[1], Value::String("updated".into()));
    }

    // Scenario: Create mode against an existing destination.
    // Expected Outcome: access denied before any write; destination untouched.
    #[traced_test]
    #[tokio::test]
    async fn create_rejects_existing_destination() {
        let executor = Arc::new(MemoryExecutor::new());
        seed_orders(&executor, &[1, 2]);

        let outcome = run_session(
            executor.clone(),
            orders(None, None),
            WriteMode::Create,
            ok(vec![rows(&[3]), commit(3)]),
        )
        .await;

        let err = outcome.result.unwrap_err();
        assert!(
            matches!(
                &err,
                PipelineError::Sink {
                    source: SinkError::DestinationExists { .. },
                    ..
                }
            ),
            "unexpected error: {err:?}"
        );
        assert!(err.to_string().contains("Access denied"));
        assert!(err.to_string().contains("/orders"));

        assert!(outcome.offsets.is_empty());
        assert_eq!(dest_ids(&executor), [1, 2]);
        assert_eq!(executor.table_names(), ["dbo.orders"]);
        assert!(
            !executor
                .statements()
                .iter()
                .any(|sql| sql.starts_with("CREATE TABLE") || sql.starts_with("INSERT"))
        );
    }

    // Scenario: Create mode on a fresh destination with id and filter columns.
    // Expected Outcome: table created with one index per distinct key column.
    #[traced_test]
    #[tokio::test]
    async fn create_builds_destination_with_indexes() {
        let executor = Arc::new(MemoryExecutor::new());

        let outcome = run_session(
            executor.clone(),
            orders(Some("id"), Some("name")),
            WriteMode::Create,
            ok(vec![rows(&[1, 2]), commit(2), rows(&[3]), commit(3)]),
        )
        .await;

        outcome.result.unwrap();
        let table = executor.table(&dest_ref()).unwrap();
        assert_eq!(table.indexes, ["orders_name_idx", "orders_id_idx"]);
        assert_eq!(dest_ids(&executor), [1, 2, 3]);
    }

    #[traced_test]
    #[tokio::test]
    async fn create_skips_duplicate_index_when_keys_coincide() {
        let executor = Arc::new(MemoryExecutor::new());

        run_session(
            executor.clone(),
            orders(Some("id"), Some("id")),
            WriteMode::Create,
            ok(vec![rows(&[1]), commit(1)]),
        )
        .await
        .result
        .unwrap();

        let table = executor.table(&dest_ref()).unwrap();
        assert_eq!(table.indexes, ["orders_id_idx"]);
    }

    // Scenario: Replace mode with an existing destination.
    // Expected Outcome: only the new rows, one table with the destination
    // name and no leftover staging table.
    #[traced_test]
    #[tokio::test]
    async fn replace_swaps_destination() {
        let executor = Arc::new(MemoryExecutor::new());
        seed_orders(&executor, &[100, 101, 102]);

        let outcome = run_session(
            executor.clone(),
            orders(Some("id"), None),
            WriteMode::Replace,
            ok(vec![rows(&[1, 2]), commit(2), rows(&[2, 3]), commit(3)]),
        )
        .await;

        outcome.result.unwrap();
        assert_eq!(dest_ids(&executor), [1, 2, 3]);
        assert_eq!(executor.table_names(), ["dbo.orders"]);
        assert!(
            executor
                .statements()
                .iter()
                .any(|sql| sql == "EXEC sp_rename N'[dbo].[precog_temp_orders]', N'orders';")
        );
    }

    #[traced_test]
    #[tokio::test]
    async fn replace_creates_missing_destination() {
        let executor = Arc::new(MemoryExecutor::new());

        run_session(
            executor.clone(),
            orders(None, Some("id")),
            WriteMode::Replace,
            ok(vec![rows(&[7]), commit(7)]),
        )
        .await
        .result
        .unwrap();

        let table = executor.table(&dest_ref()).unwrap();
        assert_eq!(dest_ids(&executor), [7]);
        // The staging index travels with the rename.
        assert_eq!(table.indexes, ["precog_temp_orders_id_idx"]);
    }

    // Scenario: Truncate mode empties the destination in place.
    #[traced_test]
    #[tokio::test]
    async fn truncate_empties_then_loads() {
        let executor = Arc::new(MemoryExecutor::new());
        seed_orders(&executor, &[100, 101, 102]);

        run_session(
            executor.clone(),
            orders(None, None),
            WriteMode::Truncate,
            ok(vec![rows(&[1]), commit(1), rows(&[2]), commit(2)]),
        )
        .await
        .result
        .unwrap();

        assert_eq!(dest_ids(&executor), [1, 2]);
        assert!(
            executor
                .statements()
                .contains(&"TRUNCATE TABLE [dbo].[orders];".to_string())
        );
        assert!(!executor.statements().iter().any(|sql| sql.starts_with("DROP TABLE IF EXISTS [dbo].[orders]")));
    }

    #[traced_test]
    #[tokio::test]
    async fn truncate_creates_missing_destination() {
        let executor = Arc::new(MemoryExecutor::new());

        run_session(
            executor.clone(),
            orders(None, None),
            WriteMode::Truncate,
            ok(vec![rows(&[1, 2]), commit(2)]),
        )
        .await
        .result
        .unwrap();

        assert_eq!(dest_ids(&executor), [1, 2]);
    }

    // Scenario: deletes recorded between commits are applied at the next one.
    #[traced_test]
    #[tokio::test]
    async fn deletes_apply_at_next_commit() {
        let executor = Arc::new(MemoryExecutor::new());

        let outcome = run_session(
            executor.clone(),
            orders(Some("id"), None),
            WriteMode::Append,
            ok(vec![
                rows(&[1, 2, 3]),
                commit(3),
                delete(&[2]),
                rows(&[4]),
                commit(4),
            ]),
        )
        .await;

        let report = outcome.result.unwrap();
        assert_eq!(report.deleted_keys, 1);
        assert_eq!(dest_ids(&executor), [1, 3, 4]);
    }

    #[traced_test]
    #[tokio::test]
    async fn first_commit_append_applies_deletes_to_existing_rows() {
        let executor = Arc::new(MemoryExecutor::new());
        seed_orders(&executor, &[1, 2]);

        run_session(
            executor.clone(),
            orders(Some("id"), None),
            WriteMode::Append,
            ok(vec![delete(&[1]), rows(&[3]), commit(3)]),
        )
        .await
        .result
        .unwrap();

        assert_eq!(dest_ids(&executor), [2, 3]);
    }

    #[traced_test]
    #[tokio::test]
    async fn replace_discards_deletes_before_first_commit() {
        let executor = Arc::new(MemoryExecutor::new());
        seed_orders(&executor, &[1, 2]);

        run_session(
            executor.clone(),
            orders(Some("id"), None),
            WriteMode::Replace,
            ok(vec![delete(&[1]), rows(&[5]), commit(5)]),
        )
        .await
        .result
        .unwrap();

        assert_eq!(dest_ids(&executor), [5]);
        assert!(!executor.statements().iter().any(|sql| sql.contains(" IN (")));
    }

    #[traced_test]
    #[tokio::test]
    async fn delete_without_id_column_fails() {
        let executor = Arc::new(MemoryExecutor::new());

        let outcome = run_session(
            executor.clone(),
            orders(None, None),
            WriteMode::Append,
            ok(vec![rows(&[1]), commit(1), delete(&[1])]),
        )
        .await;

        assert!(matches!(
            outcome.result,
            Err(PipelineError::DeleteWithoutId { .. })
        ));
        // The commit before the bad event stays durable.
        assert_eq!(outcome.offsets.len(), 1);
        assert_eq!(dest_ids(&executor), [1]);
        assert!(executor.table(&staging_ref()).is_none());
    }

    // Scenario: many commits; offsets come out in the order they went in.
    #[traced_test]
    #[tokio::test]
    async fn offsets_follow_commit_order() {
        let executor = Arc::new(MemoryExecutor::new());
        let mut events = Vec::new();
        for n in 1..=10 {
            events.push(rows(&[n]));
            events.push(commit(n));
        }

        let outcome = run_session(
            executor.clone(),
            orders(Some("id"), None),
            WriteMode::Append,
            ok(events),
        )
        .await;

        outcome.result.unwrap();
        let expected: Vec<_> = (1..=10).map(crate::utils::offset).collect();
        assert_eq!(outcome.offsets, expected);
        assert_eq!(dest_ids(&executor), (1..=10).collect::<Vec<_>>());
    }

    // Scenario: a commit marker with nothing staged still acknowledges.
    #[traced_test]
    #[tokio::test]
    async fn empty_commit_emits_offset() {
        let executor = Arc::new(MemoryExecutor::new());

        let outcome = run_session(
            executor.clone(),
            orders(None, None),
            WriteMode::Append,
            ok(vec![commit(0)]),
        )
        .await;

        outcome.result.unwrap();
        assert_eq!(outcome.offsets.len(), 1);
        assert_eq!(executor.row_count(&dest_ref()), Some(0));
    }
}
