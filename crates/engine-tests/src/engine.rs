#[cfg(test)]
mod tests {
    use crate::{
        memory::{Fault, MemoryExecutor},
        utils::{
            commit, dest_ids, dest_ref, fast_retry, ok, orders, row, rows, run_session,
            run_session_with, seed_orders, staging_ref,
        },
    };
    use connectors::sql::{
        base::{adapter::SqlExecutor, requests::ReadQuery},
        mssql::temp_table::{DEFAULT_STAGING_PREFIX, TempTable},
    };
    use engine_config::settings::Settings;
    use engine_core::{error::SinkError, retry::RetryPolicy};
    use engine_processing::{
        consumer::{
            DataConsumer, components::writer::TableWriter, staging::StagingGuard,
            upsert::UpsertPipeline,
        },
        error::PipelineError,
    };
    use model::{core::value::Value, execution::mode::WriteMode};
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tracing_test::traced_test;

    fn staging_inserts(executor: &MemoryExecutor) -> usize {
        executor
            .statements()
            .iter()
            .filter(|s| s.starts_with("INSERT INTO [dbo].[precog_temp_orders]"))
            .count()
    }

    // Scenario: the first two staging inserts hit a dropped connection.
    // Expected Outcome: the ingest is replayed and the session succeeds.
    #[traced_test]
    #[tokio::test]
    async fn transient_ingest_failure_is_retried() {
        let executor = Arc::new(MemoryExecutor::new());
        executor.fail_next("insert", Fault::Transient, 2);

        let outcome = run_session(
            executor.clone(),
            orders(None, None),
            WriteMode::Append,
            ok(vec![rows(&[1, 2, 3]), commit(3), rows(&[4, 5]), commit(5)]),
        )
        .await;

        outcome.result.unwrap();
        assert_eq!(dest_ids(&executor), [1, 2, 3, 4, 5]);
        assert_eq!(executor.rollbacks(), 2);
        // Three attempts for the first batch, one for the second.
        assert_eq!(staging_inserts(&executor), 4);
    }

    // Scenario: the rename of a Replace commit fails once after the old
    // destination was dropped.
    // Expected Outcome: the rollback restores the old table and the retried
    // step completes the swap.
    #[traced_test]
    #[tokio::test]
    async fn transient_replace_failure_is_retried_from_scratch() {
        let executor = Arc::new(MemoryExecutor::new());
        seed_orders(&executor, &[100]);
        executor.fail_next("rename_table", Fault::Transient, 1);

        let outcome = run_session(
            executor.clone(),
            orders(None, None),
            WriteMode::Replace,
            ok(vec![rows(&[1, 2]), commit(2)]),
        )
        .await;

        outcome.result.unwrap();
        assert_eq!(dest_ids(&executor), [1, 2]);
        assert_eq!(executor.table_names(), ["dbo.orders"]);
        assert_eq!(executor.rollbacks(), 1);
    }

    // Scenario: the commit closing the first ingest fails once.
    // Expected Outcome: the step is rolled back and replayed, rows land once.
    #[traced_test]
    #[tokio::test]
    async fn transient_commit_failure_is_retried() {
        let executor = Arc::new(MemoryExecutor::new());
        let dyn_executor: Arc<dyn SqlExecutor> = executor.clone();
        let (event_tx, event_rx) = mpsc::channel(4);
        let (offset_tx, mut offset_rx) = mpsc::channel(4);

        let mut pipeline = UpsertPipeline::start(
            dyn_executor,
            orders(Some("id"), None),
            WriteMode::Append,
            fast_retry(),
            DEFAULT_STAGING_PREFIX,
            event_rx,
            offset_tx,
        )
        .await
        .unwrap();

        // Staging setup is committed; the next commit belongs to the ingest.
        executor.fail_next("commit", Fault::Transient, 1);
        event_tx.send(Ok(rows(&[1]))).await.unwrap();
        event_tx.send(Ok(commit(1))).await.unwrap();
        drop(event_tx);

        let report = pipeline.run().await.unwrap();
        drop(pipeline);

        assert_eq!(report.rows, 1);
        assert_eq!(offset_rx.try_recv().unwrap(), crate::utils::offset(1));
        assert_eq!(dest_ids(&executor), [1]);
        assert_eq!(executor.rollbacks(), 1);
    }

    // Scenario: a non-retryable failure while staging rows.
    // Expected Outcome: one attempt, session fails, staging cleaned up, no
    // offset emitted.
    #[traced_test]
    #[tokio::test]
    async fn fatal_failure_is_not_retried() {
        let executor = Arc::new(MemoryExecutor::new());
        executor.fail_next("insert", Fault::Fatal, 1);

        let outcome = run_session(
            executor.clone(),
            orders(None, None),
            WriteMode::Append,
            ok(vec![rows(&[1]), commit(1)]),
        )
        .await;

        assert!(matches!(
            outcome.result,
            Err(PipelineError::Sink {
                source: SinkError::Db(_),
                ..
            })
        ));
        assert!(outcome.offsets.is_empty());
        assert_eq!(executor.rollbacks(), 1);
        assert!(executor.table(&staging_ref()).is_none());
        assert!(executor.table(&dest_ref()).is_none());
        assert_eq!(staging_inserts(&executor), 1);
    }

    #[traced_test]
    #[tokio::test]
    async fn exhausted_retries_fail_the_session() {
        let executor = Arc::new(MemoryExecutor::new());
        executor.fail_next("insert", Fault::Transient, 10);

        let outcome = run_session(
            executor.clone(),
            orders(None, None),
            WriteMode::Append,
            ok(vec![rows(&[1]), commit(1)]),
        )
        .await;

        let err = outcome.result.unwrap_err();
        assert!(
            matches!(
                &err,
                PipelineError::Sink {
                    source: SinkError::RetriesExhausted { stage: "ingest", .. },
                    ..
                }
            ),
            "unexpected error: {err:?}"
        );
        // Three attempts, each rolled back.
        assert_eq!(executor.rollbacks(), 3);
        assert!(executor.table(&staging_ref()).is_none());
    }

    // Scenario: the upstream stream fails after one commit.
    // Expected Outcome: the committed part stays, staging is dropped.
    #[traced_test]
    #[tokio::test]
    async fn upstream_failure_keeps_committed_rows() {
        let executor = Arc::new(MemoryExecutor::new());

        let outcome = run_session(
            executor.clone(),
            orders(None, None),
            WriteMode::Append,
            vec![
                Ok(rows(&[1, 2])),
                Ok(commit(2)),
                Ok(rows(&[3])),
                Err(PipelineError::Upstream("source went away".into())),
                Ok(commit(3)),
            ],
        )
        .await;

        assert!(matches!(outcome.result, Err(PipelineError::Upstream(_))));
        assert_eq!(outcome.offsets.len(), 1);
        assert_eq!(dest_ids(&executor), [1, 2]);
        assert!(executor.table(&staging_ref()).is_none());
    }

    #[traced_test]
    #[tokio::test]
    async fn closed_offset_channel_fails_after_commit() {
        let executor = Arc::new(MemoryExecutor::new());
        let (event_tx, event_rx) = mpsc::channel(4);
        let (offset_tx, offset_rx) = mpsc::channel(4);
        drop(offset_rx);

        let dyn_executor: Arc<dyn SqlExecutor> = executor.clone();
        let mut pipeline = UpsertPipeline::start(
            dyn_executor,
            orders(None, None),
            WriteMode::Append,
            fast_retry(),
            DEFAULT_STAGING_PREFIX,
            event_rx,
            offset_tx,
        )
        .await
        .unwrap();

        event_tx.send(Ok(rows(&[1]))).await.unwrap();
        event_tx.send(Ok(commit(1))).await.unwrap();
        drop(event_tx);

        let result = pipeline.run().await;
        assert!(matches!(result, Err(PipelineError::OffsetChannelClosed)));
        // The commit itself is durable.
        assert_eq!(dest_ids(&executor), [1]);
    }

    // Scenario: drop on a missing staging table and create on an existing
    // one are no-ops.
    #[traced_test]
    #[tokio::test]
    async fn staging_drop_and_create_are_idempotent() {
        let executor = Arc::new(MemoryExecutor::new());
        let dyn_executor: Arc<dyn SqlExecutor> = executor.clone();
        let staging = TempTable::new(dyn_executor, orders(None, None), DEFAULT_STAGING_PREFIX);

        staging.drop().await.unwrap();
        staging.create().await.unwrap();
        staging.ingest(&[row(1, "a")]).await.unwrap();
        staging.create().await.unwrap();
        staging.truncate().await.unwrap();
        staging.drop().await.unwrap();
        staging.drop().await.unwrap();
        staging.truncate().await.unwrap();

        let statements = executor.statements();
        let count = |prefix: &str| statements.iter().filter(|s| s.starts_with(prefix)).count();
        assert_eq!(count("CREATE TABLE"), 1);
        assert_eq!(count("DROP TABLE"), 1);
        assert_eq!(count("TRUNCATE TABLE"), 1);
        assert!(!staging.exists().await.unwrap());
    }

    #[traced_test]
    #[tokio::test]
    async fn staging_rejects_rows_of_wrong_width() {
        let executor = Arc::new(MemoryExecutor::new());
        let dyn_executor: Arc<dyn SqlExecutor> = executor.clone();
        let staging = TempTable::new(dyn_executor, orders(None, None), DEFAULT_STAGING_PREFIX);
        staging.create().await.unwrap();

        let err = staging.ingest(&[vec![Value::Int(1)]]).await.unwrap_err();
        assert!(err.to_string().contains("1 values"));
    }

    // Scenario: the staging guard goes out of scope without release.
    // Expected Outcome: the staging table is dropped by a spawned task.
    #[traced_test]
    #[tokio::test]
    async fn staging_guard_cleans_up_on_drop() {
        let executor = Arc::new(MemoryExecutor::new());
        let dyn_executor: Arc<dyn SqlExecutor> = executor.clone();
        let staging = TempTable::new(
            dyn_executor.clone(),
            orders(None, None),
            DEFAULT_STAGING_PREFIX,
        );

        let guard = StagingGuard::acquire(dyn_executor, staging).await.unwrap();
        assert!(executor.table(&staging_ref()).is_some());
        drop(guard);

        for _ in 0..10 {
            if executor.table(&staging_ref()).is_none() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(executor.table(&staging_ref()).is_none());
        let drops = executor
            .statements()
            .iter()
            .filter(|s| s.starts_with("DROP TABLE IF EXISTS [dbo].[precog_temp_orders]"))
            .count();
        assert_eq!(drops, 1);
    }

    #[traced_test]
    #[tokio::test]
    async fn staging_guard_release_is_idempotent() {
        let executor = Arc::new(MemoryExecutor::new());
        let dyn_executor: Arc<dyn SqlExecutor> = executor.clone();
        let staging = TempTable::new(
            dyn_executor.clone(),
            orders(None, None),
            DEFAULT_STAGING_PREFIX,
        );

        let mut guard = StagingGuard::acquire(dyn_executor, staging).await.unwrap();
        guard.release().await;
        guard.release().await;
        assert!(guard.is_released());

        let drops = executor
            .statements()
            .iter()
            .filter(|s| s.starts_with("DROP TABLE"))
            .count();
        assert_eq!(drops, 1);
    }

    // Scenario: the three-operation write surface used directly.
    #[traced_test]
    #[tokio::test]
    async fn table_writer_ingest_replace_append() {
        let executor = Arc::new(MemoryExecutor::new());
        seed_orders(&executor, &[9]);
        let dyn_executor: Arc<dyn SqlExecutor> = executor.clone();

        let mut writer = TableWriter::start(
            dyn_executor,
            orders(Some("id"), None),
            WriteMode::Replace,
            fast_retry(),
            DEFAULT_STAGING_PREFIX,
        )
        .await
        .unwrap();

        let result = writer.ingest(&[row(1, "a"), row(2, "b")]).await.unwrap();
        assert_eq!(result.rows_written, 2);
        writer.replace().await.unwrap();
        assert_eq!(dest_ids(&executor), [1, 2]);

        writer.ingest(&[row(2, "b2"), row(3, "c")]).await.unwrap();
        writer.append().await.unwrap();
        assert_eq!(dest_ids(&executor), [1, 2, 3]);

        writer.finish().await;
        assert!(executor.table(&staging_ref()).is_none());
    }

    #[traced_test]
    #[tokio::test]
    async fn settings_drive_a_session() {
        let json = r#"{
            "connection": {"host": "localhost", "user": "sa", "password": "x"},
            "write": {
                "mode": "replace",
                "path": ["dbo", "orders"],
                "columns": [
                    {"name": "id", "type": "BIGINT"},
                    {"name": "name", "type": "NVARCHAR(100)"}
                ],
                "id_column": "id"
            },
            "retry": {"max_attempts": 2, "base_delay_ms": 1, "max_delay_ms": 2}
        }"#;
        let settings = Settings::from_json(json).unwrap().validate().unwrap();
        let executor = Arc::new(MemoryExecutor::new());
        seed_orders(&executor, &[50]);

        let outcome = run_session_with(
            executor.clone(),
            Arc::new(settings.destination),
            settings.mode,
            settings.retry,
            ok(vec![rows(&[1]), commit(1)]),
        )
        .await;

        outcome.result.unwrap();
        assert_eq!(dest_ids(&executor), [1]);
    }

    // Scenario: an incremental read resumes at the offset.
    #[traced_test]
    #[tokio::test]
    async fn read_query_resumes_at_offset() {
        let executor = MemoryExecutor::new();
        seed_orders(&executor, &[1, 2, 3, 4]);

        let offset = crate::utils::offset(3);
        let query = ReadQuery::new(dest_ref(), Some(&offset)).unwrap();
        let rows = executor.query_rows(&query.statement()).await.unwrap();

        let ids: Vec<i64> = rows.iter().filter_map(|r| r[0].as_i64()).collect();
        assert_eq!(ids, [3, 4]);
        assert_eq!(
            executor.statements().last().map(String::as_str),
            Some("SELECT * FROM [dbo].[orders] WHERE [id] >= 3;")
        );
    }

    #[test]
    fn retry_policy_none_is_single_attempt() {
        assert_eq!(RetryPolicy::none().max_attempts, 1);
    }
}
