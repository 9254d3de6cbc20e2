//! End-to-end board flows against the in-memory backend.

use rstest::rstest;
use trellis::board::{
    adapters::memory::{Endpoint, InjectedFailure},
    domain::{BoardPosition, DragGesture, StatusId, TaskEdit, TaskId},
    ports::{RawId, RawTask},
    services::{DragOutcome, TaskSource},
};

use super::helpers::{Setup, empty, populated, titles_in};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn new_project_starts_with_default_columns(empty: Setup) -> Result<(), eyre::Report> {
    empty.sync.load().await?;
    assert!(empty.sync.board().columns().is_empty());

    let seeded = empty.sync.seed_default_statuses().await?;
    let todo = seeded
        .first()
        .map(|status| status.id().clone())
        .ok_or_else(|| eyre::eyre!("no status seeded"))?;
    empty.sync.create_task(&todo, "First task", "").await?;

    let other = empty.another_client();
    let report = other.sync.load().await?;
    let names: Vec<String> = other
        .sync
        .board()
        .columns()
        .iter()
        .map(|column| column.status().name().to_owned())
        .collect();
    assert_eq!(names, ["To Do", "In Progress", "Done"]);
    assert_eq!(report.tasks, 1);
    assert_eq!(titles_in(&other.sync.board(), &todo), ["First task"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moved_task_stays_moved_after_reload(populated: Setup) -> Result<(), eyre::Report> {
    populated.sync.load().await?;
    let gesture = DragGesture::new(TaskId::new("b"), BoardPosition::new("todo", 1))
        .dropped_at(BoardPosition::new("doing", 1));

    let outcome = populated.sync.drag_end(&gesture).await;
    eyre::ensure!(
        matches!(outcome, DragOutcome::Persisted { .. }),
        "move not persisted: {outcome:?}"
    );

    let other = populated.another_client();
    other.sync.load().await?;
    let board = other.sync.board();
    assert_eq!(
        board.locate(&TaskId::new("b")),
        Some(BoardPosition::new("doing", 1))
    );
    assert_eq!(titles_in(&board, &StatusId::new("doing")), ["Deploy", "Fix login"]);
    assert!(populated.notifier.notifications().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edits_and_deletes_reach_other_clients(populated: Setup) -> Result<(), eyre::Report> {
    populated.sync.load().await?;
    populated
        .sync
        .edit_task(&TaskId::new("a"), TaskEdit::new().content("with examples"))
        .await?;
    populated.sync.delete_task(&TaskId::new("d")).await?;

    let other = populated.another_client();
    other.sync.load().await?;
    let board = other.sync.board();
    assert_eq!(
        board.task(&TaskId::new("a")).map(|task| task.content().to_owned()),
        Some("with examples".to_owned())
    );
    assert!(board.task(&TaskId::new("d")).is_none());
    assert_eq!(board.task_count(), 3);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn column_reorder_and_removal_survive_reload(populated: Setup) -> Result<(), eyre::Report> {
    populated.sync.load().await?;
    populated.sync.move_status(2, 0).await?;
    populated.sync.delete_status(&StatusId::new("doing")).await?;

    let local: Vec<String> = populated
        .sync
        .board()
        .status_ids()
        .map(|id| id.as_str().to_owned())
        .collect();
    assert_eq!(local, ["done", "todo"]);

    let other = populated.another_client();
    other.sync.load().await?;
    let board = other.sync.board();
    assert!(!board.contains_status(&StatusId::new("doing")));
    assert!(board.task(&TaskId::new("c")).is_none());
    let done_order = populated
        .api
        .statuses()?
        .into_iter()
        .find(|status| status.id == Some(RawId::from("done")))
        .and_then(|status| status.order);
    assert_eq!(done_order, Some(0));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_picks_up_another_clients_edit(populated: Setup) -> Result<(), eyre::Report> {
    populated.sync.load().await?;
    let other = populated.another_client();
    other.sync.load().await?;
    other
        .sync
        .edit_task(
            &TaskId::new("b"),
            TaskEdit::new().content("reproduced on staging"),
        )
        .await?;

    let stale = populated
        .sync
        .board()
        .task(&TaskId::new("b"))
        .map(|task| task.content().to_owned());
    assert_eq!(stale.as_deref(), Some(""));

    let refreshed = populated.sync.refresh_task(&TaskId::new("b")).await?;

    assert_eq!(refreshed.content(), "reproduced on staging");
    assert_eq!(refreshed.index(), 1);
    assert_eq!(
        titles_in(&populated.sync.board(), &StatusId::new("todo")),
        ["Write docs", "Fix login"]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn renamed_column_is_seen_by_another_client(populated: Setup) -> Result<(), eyre::Report> {
    populated.sync.load().await?;

    populated.sync.rename_status(&StatusId::new("doing"), "Active").await?;

    let other = populated.another_client();
    other.sync.load().await?;
    let name = other
        .sync
        .board()
        .column(&StatusId::new("doing"))
        .map(|column| column.status().name().to_owned());
    assert_eq!(name.as_deref(), Some("Active"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_list_outage_is_covered_by_the_global_list(
    populated: Setup,
) -> Result<(), eyre::Report> {
    populated
        .api
        .add_foreign_tasks([RawTask::titled("z", "Someone else's", "triage")])?;
    populated
        .api
        .fail_next(Endpoint::ListProjectTasks, InjectedFailure::Server(500))?;

    let report = populated.sync.load().await?;

    assert_eq!(report.task_source, TaskSource::AllTasks);
    assert_eq!(report.tasks, 4);
    assert!(populated.sync.board().task(&TaskId::new("z")).is_none());
    assert!(populated.notifier.notifications().is_empty());
    Ok(())
}
