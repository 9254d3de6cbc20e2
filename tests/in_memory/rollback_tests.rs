//! Optimistic changes undone when the in-memory backend refuses them.

use rstest::rstest;
use trellis::board::{
    adapters::memory::{Endpoint, InjectedFailure},
    domain::{BoardPosition, DragGesture, StatusId, TaskId},
    ports::NotificationLevel,
    services::DragOutcome,
};

use super::helpers::{Setup, populated};

fn drag(task: &str, from: (&str, usize), to: (&str, usize)) -> DragGesture {
    DragGesture::new(TaskId::new(task), BoardPosition::new(from.0, from.1))
        .dropped_at(BoardPosition::new(to.0, to.1))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refused_move_is_undone_locally_and_remotely(populated: Setup) -> Result<(), eyre::Report> {
    populated.sync.load().await?;
    let before = populated.sync.board();
    populated
        .api
        .fail_next(Endpoint::UpdateTask, InjectedFailure::Server(500))?;

    let outcome = populated.sync.drag_end(&drag("a", ("todo", 0), ("done", 0))).await;

    eyre::ensure!(
        matches!(outcome, DragOutcome::RolledBack { .. }),
        "expected rollback, got {outcome:?}"
    );
    assert_eq!(populated.sync.board(), before);
    let failures = populated.notifier.at_level(NotificationLevel::Failure);
    assert_eq!(failures.len(), 1);

    let other = populated.another_client();
    other.sync.load().await?;
    assert_eq!(
        other.sync.board().locate(&TaskId::new("a")),
        Some(BoardPosition::new("todo", 0))
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn later_moves_survive_an_earlier_rollback(populated: Setup) -> Result<(), eyre::Report> {
    populated.sync.load().await?;
    populated
        .api
        .fail_next(Endpoint::UpdateTask, InjectedFailure::Network)?;

    let first = populated.sync.drag_end(&drag("a", ("todo", 0), ("done", 0))).await;
    let second = populated.sync.drag_end(&drag("c", ("doing", 0), ("todo", 0))).await;

    eyre::ensure!(matches!(first, DragOutcome::RolledBack { .. }), "got {first:?}");
    eyre::ensure!(matches!(second, DragOutcome::Persisted { .. }), "got {second:?}");
    let board = populated.sync.board();
    assert_eq!(board.locate(&TaskId::new("c")), Some(BoardPosition::new("todo", 0)));
    assert_eq!(board.locate(&TaskId::new("a")), Some(BoardPosition::new("todo", 1)));
    assert_eq!(board.locate(&TaskId::new("b")), Some(BoardPosition::new("todo", 2)));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refused_column_move_keeps_the_column_order(populated: Setup) -> Result<(), eyre::Report> {
    populated.sync.load().await?;
    let before = populated.sync.board();
    populated
        .api
        .fail_next(Endpoint::UpdateStatusOrder, InjectedFailure::Server(409))?;

    let result = populated.sync.move_status(0, 2).await;

    eyre::ensure!(result.is_err(), "column move unexpectedly succeeded");
    assert_eq!(populated.sync.board(), before);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn degraded_load_shows_columns_and_retries_cleanly(populated: Setup) -> Result<(), eyre::Report> {
    populated
        .api
        .fail_next(Endpoint::ListProjectTasks, InjectedFailure::Network)?;
    populated
        .api
        .fail_next(Endpoint::ListAllTasks, InjectedFailure::Server(503))?;

    let degraded = populated.sync.load().await?;
    assert_eq!(degraded.columns, 3);
    assert_eq!(degraded.tasks, 0);
    assert!(degraded.tasks_error.is_some());

    let recovered = populated.sync.load().await?;
    assert!(recovered.tasks_error.is_none());
    assert_eq!(recovered.tasks, 4);
    assert!(recovered.revision > degraded.revision);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refused_rename_leaves_both_sides_on_the_old_name(
    populated: Setup,
) -> Result<(), eyre::Report> {
    populated.sync.load().await?;
    let before = populated.sync.board();
    populated
        .api
        .fail_next(Endpoint::UpdateStatusName, InjectedFailure::Network)?;

    let result = populated.sync.rename_status(&StatusId::new("doing"), "Active").await;

    eyre::ensure!(result.is_err(), "rename should fail, got {result:?}");
    assert_eq!(populated.sync.board(), before);
    let other = populated.another_client();
    other.sync.load().await?;
    let names: Vec<String> = other
        .sync
        .board()
        .columns()
        .iter()
        .map(|column| column.status().name().to_owned())
        .collect();
    assert_eq!(names, ["To Do", "In Progress", "Done"]);
    assert_eq!(populated.notifier.at_level(NotificationLevel::Failure).len(), 1);
    Ok(())
}
