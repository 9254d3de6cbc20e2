//! When steps for board synchronisation scenarios.

use super::world::{BoardWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use trellis::board::domain::{BoardPosition, DragGesture, StatusId, TaskId};

#[when("the board is loaded")]
fn board_gets_loaded(world: &mut BoardWorld) -> Result<(), eyre::Report> {
    world.load().wrap_err("load board for scenario")
}

#[when(
    r#"task "{id}" is dragged from "{from}" position {source:usize} to "{to}" position {destination:usize}"#
)]
#[expect(
    clippy::too_many_arguments,
    reason = "Step definition captures both ends of the drag from a single step"
)]
fn task_is_dragged(
    world: &mut BoardWorld,
    id: String,
    from: String,
    source: usize,
    to: String,
    destination: usize,
) -> Result<(), eyre::Report> {
    let gesture = DragGesture::new(TaskId::new(id), BoardPosition::new(from, source))
        .dropped_at(BoardPosition::new(to, destination));
    let outcome = run_async(world.client()?.sync.drag_end(&gesture));
    world.last_drag = Some(outcome);
    Ok(())
}

#[when(r#"a task with a blank title is created in column "{status}""#)]
fn blank_task_is_created(world: &mut BoardWorld, status: String) -> Result<(), eyre::Report> {
    let result = run_async(
        world
            .client()?
            .sync
            .create_task(&StatusId::new(status), "   ", ""),
    );
    world.last_create = Some(result);
    Ok(())
}
