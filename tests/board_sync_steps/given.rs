//! Given steps for board synchronisation scenarios.

use super::world::BoardWorld;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use trellis::board::{
    adapters::memory::{Endpoint, InjectedFailure},
    ports::{RawDescription, RawId, RawStatus, RawTask},
};

#[given(r#"a backend with columns "{first}" and "{second}""#)]
fn backend_with_columns(world: &mut BoardWorld, first: String, second: String) {
    world.statuses = vec![
        RawStatus::named(&first, &first, 0),
        RawStatus::named(&second, &second, 1),
    ];
}

#[given(r#"task "{id}" titled "{title}" in column "{status}""#)]
fn task_in_column(world: &mut BoardWorld, id: String, title: String, status: String) {
    let order = world.tasks.len();
    world.tasks.push(
        RawTask::titled(&id, &title, &status).with_order(i64::try_from(order).unwrap_or(0)),
    );
}

#[given(r#"task record "{id}" in column "{status}" without a title and with details "{details}""#)]
fn untitled_record(world: &mut BoardWorld, id: String, status: String, details: String) {
    world.tasks.push(RawTask {
        id: Some(RawId::from(id.as_str())),
        status: Some(RawId::from(status.as_str())),
        description: Some(RawDescription::Wrapped { details }),
        ..RawTask::default()
    });
}

#[given("the board is loaded")]
fn board_is_loaded(world: &mut BoardWorld) -> Result<(), eyre::Report> {
    world.load().wrap_err("load board for scenario")
}

#[given("the backend refuses the next task update")]
fn backend_refuses_update(world: &mut BoardWorld) -> Result<(), eyre::Report> {
    world
        .client()?
        .api
        .fail_next(Endpoint::UpdateTask, InjectedFailure::Server(500))
        .wrap_err("queue update failure")
}
