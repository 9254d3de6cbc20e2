//! Routes, bodies and headers the HTTP adapter sends.

use axum::http::Method;
use rstest::rstest;
use serde_json::json;
use trellis::board::{
    adapters::http::routes,
    domain::{ProjectId, StatusId, Task, TaskId},
    ports::{
        BoardApi, CreateStatusRequest, CreateTaskRequest, RawId, RawTask, StatusNameUpdate,
        StatusOrderUpdate, UpdateTaskRequest,
    },
};

use super::stub::{RecordedRequest, StubBackend, TOKEN};

fn only_request(stub: &StubBackend) -> Result<RecordedRequest, eyre::Report> {
    let requests = stub.requests();
    eyre::ensure!(requests.len() == 1, "expected one request, got {requests:?}");
    requests
        .into_iter()
        .next()
        .ok_or_else(|| eyre::eyre!("no request recorded"))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_list_is_fetched_with_the_bearer_token() -> Result<(), eyre::Report> {
    let stub = StubBackend::start().await?;
    stub.respond(
        Method::GET,
        routes::STATUS_LIST,
        200,
        r#"{"statuses":[{"id":"todo","name":"To Do","order":0},{"id":"done","name":"Done","order":1}]}"#,
    );

    let statuses = stub.client()?.list_statuses().await?;

    assert_eq!(statuses.len(), 2);
    let request = only_request(&stub)?;
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path, routes::STATUS_LIST);
    assert_eq!(request.authorization, Some(format!("Bearer {TOKEN}")));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_tasks_accept_a_bare_array() -> Result<(), eyre::Report> {
    let stub = StubBackend::start().await?;
    let project = ProjectId::new("p7");
    stub.respond(
        Method::GET,
        &routes::project_tasks(&project),
        200,
        r#"[{"id":12,"title":"Legacy","status":"todo","index":"oops"},"noise"]"#,
    );

    let tasks = stub.client()?.list_project_tasks(&project).await?;

    assert_eq!(tasks.len(), 1);
    let task = tasks.first().ok_or_else(|| eyre::eyre!("no task"))?;
    assert_eq!(task.id, Some(RawId::Number(12.into())));
    assert_eq!(task.title.as_deref(), Some("Legacy"));
    assert_eq!(task.index, None);
    assert_eq!(only_request(&stub)?.path, "/api/v1/project/project/p7/tasks/");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_update_puts_the_full_record() -> Result<(), eyre::Report> {
    let stub = StubBackend::start().await?;
    let task = Task::new(TaskId::new("t1"), "Ship", StatusId::new("done"))
        .with_content("notes")
        .with_index(2);
    let request = UpdateTaskRequest::describing(&task, &ProjectId::new("p1"));

    let echoed = stub.client()?.update_task(task.id(), &request).await?;

    assert_eq!(echoed, RawTask::default());
    let sent = only_request(&stub)?;
    assert_eq!(sent.method, Method::PUT);
    assert_eq!(sent.path, "/api/v1/project/task/t1/update/");
    assert_eq!(
        sent.body,
        Some(json!({
            "name": "Ship",
            "description": "notes",
            "project": "p1",
            "status": "done",
            "order": 2,
            "due_at": null,
            "assigned_to": null,
        }))
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_task_is_decoded_from_the_response() -> Result<(), eyre::Report> {
    let stub = StubBackend::start().await?;
    stub.respond(
        Method::POST,
        routes::TASK_CREATE,
        201,
        r#"{"id":"t9","name":"New","status":"todo","order":3}"#,
    );
    let request = CreateTaskRequest {
        name: "New".to_owned(),
        project: ProjectId::new("p1"),
        status: StatusId::new("todo"),
        description: String::new(),
    };

    let created = stub.client()?.create_task(&request).await?;

    assert_eq!(created.id, Some(RawId::from("t9")));
    assert_eq!(created.order, Some(3));
    assert_eq!(only_request(&stub)?.method, Method::POST);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_requests_use_their_routes() -> Result<(), eyre::Report> {
    let stub = StubBackend::start().await?;
    let client = stub.client()?;
    let status = StatusId::new("review");

    client
        .create_status(&CreateStatusRequest {
            name: "In Review".to_owned(),
            kind: "in_review".to_owned(),
            color: "#3498db".to_owned(),
            project: ProjectId::new("p1"),
            order: 2,
        })
        .await?;
    client
        .update_status_order(&status, &StatusOrderUpdate { order: 0 })
        .await?;
    client.delete_status(&status).await?;
    client.delete_task(&TaskId::new("t3")).await?;

    let sent: Vec<(Method, String)> = stub
        .requests()
        .into_iter()
        .map(|request| (request.method, request.path))
        .collect();
    assert_eq!(
        sent,
        [
            (Method::POST, routes::STATUS_CREATE.to_owned()),
            (Method::POST, "/api/v1/project/status/review/update/".to_owned()),
            (Method::DELETE, "/api/v1/project/status/review/".to_owned()),
            (Method::DELETE, "/api/v1/project/task/t3/delete/".to_owned()),
        ]
    );
    let bodies: Vec<_> = stub.requests().into_iter().map(|request| request.body).collect();
    assert_eq!(
        bodies.first().cloned().flatten().and_then(|body| body.get("type").cloned()),
        Some(json!("in_review"))
    );
    assert_eq!(bodies.get(1).cloned().flatten(), Some(json!({ "order": 0 })));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn all_tasks_are_listed_from_the_global_route() -> Result<(), eyre::Report> {
    let stub = StubBackend::start().await?;
    stub.respond(
        Method::GET,
        routes::TASK_LIST,
        200,
        r#"{"tasks":[{"id":"t1","name":"Mine","status":"todo"},{"id":"x1","name":"Theirs","status":"other"}]}"#,
    );

    let tasks = stub.client()?.list_all_tasks().await?;

    let ids: Vec<Option<RawId>> = tasks.into_iter().map(|task| task.id).collect();
    assert_eq!(ids, [Some(RawId::from("t1")), Some(RawId::from("x1"))]);
    let request = only_request(&stub)?;
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path, "/api/v1/project/task/");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn single_task_is_fetched_by_id() -> Result<(), eyre::Report> {
    let stub = StubBackend::start().await?;
    stub.respond(
        Method::GET,
        "/api/v1/project/task/t4/",
        200,
        r#"{"id":"t4","name":"Fetched","status":"done","order":1}"#,
    );

    let task = stub.client()?.get_task(&TaskId::new("t4")).await?;

    assert_eq!(task.name.as_deref(), Some("Fetched"));
    assert_eq!(task.status, Some(RawId::from("done")));
    assert_eq!(only_request(&stub)?.method, Method::GET);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_rename_posts_the_new_name() -> Result<(), eyre::Report> {
    let stub = StubBackend::start().await?;

    stub.client()?
        .update_status_name(
            &StatusId::new("review"),
            &StatusNameUpdate {
                name: "QA".to_owned(),
            },
        )
        .await?;

    let sent = only_request(&stub)?;
    assert_eq!(sent.method, Method::POST);
    assert_eq!(sent.path, "/api/v1/project/status/review/update/");
    assert_eq!(sent.body, Some(json!({ "name": "QA" })));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn identifiers_cannot_escape_their_path_segment() -> Result<(), eyre::Report> {
    let stub = StubBackend::start().await?;
    let client = stub.client()?;

    client.get_task(&TaskId::new("../status/x")).await?;
    client.delete_task(&TaskId::new("a b?c")).await?;

    let paths: Vec<String> = stub.requests().into_iter().map(|request| request.path).collect();
    assert_eq!(
        paths,
        [
            "/api/v1/project/task/..%2Fstatus%2Fx/",
            "/api/v1/project/task/a%20b%3Fc/delete/",
        ]
    );
    Ok(())
}
