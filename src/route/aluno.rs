use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::{self, Json};
use rocket::State;
use uuid::Uuid;

use super::{created, no_content, StoreState};
use crate::data::aluno::db::{AlunoCreateData, AlunoDbExt, AlunoUpdateData};
use crate::data::aluno::{Aluno, AlunoView};
use crate::data::turma::db::TurmaDbExt;
use crate::data::ResourceDbExt;
use crate::resp::problem::{problems, Problem};

/// Create an aluno
#[utoipa::path(
    request_body = AlunoCreateData,
    responses(
        (status = 201, description = "Aluno created, `Location` points to it"),
        (status = 400, description = "Invalid aluno", body = Problem),
        (status = 500, description = "Data store failure", body = Problem),
    )
)]
#[post("/alunos", format = "application/json", data = "<aluno>")]
#[tracing::instrument(skip(store))]
pub async fn aluno_create(
    aluno: Result<Json<AlunoCreateData>, json::Error<'_>>,
    store: &State<StoreState>,
) -> Result<status::Created<()>, Problem> {
    let aluno = aluno.map_err(problems::bad_body)?.into_inner();
    aluno.validate()?;

    let aluno = Aluno::from(aluno);
    store.create_resource(&aluno).await?;

    Ok(created("/alunos", aluno.id))
}

/// List alunos by name
#[utoipa::path(
    params(
        ("turmas" = Option<bool>, Query, description = "Embed the turmas of each aluno"),
    ),
    responses(
        (status = 200, description = "List of alunos", body = Vec<AlunoView>),
        (status = 422, description = "Invalid flag value", body = Problem),
        (status = 500, description = "Data store failure", body = Problem),
    )
)]
#[get("/alunos?<turmas>")]
#[tracing::instrument(skip(store))]
pub async fn aluno_list(
    turmas: bool,
    store: &State<StoreState>,
) -> Result<Json<Vec<AlunoView>>, Problem> {
    Ok(Json(store.list_alunos(turmas).await?))
}

/// Get an aluno
#[utoipa::path(
    params(
        ("id", description = "aluno ID"),
        ("turmas" = Option<bool>, Query, description = "Embed the turmas of the aluno"),
    ),
    responses(
        (status = 200, description = "The aluno", body = AlunoView),
        (status = 422, description = "Invalid id or flag value", body = Problem),
        (status = 404, description = "Aluno doesn't exist"),
    )
)]
#[get("/alunos/<id>?<turmas>")]
#[tracing::instrument(skip(store))]
pub async fn aluno_get(
    id: Uuid,
    turmas: bool,
    store: &State<StoreState>,
) -> Result<Option<Json<AlunoView>>, Problem> {
    let aluno = store.get_aluno(id, turmas).await?;
    Ok(aluno.map(Json))
}

/// Update some fields of an aluno
#[utoipa::path(
    params(
        ("id", description = "aluno ID")
    ),
    request_body = AlunoUpdateData,
    responses(
        (status = 204, description = "Aluno updated"),
        (status = 400, description = "Invalid fields", body = Problem),
        (status = 404, description = "Aluno doesn't exist"),
    )
)]
#[put("/alunos/<id>", format = "application/json", data = "<patch>")]
#[tracing::instrument(skip(store))]
pub async fn aluno_update(
    id: Uuid,
    patch: Result<Json<AlunoUpdateData>, json::Error<'_>>,
    store: &State<StoreState>,
) -> Result<Status, Problem> {
    let patch = patch.map_err(problems::bad_body)?.into_inner();
    patch.validate()?;

    Ok(no_content(store.update_resource::<Aluno>(id, &patch).await?))
}

/// Delete an aluno, removing it from all of its turmas
#[utoipa::path(
    params(
        ("id", description = "aluno ID")
    ),
    responses(
        (status = 204, description = "Aluno deleted"),
        (status = 404, description = "Aluno doesn't exist"),
    )
)]
#[delete("/alunos/<id>")]
#[tracing::instrument(skip(store))]
pub async fn aluno_delete(id: Uuid, store: &State<StoreState>) -> Result<Status, Problem> {
    Ok(no_content(store.delete_aluno(id).await?))
}

/// Enroll an aluno in a turma
#[utoipa::path(
    params(
        ("aluno_id", description = "aluno ID"),
        ("turma_id", description = "turma ID"),
    ),
    responses(
        (status = 204, description = "Aluno is enrolled"),
        (status = 404, description = "Turma or aluno doesn't exist"),
    )
)]
#[put("/alunos/<aluno_id>/turma/<turma_id>")]
#[tracing::instrument(skip(store))]
pub async fn aluno_add_turma(
    aluno_id: Uuid,
    turma_id: Uuid,
    store: &State<StoreState>,
) -> Result<Status, Problem> {
    Ok(no_content(store.enroll(turma_id, aluno_id).await?))
}

/// Remove an aluno from a turma
#[utoipa::path(
    params(
        ("aluno_id", description = "aluno ID"),
        ("turma_id", description = "turma ID"),
    ),
    responses(
        (status = 204, description = "Aluno was removed"),
        (status = 404, description = "Turma doesn't exist or aluno isn't enrolled in it"),
    )
)]
#[delete("/alunos/<aluno_id>/turma/<turma_id>")]
#[tracing::instrument(skip(store))]
pub async fn aluno_remove_turma(
    aluno_id: Uuid,
    turma_id: Uuid,
    store: &State<StoreState>,
) -> Result<Status, Problem> {
    Ok(no_content(store.unenroll(turma_id, aluno_id).await?))
}
