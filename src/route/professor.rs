use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::{self, Json};
use rocket::State;
use uuid::Uuid;

use super::{created, no_content, StoreState};
use crate::data::professor::db::{ProfessorCreateData, ProfessorUpdateData};
use crate::data::professor::Professor;
use crate::data::ResourceDbExt;
use crate::resp::problem::{problems, Problem};

/// Create a professor
#[utoipa::path(
    request_body = ProfessorCreateData,
    responses(
        (status = 201, description = "Professor created, `Location` points to it"),
        (status = 400, description = "Invalid professor", body = Problem),
        (status = 500, description = "Data store failure", body = Problem),
    )
)]
#[post("/professores", format = "application/json", data = "<professor>")]
#[tracing::instrument(skip(store))]
pub async fn professor_create(
    professor: Result<Json<ProfessorCreateData>, json::Error<'_>>,
    store: &State<StoreState>,
) -> Result<status::Created<()>, Problem> {
    let professor = professor.map_err(problems::bad_body)?.into_inner();
    professor.validate()?;

    let professor = Professor::from(professor);
    store.create_resource(&professor).await?;

    Ok(created("/professores", professor.id))
}

/// List all professores by name
#[utoipa::path(
    responses(
        (status = 200, description = "List of professores", body = Vec<Professor>),
        (status = 500, description = "Data store failure", body = Problem),
    )
)]
#[get("/professores")]
#[tracing::instrument(skip(store))]
pub async fn professor_list(
    store: &State<StoreState>,
) -> Result<Json<Vec<Professor>>, Problem> {
    Ok(Json(store.list_resources::<Professor>().await?))
}

/// Get a professor
#[utoipa::path(
    params(
        ("id", description = "professor ID")
    ),
    responses(
        (status = 200, description = "The professor", body = Professor),
        (status = 404, description = "Professor doesn't exist"),
    )
)]
#[get("/professores/<id>")]
#[tracing::instrument(skip(store))]
pub async fn professor_get(
    id: Uuid,
    store: &State<StoreState>,
) -> Result<Option<Json<Professor>>, Problem> {
    Ok(store.get_resource::<Professor>(id).await?.map(Json))
}

/// Update some fields of a professor
#[utoipa::path(
    params(
        ("id", description = "professor ID")
    ),
    request_body = ProfessorUpdateData,
    responses(
        (status = 204, description = "Professor updated"),
        (status = 400, description = "Invalid fields", body = Problem),
        (status = 404, description = "Professor doesn't exist"),
    )
)]
#[put("/professores/<id>", format = "application/json", data = "<patch>")]
#[tracing::instrument(skip(store))]
pub async fn professor_update(
    id: Uuid,
    patch: Result<Json<ProfessorUpdateData>, json::Error<'_>>,
    store: &State<StoreState>,
) -> Result<Status, Problem> {
    let patch = patch.map_err(problems::bad_body)?.into_inner();
    patch.validate()?;

    Ok(no_content(store.update_resource::<Professor>(id, &patch).await?))
}

/// Delete a professor
#[utoipa::path(
    params(
        ("id", description = "professor ID")
    ),
    responses(
        (status = 204, description = "Professor deleted"),
        (status = 404, description = "Professor doesn't exist"),
    )
)]
#[delete("/professores/<id>")]
#[tracing::instrument(skip(store))]
pub async fn professor_delete(
    id: Uuid,
    store: &State<StoreState>,
) -> Result<Status, Problem> {
    Ok(no_content(store.delete_resource::<Professor>(id).await?))
}
