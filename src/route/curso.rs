use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::{self, Json};
use rocket::State;
use uuid::Uuid;

use super::{created, no_content, StoreState};
use crate::data::curso::db::{CursoCreateData, CursoUpdateData};
use crate::data::curso::Curso;
use crate::data::ResourceDbExt;
use crate::resp::problem::{problems, Problem};

/// Create a curso
#[utoipa::path(
    request_body = CursoCreateData,
    responses(
        (status = 201, description = "Curso created, `Location` points to it"),
        (status = 400, description = "Invalid curso", body = Problem),
        (status = 500, description = "Data store failure", body = Problem),
    )
)]
#[post("/cursos", format = "application/json", data = "<curso>")]
#[tracing::instrument(skip(store))]
pub async fn curso_create(
    curso: Result<Json<CursoCreateData>, json::Error<'_>>,
    store: &State<StoreState>,
) -> Result<status::Created<()>, Problem> {
    let curso = curso.map_err(problems::bad_body)?.into_inner();
    curso.validate()?;

    let curso = Curso::from(curso);
    store.create_resource(&curso).await?;

    Ok(created("/cursos", curso.id))
}

/// List all cursos by name
#[utoipa::path(
    responses(
        (status = 200, description = "List of cursos", body = Vec<Curso>),
        (status = 500, description = "Data store failure", body = Problem),
    )
)]
#[get("/cursos")]
#[tracing::instrument(skip(store))]
pub async fn curso_list(store: &State<StoreState>) -> Result<Json<Vec<Curso>>, Problem> {
    Ok(Json(store.list_resources::<Curso>().await?))
}

/// Get a curso
#[utoipa::path(
    params(
        ("id", description = "curso ID")
    ),
    responses(
        (status = 200, description = "The curso", body = Curso),
        (status = 404, description = "Curso doesn't exist"),
    )
)]
#[get("/cursos/<id>")]
#[tracing::instrument(skip(store))]
pub async fn curso_get(
    id: Uuid,
    store: &State<StoreState>,
) -> Result<Option<Json<Curso>>, Problem> {
    Ok(store.get_resource::<Curso>(id).await?.map(Json))
}

/// Update some fields of a curso
#[utoipa::path(
    params(
        ("id", description = "curso ID")
    ),
    request_body = CursoUpdateData,
    responses(
        (status = 204, description = "Curso updated"),
        (status = 400, description = "Invalid fields", body = Problem),
        (status = 404, description = "Curso doesn't exist"),
    )
)]
#[put("/cursos/<id>", format = "application/json", data = "<patch>")]
#[tracing::instrument(skip(store))]
pub async fn curso_update(
    id: Uuid,
    patch: Result<Json<CursoUpdateData>, json::Error<'_>>,
    store: &State<StoreState>,
) -> Result<Status, Problem> {
    let patch = patch.map_err(problems::bad_body)?.into_inner();
    patch.validate()?;

    Ok(no_content(store.update_resource::<Curso>(id, &patch).await?))
}

/// Delete a curso
#[utoipa::path(
    params(
        ("id", description = "curso ID")
    ),
    responses(
        (status = 204, description = "Curso deleted"),
        (status = 404, description = "Curso doesn't exist"),
    )
)]
#[delete("/cursos/<id>")]
#[tracing::instrument(skip(store))]
pub async fn curso_delete(id: Uuid, store: &State<StoreState>) -> Result<Status, Problem> {
    Ok(no_content(store.delete_resource::<Curso>(id).await?))
}

#[cfg(test)]
mod curso_endpoints {
    use rocket::http::Status;
    use serde_json::json;

    use crate::route::testing::*;

    #[rocket::async_test]
    async fn created_curso_is_retrievable() {
        let client = client().await;

        let id = create(
            &client,
            "/cursos",
            json!({ "nome": "Análise de Sistemas", "cargaHoraria": 2400 }),
        )
        .await;

        let (status, body) = get_json(&client, &format!("/cursos/{}", id)).await;
        assert_eq!(status, Status::Ok);
        let body = body.expect("curso json");
        assert_eq!(body["id"], json!(id.to_string()));
        assert_eq!(body["nome"], json!("Análise de Sistemas"));
        assert_eq!(body["cargaHoraria"], json!(2400));
    }

    #[rocket::async_test]
    async fn cursos_are_listed_by_name() {
        let client = client().await;
        for nome in ["Redes", "Análise", "Mecatrônica"] {
            create(&client, "/cursos", json!({ "nome": nome })).await;
        }

        let (status, body) = get_json(&client, "/cursos").await;
        assert_eq!(status, Status::Ok);
        let names: Vec<String> = body
            .expect("curso list")
            .as_array()
            .expect("an array")
            .iter()
            .map(|it| it["nome"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["Análise", "Mecatrônica", "Redes"]);
    }

    #[rocket::async_test]
    async fn blank_name_is_rejected() {
        let client = client().await;

        let response = post_json(&client, "/cursos", json!({ "nome": " " })).await;
        assert_eq!(response.status(), Status::BadRequest);

        let (_, body) = get_json(&client, "/cursos").await;
        assert_eq!(body, Some(json!([])));
    }

    #[rocket::async_test]
    async fn malformed_body_is_a_bad_request() {
        let client = client().await;

        let response = post_json(&client, "/cursos", json!({ "titulo": "Redes" })).await;
        assert_eq!(response.status(), Status::BadRequest);
        let problem: serde_json::Value = response.into_json().await.expect("problem json");
        assert_eq!(problem["status"], json!(400));
    }

    #[rocket::async_test]
    async fn update_and_delete_report_missing_cursos() {
        let client = client().await;
        let missing = uuid::Uuid::new_v4();

        let response = put_json(
            &client,
            &format!("/cursos/{}", missing),
            json!({ "nome": "Redes" }),
        )
        .await;
        assert_eq!(response.status(), Status::NotFound);

        let response = client
            .delete(format!("/cursos/{}", missing))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);

        let (_, body) = get_json(&client, "/cursos").await;
        assert_eq!(body, Some(json!([])), "nothing was created");
    }

    #[rocket::async_test]
    async fn update_changes_only_given_fields() {
        let client = client().await;
        let id = create(
            &client,
            "/cursos",
            json!({ "nome": "Redes", "descricao": "Diurno" }),
        )
        .await;

        let response = put_json(
            &client,
            &format!("/cursos/{}", id),
            json!({ "descricao": "Noturno" }),
        )
        .await;
        assert_eq!(response.status(), Status::NoContent);

        let (_, body) = get_json(&client, &format!("/cursos/{}", id)).await;
        let body = body.expect("curso json");
        assert_eq!(body["nome"], json!("Redes"));
        assert_eq!(body["descricao"], json!("Noturno"));

        let response = client.delete(format!("/cursos/{}", id)).dispatch().await;
        assert_eq!(response.status(), Status::NoContent);
        let (status, body) = get_json(&client, &format!("/cursos/{}", id)).await;
        assert_eq!(status, Status::NotFound);
        assert_eq!(body, None);
    }
}
