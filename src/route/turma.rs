use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::{self, Json};
use rocket::State;
use uuid::Uuid;

use super::{created, no_content, StoreState};
use crate::data::turma::db::{check_aluno_ids, TurmaCreateData, TurmaDbExt, TurmaUpdateData};
use crate::data::turma::{Turma, TurmaInclude, TurmaView};
use crate::data::ResourceDbExt;
use crate::resp::problem::{problems, Problem};

fn include(professor: bool, curso: bool, alunos: bool) -> TurmaInclude {
    TurmaInclude {
        professor,
        curso,
        alunos,
    }
}

/// Create a turma
#[utoipa::path(
    request_body = TurmaCreateData,
    responses(
        (status = 201, description = "Turma created, `Location` points to it"),
        (status = 400, description = "Invalid turma", body = Problem),
        (status = 500, description = "Data store failure", body = Problem),
    )
)]
#[post("/turmas", format = "application/json", data = "<turma>")]
#[tracing::instrument(skip(store))]
pub async fn turma_create(
    turma: Result<Json<TurmaCreateData>, json::Error<'_>>,
    store: &State<StoreState>,
) -> Result<status::Created<()>, Problem> {
    let turma = turma.map_err(problems::bad_body)?.into_inner();
    turma.validate()?;
    check_aluno_ids(store.inner().as_ref(), &turma.aluno_ids).await?;

    let turma = Turma::from(turma);
    store.create_resource(&turma).await?;

    Ok(created("/turmas", turma.id))
}

/// List turmas by weekday and start time
///
/// Each flag embeds the related documents into every turma.
#[utoipa::path(
    params(
        ("professor" = Option<bool>, Query, description = "Embed the professor"),
        ("curso" = Option<bool>, Query, description = "Embed the curso"),
        ("alunos" = Option<bool>, Query, description = "Embed enrolled alunos"),
    ),
    responses(
        (status = 200, description = "List of turmas", body = Vec<TurmaView>),
        (status = 422, description = "Invalid flag value", body = Problem),
        (status = 500, description = "Data store failure", body = Problem),
    )
)]
#[get("/turmas?<professor>&<curso>&<alunos>")]
#[tracing::instrument(skip(store))]
pub async fn turma_list(
    professor: bool,
    curso: bool,
    alunos: bool,
    store: &State<StoreState>,
) -> Result<Json<Vec<TurmaView>>, Problem> {
    let turmas = store
        .list_turmas(include(professor, curso, alunos))
        .await?;
    Ok(Json(turmas))
}

/// Get a turma
#[utoipa::path(
    params(
        ("id", description = "turma ID"),
        ("professor" = Option<bool>, Query, description = "Embed the professor"),
        ("curso" = Option<bool>, Query, description = "Embed the curso"),
        ("alunos" = Option<bool>, Query, description = "Embed enrolled alunos"),
    ),
    responses(
        (status = 200, description = "The turma", body = TurmaView),
        (status = 422, description = "Invalid id or flag value", body = Problem),
        (status = 404, description = "Turma doesn't exist"),
    )
)]
#[get("/turmas/<id>?<professor>&<curso>&<alunos>")]
#[tracing::instrument(skip(store))]
pub async fn turma_get(
    id: Uuid,
    professor: bool,
    curso: bool,
    alunos: bool,
    store: &State<StoreState>,
) -> Result<Option<Json<TurmaView>>, Problem> {
    let turma = store
        .get_turma(id, include(professor, curso, alunos))
        .await?;
    Ok(turma.map(Json))
}

/// Update some fields of a turma
#[utoipa::path(
    params(
        ("id", description = "turma ID")
    ),
    request_body = TurmaUpdateData,
    responses(
        (status = 204, description = "Turma updated"),
        (status = 400, description = "Invalid fields", body = Problem),
        (status = 404, description = "Turma doesn't exist"),
    )
)]
#[put("/turmas/<id>", format = "application/json", data = "<patch>")]
#[tracing::instrument(skip(store))]
pub async fn turma_update(
    id: Uuid,
    patch: Result<Json<TurmaUpdateData>, json::Error<'_>>,
    store: &State<StoreState>,
) -> Result<Status, Problem> {
    let patch = patch.map_err(problems::bad_body)?.into_inner();
    patch.validate()?;

    if patch.hora_inicial.is_some() != patch.hora_final.is_some() {
        match store.get_resource::<Turma>(id).await? {
            Some(stored) => patch.validate_against(&stored)?,
            None => return Ok(Status::NotFound),
        }
    }
    if let Some(aluno_ids) = &patch.aluno_ids {
        check_aluno_ids(store.inner().as_ref(), aluno_ids).await?;
    }

    let updated = store
        .update_resource::<Turma>(id, &patch.normalized())
        .await?;
    Ok(no_content(updated))
}

/// Delete a turma
#[utoipa::path(
    params(
        ("id", description = "turma ID")
    ),
    responses(
        (status = 204, description = "Turma deleted"),
        (status = 404, description = "Turma doesn't exist"),
    )
)]
#[delete("/turmas/<id>")]
#[tracing::instrument(skip(store))]
pub async fn turma_delete(id: Uuid, store: &State<StoreState>) -> Result<Status, Problem> {
    Ok(no_content(store.delete_resource::<Turma>(id).await?))
}

/// Enroll an aluno in a turma
///
/// Enrolling an aluno twice has no further effect.
#[utoipa::path(
    params(
        ("turma_id", description = "turma ID"),
        ("aluno_id", description = "aluno ID"),
    ),
    responses(
        (status = 204, description = "Aluno is enrolled"),
        (status = 404, description = "Turma or aluno doesn't exist"),
    )
)]
#[put("/turmas/<turma_id>/aluno/<aluno_id>")]
#[tracing::instrument(skip(store))]
pub async fn turma_add_aluno(
    turma_id: Uuid,
    aluno_id: Uuid,
    store: &State<StoreState>,
) -> Result<Status, Problem> {
    Ok(no_content(store.enroll(turma_id, aluno_id).await?))
}

/// Remove an aluno from a turma
#[utoipa::path(
    params(
        ("turma_id", description = "turma ID"),
        ("aluno_id", description = "aluno ID"),
    ),
    responses(
        (status = 204, description = "Aluno was removed"),
        (status = 404, description = "Turma doesn't exist or aluno isn't enrolled in it"),
    )
)]
#[delete("/turmas/<turma_id>/aluno/<aluno_id>")]
#[tracing::instrument(skip(store))]
pub async fn turma_remove_aluno(
    turma_id: Uuid,
    aluno_id: Uuid,
    store: &State<StoreState>,
) -> Result<Status, Problem> {
    Ok(no_content(store.unenroll(turma_id, aluno_id).await?))
}

#[cfg(test)]
mod turma_endpoints {
    use rocket::futures::future::join_all;
    use rocket::http::Status;
    use rocket::local::asynchronous::Client;
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::route::testing::*;

    async fn new_turma(client: &Client, dia: u8, hora: &str) -> Uuid {
        create(
            client,
            "/turmas",
            json!({ "diaSemana": dia, "horaInicial": hora }),
        )
        .await
    }

    async fn new_aluno(client: &Client, nome: &str) -> Uuid {
        create(client, "/alunos", json!({ "nome": nome })).await
    }

    async fn aluno_ids(client: &Client, turma: Uuid) -> Vec<String> {
        let (status, body) = get_json(client, &format!("/turmas/{}", turma)).await;
        assert_eq!(status, Status::Ok);
        body.expect("turma json")["alunoIds"]
            .as_array()
            .expect("alunoIds array")
            .iter()
            .map(|it| it.as_str().unwrap().to_string())
            .collect()
    }

    #[rocket::async_test]
    async fn created_turma_is_retrievable() {
        let client = client().await;
        let id = new_turma(&client, 3, "19:00").await;

        let (status, body) = get_json(&client, &format!("/turmas/{}", id)).await;
        assert_eq!(status, Status::Ok);
        let body = body.expect("turma json");
        assert_eq!(body["id"], json!(id.to_string()));
        assert_eq!(body["diaSemana"], json!(3));
        assert_eq!(body["horaInicial"], json!("19:00"));
        assert_eq!(body["alunoIds"], json!([]));
    }

    #[rocket::async_test]
    async fn missing_turma_is_an_empty_not_found() {
        let client = client().await;

        let response = client
            .get(format!("/turmas/{}", Uuid::new_v4()))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.into_string().await.unwrap_or_default(), "");
    }

    #[rocket::async_test]
    async fn list_is_sorted_by_weekday_then_start_time() {
        let client = client().await;
        for (dia, hora) in [(5, "08:00"), (1, "19:00"), (1, "07:30"), (3, "13:00")] {
            new_turma(&client, dia, hora).await;
        }

        let (status, body) = get_json(&client, "/turmas").await;
        assert_eq!(status, Status::Ok);
        let keys: Vec<(u64, String)> = body
            .expect("turma list")
            .as_array()
            .expect("an array")
            .iter()
            .map(|it| {
                (
                    it["diaSemana"].as_u64().unwrap(),
                    it["horaInicial"].as_str().unwrap().to_string(),
                )
            })
            .collect();

        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys.first(), Some(&(1, "07:30".to_string())));
    }

    #[rocket::async_test]
    async fn relations_are_only_embedded_when_requested() {
        let client = client().await;
        let curso = create(&client, "/cursos", json!({ "nome": "Redes" })).await;
        let professor = create(&client, "/professores", json!({ "nome": "Fausto" })).await;
        let turma = create(
            &client,
            "/turmas",
            json!({
                "diaSemana": 2,
                "horaInicial": "10:00",
                "cursoId": curso.to_string(),
                "professorId": professor.to_string(),
            }),
        )
        .await;
        let aluno = new_aluno(&client, "Ana").await;
        let response = client
            .put(format!("/turmas/{}/aluno/{}", turma, aluno))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NoContent);

        let (_, plain) = get_json(&client, "/turmas").await;
        let plain = &plain.expect("turma list")[0];
        for field in ["alunos", "curso", "professor"] {
            assert!(plain.get(field).is_none(), "{} is not requested", field);
        }

        let (_, joined) = get_json(&client, "/turmas?alunos=true").await;
        let joined = &joined.expect("turma list")[0];
        assert_eq!(joined["alunos"][0]["nome"], json!("Ana"));
        assert!(joined.get("curso").is_none());

        let (_, joined) =
            get_json(&client, "/turmas?professor=true&curso=true&alunos=true").await;
        let joined = &joined.expect("turma list")[0];
        assert_eq!(joined["curso"]["nome"], json!("Redes"));
        assert_eq!(joined["professor"]["nome"], json!("Fausto"));
        assert_eq!(joined["alunos"].as_array().map(Vec::len), Some(1));
    }

    #[rocket::async_test]
    async fn dangling_curso_is_embedded_as_null() {
        let client = client().await;
        let curso = create(&client, "/cursos", json!({ "nome": "Redes" })).await;
        let turma = create(
            &client,
            "/turmas",
            json!({ "diaSemana": 2, "horaInicial": "10:00", "cursoId": curso.to_string() }),
        )
        .await;
        client.delete(format!("/cursos/{}", curso)).dispatch().await;

        let (status, body) = get_json(&client, &format!("/turmas/{}?curso=true", turma)).await;
        assert_eq!(status, Status::Ok);
        assert_eq!(body.expect("turma json").get("curso"), Some(&Value::Null));
    }

    #[rocket::async_test]
    async fn adding_twice_keeps_one_occurrence() {
        let client = client().await;
        let turma = new_turma(&client, 1, "08:00").await;
        let aluno = new_aluno(&client, "Ana").await;

        for _ in 0..2 {
            let response = client
                .put(format!("/turmas/{}/aluno/{}", turma, aluno))
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::NoContent);
        }

        assert_eq!(aluno_ids(&client, turma).await, vec![aluno.to_string()]);
    }

    #[rocket::async_test]
    async fn adding_to_missing_turma_or_unknown_aluno_is_not_found() {
        let client = client().await;
        let turma = new_turma(&client, 1, "08:00").await;
        let aluno = new_aluno(&client, "Ana").await;

        let response = client
            .put(format!("/turmas/{}/aluno/{}", Uuid::new_v4(), aluno))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);

        let response = client
            .put(format!("/turmas/{}/aluno/{}", turma, Uuid::new_v4()))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
        assert!(aluno_ids(&client, turma).await.is_empty());
    }

    #[rocket::async_test]
    async fn removing_keeps_order_of_the_rest() {
        let client = client().await;
        let turma = new_turma(&client, 4, "18:00").await;
        let mut alunos = vec![];
        for nome in ["Ana", "Bruno", "Carla"] {
            let aluno = new_aluno(&client, nome).await;
            client
                .put(format!("/turmas/{}/aluno/{}", turma, aluno))
                .dispatch()
                .await;
            alunos.push(aluno.to_string());
        }

        let response = client
            .delete(format!("/turmas/{}/aluno/{}", turma, alunos[1]))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NoContent);

        assert_eq!(
            aluno_ids(&client, turma).await,
            vec![alunos[0].clone(), alunos[2].clone()]
        );
    }

    #[rocket::async_test]
    async fn removing_absent_aluno_is_not_found_and_changes_nothing() {
        let client = client().await;
        let turma = new_turma(&client, 4, "18:00").await;

        // No alunos at all yet.
        let response = client
            .delete(format!("/turmas/{}/aluno/{}", turma, Uuid::new_v4()))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);

        let aluno = new_aluno(&client, "Ana").await;
        client
            .put(format!("/turmas/{}/aluno/{}", turma, aluno))
            .dispatch()
            .await;

        let response = client
            .delete(format!("/turmas/{}/aluno/{}", turma, Uuid::new_v4()))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(aluno_ids(&client, turma).await, vec![aluno.to_string()]);

        let response = client
            .delete(format!("/turmas/{}/aluno/{}", Uuid::new_v4(), aluno))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn update_and_delete_missing_turma_are_not_found() {
        let client = client().await;
        let missing = Uuid::new_v4();

        let response = put_json(
            &client,
            &format!("/turmas/{}", missing),
            json!({ "sala": "B2" }),
        )
        .await;
        assert_eq!(response.status(), Status::NotFound);

        let response = client
            .delete(format!("/turmas/{}", missing))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);

        let (_, body) = get_json(&client, "/turmas").await;
        assert_eq!(body, Some(json!([])));
    }

    #[rocket::async_test]
    async fn update_validates_and_applies_patch() {
        let client = client().await;
        let turma = new_turma(&client, 1, "08:00").await;
        let uri = format!("/turmas/{}", turma);

        let response = put_json(&client, &uri, json!({ "diaSemana": 9 })).await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = put_json(&client, &uri, json!({ "id": Uuid::new_v4() })).await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = put_json(&client, &uri, json!({ "diaSemana": 2, "sala": "B2" })).await;
        assert_eq!(response.status(), Status::NoContent);

        let (_, body) = get_json(&client, &uri).await;
        let body = body.expect("turma json");
        assert_eq!(body["id"], json!(turma.to_string()));
        assert_eq!(body["diaSemana"], json!(2));
        assert_eq!(body["horaInicial"], json!("08:00"));
        assert_eq!(body["sala"], json!("B2"));

        let response = client.delete(uri.as_str()).dispatch().await;
        assert_eq!(response.status(), Status::NoContent);
        let (status, _) = get_json(&client, &uri).await;
        assert_eq!(status, Status::NotFound);
    }

    #[rocket::async_test]
    async fn patching_one_time_is_checked_against_the_stored_other() {
        let client = client().await;
        let turma = create(
            &client,
            "/turmas",
            json!({ "diaSemana": 1, "horaInicial": "08:00", "horaFinal": "10:00" }),
        )
        .await;
        let uri = format!("/turmas/{}", turma);

        let response = put_json(&client, &uri, json!({ "horaInicial": "11:00" })).await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = put_json(&client, &uri, json!({ "horaFinal": "07:00" })).await;
        assert_eq!(response.status(), Status::BadRequest);

        let (_, body) = get_json(&client, &uri).await;
        let body = body.expect("turma json");
        assert_eq!(body["horaInicial"], json!("08:00"));
        assert_eq!(body["horaFinal"], json!("10:00"));

        let response = put_json(&client, &uri, json!({ "horaInicial": "09:00" })).await;
        assert_eq!(response.status(), Status::NoContent);

        let response = put_json(
            &client,
            &format!("/turmas/{}", Uuid::new_v4()),
            json!({ "horaFinal": "12:00" }),
        )
        .await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn body_alunos_must_exist() {
        let client = client().await;
        let ghost = Uuid::new_v4();

        let response = post_json(
            &client,
            "/turmas",
            json!({ "diaSemana": 1, "horaInicial": "08:00", "alunoIds": [ghost] }),
        )
        .await;
        assert_eq!(response.status(), Status::BadRequest);
        let (_, body) = get_json(&client, "/turmas").await;
        assert_eq!(body, Some(json!([])));

        let aluno = new_aluno(&client, "Ana").await;
        let turma = create(
            &client,
            "/turmas",
            json!({ "diaSemana": 1, "horaInicial": "08:00", "alunoIds": [aluno] }),
        )
        .await;
        let uri = format!("/turmas/{}", turma);

        let response = put_json(&client, &uri, json!({ "alunoIds": [aluno, ghost] })).await;
        assert_eq!(response.status(), Status::BadRequest);
        let problem: Value = response.into_json().await.expect("problem json");
        assert_eq!(problem["field"], json!("alunoIds"));
        assert_eq!(aluno_ids(&client, turma).await, vec![aluno.to_string()]);

        let response = put_json(&client, &uri, json!({ "alunoIds": [] })).await;
        assert_eq!(response.status(), Status::NoContent);
        assert!(aluno_ids(&client, turma).await.is_empty());
    }

    #[rocket::async_test]
    async fn unparsable_flags_are_rejected() {
        let client = client().await;
        let turma = new_turma(&client, 1, "08:00").await;

        let response = client.get("/turmas?alunos=maybe").dispatch().await;
        assert_eq!(response.status(), Status::UnprocessableEntity);

        let response = client
            .get(format!("/turmas/{}?curso=2", turma))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::UnprocessableEntity);

        let (status, _) = get_json(&client, "/turmas?alunos=false&curso=true").await;
        assert_eq!(status, Status::Ok);
    }

    #[rocket::async_test]
    async fn concurrent_enrollment_changes_serialize() {
        let client = client().await;
        let turma = new_turma(&client, 1, "08:00").await;
        let aluno = new_aluno(&client, "Ana").await;
        let uri = format!("/turmas/{}/aluno/{}", turma, aluno);

        let adds = (0..8).map(|_| client.put(uri.clone()).dispatch());
        for response in join_all(adds).await {
            assert_eq!(response.status(), Status::NoContent);
        }
        assert_eq!(aluno_ids(&client, turma).await, vec![aluno.to_string()]);

        let removes = (0..4).map(|_| client.delete(uri.clone()).dispatch());
        let removed = join_all(removes)
            .await
            .iter()
            .filter(|it| it.status() == Status::NoContent)
            .count();
        assert_eq!(removed, 1, "exactly one removal applies");
        assert!(aluno_ids(&client, turma).await.is_empty());
    }
}
