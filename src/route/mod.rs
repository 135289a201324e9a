use std::sync::Arc;

use rocket::http::Status;
use rocket::response::status;
use rocket::{Build, Rocket, Route};

pub mod aluno;
pub mod curso;
pub mod professor;
pub mod turma;

use aluno::*;
use curso::*;
use professor::*;
use turma::*;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::data::{
    aluno::{self as ad, db as adb},
    curso::{self as cd, db as cdb},
    professor::{self as pd, db as pdb},
    turma::{self as td, db as tdb},
};
use crate::resp::problem::Problem;
use crate::store::Store;

pub type StoreState = Arc<dyn Store>;

#[derive(OpenApi)]
#[openapi(
    paths(
        curso_create,
        curso_list,
        curso_get,
        curso_update,
        curso_delete,
        professor_create,
        professor_list,
        professor_get,
        professor_update,
        professor_delete,
        turma_create,
        turma_list,
        turma_get,
        turma_update,
        turma_delete,
        turma_add_aluno,
        turma_remove_aluno,
        aluno_create,
        aluno_list,
        aluno_get,
        aluno_update,
        aluno_delete,
        aluno_add_turma,
        aluno_remove_turma
    ),
    components(schemas(
        cd::Curso,
        cdb::CursoCreateData,
        cdb::CursoUpdateData,
        pd::Professor,
        pdb::ProfessorCreateData,
        pdb::ProfessorUpdateData,
        td::Turma,
        td::TurmaView,
        tdb::TurmaCreateData,
        tdb::TurmaUpdateData,
        ad::Aluno,
        ad::AlunoView,
        adb::AlunoCreateData,
        adb::AlunoUpdateData,
        Problem
    ))
)]
pub struct ApiDoc;

/// `201 Created` pointing at the new document.
pub(crate) fn created(collection_path: &str, id: uuid::Uuid) -> status::Created<()> {
    status::Created::new(format!("{}/{}", collection_path, id))
}

/// `204 No Content` when a document matched, an empty `404` otherwise.
pub(crate) fn no_content(matched: bool) -> Status {
    if matched {
        Status::NoContent
    } else {
        Status::NotFound
    }
}

pub fn api() -> Vec<Route> {
    routes![
        curso_create,
        curso_list,
        curso_get,
        curso_update,
        curso_delete,
        professor_create,
        professor_list,
        professor_get,
        professor_update,
        professor_delete,
        turma_create,
        turma_list,
        turma_get,
        turma_update,
        turma_delete,
        turma_add_aluno,
        turma_remove_aluno,
        aluno_create,
        aluno_list,
        aluno_get,
        aluno_update,
        aluno_delete,
        aluno_add_turma,
        aluno_remove_turma
    ]
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", api())
        .mount(
            "/",
            SwaggerUi::new("/swagger/<_..>").url("/openapi.json", ApiDoc::openapi()),
        )
        .register("/", crate::resp::catch::catchers())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::{Client, LocalResponse};
    use serde_json::Value;
    use uuid::Uuid;

    use super::StoreState;
    use crate::store::MemoryStore;

    pub async fn client() -> Client {
        let rocket = crate::build(Arc::new(MemoryStore::new())).expect("invalid backend");
        Client::tracked(rocket).await.expect("invalid backend")
    }

    pub fn store(client: &Client) -> &StoreState {
        client.rocket().state().expect("store is managed")
    }

    pub async fn post_json<'c>(client: &'c Client, uri: &str, body: Value) -> LocalResponse<'c> {
        client
            .post(uri.to_string())
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await
    }

    pub async fn put_json<'c>(client: &'c Client, uri: &str, body: Value) -> LocalResponse<'c> {
        client
            .put(uri.to_string())
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await
    }

    /// Creates a document and returns the id from its `Location`.
    pub async fn create(client: &Client, uri: &str, body: Value) -> Uuid {
        let response = post_json(client, uri, body).await;
        assert_eq!(response.status(), Status::Created, "a created response");

        let location = response
            .headers()
            .get_one("Location")
            .expect("Location header present");
        location
            .rsplit('/')
            .next()
            .and_then(|it| Uuid::parse_str(it).ok())
            .expect("Location ends with the new id")
    }

    pub async fn get_json(client: &Client, uri: &str) -> (Status, Option<Value>) {
        let response = client.get(uri.to_string()).dispatch().await;
        let status = response.status();
        (status, response.into_json().await)
    }
}
