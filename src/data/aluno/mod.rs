use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::turma::Turma;
use super::Resource;
use db::{AlunoCreateData, AlunoUpdateData};

pub mod db;

pub const ALUNO_COLLECTION_NAME: &str = "aluno";

/// A student. Enrollment is kept on [`Turma::aluno_ids`], not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Aluno {
    pub id: Uuid,
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matricula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<AlunoCreateData> for Aluno {
    fn from(data: AlunoCreateData) -> Self {
        Aluno {
            id: Uuid::new_v4(),
            nome: data.nome,
            matricula: data.matricula,
            email: data.email,
        }
    }
}

impl Resource for Aluno {
    const COLLECTION: &'static str = ALUNO_COLLECTION_NAME;
    const ORDER: &'static [&'static str] = &["nome"];

    type Patch = AlunoUpdateData;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// An aluno as returned by the API, with its turmas when requested.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AlunoView {
    #[serde(flatten)]
    pub aluno: Aluno,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turmas: Option<Vec<Turma>>,
}
