use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Resource;
use db::{CursoCreateData, CursoUpdateData};

pub mod db;

pub const CURSO_COLLECTION_NAME: &str = "curso";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Curso {
    pub id: Uuid,
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    /// Workload in hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carga_horaria: Option<u32>,
}

impl From<CursoCreateData> for Curso {
    fn from(data: CursoCreateData) -> Self {
        Curso {
            id: Uuid::new_v4(),
            nome: data.nome,
            descricao: data.descricao,
            carga_horaria: data.carga_horaria,
        }
    }
}

impl Resource for Curso {
    const COLLECTION: &'static str = CURSO_COLLECTION_NAME;
    const ORDER: &'static [&'static str] = &["nome"];

    type Patch = CursoUpdateData;

    fn id(&self) -> Uuid {
        self.id
    }
}
