use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Resource;
use db::{ProfessorCreateData, ProfessorUpdateData};

pub mod db;

pub const PROFESSOR_COLLECTION_NAME: &str = "professor";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Professor {
    pub id: Uuid,
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formacao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<ProfessorCreateData> for Professor {
    fn from(data: ProfessorCreateData) -> Self {
        Professor {
            id: Uuid::new_v4(),
            nome: data.nome,
            formacao: data.formacao,
            email: data.email,
        }
    }
}

impl Resource for Professor {
    const COLLECTION: &'static str = PROFESSOR_COLLECTION_NAME;
    const ORDER: &'static [&'static str] = &["nome"];

    type Patch = ProfessorUpdateData;

    fn id(&self) -> Uuid {
        self.id
    }
}
