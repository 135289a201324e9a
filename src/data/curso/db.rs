use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::require_text;
use crate::resp::problem::{problems, Problem};

fn check_carga_horaria(value: Option<u32>) -> Result<(), Problem> {
    if value == Some(0) {
        return Err(problems::bad_field(
            "cargaHoraria",
            "Workload must be a positive number of hours.",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CursoCreateData {
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub carga_horaria: Option<u32>,
}

impl CursoCreateData {
    pub fn validate(&self) -> Result<(), Problem> {
        require_text("nome", &self.nome)?;
        check_carga_horaria(self.carga_horaria)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CursoUpdateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carga_horaria: Option<u32>,
}

impl CursoUpdateData {
    pub fn validate(&self) -> Result<(), Problem> {
        if let Some(nome) = &self.nome {
            require_text("nome", nome)?;
        }
        check_carga_horaria(self.carga_horaria)
    }
}
