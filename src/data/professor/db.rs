use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::{check_email, require_text};
use crate::resp::problem::Problem;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfessorCreateData {
    pub nome: String,
    #[serde(default)]
    pub formacao: Option<String>,
    #[serde(default)]
    #[schema(format = "email")]
    pub email: Option<String>,
}

impl ProfessorCreateData {
    pub fn validate(&self) -> Result<(), Problem> {
        require_text("nome", &self.nome)?;
        check_email("email", self.email.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfessorUpdateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formacao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(format = "email")]
    pub email: Option<String>,
}

impl ProfessorUpdateData {
    pub fn validate(&self) -> Result<(), Problem> {
        if let Some(nome) = &self.nome {
            require_text("nome", nome)?;
        }
        check_email("email", self.email.as_deref())
    }
}
