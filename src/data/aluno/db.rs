use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Aluno, AlunoView};
use crate::data::turma::{Turma, ALUNO_IDS_FIELD};
use crate::data::{check_email, require_text, Resource, ResourceDbExt};
use crate::error::StoreError;
use crate::resp::problem::Problem;
use crate::store::Store;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AlunoCreateData {
    pub nome: String,
    #[serde(default)]
    pub matricula: Option<String>,
    #[serde(default)]
    #[schema(format = "email")]
    pub email: Option<String>,
}

impl AlunoCreateData {
    pub fn validate(&self) -> Result<(), Problem> {
        require_text("nome", &self.nome)?;
        if let Some(matricula) = &self.matricula {
            require_text("matricula", matricula)?;
        }
        check_email("email", self.email.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AlunoUpdateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matricula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(format = "email")]
    pub email: Option<String>,
}

impl AlunoUpdateData {
    pub fn validate(&self) -> Result<(), Problem> {
        if let Some(nome) = &self.nome {
            require_text("nome", nome)?;
        }
        if let Some(matricula) = &self.matricula {
            require_text("matricula", matricula)?;
        }
        check_email("email", self.email.as_deref())
    }
}

#[async_trait]
pub trait AlunoDbExt {
    async fn list_alunos(&self, with_turmas: bool) -> Result<Vec<AlunoView>, StoreError>;

    async fn get_aluno(&self, id: Uuid, with_turmas: bool)
        -> Result<Option<AlunoView>, StoreError>;

    /// Turmas the aluno is enrolled in, by weekday and start time.
    async fn turmas_of(&self, id: Uuid) -> Result<Vec<Turma>, StoreError>;

    /// Deletes the aluno and removes it from every turma.
    async fn delete_aluno(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
impl AlunoDbExt for dyn Store {
    async fn list_alunos(&self, with_turmas: bool) -> Result<Vec<AlunoView>, StoreError> {
        let alunos = self.list_resources::<Aluno>().await?;

        if !with_turmas {
            return Ok(alunos
                .into_iter()
                .map(|aluno| AlunoView {
                    aluno,
                    turmas: None,
                })
                .collect());
        }

        let turmas = self.list_resources::<Turma>().await?;
        Ok(alunos
            .into_iter()
            .map(|aluno| {
                let enrolled = turmas
                    .iter()
                    .filter(|turma| turma.aluno_ids.contains(&aluno.id))
                    .cloned()
                    .collect();
                AlunoView {
                    aluno,
                    turmas: Some(enrolled),
                }
            })
            .collect())
    }

    async fn get_aluno(
        &self,
        id: Uuid,
        with_turmas: bool,
    ) -> Result<Option<AlunoView>, StoreError> {
        let aluno = match self.get_resource::<Aluno>(id).await? {
            Some(aluno) => aluno,
            None => return Ok(None),
        };

        let turmas = if with_turmas {
            Some(self.turmas_of(id).await?)
        } else {
            None
        };

        Ok(Some(AlunoView { aluno, turmas }))
    }

    async fn turmas_of(&self, id: Uuid) -> Result<Vec<Turma>, StoreError> {
        self.find_containing(Turma::COLLECTION, ALUNO_IDS_FIELD, id, Turma::ORDER)
            .await?
            .into_iter()
            .map(|it| bson::from_document(it).map_err(StoreError::from))
            .collect()
    }

    async fn delete_aluno(&self, id: Uuid) -> Result<bool, StoreError> {
        if !self.delete_resource::<Aluno>(id).await? {
            return Ok(false);
        }

        let changed = self
            .pull_all(Turma::COLLECTION, ALUNO_IDS_FIELD, id)
            .await?;
        tracing::debug!("Removed aluno {} from {} turma(s)", id, changed);

        Ok(true)
    }
}
