use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::aluno::Aluno;
use super::curso::Curso;
use super::professor::Professor;
use super::Resource;
use crate::util::dedup_ids;
use db::{TurmaCreateData, TurmaUpdateData};

pub mod db;

pub const TURMA_COLLECTION_NAME: &str = "turma";
pub const ALUNO_IDS_FIELD: &str = "alunoIds";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Turma {
    pub id: Uuid,
    /// 0 is Sunday, 6 is Saturday.
    pub dia_semana: u8,
    /// `HH:MM`, 24h.
    pub hora_inicial: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hora_final: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sala: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curso_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professor_id: Option<Uuid>,
    /// Enrolled alunos in enrollment order, without repetitions.
    #[serde(default)]
    pub aluno_ids: Vec<Uuid>,
}

impl From<TurmaCreateData> for Turma {
    fn from(data: TurmaCreateData) -> Self {
        Turma {
            id: Uuid::new_v4(),
            dia_semana: data.dia_semana,
            hora_inicial: data.hora_inicial,
            hora_final: data.hora_final,
            sala: data.sala,
            curso_id: data.curso_id,
            professor_id: data.professor_id,
            aluno_ids: dedup_ids(data.aluno_ids),
        }
    }
}

impl Resource for Turma {
    const COLLECTION: &'static str = TURMA_COLLECTION_NAME;
    const ORDER: &'static [&'static str] = &["diaSemana", "horaInicial"];

    type Patch = TurmaUpdateData;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Related documents to embed in a turma listing.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct TurmaInclude {
    pub professor: bool,
    pub curso: bool,
    pub alunos: bool,
}

/// A turma as returned by the API.
///
/// Relations are only present when requested. A requested reference that
/// is unset or points to a deleted document is rendered as `null`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TurmaView {
    #[serde(flatten)]
    pub turma: Turma,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Professor>)]
    pub professor: Option<Option<Professor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Curso>)]
    pub curso: Option<Option<Curso>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alunos: Option<Vec<Aluno>>,
}
