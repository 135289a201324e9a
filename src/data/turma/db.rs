use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Turma, TurmaInclude, TurmaView, ALUNO_IDS_FIELD, TURMA_COLLECTION_NAME};
use crate::data::aluno::{Aluno, ALUNO_COLLECTION_NAME};
use crate::data::curso::Curso;
use crate::data::professor::Professor;
use crate::data::{Resource, ResourceDbExt};
use crate::error::StoreError;
use crate::resp::problem::{problems, Problem};
use crate::store::Store;
use crate::util::dedup_ids;

fn check_dia_semana(value: u8) -> Result<(), Problem> {
    if value > 6 {
        return Err(problems::bad_field(
            "diaSemana",
            "Weekday must be between 0 (Sunday) and 6 (Saturday).",
        ));
    }
    Ok(())
}

fn parse_hora(field: &str, value: &str) -> Result<NaiveTime, Problem> {
    let bad = || problems::bad_field(field, "Expected a 24h time formatted as HH:MM.");
    if value.len() != 5 {
        return Err(bad());
    }
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| bad())
}

fn check_horas(inicial: Option<&str>, final_: Option<&str>) -> Result<(), Problem> {
    let inicial = inicial.map(|it| parse_hora("horaInicial", it)).transpose()?;
    let final_ = final_.map(|it| parse_hora("horaFinal", it)).transpose()?;

    if let (Some(inicial), Some(final_)) = (inicial, final_) {
        if final_ <= inicial {
            return Err(problems::bad_field(
                "horaFinal",
                "End time must be after the start time.",
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TurmaCreateData {
    pub dia_semana: u8,
    #[schema(example = "08:00")]
    pub hora_inicial: String,
    #[serde(default)]
    pub hora_final: Option<String>,
    #[serde(default)]
    pub sala: Option<String>,
    #[serde(default)]
    pub curso_id: Option<Uuid>,
    #[serde(default)]
    pub professor_id: Option<Uuid>,
    #[serde(default)]
    pub aluno_ids: Vec<Uuid>,
}

impl TurmaCreateData {
    pub fn validate(&self) -> Result<(), Problem> {
        check_dia_semana(self.dia_semana)?;
        check_horas(Some(&self.hora_inicial), self.hora_final.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TurmaUpdateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dia_semana: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hora_inicial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hora_final: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sala: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curso_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professor_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aluno_ids: Option<Vec<Uuid>>,
}

impl TurmaUpdateData {
    pub fn validate(&self) -> Result<(), Problem> {
        if let Some(dia_semana) = self.dia_semana {
            check_dia_semana(dia_semana)?;
        }
        check_horas(self.hora_inicial.as_deref(), self.hora_final.as_deref())
    }

    /// Checks the times this patch would leave on `stored`, for patches
    /// that set only one of them.
    pub fn validate_against(&self, stored: &Turma) -> Result<(), Problem> {
        let inicial = self.hora_inicial.as_deref().unwrap_or(&stored.hora_inicial);
        let final_ = self.hora_final.as_deref().or(stored.hora_final.as_deref());
        check_horas(Some(inicial), final_)
    }

    /// Collapses repeated ids in a replacement `alunoIds`.
    pub fn normalized(mut self) -> Self {
        self.aluno_ids = self.aluno_ids.map(dedup_ids);
        self
    }
}

#[async_trait]
pub trait TurmaDbExt {
    async fn list_turmas(&self, include: TurmaInclude) -> Result<Vec<TurmaView>, StoreError>;

    async fn get_turma(
        &self,
        id: Uuid,
        include: TurmaInclude,
    ) -> Result<Option<TurmaView>, StoreError>;

    /// Adds the aluno to the turma unless already enrolled. Returns `false`
    /// when either of them doesn't exist.
    async fn enroll(&self, turma_id: Uuid, aluno_id: Uuid) -> Result<bool, StoreError>;

    /// Returns `false` when the turma doesn't exist or the aluno isn't
    /// enrolled in it.
    async fn unenroll(&self, turma_id: Uuid, aluno_id: Uuid) -> Result<bool, StoreError>;

    /// Ids among `aluno_ids` with no aluno behind them, in the given order.
    async fn unknown_alunos(&self, aluno_ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError>;
}

/// Rejects a body `alunoIds` that names alunos which don't exist.
pub async fn check_aluno_ids(
    store: &(dyn Store + 'static),
    aluno_ids: &[Uuid],
) -> Result<(), Problem> {
    if let Some(unknown) = store.unknown_alunos(aluno_ids).await?.first() {
        return Err(problems::bad_field(
            ALUNO_IDS_FIELD,
            format!("Aluno {} doesn't exist.", unknown),
        ));
    }
    Ok(())
}

async fn by_id<T: Resource>(
    store: &(dyn Store + 'static),
    wanted: bool,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, T>, StoreError> {
    if !wanted {
        return Ok(HashMap::new());
    }
    Ok(store
        .get_resources::<T>(&dedup_ids(ids))
        .await?
        .into_iter()
        .map(|it| (it.id(), it))
        .collect())
}

async fn join(
    store: &(dyn Store + 'static),
    turmas: Vec<Turma>,
    include: TurmaInclude,
) -> Result<Vec<TurmaView>, StoreError> {
    let professor_ids = turmas.iter().filter_map(|it| it.professor_id).collect();
    let professores = by_id::<Professor>(store, include.professor, professor_ids).await?;

    let curso_ids = turmas.iter().filter_map(|it| it.curso_id).collect();
    let cursos = by_id::<Curso>(store, include.curso, curso_ids).await?;

    let aluno_ids = turmas
        .iter()
        .flat_map(|it| it.aluno_ids.iter().copied())
        .collect();
    let alunos = by_id::<Aluno>(store, include.alunos, aluno_ids).await?;

    Ok(turmas
        .into_iter()
        .map(|turma| {
            let professor = include
                .professor
                .then(|| turma.professor_id.and_then(|id| professores.get(&id).cloned()));
            let curso = include
                .curso
                .then(|| turma.curso_id.and_then(|id| cursos.get(&id).cloned()));
            let enrolled = include.alunos.then(|| {
                turma
                    .aluno_ids
                    .iter()
                    .filter_map(|id| alunos.get(id).cloned())
                    .collect()
            });

            TurmaView {
                turma,
                professor,
                curso,
                alunos: enrolled,
            }
        })
        .collect())
}

#[async_trait]
impl TurmaDbExt for dyn Store {
    async fn list_turmas(&self, include: TurmaInclude) -> Result<Vec<TurmaView>, StoreError> {
        let turmas = self.list_resources::<Turma>().await?;
        join(self, turmas, include).await
    }

    async fn get_turma(
        &self,
        id: Uuid,
        include: TurmaInclude,
    ) -> Result<Option<TurmaView>, StoreError> {
        let turma = match self.get_resource::<Turma>(id).await? {
            Some(turma) => turma,
            None => return Ok(None),
        };
        Ok(join(self, vec![turma], include).await?.pop())
    }

    async fn enroll(&self, turma_id: Uuid, aluno_id: Uuid) -> Result<bool, StoreError> {
        if self.find_one(ALUNO_COLLECTION_NAME, aluno_id).await?.is_none() {
            tracing::debug!("Aluno {} doesn't exist", aluno_id);
            return Ok(false);
        }

        self.add_to_set(TURMA_COLLECTION_NAME, turma_id, ALUNO_IDS_FIELD, aluno_id)
            .await
    }

    async fn unenroll(&self, turma_id: Uuid, aluno_id: Uuid) -> Result<bool, StoreError> {
        self.pull(TURMA_COLLECTION_NAME, turma_id, ALUNO_IDS_FIELD, aluno_id)
            .await
    }

    async fn unknown_alunos(&self, aluno_ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError> {
        if aluno_ids.is_empty() {
            return Ok(vec![]);
        }
        let known: Vec<Uuid> = self
            .get_resources::<Aluno>(aluno_ids)
            .await?
            .iter()
            .map(|aluno| aluno.id)
            .collect();
        Ok(aluno_ids
            .iter()
            .copied()
            .filter(|id| !known.contains(id))
            .collect())
    }
}
