use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Per-company onboarding checklist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StatusChecklist {
    pub id: i64,
    pub company_id: i64,
    pub integracao: bool,
    pub analise_ncm: bool,
    pub estudo_regime: bool,
    pub levantamento_pendencias: bool,
    pub analise_servicos: bool,
    pub obrigacoes_acessorias: bool,
    pub diagnostico: bool,
    pub repasse: bool,
    pub competencia: Option<String>,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum ChecklistFlag {
    Integracao,
    AnaliseNcm,
    EstudoRegime,
    LevantamentoPendencias,
    AnaliseServicos,
    ObrigacoesAcessorias,
    Diagnostico,
    Repasse,
}

impl ChecklistFlag {
    pub const ALL: [ChecklistFlag; 8] = [
        ChecklistFlag::Integracao,
        ChecklistFlag::AnaliseNcm,
        ChecklistFlag::EstudoRegime,
        ChecklistFlag::LevantamentoPendencias,
        ChecklistFlag::AnaliseServicos,
        ChecklistFlag::ObrigacoesAcessorias,
        ChecklistFlag::Diagnostico,
        ChecklistFlag::Repasse,
    ];

    /// Storage column backing this flag
    pub fn column(&self) -> &'static str {
        match self {
            ChecklistFlag::Integracao => "integracao",
            ChecklistFlag::AnaliseNcm => "analise_ncm",
            ChecklistFlag::EstudoRegime => "estudo_regime",
            ChecklistFlag::LevantamentoPendencias => "levantamento_pendencias",
            ChecklistFlag::AnaliseServicos => "analise_servicos",
            ChecklistFlag::ObrigacoesAcessorias => "obrigacoes_acessorias",
            ChecklistFlag::Diagnostico => "diagnostico",
            ChecklistFlag::Repasse => "repasse",
        }
    }
}

impl StatusChecklist {
    pub fn flag(&self, flag: ChecklistFlag) -> bool {
        match flag {
            ChecklistFlag::Integracao => self.integracao,
            ChecklistFlag::AnaliseNcm => self.analise_ncm,
            ChecklistFlag::EstudoRegime => self.estudo_regime,
            ChecklistFlag::LevantamentoPendencias => self.levantamento_pendencias,
            ChecklistFlag::AnaliseServicos => self.analise_servicos,
            ChecklistFlag::ObrigacoesAcessorias => self.obrigacoes_acessorias,
            ChecklistFlag::Diagnostico => self.diagnostico,
            ChecklistFlag::Repasse => self.repasse,
        }
    }

    pub fn set_flag(&mut self, flag: ChecklistFlag, value: bool) {
        let slot = match flag {
            ChecklistFlag::Integracao => &mut self.integracao,
            ChecklistFlag::AnaliseNcm => &mut self.analise_ncm,
            ChecklistFlag::EstudoRegime => &mut self.estudo_regime,
            ChecklistFlag::LevantamentoPendencias => &mut self.levantamento_pendencias,
            ChecklistFlag::AnaliseServicos => &mut self.analise_servicos,
            ChecklistFlag::ObrigacoesAcessorias => &mut self.obrigacoes_acessorias,
            ChecklistFlag::Diagnostico => &mut self.diagnostico,
            ChecklistFlag::Repasse => &mut self.repasse,
        };
        *slot = value;
    }

    /// Number of completed steps out of the eight
    pub fn completed(&self) -> usize {
        ChecklistFlag::ALL.iter().filter(|f| self.flag(**f)).count()
    }
}

/// Tentative change of a single flag.
///
/// `apply` records the prior value so `revert` can restore it if the write
/// that follows is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistToggle {
    pub flag: ChecklistFlag,
    pub value: bool,
    pub previous: Option<bool>,
}

impl ChecklistToggle {
    pub fn new(flag: ChecklistFlag, value: bool) -> Self {
        Self {
            flag,
            value,
            previous: None,
        }
    }

    pub fn apply(&mut self, checklist: &mut StatusChecklist) {
        self.previous = Some(checklist.flag(self.flag));
        checklist.set_flag(self.flag, self.value);
    }

    pub fn revert(&self, checklist: &mut StatusChecklist) {
        if let Some(previous) = self.previous {
            checklist.set_flag(self.flag, previous);
        }
    }
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateStatusRequest {
    pub company_id: Option<i64>,
    pub competencia: Option<String>,
}

/// Only the fields present in the body are written
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub integracao: Option<bool>,
    pub analise_ncm: Option<bool>,
    pub estudo_regime: Option<bool>,
    pub levantamento_pendencias: Option<bool>,
    pub analise_servicos: Option<bool>,
    pub obrigacoes_acessorias: Option<bool>,
    pub diagnostico: Option<bool>,
    pub repasse: Option<bool>,
    pub competencia: Option<String>,
}

impl UpdateStatusRequest {
    pub fn toggles(&self) -> Vec<ChecklistToggle> {
        let values = [
            self.integracao,
            self.analise_ncm,
            self.estudo_regime,
            self.levantamento_pendencias,
            self.analise_servicos,
            self.obrigacoes_acessorias,
            self.diagnostico,
            self.repasse,
        ];

        ChecklistFlag::ALL
            .into_iter()
            .zip(values)
            .filter_map(|(flag, value)| value.map(|v| ChecklistToggle::new(flag, v)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.toggles().is_empty() && self.competencia.is_none()
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StatusChecklistsResponse {
    pub statuses: Vec<StatusChecklist>,
}
