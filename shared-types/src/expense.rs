use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseKind {
    Fixa,
    Variavel,
}

impl ExpenseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseKind::Fixa => "fixa",
            ExpenseKind::Variavel => "variavel",
        }
    }
}

impl Default for ExpenseKind {
    fn default() -> Self {
        ExpenseKind::Variavel
    }
}

impl std::str::FromStr for ExpenseKind {
    type Err = ParseEnumError;

    /// Lenient: accepts accents and capitalisation as typed in chat messages
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixa" | "fixo" => Ok(ExpenseKind::Fixa),
            "variavel" | "variável" => Ok(ExpenseKind::Variavel),
            other => Err(ParseEnumError::new("ExpenseKind", other)),
        }
    }
}

/// Where an expense row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseOrigin {
    Manual,
    Whatsapp,
}

impl ExpenseOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseOrigin::Manual => "manual",
            ExpenseOrigin::Whatsapp => "whatsapp",
        }
    }
}

impl std::str::FromStr for ExpenseOrigin {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(ExpenseOrigin::Manual),
            "whatsapp" => Ok(ExpenseOrigin::Whatsapp),
            other => Err(ParseEnumError::new("ExpenseOrigin", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub descricao: String,
    pub valor: f64,
    pub categoria: String,
    pub tipo: ExpenseKind,
    pub responsavel: String,
    /// ISO date, `YYYY-MM-DD`
    pub data: String,
    pub origem: ExpenseOrigin,
    pub created_at: i64,
}

/// Expense fields before persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub descricao: String,
    pub valor: f64,
    pub categoria: String,
    #[serde(default)]
    pub tipo: ExpenseKind,
    pub responsavel: String,
    pub data: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExpensesResponse {
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseGroupTotal {
    pub chave: String,
    pub total: f64,
    pub quantidade: i64,
}

/// Dashboard totals for a period
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub mes: Option<u32>,
    pub ano: Option<i32>,
    pub total: f64,
    pub fixas: f64,
    pub variaveis: f64,
    pub por_categoria: Vec<ExpenseGroupTotal>,
    pub por_responsavel: Vec<ExpenseGroupTotal>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMessageRequest {
    pub mensagem: String,
}
