use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use shared_types::{ExpenseKind, NewExpense};
use std::sync::LazyLock;

use crate::RuleError;

static JSON_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());
static THOUSANDS_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d{1,3}(\.\d{3})+$").unwrap());

pub const DEFAULT_CATEGORY: &str = "Outros";
pub const DEFAULT_RESPONSIBLE: &str = "Não informado";

/// Returns the span from the first `{` to the last `}` of an LLM reply.
///
/// Models often wrap the object in prose or code fences; only the outermost
/// braces matter.
pub fn extract_json_block(text: &str) -> Option<&str> {
    JSON_BLOCK.find(text).map(|m| m.as_str())
}

/// Parses amounts the way they show up in chat: `45.9`, `"45,90"`,
/// `"R$ 1.234,56"`, `"R$ 1.234"`. Without a comma, dots grouping digits in
/// threes are thousands separators. Signs are dropped.
pub fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().map(f64::abs),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches("R$")
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();

            let normalized = if cleaned.contains(',') {
                cleaned.replace('.', "").replace(',', ".")
            } else if THOUSANDS_ONLY.is_match(&cleaned) {
                cleaned.replace('.', "")
            } else {
                cleaned
            };

            normalized.parse::<f64>().ok().map(f64::abs)
        }
        _ => None,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Expense fields as returned by the model; any of them may be missing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InterpretedExpense {
    pub descricao: Option<String>,
    pub valor: Option<Value>,
    pub categoria: Option<String>,
    pub tipo: Option<String>,
    pub responsavel: Option<String>,
    pub data: Option<String>,
}

impl InterpretedExpense {
    pub fn from_reply(reply: &str) -> Result<Self, RuleError> {
        let block = extract_json_block(reply).ok_or(RuleError::NoJsonBlock)?;
        serde_json::from_str(block).map_err(|e| RuleError::MalformedJson(e.to_string()))
    }

    /// Fills every missing or unusable field with its default
    pub fn into_new_expense(self, original_message: &str, today: NaiveDate) -> NewExpense {
        let descricao = non_blank(self.descricao)
            .unwrap_or_else(|| original_message.trim().chars().take(200).collect());

        let valor = self.valor.as_ref().and_then(parse_amount).unwrap_or(0.0);

        let tipo = self
            .tipo
            .as_deref()
            .and_then(|t| t.parse::<ExpenseKind>().ok())
            .unwrap_or_default();

        let data = self
            .data
            .as_deref()
            .and_then(parse_date)
            .unwrap_or(today)
            .format("%Y-%m-%d")
            .to_string();

        NewExpense {
            descricao,
            valor,
            categoria: non_blank(self.categoria).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            tipo,
            responsavel: non_blank(self.responsavel)
                .unwrap_or_else(|| DEFAULT_RESPONSIBLE.to_string()),
            data,
        }
    }
}
