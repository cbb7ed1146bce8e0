use chrono::NaiveDate;
use fiscal_rules::message::{DEFAULT_CATEGORY, DEFAULT_RESPONSIBLE};
use rusqlite::{params, Connection, Row};
use shared_types::{Expense, ExpenseGroupTotal, ExpenseOrigin, ExpenseSummary, NewExpense};

use super::{parse_column, AsyncDbConnection, DbError, DbResult};

#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub mes: Option<u32>,
    pub ano: Option<i32>,
    pub categoria: Option<String>,
}

impl ExpenseFilter {
    fn validate(&self) -> DbResult<()> {
        if let Some(mes) = self.mes {
            if !(1..=12).contains(&mes) {
                return Err(DbError::Invalid(format!(
                    "month must be between 1 and 12, got {}",
                    mes
                )));
            }
        }
        Ok(())
    }
}

const PERIOD_FILTER: &str = "(?1 IS NULL OR CAST(strftime('%m', data) AS INTEGER) = ?1)
     AND (?2 IS NULL OR CAST(strftime('%Y', data) AS INTEGER) = ?2)";

fn expense_from_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        descricao: row.get(1)?,
        valor: row.get(2)?,
        categoria: row.get(3)?,
        tipo: parse_column(row, 4)?,
        responsavel: row.get(5)?,
        data: row.get(6)?,
        origem: parse_column(row, 7)?,
        created_at: row.get(8)?,
    })
}

fn non_blank_or(value: &str, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

pub async fn insert_expense(
    conn: AsyncDbConnection,
    expense: &NewExpense,
    origem: ExpenseOrigin,
) -> DbResult<Expense> {
    let descricao = expense.descricao.trim();
    if descricao.is_empty() {
        return Err(DbError::Invalid("descricao cannot be empty".to_string()));
    }
    if !expense.valor.is_finite() || expense.valor < 0.0 {
        return Err(DbError::Invalid(format!("invalid valor {}", expense.valor)));
    }
    let data = NaiveDate::parse_from_str(expense.data.trim(), "%Y-%m-%d")
        .map_err(|_| DbError::Invalid(format!("data must be YYYY-MM-DD, got {:?}", expense.data)))?;

    let conn = conn.lock().await?;
    let created = conn.query_row(
        "INSERT INTO expenses (descricao, valor, categoria, tipo, responsavel, data, origem, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         RETURNING id, descricao, valor, categoria, tipo, responsavel, data, origem, created_at",
        params![
            descricao,
            expense.valor,
            non_blank_or(&expense.categoria, DEFAULT_CATEGORY),
            expense.tipo.as_str(),
            non_blank_or(&expense.responsavel, DEFAULT_RESPONSIBLE),
            data.format("%Y-%m-%d").to_string(),
            origem.as_str(),
            super::now()
        ],
        expense_from_row,
    )?;

    tracing::info!(
        "Recorded {} expense {}: {} R$ {:.2}",
        origem.as_str(),
        created.id,
        created.categoria,
        created.valor
    );
    Ok(created)
}

/// Newest first
pub async fn list_expenses(conn: AsyncDbConnection, filter: &ExpenseFilter) -> DbResult<Vec<Expense>> {
    filter.validate()?;
    let conn = conn.lock().await?;

    let sql = format!(
        "SELECT id, descricao, valor, categoria, tipo, responsavel, data, origem, created_at
         FROM expenses
         WHERE {} AND (?3 IS NULL OR categoria = ?3)
         ORDER BY data DESC, id DESC",
        PERIOD_FILTER
    );
    let mut stmt = conn.prepare(&sql)?;
    let expenses = stmt
        .query_map(
            params![filter.mes, filter.ano, filter.categoria],
            expense_from_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(expenses)
}

pub async fn delete_expense(conn: AsyncDbConnection, id: i64) -> DbResult<()> {
    let conn = conn.lock().await?;

    let deleted = conn.execute("DELETE FROM expenses WHERE id = ?1", [id])?;
    if deleted == 0 {
        return Err(DbError::NotFound(format!("Expense {}", id)));
    }
    Ok(())
}

fn group_totals(conn: &Connection, column: &str, filter: &ExpenseFilter) -> DbResult<Vec<ExpenseGroupTotal>> {
    let sql = format!(
        "SELECT {col}, SUM(valor), COUNT(*)
         FROM expenses
         WHERE {period}
         GROUP BY {col}
         ORDER BY SUM(valor) DESC, {col}",
        col = column,
        period = PERIOD_FILTER
    );
    let mut stmt = conn.prepare(&sql)?;
    let groups = stmt
        .query_map(params![filter.mes, filter.ano], |row| {
            Ok(ExpenseGroupTotal {
                chave: row.get(0)?,
                total: row.get(1)?,
                quantidade: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(groups)
}

/// Totals for the dashboard: overall, fixed vs variable, per category and per person
pub async fn expense_summary(conn: AsyncDbConnection, filter: &ExpenseFilter) -> DbResult<ExpenseSummary> {
    filter.validate()?;
    let conn = conn.lock().await?;

    let sql = format!(
        "SELECT COALESCE(SUM(valor), 0),
                COALESCE(SUM(CASE WHEN tipo = 'fixa' THEN valor END), 0),
                COALESCE(SUM(CASE WHEN tipo = 'variavel' THEN valor END), 0)
         FROM expenses
         WHERE {}",
        PERIOD_FILTER
    );
    let (total, fixas, variaveis): (f64, f64, f64) = conn.query_row(
        &sql,
        params![filter.mes, filter.ano],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    Ok(ExpenseSummary {
        mes: filter.mes,
        ano: filter.ano,
        total,
        fixas,
        variaveis,
        por_categoria: group_totals(&conn, "categoria", filter)?,
        por_responsavel: group_totals(&conn, "responsavel", filter)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::test_db;
    use shared_types::ExpenseKind;

    fn expense(descricao: &str, valor: f64, categoria: &str, tipo: ExpenseKind, data: &str) -> NewExpense {
        NewExpense {
            descricao: descricao.to_string(),
            valor,
            categoria: categoria.to_string(),
            tipo,
            responsavel: "Ana".to_string(),
            data: data.to_string(),
        }
    }

    async fn seed(db: &crate::database::Database) {
        let rows = [
            expense("Aluguel", 2500.0, "Moradia", ExpenseKind::Fixa, "2024-03-05"),
            expense("Mercado", 420.5, "Alimentação", ExpenseKind::Variavel, "2024-03-10"),
            expense("Almoço", 45.9, "Alimentação", ExpenseKind::Variavel, "2024-03-12"),
            expense("Gasolina", 250.0, "Transporte", ExpenseKind::Variavel, "2024-04-02"),
        ];
        for row in &rows {
            insert_expense(db.async_connection.clone(), row, ExpenseOrigin::Manual)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_list_filters_by_period_and_category() {
        let (_dir, db) = test_db();
        seed(&db).await;

        let march = ExpenseFilter {
            mes: Some(3),
            ano: Some(2024),
            categoria: None,
        };
        let listed = list_expenses(db.async_connection.clone(), &march).await.unwrap();
        let names: Vec<_> = listed.iter().map(|e| e.descricao.as_str()).collect();
        assert_eq!(names, vec!["Almoço", "Mercado", "Aluguel"]);

        let food = ExpenseFilter {
            categoria: Some("Alimentação".to_string()),
            ..march
        };
        assert_eq!(list_expenses(db.async_connection.clone(), &food).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_summary_splits_fixed_and_variable() {
        let (_dir, db) = test_db();
        seed(&db).await;

        let summary = expense_summary(
            db.async_connection.clone(),
            &ExpenseFilter {
                mes: Some(3),
                ano: Some(2024),
                categoria: None,
            },
        )
        .await
        .unwrap();

        assert!((summary.total - 2966.4).abs() < 1e-9);
        assert!((summary.fixas - 2500.0).abs() < 1e-9);
        assert!((summary.variaveis - 466.4).abs() < 1e-9);
        assert_eq!(summary.por_categoria[0].chave, "Moradia");
        assert_eq!(summary.por_categoria[1].quantidade, 2);
        assert_eq!(summary.por_responsavel.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_period_summary_is_zero() {
        let (_dir, db) = test_db();

        let summary = expense_summary(db.async_connection.clone(), &ExpenseFilter::default())
            .await
            .unwrap();
        assert_eq!(summary.total, 0.0);
        assert!(summary.por_categoria.is_empty());
    }

    #[tokio::test]
    async fn test_insert_validates_and_fills_defaults() {
        let (_dir, db) = test_db();

        let bad_date = expense("Café", 5.0, "", ExpenseKind::Variavel, "14/02/2024");
        assert!(matches!(
            insert_expense(db.async_connection.clone(), &bad_date, ExpenseOrigin::Manual).await,
            Err(DbError::Invalid(_))
        ));

        let mut blank = expense("Café", 5.0, " ", ExpenseKind::Variavel, "2024-02-14");
        blank.responsavel = String::new();
        let created = insert_expense(db.async_connection.clone(), &blank, ExpenseOrigin::Whatsapp)
            .await
            .unwrap();
        assert_eq!(created.categoria, DEFAULT_CATEGORY);
        assert_eq!(created.responsavel, DEFAULT_RESPONSIBLE);
        assert_eq!(created.origem, ExpenseOrigin::Whatsapp);
    }
}
