use actix_web::{web, HttpResponse};
use serde::Deserialize;
use shared_types::{ExpenseOrigin, ExpensesResponse, NewExpense};
use std::sync::Arc;

use super::error::ApiError;
use crate::database::expenses::{self as db, ExpenseFilter};
use crate::database::Database;

#[derive(Debug, Deserialize)]
pub struct ExpensesQuery {
    pub mes: Option<u32>,
    pub ano: Option<i32>,
    pub categoria: Option<String>,
}

impl From<ExpensesQuery> for ExpenseFilter {
    fn from(query: ExpensesQuery) -> Self {
        ExpenseFilter {
            mes: query.mes,
            ano: query.ano,
            categoria: query.categoria.filter(|c| !c.trim().is_empty()),
        }
    }
}

pub async fn list_expenses(
    database: web::Data<Arc<Database>>,
    query: web::Query<ExpensesQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = ExpenseFilter::from(query.into_inner());
    let expenses = db::list_expenses(database.async_connection.clone(), &filter).await?;

    Ok(HttpResponse::Ok().json(ExpensesResponse { expenses }))
}

pub async fn create_expense(
    database: web::Data<Arc<Database>>,
    request: web::Json<NewExpense>,
) -> Result<HttpResponse, ApiError> {
    let expense =
        db::insert_expense(database.async_connection.clone(), &request, ExpenseOrigin::Manual).await?;

    Ok(HttpResponse::Created().json(expense))
}

pub async fn delete_expense(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    db::delete_expense(database.async_connection.clone(), path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Category filter does not apply to the summary
pub async fn expense_summary(
    database: web::Data<Arc<Database>>,
    query: web::Query<ExpensesQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = ExpenseFilter::from(query.into_inner());
    let summary = db::expense_summary(database.async_connection.clone(), &filter).await?;

    Ok(HttpResponse::Ok().json(summary))
}
