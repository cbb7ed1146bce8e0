use rusqlite::{params, Connection, OptionalExtension, Row};
use shared_types::{
    Company, CompanyDetail, CompanyObligationInput, CreateCompanyRequest, ObligationKind,
    Parcelamento, ParcelamentoInput, RemovalReport, UpdateCompanyRequest,
};
use std::collections::HashSet;
use tracing::info;

use super::bindings::{company_bindings, remove_binding, upsert_binding};
use super::{is_unique_violation, now, AsyncDbConnection, DbError, DbResult};
use crate::helpers::file_store::FileStore;

const COMPANY_SELECT: &str = "SELECT id, razao_social, nome_fantasia, cnpj, regime_tributacao,
        usuario_id, uf, municipio, email, telefone, created_at, updated_at
     FROM companies";

fn company_from_row(row: &Row<'_>) -> rusqlite::Result<Company> {
    Ok(Company {
        id: row.get(0)?,
        razao_social: row.get(1)?,
        nome_fantasia: row.get(2)?,
        cnpj: row.get(3)?,
        regime_tributacao: row.get(4)?,
        usuario_id: row.get(5)?,
        uf: row.get(6)?,
        municipio: row.get(7)?,
        email: row.get(8)?,
        telefone: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn parcelamento_from_row(row: &Row<'_>) -> rusqlite::Result<Parcelamento> {
    Ok(Parcelamento {
        id: row.get(0)?,
        company_id: row.get(1)?,
        descricao: row.get(2)?,
        total_parcelas: row.get(3)?,
        parcela_atual: row.get(4)?,
        valor_parcela: row.get(5)?,
        observacoes: row.get(6)?,
    })
}

fn cnpj_conflict(cnpj: &str) -> impl FnOnce(rusqlite::Error) -> DbError + '_ {
    move |e| {
        if is_unique_violation(&e) {
            DbError::Conflict(format!("A company with CNPJ {} already exists", cnpj))
        } else {
            e.into()
        }
    }
}

/// Trim, and drop blank optional text
fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn find_company(conn: &Connection, id: i64) -> DbResult<Option<Company>> {
    let sql = format!("{} WHERE id = ?1", COMPANY_SELECT);
    Ok(conn.query_row(&sql, [id], company_from_row).optional()?)
}

pub(crate) fn require_company(conn: &Connection, id: i64) -> DbResult<Company> {
    find_company(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Company {}", id)))
}

fn company_parcelamentos(conn: &Connection, company_id: i64) -> DbResult<Vec<Parcelamento>> {
    let mut stmt = conn.prepare(
        "SELECT id, company_id, descricao, total_parcelas, parcela_atual, valor_parcela, observacoes
         FROM parcelamentos WHERE company_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map([company_id], parcelamento_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn load_detail(conn: &Connection, id: i64) -> DbResult<CompanyDetail> {
    let company = require_company(conn, id)?;
    let (obrigacoes_principais, obrigacoes_acessorias): (Vec<_>, Vec<_>) = company_bindings(conn, id)?
        .into_iter()
        .partition(|b| b.kind == ObligationKind::Principal);

    Ok(CompanyDetail {
        company,
        obrigacoes_acessorias,
        obrigacoes_principais,
        parcelamentos: company_parcelamentos(conn, id)?,
    })
}

fn validate_parcelamento(input: &ParcelamentoInput) -> DbResult<()> {
    if input.descricao.trim().is_empty() {
        return Err(DbError::Invalid("parcelamento descricao cannot be empty".to_string()));
    }
    if input.total_parcelas == 0 {
        return Err(DbError::Invalid("totalParcelas must be at least 1".to_string()));
    }
    if input.parcela_atual > input.total_parcelas {
        return Err(DbError::Invalid(format!(
            "parcelaAtual {} exceeds totalParcelas {}",
            input.parcela_atual, input.total_parcelas
        )));
    }
    Ok(())
}

fn save_parcelamento(
    conn: &Connection,
    company_id: i64,
    input: &ParcelamentoInput,
) -> DbResult<Parcelamento> {
    validate_parcelamento(input)?;

    let select = "RETURNING id, company_id, descricao, total_parcelas, parcela_atual, valor_parcela, observacoes";
    match input.id {
        Some(id) => {
            let sql = format!(
                "UPDATE parcelamentos SET descricao = ?1, total_parcelas = ?2, parcela_atual = ?3,
                    valor_parcela = ?4, observacoes = ?5
                 WHERE id = ?6 AND company_id = ?7 {}",
                select
            );
            conn.query_row(
                &sql,
                params![
                    input.descricao.trim(),
                    input.total_parcelas,
                    input.parcela_atual,
                    input.valor_parcela,
                    clean(&input.observacoes),
                    id,
                    company_id
                ],
                parcelamento_from_row,
            )
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("Parcelamento {}", id)))
        }
        None => {
            let sql = format!(
                "INSERT INTO parcelamentos
                    (company_id, descricao, total_parcelas, parcela_atual, valor_parcela, observacoes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) {}",
                select
            );
            Ok(conn.query_row(
                &sql,
                params![
                    company_id,
                    input.descricao.trim(),
                    input.total_parcelas,
                    input.parcela_atual,
                    input.valor_parcela,
                    clean(&input.observacoes)
                ],
                parcelamento_from_row,
            )?)
        }
    }
}

/// Upsert every listed binding and drop the stored ones that are no longer listed
fn reconcile_bindings(
    conn: &Connection,
    store: &dyn FileStore,
    company_id: i64,
    inputs: &[CompanyObligationInput],
) -> DbResult<RemovalReport> {
    let mut keep = HashSet::new();
    for input in inputs {
        keep.insert(upsert_binding(conn, company_id, input)?.id);
    }

    let mut report = RemovalReport::default();
    for stale in company_bindings(conn, company_id)?
        .into_iter()
        .filter(|b| !keep.contains(&b.id))
    {
        report.merge(remove_binding(conn, store, stale.id)?);
    }
    Ok(report)
}

fn reconcile_parcelamentos(
    conn: &Connection,
    company_id: i64,
    inputs: &[ParcelamentoInput],
) -> DbResult<()> {
    let mut keep = HashSet::new();
    for input in inputs {
        keep.insert(save_parcelamento(conn, company_id, input)?.id);
    }

    for stale in company_parcelamentos(conn, company_id)?
        .into_iter()
        .filter(|p| !keep.contains(&p.id))
    {
        conn.execute("DELETE FROM parcelamentos WHERE id = ?1", [stale.id])?;
    }
    Ok(())
}

pub async fn list_companies(conn: AsyncDbConnection) -> DbResult<Vec<Company>> {
    let conn = conn.lock().await?;

    let sql = format!("{} ORDER BY razao_social, id", COMPANY_SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let companies = stmt
        .query_map([], company_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(companies)
}

pub async fn get_company_detail(conn: AsyncDbConnection, id: i64) -> DbResult<CompanyDetail> {
    let conn = conn.lock().await?;
    load_detail(&conn, id)
}

/// Create the company, its empty status checklist, bindings and parcelamentos in one transaction.
/// Required fields must already be checked with `CreateCompanyRequest::missing_fields`.
pub async fn insert_company(
    conn: AsyncDbConnection,
    request: &CreateCompanyRequest,
) -> DbResult<CompanyDetail> {
    let required = |v: &Option<String>, field: &str| {
        clean(v).ok_or_else(|| DbError::Invalid(format!("{} is required", field)))
    };
    let razao_social = required(&request.razao_social, "razaoSocial")?;
    let cnpj = required(&request.cnpj, "cnpj")?;
    let regime = required(&request.regime_tributacao, "regimeTributacao")?;
    let uf = required(&request.uf, "uf")?.to_uppercase();
    let usuario_id = request
        .usuario_id
        .ok_or_else(|| DbError::Invalid("usuarioId is required".to_string()))?;

    let mut conn = conn.lock().await?;
    let tx = conn.transaction()?;
    let ts = now();

    let company_id: i64 = tx
        .query_row(
            "INSERT INTO companies
                (razao_social, nome_fantasia, cnpj, regime_tributacao, usuario_id, uf,
                 municipio, email, telefone, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
             RETURNING id",
            params![
                razao_social,
                clean(&request.nome_fantasia),
                cnpj,
                regime,
                usuario_id,
                uf,
                clean(&request.municipio),
                clean(&request.email),
                clean(&request.telefone),
                ts
            ],
            |row| row.get(0),
        )
        .map_err(cnpj_conflict(&cnpj))?;

    tx.execute(
        "INSERT INTO status_checklists (company_id, updated_at) VALUES (?1, ?2)",
        params![company_id, ts],
    )?;

    for binding in &request.obrigacoes {
        if binding.id.is_some() {
            return Err(DbError::Invalid("new bindings cannot carry an id".to_string()));
        }
        upsert_binding(&tx, company_id, binding)?;
    }
    for parcelamento in &request.parcelamentos {
        if parcelamento.id.is_some() {
            return Err(DbError::Invalid(
                "new parcelamentos cannot carry an id".to_string(),
            ));
        }
        save_parcelamento(&tx, company_id, parcelamento)?;
    }

    let detail = load_detail(&tx, company_id)?;
    tx.commit()?;

    info!("Created company {} ({})", detail.company.id, detail.company.cnpj);
    Ok(detail)
}

/// Update the scalar fields present in the request; binding and parcelamento
/// lists, when present, replace the stored sets
pub async fn update_company(
    conn: AsyncDbConnection,
    store: &dyn FileStore,
    id: i64,
    request: &UpdateCompanyRequest,
) -> DbResult<(CompanyDetail, RemovalReport)> {
    let mut conn = conn.lock().await?;
    let tx = conn.transaction()?;

    let current = require_company(&tx, id)?;

    let keep_or = |value: &Option<String>, current: &str| {
        clean(value).unwrap_or_else(|| current.to_string())
    };
    let keep_optional = |value: &Option<String>, current: &Option<String>| match value {
        Some(_) => clean(value),
        None => current.clone(),
    };
    let cnpj = keep_or(&request.cnpj, &current.cnpj);

    tx.execute(
        "UPDATE companies SET razao_social = ?1, nome_fantasia = ?2, cnpj = ?3,
            regime_tributacao = ?4, uf = ?5, municipio = ?6, email = ?7, telefone = ?8,
            updated_at = ?9
         WHERE id = ?10",
        params![
            keep_or(&request.razao_social, &current.razao_social),
            keep_optional(&request.nome_fantasia, &current.nome_fantasia),
            cnpj,
            keep_or(&request.regime_tributacao, &current.regime_tributacao),
            keep_or(&request.uf, &current.uf).to_uppercase(),
            keep_optional(&request.municipio, &current.municipio),
            keep_optional(&request.email, &current.email),
            keep_optional(&request.telefone, &current.telefone),
            now(),
            id
        ],
    )
    .map_err(cnpj_conflict(&cnpj))?;

    let mut report = RemovalReport::default();
    if let Some(bindings) = &request.obrigacoes {
        report.merge(reconcile_bindings(&tx, store, id, bindings)?);
    }
    if let Some(parcelamentos) = &request.parcelamentos {
        reconcile_parcelamentos(&tx, id, parcelamentos)?;
    }

    let detail = load_detail(&tx, id)?;
    tx.commit()?;

    Ok((detail, report))
}

/// Remove the company's bindings through the removal unit of work, then its
/// parcelamentos, status checklist, analyses and the company row
pub async fn delete_company(
    conn: AsyncDbConnection,
    store: &dyn FileStore,
    id: i64,
) -> DbResult<RemovalReport> {
    let mut conn = conn.lock().await?;
    let tx = conn.transaction()?;

    require_company(&tx, id)?;

    let mut report = RemovalReport::default();
    for binding in company_bindings(&tx, id)? {
        report.merge(remove_binding(&tx, store, binding.id)?);
    }

    tx.execute("DELETE FROM parcelamentos WHERE company_id = ?1", [id])?;
    tx.execute("DELETE FROM status_checklists WHERE company_id = ?1", [id])?;
    tx.execute("DELETE FROM tax_analyses WHERE company_id = ?1", [id])?;
    tx.execute("DELETE FROM companies WHERE id = ?1", [id])?;
    tx.commit()?;

    info!(
        "Deleted company {} with {} bindings ({} reconciliation issues)",
        id,
        report.bindings,
        report.issues.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::bindings::tests::RecordingStore;
    use crate::database::deliveries::{query_deliveries, record_delivery};
    use crate::database::obligations::list_obligation_types;
    use crate::database::test_support::test_db;
    use shared_types::AdjustPolicy;

    fn request(cnpj: &str) -> CreateCompanyRequest {
        CreateCompanyRequest {
            razao_social: Some("Padaria Pão Quente LTDA".to_string()),
            cnpj: Some(cnpj.to_string()),
            regime_tributacao: Some("Simples Nacional".to_string()),
            usuario_id: Some(1),
            uf: Some("sp".to_string()),
            ..Default::default()
        }
    }

    fn binding_input(obligation_type_id: i64, day: u32) -> CompanyObligationInput {
        CompanyObligationInput {
            id: None,
            obligation_type_id,
            due_day_of_month: day,
            adjust_policy: AdjustPolicy::Postpone,
            rate_or_notes: None,
        }
    }

    fn parcelamento_input(descricao: &str) -> ParcelamentoInput {
        ParcelamentoInput {
            id: None,
            descricao: descricao.to_string(),
            total_parcelas: 60,
            parcela_atual: 3,
            valor_parcela: Some(512.4),
            observacoes: None,
        }
    }

    #[tokio::test]
    async fn test_create_with_nested_bindings_and_parcelamentos() {
        let (_dir, db) = test_db();
        let types = list_obligation_types(db.async_connection.clone(), None)
            .await
            .unwrap();
        let accessory = types.iter().find(|t| t.kind == ObligationKind::Accessory).unwrap();
        let principal = types.iter().find(|t| t.kind == ObligationKind::Principal).unwrap();

        let mut req = request("11222333000181");
        req.obrigacoes = vec![binding_input(accessory.id, 15), binding_input(principal.id, 20)];
        req.parcelamentos = vec![parcelamento_input("PERT 2021")];

        let detail = insert_company(db.async_connection.clone(), &req).await.unwrap();

        assert_eq!(detail.company.uf, "SP");
        assert_eq!(detail.obrigacoes_acessorias.len(), 1);
        assert_eq!(detail.obrigacoes_principais.len(), 1);
        assert_eq!(detail.parcelamentos.len(), 1);

        let status: i64 = db
            .async_connection
            .blocking_conn()
            .query_row(
                "SELECT COUNT(*) FROM status_checklists WHERE company_id = ?1",
                [detail.company.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(status, 1);
    }

    #[tokio::test]
    async fn test_duplicate_cnpj_is_a_conflict() {
        let (_dir, db) = test_db();
        insert_company(db.async_connection.clone(), &request("11222333000181"))
            .await
            .unwrap();

        let again = insert_company(db.async_connection.clone(), &request("11222333000181")).await;
        assert!(matches!(again, Err(DbError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_failed_nested_binding_rolls_back_company() {
        let (_dir, db) = test_db();
        let mut req = request("11222333000181");
        req.obrigacoes = vec![binding_input(9999, 15)];

        let result = insert_company(db.async_connection.clone(), &req).await;
        assert!(matches!(result, Err(DbError::Invalid(_))));
        assert!(list_companies(db.async_connection.clone()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_reconciles_bindings_and_parcelamentos() {
        let (_dir, db) = test_db();
        let types = list_obligation_types(db.async_connection.clone(), Some(ObligationKind::Accessory))
            .await
            .unwrap();
        let (first, second) = (&types[0], &types[1]);

        let mut req = request("11222333000181");
        req.obrigacoes = vec![binding_input(first.id, 15)];
        req.parcelamentos = vec![parcelamento_input("PERT"), parcelamento_input("Simples 2022")];
        let created = insert_company(db.async_connection.clone(), &req).await.unwrap();
        let kept_parcelamento = created.parcelamentos[0].clone();

        let update = UpdateCompanyRequest {
            razao_social: Some("Padaria Nova LTDA".to_string()),
            obrigacoes: Some(vec![binding_input(second.id, 10)]),
            parcelamentos: Some(vec![ParcelamentoInput {
                id: Some(kept_parcelamento.id),
                parcela_atual: 4,
                ..parcelamento_input("PERT")
            }]),
            ..Default::default()
        };
        let store = RecordingStore::default();
        let (detail, report) =
            update_company(db.async_connection.clone(), &store, created.company.id, &update)
                .await
                .unwrap();

        assert_eq!(detail.company.razao_social, "Padaria Nova LTDA");
        assert_eq!(detail.company.cnpj, "11222333000181");
        assert_eq!(detail.obrigacoes_acessorias.len(), 1);
        assert_eq!(detail.obrigacoes_acessorias[0].obligation_type_id, second.id);
        assert_eq!(report.bindings, 1);
        assert_eq!(detail.parcelamentos.len(), 1);
        assert_eq!(detail.parcelamentos[0].id, kept_parcelamento.id);
        assert_eq!(detail.parcelamentos[0].parcela_atual, 4);
    }

    #[tokio::test]
    async fn test_update_by_binding_id_keeps_its_deliveries() {
        let (_dir, db) = test_db();
        let types = list_obligation_types(db.async_connection.clone(), Some(ObligationKind::Accessory))
            .await
            .unwrap();
        let (first, second, third) = (&types[0], &types[1], &types[2]);

        let mut req = request("11222333000181");
        req.obrigacoes = vec![binding_input(first.id, 15), binding_input(third.id, 20)];
        let created = insert_company(db.async_connection.clone(), &req).await.unwrap();
        let binding = created
            .obrigacoes_acessorias
            .iter()
            .find(|b| b.obligation_type_id == first.id)
            .unwrap()
            .clone();
        let other = created
            .obrigacoes_acessorias
            .iter()
            .find(|b| b.obligation_type_id == third.id)
            .unwrap()
            .clone();
        record_delivery(db.async_connection.clone(), binding.id, 3, 2024, true)
            .await
            .unwrap();

        let store = RecordingStore::default();
        let update = UpdateCompanyRequest {
            obrigacoes: Some(vec![
                CompanyObligationInput {
                    id: Some(binding.id),
                    ..binding_input(second.id, 10)
                },
                CompanyObligationInput {
                    id: Some(other.id),
                    ..binding_input(third.id, 20)
                },
            ]),
            ..Default::default()
        };
        let (detail, report) =
            update_company(db.async_connection.clone(), &store, created.company.id, &update)
                .await
                .unwrap();

        assert_eq!(report.bindings, 0);
        let moved = detail
            .obrigacoes_acessorias
            .iter()
            .find(|b| b.id == binding.id)
            .unwrap();
        assert_eq!(moved.obligation_type_id, second.id);
        assert_eq!(moved.due_day_of_month, 10);
        let deliveries = query_deliveries(db.async_connection.clone(), binding.id)
            .await
            .unwrap();
        assert_eq!(deliveries.len(), 1);

        // Pointing the other binding at the same obligation type collides
        let clash = UpdateCompanyRequest {
            obrigacoes: Some(vec![CompanyObligationInput {
                id: Some(other.id),
                ..binding_input(second.id, 20)
            }]),
            ..Default::default()
        };
        let result =
            update_company(db.async_connection.clone(), &store, created.company.id, &clash).await;
        assert!(matches!(result, Err(DbError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_binding_id_of_another_company() {
        let (_dir, db) = test_db();
        let types = list_obligation_types(db.async_connection.clone(), Some(ObligationKind::Accessory))
            .await
            .unwrap();

        let mut req = request("11222333000181");
        req.obrigacoes = vec![binding_input(types[0].id, 15)];
        let owner = insert_company(db.async_connection.clone(), &req).await.unwrap();
        let foreign_id = owner.obrigacoes_acessorias[0].id;
        let intruder = insert_company(db.async_connection.clone(), &request("99888777000166"))
            .await
            .unwrap();

        let update = UpdateCompanyRequest {
            obrigacoes: Some(vec![CompanyObligationInput {
                id: Some(foreign_id),
                ..binding_input(types[0].id, 15)
            }]),
            ..Default::default()
        };
        let store = RecordingStore::default();
        let result =
            update_company(db.async_connection.clone(), &store, intruder.company.id, &update).await;
        assert!(matches!(result, Err(DbError::NotFound(_))));

        let still_there = get_company_detail(db.async_connection.clone(), owner.company.id)
            .await
            .unwrap();
        assert_eq!(still_there.obrigacoes_acessorias[0].id, foreign_id);
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let (_dir, db) = test_db();
        let types = list_obligation_types(db.async_connection.clone(), None)
            .await
            .unwrap();
        let mut req = request("11222333000181");
        req.obrigacoes = vec![binding_input(types[0].id, 15), binding_input(types[1].id, 20)];
        req.parcelamentos = vec![parcelamento_input("PERT")];
        let created = insert_company(db.async_connection.clone(), &req).await.unwrap();

        let store = RecordingStore::default();
        let report = delete_company(db.async_connection.clone(), &store, created.company.id)
            .await
            .unwrap();

        assert_eq!(report.bindings, 2);
        assert!(report.is_clean());
        let missing = get_company_detail(db.async_connection.clone(), created.company.id).await;
        assert!(matches!(missing, Err(DbError::NotFound(_))));
    }
}
