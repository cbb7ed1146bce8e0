use rusqlite::{params, Connection};

/// Obligation catalog seeded on first start; names are unique so reseeding is a no-op
const DEFAULT_OBLIGATIONS: &[(&str, &str)] = &[
    ("DCTFWeb", "accessory"),
    ("DEFIS", "accessory"),
    ("ECD", "accessory"),
    ("ECF", "accessory"),
    ("EFD ICMS/IPI", "accessory"),
    ("EFD-Contribuições", "accessory"),
    ("EFD-Reinf", "accessory"),
    ("eSocial", "accessory"),
    ("GIA", "accessory"),
    ("PGDAS-D", "accessory"),
    ("COFINS", "principal"),
    ("CSLL", "principal"),
    ("DAS", "principal"),
    ("FGTS", "principal"),
    ("ICMS", "principal"),
    ("INSS", "principal"),
    ("IRPJ", "principal"),
    ("ISS", "principal"),
    ("PIS", "principal"),
];

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS obligation_types (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            kind TEXT NOT NULL CHECK (kind IN ('accessory', 'principal'))
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS companies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            razao_social TEXT NOT NULL,
            nome_fantasia TEXT,
            cnpj TEXT NOT NULL UNIQUE,
            regime_tributacao TEXT NOT NULL,
            usuario_id INTEGER NOT NULL,
            uf TEXT NOT NULL,
            municipio TEXT,
            email TEXT,
            telefone TEXT,
            created_at BIGINT NOT NULL,
            updated_at BIGINT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS company_obligations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_id INTEGER NOT NULL,
            obligation_type_id INTEGER NOT NULL,
            due_day_of_month INTEGER NOT NULL CHECK (due_day_of_month BETWEEN 1 AND 31),
            adjust_policy TEXT NOT NULL DEFAULT 'postpone' CHECK (adjust_policy IN ('anticipate', 'postpone')),
            rate_or_notes TEXT,
            FOREIGN KEY (company_id) REFERENCES companies (id),
            FOREIGN KEY (obligation_type_id) REFERENCES obligation_types (id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_company_obligations_company_type
            ON company_obligations(company_id, obligation_type_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS delivery_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            binding_id INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            year INTEGER NOT NULL,
            delivered INTEGER NOT NULL DEFAULT 0,
            delivered_at BIGINT,
            CHECK ((delivered = 1) = (delivered_at IS NOT NULL)),
            FOREIGN KEY (binding_id) REFERENCES company_obligations (id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_delivery_records_period
            ON delivery_records(binding_id, month, year)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS parcelamentos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_id INTEGER NOT NULL,
            descricao TEXT NOT NULL,
            total_parcelas INTEGER NOT NULL,
            parcela_atual INTEGER NOT NULL DEFAULT 0,
            valor_parcela REAL,
            observacoes TEXT,
            FOREIGN KEY (company_id) REFERENCES companies (id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS status_checklists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_id INTEGER NOT NULL UNIQUE,
            integracao INTEGER NOT NULL DEFAULT 0,
            analise_ncm INTEGER NOT NULL DEFAULT 0,
            estudo_regime INTEGER NOT NULL DEFAULT 0,
            levantamento_pendencias INTEGER NOT NULL DEFAULT 0,
            analise_servicos INTEGER NOT NULL DEFAULT 0,
            obrigacoes_acessorias INTEGER NOT NULL DEFAULT 0,
            diagnostico INTEGER NOT NULL DEFAULT 0,
            repasse INTEGER NOT NULL DEFAULT 0,
            competencia TEXT,
            updated_at BIGINT NOT NULL,
            FOREIGN KEY (company_id) REFERENCES companies (id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS binding_annotations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            binding_id INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            year INTEGER NOT NULL,
            text TEXT NOT NULL,
            created_at BIGINT NOT NULL,
            FOREIGN KEY (binding_id) REFERENCES company_obligations (id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS binding_attachments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            binding_id INTEGER NOT NULL,
            file_name TEXT NOT NULL,
            storage_key TEXT NOT NULL,
            content_type TEXT,
            created_at BIGINT NOT NULL,
            FOREIGN KEY (binding_id) REFERENCES company_obligations (id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS reconciliation_issues (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            resource TEXT NOT NULL,
            resource_id TEXT NOT NULL,
            operation TEXT NOT NULL,
            error TEXT NOT NULL,
            created_at BIGINT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            descricao TEXT NOT NULL,
            valor REAL NOT NULL,
            categoria TEXT NOT NULL,
            tipo TEXT NOT NULL CHECK (tipo IN ('fixa', 'variavel')),
            responsavel TEXT NOT NULL,
            data TEXT NOT NULL,
            origem TEXT NOT NULL CHECK (origem IN ('manual', 'whatsapp')),
            created_at BIGINT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_data ON expenses(data)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS tax_analyses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_id INTEGER NOT NULL,
            titulo TEXT NOT NULL,
            conteudo TEXT NOT NULL,
            modelo TEXT NOT NULL,
            created_at BIGINT NOT NULL,
            FOREIGN KEY (company_id) REFERENCES companies (id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_preferences (
            usuario_id INTEGER PRIMARY KEY,
            sidebar_collapsed INTEGER NOT NULL DEFAULT 0,
            theme TEXT NOT NULL DEFAULT 'light' CHECK (theme IN ('light', 'dark')),
            updated_at BIGINT NOT NULL
        )",
        [],
    )?;

    for (name, kind) in DEFAULT_OBLIGATIONS {
        conn.execute(
            "INSERT OR IGNORE INTO obligation_types (name, kind) VALUES (?1, ?2)",
            params![name, kind],
        )?;
    }

    Ok(())
}
