//! PostgreSQL schema for the country store

use sqlx::PgPool;

use crate::countries::error::StoreError;

pub const CREATE_COUNTRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS countries_tb (
    id                BIGSERIAL PRIMARY KEY,
    name              VARCHAR(255) NOT NULL,
    capital           VARCHAR(255),
    region            VARCHAR(100),
    population        BIGINT NOT NULL,
    currency_code     VARCHAR(10),
    exchange_rate     DOUBLE PRECISION,
    estimated_gdp     DOUBLE PRECISION,
    flag_url          TEXT,
    last_refreshed_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT countries_name_not_blank CHECK (btrim(name) <> ''),
    CONSTRAINT countries_rate_requires_currency CHECK (currency_code IS NOT NULL OR exchange_rate IS NULL)
)
"#;

/// Identity is the lower-cased name
pub const CREATE_COUNTRIES_NAME_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS countries_tb_name_lower_idx ON countries_tb (LOWER(name))";

pub const CREATE_COUNTRIES_REGION_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS countries_tb_region_idx ON countries_tb (region)";

pub const CREATE_COUNTRIES_CURRENCY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS countries_tb_currency_idx ON countries_tb (currency_code)";

pub const CREATE_APP_META_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS app_meta_tb (
    id         BIGSERIAL PRIMARY KEY,
    key        VARCHAR(100) NOT NULL UNIQUE,
    value      TEXT,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Create tables and indexes if they do not exist yet
pub async fn init_schema(pool: &PgPool) -> Result<(), StoreError> {
    tracing::info!("Initializing country store schema...");

    for statement in [
        CREATE_COUNTRIES_TABLE,
        CREATE_COUNTRIES_NAME_INDEX,
        CREATE_COUNTRIES_REGION_INDEX,
        CREATE_COUNTRIES_CURRENCY_INDEX,
        CREATE_APP_META_TABLE,
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Country store schema initialized");
    Ok(())
}
