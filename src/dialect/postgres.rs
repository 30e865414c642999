//! PostgreSQL adapter over a single `sqlx` connection.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow, PgSslMode};
use sqlx::{Connection, Executor, Row};

use crate::config::{ConnectionConfig, Driver};
use crate::error::{IntrospectError, IntrospectResult, MetadataPhase};
use crate::metadata::{
    checked_identifier, DatabaseFixtures, DialectAdapter, RawColumn, RawForeignKeyColumn,
    RawIndexColumn, RawTable, SchemaFilter, TypeMapper,
};
use crate::model::CanonicalType;

/// PostgreSQL native types, as spelled by `information_schema.columns.data_type`.
pub static POSTGRES_TYPES: Lazy<TypeMapper> = Lazy::new(|| {
    use CanonicalType as C;
    TypeMapper::new(
        &[
            ("smallint", C::Number),
            ("integer", C::Number),
            ("bigint", C::String),
            ("numeric", C::Number),
            ("decimal", C::Number),
            ("real", C::Number),
            ("double precision", C::Number),
            ("money", C::Number),
            ("boolean", C::Boolean),
            ("character varying", C::String),
            ("character", C::String),
            ("text", C::String),
            ("name", C::String),
            ("uuid", C::String),
            ("json", C::String),
            ("jsonb", C::String),
            ("xml", C::String),
            ("inet", C::String),
            ("cidr", C::String),
            ("macaddr", C::String),
            ("bit", C::String),
            ("bit varying", C::String),
            ("tsvector", C::String),
            ("interval", C::String),
            ("date", C::Date),
            ("time without time zone", C::Date),
            ("time with time zone", C::Date),
            ("timestamp without time zone", C::Date),
            ("timestamp with time zone", C::Date),
            ("bytea", C::Binary),
        ],
        &["numeric", "decimal"],
        &["character varying", "character", "bit", "bit varying"],
    )
});

const TABLES_SQL: &str = "\
SELECT table_schema::text AS table_schema, table_name::text AS table_name
  FROM information_schema.tables
 WHERE table_type = 'BASE TABLE' AND table_schema = ANY($1)
 ORDER BY table_schema, table_name";

const COLUMNS_SQL: &str = "\
SELECT c.table_schema::text AS table_schema,
       c.table_name::text AS table_name,
       c.column_name::text AS column_name,
       c.column_default::text AS column_default,
       c.is_nullable::text AS is_nullable,
       c.data_type::text AS data_type,
       c.character_maximum_length::int4 AS max_length,
       c.numeric_precision::int4 AS numeric_precision,
       c.numeric_scale::int4 AS numeric_scale,
       (c.is_identity = 'YES' OR c.column_default LIKE 'nextval(%') AS is_identity,
       EXISTS (
           SELECT 1
             FROM information_schema.table_constraints tc
             JOIN information_schema.constraint_column_usage cu
               ON cu.constraint_schema = tc.constraint_schema
              AND cu.constraint_name = tc.constraint_name
              AND cu.table_schema = tc.table_schema
              AND cu.table_name = tc.table_name
            WHERE tc.constraint_type = 'UNIQUE'
              AND tc.table_schema = c.table_schema
              AND tc.table_name = c.table_name
              AND cu.column_name = c.column_name
              AND (SELECT count(*)
                     FROM information_schema.constraint_column_usage cc
                    WHERE cc.constraint_schema = tc.constraint_schema
                      AND cc.constraint_name = tc.constraint_name
                      AND cc.table_schema = tc.table_schema
                      AND cc.table_name = tc.table_name) = 1
       ) AS is_unique
  FROM information_schema.columns c
  JOIN information_schema.tables t
    ON t.table_schema = c.table_schema AND t.table_name = c.table_name
 WHERE t.table_type = 'BASE TABLE' AND c.table_schema = ANY($1)
 ORDER BY c.table_schema, c.table_name, c.ordinal_position";

const INDEXES_SQL: &str = "\
SELECT n.nspname::text AS schema_name,
       t.relname::text AS table_name,
       i.relname::text AS index_name,
       a.attname::text AS column_name,
       ix.indisunique AS is_unique,
       ix.indisprimary AS is_primary_key
  FROM pg_index ix
  JOIN pg_class t ON t.oid = ix.indrelid
  JOIN pg_class i ON i.oid = ix.indexrelid
  JOIN pg_namespace n ON n.oid = t.relnamespace
  JOIN LATERAL unnest(ix.indkey) WITH ORDINALITY AS k(attnum, ord) ON true
  JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum
 WHERE t.relkind = 'r' AND k.ord <= ix.indnkeyatts AND n.nspname = ANY($1)
 ORDER BY n.nspname, t.relname, i.relname, k.ord";

const FOREIGN_KEYS_SQL: &str = "\
SELECT c.oid::text AS constraint_id,
       k.ord::int4 AS ordinal,
       ns.nspname::text AS owner_schema,
       cl.relname::text AS owner_table,
       a.attname::text AS owner_column,
       rns.nspname::text AS referenced_schema,
       rcl.relname::text AS referenced_table,
       ra.attname::text AS referenced_column,
       c.confdeltype::text AS on_delete,
       c.confupdtype::text AS on_update
  FROM pg_constraint c
  JOIN pg_class cl ON cl.oid = c.conrelid
  JOIN pg_namespace ns ON ns.oid = cl.relnamespace
  JOIN pg_class rcl ON rcl.oid = c.confrelid
  JOIN pg_namespace rns ON rns.oid = rcl.relnamespace
  JOIN LATERAL unnest(c.conkey, c.confkey) WITH ORDINALITY AS k(owner_attnum, referenced_attnum, ord) ON true
  JOIN pg_attribute a ON a.attrelid = c.conrelid AND a.attnum = k.owner_attnum
  JOIN pg_attribute ra ON ra.attrelid = c.confrelid AND ra.attnum = k.referenced_attnum
 WHERE c.contype = 'f' AND ns.nspname = ANY($1)
 ORDER BY ns.nspname, cl.relname, c.conname, k.ord";

/// `pg_constraint.confdeltype` / `confupdtype` code to action token.
fn action_code(code: &str) -> String {
    match code {
        "a" => "NO_ACTION",
        "r" => "RESTRICT",
        "c" => "CASCADE",
        "n" => "SET_NULL",
        "d" => "SET_DEFAULT",
        other => other,
    }
    .to_string()
}

/// Introspects PostgreSQL with catalog queries over one connection.
#[derive(Default)]
pub struct PostgresAdapter {
    conn: Option<PgConnection>,
    /// Kept so `use_database` can reconnect.
    config: Option<ConnectionConfig>,
}

impl PostgresAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn options(config: &ConnectionConfig) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port_or_default())
            .database(&config.database)
            .application_name("schemalens")
            .ssl_mode(if config.encrypt {
                PgSslMode::Require
            } else {
                PgSslMode::Prefer
            });
        if let Some(user) = &config.user {
            options = options.username(user);
        }
        if let Some(password) = &config.password {
            options = options.password(password);
        }
        options
    }

    fn conn(&mut self) -> IntrospectResult<&mut PgConnection> {
        self.conn.as_mut().ok_or(IntrospectError::NotConnected)
    }

    async fn fetch(
        &mut self,
        phase: MetadataPhase,
        sql: &str,
        filter: &SchemaFilter,
    ) -> IntrospectResult<Vec<PgRow>> {
        let conn = self.conn()?;
        let rows = sqlx::query(sql)
            .bind(filter.schemas().to_vec())
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| IntrospectError::query(phase, e))?;
        tracing::debug!(%phase, rows = rows.len(), "postgres query");
        Ok(rows)
    }

    /// Unprepared, over the simple query protocol.
    async fn execute(&mut self, sql: String) -> IntrospectResult<()> {
        let conn = self.conn()?;
        Executor::execute(&mut *conn, sql.as_str())
            .await
            .map_err(|e| IntrospectError::query(MetadataPhase::Fixture, e))?;
        Ok(())
    }
}

fn get<'r, T>(row: &'r PgRow, phase: MetadataPhase, column: &str) -> IntrospectResult<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| IntrospectError::malformed(phase, e.to_string()))
}

#[async_trait]
impl DialectAdapter for PostgresAdapter {
    fn driver(&self) -> Driver {
        Driver::Postgres
    }

    fn type_mapper(&self) -> &TypeMapper {
        &POSTGRES_TYPES
    }

    async fn connect(&mut self, config: &ConnectionConfig) -> IntrospectResult<()> {
        let conn = PgConnection::connect_with(&Self::options(config))
            .await
            .map_err(|e| IntrospectError::connect("postgres", e))?;
        tracing::info!(host = %config.host, database = %config.database, "connected to postgres");
        self.conn = Some(conn);
        self.config = Some(config.clone());
        Ok(())
    }

    async fn disconnect(&mut self) -> IntrospectResult<()> {
        if let Some(conn) = self.conn.take() {
            // The connection is gone either way.
            if let Err(e) = conn.close().await {
                tracing::warn!(error = %e, "postgres connection did not close cleanly");
            }
        }
        Ok(())
    }

    async fn list_tables(&mut self, filter: &SchemaFilter) -> IntrospectResult<Vec<RawTable>> {
        let phase = MetadataPhase::Tables;
        self.fetch(phase, TABLES_SQL, filter)
            .await?
            .iter()
            .map(|row| {
                Ok(RawTable {
                    schema: get(row, phase, "table_schema")?,
                    name: get(row, phase, "table_name")?,
                })
            })
            .collect()
    }

    async fn list_columns(&mut self, filter: &SchemaFilter) -> IntrospectResult<Vec<RawColumn>> {
        let phase = MetadataPhase::Columns;
        self.fetch(phase, COLUMNS_SQL, filter)
            .await?
            .iter()
            .map(|row| {
                let nullable: String = get(row, phase, "is_nullable")?;
                let native: String = get(row, phase, "data_type")?;
                Ok(RawColumn {
                    schema: get(row, phase, "table_schema")?,
                    table: get(row, phase, "table_name")?,
                    column: get(row, phase, "column_name")?,
                    is_nullable: nullable == "YES",
                    default: get(row, phase, "column_default")?,
                    native_type: native.to_lowercase(),
                    max_length: get(row, phase, "max_length")?,
                    precision: get(row, phase, "numeric_precision")?,
                    scale: get(row, phase, "numeric_scale")?,
                    is_identity: get::<Option<bool>>(row, phase, "is_identity")?.unwrap_or(false),
                    is_unique: get(row, phase, "is_unique")?,
                })
            })
            .collect()
    }

    async fn list_indexes(
        &mut self,
        filter: &SchemaFilter,
    ) -> IntrospectResult<Vec<RawIndexColumn>> {
        let phase = MetadataPhase::Indexes;
        self.fetch(phase, INDEXES_SQL, filter)
            .await?
            .iter()
            .map(|row| {
                Ok(RawIndexColumn {
                    schema: get(row, phase, "schema_name")?,
                    table: get(row, phase, "table_name")?,
                    index_name: get(row, phase, "index_name")?,
                    column_name: get(row, phase, "column_name")?,
                    is_unique: get(row, phase, "is_unique")?,
                    is_primary_key: get(row, phase, "is_primary_key")?,
                })
            })
            .collect()
    }

    async fn list_foreign_keys(
        &mut self,
        filter: &SchemaFilter,
    ) -> IntrospectResult<Vec<RawForeignKeyColumn>> {
        let phase = MetadataPhase::ForeignKeys;
        self.fetch(phase, FOREIGN_KEYS_SQL, filter)
            .await?
            .iter()
            .map(|row| {
                let on_delete: String = get(row, phase, "on_delete")?;
                let on_update: String = get(row, phase, "on_update")?;
                Ok(RawForeignKeyColumn {
                    constraint_id: get(row, phase, "constraint_id")?,
                    ordinal: get(row, phase, "ordinal")?,
                    owner_schema: get(row, phase, "owner_schema")?,
                    owner_table: get(row, phase, "owner_table")?,
                    owner_column: get(row, phase, "owner_column")?,
                    referenced_schema: get(row, phase, "referenced_schema")?,
                    referenced_table: get(row, phase, "referenced_table")?,
                    referenced_column: get(row, phase, "referenced_column")?,
                    on_delete: action_code(&on_delete),
                    on_update: action_code(&on_update),
                })
            })
            .collect()
    }
}

#[async_trait]
impl DatabaseFixtures for PostgresAdapter {
    async fn create_database(&mut self, name: &str) -> IntrospectResult<()> {
        let name = checked_identifier(name)?;
        self.execute(format!("CREATE DATABASE \"{}\"", name)).await
    }

    /// PostgreSQL sessions are bound to one database, so this reconnects.
    async fn use_database(&mut self, name: &str) -> IntrospectResult<()> {
        let name = checked_identifier(name)?;
        let mut config = self.config.clone().ok_or(IntrospectError::NotConnected)?;
        config.database = name.to_string();
        self.disconnect().await?;
        self.connect(&config).await
    }

    async fn drop_database(&mut self, name: &str) -> IntrospectResult<()> {
        let name = checked_identifier(name)?;
        self.execute(format!("DROP DATABASE \"{}\"", name)).await
    }

    async fn database_exists(&mut self, name: &str) -> IntrospectResult<bool> {
        let conn = self.conn()?;
        let found = sqlx::query("SELECT 1 FROM pg_database WHERE datname = $1")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| IntrospectError::query(MetadataPhase::Fixture, e))?;
        Ok(found.is_some())
    }
}
