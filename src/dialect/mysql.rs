//! MySQL adapter over a single `sqlx` connection.
//!
//! `information_schema` text columns are cast to `CHAR` and counters to
//! `SIGNED`; some servers report them as binary or unsigned otherwise.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow, MySqlSslMode};
use sqlx::{Connection, Executor, Row};

use super::action_token;
use crate::config::{ConnectionConfig, Driver};
use crate::error::{IntrospectError, IntrospectResult, MetadataPhase};
use crate::metadata::{
    checked_identifier, DatabaseFixtures, DialectAdapter, RawColumn, RawForeignKeyColumn,
    RawIndexColumn, RawTable, SchemaFilter, TypeMapper,
};
use crate::model::CanonicalType;

/// MySQL native types, as spelled by `information_schema.COLUMNS.DATA_TYPE`.
pub static MYSQL_TYPES: Lazy<TypeMapper> = Lazy::new(|| {
    use CanonicalType as C;
    TypeMapper::new(
        &[
            ("tinyint", C::Number),
            ("smallint", C::Number),
            ("mediumint", C::Number),
            ("int", C::Number),
            ("integer", C::Number),
            ("bigint", C::String),
            ("decimal", C::Number),
            ("numeric", C::Number),
            ("float", C::Number),
            ("double", C::Number),
            ("year", C::Number),
            ("bit", C::Boolean),
            ("date", C::Date),
            ("datetime", C::Date),
            ("timestamp", C::Date),
            ("time", C::Date),
            ("char", C::String),
            ("varchar", C::String),
            ("tinytext", C::String),
            ("text", C::String),
            ("mediumtext", C::String),
            ("longtext", C::String),
            ("enum", C::String),
            ("set", C::String),
            ("json", C::String),
            ("geometry", C::String),
            ("point", C::String),
            ("linestring", C::String),
            ("polygon", C::String),
            ("binary", C::Binary),
            ("varbinary", C::Binary),
            ("tinyblob", C::Binary),
            ("blob", C::Binary),
            ("mediumblob", C::Binary),
            ("longblob", C::Binary),
        ],
        &["decimal", "numeric"],
        &["char", "varchar", "binary", "varbinary"],
    )
});

/// `?, ?, ?` for `n` bound parameters.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn tables_sql(n: usize) -> String {
    format!(
        "SELECT CAST(TABLE_SCHEMA AS CHAR) AS table_schema, CAST(TABLE_NAME AS CHAR) AS table_name \
           FROM information_schema.TABLES \
          WHERE TABLE_TYPE = 'BASE TABLE' AND TABLE_SCHEMA IN ({}) \
          ORDER BY TABLE_SCHEMA, TABLE_NAME",
        placeholders(n)
    )
}

fn columns_sql(n: usize) -> String {
    format!(
        "SELECT CAST(c.TABLE_SCHEMA AS CHAR) AS table_schema, \
                CAST(c.TABLE_NAME AS CHAR) AS table_name, \
                CAST(c.COLUMN_NAME AS CHAR) AS column_name, \
                CAST(c.COLUMN_DEFAULT AS CHAR) AS column_default, \
                CAST(c.IS_NULLABLE AS CHAR) AS is_nullable, \
                CAST(c.DATA_TYPE AS CHAR) AS data_type, \
                CAST(c.CHARACTER_MAXIMUM_LENGTH AS SIGNED) AS max_length, \
                CAST(c.NUMERIC_PRECISION AS SIGNED) AS numeric_precision, \
                CAST(c.NUMERIC_SCALE AS SIGNED) AS numeric_scale, \
                CAST(c.EXTRA AS CHAR) AS extra, \
                CAST(c.COLUMN_KEY AS CHAR) AS column_key \
           FROM information_schema.COLUMNS c \
           JOIN information_schema.TABLES t \
             ON t.TABLE_SCHEMA = c.TABLE_SCHEMA AND t.TABLE_NAME = c.TABLE_NAME \
          WHERE t.TABLE_TYPE = 'BASE TABLE' AND c.TABLE_SCHEMA IN ({}) \
          ORDER BY c.TABLE_SCHEMA, c.TABLE_NAME, c.ORDINAL_POSITION",
        placeholders(n)
    )
}

fn indexes_sql(n: usize) -> String {
    format!(
        "SELECT CAST(TABLE_SCHEMA AS CHAR) AS schema_name, \
                CAST(TABLE_NAME AS CHAR) AS table_name, \
                CAST(INDEX_NAME AS CHAR) AS index_name, \
                CAST(COLUMN_NAME AS CHAR) AS column_name, \
                CAST(NON_UNIQUE AS SIGNED) AS non_unique \
           FROM information_schema.STATISTICS \
          WHERE COLUMN_NAME IS NOT NULL AND TABLE_SCHEMA IN ({}) \
          ORDER BY TABLE_SCHEMA, TABLE_NAME, INDEX_NAME, SEQ_IN_INDEX",
        placeholders(n)
    )
}

fn foreign_keys_sql(n: usize) -> String {
    format!(
        "SELECT CAST(CONCAT(kcu.CONSTRAINT_SCHEMA, '.', kcu.CONSTRAINT_NAME) AS CHAR) AS constraint_id, \
                CAST(kcu.ORDINAL_POSITION AS SIGNED) AS ordinal, \
                CAST(kcu.TABLE_SCHEMA AS CHAR) AS owner_schema, \
                CAST(kcu.TABLE_NAME AS CHAR) AS owner_table, \
                CAST(kcu.COLUMN_NAME AS CHAR) AS owner_column, \
                CAST(kcu.REFERENCED_TABLE_SCHEMA AS CHAR) AS referenced_schema, \
                CAST(kcu.REFERENCED_TABLE_NAME AS CHAR) AS referenced_table, \
                CAST(kcu.REFERENCED_COLUMN_NAME AS CHAR) AS referenced_column, \
                CAST(rc.DELETE_RULE AS CHAR) AS on_delete, \
                CAST(rc.UPDATE_RULE AS CHAR) AS on_update \
           FROM information_schema.KEY_COLUMN_USAGE kcu \
           JOIN information_schema.REFERENTIAL_CONSTRAINTS rc \
             ON rc.CONSTRAINT_SCHEMA = kcu.CONSTRAINT_SCHEMA \
            AND rc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME \
            AND rc.TABLE_NAME = kcu.TABLE_NAME \
          WHERE kcu.REFERENCED_TABLE_NAME IS NOT NULL AND kcu.TABLE_SCHEMA IN ({}) \
          ORDER BY kcu.TABLE_SCHEMA, kcu.TABLE_NAME, kcu.CONSTRAINT_NAME, kcu.ORDINAL_POSITION",
        placeholders(n)
    )
}

/// Introspects MySQL through `information_schema` over one connection.
#[derive(Default)]
pub struct MySqlAdapter {
    conn: Option<MySqlConnection>,
}

impl MySqlAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn options(config: &ConnectionConfig) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port_or_default())
            .database(&config.database)
            .ssl_mode(if config.encrypt {
                MySqlSslMode::Required
            } else {
                MySqlSslMode::Preferred
            });
        if let Some(user) = &config.user {
            options = options.username(user);
        }
        if let Some(password) = &config.password {
            options = options.password(password);
        }
        options
    }

    fn conn(&mut self) -> IntrospectResult<&mut MySqlConnection> {
        self.conn.as_mut().ok_or(IntrospectError::NotConnected)
    }

    async fn fetch(
        &mut self,
        phase: MetadataPhase,
        sql: &str,
        filter: &SchemaFilter,
    ) -> IntrospectResult<Vec<MySqlRow>> {
        let conn = self.conn()?;
        let mut query = sqlx::query(sql);
        for schema in filter.schemas() {
            query = query.bind(schema.as_str());
        }
        let rows = query
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| IntrospectError::query(phase, e))?;
        tracing::debug!(%phase, rows = rows.len(), "mysql query");
        Ok(rows)
    }

    /// Runs over the text protocol; `USE` cannot be prepared.
    async fn execute(&mut self, sql: String) -> IntrospectResult<()> {
        let conn = self.conn()?;
        Executor::execute(&mut *conn, sql.as_str())
            .await
            .map_err(|e| IntrospectError::query(MetadataPhase::Fixture, e))?;
        Ok(())
    }
}

fn get<'r, T>(row: &'r MySqlRow, phase: MetadataPhase, column: &str) -> IntrospectResult<T>
where
    T: sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
{
    row.try_get(column)
        .map_err(|e| IntrospectError::malformed(phase, e.to_string()))
}

/// `EXTRA` also carries `DEFAULT_GENERATED` and `VIRTUAL`/`STORED GENERATED`,
/// none of which make a column database-assigned.
fn is_auto_increment(extra: Option<&str>) -> bool {
    extra.is_some_and(|e| e.to_ascii_lowercase().contains("auto_increment"))
}

/// Lengths beyond `i32` (`LONGTEXT`) are treated as unbounded.
fn narrow(value: Option<i64>) -> Option<i32> {
    value.and_then(|v| i32::try_from(v).ok())
}

#[async_trait]
impl DialectAdapter for MySqlAdapter {
    fn driver(&self) -> Driver {
        Driver::MySql
    }

    fn type_mapper(&self) -> &TypeMapper {
        &MYSQL_TYPES
    }

    async fn connect(&mut self, config: &ConnectionConfig) -> IntrospectResult<()> {
        let conn = MySqlConnection::connect_with(&Self::options(config))
            .await
            .map_err(|e| IntrospectError::connect("mysql", e))?;
        tracing::info!(host = %config.host, database = %config.database, "connected to mysql");
        self.conn = Some(conn);
        Ok(())
    }

    async fn disconnect(&mut self) -> IntrospectResult<()> {
        if let Some(conn) = self.conn.take() {
            if let Err(e) = conn.close().await {
                tracing::warn!(error = %e, "mysql connection did not close cleanly");
            }
        }
        Ok(())
    }

    async fn list_tables(&mut self, filter: &SchemaFilter) -> IntrospectResult<Vec<RawTable>> {
        let phase = MetadataPhase::Tables;
        let sql = tables_sql(filter.schemas().len());
        self.fetch(phase, &sql, filter)
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
        let sql = columns_sql(filter.schemas().len());
        self.fetch(phase, &sql, filter)
            .await?
            .iter()
            .map(|row| {
                let nullable: String = get(row, phase, "is_nullable")?;
                let native: String = get(row, phase, "data_type")?;
                let extra: Option<String> = get(row, phase, "extra")?;
                let key: Option<String> = get(row, phase, "column_key")?;
                Ok(RawColumn {
                    schema: get(row, phase, "table_schema")?,
                    table: get(row, phase, "table_name")?,
                    column: get(row, phase, "column_name")?,
                    is_nullable: nullable == "YES",
                    default: get(row, phase, "column_default")?,
                    native_type: native.to_lowercase(),
                    max_length: narrow(get(row, phase, "max_length")?),
                    precision: narrow(get(row, phase, "numeric_precision")?),
                    scale: narrow(get(row, phase, "numeric_scale")?),
                    is_identity: is_auto_increment(extra.as_deref()),
                    is_unique: key.as_deref() == Some("UNI"),
                })
            })
            .collect()
    }

    async fn list_indexes(
        &mut self,
        filter: &SchemaFilter,
    ) -> IntrospectResult<Vec<RawIndexColumn>> {
        let phase = MetadataPhase::Indexes;
        let sql = indexes_sql(filter.schemas().len());
        self.fetch(phase, &sql, filter)
            .await?
            .iter()
            .map(|row| {
                let index_name: String = get(row, phase, "index_name")?;
                let non_unique: i64 = get(row, phase, "non_unique")?;
                Ok(RawIndexColumn {
                    schema: get(row, phase, "schema_name")?,
                    table: get(row, phase, "table_name")?,
                    is_primary_key: index_name == "PRIMARY",
                    index_name,
                    column_name: get(row, phase, "column_name")?,
                    is_unique: non_unique == 0,
                })
            })
            .collect()
    }

    async fn list_foreign_keys(
        &mut self,
        filter: &SchemaFilter,
    ) -> IntrospectResult<Vec<RawForeignKeyColumn>> {
        let phase = MetadataPhase::ForeignKeys;
        let sql = foreign_keys_sql(filter.schemas().len());
        self.fetch(phase, &sql, filter)
            .await?
            .iter()
            .map(|row| {
                let ordinal: i64 = get(row, phase, "ordinal")?;
                let on_delete: String = get(row, phase, "on_delete")?;
                let on_update: String = get(row, phase, "on_update")?;
                Ok(RawForeignKeyColumn {
                    constraint_id: get(row, phase, "constraint_id")?,
                    ordinal: i32::try_from(ordinal)
                        .map_err(|e| IntrospectError::malformed(phase, e.to_string()))?,
                    owner_schema: get(row, phase, "owner_schema")?,
                    owner_table: get(row, phase, "owner_table")?,
                    owner_column: get(row, phase, "owner_column")?,
                    referenced_schema: get(row, phase, "referenced_schema")?,
                    referenced_table: get(row, phase, "referenced_table")?,
                    referenced_column: get(row, phase, "referenced_column")?,
                    on_delete: action_token(&on_delete),
                    on_update: action_token(&on_update),
                })
            })
            .collect()
    }
}

#[async_trait]
impl DatabaseFixtures for MySqlAdapter {
    async fn create_database(&mut self, name: &str) -> IntrospectResult<()> {
        let name = checked_identifier(name)?;
        self.execute(format!("CREATE DATABASE `{}`", name)).await
    }

    async fn use_database(&mut self, name: &str) -> IntrospectResult<()> {
        let name = checked_identifier(name)?;
        self.execute(format!("USE `{}`", name)).await
    }

    async fn drop_database(&mut self, name: &str) -> IntrospectResult<()> {
        let name = checked_identifier(name)?;
        self.execute(format!("DROP DATABASE `{}`", name)).await
    }

    async fn database_exists(&mut self, name: &str) -> IntrospectResult<bool> {
        let conn = self.conn()?;
        let found =
            sqlx::query("SELECT SCHEMA_NAME FROM information_schema.SCHEMATA WHERE SCHEMA_NAME = ?")
                .bind(name)
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| IntrospectError::query(MetadataPhase::Fixture, e))?;
        Ok(found.is_some())
    }
}
