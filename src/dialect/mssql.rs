//! SQL Server adapter, backed by the worker process.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::Value;

use super::action_token;
use crate::config::{ConnectionConfig, Driver, Settings};
use crate::error::{IntrospectError, IntrospectResult, MetadataPhase};
use crate::metadata::{
    checked_identifier, DatabaseFixtures, DialectAdapter, RawColumn, RawForeignKeyColumn,
    RawIndexColumn, RawTable, SchemaFilter, TypeMapper,
};
use crate::model::CanonicalType;
use crate::worker::protocol::{ConnectionParams, ExecuteQueryResponse};
use crate::worker::{WorkerClient, WorkerError};

/// SQL Server native types.
pub static MSSQL_TYPES: Lazy<TypeMapper> = Lazy::new(|| {
    use CanonicalType as C;
    TypeMapper::new(
        &[
            ("bigint", C::String),
            ("bit", C::Boolean),
            ("decimal", C::Number),
            ("int", C::Number),
            ("money", C::Number),
            ("numeric", C::Number),
            ("smallint", C::Number),
            ("smallmoney", C::Number),
            ("tinyint", C::Number),
            ("float", C::Number),
            ("real", C::Number),
            ("date", C::Date),
            ("datetime2", C::Date),
            ("datetime", C::Date),
            ("datetimeoffset", C::Date),
            ("smalldatetime", C::Date),
            ("time", C::Date),
            ("timestamp", C::Date),
            ("char", C::String),
            ("text", C::String),
            ("varchar", C::String),
            ("nchar", C::String),
            ("ntext", C::String),
            ("nvarchar", C::String),
            ("binary", C::Binary),
            ("image", C::Binary),
            ("varbinary", C::Binary),
            ("hierarchyid", C::String),
            ("sql_variant", C::String),
            ("uniqueidentifier", C::String),
            ("xml", C::String),
            ("geometry", C::String),
            ("geography", C::String),
        ],
        &["decimal", "numeric"],
        &["char", "varchar", "nchar", "nvarchar", "binary", "varbinary"],
    )
});

const DEFAULT_TIMEOUT_SECS: u64 = 30;

static NULL: Value = Value::Null;

/// Introspects SQL Server through `query.execute` calls on the worker.
///
/// `connect` spawns the worker and pings the database; `disconnect` drops
/// the worker, which kills the child process.
pub struct MssqlAdapter {
    worker_path: Option<PathBuf>,
    timeout: Duration,
    session: Option<Session>,
}

struct Session {
    client: WorkerClient,
    config: ConnectionConfig,
    connection: ConnectionParams,
}

impl Session {
    /// Every request carries its own connection string, so switching
    /// database means rewriting it for the requests that follow.
    fn use_database(&mut self, name: &str) {
        self.config.database = name.to_string();
        self.connection = worker_connection(&self.config);
    }
}

fn worker_connection(config: &ConnectionConfig) -> ConnectionParams {
    ConnectionParams {
        driver: Driver::MsSql.as_str().to_string(),
        connection_string: config.to_worker_connection_string(),
    }
}

/// A column is unique only through a UNIQUE constraint covering it alone;
/// composite constraints are left to the index metadata.
fn columns_sql(schemas: &str) -> String {
    format!(
        "SELECT c.TABLE_SCHEMA, c.TABLE_NAME, c.COLUMN_NAME, c.COLUMN_DEFAULT, c.IS_NULLABLE, \
                c.DATA_TYPE, c.CHARACTER_MAXIMUM_LENGTH, c.NUMERIC_PRECISION, c.NUMERIC_SCALE, \
                COLUMNPROPERTY(OBJECT_ID(QUOTENAME(c.TABLE_SCHEMA) + '.' + QUOTENAME(c.TABLE_NAME)), \
                               c.COLUMN_NAME, 'IsIdentity') AS IsIdentity, \
                (SELECT COUNT(*) \
                   FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc \
                   INNER JOIN INFORMATION_SCHEMA.CONSTRAINT_COLUMN_USAGE cu \
                           ON cu.CONSTRAINT_SCHEMA = tc.CONSTRAINT_SCHEMA \
                          AND cu.CONSTRAINT_NAME = tc.CONSTRAINT_NAME \
                          AND cu.TABLE_SCHEMA = tc.TABLE_SCHEMA \
                          AND cu.TABLE_NAME = tc.TABLE_NAME \
                  WHERE tc.CONSTRAINT_TYPE = 'UNIQUE' \
                    AND tc.TABLE_NAME = c.TABLE_NAME \
                    AND tc.TABLE_SCHEMA = c.TABLE_SCHEMA \
                    AND cu.COLUMN_NAME = c.COLUMN_NAME \
                    AND (SELECT COUNT(*) \
                           FROM INFORMATION_SCHEMA.CONSTRAINT_COLUMN_USAGE cc \
                          WHERE cc.CONSTRAINT_SCHEMA = tc.CONSTRAINT_SCHEMA \
                            AND cc.CONSTRAINT_NAME = tc.CONSTRAINT_NAME) = 1) AS IsUnique \
           FROM INFORMATION_SCHEMA.COLUMNS c \
          WHERE c.TABLE_SCHEMA IN ({}) \
          ORDER BY c.TABLE_SCHEMA, c.TABLE_NAME, c.ORDINAL_POSITION",
        schemas
    )
}

impl MssqlAdapter {
    pub fn new(worker_path: impl Into<PathBuf>) -> Self {
        Self {
            worker_path: Some(worker_path.into()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session: None,
        }
    }

    /// Worker location and timeout from settings. A missing worker binary
    /// surfaces as a connect error.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            worker_path: settings.worker_path(),
            timeout: Duration::from_secs(settings.worker.timeout_secs),
            session: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn session(&self) -> IntrospectResult<&Session> {
        self.session.as_ref().ok_or(IntrospectError::NotConnected)
    }

    async fn query(
        &self,
        phase: MetadataPhase,
        sql: &str,
        args: Option<Vec<Value>>,
    ) -> IntrospectResult<ResultSet> {
        let session = self.session()?;
        let response = session
            .client
            .execute_query(&session.connection, sql, args)
            .await
            .map_err(|e| match e {
                e if e.is_worker_exited() => IntrospectError::Worker(e),
                e => IntrospectError::query(phase, e),
            })?;
        tracing::debug!(%phase, rows = response.rows.len(), "mssql query");
        Ok(ResultSet { phase, response })
    }

    async fn execute(&self, sql: &str) -> IntrospectResult<()> {
        self.query(MetadataPhase::Fixture, sql, None).await.map(|_| ())
    }
}

#[async_trait]
impl DialectAdapter for MssqlAdapter {
    fn driver(&self) -> Driver {
        Driver::MsSql
    }

    fn type_mapper(&self) -> &TypeMapper {
        &MSSQL_TYPES
    }

    async fn connect(&mut self, config: &ConnectionConfig) -> IntrospectResult<()> {
        let path = self
            .worker_path
            .clone()
            .ok_or_else(|| IntrospectError::connect("mssql", WorkerError::NotFound))?;
        let client = WorkerClient::spawn_with_timeout(&path, self.timeout)
            .await
            .map_err(|e| IntrospectError::connect("mssql", e))?;
        let connection = worker_connection(config);
        client
            .ping(&connection)
            .await
            .map_err(|e| IntrospectError::connect("mssql", e))?;

        tracing::info!(host = %config.host, database = %config.database, "connected to mssql");
        self.session = Some(Session {
            client,
            config: config.clone(),
            connection,
        });
        Ok(())
    }

    async fn disconnect(&mut self) -> IntrospectResult<()> {
        if self.session.take().is_some() {
            tracing::debug!("mssql worker released");
        }
        Ok(())
    }

    async fn list_tables(&mut self, filter: &SchemaFilter) -> IntrospectResult<Vec<RawTable>> {
        let sql = format!(
            "SELECT TABLE_SCHEMA, TABLE_NAME FROM INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_TYPE = 'BASE TABLE' AND TABLE_SCHEMA IN ({}) \
             ORDER BY TABLE_SCHEMA, TABLE_NAME",
            filter.to_sql_list()
        );
        let rows = self.query(MetadataPhase::Tables, &sql, None).await?;
        rows.map(|row| {
            Ok(RawTable {
                schema: row.text("TABLE_SCHEMA")?,
                name: row.text("TABLE_NAME")?,
            })
        })
    }

    async fn list_columns(&mut self, filter: &SchemaFilter) -> IntrospectResult<Vec<RawColumn>> {
        let sql = columns_sql(&filter.to_sql_list());
        let rows = self.query(MetadataPhase::Columns, &sql, None).await?;
        rows.map(|row| {
            Ok(RawColumn {
                schema: row.text("TABLE_SCHEMA")?,
                table: row.text("TABLE_NAME")?,
                column: row.text("COLUMN_NAME")?,
                is_nullable: row.text("IS_NULLABLE")? == "YES",
                default: row.opt_text("COLUMN_DEFAULT"),
                native_type: row.text("DATA_TYPE")?.to_lowercase(),
                max_length: row.opt_int("CHARACTER_MAXIMUM_LENGTH"),
                precision: row.opt_int("NUMERIC_PRECISION"),
                scale: row.opt_int("NUMERIC_SCALE"),
                is_identity: row.flag("IsIdentity"),
                is_unique: row.flag("IsUnique"),
            })
        })
    }

    async fn list_indexes(
        &mut self,
        filter: &SchemaFilter,
    ) -> IntrospectResult<Vec<RawIndexColumn>> {
        let sql = format!(
            "SELECT s.name AS SchemaName, t.name AS TableName, ind.name AS IndexName, \
                    col.name AS ColumnName, ind.is_unique, ind.is_primary_key \
               FROM sys.indexes ind \
               INNER JOIN sys.index_columns ic \
                       ON ind.object_id = ic.object_id AND ind.index_id = ic.index_id \
               INNER JOIN sys.columns col \
                       ON ic.object_id = col.object_id AND ic.column_id = col.column_id \
               INNER JOIN sys.tables t ON ind.object_id = t.object_id \
               INNER JOIN sys.schemas s ON s.schema_id = t.schema_id \
              WHERE t.is_ms_shipped = 0 AND ic.is_included_column = 0 AND s.name IN ({}) \
              ORDER BY s.name, t.name, ind.name, ind.index_id, ic.key_ordinal",
            filter.to_sql_list()
        );
        let rows = self.query(MetadataPhase::Indexes, &sql, None).await?;
        rows.map(|row| {
            Ok(RawIndexColumn {
                schema: row.text("SchemaName")?,
                table: row.text("TableName")?,
                index_name: row.text("IndexName")?,
                column_name: row.text("ColumnName")?,
                is_unique: row.flag("is_unique"),
                is_primary_key: row.flag("is_primary_key"),
            })
        })
    }

    async fn list_foreign_keys(
        &mut self,
        filter: &SchemaFilter,
    ) -> IntrospectResult<Vec<RawForeignKeyColumn>> {
        let sql = format!(
            "SELECT CAST(fk.object_id AS varchar(20)) AS ConstraintId, \
                    fkc.constraint_column_id AS PartNo, \
                    parentSchema.name AS OwnerSchema, \
                    parentTable.name AS OwnerTable, \
                    parentColumn.name AS OwnerColumn, \
                    referencedSchema.name AS ReferencedSchema, \
                    referencedTable.name AS ReferencedTable, \
                    referencedColumn.name AS ReferencedColumn, \
                    fk.delete_referential_action_desc AS OnDelete, \
                    fk.update_referential_action_desc AS OnUpdate \
               FROM sys.foreign_keys fk \
               INNER JOIN sys.foreign_key_columns fkc ON fkc.constraint_object_id = fk.object_id \
               INNER JOIN sys.tables parentTable ON fkc.parent_object_id = parentTable.object_id \
               INNER JOIN sys.columns parentColumn \
                       ON fkc.parent_object_id = parentColumn.object_id \
                      AND fkc.parent_column_id = parentColumn.column_id \
               INNER JOIN sys.tables referencedTable \
                       ON fkc.referenced_object_id = referencedTable.object_id \
               INNER JOIN sys.columns referencedColumn \
                       ON fkc.referenced_object_id = referencedColumn.object_id \
                      AND fkc.referenced_column_id = referencedColumn.column_id \
               INNER JOIN sys.schemas parentSchema ON parentSchema.schema_id = parentTable.schema_id \
               INNER JOIN sys.schemas referencedSchema \
                       ON referencedSchema.schema_id = referencedTable.schema_id \
              WHERE fk.is_disabled = 0 AND fk.is_ms_shipped = 0 AND parentSchema.name IN ({}) \
              ORDER BY parentSchema.name, parentTable.name, fk.object_id, fkc.constraint_column_id",
            filter.to_sql_list()
        );
        let rows = self.query(MetadataPhase::ForeignKeys, &sql, None).await?;
        rows.map(|row| {
            Ok(RawForeignKeyColumn {
                constraint_id: row.text("ConstraintId")?,
                ordinal: row.int("PartNo")?,
                owner_schema: row.text("OwnerSchema")?,
                owner_table: row.text("OwnerTable")?,
                owner_column: row.text("OwnerColumn")?,
                referenced_schema: row.text("ReferencedSchema")?,
                referenced_table: row.text("ReferencedTable")?,
                referenced_column: row.text("ReferencedColumn")?,
                on_delete: action_token(&row.text("OnDelete")?),
                on_update: action_token(&row.text("OnUpdate")?),
            })
        })
    }
}

#[async_trait]
impl DatabaseFixtures for MssqlAdapter {
    async fn create_database(&mut self, name: &str) -> IntrospectResult<()> {
        let name = checked_identifier(name)?;
        self.execute(&format!("CREATE DATABASE [{}]", name)).await
    }

    async fn use_database(&mut self, name: &str) -> IntrospectResult<()> {
        let name = checked_identifier(name)?;
        let session = self.session.as_mut().ok_or(IntrospectError::NotConnected)?;
        session.use_database(name);
        tracing::debug!(database = %name, "mssql database switched");
        Ok(())
    }

    async fn drop_database(&mut self, name: &str) -> IntrospectResult<()> {
        let name = checked_identifier(name)?;
        self.execute(&format!("DROP DATABASE [{}]", name)).await
    }

    async fn database_exists(&mut self, name: &str) -> IntrospectResult<bool> {
        let rows = self
            .query(
                MetadataPhase::Fixture,
                "SELECT name FROM master.sys.databases WHERE name = @p1",
                Some(vec![Value::String(name.to_string())]),
            )
            .await?;
        Ok(!rows.response.rows.is_empty())
    }
}

/// A `query.execute` result read by column name.
struct ResultSet {
    phase: MetadataPhase,
    response: ExecuteQueryResponse,
}

impl ResultSet {
    fn map<T, F>(&self, mut f: F) -> IntrospectResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> IntrospectResult<T>,
    {
        self.response
            .rows
            .iter()
            .map(|values| f(&Row { set: self, values }))
            .collect()
    }
}

struct Row<'a> {
    set: &'a ResultSet,
    values: &'a [Value],
}

impl Row<'_> {
    fn value(&self, column: &str) -> &Value {
        self.set
            .response
            .column_index(column)
            .and_then(|i| self.values.get(i))
            .unwrap_or(&NULL)
    }

    fn text(&self, column: &str) -> IntrospectResult<String> {
        self.opt_text(column).ok_or_else(|| {
            IntrospectError::malformed(self.set.phase, format!("missing text column {}", column))
        })
    }

    fn opt_text(&self, column: &str) -> Option<String> {
        match self.value(column) {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn int(&self, column: &str) -> IntrospectResult<i32> {
        self.opt_int(column).ok_or_else(|| {
            IntrospectError::malformed(self.set.phase, format!("missing integer column {}", column))
        })
    }

    fn opt_int(&self, column: &str) -> Option<i32> {
        match self.value(column) {
            Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Non-zero numbers and `true` are set; anything else is not.
    fn flag(&self, column: &str) -> bool {
        match self.value(column) {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_i64().is_some_and(|v| v != 0),
            Value::String(s) => s == "1" || s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}
