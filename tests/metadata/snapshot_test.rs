#[cfg(test)]
mod tests {
    use schemalens::assembler::fetch_raw;
    use schemalens::config::{ConnectionConfig, Driver};
    use schemalens::error::IntrospectError;
    use schemalens::metadata::{
        DialectAdapter, RawColumn, RawForeignKeyColumn, RawIndexColumn, RawMetadata, RawTable,
        SchemaFilter, SnapshotAdapter,
    };

    fn table(schema: &str, name: &str) -> RawTable {
        RawTable {
            schema: schema.to_string(),
            name: name.to_string(),
        }
    }

    fn column(schema: &str, table: &str, name: &str) -> RawColumn {
        RawColumn {
            schema: schema.to_string(),
            table: table.to_string(),
            column: name.to_string(),
            is_nullable: false,
            default: None,
            native_type: "integer".to_string(),
            max_length: None,
            precision: Some(32),
            scale: Some(0),
            is_identity: false,
            is_unique: false,
        }
    }

    fn two_schemas() -> RawMetadata {
        let mut raw = RawMetadata::empty(Driver::Postgres);
        raw.tables = vec![table("public", "customer"), table("sales", "invoice")];
        raw.columns = vec![
            column("public", "customer", "id"),
            column("sales", "invoice", "id"),
            column("sales", "invoice", "customer_id"),
        ];
        raw.indexes = vec![RawIndexColumn {
            schema: "sales".to_string(),
            table: "invoice".to_string(),
            index_name: "invoice_pkey".to_string(),
            column_name: "id".to_string(),
            is_unique: true,
            is_primary_key: true,
        }];
        raw.foreign_keys = vec![RawForeignKeyColumn {
            constraint_id: "16402".to_string(),
            ordinal: 1,
            owner_schema: "sales".to_string(),
            owner_table: "invoice".to_string(),
            owner_column: "customer_id".to_string(),
            referenced_schema: "public".to_string(),
            referenced_table: "customer".to_string(),
            referenced_column: "id".to_string(),
            on_delete: "RESTRICT".to_string(),
            on_update: "NO_ACTION".to_string(),
        }];
        raw
    }

    fn scratch_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("schemalens-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_json_round_trip_keeps_driver_and_order() {
        let raw = two_schemas();
        let json = raw.to_json().unwrap();

        assert!(json.contains("\"driver\": \"postgres\""));
        assert_eq!(RawMetadata::from_json(&json).unwrap(), raw);
    }

    #[test]
    fn test_optional_fields_default_when_absent() {
        let json = r#"{
            "driver": "mssql",
            "tables": [{"schema": "dbo", "name": "author"}],
            "columns": [{
                "schema": "dbo", "table": "author", "column": "id",
                "is_nullable": false, "native_type": "int"
            }],
            "indexes": [],
            "foreign_keys": []
        }"#;

        let raw = RawMetadata::from_json(json).unwrap();
        let id = &raw.columns[0];
        assert_eq!(raw.driver, Driver::MsSql);
        assert_eq!(id.max_length, None);
        assert!(!id.is_identity);
        assert!(!id.is_unique);
    }

    #[test]
    fn test_bad_json_is_a_format_error() {
        let err = RawMetadata::from_json("{\"driver\": \"oracle\"}").unwrap_err();
        assert!(matches!(err, IntrospectError::SnapshotFormat(_)));
    }

    #[test]
    fn test_save_and_load() {
        let path = scratch_path();
        let raw = two_schemas();

        raw.save(&path).unwrap();
        let loaded = RawMetadata::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, raw);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = RawMetadata::load(scratch_path()).unwrap_err();
        assert!(matches!(err, IntrospectError::SnapshotIo(_)));
    }

    #[tokio::test]
    async fn test_queries_require_connect() {
        let mut adapter = SnapshotAdapter::new(two_schemas());
        let filter = SchemaFilter::single("public").unwrap();

        let err = adapter.list_tables(&filter).await.unwrap_err();
        assert!(matches!(err, IntrospectError::NotConnected));

        let config = ConnectionConfig::new(Driver::Postgres, "localhost", "shop");
        adapter.connect(&config).await.unwrap();
        assert_eq!(adapter.list_tables(&filter).await.unwrap().len(), 1);

        adapter.disconnect().await.unwrap();
        assert!(adapter.list_columns(&filter).await.is_err());
        // A second disconnect is harmless.
        adapter.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_rows_are_filtered_by_schema() {
        let mut adapter = SnapshotAdapter::connected(two_schemas());
        let public = SchemaFilter::single("public").unwrap();

        let raw = fetch_raw(&mut adapter, &public).await.unwrap();

        assert_eq!(raw.tables, vec![table("public", "customer")]);
        assert_eq!(raw.columns.len(), 1);
        assert!(raw.indexes.is_empty());
        // Foreign keys follow the owning table's schema.
        assert!(raw.foreign_keys.is_empty());

        let sales = SchemaFilter::single("sales").unwrap();
        let fks = adapter.list_foreign_keys(&sales).await.unwrap();
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].referenced_schema, "public");
    }

    #[tokio::test]
    async fn test_fetch_with_every_schema_reproduces_snapshot() {
        let snapshot = two_schemas();
        let mut adapter = SnapshotAdapter::connected(snapshot.clone());
        let filter = SchemaFilter::new(["public", "sales"]).unwrap();

        let raw = fetch_raw(&mut adapter, &filter).await.unwrap();

        assert_eq!(raw, snapshot);
        assert!(adapter.type_mapper().canonical("integer").is_some());
    }
}
