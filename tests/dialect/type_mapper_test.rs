#[cfg(test)]
mod tests {
    use schemalens::config::Driver;
    use schemalens::dialect::type_mapper_for;
    use schemalens::model::CanonicalType;

    fn canonical(driver: Driver, native: &str) -> Option<CanonicalType> {
        type_mapper_for(driver).canonical(native)
    }

    #[test]
    fn test_sql_server_types() {
        let cases = [
            ("bigint", CanonicalType::String),
            ("bit", CanonicalType::Boolean),
            ("smallmoney", CanonicalType::Number),
            ("datetimeoffset", CanonicalType::Date),
            ("uniqueidentifier", CanonicalType::String),
            ("image", CanonicalType::Binary),
            ("geography", CanonicalType::String),
        ];
        for (native, expected) in cases {
            assert_eq!(canonical(Driver::MsSql, native), Some(expected), "{}", native);
        }
    }

    #[test]
    fn test_postgres_types() {
        let cases = [
            ("integer", CanonicalType::Number),
            ("bigint", CanonicalType::String),
            ("double precision", CanonicalType::Number),
            ("character varying", CanonicalType::String),
            ("timestamp with time zone", CanonicalType::Date),
            ("boolean", CanonicalType::Boolean),
            ("bytea", CanonicalType::Binary),
        ];
        for (native, expected) in cases {
            assert_eq!(canonical(Driver::Postgres, native), Some(expected), "{}", native);
        }
    }

    #[test]
    fn test_mysql_types() {
        let cases = [
            ("mediumint", CanonicalType::Number),
            ("bigint", CanonicalType::String),
            ("bit", CanonicalType::Boolean),
            ("year", CanonicalType::Number),
            ("enum", CanonicalType::String),
            ("longblob", CanonicalType::Binary),
        ];
        for (native, expected) in cases {
            assert_eq!(canonical(Driver::MySql, native), Some(expected), "{}", native);
        }
    }

    #[test]
    fn test_unknown_types_are_unmapped() {
        assert_eq!(canonical(Driver::MsSql, "geometry2"), None);
        assert_eq!(canonical(Driver::Postgres, "int4range"), None);
        assert_eq!(canonical(Driver::MySql, "vector"), None);
        // Spellings are per dialect.
        assert_eq!(canonical(Driver::Postgres, "nvarchar"), None);
        assert_eq!(canonical(Driver::MsSql, "boolean"), None);
    }

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(canonical(Driver::MsSql, "NVARCHAR"), Some(CanonicalType::String));
        assert_eq!(canonical(Driver::MySql, "DateTime"), Some(CanonicalType::Date));
    }

    #[test]
    fn test_length_and_precision_sets() {
        let mssql = type_mapper_for(Driver::MsSql);
        assert!(mssql.carries_length("nvarchar"));
        assert!(!mssql.carries_length("ntext"));
        assert!(mssql.carries_precision("numeric"));
        assert!(!mssql.carries_precision("money"));

        let pg = type_mapper_for(Driver::Postgres);
        assert!(pg.carries_length("character varying"));
        assert!(!pg.carries_length("text"));

        let mysql = type_mapper_for(Driver::MySql);
        assert!(mysql.carries_precision("decimal"));
        assert!(!mysql.carries_length("longtext"));
    }

    #[test]
    fn test_synthetic_type_is_never_mapped() {
        for driver in [Driver::MsSql, Driver::Postgres, Driver::MySql] {
            assert_eq!(canonical(driver, "unknown"), None);
        }
    }
}
