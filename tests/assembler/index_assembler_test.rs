#[cfg(test)]
mod tests {
    use schemalens::assembler::assemble_indexes;
    use schemalens::metadata::RawIndexColumn;
    use schemalens::model::Entity;

    fn row(table: &str, index: &str, column: &str, unique: bool, primary: bool) -> RawIndexColumn {
        RawIndexColumn {
            schema: "dbo".to_string(),
            table: table.to_string(),
            index_name: index.to_string(),
            column_name: column.to_string(),
            is_unique: unique,
            is_primary_key: primary,
        }
    }

    #[test]
    fn test_rows_fold_by_index_name_in_row_order() {
        let mut entities = vec![Entity::new("dbo", "order_line")];
        let rows = vec![
            row("order_line", "IX_line_order", "order_region", false, false),
            row("order_line", "IX_line_order", "order_no", false, false),
            row("order_line", "PK_order_line", "id", true, true),
        ];

        let created = assemble_indexes(&mut entities, &rows);

        assert_eq!(created, 2);
        let line = &entities[0];
        let composite = line.index("IX_line_order").unwrap();
        assert_eq!(composite.column_names(), vec!["order_region", "order_no"]);
        assert!(!composite.is_unique);

        let pk = line.primary_key().unwrap();
        assert_eq!(pk.name, "PK_order_line");
        assert!(pk.is_unique);
        assert_eq!(pk.column_names(), vec!["id"]);
    }

    #[test]
    fn test_first_row_fixes_flags() {
        let mut entities = vec![Entity::new("dbo", "book")];
        let rows = vec![
            row("book", "UQ_book", "isbn", true, false),
            row("book", "UQ_book", "edition", false, true),
        ];

        assemble_indexes(&mut entities, &rows);

        let index = entities[0].index("UQ_book").unwrap();
        assert!(index.is_unique);
        assert!(!index.is_primary_key);
        assert_eq!(index.columns.len(), 2);
    }

    #[test]
    fn test_same_index_name_on_different_tables() {
        let mut entities = vec![Entity::new("dbo", "author"), Entity::new("dbo", "book")];
        let rows = vec![
            row("author", "PK", "id", true, true),
            row("book", "PK", "book_id", true, true),
        ];

        assert_eq!(assemble_indexes(&mut entities, &rows), 2);
        assert_eq!(entities[0].index("PK").unwrap().column_names(), vec!["id"]);
        assert_eq!(entities[1].index("PK").unwrap().column_names(), vec!["book_id"]);
    }

    #[test]
    fn test_rows_for_unknown_tables_are_ignored() {
        let mut entities = vec![Entity::new("dbo", "author")];
        let rows = vec![row("audit_log", "PK_audit", "id", true, true)];

        assert_eq!(assemble_indexes(&mut entities, &rows), 0);
        assert!(entities[0].indexes.is_empty());
    }

    #[test]
    fn test_unique_membership_after_assembly() {
        let mut entities = vec![Entity::new("dbo", "profile")];
        let rows = vec![
            row("profile", "PK_profile", "id", true, true),
            row("profile", "UQ_profile_user", "tenant_id", true, false),
            row("profile", "UQ_profile_user", "user_id", true, false),
            row("profile", "IX_profile_created", "created_at", false, false),
        ];

        assemble_indexes(&mut entities, &rows);

        let profile = &entities[0];
        assert!(profile.is_in_unique_index("user_id"));
        assert!(profile.is_in_unique_index("id"));
        assert!(!profile.is_in_unique_index("created_at"));
    }
}
