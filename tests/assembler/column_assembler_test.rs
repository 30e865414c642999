#[cfg(test)]
mod tests {
    use schemalens::assembler::assemble_columns;
    use schemalens::config::Driver;
    use schemalens::diagnostics::{Diagnostic, Diagnostics};
    use schemalens::dialect::type_mapper_for;
    use schemalens::metadata::RawColumn;
    use schemalens::model::{CanonicalType, Entity};

    fn raw(table: &str, column: &str, native: &str) -> RawColumn {
        RawColumn {
            schema: "dbo".to_string(),
            table: table.to_string(),
            column: column.to_string(),
            is_nullable: false,
            default: None,
            native_type: native.to_string(),
            max_length: None,
            precision: None,
            scale: None,
            is_identity: false,
            is_unique: false,
        }
    }

    #[test]
    fn test_columns_keep_row_order_and_flags() {
        let mut entities = vec![Entity::new("dbo", "book")];
        let mut id = raw("book", "id", "int");
        id.is_identity = true;
        let mut isbn = raw("book", "isbn", "char");
        isbn.max_length = Some(13);
        isbn.is_unique = true;
        let mut subtitle = raw("book", "subtitle", "nvarchar");
        subtitle.is_nullable = true;
        subtitle.default = Some("('')".to_string());

        let added = assemble_columns(
            &mut entities,
            &[id, isbn, subtitle],
            type_mapper_for(Driver::MsSql),
            &mut Diagnostics::new(),
        );

        assert_eq!(added, 3);
        let book = &entities[0];
        let names: Vec<_> = book.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "isbn", "subtitle"]);

        let id = book.column("id").unwrap();
        assert!(id.is_generated);
        assert_eq!(id.canonical_type, CanonicalType::Number);

        let isbn = book.column("isbn").unwrap();
        assert!(isbn.is_unique);
        assert_eq!(isbn.max_length, Some(13));

        let subtitle = book.column("subtitle").unwrap();
        assert!(subtitle.is_nullable);
        assert_eq!(subtitle.default.as_deref(), Some("('')"));
    }

    #[test]
    fn test_unknown_type_is_reported_and_skipped() {
        let mut entities = vec![Entity::new("dbo", "shape")];
        let mut diagnostics = Diagnostics::new();

        assemble_columns(
            &mut entities,
            &[raw("shape", "id", "int"), raw("shape", "outline", "geometry2")],
            type_mapper_for(Driver::MsSql),
            &mut diagnostics,
        );

        assert_eq!(entities[0].columns.len(), 1);
        assert!(entities[0].column("outline").is_none());
        assert_eq!(
            diagnostics.entries(),
            &[Diagnostic::UnknownColumnType {
                native_type: "geometry2".to_string(),
                table: "shape".to_string(),
                column: "outline".to_string(),
            }]
        );
        assert_eq!(diagnostics.summary().skipped_columns, 1);
    }

    #[test]
    fn test_precision_only_for_precision_types() {
        let mut entities = vec![Entity::new("dbo", "invoice")];
        let mut total = raw("invoice", "total", "decimal");
        total.precision = Some(12);
        total.scale = Some(2);
        let mut count = raw("invoice", "line_count", "int");
        count.precision = Some(10);
        count.scale = Some(0);

        assemble_columns(
            &mut entities,
            &[total, count],
            type_mapper_for(Driver::MsSql),
            &mut Vec::<Diagnostic>::new(),
        );

        let total = entities[0].column("total").unwrap();
        assert_eq!((total.precision, total.scale), (Some(12), Some(2)));
        let count = entities[0].column("line_count").unwrap();
        assert_eq!((count.precision, count.scale), (None, None));
    }

    #[test]
    fn test_length_only_when_positive() {
        let mut entities = vec![Entity::new("dbo", "doc")];
        let mut body = raw("doc", "body", "nvarchar");
        // nvarchar(max)
        body.max_length = Some(-1);
        let mut code = raw("doc", "code", "varchar");
        code.max_length = Some(0);
        let mut notes = raw("doc", "notes", "text");
        notes.max_length = Some(2_147_483_647);

        assemble_columns(
            &mut entities,
            &[body, code, notes],
            type_mapper_for(Driver::MsSql),
            &mut Vec::<Diagnostic>::new(),
        );

        let doc = &entities[0];
        assert_eq!(doc.column("body").unwrap().max_length, None);
        assert_eq!(doc.column("code").unwrap().max_length, None);
        // text carries no declared length
        assert_eq!(doc.column("notes").unwrap().max_length, None);
    }

    #[test]
    fn test_columns_land_on_their_own_schema() {
        let mut entities = vec![Entity::new("dbo", "item"), Entity::new("sales", "item")];
        let mut sales = raw("item", "price", "money");
        sales.schema = "sales".to_string();

        assemble_columns(
            &mut entities,
            &[raw("item", "id", "int"), sales],
            type_mapper_for(Driver::MsSql),
            &mut Vec::<Diagnostic>::new(),
        );

        assert!(entities[0].column("id").is_some());
        assert!(entities[0].column("price").is_none());
        assert!(entities[1].column("price").is_some());
    }
}
