#[cfg(test)]
mod tests {
    use schemalens::diagnostics::{Diagnostic, Diagnostics};
    use schemalens::inference::{NamingStrategy, RelationInferenceEngine};
    use schemalens::metadata::RawForeignKeyColumn;
    use schemalens::model::{
        CanonicalType, Column, Entity, Index, ReferentialAction, RelationKind,
    };

    fn entity(name: &str, columns: &[&str]) -> Entity {
        let mut entity = Entity::new("dbo", name);
        for column in columns {
            entity
                .columns
                .push(Column::new(*column, "int", CanonicalType::Number));
        }
        entity
    }

    fn unique_on(entity: &mut Entity, index: &str, columns: &[&str]) {
        let mut idx = Index::new(index, true, false);
        for column in columns {
            idx.push_column(*column);
        }
        entity.indexes.push(idx);
    }

    fn fk(
        id: &str,
        ordinal: i32,
        owner: (&str, &str),
        referenced: (&str, &str),
        on_delete: &str,
    ) -> RawForeignKeyColumn {
        RawForeignKeyColumn {
            constraint_id: id.to_string(),
            ordinal,
            owner_schema: "dbo".to_string(),
            owner_table: owner.0.to_string(),
            owner_column: owner.1.to_string(),
            referenced_schema: "dbo".to_string(),
            referenced_table: referenced.0.to_string(),
            referenced_column: referenced.1.to_string(),
            on_delete: on_delete.to_string(),
            on_update: "NO_ACTION".to_string(),
        }
    }

    fn library() -> Vec<Entity> {
        vec![
            entity("Author", &["id", "name"]),
            entity("Book", &["id", "title", "author_id"]),
        ]
    }

    fn infer(entities: &mut [Entity], rows: &[RawForeignKeyColumn]) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        RelationInferenceEngine::new(NamingStrategy::Plain).infer(entities, rows, &mut diagnostics);
        diagnostics
    }

    #[test]
    fn test_plain_foreign_key_is_many_to_one() {
        let mut entities = library();
        let rows = vec![fk("fk_book_author", 1, ("Book", "author_id"), ("Author", "id"), "NO_ACTION")];

        let diagnostics = infer(&mut entities, &rows);
        assert!(diagnostics.is_empty());

        let owner = &entities[1].column("author_id").unwrap().relations()[0];
        assert_eq!(owner.kind, RelationKind::ManyToOne);
        assert!(owner.is_owner);
        assert_eq!(owner.related_table, "Author");
        assert_eq!(owner.related_column, "id");
        assert_eq!(owner.inverse_column.as_deref(), Some("books"));
        assert_eq!(owner.on_delete, None);

        let books = entities[0].column("books").unwrap();
        assert!(books.is_virtual);
        assert_eq!(books.canonical_type, CanonicalType::Unknown);
        let inverse = &books.relations()[0];
        assert_eq!(inverse.kind, RelationKind::OneToMany);
        assert!(!inverse.is_owner);
        assert_eq!(inverse.related_table, "Book");
        assert_eq!(inverse.related_column, "author_id");
        assert!(owner.pairs_with(inverse));
    }

    #[test]
    fn test_unique_foreign_key_is_one_to_one() {
        let mut entities = library();
        unique_on(&mut entities[1], "uq_book_author", &["author_id"]);
        let rows = vec![fk("fk", 1, ("Book", "author_id"), ("Author", "id"), "CASCADE")];

        infer(&mut entities, &rows);

        let owner = &entities[1].column("author_id").unwrap().relations()[0];
        assert_eq!(owner.kind, RelationKind::OneToOne);
        assert_eq!(owner.on_delete, Some(ReferentialAction::Cascade));
        let inverse = &entities[0].column("book").unwrap().relations()[0];
        assert_eq!(inverse.kind, RelationKind::OneToOne);
    }

    #[test]
    fn test_composite_unique_index_counts_as_unique() {
        let mut entities = library();
        unique_on(&mut entities[1], "uq_book_author_title", &["title", "author_id"]);
        let rows = vec![fk("fk", 1, ("Book", "author_id"), ("Author", "id"), "NO_ACTION")];

        infer(&mut entities, &rows);

        let owner = &entities[1].column("author_id").unwrap().relations()[0];
        assert_eq!(owner.kind, RelationKind::OneToOne);
    }

    #[test]
    fn test_synthetic_name_avoids_existing_column() {
        let mut entities = vec![
            entity("Author", &["id", "book"]),
            entity("Book", &["id", "author_id"]),
        ];
        unique_on(&mut entities[1], "uq_book_author", &["author_id"]);
        let rows = vec![fk("fk", 1, ("Book", "author_id"), ("Author", "id"), "NO_ACTION")];

        infer(&mut entities, &rows);

        let owner = &entities[1].column("author_id").unwrap().relations()[0];
        assert_eq!(owner.inverse_column.as_deref(), Some("book2"));
        assert!(entities[0].column("book2").unwrap().is_virtual);
        assert!(!entities[0].column("book").unwrap().is_virtual);
    }

    #[test]
    fn test_missing_referenced_table_drops_group() {
        let mut entities = vec![entity("Book", &["id", "publisher_id"])];
        let rows = vec![fk("fk", 1, ("Book", "publisher_id"), ("Publisher", "id"), "NO_ACTION")];

        let diagnostics = infer(&mut entities, &rows);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics.entries()[0].to_string(),
            "relation between Book and Publisher: entity Publisher not found"
        );
        assert_eq!(diagnostics.summary().dropped_relation_groups, 1);
        assert!(entities
            .iter()
            .flat_map(|e| e.columns.iter())
            .all(|c| c.relations().is_empty()));
        assert_eq!(entities[0].columns.len(), 2);
    }

    #[test]
    fn test_missing_owner_table_drops_group() {
        let mut entities = vec![entity("Author", &["id"])];
        let rows = vec![fk("fk", 1, ("Book", "author_id"), ("Author", "id"), "NO_ACTION")];

        let diagnostics = infer(&mut entities, &rows);

        assert!(matches!(
            &diagnostics.entries()[0],
            Diagnostic::EntityNotFound { missing, .. } if missing == "Book"
        ));
        assert_eq!(entities[0].columns.len(), 1);
    }

    #[test]
    fn test_composite_foreign_key_yields_one_pair_per_column() {
        let mut entities = vec![
            entity("Orders", &["region", "no"]),
            entity("OrderLine", &["id", "order_region", "order_no"]),
        ];
        let rows = vec![
            fk("fk_line_order", 2, ("OrderLine", "order_no"), ("Orders", "no"), "CASCADE"),
            fk("fk_line_order", 1, ("OrderLine", "order_region"), ("Orders", "region"), "CASCADE"),
        ];

        infer(&mut entities, &rows);

        let synthetic: Vec<_> = entities[0].virtual_columns().map(|c| c.name.as_str()).collect();
        // No deduplication: each pair gets its own inverse column.
        assert_eq!(synthetic, vec!["orderlines", "orderlines2"]);

        let first = &entities[0].column("orderlines").unwrap().relations()[0];
        assert_eq!(first.owner_column, "region");
        assert_eq!(first.related_column, "order_region");
        let second = &entities[0].column("orderlines2").unwrap().relations()[0];
        assert_eq!(second.owner_column, "no");
    }

    #[test]
    fn test_missing_column_drops_only_its_pair() {
        let mut entities = vec![
            entity("Orders", &["region", "no"]),
            entity("OrderLine", &["id", "order_region"]),
        ];
        let rows = vec![
            fk("fk", 1, ("OrderLine", "order_region"), ("Orders", "region"), "NO_ACTION"),
            fk("fk", 2, ("OrderLine", "order_no"), ("Orders", "no"), "NO_ACTION"),
        ];

        let diagnostics = infer(&mut entities, &rows);

        assert_eq!(
            diagnostics.entries()[0].to_string(),
            "relation between OrderLine and Orders: column OrderLine.order_no not found"
        );
        assert_eq!(diagnostics.summary().dropped_column_pairs, 1);
        assert_eq!(entities[0].virtual_columns().count(), 1);
        assert_eq!(entities[1].column("order_region").unwrap().relations().len(), 1);
    }

    #[test]
    fn test_self_reference() {
        let mut entities = vec![entity("Employee", &["id", "manager_id"])];
        let rows = vec![fk("fk_mgr", 1, ("Employee", "manager_id"), ("Employee", "id"), "NO_ACTION")];

        infer(&mut entities, &rows);

        let employee = &entities[0];
        let owner = &employee.column("manager_id").unwrap().relations()[0];
        assert_eq!(owner.kind, RelationKind::ManyToOne);
        assert_eq!(owner.inverse_column.as_deref(), Some("employees"));
        let inverse = &employee.column("employees").unwrap().relations()[0];
        assert_eq!(inverse.owner_table, "Employee");
        assert_eq!(inverse.related_column, "manager_id");
        assert!(owner.pairs_with(inverse));
    }

    #[test]
    fn test_two_foreign_keys_to_same_table() {
        let mut entities = vec![
            entity("Person", &["id"]),
            entity("Book", &["id", "author_id", "editor_id"]),
        ];
        let rows = vec![
            fk("fk_author", 1, ("Book", "author_id"), ("Person", "id"), "NO_ACTION"),
            fk("fk_editor", 1, ("Book", "editor_id"), ("Person", "id"), "SET_NULL"),
        ];

        infer(&mut entities, &rows);

        let editor = &entities[1].column("editor_id").unwrap().relations()[0];
        assert_eq!(editor.inverse_column.as_deref(), Some("books2"));
        assert_eq!(editor.on_delete, Some(ReferentialAction::SetNull));
        assert_eq!(editor.on_delete.as_ref().unwrap().as_sql(), "SET NULL");
    }

    #[test]
    fn test_referenced_column_is_lower_cased() {
        let mut entities = vec![
            entity("Author", &["ID"]),
            entity("Book", &["id", "AuthorId"]),
        ];
        let rows = vec![fk("fk", 1, ("Book", "AuthorId"), ("Author", "ID"), "NO_ACTION")];

        infer(&mut entities, &rows);

        let owner = &entities[1].column("AuthorId").unwrap().relations()[0];
        assert_eq!(owner.owner_column, "AuthorId");
        assert_eq!(owner.related_column, "id");
        let inverse = &entities[0].column("books").unwrap().relations()[0];
        assert_eq!(inverse.owner_column, "id");
        assert!(owner.pairs_with(inverse));
    }

    #[test]
    fn test_every_relation_has_a_partner() {
        let mut entities = vec![
            entity("Author", &["id"]),
            entity("Book", &["id", "author_id"]),
            entity("Review", &["id", "book_id", "author_id"]),
        ];
        unique_on(&mut entities[2], "uq_review_book", &["book_id"]);
        let rows = vec![
            fk("fk1", 1, ("Book", "author_id"), ("Author", "id"), "CASCADE"),
            fk("fk2", 1, ("Review", "book_id"), ("Book", "id"), "NO_ACTION"),
            fk("fk3", 1, ("Review", "author_id"), ("Author", "id"), "RESTRICT"),
        ];

        infer(&mut entities, &rows);

        let all: Vec<_> = entities
            .iter()
            .flat_map(|e| e.columns.iter())
            .flat_map(|c| c.relations().iter())
            .collect();
        assert_eq!(all.len(), 6);
        for relation in &all {
            let partners = all.iter().filter(|other| relation.pairs_with(other)).count();
            assert!(partners >= 1, "no partner for {:?}", relation);
        }
    }

    #[test]
    fn test_inference_is_deterministic() {
        let rows = vec![
            fk("fk1", 1, ("Book", "author_id"), ("Author", "id"), "CASCADE"),
            fk("fk2", 1, ("Book", "title"), ("Author", "name"), "NO_ACTION"),
        ];
        let mut first = library();
        let mut second = library();

        infer(&mut first, &rows);
        infer(&mut second, &rows);

        assert_eq!(first, second);
    }
}
