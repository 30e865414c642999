#[cfg(test)]
mod tests {
    use schemalens::diagnostics::Diagnostics;
    use schemalens::inference::{synthetic_column_name, NamingStrategy, RelationInferenceEngine};
    use schemalens::metadata::RawForeignKeyColumn;
    use schemalens::model::{CanonicalType, Column, Entity};

    fn entity(name: &str, columns: &[&str]) -> Entity {
        let mut entity = Entity::new("public", name);
        for column in columns {
            entity
                .columns
                .push(Column::new(*column, "integer", CanonicalType::Number));
        }
        entity
    }

    #[test]
    fn test_base_name_is_lower_cased() {
        let author = entity("author", &["id"]);
        assert_eq!(
            synthetic_column_name("BookReview", true, &author, NamingStrategy::Plain),
            "bookreviews"
        );
        assert_eq!(
            synthetic_column_name("BookReview", false, &author, NamingStrategy::Plain),
            "bookreview"
        );
    }

    #[test]
    fn test_suffix_starts_at_two() {
        let author = entity("author", &["id", "books"]);
        assert_eq!(
            synthetic_column_name("book", true, &author, NamingStrategy::Plain),
            "books2"
        );
    }

    #[test]
    fn test_suffix_skips_taken_candidates() {
        let author = entity("author", &["books", "books2", "books3", "id"]);
        assert_eq!(
            synthetic_column_name("book", true, &author, NamingStrategy::Plain),
            "books4"
        );
    }

    #[test]
    fn test_collision_is_case_sensitive() {
        let author = entity("author", &["Books"]);
        assert_eq!(
            synthetic_column_name("book", true, &author, NamingStrategy::Plain),
            "books"
        );
    }

    #[test]
    fn test_plain_strategy_appends_s() {
        let product = entity("product", &["id"]);
        assert_eq!(
            synthetic_column_name("Category", true, &product, NamingStrategy::Plain),
            "categorys"
        );
    }

    #[test]
    fn test_inflected_strategy_pluralizes() {
        let product = entity("product", &["id"]);
        assert_eq!(
            synthetic_column_name("Category", true, &product, NamingStrategy::Inflected),
            "categories"
        );
        assert_eq!(
            synthetic_column_name("Category", false, &product, NamingStrategy::Inflected),
            "category"
        );
    }

    #[test]
    fn test_inflected_strategy_through_engine() {
        let mut entities = vec![
            entity("category", &["id"]),
            entity("category", &["id"]),
        ];
        entities[1].schema = "archive".to_string();
        entities.push(entity("product", &["id", "category_id"]));
        let rows = vec![RawForeignKeyColumn {
            constraint_id: "1".to_string(),
            ordinal: 1,
            owner_schema: "public".to_string(),
            owner_table: "product".to_string(),
            owner_column: "category_id".to_string(),
            referenced_schema: "public".to_string(),
            referenced_table: "category".to_string(),
            referenced_column: "id".to_string(),
            on_delete: "NO_ACTION".to_string(),
            on_update: "NO_ACTION".to_string(),
        }];
        let mut diagnostics = Diagnostics::new();

        RelationInferenceEngine::new(NamingStrategy::Inflected).infer(
            &mut entities,
            &rows,
            &mut diagnostics,
        );

        assert!(diagnostics.is_empty());
        assert!(entities[0].column("products").is_some());
        // Same table name in another schema is a different entity.
        assert!(entities[1].column("products").is_none());
    }
}
