// Integration tests for the migration framework
#![allow(clippy::unwrap_used, clippy::expect_used)]

use rusqlite::Connection;

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    // Given: an empty database
    let mut conn = Connection::open_in_memory().unwrap();

    // When: migrations are applied
    vgraph_store::migrations::apply_migrations(&mut conn).unwrap();

    // Then: the schema tables exist
    assert_eq!(
        table_names(&conn),
        vec!["branches", "entity_versions", "schema_version"]
    );
}

#[test]
fn test_version_rows_reject_unknown_kind() {
    let mut conn = Connection::open_in_memory().unwrap();
    vgraph_store::migrations::apply_migrations(&mut conn).unwrap();

    let result = conn.execute(
        "INSERT INTO entity_versions (id, canonical_id, version, kind, entity_type, content, seq, created_at)
         VALUES ('v1', 'c1', 1, 'edge', 'T', '{}', 1, '2024-01-01T00:00:00Z')",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn test_seq_is_unique() {
    let mut conn = Connection::open_in_memory().unwrap();
    vgraph_store::migrations::apply_migrations(&mut conn).unwrap();

    let insert = |id: &str| {
        conn.execute(
            "INSERT INTO entity_versions (id, canonical_id, version, kind, entity_type, content, seq, created_at)
             VALUES (?1, 'c1', 1, 'object', 'T', '{}', 7, '2024-01-01T00:00:00Z')",
            [id],
        )
    };
    insert("v1").unwrap();
    assert!(insert("v2").is_err());
}
