use dbmeta::access::{Record, Value};
use dbmeta::catalog::{Catalog, Table};
use dbmeta::database::Database;
use dbmeta::error::QueryError;
use dbmeta::executor::{AggregateFunction, Condition, Pipeline};
use dbmeta::sql::CompiledExpression;
use std::fs;
use tempfile::TempDir;

fn record<const N: usize>(pairs: [(&str, Value); N]) -> Record {
    pairs.into_iter().collect()
}

fn sample_db() -> Database {
    let mut catalog = Catalog::new();
    catalog
        .register_table(Table::new(
            "T",
            vec![
                record([("id", 1.into()), ("amt", 10.into())]),
                record([("id", 1.into()), ("amt", 20.into())]),
                record([("id", 2.into()), ("amt", 5.into())]),
            ],
        ))
        .unwrap();
    Database::new(catalog)
}

fn mail_db() -> Database {
    let mut catalog = Catalog::new();
    catalog
        .register_table(Table::new(
            "emails",
            vec![
                record([
                    ("iid", "m1".into()),
                    ("subject", "Quarterly report".into()),
                    ("size", 1200.into()),
                    ("folder", "inbox".into()),
                ]),
                record([
                    ("iid", "m2".into()),
                    ("subject", "lunch?".into()),
                    ("size", 300.into()),
                    ("folder", "inbox".into()),
                ]),
                record([
                    ("iid", "m3".into()),
                    ("subject", "Report draft".into()),
                    ("size", 4500.into()),
                    ("folder", "archive".into()),
                ]),
                record([
                    ("iid", "m4".into()),
                    ("subject", Value::Null),
                    ("size", "unknown".into()),
                    ("folder", "spam".into()),
                ]),
            ],
        ))
        .unwrap();
    catalog
        .register_table(Table::new(
            "senders",
            vec![
                record([("iid", "m1".into()), ("sender", "alice".into())]),
                record([("iid", "m2".into()), ("sender", "bob".into())]),
                record([("iid", "m3".into()), ("sender", "alice".into())]),
            ],
        ))
        .unwrap();
    Database::new(catalog)
}

fn column(result: &Pipeline, name: &str) -> Vec<Value> {
    result.iter().map(|r| r.get(name).cloned().unwrap_or(Value::Null)).collect()
}

#[test]
fn test_group_sum_scenario() {
    let db = sample_db();
    let grouped = db.table("T").unwrap().group_by(&["id"]).select(&["id", "SUM_amt"]);
    assert_eq!(
        grouped.all(),
        &[
            record([("id", 1.into()), ("SUM_amt", 30.into())]),
            record([("id", 2.into()), ("SUM_amt", 5.into())]),
        ]
    );
}

#[test]
fn test_where_order_limit_scenario() {
    let db = sample_db();
    let result = db
        .sql("SELECT id FROM T WHERE amt > 8 ORDER BY id DESC LIMIT 1")
        .unwrap();
    assert_eq!(result.all(), &[record([("id", 1.into())])]);
}

#[test]
fn test_count_star_scenario() {
    let db = sample_db();
    let result = db.sql("SELECT COUNT(*) FROM T").unwrap();
    assert_eq!(result.all(), &[record([("COUNT_*", 3.into())])]);
}

#[test]
fn test_missing_from_scenario() {
    let db = sample_db();
    assert!(matches!(db.sql("SELECT x"), Err(QueryError::Syntax(_))));
}

#[test]
fn test_group_counts_cover_every_row() {
    let db = mail_db();
    let groups = db.table("emails").unwrap().group_by(&["folder"]);
    let total: usize = groups.iter().map(|g| g.count()).sum();
    assert_eq!(total, 4);
    assert_eq!(
        column(&groups.select(&["folder", "COUNT"]), "COUNT"),
        vec![Value::from(2), Value::from(1), Value::from(1)]
    );
}

#[test]
fn test_limit_properties() {
    let rows = mail_db().table("emails").unwrap();
    assert_eq!(rows.limit(2).limit(2), rows.limit(2));
    assert_eq!(rows.limit(10).len(), 4);
    assert_eq!(rows.limit(0).len(), 0);
}

#[test]
fn test_precedence_and_literal_expressions() {
    let row = Record::new();
    assert!(CompiledExpression::parse("1 = 1").unwrap().matches(&row));
    assert!(!CompiledExpression::parse("1 = 2").unwrap().matches(&row));
    // A OR B AND C is A OR (B AND C)
    assert!(CompiledExpression::parse("1 = 1 OR 1 = 2 AND 1 = 2")
        .unwrap()
        .matches(&row));
    assert!(!CompiledExpression::parse("(1 = 1 OR 1 = 2) AND 1 = 2")
        .unwrap()
        .matches(&row));
}

#[test]
fn test_text_and_membership_predicates() {
    let db = mail_db();
    let result = db
        .sql(
            "SELECT iid FROM emails WHERE subject CONTAINS 'report' \
             AND folder NOT IN ('spam', 'archive')",
        )
        .unwrap();
    assert_eq!(column(&result, "iid"), vec![Value::from("m1")]);

    let result = db
        .sql("SELECT iid FROM emails WHERE folder IN (inbox, spam) AND NOT (size > 1000)")
        .unwrap();
    // m4's size is text, so `size > 1000` is false and its negation true
    assert_eq!(column(&result, "iid"), vec![Value::from("m2"), Value::from("m4")]);
}

#[test]
fn test_type_mismatch_is_false_not_an_error() {
    let db = mail_db();
    let result = db.sql("SELECT iid FROM emails WHERE size > 1000").unwrap();
    assert_eq!(column(&result, "iid"), vec![Value::from("m1"), Value::from("m3")]);
}

#[test]
fn test_join_group_having() {
    let db = mail_db();
    let result = db
        .sql(
            "SELECT sender, COUNT(*) AS n, SUM(size) total FROM emails \
             JOIN senders USING(iid) GROUP BY sender HAVING SUM_size > 2000 ORDER BY sender",
        )
        .unwrap();
    assert_eq!(
        result.all(),
        &[record([
            ("sender", "alice".into()),
            ("n", 2.into()),
            ("total", 5700.into()),
        ])]
    );
}

#[test]
fn test_relational_api_join() {
    let db = mail_db();
    let emails = db.table("emails").unwrap();
    let senders = db.table("senders").unwrap();
    let joined = emails.join(&senders, "iid");
    assert_eq!(joined.len(), 3);
    assert_eq!(emails.multi_join(&[senders.clone()], "iid"), joined);
    assert_eq!(
        joined
            .filter(&[Condition::new("sender", "=", "alice")])
            .aggregate(AggregateFunction::Max, Some("size")),
        Value::from(4500)
    );
}

#[test]
fn test_keywords_inside_literals() {
    let db = mail_db();
    let result = db
        .sql("SELECT iid FROM emails WHERE subject = 'select * from t order by x limit 1'")
        .unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_unsortable_order_by_keeps_order() {
    let db = mail_db();
    let result = db.sql("SELECT iid FROM emails ORDER BY size DESC").unwrap();
    assert_eq!(
        column(&result, "iid"),
        vec![
            Value::from("m1"),
            Value::from("m2"),
            Value::from("m3"),
            Value::from("m4")
        ]
    );
}

#[test]
fn test_errors() {
    let db = mail_db();
    assert_eq!(
        db.sql("SELECT * FROM nope").unwrap_err(),
        QueryError::UnknownTable("nope".to_string())
    );
    assert!(db.sql("SELECT * FROM emails WHERE size # 3").unwrap_err().is_lexical());
    assert!(matches!(
        db.sql("SELECT * FROM emails WHERE (size > 3"),
        Err(QueryError::Syntax(_))
    ));
    assert!(matches!(
        db.sql("SELECT * FROM emails WHERE folder IN 'inbox'"),
        Err(QueryError::Syntax(_))
    ));
}

#[test]
fn test_folder_database() {
    let dir = TempDir::new().unwrap();
    for (entity, metadata) in [
        ("e2", r#"{"docs": {"pages": 12, "title": "b"}, "owner": "carol"}"#),
        ("e1", r#"{"docs": {"pages": 3, "title": "a"}}"#),
    ] {
        let folder = dir.path().join(entity);
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("metadata.json"), metadata).unwrap();
    }

    let db = Database::open(dir.path(), "metadata.json").unwrap();
    assert_eq!(db.list_tables(), vec!["docs", "owner"]);

    let result = db
        .sql("SELECT iid, title FROM docs WHERE pages >= 3 ORDER BY pages DESC;")
        .unwrap();
    assert_eq!(
        result.all(),
        &[
            record([("iid", "e2".into()), ("title", "b".into())]),
            record([("iid", "e1".into()), ("title", "a".into())]),
        ]
    );

    let owner = db.sql("SELECT value FROM owner").unwrap();
    assert_eq!(column(&owner, "value"), vec![Value::from("carol")]);
}
