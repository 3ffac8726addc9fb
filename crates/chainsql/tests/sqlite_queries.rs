//! End-to-end tests against an in-memory SQLite database.

use chainsql::prelude::*;
use chainsql::sqlite::SqliteConnection;

#[derive(Debug, PartialEq)]
struct User {
    id: i64,
    name: String,
    role: String,
    age: Option<i64>,
}

impl FromRow for User {
    fn from_row(row: &Row) -> QbResult<Self> {
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            role: row.try_get("role")?,
            age: row.try_get("age")?,
        })
    }
}

fn setup() -> SqliteConnection {
    let conn = SqliteConnection::open_in_memory();
    conn.execute_batch(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            age INTEGER
        );
        CREATE TABLE orders (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id),
            total REAL NOT NULL
        );
        CREATE TABLE settings (key TEXT PRIMARY KEY, value TEXT NOT NULL);",
    )
    .unwrap();

    for (name, role, age) in [
        ("alice", "admin", Some(34)),
        ("bob", "moderator", Some(27)),
        ("carol", "member", None),
        ("dave", "member", Some(19)),
    ] {
        let mut qb = QueryBuilder::new();
        qb.insert("users")
            .values([("name", Value::from(name)), ("role", Value::from(role)), ("age", Value::from(age))]);
        qb.execute(&conn).unwrap();
    }

    for (user_id, total) in [(1, 10.0), (1, 32.5), (2, 7.25), (4, 100.0)] {
        let mut qb = QueryBuilder::new();
        qb.insert("orders")
            .values([("user_id", Value::from(user_id)), ("total", Value::from(total))]);
        qb.execute(&conn).unwrap();
    }

    conn
}

#[test]
fn test_nested_where_round_trip() {
    let conn = setup();
    let mut qb = QueryBuilder::new();
    qb.from("users")
        .where_eq("status", "active")
        .where_nested(|q| {
            q.where_eq("role", "admin").or_where_eq("role", "moderator");
        })
        .order_by("id", "asc")
        .unwrap();

    let users: Vec<User> = qb.fetch_all_as(&conn).unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["alice", "bob"]);
    assert_eq!(users[0].age, Some(34));
}

#[test]
fn test_first_value_and_pluck() {
    let conn = setup();
    let mut qb = QueryBuilder::new();
    qb.from("users").order_by("id", "desc").unwrap();

    let last: User = qb.first_as(&conn).unwrap().unwrap();
    assert_eq!(last.name, "dave");

    assert_eq!(
        qb.value(&conn, "name").unwrap(),
        Some(Value::from("dave"))
    );

    let mut ages = QueryBuilder::new();
    ages.from("users").where_not_null("age").order_by("id", "asc").unwrap();
    assert_eq!(
        ages.pluck(&conn, "age").unwrap(),
        vec![Value::Int(34), Value::Int(27), Value::Int(19)]
    );

    let mut roles = QueryBuilder::new();
    roles.from("users").order_by("id", "asc").unwrap();
    let by_role = roles.pluck_keyed(&conn, "name", "role").unwrap();
    assert_eq!(
        by_role,
        vec![
            (Value::from("admin"), Value::from("alice")),
            (Value::from("moderator"), Value::from("bob")),
            (Value::from("member"), Value::from("dave")),
        ]
    );
}

#[test]
fn test_first_on_empty_result() {
    let conn = setup();
    let mut qb = QueryBuilder::new();
    qb.from("users").where_eq("name", "nobody");
    assert!(qb.first(&conn).unwrap().is_none());
    assert_eq!(qb.value(&conn, "name").unwrap(), None);
    assert!(!qb.exists(&conn).unwrap());
}

#[test]
fn test_aggregates() {
    let conn = setup();
    let mut qb = QueryBuilder::new();
    qb.from("users");
    assert_eq!(qb.count(&conn, "*").unwrap(), 4);
    assert_eq!(qb.count(&conn, "age").unwrap(), 3);
    assert_eq!(qb.max(&conn, "age").unwrap(), Some(Value::Int(34)));
    assert_eq!(qb.min(&conn, "age").unwrap(), Some(Value::Int(19)));
    assert_eq!(qb.sum(&conn, "age").unwrap(), Some(Value::Int(80)));

    let avg = qb.avg(&conn, "age").unwrap().and_then(|v| v.as_f64()).unwrap();
    assert!((avg - 80.0 / 3.0).abs() < 1e-9);

    let mut none = QueryBuilder::new();
    none.from("users").where_eq("role", "ghost");
    assert_eq!(none.max(&conn, "age").unwrap(), None);
    assert_eq!(none.count(&conn, "*").unwrap(), 0);

    // Probes never leak into the caller's builder.
    assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM users");
}

#[test]
fn test_join_group_having() {
    let conn = setup();
    let mut qb = QueryBuilder::new();
    qb.select(["u.name", "SUM(o.total) as spent"])
        .from_as("users", "u")
        .inner_join("orders o", "o.user_id", "=", "u.id")
        .group_by(["u.name"])
        .having("SUM(o.total)", ">", 20)
        .order_by("spent", "desc")
        .unwrap();

    let rows = qb.get(&conn).unwrap();
    let names: Vec<String> = rows.iter().map(|r| r.try_get("name").unwrap()).collect();
    assert_eq!(names, ["dave", "alice"]);
    assert_eq!(rows[1].get("spent"), Some(&Value::Float(42.5)));
}

#[test]
fn test_union_all_keeps_duplicates() {
    let conn = setup();
    let mut admins = QueryBuilder::new();
    admins.select(["name"]).from("users").where_eq("role", "admin");

    let mut qb = QueryBuilder::new();
    qb.select(["name"])
        .from("users")
        .where_eq("role", "admin")
        .union_all(admins.clone());
    assert_eq!(qb.get(&conn).unwrap().len(), 2);

    let mut qb = QueryBuilder::new();
    qb.select(["name"])
        .from("users")
        .where_eq("role", "admin")
        .union(admins);
    assert_eq!(qb.get(&conn).unwrap().len(), 1);
}

#[test]
fn test_insert_update_delete_cycle() {
    let conn = setup();

    let mut insert = QueryBuilder::new();
    insert
        .insert("users")
        .data([("name", "erin"), ("role", "member")])
        .unwrap();
    assert_eq!(insert.insert_get_id(&conn).unwrap(), "5");

    let mut update = QueryBuilder::new();
    update
        .update("users")
        .set("status", "inactive")
        .where_in("role", ["member"])
        .unwrap();
    assert_eq!(update.row_count(&conn).unwrap(), 3);

    let mut inactive = QueryBuilder::new();
    inactive.from("users").where_eq("status", "inactive");
    assert_eq!(inactive.count(&conn, "*").unwrap(), 3);

    let mut delete = QueryBuilder::new();
    delete
        .delete("users")
        .where_eq("status", "inactive")
        .where_not_in("name", ["carol", "dave"])
        .unwrap();
    assert_eq!(delete.row_count(&conn).unwrap(), 1);

    let mut all = QueryBuilder::new();
    all.from("users");
    assert_eq!(all.count(&conn, "*").unwrap(), 4);
}

#[test]
fn test_replace_overwrites_row() {
    let conn = setup();
    for value in ["light", "dark"] {
        let mut qb = QueryBuilder::new();
        qb.replace("settings").values([("key", "theme"), ("value", value)]);
        qb.execute(&conn).unwrap();
    }

    let mut qb = QueryBuilder::new();
    qb.from("settings").where_eq("key", "theme");
    assert_eq!(qb.count(&conn, "*").unwrap(), 1);
    assert_eq!(qb.value(&conn, "value").unwrap(), Some(Value::from("dark")));
}

#[test]
fn test_between_and_null_bindings() {
    let conn = setup();
    let mut qb = QueryBuilder::new();
    qb.select(["name"])
        .from("users")
        .where_between("age", 20, 40)
        .or_where_null("age")
        .order_by("id", "asc")
        .unwrap();
    let names = qb.pluck(&conn, "name").unwrap();
    assert_eq!(
        names,
        vec![Value::from("alice"), Value::from("bob"), Value::from("carol")]
    );
}

#[test]
fn test_failed_execution_is_reported() {
    let conn = setup();
    let mut qb = QueryBuilder::new();
    qb.insert("orders").values([("user_id", 999), ("total", 1)]);
    // Foreign keys are enforced by default.
    let err = qb.execute(&conn).unwrap_err();
    assert!(err.is_execution());
}

#[test]
fn test_values_many_inserts_every_row() {
    let conn = setup();
    let mut qb = QueryBuilder::new();
    qb.insert("orders")
        .values_many([
            [("user_id", Value::from(2)), ("total", Value::from(1.0))],
            [("total", Value::from(2.0)), ("user_id", Value::from(3))],
        ])
        .unwrap();
    assert_eq!(qb.row_count(&conn).unwrap(), 2);

    let mut carol = QueryBuilder::new();
    carol.from("orders").where_eq("user_id", 3);
    assert_eq!(carol.sum(&conn, "total").unwrap(), Some(Value::Float(2.0)));
}

#[test]
fn test_insert_pool_flushes_in_batches() {
    let conn = setup();
    let mut pool = InsertPool::new(&conn, "settings", ["key", "value"], 3).unwrap();
    for i in 0..7 {
        pool.push([("key", format!("k{}", i)), ("value", format!("v{}", i))])
            .unwrap();
    }
    // Two full batches were written on the way; one row is still buffered.
    assert_eq!(pool.len(), 1);

    let mut settings = QueryBuilder::new();
    settings.from("settings");
    assert_eq!(settings.count(&conn, "*").unwrap(), 6);

    assert_eq!(pool.commit().unwrap(), 1);
    assert_eq!(settings.count(&conn, "*").unwrap(), 7);
    assert_eq!(
        settings.where_eq("key", "k6").value(&conn, "value").unwrap(),
        Some(Value::from("v6"))
    );
}
