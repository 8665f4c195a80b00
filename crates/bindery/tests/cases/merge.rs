use bindery::{Bindable, Options, value};

#[derive(Debug, Default, Clone, PartialEq, Bindable)]
struct Database {
    url: String,
    pool: Option<Pool>,
}

#[derive(Debug, Default, Clone, PartialEq, Bindable)]
struct Pool {
    min: u32,
    max: u32,
}

#[test]
fn merge_keeps_absent_fields() {
    let mut db = Database {
        url: "postgres://localhost".to_string(),
        pool: Some(Pool { min: 1, max: 10 }),
    };
    bindery::merge(&mut db, &value!({ "pool": { "max": 20 } }), &Options::new()).unwrap();
    assert_eq!(db.url, "postgres://localhost");
    assert_eq!(db.pool, Some(Pool { min: 1, max: 20 }));
}

#[test]
fn merge_is_idempotent() {
    let options = Options::new();
    let source = value!({ "url": "mysql://db", "pool": { "min": 2 } });
    let mut once = Database::default();
    bindery::merge(&mut once, &source, &options).unwrap();
    let mut twice = once.clone();
    bindery::merge(&mut twice, &source, &options).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn bind_into_resets_first() {
    let mut db = Database {
        url: "old".to_string(),
        pool: Some(Pool { min: 1, max: 1 }),
    };
    bindery::bind_into(&mut db, &value!({ "pool": { "max": 3 } }), &Options::new()).unwrap();
    assert_eq!(db.url, "");
    assert_eq!(db.pool, Some(Pool { min: 0, max: 3 }));
}

#[test]
fn explicit_null_clears_optionals() {
    let mut db = Database {
        url: "x".to_string(),
        pool: Some(Pool::default()),
    };
    bindery::merge(&mut db, &value!({ "pool": null, "url": null }), &Options::new()).unwrap();
    assert_eq!(db.pool, None);
    assert_eq!(db.url, "x");
}
