use std::time::Duration;

use bindery::{Bindable, ErrorKind, Options, Value, value};

#[derive(Debug, Default, PartialEq, Bindable)]
struct User {
    #[bind(tag = "name,required")]
    name: String,
    age: i64,
    active: bool,
    address: Option<Address>,
}

#[derive(Debug, Default, PartialEq, Bindable)]
struct Address {
    city: String,
}

#[derive(Debug, Default, PartialEq, Bindable)]
struct Worker {
    timeout: Duration,
}

#[test]
fn binds_john_doe() {
    crate::init_tracing();
    let source = value!({ "name": "John Doe", "age": 30, "active": true });
    let user: User = bindery::bind(&source, &Options::new()).unwrap();
    assert_eq!(
        user,
        User {
            name: "John Doe".to_string(),
            age: 30,
            active: true,
            address: None,
        }
    );
}

#[test]
fn missing_name_is_a_required_error() {
    let source = value!({ "age": 30 });
    let err = bindery::bind::<User>(&source, &Options::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Required);
    assert_eq!(err.path().to_string(), "User.name");
    assert!(err.to_string().contains("`name`"));
}

#[test]
fn nil_nested_record_is_omitted() {
    let user = User {
        name: "Jane".to_string(),
        ..User::default()
    };
    let out = bindery::unbind(&user, &Options::new()).unwrap();
    assert!(!out.contains_key("address"));
    assert_eq!(
        Value::from(out),
        value!({ "name": "Jane", "age": 0, "active": false })
    );
}

#[test]
fn duration_round_trips_as_text() {
    let source = value!({ "timeout": "30s" });
    let worker: Worker = bindery::bind(&source, &Options::new()).unwrap();
    assert_eq!(worker.timeout, Duration::from_secs(30));

    let out = bindery::unbind(&worker, &Options::new()).unwrap();
    assert_eq!(Value::from(out), source);
}

#[test]
fn duration_from_nanoseconds() {
    let worker: Worker =
        bindery::bind(&value!({ "timeout": 1_500_000_000 }), &Options::new()).unwrap();
    assert_eq!(worker.timeout, Duration::from_millis(1500));
    let out = bindery::unbind(&worker, &Options::new()).unwrap();
    assert_eq!(out["timeout"], Value::from("1.5s"));
}

#[test]
fn non_map_source_is_structural() {
    let err = bindery::bind::<User>(&value!([1, 2]), &Options::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
    let err = bindery::bind::<User>(&Value::Null, &Options::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
}
