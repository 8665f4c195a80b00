use bindery::{Bindable, Options, Value, value};

#[derive(Debug, Default, PartialEq, Bindable)]
struct User {
    #[bind(tag = "name,required")]
    name: String,
    age: i64,
    email: Option<String>,
}

#[derive(Debug, Default, PartialEq, Bindable)]
struct Unit;

#[test]
fn test_bind_named_struct() {
    let source = value!({ "name": "Alice", "age": 30 });
    let user: User = bindery::bind(&source, &Options::new()).unwrap();
    assert_eq!(
        user,
        User {
            name: "Alice".to_string(),
            age: 30,
            email: None,
        }
    );
}

#[test]
fn test_unbind_named_struct() {
    let user = User {
        name: "Alice".to_string(),
        age: 30,
        email: Some("alice@example.com".to_string()),
    };
    let out = bindery::unbind(&user, &Options::new()).unwrap();
    assert_eq!(
        Value::from(out),
        value!({ "name": "Alice", "age": 30, "email": "alice@example.com" })
    );
}

#[test]
fn test_bind_unit_struct() {
    let unit: Unit = bindery::bind(&value!({ "ignored": true }), &Options::new()).unwrap();
    assert_eq!(unit, Unit);
    assert!(bindery::unbind(&unit, &Options::new()).unwrap().is_empty());
}

#[test]
fn test_required_field_is_enforced() {
    let err = bindery::bind::<User>(&value!({ "age": 30 }), &Options::new()).unwrap_err();
    assert!(err.is_required());
    assert_eq!(err.path().to_string(), "User.name");
}
