use std::collections::BTreeMap;

use bindery::{Bindable, ErrorKind, Options, Value, value};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Bindable)]
enum Level {
    #[default]
    Info,
    Debug,
    #[bind(rename = "warn")]
    Warning,
}

#[derive(Debug, Default, Bindable)]
struct Logging {
    level: Level,
    per_target: BTreeMap<String, Level>,
    counts: BTreeMap<Level, u32>,
}

#[test]
fn test_bind_unit_enum() {
    let source = value!({
        "level": "debug",
        "per_target": { "db": "warn" },
        "counts": { "info": 2 },
    });
    let logging: Logging = bindery::bind(&source, &Options::new()).unwrap();
    assert_eq!(logging.level, Level::Debug);
    assert_eq!(logging.per_target["db"], Level::Warning);
    assert_eq!(logging.counts[&Level::Info], 2);
}

#[test]
fn test_unknown_variant_is_a_type_mismatch() {
    let err = bindery::bind::<Logging>(&value!({ "level": "loud" }), &Options::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.path().to_string(), "Logging.level");
    assert!(err.to_string().contains("`warn`"));
}

#[test]
fn test_unbind_unit_enum() {
    let mut logging = Logging {
        level: Level::Warning,
        ..Logging::default()
    };
    logging.counts.insert(Level::Debug, 1);
    let out = bindery::unbind(&logging, &Options::new()).unwrap();
    assert_eq!(out["level"], Value::from("warn"));
    assert_eq!(out["counts"], value!({ "debug": 1 }));
}
