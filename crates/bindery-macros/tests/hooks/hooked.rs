use bindery::{BoxError, Bindable, HookContext, Hooked, Marshal, Options, Unmarshal, Value, value};

/// Stored in Celsius; the source may be in Fahrenheit depending on a sibling field.
#[derive(Debug, Default, PartialEq, Hooked)]
struct Reading {
    celsius: f64,
}

impl Unmarshal for Reading {
    fn unmarshal(&mut self, value: &Value, cx: &HookContext<'_>) -> Result<(), BoxError> {
        let raw = value
            .as_number()
            .ok_or_else(|| format!("expected a number, got {}", value.describe()))?
            .as_f64();
        self.celsius = match cx.sibling("unit").and_then(Value::as_str) {
            Some("F") => (raw - 32.0) * 5.0 / 9.0,
            _ => raw,
        };
        Ok(())
    }
}

impl Marshal for Reading {
    fn marshal(&self) -> Result<Value, BoxError> {
        Ok(Value::from(self.celsius))
    }
}

#[derive(Debug, Default, PartialEq, Bindable)]
struct Sensor {
    reading: Reading,
    unit: String,
}

#[test]
fn test_hook_sees_siblings_declared_later() {
    let source = value!({ "reading": 212, "unit": "F" });
    let sensor: Sensor = bindery::bind(&source, &Options::new()).unwrap();
    assert_eq!(sensor.reading, Reading { celsius: 100.0 });
}

#[test]
fn test_hook_errors_carry_the_path() {
    let source = value!({ "reading": "hot", "unit": "C" });
    let err = bindery::bind::<Sensor>(&source, &Options::new()).unwrap_err();
    assert_eq!(err.kind(), bindery::ErrorKind::Custom);
    assert_eq!(err.path().to_string(), "Sensor.reading");
}

#[test]
fn test_marshal_is_used_for_unbind() {
    let sensor = Sensor {
        reading: Reading { celsius: 21.5 },
        unit: "C".to_string(),
    };
    let out = bindery::unbind(&sensor, &Options::new()).unwrap();
    assert_eq!(Value::from(out), value!({ "reading": 21.5, "unit": "C" }));
}
