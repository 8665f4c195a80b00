use bindery::{
    Bindable, BoxError, Converters, ErrorKind, HookContext, Hooked, Marshal, Options, Unmarshal,
    Value, value,
};

/// A byte size written as `"512"`, `"4k"` or `"2m"`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Hooked)]
struct ByteSize(u64);

impl Unmarshal for ByteSize {
    fn unmarshal(&mut self, value: &Value, _cx: &HookContext<'_>) -> Result<(), BoxError> {
        let text = value.as_str().ok_or("byte size must be a string")?;
        let (digits, factor) = match text.as_bytes().last() {
            Some(b'k') => (&text[..text.len() - 1], 1024),
            Some(b'm') => (&text[..text.len() - 1], 1024 * 1024),
            _ => (text, 1),
        };
        self.0 = digits.parse::<u64>()? * factor;
        Ok(())
    }
}

impl Marshal for ByteSize {
    fn marshal(&self) -> Result<Value, BoxError> {
        Ok(Value::from(self.0.to_string()))
    }
}

/// Reads the buffer count from its sibling to size itself.
#[derive(Debug, Default, PartialEq, Hooked)]
struct Budget {
    per_buffer: u64,
}

impl Unmarshal for Budget {
    fn unmarshal(&mut self, value: &Value, cx: &HookContext<'_>) -> Result<(), BoxError> {
        let total = value.as_number().ok_or("budget must be a number")?.as_f64() as u64;
        let buffers = cx
            .sibling("buffers")
            .and_then(Value::as_number)
            .map(|n| n.as_f64() as u64)
            .ok_or_else(|| format!("`buffers` must be bound before {}", cx.path()))?;
        self.per_buffer = total / buffers.max(1);
        Ok(())
    }
}

impl Marshal for Budget {
    fn marshal(&self) -> Result<Value, BoxError> {
        Ok(Value::from(self.per_buffer))
    }
}

#[derive(Debug, Default, PartialEq, Bindable)]
struct Cache {
    budget: Budget,
    limit: ByteSize,
    buffers: u32,
    optional_limit: Option<ByteSize>,
}

#[test]
fn hooks_run_after_plain_fields() {
    crate::init_tracing();
    let source = value!({ "budget": 1000, "limit": "4k", "buffers": 4 });
    let cache: Cache = bindery::bind(&source, &Options::new()).unwrap();
    assert_eq!(cache.budget, Budget { per_buffer: 250 });
    assert_eq!(cache.limit, ByteSize(4096));
    assert_eq!(cache.optional_limit, None);
}

#[test]
fn hook_failures_are_custom_errors() {
    let source = value!({ "limit": "lots", "buffers": 1 });
    let err = bindery::bind::<Cache>(&source, &Options::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Custom);
    assert_eq!(err.path().to_string(), "Cache.limit");
}

#[test]
fn converters_win_over_hooks() {
    let converters = Converters::new().with::<ByteSize, _, _>(
        |value| {
            let n = value.as_number().ok_or("expected a number")?;
            Ok(ByteSize(n.as_f64() as u64))
        },
        |size| Ok(Value::from(size.0)),
    );
    let options = Options::new().with_converters(converters);
    let source = value!({ "limit": 64, "optional_limit": 8, "buffers": 1 });
    let cache: Cache = bindery::bind(&source, &options).unwrap();
    assert_eq!(cache.limit, ByteSize(64));
    assert_eq!(cache.optional_limit, Some(ByteSize(8)));

    let out = bindery::unbind(&cache, &options).unwrap();
    assert_eq!(out["limit"], Value::from(64u64));
}

#[test]
fn converter_errors_are_fatal() {
    let converters = Converters::new().with::<u32, _, _>(
        |_| Err("no numbers today".into()),
        |n| Ok(Value::from(*n)),
    );
    let options = Options::new().with_converters(converters);
    let err = bindery::bind::<Cache>(&value!({ "buffers": 1 }), &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Custom);
    assert!(err.to_string().contains("no numbers today"));
}

#[test]
fn marshal_is_used_when_unbinding() {
    let cache = Cache {
        budget: Budget { per_buffer: 7 },
        limit: ByteSize(2048),
        buffers: 2,
        optional_limit: None,
    };
    let out = bindery::unbind(&cache, &Options::new()).unwrap();
    assert_eq!(
        Value::from(out),
        value!({ "budget": 7, "limit": "2048", "buffers": 2 })
    );
}
