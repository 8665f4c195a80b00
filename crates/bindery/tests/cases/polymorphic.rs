use bindery::{Bindable, Dynamic, DynamicRegistry, Options, Value, value};

#[derive(Debug, Default, PartialEq, Bindable)]
struct Shell {
    command: String,
}

impl Dynamic for Shell {
    fn type_tag(&self) -> &str {
        "shell"
    }
}

#[derive(Debug, Default, PartialEq, Bindable)]
struct Http {
    url: String,
    #[bind(tag = "retries,omitempty")]
    retries: u32,
}

impl Dynamic for Http {
    fn type_tag(&self) -> &str {
        "http"
    }
}

#[derive(Debug, Default, Bindable)]
struct Step {
    name: String,
    action: Option<Box<dyn Dynamic>>,
}

#[derive(Debug, Default, Bindable)]
struct Workflow {
    steps: Vec<Step>,
    hooks: Vec<Box<dyn Dynamic>>,
}

fn options() -> Options {
    Options::new().with_dynamic(
        DynamicRegistry::new()
            .with::<Shell>("shell")
            .with::<Http>("http"),
    )
}

fn source() -> Value {
    value!({
        "steps": [
            { "name": "build", "action": { "type": "shell", "command": "make" } },
            { "name": "notify", "action": { "type": "http", "url": "https://hooks.example" } },
            { "name": "noop" },
        ],
        "hooks": [
            { "type": "http", "url": "https://a.example", "retries": 2 },
            { "type": "shell", "command": "true" },
        ],
    })
}

#[test]
fn polymorphic_values_keep_their_order() {
    crate::init_tracing();
    let workflow: Workflow = bindery::bind(&source(), &options()).unwrap();
    let kinds: Vec<&str> = workflow.hooks.iter().map(|hook| hook.type_tag()).collect();
    assert_eq!(kinds, ["http", "shell"]);
    assert!(workflow.steps[2].action.is_none());
    let build = workflow.steps[0].action.as_deref().unwrap();
    assert_eq!(
        build.downcast_ref::<Shell>(),
        Some(&Shell {
            command: "make".to_string()
        })
    );
}

#[test]
fn polymorphic_round_trip() {
    let options = options();
    let workflow: Workflow = bindery::bind(&source(), &options).unwrap();
    let out = bindery::unbind(&workflow, &options).unwrap();
    assert_eq!(Value::from(out), source());
}

#[test]
fn closure_constructors_see_the_whole_map() {
    let mut registry = DynamicRegistry::new();
    registry.register_fn("echo", |map, _cx| {
        let command = map
            .get("say")
            .and_then(Value::as_str)
            .ok_or("missing `say`")?;
        Ok(Box::new(Shell {
            command: format!("echo {command}"),
        }) as Box<dyn Dynamic>)
    });
    let options = Options::new().with_dynamic(registry);
    let source = value!({ "hooks": [{ "type": "echo", "say": "hi" }] });
    let workflow: Workflow = bindery::bind(&source, &options).unwrap();
    assert_eq!(
        workflow.hooks[0].downcast_ref::<Shell>().map(|s| s.command.as_str()),
        Some("echo hi")
    );
}

#[test]
fn per_path_registration_shadows_global() {
    let options = Options::new().with_dynamic(
        DynamicRegistry::new()
            .with::<Shell>("run")
            .with_at::<Http>("Workflow.steps.action", "run"),
    );
    let source = value!({
        "steps": [{ "name": "a", "action": { "type": "run", "url": "u" } }],
        "hooks": [{ "type": "run", "command": "c" }],
    });
    let workflow: Workflow = bindery::bind(&source, &options).unwrap();
    assert!(workflow.steps[0].action.as_deref().unwrap().is::<Http>());
    assert!(workflow.hooks[0].is::<Shell>());
}
