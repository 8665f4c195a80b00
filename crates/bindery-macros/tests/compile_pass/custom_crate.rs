mod renamed {
    pub use bindery::*;
}

#[derive(Debug, Default, bindery::Bindable)]
#[bind(crate = crate::renamed)]
struct Settings {
    name: String,
}

#[derive(Debug, Default, bindery::Bindable)]
#[bind(crate = crate::renamed)]
enum Mode {
    #[default]
    Fast,
}

fn main() {
    let _ = Settings::default();
    let _ = Mode::default();
}
