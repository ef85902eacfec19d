use crate::globals::GlobalFragment;
use std::collections::HashMap;

/// Environment presets, keyed by environment name.
static ENVIRONMENT_DATA: &str = include_str!("../data/globals.json");

pub const BUILTIN_ENV: &str = "builtin";
pub const SHARED_ENV: &str = "shared-node-browser";
/// Selecting this environment discards every environment-derived name.
pub const NO_ENV: &str = "none";

lazy_static::lazy_static! {
    static ref ENVIRONMENTS: HashMap<String, GlobalFragment> =
        serde_json::from_str(ENVIRONMENT_DATA).expect("data/globals.json is a map of fragments");

    static ref BUILTINS: GlobalFragment = {
        let mut names = GlobalFragment::new();
        for env in [BUILTIN_ENV, SHARED_ENV] {
            if let Some(fragment) = ENVIRONMENTS.get(env) {
                names.extend(fragment.iter().map(|(k, v)| (k.clone(), *v)));
            }
        }
        names
    };
}

pub fn environment(name: &str) -> Option<&'static GlobalFragment> {
    ENVIRONMENTS.get(name)
}

pub fn is_known(name: &str) -> bool {
    ENVIRONMENTS.contains_key(name)
}

/// Language intrinsics plus the names common to node and browsers.
pub fn builtin_globals() -> &'static GlobalFragment {
    &BUILTINS
}

pub fn environment_names() -> impl Iterator<Item = &'static str> {
    ENVIRONMENTS.keys().map(String::as_str)
}
