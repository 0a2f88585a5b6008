mod admin;
mod run;

pub use admin::{add_rule, apply, list_rules, remove_rule, restore, sync, test_domain, verify};
pub use run::run;
