use super::Val;
use std::collections::HashMap;

/// ## Variable memory
///
/// A flat mapping from identifier to value. Names ending in `$` hold
/// strings by convention; the convention is enforced by INPUT, not by
/// the store itself.

#[derive(Debug, Default)]
pub struct Var {
    vars: HashMap<String, Val>,
}

impl Var {
    pub fn new() -> Var {
        Var::default()
    }

    pub fn is_string(var_name: &str) -> bool {
        var_name.ends_with('$')
    }

    pub fn get(&self, var_name: &str) -> Option<&Val> {
        self.vars.get(var_name)
    }

    pub fn set(&mut self, var_name: &str, value: Val) {
        self.vars.insert(var_name.to_string(), value);
    }

    pub fn sorted(&self) -> Vec<(String, Val)> {
        let mut all: Vec<(String, Val)> = self
            .vars
            .iter()
            .map(|(name, val)| (name.clone(), val.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}
