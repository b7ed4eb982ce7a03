use super::Address;
use std::collections::HashMap;

/// ## Active counted loops
///
/// One record per open FOR, keyed by counter name so nested loops with
/// distinct counters compose naturally. Bounds are integers; the loop
/// ends when the counter equals `end` exactly, and the body offset is
/// where NEXT re-enters.

#[derive(Debug, Clone)]
pub struct ForLoop {
    pub id: String,
    pub body: Address,
    pub start: i64,
    pub end: i64,
    pub step: i64,
    pub finished: bool,
}

#[derive(Debug, Default)]
pub struct Loops {
    loops: HashMap<String, ForLoop>,
}

impl Loops {
    pub fn new() -> Loops {
        Loops::default()
    }

    pub fn add(&mut self, record: ForLoop) {
        self.loops.insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<&ForLoop> {
        self.loops.get(id)
    }

    pub fn remove(&mut self, id: &str) {
        self.loops.remove(id);
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }
}
