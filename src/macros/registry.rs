//! Macro table: storage and lookup of captured definitions.
//!
//! Names are case-sensitive. The table only ever grows during a run, and an existing entry
//! is never replaced: [`MacroTable::insert_if_absent`] silently keeps the first definition of
//! a name.
//!
//! # Thread Safety
//! Not thread-safe. A table belongs to the single expansion run that filled it.

use std::collections::HashMap;

use serde::Serialize;

use crate::macros::types::MacroDefinition;

#[derive(Debug, Clone, Default, Serialize)]
pub struct MacroTable {
    macros: HashMap<String, MacroDefinition>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `definition` unless its name is already taken.
    ///
    /// Returns `true` if the definition was stored.
    pub fn insert_if_absent(&mut self, definition: MacroDefinition) -> bool {
        if self.macros.contains_key(&definition.name) {
            return false;
        }
        self.macros.insert(definition.name.clone(), definition);
        true
    }

    pub fn lookup(&self, name: &str) -> Option<&MacroDefinition> {
        self.macros.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.macros.keys()
    }

    /// Definitions in source order.
    pub fn definitions(&self) -> Vec<&MacroDefinition> {
        let mut defs: Vec<_> = self.macros.values().collect();
        defs.sort_by_key(|def| def.start_line);
        defs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::types::FormalParam;

    fn def(name: &str, start: usize) -> MacroDefinition {
        let mut def = MacroDefinition::open(name, start, vec![FormalParam::new("X", None)]);
        def.close(start + 1);
        def
    }

    #[test]
    fn first_definition_wins() {
        let mut table = MacroTable::new();
        assert!(table.is_empty());
        assert!(table.insert_if_absent(def("ADD1", 2)));
        assert!(!table.insert_if_absent(def("ADD1", 10)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("ADD1").map(|d| d.start_line), Some(2));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let mut table = MacroTable::new();
        table.insert_if_absent(def("Push", 1));
        assert!(table.contains("Push"));
        assert!(!table.contains("PUSH"));
        assert!(table.lookup("push").is_none());
    }

    #[test]
    fn definitions_are_listed_in_source_order() {
        let mut table = MacroTable::new();
        table.insert_if_absent(def("LATE", 20));
        table.insert_if_absent(def("EARLY", 3));
        let names: Vec<_> = table.definitions().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["EARLY", "LATE"]);
    }
}
