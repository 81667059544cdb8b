//! Identifier → declared type name table used to resolve marshal call targets.
//!
//! In `Scoping::Flat` mode there is a single frame: a binding made inside a nested
//! block stays visible to everything traversed after it, and a redeclaration of the
//! same name overwrites rather than shadows. `Scoping::Lexical` keeps a frame per
//! block and function body.
use indexmap::IndexMap;

use crate::config::Scoping;

#[derive(Debug)]
pub struct BindingTable {
    scoping: Scoping,
    frames: Vec<IndexMap<String, Option<String>>>,
}

impl BindingTable {
    pub fn new(scoping: Scoping) -> Self {
        BindingTable { scoping, frames: vec![IndexMap::new()] }
    }

    pub fn push_frame(&mut self) {
        if self.scoping == Scoping::Lexical {
            self.frames.push(IndexMap::new());
        }
    }

    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Record a declaration. With an annotation the name is (re)bound to it; without
    /// one the most recent visible binding carries over. Returns the effective type.
    pub fn declare(&mut self, ident: &str, annotated: Option<String>) -> Option<String> {
        let type_name = annotated.or_else(|| self.lookup(ident).map(str::to_string));
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(ident.to_string(), type_name.clone());
        }
        type_name
    }

    pub fn lookup(&self, ident: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(ident))
            .and_then(|t| t.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_overwrites_and_bare_redeclaration_inherits() {
        let mut table = BindingTable::new(Scoping::Flat);
        assert_eq!(table.declare("c", Some("Captain".into())).as_deref(), Some("Captain"));
        assert_eq!(table.declare("c", None).as_deref(), Some("Captain"));
        assert_eq!(table.declare("c", Some("CrewMember".into())).as_deref(), Some("CrewMember"));
        assert_eq!(table.lookup("c"), Some("CrewMember"));
        assert_eq!(table.declare("raw", None), None);
        assert_eq!(table.lookup("missing"), None);
    }

    #[test]
    fn flat_table_leaks_inner_bindings() {
        let mut table = BindingTable::new(Scoping::Flat);
        table.declare("x", Some("Outer".into()));
        table.push_frame();
        table.declare("x", Some("Inner".into()));
        table.pop_frame();
        assert_eq!(table.depth(), 1);
        assert_eq!(table.lookup("x"), Some("Inner"));
    }

    #[test]
    fn lexical_table_restores_outer_binding() {
        let mut table = BindingTable::new(Scoping::Lexical);
        table.declare("x", Some("Outer".into()));
        table.push_frame();
        assert_eq!(table.declare("x", None).as_deref(), Some("Outer"));
        table.declare("x", Some("Inner".into()));
        table.declare("y", Some("OnlyInner".into()));
        assert_eq!(table.depth(), 2);
        table.pop_frame();
        assert_eq!(table.lookup("x"), Some("Outer"));
        assert_eq!(table.lookup("y"), None);
    }

    #[test]
    fn root_frame_is_never_popped() {
        let mut table = BindingTable::new(Scoping::Lexical);
        table.pop_frame();
        table.pop_frame();
        table.declare("x", Some("T".into()));
        assert_eq!(table.lookup("x"), Some("T"));
    }
}
