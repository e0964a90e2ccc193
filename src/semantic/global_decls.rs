//! Whole-program view of the file scope.

use indexmap::IndexMap;

use crate::semantic::decl::*;
use crate::semantic::symbol_table::{DefTable, IdentEntry, TagEntry};

/// Names synthesized by the compiler rather than written by the user.
pub fn is_builtin_ident(name: &str) -> bool {
    name.starts_with("__builtin") || matches!(name, "__func__" | "__FUNCTION__" | "__PRETTY_FUNCTION__")
}

/// File-scope declarations, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct GlobalDecls {
    pub objs: IndexMap<NameId, IdentDecl>,
    pub tags: IndexMap<SueRef, TagDef>,
    pub typedefs: IndexMap<NameId, TypeDef>,
}

impl GlobalDecls {
    /// Keep only the entries whose name satisfies `keep`. Anonymous tags are
    /// always kept.
    pub fn filter(self, keep: impl Fn(&str) -> bool) -> Self {
        GlobalDecls {
            objs: self.objs.into_iter().filter(|(name, _)| keep(name.as_str())).collect(),
            tags: self
                .tags
                .into_iter()
                .filter(|(sue_ref, _)| match sue_ref {
                    SueRef::Named(ident) => keep(ident.as_str()),
                    SueRef::Anonymous(_) => true,
                })
                .collect(),
            typedefs: self.typedefs.into_iter().filter(|(name, _)| keep(name.as_str())).collect(),
        }
    }

    pub fn without_builtins(self) -> Self {
        self.filter(|name| !is_builtin_ident(name))
    }

    pub fn is_empty(&self) -> bool {
        self.objs.is_empty() && self.tags.is_empty() && self.typedefs.is_empty()
    }
}

impl DefTable {
    /// Collect the file scope. Tags that were only forward declared are left
    /// out.
    pub fn global_defs(&self) -> GlobalDecls {
        let mut decls = GlobalDecls::default();
        for (name, entry) in self.global_idents() {
            match entry {
                IdentEntry::TypeDef(def) => {
                    decls.typedefs.insert(*name, def.clone());
                }
                IdentEntry::Ident(decl) => {
                    decls.objs.insert(*name, decl.clone());
                }
            }
        }
        for (sue_ref, entry) in self.global_tags() {
            if let TagEntry::Def(def) = entry {
                decls.tags.insert(*sue_ref, def.clone());
            }
        }
        decls
    }
}
