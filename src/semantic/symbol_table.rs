//! Symbol table management and scope handling.
//!
//! [`DefTable`] keeps one namespace map per C name space (ordinary
//! identifiers, tags, labels, struct members). Each map has a file-scope
//! layer that keeps declaration order and a stack of block layers. Every
//! define-style operation reports a [`DeclarationStatus`] describing what was
//! bound before, which the redefinition checks branch on.
//!
//! The table is a plain value built from persistent maps. Cloning it shares
//! structure with the original, so the traversal engine snapshots it by
//! cloning and restores the snapshot when an action aborts.

use im::{HashMap, Vector};
use std::hash::Hash;

use log::{debug, warn};

use crate::name_supply::Name;
use crate::semantic::decl::*;
use crate::semantic::types::Type;
use crate::source::NodeInfo;

/// Outcome of binding a name in the current scope.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationStatus<T> {
    /// Nothing of that name was visible.
    NewDecl,
    /// The current scope already bound the name to a compatible entity.
    Redeclared(T),
    /// The existing entry was kept; the new one was not entered.
    KeepDef(T),
    /// An outer scope binds the name.
    Shadowed(T),
    /// The current scope binds the name to a different kind of entity.
    KindMismatch(T),
}

impl<T> DeclarationStatus<T> {
    pub fn description(&self) -> &'static str {
        match self {
            DeclarationStatus::NewDecl => "new declaration",
            DeclarationStatus::Redeclared(_) => "redeclaration",
            DeclarationStatus::KeepDef(_) => "keep old definition",
            DeclarationStatus::Shadowed(_) => "shadowed declaration",
            DeclarationStatus::KindMismatch(_) => "redeclaration of different kind",
        }
    }
}

/// Entry in the ordinary identifier namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentEntry {
    TypeDef(TypeDef),
    Ident(IdentDecl),
}

impl IdentEntry {
    pub fn as_ident_decl(&self) -> Option<&IdentDecl> {
        match self {
            IdentEntry::Ident(decl) => Some(decl),
            IdentEntry::TypeDef(_) => None,
        }
    }

    pub fn as_typedef(&self) -> Option<&TypeDef> {
        match self {
            IdentEntry::TypeDef(def) => Some(def),
            IdentEntry::Ident(_) => None,
        }
    }

    /// Typedefs only match typedefs, enumerators only match enumerators, and
    /// the remaining object/function declarations match each other.
    fn same_kind(&self, other: &IdentEntry) -> bool {
        match (self, other) {
            (IdentEntry::TypeDef(_), IdentEntry::TypeDef(_)) => true,
            (IdentEntry::Ident(IdentDecl::EnumeratorDef(_)), IdentEntry::Ident(old)) => {
                matches!(old, IdentDecl::EnumeratorDef(_))
            }
            (IdentEntry::Ident(_), IdentEntry::Ident(IdentDecl::EnumeratorDef(_))) => false,
            (IdentEntry::Ident(_), IdentEntry::Ident(_)) => true,
            _ => false,
        }
    }
}

impl CNode for IdentEntry {
    fn node_info(&self) -> NodeInfo {
        match self {
            IdentEntry::TypeDef(def) => def.info,
            IdentEntry::Ident(decl) => decl.node_info(),
        }
    }
}

/// Entry in the tag namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum TagEntry {
    Fwd(TagFwdDecl),
    Def(TagDef),
}

impl TagEntry {
    pub fn tag_kind(&self) -> TagKind {
        match self {
            TagEntry::Fwd(decl) => decl.tag_kind(),
            TagEntry::Def(def) => def.tag_kind(),
        }
    }
}

impl CNode for TagEntry {
    fn node_info(&self) -> NodeInfo {
        match self {
            TagEntry::Fwd(decl) => decl.node_info(),
            TagEntry::Def(def) => def.node_info(),
        }
    }
}

/// Kinds of scopes, in the order they nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    File,
    /// Parameter list of a function declarator.
    Prototype,
    /// Label scope spanning a whole function body.
    Function,
    Block,
}

/// A name space with one file-scope layer and nested block layers.
///
/// `order` lists file-scope keys in the order they were first bound.
#[derive(Debug, Clone)]
pub struct NameSpaceMap<K: Hash + Eq + Clone, V: Clone> {
    global: HashMap<K, V>,
    order: Vector<K>,
    locals: Vector<HashMap<K, V>>,
}

impl<K: Hash + Eq + Clone, V: Clone> Default for NameSpaceMap<K, V> {
    fn default() -> Self {
        NameSpaceMap {
            global: HashMap::new(),
            order: Vector::new(),
            locals: Vector::new(),
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone> NameSpaceMap<K, V> {
    pub fn is_global_scope(&self) -> bool {
        self.locals.is_empty()
    }

    pub fn define_global(&mut self, key: K, value: V) -> Option<V> {
        let old = self.global.insert(key.clone(), value);
        if old.is_none() {
            self.order.push_back(key);
        }
        old
    }

    /// Bind in the innermost scope, returning what it bound before.
    pub fn define_local(&mut self, key: K, value: V) -> Option<V> {
        match self.locals.back_mut() {
            Some(scope) => scope.insert(key, value),
            None => self.define_global(key, value),
        }
    }

    pub fn lookup_innermost(&self, key: &K) -> Option<&V> {
        match self.locals.back() {
            Some(scope) => scope.get(key),
            None => self.global.get(key),
        }
    }

    pub fn lookup_global(&self, key: &K) -> Option<&V> {
        self.global.get(key)
    }

    pub fn lookup(&self, key: &K) -> Option<&V> {
        self.locals
            .iter()
            .rev()
            .find_map(|scope| scope.get(key))
            .or_else(|| self.global.get(key))
    }

    pub fn enter_scope(&mut self) {
        self.locals.push_back(HashMap::new());
    }

    /// Drop the innermost block layer; `None` at file scope.
    pub fn leave_scope(&mut self) -> Option<HashMap<K, V>> {
        self.locals.pop_back()
    }

    /// File-scope bindings in declaration order.
    pub fn globals(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order
            .iter()
            .filter_map(move |key| self.global.get(key).map(|value| (key, value)))
    }
}

/// The symbol table proper.
#[derive(Debug, Clone)]
pub struct DefTable {
    ident_decls: NameSpaceMap<NameId, IdentEntry>,
    tag_decls: NameSpaceMap<SueRef, TagEntry>,
    label_defs: NameSpaceMap<NameId, Ident>,
    member_decls: NameSpaceMap<NameId, MemberDecl>,
    /// use -> definition
    ref_table: HashMap<Name, Name>,
    type_table: HashMap<Name, Type>,
    scopes: Vec<ScopeKind>,
}

impl Default for DefTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DefTable {
    pub fn new() -> Self {
        DefTable {
            ident_decls: NameSpaceMap::default(),
            tag_decls: NameSpaceMap::default(),
            label_defs: NameSpaceMap::default(),
            member_decls: NameSpaceMap::default(),
            ref_table: HashMap::new(),
            type_table: HashMap::new(),
            scopes: vec![ScopeKind::File],
        }
    }

    pub fn in_file_scope(&self) -> bool {
        self.ident_decls.is_global_scope()
    }

    pub fn current_scope_kind(&self) -> ScopeKind {
        self.scopes.last().copied().unwrap_or(ScopeKind::File)
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len() - 1
    }

    fn enter_local_scope(&mut self, kind: ScopeKind) {
        self.ident_decls.enter_scope();
        self.tag_decls.enter_scope();
        // labels have function scope
        if kind == ScopeKind::Function {
            self.label_defs.enter_scope();
        }
        self.scopes.push(kind);
        debug!("DefTable: entered {:?} scope, depth {}", kind, self.scope_depth());
    }

    fn leave_local_scope(&mut self, kind: ScopeKind) -> bool {
        if self.scopes.len() == 1 {
            debug!("DefTable: attempted to leave the file scope. No change.");
            return false;
        }
        let innermost = self.current_scope_kind();
        if innermost != kind {
            warn!("DefTable: leaving {:?} scope while innermost scope is {:?}", kind, innermost);
        }
        self.ident_decls.leave_scope();
        self.tag_decls.leave_scope();
        if innermost == ScopeKind::Function {
            self.label_defs.leave_scope();
        }
        self.scopes.pop();
        debug!("DefTable: left {:?} scope, depth {}", kind, self.scope_depth());
        true
    }

    pub fn enter_function_scope(&mut self) {
        self.enter_local_scope(ScopeKind::Function);
    }

    pub fn leave_function_scope(&mut self) -> bool {
        self.leave_local_scope(ScopeKind::Function)
    }

    pub fn enter_block_scope(&mut self) {
        self.enter_local_scope(ScopeKind::Block);
    }

    pub fn leave_block_scope(&mut self) -> bool {
        self.leave_local_scope(ScopeKind::Block)
    }

    /// Parameter lists behave exactly like blocks.
    pub fn enter_prototype_scope(&mut self) {
        self.enter_local_scope(ScopeKind::Prototype);
    }

    pub fn leave_prototype_scope(&mut self) -> bool {
        self.leave_local_scope(ScopeKind::Prototype)
    }

    pub fn enter_member_decl(&mut self) {
        self.member_decls.enter_scope();
    }

    /// Leave a struct/union body, returning its members.
    pub fn leave_member_decl(&mut self) -> Vec<MemberDecl> {
        self.member_decls
            .leave_scope()
            .map(|members| members.into_iter().map(|(_, member)| member).collect())
            .unwrap_or_default()
    }

    fn shadow_status<K: Hash + Eq + Clone, V: Clone>(map: &NameSpaceMap<K, V>, key: &K) -> DeclarationStatus<V> {
        match map.lookup(key) {
            Some(shadowed) => DeclarationStatus::Shadowed(shadowed.clone()),
            None => DeclarationStatus::NewDecl,
        }
    }

    /// Bind a typedef name in the current scope, overwriting what was there.
    pub fn define_typedef(&mut self, ident: Ident, typedef: TypeDef) -> DeclarationStatus<IdentEntry> {
        let new_entry = IdentEntry::TypeDef(typedef);
        let old = self.ident_decls.define_local(ident.name, new_entry.clone());
        let status = match old {
            Some(old) if new_entry.same_kind(&old) => DeclarationStatus::Redeclared(old),
            Some(old) => DeclarationStatus::KindMismatch(old),
            None => DeclarationStatus::NewDecl,
        };
        debug!("DefTable: define typedef '{}': {}", ident, status.description());
        status
    }

    /// Bind an identifier at file scope.
    pub fn define_global_ident(&mut self, ident: Ident, decl: IdentDecl) -> DeclarationStatus<IdentEntry> {
        let new_entry = IdentEntry::Ident(decl);
        let status = match self.ident_decls.define_global(ident.name, new_entry.clone()) {
            Some(old) if new_entry.same_kind(&old) => DeclarationStatus::Redeclared(old),
            Some(old) => DeclarationStatus::KindMismatch(old),
            None => DeclarationStatus::NewDecl,
        };
        debug!("DefTable: define global '{}': {}", ident, status.description());
        status
    }

    pub fn define_scoped_ident(&mut self, ident: Ident, decl: IdentDecl) -> DeclarationStatus<IdentEntry> {
        self.define_scoped_ident_when(|_| true, ident, decl)
    }

    /// Bind an identifier in the current scope.
    ///
    /// An existing entry of the same kind in the innermost scope is only
    /// replaced when `should_override` accepts it; otherwise it is kept and
    /// the status is `KeepDef`.
    pub fn define_scoped_ident_when(
        &mut self,
        should_override: impl Fn(&IdentDecl) -> bool,
        ident: Ident,
        decl: IdentDecl,
    ) -> DeclarationStatus<IdentEntry> {
        let new_entry = IdentEntry::Ident(decl);
        let status = match self.ident_decls.lookup_innermost(&ident.name) {
            Some(old) if !new_entry.same_kind(old) => DeclarationStatus::KindMismatch(old.clone()),
            Some(old @ IdentEntry::Ident(old_decl)) if should_override(old_decl) => {
                DeclarationStatus::Redeclared(old.clone())
            }
            Some(old) => DeclarationStatus::KeepDef(old.clone()),
            None => Self::shadow_status(&self.ident_decls, &ident.name),
        };
        if !matches!(status, DeclarationStatus::KeepDef(_)) {
            self.ident_decls.define_local(ident.name, new_entry);
        }
        debug!("DefTable: define '{}': {}", ident, status.description());
        status
    }

    /// Declare a tag without defining it (`struct S;`). A tag visible in any
    /// scope is kept as is.
    pub fn declare_tag(&mut self, sue_ref: SueRef, decl: TagFwdDecl) -> DeclarationStatus<TagEntry> {
        let status = match self.tag_decls.lookup(&sue_ref) {
            Some(old) if old.tag_kind() == decl.tag_kind() => DeclarationStatus::KeepDef(old.clone()),
            Some(old) => DeclarationStatus::KindMismatch(old.clone()),
            None => {
                self.tag_decls.define_local(sue_ref, TagEntry::Fwd(decl));
                DeclarationStatus::NewDecl
            }
        };
        debug!("DefTable: declare tag '{}': {}", sue_ref, status.description());
        status
    }

    /// Define a tag in the current scope, completing a forward declaration
    /// of the same kind.
    pub fn define_tag(&mut self, sue_ref: SueRef, def: TagDef) -> DeclarationStatus<TagEntry> {
        let kind = def.tag_kind();
        let status = match self.tag_decls.lookup_innermost(&sue_ref) {
            Some(TagEntry::Fwd(fwd)) if fwd.tag_kind() == kind => DeclarationStatus::NewDecl,
            Some(old) if old.tag_kind() == kind => DeclarationStatus::Redeclared(old.clone()),
            Some(old) => DeclarationStatus::KindMismatch(old.clone()),
            None => Self::shadow_status(&self.tag_decls, &sue_ref),
        };
        self.tag_decls.define_local(sue_ref, TagEntry::Def(def));
        debug!("DefTable: define tag '{}': {}", sue_ref, status.description());
        status
    }

    pub fn define_label(&mut self, ident: Ident) -> DeclarationStatus<Ident> {
        let status = match self.label_defs.define_local(ident.name, ident) {
            Some(old) => DeclarationStatus::Redeclared(old),
            None => DeclarationStatus::NewDecl,
        };
        debug!("DefTable: define label '{}': {}", ident, status.description());
        status
    }

    pub fn define_member(&mut self, ident: Ident, member: MemberDecl) -> DeclarationStatus<MemberDecl> {
        match self.member_decls.define_local(ident.name, member) {
            Some(old) => DeclarationStatus::Redeclared(old),
            None => DeclarationStatus::NewDecl,
        }
    }

    pub fn lookup_ident(&self, name: NameId) -> Option<&IdentEntry> {
        self.ident_decls.lookup(&name)
    }

    pub fn lookup_tag(&self, sue_ref: SueRef) -> Option<&TagEntry> {
        self.tag_decls.lookup(&sue_ref)
    }

    pub fn lookup_label(&self, name: NameId) -> Option<&Ident> {
        self.label_defs.lookup(&name)
    }

    pub fn lookup_member(&self, name: NameId) -> Option<&MemberDecl> {
        self.member_decls.lookup_innermost(&name)
    }

    pub fn insert_ref(&mut self, use_name: Name, def_name: Name) {
        self.ref_table.insert(use_name, def_name);
    }

    /// Definition a use was resolved to.
    pub fn resolved_ref(&self, use_name: Name) -> Option<Name> {
        self.ref_table.get(&use_name).copied()
    }

    pub fn ref_count(&self) -> usize {
        self.ref_table.len()
    }

    pub fn insert_type(&mut self, name: Name, ty: Type) {
        self.type_table.insert(name, ty);
    }

    pub fn lookup_type(&self, name: Name) -> Option<&Type> {
        self.type_table.get(&name)
    }

    pub(crate) fn global_idents(&self) -> impl Iterator<Item = (&NameId, &IdentEntry)> {
        self.ident_decls.globals()
    }

    pub(crate) fn global_tags(&self) -> impl Iterator<Item = (&SueRef, &TagEntry)> {
        self.tag_decls.globals()
    }
}
