//! Semantic declarations: the values the traversal enters into the symbol
//! table and hands to the declaration-event handler.

use thin_vec::ThinVec;

use crate::name_supply::Name;
use crate::semantic::types::{CompTyKind, Type};
use crate::source::NodeInfo;

/// Represents an interned identifier using symbol_table crate.
pub type NameId = symbol_table::GlobalSymbol;

/// Anything that has a location and (maybe) a unique name.
pub trait CNode {
    fn node_info(&self) -> NodeInfo;
}

impl CNode for NodeInfo {
    fn node_info(&self) -> NodeInfo {
        *self
    }
}

/// An identifier occurrence. Equality and hashing only look at the name.
#[derive(Debug, Clone, Copy)]
pub struct Ident {
    pub name: NameId,
    pub info: NodeInfo,
}

impl Ident {
    pub fn new(name: &str, info: NodeInfo) -> Self {
        Ident::from_name(NameId::new(name), info)
    }

    pub fn from_name(name: NameId, info: NodeInfo) -> Self {
        Ident { name, info }
    }

    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }
}

impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Ident {}

impl std::hash::Hash for Ident {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl CNode for Ident {
    fn node_info(&self) -> NodeInfo {
        self.info
    }
}

/// Identity of a struct, union or enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SueRef {
    Named(Ident),
    /// Anonymous tag, keyed by the unique name of its definition.
    Anonymous(Name),
}

impl std::fmt::Display for SueRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SueRef::Named(ident) => write!(f, "{}", ident),
            SueRef::Anonymous(name) => write!(f, "<anonymous {}>", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Linkage {
    None,
    Internal,
    External,
}

/// Storage class together with the linkage it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    /// No storage (enumerators, typedef-like entities)
    NoLinkage,
    Auto { register: bool },
    Static { linkage: Linkage, thread_local: bool },
    FunLinkage(Linkage),
}

impl Storage {
    /// `Static` storage; `linkage` must not be `Linkage::None`.
    pub fn static_storage(linkage: Linkage, thread_local: bool) -> Self {
        debug_assert!(linkage != Linkage::None, "ICE: static storage without linkage");
        Storage::Static { linkage, thread_local }
    }

    /// Function storage; `linkage` must not be `Linkage::None`.
    pub fn fun_linkage(linkage: Linkage) -> Self {
        debug_assert!(linkage != Linkage::None, "ICE: function without linkage");
        Storage::FunLinkage(linkage)
    }

    pub fn linkage(&self) -> Linkage {
        match self {
            Storage::NoLinkage | Storage::Auto { .. } => Linkage::None,
            Storage::Static { linkage, .. } | Storage::FunLinkage(linkage) => *linkage,
        }
    }

    pub fn has_linkage(&self) -> bool {
        self.linkage() != Linkage::None
    }
}

/// Declaration attributes shared by objects and functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclAttrs {
    pub is_inline: bool,
    pub is_noreturn: bool,
    pub storage: Storage,
}

impl DeclAttrs {
    pub fn new(storage: Storage) -> Self {
        DeclAttrs {
            is_inline: false,
            is_noreturn: false,
            storage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarName {
    Named(Ident),
    Abstract,
}

impl VarName {
    pub fn ident(&self) -> Option<Ident> {
        match self {
            VarName::Named(ident) => Some(*ident),
            VarName::Abstract => None,
        }
    }
}

/// Name, attributes and type of a declarator.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: VarName,
    pub attrs: DeclAttrs,
    pub ty: Type,
}

impl VarDecl {
    pub fn new(name: VarName, attrs: DeclAttrs, ty: Type) -> Self {
        VarDecl { name, attrs, ty }
    }
}

/// Declaration without definition (prototype, `extern` object).
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub var: VarDecl,
    pub info: NodeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Initializer {
    Constant(i64),
    StringLiteral(String),
    List(ThinVec<Initializer>),
}

/// Object definition, possibly tentative.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjDef {
    pub var: VarDecl,
    pub init: Option<Initializer>,
    pub info: NodeInfo,
}

impl ObjDef {
    /// A definition of an object with linkage and without initializer
    /// (C11 6.9.2p2).
    pub fn is_tentative(&self) -> bool {
        self.init.is_none() && self.var.attrs.storage.has_linkage()
    }
}

/// Function definition. The body is opaque to the traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct FunDef {
    pub var: VarDecl,
    pub params: ThinVec<ParamDecl>,
    pub body: NodeInfo,
    pub info: NodeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enumerator {
    pub ident: Ident,
    pub value: i64,
    pub enum_ref: SueRef,
    pub info: NodeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub ident: Ident,
    pub ty: Type,
    pub info: NodeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamDecl {
    Named(VarDecl, NodeInfo),
    /// Parameter without a name, e.g. in `int f(int);`
    Abstract(VarDecl, NodeInfo),
}

impl ParamDecl {
    pub fn var(&self) -> &VarDecl {
        match self {
            ParamDecl::Named(var, _) | ParamDecl::Abstract(var, _) => var,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberDecl {
    pub var: VarDecl,
    pub bit_width: Option<u32>,
    pub info: NodeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AsmBlock {
    pub text: String,
    pub info: NodeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompType {
    pub sue_ref: SueRef,
    pub kind: CompTyKind,
    pub members: ThinVec<MemberDecl>,
    pub info: NodeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub sue_ref: SueRef,
    pub enumerators: ThinVec<Enumerator>,
    pub info: NodeInfo,
}

/// Forward declaration of a tag: `struct S;`
#[derive(Debug, Clone, PartialEq)]
pub enum TagFwdDecl {
    Comp { sue_ref: SueRef, kind: CompTyKind, info: NodeInfo },
    Enum { sue_ref: SueRef, info: NodeInfo },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TagDef {
    Comp(CompType),
    Enum(EnumType),
}

/// Tag kinds, which have to agree between declarations of the same tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Comp(CompTyKind),
    Enum,
}

impl TagFwdDecl {
    pub fn sue_ref(&self) -> SueRef {
        match self {
            TagFwdDecl::Comp { sue_ref, .. } | TagFwdDecl::Enum { sue_ref, .. } => *sue_ref,
        }
    }

    pub fn tag_kind(&self) -> TagKind {
        match self {
            TagFwdDecl::Comp { kind, .. } => TagKind::Comp(*kind),
            TagFwdDecl::Enum { .. } => TagKind::Enum,
        }
    }
}

impl TagDef {
    pub fn sue_ref(&self) -> SueRef {
        match self {
            TagDef::Comp(comp) => comp.sue_ref,
            TagDef::Enum(enum_ty) => enum_ty.sue_ref,
        }
    }

    pub fn tag_kind(&self) -> TagKind {
        match self {
            TagDef::Comp(comp) => TagKind::Comp(comp.kind),
            TagDef::Enum(_) => TagKind::Enum,
        }
    }
}

/// Ordinary identifier entry other than a typedef. Exactly one kind of
/// declaration per identifier and scope.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentDecl {
    Declaration(Decl),
    ObjectDef(ObjDef),
    FunctionDef(FunDef),
    EnumeratorDef(Enumerator),
}

impl IdentDecl {
    pub fn ident(&self) -> Option<Ident> {
        match self {
            IdentDecl::Declaration(decl) => decl.var.name.ident(),
            IdentDecl::ObjectDef(def) => def.var.name.ident(),
            IdentDecl::FunctionDef(def) => def.var.name.ident(),
            IdentDecl::EnumeratorDef(enumerator) => Some(enumerator.ident),
        }
    }

    /// Name for diagnostics, `<abstract>` for unnamed declarators.
    pub fn display_name(&self) -> String {
        self.ident().map_or_else(|| "<abstract>".to_string(), |i| i.to_string())
    }

    pub fn storage(&self) -> Storage {
        match self {
            IdentDecl::Declaration(decl) => decl.var.attrs.storage,
            IdentDecl::ObjectDef(def) => def.var.attrs.storage,
            IdentDecl::FunctionDef(def) => def.var.attrs.storage,
            IdentDecl::EnumeratorDef(_) => Storage::NoLinkage,
        }
    }

    pub fn linkage(&self) -> Linkage {
        self.storage().linkage()
    }

    /// Declared type; enumerators have type `int`.
    pub fn ty(&self) -> Type {
        match self {
            IdentDecl::Declaration(decl) => decl.var.ty.clone(),
            IdentDecl::ObjectDef(def) => def.var.ty.clone(),
            IdentDecl::FunctionDef(def) => def.var.ty.clone(),
            IdentDecl::EnumeratorDef(_) => Type::int(),
        }
    }

    pub fn is_declaration(&self) -> bool {
        matches!(self, IdentDecl::Declaration(_))
    }

    pub fn is_tentative(&self) -> bool {
        matches!(self, IdentDecl::ObjectDef(def) if def.is_tentative())
    }

    pub fn kind_description(&self) -> &'static str {
        match self {
            IdentDecl::Declaration(_) => "declaration",
            IdentDecl::ObjectDef(_) => "object definition",
            IdentDecl::FunctionDef(_) => "function definition",
            IdentDecl::EnumeratorDef(_) => "enumerator definition",
        }
    }
}

/// Notification for one accepted declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclEvent {
    Tag(TagDef),
    TypeDef(TypeDef),
    /// File-scope declaration or definition
    Decl(IdentDecl),
    /// Block-scope declaration or definition
    Local(IdentDecl),
    Param(ParamDecl),
    Asm(AsmBlock),
}

macro_rules! impl_cnode_field {
    ($($ty:ty),* $(,)?) => {
        $(impl CNode for $ty {
            fn node_info(&self) -> NodeInfo {
                self.info
            }
        })*
    };
}

impl_cnode_field!(Decl, ObjDef, FunDef, Enumerator, TypeDef, MemberDecl, AsmBlock, CompType, EnumType);

impl CNode for ParamDecl {
    fn node_info(&self) -> NodeInfo {
        match self {
            ParamDecl::Named(_, info) | ParamDecl::Abstract(_, info) => *info,
        }
    }
}

impl CNode for TagFwdDecl {
    fn node_info(&self) -> NodeInfo {
        match self {
            TagFwdDecl::Comp { info, .. } | TagFwdDecl::Enum { info, .. } => *info,
        }
    }
}

impl CNode for TagDef {
    fn node_info(&self) -> NodeInfo {
        match self {
            TagDef::Comp(comp) => comp.info,
            TagDef::Enum(enum_ty) => enum_ty.info,
        }
    }
}

impl CNode for IdentDecl {
    fn node_info(&self) -> NodeInfo {
        match self {
            IdentDecl::Declaration(decl) => decl.info,
            IdentDecl::ObjectDef(def) => def.info,
            IdentDecl::FunctionDef(def) => def.info,
            IdentDecl::EnumeratorDef(enumerator) => enumerator.info,
        }
    }
}

impl CNode for DeclEvent {
    fn node_info(&self) -> NodeInfo {
        match self {
            DeclEvent::Tag(def) => def.node_info(),
            DeclEvent::TypeDef(def) => def.info,
            DeclEvent::Decl(decl) | DeclEvent::Local(decl) => decl.node_info(),
            DeclEvent::Param(param) => param.node_info(),
            DeclEvent::Asm(asm) => asm.info,
        }
    }
}
