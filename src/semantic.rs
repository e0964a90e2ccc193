//! Declaration traversal.
//!
//! The traversal engine threads a symbol table, a diagnostic log and a user
//! payload through an externally driven walk of a translation unit:
//! - [`symbol_table`]: scoped name spaces and declaration statuses
//! - [`redefinition`]: the redeclaration rules for tags, typedefs and objects
//! - [`trav`]: abort/catch with rollback, diagnostics, run entry points
//! - [`handlers`]: one entry point per declaration form
//! - [`global_decls`]: the file scope as a whole-program view

pub mod builtins;
pub mod decl;
pub mod global_decls;
pub mod handlers;
pub mod redefinition;
pub mod symbol_table;
pub mod trav;
pub mod types;

// Re-export key types for public API
pub use decl::{CNode, DeclEvent, Ident, IdentDecl, NameId, SueRef};
pub use global_decls::{GlobalDecls, is_builtin_ident};
pub use symbol_table::{DeclarationStatus, DefTable, IdentEntry, ScopeKind, TagEntry};
pub use trav::{
    ExtDeclHandler, TravResult, TravState, ext_decl_handler, run_trav, run_trav_simple, run_trav_with_options,
    run_trav_with_state,
};
pub use types::{Type, TypeKind, TypeQualifiers, same_type};
