//! Redeclaration rules.
//!
//! Each check takes the status the symbol table reported when the new
//! declaration was entered and decides whether the program is still valid.
//! Checks never touch the table themselves; when one fails, the caller's
//! enclosing transaction undoes the insertion.

use log::debug;

use crate::diagnostic::{CError, ErrorLevel, RedefKind, TypeMismatch};
use crate::semantic::decl::*;
use crate::semantic::symbol_table::{DeclarationStatus, IdentEntry};
use crate::semantic::trav::TravResult;
use crate::semantic::types::{Type, same_type};
use crate::source::NodeInfo;

fn redef_error(name: &str, kind: RedefKind, new: &impl CNode, old: &impl CNode) -> CError {
    CError::redefinition(ErrorLevel::Error, name, kind, &new.node_info(), &old.node_info())
}

/// Rule for entities that may only be defined once per scope: tags,
/// enumerators, labels and members.
pub fn check_redef<T: CNode>(subject: &str, new: &impl CNode, status: &DeclarationStatus<T>) -> TravResult<()> {
    match status {
        DeclarationStatus::Redeclared(old) => Err(redef_error(subject, RedefKind::DuplicateDef, new, old)),
        DeclarationStatus::KindMismatch(old) => Err(redef_error(subject, RedefKind::DiffKindRedecl, new, old)),
        DeclarationStatus::NewDecl | DeclarationStatus::Shadowed(_) | DeclarationStatus::KeepDef(_) => Ok(()),
    }
}

/// A typedef may be repeated when it names the same type (C11 6.7p3).
pub fn check_typedef_redef(def: &TypeDef, status: &DeclarationStatus<IdentEntry>) -> TravResult<()> {
    if let DeclarationStatus::Redeclared(IdentEntry::TypeDef(old)) = status
        && same_type(&def.ty, &old.ty)
    {
        debug!("typedef '{}' repeated with the same type", def.ident);
        return Ok(());
    }
    check_redef(def.ident.as_str(), def, status)
}

/// Whether a new object or function definition replaces `old` when entered
/// in the same scope.
///
/// A plain declaration is always replaced, a definition with an initializer
/// replaces anything, and tentative definitions merge with the later one
/// winning.
pub fn should_override(new: &IdentDecl, old: &IdentDecl) -> bool {
    old.is_declaration() || !new.is_tentative() || old.is_tentative()
}

/// Whether `old` may be completed by a later definition.
pub fn can_be_overwritten(old: &IdentDecl) -> bool {
    old.is_declaration() || old.is_tentative()
}

/// Linkage of a redeclaration has to agree with the previous one.
///
/// A function first declared with internal linkage may be redeclared
/// without `static` later on.
pub fn agree_on_linkage(def: &IdentDecl, old: &IdentDecl) -> TravResult<()> {
    if old.storage() == Storage::FunLinkage(Linkage::Internal) {
        return Ok(());
    }
    if !def.storage().has_linkage() || !old.storage().has_linkage() {
        return Err(linkage_error(def, old, RedefKind::NoLinkageOld));
    }
    if def.linkage() != old.linkage() {
        return Err(linkage_error(def, old, RedefKind::DisagreeLinkage));
    }
    Ok(())
}

fn linkage_error(def: &IdentDecl, old: &IdentDecl, kind: RedefKind) -> CError {
    redef_error(&def.display_name(), kind, def, old)
}

/// Type compatibility of a redeclaration.
///
/// Every pair of types is accepted for now. Callers go through this function
/// so that a strict check can be dropped in without touching them.
pub fn check_compatible_types(
    _new: &Type,
    _new_info: &NodeInfo,
    _old: &Type,
    _old_info: &NodeInfo,
) -> Result<(), TypeMismatch> {
    Ok(())
}

fn check_types_of(def: &IdentDecl, old: &IdentDecl) -> TravResult<()> {
    check_compatible_types(&def.ty(), &def.node_info(), &old.ty(), &old.node_info())?;
    Ok(())
}

/// Rule for objects, functions and parameters.
pub fn check_var_redef(def: &IdentDecl, status: &DeclarationStatus<IdentEntry>) -> TravResult<()> {
    let name = def.display_name();
    match status {
        DeclarationStatus::KindMismatch(old) => Err(redef_error(&name, RedefKind::DiffKindRedecl, def, old)),
        DeclarationStatus::KeepDef(IdentEntry::Ident(old)) => {
            agree_on_linkage(def, old)?;
            if let (IdentDecl::FunctionDef(_), IdentDecl::FunctionDef(_)) = (def, old) {
                return Err(redef_error(&name, RedefKind::DuplicateDef, def, old));
            }
            check_types_of(def, old)
        }
        DeclarationStatus::Redeclared(IdentEntry::Ident(old)) => {
            agree_on_linkage(def, old)?;
            if can_be_overwritten(old) {
                check_types_of(def, old)
            } else {
                Err(redef_error(&name, RedefKind::DuplicateDef, def, old))
            }
        }
        // typedef entries always come back as KindMismatch
        DeclarationStatus::KeepDef(IdentEntry::TypeDef(_)) | DeclarationStatus::Redeclared(IdentEntry::TypeDef(_)) => {
            Ok(())
        }
        DeclarationStatus::NewDecl | DeclarationStatus::Shadowed(_) => Ok(()),
    }
}
