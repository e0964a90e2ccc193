use super::test_utils::*;
use crate::diagnostic::RedefKind;
use crate::semantic::types::{Type, TypeKind};

#[test]
fn test_typedef_repeated_with_same_type() {
    run_pass(|trav| {
        trav.handle_type_def(typedef("size", Type::int().pointer_to(), 0))?;
        trav.handle_type_def(typedef("size", Type::int().pointer_to(), 10))
    });
}

#[test]
fn test_typedef_repeated_through_alias() {
    run_pass(|trav| {
        trav.handle_type_def(typedef("A", Type::int(), 0))?;
        let a = trav.lookup_type_def(ident("A", 5))?;
        let alias = Type::new(TypeKind::TypeDefRef(ident("A", 5), Some(Box::new(a))));
        trav.handle_type_def(typedef("B", alias, 5))?;
        trav.handle_type_def(typedef("B", Type::int(), 10))
    });
}

#[test]
fn test_typedef_changes_type() {
    let errors = run_fail(|trav| {
        trav.handle_type_def(typedef("T", Type::int(), 0))?;
        trav.handle_type_def(typedef("T", Type::char(), 10))
    });
    assert_eq!(redef_kinds(&errors), vec![Some(RedefKind::DuplicateDef)]);
}

#[test]
fn test_typedef_over_object() {
    let errors = run_fail(|trav| {
        trav.handle_obj_def(false, global_obj("T", None, 0))?;
        trav.handle_type_def(typedef("T", Type::int(), 10))
    });
    assert_eq!(redef_kinds(&errors), vec![Some(RedefKind::DiffKindRedecl)]);
}

#[test]
fn test_object_over_typedef() {
    let errors = run_fail(|trav| {
        trav.handle_type_def(typedef("T", Type::int(), 0))?;
        trav.handle_obj_def(false, global_obj("T", None, 10))
    });
    insta::assert_snapshot!(errors[0].to_string(), @"error: redefinition of 'T': redeclared as a different kind of symbol");
}

#[test]
fn test_block_object_shadows_typedef() {
    run_pass(|trav| {
        trav.handle_type_def(typedef("T", Type::int(), 0))?;
        trav.enter_function_scope();
        trav.handle_param_decl(named_param("T", 10))?;
        assert!(trav.lookup_object(ident("T", 20))?.is_some());
        trav.leave_function_scope();
        assert_eq!(trav.lookup_type_def(ident("T", 30))?, Type::int());
        Ok(())
    });
}
