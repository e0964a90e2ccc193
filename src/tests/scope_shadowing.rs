use super::test_utils::*;
use crate::diagnostic::RedefKind;
use crate::semantic::decl::{CNode, IdentDecl};
use crate::semantic::symbol_table::{DeclarationStatus, ScopeKind};

#[test]
fn test_block_shadows_then_reverts() {
    run_pass(|trav| {
        trav.handle_obj_def(false, global_obj("x", Some(1), 0))?;
        trav.enter_block_scope();
        let status = trav.with_def_table(|table| {
            table.define_scoped_ident(ident("x", 10), IdentDecl::ObjectDef(local_obj("x", Some(2), 10)))
        });
        assert!(matches!(status, DeclarationStatus::Shadowed(_)));
        assert_eq!(lookup_decl(trav, "x").map(|d| d.node_info().span.offset()), Some(10));
        trav.leave_block_scope();
        assert_eq!(lookup_decl(trav, "x").map(|d| d.node_info().span.offset()), Some(0));
        Ok(())
    });
}

#[test]
fn test_nested_blocks() {
    run_pass(|trav| {
        trav.enter_function_scope();
        trav.handle_obj_def(true, local_obj("x", None, 0))?;
        for depth in 1..=3u32 {
            trav.enter_block_scope();
            trav.handle_obj_def(true, local_obj("x", None, depth * 10))?;
        }
        assert_eq!(trav.symbols().scope_depth(), 4);
        assert_eq!(trav.symbols().current_scope_kind(), ScopeKind::Block);
        for depth in (0..3u32).rev() {
            trav.leave_block_scope();
            assert_eq!(lookup_decl(trav, "x").map(|d| d.node_info().span.offset()), Some(depth * 10));
        }
        trav.leave_function_scope();
        assert!(trav.is_file_scope());
        assert!(lookup_decl(trav, "x").is_none());
        Ok(())
    });
}

#[test]
fn test_labels_are_function_scoped() {
    let errors = run_fail(|trav| {
        trav.enter_function_scope();
        trav.enter_block_scope();
        trav.handle_label_def(ident("out", 0))?;
        trav.leave_block_scope();
        assert!(trav.symbols().lookup_label(ident("out", 0).name).is_some());
        trav.leave_function_scope();
        assert!(trav.symbols().lookup_label(ident("out", 0).name).is_none());

        trav.enter_function_scope();
        trav.handle_label_def(ident("out", 20))?;
        trav.handle_label_def(ident("out", 30))
    });
    assert_eq!(redef_kinds(&errors), vec![Some(RedefKind::DuplicateDef)]);
}

#[test]
fn test_members_are_per_body() {
    let members = run_pass(|trav| {
        trav.enter_member_decl();
        trav.handle_member_decl(member("next", 0))?;
        trav.handle_member_decl(member("value", 4))?;
        let mut names: Vec<_> = trav
            .leave_member_decl()
            .iter()
            .filter_map(|m| m.var.name.ident())
            .map(|i| i.to_string())
            .collect();
        names.sort();

        // same member names in another struct
        trav.enter_member_decl();
        trav.handle_member_decl(member("next", 20))?;
        trav.leave_member_decl();
        Ok(names)
    });
    assert_eq!(members, ["next", "value"]);

    let errors = run_fail(|trav| {
        trav.enter_member_decl();
        trav.handle_member_decl(member("next", 0))?;
        trav.handle_member_decl(member("next", 8))
    });
    assert_eq!(redef_kinds(&errors), vec![Some(RedefKind::DuplicateDef)]);
}
