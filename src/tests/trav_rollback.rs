use super::test_utils::*;
use crate::diagnostic::{CError, ErrorLevel, format_diagnostics};
use crate::semantic::trav::{TravState, run_trav, run_trav_simple};
use crate::semantic::types::CompTyKind;

#[test]
fn test_abort_undoes_every_insertion() {
    let (_, errors) = run_trav_simple(|trav| {
        trav.record_error(CError::other(ErrorLevel::Warning, &at(0), "before"));
        trav.handle_obj_def(false, global_obj("kept", Some(1), 2))?;
        let before = trav.symbols().global_defs();
        let errors_before = trav.errors().to_vec();

        trav.catch(
            |trav| {
                for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
                    trav.handle_obj_def(false, global_obj(name, None, 10 + i as u32))?;
                }
                trav.enter_block_scope();
                trav.record_error(CError::other(ErrorLevel::Warning, &at(20), "inside"));
                TravState::<()>::ast_error(&at(30), "abort")
            },
            |trav, err| {
                assert_eq!(err.to_string(), "error: abort");
                let after = trav.symbols().global_defs();
                assert_eq!(after.objs.keys().collect::<Vec<_>>(), before.objs.keys().collect::<Vec<_>>());
                assert!(lookup_decl(trav, "a").is_none());
                assert!(trav.is_file_scope());
                assert_eq!(trav.errors(), errors_before.as_slice());
                Ok(())
            },
        )
    })
    .unwrap();
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_failed_redefinition_rolls_back_its_insert() {
    run_pass(|trav| {
        trav.handle_tag_def(comp_def("S", CompTyKind::Struct, 0))?;
        trav.catch(
            |trav| {
                trav.handle_obj_def(false, global_obj("fresh", None, 5))?;
                trav.handle_tag_def(comp_def("S", CompTyKind::Struct, 10))
            },
            |trav, _| {
                assert!(lookup_decl(trav, "fresh").is_none());
                Ok(())
            },
        )
    });
}

#[test]
fn test_error_log_order() {
    let (_, errors) = run_trav_simple(|trav| {
        trav.record_error(CError::other(ErrorLevel::Warning, &at(0), "one"));
        for offset in [10, 20] {
            trav.catch(
                |trav| {
                    trav.record_error(CError::other(ErrorLevel::Warning, &at(offset), "discarded"));
                    TravState::<()>::ast_error(&at(offset + 1), "caught")
                },
                |trav, err| {
                    trav.warn(err);
                    Ok(())
                },
            )?;
        }
        trav.record_error(CError::other(ErrorLevel::Warning, &at(30), "last"));
        Ok(())
    })
    .unwrap();
    insta::assert_snapshot!(format_diagnostics(&errors), @r"
    warning: one at 2:0..1
    warning: caught at 2:11..12
    warning: caught at 2:21..22
    warning: last at 2:30..31
    ");
}

#[test]
fn test_soft_recorded_redefinitions_fail_run() {
    let errors = run_fail(|trav| {
        trav.handle_obj_def(false, global_obj("x", Some(1), 0))?;
        trav.try_trav(|trav| trav.handle_obj_def(false, global_obj("x", Some(2), 10)));
        trav.try_trav(|trav| trav.handle_obj_def(false, global_obj("x", Some(3), 20)));
        // traversal went on after both
        trav.handle_obj_def(false, global_obj("y", Some(4), 30))?;
        assert!(lookup_decl(trav, "y").is_some());
        Ok(())
    });
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_warnings_only_run_succeeds() {
    let result = run_trav_simple(|trav| {
        trav.handle_obj_def(false, global_obj("x", Some(1), 0))?;
        trav.catch(
            |trav| trav.handle_obj_def(false, global_obj("x", Some(2), 10)),
            |trav, err| {
                trav.warn(err);
                Ok(())
            },
        )
    });
    let (_, errors) = result.unwrap();
    assert_eq!(errors.len(), 1);
    assert!(!errors[0].is_hard());
}

#[test]
fn test_user_state_rolls_back() {
    let (_, state) = run_trav(vec!["start"], |trav| {
        trav.catch(
            |trav| {
                trav.user_state_mut().push("lost");
                TravState::<Vec<&str>>::ast_error(&at(0), "abort")
            },
            |_, _| Ok(()),
        )?;
        trav.modify_user_state(|log| log.push("end"));
        Ok(())
    })
    .unwrap();
    assert_eq!(state.user_state(), &vec!["start", "end"]);
}

#[test]
fn test_many_guarded_declarations() {
    const COUNT: usize = 20_000;
    let errors = run_fail(|trav| {
        for i in 0..COUNT {
            trav.try_trav(|trav| trav.handle_obj_def(false, global_obj(&format!("g{i}"), Some(1), i as u32)));
        }
        for i in (0..COUNT).step_by(1_000) {
            trav.try_trav(|trav| trav.handle_obj_def(false, global_obj(&format!("g{i}"), Some(2), 0)));
        }
        let globals = trav.symbols().global_defs().without_builtins();
        assert_eq!(globals.objs.len(), COUNT);
        assert_eq!(globals.objs.keys().next().map(|name| name.as_str()), Some("g0"));
        assert_eq!(globals.objs.keys().last().map(|name| name.as_str()), Some("g19999"));
        Ok(())
    });
    assert_eq!(errors.len(), COUNT / 1_000);
}
