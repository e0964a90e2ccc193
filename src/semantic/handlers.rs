//! One entry point per declaration form.
//!
//! Each handler enters the declaration into the symbol table, checks the
//! resulting status against the redeclaration rules and, when that passes,
//! reports the declaration to the installed event handler. A failing check
//! aborts; callers that want to go on with the next declaration wrap the
//! call in [`TravState::try_trav`].

use log::debug;

use crate::diagnostic::CError;
use crate::semantic::decl::*;
use crate::semantic::redefinition::{check_redef, check_typedef_redef, check_var_redef, should_override};
use crate::semantic::trav::{TravResult, TravState};
use crate::source::NodeInfo;

fn declared_ident(var: &VarDecl, info: &NodeInfo, what: &str) -> TravResult<Ident> {
    match var.name.ident() {
        Some(ident) => Ok(ident),
        None => Err(CError::invalid_ast(info, format!("{what} without a name"))),
    }
}

impl<S: Clone> TravState<S> {
    /// `struct S;`, `union U;`, `enum E;`
    pub fn handle_tag_decl(&mut self, decl: TagFwdDecl) -> TravResult<()> {
        let sue_ref = decl.sue_ref();
        let status = self.with_def_table(|table| table.declare_tag(sue_ref, decl.clone()));
        check_redef(&sue_ref.to_string(), &decl, &status)
    }

    pub fn handle_tag_def(&mut self, def: TagDef) -> TravResult<()> {
        let sue_ref = def.sue_ref();
        let status = self.with_def_table(|table| table.define_tag(sue_ref, def.clone()));
        check_redef(&sue_ref.to_string(), &def, &status)?;
        self.handle_decl(DeclEvent::Tag(def))
    }

    pub fn handle_enumerator_def(&mut self, enumerator: Enumerator) -> TravResult<()> {
        let ident = enumerator.ident;
        let status = self.with_def_table(|table| table.define_scoped_ident(ident, IdentDecl::EnumeratorDef(enumerator)));
        check_redef(ident.as_str(), &ident, &status)
    }

    pub fn handle_type_def(&mut self, def: TypeDef) -> TravResult<()> {
        let status = self.with_def_table(|table| table.define_typedef(def.ident, def.clone()));
        check_typedef_redef(&def, &status)?;
        self.handle_decl(DeclEvent::TypeDef(def))
    }

    pub fn handle_asm_block(&mut self, asm: AsmBlock) -> TravResult<()> {
        self.handle_decl(DeclEvent::Asm(asm))
    }

    /// Named parameters become object definitions of the prototype or
    /// function scope; abstract ones are only reported.
    pub fn handle_param_decl(&mut self, param: ParamDecl) -> TravResult<()> {
        if let ParamDecl::Named(var, info) = &param {
            let ident = declared_ident(var, info, "named parameter")?;
            let def = IdentDecl::ObjectDef(ObjDef {
                var: var.clone(),
                init: None,
                info: *info,
            });
            let status = self.with_def_table(|table| table.define_scoped_ident(ident, def.clone()));
            check_var_redef(&def, &status)?;
        }
        self.handle_decl(DeclEvent::Param(param))
    }

    /// A declaration without definition, e.g. `extern int x;` or a function
    /// prototype. An existing entry is never replaced by it.
    pub fn handle_var_decl(&mut self, is_local: bool, decl: Decl) -> TravResult<()> {
        let ident = declared_ident(&decl.var, &decl.info, "declaration")?;
        let def = self.enter_decl(ident, IdentDecl::Declaration(decl), |_, _| false)?;
        self.handle_decl(Self::decl_event(is_local, def))
    }

    pub fn handle_obj_def(&mut self, is_local: bool, obj: ObjDef) -> TravResult<()> {
        let ident = declared_ident(&obj.var, &obj.info, "object definition")?;
        let def = self.enter_decl(ident, IdentDecl::ObjectDef(obj), should_override)?;
        self.handle_decl(Self::decl_event(is_local, def))
    }

    /// A function definition only replaces an earlier prototype.
    pub fn handle_fun_def(&mut self, fun: FunDef) -> TravResult<()> {
        let ident = declared_ident(&fun.var, &fun.info, "function definition")?;
        let def = self.enter_decl(ident, IdentDecl::FunctionDef(fun), |_, old| old.is_declaration())?;
        self.handle_decl(DeclEvent::Decl(def))
    }

    pub fn handle_label_def(&mut self, label: Ident) -> TravResult<()> {
        let status = self.with_def_table(|table| table.define_label(label));
        check_redef(label.as_str(), &label, &status)
    }

    pub fn handle_member_decl(&mut self, member: MemberDecl) -> TravResult<()> {
        let Some(ident) = member.var.name.ident() else {
            // unnamed bit-field
            return Ok(());
        };
        let status = self.with_def_table(|table| table.define_member(ident, member.clone()));
        check_redef(ident.as_str(), &member, &status)
    }

    fn enter_decl(
        &mut self,
        ident: Ident,
        def: IdentDecl,
        override_when: impl Fn(&IdentDecl, &IdentDecl) -> bool,
    ) -> TravResult<IdentDecl> {
        let status = self.with_def_table(|table| {
            table.define_scoped_ident_when(|old| override_when(&def, old), ident, def.clone())
        });
        debug!("enter_decl: '{}' as {}: {}", ident, def.kind_description(), status.description());
        check_var_redef(&def, &status)?;
        Ok(def)
    }

    fn decl_event(is_local: bool, def: IdentDecl) -> DeclEvent {
        if is_local { DeclEvent::Local(def) } else { DeclEvent::Decl(def) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::trav::{ext_decl_handler, run_trav, run_trav_simple};
    use crate::semantic::types::Type;
    use crate::source::{SourceId, SourceSpan};

    fn at(offset: u32) -> NodeInfo {
        NodeInfo::only_span(SourceSpan::with_length(SourceId::new(2), offset, 1))
    }

    #[test]
    fn test_abstract_param_skips_table() {
        let (events, state) = run_trav(Vec::new(), |trav| {
            let record = ext_decl_handler(|trav: &mut TravState<Vec<DeclEvent>>, event| {
                trav.user_state_mut().push(event.clone());
                Ok(())
            });
            trav.with_ext_decl_handler(record, |trav| {
                let var = VarDecl::new(VarName::Abstract, DeclAttrs::new(Storage::Auto { register: false }), Type::int());
                trav.enter_prototype_scope();
                trav.handle_param_decl(ParamDecl::Abstract(var, at(0)))?;
                trav.leave_prototype_scope();
                Ok(trav.user_state().len())
            })
        })
        .unwrap();
        assert_eq!(events, 1);
        assert!(matches!(state.user_state()[0], DeclEvent::Param(ParamDecl::Abstract(..))));
        assert!(state.errors().is_empty());
    }

    #[test]
    fn test_unnamed_object_definition() {
        let errors = run_trav_simple(|trav| {
            let obj = ObjDef {
                var: VarDecl::new(VarName::Abstract, DeclAttrs::new(Storage::Auto { register: false }), Type::int()),
                init: None,
                info: at(3),
            };
            trav.handle_obj_def(true, obj)
        })
        .unwrap_err();
        insta::assert_snapshot!(errors[0].to_string(), @"error: object definition without a name");
    }
}
