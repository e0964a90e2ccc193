//! The traversal engine.
//!
//! A traversal is a function over `&mut TravState<S>` returning
//! [`TravResult`]. `Err` aborts the current action; [`TravState::catch`]
//! restores the state that was current when the protected action started
//! before the handler sees the error, so a declaration handler may enter
//! symbols and then fail without undoing anything by hand.
//!
//! Diagnostics go either through that abort channel or into the ordered log
//! ([`TravState::record_error`]). Whether a run failed is decided at the end
//! by looking for hard diagnostics in the log.

use std::rc::Rc;

use log::trace;

use crate::diagnostic::{CError, ErrorLevel, had_hard_errors};
use crate::lang_options::TravOptions;
use crate::name_supply::{Name, NameSupply};
use crate::semantic::builtins::builtins;
use crate::semantic::decl::*;
use crate::semantic::symbol_table::{DefTable, IdentEntry};
use crate::semantic::types::Type;
use crate::source::NodeInfo;

pub type TravResult<T> = Result<T, CError>;

/// Receives every accepted declaration.
pub type ExtDeclHandler<S> = Rc<dyn Fn(&mut TravState<S>, &DeclEvent) -> TravResult<()>>;

/// Wrap a closure as a declaration-event handler.
pub fn ext_decl_handler<S>(f: impl Fn(&mut TravState<S>, &DeclEvent) -> TravResult<()> + 'static) -> ExtDeclHandler<S> {
    Rc::new(f)
}

/// Everything a catch point has to put back.
struct Snapshot<S> {
    symbols: DefTable,
    error_count: usize,
    handler: Option<ExtDeclHandler<S>>,
    user: S,
}

pub struct TravState<S> {
    symbols: DefTable,
    errors: Vec<CError>,
    name_supply: NameSupply,
    /// `None` until a handler is installed; events are dropped.
    handler: Option<ExtDeclHandler<S>>,
    user: S,
    options: TravOptions,
}

impl<S: Clone> TravState<S> {
    /// A fresh state whose file scope holds the built-ins.
    pub fn new(user: S, options: TravOptions) -> Self {
        Self::with_table(builtins(), user, options)
    }

    pub fn with_table(table: DefTable, user: S, options: TravOptions) -> Self {
        TravState {
            symbols: table,
            errors: Vec::new(),
            name_supply: NameSupply::new(),
            handler: None,
            user,
            options,
        }
    }

    /// Continue naming after `last`, e.g. the last name the parser handed out.
    pub fn with_name_supply(mut self, name_supply: NameSupply) -> Self {
        self.name_supply = name_supply;
        self
    }

    fn save_state(&self) -> Snapshot<S> {
        Snapshot {
            symbols: self.symbols.clone(),
            error_count: self.errors.len(),
            handler: self.handler.clone(),
            user: self.user.clone(),
        }
    }

    // The name supply is not restored; names handed out inside an aborted
    // action stay used.
    fn restore_state(&mut self, snapshot: Snapshot<S>) {
        self.symbols = snapshot.symbols;
        self.errors.truncate(snapshot.error_count);
        self.handler = snapshot.handler;
        self.user = snapshot.user;
    }

    /// Run `action`; if it aborts, roll back everything it did and run
    /// `handler` with the error.
    ///
    /// Names drawn with [`gen_name`](Self::gen_name) inside `action` are not
    /// given back.
    pub fn catch<T>(
        &mut self,
        action: impl FnOnce(&mut Self) -> TravResult<T>,
        handler: impl FnOnce(&mut Self, CError) -> TravResult<T>,
    ) -> TravResult<T> {
        let snapshot = self.save_state();
        match action(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                trace!("catch: rolling back after '{}'", err);
                self.restore_state(snapshot);
                handler(self, err)
            }
        }
    }

    /// Run `action`, turning an abort into a logged diagnostic.
    ///
    /// Returns `None` when the action aborted; its effects are rolled back.
    pub fn try_trav<T>(&mut self, action: impl FnOnce(&mut Self) -> TravResult<T>) -> Option<T> {
        let snapshot = self.save_state();
        match action(self) {
            Ok(value) => Some(value),
            Err(err) => {
                trace!("try_trav: recording '{}'", err);
                self.restore_state(snapshot);
                self.record_error(err);
                None
            }
        }
    }

    /// Append to the diagnostic log without aborting.
    pub fn record_error(&mut self, err: impl Into<CError>) {
        self.errors.push(err.into());
    }

    /// Record `err` as a warning, unless warnings are errors.
    pub fn warn(&mut self, err: impl Into<CError>) {
        let err = err.into();
        if self.options.warnings_as_errors {
            self.record_error(err);
        } else {
            self.record_error(err.with_level(ErrorLevel::Warning));
        }
    }

    /// Diagnostics in recording order.
    pub fn errors(&self) -> &[CError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<CError> {
        self.errors
    }

    pub fn throw_on_left<T, E: Into<CError>>(result: Result<T, E>) -> TravResult<T> {
        result.map_err(Into::into)
    }

    pub fn ast_error<T>(info: &NodeInfo, message: impl Into<String>) -> TravResult<T> {
        Err(CError::invalid_ast(info, message))
    }

    pub fn symbols(&self) -> &DefTable {
        &self.symbols
    }

    /// Mutate the symbol table. Open catch points keep their own copy, which
    /// shares every untouched entry with this one.
    pub fn with_def_table<T>(&mut self, f: impl FnOnce(&mut DefTable) -> T) -> T {
        f(&mut self.symbols)
    }

    pub fn is_file_scope(&self) -> bool {
        self.symbols.in_file_scope()
    }

    pub fn options(&self) -> &TravOptions {
        &self.options
    }

    pub fn gen_name(&mut self) -> Name {
        self.name_supply.fresh()
    }

    pub fn user_state(&self) -> &S {
        &self.user
    }

    pub fn user_state_mut(&mut self) -> &mut S {
        &mut self.user
    }

    pub fn modify_user_state(&mut self, f: impl FnOnce(&mut S)) {
        f(&mut self.user)
    }

    pub fn into_user_state(self) -> S {
        self.user
    }

    /// Embed a computation over the user payload that fails with its own
    /// error type.
    pub fn lift<T, E: Into<CError>>(&mut self, effect: impl FnOnce(&mut S) -> Result<T, E>) -> TravResult<T> {
        effect(&mut self.user).map_err(Into::into)
    }

    /// Install `handler` and run `action` under it.
    ///
    /// The previous handler is not reinstated afterwards; the new one stays
    /// in effect for the rest of the run.
    pub fn with_ext_decl_handler<T>(
        &mut self,
        handler: ExtDeclHandler<S>,
        action: impl FnOnce(&mut Self) -> TravResult<T>,
    ) -> TravResult<T> {
        self.handler = Some(handler);
        action(self)
    }

    /// Hand `event` to the installed handler.
    pub fn handle_decl(&mut self, event: DeclEvent) -> TravResult<()> {
        trace!("handle_decl: event at {}", event.node_info().span);
        match self.handler.clone() {
            Some(handler) => handler(self, &event),
            None => Ok(()),
        }
    }

    /// Record that `use_node` refers to `def_node`. Nodes without a unique
    /// name are skipped.
    pub fn add_ref(&mut self, use_node: &impl CNode, def_node: &impl CNode) {
        if let (Some(use_name), Some(def_name)) = (use_node.node_info().name, def_node.node_info().name) {
            self.with_def_table(|table| table.insert_ref(use_name, def_name));
        }
    }

    /// Resolve a typedef name to its type.
    pub fn lookup_type_def(&mut self, ident: Ident) -> TravResult<Type> {
        match self.symbols.lookup_ident(ident.name) {
            None => Self::ast_error(&ident.info, format!("unbound typedef: {}", ident)),
            Some(IdentEntry::TypeDef(def)) => {
                let def = def.clone();
                self.add_ref(&ident, &def);
                Ok(def.ty)
            }
            Some(IdentEntry::Ident(decl)) => Self::ast_error(
                &ident.info,
                format!(
                    "wrong kind of object: expected typedef but found {} (for identifier `{}')",
                    decl.kind_description(),
                    ident
                ),
            ),
        }
    }

    /// Resolve an identifier to an object, function or enumerator.
    pub fn lookup_object(&mut self, ident: Ident) -> TravResult<Option<IdentDecl>> {
        match self.symbols.lookup_ident(ident.name) {
            None => Ok(None),
            Some(IdentEntry::TypeDef(_)) => {
                Self::ast_error(&ident.info, "lookup_object: expected an object, but found a typedef")
            }
            Some(IdentEntry::Ident(decl)) => {
                let decl = decl.clone();
                self.add_ref(&ident, &decl);
                Ok(Some(decl))
            }
        }
    }

    /// Identity of a struct/union/enum: its tag, or the unique name of the
    /// defining node when anonymous.
    pub fn create_sue_ref(&self, info: &NodeInfo, ident: Option<Ident>) -> TravResult<SueRef> {
        match (ident, info.name) {
            (Some(ident), _) => Ok(SueRef::Named(ident)),
            (None, Some(name)) => Ok(SueRef::Anonymous(name)),
            (None, None) => Self::ast_error(info, "struct/union/enum definition without unique name"),
        }
    }

    pub fn enter_prototype_scope(&mut self) {
        self.with_def_table(DefTable::enter_prototype_scope)
    }

    pub fn leave_prototype_scope(&mut self) {
        self.with_def_table(DefTable::leave_prototype_scope);
    }

    pub fn enter_function_scope(&mut self) {
        self.with_def_table(DefTable::enter_function_scope)
    }

    pub fn leave_function_scope(&mut self) {
        self.with_def_table(DefTable::leave_function_scope);
    }

    pub fn enter_block_scope(&mut self) {
        self.with_def_table(DefTable::enter_block_scope)
    }

    pub fn leave_block_scope(&mut self) {
        self.with_def_table(DefTable::leave_block_scope);
    }

    pub fn enter_member_decl(&mut self) {
        self.with_def_table(DefTable::enter_member_decl)
    }

    pub fn leave_member_decl(&mut self) -> Vec<MemberDecl> {
        self.with_def_table(DefTable::leave_member_decl)
    }
}

/// Run a traversal from a fresh state.
///
/// Fails with the diagnostic log when it contains a hard diagnostic, or when
/// an abort escaped the traversal (appended last).
pub fn run_trav<S: Clone, T>(
    user: S,
    traversal: impl FnOnce(&mut TravState<S>) -> TravResult<T>,
) -> Result<(T, TravState<S>), Vec<CError>> {
    run_trav_with_options(user, TravOptions::default(), traversal)
}

pub fn run_trav_with_options<S: Clone, T>(
    user: S,
    options: TravOptions,
    traversal: impl FnOnce(&mut TravState<S>) -> TravResult<T>,
) -> Result<(T, TravState<S>), Vec<CError>> {
    run_trav_with_state(TravState::new(user, options), traversal)
}

/// Run a traversal starting from an existing state.
pub fn run_trav_with_state<S: Clone, T>(
    mut state: TravState<S>,
    traversal: impl FnOnce(&mut TravState<S>) -> TravResult<T>,
) -> Result<(T, TravState<S>), Vec<CError>> {
    match traversal(&mut state) {
        Err(err) => {
            trace!("run_trav: aborted with '{}'", err);
            let mut errors = state.into_errors();
            errors.push(err);
            Err(errors)
        }
        Ok(_) if had_hard_errors(state.errors()) => Err(state.into_errors()),
        Ok(value) => Ok((value, state)),
    }
}

/// Run a traversal without user state, returning its result together with
/// every diagnostic.
pub fn run_trav_simple<T>(
    traversal: impl FnOnce(&mut TravState<()>) -> TravResult<T>,
) -> Result<(T, Vec<CError>), Vec<CError>> {
    run_trav((), traversal).map(|(value, state)| (value, state.into_errors()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::RedefKind;
    use crate::source::{SourceId, SourceSpan};

    fn at(offset: u32) -> NodeInfo {
        NodeInfo::only_span(SourceSpan::with_length(SourceId::new(2), offset, 1))
    }

    #[test]
    fn test_catch_sees_state_before_action() {
        let (seen, _) = run_trav(0u32, |trav| {
            trav.modify_user_state(|n| *n += 1);
            trav.catch(
                |trav| {
                    trav.modify_user_state(|n| *n += 10);
                    trav.record_error(CError::other(ErrorLevel::Warning, &at(0), "inside"));
                    TravState::<u32>::ast_error(&at(1), "give up")
                },
                |trav, err| {
                    assert_eq!(err.to_string(), "error: give up");
                    assert!(trav.errors().is_empty());
                    Ok(*trav.user_state())
                },
            )
        })
        .unwrap();
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_name_supply_survives_rollback() {
        let (names, _) = run_trav((), |trav| {
            let first = trav.gen_name();
            let second = trav.catch(
                |trav| {
                    trav.gen_name();
                    TravState::<()>::ast_error(&at(0), "abort")
                },
                |trav, _| Ok(trav.gen_name()),
            )?;
            Ok((first, second))
        })
        .unwrap();
        assert_eq!(names.0.get(), 1);
        assert_eq!(names.1.get(), 3);
    }

    #[test]
    fn test_resume_naming_after_parser() {
        let parser_last = Name::new(100).unwrap();
        let state = TravState::new((), TravOptions::default()).with_name_supply(NameSupply::starting_after(parser_last));
        let (name, _) = run_trav_with_state(state, |trav| Ok(trav.gen_name())).unwrap();
        assert_eq!(name.get(), 101);
    }

    #[test]
    fn test_warn_demotes_unless_werror() {
        let err = || CError::redefinition(ErrorLevel::Error, "x", RedefKind::DuplicateDef, &at(2), &at(0));

        let (_, errors) = run_trav_simple(|trav| {
            trav.warn(err());
            Ok(())
        })
        .unwrap();
        assert_eq!(errors[0].level, ErrorLevel::Warning);

        let options = TravOptions::from_warnings(&["error".to_string()]);
        let result = run_trav_with_options((), options, |trav| {
            trav.warn(err());
            Ok(())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_escaped_abort_fails_run() {
        let errors = run_trav_simple(|trav| {
            trav.record_error(CError::other(ErrorLevel::Warning, &at(0), "first"));
            TravState::<()>::ast_error::<()>(&at(5), "second")
        })
        .unwrap_err();
        insta::assert_snapshot!(crate::diagnostic::format_diagnostics(&errors), @r"
        warning: first at 2:0..1
        error: second at 2:5..6
        ");
    }

    #[test]
    fn test_lift_converts_errors() {
        let result = run_trav_simple(|trav| {
            trav.lift(|_| -> Result<(), CError> { Err(CError::invalid_ast(&at(0), "from below")) })
        });
        assert_eq!(result.unwrap_err().len(), 1);
    }

    #[test]
    fn test_create_sue_ref() {
        let refs = run_trav_simple(|trav| {
            let named = trav.create_sue_ref(&at(0), Some(Ident::new("S", at(0))))?;
            let name = trav.gen_name();
            let anon = trav.create_sue_ref(&NodeInfo::new(at(4).span, name), None)?;
            Ok((named, anon))
        })
        .unwrap()
        .0;
        assert_eq!(refs.0.to_string(), "S");
        assert_eq!(refs.1.to_string(), "<anonymous 1>");

        let errors = run_trav_simple(|trav| trav.create_sue_ref(&at(9), None)).unwrap_err();
        assert_eq!(errors[0].to_string(), "error: struct/union/enum definition without unique name");
    }
}
