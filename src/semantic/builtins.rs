//! Declarations every translation unit starts with.

use crate::semantic::decl::*;
use crate::semantic::symbol_table::DefTable;
use crate::semantic::types::{ArraySize, FloatKind, IntKind, Type, TypeKind, TypeQualifiers};
use crate::source::NodeInfo;

const VA_LIST: &str = "__builtin_va_list";

/// (name, return type, parameter types, variadic)
fn builtin_functions() -> Vec<(&'static str, Type, Vec<Type>, bool)> {
    let va_list = || Type::new(TypeKind::BuiltinVaList);
    let void_ptr = || Type::void().pointer_to();
    let const_void_ptr = || Type::void().qualified(TypeQualifiers::CONST).pointer_to();
    let size_t = || Type::new(TypeKind::Integral(IntKind::ULong));
    let long = || Type::new(TypeKind::Integral(IntKind::Long));
    let double = || Type::new(TypeKind::Floating(FloatKind::Double));
    vec![
        ("__builtin_va_start", Type::void(), vec![va_list()], true),
        ("__builtin_va_end", Type::void(), vec![va_list()], false),
        ("__builtin_va_copy", Type::void(), vec![va_list(), va_list()], false),
        ("__builtin_expect", long(), vec![long(), long()], false),
        ("__builtin_alloca", void_ptr(), vec![size_t()], false),
        ("__builtin_memcpy", void_ptr(), vec![void_ptr(), const_void_ptr(), size_t()], false),
        ("__builtin_memset", void_ptr(), vec![void_ptr(), Type::int(), size_t()], false),
        ("__builtin_strlen", size_t(), vec![Type::char().qualified(TypeQualifiers::CONST).pointer_to()], false),
        ("__builtin_unreachable", Type::void(), vec![], false),
        ("__builtin_trap", Type::void(), vec![], false),
        ("__builtin_fabs", double(), vec![double()], false),
        ("__builtin_huge_val", double(), vec![], false),
        ("__builtin_constant_p", Type::int(), vec![], true),
    ]
}

fn builtin_decl(name: &str, ty: Type, storage: Storage) -> IdentDecl {
    IdentDecl::Declaration(Decl {
        var: VarDecl::new(
            VarName::Named(Ident::new(name, NodeInfo::builtin())),
            DeclAttrs::new(storage),
            ty,
        ),
        info: NodeInfo::builtin(),
    })
}

/// A symbol table whose file scope holds the compiler built-ins.
pub fn builtins() -> DefTable {
    let mut table = DefTable::new();

    let va_list = Ident::new(VA_LIST, NodeInfo::builtin());
    table.define_typedef(
        va_list,
        TypeDef {
            ident: va_list,
            ty: Type::new(TypeKind::BuiltinVaList),
            info: NodeInfo::builtin(),
        },
    );

    for (name, ret, params, variadic) in builtin_functions() {
        let decl = builtin_decl(
            name,
            Type::function(ret, params, variadic),
            Storage::fun_linkage(Linkage::External),
        );
        table.define_global_ident(Ident::new(name, NodeInfo::builtin()), decl);
    }

    for name in ["__FUNCTION__", "__PRETTY_FUNCTION__"] {
        let ty = Type::char()
            .qualified(TypeQualifiers::CONST)
            .array_of(ArraySize::Unknown);
        let decl = builtin_decl(name, ty, Storage::static_storage(Linkage::Internal, false));
        table.define_global_ident(Ident::new(name, NodeInfo::builtin()), decl);
    }

    table
}
