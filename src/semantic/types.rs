//! Canonical C types as seen by declarations.

use bitflags::bitflags;
use thin_vec::ThinVec;

use crate::semantic::decl::{Ident, SueRef};

bitflags! {
    /// Type qualifiers (C11 6.7.3).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeQualifiers: u8 {
        const CONST = 1 << 0;
        const VOLATILE = 1 << 1;
        const RESTRICT = 1 << 2;
        const ATOMIC = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    Bool,
    Char,
    SChar,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
    Float,
    Double,
    LongDouble,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompTyKind {
    Struct,
    Union,
}

impl std::fmt::Display for CompTyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompTyKind::Struct => write!(f, "struct"),
            CompTyKind::Union => write!(f, "union"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArraySize {
    Unknown,
    Fixed(u64),
    /// variable length array
    Variable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunType {
    pub return_type: Box<Type>,
    pub params: ThinVec<Type>,
    pub is_variadic: bool,
    /// `int f()`: parameters unspecified
    pub is_prototype: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Void,
    Integral(IntKind),
    Floating(FloatKind),
    Pointer(Box<Type>),
    Array(Box<Type>, ArraySize),
    Function(FunType),
    Comp(SueRef, CompTyKind),
    Enum(SueRef),
    /// Reference to a typedef name, with the aliased type once resolved.
    TypeDefRef(Ident, Option<Box<Type>>),
    BuiltinVaList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub kind: TypeKind,
    pub qualifiers: TypeQualifiers,
}

impl Type {
    pub fn new(kind: TypeKind) -> Self {
        Type {
            kind,
            qualifiers: TypeQualifiers::empty(),
        }
    }

    pub fn int() -> Self {
        Type::new(TypeKind::Integral(IntKind::Int))
    }

    pub fn char() -> Self {
        Type::new(TypeKind::Integral(IntKind::Char))
    }

    pub fn void() -> Self {
        Type::new(TypeKind::Void)
    }

    pub fn pointer_to(self) -> Self {
        Type::new(TypeKind::Pointer(Box::new(self)))
    }

    pub fn array_of(self, size: ArraySize) -> Self {
        Type::new(TypeKind::Array(Box::new(self), size))
    }

    pub fn function(return_type: Type, params: impl IntoIterator<Item = Type>, is_variadic: bool) -> Self {
        Type::new(TypeKind::Function(FunType {
            return_type: Box::new(return_type),
            params: params.into_iter().collect(),
            is_variadic,
            is_prototype: true,
        }))
    }

    pub fn qualified(mut self, qualifiers: TypeQualifiers) -> Self {
        self.qualifiers |= qualifiers;
        self
    }

    pub fn is_function(&self) -> bool {
        matches!(self.canonical().kind, TypeKind::Function(_))
    }

    /// Strip resolved typedef references, merging their qualifiers.
    pub fn canonical(&self) -> std::borrow::Cow<'_, Type> {
        match &self.kind {
            TypeKind::TypeDefRef(_, Some(aliased)) => {
                let mut ty = aliased.canonical().into_owned();
                ty.qualifiers |= self.qualifiers;
                std::borrow::Cow::Owned(ty)
            }
            _ => std::borrow::Cow::Borrowed(self),
        }
    }
}

/// Structural identity of two types, looking through resolved typedefs.
///
/// This is the "same type" test of C11 6.7p3 used when a typedef is
/// redefined, not general type compatibility.
pub fn same_type(a: &Type, b: &Type) -> bool {
    let (a, b) = (a.canonical(), b.canonical());
    if a.qualifiers != b.qualifiers {
        return false;
    }
    match (&a.kind, &b.kind) {
        (TypeKind::Pointer(x), TypeKind::Pointer(y)) => same_type(x, y),
        (TypeKind::Array(x, n), TypeKind::Array(y, m)) => n == m && same_type(x, y),
        (TypeKind::Function(f), TypeKind::Function(g)) => {
            f.is_variadic == g.is_variadic
                && f.is_prototype == g.is_prototype
                && same_type(&f.return_type, &g.return_type)
                && f.params.len() == g.params.len()
                && f.params.iter().zip(g.params.iter()).all(|(x, y)| same_type(x, y))
        }
        // unresolved typedef names are equal when they name the same typedef
        (TypeKind::TypeDefRef(x, None), TypeKind::TypeDefRef(y, None)) => x == y,
        (x, y) => x == y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::NodeInfo;

    fn typedef_ref(name: &str, aliased: Option<Type>) -> Type {
        Type::new(TypeKind::TypeDefRef(Ident::new(name, NodeInfo::builtin()), aliased.map(Box::new)))
    }

    #[test]
    fn test_same_type_structural() {
        assert!(same_type(&Type::int().pointer_to(), &Type::int().pointer_to()));
        assert!(!same_type(&Type::int().pointer_to(), &Type::char().pointer_to()));
        assert!(!same_type(&Type::int(), &Type::int().qualified(TypeQualifiers::CONST)));
        assert!(!same_type(
            &Type::int().array_of(ArraySize::Fixed(4)),
            &Type::int().array_of(ArraySize::Fixed(5))
        ));
    }

    #[test]
    fn test_same_type_through_typedef() {
        let my_int = typedef_ref("my_int", Some(Type::int()));
        assert!(same_type(&my_int, &Type::int()));
        assert!(same_type(&typedef_ref("a", None), &typedef_ref("a", None)));
        assert!(!same_type(&typedef_ref("a", None), &typedef_ref("b", None)));

        let const_my_int = my_int.qualified(TypeQualifiers::CONST);
        assert!(same_type(&const_my_int, &Type::int().qualified(TypeQualifiers::CONST)));
    }

    #[test]
    fn test_function_types() {
        let f = Type::function(Type::int(), [Type::int()], false);
        let g = Type::function(Type::int(), [Type::int()], true);
        assert!(f.is_function());
        assert!(!same_type(&f, &g));
        assert!(same_type(&f, &f.clone()));
    }
}
