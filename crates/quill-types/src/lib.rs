//! Structural type values for the Quill type checker.
//!
//! A [`Type`] is a shared handle to a [`TypeValue`]. Types compare
//! structurally — `nominal` types by name — and carry a derived total
//! ordering and hash so they can key ordered and persistent maps.
//!
//! The two directional judgements live here as free functions:
//! [`is_assignable_to`] ("a value of this type is admissible where that
//! type is expected") and [`promoted`] (the common type two operands
//! widen to, when one exists).

#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::must_use_candidate)]

use std::fmt;
use std::rc::Rc;

/// A named formal parameter of a function type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub ty: Type,
}

/// A function type: result plus ordered formal parameters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionType {
    /// Result type
    pub result: Type,
    /// Formal parameters in declaration order
    pub params: Vec<Param>,
}

/// An element of a tuple type, optionally named.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TupleField {
    /// Element name, if the tuple position is labelled
    pub name: Option<String>,
    /// Element type
    pub ty: Type,
}

/// A named field of a struct type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StructField {
    /// Field name
    pub name: String,
    /// Field type
    pub ty: Type,
}

/// The structural type value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeValue {
    /// No value
    Void,
    /// Fixed-width integer
    Int {
        /// Signed (`i`) or unsigned (`u`)
        signed: bool,
        /// Width in bits: 8, 16, 32 or 64
        width: u8,
    },
    /// Floating point number
    Float {
        /// Width in bits: 32 or 64
        width: u8,
    },
    /// Boolean
    Bool,
    /// Character
    Char,
    /// Pointer to a value
    Ptr {
        /// Pointee type
        value: Type,
        /// Allocation function, when customised
        allocator: Option<FunctionType>,
    },
    /// Fixed-shape array
    Array {
        /// Element type
        value: Type,
        /// Dimension sizes, outermost first
        shape: Vec<u64>,
    },
    /// Growable array
    Dynarr {
        /// Element type
        value: Type,
        /// Allocation function, when customised
        allocator: Option<FunctionType>,
    },
    /// View into an array
    Slice {
        /// Element type
        value: Type,
        /// First index
        begin: i64,
        /// One-past-last index
        end: i64,
        /// Step between elements
        stride: i64,
    },
    /// String literal of known length
    Strlit {
        /// Length in bytes
        size: u64,
    },
    /// Owned string
    Str {
        /// Allocation function, when customised
        allocator: Option<FunctionType>,
    },
    /// Ordered, optionally named elements
    Tuple(Vec<TupleField>),
    /// Ordered named fields
    Struct(Vec<StructField>),
    /// Callable value
    Function(FunctionType),
    /// One of several alternative types
    Variant(Vec<Type>),
    /// Type introduced by a nominal definition, equal only by name
    Nominal {
        /// Introduced name
        name: String,
        /// Representation type
        underlying: Type,
    },
    /// Not (yet) inferred
    Unknown,
}

/// Shared handle to a [`TypeValue`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Type(Rc<TypeValue>);

impl Type {
    /// Wrap a type value.
    pub fn new(value: TypeValue) -> Self {
        Type(Rc::new(value))
    }

    /// The underlying value.
    pub fn value(&self) -> &TypeValue {
        &self.0
    }

    /// `void`
    pub fn void() -> Self {
        Type::new(TypeValue::Void)
    }

    /// `unknown`
    pub fn unknown() -> Self {
        Type::new(TypeValue::Unknown)
    }

    /// `bool`
    pub fn boolean() -> Self {
        Type::new(TypeValue::Bool)
    }

    /// `char`
    pub fn character() -> Self {
        Type::new(TypeValue::Char)
    }

    /// An integer type of the given signedness and width.
    pub fn int(signed: bool, width: u8) -> Self {
        Type::new(TypeValue::Int { signed, width })
    }

    /// A float type of the given width.
    pub fn float(width: u8) -> Self {
        Type::new(TypeValue::Float { width })
    }

    /// `ptr(value)` with the default allocator.
    pub fn ptr(value: Type) -> Self {
        Type::new(TypeValue::Ptr { value, allocator: None })
    }

    /// `array(value, shape...)`
    pub fn array(value: Type, shape: Vec<u64>) -> Self {
        Type::new(TypeValue::Array { value, shape })
    }

    /// `dynarr(value)` with the default allocator.
    pub fn dynarr(value: Type) -> Self {
        Type::new(TypeValue::Dynarr { value, allocator: None })
    }

    /// `strlit(size)`
    pub fn strlit(size: u64) -> Self {
        Type::new(TypeValue::Strlit { size })
    }

    /// `string` with the default allocator.
    pub fn string() -> Self {
        Type::new(TypeValue::Str { allocator: None })
    }

    /// A function type.
    pub fn function(result: Type, params: Vec<Param>) -> Self {
        Type::new(TypeValue::Function(FunctionType { result, params }))
    }

    /// A nominal type over its representation.
    pub fn nominal(name: impl Into<String>, underlying: Type) -> Self {
        Type::new(TypeValue::Nominal { name: name.into(), underlying })
    }

    /// True for `unknown`.
    pub fn is_unknown(&self) -> bool {
        matches!(self.value(), TypeValue::Unknown)
    }

    /// The pointee when this is a pointer, otherwise the type itself.
    ///
    /// L-values carry `ptr(T)`; operators work on the decayed `T`.
    pub fn decay(&self) -> Type {
        match self.value() {
            TypeValue::Ptr { value, .. } => value.clone(),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl fmt::Display for TypeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeValue::Void => write!(f, "void"),
            TypeValue::Int { signed, width } => {
                write!(f, "{}{}", if *signed { 'i' } else { 'u' }, width)
            }
            TypeValue::Float { width } => write!(f, "f{width}"),
            TypeValue::Bool => write!(f, "bool"),
            TypeValue::Char => write!(f, "char"),
            TypeValue::Ptr { value, .. } => write!(f, "ptr({value})"),
            TypeValue::Array { value, shape } => {
                write!(f, "array({value}")?;
                for n in shape {
                    write!(f, ", {n}")?;
                }
                write!(f, ")")
            }
            TypeValue::Dynarr { value, .. } => write!(f, "dynarr({value})"),
            TypeValue::Slice { value, begin, end, stride } => {
                write!(f, "slice({value}, {begin}, {end}, {stride})")
            }
            TypeValue::Strlit { size } => write!(f, "strlit({size})"),
            TypeValue::Str { .. } => write!(f, "string"),
            TypeValue::Tuple(fields) => {
                write!(f, "tuple(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match &field.name {
                        Some(name) => write!(f, "{name}:{}", field.ty)?,
                        None => write!(f, "{}", field.ty)?,
                    }
                }
                write!(f, ")")
            }
            TypeValue::Struct(fields) => {
                write!(f, "struct(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}:{}", field.name, field.ty)?;
                }
                write!(f, ")")
            }
            TypeValue::Function(fn_ty) => {
                write!(f, "function({}", fn_ty.result)?;
                for param in &fn_ty.params {
                    write!(f, ", {}:{}", param.name, param.ty)?;
                }
                write!(f, ")")
            }
            TypeValue::Variant(alternatives) => {
                write!(f, "variant(")?;
                for (i, ty) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{ty}")?;
                }
                write!(f, ")")
            }
            TypeValue::Nominal { name, .. } => write!(f, "{name}"),
            TypeValue::Unknown => write!(f, "unknown"),
        }
    }
}

/// Directional assignability `src ↦ dst`.
///
/// `unknown` is admissible in both directions so one inference failure
/// does not cascade into spurious diagnostics downstream.
pub fn is_assignable_to(src: &Type, dst: &Type) -> bool {
    if src.is_unknown() || dst.is_unknown() {
        return true;
    }
    if src == dst {
        return true;
    }
    // nominal unwraps on the target side only
    if let TypeValue::Nominal { underlying, .. } = dst.value() {
        return is_assignable_to(src, underlying);
    }
    match (src.value(), dst.value()) {
        (
            TypeValue::Int { signed: ss, width: sw },
            TypeValue::Int { signed: ds, width: dw },
        ) => ss == ds && dw >= sw,
        (TypeValue::Int { .. }, TypeValue::Float { .. }) => true,
        (TypeValue::Float { width: sw }, TypeValue::Float { width: dw }) => dw >= sw,
        (TypeValue::Strlit { .. }, TypeValue::Str { .. }) => true,
        (TypeValue::Strlit { .. }, TypeValue::Ptr { value, .. }) => {
            matches!(value.value(), TypeValue::Char)
        }
        (TypeValue::Array { value: sv, shape }, TypeValue::Ptr { value: dv, .. }) => {
            shape.len() == 1 && is_assignable_to(sv, dv)
        }
        (TypeValue::Tuple(sf), TypeValue::Tuple(df)) => {
            sf.len() == df.len()
                && sf.iter().zip(df).all(|(s, d)| is_assignable_to(&s.ty, &d.ty))
        }
        (TypeValue::Struct(sf), TypeValue::Struct(df)) => {
            sf.len() == df.len()
                && sf
                    .iter()
                    .zip(df)
                    .all(|(s, d)| s.name == d.name && is_assignable_to(&s.ty, &d.ty))
        }
        (TypeValue::Function(sfn), TypeValue::Function(dfn)) => {
            sfn.params.len() == dfn.params.len()
                && is_assignable_to(&sfn.result, &dfn.result)
                && sfn
                    .params
                    .iter()
                    .zip(&dfn.params)
                    .all(|(s, d)| is_assignable_to(&s.ty, &d.ty))
        }
        _ => false,
    }
}

/// The promoted common type of two operands, when one exists.
///
/// Same-signedness integers widen, integer and float combine to the
/// float, floats widen. Anything else has no promotion and the caller
/// falls back to a `variant` of the two.
pub fn promoted(lhs: &Type, rhs: &Type) -> Option<Type> {
    if lhs == rhs {
        return Some(lhs.clone());
    }
    match (lhs.value(), rhs.value()) {
        (
            TypeValue::Int { signed: ls, width: lw },
            TypeValue::Int { signed: rs, width: rw },
        ) if ls == rs => Some(Type::int(*ls, *lw.max(rw))),
        (TypeValue::Int { .. }, TypeValue::Float { width }) => Some(Type::float(*width)),
        (TypeValue::Float { width }, TypeValue::Int { .. }) => Some(Type::float(*width)),
        (TypeValue::Float { width: lw }, TypeValue::Float { width: rw }) => {
            Some(Type::float(*lw.max(rw)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display() {
        assert_eq!(Type::int(true, 32).to_string(), "i32");
        assert_eq!(Type::int(false, 8).to_string(), "u8");
        assert_eq!(Type::float(64).to_string(), "f64");
        assert_eq!(Type::ptr(Type::int(true, 32)).to_string(), "ptr(i32)");
        assert_eq!(Type::array(Type::boolean(), vec![3]).to_string(), "array(bool, 3)");
        assert_eq!(Type::strlit(5).to_string(), "strlit(5)");
        assert_eq!(
            Type::function(
                Type::void(),
                vec![Param { name: "x".to_string(), ty: Type::int(true, 64) }]
            )
            .to_string(),
            "function(void, x:i64)"
        );
        assert_eq!(Type::nominal("Point", Type::int(true, 32)).to_string(), "Point");
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Type::int(true, 32), Type::int(true, 32));
        assert_ne!(Type::int(true, 32), Type::int(false, 32));
        assert_ne!(
            Type::nominal("A", Type::int(true, 32)),
            Type::nominal("B", Type::int(true, 32))
        );
    }

    #[test]
    fn test_types_are_orderable_map_keys() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(Type::int(true, 8), 1);
        map.insert(Type::ptr(Type::void()), 2);
        map.insert(Type::unknown(), 3);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&Type::ptr(Type::void())), Some(&2));
    }

    #[test]
    fn test_integer_assignability() {
        assert!(is_assignable_to(&Type::int(true, 32), &Type::int(true, 64)));
        assert!(is_assignable_to(&Type::int(true, 32), &Type::int(true, 32)));
        assert!(!is_assignable_to(&Type::int(true, 64), &Type::int(true, 32)));
        assert!(!is_assignable_to(&Type::int(true, 32), &Type::int(false, 64)));
        assert!(is_assignable_to(&Type::int(false, 64), &Type::float(32)));
    }

    #[test]
    fn test_string_and_array_assignability() {
        assert!(is_assignable_to(&Type::strlit(12), &Type::string()));
        assert!(is_assignable_to(&Type::strlit(12), &Type::ptr(Type::character())));
        assert!(!is_assignable_to(&Type::strlit(12), &Type::ptr(Type::int(true, 8))));
        assert!(is_assignable_to(
            &Type::array(Type::int(true, 32), vec![4]),
            &Type::ptr(Type::int(true, 32))
        ));
        assert!(!is_assignable_to(
            &Type::array(Type::int(true, 32), vec![2, 2]),
            &Type::ptr(Type::int(true, 32))
        ));
    }

    #[test]
    fn test_nominal_unwraps_on_target_only() {
        let meters = Type::nominal("Meters", Type::int(true, 64));
        assert!(is_assignable_to(&Type::int(true, 32), &meters));
        assert!(!is_assignable_to(&meters, &Type::int(true, 64)));
        assert!(is_assignable_to(&meters, &meters));
    }

    #[test]
    fn test_unknown_absorbs() {
        assert!(is_assignable_to(&Type::unknown(), &Type::boolean()));
        assert!(is_assignable_to(&Type::boolean(), &Type::unknown()));
    }

    #[test]
    fn test_pointwise_assignability() {
        let pair = |a: Type, b: Type| {
            Type::new(TypeValue::Tuple(vec![
                TupleField { name: None, ty: a },
                TupleField { name: None, ty: b },
            ]))
        };
        assert!(is_assignable_to(
            &pair(Type::int(true, 8), Type::strlit(3)),
            &pair(Type::int(true, 64), Type::string())
        ));
        assert!(!is_assignable_to(
            &pair(Type::int(true, 8), Type::strlit(3)),
            &pair(Type::int(false, 64), Type::string())
        ));
    }

    #[test]
    fn test_promotion() {
        assert_eq!(
            promoted(&Type::int(true, 32), &Type::int(true, 64)),
            Some(Type::int(true, 64))
        );
        assert_eq!(promoted(&Type::int(true, 64), &Type::float(32)), Some(Type::float(32)));
        assert_eq!(promoted(&Type::float(32), &Type::float(64)), Some(Type::float(64)));
        assert_eq!(promoted(&Type::boolean(), &Type::boolean()), Some(Type::boolean()));
        assert_eq!(promoted(&Type::int(true, 32), &Type::int(false, 32)), None);
        assert_eq!(promoted(&Type::boolean(), &Type::int(true, 8)), None);
    }
}
