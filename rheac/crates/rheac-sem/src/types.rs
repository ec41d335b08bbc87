//! Type objects for Rhea data types.
//!
//! [`TypeInfo`] is a closed sum covering every type the front-end can
//! describe. Equality is structural throughout; `Function` and
//! `Structure` compare their name→type maps as *ordered* sequences, and
//! `Variant` equality is order-sensitive, which is how the source
//! spelling of a variant is preserved.

use std::fmt;

use indexmap::IndexMap;

pub use rheac_par::ast::BasicType;

/// A simple (scalar or builtin) type.
///
/// Equality considers only the basic kind; the numeric/integral flags are
/// derived properties used by inference, not part of identity.
#[derive(Debug, Clone)]
pub struct SimpleType {
    pub basic: BasicType,
    pub is_numeric: bool,
    pub is_integral: bool,
}

impl SimpleType {
    pub fn new(basic: BasicType, is_numeric: bool, is_integral: bool) -> Self {
        Self {
            basic,
            is_numeric,
            is_integral,
        }
    }
}

impl PartialEq for SimpleType {
    fn eq(&self, other: &Self) -> bool {
        self.basic == other.basic
    }
}

impl Eq for SimpleType {}

/// A function signature: an ordered mapping of argument names to types,
/// plus a return type.
#[derive(Debug, Clone)]
pub struct FunctionType {
    pub argument_types: IndexMap<String, TypeInfo>,
    pub return_type: Box<TypeInfo>,
}

impl Default for FunctionType {
    /// An empty signature: no arguments, `nothing` return.
    fn default() -> Self {
        Self {
            argument_types: IndexMap::new(),
            return_type: Box::new(TypeInfo::Nothing),
        }
    }
}

impl PartialEq for FunctionType {
    fn eq(&self, other: &Self) -> bool {
        self.return_type == other.return_type
            && self.argument_types.len() == other.argument_types.len()
            && self
                .argument_types
                .iter()
                .zip(other.argument_types.iter())
                .all(|(a, b)| a == b)
    }
}

/// A structure layout: an ordered mapping of field names to types.
#[derive(Debug, Clone, Default)]
pub struct StructureType {
    pub fields: IndexMap<String, TypeInfo>,
}

impl PartialEq for StructureType {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self.fields.iter().zip(other.fields.iter()).all(|(a, b)| a == b)
    }
}

/// The closed sum of Rhea types.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TypeInfo {
    /// Placeholder and error case; compatible with itself only
    #[default]
    Unknown,
    Simple(SimpleType),
    /// The unit type; usable as a return type but not convertible
    Nothing,
    /// Compatible with any RHS when it appears on the LHS
    Any,
    Function(FunctionType),
    Optional(Box<TypeInfo>),
    Variant(Vec<TypeInfo>),
    Structure(StructureType),
}

impl TypeInfo {
    pub fn simple(basic: BasicType, is_numeric: bool, is_integral: bool) -> Self {
        TypeInfo::Simple(SimpleType::new(basic, is_numeric, is_integral))
    }

    pub fn boolean() -> Self {
        TypeInfo::simple(BasicType::Boolean, false, false)
    }

    pub fn promoted() -> Self {
        TypeInfo::simple(BasicType::Promoted, false, false)
    }

    /// Is this a simple type with its integral flag set?
    pub fn is_integral(&self) -> bool {
        matches!(self, TypeInfo::Simple(s) if s.is_integral)
    }

    /// Is this a simple type with its numeric flag set?
    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeInfo::Simple(s) if s.is_numeric)
    }
}

/// Type compatibility. This only checks for exact matches at this time;
/// promotion is handled elsewhere in the compiler.
pub fn compatible(lhs: &TypeInfo, rhs: &TypeInfo) -> bool {
    match (lhs, rhs) {
        // `any` accepts anything, but only as the LHS.
        (TypeInfo::Any, _) => true,
        (TypeInfo::Unknown, TypeInfo::Unknown) => true,
        (TypeInfo::Unknown, _) | (_, TypeInfo::Unknown) => false,
        (TypeInfo::Simple(a), TypeInfo::Simple(b)) => a == b,
        (TypeInfo::Nothing, TypeInfo::Nothing) => true,
        (TypeInfo::Function(a), TypeInfo::Function(b)) => a == b,
        // An optional accepts another optional of the same type, or the
        // contained type itself.
        (TypeInfo::Optional(a), TypeInfo::Optional(b)) => a == b,
        (TypeInfo::Optional(contained), other) => compatible(other, contained),
        (TypeInfo::Variant(a), TypeInfo::Variant(b)) => a == b,
        (TypeInfo::Structure(a), TypeInfo::Structure(b)) => a == b,
        _ => false,
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeInfo::Unknown => write!(f, "unknown"),
            TypeInfo::Nothing => write!(f, "nothing"),
            TypeInfo::Any => write!(f, "any"),
            TypeInfo::Simple(s) => {
                let name = match s.basic {
                    BasicType::Integer => "integer",
                    BasicType::Byte => "byte",
                    BasicType::Long => "long",
                    BasicType::UnsignedInteger => "uinteger",
                    BasicType::UnsignedByte => "ubyte",
                    BasicType::UnsignedLong => "ulong",
                    BasicType::Float => "float",
                    BasicType::Double => "double",
                    BasicType::Boolean => "boolean",
                    BasicType::Symbol => "symbol",
                    BasicType::String => "string",
                    BasicType::Any => "any",
                    BasicType::Nothing => "nothing",
                    _ => "unknown",
                };
                write!(f, "{}", name)
            }
            TypeInfo::Function(ft) => {
                let args: Vec<String> =
                    ft.argument_types.values().map(|t| t.to_string()).collect();
                write!(f, "({}) -> {}", args.join(","), ft.return_type)
            }
            TypeInfo::Optional(inner) => write!(f, "|{}|?", inner),
            TypeInfo::Variant(types) => {
                let parts: Vec<String> = types.iter().map(|t| t.to_string()).collect();
                write!(f, "|{}|", parts.join(","))
            }
            TypeInfo::Structure(_) => write!(f, "structure"),
        }
    }
}
