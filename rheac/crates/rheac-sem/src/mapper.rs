//! The type mapper: typename strings → type objects.
//!
//! One mapper exists per compilation unit, seeded with the builtin names.
//! Declarations (structures, enums, aliases) add entries as the inference
//! walk encounters them; builtins can never be redefined.

use rustc_hash::FxHashMap;

use rheac_par::ast::{BasicType, Typename, TypenameKind};

use crate::types::{SimpleType, TypeInfo};

/// Name → type registry for one compilation unit.
#[derive(Debug)]
pub struct TypeMapper {
    type_map: FxHashMap<String, TypeInfo>,
}

impl Default for TypeMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeMapper {
    /// Create a mapper seeded with the 13 builtin types.
    pub fn new() -> Self {
        let mut mapper = Self {
            type_map: FxHashMap::default(),
        };
        mapper.insert_builtin_types();
        mapper
    }

    fn insert_builtin(&mut self, name: &str, basic: BasicType, numeric: bool, integral: bool) {
        self.type_map.insert(
            name.to_string(),
            TypeInfo::Simple(SimpleType::new(basic, numeric, integral)),
        );
    }

    fn insert_builtin_types(&mut self) {
        self.insert_builtin("integer", BasicType::Integer, true, true);
        self.insert_builtin("byte", BasicType::Byte, true, true);
        self.insert_builtin("long", BasicType::Long, true, true);
        self.insert_builtin("uinteger", BasicType::UnsignedInteger, true, true);
        self.insert_builtin("ubyte", BasicType::UnsignedByte, true, true);
        self.insert_builtin("ulong", BasicType::UnsignedLong, true, true);

        self.insert_builtin("float", BasicType::Float, true, false);
        self.insert_builtin("double", BasicType::Double, true, false);

        self.insert_builtin("boolean", BasicType::Boolean, false, false);
        self.insert_builtin("string", BasicType::String, false, false);
        self.insert_builtin("symbol", BasicType::Symbol, false, false);

        self.type_map.insert("any".to_string(), TypeInfo::Any);
        self.type_map.insert("nothing".to_string(), TypeInfo::Nothing);
    }

    /// Get the type for a typename string. An absent name yields
    /// `Unknown` rather than an error: an unknown identifier is a problem
    /// in the Rhea code, not in the compiler.
    pub fn get_type_for(&self, name: &str) -> TypeInfo {
        self.type_map.get(name).cloned().unwrap_or(TypeInfo::Unknown)
    }

    /// Add a new type definition. Returns false if the name is already
    /// present; user code must not overwrite, say, `integer`.
    pub fn add_type_definition(&mut self, name: &str, info: TypeInfo) -> bool {
        if self.is_type_defined(name) {
            false
        } else {
            self.type_map.insert(name.to_string(), info);
            true
        }
    }

    /// Remove a type definition, returning the prior binding if any.
    pub fn remove_type_definition(&mut self, name: &str) -> Option<TypeInfo> {
        self.type_map.remove(name)
    }

    /// Does the given typename have a known mapping?
    pub fn is_type_defined(&self, name: &str) -> bool {
        self.type_map.contains_key(name)
    }
}

/// Resolve an AST typename against the mapper.
///
/// Simple named types go through the registry; generic and array forms
/// have no structural representation yet and come back as `Other`;
/// variants and optionals resolve structurally.
pub fn resolve_typename(mapper: &TypeMapper, typename: &Typename) -> TypeInfo {
    match &typename.kind {
        TypenameKind::Named {
            name,
            generic: None,
            array: None,
        } => match name.qualified_name() {
            Some(n) => mapper.get_type_for(&n),
            None => TypeInfo::Unknown,
        },
        TypenameKind::Named { .. } => {
            TypeInfo::Simple(SimpleType::new(BasicType::Other, false, false))
        }
        TypenameKind::Variant(types) => TypeInfo::Variant(
            types
                .iter()
                .map(|t| resolve_typename(mapper, t))
                .collect(),
        ),
        TypenameKind::Optional(inner) => {
            TypeInfo::Optional(Box::new(resolve_typename(mapper, inner)))
        }
    }
}
