//! Function name mangling.
//!
//! Rhea supports functions overloaded on argument and return types, so
//! the linker needs a deterministic encoding of each overload. Unchecked
//! functions pass through unmangled (they are FFI-visible); everything
//! else becomes `_R`, a function-kind code, the name, the return-type
//! code, and either `0` (no arguments) or the concatenated argument-type
//! codes, names omitted.

use std::fmt::Write as _;

use rheac_par::ast::{BasicType, FunctionKind};
use rheac_util::{MangleError, MangleResult};

use crate::types::{FunctionType, TypeInfo};

/// Mangle one type into its code.
fn mangle_argument_name(info: &TypeInfo) -> MangleResult<String> {
    match info {
        TypeInfo::Nothing => Ok("v".into()),
        TypeInfo::Any => Ok("a".into()),
        TypeInfo::Simple(s) => {
            let code = match s.basic {
                BasicType::Integer => "i",
                BasicType::Byte => "c",
                BasicType::Long => "l",
                BasicType::UnsignedInteger => "I",
                BasicType::UnsignedByte => "C",
                BasicType::UnsignedLong => "L",
                BasicType::Float => "Df",
                BasicType::Double => "Dd",
                BasicType::Boolean => "b",
                BasicType::Symbol => "Sy",
                BasicType::String => "s",
                _ => {
                    return Err(MangleError::Unmangleable {
                        type_name: info.to_string(),
                    })
                }
            };
            Ok(code.into())
        }
        TypeInfo::Optional(contained) => Ok(format!("Op{}", mangle_argument_name(contained)?)),
        TypeInfo::Variant(types) => {
            let mut result = format!("V{}", types.len());
            for t in types {
                result.push_str(&mangle_argument_name(t)?);
            }
            Ok(result)
        }
        // Structures, containers, functions, and ref/ptr types have no
        // encoding yet.
        _ => Err(MangleError::Unmangleable {
            type_name: info.to_string(),
        }),
    }
}

/// Given the unmangled name of a function and its signature, produce the
/// linker symbol.
pub fn mangle_function_name(
    name: &str,
    function_type: &FunctionType,
    function_class: FunctionKind,
) -> MangleResult<String> {
    // Unchecked functions are unmangled functions.
    if function_class == FunctionKind::Unchecked {
        return Ok(name.to_string());
    }

    let mut mangled = String::from("_R");

    match function_class {
        FunctionKind::Basic => mangled.push('f'),
        FunctionKind::Predicate => mangled.push('p'),
        FunctionKind::Operator => mangled.push('o'),
        FunctionKind::Unchecked => unreachable!("handled above"),
    }

    // Operators keep their symbolic name verbatim; functions and
    // predicates are length-prefixed.
    if function_class == FunctionKind::Operator {
        mangled.push_str(name);
    } else {
        let _ = write!(mangled, "{}{}", name.len(), name);
    }

    mangled.push_str(&mangle_argument_name(&function_type.return_type)?);

    if function_type.argument_types.is_empty() {
        mangled.push('0');
    } else {
        for argument in function_type.argument_types.values() {
            mangled.push_str(&mangle_argument_name(argument)?);
        }
    }

    Ok(mangled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn integer() -> TypeInfo {
        TypeInfo::simple(BasicType::Integer, true, true)
    }

    fn signature(args: &[(&str, TypeInfo)], ret: TypeInfo) -> FunctionType {
        let mut argument_types = IndexMap::new();
        for (name, t) in args {
            argument_types.insert(name.to_string(), t.clone());
        }
        FunctionType {
            argument_types,
            return_type: Box::new(ret),
        }
    }

    #[test]
    fn test_simple_function_no_args() {
        let ft = FunctionType::default();
        assert_eq!(
            mangle_function_name("foo", &ft, FunctionKind::Basic).unwrap(),
            "_Rf3foov0"
        );
    }

    #[test]
    fn test_function_with_arguments() {
        let ft = signature(
            &[("a", integer()), ("b", TypeInfo::boolean())],
            TypeInfo::simple(BasicType::String, false, false),
        );
        assert_eq!(
            mangle_function_name("bar", &ft, FunctionKind::Basic).unwrap(),
            "_Rf3barsib"
        );
    }

    #[test]
    fn test_predicate_mangles_with_p() {
        let ft = signature(&[("x", integer())], TypeInfo::boolean());
        assert_eq!(
            mangle_function_name("even", &ft, FunctionKind::Predicate).unwrap(),
            "_Rp4evenbi"
        );
    }

    #[test]
    fn test_operator_keeps_symbolic_name() {
        let ft = signature(&[("a", integer()), ("b", integer())], integer());
        assert_eq!(
            mangle_function_name("plus", &ft, FunctionKind::Operator).unwrap(),
            "_Ropluspiii"
        );
    }

    #[test]
    fn test_unchecked_is_unmangled() {
        let ft = FunctionType::default();
        assert_eq!(
            mangle_function_name("puts", &ft, FunctionKind::Unchecked).unwrap(),
            "puts"
        );
    }

    #[test]
    fn test_all_simple_type_codes() {
        let cases = [
            (BasicType::Integer, "i"),
            (BasicType::Byte, "c"),
            (BasicType::Long, "l"),
            (BasicType::UnsignedInteger, "I"),
            (BasicType::UnsignedByte, "C"),
            (BasicType::UnsignedLong, "L"),
            (BasicType::Float, "Df"),
            (BasicType::Double, "Dd"),
            (BasicType::Boolean, "b"),
            (BasicType::Symbol, "Sy"),
            (BasicType::String, "s"),
        ];
        for (basic, code) in cases {
            let t = TypeInfo::simple(basic, false, false);
            assert_eq!(mangle_argument_name(&t).unwrap(), code);
        }
    }

    #[test]
    fn test_optional_and_variant_codes() {
        let opt = TypeInfo::Optional(Box::new(integer()));
        assert_eq!(mangle_argument_name(&opt).unwrap(), "Opi");

        let var = TypeInfo::Variant(vec![
            integer(),
            TypeInfo::simple(BasicType::String, false, false),
        ]);
        assert_eq!(mangle_argument_name(&var).unwrap(), "V2is");
    }

    #[test]
    fn test_unknown_type_is_mangle_error() {
        let ft = signature(&[("a", TypeInfo::Unknown)], TypeInfo::Nothing);
        assert!(mangle_function_name("f", &ft, FunctionKind::Basic).is_err());
    }

    #[test]
    fn test_structure_is_not_mangleable_yet() {
        let ft = signature(
            &[("s", TypeInfo::Structure(Default::default()))],
            TypeInfo::Nothing,
        );
        assert!(mangle_function_name("f", &ft, FunctionKind::Basic).is_err());
    }

    #[test]
    fn test_mangling_is_injective_over_kinds() {
        let ft = FunctionType::default();
        let basic = mangle_function_name("f", &ft, FunctionKind::Basic).unwrap();
        let pred = mangle_function_name("f", &ft, FunctionKind::Predicate).unwrap();
        let op = mangle_function_name("f", &ft, FunctionKind::Operator).unwrap();
        assert_ne!(basic, pred);
        assert_ne!(basic, op);
        assert_ne!(pred, op);
    }

    #[test]
    fn test_mangling_is_deterministic() {
        let ft = signature(&[("a", integer())], integer());
        let once = mangle_function_name("f", &ft, FunctionKind::Basic).unwrap();
        let twice = mangle_function_name("f", &ft, FunctionKind::Basic).unwrap();
        assert_eq!(once, twice);
    }
}
