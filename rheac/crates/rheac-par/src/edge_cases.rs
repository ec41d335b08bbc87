//! Edge case tests for rheac-par

#[cfg(test)]
mod tests {
    use crate::{parse_statement, parse_unit, FrontEndError};

    fn stmt_string(source: &str) -> String {
        parse_statement(source, "test")
            .unwrap_or_else(|e| panic!("{}: {}", source, e))
            .to_string()
    }

    /// EDGE CASE: Empty program
    #[test]
    fn test_edge_empty_program() {
        let unit = parse_unit("", "test").unwrap();
        assert!(unit.statements().is_empty());
        assert_eq!(unit.to_string(), "(Program)");
    }

    /// EDGE CASE: Whitespace and comments only
    #[test]
    fn test_edge_comments_only() {
        let unit = parse_unit("  # nothing here\n#{ or\nhere #}\n", "test").unwrap();
        assert!(unit.statements().is_empty());
    }

    /// EDGE CASE: Deeply nested unary operators
    #[test]
    fn test_edge_nested_unary() {
        assert_eq!(
            stmt_string("not not x;"),
            "(BareExpression,(UnaryOp,2,(UnaryOp,2,(Identifier,x))))"
        );
        assert_eq!(
            stmt_string("**x;"),
            "(BareExpression,(UnaryOp,5,(UnaryOp,5,(Identifier,x))))"
        );
    }

    /// EDGE CASE: Sign folded into the literal, not a unary operator
    #[test]
    fn test_edge_negative_literal() {
        assert_eq!(stmt_string("-1;"), "(BareExpression,(Integral,-1,0))");
        assert_eq!(stmt_string("-x;"), "(BareExpression,(UnaryOp,1,(Identifier,x)))");
    }

    /// EDGE CASE: Binary minus still works with no space before the digit
    #[test]
    fn test_edge_binary_minus_before_digit() {
        assert_eq!(
            stmt_string("a - 1;"),
            "(BareExpression,(BinaryOp,1,(Identifier,a),(Integral,1,0)))"
        );
    }

    /// EDGE CASE: Hex width boundary at exactly 8 digits
    #[test]
    fn test_edge_hex_width_boundary() {
        assert_eq!(
            stmt_string("0xffffffff;"),
            "(BareExpression,(Integral,4294967295,5))"
        );
        assert_eq!(
            stmt_string("0x100000000;"),
            "(BareExpression,(Integral,4294967296,7))"
        );
    }

    /// EDGE CASE: Integer overflow silently truncates to the target width
    #[test]
    fn test_edge_integer_truncation() {
        // 300 does not fit a byte; the low bits survive
        assert_eq!(stmt_string("300_b;"), "(BareExpression,(Integral,44,1))");
    }

    /// EDGE CASE: Empty list and empty tuple
    #[test]
    fn test_edge_empty_containers() {
        assert_eq!(stmt_string("();"), "(BareExpression,(List))");
        assert_eq!(stmt_string("{1};"), "(BareExpression,(Tuple,(Integral,1,0)))");
    }

    /// EDGE CASE: Single-element list needs its comma
    #[test]
    fn test_edge_single_element_list() {
        assert_eq!(stmt_string("(1,);"), "(BareExpression,(List,(Integral,1,0)))");
        // Without the comma, the parentheses are just grouping
        assert_eq!(stmt_string("(1);"), "(BareExpression,(Integral,1,0))");
    }

    /// EDGE CASE: Both quote styles normalize to one printed form
    #[test]
    fn test_edge_string_quote_styles() {
        assert_eq!(stmt_string("\"abc\";"), "(BareExpression,(String,\"abc\"))");
        assert_eq!(stmt_string("'abc';"), "(BareExpression,(String,\"abc\"))");
    }

    /// EDGE CASE: Escape sequences stay raw in the AST
    #[test]
    fn test_edge_string_escapes_raw() {
        assert_eq!(
            stmt_string(r#""a\nb";"#),
            "(BareExpression,(String,\"a\\nb\"))"
        );
    }

    /// EDGE CASE: Postfix chain mixing all three postfix forms
    #[test]
    fn test_edge_postfix_chain() {
        assert_eq!(
            stmt_string("a[i].m(1);"),
            "(BareExpression,(Call,(Member,(Identifier,m),(Subscript,(Identifier,a),(Identifier,i))),(Integral,1,0)))"
        );
    }

    /// EDGE CASE: Parenthesized expression resets precedence
    #[test]
    fn test_edge_parenthesized_precedence() {
        assert_eq!(
            stmt_string("(a + b) * c;"),
            "(BareExpression,(BinaryOp,2,(BinaryOp,0,(Identifier,a),(Identifier,b)),(Identifier,c)))"
        );
    }

    /// EDGE CASE: Boolean operators bind loosest of the binaries
    #[test]
    fn test_edge_boolean_precedence() {
        assert_eq!(
            stmt_string("a == b and c;"),
            "(BareExpression,(BinaryOp,17,(BinaryOp,8,(Identifier,a),(Identifier,b)),(Identifier,c)))"
        );
    }

    /// EDGE CASE: Nested blocks each print as a Block
    #[test]
    fn test_edge_nested_blocks() {
        assert_eq!(
            stmt_string("{ { do a; } }"),
            "(Block,(Block,(Do,(Identifier,a))))"
        );
    }

    /// EDGE CASE: else-if chains nest as statements
    #[test]
    fn test_edge_else_if_chain() {
        assert_eq!(
            stmt_string("if a do x; else if b do y; else do z;"),
            "(If,(Identifier,a),(Do,(Identifier,x)),(If,(Identifier,b),(Do,(Identifier,y)),(Do,(Identifier,z))))"
        );
    }

    /// EDGE CASE: `ref T` in type position is recognized but unimplemented
    #[test]
    fn test_edge_reference_typename_unimplemented() {
        match parse_statement("var x as ref integer;", "test") {
            Err(FrontEndError::Build(e)) => {
                assert!(e.to_string().contains("unimplemented"));
            }
            other => panic!("expected build error, got {:?}", other.map(|s| s.to_string())),
        }
    }

    /// EDGE CASE: Qualified names do not admit interior whitespace
    #[test]
    fn test_edge_qualified_name_no_spaces() {
        assert!(parse_statement("foo : bar;", "test").is_err());
    }

    /// EDGE CASE: A predicate call with receiver and arguments
    #[test]
    fn test_edge_predicate_call_full_form() {
        assert_eq!(
            stmt_string("with (x.between(1, 10)?) do y;"),
            "(With,(PredicateCall,(Identifier,between),(Identifier,x),(Integral,1,0),(Integral,10,0)),(Do,(Identifier,y)))"
        );
    }

    /// EDGE CASE: Module unit requires the header first
    #[test]
    fn test_edge_module_header_position() {
        assert!(parse_unit("module m; use x;", "test").is_ok());
        assert!(parse_unit("use x; module m;", "test").is_err());
    }
}
