//! Parse tree → AST lowering.
//!
//! The builder is a dispatcher on the parse node's rule tag: for each tag
//! it constructs the corresponding AST node, propagating the source
//! position. Any tag without a handler raises
//! [`BuildError::UnimplementedTag`] naming the rule, so grammar growth
//! cannot silently produce holes in the AST.

use rheac_util::{BuildError, BuildResult, SourcePosition};

use crate::ast::*;
use crate::grammar::Rule;
use crate::parse_tree::ParseNode;

/// Allocates node identities and lowers parse trees into AST nodes.
#[derive(Debug, Default)]
pub struct AstBuilder {
    next_id: u32,
}

/// Parse a decimal literal, silently truncating on overflow. The target
/// width is applied by the caller with a bit-preserving cast.
fn parse_decimal(text: &str) -> i64 {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i64 = 0;
    for byte in digits.bytes() {
        value = value
            .wrapping_mul(10)
            .wrapping_add(i64::from(byte - b'0'));
    }

    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

/// Parse the digits of a hex literal (without the `0x` prefix).
fn parse_hex(digits: &str) -> u64 {
    let mut value: u64 = 0;
    for byte in digits.bytes() {
        let digit = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            _ => byte - b'A' + 10,
        };
        value = (value << 4) | u64::from(digit);
    }
    value
}

fn unimplemented(node: &ParseNode) -> BuildError {
    BuildError::UnimplementedTag { tag: node.name() }
}

fn syntax(pos: &SourcePosition, message: &str) -> BuildError {
    BuildError::Syntax {
        position: pos.clone(),
        message: message.into(),
    }
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn expr(&mut self, pos: &SourcePosition, kind: ExprKind) -> Expression {
        Expression {
            id: self.fresh(),
            pos: pos.clone(),
            kind,
        }
    }

    fn stmt(&mut self, pos: &SourcePosition, kind: StmtKind) -> Statement {
        Statement {
            id: self.fresh(),
            pos: pos.clone(),
            kind,
        }
    }

    /// Builder for identifiers, for when a more general expression can't
    /// be used. Builtin type keywords are admitted where identifiers are
    /// admitted in type contexts.
    pub fn identifier(&mut self, node: &ParseNode) -> BuildResult<Expression> {
        match node.rule {
            Rule::identifier | Rule::builtin_types | Rule::function_name => {
                Ok(self.expr(&node.position, ExprKind::Identifier(node.text.clone())))
            }
            Rule::fully_qualified => {
                let parts = node.children.iter().map(|c| c.text.clone()).collect();
                Ok(self.expr(&node.position, ExprKind::FullyQualified(parts)))
            }
            Rule::relative_identifier => {
                // Relative identifier parse nodes always contain either a
                // bare identifier or a fully-qualified one.
                let inner = self.identifier(&node.children[0])?;
                Ok(self.expr(
                    &node.position,
                    ExprKind::RelativeIdentifier(Box::new(inner)),
                ))
            }
            _ => Err(unimplemented(node)),
        }
    }

    /// Builder for typenames.
    pub fn typename(&mut self, node: &ParseNode) -> BuildResult<Typename> {
        match node.rule {
            Rule::identifier
            | Rule::builtin_types
            | Rule::fully_qualified
            | Rule::relative_identifier => {
                let name = self.identifier(node)?;
                Ok(Typename {
                    id: self.fresh(),
                    pos: node.position.clone(),
                    kind: TypenameKind::Named {
                        name: Box::new(name),
                        generic: None,
                        array: None,
                    },
                })
            }
            Rule::complex_type_name => {
                let name = self.identifier(&node.children[0])?;

                // The generic part always comes right after the base name
                // when present.
                let mut generic = None;
                let mut rest = 1;
                if node
                    .children
                    .get(1)
                    .is_some_and(|c| c.is(Rule::generic_type))
                {
                    let g = &node.children[1];
                    let mut children = Vec::new();
                    for child in &g.children {
                        children.push(self.typename(child)?);
                    }
                    generic = Some(GenericTypename {
                        id: self.fresh(),
                        pos: g.position.clone(),
                        children,
                    });
                    rest = 2;
                }

                // Anything else is an array dimension.
                let mut dimensions = Vec::new();
                for child in &node.children[rest..] {
                    if !child.is(Rule::array_type) {
                        return Err(unimplemented(child));
                    }
                    dimensions.push(self.expression(&child.children[0])?);
                }
                let array = if dimensions.is_empty() {
                    None
                } else {
                    Some(ArrayTypename {
                        id: self.fresh(),
                        pos: node.position.clone(),
                        dimensions,
                    })
                };

                Ok(Typename {
                    id: self.fresh(),
                    pos: node.position.clone(),
                    kind: TypenameKind::Named {
                        name: Box::new(name),
                        generic,
                        array,
                    },
                })
            }
            Rule::optional_type => {
                let inner = self.typename(&node.children[0])?;
                Ok(Typename {
                    id: self.fresh(),
                    pos: node.position.clone(),
                    kind: TypenameKind::Optional(Box::new(inner)),
                })
            }
            Rule::tagged_union => {
                let mut types = Vec::new();
                for child in &node.children {
                    types.push(self.typename(child)?);
                }
                Ok(Typename {
                    id: self.fresh(),
                    pos: node.position.clone(),
                    kind: TypenameKind::Variant(types),
                })
            }
            // `ref T` / `ptr T` have no AST representation yet.
            _ => Err(unimplemented(node)),
        }
    }

    /// Builder for name-type pairs.
    pub fn type_pair(&mut self, node: &ParseNode) -> BuildResult<TypePair> {
        Ok(TypePair {
            id: self.fresh(),
            pos: node.position.clone(),
            name: node.children[0].text.clone(),
            value: self.typename(&node.children[1])?,
        })
    }

    /// Builder for module names (`use`, `import`, `export`, `module`).
    fn module_name(&mut self, node: &ParseNode) -> BuildResult<ModuleName> {
        let inner = &node.children[0];
        let (relative, parts) = match inner.rule {
            Rule::identifier => (false, vec![inner.text.clone()]),
            Rule::fully_qualified => (
                false,
                inner.children.iter().map(|c| c.text.clone()).collect(),
            ),
            Rule::relative_identifier => {
                let target = &inner.children[0];
                let parts = match target.rule {
                    Rule::identifier => vec![target.text.clone()],
                    Rule::fully_qualified => {
                        target.children.iter().map(|c| c.text.clone()).collect()
                    }
                    _ => return Err(unimplemented(target)),
                };
                (true, parts)
            }
            _ => return Err(unimplemented(inner)),
        };

        Ok(ModuleName {
            id: self.fresh(),
            pos: node.position.clone(),
            relative,
            parts,
        })
    }

    fn binop(&mut self, node: &ParseNode, op: BinaryOperator) -> BuildResult<Expression> {
        let left = self.expression(&node.children[0])?;
        let right = self.expression(&node.children[1])?;
        Ok(self.expr(
            &node.position,
            ExprKind::BinaryOp(BinaryExpr {
                op,
                left: Box::new(left),
                right: Box::new(right),
            }),
        ))
    }

    fn unary(&mut self, node: &ParseNode, op: UnaryOperator) -> BuildResult<Expression> {
        let operand = self.expression(&node.children[0])?;
        Ok(self.expr(
            &node.position,
            ExprKind::UnaryOp(UnaryExpr {
                op,
                operand: Box::new(operand),
            }),
        ))
    }

    fn expression_list(&mut self, children: &[ParseNode]) -> BuildResult<Vec<Expression>> {
        children.iter().map(|c| self.expression(c)).collect()
    }

    /// Builder for dictionary keys. Only integral, string, and symbol
    /// literals are admitted; anything else is a syntax error.
    fn dictionary_key(&mut self, node: &ParseNode) -> BuildResult<DictionaryKey> {
        let expr = self.expression(node)?;
        match expr.kind {
            ExprKind::Integer(v) => Ok(DictionaryKey::Integer(v)),
            ExprKind::Byte(v) => Ok(DictionaryKey::Byte(v)),
            ExprKind::Long(v) => Ok(DictionaryKey::Long(v)),
            ExprKind::UnsignedInteger(v) => Ok(DictionaryKey::UnsignedInteger(v)),
            ExprKind::UnsignedByte(v) => Ok(DictionaryKey::UnsignedByte(v)),
            ExprKind::UnsignedLong(v) => Ok(DictionaryKey::UnsignedLong(v)),
            ExprKind::String(v) => Ok(DictionaryKey::String(v)),
            ExprKind::Symbol(v) => Ok(DictionaryKey::Symbol(v)),
            _ => Err(syntax(&node.position, "Invalid dictionary key type")),
        }
    }

    fn dictionary_entry(&mut self, node: &ParseNode) -> BuildResult<DictionaryEntry> {
        Ok(DictionaryEntry {
            id: self.fresh(),
            pos: node.position.clone(),
            key: self.dictionary_key(&node.children[0])?,
            value: self.expression(&node.children[1])?,
        })
    }

    fn named_argument(&mut self, node: &ParseNode) -> BuildResult<NamedArgument> {
        Ok(NamedArgument {
            id: self.fresh(),
            pos: node.position.clone(),
            name: node.children[0].text.clone(),
            value: self.expression(&node.children[1])?,
        })
    }

    /// Builder for the three shapes of call argument list.
    fn call_arguments(&mut self, args: &ParseNode) -> BuildResult<Vec<CallArgument>> {
        match args.rule {
            Rule::empty_argument_list => Ok(Vec::new()),
            Rule::unnamed_argument_list => Ok(self
                .expression_list(&args.children)?
                .into_iter()
                .map(CallArgument::Positional)
                .collect()),
            Rule::named_argument_list => {
                let mut out = Vec::new();
                for child in &args.children {
                    out.push(CallArgument::Named(self.named_argument(child)?));
                }
                Ok(out)
            }
            _ => Err(unimplemented(args)),
        }
    }

    /// Builder for predicate calls. The receiver before `.name`, when
    /// present, becomes the call's first argument; the function being
    /// called is the RHS of the member expression.
    pub fn predicate_call(&mut self, node: &ParseNode) -> BuildResult<Expression> {
        let mut arguments = Vec::new();
        let target;

        if node.children.len() > 1 {
            let second = &node.children[1];
            if second.is(Rule::member_expr) {
                arguments.push(self.expression(&node.children[0])?);
                target = self.expression(&second.children[0])?;
            } else {
                target = self.expression(&node.children[0])?;
            }

            let last = node.children.last().unwrap();
            if last.is(Rule::predicate_arguments_list) {
                for child in &last.children {
                    arguments.push(self.expression(child)?);
                }
            }
        } else {
            // A bare name is the target, and no implicit argument is added.
            target = self.expression(&node.children[0])?;
        }

        Ok(self.expr(
            &node.position,
            ExprKind::PredicateCall(PredicateCallExpr {
                target: Box::new(target),
                arguments,
            }),
        ))
    }

    /// Builder for expressions.
    pub fn expression(&mut self, node: &ParseNode) -> BuildResult<Expression> {
        let pos = node.position.clone();

        match node.rule {
            // Floating-point literals: `_f` selects 32-bit, else double.
            Rule::float_literal => {
                let text = &node.children[0].text;
                if node.children.len() > 1 {
                    let value: f32 = text
                        .parse()
                        .map_err(|_| syntax(&pos, "invalid float literal"))?;
                    Ok(self.expr(&pos, ExprKind::Float(value)))
                } else {
                    let value: f64 = text
                        .parse()
                        .map_err(|_| syntax(&pos, "invalid float literal"))?;
                    Ok(self.expr(&pos, ExprKind::Double(value)))
                }
            }

            // Integer literals: no suffix means 32-bit signed; otherwise
            // the suffix selects width and signedness.
            Rule::integer_literal => {
                let value = parse_decimal(&node.children[0].text);
                let kind = match node.children.get(1) {
                    None => ExprKind::Integer(value as i32),
                    Some(suffix) => match suffix.text.as_str() {
                        "_b" => ExprKind::Byte(value as i8),
                        "_l" => ExprKind::Long(value),
                        "_u" => ExprKind::UnsignedInteger(value as u32),
                        "_ub" => ExprKind::UnsignedByte(value as u8),
                        "_ul" => ExprKind::UnsignedLong(value as u64),
                        _ => return Err(unimplemented(node)),
                    },
                };
                Ok(self.expr(&pos, kind))
            }

            // Hex literals: sized by digit count, always unsigned.
            Rule::hex_literal => {
                let digits = &node.text[2..];
                let value = parse_hex(digits);
                let kind = if digits.len() <= 8 {
                    ExprKind::UnsignedInteger(value as u32)
                } else {
                    ExprKind::UnsignedLong(value)
                };
                Ok(self.expr(&pos, kind))
            }

            Rule::boolean_literal => Ok(self.expr(&pos, ExprKind::Boolean(node.text == "true"))),
            Rule::nothing_literal => Ok(self.expr(&pos, ExprKind::Nothing)),

            // String literals keep their raw bytes; the quote style is
            // normalized away by this point.
            Rule::string_literal => {
                let raw = node.children[0].text.clone();
                Ok(self.expr(&pos, ExprKind::String(raw)))
            }

            Rule::identifier | Rule::fully_qualified | Rule::relative_identifier => {
                self.identifier(node)
            }

            Rule::symbol_name => {
                let name = node.children[0].text.clone();
                Ok(self.expr(&pos, ExprKind::Symbol(name)))
            }

            // Binary operators.
            Rule::add_operator => self.binop(node, BinaryOperator::Add),
            Rule::subtract_operator => self.binop(node, BinaryOperator::Subtract),
            Rule::multiply_operator => self.binop(node, BinaryOperator::Multiply),
            Rule::divide_operator => self.binop(node, BinaryOperator::Divide),
            Rule::modulus_operator => self.binop(node, BinaryOperator::Modulus),
            Rule::exponent_operator => self.binop(node, BinaryOperator::Exponent),
            Rule::left_shift_operator => self.binop(node, BinaryOperator::LeftShift),
            Rule::right_shift_operator => self.binop(node, BinaryOperator::RightShift),
            Rule::equals_operator => self.binop(node, BinaryOperator::Equals),
            Rule::not_equal_operator => self.binop(node, BinaryOperator::NotEqual),
            Rule::less_than_operator => self.binop(node, BinaryOperator::LessThan),
            Rule::greater_than_operator => self.binop(node, BinaryOperator::GreaterThan),
            Rule::less_equal_operator => self.binop(node, BinaryOperator::LessThanOrEqual),
            Rule::greater_equal_operator => self.binop(node, BinaryOperator::GreaterThanOrEqual),
            Rule::bitand_operator => self.binop(node, BinaryOperator::BitAnd),
            Rule::bitor_operator => self.binop(node, BinaryOperator::BitOr),
            Rule::bitxor_operator => self.binop(node, BinaryOperator::BitXor),
            Rule::kw_and => self.binop(node, BinaryOperator::BooleanAnd),
            Rule::kw_or => self.binop(node, BinaryOperator::BooleanOr),

            // Unary operators.
            Rule::coerce_operator => self.unary(node, UnaryOperator::Coerce),
            Rule::bitnot_operator => self.unary(node, UnaryOperator::BitNot),
            Rule::dereference_operator => self.unary(node, UnaryOperator::Dereference),
            Rule::unary_plus_operator => self.unary(node, UnaryOperator::Plus),
            Rule::unary_minus_operator => self.unary(node, UnaryOperator::Minus),
            Rule::kw_not => self.unary(node, UnaryOperator::BooleanNot),
            Rule::kw_ref => self.unary(node, UnaryOperator::Ref),
            Rule::kw_ptr => self.unary(node, UnaryOperator::Ptr),

            Rule::array_expression => {
                let items = self.expression_list(&node.children)?;
                Ok(self.expr(&pos, ExprKind::Array(items)))
            }
            Rule::list_expression => {
                let items = self.expression_list(&node.children)?;
                Ok(self.expr(&pos, ExprKind::List(items)))
            }
            Rule::tuple_expression => {
                let items = self.expression_list(&node.children)?;
                Ok(self.expr(&pos, ExprKind::Tuple(items)))
            }
            Rule::symbol_list_expression => {
                let symbols = node.children.iter().map(|c| c.text.clone()).collect();
                Ok(self.expr(&pos, ExprKind::SymbolList(symbols)))
            }
            Rule::dictionary_expression => {
                let mut entries = Vec::new();
                for child in &node.children {
                    entries.push(self.dictionary_entry(child)?);
                }
                Ok(self.expr(&pos, ExprKind::Dictionary(entries)))
            }

            // Member access: grammar order is `object . member`, but the
            // rotated node carries [member, object] and the AST keeps that
            // ordering.
            Rule::member_expr => {
                let member = self.identifier(&node.children[0])?;
                let object = self.expression(&node.children[1])?;
                Ok(self.expr(
                    &pos,
                    ExprKind::Member(MemberExpr {
                        member: Box::new(member),
                        object: Box::new(object),
                    }),
                ))
            }

            // Subscript: the rotated node carries [index, container]; the
            // swap back is intentional and part of the AST contract.
            Rule::subscript_expr => {
                let index = self.expression(&node.children[0])?;
                let container = self.expression(&node.children[1])?;
                Ok(self.expr(
                    &pos,
                    ExprKind::Subscript(SubscriptExpr {
                        container: Box::new(container),
                        index: Box::new(index),
                    }),
                ))
            }

            Rule::ternary_op => {
                let condition = self.expression(&node.children[0])?;
                let true_branch = self.expression(&node.children[1])?;
                let false_branch = self.expression(&node.children[2])?;
                Ok(self.expr(
                    &pos,
                    ExprKind::TernaryOp(TernaryExpr {
                        condition: Box::new(condition),
                        true_branch: Box::new(true_branch),
                        false_branch: Box::new(false_branch),
                    }),
                ))
            }

            Rule::kw_as => {
                let left = self.expression(&node.children[0])?;
                let right = self.typename(&node.children[1])?;
                Ok(self.expr(
                    &pos,
                    ExprKind::Cast(CastExpr {
                        left: Box::new(left),
                        right: Box::new(right),
                    }),
                ))
            }
            Rule::kw_is => {
                let left = self.expression(&node.children[0])?;
                let right = self.typename(&node.children[1])?;
                Ok(self.expr(
                    &pos,
                    ExprKind::TypeCheck(TypeCheckExpr {
                        left: Box::new(left),
                        right: Box::new(right),
                    }),
                ))
            }

            // Function calls: after rotation the argument-list match is the
            // first child and the called expression the second.
            Rule::function_call_expr => {
                let target = self.expression(&node.children[1])?;
                let arguments = self.call_arguments(&node.children[0])?;
                Ok(self.expr(
                    &pos,
                    ExprKind::Call(CallExpr {
                        target: Box::new(target),
                        arguments,
                    }),
                ))
            }

            Rule::predicate_call => self.predicate_call(node),

            // A complex typename called as a function.
            Rule::constructor_expression => {
                let typename = self.typename(&node.children[0])?;
                let arguments = self.call_arguments(&node.children[1].children[0])?;
                Ok(self.expr(
                    &pos,
                    ExprKind::Constructor(ConstructorExpr {
                        typename: Box::new(typename),
                        arguments,
                    }),
                ))
            }

            _ => Err(unimplemented(node)),
        }
    }

    /// Builder for the four case forms of the match statement.
    fn match_case(&mut self, node: &ParseNode) -> BuildResult<MatchCase> {
        match node.rule {
            Rule::default_case => Ok(MatchCase::Default {
                body: self.statement(&node.children[0])?,
            }),
            Rule::on_case => Ok(MatchCase::On {
                value: self.expression(&node.children[0])?,
                body: self.statement(&node.children[1])?,
            }),
            Rule::when_case => Ok(MatchCase::When {
                predicate: self.predicate_call(&node.children[0])?,
                body: self.statement(&node.children[1])?,
            }),
            Rule::type_case => {
                let assertion = &node.children[0];
                Ok(MatchCase::Type {
                    check: self.typename(&assertion.children[0])?,
                    body: self.statement(&node.children[1])?,
                })
            }
            _ => Err(unimplemented(node)),
        }
    }

    /// Builder for function definitions. The optional clauses may appear
    /// in any grammatically legal order, so this walks the children in a
    /// per-child switch.
    fn function_definition(
        &mut self,
        node: &ParseNode,
        kind: FunctionKind,
    ) -> BuildResult<Statement> {
        let mut name = String::new();
        let mut generics: Vec<GenericMatch> = Vec::new();
        let mut return_type = None;
        let mut arguments = None;
        let mut conditions = Vec::new();
        let mut body = None;

        for child in &node.children {
            match child.rule {
                Rule::function_name => {
                    name = child.text.clone();
                }
                Rule::generic_function_type => {
                    for gm in &child.children {
                        match gm.rule {
                            Rule::type_match => {
                                generics.push(GenericMatch::Type(self.type_pair(gm)?));
                            }
                            Rule::concept_match => {
                                generics.push(GenericMatch::Concept(ConceptMatch {
                                    id: self.fresh(),
                                    pos: gm.position.clone(),
                                    name: gm.children[0].text.clone(),
                                    concept_type: self.typename(&gm.children[1])?,
                                }));
                            }
                            _ => return Err(unimplemented(gm)),
                        }
                    }
                }
                Rule::return_type => {
                    return_type = Some(self.typename(&child.children[0])?);
                }
                Rule::arguments_list => {
                    let first = &child.children[0];
                    if first.is(Rule::wildcard_argument) {
                        // The wildcard argument stands in for any signature.
                        let wc_name = first.children[0].text.clone();
                        let name_expr = self.expr(
                            &first.position,
                            ExprKind::Identifier(WILDCARD_TYPENAME.into()),
                        );
                        let value = Typename {
                            id: self.fresh(),
                            pos: first.position.clone(),
                            kind: TypenameKind::Named {
                                name: Box::new(name_expr),
                                generic: None,
                                array: None,
                            },
                        };
                        arguments = Some(Arguments {
                            id: self.fresh(),
                            pos: child.position.clone(),
                            arguments: vec![TypePair {
                                id: self.fresh(),
                                pos: first.position.clone(),
                                name: wc_name,
                                value,
                            }],
                        });
                    } else {
                        let mut args = Vec::new();
                        for el in &child.children {
                            if el.is(Rule::type_match) {
                                args.push(self.type_pair(el)?);
                            } else {
                                return Err(unimplemented(el));
                            }
                        }
                        arguments = Some(Arguments {
                            id: self.fresh(),
                            pos: child.position.clone(),
                            arguments: args,
                        });
                    }
                }
                Rule::fn_with_block => {
                    if kind == FunctionKind::Unchecked {
                        return Err(syntax(
                            &child.position,
                            "unchecked functions cannot declare pre- or postconditions",
                        ));
                    }
                    for cond in &child.children {
                        let target = cond.children[0].text.clone();
                        let fn_ident = self.identifier(&cond.children[1])?;
                        let mut args = Vec::new();
                        if let Some(list) = cond.children.get(2) {
                            for a in &list.children {
                                args.push(self.expression(a)?);
                            }
                        }
                        let predicate = self.expr(
                            &cond.position,
                            ExprKind::PredicateCall(PredicateCallExpr {
                                target: Box::new(fn_ident),
                                arguments: args,
                            }),
                        );
                        conditions.push(Condition {
                            id: self.fresh(),
                            pos: cond.position.clone(),
                            target,
                            predicate,
                        });
                    }
                }
                // Anything else is the function body.
                _ => {
                    body = Some(self.statement(child)?);
                }
            }
        }

        let body = body.ok_or_else(|| syntax(&node.position, "function definition has no body"))?;
        let def = FunctionDef {
            kind,
            name,
            return_type,
            arguments,
            conditions,
            body: Box::new(body),
        };

        let stmt_kind = if generics.is_empty() {
            StmtKind::Def(def)
        } else {
            StmtKind::GenericDef(GenericFunctionDef { def, generics })
        };
        Ok(self.stmt(&node.position, stmt_kind))
    }

    /// Builder for a concept definition's check list.
    fn concept_check(&mut self, node: &ParseNode) -> BuildResult<ConceptCheck> {
        match node.rule {
            Rule::concept_member_check => Ok(ConceptCheck::Member(MemberCheck {
                id: self.fresh(),
                pos: node.position.clone(),
                type_name: node.children[0].text.clone(),
                member: node.children[1].text.clone(),
            })),
            Rule::concept_function_check => {
                let fn_name_node = &node.children[1];
                let mut function_name = self.identifier(&fn_name_node.children[0])?;
                // Fold a predicate/operator/unchecked suffix into the name.
                if let Some(suffix) = fn_name_node.children.get(1) {
                    if let ExprKind::Identifier(name) = &mut function_name.kind {
                        name.push_str(&suffix.text);
                    }
                }

                let generic = &node.children[2];
                let generic_arg = self.typename(&generic.children[0])?;
                let return_type_name = self.typename(&node.children[3])?;

                Ok(ConceptCheck::Function(FunctionCheck {
                    id: self.fresh(),
                    pos: node.position.clone(),
                    type_name: node.children[0].text.clone(),
                    function_name: Box::new(function_name),
                    function_arguments: vec![generic_arg],
                    return_type_name,
                }))
            }
            _ => Err(unimplemented(node)),
        }
    }

    /// Builder for statements.
    pub fn statement(&mut self, node: &ParseNode) -> BuildResult<Statement> {
        let pos = node.position.clone();

        match node.rule {
            Rule::bare_expression => {
                let e = self.expression(&node.children[0])?;
                Ok(self.stmt(&pos, StmtKind::BareExpression(e)))
            }

            Rule::statement_block => {
                let mut stmts = Vec::new();
                for child in &node.children {
                    stmts.push(self.statement(child)?);
                }
                Ok(self.stmt(&pos, StmtKind::Block(stmts)))
            }

            // `var x = y * z;`. The LHS has to be in the local scope, so a
            // plain identifier suffices.
            Rule::variable_declaration => {
                let lhs_pos = node.children[0].position.clone();
                let lhs = self.expr(&lhs_pos, ExprKind::Identifier(node.children[0].text.clone()));
                let rhs = self.expression(&node.children[1])?;
                Ok(self.stmt(&pos, StmtKind::Variable(BindingStmt { lhs, rhs })))
            }

            // `var x as y;`
            Rule::declaration_as_type => {
                let lhs_pos = node.children[0].position.clone();
                let lhs = self.expr(&lhs_pos, ExprKind::Identifier(node.children[0].text.clone()));
                let rhs = self.typename(&node.children[1])?;
                Ok(self.stmt(&pos, StmtKind::TypeDeclaration(TypeDeclStmt { lhs, rhs })))
            }

            // `const bar = 42;`
            Rule::constant_declaration => {
                let lhs_pos = node.children[0].position.clone();
                let lhs = self.expr(&lhs_pos, ExprKind::Identifier(node.children[0].text.clone()));
                let rhs = self.expression(&node.children[1])?;
                Ok(self.stmt(&pos, StmtKind::Constant(BindingStmt { lhs, rhs })))
            }

            // `foo = bar ** 2;`. The LHS may be any place expression.
            Rule::assignment => {
                let lhs = self.expression(&node.children[0])?;
                let rhs = self.expression(&node.children[1])?;
                Ok(self.stmt(&pos, StmtKind::Assign(AssignStmt { lhs, rhs })))
            }

            // `i -= 1;`
            Rule::compound_assignment => {
                let lhs = self.expression(&node.children[0])?;
                let op = assignment_operator_kind(&node.children[1])?;
                let rhs = self.expression(&node.children[2])?;
                Ok(self.stmt(&pos, StmtKind::CompoundAssign(CompoundAssignStmt { lhs, op, rhs })))
            }

            // `type En = @{a,b,c};`
            Rule::enum_declaration => {
                let name = node.children[0].text.clone();
                let values = node.children[1]
                    .children
                    .iter()
                    .map(|c| c.text.clone())
                    .collect();
                Ok(self.stmt(&pos, StmtKind::Enum(EnumStmt { name, values })))
            }

            // `type Person = { name: string, age: integer };`
            Rule::structure_declaration => {
                let name = node.children[0].text.clone();
                let mut fields = Vec::new();
                for child in &node.children[1..] {
                    fields.push(self.type_pair(child)?);
                }
                Ok(self.stmt(&pos, StmtKind::Structure(StructureStmt { name, fields })))
            }

            // `type A = B;`
            Rule::type_alias => {
                let name = node.children[0].text.clone();
                let original = self.typename(&node.children[1])?;
                Ok(self.stmt(&pos, StmtKind::Alias(AliasStmt { name, original })))
            }

            Rule::do_statement => {
                let e = self.expression(&node.children[0])?;
                Ok(self.stmt(&pos, StmtKind::Do(e)))
            }

            Rule::if_statement => {
                let condition = self.expression(&node.children[0])?;
                let then_case = Some(Box::new(self.statement(&node.children[1])?));
                let else_case = match node.children.get(2) {
                    Some(child) => Some(Box::new(self.statement(child)?)),
                    None => None,
                };
                Ok(self.stmt(
                    &pos,
                    StmtKind::If(IfStmt {
                        condition,
                        then_case,
                        else_case,
                    }),
                ))
            }

            // An `unless` is an `if` with a null then-branch.
            Rule::unless_statement => {
                let condition = self.expression(&node.children[0])?;
                let else_case = Some(Box::new(self.statement(&node.children[1])?));
                Ok(self.stmt(
                    &pos,
                    StmtKind::If(IfStmt {
                        condition,
                        then_case: None,
                        else_case,
                    }),
                ))
            }

            Rule::while_statement => {
                let condition = self.expression(&node.children[0])?;
                let body = Box::new(self.statement(&node.children[1])?);
                Ok(self.stmt(&pos, StmtKind::While(WhileStmt { condition, body })))
            }

            Rule::for_statement => {
                let index = node.children[0].text.clone();
                let range = self.expression(&node.children[1])?;
                let body = Box::new(self.statement(&node.children[2])?);
                Ok(self.stmt(&pos, StmtKind::For(ForStmt { index, range, body })))
            }

            Rule::break_statement => Ok(self.stmt(&pos, StmtKind::Break)),
            Rule::continue_statement => Ok(self.stmt(&pos, StmtKind::Continue)),

            // `with (foo.is_bar?) { do baz; }`
            Rule::with_statement => {
                let mut predicates = Vec::new();
                for child in &node.children[0].children {
                    predicates.push(self.predicate_call(child)?);
                }
                let body = Box::new(self.statement(&node.children[1])?);
                Ok(self.stmt(&pos, StmtKind::With(WithStmt { predicates, body })))
            }

            Rule::match_on_statement
            | Rule::match_when_statement
            | Rule::match_type_statement => {
                let target = self.expression(&node.children[0])?;
                let mut cases = Vec::new();
                for child in &node.children[1..] {
                    cases.push(self.match_case(child)?);
                }
                Ok(self.stmt(&pos, StmtKind::Match(MatchStmt { target, cases })))
            }

            Rule::throw_statement => {
                let e = self.expression(&node.children[0])?;
                Ok(self.stmt(&pos, StmtKind::Throw(e)))
            }

            Rule::try_statement => {
                let body = Box::new(self.statement(&node.children[0])?);
                let mut catches = Vec::new();
                let mut finally = None;
                for child in &node.children[1..] {
                    match child.rule {
                        Rule::catch_statement => {
                            catches.push(CatchClause {
                                id: self.fresh(),
                                pos: child.position.clone(),
                                catch_type: self.type_pair(&child.children[0])?,
                                body: self.statement(&child.children[1])?,
                            });
                        }
                        Rule::finally_statement => {
                            finally = Some(Box::new(self.statement(&child.children[0])?));
                        }
                        _ => return Err(unimplemented(child)),
                    }
                }
                Ok(self.stmt(
                    &pos,
                    StmtKind::Try(TryStmt {
                        body,
                        catches,
                        finally,
                    }),
                ))
            }

            Rule::basic_function_def => self.function_definition(node, FunctionKind::Basic),
            Rule::unchecked_function_def => self.function_definition(node, FunctionKind::Unchecked),
            Rule::predicate_function_def => self.function_definition(node, FunctionKind::Predicate),
            Rule::operator_function_def => self.function_definition(node, FunctionKind::Operator),

            Rule::concept_definition => {
                let name = node.children[0].text.clone();
                let generic = node.children[1].children[0].text.clone();
                let mut checks = Vec::new();
                for child in &node.children[2..] {
                    checks.push(self.concept_check(child)?);
                }
                Ok(self.stmt(
                    &pos,
                    StmtKind::ConceptDef(ConceptDef {
                        name,
                        generic,
                        checks,
                    }),
                ))
            }

            Rule::return_statement => {
                let e = self.expression(&node.children[0])?;
                Ok(self.stmt(&pos, StmtKind::Return(e)))
            }

            Rule::extern_declaration => {
                Ok(self.stmt(&pos, StmtKind::Extern(node.children[0].text.clone())))
            }

            Rule::module_statement => {
                let name = self.module_name(&node.children[0])?;
                Ok(self.stmt(&pos, StmtKind::ModuleDef(name)))
            }

            Rule::use_statement => {
                let name = self.module_name(&node.children[0])?;
                Ok(self.stmt(&pos, StmtKind::Use(name)))
            }

            // `import { foo } from bar;`
            Rule::import_statement => {
                let imports = node.children[0]
                    .children
                    .iter()
                    .map(|c| c.text.clone())
                    .collect();
                let module = self.module_name(&node.children[1])?;
                Ok(self.stmt(&pos, StmtKind::Import(ImportStmt { module, imports })))
            }

            // `export { foo, bar };`
            Rule::export_statement => {
                let names = node.children[0]
                    .children
                    .iter()
                    .map(|c| c.text.clone())
                    .collect();
                Ok(self.stmt(&pos, StmtKind::Export(names)))
            }

            _ => Err(unimplemented(node)),
        }
    }

    /// Builder for top-level structures. A leading `module X;` statement
    /// makes the unit a module; otherwise it is a program.
    pub fn unit(&mut self, node: &ParseNode) -> BuildResult<Unit> {
        if !node.is(Rule::program) {
            return Err(unimplemented(node));
        }

        let mut children = Vec::new();
        for child in &node.children {
            children.push(self.statement(child)?);
        }

        let is_module = matches!(
            children.first(),
            Some(Statement {
                kind: StmtKind::ModuleDef(_),
                ..
            })
        );

        let id = self.fresh();
        let pos = node.position.clone();
        if is_module {
            Ok(Unit::Module(ModuleNode { id, pos, children }))
        } else {
            Ok(Unit::Program(ProgramNode { id, pos, children }))
        }
    }
}

/// Map a parse node's rule to the compound-assignment operator kind.
fn assignment_operator_kind(node: &ParseNode) -> BuildResult<AssignOperator> {
    match node.rule {
        Rule::add_operator => Ok(AssignOperator::Add),
        Rule::subtract_operator => Ok(AssignOperator::Subtract),
        Rule::multiply_operator => Ok(AssignOperator::Multiply),
        Rule::divide_operator => Ok(AssignOperator::Divide),
        Rule::modulus_operator => Ok(AssignOperator::Modulus),
        Rule::exponent_operator => Ok(AssignOperator::Exponent),
        Rule::left_shift_operator => Ok(AssignOperator::LeftShift),
        Rule::right_shift_operator => Ok(AssignOperator::RightShift),
        Rule::bitand_operator => Ok(AssignOperator::BitAnd),
        Rule::bitor_operator => Ok(AssignOperator::BitOr),
        Rule::bitxor_operator => Ok(AssignOperator::BitXor),
        _ => Err(BuildError::UnimplementedTag { tag: node.name() }),
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse_statement, parse_unit};

    fn stmt_string(source: &str) -> String {
        parse_statement(source, "test")
            .unwrap_or_else(|e| panic!("{}: {}", source, e))
            .to_string()
    }

    #[test]
    fn test_builder_bare_expression() {
        assert_eq!(stmt_string("1.23;"), "(BareExpression,(FloatingPoint,1.23,3))");
    }

    #[test]
    fn test_builder_fully_qualified_expression() {
        assert_eq!(
            stmt_string("foo:bar:baz;"),
            "(BareExpression,(FullyQualified,foo,bar,baz))"
        );
    }

    #[test]
    fn test_builder_relative_identifier_expression() {
        assert_eq!(
            stmt_string(":foo:bar;"),
            "(BareExpression,(RelativeIdentifier,foo,bar))"
        );
    }

    #[test]
    fn test_builder_binop_expression() {
        assert_eq!(
            stmt_string("42 + 24;"),
            "(BareExpression,(BinaryOp,0,(Integral,42,0),(Integral,24,0)))"
        );
    }

    #[test]
    fn test_builder_unaryop_expression() {
        assert_eq!(stmt_string("not x;"), "(BareExpression,(UnaryOp,2,(Identifier,x)))");
    }

    #[test]
    fn test_builder_literal_expressions() {
        assert_eq!(stmt_string("true;"), "(BareExpression,(Boolean,true))");
        assert_eq!(stmt_string("nothing;"), "(BareExpression,(Nothing))");
        assert_eq!(stmt_string("@foo;"), "(BareExpression,(Symbol,foo))");
        assert_eq!(stmt_string("0x1234;"), "(BareExpression,(Integral,4660,5))");
        assert_eq!(
            stmt_string("0x0000111122223333;"),
            "(BareExpression,(Integral,18765284782899,7))"
        );
        assert_eq!(stmt_string("\"abc\";"), "(BareExpression,(String,\"abc\"))");
    }

    #[test]
    fn test_builder_integer_suffixes() {
        assert_eq!(stmt_string("7_b;"), "(BareExpression,(Integral,7,1))");
        assert_eq!(stmt_string("7_l;"), "(BareExpression,(Integral,7,4))");
        assert_eq!(stmt_string("7_u;"), "(BareExpression,(Integral,7,5))");
        assert_eq!(stmt_string("7_ub;"), "(BareExpression,(Integral,7,6))");
        assert_eq!(stmt_string("7_ul;"), "(BareExpression,(Integral,7,7))");
    }

    #[test]
    fn test_builder_float_suffix() {
        assert_eq!(stmt_string("1.5_f;"), "(BareExpression,(FloatingPoint,1.5,2))");
    }

    #[test]
    fn test_builder_containers() {
        assert_eq!(
            stmt_string("[1, 2, 3];"),
            "(BareExpression,(Array,(Integral,1,0),(Integral,2,0),(Integral,3,0)))"
        );
        assert_eq!(
            stmt_string("(1, 2, 3);"),
            "(BareExpression,(List,(Integral,1,0),(Integral,2,0),(Integral,3,0)))"
        );
        assert_eq!(
            stmt_string("{1, 2, 3};"),
            "(BareExpression,(Tuple,(Integral,1,0),(Integral,2,0),(Integral,3,0)))"
        );
        assert_eq!(
            stmt_string("@{a, b, c};"),
            "(BareExpression,(SymbolList,(Symbol,a),(Symbol,b),(Symbol,c)))"
        );
    }

    #[test]
    fn test_builder_dictionary() {
        assert_eq!(
            stmt_string("{@a: 1, @b: 2};"),
            "(BareExpression,(Dictionary,(DictionaryEntry,(Symbol,a),(Integral,1,0)),(DictionaryEntry,(Symbol,b),(Integral,2,0))))"
        );
    }

    #[test]
    fn test_builder_invalid_dictionary_key() {
        assert!(parse_statement("{1.5: 1};", "test").is_err());
    }

    #[test]
    fn test_builder_member_expression() {
        assert_eq!(
            stmt_string("x.y;"),
            "(BareExpression,(Member,(Identifier,y),(Identifier,x)))"
        );
    }

    #[test]
    fn test_builder_subscript_expression() {
        assert_eq!(
            stmt_string("x[y];"),
            "(BareExpression,(Subscript,(Identifier,x),(Identifier,y)))"
        );
    }

    #[test]
    fn test_builder_ternary_expression() {
        assert_eq!(
            stmt_string("(if a then b else c);"),
            "(BareExpression,(TernaryOp,(Identifier,a),(Identifier,b),(Identifier,c)))"
        );
    }

    #[test]
    fn test_builder_cast_and_typecheck() {
        assert_eq!(
            stmt_string("x as long;"),
            "(BareExpression,(Cast,(Identifier,x),(Typename,(Identifier,long),null,null)))"
        );
        assert_eq!(
            stmt_string("x is long;"),
            "(BareExpression,(TypeCheck,(Identifier,x),(Typename,(Identifier,long),null,null)))"
        );
    }

    #[test]
    fn test_builder_calls() {
        assert_eq!(stmt_string("f();"), "(BareExpression,(Call,(Identifier,f)))");
        assert_eq!(
            stmt_string("f(1, 2);"),
            "(BareExpression,(Call,(Identifier,f),(Integral,1,0),(Integral,2,0)))"
        );
        assert_eq!(
            stmt_string("f(a: 1, b: 2);"),
            "(BareExpression,(Call,(Identifier,f),(NamedArgument,a,(Integral,1,0)),(NamedArgument,b,(Integral,2,0))))"
        );
    }

    #[test]
    fn test_builder_mixed_call_arguments_rejected() {
        assert!(parse_statement("f(a: 1, 2);", "test").is_err());
    }

    #[test]
    fn test_builder_variable_and_constant() {
        assert_eq!(
            stmt_string("var x = y * z;"),
            "(Variable,(Identifier,x),(BinaryOp,2,(Identifier,y),(Identifier,z)))"
        );
        assert_eq!(
            stmt_string("const x = 42;"),
            "(Constant,(Identifier,x),(Integral,42,0))"
        );
    }

    #[test]
    fn test_builder_assignment() {
        assert_eq!(
            stmt_string("foo = bar ** 2;"),
            "(Assign,(Identifier,foo),(BinaryOp,5,(Identifier,bar),(Integral,2,0)))"
        );
        assert_eq!(
            stmt_string("i -= 1;"),
            "(CompoundAssign,(Identifier,i),(Integral,1,0),1)"
        );
    }

    #[test]
    fn test_builder_enum_and_structure() {
        assert_eq!(
            stmt_string("type En = @{a,b,c};"),
            "(Enum,(Identifier,En),(SymbolList,(Symbol,a),(Symbol,b),(Symbol,c)))"
        );
        assert_eq!(
            stmt_string("type Person = { name: string, age: integer };"),
            "(Structure,(Identifier,Person),(TypePair,name,(Typename,(Identifier,string),null,null)),(TypePair,age,(Typename,(Identifier,integer),null,null)))"
        );
    }

    #[test]
    fn test_builder_control_statements() {
        assert_eq!(stmt_string("do foo;"), "(Do,(Identifier,foo))");
        assert_eq!(
            stmt_string("{do foo; do bar;}"),
            "(Block,(Do,(Identifier,foo)),(Do,(Identifier,bar)))"
        );
        assert_eq!(
            stmt_string("if x do foo;"),
            "(If,(Identifier,x),(Do,(Identifier,foo)),null)"
        );
        assert_eq!(
            stmt_string("if y do foo; else do bar;"),
            "(If,(Identifier,y),(Do,(Identifier,foo)),(Do,(Identifier,bar)))"
        );
        assert_eq!(
            stmt_string("unless foo do foo;"),
            "(If,(Identifier,foo),null,(Do,(Identifier,foo)))"
        );
        assert_eq!(
            stmt_string("while (x < 10) { x += 1; }"),
            "(While,(BinaryOp,10,(Identifier,x),(Integral,10,0)),(Block,(CompoundAssign,(Identifier,x),(Integral,1,0),0)))"
        );
        assert_eq!(
            stmt_string("for i in range { do foo; }"),
            "(For,i,(Identifier,range),(Block,(Do,(Identifier,foo))))"
        );
        assert_eq!(stmt_string("{ break; continue; }"), "(Block,(Break),(Continue))");
    }

    #[test]
    fn test_builder_return_and_extern() {
        assert_eq!(stmt_string("return false;"), "(Return,(Boolean,false))");
        assert_eq!(stmt_string("extern foo;"), "(Extern,foo)");
    }

    #[test]
    fn test_builder_type_declarations() {
        assert_eq!(
            stmt_string("var x as y;"),
            "(TypeDeclaration,(Identifier,x),(Typename,(Identifier,y),null,null))"
        );
        assert_eq!(
            stmt_string("var x as foo:bar:baz;"),
            "(TypeDeclaration,(Identifier,x),(Typename,(FullyQualified,foo,bar,baz),null,null))"
        );
        assert_eq!(
            stmt_string("var x as list<string>;"),
            "(TypeDeclaration,(Identifier,x),(Typename,(Identifier,list),(GenericTypename,(Typename,(Identifier,string),null,null)),null))"
        );
        assert_eq!(
            stmt_string("var x as byte[16];"),
            "(TypeDeclaration,(Identifier,x),(Typename,(Identifier,byte),null,(ArrayTypename,(Integral,16,0))))"
        );
        assert_eq!(
            stmt_string("var x as list<string>[10];"),
            "(TypeDeclaration,(Identifier,x),(Typename,(Identifier,list),(GenericTypename,(Typename,(Identifier,string),null,null)),(ArrayTypename,(Integral,10,0))))"
        );
        assert_eq!(
            stmt_string("var x as byte[256][16];"),
            "(TypeDeclaration,(Identifier,x),(Typename,(Identifier,byte),null,(ArrayTypename,(Integral,256,0),(Integral,16,0))))"
        );
    }

    #[test]
    fn test_builder_variant_and_optional_types() {
        assert_eq!(
            stmt_string("var x as |integer, string|;"),
            "(TypeDeclaration,(Identifier,x),(Variant,(Typename,(Identifier,integer),null,null),(Typename,(Identifier,string),null,null)))"
        );
        assert_eq!(
            stmt_string("var x as |integer|?;"),
            "(TypeDeclaration,(Identifier,x),(Optional,(Typename,(Identifier,integer),null,null)))"
        );
    }

    #[test]
    fn test_builder_function_definitions() {
        assert_eq!(
            stmt_string("def f = { return true; }"),
            "(Def,0,f,null,null,(Conditions),(Block,(Return,(Boolean,true))))"
        );
        assert_eq!(
            stmt_string("def f [boolean] = { return true; }"),
            "(Def,0,f,(Typename,(Identifier,boolean),null,null),null,(Conditions),(Block,(Return,(Boolean,true))))"
        );
        assert_eq!(
            stmt_string("def f { t: T } = { return true; }"),
            "(Def,0,f,null,(Arguments,(TypePair,t,(Typename,(Identifier,T),null,null))),(Conditions),(Block,(Return,(Boolean,true))))"
        );
        assert_eq!(
            stmt_string("def f { t: T } with { t.p? } = { return true; }"),
            "(Def,0,f,null,(Arguments,(TypePair,t,(Typename,(Identifier,T),null,null))),(Conditions,(Condition,t,(PredicateCall,(Identifier,p)))),(Block,(Return,(Boolean,true))))"
        );
        assert_eq!(
            stmt_string("def f { t: T } with { t.p(42)? } = { return true; }"),
            "(Def,0,f,null,(Arguments,(TypePair,t,(Typename,(Identifier,T),null,null))),(Conditions,(Condition,t,(PredicateCall,(Identifier,p),(Integral,42,0)))),(Block,(Return,(Boolean,true))))"
        );
        assert_eq!(
            stmt_string("def f { t: * } = { return true; }"),
            "(Def,0,f,null,(Arguments,(TypePair,t,(Typename,(Identifier,$$wildcard$$),null,null))),(Conditions),(Block,(Return,(Boolean,true))))"
        );
    }

    #[test]
    fn test_builder_function_kinds() {
        assert!(stmt_string("def p? = { return true; }").starts_with("(Def,1,p,"));
        assert!(stmt_string("def o$ = { return true; }").starts_with("(Def,2,o,"));
        assert!(stmt_string("def u! = { return true; }").starts_with("(Def,3,u,"));
    }

    #[test]
    fn test_builder_unchecked_conditions_rejected() {
        assert!(parse_statement("def u! with { t.p? } = { return true; }", "test").is_err());
    }

    #[test]
    fn test_builder_generic_definition() {
        assert_eq!(
            stmt_string("def f <t: T> = { return true; }"),
            "(Def,0,f,(GenericTypes,(TypePair,t,(Typename,(Identifier,T),null,null))),null,null,(Conditions),(Block,(Return,(Boolean,true))))"
        );
        assert_eq!(
            stmt_string("def f <c ~> Comparable> = { return true; }"),
            "(Def,0,f,(GenericTypes,(ConceptMatch,c,(Typename,(Identifier,Comparable),null,null))),null,null,(Conditions),(Block,(Return,(Boolean,true))))"
        );
    }

    #[test]
    fn test_builder_match_statements() {
        assert_eq!(
            stmt_string("match x { on 1: do a; default: do b; }"),
            "(Match,(Identifier,x),(On,(Integral,1,0),(Do,(Identifier,a))),(Default,(Do,(Identifier,b))))"
        );
        assert_eq!(
            stmt_string("match x { when empty?: do a; }"),
            "(Match,(Identifier,x),(When,(PredicateCall,(Identifier,empty)),(Do,(Identifier,a))))"
        );
        assert_eq!(
            stmt_string("match x { type integer: do a; }"),
            "(Match,(Identifier,x),(TypeCase,(Typename,(Identifier,integer),null,null),(Do,(Identifier,a))))"
        );
    }

    #[test]
    fn test_builder_with_statement() {
        assert_eq!(
            stmt_string("with (foo.is_bar?) { do baz; }"),
            "(With,(PredicateCall,(Identifier,is_bar),(Identifier,foo)),(Block,(Do,(Identifier,baz))))"
        );
    }

    #[test]
    fn test_builder_exceptions() {
        assert_eq!(stmt_string("throw e;"), "(Throw,(Identifier,e))");
        assert_eq!(
            stmt_string("try do a; catch { e: Error } do b;"),
            "(Try,(Do,(Identifier,a)),(Catch,(TypePair,e,(Typename,(Identifier,Error),null,null)),(Do,(Identifier,b))),null)"
        );
        assert_eq!(
            stmt_string("try do a; finally do c;"),
            "(Try,(Do,(Identifier,a)),(Finally,(Do,(Identifier,c))))"
        );
    }

    #[test]
    fn test_builder_modules() {
        assert_eq!(stmt_string("use foo;"), "(Use,(ModuleName,foo))");
        assert_eq!(stmt_string("use :relative_id;"), "(Use,(ModuleName,:relative_id))");
        assert_eq!(stmt_string("use foo:bar:baz;"), "(Use,(ModuleName,foo:bar:baz))");
        assert_eq!(stmt_string("module my_module;"), "(ModuleDef,(ModuleName,my_module))");
        assert_eq!(
            stmt_string("module org:example:my_module;"),
            "(ModuleDef,(ModuleName,org:example:my_module))"
        );
        assert_eq!(
            stmt_string("import { foo, bar } from my_module;"),
            "(Import,(ModuleName,my_module),(Identifier,foo),(Identifier,bar))"
        );
        assert_eq!(
            stmt_string("export { foo, bar };"),
            "(Export,(Identifier,foo),(Identifier,bar))"
        );
    }

    #[test]
    fn test_builder_concept_definition() {
        assert_eq!(
            stmt_string("concept Stringy <T> = { T .= data, T => size<T> -> integer }"),
            "(Concept,Stringy,T,(MemberCheck,T,data),(FunctionCheck,T,(Identifier,size),(Typename,(Identifier,integer),null,null),(Typename,(Identifier,T),null,null)))"
        );
    }

    #[test]
    fn test_builder_program() {
        let unit = parse_unit("def main = { return true; }", "test").unwrap();
        assert_eq!(
            unit.to_string(),
            "(Program,(Def,0,main,null,null,(Conditions),(Block,(Return,(Boolean,true)))))"
        );
    }

    #[test]
    fn test_builder_module_unit() {
        let unit = parse_unit("module m; def main = { return true; }", "test").unwrap();
        assert!(unit.to_string().starts_with("(Module,(ModuleDef,(ModuleName,m)),"));
    }

    #[test]
    fn test_builder_precedence() {
        assert_eq!(
            stmt_string("a + b * c;"),
            "(BareExpression,(BinaryOp,0,(Identifier,a),(BinaryOp,2,(Identifier,b),(Identifier,c))))"
        );
        assert_eq!(
            stmt_string("a ** b ** c;"),
            "(BareExpression,(BinaryOp,5,(Identifier,a),(BinaryOp,5,(Identifier,b),(Identifier,c))))"
        );
    }

    #[test]
    fn test_builder_positions() {
        let stmt = parse_statement("do foo;", "unit_test").unwrap();
        assert_eq!(stmt.pos.source, "unit_test");
        assert_eq!(stmt.pos.line, 1);
        assert_eq!(stmt.pos.column, 1);
    }

    #[test]
    fn test_builder_determinism() {
        let a = stmt_string("var x = y * z + f(1).m[2];");
        let b = stmt_string("var x = y * z + f(1).m[2];");
        assert_eq!(a, b);
    }
}
