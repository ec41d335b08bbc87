//! rheac-par - AST node definitions.
//!
//! The semantic tree, stripped of grammar scaffolding. Two top categories,
//! [`Expression`] and [`Statement`], wrap closed sums of node kinds; every
//! node owns its children, carries a [`NodeId`] (the key into the inference
//! table) and a [`SourcePosition`] propagated from the parse tree.
//!
//! Each node also has a canonical S-expression rendering, exposed through
//! `Display`. That format is a stable public contract: golden tests, the
//! driver's `ast` subtool, and downstream passes all depend on the exact
//! spelling, including the integer codes of the operator and type enums.

use std::fmt;

use rheac_util::SourcePosition;

/// Identity of an AST node, unique within one compilation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// The basic literal types Rhea understands.
///
/// The integer codes are part of the printed-AST contract and must not be
/// reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicType {
    Unknown = -1,
    Integer = 0,
    Byte = 1,
    Float = 2,
    Double = 3,
    Long = 4,
    UnsignedInteger = 5,
    UnsignedByte = 6,
    UnsignedLong = 7,
    Boolean = 8,
    String = 9,
    Symbol = 10,
    Any = 11,
    Nothing = 12,
    /// Structures, user-defined types, generics
    Other = 13,
    /// Produced by the coercion operator `^`, resolved by the consumer
    Promoted = 14,
}

/// Binary operators, in stable source order (Add = 0 .. BooleanOr = 18).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    Exponent,
    LeftShift,
    RightShift,
    Equals,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    BitAnd,
    BitOr,
    BitXor,
    BooleanAnd,
    BooleanOr,
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
    BooleanNot,
    BitNot,
    Coerce,
    Dereference,
    Ref,
    Ptr,
}

/// The operators available for compound assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    Exponent,
    LeftShift,
    RightShift,
    BitAnd,
    BitOr,
    BitXor,
}

/// The four surface kinds of function definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// No suffix
    Basic = 0,
    /// `?` suffix, implied boolean return
    Predicate = 1,
    /// `$` suffix, called implicitly by operators
    Operator = 2,
    /// `!` suffix, no conditions, unmangled (FFI-visible)
    Unchecked = 3,
}

/// The reserved typename produced by the wildcard argument `{ name: * }`.
pub const WILDCARD_TYPENAME: &str = "$$wildcard$$";

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// An expression node: identity, position, and the kind sum.
#[derive(Debug)]
pub struct Expression {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub kind: ExprKind,
}

/// The closed sum of expression kinds.
#[derive(Debug)]
pub enum ExprKind {
    // Literals. Integral widths are fixed at build time; overflow has
    // already been truncated to the target width.
    Integer(i32),
    Byte(i8),
    Long(i64),
    UnsignedInteger(u32),
    UnsignedByte(u8),
    UnsignedLong(u64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    /// Raw string bytes, escapes included; un-escaping is codegen's job
    String(String),
    Symbol(String),
    Nothing,

    Identifier(String),
    FullyQualified(Vec<String>),
    /// Wraps a simple or fully-qualified identifier
    RelativeIdentifier(Box<Expression>),

    BinaryOp(BinaryExpr),
    UnaryOp(UnaryExpr),
    TernaryOp(TernaryExpr),
    Member(MemberExpr),
    Subscript(SubscriptExpr),
    Cast(CastExpr),
    TypeCheck(TypeCheckExpr),

    Array(Vec<Expression>),
    List(Vec<Expression>),
    Tuple(Vec<Expression>),
    SymbolList(Vec<String>),
    Dictionary(Vec<DictionaryEntry>),

    Call(CallExpr),
    PredicateCall(PredicateCallExpr),
    Constructor(ConstructorExpr),
}

/// Binary operation
#[derive(Debug)]
pub struct BinaryExpr {
    pub op: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

/// Unary prefix operation
#[derive(Debug)]
pub struct UnaryExpr {
    pub op: UnaryOperator,
    pub operand: Box<Expression>,
}

/// The if-then-else *expression*
#[derive(Debug)]
pub struct TernaryExpr {
    pub condition: Box<Expression>,
    pub true_branch: Box<Expression>,
    pub false_branch: Box<Expression>,
}

/// Member access `object.member`. The member comes first; the ordering is
/// part of the AST contract.
#[derive(Debug)]
pub struct MemberExpr {
    pub member: Box<Expression>,
    pub object: Box<Expression>,
}

/// Subscript `container[index]`
#[derive(Debug)]
pub struct SubscriptExpr {
    pub container: Box<Expression>,
    pub index: Box<Expression>,
}

/// The typecasting operator `as`
#[derive(Debug)]
pub struct CastExpr {
    pub left: Box<Expression>,
    pub right: Box<Typename>,
}

/// The type check operator `is`
#[derive(Debug)]
pub struct TypeCheckExpr {
    pub left: Box<Expression>,
    pub right: Box<Typename>,
}

/// Dictionary keys are restricted to integral, string, and symbol literals.
#[derive(Debug)]
pub enum DictionaryKey {
    Integer(i32),
    Byte(i8),
    Long(i64),
    UnsignedInteger(u32),
    UnsignedByte(u8),
    UnsignedLong(u64),
    String(String),
    Symbol(String),
}

/// One `key: value` entry of a dictionary expression
#[derive(Debug)]
pub struct DictionaryEntry {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub key: DictionaryKey,
    pub value: Expression,
}

/// A named argument in a call: `f(a: 1)`
#[derive(Debug)]
pub struct NamedArgument {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub name: String,
    pub value: Expression,
}

/// Calls take positional *or* named arguments, never both.
#[derive(Debug)]
pub enum CallArgument {
    Positional(Expression),
    Named(NamedArgument),
}

/// Function call
#[derive(Debug)]
pub struct CallExpr {
    pub target: Box<Expression>,
    pub arguments: Vec<CallArgument>,
}

/// Call to a predicate function: `expr.name(args)?`
#[derive(Debug)]
pub struct PredicateCallExpr {
    pub target: Box<Expression>,
    pub arguments: Vec<Expression>,
}

/// A constructor expression: a complex typename called as a function,
/// which invokes the type's `new$` operator.
#[derive(Debug)]
pub struct ConstructorExpr {
    pub typename: Box<Typename>,
    pub arguments: Vec<CallArgument>,
}

// ---------------------------------------------------------------------------
// Typenames
// ---------------------------------------------------------------------------

/// A type expression node.
#[derive(Debug)]
pub struct Typename {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub kind: TypenameKind,
}

/// The closed sum of typename kinds.
#[derive(Debug)]
pub enum TypenameKind {
    /// `name`, with optional generic arguments and array dimensions
    Named {
        name: Box<Expression>,
        generic: Option<GenericTypename>,
        array: Option<ArrayTypename>,
    },
    /// `|A,B,C|`
    Variant(Vec<Typename>),
    /// `|T|?`
    Optional(Box<Typename>),
}

/// The generic part of a typename; not itself a type.
#[derive(Debug)]
pub struct GenericTypename {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub children: Vec<Typename>,
}

/// The array dimensions of a typename.
#[derive(Debug)]
pub struct ArrayTypename {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub dimensions: Vec<Expression>,
}

/// A `name: type` mapping, used in structures, arguments, and catches.
#[derive(Debug)]
pub struct TypePair {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub name: String,
    pub value: Typename,
}

impl Typename {
    /// The plain name of a simple (non-generic, non-array) named type, if
    /// this is one. Used for registry lookups.
    pub fn simple_name(&self) -> Option<String> {
        match &self.kind {
            TypenameKind::Named {
                name,
                generic: None,
                array: None,
            } => name.qualified_name(),
            _ => None,
        }
    }

    /// A human-readable spelling of the type, used in signatures and
    /// error messages.
    pub fn canonical_name(&self) -> String {
        match &self.kind {
            TypenameKind::Named {
                name,
                generic,
                array,
            } => {
                let mut out = name.qualified_name().unwrap_or_default();
                if let Some(g) = generic {
                    let parts: Vec<_> = g.children.iter().map(|t| t.canonical_name()).collect();
                    out.push('<');
                    out.push_str(&parts.join(","));
                    out.push('>');
                }
                if array.is_some() {
                    out.push_str("[]");
                }
                out
            }
            TypenameKind::Variant(types) => {
                let parts: Vec<_> = types.iter().map(|t| t.canonical_name()).collect();
                format!("|{}|", parts.join(","))
            }
            TypenameKind::Optional(inner) => format!("|{}|?", inner.canonical_name()),
        }
    }
}

impl Expression {
    /// The name of a simple identifier expression, if this is one.
    pub fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// The colon-joined spelling of an identifier of any form.
    pub fn qualified_name(&self) -> Option<String> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name.clone()),
            ExprKind::FullyQualified(parts) => Some(parts.join(":")),
            ExprKind::RelativeIdentifier(inner) => {
                inner.qualified_name().map(|n| format!(":{}", n))
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// A statement node: identity, position, and the kind sum.
#[derive(Debug)]
pub struct Statement {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub kind: StmtKind,
}

/// The closed sum of statement kinds.
#[derive(Debug)]
pub enum StmtKind {
    BareExpression(Expression),
    /// A statement container that opens a new scope
    Block(Vec<Statement>),
    Assign(AssignStmt),
    CompoundAssign(CompoundAssignStmt),
    /// `var x as T`
    TypeDeclaration(TypeDeclStmt),
    /// `var x = e`
    Variable(BindingStmt),
    /// `const x = e`; later phases treat the binding as immutable
    Constant(BindingStmt),
    Do(Expression),
    /// `if`; an `unless` lowers to an `If` with a null then-branch
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    /// A block guarded by predicate invariants
    With(WithStmt),
    Break,
    Continue,
    Match(MatchStmt),
    Throw(Expression),
    Try(TryStmt),
    Return(Expression),
    Extern(String),

    Alias(AliasStmt),
    Enum(EnumStmt),
    Structure(StructureStmt),

    Def(FunctionDef),
    GenericDef(GenericFunctionDef),
    ConceptDef(ConceptDef),

    ModuleDef(ModuleName),
    Use(ModuleName),
    Import(ImportStmt),
    Export(Vec<String>),
}

/// Simple assignment; the LHS is a full expression (`x[1] = e` is valid).
#[derive(Debug)]
pub struct AssignStmt {
    pub lhs: Expression,
    pub rhs: Expression,
}

/// Compound assignment (`x += e`)
#[derive(Debug)]
pub struct CompoundAssignStmt {
    pub lhs: Expression,
    pub op: AssignOperator,
    pub rhs: Expression,
}

/// `var x as T`
#[derive(Debug)]
pub struct TypeDeclStmt {
    pub lhs: Expression,
    pub rhs: Typename,
}

/// Variable or constant initialization
#[derive(Debug)]
pub struct BindingStmt {
    pub lhs: Expression,
    pub rhs: Expression,
}

/// `if`/`unless` statement
#[derive(Debug)]
pub struct IfStmt {
    pub condition: Expression,
    pub then_case: Option<Box<Statement>>,
    pub else_case: Option<Box<Statement>>,
}

/// `while` loop
#[derive(Debug)]
pub struct WhileStmt {
    pub condition: Expression,
    pub body: Box<Statement>,
}

/// `for id in expr` loop
#[derive(Debug)]
pub struct ForStmt {
    pub index: String,
    pub range: Expression,
    pub body: Box<Statement>,
}

/// `with (predicates) body`
#[derive(Debug)]
pub struct WithStmt {
    pub predicates: Vec<Expression>,
    pub body: Box<Statement>,
}

/// `match` statement; the case list is homogeneous apart from the default.
#[derive(Debug)]
pub struct MatchStmt {
    pub target: Expression,
    pub cases: Vec<MatchCase>,
}

/// One case of a match statement.
#[derive(Debug)]
pub enum MatchCase {
    On { value: Expression, body: Statement },
    When { predicate: Expression, body: Statement },
    Type { check: Typename, body: Statement },
    Default { body: Statement },
}

/// `try` statement with catches and an optional finally block
#[derive(Debug)]
pub struct TryStmt {
    pub body: Box<Statement>,
    pub catches: Vec<CatchClause>,
    pub finally: Option<Box<Statement>>,
}

/// A `catch` binding an exception to a typed name
#[derive(Debug)]
pub struct CatchClause {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub catch_type: TypePair,
    pub body: Statement,
}

/// `type A = B;`
#[derive(Debug)]
pub struct AliasStmt {
    pub name: String,
    pub original: Typename,
}

/// `type En = @{a,b,c};`
#[derive(Debug)]
pub struct EnumStmt {
    pub name: String,
    pub values: Vec<String>,
}

/// `type S = { field: T, ... };`
#[derive(Debug)]
pub struct StructureStmt {
    pub name: String,
    pub fields: Vec<TypePair>,
}

// ---------------------------------------------------------------------------
// Functions and concepts
// ---------------------------------------------------------------------------

/// The declared parameter list of a function definition.
#[derive(Debug)]
pub struct Arguments {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub arguments: Vec<TypePair>,
}

/// A pre/postcondition bound to a parameter name.
#[derive(Debug)]
pub struct Condition {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub target: String,
    pub predicate: Expression,
}

/// A concrete function definition.
#[derive(Debug)]
pub struct FunctionDef {
    pub kind: FunctionKind,
    pub name: String,
    pub return_type: Option<Typename>,
    pub arguments: Option<Arguments>,
    pub conditions: Vec<Condition>,
    pub body: Box<Statement>,
}

/// Either a concrete specialization or a concept constraint on a generic
/// parameter.
#[derive(Debug)]
pub enum GenericMatch {
    Type(TypePair),
    Concept(ConceptMatch),
}

/// A generic function definition; it contributes nothing to codegen until
/// instantiated, unlike a concrete [`FunctionDef`].
#[derive(Debug)]
pub struct GenericFunctionDef {
    pub def: FunctionDef,
    pub generics: Vec<GenericMatch>,
}

/// A concept constraint binding: `name ~> typename`
#[derive(Debug)]
pub struct ConceptMatch {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub name: String,
    pub concept_type: Typename,
}

/// A structural check inside a concept definition.
#[derive(Debug)]
pub enum ConceptCheck {
    Member(MemberCheck),
    Function(FunctionCheck),
}

/// `T .= m`: is the member `m` defined for structure type `T`?
#[derive(Debug)]
pub struct MemberCheck {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub type_name: String,
    pub member: String,
}

/// `T => F<T> -> R`: is `F`, returning `R`, defined for type `T`?
#[derive(Debug)]
pub struct FunctionCheck {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub type_name: String,
    pub function_name: Box<Expression>,
    pub function_arguments: Vec<Typename>,
    pub return_type_name: Typename,
}

/// A named concept definition.
#[derive(Debug)]
pub struct ConceptDef {
    pub name: String,
    pub generic: String,
    pub checks: Vec<ConceptCheck>,
}

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

/// A module name, possibly relative to the current module.
#[derive(Debug)]
pub struct ModuleName {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub relative: bool,
    pub parts: Vec<String>,
}

/// `import { ids } from module;`
#[derive(Debug)]
pub struct ImportStmt {
    pub module: ModuleName,
    pub imports: Vec<String>,
}

/// A program: top-level declarations with no module header.
#[derive(Debug)]
pub struct ProgramNode {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub children: Vec<Statement>,
}

/// A module: like a program, but its first statement is the `ModuleDef`.
#[derive(Debug)]
pub struct ModuleNode {
    pub id: NodeId,
    pub pos: SourcePosition,
    pub children: Vec<Statement>,
}

/// A parsed compilation unit.
#[derive(Debug)]
pub enum Unit {
    Program(ProgramNode),
    Module(ModuleNode),
}

impl Unit {
    /// The unit's top-level statements, module header included.
    pub fn statements(&self) -> &[Statement] {
        match self {
            Unit::Program(p) => &p.children,
            Unit::Module(m) => &m.children,
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical S-expression printing
// ---------------------------------------------------------------------------

/// Render `items` as the comma-prefixed run used inside list nodes:
/// `,a,b,c` (empty input renders nothing).
fn serialize<T: fmt::Display>(items: &[T]) -> String {
    items.iter().map(|item| format!(",{}", item)).collect()
}

fn opt_or_null<T: fmt::Display>(item: &Option<T>) -> String {
    match item {
        Some(value) => value.to_string(),
        None => "null".into(),
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Integer(v) => write!(f, "(Integral,{},{})", v, BasicType::Integer as i32),
            ExprKind::Byte(v) => write!(f, "(Integral,{},{})", v, BasicType::Byte as i32),
            ExprKind::Long(v) => write!(f, "(Integral,{},{})", v, BasicType::Long as i32),
            ExprKind::UnsignedInteger(v) => {
                write!(f, "(Integral,{},{})", v, BasicType::UnsignedInteger as i32)
            }
            ExprKind::UnsignedByte(v) => {
                write!(f, "(Integral,{},{})", v, BasicType::UnsignedByte as i32)
            }
            ExprKind::UnsignedLong(v) => {
                write!(f, "(Integral,{},{})", v, BasicType::UnsignedLong as i32)
            }
            ExprKind::Float(v) => write!(f, "(FloatingPoint,{},{})", v, BasicType::Float as i32),
            ExprKind::Double(v) => write!(f, "(FloatingPoint,{},{})", v, BasicType::Double as i32),
            ExprKind::Boolean(v) => write!(f, "(Boolean,{})", v),
            ExprKind::String(v) => write!(f, "(String,\"{}\")", v),
            ExprKind::Symbol(v) => write!(f, "(Symbol,{})", v),
            ExprKind::Nothing => write!(f, "(Nothing)"),

            ExprKind::Identifier(name) => write!(f, "(Identifier,{})", name),
            ExprKind::FullyQualified(parts) => {
                write!(f, "(FullyQualified{})", serialize(parts))
            }
            ExprKind::RelativeIdentifier(inner) => match &inner.kind {
                ExprKind::FullyQualified(parts) => {
                    write!(f, "(RelativeIdentifier{})", serialize(parts))
                }
                _ => write!(
                    f,
                    "(RelativeIdentifier,{})",
                    inner.identifier_name().unwrap_or_default()
                ),
            },

            ExprKind::BinaryOp(e) => {
                write!(f, "(BinaryOp,{},{},{})", e.op as i32, e.left, e.right)
            }
            ExprKind::UnaryOp(e) => write!(f, "(UnaryOp,{},{})", e.op as i32, e.operand),
            ExprKind::TernaryOp(e) => write!(
                f,
                "(TernaryOp,{},{},{})",
                e.condition, e.true_branch, e.false_branch
            ),
            ExprKind::Member(e) => write!(f, "(Member,{},{})", e.member, e.object),
            ExprKind::Subscript(e) => write!(f, "(Subscript,{},{})", e.container, e.index),
            ExprKind::Cast(e) => write!(f, "(Cast,{},{})", e.left, e.right),
            ExprKind::TypeCheck(e) => write!(f, "(TypeCheck,{},{})", e.left, e.right),

            ExprKind::Array(items) => write!(f, "(Array{})", serialize(items)),
            ExprKind::List(items) => write!(f, "(List{})", serialize(items)),
            ExprKind::Tuple(items) => write!(f, "(Tuple{})", serialize(items)),
            ExprKind::SymbolList(symbols) => {
                write!(f, "(SymbolList")?;
                for s in symbols {
                    write!(f, ",(Symbol,{})", s)?;
                }
                write!(f, ")")
            }
            ExprKind::Dictionary(entries) => write!(f, "(Dictionary{})", serialize(entries)),

            ExprKind::Call(e) => write!(f, "(Call,{}{})", e.target, serialize(&e.arguments)),
            ExprKind::PredicateCall(e) => {
                write!(f, "(PredicateCall,{}{})", e.target, serialize(&e.arguments))
            }
            ExprKind::Constructor(e) => {
                write!(f, "(Constructor,{}{})", e.typename, serialize(&e.arguments))
            }
        }
    }
}

impl fmt::Display for DictionaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictionaryKey::Integer(v) => write!(f, "(Integral,{},{})", v, BasicType::Integer as i32),
            DictionaryKey::Byte(v) => write!(f, "(Integral,{},{})", v, BasicType::Byte as i32),
            DictionaryKey::Long(v) => write!(f, "(Integral,{},{})", v, BasicType::Long as i32),
            DictionaryKey::UnsignedInteger(v) => {
                write!(f, "(Integral,{},{})", v, BasicType::UnsignedInteger as i32)
            }
            DictionaryKey::UnsignedByte(v) => {
                write!(f, "(Integral,{},{})", v, BasicType::UnsignedByte as i32)
            }
            DictionaryKey::UnsignedLong(v) => {
                write!(f, "(Integral,{},{})", v, BasicType::UnsignedLong as i32)
            }
            DictionaryKey::String(v) => write!(f, "(String,\"{}\")", v),
            DictionaryKey::Symbol(v) => write!(f, "(Symbol,{})", v),
        }
    }
}

impl fmt::Display for DictionaryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(DictionaryEntry,{},{})", self.key, self.value)
    }
}

impl fmt::Display for NamedArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(NamedArgument,{},{})", self.name, self.value)
    }
}

impl fmt::Display for CallArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallArgument::Positional(e) => write!(f, "{}", e),
            CallArgument::Named(n) => write!(f, "{}", n),
        }
    }
}

impl fmt::Display for Typename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypenameKind::Named {
                name,
                generic,
                array,
            } => write!(
                f,
                "(Typename,{},{},{})",
                name,
                opt_or_null(generic),
                opt_or_null(array)
            ),
            TypenameKind::Variant(types) => write!(f, "(Variant{})", serialize(types)),
            TypenameKind::Optional(inner) => write!(f, "(Optional,{})", inner),
        }
    }
}

impl fmt::Display for GenericTypename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(GenericTypename{})", serialize(&self.children))
    }
}

impl fmt::Display for ArrayTypename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(ArrayTypename{})", serialize(&self.dimensions))
    }
}

impl fmt::Display for TypePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(TypePair,{},{})", self.name, self.value)
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Arguments{})", serialize(&self.arguments))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Condition,{},{})", self.target, self.predicate)
    }
}

impl fmt::Display for ConceptMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(ConceptMatch,{},{})", self.name, self.concept_type)
    }
}

impl fmt::Display for GenericMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenericMatch::Type(pair) => write!(f, "{}", pair),
            GenericMatch::Concept(c) => write!(f, "{}", c),
        }
    }
}

impl fmt::Display for MemberCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(MemberCheck,{},{})", self.type_name, self.member)
    }
}

impl fmt::Display for FunctionCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(FunctionCheck,{},{},{}{})",
            self.type_name,
            self.function_name,
            self.return_type_name,
            serialize(&self.function_arguments)
        )
    }
}

impl fmt::Display for ConceptCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConceptCheck::Member(m) => write!(f, "{}", m),
            ConceptCheck::Function(func) => write!(f, "{}", func),
        }
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.relative { ":" } else { "" };
        write!(f, "(ModuleName,{}{})", prefix, self.parts.join(":"))
    }
}

impl fmt::Display for MatchCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchCase::On { value, body } => write!(f, "(On,{},{})", value, body),
            MatchCase::When { predicate, body } => write!(f, "(When,{},{})", predicate, body),
            MatchCase::Type { check, body } => write!(f, "(TypeCase,{},{})", check, body),
            MatchCase::Default { body } => write!(f, "(Default,{})", body),
        }
    }
}

impl fmt::Display for CatchClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Catch,{},{})", self.catch_type, self.body)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StmtKind::BareExpression(e) => write!(f, "(BareExpression,{})", e),
            StmtKind::Block(stmts) => write!(f, "(Block{})", serialize(stmts)),
            StmtKind::Assign(s) => write!(f, "(Assign,{},{})", s.lhs, s.rhs),
            StmtKind::CompoundAssign(s) => {
                // Note the reordering: the string form is (LHS, RHS, OP).
                write!(f, "(CompoundAssign,{},{},{})", s.lhs, s.rhs, s.op as i32)
            }
            StmtKind::TypeDeclaration(s) => write!(f, "(TypeDeclaration,{},{})", s.lhs, s.rhs),
            StmtKind::Variable(s) => write!(f, "(Variable,{},{})", s.lhs, s.rhs),
            StmtKind::Constant(s) => write!(f, "(Constant,{},{})", s.lhs, s.rhs),
            StmtKind::Do(e) => write!(f, "(Do,{})", e),
            StmtKind::If(s) => write!(
                f,
                "(If,{},{},{})",
                s.condition,
                opt_or_null(&s.then_case),
                opt_or_null(&s.else_case)
            ),
            StmtKind::While(s) => write!(f, "(While,{},{})", s.condition, s.body),
            StmtKind::For(s) => write!(f, "(For,{},{},{})", s.index, s.range, s.body),
            StmtKind::With(s) => write!(f, "(With{},{})", serialize(&s.predicates), s.body),
            StmtKind::Break => write!(f, "(Break)"),
            StmtKind::Continue => write!(f, "(Continue)"),
            StmtKind::Match(s) => write!(f, "(Match,{}{})", s.target, serialize(&s.cases)),
            StmtKind::Throw(e) => write!(f, "(Throw,{})", e),
            StmtKind::Try(s) => {
                write!(f, "(Try,{}{},", s.body, serialize(&s.catches))?;
                match &s.finally {
                    Some(stmt) => write!(f, "(Finally,{}))", stmt),
                    None => write!(f, "null)"),
                }
            }
            StmtKind::Return(e) => write!(f, "(Return,{})", e),
            StmtKind::Extern(name) => write!(f, "(Extern,{})", name),

            StmtKind::Alias(s) => write!(f, "(Alias,(Identifier,{}),{})", s.name, s.original),
            StmtKind::Enum(s) => {
                write!(f, "(Enum,(Identifier,{}),(SymbolList", s.name)?;
                for v in &s.values {
                    write!(f, ",(Symbol,{})", v)?;
                }
                write!(f, "))")
            }
            StmtKind::Structure(s) => write!(
                f,
                "(Structure,(Identifier,{}){})",
                s.name,
                serialize(&s.fields)
            ),

            StmtKind::Def(d) => write!(
                f,
                "(Def,{},{},{},{},(Conditions{}),{})",
                d.kind as i32,
                d.name,
                opt_or_null(&d.return_type),
                opt_or_null(&d.arguments),
                serialize(&d.conditions),
                d.body
            ),
            StmtKind::GenericDef(g) => write!(
                f,
                "(Def,{},{},(GenericTypes{}),{},{},(Conditions{}),{})",
                g.def.kind as i32,
                g.def.name,
                serialize(&g.generics),
                opt_or_null(&g.def.return_type),
                opt_or_null(&g.def.arguments),
                serialize(&g.def.conditions),
                g.def.body
            ),
            StmtKind::ConceptDef(c) => write!(
                f,
                "(Concept,{},{}{})",
                c.name,
                c.generic,
                serialize(&c.checks)
            ),

            StmtKind::ModuleDef(m) => write!(f, "(ModuleDef,{})", m),
            StmtKind::Use(m) => write!(f, "(Use,{})", m),
            StmtKind::Import(s) => {
                write!(f, "(Import,{}", s.module)?;
                for name in &s.imports {
                    write!(f, ",(Identifier,{})", name)?;
                }
                write!(f, ")")
            }
            StmtKind::Export(names) => {
                write!(f, "(Export")?;
                for name in names {
                    write!(f, ",(Identifier,{})", name)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for ProgramNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Program{})", serialize(&self.children))
    }
}

impl fmt::Display for ModuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Module{})", serialize(&self.children))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Program(p) => write!(f, "{}", p),
            Unit::Module(m) => write!(f, "{}", m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(kind: ExprKind) -> Expression {
        Expression {
            id: NodeId(0),
            pos: SourcePosition::dummy(),
            kind,
        }
    }

    #[test]
    fn test_integral_codes() {
        assert_eq!(expr(ExprKind::Integer(42)).to_string(), "(Integral,42,0)");
        assert_eq!(expr(ExprKind::Byte(7)).to_string(), "(Integral,7,1)");
        assert_eq!(expr(ExprKind::Long(9)).to_string(), "(Integral,9,4)");
        assert_eq!(
            expr(ExprKind::UnsignedInteger(4660)).to_string(),
            "(Integral,4660,5)"
        );
        assert_eq!(expr(ExprKind::UnsignedByte(1)).to_string(), "(Integral,1,6)");
        assert_eq!(expr(ExprKind::UnsignedLong(2)).to_string(), "(Integral,2,7)");
    }

    #[test]
    fn test_floating_point_codes() {
        assert_eq!(
            expr(ExprKind::Double(1.23)).to_string(),
            "(FloatingPoint,1.23,3)"
        );
        assert_eq!(
            expr(ExprKind::Float(0.5)).to_string(),
            "(FloatingPoint,0.5,2)"
        );
    }

    #[test]
    fn test_simple_literals() {
        assert_eq!(expr(ExprKind::Boolean(true)).to_string(), "(Boolean,true)");
        assert_eq!(expr(ExprKind::Nothing).to_string(), "(Nothing)");
        assert_eq!(
            expr(ExprKind::String("abc".into())).to_string(),
            "(String,\"abc\")"
        );
        assert_eq!(
            expr(ExprKind::Symbol("foo".into())).to_string(),
            "(Symbol,foo)"
        );
    }

    #[test]
    fn test_identifier_forms() {
        assert_eq!(
            expr(ExprKind::Identifier("x".into())).to_string(),
            "(Identifier,x)"
        );
        assert_eq!(
            expr(ExprKind::FullyQualified(vec![
                "foo".into(),
                "bar".into(),
                "baz".into()
            ]))
            .to_string(),
            "(FullyQualified,foo,bar,baz)"
        );
        let inner = expr(ExprKind::FullyQualified(vec!["foo".into(), "bar".into()]));
        assert_eq!(
            expr(ExprKind::RelativeIdentifier(Box::new(inner))).to_string(),
            "(RelativeIdentifier,foo,bar)"
        );
    }

    #[test]
    fn test_binary_op_codes_are_stable() {
        assert_eq!(BinaryOperator::Add as i32, 0);
        assert_eq!(BinaryOperator::Exponent as i32, 5);
        assert_eq!(BinaryOperator::LessThan as i32, 10);
        assert_eq!(BinaryOperator::BooleanOr as i32, 18);
    }

    #[test]
    fn test_assign_operator_codes_are_stable() {
        assert_eq!(AssignOperator::Add as i32, 0);
        assert_eq!(AssignOperator::Subtract as i32, 1);
        assert_eq!(AssignOperator::BitXor as i32, 10);
    }

    #[test]
    fn test_basic_type_codes_are_stable() {
        assert_eq!(BasicType::Integer as i32, 0);
        assert_eq!(BasicType::UnsignedLong as i32, 7);
        assert_eq!(BasicType::Promoted as i32, 14);
        assert_eq!(BasicType::Unknown as i32, -1);
    }

    #[test]
    fn test_member_print_order() {
        let member = expr(ExprKind::Member(MemberExpr {
            member: Box::new(expr(ExprKind::Identifier("y".into()))),
            object: Box::new(expr(ExprKind::Identifier("x".into()))),
        }));
        assert_eq!(member.to_string(), "(Member,(Identifier,y),(Identifier,x))");
    }

    #[test]
    fn test_subscript_print_order() {
        let subscript = expr(ExprKind::Subscript(SubscriptExpr {
            container: Box::new(expr(ExprKind::Identifier("x".into()))),
            index: Box::new(expr(ExprKind::Identifier("y".into()))),
        }));
        assert_eq!(
            subscript.to_string(),
            "(Subscript,(Identifier,x),(Identifier,y))"
        );
    }

    #[test]
    fn test_qualified_name_helper() {
        let ff = expr(ExprKind::FullyQualified(vec!["a".into(), "b".into()]));
        assert_eq!(ff.qualified_name().as_deref(), Some("a:b"));

        let rel = expr(ExprKind::RelativeIdentifier(Box::new(expr(
            ExprKind::Identifier("m".into()),
        ))));
        assert_eq!(rel.qualified_name().as_deref(), Some(":m"));
    }

    #[test]
    fn test_module_name_display() {
        let m = ModuleName {
            id: NodeId(0),
            pos: SourcePosition::dummy(),
            relative: false,
            parts: vec!["foo".into(), "bar".into(), "baz".into()],
        };
        assert_eq!(m.to_string(), "(ModuleName,foo:bar:baz)");

        let rel = ModuleName {
            id: NodeId(0),
            pos: SourcePosition::dummy(),
            relative: true,
            parts: vec!["relative_id".into()],
        };
        assert_eq!(rel.to_string(), "(ModuleName,:relative_id)");
    }
}
