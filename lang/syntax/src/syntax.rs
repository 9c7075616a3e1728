use derive_more::From;
use typy_utils::new_key_type;

/* ----------------------------------- Ids ---------------------------------- */

new_key_type! {
    pub struct ExprId;
    pub struct StmtId;
    pub struct BlockId;
}

/* -------------------------------- Operators ------------------------------- */

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    FloorDiv,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum BoolOperator {
    And,
    Or,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum UnaryOperator {
    Invert,
    Not,
    UAdd,
    USub,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

/* ------------------------------- Expressions ------------------------------ */

/// `a and b and ...`
#[derive(Clone, Debug)]
pub struct BoolOp {
    pub op: BoolOperator,
    pub values: Vec<ExprId>,
}
/// `a + b`
#[derive(Clone, Debug)]
pub struct BinOp {
    pub left: ExprId,
    pub op: Operator,
    pub right: ExprId,
}
/// `-a`
#[derive(Clone, Debug)]
pub struct UnaryOp {
    pub op: UnaryOperator,
    pub operand: ExprId,
}
/// `lambda x, y: e`
#[derive(Clone, Debug)]
pub struct Lambda {
    pub args: Arguments,
    pub body: ExprId,
}
/// `b if t else o`
#[derive(Clone, Debug)]
pub struct IfExp {
    pub test: ExprId,
    pub body: ExprId,
    pub orelse: ExprId,
}
/// `{k: v, ...}`
#[derive(Clone, Debug)]
pub struct Dict {
    pub keys: Vec<ExprId>,
    pub values: Vec<ExprId>,
}
/// `{a, ...}`
#[derive(Clone, Debug)]
pub struct Set {
    pub elts: Vec<ExprId>,
}
/// `a < b <= c`
#[derive(Clone, Debug)]
pub struct Compare {
    pub left: ExprId,
    pub ops: Vec<CmpOp>,
    pub comparators: Vec<ExprId>,
}
/// `f(a, k=v)`
#[derive(Clone, Debug)]
pub struct Call {
    pub func: ExprId,
    pub args: Vec<ExprId>,
    pub keywords: Vec<Keyword>,
}
#[derive(Clone, Debug)]
pub struct Keyword {
    pub arg: Option<String>,
    pub value: ExprId,
}
/// numeric literals; `Imag` is the coefficient of an imaginary literal `2j`
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Num {
    Int(i64),
    Float(f64),
    Imag(f64),
}
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Str(pub String);
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameConstant {
    True,
    False,
    None,
}
/// `v.attr`
#[derive(Clone, Debug)]
pub struct Attribute {
    pub value: ExprId,
    pub attr: String,
}
/// `v[slice]`
#[derive(Clone, Debug)]
pub struct Subscript {
    pub value: ExprId,
    pub slice: Slice,
}
#[derive(Clone, Debug)]
pub enum Slice {
    /// `v[i]`
    Index(ExprId),
    /// `v[lower:upper:step]`
    Range(Range),
    /// `v[a:b, c]`
    Ext(Vec<Slice>),
}
#[derive(Clone, Debug)]
pub struct Range {
    pub lower: Option<ExprId>,
    pub upper: Option<ExprId>,
    pub step: Option<ExprId>,
}
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Name(pub String);
/// `[a, ...]`
#[derive(Clone, Debug)]
pub struct List {
    pub elts: Vec<ExprId>,
}
/// `(a, ...)`
#[derive(Clone, Debug)]
pub struct Tuple {
    pub elts: Vec<ExprId>,
}
/// `f"a{b}c"`; the values are `Str` and `FormattedValue` nodes
#[derive(Clone, Debug)]
pub struct JoinedStr {
    pub values: Vec<ExprId>,
}
/// `{value!conversion:format_spec}` inside a `JoinedStr`
#[derive(Clone, Debug)]
pub struct FormattedValue {
    pub value: ExprId,
    pub conversion: Option<char>,
    pub format_spec: Option<ExprId>,
}
/// `for target in iter if cond ...`, one clause of a comprehension
#[derive(Clone, Debug)]
pub struct Comprehension {
    pub target: ExprId,
    pub iter: ExprId,
    pub ifs: Vec<ExprId>,
}
/// `[elt for ...]`
#[derive(Clone, Debug)]
pub struct ListComp {
    pub elt: ExprId,
    pub generators: Vec<Comprehension>,
}
/// `{elt for ...}`
#[derive(Clone, Debug)]
pub struct SetComp {
    pub elt: ExprId,
    pub generators: Vec<Comprehension>,
}
/// `{key: value for ...}`
#[derive(Clone, Debug)]
pub struct DictComp {
    pub key: ExprId,
    pub value: ExprId,
    pub generators: Vec<Comprehension>,
}
/// `(elt for ...)`
#[derive(Clone, Debug)]
pub struct GeneratorExp {
    pub elt: ExprId,
    pub generators: Vec<Comprehension>,
}
#[derive(Clone, Debug)]
pub struct Await(pub ExprId);
#[derive(Clone, Debug)]
pub struct Yield(pub Option<ExprId>);
#[derive(Clone, Debug)]
pub struct Starred(pub ExprId);

#[derive(From, Clone, Debug)]
pub enum Expr {
    BoolOp(BoolOp),
    BinOp(BinOp),
    UnaryOp(UnaryOp),
    Lambda(Lambda),
    IfExp(IfExp),
    Dict(Dict),
    Set(Set),
    Compare(Compare),
    Call(Call),
    Num(Num),
    Str(Str),
    NameConstant(NameConstant),
    Attribute(Attribute),
    Subscript(Subscript),
    Name(Name),
    List(List),
    Tuple(Tuple),
    JoinedStr(JoinedStr),
    FormattedValue(FormattedValue),
    ListComp(ListComp),
    SetComp(SetComp),
    DictComp(DictComp),
    GeneratorExp(GeneratorExp),
    Await(Await),
    Yield(Yield),
    Starred(Starred),
}

/* -------------------------------- Arguments ------------------------------- */

#[derive(Clone, Debug, Default)]
pub struct Arguments {
    pub args: Vec<Arg>,
    pub vararg: Option<Arg>,
    pub kwonlyargs: Vec<Arg>,
    pub kwarg: Option<Arg>,
    pub defaults: Vec<ExprId>,
}
#[derive(Clone, Debug)]
pub struct Arg {
    pub arg: String,
    pub annotation: Option<ExprId>,
}

/* ------------------------------- Statements ------------------------------- */

#[derive(Clone, Debug)]
pub struct FunctionDef {
    pub name: String,
    pub args: Arguments,
    pub body: BlockId,
    pub decorators: Vec<ExprId>,
    pub returns: Option<ExprId>,
}
#[derive(Clone, Debug)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<ExprId>,
    pub body: BlockId,
}
#[derive(Clone, Debug)]
pub struct Assign {
    pub targets: Vec<ExprId>,
    pub value: ExprId,
}
#[derive(Clone, Debug)]
pub struct AugAssign {
    pub target: ExprId,
    pub op: Operator,
    pub value: ExprId,
}
#[derive(Clone, Debug)]
pub struct For {
    pub target: ExprId,
    pub iter: ExprId,
    pub body: BlockId,
    pub orelse: BlockId,
}
#[derive(Clone, Debug)]
pub struct While {
    pub test: ExprId,
    pub body: BlockId,
    pub orelse: BlockId,
}
#[derive(Clone, Debug)]
pub struct If {
    pub test: ExprId,
    pub body: BlockId,
    pub orelse: BlockId,
}
#[derive(Clone, Debug)]
pub struct With {
    pub items: Vec<WithItem>,
    pub body: BlockId,
}
#[derive(Clone, Debug)]
pub struct WithItem {
    pub context_expr: ExprId,
    pub optional_vars: Option<ExprId>,
}
#[derive(Clone, Debug)]
pub struct Raise {
    pub exc: Option<ExprId>,
    pub cause: Option<ExprId>,
}
#[derive(Clone, Debug)]
pub struct Try {
    pub body: BlockId,
    pub handlers: Vec<ExceptHandler>,
    pub orelse: BlockId,
    pub finalbody: BlockId,
}
#[derive(Clone, Debug)]
pub struct ExceptHandler {
    pub ty: Option<ExprId>,
    pub name: Option<String>,
    pub body: BlockId,
}
#[derive(Clone, Debug)]
pub struct Assert {
    pub test: ExprId,
    pub msg: Option<ExprId>,
}
#[derive(Clone, Debug)]
pub struct Alias {
    pub name: String,
    pub asname: Option<String>,
}
#[derive(Clone, Debug)]
pub struct ImportFrom {
    pub module: Option<String>,
    pub names: Vec<Alias>,
}

#[derive(Clone, Debug)]
pub enum Stmt {
    FunctionDef(FunctionDef),
    AsyncFunctionDef(FunctionDef),
    ClassDef(ClassDef),
    Return(Option<ExprId>),
    Delete(Vec<ExprId>),
    Assign(Assign),
    AugAssign(AugAssign),
    For(For),
    AsyncFor(For),
    While(While),
    If(If),
    With(With),
    AsyncWith(With),
    Raise(Raise),
    Try(Try),
    Assert(Assert),
    Import(Vec<Alias>),
    ImportFrom(ImportFrom),
    Global(Vec<String>),
    Nonlocal(Vec<String>),
    Expr(ExprId),
    Pass,
    Break,
    Continue,
}

/// A statement list; possibly empty (an absent `else`).
#[derive(Clone, Debug, Default)]
pub struct Block(pub Vec<StmtId>);
