pub use typy_syntax::*;

use crate::{env::ComponentRef, fragment::FragmentRef};
use derive_more::From;
use indexmap::IndexMap;
use std::{
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};
use typy_utils::new_key_type;

/* ---------------------------------- Kinds --------------------------------- */

/// Kinds classify type expressions.
#[derive(Clone, Debug)]
pub enum Kind {
    /// proper types
    Type,
    /// types provably equal to exactly the wrapped one
    Singleton(Rc<TyExpr>),
}

/* ---------------------------- Type Expressions ---------------------------- */

static NEXT_TY_ID: AtomicUsize = AtomicUsize::new(0);

/// Hands out type-level ids unique across every context of the process, so a
/// variable leaking out of its context can never be confused with another.
pub(crate) fn fresh_ty_id() -> usize {
    NEXT_TY_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Clone, Debug, From)]
pub enum TyExpr {
    Var(TyVar),
    Canonical(CanonicalTy),
    Prj(TyPrj),
    Rec(RecTy),
}

/// A bound type-level identifier; its kind lives in the context that
/// introduced it.
#[derive(Clone, Debug)]
pub struct TyVar {
    pub id: usize,
    pub name: String,
}

/// A fragment together with its elaborated index.
#[derive(Clone, Debug)]
pub struct CanonicalTy {
    pub fragment: FragmentRef,
    pub idx: Rc<Idx>,
}

/// `Component.label`, a type member of another component.
#[derive(Clone, Debug)]
pub struct TyPrj {
    pub path: ComponentRef,
    pub label: String,
}

/// An equirecursive type; definitionally equal to `schema(self)`.
#[derive(Clone)]
pub struct RecTy {
    pub id: usize,
    pub name: String,
    pub schema: Rc<dyn Fn(&TyExpr) -> TyExpr>,
}

/* --------------------------------- Indices -------------------------------- */

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Pos(usize),
    Name(String),
}

/// Fragment-defined type indices.
#[derive(Clone, Debug)]
pub enum Idx {
    /// `F` or `F[()]`
    Triv,
    /// labelled components, as in `tpl[a : A, b : B]`
    Fields(IndexMap<Label, TyExpr>),
    /// `fn[A, B > R]`
    Arrow { args: Vec<TyExpr>, ret: TyExpr },
    /// tagged cases, as in `variant[A, B(num)]`
    Cases(IndexMap<String, Vec<TyExpr>>),
    /// the singleton index of a component reference
    Component(ComponentRef),
}

/// Variables bound by a pattern, in order of appearance.
pub type Bindings = IndexMap<String, TyExpr>;

/// What a pattern translates to: a guard on the scrutinee and the value each
/// of its variables is bound to.
pub type PatTrans = (ExprId, IndexMap<String, ExprId>);

/* -------------------------------- Mechanism ------------------------------- */

/// How the value of a block reaches its consumer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mechanism {
    /// evaluated for effect only
    Statement,
    /// returned from the enclosing function
    Return,
    /// assigned to the given target
    Assign(ExprId),
}

/* ------------------------------ Match Groups ------------------------------ */

new_key_type! {
    pub struct MatchId;
}

/// A scrutinizer `[e].match` together with the `with` rules following it.
#[derive(Clone, Debug)]
pub struct MatchGroup {
    pub scrutinizer: StmtId,
    pub scrutinee: ExprId,
    pub rules: Vec<Rule>,
}

/// `with pat: body`
#[derive(Clone, Debug)]
pub struct Rule {
    pub stmt: StmtId,
    pub pat: ExprId,
    pub body: BlockId,
}

/// An element of a segmented block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, From)]
pub enum Item {
    Stmt(StmtId),
    Match(MatchId),
}

/// Any node the checker annotates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, From)]
pub enum Tree {
    Expr(ExprId),
    Stmt(StmtId),
    Match(MatchId),
}

impl From<Item> for Tree {
    fn from(item: Item) -> Self {
        match item {
            | Item::Stmt(s) => Tree::Stmt(s),
            | Item::Match(m) => Tree::Match(m),
        }
    }
}

/* ------------------------------- Annotations ------------------------------ */

/// The translation hook recorded for a checked node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    /* intro forms */
    Lambda,
    Dict,
    Set,
    Num,
    Str,
    NameConstant,
    List,
    Tuple,
    Name,
    JoinedStr,
    ListComp,
    SetComp,
    DictComp,
    GeneratorExp,
    FunctionDef,
    /* targeted forms, some also intro forms */
    UnaryOp,
    Call,
    IfExp,
    Attribute,
    Subscript,
    If,
    /* binary forms */
    BinOp,
    Compare,
    BoolOp,
    /* targeted statements */
    Delete,
    Assign,
    AugAssign,
    For,
    While,
    /* default statements */
    CheckedAssign,
    Return,
    Raise,
    Try,
    Assert,
    Pass,
    Break,
    Continue,
    /* references to other components */
    ComponentRef,
}

/// The fragment responsible for translating a node, and how to call it.
#[derive(Clone, Debug)]
pub struct Delegation {
    pub fragment: FragmentRef,
    pub idx: Option<Rc<Idx>>,
    pub hook: Hook,
}

/// What checking an expression or a statement-expression recorded.
#[derive(Clone, Debug)]
pub struct Annotation {
    pub ty: TyExpr,
    pub delegation: Option<Delegation>,
}

/// What analyzing a pattern recorded.
#[derive(Clone, Debug)]
pub struct PatAnnotation {
    pub delegate: FragmentRef,
    pub idx: Rc<Idx>,
    pub bindings: Bindings,
}

/* -------------------------- Syntactic Equality ---------------------------- */

// Syntactic, not definitional: see `Context::ty_expr_eq` for the latter.
mod impls {
    use super::*;

    impl PartialEq for TyExpr {
        fn eq(&self, other: &Self) -> bool {
            match (self, other) {
                | (TyExpr::Var(a), TyExpr::Var(b)) => a.id == b.id,
                | (TyExpr::Canonical(a), TyExpr::Canonical(b)) => {
                    a.fragment == b.fragment && (Rc::ptr_eq(&a.idx, &b.idx) || a.idx == b.idx)
                }
                | (TyExpr::Prj(a), TyExpr::Prj(b)) => a.path.ptr_eq(&b.path) && a.label == b.label,
                | (TyExpr::Rec(a), TyExpr::Rec(b)) => a.id == b.id,
                | _ => false,
            }
        }
    }

    impl PartialEq for Idx {
        fn eq(&self, other: &Self) -> bool {
            match (self, other) {
                | (Idx::Triv, Idx::Triv) => true,
                | (Idx::Fields(a), Idx::Fields(b)) => {
                    a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| a == b)
                }
                | (Idx::Arrow { args: a, ret: r1 }, Idx::Arrow { args: b, ret: r2 }) => {
                    a == b && r1 == r2
                }
                | (Idx::Cases(a), Idx::Cases(b)) => {
                    a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| a == b)
                }
                | (Idx::Component(a), Idx::Component(b)) => a.ptr_eq(b),
                | _ => false,
            }
        }
    }
}
