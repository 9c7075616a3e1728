//! Sorting host nodes into the dispatch strategies of the checker.
//!
//! Everything here is a pure function of the syntax tree.

use crate::syntax::*;

/// Forms whose meaning is determined by the type they are analyzed against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntroForm {
    Lambda,
    Dict,
    Set,
    Num,
    Str,
    NameConstant,
    List,
    Tuple,
    /// a capitalized name
    Name,
    /// a call to a capitalized name
    Call,
    /// a signed number or constructor name
    UnaryOp,
    /// an f-string, or a lone formatted value read as one
    JoinedStr,
    ListComp,
    SetComp,
    DictComp,
    GeneratorExp,
}

/// Forms dispatched to the fragment of their receiver's type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetedForm {
    UnaryOp,
    IfExp,
    Call,
    Attribute,
    Subscript,
}

/// Forms dispatched by the precedence of their operands' fragments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryForm {
    BinOp,
    Compare,
    BoolOp,
}

/// The reading of an expression when synthesizing; constructor names and
/// calls read as ordinary names and calls here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprShape {
    Name(String),
    /// `value [: ty]`
    Ascription { value: ExprId, ty: ExprId },
    Targeted { form: TargetedForm, target: ExprId },
    Binary { form: BinaryForm, left: ExprId, right: ExprId },
    /// intro forms without any other reading
    Intro(IntroForm),
    Unsupported(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetedStmt {
    Delete,
    /// assignment to an attribute or a subscript
    Assign,
    AugAssign,
    For,
    While,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefaultStmt {
    Assign,
    Return,
    Raise,
    Try,
    Assert,
    Pass,
    Break,
    Continue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StmtShape {
    /// expression statements, and the value of a block
    Expr(ExprId),
    If { test: ExprId },
    FunctionDef,
    Targeted { form: TargetedStmt, target: ExprId },
    Default(DefaultStmt),
    /// a statement the checker rejects, with the message to report
    Unsupported(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatShape {
    Wildcard,
    Var(String),
    Num,
    Str,
    NameConstant,
    Tuple,
    List,
    Dict,
    Set,
    /// a capitalized name
    Name,
    Call,
    UnaryOp,
    /// `"lit" + p` and friends
    BinOp,
    /// `f"lit{p}lit"`
    JoinedStr,
    Unsupported(&'static str),
}

/* -------------------------------- Helpers --------------------------------- */

fn is_constructor_name(arena: &HostArena, e: &ExprId) -> bool {
    match &arena.exprs[e] {
        | Expr::Name(name) => name.is_constructor(),
        | _ => false,
    }
}

/// Splits `value [: ty]` into its parts; `value [: _]` is not an ascription.
pub fn ascription(arena: &HostArena, e: &ExprId) -> Option<(ExprId, ExprId)> {
    match &arena.exprs[e] {
        | Expr::Subscript(Subscript {
            value,
            slice: Slice::Range(Range { lower: None, upper: Some(ty), step: None }),
        }) => match arena.name_of(ty) {
            | Some("_") => None,
            | _ => Some((*value, *ty)),
        },
        | _ => None,
    }
}

/// Splits an assignment target `pat [: ty]` into the pattern and its
/// optional annotation.
pub fn pat_and_ann(arena: &HostArena, target: &ExprId) -> (ExprId, Option<ExprId>) {
    match &arena.exprs[target] {
        | Expr::Subscript(Subscript {
            value,
            slice: Slice::Range(Range { lower: None, upper: Some(ty), step: None }),
        }) => (*value, Some(*ty)),
        | _ => (*target, None),
    }
}

/// The parts of an f-string; a lone formatted value is its only part.
pub fn fstring_parts(arena: &HostArena, e: &ExprId) -> Vec<ExprId> {
    match &arena.exprs[e] {
        | Expr::JoinedStr(JoinedStr { values }) => values.clone(),
        | _ => vec![*e],
    }
}

/* ------------------------------- Expressions ------------------------------ */

pub fn intro_form(arena: &HostArena, e: &ExprId) -> Option<IntroForm> {
    let form = match &arena.exprs[e] {
        | Expr::Lambda(_) => IntroForm::Lambda,
        | Expr::Dict(_) => IntroForm::Dict,
        | Expr::Set(_) => IntroForm::Set,
        | Expr::Num(_) => IntroForm::Num,
        | Expr::Str(_) => IntroForm::Str,
        | Expr::NameConstant(_) => IntroForm::NameConstant,
        | Expr::List(_) => IntroForm::List,
        | Expr::Tuple(_) => IntroForm::Tuple,
        | Expr::JoinedStr(_) | Expr::FormattedValue(_) => IntroForm::JoinedStr,
        | Expr::ListComp(_) => IntroForm::ListComp,
        | Expr::SetComp(_) => IntroForm::SetComp,
        | Expr::DictComp(_) => IntroForm::DictComp,
        | Expr::GeneratorExp(_) => IntroForm::GeneratorExp,
        | Expr::Name(name) if name.is_constructor() => IntroForm::Name,
        | Expr::Call(Call { func, .. }) if is_constructor_name(arena, func) => IntroForm::Call,
        | Expr::UnaryOp(UnaryOp { operand, .. })
            if matches!(arena.exprs[operand], Expr::Num(_))
                || is_constructor_name(arena, operand) =>
        {
            IntroForm::UnaryOp
        }
        | _ => return None,
    };
    Some(form)
}

pub fn classify_expr(arena: &HostArena, e: &ExprId) -> ExprShape {
    if let Some((value, ty)) = ascription(arena, e) {
        return ExprShape::Ascription { value, ty };
    }
    match &arena.exprs[e] {
        | Expr::Name(Name(id)) => ExprShape::Name(id.clone()),
        | Expr::UnaryOp(UnaryOp { operand, .. }) => {
            ExprShape::Targeted { form: TargetedForm::UnaryOp, target: *operand }
        }
        | Expr::IfExp(IfExp { test, .. }) => {
            ExprShape::Targeted { form: TargetedForm::IfExp, target: *test }
        }
        | Expr::Call(Call { func, .. }) => {
            ExprShape::Targeted { form: TargetedForm::Call, target: *func }
        }
        | Expr::Attribute(Attribute { value, .. }) => {
            ExprShape::Targeted { form: TargetedForm::Attribute, target: *value }
        }
        | Expr::Subscript(Subscript { value, .. }) => {
            ExprShape::Targeted { form: TargetedForm::Subscript, target: *value }
        }
        | Expr::BinOp(BinOp { left, right, .. }) => {
            ExprShape::Binary { form: BinaryForm::BinOp, left: *left, right: *right }
        }
        | Expr::Compare(Compare { left, comparators, .. }) => match comparators.first() {
            | Some(right) => {
                ExprShape::Binary { form: BinaryForm::Compare, left: *left, right: *right }
            }
            | None => ExprShape::Unsupported("Comparison without a right operand."),
        },
        | Expr::BoolOp(BoolOp { values, .. }) => match values.as_slice() {
            | [left, right, ..] => {
                ExprShape::Binary { form: BinaryForm::BoolOp, left: *left, right: *right }
            }
            | _ => ExprShape::Unsupported("Boolean operator with fewer than two operands."),
        },
        | Expr::Await(_) => ExprShape::Unsupported("Unsupported expression form: Await."),
        | Expr::Yield(_) => ExprShape::Unsupported("Unsupported expression form: Yield."),
        | Expr::Starred(_) => ExprShape::Unsupported("Unsupported expression form: Starred."),
        | _ => match intro_form(arena, e) {
            | Some(form) => ExprShape::Intro(form),
            | None => ExprShape::Unsupported("Unknown expression form."),
        },
    }
}

/* ------------------------------- Statements ------------------------------- */

/// The scrutinee of a scrutinizer statement `[e].match`.
pub fn scrutinee_of(arena: &HostArena, s: &StmtId) -> Option<ExprId> {
    let Stmt::Expr(e) = &arena.stmts[s] else { return None };
    let Expr::Attribute(Attribute { value, attr }) = &arena.exprs[e] else { return None };
    if attr != "match" {
        return None;
    }
    match &arena.exprs[value] {
        | Expr::List(List { elts }) => match elts.as_slice() {
            | [scrutinee] => Some(*scrutinee),
            | _ => None,
        },
        | _ => None,
    }
}

/// Reads `with pat: body` as a match rule.
pub fn rule_of(arena: &HostArena, s: &StmtId) -> Option<Rule> {
    let Stmt::With(With { items, body }) = &arena.stmts[s] else { return None };
    match items.as_slice() {
        | [WithItem { context_expr, optional_vars: None }] => {
            Some(Rule { stmt: *s, pat: *context_expr, body: *body })
        }
        | _ => None,
    }
}

pub fn classify_stmt(arena: &HostArena, s: &StmtId) -> StmtShape {
    let stmt = &arena.stmts[s];
    match stmt {
        | Stmt::Expr(e) => StmtShape::Expr(*e),
        | Stmt::If(If { test, .. }) => StmtShape::If { test: *test },
        | Stmt::FunctionDef(_) => StmtShape::FunctionDef,
        | Stmt::Delete(targets) => match targets.as_slice() {
            | [target] => StmtShape::Targeted { form: TargetedStmt::Delete, target: *target },
            | _ => StmtShape::Unsupported("typy does not support multiple deletion targets.".into()),
        },
        | Stmt::Assign(Assign { targets, .. }) => match targets.as_slice() {
            | [target] => {
                let (pat, _) = pat_and_ann(arena, target);
                match &arena.exprs[&pat] {
                    | Expr::Attribute(Attribute { value, .. })
                    | Expr::Subscript(Subscript { value, .. }) => {
                        StmtShape::Targeted { form: TargetedStmt::Assign, target: *value }
                    }
                    | _ => StmtShape::Default(DefaultStmt::Assign),
                }
            }
            | _ => StmtShape::Unsupported("typy does not support multiple targets.".into()),
        },
        | Stmt::AugAssign(AugAssign { target, .. }) => {
            StmtShape::Targeted { form: TargetedStmt::AugAssign, target: *target }
        }
        | Stmt::For(For { iter, .. }) => {
            StmtShape::Targeted { form: TargetedStmt::For, target: *iter }
        }
        | Stmt::While(While { test, .. }) => {
            StmtShape::Targeted { form: TargetedStmt::While, target: *test }
        }
        | Stmt::Return(_) => StmtShape::Default(DefaultStmt::Return),
        | Stmt::Raise(_) => StmtShape::Default(DefaultStmt::Raise),
        | Stmt::Try(_) => StmtShape::Default(DefaultStmt::Try),
        | Stmt::Assert(_) => StmtShape::Default(DefaultStmt::Assert),
        | Stmt::Pass => StmtShape::Default(DefaultStmt::Pass),
        | Stmt::Break => StmtShape::Default(DefaultStmt::Break),
        | Stmt::Continue => StmtShape::Default(DefaultStmt::Continue),
        | Stmt::With(_) => StmtShape::Unsupported("Match rule without a scrutinizer.".into()),
        | Stmt::AsyncFunctionDef(_)
        | Stmt::ClassDef(_)
        | Stmt::AsyncFor(_)
        | Stmt::AsyncWith(_)
        | Stmt::Import(_)
        | Stmt::ImportFrom(_)
        | Stmt::Global(_)
        | Stmt::Nonlocal(_) => {
            StmtShape::Unsupported(format!("Unsupported statement form: {}.", stmt.shape_name()))
        }
    }
}

/* -------------------------------- Patterns -------------------------------- */

pub fn classify_pat(arena: &HostArena, pat: &ExprId) -> PatShape {
    match &arena.exprs[pat] {
        | Expr::Name(name) if name.is_constructor() => PatShape::Name,
        | Expr::Name(Name(id)) if id == "_" => PatShape::Wildcard,
        | Expr::Name(Name(id)) => PatShape::Var(id.clone()),
        | Expr::Num(_) => PatShape::Num,
        | Expr::Str(_) => PatShape::Str,
        | Expr::NameConstant(_) => PatShape::NameConstant,
        | Expr::Tuple(_) => PatShape::Tuple,
        | Expr::List(_) => PatShape::List,
        | Expr::Dict(_) => PatShape::Dict,
        | Expr::Set(_) => PatShape::Set,
        | Expr::Call(_) => PatShape::Call,
        | Expr::UnaryOp(_) => PatShape::UnaryOp,
        | Expr::BinOp(_) => PatShape::BinOp,
        | Expr::JoinedStr(_) | Expr::FormattedValue(_) => PatShape::JoinedStr,
        | _ => PatShape::Unsupported("Unsupported pattern form."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn constructors_are_intro_forms() {
        let mut arena = HostArena::new();
        let nil = arena.name("Nil");
        let x = arena.name("x");
        let one = arena.int(1);
        let cons = arena.call_name("Cons", vec![one, nil]);
        let call = arena.call_name("f", vec![one]);
        let neg = arena.unary(UnaryOperator::USub, one);
        let neg_x = arena.unary(UnaryOperator::USub, x);
        assert_eq!(intro_form(&arena, &nil), Some(IntroForm::Name));
        assert_eq!(intro_form(&arena, &x), None);
        assert_eq!(intro_form(&arena, &cons), Some(IntroForm::Call));
        assert_eq!(intro_form(&arena, &call), None);
        assert_eq!(intro_form(&arena, &neg), Some(IntroForm::UnaryOp));
        assert_eq!(intro_form(&arena, &neg_x), None);
        // constructors still read as names and calls when synthesizing
        assert_eq!(classify_expr(&arena, &nil), ExprShape::Name("Nil".into()));
        let cons_func = match &arena.exprs[&cons] {
            | Expr::Call(Call { func, .. }) => *func,
            | _ => unreachable!(),
        };
        assert_eq!(
            classify_expr(&arena, &cons),
            ExprShape::Targeted { form: TargetedForm::Call, target: cons_func }
        );
    }

    #[test]
    fn ascriptions_are_recognized_before_subscripts() {
        let mut arena = HostArena::new();
        let num = arena.name("num");
        let x = arena.name("x");
        let asc = arena.asc(x, num);
        assert_eq!(classify_expr(&arena, &asc), ExprShape::Ascription { value: x, ty: num });
        let wild = arena.name("_");
        let not_asc = arena.asc(x, wild);
        assert_eq!(
            classify_expr(&arena, &not_asc),
            ExprShape::Targeted { form: TargetedForm::Subscript, target: x }
        );
        let zero = arena.int(0);
        let index = arena.index(x, zero);
        assert_eq!(
            classify_expr(&arena, &index),
            ExprShape::Targeted { form: TargetedForm::Subscript, target: x }
        );
    }

    #[test]
    fn assignments_to_fields_are_targeted() {
        let mut arena = HostArena::new();
        let one = arena.int(1);
        let plain = arena.assign_name("x", one);
        assert_eq!(classify_stmt(&arena, &plain), StmtShape::Default(DefaultStmt::Assign));
        let num = arena.name("num");
        let annotated = arena.assign_asc("x", num, one);
        assert_eq!(classify_stmt(&arena, &annotated), StmtShape::Default(DefaultStmt::Assign));
        let obj = arena.name("obj");
        let field = arena.attr(obj, "field");
        let to_field = arena.assign(field, one);
        assert_eq!(
            classify_stmt(&arena, &to_field),
            StmtShape::Targeted { form: TargetedStmt::Assign, target: obj }
        );
        let import = arena.import("math", None);
        assert_eq!(
            classify_stmt(&arena, &import),
            StmtShape::Unsupported("Unsupported statement form: Import.".into())
        );
    }

    #[test]
    fn scrutinizers_and_rules() {
        let mut arena = HostArena::new();
        let x = arena.name("x");
        let scrutinizer = arena.scrutinize(x);
        assert_eq!(scrutinee_of(&arena, &scrutinizer), Some(x));
        let plain = arena.expr_stmt(x);
        assert_eq!(scrutinee_of(&arena, &plain), None);
        let pat = arena.name("y");
        let body = arena.expr_stmt(pat);
        let rule = arena.rule(pat, vec![body]);
        let Some(Rule { pat: parsed, .. }) = rule_of(&arena, &rule) else {
            panic!("not a rule")
        };
        assert_eq!(parsed, pat);
        assert_eq!(classify_pat(&arena, &pat), PatShape::Var("y".into()));
        let wild = arena.name("_");
        assert_eq!(classify_pat(&arena, &wild), PatShape::Wildcard);
    }

    #[test]
    fn string_patterns_have_shapes() {
        let mut arena = HostArena::new();
        let prefix = arena.str_lit("id:");
        let rest = arena.name("rest");
        let plus = arena.bin(prefix, Operator::Add, rest);
        assert_eq!(classify_pat(&arena, &plus), PatShape::BinOp);
        let rest = arena.name("rest");
        let hole = arena.formatted(rest);
        assert_eq!(classify_pat(&arena, &hole), PatShape::JoinedStr);
        assert_eq!(fstring_parts(&arena, &hole), vec![hole]);
        let fstring = arena.joined_str(vec![prefix, hole]);
        assert_eq!(classify_pat(&arena, &fstring), PatShape::JoinedStr);
        assert_eq!(fstring_parts(&arena, &fstring), vec![prefix, hole]);
        assert_eq!(intro_form(&arena, &fstring), Some(IntroForm::JoinedStr));
        let xs = arena.name("xs");
        let x = arena.name("x");
        let r#gen = HostArena::comprehension(x, xs, Vec::new());
        let comp = arena.list_comp(x, vec![r#gen]);
        assert_eq!(classify_expr(&arena, &comp), ExprShape::Intro(IntroForm::ListComp));
    }
}
