//! The formatter traits, and host syntax rendered as source text.
//!
//! Expressions render on one line (`Ugly`) with every compound subexpression
//! parenthesized; statements lay out as indented blocks (`Pretty`).

use crate::*;

#[impl_tools::autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>, std::rc::Rc<T>, std::sync::Arc<T>)]
pub trait Ugly<'a, Fmter> {
    fn ugly(&self, f: &'a Fmter) -> String;
}

use pretty::RcDoc;

#[impl_tools::autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>, std::rc::Rc<T>, std::sync::Arc<T>)]
pub trait Pretty<'a, Fmter> {
    fn pretty(&self, f: &'a Fmter) -> RcDoc<'a>;
}

/* -------------------------------- Formatter ------------------------------- */

pub struct Formatter<'arena> {
    arena: &'arena HostArena,
    pub indent: isize,
    pub width: usize,
}

impl<'arena> Formatter<'arena> {
    pub fn new(arena: &'arena HostArena) -> Self {
        Formatter { arena, indent: 4, width: 100 }
    }
    pub fn render(&self, doc: RcDoc<'_>) -> String {
        let mut s = String::new();
        match doc.render_fmt(self.width, &mut s) {
            | Ok(()) => s,
            | Err(_) => String::from("<unprintable>"),
        }
    }
    /// Source text of a statement list.
    pub fn source(&'arena self, stmts: &[StmtId]) -> String {
        self.render(self.stmts(stmts))
    }
    fn stmts(&'arena self, stmts: &[StmtId]) -> RcDoc<'arena> {
        if stmts.is_empty() {
            return RcDoc::text("pass");
        }
        let mut doc = RcDoc::nil();
        for (i, stmt) in stmts.iter().enumerate() {
            if i > 0 {
                doc = doc.append(RcDoc::hardline());
            }
            doc = doc.append(stmt.pretty(self));
        }
        doc
    }
    fn suite(&'arena self, header: String, block: &BlockId) -> RcDoc<'arena> {
        RcDoc::text(header).append(
            RcDoc::concat([RcDoc::hardline(), self.stmts(self.arena.stmts_of(block))])
                .nest(self.indent),
        )
    }
    fn exprs(&self, exprs: &[ExprId]) -> String {
        exprs.iter().map(|e| e.ugly(self)).collect::<Vec<_>>().join(", ")
    }
    fn generators(&self, generators: &[Comprehension]) -> String {
        let mut s = String::new();
        for Comprehension { target, iter, ifs } in generators {
            s += &format!(" for {} in {}", target.ugly(self), iter.ugly(self));
            for cond in ifs {
                s += &format!(" if {}", cond.ugly(self));
            }
        }
        s
    }
    /// The body of an f-string, without quotes.
    fn fstring_body(&self, e: &Expr) -> String {
        match e {
            | Expr::JoinedStr(JoinedStr { values }) => {
                values.iter().map(|v| self.fstring_body(&self.arena.exprs[v])).collect()
            }
            | Expr::Str(Str(lit)) => {
                let quoted = str_repr(lit);
                quoted[1..quoted.len() - 1].replace('{', "{{").replace('}', "}}")
            }
            | Expr::FormattedValue(FormattedValue { value, conversion, format_spec }) => {
                let mut s = format!("{{{}", value.ugly(self));
                if let Some(c) = conversion {
                    s += &format!("!{}", c);
                }
                if let Some(spec) = format_spec {
                    s += &format!(":{}", self.fstring_body(&self.arena.exprs[spec]));
                }
                s += "}";
                s
            }
            | e => format!("{{{}}}", e.ugly(self)),
        }
    }
}

/* ------------------------------- Expressions ------------------------------ */

pub fn str_repr(s: &str) -> String {
    let mut out = String::from("'");
    for c in s.chars() {
        match c {
            | '\\' => out += "\\\\",
            | '\'' => out += "\\'",
            | '\n' => out += "\\n",
            | '\t' => out += "\\t",
            | c => out.push(c),
        }
    }
    out += "'";
    out
}

pub fn float_repr(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{:.1}", x)
    } else {
        format!("{:?}", x)
    }
}

impl<'a> Ugly<'a, Formatter<'a>> for Num {
    fn ugly(&self, _f: &'a Formatter) -> String {
        match self {
            | Num::Int(n) => n.to_string(),
            | Num::Float(x) => float_repr(*x),
            | Num::Imag(x) => {
                let repr = float_repr(*x);
                format!("{}j", repr.strip_suffix(".0").unwrap_or(&repr))
            }
        }
    }
}

impl<'a> Ugly<'a, Formatter<'a>> for Slice {
    fn ugly(&self, f: &'a Formatter) -> String {
        match self {
            | Slice::Index(e) => e.ugly(f),
            | Slice::Range(Range { lower, upper, step }) => {
                let part = |e: &Option<ExprId>| e.map(|e| e.ugly(f)).unwrap_or_default();
                let mut s = format!("{}:{}", part(lower), part(upper));
                if step.is_some() {
                    s += &format!(":{}", part(step));
                }
                s
            }
            | Slice::Ext(dims) => {
                dims.iter().map(|dim| dim.ugly(f)).collect::<Vec<_>>().join(", ")
            }
        }
    }
}

impl<'a> Ugly<'a, Formatter<'a>> for Arguments {
    fn ugly(&self, f: &'a Formatter) -> String {
        let Arguments { args, vararg, kwonlyargs, kwarg, defaults } = self;
        let arg = |Arg { arg, annotation }: &Arg| match annotation {
            | Some(ann) => format!("{}: {}", arg, ann.ugly(f)),
            | None => arg.clone(),
        };
        let mut parts = Vec::new();
        let first_default = args.len().saturating_sub(defaults.len());
        for (i, a) in args.iter().enumerate() {
            match i.checked_sub(first_default).and_then(|d| defaults.get(d)) {
                | Some(default) => parts.push(format!("{}={}", arg(a), default.ugly(f))),
                | None => parts.push(arg(a)),
            }
        }
        if let Some(a) = vararg {
            parts.push(format!("*{}", arg(a)));
        } else if !kwonlyargs.is_empty() {
            parts.push("*".to_string());
        }
        parts.extend(kwonlyargs.iter().map(arg));
        if let Some(a) = kwarg {
            parts.push(format!("**{}", arg(a)));
        }
        parts.join(", ")
    }
}

impl<'a> Ugly<'a, Formatter<'a>> for ExprId {
    fn ugly(&self, f: &'a Formatter) -> String {
        f.arena.exprs[self].ugly(f)
    }
}

impl<'a> Ugly<'a, Formatter<'a>> for Expr {
    fn ugly(&self, f: &'a Formatter) -> String {
        let mut s = String::new();
        match self {
            | Expr::BoolOp(BoolOp { op, values }) => {
                let sep = format!(" {} ", op);
                s += "(";
                s += &values.iter().map(|v| v.ugly(f)).collect::<Vec<_>>().join(&sep);
                s += ")";
            }
            | Expr::BinOp(BinOp { left, op, right }) => {
                s += &format!("({} {} {})", left.ugly(f), op, right.ugly(f));
            }
            | Expr::UnaryOp(UnaryOp { op, operand }) => {
                s += &format!("({}{})", op.symbol(), operand.ugly(f));
            }
            | Expr::Lambda(Lambda { args, body }) => {
                let args = args.ugly(f);
                if args.is_empty() {
                    s += &format!("(lambda: {})", body.ugly(f));
                } else {
                    s += &format!("(lambda {}: {})", args, body.ugly(f));
                }
            }
            | Expr::IfExp(IfExp { test, body, orelse }) => {
                s += &format!("({} if {} else {})", body.ugly(f), test.ugly(f), orelse.ugly(f));
            }
            | Expr::Dict(Dict { keys, values }) => {
                let entries: Vec<_> = keys
                    .iter()
                    .zip(values)
                    .map(|(k, v)| format!("{}: {}", k.ugly(f), v.ugly(f)))
                    .collect();
                s += &format!("{{{}}}", entries.join(", "));
            }
            | Expr::Set(Set { elts }) => {
                s += &format!("{{{}}}", f.exprs(elts));
            }
            | Expr::Compare(Compare { left, ops, comparators }) => {
                s += "(";
                s += &left.ugly(f);
                for (op, comparator) in ops.iter().zip(comparators) {
                    s += &format!(" {} {}", op, comparator.ugly(f));
                }
                s += ")";
            }
            | Expr::Call(Call { func, args, keywords }) => {
                let mut parts: Vec<_> = args.iter().map(|a| a.ugly(f)).collect();
                parts.extend(keywords.iter().map(|Keyword { arg, value }| match arg {
                    | Some(arg) => format!("{}={}", arg, value.ugly(f)),
                    | None => format!("**{}", value.ugly(f)),
                }));
                s += &format!("{}({})", func.ugly(f), parts.join(", "));
            }
            | Expr::Num(num) => s += &num.ugly(f),
            | Expr::Str(Str(lit)) => s += &str_repr(lit),
            | Expr::NameConstant(c) => {
                s += match c {
                    | NameConstant::True => "True",
                    | NameConstant::False => "False",
                    | NameConstant::None => "None",
                }
            }
            | Expr::Attribute(Attribute { value, attr }) => {
                s += &format!("{}.{}", value.ugly(f), attr);
            }
            | Expr::Subscript(Subscript { value, slice }) => {
                s += &format!("{}[{}]", value.ugly(f), slice.ugly(f));
            }
            | Expr::Name(Name(id)) => s += id,
            | Expr::List(List { elts }) => s += &format!("[{}]", f.exprs(elts)),
            | Expr::Tuple(Tuple { elts }) => {
                if elts.len() == 1 {
                    s += &format!("({},)", elts[0].ugly(f));
                } else {
                    s += &format!("({})", f.exprs(elts));
                }
            }
            | Expr::JoinedStr(_) | Expr::FormattedValue(_) => {
                s += &format!("f'{}'", f.fstring_body(self));
            }
            | Expr::ListComp(ListComp { elt, generators }) => {
                s += &format!("[{}{}]", elt.ugly(f), f.generators(generators));
            }
            | Expr::SetComp(SetComp { elt, generators }) => {
                s += &format!("{{{}{}}}", elt.ugly(f), f.generators(generators));
            }
            | Expr::DictComp(DictComp { key, value, generators }) => {
                let gens = f.generators(generators);
                s += &format!("{{{}: {}{}}}", key.ugly(f), value.ugly(f), gens);
            }
            | Expr::GeneratorExp(GeneratorExp { elt, generators }) => {
                s += &format!("({}{})", elt.ugly(f), f.generators(generators));
            }
            | Expr::Await(Await(e)) => s += &format!("(await {})", e.ugly(f)),
            | Expr::Yield(Yield(e)) => match e {
                | Some(e) => s += &format!("(yield {})", e.ugly(f)),
                | None => s += "(yield)",
            },
            | Expr::Starred(Starred(e)) => s += &format!("*{}", e.ugly(f)),
        }
        s
    }
}

/* ------------------------------- Statements ------------------------------- */

impl<'a> Ugly<'a, Formatter<'a>> for StmtId {
    fn ugly(&self, f: &'a Formatter) -> String {
        f.render(self.pretty(f))
    }
}

impl<'a> Ugly<'a, Formatter<'a>> for BlockId {
    fn ugly(&self, f: &'a Formatter) -> String {
        f.render(self.pretty(f))
    }
}

impl<'a> Pretty<'a, Formatter<'a>> for BlockId {
    fn pretty(&self, f: &'a Formatter) -> RcDoc<'a> {
        f.stmts(f.arena.stmts_of(self))
    }
}

impl<'a> Pretty<'a, Formatter<'a>> for StmtId {
    fn pretty(&self, f: &'a Formatter) -> RcDoc<'a> {
        f.arena.stmts[self].pretty(f)
    }
}

impl<'a> Pretty<'a, Formatter<'a>> for FunctionDef {
    fn pretty(&self, f: &'a Formatter) -> RcDoc<'a> {
        let FunctionDef { name, args, body, decorators, returns } = self;
        let mut doc = RcDoc::nil();
        for dec in decorators {
            doc = doc.append(RcDoc::text(format!("@{}", dec.ugly(f)))).append(RcDoc::hardline());
        }
        let mut header = format!("def {}({})", name, args.ugly(f));
        if let Some(ret) = returns {
            header += &format!(" -> {}", ret.ugly(f));
        }
        header += ":";
        doc.append(f.suite(header, body))
    }
}

impl<'a> Pretty<'a, Formatter<'a>> for Stmt {
    fn pretty(&self, f: &'a Formatter) -> RcDoc<'a> {
        match self {
            | Stmt::FunctionDef(def) => def.pretty(f),
            | Stmt::AsyncFunctionDef(def) => RcDoc::text("async ").append(def.pretty(f)),
            | Stmt::ClassDef(ClassDef { name, bases, body }) => {
                let header = if bases.is_empty() {
                    format!("class {}:", name)
                } else {
                    format!("class {}({}):", name, f.exprs(bases))
                };
                f.suite(header, body)
            }
            | Stmt::Return(value) => match value {
                | Some(value) => RcDoc::text(format!("return {}", value.ugly(f))),
                | None => RcDoc::text("return"),
            },
            | Stmt::Delete(targets) => RcDoc::text(format!("del {}", f.exprs(targets))),
            | Stmt::Assign(Assign { targets, value }) => {
                let mut s = String::new();
                for target in targets {
                    s += &format!("{} = ", target.ugly(f));
                }
                s += &value.ugly(f);
                RcDoc::text(s)
            }
            | Stmt::AugAssign(AugAssign { target, op, value }) => {
                RcDoc::text(format!("{} {}= {}", target.ugly(f), op, value.ugly(f)))
            }
            | Stmt::For(stmt) | Stmt::AsyncFor(stmt) => {
                let For { target, iter, body, orelse } = stmt;
                let prefix = if matches!(self, Stmt::AsyncFor(_)) { "async " } else { "" };
                let header = format!("{}for {} in {}:", prefix, target.ugly(f), iter.ugly(f));
                f.suite(header, body).append(else_suite(f, orelse))
            }
            | Stmt::While(While { test, body, orelse }) => {
                f.suite(format!("while {}:", test.ugly(f)), body).append(else_suite(f, orelse))
            }
            | Stmt::If(stmt) => if_chain(f, "if", stmt),
            | Stmt::With(With { items, body }) | Stmt::AsyncWith(With { items, body }) => {
                let prefix = if matches!(self, Stmt::AsyncWith(_)) { "async " } else { "" };
                let items: Vec<_> = items
                    .iter()
                    .map(|WithItem { context_expr, optional_vars }| match optional_vars {
                        | Some(vars) => format!("{} as {}", context_expr.ugly(f), vars.ugly(f)),
                        | None => context_expr.ugly(f),
                    })
                    .collect();
                f.suite(format!("{}with {}:", prefix, items.join(", ")), body)
            }
            | Stmt::Raise(Raise { exc, cause }) => {
                let mut s = String::from("raise");
                if let Some(exc) = exc {
                    s += &format!(" {}", exc.ugly(f));
                }
                if let Some(cause) = cause {
                    s += &format!(" from {}", cause.ugly(f));
                }
                RcDoc::text(s)
            }
            | Stmt::Try(Try { body, handlers, orelse, finalbody }) => {
                let mut doc = f.suite("try:".to_string(), body);
                for ExceptHandler { ty, name, body } in handlers {
                    let header = match (ty, name) {
                        | (Some(ty), Some(name)) => format!("except {} as {}:", ty.ugly(f), name),
                        | (Some(ty), None) => format!("except {}:", ty.ugly(f)),
                        | (None, _) => "except:".to_string(),
                    };
                    doc = doc.append(RcDoc::hardline()).append(f.suite(header, body));
                }
                doc = doc.append(else_suite(f, orelse));
                if !f.arena.stmts_of(finalbody).is_empty() {
                    doc = doc
                        .append(RcDoc::hardline())
                        .append(f.suite("finally:".to_string(), finalbody));
                }
                doc
            }
            | Stmt::Assert(Assert { test, msg }) => match msg {
                | Some(msg) => RcDoc::text(format!("assert {}, {}", test.ugly(f), msg.ugly(f))),
                | None => RcDoc::text(format!("assert {}", test.ugly(f))),
            },
            | Stmt::Import(names) => RcDoc::text(format!("import {}", aliases(names))),
            | Stmt::ImportFrom(ImportFrom { module, names }) => RcDoc::text(format!(
                "from {} import {}",
                module.as_deref().unwrap_or("."),
                aliases(names)
            )),
            | Stmt::Global(names) => RcDoc::text(format!("global {}", names.join(", "))),
            | Stmt::Nonlocal(names) => RcDoc::text(format!("nonlocal {}", names.join(", "))),
            | Stmt::Expr(e) => RcDoc::text(e.ugly(f)),
            | Stmt::Pass => RcDoc::text("pass"),
            | Stmt::Break => RcDoc::text("break"),
            | Stmt::Continue => RcDoc::text("continue"),
        }
    }
}

fn aliases(names: &[Alias]) -> String {
    names
        .iter()
        .map(|Alias { name, asname }| match asname {
            | Some(asname) => format!("{} as {}", name, asname),
            | None => name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn else_suite<'a>(f: &'a Formatter, orelse: &BlockId) -> RcDoc<'a> {
    if f.arena.stmts_of(orelse).is_empty() {
        RcDoc::nil()
    } else {
        RcDoc::hardline().append(f.suite("else:".to_string(), orelse))
    }
}

/// An `if` whose `else` holds exactly one `if` renders that one as `elif`.
fn if_chain<'a>(f: &'a Formatter, keyword: &str, stmt: &If) -> RcDoc<'a> {
    let If { test, body, orelse } = stmt;
    let doc = f.suite(format!("{} {}:", keyword, test.ugly(f)), body);
    match f.arena.stmts_of(orelse) {
        | [] => doc,
        | [single] => match &f.arena.stmts[single] {
            | Stmt::If(nested) => doc.append(RcDoc::hardline()).append(if_chain(f, "elif", nested)),
            | _ => doc.append(else_suite(f, orelse)),
        },
        | _ => doc.append(else_suite(f, orelse)),
    }
}
