//! Builders for host syntax.
//!
//! Besides the plain host forms, this covers the surface idioms the checker
//! recognizes: ascriptions `e [: T]`, type members `t [type] = T`, the match
//! scrutinizer `[e].match` and its rule clauses `with pat: ...`.

use crate::*;

/* ------------------------------- Expressions ------------------------------ */

impl HostArena {
    pub fn name(&mut self, id: &str) -> ExprId {
        self.expr(Name::from(id))
    }
    pub fn int(&mut self, n: i64) -> ExprId {
        self.expr(Num::Int(n))
    }
    pub fn float(&mut self, x: f64) -> ExprId {
        self.expr(Num::Float(x))
    }
    pub fn imag(&mut self, x: f64) -> ExprId {
        self.expr(Num::Imag(x))
    }
    pub fn str_lit(&mut self, s: &str) -> ExprId {
        self.expr(Str(s.to_string()))
    }
    pub fn bool_lit(&mut self, b: bool) -> ExprId {
        self.expr(if b { NameConstant::True } else { NameConstant::False })
    }
    pub fn none(&mut self) -> ExprId {
        self.expr(NameConstant::None)
    }
    pub fn tuple(&mut self, elts: Vec<ExprId>) -> ExprId {
        self.expr(Tuple { elts })
    }
    pub fn list(&mut self, elts: Vec<ExprId>) -> ExprId {
        self.expr(List { elts })
    }
    pub fn set(&mut self, elts: Vec<ExprId>) -> ExprId {
        self.expr(Set { elts })
    }
    pub fn dict(&mut self, entries: Vec<(ExprId, ExprId)>) -> ExprId {
        let (keys, values) = entries.into_iter().unzip();
        self.expr(Dict { keys, values })
    }
    pub fn attr(&mut self, value: ExprId, attr: &str) -> ExprId {
        self.expr(Attribute { value, attr: attr.to_string() })
    }
    pub fn index(&mut self, value: ExprId, index: ExprId) -> ExprId {
        self.expr(Subscript { value, slice: Slice::Index(index) })
    }
    pub fn subscript(&mut self, value: ExprId, slice: Slice) -> ExprId {
        self.expr(Subscript { value, slice })
    }
    pub fn range(
        lower: Option<ExprId>, upper: Option<ExprId>, step: Option<ExprId>,
    ) -> Slice {
        Slice::Range(Range { lower, upper, step })
    }
    /// `value [: ty]`
    pub fn asc(&mut self, value: ExprId, ty: ExprId) -> ExprId {
        self.subscript(value, Self::range(None, Some(ty), None))
    }
    /// `name [: ty]`
    pub fn name_asc(&mut self, name: &str, ty: ExprId) -> ExprId {
        let name = self.name(name);
        self.asc(name, ty)
    }
    pub fn call(&mut self, func: ExprId, args: Vec<ExprId>) -> ExprId {
        self.expr(Call { func, args, keywords: Vec::new() })
    }
    pub fn call_name(&mut self, func: &str, args: Vec<ExprId>) -> ExprId {
        let func = self.name(func);
        self.call(func, args)
    }
    pub fn bin(&mut self, left: ExprId, op: Operator, right: ExprId) -> ExprId {
        self.expr(BinOp { left, op, right })
    }
    pub fn unary(&mut self, op: UnaryOperator, operand: ExprId) -> ExprId {
        self.expr(UnaryOp { op, operand })
    }
    pub fn compare(&mut self, left: ExprId, op: CmpOp, right: ExprId) -> ExprId {
        self.expr(Compare { left, ops: vec![op], comparators: vec![right] })
    }
    pub fn bool_op(&mut self, op: BoolOperator, values: Vec<ExprId>) -> ExprId {
        self.expr(BoolOp { op, values })
    }
    /// `left and right`, flattening when either side is already a conjunction.
    pub fn and(&mut self, left: ExprId, right: ExprId) -> ExprId {
        let mut values = Vec::new();
        for e in [left, right] {
            match &self.exprs[&e] {
                | Expr::BoolOp(BoolOp { op: BoolOperator::And, values: vs }) => {
                    values.extend(vs.iter().copied())
                }
                | _ => values.push(e),
            }
        }
        self.bool_op(BoolOperator::And, values)
    }
    pub fn if_exp(&mut self, test: ExprId, body: ExprId, orelse: ExprId) -> ExprId {
        self.expr(IfExp { test, body, orelse })
    }
    pub fn lambda(&mut self, params: &[&str], body: ExprId) -> ExprId {
        self.expr(Lambda { args: Arguments::positional(params.iter().copied()), body })
    }
    /// `f"..."` from literal parts and formatted values
    pub fn joined_str(&mut self, values: Vec<ExprId>) -> ExprId {
        self.expr(JoinedStr { values })
    }
    /// `{value}` inside an f-string
    pub fn formatted(&mut self, value: ExprId) -> ExprId {
        self.expr(FormattedValue { value, conversion: None, format_spec: None })
    }
    pub fn comprehension(target: ExprId, iter: ExprId, ifs: Vec<ExprId>) -> Comprehension {
        Comprehension { target, iter, ifs }
    }
    pub fn list_comp(&mut self, elt: ExprId, generators: Vec<Comprehension>) -> ExprId {
        self.expr(ListComp { elt, generators })
    }
    pub fn dict_comp(
        &mut self, key: ExprId, value: ExprId, generators: Vec<Comprehension>,
    ) -> ExprId {
        self.expr(DictComp { key, value, generators })
    }
    pub fn generator_exp(&mut self, elt: ExprId, generators: Vec<Comprehension>) -> ExprId {
        self.expr(GeneratorExp { elt, generators })
    }
    /// `[scrutinee].match`
    pub fn scrutinizer(&mut self, scrutinee: ExprId) -> ExprId {
        let list = self.list(vec![scrutinee]);
        self.attr(list, "match")
    }
}

/* ------------------------------- Statements ------------------------------- */

impl HostArena {
    pub fn expr_stmt(&mut self, e: ExprId) -> StmtId {
        self.stmt(Stmt::Expr(e))
    }
    pub fn pass(&mut self) -> StmtId {
        self.stmt(Stmt::Pass)
    }
    pub fn ret(&mut self, value: Option<ExprId>) -> StmtId {
        self.stmt(Stmt::Return(value))
    }
    pub fn raise(&mut self, exc: ExprId) -> StmtId {
        self.stmt(Stmt::Raise(Raise { exc: Some(exc), cause: None }))
    }
    pub fn assign(&mut self, target: ExprId, value: ExprId) -> StmtId {
        self.stmt(Stmt::Assign(Assign { targets: vec![target], value }))
    }
    pub fn assign_name(&mut self, name: &str, value: ExprId) -> StmtId {
        let target = self.name(name);
        self.assign(target, value)
    }
    /// `name [: ty] = value`
    pub fn assign_asc(&mut self, name: &str, ty: ExprId, value: ExprId) -> StmtId {
        let target = self.name_asc(name, ty);
        self.assign(target, value)
    }
    /// `name [type] = ty`
    pub fn type_member(&mut self, name: &str, ty: ExprId) -> StmtId {
        let target = self.name(name);
        let kw = self.name("type");
        let target = self.index(target, kw);
        self.assign(target, ty)
    }
    pub fn if_stmt(&mut self, test: ExprId, body: Vec<StmtId>, orelse: Vec<StmtId>) -> StmtId {
        let body = self.block(body);
        let orelse = self.block(orelse);
        self.stmt(Stmt::If(If { test, body, orelse }))
    }
    pub fn while_stmt(&mut self, test: ExprId, body: Vec<StmtId>) -> StmtId {
        let body = self.block(body);
        let orelse = self.block(Vec::new());
        self.stmt(Stmt::While(While { test, body, orelse }))
    }
    /// `[scrutinee].match` as a statement
    pub fn scrutinize(&mut self, scrutinee: ExprId) -> StmtId {
        let e = self.scrutinizer(scrutinee);
        self.expr_stmt(e)
    }
    /// `with pat: body`
    pub fn rule(&mut self, pat: ExprId, body: Vec<StmtId>) -> StmtId {
        let body = self.block(body);
        let items = vec![WithItem { context_expr: pat, optional_vars: None }];
        self.stmt(Stmt::With(With { items, body }))
    }
    pub fn import(&mut self, name: &str, asname: Option<&str>) -> StmtId {
        let alias = Alias { name: name.to_string(), asname: asname.map(str::to_string) };
        self.stmt(Stmt::Import(vec![alias]))
    }
    /// A `def` with annotated positional parameters.
    pub fn def(
        &mut self, name: &str, params: Vec<(&str, Option<ExprId>)>, returns: Option<ExprId>,
        decorators: Vec<ExprId>, body: Vec<StmtId>,
    ) -> StmtId {
        let args = Arguments {
            args: params
                .into_iter()
                .map(|(arg, annotation)| Arg { arg: arg.to_string(), annotation })
                .collect(),
            ..Default::default()
        };
        let body = self.block(body);
        self.stmt(Stmt::FunctionDef(FunctionDef {
            name: name.to_string(),
            args,
            body,
            decorators,
            returns,
        }))
    }
}
