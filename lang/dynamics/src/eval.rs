use crate::{builtin, err::*, impls, syntax::*};
use std::{cell::RefCell, rc::Rc};

/// Nested calls allowed before the runtime gives up.
pub const MAX_DEPTH: usize = 256;

pub trait Eval {
    type Out;
    fn eval(&self, runtime: &mut Runtime, env: &RcFrame) -> Result<Self::Out>;
}

/* ---------------------------------- Frame --------------------------------- */

impl Frame {
    pub fn root() -> RcFrame {
        Rc::new(RefCell::new(Frame::default()))
    }
    pub fn child(parent: &RcFrame) -> RcFrame {
        Rc::new(RefCell::new(Frame { vars: Default::default(), parent: Some(parent.clone()) }))
    }
    pub fn define(env: &RcFrame, name: impl Into<String>, value: Value) {
        env.borrow_mut().vars.insert(name.into(), value);
    }
    /// Walks the frame chain, then falls back to the builtins.
    pub fn lookup(env: &RcFrame, name: &str) -> Option<Value> {
        let mut frame = env.clone();
        loop {
            let parent = {
                let current = frame.borrow();
                if let Some(value) = current.vars.get(name) {
                    return Some(value.clone());
                }
                current.parent.clone()
            };
            match parent {
                | Some(parent) => frame = parent,
                | None => break,
            }
        }
        builtin::BUILTINS.get(name).map(|builtin| Value::Builtin(*builtin))
    }
}

/* --------------------------------- Runtime -------------------------------- */

impl Runtime {
    pub fn new(arena: Rc<HostArena>) -> Self {
        Runtime { arena, depth: 0 }
    }
    pub fn arena(&self) -> &HostArena {
        &self.arena
    }
    /// Runs a module body in `globals` and packages what it defined.
    pub fn run_module(
        &mut self, name: &str, body: &[StmtId], globals: RcFrame,
    ) -> Result<Rc<Module>> {
        log::debug!("running module `{}` ({} statements)", name, body.len());
        match self.exec_stmts(body, &globals)? {
            | Flow::Next => {}
            | Flow::Return(_) => Err(RuntimeError::Misplaced("return"))?,
            | Flow::Break => Err(RuntimeError::Misplaced("break"))?,
            | Flow::Continue => Err(RuntimeError::Misplaced("continue"))?,
        }
        let mut members: Vec<_> =
            globals.borrow().vars.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        members.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(Rc::new(Module { name: name.to_string(), members: members.into_iter().collect() }))
    }
    pub fn exec_stmts(&mut self, stmts: &[StmtId], env: &RcFrame) -> Result<Flow> {
        for stmt in stmts {
            match stmt.eval(self, env)? {
                | Flow::Next => {}
                | flow => return Ok(flow),
            }
        }
        Ok(Flow::Next)
    }
    pub fn call(
        &mut self, func: &Value, args: Vec<Value>, keywords: Vec<(String, Value)>,
    ) -> Result<Value> {
        match func {
            | Value::Builtin(Builtin { name, body }) => {
                if !keywords.is_empty() {
                    return Err(RuntimeError::Type(format!(
                        "{}() takes no keyword arguments",
                        name
                    )));
                }
                body(name, args)
            }
            | Value::Func(closure) => self.call_closure(closure, args, keywords),
            | Value::Method(method) => {
                if !keywords.is_empty() {
                    return Err(RuntimeError::Type(format!(
                        "{}() takes no keyword arguments",
                        method.name
                    )));
                }
                impls::call_method(method, args)
            }
            | other => {
                Err(RuntimeError::Type(format!("'{}' object is not callable", other.type_name())))
            }
        }
    }
    fn call_closure(
        &mut self, closure: &Rc<Closure>, args: Vec<Value>, keywords: Vec<(String, Value)>,
    ) -> Result<Value> {
        let Closure { name, params, body, env, arena } = closure.as_ref();
        if self.depth >= MAX_DEPTH {
            return Err(RuntimeError::Recursion);
        }
        if args.len() > params.len() {
            return Err(RuntimeError::Type(format!(
                "{}() takes {} positional arguments but {} were given",
                name,
                params.len(),
                args.len()
            )));
        }
        let frame = Frame::child(env);
        let mut bound = vec![false; params.len()];
        for (i, arg) in args.into_iter().enumerate() {
            Frame::define(&frame, params[i].clone(), arg);
            bound[i] = true;
        }
        for (key, arg) in keywords {
            let Some(i) = params.iter().position(|p| *p == key) else {
                return Err(RuntimeError::Type(format!(
                    "{}() got an unexpected keyword argument '{}'",
                    name, key
                )));
            };
            if bound[i] {
                return Err(RuntimeError::Type(format!(
                    "{}() got multiple values for argument '{}'",
                    name, key
                )));
            }
            Frame::define(&frame, key, arg);
            bound[i] = true;
        }
        if let Some(i) = bound.iter().position(|b| !b) {
            return Err(RuntimeError::Type(format!(
                "{}() missing required positional argument: '{}'",
                name, params[i]
            )));
        }
        let saved = std::mem::replace(&mut self.arena, arena.clone());
        self.depth += 1;
        let res = match body {
            | Body::Block(block) => match block.eval(self, &frame) {
                | Ok(Flow::Return(value)) => Ok(value),
                | Ok(Flow::Next) => Ok(Value::None),
                | Ok(Flow::Break) => Err(RuntimeError::Misplaced("break")),
                | Ok(Flow::Continue) => Err(RuntimeError::Misplaced("continue")),
                | Err(err) => Err(err),
            },
            | Body::Expr(e) => e.eval(self, &frame),
        };
        self.depth -= 1;
        self.arena = saved;
        res
    }
    /// Runs `each` once per combination the generators produce, in a scope
    /// holding their targets.
    fn comprehend(
        &mut self, generators: &[Comprehension], scope: &RcFrame,
        each: &mut dyn FnMut(&mut Runtime, &RcFrame) -> Result<()>,
    ) -> Result<()> {
        let Some((Comprehension { target, iter, ifs }, rest)) = generators.split_first() else {
            return each(self, scope);
        };
        let iter = iter.eval(self, scope)?;
        'items: for item in impls::iterate(&iter)? {
            self.assign(target, item, scope)?;
            for cond in ifs {
                if !cond.eval(self, scope)?.truthy() {
                    continue 'items;
                }
            }
            self.comprehend(rest, scope, each)?;
        }
        Ok(())
    }
    fn assign(&mut self, target: &ExprId, value: Value, env: &RcFrame) -> Result<()> {
        let arena = self.arena.clone();
        match &arena.exprs[target] {
            | Expr::Name(Name(id)) => {
                Frame::define(env, id.clone(), value);
                Ok(())
            }
            | Expr::Tuple(Tuple { elts }) | Expr::List(List { elts }) => {
                let values = value.elements().ok_or_else(|| {
                    RuntimeError::Type(format!(
                        "cannot unpack non-iterable {} object",
                        value.type_name()
                    ))
                })?;
                if values.len() != elts.len() {
                    return Err(RuntimeError::Value(format!(
                        "expected {} values to unpack, got {}",
                        elts.len(),
                        values.len()
                    )));
                }
                for (elt, value) in elts.iter().zip(values) {
                    self.assign(elt, value, env)?;
                }
                Ok(())
            }
            | Expr::Subscript(Subscript { value: container, slice: Slice::Index(idx) }) => {
                let container = container.eval(self, env)?;
                let idx = idx.eval(self, env)?;
                match &container {
                    | Value::List(elts) => {
                        let mut elts = elts.borrow_mut();
                        let len = elts.len() as i64;
                        let i = idx.as_int().map(|i| if i < 0 { i + len } else { i });
                        match i {
                            | Some(i) if (0..len).contains(&i) => {
                                elts[i as usize] = value;
                                Ok(())
                            }
                            | _ => Err(RuntimeError::Index(format!(
                                "list assignment index out of range"
                            ))),
                        }
                    }
                    | Value::Dict(entries) => {
                        let mut entries = entries.borrow_mut();
                        match entries.iter_mut().find(|(k, _)| impls::py_eq(k, &idx)) {
                            | Some((_, slot)) => *slot = value,
                            | None => entries.push((idx, value)),
                        }
                        Ok(())
                    }
                    | other => Err(RuntimeError::Type(format!(
                        "'{}' object does not support item assignment",
                        other.type_name()
                    ))),
                }
            }
            | other => Err(RuntimeError::Unsupported(format!(
                "cannot assign to {}",
                other.shape_name()
            ))),
        }
    }
    fn raise(&mut self, exc: &Value) -> RuntimeError {
        match exc {
            | Value::Exception(exc) => exc.as_ref().clone().into(),
            | Value::Builtin(Builtin { name, body }) => match body(name, Vec::new()) {
                | Ok(Value::Exception(exc)) => exc.as_ref().clone().into(),
                | _ => RuntimeError::Type(format!("exceptions must derive from BaseException")),
            },
            | _ => RuntimeError::Type(format!("exceptions must derive from BaseException")),
        }
    }
    fn handles(&mut self, handler: &ExceptHandler, err: &RuntimeError, env: &RcFrame) -> Result<bool> {
        let Some(ty) = &handler.ty else { return Ok(true) };
        let matches = |v: &Value| match v {
            | Value::Builtin(Builtin { name, .. }) => *name == "Exception" || *name == err.kind(),
            | _ => false,
        };
        let ty = ty.eval(self, env)?;
        Ok(match &ty {
            | Value::Tuple(alts) => alts.iter().any(matches),
            | single => matches(single),
        })
    }
}

/* ---------------------------------- Eval ---------------------------------- */

impl Eval for BlockId {
    type Out = Flow;
    fn eval(&self, runtime: &mut Runtime, env: &RcFrame) -> Result<Flow> {
        let arena = runtime.arena.clone();
        runtime.exec_stmts(arena.stmts_of(self), env)
    }
}

impl Eval for ExprId {
    type Out = Value;
    fn eval(&self, runtime: &mut Runtime, env: &RcFrame) -> Result<Value> {
        let arena = runtime.arena.clone();
        let many = |runtime: &mut Runtime, es: &[ExprId]| -> Result<Vec<Value>> {
            es.iter().map(|e| e.eval(runtime, env)).collect()
        };
        match &arena.exprs[self] {
            | Expr::BoolOp(BoolOp { op, values }) => {
                let mut last = Value::None;
                for value in values {
                    last = value.eval(runtime, env)?;
                    let done = match op {
                        | BoolOperator::And => !last.truthy(),
                        | BoolOperator::Or => last.truthy(),
                    };
                    if done {
                        break;
                    }
                }
                Ok(last)
            }
            | Expr::BinOp(BinOp { left, op, right }) => {
                let l = left.eval(runtime, env)?;
                let r = right.eval(runtime, env)?;
                impls::binary(op, &l, &r)
            }
            | Expr::UnaryOp(UnaryOp { op, operand }) => {
                let v = operand.eval(runtime, env)?;
                impls::unary(op, &v)
            }
            | Expr::Lambda(Lambda { args, body }) => Ok(Value::Func(Rc::new(Closure {
                name: "<lambda>".to_string(),
                params: args.args.iter().map(|Arg { arg, .. }| arg.clone()).collect(),
                body: Body::Expr(*body),
                env: env.clone(),
                arena: arena.clone(),
            }))),
            | Expr::IfExp(IfExp { test, body, orelse }) => {
                if test.eval(runtime, env)?.truthy() {
                    body.eval(runtime, env)
                } else {
                    orelse.eval(runtime, env)
                }
            }
            | Expr::Dict(Dict { keys, values }) => {
                let keys = many(runtime, keys)?;
                let values = many(runtime, values)?;
                let mut entries: Vec<(Value, Value)> = Vec::new();
                for (k, v) in keys.into_iter().zip(values) {
                    match entries.iter_mut().find(|(k2, _)| impls::py_eq(k2, &k)) {
                        | Some((_, slot)) => *slot = v,
                        | None => entries.push((k, v)),
                    }
                }
                Ok(Value::dict(entries))
            }
            | Expr::Compare(Compare { left, ops, comparators }) => {
                let mut l = left.eval(runtime, env)?;
                for (op, comparator) in ops.iter().zip(comparators) {
                    let r = comparator.eval(runtime, env)?;
                    if !impls::compare(op, &l, &r)? {
                        return Ok(Value::Bool(false));
                    }
                    l = r;
                }
                Ok(Value::Bool(true))
            }
            | Expr::Call(Call { func, args, keywords }) => {
                let f = func.eval(runtime, env)?;
                let args = many(runtime, args)?;
                let mut kwargs = Vec::new();
                for Keyword { arg, value } in keywords {
                    let Some(arg) = arg else {
                        return Err(RuntimeError::Unsupported(format!("keyword unpacking")));
                    };
                    kwargs.push((arg.clone(), value.eval(runtime, env)?));
                }
                runtime.call(&f, args, kwargs)
            }
            | Expr::Num(num) => Ok(match num {
                | Num::Int(n) => Value::Int(*n),
                | Num::Float(x) => Value::Float(*x),
                | Num::Imag(x) => Value::Complex(Complex::new(0.0, *x)),
            }),
            | Expr::Str(Str(s)) => Ok(Value::from(s.as_str())),
            | Expr::NameConstant(c) => Ok(match c {
                | NameConstant::True => Value::Bool(true),
                | NameConstant::False => Value::Bool(false),
                | NameConstant::None => Value::None,
            }),
            | Expr::Attribute(Attribute { value, attr }) => {
                let v = value.eval(runtime, env)?;
                impls::attribute(&v, attr)
            }
            | Expr::Subscript(Subscript { value, slice }) => {
                let v = value.eval(runtime, env)?;
                match slice {
                    | Slice::Index(idx) => {
                        let idx = idx.eval(runtime, env)?;
                        impls::index(&v, &idx)
                    }
                    | Slice::Range(Range { lower, upper, step }) => {
                        let mut bound = |b: &Option<ExprId>| -> Result<Option<Value>> {
                            b.as_ref().map(|b| b.eval(runtime, env)).transpose()
                        };
                        let (lower, upper, step) = (bound(lower)?, bound(upper)?, bound(step)?);
                        impls::slice(&v, lower, upper, step)
                    }
                    | Slice::Ext(_) => {
                        Err(RuntimeError::Unsupported(format!("extended slices")))
                    }
                }
            }
            | Expr::Name(Name(id)) => {
                Frame::lookup(env, id).ok_or_else(|| RuntimeError::Unbound(id.clone()))
            }
            | Expr::List(List { elts }) => Ok(Value::list(many(runtime, elts)?)),
            | Expr::Tuple(Tuple { elts }) => Ok(Value::from(many(runtime, elts)?)),
            | Expr::JoinedStr(JoinedStr { values }) => {
                let mut s = String::new();
                for value in values {
                    s += &value.eval(runtime, env)?.to_string();
                }
                Ok(Value::from(s))
            }
            | Expr::FormattedValue(FormattedValue { value, conversion, format_spec }) => {
                let v = value.eval(runtime, env)?;
                if let Some(spec) = format_spec {
                    if spec.eval(runtime, env)?.truthy() {
                        return Err(RuntimeError::Unsupported(format!("format specifications")));
                    }
                }
                Ok(Value::from(match conversion {
                    | Some('r') | Some('a') => crate::fmt::repr(&v),
                    | _ => v.to_string(),
                }))
            }
            // generators are drained on the spot
            | Expr::ListComp(ListComp { elt, generators })
            | Expr::GeneratorExp(GeneratorExp { elt, generators }) => {
                let scope = Frame::child(env);
                let mut items = Vec::new();
                let mut each = |runtime: &mut Runtime, scope: &RcFrame| -> Result<()> {
                    items.push(elt.eval(runtime, scope)?);
                    Ok(())
                };
                runtime.comprehend(generators, &scope, &mut each)?;
                Ok(Value::list(items))
            }
            | Expr::DictComp(DictComp { key, value, generators }) => {
                let scope = Frame::child(env);
                let mut entries: Vec<(Value, Value)> = Vec::new();
                let mut each = |runtime: &mut Runtime, scope: &RcFrame| -> Result<()> {
                    let k = key.eval(runtime, scope)?;
                    let v = value.eval(runtime, scope)?;
                    match entries.iter_mut().find(|(k2, _)| impls::py_eq(k2, &k)) {
                        | Some((_, slot)) => *slot = v,
                        | None => entries.push((k, v)),
                    }
                    Ok(())
                };
                runtime.comprehend(generators, &scope, &mut each)?;
                Ok(Value::dict(entries))
            }
            | other @ (Expr::Set(_)
            | Expr::SetComp(_)
            | Expr::Await(_)
            | Expr::Yield(_)
            | Expr::Starred(_)) => {
                Err(RuntimeError::Unsupported(format!("{} expressions", other.shape_name())))
            }
        }
    }
}

impl Eval for StmtId {
    type Out = Flow;
    fn eval(&self, runtime: &mut Runtime, env: &RcFrame) -> Result<Flow> {
        let arena = runtime.arena.clone();
        match &arena.stmts[self] {
            | Stmt::FunctionDef(FunctionDef { name, args, body, decorators, returns: _ }) => {
                let mut value = Value::Func(Rc::new(Closure {
                    name: name.clone(),
                    params: args.args.iter().map(|Arg { arg, .. }| arg.clone()).collect(),
                    body: Body::Block(*body),
                    env: env.clone(),
                    arena: arena.clone(),
                }));
                for dec in decorators.iter().rev() {
                    let dec = dec.eval(runtime, env)?;
                    value = runtime.call(&dec, vec![value], Vec::new())?;
                }
                Frame::define(env, name.clone(), value);
                Ok(Flow::Next)
            }
            | Stmt::Return(value) => {
                let value = match value {
                    | Some(value) => value.eval(runtime, env)?,
                    | None => Value::None,
                };
                Ok(Flow::Return(value))
            }
            | Stmt::Delete(targets) => {
                for target in targets {
                    let Some(id) = arena.name_of(target) else {
                        return Err(RuntimeError::Unsupported(format!("deleting non-names")));
                    };
                    if env.borrow_mut().vars.remove(id).is_none() {
                        return Err(RuntimeError::Unbound(id.to_string()));
                    }
                }
                Ok(Flow::Next)
            }
            | Stmt::Assign(Assign { targets, value }) => {
                let value = value.eval(runtime, env)?;
                for target in targets {
                    runtime.assign(target, value.clone(), env)?;
                }
                Ok(Flow::Next)
            }
            | Stmt::AugAssign(AugAssign { target, op, value }) => {
                let current = target.eval(runtime, env)?;
                let value = value.eval(runtime, env)?;
                let updated = impls::binary(op, &current, &value)?;
                runtime.assign(target, updated, env)?;
                Ok(Flow::Next)
            }
            | Stmt::For(For { target, iter, body, orelse }) => {
                let iter = iter.eval(runtime, env)?;
                for item in impls::iterate(&iter)? {
                    runtime.assign(target, item, env)?;
                    match body.eval(runtime, env)? {
                        | Flow::Next | Flow::Continue => {}
                        | Flow::Break => return Ok(Flow::Next),
                        | flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                orelse.eval(runtime, env)
            }
            | Stmt::While(While { test, body, orelse }) => {
                while test.eval(runtime, env)?.truthy() {
                    match body.eval(runtime, env)? {
                        | Flow::Next | Flow::Continue => {}
                        | Flow::Break => return Ok(Flow::Next),
                        | flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                orelse.eval(runtime, env)
            }
            | Stmt::If(If { test, body, orelse }) => {
                if test.eval(runtime, env)?.truthy() {
                    body.eval(runtime, env)
                } else {
                    orelse.eval(runtime, env)
                }
            }
            | Stmt::Raise(Raise { exc, cause: _ }) => match exc {
                | Some(exc) => {
                    let exc = exc.eval(runtime, env)?;
                    Err(runtime.raise(&exc))
                }
                | None => Err(RuntimeError::Raised {
                    kind: "RuntimeError".to_string(),
                    message: "No active exception to reraise".to_string(),
                }),
            },
            | Stmt::Try(Try { body, handlers, orelse, finalbody }) => {
                let res = match body.eval(runtime, env) {
                    | Ok(Flow::Next) => orelse.eval(runtime, env),
                    | Ok(flow) => Ok(flow),
                    | Err(err) => {
                        let mut outcome = Err(err.clone());
                        for handler in handlers {
                            if runtime.handles(handler, &err, env)? {
                                if let Some(name) = &handler.name {
                                    let exc = Value::Exception(Rc::new(err.to_exception()));
                                    Frame::define(env, name.clone(), exc);
                                }
                                outcome = handler.body.eval(runtime, env);
                                break;
                            }
                        }
                        outcome
                    }
                };
                match finalbody.eval(runtime, env)? {
                    | Flow::Next => res,
                    | flow => Ok(flow),
                }
            }
            | Stmt::Assert(Assert { test, msg }) => {
                if test.eval(runtime, env)?.truthy() {
                    return Ok(Flow::Next);
                }
                let msg = match msg {
                    | Some(msg) => msg.eval(runtime, env)?.to_string(),
                    | None => String::new(),
                };
                Err(RuntimeError::Assertion(msg))
            }
            | Stmt::Import(aliases) => {
                for Alias { name, asname } in aliases {
                    let module =
                        builtin::module(name).ok_or_else(|| RuntimeError::Import(name.clone()))?;
                    Frame::define(env, asname.clone().unwrap_or_else(|| name.clone()), module);
                }
                Ok(Flow::Next)
            }
            | Stmt::ImportFrom(ImportFrom { module, names }) => {
                let module_name = module.clone().unwrap_or_default();
                let module = builtin::module(&module_name)
                    .ok_or_else(|| RuntimeError::Import(module_name.clone()))?;
                for Alias { name, asname } in names {
                    let member = impls::attribute(&module, name)?;
                    Frame::define(env, asname.clone().unwrap_or_else(|| name.clone()), member);
                }
                Ok(Flow::Next)
            }
            | Stmt::Expr(e) => {
                e.eval(runtime, env)?;
                Ok(Flow::Next)
            }
            | Stmt::Pass => Ok(Flow::Next),
            | Stmt::Break => Ok(Flow::Break),
            | Stmt::Continue => Ok(Flow::Continue),
            | other @ (Stmt::AsyncFunctionDef(_)
            | Stmt::ClassDef(_)
            | Stmt::AsyncFor(_)
            | Stmt::With(_)
            | Stmt::AsyncWith(_)
            | Stmt::Global(_)
            | Stmt::Nonlocal(_)) => {
                Err(RuntimeError::Unsupported(format!("{} statements", other.shape_name())))
            }
        }
    }
}
