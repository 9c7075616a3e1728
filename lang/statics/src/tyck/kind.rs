use crate::{syntax::*, *};
use std::rc::Rc;

/// Pairs of types assumed equal while comparing equirecursive types.
///
/// Pushed right before unfolding and popped right after, so the set is empty
/// again whenever a top-level comparison returns.
#[derive(Default)]
pub struct Assumptions(Vec<(TyExpr, TyExpr)>);

impl Assumptions {
    fn holds(&self, c1: &TyExpr, c2: &TyExpr) -> bool {
        self.0.iter().any(|(a, b)| (a == c1 && b == c2) || (a == c2 && b == c1))
    }
}

/// Bound on the unfolding steps of canonicalization.
const MAX_UNFOLD: usize = 64;

/* --------------------------------- Helpers -------------------------------- */

impl TyExpr {
    pub fn canonical(fragment: FragmentRef, idx: Idx) -> Self {
        CanonicalTy { fragment, idx: Rc::new(idx) }.into()
    }
    /// The fragment at its trivial index.
    pub fn triv(fragment: FragmentRef) -> Self {
        Self::canonical(fragment, Idx::Triv)
    }
    /// An equirecursive type equal to `schema(self)`.
    pub fn rec(name: &str, schema: impl Fn(&TyExpr) -> TyExpr + 'static) -> Self {
        RecTy { id: fresh_ty_id(), name: name.to_string(), schema: Rc::new(schema) }.into()
    }
    /// One step of unfolding; other types stay as they are.
    pub fn unfold(&self) -> TyExpr {
        match self {
            | TyExpr::Rec(rec) => (rec.schema)(self),
            | _ => self.clone(),
        }
    }
    fn mentions(&self, id: usize) -> bool {
        match self {
            | TyExpr::Var(var) => var.id == id,
            | TyExpr::Canonical(c) => c.idx.tys().into_iter().any(|ty| ty.mentions(id)),
            | TyExpr::Prj(_) | TyExpr::Rec(_) => false,
        }
    }
    fn subst(&self, id: usize, with: &TyExpr) -> TyExpr {
        match self {
            | TyExpr::Var(var) if var.id == id => with.clone(),
            | TyExpr::Canonical(CanonicalTy { fragment, idx }) => {
                let idx = idx.map(|ty| ty.subst(id, with));
                TyExpr::canonical(*fragment, idx)
            }
            | _ => self.clone(),
        }
    }
}

impl Idx {
    /// The types an index mentions directly.
    pub fn tys(&self) -> Vec<&TyExpr> {
        match self {
            | Idx::Triv | Idx::Component(_) => Vec::new(),
            | Idx::Fields(fields) => fields.values().collect(),
            | Idx::Arrow { args, ret } => args.iter().chain(std::iter::once(ret)).collect(),
            | Idx::Cases(cases) => cases.values().flatten().collect(),
        }
    }
    pub fn try_map<E>(
        &self, mut f: impl FnMut(&TyExpr) -> std::result::Result<TyExpr, E>,
    ) -> std::result::Result<Idx, E> {
        Ok(match self {
            | Idx::Triv => Idx::Triv,
            | Idx::Component(c) => Idx::Component(c.clone()),
            | Idx::Fields(fields) => Idx::Fields(
                fields
                    .iter()
                    .map(|(label, ty)| Ok((label.clone(), f(ty)?)))
                    .collect::<std::result::Result<_, E>>()?,
            ),
            | Idx::Arrow { args, ret } => Idx::Arrow {
                args: args.iter().map(&mut f).collect::<std::result::Result<_, E>>()?,
                ret: f(ret)?,
            },
            | Idx::Cases(cases) => Idx::Cases(
                cases
                    .iter()
                    .map(|(tag, tys)| {
                        let tys = tys.iter().map(&mut f).collect::<std::result::Result<_, E>>()?;
                        Ok((tag.clone(), tys))
                    })
                    .collect::<std::result::Result<_, E>>()?,
            ),
        })
    }
    pub fn map(&self, mut f: impl FnMut(&TyExpr) -> TyExpr) -> Idx {
        match self.try_map(|ty| Ok::<_, std::convert::Infallible>(f(ty))) {
            | Ok(idx) => idx,
            | Err(never) => match never {},
        }
    }
}

/* ---------------------------------- Kinds --------------------------------- */

impl Context {
    pub fn syn_ty_expr(&mut self, c: &TyExpr) -> Result<Kind> {
        match c {
            | TyExpr::Var(var) => match self.state.ty_vars.get(&var.id) {
                | Some(kind) => Ok(kind.clone()),
                | None => self.kind_err(format!("Unbound type variable: {}", var.name), None),
            },
            | TyExpr::Canonical(_) | TyExpr::Rec(_) => Ok(Kind::Singleton(Rc::new(c.clone()))),
            | TyExpr::Prj(TyPrj { path, label }) => match path.kind_of(label) {
                | Some(kind) => Ok(kind),
                | None => self.kind_err(
                    format!("Component {} has no type member {}.", path.name(), label),
                    None,
                ),
            },
        }
    }
    pub fn kind_eq(&mut self, k1: &Kind, k2: &Kind) -> Result<bool> {
        match (k1, k2) {
            | (Kind::Type, Kind::Type) => Ok(true),
            | (Kind::Singleton(t1), Kind::Singleton(t2)) => self.ty_expr_eq(t1, t2, &Kind::Type),
            | _ => Ok(false),
        }
    }
    pub fn subkind(&mut self, k1: &Kind, k2: &Kind) -> Result<bool> {
        if self.kind_eq(k1, k2)? {
            return Ok(true);
        }
        Ok(matches!((k1, k2), (Kind::Singleton(_), Kind::Type)))
    }
    pub fn ana_ty_expr(&mut self, c: &TyExpr, k: &Kind) -> Result<()> {
        let syn_k = self.syn_ty_expr(c)?;
        if self.subkind(&syn_k, k)? {
            return Ok(());
        }
        self.kind_err(format!("Kind mismatch. Expected: '{}'. Got: '{}'.", k, syn_k), None)
    }
    /// Kind checking as a predicate.
    pub fn has_kind(&mut self, c: &TyExpr, k: &Kind) -> Result<bool> {
        Ok(self.attempt(|ctx| ctx.ana_ty_expr(c, k))?.is_some())
    }
}

/* ----------------------------- Canonicalization --------------------------- */

impl Context {
    /// Resolves `ty` through singleton kinds and recursive unfoldings. An
    /// abstract type comes back as it is.
    pub fn canonicalize(&mut self, ty: &TyExpr) -> Result<TyExpr> {
        let mut ty = ty.clone();
        for _ in 0..MAX_UNFOLD {
            match &ty {
                | TyExpr::Canonical(_) => return Ok(ty),
                | TyExpr::Rec(_) => ty = ty.unfold(),
                | TyExpr::Var(_) | TyExpr::Prj(_) => match self.syn_ty_expr(&ty)? {
                    | Kind::Type => return Ok(ty),
                    | Kind::Singleton(t) => ty = (*t).clone(),
                },
            }
        }
        self.err(TyckError::Type("Recursive type is not contractive.".to_string()), None)
    }
    /// Like `canonicalize`, failing on abstract types.
    pub fn canonical(&mut self, ty: &TyExpr, site: impl Into<Tree>) -> Result<CanonicalTy> {
        match self.canonicalize(ty)? {
            | TyExpr::Canonical(c) => Ok(c),
            | abstract_ty => {
                self.type_err(format!("Type {} is abstract and cannot be canonicalized.", abstract_ty), site)
            }
        }
    }
    /// Resolves every type-level variable of this context inside `ty`, so the
    /// result means the same thing in any other context.
    pub fn normalize(&mut self, ty: &TyExpr) -> Result<TyExpr> {
        match ty {
            | TyExpr::Var(_) | TyExpr::Prj(_) => match self.syn_ty_expr(ty)? {
                | Kind::Type => Ok(ty.clone()),
                | Kind::Singleton(t) => self.normalize(&t),
            },
            | TyExpr::Canonical(CanonicalTy { fragment, idx }) => {
                let idx = idx.try_map(|ty| self.normalize(ty))?;
                Ok(TyExpr::canonical(*fragment, idx))
            }
            | TyExpr::Rec(_) => Ok(ty.clone()),
        }
    }
}

/* -------------------------------- Equality -------------------------------- */

impl Context {
    pub fn ty_expr_eq(&mut self, c1: &TyExpr, c2: &TyExpr, k: &Kind) -> Result<bool> {
        let mut assumptions = Assumptions::default();
        self.ty_expr_eq_under(c1, c2, k, &mut assumptions)
    }
    pub fn ty_expr_eq_under(
        &mut self, c1: &TyExpr, c2: &TyExpr, k: &Kind, assumptions: &mut Assumptions,
    ) -> Result<bool> {
        if c1 == c2 {
            self.ana_ty_expr(c1, k)?;
            return Ok(true);
        }
        match k {
            | Kind::Type => {
                if assumptions.holds(c1, c2) {
                    return Ok(true);
                }
                if matches!(c1, TyExpr::Rec(_)) || matches!(c2, TyExpr::Rec(_)) {
                    assumptions.0.push((c1.clone(), c2.clone()));
                    let res = self.ty_expr_eq_under(&c1.unfold(), &c2.unfold(), k, assumptions);
                    assumptions.0.pop();
                    return res;
                }
                let n1 = self.canonicalize(c1)?;
                let n2 = self.canonicalize(c2)?;
                match (&n1, &n2) {
                    | (TyExpr::Canonical(a), TyExpr::Canonical(b)) => {
                        if a.fragment != b.fragment {
                            return Ok(false);
                        }
                        let (idx1, idx2) = (a.idx.clone(), b.idx.clone());
                        a.fragment.idx_eq(self, &idx1, &idx2, assumptions)
                    }
                    // both abstract, or one abstract and one not
                    | _ => Ok(n1 == n2),
                }
            }
            | Kind::Singleton(_) => Ok(self.has_kind(c1, k)? && self.has_kind(c2, k)?),
        }
    }
    /// Structural index equality; labels and cases must come in the same
    /// order.
    pub fn idx_eq_structural(
        &mut self, idx1: &Idx, idx2: &Idx, assumptions: &mut Assumptions,
    ) -> Result<bool> {
        match (idx1, idx2) {
            | (Idx::Triv, Idx::Triv) => Ok(true),
            | (Idx::Component(a), Idx::Component(b)) => Ok(a.ptr_eq(b)),
            | (Idx::Fields(a), Idx::Fields(b)) => {
                if a.len() != b.len() || a.keys().zip(b.keys()).any(|(l1, l2)| l1 != l2) {
                    return Ok(false);
                }
                for (t1, t2) in a.values().zip(b.values()) {
                    if !self.ty_expr_eq_under(t1, t2, &Kind::Type, assumptions)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            | (Idx::Arrow { args: a, ret: r1 }, Idx::Arrow { args: b, ret: r2 }) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (t1, t2) in a.iter().zip(b.iter()) {
                    if !self.ty_expr_eq_under(t1, t2, &Kind::Type, assumptions)? {
                        return Ok(false);
                    }
                }
                self.ty_expr_eq_under(r1, r2, &Kind::Type, assumptions)
            }
            | (Idx::Cases(a), Idx::Cases(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for ((tag1, tys1), (tag2, tys2)) in a.iter().zip(b.iter()) {
                    if tag1 != tag2 || tys1.len() != tys2.len() {
                        return Ok(false);
                    }
                    for (t1, t2) in tys1.iter().zip(tys2.iter()) {
                        if !self.ty_expr_eq_under(t1, t2, &Kind::Type, assumptions)? {
                            return Ok(false);
                        }
                    }
                }
                Ok(true)
            }
            | _ => Ok(false),
        }
    }
}

/* ----------------------------- Type Expressions --------------------------- */

impl Context {
    /// Elaborates type expression syntax at kind `k`: a type-level
    /// identifier, a fragment `F`, an indexed fragment `F[idx]`, or a
    /// projection `C.t` out of a component or a namespace.
    pub fn ana_uty_expr(&mut self, e: ExprId, k: &Kind) -> Result<TyExpr> {
        self.guarded(|ctx| {
            ctx.stack.push_back(TyckTask::TyExpr(e));
            ctx.log_tree("ana uty", e);
            let ty = ctx.elab_uty_expr(e)?;
            match ctx.ana_ty_expr(&ty, k) {
                | Ok(()) => Ok(ty),
                | Err(TyckErrorEntry { error, blame, site: None, stack }) => {
                    Err(TyckErrorEntry { error, blame, site: Some(e.into()), stack })
                }
                | Err(entry) => Err(entry),
            }
        })
    }
    /// A type expression at kind `Type`.
    pub fn as_type(&mut self, e: ExprId) -> Result<TyExpr> {
        self.ana_uty_expr(e, &Kind::Type)
    }
    fn elab_uty_expr(&mut self, e: ExprId) -> Result<TyExpr> {
        match self.arena.exprs[&e].clone() {
            | Expr::Name(Name(id)) => {
                if let Some(var) = self.state.ty_ids.get(&id) {
                    return Ok(var.clone().into());
                }
                match self.static_env.get(&id).cloned() {
                    | Some(StaticValue::Fragment(fragment)) => {
                        let idx = fragment.init_idx(self, None, e)?;
                        Ok(TyExpr::canonical(fragment, idx))
                    }
                    | Some(value) => self.kind_err(
                        format!(
                            "Type expression '{}' is bound to static value {:?}, which is neither a fragment nor a type expression.",
                            id, value
                        ),
                        Some(e.into()),
                    ),
                    | None => {
                        self.kind_err(format!("Type expression '{}' is unbound.", id), Some(e.into()))
                    }
                }
            }
            | Expr::Subscript(Subscript { value, slice }) => {
                match self.static_env.eval(&self.arena, &value) {
                    | Some(StaticValue::Fragment(fragment)) => {
                        let idx = fragment.init_idx(self, Some(&slice), e)?;
                        Ok(TyExpr::canonical(fragment, idx))
                    }
                    | _ => self.kind_err(
                        "Term did not evaluate to a fragment in static environment.",
                        Some(value.into()),
                    ),
                }
            }
            | Expr::Attribute(Attribute { value, attr }) => {
                match self.static_env.eval(&self.arena, &value) {
                    | Some(StaticValue::Component(path)) => {
                        Ok(TyPrj { path, label: attr }.into())
                    }
                    | Some(StaticValue::Namespace(env)) => match env.get(&attr).cloned() {
                        | Some(StaticValue::Fragment(fragment)) => {
                            let idx = fragment.init_idx(self, None, e)?;
                            Ok(TyExpr::canonical(fragment, idx))
                        }
                        | Some(StaticValue::Component(path)) => self.kind_err(
                            format!("Component {} is not a type.", path.name()),
                            Some(e.into()),
                        ),
                        | _ => self.kind_err("Invalid projection.", Some(value.into())),
                    },
                    | _ => self.kind_err("Invalid projection.", Some(value.into())),
                }
            }
            | _ => self.kind_err("Invalid type expression.", Some(e.into())),
        }
    }

    /// Elaborates the type member `name [type] = e` and binds `name` to it at
    /// its singleton kind. A member mentioning its own name is equirecursive.
    pub fn bind_ty_member(&mut self, name: &str, e: ExprId) -> Result<TyExpr> {
        let placeholder = self.bind_ty(name, Kind::Type);
        let body = self.as_type(e)?;
        let body = self.normalize(&body)?;
        let ty = if body.mentions(placeholder.id) {
            let id = placeholder.id;
            let rec = TyExpr::rec(name, move |this| body.subst(id, this));
            if let Err(entry) = self.canonicalize(&rec) {
                return Err(TyckErrorEntry { site: Some(e.into()), ..entry });
            }
            rec
        } else {
            body
        };
        self.rebind_ty(&placeholder, Kind::Singleton(Rc::new(ty.clone())));
        Ok(ty)
    }
}
