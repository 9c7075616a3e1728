//! The bidirectional engine.
//!
//! One [`Context`] checks and then translates one top-level definition. The
//! host tree is never mutated: everything checking learns about a node goes
//! into side tables keyed by the node's id, and translation reads those
//! tables instead of classifying the node again.

/// Synthesis, analysis and statement checking.
pub mod expr;
/// Segmentation of blocks into statements and match groups.
pub mod block;
/// Pattern analysis.
pub mod pat;
/// Kinds, type expressions and their equality.
pub mod kind;
pub use kind::Assumptions;
/// Lowering checked trees to host syntax.
pub mod trans;

use crate::{syntax::*, *};
use indexmap::IndexMap;
use std::{collections::HashMap, rc::Rc};
use typy_utils::{arena::ArenaDense, scope::ScopeStack};

/// Variables bound by a pattern: surface name to unique id and type.
pub type VarBindings = IndexMap<String, (String, TyExpr)>;

pub struct Context {
    /// the source, and every translation allocated from it
    pub arena: HostArena,
    pub static_env: StaticEnv,
    /// types names bound to opaque host values
    pub host_fragment: Option<FragmentRef>,
    pub matches: ArenaDense<MatchId, MatchGroup, ()>,
    segments: HashMap<BlockId, Rc<[Item]>>,
    derived: HashMap<Tree, BlockId>,
    exprs_tr: HashMap<ExprId, ExprId>,
    stmts_tr: HashMap<(Item, Mechanism), Vec<StmtId>>,
    state: State,
    /// call stack for error tracking
    pub stack: im::Vector<TyckTask>,
}

/// Everything a failed attempt rolls back.
#[derive(Clone)]
struct State {
    annotations: im::HashMap<Tree, Annotation>,
    delegations: im::HashMap<StmtId, Delegation>,
    pat_annotations: im::HashMap<ExprId, PatAnnotation>,
    var_bindings: im::HashMap<ExprId, VarBindings>,
    integrators: im::HashMap<StmtId, FragmentRef>,
    ref_ids: im::HashMap<ExprId, String>,
    def_ids: im::HashMap<StmtId, String>,
    binders: im::HashMap<(Tree, String), String>,
    counters: im::HashMap<String, usize>,
    imports: im::OrdMap<String, String>,
    /// type-level identifiers
    ty_ids: ScopeStack<String, TyVar>,
    /// kinds of type-level variables, by id
    ty_vars: ScopeStack<usize, Kind>,
    /// value identifiers to their unique ids
    exp_ids: ScopeStack<String, String>,
    /// types of unique ids
    exp_vars: ScopeStack<String, TyExpr>,
    default_fragments: im::Vector<FragmentRef>,
}

impl Context {
    pub fn new(arena: HostArena, static_env: StaticEnv) -> Self {
        let mut imports = im::OrdMap::new();
        imports.insert("builtins".to_string(), "__builtins__".to_string());
        Self {
            arena,
            static_env,
            host_fragment: None,
            matches: ArenaDense::default(),
            segments: HashMap::new(),
            derived: HashMap::new(),
            exprs_tr: HashMap::new(),
            stmts_tr: HashMap::new(),
            state: State {
                annotations: im::HashMap::new(),
                delegations: im::HashMap::new(),
                pat_annotations: im::HashMap::new(),
                var_bindings: im::HashMap::new(),
                integrators: im::HashMap::new(),
                ref_ids: im::HashMap::new(),
                def_ids: im::HashMap::new(),
                binders: im::HashMap::new(),
                counters: im::HashMap::new(),
                imports,
                ty_ids: ScopeStack::new(),
                ty_vars: ScopeStack::new(),
                exp_ids: ScopeStack::new(),
                exp_vars: ScopeStack::new(),
                default_fragments: im::Vector::new(),
            },
            stack: im::Vector::new(),
        }
    }
    pub fn with_host_fragment(mut self, fragment: FragmentRef) -> Self {
        self.host_fragment = Some(fragment);
        self
    }
}

/* -------------------------------- Bindings -------------------------------- */

impl Context {
    pub fn push_scope(&mut self) {
        self.state.exp_ids.push();
        self.state.exp_vars.push();
    }
    pub fn pop_scope(&mut self) {
        self.state.exp_ids.pop();
        self.state.exp_vars.pop();
    }

    /// Fresh names never collide: the first `x` keeps its name, the ones
    /// after it are numbered. A name the translation already refers to
    /// statically, or an import alias, is never reused.
    pub fn fresh(&mut self, name: &str) -> String {
        let reserved = self.static_env.contains(name)
            || self.state.imports.values().any(|alias| alias == name);
        let n = match self.state.counters.get(name).copied() {
            | Some(n) => n,
            | None if reserved => 1,
            | None => 0,
        };
        self.state.counters.insert(name.to_string(), n + 1);
        if n == 0 { name.to_string() } else { format!("__typy_id_{}_{}__", name, n) }
    }

    /// Binds `name` at `site` in the innermost scope. Binding the same name
    /// at the same site again yields the same unique id.
    pub fn bind(&mut self, site: impl Into<Tree>, name: &str, ty: TyExpr) -> String {
        let key = (site.into(), name.to_string());
        let uniq = match self.state.binders.get(&key) {
            | Some(uniq) => uniq.clone(),
            | None => {
                let uniq = self.fresh(name);
                self.state.binders.insert(key, uniq.clone());
                uniq
            }
        };
        self.state.exp_ids.insert(name.to_string(), uniq.clone());
        self.state.exp_vars.insert(uniq.clone(), ty);
        uniq
    }
    /// Binds `name` to a unique id chosen by the caller.
    pub fn bind_as(&mut self, name: &str, uniq: &str, ty: TyExpr) {
        if !self.state.counters.contains_key(uniq) {
            self.state.counters.insert(uniq.to_string(), 1);
        }
        self.state.exp_ids.insert(name.to_string(), uniq.to_string());
        self.state.exp_vars.insert(uniq.to_string(), ty);
    }
    /// Binds every variable of an analyzed pattern and remembers the unique
    /// ids for its translation.
    pub fn bind_pattern(&mut self, pat: ExprId, bindings: &Bindings) -> VarBindings {
        let mut var_bindings = VarBindings::new();
        for (name, ty) in bindings {
            let uniq = self.bind(pat, name, ty.clone());
            var_bindings.insert(name.clone(), (uniq, ty.clone()));
        }
        self.state.var_bindings.insert(pat, var_bindings.clone());
        var_bindings
    }
    pub fn lookup(&self, name: &str) -> Option<(String, TyExpr)> {
        let uniq = self.state.exp_ids.get(&name.to_string())?;
        let ty = self.state.exp_vars.get(uniq)?;
        Some((uniq.clone(), ty.clone()))
    }
    /// The unique id bound to `name` at `site`, if checking bound one.
    pub fn uniq_of(&self, site: impl Into<Tree>, name: &str) -> Option<String> {
        self.state.binders.get(&(site.into(), name.to_string())).cloned()
    }

    /// The unique id a definition is translated to; allocated once.
    pub fn def_uniq(&mut self, s: StmtId, name: &str) -> String {
        if let Some(uniq) = self.state.def_ids.get(&s) {
            return uniq.clone();
        }
        let uniq = self.fresh(name);
        self.state.def_ids.insert(s, uniq.clone());
        uniq
    }
    /// Fixes the unique id of a definition ahead of checking it.
    pub fn set_def_uniq(&mut self, s: StmtId, uniq: &str) {
        if !self.state.counters.contains_key(uniq) {
            self.state.counters.insert(uniq.to_string(), 1);
        }
        self.state.def_ids.insert(s, uniq.to_string());
    }

    /// The alias a translation refers to a host module by.
    pub fn add_import(&mut self, module: &str) -> String {
        if let Some(alias) = self.state.imports.get(module) {
            return alias.clone();
        }
        let n = self.state.imports.keys().filter(|m| m.as_str() != "builtins").count();
        let alias = format!("_typy_import_{}", n);
        self.state.imports.insert(module.to_string(), alias.clone());
        alias
    }
    /// Every recorded import as `(module, alias)`, sorted by module.
    pub fn imports(&self) -> Vec<(String, String)> {
        self.state.imports.iter().map(|(m, a)| (m.clone(), a.clone())).collect()
    }

    pub fn push_default_fragment(&mut self, fragment: FragmentRef) {
        self.state.default_fragments.push_back(fragment);
    }
    pub fn pop_default_fragment(&mut self) -> Option<FragmentRef> {
        self.state.default_fragments.pop_back()
    }
    pub fn default_fragment(&self) -> Option<FragmentRef> {
        self.state.default_fragments.back().copied()
    }

    /// Binds a type-level identifier at `kind`.
    pub fn bind_ty(&mut self, name: &str, kind: Kind) -> TyVar {
        let var = TyVar { id: fresh_ty_id(), name: name.to_string() };
        self.state.ty_ids.insert(name.to_string(), var.clone());
        self.state.ty_vars.insert(var.id, kind);
        var
    }
    /// Replaces the kind of a bound type-level variable.
    pub fn rebind_ty(&mut self, var: &TyVar, kind: Kind) {
        self.state.ty_ids.insert(var.name.clone(), var.clone());
        self.state.ty_vars.insert(var.id, kind);
    }

    /// A block made of `stmts`, allocated once per `parent`.
    pub fn derived_block(&mut self, parent: impl Into<Tree>, stmts: &[StmtId]) -> BlockId {
        let parent = parent.into();
        if let Some(block) = self.derived.get(&parent) {
            return *block;
        }
        let block = self.arena.block(stmts.to_vec());
        self.derived.insert(parent, block);
        block
    }
}

/* ------------------------------- Side Tables ------------------------------ */

impl Context {
    pub fn annotation(&self, tree: impl Into<Tree>) -> Option<&Annotation> {
        self.state.annotations.get(&tree.into())
    }
    pub fn ty_of(&self, tree: impl Into<Tree>) -> Option<TyExpr> {
        self.annotation(tree).map(|ann| ann.ty.clone())
    }
    pub fn delegation(&self, s: StmtId) -> Option<&Delegation> {
        self.state.delegations.get(&s)
    }
    pub fn pat_annotation(&self, pat: ExprId) -> Option<&PatAnnotation> {
        self.state.pat_annotations.get(&pat)
    }
    pub fn var_bindings(&self, pat: ExprId) -> Option<&VarBindings> {
        self.state.var_bindings.get(&pat)
    }
    pub fn def_id(&self, s: StmtId) -> Option<String> {
        self.state.def_ids.get(&s).cloned()
    }
    fn annotate(&mut self, tree: impl Into<Tree>, ty: TyExpr, delegation: Option<Delegation>) {
        self.state.annotations.insert(tree.into(), Annotation { ty, delegation });
    }
}

/* ---------------------------- Errors and Attempts ------------------------- */

impl Context {
    /// Generalize the administrative guards using "with" pattern by placing
    /// the body of a judgment into a closure; the task stack is restored
    /// afterwards.
    #[inline]
    pub(crate) fn guarded<R>(&mut self, with: impl FnOnce(&mut Self) -> R) -> R {
        let stack = self.stack.clone();
        let res = with(self);
        self.stack = stack;
        res
    }

    /// Runs `f`; on a user-facing error, rolls the context back to where it
    /// was and returns `None`. Usage and internal errors propagate.
    pub fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<Option<T>> {
        let state = self.state.clone();
        let stack = self.stack.clone();
        match f(self) {
            | Ok(t) => Ok(Some(t)),
            | Err(entry) if entry.error.is_user_facing() => {
                ::log::trace!("[attempt failed] {}", entry.error);
                self.state = state;
                self.stack = stack;
                Ok(None)
            }
            | Err(entry) => Err(entry),
        }
    }
    /// Whether `tree` synthesizes a type, and which.
    pub fn try_syn(&mut self, tree: impl Into<Tree>) -> Result<Option<TyExpr>> {
        let tree = tree.into();
        self.attempt(|ctx| ctx.syn(tree))
    }
    /// Analysis as an attempt.
    pub fn try_ana(&mut self, tree: impl Into<Tree>, ty: &TyExpr) -> Result<bool> {
        let tree = tree.into();
        Ok(self.attempt(|ctx| ctx.ana(tree, ty))?.is_some())
    }

    #[track_caller]
    pub fn err<T>(&self, error: TyckError, site: Option<Tree>) -> Result<T> {
        let blame = std::panic::Location::caller();
        Err(TyckErrorEntry { error, blame, site, stack: self.stack.clone() })
    }
    #[track_caller]
    pub fn type_err<T>(&self, msg: impl Into<String>, site: impl Into<Tree>) -> Result<T> {
        self.err(TyckError::Type(msg.into()), Some(site.into()))
    }
    #[track_caller]
    pub fn formation_err<T>(&self, msg: impl Into<String>, site: impl Into<Tree>) -> Result<T> {
        self.err(TyckError::TypeFormation(msg.into()), Some(site.into()))
    }
    #[track_caller]
    pub fn kind_err<T>(&self, msg: impl Into<String>, site: Option<Tree>) -> Result<T> {
        self.err(TyckError::Kind(msg.into()), site)
    }
    #[track_caller]
    pub fn usage_err<T>(&self, msg: impl Into<String>, site: impl Into<Tree>) -> Result<T> {
        self.err(TyckError::Usage(msg.into()), Some(site.into()))
    }
    #[track_caller]
    pub fn internal_err<T>(&self, msg: impl Into<String>, site: impl Into<Tree>) -> Result<T> {
        self.err(TyckError::Internal(msg.into()), Some(site.into()))
    }
}

#[cfg(test)]
mod tests;
