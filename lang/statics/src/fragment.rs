//! The fragment protocol.
//!
//! A fragment implements a type or a family of types. The checker never
//! inspects a fragment's index; it resolves a node's delegate and calls the
//! hook named after the node's shape:
//!
//! + `ana_*` checks an introduction form against the fragment at an index,
//! + `syn_*` synthesizes a type for a targeted or binary form,
//! + `check_*` checks a statement,
//! + `trans_*` lowers a checked node to host syntax,
//! + `ana_pat_*` and `trans_pat_*` do the same for patterns.
//!
//! Every hook defaults to reporting that the fragment does not support the
//! form (a type error) or lacks the translation (a usage error), so a
//! fragment implements only the shapes it gives meaning to.

use crate::{syntax::*, *};
use std::any::TypeId;

pub trait Fragment: Sync + 'static {
    fn name(&self) -> &'static str;
    /// Identifies the fragment; two fragments may share a name.
    fn fragment_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// Fragments whose types this one governs when both operands of a binary
    /// operator synthesize.
    fn precedence(&self) -> Vec<FragmentRef> {
        Vec::new()
    }

    /// Elaborates `F` (no index) or `F[idx]`.
    fn init_idx(&self, ctx: &mut Context, _idx: Option<&Slice>, site: ExprId) -> Result<Idx> {
        ctx.usage_err(format!("{} does not implement init_idx.", self.name()), site)
    }
    fn idx_eq(
        &self, ctx: &mut Context, idx1: &Idx, idx2: &Idx, assumptions: &mut Assumptions,
    ) -> Result<bool> {
        ctx.idx_eq_structural(idx1, idx2, assumptions)
    }
    fn fmt_idx(&self, idx: &Idx) -> String {
        crate::fmt::idx_output(self.name(), idx)
    }

    /* ------------------------------ Intro Forms ------------------------------- */

    fn ana_lambda(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "lambda literals", e)
    }
    fn trans_lambda(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_lambda", e)
    }
    fn ana_dict(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "dictionary literals", e)
    }
    fn trans_dict(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_dict", e)
    }
    fn ana_set(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "set literals", e)
    }
    fn trans_set(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_set", e)
    }
    fn ana_num(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "number literals", e)
    }
    fn trans_num(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_num", e)
    }
    fn ana_str(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "string literals", e)
    }
    fn trans_str(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_str", e)
    }
    fn ana_name_constant(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "name constant literals", e)
    }
    fn trans_name_constant(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_name_constant", e)
    }
    fn ana_list(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "list literals", e)
    }
    fn trans_list(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_list", e)
    }
    fn ana_tuple(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "tuple literals", e)
    }
    fn trans_tuple(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_tuple", e)
    }
    /// A capitalized name, as in `Nil` or `NaN`.
    fn ana_name(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "constructor names", e)
    }
    fn trans_name(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_name", e)
    }
    /// A call to a capitalized name, as in `Cons(1, xs)`.
    fn ana_call(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "constructor calls", e)
    }
    /// A signed literal, as in `-42` or `-Inf`.
    fn ana_unary_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "signed literals", e)
    }

    /// `f"..."`; a lone formatted value arrives here too.
    fn ana_joined_str(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "f-strings", e)
    }
    fn trans_joined_str(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_joined_str", e)
    }
    fn ana_list_comp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "list comprehensions", e)
    }
    fn trans_list_comp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_list_comp", e)
    }
    fn ana_set_comp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "set comprehensions", e)
    }
    fn trans_set_comp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_set_comp", e)
    }
    fn ana_dict_comp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "dictionary comprehensions", e)
    }
    fn trans_dict_comp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_dict_comp", e)
    }
    fn ana_generator_exp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "generator expressions", e)
    }
    fn trans_generator_exp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_generator_exp", e)
    }

    /* ---------------------------- Function Defs ------------------------------ */

    /// `@F def f(...): ...`, where the decorator names this fragment.
    fn syn_function_def(&self, ctx: &mut Context, s: StmtId) -> Result<TyExpr> {
        unsupported(self, ctx, "fragment-decorated def literals", s)
    }
    fn ana_function_def(&self, ctx: &mut Context, s: StmtId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "def literals", s)
    }
    fn trans_function_def(
        &self, ctx: &mut Context, s: StmtId, _idx: &Idx, _mechanism: Mechanism,
    ) -> Result<Vec<StmtId>> {
        missing(self, ctx, "trans_function_def", s)
    }
    /// Called on the default fragment after a def in its scope is checked.
    fn integrate_static_function_def(
        &self, _ctx: &mut Context, _s: StmtId, _ty: &TyExpr,
    ) -> Result<()> {
        Ok(())
    }
    /// Called on the default fragment after a def in its scope is translated.
    fn integrate_trans_function_def(
        &self, _ctx: &mut Context, _s: StmtId, _translation: &mut Vec<StmtId>,
        _mechanism: Mechanism,
    ) -> Result<()> {
        Ok(())
    }

    /* ----------------------------- Targeted Forms ----------------------------- */

    fn syn_unary_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<TyExpr> {
        unsupported(self, ctx, "unary operations", e)
    }
    fn trans_unary_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_unary_op", e)
    }
    fn syn_if_exp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<TyExpr> {
        unsupported(self, ctx, "if expressions", e)
    }
    fn ana_if_exp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx, _ty: &TyExpr) -> Result<()> {
        unsupported(self, ctx, "if expressions", e)
    }
    fn trans_if_exp(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_if_exp", e)
    }
    fn syn_call(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<TyExpr> {
        unsupported(self, ctx, "call expressions", e)
    }
    fn trans_call(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_call", e)
    }
    fn syn_attribute(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<TyExpr> {
        unsupported(self, ctx, "attribute expressions", e)
    }
    fn trans_attribute(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_attribute", e)
    }
    fn syn_subscript(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<TyExpr> {
        unsupported(self, ctx, "subscript expressions", e)
    }
    fn trans_subscript(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_subscript", e)
    }
    fn syn_if(&self, ctx: &mut Context, s: StmtId, _idx: &Idx) -> Result<TyExpr> {
        unsupported(self, ctx, "if statements", s)
    }
    fn ana_if(&self, ctx: &mut Context, s: StmtId, _idx: &Idx, _ty: &TyExpr) -> Result<()> {
        unsupported(self, ctx, "if statements", s)
    }
    fn trans_if(
        &self, ctx: &mut Context, s: StmtId, _idx: &Idx, _mechanism: Mechanism,
    ) -> Result<Vec<StmtId>> {
        missing(self, ctx, "trans_if", s)
    }
    fn trans_component_ref(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        missing(self, ctx, "trans_component_ref", e)
    }

    /* ------------------------------ Binary Forms ------------------------------ */

    fn syn_bin_op(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        unsupported(self, ctx, "binary operators", e)
    }
    /// Used when neither operand synthesizes a type.
    fn ana_bin_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "binary operators in analytic position", e)
    }
    fn trans_bin_op(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        missing(self, ctx, "trans_bin_op", e)
    }
    fn syn_compare(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        unsupported(self, ctx, "comparison operators", e)
    }
    fn trans_compare(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        missing(self, ctx, "trans_compare", e)
    }
    fn syn_bool_op(&self, ctx: &mut Context, e: ExprId) -> Result<TyExpr> {
        unsupported(self, ctx, "boolean operators", e)
    }
    fn ana_bool_op(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "boolean operators in analytic position", e)
    }
    fn trans_bool_op(&self, ctx: &mut Context, e: ExprId) -> Result<ExprId> {
        missing(self, ctx, "trans_bool_op", e)
    }

    /* --------------------------- Targeted Statements -------------------------- */

    fn check_delete(&self, ctx: &mut Context, s: StmtId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "deletion", s)
    }
    fn trans_delete(&self, ctx: &mut Context, s: StmtId, _idx: &Idx) -> Result<Vec<StmtId>> {
        missing(self, ctx, "trans_delete", s)
    }
    /// Assignment to an attribute or a subscript of a value of this fragment.
    fn check_assign_target(&self, ctx: &mut Context, s: StmtId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "assignment to attributes or subscripts", s)
    }
    fn trans_assign_target(
        &self, ctx: &mut Context, s: StmtId, _idx: &Idx,
    ) -> Result<Vec<StmtId>> {
        missing(self, ctx, "trans_assign_target", s)
    }
    fn check_aug_assign(&self, ctx: &mut Context, s: StmtId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "augmented assignment", s)
    }
    fn trans_aug_assign(&self, ctx: &mut Context, s: StmtId, _idx: &Idx) -> Result<Vec<StmtId>> {
        missing(self, ctx, "trans_aug_assign", s)
    }
    fn check_for(&self, ctx: &mut Context, s: StmtId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "for loops", s)
    }
    fn trans_for(&self, ctx: &mut Context, s: StmtId, _idx: &Idx) -> Result<Vec<StmtId>> {
        missing(self, ctx, "trans_for", s)
    }
    fn check_while(&self, ctx: &mut Context, s: StmtId, _idx: &Idx) -> Result<()> {
        unsupported(self, ctx, "while loops", s)
    }
    fn trans_while(&self, ctx: &mut Context, s: StmtId, _idx: &Idx) -> Result<Vec<StmtId>> {
        missing(self, ctx, "trans_while", s)
    }

    /* ---------------------------- Default Statements -------------------------- */

    /// `pat [: T] = e`
    fn check_assign(&self, ctx: &mut Context, s: StmtId) -> Result<()> {
        unsupported(self, ctx, "assignment statements", s)
    }
    fn trans_checked_assign(&self, ctx: &mut Context, s: StmtId) -> Result<Vec<StmtId>> {
        missing(self, ctx, "trans_checked_assign", s)
    }
    fn check_return(&self, ctx: &mut Context, s: StmtId) -> Result<()> {
        unsupported(self, ctx, "return statements", s)
    }
    fn trans_checked_return(&self, ctx: &mut Context, s: StmtId) -> Result<Vec<StmtId>> {
        missing(self, ctx, "trans_checked_return", s)
    }
    fn check_raise(&self, ctx: &mut Context, s: StmtId) -> Result<()> {
        unsupported(self, ctx, "raise statements", s)
    }
    fn trans_checked_raise(&self, ctx: &mut Context, s: StmtId) -> Result<Vec<StmtId>> {
        missing(self, ctx, "trans_checked_raise", s)
    }
    fn check_try(&self, ctx: &mut Context, s: StmtId) -> Result<()> {
        unsupported(self, ctx, "try statements", s)
    }
    fn trans_checked_try(&self, ctx: &mut Context, s: StmtId) -> Result<Vec<StmtId>> {
        missing(self, ctx, "trans_checked_try", s)
    }
    fn check_assert(&self, ctx: &mut Context, s: StmtId) -> Result<()> {
        unsupported(self, ctx, "assert statements", s)
    }
    fn trans_checked_assert(&self, ctx: &mut Context, s: StmtId) -> Result<Vec<StmtId>> {
        missing(self, ctx, "trans_checked_assert", s)
    }
    fn check_pass(&self, ctx: &mut Context, s: StmtId) -> Result<()> {
        unsupported(self, ctx, "pass statements", s)
    }
    fn trans_checked_pass(&self, ctx: &mut Context, s: StmtId) -> Result<Vec<StmtId>> {
        missing(self, ctx, "trans_checked_pass", s)
    }
    fn check_break(&self, ctx: &mut Context, s: StmtId) -> Result<()> {
        unsupported(self, ctx, "break statements", s)
    }
    fn trans_checked_break(&self, ctx: &mut Context, s: StmtId) -> Result<Vec<StmtId>> {
        missing(self, ctx, "trans_checked_break", s)
    }
    fn check_continue(&self, ctx: &mut Context, s: StmtId) -> Result<()> {
        unsupported(self, ctx, "continue statements", s)
    }
    fn trans_checked_continue(&self, ctx: &mut Context, s: StmtId) -> Result<Vec<StmtId>> {
        missing(self, ctx, "trans_checked_continue", s)
    }

    /* -------------------------------- Patterns -------------------------------- */

    fn ana_pat_num(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        unsupported(self, ctx, "number literal patterns", pat)
    }
    fn trans_pat_num(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, _scrutinee: ExprId,
    ) -> Result<PatTrans> {
        missing(self, ctx, "trans_pat_num", pat)
    }
    fn ana_pat_str(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        unsupported(self, ctx, "string literal patterns", pat)
    }
    fn trans_pat_str(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, _scrutinee: ExprId,
    ) -> Result<PatTrans> {
        missing(self, ctx, "trans_pat_str", pat)
    }
    fn ana_pat_name_constant(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx,
    ) -> Result<Bindings> {
        unsupported(self, ctx, "name constant patterns", pat)
    }
    fn trans_pat_name_constant(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, _scrutinee: ExprId,
    ) -> Result<PatTrans> {
        missing(self, ctx, "trans_pat_name_constant", pat)
    }
    fn ana_pat_tuple(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        unsupported(self, ctx, "tuple patterns", pat)
    }
    fn trans_pat_tuple(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, _scrutinee: ExprId,
    ) -> Result<PatTrans> {
        missing(self, ctx, "trans_pat_tuple", pat)
    }
    fn ana_pat_list(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        unsupported(self, ctx, "list patterns", pat)
    }
    fn trans_pat_list(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, _scrutinee: ExprId,
    ) -> Result<PatTrans> {
        missing(self, ctx, "trans_pat_list", pat)
    }
    fn ana_pat_dict(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        unsupported(self, ctx, "dictionary patterns", pat)
    }
    fn trans_pat_dict(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, _scrutinee: ExprId,
    ) -> Result<PatTrans> {
        missing(self, ctx, "trans_pat_dict", pat)
    }
    fn ana_pat_set(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        unsupported(self, ctx, "set patterns", pat)
    }
    fn trans_pat_set(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, _scrutinee: ExprId,
    ) -> Result<PatTrans> {
        missing(self, ctx, "trans_pat_set", pat)
    }
    fn ana_pat_name(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        unsupported(self, ctx, "constructor name patterns", pat)
    }
    fn trans_pat_name(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, _scrutinee: ExprId,
    ) -> Result<PatTrans> {
        missing(self, ctx, "trans_pat_name", pat)
    }
    fn ana_pat_call(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        unsupported(self, ctx, "constructor call patterns", pat)
    }
    fn trans_pat_call(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, _scrutinee: ExprId,
    ) -> Result<PatTrans> {
        missing(self, ctx, "trans_pat_call", pat)
    }
    fn ana_pat_unary_op(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        unsupported(self, ctx, "unary operator patterns", pat)
    }
    fn trans_pat_unary_op(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, _scrutinee: ExprId,
    ) -> Result<PatTrans> {
        missing(self, ctx, "trans_pat_unary_op", pat)
    }
    /// `"lit" + p` or `p + "lit"`
    fn ana_pat_bin_op(&self, ctx: &mut Context, pat: ExprId, _idx: &Idx) -> Result<Bindings> {
        unsupported(self, ctx, "binary operator patterns", pat)
    }
    fn trans_pat_bin_op(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, _scrutinee: ExprId,
    ) -> Result<PatTrans> {
        missing(self, ctx, "trans_pat_bin_op", pat)
    }
    fn ana_pat_joined_str(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx,
    ) -> Result<Bindings> {
        unsupported(self, ctx, "f-string patterns", pat)
    }
    fn trans_pat_joined_str(
        &self, ctx: &mut Context, pat: ExprId, _idx: &Idx, _scrutinee: ExprId,
    ) -> Result<PatTrans> {
        missing(self, ctx, "trans_pat_joined_str", pat)
    }
}

#[track_caller]
fn unsupported<F: Fragment + ?Sized, T>(
    fragment: &F, ctx: &Context, what: &str, site: impl Into<Tree>,
) -> Result<T> {
    ctx.type_err(format!("{} does not support {}.", fragment.name(), what), site)
}

#[track_caller]
fn missing<F: Fragment + ?Sized, T>(
    fragment: &F, ctx: &Context, method: &str, site: impl Into<Tree>,
) -> Result<T> {
    ctx.usage_err(format!("{} missing translation method: {}.", fragment.name(), method), site)
}

/* ------------------------------- FragmentRef ------------------------------ */

/// A fragment, identified by its implementing type.
#[derive(Clone, Copy, derive_more::Deref)]
pub struct FragmentRef(pub &'static dyn Fragment);

mod impls {
    use super::*;

    impl PartialEq for FragmentRef {
        fn eq(&self, other: &Self) -> bool {
            self.0.fragment_id() == other.0.fragment_id()
        }
    }
    impl Eq for FragmentRef {}

    impl std::fmt::Debug for FragmentRef {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0.name())
        }
    }
    impl std::fmt::Display for FragmentRef {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0.name())
        }
    }

    impl FragmentRef {
        /// Whether this fragment governs `other` in binary operators.
        pub fn governs(&self, other: &FragmentRef) -> bool {
            self.precedence().contains(other)
        }
    }
}
