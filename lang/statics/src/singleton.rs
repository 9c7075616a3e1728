//! The type of a reference to another component, and the default fragment
//! of component bodies.

use crate::{syntax::*, *};

pub struct ComponentSingleton;

static COMPONENT_SINGLETON: ComponentSingleton = ComponentSingleton;

pub fn component_singleton() -> FragmentRef {
    FragmentRef(&COMPONENT_SINGLETON)
}

fn component_of<'a>(ctx: &Context, idx: &'a Idx, e: ExprId) -> Result<&'a ComponentRef> {
    match idx {
        | Idx::Component(component) => Ok(component),
        | _ => ctx.internal_err("component_singleton at a non-component index.", e),
    }
}

impl Fragment for ComponentSingleton {
    fn name(&self) -> &'static str {
        "component_singleton"
    }

    /// `C.x` for a value member `x`.
    fn syn_attribute(&self, ctx: &mut Context, e: ExprId, idx: &Idx) -> Result<TyExpr> {
        let component = component_of(ctx, idx, e)?;
        let Expr::Attribute(Attribute { attr, .. }) = &ctx.arena.exprs[&e] else {
            return ctx.internal_err("Expected an attribute.", e);
        };
        let attr = attr.clone();
        if let Some(ty) = component.val_ty(&attr) {
            return Ok(ty);
        }
        if component.kind_of(&attr).is_some() {
            return ctx.type_err(format!("Component member is not a value member: {}", attr), e);
        }
        ctx.type_err(format!("Invalid component member: {}", attr), e)
    }
    fn trans_attribute(&self, ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        let Expr::Attribute(Attribute { value, attr }) = ctx.arena.exprs[&e].clone() else {
            return ctx.internal_err("Expected an attribute.", e);
        };
        let value = ctx.trans(value)?;
        Ok(ctx.arena.attr(value, &attr))
    }
    /// The name as written; the evaluator binds it to the component's module.
    fn trans_component_ref(&self, _ctx: &mut Context, e: ExprId, _idx: &Idx) -> Result<ExprId> {
        Ok(e)
    }

    /// Definitions keep their names at the top of a component.
    fn integrate_static_function_def(
        &self, ctx: &mut Context, s: StmtId, _ty: &TyExpr,
    ) -> Result<()> {
        let Stmt::FunctionDef(FunctionDef { name, .. }) = &ctx.arena.stmts[&s] else {
            return ctx.internal_err("Expected a function definition.", s);
        };
        let name = name.clone();
        ctx.set_def_uniq(s, &name);
        Ok(())
    }

    fn check_pass(&self, _ctx: &mut Context, _s: StmtId) -> Result<()> {
        Ok(())
    }
    fn trans_checked_pass(&self, ctx: &mut Context, _s: StmtId) -> Result<Vec<StmtId>> {
        Ok(vec![ctx.arena.pass()])
    }
}
