//! The members of a component body.

use indexmap::IndexMap;
use std::rc::Rc;
use typy_statics::{
    classify::{classify_stmt, StmtShape},
    syntax::*,
    Context, Result, TyckError,
};

pub enum Member {
    /// `t [type] = T`
    Type { id: String, ty: ExprId, stmt: StmtId },
    /// `x [: T] = e` and `x = e`
    Value { id: String, ann: Option<ExprId>, value: ExprId, stmt: StmtId },
    /// `@F def x(...): ...`
    Def { id: String, stmt: StmtId },
    /// statements and matches run for effect; not exported
    Stmt(Item),
}

/// What a checked component exports.
#[derive(Clone, Default)]
pub struct Interface {
    pub kinds: IndexMap<String, Kind>,
    pub tys: IndexMap<String, TyExpr>,
}

#[track_caller]
pub(crate) fn formation_err<T>(
    ctx: &Context, msg: impl Into<String>, site: impl Into<Tree>,
) -> Result<T> {
    ctx.err(TyckError::ComponentFormation(msg.into()), Some(site.into()))
}

impl Member {
    /// Sorts the items of a component body into members.
    pub fn parse_all(ctx: &mut Context, body: BlockId) -> Result<Vec<Member>> {
        let items = ctx.segments(body)?;
        let mut members = Vec::new();
        for item in items.iter() {
            let member = match *item {
                | Item::Match(_) => Member::Stmt(*item),
                | Item::Stmt(s) => match ctx.arena.stmts[&s].clone() {
                    | Stmt::Assign(assign) => Self::parse_assign(ctx, s, assign)?,
                    | Stmt::FunctionDef(FunctionDef { name, .. }) => {
                        Member::Def { id: name, stmt: s }
                    }
                    | Stmt::Return(_) | Stmt::Delete(_) => {
                        return formation_err(
                            ctx,
                            "Invalid statement form in component definition.",
                            s,
                        );
                    }
                    | _ => match classify_stmt(&ctx.arena, &s) {
                        | StmtShape::Unsupported(_) => {
                            return formation_err(
                                ctx,
                                "Invalid statement form in component definition.",
                                s,
                            );
                        }
                        | _ => Member::Stmt(*item),
                    },
                },
            };
            members.push(member);
        }
        Self::check_duplicates(ctx, &members)?;
        Ok(members)
    }

    fn parse_assign(ctx: &Context, s: StmtId, Assign { targets, value }: Assign) -> Result<Member> {
        let [target] = targets.as_slice() else {
            return formation_err(ctx, "Too many assignment targets.", s);
        };
        match ctx.arena.exprs[target].clone() {
            | Expr::Name(Name(id)) => Ok(Member::Value { id, ann: None, value, stmt: s }),
            | Expr::Subscript(Subscript { value: head, slice }) => {
                let Some(id) = ctx.arena.name_of(&head).map(str::to_string) else {
                    return formation_err(ctx, "Invalid member definition.", s);
                };
                match slice {
                    | Slice::Index(kw) if ctx.arena.name_of(&kw) == Some("type") => {
                        Ok(Member::Type { id, ty: value, stmt: s })
                    }
                    | Slice::Range(Range { lower: None, upper: Some(ann), step: None }) => {
                        Ok(Member::Value { id, ann: Some(ann), value, stmt: s })
                    }
                    | _ => formation_err(ctx, "Invalid member definition.", s),
                }
            }
            | _ => formation_err(ctx, "Invalid member definition.", s),
        }
    }

    /// Type members and value members live in separate namespaces.
    fn check_duplicates(ctx: &Context, members: &[Member]) -> Result<()> {
        let mut types = Vec::new();
        let mut values = Vec::new();
        for member in members {
            let (seen, id, stmt) = match member {
                | Member::Type { id, stmt, .. } => (&mut types, id, *stmt),
                | Member::Value { id, stmt, .. } | Member::Def { id, stmt } => {
                    (&mut values, id, *stmt)
                }
                | Member::Stmt(_) => continue,
            };
            if seen.contains(&id) {
                return formation_err(ctx, format!("Duplicate component member: {}", id), stmt);
            }
            seen.push(id);
        }
        Ok(())
    }

    /// The exported label, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            | Member::Type { id, .. } | Member::Value { id, .. } | Member::Def { id, .. } => {
                Some(id)
            }
            | Member::Stmt(_) => None,
        }
    }

    pub fn check(&self, ctx: &mut Context, interface: &mut Interface) -> Result<()> {
        match self {
            | Member::Type { id, ty, .. } => {
                let ty = ctx.bind_ty_member(id, *ty)?;
                interface.kinds.insert(id.clone(), Kind::Singleton(Rc::new(ty)));
            }
            | Member::Value { id, ann, value, .. } => {
                let ty = match ann {
                    | Some(ann) => {
                        let ty = ctx.as_type(*ann)?;
                        ctx.ana(*value, &ty)?;
                        ty
                    }
                    | None => ctx.syn(*value)?,
                };
                ctx.bind_as(id, id, ty.clone());
                interface.tys.insert(id.clone(), ctx.normalize(&ty)?);
            }
            | Member::Def { id, stmt } => {
                ctx.set_def_uniq(*stmt, id);
                let ty = ctx.syn(*stmt)?;
                ctx.bind_as(id, id, ty.clone());
                interface.tys.insert(id.clone(), ctx.normalize(&ty)?);
            }
            | Member::Stmt(Item::Stmt(s)) => ctx.check(*s)?,
            | Member::Stmt(Item::Match(m)) => {
                ctx.syn(*m)?;
            }
        }
        Ok(())
    }

    pub fn translate(&self, ctx: &mut Context) -> Result<Vec<StmtId>> {
        match self {
            | Member::Type { .. } => Ok(Vec::new()),
            | Member::Value { id, value, .. } => {
                let value = ctx.trans(*value)?;
                Ok(vec![ctx.arena.assign_name(id, value)])
            }
            | Member::Def { stmt, .. } => ctx.trans_stmt(*stmt, Mechanism::Statement),
            | Member::Stmt(item) => ctx.trans_item(*item, Mechanism::Statement),
        }
    }
}
