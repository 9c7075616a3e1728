use crate::{classify::*, syntax::*, *};

impl Context {
    /// Analyzes `pat` against the type of the value it matches, returning
    /// the variables it binds.
    pub fn ana_pat(&mut self, pat: ExprId, ty: &TyExpr) -> Result<Bindings> {
        self.guarded(|ctx| {
            ctx.stack.push_back(TyckTask::Pat(pat, ty.clone()));
            ctx.log_tree("ana pat", pat);
            let shape = match classify_pat(&ctx.arena, &pat) {
                | PatShape::Wildcard => return Ok(Bindings::new()),
                | PatShape::Var(x) => {
                    let mut bindings = Bindings::new();
                    bindings.insert(x, ty.clone());
                    return Ok(bindings);
                }
                | PatShape::Unsupported(msg) => return ctx.type_err(msg, pat),
                | shape => shape,
            };
            let CanonicalTy { fragment, idx } = match ctx.canonicalize(ty)? {
                | TyExpr::Canonical(c) => c,
                | _ => return ctx.type_err("Cannot match on a value of abstract type.", pat),
            };
            let bindings = match shape {
                | PatShape::Num => fragment.ana_pat_num(ctx, pat, &idx)?,
                | PatShape::Str => fragment.ana_pat_str(ctx, pat, &idx)?,
                | PatShape::NameConstant => fragment.ana_pat_name_constant(ctx, pat, &idx)?,
                | PatShape::Tuple => fragment.ana_pat_tuple(ctx, pat, &idx)?,
                | PatShape::List => fragment.ana_pat_list(ctx, pat, &idx)?,
                | PatShape::Dict => fragment.ana_pat_dict(ctx, pat, &idx)?,
                | PatShape::Set => fragment.ana_pat_set(ctx, pat, &idx)?,
                | PatShape::Name => fragment.ana_pat_name(ctx, pat, &idx)?,
                | PatShape::Call => fragment.ana_pat_call(ctx, pat, &idx)?,
                | PatShape::UnaryOp => fragment.ana_pat_unary_op(ctx, pat, &idx)?,
                | PatShape::BinOp => fragment.ana_pat_bin_op(ctx, pat, &idx)?,
                | PatShape::JoinedStr => fragment.ana_pat_joined_str(ctx, pat, &idx)?,
                | PatShape::Wildcard | PatShape::Var(_) | PatShape::Unsupported(_) => {
                    return ctx.internal_err("Pattern shape was handled above.", pat);
                }
            };
            let annotation = PatAnnotation { delegate: fragment, idx, bindings: bindings.clone() };
            ctx.state.pat_annotations.insert(pat, annotation);
            Ok(bindings)
        })
    }

    /// Adds the variables of a subpattern to those of its siblings; a
    /// variable may occur only once in a pattern.
    pub fn merge_bindings(
        &self, into: &mut Bindings, from: Bindings, site: ExprId,
    ) -> Result<()> {
        for (name, ty) in from {
            if into.contains_key(&name) {
                return self.type_err(format!("Duplicate variable in pattern: {}", name), site);
            }
            into.insert(name, ty);
        }
        Ok(())
    }
}
