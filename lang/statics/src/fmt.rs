use crate::{syntax::*, *};
use std::fmt;

pub use typy_syntax::{Formatter, Pretty, Ugly};

/// The default rendering of a fragment's type: the bare name for a trivial
/// index, the name applied to its index otherwise.
pub fn idx_output(name: &str, idx: &Idx) -> String {
    let inner = match idx {
        | Idx::Triv => return name.to_string(),
        | Idx::Fields(fields) => fields
            .iter()
            .map(|(label, ty)| match label {
                | Label::Pos(_) => ty.to_string(),
                | Label::Name(label) => format!("{} : {}", label, ty),
            })
            .collect::<Vec<_>>()
            .join(", "),
        | Idx::Arrow { args, ret } => {
            if args.is_empty() {
                format!("() > {}", ret)
            } else {
                let args: Vec<_> = args.iter().map(|ty| ty.to_string()).collect();
                format!("{} > {}", args.join(", "), ret)
            }
        }
        | Idx::Cases(cases) => cases
            .iter()
            .map(|(tag, tys)| {
                if tys.is_empty() {
                    tag.clone()
                } else {
                    let tys: Vec<_> = tys.iter().map(|ty| ty.to_string()).collect();
                    format!("{}({})", tag, tys.join(", "))
                }
            })
            .collect::<Vec<_>>()
            .join(", "),
        | Idx::Component(component) => component.name().to_string(),
    };
    format!("{}[{}]", name, inner)
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            | Kind::Type => write!(f, "Type"),
            | Kind::Singleton(ty) => write!(f, "Singleton({})", ty),
        }
    }
}

impl fmt::Display for TyExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            | TyExpr::Var(TyVar { name, .. }) => write!(f, "{}", name),
            | TyExpr::Canonical(CanonicalTy { fragment, idx }) => {
                write!(f, "{}", fragment.fmt_idx(idx))
            }
            | TyExpr::Prj(TyPrj { path, label }) => write!(f, "{}.{}", path.name(), label),
            | TyExpr::Rec(RecTy { name, .. }) => write!(f, "{}", name),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            | Label::Pos(n) => write!(f, "{}", n),
            | Label::Name(name) => write!(f, "{}", name),
        }
    }
}

impl fmt::Debug for RecTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rec({}#{})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    struct Dummy;
    impl Fragment for Dummy {
        fn name(&self) -> &'static str {
            "dummy"
        }
    }
    static DUMMY: Dummy = Dummy;

    fn dummy(idx: Idx) -> TyExpr {
        CanonicalTy { fragment: FragmentRef(&DUMMY), idx: Rc::new(idx) }.into()
    }

    #[test]
    fn rendering_indices() {
        let t = dummy(Idx::Triv);
        assert_eq!(t.to_string(), "dummy");
        let mut fields = indexmap::IndexMap::new();
        fields.insert(Label::Name("a".into()), t.clone());
        fields.insert(Label::Name("b".into()), t.clone());
        assert_eq!(dummy(Idx::Fields(fields)).to_string(), "dummy[a : dummy, b : dummy]");
        let arrow = dummy(Idx::Arrow { args: vec![], ret: t.clone() });
        assert_eq!(arrow.to_string(), "dummy[() > dummy]");
        let arrow = dummy(Idx::Arrow { args: vec![t.clone(), t.clone()], ret: t.clone() });
        assert_eq!(arrow.to_string(), "dummy[dummy, dummy > dummy]");
        let mut cases = indexmap::IndexMap::new();
        cases.insert("Nil".to_string(), vec![]);
        cases.insert("Cons".to_string(), vec![t.clone(), t.clone()]);
        assert_eq!(dummy(Idx::Cases(cases)).to_string(), "dummy[Nil, Cons(dummy, dummy)]");
        assert_eq!(Kind::Singleton(Rc::new(t)).to_string(), "Singleton(dummy)");
    }

    #[test]
    fn syntactic_equality_is_structural_on_indices() {
        let a = dummy(Idx::Arrow { args: vec![dummy(Idx::Triv)], ret: dummy(Idx::Triv) });
        let b = dummy(Idx::Arrow { args: vec![dummy(Idx::Triv)], ret: dummy(Idx::Triv) });
        let c = dummy(Idx::Arrow { args: vec![], ret: dummy(Idx::Triv) });
        assert_eq!(a, b);
        assert!(a != c);
    }
}
