pub mod utils {
    use std::rc::Rc;
    use typy_driver::{BuildSystem, BuildError, Component, Conf};
    use typy_statics::syntax::*;

    pub fn build_system() -> BuildSystem {
        typy_driver::init_logger();
        BuildSystem::with_conf(Conf { log_translation: true, ..Default::default() })
    }

    /// Builds `def` in `build_sys`, panicking with the rendered error.
    pub fn build_in(build_sys: &mut BuildSystem, arena: HostArena, def: StmtId) -> Rc<Component> {
        match build_sys.add(arena, def) {
            | Ok(id) => build_sys.components[&id].clone(),
            | Err(err) => {
                eprintln!("{}", err);
                panic!("Error building component");
            }
        }
    }

    pub fn build(arena: HostArena, def: StmtId) -> Rc<Component> {
        build_in(&mut build_system(), arena, def)
    }

    /// The checker message `def` is rejected with.
    pub fn rejection(arena: HostArena, def: StmtId) -> String {
        match build_system().add(arena, def) {
            | Ok(_) => panic!("component was accepted"),
            | Err(BuildError::ComponentError(err)) => match err.tyck_error() {
                | Some(error) => error.message(),
                | None => panic!("component failed at runtime: {}", err),
            },
            | Err(err) => panic!("unexpected error: {}", err),
        }
    }

    /// `@component def name(): body`
    pub fn component(a: &mut HostArena, name: &str, body: Vec<StmtId>) -> StmtId {
        let decorator = a.name("component");
        a.def(name, vec![], None, vec![decorator], body)
    }

    /// `@fn def name(x: A, ...) -> R: body` with types given by name.
    pub fn fn_def(
        a: &mut HostArena, name: &str, params: &[(&str, &str)], returns: &str, body: Vec<StmtId>,
    ) -> StmtId {
        let decorator = a.name("fn");
        let params = params.iter().map(|(x, ty)| (*x, Some(a.name(ty)))).collect();
        let returns = a.name(returns);
        a.def(name, params, Some(returns), vec![decorator], body)
    }

    /// `[scrutinee].match` followed by `with pat: body` rules.
    pub fn match_stmts(
        a: &mut HostArena, scrutinee: ExprId, rules: Vec<(ExprId, ExprId)>,
    ) -> Vec<StmtId> {
        let mut stmts = vec![a.scrutinize(scrutinee)];
        for (pat, body) in rules {
            let body = a.expr_stmt(body);
            stmts.push(a.rule(pat, vec![body]));
        }
        stmts
    }
}

/// A component that builds; `$check` inspects it as `$c`.
#[macro_export]
macro_rules! accepts {
    ($name:ident, |$a:ident| $body:block, |$c:ident| $check:block) => {
        #[test]
        fn $name() {
            let mut arena = ::typy_statics::syntax::HostArena::new();
            let def = {
                let $a = &mut arena;
                $body
            };
            let $c = ::typy_tests::utils::build(arena, def);
            $check
        }
    };
}

/// A component the checker rejects with `$msg`.
#[macro_export]
macro_rules! rejects {
    ($name:ident, |$a:ident| $body:block, $msg:expr) => {
        #[test]
        fn $name() {
            let mut arena = ::typy_statics::syntax::HostArena::new();
            let def = {
                let $a = &mut arena;
                $body
            };
            ::pretty_assertions::assert_eq!(::typy_tests::utils::rejection(arena, def), $msg);
        }
    };
}
