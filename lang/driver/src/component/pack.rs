//! The component pipeline: `ComponentSource` -> `ComponentParsed` ->
//! `ComponentChecked` -> `ComponentTranslated` -> `Component`.

use super::{
    err::{ComponentError, Result},
    member::{formation_err, Interface, Member},
};
use crate::conf::{Conf, Stage};
use std::rc::Rc;
use typy_dynamics::{syntax::Frame, Runtime, RuntimeError, Value};
use typy_statics::{component_singleton, syntax::*, Context, Exports, StaticEnv, StaticValue};

pub struct ComponentSource {
    pub arena: HostArena,
    /// the decorated `def` holding the component body
    pub def: StmtId,
    pub env: StaticEnv,
}

pub struct ComponentParsed {
    pub name: String,
    ctx: Context,
    members: Vec<Member>,
}

pub struct ComponentChecked {
    pub name: String,
    ctx: Context,
    members: Vec<Member>,
    pub interface: Interface,
}

pub struct ComponentTranslated {
    pub name: String,
    pub arena: Rc<HostArena>,
    pub body: Vec<StmtId>,
    env: StaticEnv,
    pub interface: Interface,
}

/// A component as far as the pipeline took it.
pub struct Component {
    pub name: String,
    pub stage: Stage,
    pub interface: Interface,
    pub arena: Rc<HostArena>,
    /// empty before translation
    pub translation: Vec<StmtId>,
    module: Option<Value>,
}

impl ComponentSource {
    /// Runs the pipeline up to `conf.stop_after`.
    pub fn run(self, conf: &Conf) -> Result<Component> {
        let parsed = self.parse()?;
        if conf.stop_after == Stage::Parse {
            return Ok(parsed.into());
        }
        let checked = parsed.check()?;
        if conf.stop_after == Stage::Check {
            return Ok(checked.into());
        }
        let translated = checked.translate()?;
        if conf.log_translation {
            log::info!(
                "translation of component `{}`:\n{}",
                translated.name,
                translated.source(conf.width)
            );
        }
        if conf.stop_after == Stage::Translate {
            return Ok(translated.into());
        }
        translated.evaluate()
    }

    pub fn parse(self) -> Result<ComponentParsed> {
        let ComponentSource { arena, def, env } = self;
        let mut ctx = Context::new(arena, env).with_host_fragment(typy_std::py());
        let name = match &ctx.arena.stmts[&def] {
            | Stmt::FunctionDef(FunctionDef { name, .. }) => name.clone(),
            | _ => String::from("<component>"),
        };
        log::info!("parsing component `{}`", name);
        match Self::members(&mut ctx, def) {
            | Ok(members) => Ok(ComponentParsed { name, ctx, members }),
            | Err(entry) => Err(ComponentError::tyck(&ctx, &name, entry)),
        }
    }

    fn members(ctx: &mut Context, def: StmtId) -> typy_statics::Result<Vec<Member>> {
        let Stmt::FunctionDef(FunctionDef { args, body, decorators, .. }) =
            ctx.arena.stmts[&def].clone()
        else {
            return formation_err(ctx, "Components must be function definitions.", def);
        };
        let Arguments { args, vararg, kwonlyargs, kwarg, defaults } = args;
        if !args.is_empty()
            || vararg.is_some()
            || !kwonlyargs.is_empty()
            || kwarg.is_some()
            || !defaults.is_empty()
        {
            return formation_err(ctx, "Components cannot take arguments.", def);
        }
        if decorators.len() > 1 {
            return formation_err(ctx, "Components take at most one decorator.", def);
        }
        Member::parse_all(ctx, body)
    }
}

impl ComponentParsed {
    pub fn check(self) -> Result<ComponentChecked> {
        let ComponentParsed { name, mut ctx, members } = self;
        log::info!("checking component `{}`", name);
        ctx.push_default_fragment(component_singleton());
        let mut interface = Interface::default();
        for member in &members {
            log::debug!("checking member {}", member.label().unwrap_or("<statement>"));
            if let Err(entry) = member.check(&mut ctx, &mut interface) {
                return Err(ComponentError::tyck(&ctx, &name, entry));
            }
        }
        Ok(ComponentChecked { name, ctx, members, interface })
    }
}

impl ComponentChecked {
    /// Imports come first, sorted by module, then the members in order.
    pub fn translate(self) -> Result<ComponentTranslated> {
        let ComponentChecked { name, mut ctx, members, interface } = self;
        log::info!("translating component `{}`", name);
        let mut translation = Vec::new();
        for member in &members {
            match member.translate(&mut ctx) {
                | Ok(stmts) => translation.extend(stmts),
                | Err(entry) => return Err(ComponentError::tyck(&ctx, &name, entry)),
            }
        }
        let mut body: Vec<StmtId> = (ctx.imports().into_iter())
            .map(|(module, alias)| ctx.arena.import(&module, Some(alias.as_str())))
            .collect();
        body.extend(translation);
        let env = ctx.static_env.clone();
        let arena = Rc::new(std::mem::take(&mut ctx.arena));
        Ok(ComponentTranslated { name, arena, body, env, interface })
    }
}

impl ComponentTranslated {
    pub fn source(&self, width: usize) -> String {
        render(&self.arena, &self.body, width)
    }

    /// Host values and evaluated components of the environment are visible
    /// to the body but are not members of the resulting module.
    pub fn evaluate(self) -> Result<Component> {
        let ComponentTranslated { name, arena, body, env, interface } = self;
        log::info!("evaluating component `{}`", name);
        let statics = Frame::root();
        for (id, value) in env.iter() {
            match value {
                | StaticValue::Host(value) => Frame::define(&statics, id.clone(), value.clone()),
                | StaticValue::Component(component) => {
                    if let Some(module) = component.module() {
                        Frame::define(&statics, id.clone(), module)
                    }
                }
                | StaticValue::Fragment(_) | StaticValue::Namespace(_) => {}
            }
        }
        let globals = Frame::child(&statics);
        let module = Runtime::new(arena.clone())
            .run_module(&name, &body, globals)
            .map_err(|error| ComponentError::Runtime { name: name.clone(), error })?;
        Ok(Component {
            name,
            stage: Stage::Evaluate,
            interface,
            arena,
            translation: body,
            module: Some(Value::Module(module)),
        })
    }
}

fn render(arena: &HostArena, stmts: &[StmtId], width: usize) -> String {
    let mut fmt = typy_syntax::Formatter::new(arena);
    fmt.width = width;
    fmt.source(stmts)
}

mod impls {
    use super::*;

    impl From<ComponentParsed> for Component {
        fn from(ComponentParsed { name, mut ctx, .. }: ComponentParsed) -> Self {
            Component {
                name,
                stage: Stage::Parse,
                interface: Interface::default(),
                arena: Rc::new(std::mem::take(&mut ctx.arena)),
                translation: Vec::new(),
                module: None,
            }
        }
    }

    impl From<ComponentChecked> for Component {
        fn from(ComponentChecked { name, mut ctx, interface, .. }: ComponentChecked) -> Self {
            Component {
                name,
                stage: Stage::Check,
                interface,
                arena: Rc::new(std::mem::take(&mut ctx.arena)),
                translation: Vec::new(),
                module: None,
            }
        }
    }

    impl From<ComponentTranslated> for Component {
        fn from(translated: ComponentTranslated) -> Self {
            let ComponentTranslated { name, arena, body, interface, .. } = translated;
            Component {
                name,
                stage: Stage::Translate,
                interface,
                arena,
                translation: body,
                module: None,
            }
        }
    }
}

impl Component {
    pub fn source(&self, width: usize) -> String {
        render(&self.arena, &self.translation, width)
    }

    /// A member of the evaluated module.
    pub fn member(&self, label: &str) -> Option<Value> {
        match &self.module {
            | Some(Value::Module(module)) => module.members.get(label).cloned(),
            | _ => None,
        }
    }

    /// Calls a function member with positional arguments.
    pub fn call(&self, label: &str, args: Vec<Value>) -> Result<Value> {
        let runtime_err = |error: RuntimeError| ComponentError::Runtime { name: self.name.clone(), error };
        let Some(func) = self.member(label) else {
            return Err(runtime_err(RuntimeError::Unbound(label.to_string())));
        };
        Runtime::new(self.arena.clone()).call(&func, args, Vec::new()).map_err(runtime_err)
    }
}

impl Exports for Component {
    fn name(&self) -> &str {
        &self.name
    }
    fn kind_of(&self, label: &str) -> Option<Kind> {
        self.interface.kinds.get(label).cloned()
    }
    fn val_ty(&self, label: &str) -> Option<TyExpr> {
        self.interface.tys.get(label).cloned()
    }
    fn module(&self) -> Option<Value> {
        self.module.clone()
    }
}
