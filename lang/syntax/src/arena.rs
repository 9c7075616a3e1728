use crate::syntax::*;
use typy_utils::arena::*;

/// Every node of one program, addressed by id.
///
/// Nodes are never removed; translations allocate their output into the same
/// arena as the source they came from.
#[derive(Clone, Debug, Default)]
pub struct HostArena {
    pub exprs: ArenaDense<ExprId, Expr, ()>,
    pub stmts: ArenaDense<StmtId, Stmt, ()>,
    pub blocks: ArenaDense<BlockId, Block, ()>,
}

impl HostArena {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn expr(&mut self, expr: impl Into<Expr>) -> ExprId {
        self.exprs.alloc(expr.into())
    }
    pub fn stmt(&mut self, stmt: Stmt) -> StmtId {
        self.stmts.alloc(stmt)
    }
    pub fn block(&mut self, stmts: Vec<StmtId>) -> BlockId {
        self.blocks.alloc(Block(stmts))
    }
    pub fn stmts_of(&self, block: &BlockId) -> &[StmtId] {
        let Block(stmts) = &self.blocks[block];
        stmts
    }
    /// The identifier if `e` is a plain name.
    pub fn name_of(&self, e: &ExprId) -> Option<&str> {
        match &self.exprs[e] {
            | Expr::Name(Name(id)) => Some(id.as_str()),
            | _ => None,
        }
    }
}
