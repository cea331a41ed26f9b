//! Semantic analysis: name resolution, dependency grouping, type inference.
//!
//! The passes run in a fixed order: `resolve` builds the property table,
//! the object graph, and the scope tree; `graph::compute_order` groups
//! mutually recursive properties and schedules them dependencies-first;
//! `infer::run` types each group. The first fatal diagnostic aborts.

pub mod graph;
pub mod infer;
pub mod resolve;
pub mod types;

#[cfg(test)]
mod types_tests;

pub use graph::{Group, ObjectGraph};
pub use resolve::{PropertyInfo, Resolution};
pub use types::{EnvId, ROOT_ENV, TypeContext, TypeEnvs, TypeId, TypeShape};

use indexmap::IndexMap;

use crate::diagnostics::Diagnostic;
use crate::parser::{Ast, PropId};

/// Fully analyzed compilation unit.
#[derive(Debug)]
pub struct Analysis<'a> {
    /// Properties in visit order (parents before children).
    pub props: IndexMap<PropId, PropertyInfo<'a>>,
    pub graph: ObjectGraph,
    /// SCC groups, dependencies first.
    pub order: Vec<Group>,
    pub types: TypeContext,
    pub envs: TypeEnvs,
    /// Inferred type of every property.
    pub prop_types: IndexMap<PropId, TypeId>,
}

/// Run the full semantic pipeline over a parsed unit.
pub fn analyze(ast: &Ast) -> Result<Analysis<'_>, Diagnostic> {
    let Resolution {
        props,
        graph,
        mut envs,
    } = resolve::resolve(ast)?;

    let order = graph::compute_order(&graph);

    let mut types = TypeContext::new();
    let prop_types = infer::run(&props, &order, &mut types, &mut envs)?;

    Ok(Analysis {
        props,
        graph,
        order,
        types,
        envs,
        prop_types,
    })
}
