//! Name resolution: binds identifier references to property ids, builds the
//! object graph, and lays out the lexical type scopes.
//!
//! All names at a level are registered before any value is visited, so
//! forward references within a record are legal. A duplicate name at the
//! same level is fatal; shadowing an outer scope is not.

use indexmap::IndexMap;

use crate::diagnostics::Diagnostic;
use crate::parser::{Ast, Element, ElementKind, PropId, Property};
use crate::span::Span;

use super::graph::ObjectGraph;
use super::types::{EnvId, ROOT_ENV, TypeEnvs};

/// Everything later passes need to know about one property.
#[derive(Clone, Debug)]
pub struct PropertyInfo<'a> {
    pub name: &'a str,
    pub name_span: Span,
    pub value: &'a Element,
    /// Scope the property's name is bound into.
    pub env: EnvId,
    /// Scope of the value's own fields, when the value is a record.
    pub fields_env: Option<EnvId>,
}

/// Output of the resolution pre-pass.
#[derive(Debug)]
pub struct Resolution<'a> {
    /// Properties in visit order (parents before their children).
    pub props: IndexMap<PropId, PropertyInfo<'a>>,
    pub graph: ObjectGraph,
    pub envs: TypeEnvs,
}

/// Resolve a parsed unit: populate the property table, the reference graph,
/// and the scope tree. The first unresolved identifier or duplicate name
/// aborts.
pub fn resolve(ast: &Ast) -> Result<Resolution<'_>, Diagnostic> {
    let mut resolver = Resolver {
        props: IndexMap::new(),
        graph: ObjectGraph::new(),
        envs: TypeEnvs::new(),
        scopes: Vec::new(),
    };

    let root_scope = resolver.push_scope(None);
    resolver.visit_level(ast.root_properties(), root_scope, ROOT_ENV)?;

    Ok(Resolution {
        props: resolver.props,
        graph: resolver.graph,
        envs: resolver.envs,
    })
}

struct NameScope<'a> {
    parent: Option<usize>,
    names: IndexMap<&'a str, (PropId, Span)>,
}

struct Resolver<'a> {
    props: IndexMap<PropId, PropertyInfo<'a>>,
    graph: ObjectGraph,
    envs: TypeEnvs,
    scopes: Vec<NameScope<'a>>,
}

impl<'a> Resolver<'a> {
    fn push_scope(&mut self, parent: Option<usize>) -> usize {
        self.scopes.push(NameScope {
            parent,
            names: IndexMap::new(),
        });
        self.scopes.len() - 1
    }

    fn lookup(&self, scope: usize, name: &str) -> Option<PropId> {
        let mut current = Some(scope);
        while let Some(scope) = current {
            if let Some(&(id, _)) = self.scopes[scope].names.get(name) {
                return Some(id);
            }
            current = self.scopes[scope].parent;
        }
        None
    }

    fn visit_level(
        &mut self,
        properties: &'a [Property],
        scope: usize,
        env: EnvId,
    ) -> Result<(), Diagnostic> {
        for prop in properties {
            let entry = self.scopes[scope]
                .names
                .insert(&prop.name, (prop.id, prop.name_span));
            if let Some((_, previous_span)) = entry {
                return Err(Diagnostic::semantic(
                    prop.name_span,
                    format!("duplicate property `{}`", prop.name),
                )
                .with_note(Some(previous_span), "previously defined here"));
            }
        }

        for prop in properties {
            self.graph.add_vertex(prop.id);

            let fields_env = prop.value.is_record().then(|| self.envs.child(env));
            self.props.insert(
                prop.id,
                PropertyInfo {
                    name: &prop.name,
                    name_span: prop.name_span,
                    value: &prop.value,
                    env,
                    fields_env,
                },
            );

            match &prop.value.kind {
                ElementKind::Properties(children) => {
                    // Containment edges keep a child grouped no later than
                    // its parent.
                    for child in children {
                        self.graph.add_edge(child.id, prop.id);
                    }
                    let child_scope = self.push_scope(Some(scope));
                    let child_env = fields_env.unwrap_or(env);
                    self.visit_level(children, child_scope, child_env)?;
                }
                ElementKind::Id(name) => {
                    self.add_reference_edge(scope, name, prop)?;
                }
                ElementKind::Access(names) => {
                    // Only the head resolves here; the tail is walked by
                    // inference once record shapes are known.
                    self.add_reference_edge(scope, &names[0], prop)?;
                }
                ElementKind::Int(_) | ElementKind::Str(_) => {}
            }
        }

        Ok(())
    }

    fn add_reference_edge(
        &mut self,
        scope: usize,
        name: &str,
        referencer: &Property,
    ) -> Result<(), Diagnostic> {
        let target = self.lookup(scope, name).ok_or_else(|| {
            Diagnostic::semantic(
                referencer.value.span,
                format!("unresolved identifier `{name}`"),
            )
        })?;
        self.graph.add_edge(target, referencer.id);
        Ok(())
    }
}
