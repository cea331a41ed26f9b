//! Group-ordered type inference.
//!
//! Groups arrive dependencies-first. Within a group, record-valued
//! properties get two passes: the first mints a row type of fresh variables
//! and publishes it under the property's name (so mutually recursive
//! records can see each other's shape), the second typechecks every field
//! against its placeholder. Remaining properties are typechecked in a
//! single pass.

use indexmap::IndexMap;

use crate::diagnostics::Diagnostic;
use crate::parser::{Element, ElementKind, PropId};
use crate::span::Span;

use super::graph::Group;
use super::resolve::PropertyInfo;
use super::types::{EnvId, TypeContext, TypeEnvs, TypeId, TypeShape};

/// Infer a type for every property, in group order.
pub fn run(
    props: &IndexMap<PropId, PropertyInfo<'_>>,
    order: &[Group],
    ctx: &mut TypeContext,
    envs: &mut TypeEnvs,
) -> Result<IndexMap<PropId, TypeId>, Diagnostic> {
    let mut inferencer = Inferencer {
        props,
        ctx,
        envs,
        prop_types: IndexMap::new(),
    };

    for group in order {
        inferencer.infer_group(group)?;
    }

    Ok(inferencer.prop_types)
}

struct Inferencer<'a, 'p> {
    props: &'a IndexMap<PropId, PropertyInfo<'p>>,
    ctx: &'a mut TypeContext,
    envs: &'a mut TypeEnvs,
    prop_types: IndexMap<PropId, TypeId>,
}

impl<'a, 'p> Inferencer<'a, 'p> {
    fn info(&self, id: PropId) -> Result<&PropertyInfo<'p>, Diagnostic> {
        self.props.get(&id).ok_or_else(|| {
            Diagnostic::internal(
                Span::point(0),
                format!("group member {} has no property record", id.0),
            )
        })
    }

    fn infer_group(&mut self, group: &Group) -> Result<(), Diagnostic> {
        for &id in &group.members {
            if self.info(id)?.value.is_record() {
                self.record_shape_pass(id)?;
            }
        }
        for &id in &group.members {
            if self.info(id)?.value.is_record() {
                self.record_elaborate_pass(id)?;
            }
        }
        for &id in &group.members {
            if !self.info(id)?.value.is_record() {
                self.single_pass(id)?;
            }
        }
        Ok(())
    }

    /// First pass: build a row type with one fresh variable per field,
    /// preserving declaration order, and bind it to the property's name.
    fn record_shape_pass(&mut self, id: PropId) -> Result<(), Diagnostic> {
        let info = self.info(id)?.clone();
        let children = info
            .value
            .as_properties()
            .ok_or_else(|| Diagnostic::internal(info.name_span, "shape pass on a non-record"))?;

        let mut rows = Vec::with_capacity(children.len());
        for child in children {
            let var = self.ctx.fresh_var();
            rows.push((child.name.clone(), var));
            self.prop_types.insert(child.id, var);
        }

        let record = self.ctx.intern(TypeShape::Record(rows));
        self.envs.bind(info.env, info.name, record);
        self.prop_types.insert(id, record);
        Ok(())
    }

    /// Second pass: typecheck every field under the record's own scope and
    /// unify it with the placeholder from the first pass.
    fn record_elaborate_pass(&mut self, id: PropId) -> Result<(), Diagnostic> {
        let info = self.info(id)?.clone();
        let children = info
            .value
            .as_properties()
            .ok_or_else(|| Diagnostic::internal(info.name_span, "elaborate pass on a non-record"))?;
        let fields_env = info.fields_env.ok_or_else(|| {
            Diagnostic::internal(info.name_span, "record property without a fields scope")
        })?;

        for child in children {
            let inferred = if child.value.is_record() {
                // The nested record's shape pass already published its
                // placeholder in this scope.
                self.envs.lookup(fields_env, &child.name).ok_or_else(|| {
                    Diagnostic::internal(
                        child.name_span,
                        format!("nested record `{}` has no placeholder type", child.name),
                    )
                })?
            } else {
                self.typecheck(fields_env, &child.value)?
            };

            let placeholder = self.prop_types[&child.id];
            self.ctx.unify(placeholder, inferred, child.value.span)?;
            self.envs.bind(fields_env, &child.name, placeholder);
        }

        Ok(())
    }

    /// Non-record properties: typecheck the value and publish the result
    /// under the property's name.
    fn single_pass(&mut self, id: PropId) -> Result<(), Diagnostic> {
        let info = self.info(id)?.clone();
        let ty = self.typecheck(info.env, info.value)?;
        self.envs.bind(info.env, info.name, ty);
        self.prop_types.insert(id, ty);
        Ok(())
    }

    fn typecheck(&mut self, env: EnvId, element: &Element) -> Result<TypeId, Diagnostic> {
        match &element.kind {
            ElementKind::Int(_) => Ok(self.ctx.int()),
            ElementKind::Str(_) => Ok(self.ctx.str()),
            ElementKind::Id(name) => self.envs.lookup(env, name).ok_or_else(|| {
                Diagnostic::semantic(
                    element.span,
                    format!("cannot infer the type of `{name}` here"),
                )
            }),
            ElementKind::Access(names) => self.typecheck_access(env, names, element),
            ElementKind::Properties(_) => Err(Diagnostic::internal(
                element.span,
                "record value reached the scalar typechecker",
            )),
        }
    }

    /// Walk `head.field...`: each step resolves a variable through the
    /// substitution before looking up the field, and the final type is
    /// returned unresolved so callers can keep unifying it.
    fn typecheck_access(
        &mut self,
        env: EnvId,
        names: &[String],
        element: &Element,
    ) -> Result<TypeId, Diagnostic> {
        let head = &names[0];
        let mut ty = self.envs.lookup(env, head).ok_or_else(|| {
            Diagnostic::semantic(
                element.span,
                format!("cannot infer the type of `{head}` here"),
            )
        })?;

        for name in &names[1..] {
            let resolved = self.ctx.resolve(ty);
            let shape = self.ctx.shape(resolved).clone();
            let rows = match shape {
                TypeShape::Record(rows) => rows,
                TypeShape::Var(var) => {
                    return Err(Diagnostic::semantic(
                        element.span,
                        format!("the shape of `{head}` is not known yet ({var} is unresolved)"),
                    ));
                }
                _ => {
                    return Err(Diagnostic::semantic(
                        element.span,
                        format!(
                            "`{}` has no properties to access (it is {})",
                            names[..names.len() - 1].join("."),
                            self.ctx.display(resolved)
                        ),
                    ));
                }
            };

            ty = rows
                .iter()
                .find(|(row_name, _)| row_name == name)
                .map(|(_, row_ty)| *row_ty)
                .ok_or_else(|| {
                    Diagnostic::semantic(
                        element.span,
                        format!(
                            "record {} has no property `{name}`",
                            self.ctx.display(resolved)
                        ),
                    )
                })?;
        }

        Ok(ty)
    }
}
