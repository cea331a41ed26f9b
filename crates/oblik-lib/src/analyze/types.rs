//! Types, the substitution context, and unification.
//!
//! Types are interned in a [`TypeContext`] arena: cheap `TypeId` handles,
//! structural dedup, no pointer graphs. Unification never mutates a type;
//! variables are committed through the substitution map, which the occurs
//! check and the trivial-self-bind rule keep acyclic, so resolution always
//! terminates.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::diagnostics::Diagnostic;
use crate::span::Span;

/// Interned type handle: index into the [`TypeContext`] arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TypeId(pub u32);

/// The shape of a type.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TypeShape {
    /// Fresh unification variable, identified by name only.
    Var(String),
    /// Nominal ground type (`Int`, `Str`).
    Base(String),
    /// Function type.
    Arrow { left: TypeId, right: TypeId },
    /// Row-typed record. Rows keep declaration order for deterministic
    /// traversal and IR layout; unification matches them by name.
    Record(Vec<(String, TypeId)>),
}

/// Inference state: the type arena, the fresh-variable counter, and the
/// substitution map from a variable's name to its committed binding.
/// A variable is unbound iff absent from the substitution.
#[derive(Clone, Debug, Default)]
pub struct TypeContext {
    types: Vec<TypeShape>,
    interned: HashMap<TypeShape, TypeId>,
    last_id: u64,
    substitution: IndexMap<String, TypeId>,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a shape, returning its id. Structurally identical shapes share
    /// an id.
    pub fn intern(&mut self, shape: TypeShape) -> TypeId {
        if let Some(&id) = self.interned.get(&shape) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(shape.clone());
        self.interned.insert(shape, id);
        id
    }

    pub fn shape(&self, id: TypeId) -> &TypeShape {
        &self.types[id.0 as usize]
    }

    pub fn base(&mut self, name: &str) -> TypeId {
        self.intern(TypeShape::Base(name.to_owned()))
    }

    pub fn int(&mut self) -> TypeId {
        self.base("Int")
    }

    pub fn str(&mut self) -> TypeId {
        self.base("Str")
    }

    /// Mint a fresh, unbound variable: `'a`, `'b`, ... `'aa`, ...
    pub fn fresh_var(&mut self) -> TypeId {
        let name = var_name(self.last_id);
        self.last_id += 1;
        self.intern(TypeShape::Var(name))
    }

    /// Current binding of a variable, if committed.
    pub fn binding(&self, name: &str) -> Option<TypeId> {
        self.substitution.get(name).copied()
    }

    /// Follow the substitution until a non-variable shape or a live
    /// (unbound) variable is reached.
    pub fn resolve(&self, mut ty: TypeId) -> TypeId {
        loop {
            match self.shape(ty) {
                TypeShape::Var(name) => match self.binding(name) {
                    Some(next) => ty = next,
                    None => return ty,
                },
                _ => return ty,
            }
        }
    }

    /// Name of the live variable `ty` is, after resolution stopped on it.
    fn live_var(&self, ty: TypeId) -> Option<String> {
        match self.shape(ty) {
            TypeShape::Var(name) if self.binding(name).is_none() => Some(name.clone()),
            _ => None,
        }
    }

    /// Commit `name := ty`. Binding a variable to itself is a no-op; a
    /// binding that would make the substitution cyclic is rejected.
    fn bind(&mut self, name: &str, ty: TypeId, span: Span) -> Result<(), Diagnostic> {
        if let TypeShape::Var(other) = self.shape(ty)
            && other == name
        {
            return Ok(());
        }
        if self.occurs(name, ty) {
            return Err(Diagnostic::semantic(
                span,
                format!(
                    "cannot construct the infinite type {name} ~ {}",
                    self.display(ty)
                ),
            ));
        }
        self.substitution.insert(name.to_owned(), ty);
        Ok(())
    }

    /// Whether `name` occurs in `ty` under the current substitution.
    fn occurs(&self, name: &str, ty: TypeId) -> bool {
        let ty = self.resolve(ty);
        match self.shape(ty) {
            TypeShape::Var(other) => other == name,
            TypeShape::Base(_) => false,
            TypeShape::Arrow { left, right } => {
                self.occurs(name, *left) || self.occurs(name, *right)
            }
            TypeShape::Record(rows) => rows.iter().any(|(_, row_ty)| self.occurs(name, *row_ty)),
        }
    }

    /// Make two types equal, committing variable bindings as needed.
    ///
    /// Records unify field-by-field, matched by name in the left side's
    /// declaration order; a field missing from either side is a mismatch.
    pub fn unify(&mut self, left: TypeId, right: TypeId, span: Span) -> Result<(), Diagnostic> {
        let left = self.resolve(left);
        let right = self.resolve(right);

        if let Some(name) = self.live_var(left) {
            return self.bind(&name, right, span);
        }
        if let Some(name) = self.live_var(right) {
            return self.bind(&name, left, span);
        }

        match (self.shape(left).clone(), self.shape(right).clone()) {
            (
                TypeShape::Arrow {
                    left: ll,
                    right: lr,
                },
                TypeShape::Arrow {
                    left: rl,
                    right: rr,
                },
            ) => {
                self.unify(ll, rl, span)?;
                self.unify(lr, rr, span)
            }
            (TypeShape::Base(l), TypeShape::Base(r)) if l == r => Ok(()),
            (TypeShape::Record(left_rows), TypeShape::Record(right_rows)) => {
                for (name, left_ty) in &left_rows {
                    let Some((_, right_ty)) =
                        right_rows.iter().find(|(right_name, _)| right_name == name)
                    else {
                        return Err(Diagnostic::semantic(
                            span,
                            format!("record is missing property `{name}`"),
                        ));
                    };
                    self.unify(*left_ty, *right_ty, span)?;
                }
                for (name, _) in &right_rows {
                    if !left_rows.iter().any(|(left_name, _)| left_name == name) {
                        return Err(Diagnostic::semantic(
                            span,
                            format!("record has unexpected property `{name}`"),
                        ));
                    }
                }
                Ok(())
            }
            _ => Err(Diagnostic::semantic(
                span,
                format!(
                    "type mismatch: expected {}, found {}",
                    self.display(left),
                    self.display(right)
                ),
            )),
        }
    }

    /// Human-readable rendering with variables resolved where possible.
    pub fn display(&self, ty: TypeId) -> String {
        let ty = self.resolve(ty);
        match self.shape(ty) {
            TypeShape::Var(name) => name.clone(),
            TypeShape::Base(name) => name.clone(),
            TypeShape::Arrow { left, right } => {
                format!("({} -> {})", self.display(*left), self.display(*right))
            }
            TypeShape::Record(rows) => {
                let rows: Vec<String> = rows
                    .iter()
                    .map(|(name, row_ty)| format!("{name}: {}", self.display(*row_ty)))
                    .collect();
                format!("{{ {} }}", rows.join(", "))
            }
        }
    }
}

/// Base-26 variable names: `'a` through `'z`, then `'aa`, `'ab`, ...
fn var_name(mut id: u64) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(b'a' + (id % 26) as u8);
        id /= 26;
        if id == 0 {
            break;
        }
        id -= 1;
    }
    digits.push(b'\'');
    digits.reverse();
    String::from_utf8(digits).expect("ascii variable name")
}

/// Handle into the lexical type-environment arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnvId(u32);

/// Root scope of every environment arena.
pub const ROOT_ENV: EnvId = EnvId(0);

#[derive(Clone, Debug)]
struct ScopeData {
    parent: Option<EnvId>,
    names: IndexMap<String, TypeId>,
}

/// Arena of lexical type scopes: `name -> type` maps with parent links.
/// Lookup walks toward the root on a miss.
#[derive(Clone, Debug)]
pub struct TypeEnvs {
    scopes: Vec<ScopeData>,
}

impl Default for TypeEnvs {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeEnvs {
    /// A fresh arena holding just the root scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![ScopeData {
                parent: None,
                names: IndexMap::new(),
            }],
        }
    }

    pub fn child(&mut self, parent: EnvId) -> EnvId {
        let id = EnvId(self.scopes.len() as u32);
        self.scopes.push(ScopeData {
            parent: Some(parent),
            names: IndexMap::new(),
        });
        id
    }

    /// Bind or rebind a name in one scope.
    pub fn bind(&mut self, env: EnvId, name: &str, ty: TypeId) {
        self.scopes[env.0 as usize]
            .names
            .insert(name.to_owned(), ty);
    }

    pub fn lookup(&self, env: EnvId, name: &str) -> Option<TypeId> {
        let mut current = Some(env);
        while let Some(env) = current {
            let scope = &self.scopes[env.0 as usize];
            if let Some(&ty) = scope.names.get(name) {
                return Some(ty);
            }
            current = scope.parent;
        }
        None
    }
}
