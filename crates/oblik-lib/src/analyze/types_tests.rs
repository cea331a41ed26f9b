use crate::span::Span;

use super::types::{ROOT_ENV, TypeContext, TypeEnvs, TypeShape};

fn span() -> Span {
    Span::new(0, 1)
}

#[test]
fn interning_deduplicates_shapes() {
    let mut ctx = TypeContext::new();
    let a = ctx.int();
    let b = ctx.int();
    assert_eq!(a, b);
    assert_ne!(a, ctx.str());
}

#[test]
fn fresh_vars_are_distinct() {
    let mut ctx = TypeContext::new();
    let a = ctx.fresh_var();
    let b = ctx.fresh_var();
    assert_ne!(a, b);
    assert_eq!(ctx.display(a), "'a");
    assert_eq!(ctx.display(b), "'b");
}

#[test]
fn var_names_roll_over_past_z() {
    let mut ctx = TypeContext::new();
    let mut last = None;
    for _ in 0..27 {
        last = Some(ctx.fresh_var());
    }
    let last = last.expect("27 vars minted");
    assert_eq!(ctx.display(last), "'aa");
}

#[test]
fn unify_identical_bases_is_a_noop() {
    let mut ctx = TypeContext::new();
    let int = ctx.int();
    ctx.unify(int, int, span()).expect("Int ~ Int");
}

#[test]
fn unify_var_with_itself_commits_nothing() {
    let mut ctx = TypeContext::new();
    let var = ctx.fresh_var();
    ctx.unify(var, var, span()).expect("'a ~ 'a");
    assert!(ctx.binding("'a").is_none());
}

#[test]
fn unify_binds_the_left_live_var() {
    let mut ctx = TypeContext::new();
    let var = ctx.fresh_var();
    let int = ctx.int();
    ctx.unify(var, int, span()).expect("'a ~ Int");
    assert_eq!(ctx.resolve(var), int);
}

#[test]
fn unify_binds_the_right_live_var() {
    let mut ctx = TypeContext::new();
    let var = ctx.fresh_var();
    let str_ty = ctx.str();
    ctx.unify(str_ty, var, span()).expect("Str ~ 'a");
    assert_eq!(ctx.resolve(var), str_ty);
}

#[test]
fn committed_binding_cannot_be_rebound_incompatibly() {
    let mut ctx = TypeContext::new();
    let var = ctx.fresh_var();
    let int = ctx.int();
    let str_ty = ctx.str();

    ctx.unify(var, int, span()).expect("first commit");
    let err = ctx.unify(var, str_ty, span()).expect_err("Int ~ Str");
    assert!(err.message.contains("type mismatch"));
    assert!(err.message.contains("Int"));
    assert!(err.message.contains("Str"));
}

#[test]
fn unifying_two_vars_then_a_base_resolves_both() {
    let mut ctx = TypeContext::new();
    let a = ctx.fresh_var();
    let b = ctx.fresh_var();
    let int = ctx.int();

    ctx.unify(a, b, span()).expect("'a ~ 'b");
    ctx.unify(a, int, span()).expect("'a ~ Int");

    assert_eq!(ctx.resolve(a), int);
    assert_eq!(ctx.resolve(b), int);
}

#[test]
fn arrow_unification_recurses() {
    let mut ctx = TypeContext::new();
    let int = ctx.int();
    let var = ctx.fresh_var();
    let concrete = ctx.intern(TypeShape::Arrow {
        left: int,
        right: int,
    });
    let open = ctx.intern(TypeShape::Arrow {
        left: var,
        right: int,
    });

    ctx.unify(open, concrete, span()).expect("arrows unify");
    assert_eq!(ctx.resolve(var), int);
}

#[test]
fn records_unify_by_name_regardless_of_row_order() {
    let mut ctx = TypeContext::new();
    let int = ctx.int();
    let str_ty = ctx.str();
    let left = ctx.intern(TypeShape::Record(vec![
        ("a".into(), int),
        ("b".into(), str_ty),
    ]));
    let right = ctx.intern(TypeShape::Record(vec![
        ("b".into(), str_ty),
        ("a".into(), int),
    ]));

    ctx.unify(left, right, span()).expect("same fields");
}

#[test]
fn record_missing_field_fails() {
    let mut ctx = TypeContext::new();
    let int = ctx.int();
    let left = ctx.intern(TypeShape::Record(vec![
        ("a".into(), int),
        ("b".into(), int),
    ]));
    let right = ctx.intern(TypeShape::Record(vec![("a".into(), int)]));

    let err = ctx.unify(left, right, span()).expect_err("missing b");
    assert!(err.message.contains("missing property `b`"));
}

#[test]
fn record_extra_field_fails() {
    let mut ctx = TypeContext::new();
    let int = ctx.int();
    let left = ctx.intern(TypeShape::Record(vec![("a".into(), int)]));
    let right = ctx.intern(TypeShape::Record(vec![
        ("a".into(), int),
        ("z".into(), int),
    ]));

    let err = ctx.unify(left, right, span()).expect_err("extra z");
    assert!(err.message.contains("unexpected property `z`"));
}

#[test]
fn shape_mismatch_fails() {
    let mut ctx = TypeContext::new();
    let int = ctx.int();
    let record = ctx.intern(TypeShape::Record(vec![("a".into(), int)]));

    let err = ctx.unify(int, record, span()).expect_err("Int ~ record");
    assert!(err.message.contains("type mismatch"));
}

#[test]
fn occurs_check_rejects_infinite_types() {
    let mut ctx = TypeContext::new();
    let var = ctx.fresh_var();
    let recursive = ctx.intern(TypeShape::Record(vec![("self_".into(), var)]));

    let err = ctx.unify(var, recursive, span()).expect_err("occurs");
    assert!(err.message.contains("infinite type"));
    // The failed bind must not have been committed.
    assert!(ctx.binding("'a").is_none());
}

#[test]
fn resolution_terminates_through_chains() {
    let mut ctx = TypeContext::new();
    let a = ctx.fresh_var();
    let b = ctx.fresh_var();
    let c = ctx.fresh_var();
    let int = ctx.int();

    ctx.unify(a, b, span()).expect("'a ~ 'b");
    ctx.unify(b, c, span()).expect("'b ~ 'c");
    ctx.unify(c, int, span()).expect("'c ~ Int");

    assert_eq!(ctx.resolve(a), int);
    assert_eq!(ctx.display(a), "Int");
}

#[test]
fn env_lookup_walks_parent_scopes() {
    let mut ctx = TypeContext::new();
    let int = ctx.int();
    let mut envs = TypeEnvs::new();
    let child = envs.child(ROOT_ENV);
    let grandchild = envs.child(child);

    envs.bind(ROOT_ENV, "x", int);
    assert_eq!(envs.lookup(grandchild, "x"), Some(int));
    assert_eq!(envs.lookup(grandchild, "missing"), None);
}

#[test]
fn inner_binding_shadows_outer() {
    let mut ctx = TypeContext::new();
    let int = ctx.int();
    let str_ty = ctx.str();
    let mut envs = TypeEnvs::new();
    let child = envs.child(ROOT_ENV);

    envs.bind(ROOT_ENV, "x", int);
    envs.bind(child, "x", str_ty);

    assert_eq!(envs.lookup(child, "x"), Some(str_ty));
    assert_eq!(envs.lookup(ROOT_ENV, "x"), Some(int));
}
