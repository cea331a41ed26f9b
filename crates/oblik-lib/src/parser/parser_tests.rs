use indoc::indoc;

use crate::diagnostics::Stage;

use super::*;

fn parse_ok(source: &str) -> Ast {
    parse(source).expect("source parses")
}

fn collect_ids(properties: &[Property], out: &mut Vec<u64>) {
    for prop in properties {
        out.push(prop.id.0);
        if let Some(children) = prop.value.as_properties() {
            collect_ids(children, out);
        }
    }
}

#[test]
fn scalar_property() {
    let ast = parse_ok("x = 1;");
    let props = ast.root_properties();
    assert_eq!(props.len(), 1);
    assert_eq!(props[0].name, "x");
    assert_eq!(props[0].value.kind, ElementKind::Int(1));
}

#[test]
fn string_property() {
    let ast = parse_ok(r#"s = "hello";"#);
    assert_eq!(
        ast.root_properties()[0].value.kind,
        ElementKind::Str("hello".into())
    );
}

#[test]
fn bare_reference_is_an_id() {
    let ast = parse_ok(indoc! {"
        a = 1;
        b = a;
    "});
    assert_eq!(ast.root_properties()[1].value.kind, ElementKind::Id("a".into()));
}

#[test]
fn dotted_reference_is_an_access_chain() {
    let ast = parse_ok(indoc! {"
        p = { q = { r = 1; }; };
        x = p.q.r;
    "});
    assert_eq!(
        ast.root_properties()[1].value.kind,
        ElementKind::Access(vec!["p".into(), "q".into(), "r".into()])
    );
}

#[test]
fn nested_record() {
    let ast = parse_ok(indoc! {r#"
        p = {
            a = 1;
            b = "s";
        };
    "#});
    let props = ast.root_properties();
    let inner = props[0].value.as_properties().expect("record value");
    assert_eq!(inner.len(), 2);
    assert_eq!(inner[0].name, "a");
    assert_eq!(inner[1].name, "b");
}

#[test]
fn empty_record() {
    let ast = parse_ok("p = { };");
    assert_eq!(
        ast.root_properties()[0].value.as_properties(),
        Some(&[][..])
    );
}

#[test]
fn property_ids_are_unique_and_monotonic() {
    let ast = parse_ok(indoc! {"
        a = { x = 1; y = { z = 2; }; };
        b = 3;
    "});

    let mut ids = Vec::new();
    collect_ids(ast.root_properties(), &mut ids);

    assert_eq!(ids.len() as u64, ast.property_count);
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), ids.len(), "ids must be unique");
    // Pre-order assignment: a parent precedes its children.
    assert_eq!(ids[0], 0);
}

#[test]
fn missing_assign_reports_expected_token() {
    let err = parse("x 1;").expect_err("must fail");
    assert_eq!(err.stage, Stage::Parse);
    // `x 1` also looks like the start of a free-parameter list, which is
    // rejected first.
    assert!(err.message.contains("not supported") || err.message.contains("'='"));
}

#[test]
fn missing_semicolon_reports_expected_token() {
    let err = parse("x = 1").expect_err("must fail");
    assert_eq!(err.stage, Stage::Parse);
    assert!(err.message.contains("';'"));
}

#[test]
fn missing_value_lists_alternatives() {
    let err = parse("x = ;").expect_err("must fail");
    assert_eq!(err.stage, Stage::Parse);
    assert!(err.message.contains("a name"));
    assert!(err.message.contains("'{'"));
    assert!(err.message.contains("an integer"));
    assert!(err.message.contains("a string"));
}

#[test]
fn free_parameters_are_rejected() {
    let err = parse("f = a b > { };").expect_err("must fail");
    assert_eq!(err.stage, Stage::Parse);
    assert!(err.message.contains("free parameters are not supported"));
}

#[test]
fn single_free_parameter_is_rejected() {
    let err = parse("f = a > 1;").expect_err("must fail");
    assert!(err.message.contains("free parameters are not supported"));
}

#[test]
fn application_is_rejected() {
    let err = parse("x = f(1);").expect_err("must fail");
    assert_eq!(err.stage, Stage::Parse);
    assert!(err.message.contains("object application is not supported"));
}

#[test]
fn unterminated_record_reports_expected_set() {
    let err = parse("p = { a = 1;").expect_err("must fail");
    assert_eq!(err.stage, Stage::Parse);
    assert!(err.message.contains("'}'"));
    assert!(err.message.contains("end of file"), "found clause: {}", err.message);
}

#[test]
fn stray_token_at_top_level() {
    let err = parse("x = 1; ;").expect_err("must fail");
    assert_eq!(err.stage, Stage::Parse);
    assert!(err.message.contains("a property name"));
}

#[test]
fn empty_source_parses_to_empty_root() {
    let ast = parse_ok("");
    assert!(ast.root_properties().is_empty());
    assert_eq!(ast.property_count, 0);
}
