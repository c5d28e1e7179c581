//! Canonical formatting, and the parse/format round-trip law
use jsonpath_query::spec::query::Query;
use jsonpath_query::spec::segment::QuerySegment;
use jsonpath_query::spec::selector::Selector;
#[cfg(feature = "trace")]
use test_log::test;

fn canonical(input: &str) -> String {
    Query::parse(input).expect("parses").to_string()
}

/// parse ∘ format ∘ parse = parse
fn assert_round_trip(input: &str) {
    let parsed = Query::parse(input).expect("parses");
    let formatted = parsed.to_string();
    let reparsed = Query::parse(&formatted)
        .unwrap_or_else(|err| panic!("canonical form {formatted:?} must reparse: {err}"));
    assert_eq!(parsed, reparsed, "ASTs differ for {input:?}");
    assert_eq!(formatted, reparsed.to_string(), "format is not idempotent");
}

#[test]
fn round_trips() {
    for input in [
        "$",
        "$.a",
        "$.a.b.c",
        "$['two words']",
        "$[*]",
        "$.*",
        "$..*",
        "$..a",
        "$..['a', 'b']",
        "$[0]",
        "$[-1]",
        "$[0, 1, -2]",
        "$[1:2]",
        "$[1:2:3]",
        "$[::-1]",
        "$[:]",
        "$[::]",
        "$['a', 0, 1:2, *, ?@.b]",
        "$[?@.a]",
        "$[?!@.a]",
        "$[?@.a == 1]",
        "$[?@.a != 'x']",
        "$[?@.a < 1.5 && @.b > 2]",
        "$[?@.a || @.b && @.c]",
        "$[?(@.a || @.b) && @.c]",
        "$[?!(@.a || @.b)]",
        "$[?@.a == $.b.c]",
        "$[?count(@.*) == 2]",
        "$[?match(@.date, '19..-..-..')]",
        "$[?length(@.a) >= 2 || value(@..b) == null]",
        "$[?@ == -0.4e-2]",
        "$[?@.a == true && @.b == false || @.c == null]",
    ] {
        assert_round_trip(input);
    }
}

#[test]
fn canonical_spacing_and_quotes() {
    assert_eq!(canonical("$[ 'a' , 1 ]"), "$['a', 1]");
    assert_eq!(canonical("$[\"name\"]"), "$.name");
    assert_eq!(canonical("$[\"two words\"]"), "$['two words']");
    assert_eq!(canonical("$[?(@.a==1&&@.b==2)]"), "$[?@.a == 1 && @.b == 2]");
    assert_eq!(canonical("$[? @.a ]"), "$[?@.a]");
}

#[test]
fn shorthand_segments_print_short() {
    assert_eq!(canonical("$['name']"), "$.name");
    assert_eq!(canonical("$..['name']"), "$..name");
    assert_eq!(canonical("$[*]"), "$.*");
    assert_eq!(canonical("$..[*]"), "$..*");
    // multiple selectors stay bracketed
    assert_eq!(canonical("$['a','b']"), "$['a', 'b']");
}

#[test]
fn string_escapes() {
    assert_eq!(canonical(r#"$["'"]["@"]"#), r"$['\'']['@']");
    assert_eq!(canonical("$[\"\\u0041\"]"), "$.A");
    assert_eq!(canonical("$['\\n']"), r"$['\n']");
    assert_eq!(canonical("$['\\u0007']"), r"$['\u0007']");
    assert_eq!(canonical(r#"$["\\"]"#), r"$['\\']");
}

#[test]
fn slices_omit_absent_parts() {
    assert_eq!(canonical("$[1:2:1]"), "$[1:2:1]");
    assert_eq!(canonical("$[1:2]"), "$[1:2]");
    assert_eq!(canonical("$[::]"), "$[:]");
    assert_eq!(canonical("$[::2]"), "$[::2]");
    assert_eq!(canonical("$[ 1 : 2 : 3 ]"), "$[1:2:3]");
}

#[test]
fn minimum_parentheses() {
    // precedence makes these parens redundant
    assert_eq!(canonical("$[?(@.a && @.b) || @.c]"), "$[?@.a && @.b || @.c]");
    assert_eq!(canonical("$[?((@.a))]"), "$[?@.a]");
    // these are load-bearing and survive
    assert_eq!(canonical("$[?(@.a || @.b) && @.c]"), "$[?(@.a || @.b) && @.c]");
    assert_eq!(canonical("$[?!(@.a && @.b)]"), "$[?!(@.a && @.b)]");
}

#[test]
fn comparison_operands_and_functions() {
    assert_eq!(
        canonical("$[?length(@.authors)>=5]"),
        "$[?length(@.authors) >= 5]",
    );
    assert_eq!(
        canonical("$[?match(@.a,'x')&&@.b<3]"),
        "$[?match(@.a, 'x') && @.b < 3]",
    );
    assert_eq!(canonical("$[?@.a == $['two words'].b]"), "$[?@.a == $['two words'].b]");
}

#[test]
fn subform_display() {
    let segment = QuerySegment::parse("['a', 'b']").expect("parses");
    assert_eq!(segment.to_string(), "['a', 'b']");
    let selector = Selector::parse("1:2:3").expect("parses");
    assert_eq!(selector.to_string(), "1:2:3");
    let selector = Selector::parse("?@.a == 1").expect("parses");
    assert_eq!(selector.to_string(), "?@.a == 1");
}
