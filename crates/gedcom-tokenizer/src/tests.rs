use expect_test::{Expect, expect};

use crate::{
    ClassError, Divider, LineClass, LineShape, TagPlacement, check_format, classify_line,
    normalize, normalize_text, tokenize,
};

#[track_caller]
fn check(line: &str, expect: Expect) {
    let line = normalize(line);
    let descriptor = check_format(&line)
        .map_err(|err| err.to_string())
        .and_then(|()| tokenize(&line).map_err(|err| err.to_string()));

    let actual = match descriptor {
        Ok(descriptor) => descriptor.to_string(),
        Err(message) => format!("error: {message}"),
    };
    expect.assert_eq(&actual);
}

#[test]
fn normalizes_or_groups_and_whitespace() {
    assert_eq!(normalize("  n   [ ANUL |CENS ]   {1:1}  "), "n [ANUL|CENS] {1:1}");
    assert_eq!(normalize("+1 SOUR <ID> {1:1} /* the source */"), "+1 SOUR <ID> {1:1}");
    assert_eq!(normalize("/* only a comment */"), "");
    assert_eq!(normalize_text("  Lineage  linked /*x*/ grammar "), "Lineage linked grammar");
}

#[test]
fn tag_lines() {
    check("n HEAD {1:1}", expect!["n HEAD {1:1}"]);
    check(
        "  +1   SOUR <APPROVED_SYSTEM_ID>   {1:1} /* source */",
        expect!["+1 SOUR <APPROVED_SYSTEM_ID> {1:1}"],
    );
    check("+1 [ CONT | CONC ] <SUBMITTER_TEXT> {0:M}", expect!["+1 [CONT|CONC] <SUBMITTER_TEXT> {0:M}"]);
    check("+12 _UID <UID> {0:M}*", expect!["+12 _UID <UID> {0:M}"]);
}

#[test]
fn xref_placement() {
    check("n @<XREF:INDI>@ INDI {1:1}", expect!["n @<XREF:INDI>@ INDI {1:1}"]);
    check("n NOTE [@<XREF:NOTE>@|<NULL>] {1:1}", expect!["n NOTE [@<XREF:NOTE>@|<NULL>] {1:1}"]);

    let descriptor = tokenize("n @<XREF:INDI>@ INDI {1:1}").unwrap();
    assert_eq!(
        descriptor.shape,
        LineShape::Tag { names: vec!["INDI".to_owned()], placement: TagPlacement::AfterXref }
    );
    assert_eq!(descriptor.xref_names, ["XREF:INDI"]);
}

#[test]
fn value_possibilities() {
    check("n [ ANUL | CENS | DIV ] [Y|<NULL>] {1:1}", expect!["n [ANUL|CENS|DIV] [Y|<NULL>] {1:1}"]);
    check("+1 SEX [M|F|U] {0:1}", expect!["+1 SEX [M|F|U] {0:1}"]);

    let descriptor = tokenize("n [ENGA|MARR] [Y|<NULL>] {1:1}").unwrap();
    assert_eq!(descriptor.value_possibilities, ["Y", ""]);
    assert!(descriptor.value_names.is_empty());
}

#[test]
fn structure_lines() {
    check("+1 <<PERSONAL_NAME_STRUCTURE>> {0:M}", expect!["+1 <<PERSONAL_NAME_STRUCTURE>> {0:M}"]);
    check(
        "n HEAD <<ADDRESS_STRUCTURE>> {0:1}",
        expect!["error: line declares both a tag and the structure reference `<<ADDRESS_STRUCTURE>>`"],
    );
    check(
        "n <<ADDRESS_STRUCTURE>> <ADDR> {0:1}",
        expect!["error: structure reference `<<ADDRESS_STRUCTURE>>` cannot declare xref or value fields"],
    );
}

#[test]
fn format_errors() {
    check("n HEAD{1:1}", expect!["error: missing space before `HEAD{1:1}`"]);
    check("n <NAME>HEAD {1:1}", expect!["error: missing space after `<NAME>HEAD`"]);
    check("1 HEAD {1:1}", expect!["error: line must start with `n` or `+<1-99>` followed by a space"]);
    check("+100 HEAD {1:1}", expect!["error: line must start with `n` or `+<1-99>` followed by a space"]);
    check("+1 SOUR <NAME>", expect!["error: line has no well-formed `{min:max}` quantifier"]);
}

#[test]
fn token_errors() {
    check("n HEAD {1:1} foo", expect!["error: unrecognized token `foo`"]);
    check(
        "n HEAD {0:0}",
        expect!["error: invalid cardinality `{0:0}`, the maximum must be `M` or at least the minimum and 1"],
    );
    check("n <VALUE> {0:1}", expect!["error: line declares neither a tag nor a structure reference"]);
    check(
        "n HEAD {1:1} [Y|<NULL>]",
        expect!["error: value possibilities `[Y|<NULL>]` must directly follow the tag"],
    );
    check("n HEAD {1:1} {0:1}", expect!["error: duplicate cardinality `{0:1}`"]);
}

#[test]
fn line_classes() {
    assert_eq!(classify_line("HEADER:="), Ok(LineClass::StructureName("HEADER")));
    assert_eq!(classify_line("|"), Ok(LineClass::Divider(Divider::Or)));
    assert_eq!(classify_line("n HEAD {1:1}"), Ok(LineClass::Content));
    assert_eq!(
        classify_line("Header:="),
        Err(ClassError::StructureName { line: "Header:=".to_owned() })
    );
    assert_eq!(classify_line("[ n"), Err(ClassError::Divider { line: "[ n".to_owned() }));
}
