use std::fs;
use std::path::{Path, PathBuf};

use expect_test::{expect, expect_file};

use camino::Utf8PathBuf;

use crate::{LengthValidator, LoadError, ParseErrorKind, SchemaAccessError, Store, Validator};

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct TestCase {
    input: PathBuf,
    expected: PathBuf,
    text: String,
}

impl TestCase {
    fn list() -> Vec<Self> {
        let test_data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data");

        let mut cases = fs::read_dir(&test_data_dir)
            .unwrap_or_else(|err| {
                panic!("Cannot read directory {}: {err}", test_data_dir.display())
            })
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()? == "gedg" {
                    let expected = path.with_extension("txt");
                    let text = fs::read_to_string(&path).ok()?;
                    Some(Self { input: path, expected, text })
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        cases.sort();
        cases
    }
}

fn render(store: &Store) -> String {
    let structures = store
        .structure_names()
        .filter_map(|name| store.dump(name))
        .map(|dump| dump.to_string())
        .collect::<Vec<_>>();

    format!(
        "VERSION={}\nSOURCE={}\nDESCRIPTION={}\n\n{}",
        store.version(),
        store.source(),
        store.description(),
        structures.join("\n")
    )
}

#[test]
fn parse() {
    for case in TestCase::list() {
        let actual = match Store::parse(&case.text) {
            Ok(store) => render(&store),
            Err(err) => format!("error: {err}\n"),
        };
        expect_file![&case.expected].assert_eq(&actual);
    }
}

fn lineage() -> Store {
    Store::parse(include_str!("../test_data/lineage.gedg")).unwrap()
}

#[test]
fn header_and_structure_index() {
    let store = lineage();

    assert_eq!(store.version(), "5.5.1");
    assert_eq!(store.header().description().len(), 2);
    assert_eq!(store.structure_names().count(), 8);
    assert_eq!(store.structures().count(), 12);
    assert_eq!(store.variation_count("FAMILY_EVENT_STRUCTURE"), 3);
    assert_eq!(store.variation_count("MISSING"), 0);
    assert!(store.has_structure("EVENT_DETAIL"));
    assert!(store.has_line_id("ADDRESS_STRUCTURE", "PHON"));
    assert!(!store.has_line_id("ADDRESS_STRUCTURE", "CITY"));

    let tags = store.variation_tags("FAMILY_EVENT_STRUCTURE").collect::<Vec<_>>();
    assert_eq!(tags, ["ANUL", "CENS", "DIV", "DIVF", "ENGA", "MARR", "MARB", "MARC", "EVEN"]);
}

#[test]
fn blocks_and_lines() {
    let store = lineage();
    let header = store.get_structure("HEADER", None, None).unwrap();
    let root = store.block(store.structure(header).block());

    let head = store.line(root.line("HEAD").unwrap());
    assert_eq!((head.min(), head.max(), head.position()), (1, 1, 0));
    assert_eq!(head.source_line(), 8);

    let children = store.block(head.child_block().unwrap());
    assert_eq!(children.parent(), root.line("HEAD"));
    assert_eq!(children.level(), 1);
    assert_eq!(children.line_ids().collect::<Vec<_>>(), [
        "SOUR",
        "DEST",
        "DATE",
        "SUBM",
        "GEDC",
        "CHAR",
        "NOTE_STRUCTURE"
    ]);

    let mandatory = children
        .mandatory_lines()
        .iter()
        .map(|&line| store.line(line).id())
        .collect::<Vec<_>>();
    assert_eq!(mandatory, ["SOUR", "SUBM", "GEDC", "CHAR"]);

    let subm = store.line(children.line("SUBM").unwrap());
    assert!(subm.has_xref());
    assert!(!subm.has_value());
    assert_eq!(subm.to_string(), "+1 SUBM @<XREF:SUBM>@ {1:1}");

    let note = store.line(children.line("NOTE_STRUCTURE").unwrap());
    assert_eq!(note.structure_name(), Some("NOTE_STRUCTURE"));
    assert_eq!(note.position(), 6);
    assert!(!note.is_tag_line());
}

#[test]
fn value_possibilities_are_a_closed_set() {
    let store = lineage();
    let individual = store.get_structure("INDIVIDUAL_RECORD", None, None).unwrap();
    let root = store.block(store.structure(individual).block());
    let indi = store.line(root.line("INDI").unwrap());
    let sex = store.line(store.block(indi.child_block().unwrap()).line("SEX").unwrap());

    assert!(sex.has_value());
    assert!(sex.value_names().is_empty());
    assert!(sex.admits_value("F"));
    assert!(!sex.admits_value("X"));
}

#[test]
fn structure_variations_by_tag() {
    let store = lineage();

    let enga = store.get_structure("FAMILY_EVENT_STRUCTURE", Some("ENGA"), None).unwrap();
    let marr = store.get_structure("FAMILY_EVENT_STRUCTURE", Some("MARR"), None).unwrap();
    let even = store.get_structure("FAMILY_EVENT_STRUCTURE", Some("EVEN"), None).unwrap();

    assert_eq!(enga, marr);
    assert_ne!(enga, even);
    assert_eq!(store.structure(enga).variation(), 1);
    assert_eq!(store.first_line_id(enga), Some("ENGA"));
    assert_eq!(
        store.get_structure("FAMILY_EVENT_STRUCTURE", Some("ENGA"), None),
        store.get_structure("FAMILY_EVENT_STRUCTURE", Some("ENGA"), None)
    );
}

#[test]
fn structure_variations_by_xref_and_value() {
    let store = lineage();

    let by_xref = store.get_structure("NOTE_STRUCTURE", Some("NOTE"), Some((true, false))).unwrap();
    let by_value = store.get_structure("NOTE_STRUCTURE", Some("NOTE"), Some((false, true))).unwrap();
    let first = store.get_structure("NOTE_STRUCTURE", Some("NOTE"), None).unwrap();

    assert_eq!(store.structure(by_xref).variation(), 0);
    assert_eq!(store.structure(by_value).variation(), 1);
    assert_eq!(first, by_xref);

    let err = store.get_structure("NOTE_STRUCTURE", Some("NOTE"), Some((true, true))).unwrap_err();
    expect![[
        "structure `NOTE_STRUCTURE` with line id `NOTE` with an xref field and with a value field does not exist"
    ]]
    .assert_eq(&err.to_string());
}

#[test]
fn structure_lookup_errors() {
    let store = lineage();

    assert_eq!(
        store.get_structure("NOTE_STRUCTURE", None, None),
        Err(SchemaAccessError::AmbiguousVariation {
            name: "NOTE_STRUCTURE".to_owned(),
            tags: vec!["NOTE".to_owned()],
        })
    );
    assert_eq!(
        store.get_structure("FAMILY_EVENT_STRUCTURE", Some("BIRT"), None),
        Err(SchemaAccessError::UnknownVariationTag {
            name: "FAMILY_EVENT_STRUCTURE".to_owned(),
            tag: "BIRT".to_owned(),
        })
    );
    assert_eq!(
        store.get_structure("SUBMITTER_RECORD", None, None),
        Err(SchemaAccessError::UnknownStructure { name: "SUBMITTER_RECORD".to_owned() })
    );
}

#[test]
fn variation_resolution_is_repeatable() {
    let store = lineage();
    let flags = [None, Some((true, false)), Some((false, true)), Some((false, false))];

    for name in store.structure_names() {
        for tag in store.variation_tags(name) {
            for xref_value in flags {
                let first = store.get_structure(name, Some(tag), xref_value);
                assert_eq!(store.get_structure(name, Some(tag), xref_value), first, "{name};{tag}");
            }
        }
    }
}

#[test]
fn xref_and_value_of_a_structure_line() {
    let text = "VERSION=1\nSOURCE=tests\nDESCRIPTION=inline\n\
        WRAPPER:=\nn <<INNER>> {0:1}\nn NOTE <TEXT> {0:1}\n\
        INNER:=\nn TEXT <TEXT> {1:1}\n";
    let store = Store::parse(text).unwrap();

    assert_eq!(
        store.get_structure("WRAPPER", None, Some((false, true))),
        Err(SchemaAccessError::StructureLine { name: "INNER".to_owned() })
    );
    let inner = store.get_structure("INNER", None, Some((false, true))).unwrap();
    assert_eq!(store.first_line_id(inner), Some("TEXT"));
}

#[test]
fn dump_single_variation() {
    let store = lineage();
    let death = store.get_structure("INDIVIDUAL_EVENT_STRUCTURE", Some("DEAT"), None).unwrap();

    expect![[r#"
        INDIVIDUAL_EVENT_STRUCTURE:=
        n DEAT [Y|<NULL>] {1:1}
          +1 <<EVENT_DETAIL>> {0:1}
    "#]]
    .assert_eq(&store.dump_variation(death).to_string());
}

#[track_caller]
fn check_error(grammar: &str, expect: expect_test::Expect) {
    let text = format!("VERSION=1\nSOURCE=tests\nDESCRIPTION=inline\n{grammar}");
    let err = Store::parse(&text).unwrap_err();
    expect.assert_eq(&err.to_string());
}

#[test]
fn parse_errors() {
    check_error("HEAD:=\nn HEAD {1:1} head", expect!["unrecognized token `head` (line 5: `n HEAD {1:1} head`)"]);
    check_error(
        "HEAD:=\nn HEAD {1:1}\nn HEAD {0:1}",
        expect!["line id `HEAD` is declared twice in the same block (line 6: `n HEAD {0:1}`)"],
    );
    check_error("HEAD:=\nTAIL:=\nn TAIL {1:1}", expect!["structure `HEAD` has no lines (line 4: `HEAD:=`)"]);
    check_error(
        "HEAD:=\n[\n|\nn HEAD {1:1}\n]",
        expect!["empty variation in structure `HEAD` (line 6: `|`)"],
    );
    check_error(
        "HEAD:=\n[\nn HEAD {1:1}\n]\nn TAIL {1:1}",
        expect!["content after the closing `]` of structure `HEAD` (line 8: `n TAIL {1:1}`)"],
    );
    check_error(
        "HEAD:=\nn HEAD {1:1}\n|",
        expect!["unexpected variation divider in structure `HEAD` (line 6: `|`)"],
    );
    check_error(
        "HEAD:=\nn HEAD {1:1}\n  +2 SOUR <S> {0:1}\n  +1 DEST <D> {0:1}",
        expect!["line index is shallower than the first line of its block (line 7: `+1 DEST <D> {0:1}`)"],
    );
    check_error(
        "Head:=\nn HEAD {1:1}",
        expect!["invalid structure name line `Head:=`, names use `A-Z` and `_` and end with `:=` (line 4: `Head:=`)"],
    );
}

#[test]
fn parse_error_points_at_the_line() {
    let text = "VERSION=1\nSOURCE=tests\nDESCRIPTION=inline\nHEAD:=\n  n HEAD{1:1}\n";
    let err = Store::parse(text).unwrap_err();

    assert!(matches!(err.kind(), ParseErrorKind::Format(_)));
    assert_eq!(err.line_number(), 5);
    assert_eq!(&text[err.range()], "n HEAD{1:1}");
    assert_eq!(err.to_diagnostic().range(), err.range());
    assert!(err.to_diagnostic().notes().is_empty());
}

#[test]
fn open_reports_where_parsing_failed() {
    let test_data = Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_data");

    let err = Store::open(test_data.join("bad_spacing.gedg")).unwrap_err();
    assert!(matches!(err, LoadError::Parse { line: 7, column: 3, .. }), "{err:?}");
    assert!(err.to_string().contains("bad_spacing.gedg:7:3`: missing space"), "{err}");

    let err = Store::open(test_data.join("lineage.txt")).unwrap_err();
    assert!(matches!(err, LoadError::Extension { .. }), "{err:?}");
    let err = Store::open(test_data.join("absent.gedg")).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }), "{err:?}");
    assert!(Store::open(test_data.join("lineage.gedg")).is_ok());
}

#[test]
fn missing_header_in_empty_grammar() {
    let err = Store::parse("/* nothing but a comment */\n").unwrap_err();
    assert_eq!(err.kind(), &ParseErrorKind::MissingHeader { key: "VERSION" });
    assert_eq!(err.line_number(), 2);
    assert_eq!(err.to_diagnostic().notes().len(), 1);
}

#[test]
fn length_validator() {
    let mut store = lineage();
    store.set_validator(LengthValidator);

    let header = store.get_structure("HEADER", None, None).unwrap();
    let root = store.block(store.structure(header).block());
    let line = store.line(root.line("HEAD").unwrap());
    let context = crate::FieldContext { tag: "HEAD", line };
    let validator = store.validator().unwrap();

    assert!(validator.validate_value(context, "NAME", "Plain text 42"));
    assert!(!validator.validate_value(context, "NAME", "semi;colon"));
    assert!(!validator.validate_xref(context, "XREF", &"x".repeat(250)));
    assert!(validator.validate_xref(context, "XREF", &"x".repeat(248)));
}
