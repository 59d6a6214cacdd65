use expect_test::expect;
use gedcom_store::Store;
use gedcom_tree::{FollowMode, HasTree as _, PrintOptions, Tree};

fn write(tree: &Tree<'_>) -> String {
    tree.printable(PrintOptions { skip_unset: true })
        .into_iter()
        .filter(|line| !line.is_structure_wrapper)
        .map(|line| format!("{line}\n"))
        .collect()
}

#[test]
fn family_record() {
    let store = Store::parse(include_str!("../../gedcom-store/test_data/lineage.gedg")).unwrap();
    let mut tree = store.tree("FAMILY_RECORD", None).unwrap();
    let root = tree.root();

    let fam = tree.follow_path(root, &["FAM"], FollowMode::Existing).unwrap();
    assert!(tree.set_xref(fam, "F1").unwrap().is_accepted());

    for (line, xref) in [("CHIL", "I3"), ("WIFE", "I2"), ("CHIL", "I4"), ("HUSB", "I1")] {
        let node = tree.follow_path(fam, &[line], FollowMode::CreateNew).unwrap();
        assert!(tree.set_xref(node, xref).unwrap().is_accepted());
    }
    assert!(tree.follow_path(fam, &["HUSB"], FollowMode::CreateNew).is_err());

    let marriage = ["FAMILY_EVENT_STRUCTURE;MARR", "MARR"];
    let marr = tree.follow_path(fam, &marriage, FollowMode::Existing).unwrap();
    assert!(tree.set_value(marr, "Y").unwrap().is_accepted());

    let date = tree
        .follow_path(fam, &[marriage[0], marriage[1], "EVENT_DETAIL", "DATE"], FollowMode::Existing)
        .unwrap();
    assert!(tree.set_value(date, "12 JUN 1890").unwrap().is_accepted());
    let place = tree
        .follow_path(fam, &[marriage[0], marriage[1], "EVENT_DETAIL", "PLAC"], FollowMode::Existing)
        .unwrap();
    assert!(tree.set_value(place, "Boston").unwrap().is_accepted());

    assert_eq!(tree.number_of_child_lines(fam, "CHIL"), 2);
    assert_eq!(tree.follow_path(fam, &marriage, FollowMode::Existing), Ok(marr));

    expect![[r#"
        0 @F1@ FAM
        1 MARR Y
        2 DATE 12 JUN 1890
        2 PLAC Boston
        1 HUSB @I1@
        1 WIFE @I2@
        1 CHIL @I3@
        1 CHIL @I4@
    "#]]
    .assert_eq(&write(&tree));
}
