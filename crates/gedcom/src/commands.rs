use anyhow::{Context, anyhow, bail};
use camino::Utf8Path;
use gedcom_errors::Renderer;
use gedcom_inputs::{GRAMMAR_EXTENSION, GrammarFile, LineCol};
use gedcom_store::Store;
use gedcom_tree::{HasTree as _, MandatoryFill, PrintOptions};
use tracing::info;

fn load(path: &Utf8Path) -> anyhow::Result<Store> {
    let file = GrammarFile::read(path).with_context(|| format!("failed to read `{path}`"))?;
    if !file.has_grammar_extension() {
        bail!("`{path}` is not a grammar file, expected the `.{GRAMMAR_EXTENSION}` extension");
    }

    Store::parse_file(&file).map_err(|err| {
        let renderer = Renderer::styled();
        let diagnostic = err.to_diagnostic();
        eprintln!("{}", diagnostic.render(&renderer, file.path().as_str(), file.text()));
        let LineCol { line, col } = file.line_index().line_col(err.range().start());
        anyhow!("`{path}:{}:{}` is not a valid grammar", line + 1, col + 1)
    })
}

pub(crate) fn check(path: &Utf8Path) -> anyhow::Result<()> {
    let store = load(path)?;
    info!(version = store.version(), "grammar is valid");
    println!(
        "{path}: {} structures, {} variations (version {}, {})",
        store.structure_names().count(),
        store.structures().count(),
        store.version(),
        store.source(),
    );
    Ok(())
}

pub(crate) fn structures(path: &Utf8Path) -> anyhow::Result<()> {
    let store = load(path)?;
    for name in store.structure_names() {
        let tags = store.variation_tags(name).collect::<Vec<_>>();
        match store.variation_count(name) {
            1 => println!("{name}"),
            count => println!("{name} ({count} variations: {})", tags.join(", ")),
        }
    }
    Ok(())
}

pub(crate) fn show(path: &Utf8Path, structure: &str, tag: Option<&str>) -> anyhow::Result<()> {
    let store = load(path)?;
    match tag {
        Some(tag) => {
            let variation = store.get_structure(structure, Some(tag), None)?;
            print!("{}", store.dump_variation(variation));
        }
        None => {
            let dump =
                store.dump(structure).with_context(|| format!("no structure `{structure}`"))?;
            print!("{dump}");
        }
    }
    Ok(())
}

pub(crate) fn skeleton(path: &Utf8Path, structure: &str, tag: Option<&str>) -> anyhow::Result<()> {
    let store = load(path)?;
    let mut tree = store.tree(structure, tag)?;
    let root = tree.root();
    let added = tree.add_mandatory_lines(root, MandatoryFill::Recursive)?;
    info!(added, "filled mandatory lines");

    for line in tree.printable(PrintOptions::default()) {
        if !line.is_structure_wrapper {
            println!("{line}");
        }
    }
    Ok(())
}
