use std::fmt;

use crate::{Block, Store, Structure};

/// Normalized grammar text of every variation of one structure.
pub struct StructureDump<'a> {
    pub(crate) store: &'a Store,
    pub(crate) name: &'a str,
    pub(crate) variations: &'a [Structure],
}

impl fmt::Display for StructureDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:=", self.name)?;

        let grouped = self.variations.len() > 1;
        if grouped {
            writeln!(f, "[")?;
        }

        for (index, &structure) in self.variations.iter().enumerate() {
            if index > 0 {
                writeln!(f, "|")?;
            }
            write_block(f, self.store, self.store.structure(structure).block)?;
        }

        if grouped {
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, store: &Store, block: Block) -> fmt::Result {
    for &line in store.block(block).lines() {
        let data = store.line(line);
        writeln!(f, "{:indent$}{data}", "", indent = data.level() as usize * 2)?;
        if let Some(child) = data.child_block() {
            write_block(f, store, child)?;
        }
    }
    Ok(())
}
