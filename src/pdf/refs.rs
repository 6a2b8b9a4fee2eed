use pdf_writer::Ref;
use std::collections::HashMap;

/// Every indirect object the writer emits, keyed by what it is for. Keeping
/// the mapping explicit lets objects reference each other without
/// coordinating raw ids.
#[derive(Eq, PartialEq, Hash, Copy, Clone, Debug)]
pub enum RefType {
    Catalog,
    Info,
    PageTree,
    Page(usize),
    ContentForPage(usize),
    Font(usize),
    CidFont(usize),
    FontDescriptor(usize),
    FontData(usize),
    ToUnicode(usize),
    Image(usize),
    ImageMask(usize),
    /// One ExtGState per distinct opacity used anywhere in the document
    Opacity(usize),
}

pub struct ObjectReferences {
    refs: HashMap<RefType, Ref>,
    next_id: i32,
}

impl ObjectReferences {
    pub fn new() -> ObjectReferences {
        ObjectReferences {
            refs: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn get(&self, ref_type: RefType) -> Option<Ref> {
        self.refs.get(&ref_type).copied()
    }

    /// Allocate a fresh id for `ref_type`, remembering it for later lookup
    pub fn gen(&mut self, ref_type: RefType) -> Ref {
        let id = Ref::new(self.next_id);
        self.next_id += 1;
        self.refs.insert(ref_type, id);
        id
    }
}

impl Default for ObjectReferences {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_recallable() {
        let mut refs = ObjectReferences::new();
        let a = refs.gen(RefType::Catalog);
        let b = refs.gen(RefType::Page(0));
        assert_ne!(a, b);
        assert_eq!(refs.get(RefType::Catalog), Some(a));
        assert_eq!(refs.get(RefType::Page(0)), Some(b));
        assert_eq!(refs.get(RefType::Page(1)), None);
    }
}
