use std::fmt;
use std::rc::Rc;

/// A qualified name into the signature, e.g. `nat.plus`.
///
/// Two `QName`s are equal iff their module and name components are equal;
/// there is deliberately no interning or arena here (spec §9: "no
/// arena-plus-index is necessary").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    pub module: Rc<str>,
    pub name: Rc<str>,
}

impl QName {
    pub fn new(module: impl Into<Rc<str>>, name: impl Into<Rc<str>>) -> Self {
        QName { module: module.into(), name: name.into() }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

/// A purely cosmetic binder name. Ignored by every equality/hash impl in
/// this crate; carried only so that error messages and future
/// pretty-printers have something nicer than a de Bruijn index to show.
#[derive(Debug, Clone)]
pub struct NameHint(pub Rc<str>);

impl NameHint {
    pub fn new(s: impl Into<Rc<str>>) -> Self {
        NameHint(s.into())
    }

    pub fn anonymous() -> Self {
        NameHint(Rc::from("_"))
    }
}

impl fmt::Display for NameHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Name hints never participate in equality or hashing: the binding
// structure is carried entirely by de Bruijn indices (spec §3, "the name
// hint is purely for display and is ignored by equality").
impl PartialEq for NameHint {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}
impl Eq for NameHint {}
impl std::hash::Hash for NameHint {
    fn hash<H: std::hash::Hasher>(&self, _state: &mut H) {}
}
