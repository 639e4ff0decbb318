use std::fmt;
use std::rc::Rc;

use crate::ident::{NameHint, QName};

/// A term of the λΠ-calculus, in a named/de-Bruijn hybrid representation:
/// binding structure is carried entirely by `DB` indices, name hints are
/// kept alongside purely for display.
///
/// `App`'s argument list is always non-empty, and its head is never
/// itself an `App` — both are maintained by the smart constructors below,
/// never by callers reaching into the variant directly.
#[derive(Debug, Clone)]
pub enum Term {
    Kind,
    Type,
    DB(NameHint, usize),
    Const(QName),
    App(Rc<Term>, Vec<Rc<Term>>),
    Lam(NameHint, Option<Rc<Term>>, Rc<Term>),
    Pi(NameHint, Rc<Term>, Rc<Term>),
}

impl Term {
    pub fn db(hint: NameHint, index: usize) -> Rc<Term> {
        Rc::new(Term::DB(hint, index))
    }

    pub fn const_(name: QName) -> Rc<Term> {
        Rc::new(Term::Const(name))
    }

    /// Applies `head` to `args`, flattening nested applications and
    /// collapsing the no-argument case to `head` itself.
    pub fn app(head: Rc<Term>, args: Vec<Rc<Term>>) -> Rc<Term> {
        if args.is_empty() {
            return head;
        }
        match &*head {
            Term::App(inner_head, inner_args) => {
                let mut all = inner_args.clone();
                all.extend(args);
                Rc::new(Term::App(inner_head.clone(), all))
            }
            _ => Rc::new(Term::App(head, args)),
        }
    }

    pub fn app1(head: Rc<Term>, arg: Rc<Term>) -> Rc<Term> {
        Term::app(head, vec![arg])
    }

    pub fn lam(hint: NameHint, domain: Option<Rc<Term>>, body: Rc<Term>) -> Rc<Term> {
        Rc::new(Term::Lam(hint, domain, body))
    }

    pub fn pi(hint: NameHint, domain: Rc<Term>, codomain: Rc<Term>) -> Rc<Term> {
        Rc::new(Term::Pi(hint, domain, codomain))
    }

    /// Splits an application into `(head, args)`; for a non-`App` term
    /// this is `(self, [])`.
    pub fn unapply(self: &Rc<Term>) -> (Rc<Term>, &[Rc<Term>]) {
        match &**self {
            Term::App(head, args) => (head.clone(), args.as_slice()),
            _ => (self.clone(), &[]),
        }
    }

    pub fn is_db(&self) -> bool {
        matches!(self, Term::DB(_, _))
    }

    /// The qualified name when `self` is a bare `Const`, or the head of
    /// an `App(Const, _)`; `None` otherwise. Used by the decision-tree
    /// compiler and the reducer's rule 6 to find a pivotable head symbol.
    pub fn head_const(self: &Rc<Term>) -> Option<&QName> {
        match &**self {
            Term::Const(name) => Some(name),
            Term::App(head, _) => match &**head {
                Term::Const(name) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Structural equality modulo α: name hints are never compared, `DB`
/// equality is index equality, `Const` equality is qualified-name
/// equality (spec §4.A).
impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Term::Kind, Term::Kind) => true,
            (Term::Type, Term::Type) => true,
            (Term::DB(_, i), Term::DB(_, j)) => i == j,
            (Term::Const(a), Term::Const(b)) => a == b,
            (Term::App(f, xs), Term::App(g, ys)) => f == g && xs == ys,
            (Term::Lam(_, da, ba), Term::Lam(_, db_, bb)) => da == db_ && ba == bb,
            (Term::Pi(_, a, b), Term::Pi(_, c, d)) => a == c && b == d,
            _ => false,
        }
    }
}
impl Eq for Term {}

impl fmt::Display for Term {
    /// A minimal one-line rendering used only inside error payloads; this
    /// is not a pretty-printer (out of scope) and makes no attempt at
    /// precedence-aware parenthesisation beyond what keeps the output
    /// unambiguous.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Kind => write!(f, "Kind"),
            Term::Type => write!(f, "Type"),
            Term::DB(hint, i) => write!(f, "{}#{}", hint, i),
            Term::Const(name) => write!(f, "{}", name),
            Term::App(head, args) => {
                write!(f, "({}", head)?;
                for a in args {
                    write!(f, " {}", a)?;
                }
                write!(f, ")")
            }
            Term::Lam(hint, Some(dom), body) => write!(f, "(\\{}: {} => {})", hint, dom, body),
            Term::Lam(hint, None, body) => write!(f, "(\\{} => {})", hint, body),
            Term::Pi(hint, dom, cod) => write!(f, "(({}: {}) -> {})", hint, dom, cod),
        }
    }
}
