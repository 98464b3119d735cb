//! Terms for the lambda-Pi calculus.

use crate::fmt::application as fmt_appl;
use crate::symbol::Symbol;
use std::fmt::{self, Display};
use std::rc::Rc;

/// De Bruijn variable.
pub type DeBruijn = usize;

/// Argument of a binder.
/// For example, the `x` and `A` in the term `\ x : A => t`.
#[derive(Clone, Debug, PartialEq)]
pub struct Arg {
    pub id: Option<String>,
    pub ty: Option<RTerm>,
}

impl Arg {
    pub fn map_ty<F>(self, f: F) -> Self
    where
        F: FnOnce(RTerm) -> RTerm,
    {
        Self {
            id: self.id,
            ty: self.ty.map(f),
        }
    }
}

/// Pointer to a shared term.
#[derive(Clone, Debug, PartialEq)]
pub struct RTerm(Rc<Term>);

/// Term for the lambda-Pi calculus.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    Kind,
    Type,
    Symb(Symbol),
    BVar(DeBruijn),
    Appl(RTerm, Vec<RTerm>),
    Abst(Arg, RTerm),
    Prod(Arg, RTerm),
}

impl RTerm {
    /// Create a term pointer from a term.
    pub fn new(tm: Term) -> Self {
        Self(Rc::new(tm))
    }

    /// Compare the memory addresses of two term pointers.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Wrap the term in `n` abstractions with anonymous arguments.
    pub fn add_n_lambdas(self, n: usize) -> Self {
        std::iter::repeat(Arg { id: None, ty: None })
            .take(n)
            .fold(self, |acc, arg| Self::new(Term::Abst(arg, acc)))
    }
}

impl Term {
    /// Apply some terms to the term.
    pub fn apply(self, mut args: Vec<RTerm>) -> Self {
        if args.is_empty() {
            return self;
        }
        match self {
            Self::Appl(head, mut args1) => {
                args1.append(&mut args);
                Self::Appl(head, args1)
            }
            _ => Self::Appl(RTerm::new(self), args),
        }
    }
}

impl std::ops::Deref for RTerm {
    type Target = Term;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Term> for RTerm {
    fn from(tm: Term) -> Self {
        Self::new(tm)
    }
}

impl Display for RTerm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        (**self).fmt(f)
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Kind => write!(f, "Kind"),
            Self::Type => write!(f, "Type"),
            Self::Symb(s) => s.fmt(f),
            Self::BVar(x) => write!(f, "β{}", x),
            Self::Appl(head, tail) => fmt_appl(head, tail, f),
            Self::Prod(Arg { id: Some(id), ty: Some(ty) }, tm) => {
                write!(f, "(Π {} : {}. {})", id, ty, tm)
            }
            Self::Prod(Arg { ty: Some(ty), .. }, tm) => write!(f, "({} -> {})", ty, tm),
            Self::Prod(_, tm) => write!(f, "(Π _. {})", tm),
            Self::Abst(Arg { id, ty: Some(ty) }, tm) => {
                write!(f, "(λ {} : {}. {})", id.as_deref().unwrap_or("_"), ty, tm)
            }
            Self::Abst(Arg { id, .. }, tm) => {
                write!(f, "(λ {}. {})", id.as_deref().unwrap_or("_"), tm)
            }
        }
    }
}
