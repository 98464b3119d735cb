//! Rewrite patterns.

use crate::fmt::application as fmt_appl;
use crate::symbol::Symbol;
use crate::term::DeBruijn;
use std::convert::TryFrom;
use std::fmt::{self, Display};

/// Miller variable.
///
/// This refers to the variables appearing in a rewrite pattern
/// bound by the rewrite rule's context.
/// Such a variable may be applied to lambda-bound variables of the pattern,
/// making it a higher-order pattern in the sense of Miller.
///
/// Reference:
/// Dale Miller:
/// A Logic Programming Language with Lambda-Abstraction,
/// Function Variables, and Simple Unification.
/// J. Log. Comput. 1(4): 497-536 (1991).
/// doi: [10.1093/logcom/1.4.497](https://doi.org/10.1093/logcom/1.4.497)
pub type Miller = usize;

/// Rewrite pattern.
///
/// This may be nonlinear; e.g. `eq X X` is a valid pattern.
#[derive(Clone)]
pub enum Pattern {
    /// matches any term, after substituting the bound variables it is applied to
    MVar(Miller, Vec<DeBruijn>),
    /// matches an abstraction
    Abst(Option<String>, Box<Pattern>),
    /// matches an application of a symbol
    Symb(Symbol, Vec<Pattern>),
    /// matches an application of a lambda-bound variable
    BVar(DeBruijn, Vec<Pattern>),
    /// matches any term
    Joker,
}

/// Pattern at the left-hand side of a rewrite rule.
///
/// The top pattern of a rule must be an application of patterns to a symbol.
/// This is to exclude rules matching any term, such as `[X] X --> f`.
#[derive(Clone)]
pub struct TopPattern {
    pub symbol: Symbol,
    pub args: Vec<Pattern>,
}

impl Pattern {
    /// Return the de Bruijn index of a bare bound-variable pattern.
    pub fn get_de_bruijn(self) -> Option<DeBruijn> {
        match self {
            Self::BVar(idx, args) if args.is_empty() => Some(idx),
            _ => None,
        }
    }
}

impl From<TopPattern> for Pattern {
    fn from(tp: TopPattern) -> Self {
        Self::Symb(tp.symbol, tp.args)
    }
}

impl TryFrom<Pattern> for TopPattern {
    type Error = ();

    fn try_from(p: Pattern) -> Result<Self, Self::Error> {
        match p {
            Pattern::Symb(symbol, args) => Ok(TopPattern { symbol, args }),
            _ => Err(()),
        }
    }
}

/// Context of one occurrence of a Miller variable:
/// the number of lambda binders `depth` between the rule's root and the occurrence,
/// the de Bruijn indices `args` of the bound variables the occurrence is applied to, and
/// for every binder, the argument position capturing it (if any).
#[derive(Clone, Debug)]
pub struct MillerCtx {
    pub depth: usize,
    pub args: Vec<DeBruijn>,
    pub arg_pos: Vec<Option<usize>>,
}

impl MillerCtx {
    pub fn new(depth: usize, args: Vec<DeBruijn>) -> Self {
        let arg_pos = (0..depth).map(|j| args.iter().position(|a| *a == j)).collect();
        Self { depth, args, arg_pos }
    }

    /// Number of bound variables the occurrence is applied to.
    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MVar(m, args) => {
                let args: Vec<_> = args.iter().map(|a| format!("β{}", a)).collect();
                fmt_appl(&format!("μ{}", m), &args, f)
            }
            Self::Abst(id, pat) => write!(f, "(λ {}. {})", id.as_deref().unwrap_or("_"), pat),
            Self::Symb(s, pats) => fmt_appl(s, pats, f),
            Self::BVar(x, pats) => fmt_appl(&format!("β{}", x), pats, f),
            Self::Joker => write!(f, "_"),
        }
    }
}
