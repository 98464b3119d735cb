//! Scoped rewrite rules and their compilation against a signature.

use crate::ac::AcIdent;
use crate::fmt::application as fmt_appl;
use crate::pattern::{Miller, MillerCtx, Pattern, TopPattern};
use crate::signature::Signature;
use crate::symbol::Symbol;
use crate::term::{DeBruijn, RTerm, Term};
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display};

pub type Arity = usize;

/// Scoped rewrite rule.
#[derive(Clone)]
pub struct Rule {
    /// variables bound by the rule, with the arities of their occurrences
    pub ctx: Vec<(String, Arity)>,
    /// left-hand side (pattern to match with)
    pub lhs: TopPattern,
    /// right-hand side (term to replace with)
    pub rhs: RTerm,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    MillerPattern,
    ArityMismatch,
    MillerUnused,
    NotEnoughArguments,
    AcRigidMember,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MillerPattern => write!(f, "pattern variable applied to repeated variables"),
            Self::ArityMismatch => write!(f, "pattern variable occurs with different arities"),
            Self::MillerUnused => write!(f, "context variable not occurring in pattern"),
            Self::NotEnoughArguments => write!(f, "underapplied pattern variable"),
            Self::AcRigidMember => write!(f, "non-variable member of an AC pattern"),
        }
    }
}

// Taken from:
// https://stackoverflow.com/questions/46766560/how-to-check-if-there-are-duplicates-in-a-slice/46767732#46767732
fn all_unique<T>(iter: T) -> bool
where
    T: IntoIterator,
    T::Item: Eq + std::hash::Hash,
{
    let mut uniq = HashSet::new();
    iter.into_iter().all(move |x| uniq.insert(x))
}

impl Pattern {
    fn mvars<'a>(&'a self) -> Box<dyn Iterator<Item = (Miller, &'a Vec<DeBruijn>)> + 'a> {
        match self {
            Self::MVar(m, args) => Box::new(std::iter::once((*m, args))),
            Self::Abst(_, pat) => pat.mvars(),
            Self::Symb(_, pats) | Self::BVar(_, pats) => {
                Box::new(pats.iter().flat_map(|p| p.mvars()))
            }
            Self::Joker => Box::new(std::iter::empty()),
        }
    }
}

fn check_arity(tm: &Term, k: usize, arities: &[(String, Arity)]) -> bool {
    match tm {
        Term::Kind | Term::Type | Term::BVar(_) | Term::Symb(_) => true,
        Term::Appl(head, args) => {
            let head_ok = match &**head {
                Term::BVar(n) if *n >= k => {
                    match arities.len().checked_sub(1 + n - k).and_then(|i| arities.get(i)) {
                        Some((_, arity)) => args.len() >= *arity,
                        None => true,
                    }
                }
                _ => check_arity(head, k, arities),
            };
            head_ok && args.iter().all(|a| check_arity(a, k, arities))
        }
        Term::Abst(arg, tm) | Term::Prod(arg, tm) => {
            arg.ty.as_ref().map_or(true, |ty| check_arity(ty, k, arities))
                && check_arity(tm, k + 1, arities)
        }
    }
}

impl Rule {
    /// Construct a rule from its parts,
    /// verifying that the pattern is a Miller pattern:
    /// every context variable occurs,
    /// is applied to distinct bound variables, and
    /// has the same arity at all its occurrences.
    pub fn new(ctx: Vec<String>, lhs: TopPattern, rhs: RTerm) -> Result<Self, Error> {
        let mut arities = HashMap::new();
        for pat in &lhs.args {
            for (m, args) in pat.mvars() {
                if !all_unique(args.iter()) {
                    return Err(Error::MillerPattern);
                }
                if let Some(prev) = arities.insert(m, args.len()) {
                    if prev != args.len() {
                        return Err(Error::ArityMismatch);
                    }
                }
            }
        }
        let ctx: Vec<_> = ctx
            .into_iter()
            .enumerate()
            .map(|(i, x)| Some((x, *arities.get(&i)?)))
            .collect::<Option<_>>()
            .ok_or(Error::MillerUnused)?;
        if !check_arity(&rhs, 0, &ctx) {
            return Err(Error::NotEnoughArguments);
        }
        Ok(Self { ctx, lhs, rhs })
    }
}

/// Left-hand side compiled against a signature:
/// applications of AC symbols are flattened into multiset patterns, and
/// every occurrence of a Miller variable carries its context.
#[derive(Clone)]
pub enum WfPattern {
    MVar(Miller, MillerCtx),
    Abst(Option<String>, Box<WfPattern>),
    Symb(Symbol, Vec<WfPattern>),
    BVar(DeBruijn, Vec<WfPattern>),
    /// multiset pattern `f{X₁ ȳ₁, …, Xₖ ȳₖ, _, …}`
    /// with the number of jokers and the variable members
    AcSet(AcIdent, usize, Vec<(Miller, MillerCtx)>),
    Joker,
}

/// Rewrite rule ready for matching.
#[derive(Clone)]
pub struct CompiledRule {
    pub symbol: Symbol,
    /// number of stack arguments consumed by the left-hand side
    pub args_len: usize,
    /// per-variable arity, indexed by Miller variable
    pub arities: Vec<Arity>,
    pub lhs: WfPattern,
    pub rhs: RTerm,
}

impl Rule {
    /// Compile the rule for matching.
    ///
    /// This is the point where the flavours of the signature's symbols
    /// become visible to the left-hand side.
    pub fn compile(self, sig: &Signature) -> Result<CompiledRule, Error> {
        let arities = self.ctx.iter().map(|(_, a)| *a).collect();
        let symbol = self.lhs.symbol.clone();
        let args_len = self.lhs.args.len();
        let lhs = compile_pat(&Pattern::from(self.lhs), 0, sig)?;
        let args_len = match &lhs {
            // a binary AC symbol consumes exactly its two arguments
            WfPattern::AcSet(_, _, _) => 2,
            _ => args_len,
        };
        Ok(CompiledRule {
            symbol,
            args_len,
            arities,
            lhs,
            rhs: self.rhs,
        })
    }
}

fn compile_pat(pat: &Pattern, depth: usize, sig: &Signature) -> Result<WfPattern, Error> {
    match pat {
        Pattern::MVar(m, args) => Ok(WfPattern::MVar(*m, MillerCtx::new(depth, args.clone()))),
        Pattern::Abst(id, p) => {
            let p = compile_pat(p, depth + 1, sig)?;
            Ok(WfPattern::Abst(id.clone(), Box::new(p)))
        }
        Pattern::BVar(x, pats) => {
            let pats: Result<_, _> = pats.iter().map(|p| compile_pat(p, depth, sig)).collect();
            Ok(WfPattern::BVar(*x, pats?))
        }
        Pattern::Symb(s, pats) => {
            if let Some(ident) = sig.ac_ident(s) {
                if pats.len() == 2 {
                    let mut jokers = 0;
                    let mut vars = Vec::new();
                    flatten_members(&ident.symbol, pats, depth, &mut jokers, &mut vars)?;
                    return Ok(WfPattern::AcSet(ident, jokers, vars));
                }
            }
            let pats: Result<_, _> = pats.iter().map(|p| compile_pat(p, depth, sig)).collect();
            Ok(WfPattern::Symb(s.clone(), pats?))
        }
        Pattern::Joker => Ok(WfPattern::Joker),
    }
}

fn flatten_members(
    symbol: &Symbol,
    pats: &[Pattern],
    depth: usize,
    jokers: &mut usize,
    vars: &mut Vec<(Miller, MillerCtx)>,
) -> Result<(), Error> {
    for p in pats {
        match p {
            Pattern::Symb(s, pats2) if s == symbol && pats2.len() == 2 => {
                flatten_members(symbol, pats2, depth, jokers, vars)?
            }
            Pattern::MVar(m, args) => vars.push((*m, MillerCtx::new(depth, args.clone()))),
            Pattern::Joker => *jokers += 1,
            _ => return Err(Error::AcRigidMember),
        }
    }
    Ok(())
}

impl Display for WfPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MVar(m, ctx) => {
                let args: Vec<_> = ctx.args.iter().map(|a| format!("β{}", a)).collect();
                fmt_appl(&format!("μ{}", m), &args, f)
            }
            Self::Abst(id, p) => write!(f, "(λ {}. {})", id.as_deref().unwrap_or("_"), p),
            Self::Symb(s, pats) => fmt_appl(s, pats, f),
            Self::BVar(x, pats) => fmt_appl(&format!("β{}", x), pats, f),
            Self::AcSet(ident, jokers, vars) => {
                write!(f, "{}{{", ident)?;
                for (m, _) in vars {
                    write!(f, "μ{}, ", m)?;
                }
                for _ in 0..*jokers {
                    write!(f, "_, ")?;
                }
                write!(f, "}}")
            }
            Self::Joker => write!(f, "_"),
        }
    }
}

impl Display for CompiledRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ⟶ {}", self.lhs, self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s.to_string())
    }

    fn top(s: &str, args: Vec<Pattern>) -> TopPattern {
        TopPattern { symbol: sym(s), args }
    }

    #[test]
    fn nonlinear_needs_equal_arities() {
        // f (\ x. X x) X
        let args = vec![
            Pattern::Abst(None, Box::new(Pattern::MVar(0, vec![0]))),
            Pattern::MVar(0, vec![]),
        ];
        let rhs = RTerm::new(Term::Type);
        let err = Rule::new(vec!["X".to_string()], top("f", args), rhs);
        assert_eq!(err.err(), Some(Error::ArityMismatch));
    }

    #[test]
    fn miller_args_distinct() {
        // f (\ x. X x x)
        let args = vec![Pattern::Abst(None, Box::new(Pattern::MVar(0, vec![0, 0])))];
        let rhs = RTerm::new(Term::Type);
        let err = Rule::new(vec!["X".to_string()], top("f", args), rhs);
        assert_eq!(err.err(), Some(Error::MillerPattern));
    }

    #[test]
    fn unused_variable() {
        // [X, Y] f X --> X
        let args = vec![Pattern::MVar(0, vec![])];
        let rhs = RTerm::new(Term::BVar(1));
        let ctx = vec!["X".to_string(), "Y".to_string()];
        let err = Rule::new(ctx, top("f", args), rhs);
        assert_eq!(err.err(), Some(Error::MillerUnused));
    }
}
