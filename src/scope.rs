//! Conversion from preterms to terms, from prepatterns to patterns etc.

use crate::command::Command;
use crate::pattern::{Pattern, TopPattern};
use crate::precommand::Precommand;
use crate::prepattern::Prepattern;
use crate::prerule::Prerule;
use crate::preterm::{Binder, Prearg, Preterm};
use crate::rule::{self, Rule};
use crate::stack::Stack;
use crate::symbol::Symbol;
use crate::term::{Arg, RTerm, Term};
use fnv::FnvHashMap;
use std::convert::TryFrom;
use std::fmt::{self, Display};

/// Map from strings to (shared) symbols.
#[derive(Default)]
pub struct Symbols(FnvHashMap<String, Symbol>);

impl Symbols {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(&self, s: &str) -> Option<&Symbol> {
        self.0.get(s)
    }

    pub fn insert(&mut self, s: String) -> Result<Symbol, Error> {
        let sym = Symbol::new(s.clone());
        if self.0.insert(s, sym.clone()).is_some() {
            return Err(Error::Redeclaration);
        }
        Ok(sym)
    }
}

type Bound = Stack<String>;

pub fn bind<X, A, F>(bnd: &mut Stack<X>, arg: Option<X>, f: F) -> A
where
    F: FnOnce(&mut Stack<X>) -> A,
{
    match arg {
        Some(id) => {
            bnd.push(id);
            let x = f(bnd);
            bnd.pop();
            x
        }
        None => f(bnd),
    }
}

#[derive(Debug)]
pub enum Error {
    UndeclaredSymbol(String),
    Redeclaration,
    NoPrepattern,
    NoTopPattern,
    PatternArguments,
    Rule(rule::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UndeclaredSymbol(s) => write!(f, "undeclared symbol: {}", s),
            Self::Redeclaration => write!(f, "symbol redeclaration"),
            Self::NoPrepattern => write!(f, "term is not a pattern"),
            Self::NoTopPattern => write!(f, "rule left-hand side must be a symbol application"),
            Self::PatternArguments => write!(f, "pattern variable applied to a non-variable"),
            Self::Rule(e) => e.fmt(f),
        }
    }
}

impl From<rule::Error> for Error {
    fn from(err: rule::Error) -> Self {
        Self::Rule(err)
    }
}

impl Preterm {
    fn scoper(self, syms: &Symbols, bnd: &mut Bound) -> Result<RTerm, Error> {
        Ok(RTerm::new(self.scope(syms, bnd)?))
    }

    pub fn scope(self, syms: &Symbols, bnd: &mut Bound) -> Result<Term, Error> {
        match self {
            Self::Type => Ok(Term::Type),
            Self::Symb(s) => {
                if let Some(idx) = bnd.iter().position(|id| *id == s) {
                    Ok(Term::BVar(idx))
                } else {
                    match syms.get(&s) {
                        Some(sym) => Ok(Term::Symb(sym.clone())),
                        None => Err(Error::UndeclaredSymbol(s)),
                    }
                }
            }
            Self::Appl(head, tail) => {
                let tail: Result<_, _> = tail.into_iter().map(|tm| tm.scoper(syms, bnd)).collect();
                Ok(Term::Appl(head.scoper(syms, bnd)?, tail?))
            }
            Self::Bind(binder, arg, tm) => {
                let arg = arg.scope(syms, bnd)?;
                bind(bnd, arg.id.clone(), |bnd| {
                    let tm = tm.scoper(syms, bnd)?;
                    match binder {
                        Binder::Lam => Ok(Term::Abst(arg, tm)),
                        Binder::Pi => Ok(Term::Prod(arg, tm)),
                    }
                })
            }
        }
    }

    pub fn scope_closed(self, syms: &Symbols) -> Result<Term, Error> {
        self.scope(syms, &mut Stack::new())
    }
}

impl Prearg {
    fn scope(self, syms: &Symbols, bnd: &mut Bound) -> Result<Arg, Error> {
        let ty = self.ty.map(|ty| ty.scoper(syms, bnd)).transpose()?;
        Ok(Arg { id: self.id, ty })
    }
}

impl Prepattern {
    pub fn scope(
        self,
        syms: &Symbols,
        mvars: &[String],
        bnd: &mut Bound,
    ) -> Result<Pattern, Error> {
        match self {
            Self::Symb(s, args) => {
                if s == "_" {
                    if !args.is_empty() {
                        return Err(Error::PatternArguments);
                    }
                    return Ok(Pattern::Joker);
                }
                let bnd_idx = bnd.iter().position(|id| *id == s);
                if let Some(idx) = bnd_idx {
                    let args: Result<_, _> =
                        args.into_iter().map(|a| a.scope(syms, mvars, bnd)).collect();
                    Ok(Pattern::BVar(idx, args?))
                } else if let Some(m) = mvars.iter().position(|id| *id == s) {
                    // arguments of a pattern variable must be bound variables
                    let args: Result<Vec<_>, _> =
                        args.into_iter().map(|a| a.scope(syms, mvars, bnd)).collect();
                    let dbs: Option<Vec<_>> =
                        args?.into_iter().map(|p| p.get_de_bruijn()).collect();
                    Ok(Pattern::MVar(m, dbs.ok_or(Error::PatternArguments)?))
                } else {
                    match syms.get(&s) {
                        Some(sym) => {
                            let sym = sym.clone();
                            let args: Result<_, _> =
                                args.into_iter().map(|a| a.scope(syms, mvars, bnd)).collect();
                            Ok(Pattern::Symb(sym, args?))
                        }
                        None => Err(Error::UndeclaredSymbol(s)),
                    }
                }
            }
            Self::Abst(id, pat) => bind(bnd, id.clone(), |bnd| {
                let pat = pat.scope(syms, mvars, bnd)?;
                Ok(Pattern::Abst(id, Box::new(pat)))
            }),
        }
    }
}

impl Prerule {
    pub fn scope(self, syms: &Symbols) -> Result<Rule, Error> {
        let pre = Prepattern::try_from(self.lhs).map_err(|_| Error::NoPrepattern)?;
        let pat = pre.scope(syms, &self.ctx, &mut Stack::new())?;
        let lhs = TopPattern::try_from(pat).map_err(|_| Error::NoTopPattern)?;
        let mut ctxs = Stack::from(self.ctx.clone());
        let rhs = self.rhs.scoper(syms, &mut ctxs)?;
        Ok(Rule::new(self.ctx, lhs, rhs)?)
    }
}

impl Precommand {
    pub fn scope(self, syms: &mut Symbols) -> Result<Command, Error> {
        match self {
            Self::DCmd(id, params, dcmd) => {
                let dcmd = dcmd
                    .parametrise(params)
                    .map_type_err(|ty| ty.scope_closed(syms).map(RTerm::new))?
                    .map_term_err(|tm| tm.scope_closed(syms).map(RTerm::new))?;
                let sym = syms.insert(id)?;
                Ok(Command::Intro(sym, dcmd))
            }
            Self::Rule(prerule) => Ok(Command::Rule(prerule.scope(syms)?)),
        }
    }
}
