//! Map from symbols to their types and associated rewrite rules.

use crate::ac::{AcFlavour, AcIdent};
use crate::command::IntroType;
use crate::reduce;
use crate::rule::{self, CompiledRule, Rule, WfPattern};
use crate::symbol::Symbol;
use crate::term::{Arg, RTerm, Term};
use crate::typing;
use fnv::FnvHashMap;
use std::fmt::{self, Display};

/// Map from symbols to their types and associated rewrite rules.
///
/// Furthermore, set whether convertibility should be checked modulo eta.
pub struct Signature {
    info: FnvHashMap<Symbol, SymInfo>,
    pub eta: bool,
}

/// Information about a symbol.
pub struct SymInfo {
    pub typ: RTerm,
    /// AC flavour, if the symbol was declared associative-commutative
    pub ac: Option<AcFlavour>,
    pub rewritable: bool,
    pub rules: Vec<CompiledRule>,
}

#[derive(Debug)]
pub enum Error {
    Reintroduction,
    NonRewritable,
    Rule(rule::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Reintroduction => write!(f, "symbol reintroduction"),
            Self::NonRewritable => write!(f, "rule for a non-rewritable symbol"),
            Self::Rule(e) => e.fmt(f),
        }
    }
}

impl From<rule::Error> for Error {
    fn from(err: rule::Error) -> Self {
        Self::Rule(err)
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            info: Default::default(),
            eta: false,
        }
    }
}

impl Signature {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(&self, sym: &Symbol) -> Option<&SymInfo> {
        self.info.get(sym)
    }

    pub fn get_type(&self, sym: &Symbol) -> Option<&RTerm> {
        self.get(sym).map(|info| &info.typ)
    }

    /// Return the AC identifier of a symbol, if it has one.
    pub fn ac_ident(&self, sym: &Symbol) -> Option<AcIdent> {
        let flavour = self.get(sym)?.ac.clone()?;
        Some(AcIdent {
            symbol: sym.clone(),
            flavour,
        })
    }

    pub fn insert(&mut self, sym: Symbol, info: SymInfo) -> Result<(), Error> {
        if self.info.insert(sym, info).is_some() {
            return Err(Error::Reintroduction);
        }
        Ok(())
    }

    /// Compile a rule and add it to the symbol heading its left-hand side.
    pub fn add_rule(&mut self, rule: Rule) -> Result<(), Error> {
        let rule = rule.compile(self)?;
        let info = self.info.get_mut(&rule.symbol).ok_or(Error::NonRewritable)?;
        if !info.rewritable {
            return Err(Error::NonRewritable);
        }
        info.rules.push(rule);
        Ok(())
    }
}

/// Have we assured that a given term matches a given type?
enum Check {
    Checked,
    Unchecked,
}

/// Typechecked symbol introduction, ready to be inserted into the signature.
pub struct Entry {
    typ: RTerm,
    term: Option<(RTerm, Check)>,
    ac: Option<AcFlavour>,
    rewritable: bool,
}

impl Entry {
    fn declare(typ: RTerm, rewritable: bool, sig: &Signature) -> Result<Self, typing::Error> {
        match typ.infer(sig, &mut typing::Context::new())? {
            Term::Kind | Term::Type => Ok(Self {
                typ,
                term: None,
                ac: None,
                rewritable,
            }),
            _ => Err(typing::Error::SortExpected),
        }
    }

    fn define(
        oty: Option<RTerm>,
        term: RTerm,
        rewritable: bool,
        sig: &Signature,
    ) -> Result<Self, typing::Error> {
        let (typ, check) = match oty {
            None => (
                RTerm::new(term.infer(sig, &mut typing::Context::new())?),
                Check::Checked,
            ),
            Some(ty) => {
                let _ = ty.infer(sig, &mut typing::Context::new())?;
                (ty, Check::Unchecked)
            }
        };
        match &*typ {
            Term::Kind => Err(typing::Error::UnexpectedKind),
            _ => Ok(Self {
                typ,
                term: Some((term, check)),
                ac: None,
                rewritable,
            }),
        }
    }

    /// Declare an AC symbol: its type must be a binary operation `A -> A -> A`,
    /// and a neutral element must be of type `A`.
    fn declare_ac(
        neu: Option<RTerm>,
        typ: RTerm,
        sig: &Signature,
    ) -> Result<Self, typing::Error> {
        let mut entry = Self::declare(typ, true, sig)?;
        let dom = match (*entry.typ).clone().whnf(sig) {
            Term::Prod(Arg { ty: Some(a), .. }, body) => {
                match (*body).clone().whnf(sig) {
                    Term::Prod(Arg { ty: Some(a2), .. }, cod) => {
                        let a_ok = reduce::convertible(sig, (*a).clone() << 1, (*a2).clone());
                        let cod_ok = reduce::convertible(sig, (*a).clone() << 2, (*cod).clone());
                        if !(a_ok && cod_ok) {
                            return Err(typing::Error::AcTypeExpected);
                        }
                        a
                    }
                    _ => return Err(typing::Error::AcTypeExpected),
                }
            }
            _ => return Err(typing::Error::AcTypeExpected),
        };
        entry.ac = match neu {
            None => Some(AcFlavour::Ac),
            Some(neu) => {
                neu.check(sig, &mut typing::Context::new(), (*dom).clone())?;
                Some(AcFlavour::Acu(neu))
            }
        };
        Ok(entry)
    }

    /// Verify whether `t: A` if this was not previously checked.
    pub fn check(mut self, sig: &Signature) -> Result<Self, typing::Error> {
        if let Some((term, Check::Unchecked)) = self.term {
            term.check(sig, &mut typing::Context::new(), (*self.typ).clone())?;
            self.term = Some((term, Check::Checked));
        };
        Ok(self)
    }

    /// Construct an entry from an introduction command.
    pub fn new(it: IntroType, sig: &Signature) -> Result<Self, typing::Error> {
        use crate::precommand::GDCommand::*;
        match it {
            Declaration(ty) => Self::declare(ty, false, sig),
            Definition(oty, otm) => match (oty, otm) {
                (Some(ty), None) => Self::declare(ty, true, sig),
                (oty, Some(tm)) => Self::define(oty, tm, true, sig),
                (None, None) => Err(typing::Error::TypeAndTermEmpty),
            },
            Theorem(ty, tm) => Self::define(Some(ty), tm, false, sig),
            AcDeclaration(neu, ty) => Self::declare_ac(neu, ty, sig),
        }
    }
}

impl SymInfo {
    /// Turn an entry into the symbol information registered by the signature.
    ///
    /// A definition gives rise to a rule rewriting the symbol to its definiens.
    pub fn new(sym: &Symbol, entry: Entry) -> Self {
        let rules = match &entry.term {
            Some((tm, _check)) if entry.rewritable => Vec::from([CompiledRule {
                symbol: sym.clone(),
                args_len: 0,
                arities: Vec::new(),
                lhs: WfPattern::Symb(sym.clone(), Vec::new()),
                rhs: tm.clone(),
            }]),
            _ => Vec::new(),
        };
        Self {
            typ: entry.typ,
            ac: entry.ac,
            rewritable: entry.rewritable,
            rules,
        }
    }
}
