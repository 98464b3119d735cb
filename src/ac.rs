//! Associative-commutative symbols: flattening and unflattening.

use crate::reduce;
use crate::signature::Signature;
use crate::symbol::Symbol;
use crate::term::{RTerm, Term};
use std::fmt::{self, Display};

/// Flavour of an associative-commutative symbol.
#[derive(Clone, Debug)]
pub enum AcFlavour {
    /// plain associative-commutative
    Ac,
    /// associative-commutative with a neutral element
    Acu(RTerm),
}

/// Associative-commutative symbol together with its flavour.
///
/// Equality considers only the symbol:
/// a symbol cannot be declared with two different flavours.
#[derive(Clone, Debug)]
pub struct AcIdent {
    pub symbol: Symbol,
    pub flavour: AcFlavour,
}

impl PartialEq for AcIdent {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for AcIdent {}

impl Display for AcIdent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.symbol.fmt(f)
    }
}

impl AcIdent {
    pub fn neutral(&self) -> Option<&RTerm> {
        match &self.flavour {
            AcFlavour::Acu(neu) => Some(neu),
            AcFlavour::Ac => None,
        }
    }

    /// Split a term into its components under this symbol.
    ///
    /// Components are reduced to weak head normal form on the way,
    /// exposing occurrences of the symbol that a rewrite step may produce.
    /// For a symbol with a neutral element,
    /// components convertible to the neutral element are dropped.
    pub fn force_flatten(&self, sig: &Signature, t: Term) -> Vec<RTerm> {
        let mut acc = Vec::new();
        self.flatten_into(sig, t, &mut acc);
        if let Some(neu) = self.neutral() {
            acc.retain(|c| !reduce::convertible(sig, (**c).clone(), (**neu).clone()));
        }
        acc
    }

    fn flatten_into(&self, sig: &Signature, t: Term, acc: &mut Vec<RTerm>) {
        let t = t.whnf(sig);
        if let Term::Appl(head, args) = &t {
            if args.len() == 2 && self.heads(head) {
                self.flatten_into(sig, (*args[0]).clone(), acc);
                self.flatten_into(sig, (*args[1]).clone(), acc);
                return;
            }
        }
        acc.push(RTerm::new(t))
    }

    /// Does the symbol head the given term?
    pub fn heads(&self, t: &Term) -> bool {
        match t {
            Term::Symb(s) => *s == self.symbol,
            _ => false,
        }
    }

    /// Inverse of flattening: combine components with a left fold.
    ///
    /// The empty combination is the neutral element, if there is one.
    pub fn unflatten(&self, ts: Vec<RTerm>) -> Option<RTerm> {
        let mut iter = ts.into_iter();
        match iter.next() {
            None => self.neutral().cloned(),
            Some(hd) => Some(iter.fold(hd, |acc, t| self.appl(acc, t))),
        }
    }

    fn appl(&self, a: RTerm, b: RTerm) -> RTerm {
        let head = RTerm::new(Term::Symb(self.symbol.clone()));
        RTerm::new(Term::Appl(head, vec![a, b]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident() -> AcIdent {
        AcIdent {
            symbol: Symbol::new("plus".to_string()),
            flavour: AcFlavour::Ac,
        }
    }

    #[test]
    fn unflatten_fold() {
        let ident = ident();
        let [a, b, c] = [Term::BVar(0), Term::BVar(1), Term::BVar(2)];
        let ts = vec![RTerm::new(a.clone()), RTerm::new(b.clone()), RTerm::new(c.clone())];
        // plus (plus a b) c
        let ab = Term::Symb(ident.symbol.clone()).apply(vec![RTerm::new(a), RTerm::new(b)]);
        let abc = Term::Symb(ident.symbol.clone()).apply(vec![RTerm::new(ab), RTerm::new(c)]);
        assert_eq!(*ident.unflatten(ts).unwrap(), abc);
    }

    #[test]
    fn unflatten_empty() {
        assert!(ident().unflatten(Vec::new()).is_none());
        let neu = RTerm::new(Term::BVar(7));
        let acu = AcIdent {
            symbol: Symbol::new("oplus".to_string()),
            flavour: AcFlavour::Acu(neu.clone()),
        };
        assert_eq!(acu.unflatten(Vec::new()), Some(neu));
    }
}
