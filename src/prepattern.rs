//! Unscoped rewrite patterns.

use crate::preterm::{Binder, Preterm};
use std::convert::TryFrom;

#[derive(Clone)]
pub enum Prepattern {
    Symb(String, Vec<Prepattern>),
    Abst(Option<String>, Box<Prepattern>),
}

impl TryFrom<Preterm> for Prepattern {
    type Error = ();

    fn try_from(tm: Preterm) -> Result<Self, Self::Error> {
        use Preterm::*;
        match tm {
            Appl(head, mut args) => match *head {
                Symb(s) => {
                    let args: Result<_, _> = args.into_iter().map(Self::try_from).collect();
                    Ok(Self::Symb(s, args?))
                }
                Appl(head2, mut args2) => {
                    args2.append(&mut args);
                    Self::try_from(Appl(head2, args2))
                }
                _ => Err(()),
            },
            Symb(s) => Ok(Self::Symb(s, Vec::new())),
            Bind(Binder::Lam, arg, tm) => Ok(Self::Abst(arg.id, Box::new(Self::try_from(*tm)?))),
            _ => Err(()),
        }
    }
}
