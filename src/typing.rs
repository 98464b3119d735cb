//! Type inference and checking.

use crate::reduce;
use crate::signature::Signature;
use crate::stack::Stack;
use crate::term::{Arg, RTerm, Term};
use std::fmt::{self, Display};

#[derive(Debug)]
pub enum Error {
    ProductExpected,
    SortExpected,
    BindNoType,
    Unconvertible,
    KindNotTypable,
    UnexpectedKind,
    DomainFreeAbstraction,
    TypeNotFound,
    TypeAndTermEmpty,
    AcTypeExpected,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ProductExpected => write!(f, "product expected"),
            Self::SortExpected => write!(f, "sort expected"),
            Self::BindNoType => write!(f, "binding without type"),
            Self::Unconvertible => write!(f, "unconvertible terms"),
            Self::KindNotTypable => write!(f, "Kind is not typable"),
            Self::UnexpectedKind => write!(f, "unexpected Kind"),
            Self::DomainFreeAbstraction => write!(f, "domain-free abstraction"),
            Self::TypeNotFound => write!(f, "type not found"),
            Self::TypeAndTermEmpty => write!(f, "declaration without type and term"),
            Self::AcTypeExpected => write!(f, "AC symbol must be a binary operation"),
        }
    }
}

/// Map from de Bruijn indices to associated types.
pub type Context = Stack<Term>;

fn get_type(ctx: &Context, n: usize) -> Option<Term> {
    Some(ctx.get(n)?.clone() << (n + 1))
}

fn bind<A, F>(sig: &Signature, ctx: &mut Context, ty: Term, f: F) -> Result<A, Error>
where
    F: FnOnce(&mut Context) -> Result<A, Error>,
{
    match ty.infer(sig, ctx)? {
        Term::Type => ctx.with_pushed(ty, f),
        _ => Err(Error::BindNoType),
    }
}

impl Term {
    /// Infer the type of a term using supplied types of bound variables.
    pub fn infer(&self, sig: &Signature, ctx: &mut Context) -> Result<Term, Error> {
        debug!("infer type of {}", self);
        match self {
            Self::Kind => Err(Error::KindNotTypable),
            Self::Type => Ok(Term::Kind),
            Self::Symb(s) => Ok((**sig.get_type(s).ok_or(Error::TypeNotFound)?).clone()),
            Self::BVar(x) => get_type(ctx, *x).ok_or(Error::TypeNotFound),
            Self::Appl(head, args) => {
                let head_ty = head.infer(sig, ctx)?;
                args.iter().try_fold(head_ty, |ty, arg| match ty.whnf(sig) {
                    Term::Prod(Arg { ty: Some(a), .. }, b) => {
                        arg.check(sig, ctx, (*a).clone())?;
                        Ok((*b).clone().subst(&**arg))
                    }
                    _ => Err(Error::ProductExpected),
                })
            }
            Self::Abst(Arg { id, ty: Some(ty) }, tm) => {
                match bind(sig, ctx, (**ty).clone(), |ctx| tm.infer(sig, ctx))? {
                    Term::Kind => Err(Error::UnexpectedKind),
                    tm_ty => {
                        let arg = Arg { id: id.clone(), ty: Some(ty.clone()) };
                        Ok(Term::Prod(arg, RTerm::new(tm_ty)))
                    }
                }
            }
            Self::Prod(Arg { ty: Some(ty), .. }, tm) => {
                match bind(sig, ctx, (**ty).clone(), |ctx| tm.infer(sig, ctx))? {
                    tm_ty @ Term::Kind | tm_ty @ Term::Type => Ok(tm_ty),
                    _ => Err(Error::SortExpected),
                }
            }
            Self::Abst(Arg { ty: None, .. }, _) | Self::Prod(Arg { ty: None, .. }, _) => {
                Err(Error::DomainFreeAbstraction)
            }
        }
    }

    /// Check whether the term is of the given type.
    pub fn check(&self, sig: &Signature, ctx: &mut Context, ty_exp: Term) -> Result<(), Error> {
        debug!("check {} is of type {}", self, ty_exp);
        match self {
            Self::Abst(Arg { ty: ty_a_exp, .. }, tm) => match ty_exp.whnf(sig) {
                Term::Prod(Arg { ty: Some(ty_a), .. }, ty_b) => {
                    if let Some(ty_a_exp) = ty_a_exp {
                        let _ = ty_a_exp.infer(sig, ctx)?;
                        if !reduce::convertible(sig, (**ty_a_exp).clone(), (*ty_a).clone()) {
                            return Err(Error::Unconvertible);
                        }
                    }
                    ctx.with_pushed((*ty_a).clone(), |ctx| tm.check(sig, ctx, (*ty_b).clone()))
                }
                _ => Err(Error::ProductExpected),
            },
            _ => {
                let ty_inf = self.infer(sig, ctx)?;
                trace!("checking convertibility: {} ~ {}", ty_inf, ty_exp);
                if reduce::convertible(sig, ty_inf, ty_exp) {
                    Ok(())
                } else {
                    Err(Error::Unconvertible)
                }
            }
        }
    }
}
