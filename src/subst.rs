//! Substitution and shifting for terms.

use crate::term::{Arg, DeBruijn, RTerm, Term};

impl RTerm {
    /// Rewrite every de Bruijn variable `n` under `k` extra binders by `subst(n, k)`.
    ///
    /// Subterms that the substitution leaves untouched are shared with `self`.
    pub fn apply_subst<S>(self, subst: &S, k: usize) -> Self
    where
        S: Fn(DeBruijn, usize) -> Term,
    {
        let sub = |tm: RTerm| tm.apply_subst(subst, k);
        match &*self {
            Term::BVar(n) if *n >= k => return Self::new(subst(*n, k)),
            Term::Appl(f, args) => {
                let f2 = sub(f.clone());
                let args2: Vec<RTerm> = args.iter().cloned().map(sub).collect();
                if !f.ptr_eq(&f2) || !args.iter().zip(args2.iter()).all(|(a, a2)| a.ptr_eq(a2)) {
                    return Self::new(Term::Appl(f2, args2));
                }
            }
            Term::Abst(arg, tm) => {
                let ty2 = arg.ty.clone().map(sub);
                let tm2 = tm.clone().apply_subst(subst, k + 1);
                if !ty_ptr_eq(&arg.ty, &ty2) || !tm.ptr_eq(&tm2) {
                    let arg = Arg { id: arg.id.clone(), ty: ty2 };
                    return Self::new(Term::Abst(arg, tm2));
                }
            }
            Term::Prod(arg, tm) => {
                let ty2 = arg.ty.clone().map(sub);
                let tm2 = tm.clone().apply_subst(subst, k + 1);
                if !ty_ptr_eq(&arg.ty, &ty2) || !tm.ptr_eq(&tm2) {
                    let arg = Arg { id: arg.id.clone(), ty: ty2 };
                    return Self::new(Term::Prod(arg, tm2));
                }
            }
            _ => (),
        };
        self
    }

    /// Decrease all free de Bruijn indices by `rhs`,
    /// failing if an index would drop below zero.
    pub fn unshift(self, rhs: usize) -> Option<Self> {
        self.unshift_at(rhs, 0)
    }

    fn unshift_at(self, rhs: usize, k: usize) -> Option<Self> {
        if rhs == 0 {
            return Some(self);
        }
        match &*self {
            Term::BVar(n) if *n >= k => {
                let n = n.checked_sub(rhs).filter(|n| *n >= k)?;
                Some(Self::new(Term::BVar(n)))
            }
            Term::Appl(f, args) => {
                let f = f.clone().unshift_at(rhs, k)?;
                let args: Option<_> = args.iter().cloned().map(|a| a.unshift_at(rhs, k)).collect();
                Some(Self::new(Term::Appl(f, args?)))
            }
            Term::Abst(arg, tm) => {
                let ty = match arg.ty.clone() {
                    Some(ty) => Some(ty.unshift_at(rhs, k)?),
                    None => None,
                };
                let tm = tm.clone().unshift_at(rhs, k + 1)?;
                let arg = Arg { id: arg.id.clone(), ty };
                Some(Self::new(Term::Abst(arg, tm)))
            }
            Term::Prod(arg, tm) => {
                let ty = match arg.ty.clone() {
                    Some(ty) => Some(ty.unshift_at(rhs, k)?),
                    None => None,
                };
                let tm = tm.clone().unshift_at(rhs, k + 1)?;
                let arg = Arg { id: arg.id.clone(), ty };
                Some(Self::new(Term::Prod(arg, tm)))
            }
            _ => Some(self),
        }
    }
}

fn ty_ptr_eq(ty1: &Option<RTerm>, ty2: &Option<RTerm>) -> bool {
    match (ty1, ty2) {
        (Some(ty1), Some(ty2)) => ty1.ptr_eq(ty2),
        (None, None) => true,
        _ => false,
    }
}

impl Term {
    /// Rewrite every de Bruijn variable `n` under `k` extra binders by `subst(n, k)`.
    pub fn apply_subst<S>(self, subst: &S, k: usize) -> Self
    where
        S: Fn(DeBruijn, usize) -> Term,
    {
        match self {
            Self::BVar(n) if n >= k => subst(n, k),
            Self::Appl(f, args) => {
                let f = f.apply_subst(subst, k);
                let args = args.into_iter().map(|a| a.apply_subst(subst, k)).collect();
                Self::Appl(f, args)
            }
            Self::Abst(arg, tm) => {
                let arg = arg.map_ty(|ty| ty.apply_subst(subst, k));
                Self::Abst(arg, tm.apply_subst(subst, k + 1))
            }
            Self::Prod(arg, tm) => {
                let arg = arg.map_ty(|ty| ty.apply_subst(subst, k));
                Self::Prod(arg, tm.apply_subst(subst, k + 1))
            }
            _ => self,
        }
    }

    /// Substitute the innermost bound variable by `u`, eliminating its binder.
    pub fn subst(self, u: &Term) -> Self {
        self.apply_subst(&psubst_single(u), 0)
    }
}

fn psubst_single<'a>(u: &'a Term) -> impl Fn(DeBruijn, usize) -> Term + 'a {
    move |n: DeBruijn, k: usize| {
        if n == k {
            u.clone() << k
        } else {
            Term::BVar(n - 1)
        }
    }
}

/// Definition of `<<` for terms.
#[allow(clippy::suspicious_arithmetic_impl)]
impl std::ops::Shl<usize> for Term {
    type Output = Self;

    fn shl(self, rhs: usize) -> Self::Output {
        if rhs == 0 {
            self
        } else {
            self.apply_subst(&|n, _k| Term::BVar(n + rhs), 0)
        }
    }
}

#[allow(clippy::suspicious_arithmetic_impl)]
impl std::ops::Shl<usize> for RTerm {
    type Output = Self;

    fn shl(self, rhs: usize) -> Self::Output {
        if rhs == 0 {
            self
        } else {
            self.apply_subst(&|n, _k| Term::BVar(n + rhs), 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bvar(n: DeBruijn) -> RTerm {
        RTerm::new(Term::BVar(n))
    }

    #[test]
    fn shift_under_binder() {
        // λ. β0 β1  shifted by 2  is  λ. β0 β3
        let arg = Arg { id: None, ty: None };
        let tm = Term::Abst(arg.clone(), RTerm::new(Term::BVar(0).apply(vec![bvar(1)])));
        let expected = Term::Abst(arg, RTerm::new(Term::BVar(0).apply(vec![bvar(3)])));
        assert_eq!(tm << 2, expected);
    }

    #[test]
    fn unshift_bound() {
        // λ. β0  unshifted by 1  is  λ. β0
        let arg = Arg { id: None, ty: None };
        let tm = RTerm::new(Term::Abst(arg, bvar(0)));
        assert_eq!(tm.clone().unshift(1), Some(tm));
    }

    #[test]
    fn unshift_escaping() {
        // β0 cannot be unshifted
        assert_eq!(bvar(0).unshift(1), None);
        // under a binder, β1 becomes β0 ... but β1 at toplevel is fine
        assert_eq!(bvar(1).unshift(1), Some(bvar(0)));
    }

    #[test]
    fn beta_subst() {
        // (β0 β1)[β0 := u]  is  u β0
        let u = Term::BVar(42);
        let tm = Term::BVar(0).apply(vec![bvar(1)]);
        assert_eq!(tm.subst(&u), Term::BVar(42).apply(vec![bvar(0)]));
    }
}
