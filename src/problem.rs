//! Construction of matching problems from rules and machine stacks.

use crate::ac::AcIdent;
use crate::matching;
use crate::pattern::{Miller, MillerCtx};
use crate::reduce::{Context, LTerm, Stack};
use crate::rule::{CompiledRule, WfPattern};
use crate::signature::Signature;
use crate::term::Term;
use lazy_st::lazy;
use std::rc::Rc;

/// One unsolved AC equation
/// `f^{depth}{X₁ ȳ₁, …, Xₖ ȳₖ, _, …} ≡ f{t₁, …, tₙ}`.
pub struct AcEquation<A> {
    /// number of lambda binders above the equation
    pub depth: usize,
    pub ident: AcIdent,
    /// number of anonymous wildcards among the members
    pub jokers: usize,
    /// variable members, each with its occurrence context
    pub vars: Vec<(Miller, MillerCtx)>,
    /// multiset of matched terms
    pub terms: A,
}

/// Matching problem for one rule application:
/// for every variable, the equations it has to satisfy, and
/// the AC equations relating variable multisets to term multisets.
///
/// The types of the right-hand sides are kept abstract;
/// the solver obtains terms from them via conversion functions.
pub struct MatchingProblem<E, A> {
    /// per-variable arity, indexed by Miller variable
    pub arities: Vec<usize>,
    /// one slot of equations `X ȳ ≡ t` per variable
    pub eq_problems: Vec<Vec<(MillerCtx, E)>>,
    pub ac_problems: Vec<AcEquation<A>>,
}

fn thunk(tm: Term) -> LTerm {
    Rc::new(lazy!(tm))
}

impl CompiledRule {
    /// Match the machine stack against the rule's left-hand side,
    /// collecting the equations for its variables.
    ///
    /// Return `None` if the stack does not match the rigid part of the pattern.
    /// Terms bound to equation slots are not evaluated by this function.
    pub fn matching_problem(
        &self,
        stack: &Stack,
        sig: &Signature,
    ) -> Option<MatchingProblem<LTerm, Vec<LTerm>>> {
        let mut pb = MatchingProblem {
            arities: self.arities.clone(),
            eq_problems: vec![Vec::new(); self.arities.len()],
            ac_problems: Vec::new(),
        };
        match &self.lhs {
            WfPattern::Symb(_, pats) => {
                if stack.len() < pats.len() {
                    // we do not have enough arguments on the stack to match against
                    return None;
                }
                for (pat, tm) in pats.iter().zip(stack.iter()) {
                    match_wf(sig, pat, 0, tm.clone(), &mut pb)?;
                }
            }
            WfPattern::AcSet(ident, jokers, vars) => {
                if stack.len() < 2 {
                    return None;
                }
                let mut terms = Vec::new();
                for tm in stack.iter().take(2) {
                    for c in ident.force_flatten(sig, (**tm).clone()) {
                        terms.push(thunk((*c).clone()));
                    }
                }
                pb.ac_problems.push(AcEquation {
                    depth: 0,
                    ident: ident.clone(),
                    jokers: *jokers,
                    vars: vars.clone(),
                    terms,
                });
            }
            // rule compilation only produces the above two at the root
            _ => return None,
        }
        Some(pb)
    }

    /// Match the machine stack against the rule and solve for its variables.
    ///
    /// Return a new machine context containing variable assignments in case of a match.
    pub fn matches(&self, stack: &Stack, sig: &Signature) -> Option<Context> {
        let pb = self.matching_problem(stack, sig)?;
        let subst = matching::solve_problem(sig, LTerm::clone, Vec::clone, &pb)?;
        Some(Context::from(subst))
    }
}

fn match_wf(
    sig: &Signature,
    pat: &WfPattern,
    depth: usize,
    tm: LTerm,
    pb: &mut MatchingProblem<LTerm, Vec<LTerm>>,
) -> Option<()> {
    match pat {
        WfPattern::Joker => Some(()),
        WfPattern::MVar(m, ctx) => {
            pb.eq_problems[*m].push((ctx.clone(), tm));
            Some(())
        }
        WfPattern::Abst(_, pat) => match (*tm).clone().whnf(sig) {
            Term::Abst(_, body) => match_wf(sig, pat, depth + 1, thunk((*body).clone()), pb),
            _ => None,
        },
        WfPattern::Symb(sp, pats) => match (*tm).clone().whnf(sig) {
            Term::Symb(st) if pats.is_empty() && *sp == st => Some(()),
            Term::Appl(head, args) => match &*head {
                // the argument numbers have to be equal,
                // to exclude pattern matches like `f (g a) ~ f g`
                Term::Symb(st) if *sp == *st && args.len() == pats.len() => {
                    for (pat, arg) in pats.iter().zip(args) {
                        match_wf(sig, pat, depth, thunk((*arg).clone()), pb)?;
                    }
                    Some(())
                }
                _ => None,
            },
            _ => None,
        },
        WfPattern::BVar(xp, pats) => match (*tm).clone().whnf(sig) {
            Term::BVar(xt) if pats.is_empty() && *xp == xt => Some(()),
            Term::Appl(head, args) => match &*head {
                Term::BVar(xt) if *xp == *xt && args.len() == pats.len() => {
                    for (pat, arg) in pats.iter().zip(args) {
                        match_wf(sig, pat, depth, thunk((*arg).clone()), pb)?;
                    }
                    Some(())
                }
                _ => None,
            },
            _ => None,
        },
        WfPattern::AcSet(ident, jokers, vars) => match (*tm).clone().whnf(sig) {
            Term::Appl(head, args) if args.len() == 2 && ident.heads(&head) => {
                let mut terms = Vec::new();
                for arg in args {
                    for c in ident.force_flatten(sig, (*arg).clone()) {
                        terms.push(thunk((*c).clone()));
                    }
                }
                pb.ac_problems.push(AcEquation {
                    depth,
                    ident: ident.clone(),
                    jokers: *jokers,
                    vars: vars.clone(),
                    terms,
                });
                Some(())
            }
            _ => None,
        },
    }
}
