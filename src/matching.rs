//! Higher-order pattern matching modulo associative-commutative symbols.
//!
//! Given the equations collected by matching a term against a rule's
//! left-hand side ([`crate::problem::MatchingProblem`]),
//! [`solve_problem`] computes one term per pattern variable such that
//! substituting these terms into the left-hand side
//! yields the matched term, modulo AC.
//!
//! Equations of the shape `X ȳ ≡ t` are solved first and deterministically.
//! The remaining AC equations relate a multiset of variables and wildcards
//! to a multiset of terms;
//! they are solved by a depth-first search which
//! assigns candidate terms to variables one by one and
//! backtracks on failure.
//! A variable standing for several terms of a multiset
//! passes through an intermediate [`Status::Partly`] state
//! in which it accumulates terms until its equations are exhausted.

use crate::ac::AcIdent;
use crate::pattern::{Miller, MillerCtx};
use crate::problem::MatchingProblem;
use crate::reduce::{self, LTerm};
use crate::signature::Signature;
use crate::term::{Arg, RTerm, Term};
use im::Vector;
use lazy_st::lazy;
use std::rc::Rc;

/// Failure to solve a single equation `X ȳ ≡ t`.
///
/// This is internal to the solver:
/// it triggers a retry against the strong normal form of `t`, and
/// if that fails as well, the failure of the current search branch.
struct NotUnifiable;

/// What we know about a pattern variable during the search.
#[derive(Clone)]
enum Status {
    Unsolved,
    /// the variable is this term (under its lambdas)
    Solved(RTerm),
    /// the variable is the combination of these terms under an AC symbol,
    /// and more terms may still be added
    Partly(AcIdent, Vec<RTerm>),
}

impl RTerm {
    /// Replace bound variables of the pattern by the argument positions
    /// capturing them, and unshift the free variables.
    ///
    /// Under `k` binders inside the matched term, a de Bruijn index `n`
    /// refers to one of the `var.depth` binders of the pattern if `n - k`
    /// is below `var.depth`; such an index must be captured by an argument
    /// of the variable, otherwise the equation has no solution.
    /// Any higher index is free; it loses the pattern's binders and
    /// gains the solution's `var.arity()` lambdas.
    fn solve(self, k: usize, var: &MillerCtx) -> Result<RTerm, NotUnifiable> {
        match &*self {
            Term::Type | Term::Kind | Term::Symb(_) => Ok(self),
            Term::BVar(n) => {
                if *n < k {
                    // variable bound inside the matched term
                    Ok(self)
                } else {
                    let n2 = match var.arg_pos.get(*n - k) {
                        // variable free above the pattern
                        None => n - var.depth + var.arity(),
                        // pattern binder that the unknown does not capture
                        Some(None) => return Err(NotUnifiable),
                        // pattern binder captured by an argument
                        Some(Some(pos)) => pos + k,
                    };
                    Ok(RTerm::new(Term::BVar(n2)))
                }
            }
            Term::Abst(arg, tm) => {
                let ty = arg.ty.clone().map(|ty| ty.solve(k, var)).transpose()?;
                let tm = tm.clone().solve(k + 1, var)?;
                let arg = Arg { id: arg.id.clone(), ty };
                Ok(RTerm::new(Term::Abst(arg, tm)))
            }
            Term::Prod(arg, tm) => {
                let ty = arg.ty.clone().map(|ty| ty.solve(k, var)).transpose()?;
                let tm = tm.clone().solve(k + 1, var)?;
                let arg = Arg { id: arg.id.clone(), ty };
                Ok(RTerm::new(Term::Prod(arg, tm)))
            }
            Term::Appl(f, args) => {
                let f = f.clone().solve(k, var)?;
                let args: Result<_, _> = args.iter().cloned().map(|a| a.solve(k, var)).collect();
                Ok(RTerm::new(Term::Appl(f, args?)))
            }
        }
    }
}

/// Solve `λ^depth. X ȳ ≡ λ^depth. t` for `X`,
/// returning the body of the solution (without its lambdas).
fn solve(var: &MillerCtx, tm: RTerm) -> Result<RTerm, NotUnifiable> {
    if var.arity() == 0 {
        tm.unshift(var.depth).ok_or(NotUnifiable)
    } else {
        tm.solve(0, var)
    }
}

/// Solve a single equation,
/// retrying against the strong normal form of the term on failure.
fn force_solve(sig: &Signature, var: &MillerCtx, tm: &LTerm) -> Result<RTerm, NotUnifiable> {
    let tm = (**tm).clone();
    match solve(var, RTerm::new(tm.clone())) {
        Ok(sol) => Ok(sol),
        Err(NotUnifiable) => solve(var, RTerm::new(tm.snf(sig))),
    }
}

/// The term a solved variable contributes at one of its occurrences:
/// the solution under its lambdas,
/// shifted below the binders of the occurrence's equation,
/// applied to the bound variables of the occurrence.
fn occurrence(depth: usize, arity: usize, sol: &RTerm, var: &MillerCtx) -> Term {
    let lam = (*sol.clone().add_n_lambdas(arity)).clone() << depth;
    let args = var.args.iter().map(|db| RTerm::new(Term::BVar(*db)));
    lam.apply(args.collect())
}

/// Remove the first term convertible with `expected` from `terms`.
fn subtract(sig: &Signature, terms: &mut Vec<LTerm>, expected: &Term) -> bool {
    let found = terms
        .iter()
        .position(|tm| reduce::convertible(sig, (**tm).clone(), expected.clone()));
    match found {
        Some(i) => {
            terms.remove(i);
            true
        }
        None => false,
    }
}

/// One AC equation during the search.
#[derive(Clone)]
struct AcProblem {
    depth: usize,
    ident: AcIdent,
    jokers: usize,
    vars: Vec<(Miller, MillerCtx)>,
    terms: Vec<LTerm>,
}

impl AcProblem {
    /// An equation without variables holds iff
    /// no terms remain or a wildcard absorbs them.
    fn holds_without_vars(&self) -> bool {
        self.terms.is_empty() || self.jokers > 0
    }
}

/// One branch of the search.
///
/// Cloning is cheap:
/// the status vector is persistent and the equations share their thunks.
/// Every transition of the search produces a new value,
/// leaving the originating branch intact for backtracking.
#[derive(Clone)]
struct AcMatching {
    status: Vector<Status>,
    problems: Vec<AcProblem>,
}

struct Solver<'a> {
    sig: &'a Signature,
    arities: &'a [usize],
}

impl<'a> Solver<'a> {
    /// Components that a solution contributes to a multiset under `ident`.
    ///
    /// A solution headed by the AC symbol itself stands for
    /// several members of the multiset;
    /// a solution convertible to the neutral element stands for none.
    fn solution_components(&self, ident: &AcIdent, sol: &RTerm) -> Vec<RTerm> {
        let whnf = (**sol).clone().whnf(self.sig);
        if let Term::Appl(head, args) = &whnf {
            if args.len() == 2 && ident.heads(head) {
                return ident.force_flatten(self.sig, whnf);
            }
        }
        if let Some(neu) = ident.neutral() {
            if reduce::convertible(self.sig, whnf.clone(), (**neu).clone()) {
                return Vec::new();
            }
        }
        vec![RTerm::new(whnf)]
    }

    /// Subtract the contributions of `sol` for variable `m`
    /// from every equation mentioning `m`, and
    /// remove `m` from their member lists.
    fn propagate(&self, pb: &AcMatching, m: Miller, sol: &RTerm) -> Option<AcMatching> {
        let mut problems = Vec::new();
        for p in &pb.problems {
            if !p.vars.iter().any(|(v, _)| *v == m) {
                problems.push(p.clone());
                continue;
            }
            let mut p2 = p.clone();
            let components = self.solution_components(&p2.ident, sol);
            for (v, var) in &p.vars {
                if *v != m {
                    continue;
                }
                for c in &components {
                    let expected = occurrence(p2.depth, self.arities[m], c, var);
                    if !subtract(self.sig, &mut p2.terms, &expected) {
                        return None;
                    }
                }
            }
            p2.vars.retain(|(v, _)| *v != m);
            if p2.vars.is_empty() {
                if p2.holds_without_vars() {
                    continue;
                }
                return None;
            }
            problems.push(p2);
        }
        Some(AcMatching {
            status: pb.status.clone(),
            problems,
        })
    }

    /// Fix variable `m` to `sol` and propagate.
    fn set_unsolved(&self, pb: &AcMatching, m: Miller, sol: RTerm) -> Option<AcMatching> {
        let pb = self.propagate(pb, m, &sol)?;
        Some(AcMatching {
            status: pb.status.update(m, Status::Solved(sol)),
            problems: pb.problems,
        })
    }

    /// Open an empty multiset solution for variable `m` under `ident`.
    fn set_partly(&self, pb: &AcMatching, m: Miller, ident: &AcIdent) -> AcMatching {
        AcMatching {
            status: pb
                .status
                .update(m, Status::Partly(ident.clone(), Vec::new())),
            problems: pb.problems.clone(),
        }
    }

    /// Add one term to the multiset solution of variable `m`,
    /// subtracting it once per occurrence of `m`
    /// from every equation under the same symbol.
    /// The variable remains open: more terms may follow.
    fn add_partly(&self, pb: &AcMatching, m: Miller, sol: RTerm) -> Option<AcMatching> {
        let (ident, mut parts) = match pb.status.get(m) {
            Some(Status::Partly(ident, parts)) => (ident.clone(), parts.clone()),
            _ => unreachable!("adding to a variable that is not partly solved"),
        };
        let mut problems = Vec::new();
        for p in &pb.problems {
            if p.ident != ident || !p.vars.iter().any(|(v, _)| *v == m) {
                problems.push(p.clone());
                continue;
            }
            let mut p2 = p.clone();
            for (v, var) in &p.vars {
                if *v != m {
                    continue;
                }
                let expected = occurrence(p2.depth, self.arities[m], &sol, var);
                if !subtract(self.sig, &mut p2.terms, &expected) {
                    return None;
                }
            }
            problems.push(p2);
        }
        parts.push(sol);
        Some(AcMatching {
            status: pb.status.update(m, Status::Partly(ident, parts)),
            problems,
        })
    }

    /// Commit a partly solved variable to the combination of its terms.
    ///
    /// The combination of no terms is the neutral element, if there is one.
    /// The variable disappears from the equations under its symbol
    /// (their terms were already subtracted by [`Self::add_partly`]), and
    /// its solution is propagated into any equations under other symbols.
    fn close_partly(&self, pb: &AcMatching, m: Miller) -> Option<AcMatching> {
        let (ident, parts) = match pb.status.get(m) {
            Some(Status::Partly(ident, parts)) => (ident.clone(), parts.clone()),
            _ => unreachable!("closing a variable that is not partly solved"),
        };
        let sol = ident.unflatten(parts)?;
        let mut problems = Vec::new();
        for p in &pb.problems {
            if p.ident != ident {
                problems.push(p.clone());
                continue;
            }
            let mut p2 = p.clone();
            p2.vars.retain(|(v, _)| *v != m);
            if p2.vars.is_empty() {
                if p2.holds_without_vars() {
                    continue;
                }
                return None;
            }
            problems.push(p2);
        }
        let pb = AcMatching {
            status: pb.status.clone(),
            problems,
        };
        self.set_unsolved(&pb, m, sol)
    }

    /// Choose the member variable of `p` to be solved next.
    ///
    /// Prefer unsolved variables,
    /// then variables partly solved under the equation's own symbol
    /// (the emptier their multiset, the better).
    /// Variables partly solved under a different symbol come last;
    /// their score is just below the maximum, which
    /// determines the search order when only such variables remain.
    fn fetch_var(&self, pb: &AcMatching, p: &AcProblem) -> (Miller, MillerCtx) {
        let score = |m: Miller| match pb.status.get(m) {
            Some(Status::Unsolved) => 0,
            Some(Status::Partly(ident, parts)) if *ident == p.ident => 1 + parts.len(),
            Some(Status::Partly(_, _)) => usize::MAX - 1,
            _ => unreachable!("solved variable in an open equation"),
        };
        let mut vars = p.vars.iter();
        let mut best = vars.next().expect("nonempty member list");
        let mut best_score = score(best.0);
        for v in vars {
            let s = score(v.0);
            if s < best_score {
                best = v;
                best_score = s;
            }
        }
        (best.0, best.1.clone())
    }

    /// Order the equations from hardest to easiest:
    /// fewer variables branch less,
    /// more terms constrain more, and
    /// wildcards may absorb terms that other equations still need,
    /// so equations with wildcards come last.
    fn rearrange(problems: &mut Vec<AcProblem>) {
        use std::cmp::Reverse;
        problems.sort_by_key(|p| (p.vars.len(), Reverse(p.terms.len()), p.jokers > 0));
    }

    /// Propagate the variables already fixed by the equational pass
    /// into the AC equations.
    fn init_ac_problems(&self, pb: AcMatching) -> Option<AcMatching> {
        let mut pb = pb;
        for m in 0..self.arities.len() {
            let sol = match pb.status.get(m) {
                Some(Status::Solved(sol)) => sol.clone(),
                _ => continue,
            };
            if pb.problems.iter().any(|p| p.vars.iter().any(|(v, _)| *v == m)) {
                pb = self.propagate(&pb, m, &sol)?;
            }
        }
        Some(pb)
    }

    /// Solve the AC equations by depth-first search.
    ///
    /// Candidate terms are tried in the order in which they were matched,
    /// which makes the result deterministic.
    fn solve_next(&self, pb: &AcMatching) -> Option<Vec<LTerm>> {
        let p = match pb.problems.first() {
            None => return Some(self.substitution(pb)),
            Some(p) => p.clone(),
        };
        if p.vars.is_empty() {
            if !p.holds_without_vars() {
                return None;
            }
            let rest = AcMatching {
                status: pb.status.clone(),
                problems: pb.problems[1..].to_vec(),
            };
            return self.solve_next(&rest);
        }

        let (m, var) = self.fetch_var(pb, &p);
        match pb.status.get(m) {
            Some(Status::Unsolved) => {
                trace!("solve μ{} among {} candidates", m, p.terms.len());
                for tm in &p.terms {
                    if let Ok(sol) = force_solve(self.sig, &var, tm) {
                        if let Some(pb2) = self.set_unsolved(pb, m, sol) {
                            if let Some(subst) = self.solve_next(&pb2) {
                                return Some(subst);
                            }
                        }
                    }
                }
                // no single term covers the variable,
                // so it must be a combination of several terms
                // FIXME: this retries multisets with a single element,
                // which the loop above has already covered
                self.solve_next(&self.set_partly(pb, m, &p.ident))
            }
            Some(Status::Partly(_, _)) => {
                for tm in &p.terms {
                    if let Ok(sol) = force_solve(self.sig, &var, tm) {
                        if let Some(pb2) = self.add_partly(pb, m, sol) {
                            if let Some(subst) = self.solve_next(&pb2) {
                                return Some(subst);
                            }
                        }
                    }
                }
                // every candidate failed: the multiset is complete
                let pb2 = self.close_partly(pb, m)?;
                self.solve_next(&pb2)
            }
            _ => unreachable!("solved variable in an open equation"),
        }
    }

    /// Wrap every solution in its lambdas, in variable order.
    fn substitution(&self, pb: &AcMatching) -> Vec<LTerm> {
        pb.status
            .iter()
            .zip(self.arities)
            .map(|(status, arity)| match status {
                Status::Solved(sol) => {
                    let sol = sol.clone().add_n_lambdas(*arity);
                    let thunk: Box<dyn FnOnce() -> Term> = Box::new(move || (*sol).clone());
                    Rc::new(lazy_st::Thunk::new(thunk))
                }
                _ => unreachable!("open variable after a successful search"),
            })
            .collect()
    }
}

/// Solve one variable's equation slot.
///
/// The first equation of the slot determines the solution;
/// the remaining equations are cross-checks for nonlinear patterns:
/// at each further occurrence, the solution applied to
/// the occurrence's bound variables must be convertible
/// with the term matched there.
fn solve_slot<E>(
    sig: &Signature,
    arities: &[usize],
    m: Miller,
    eqs: &[(MillerCtx, E)],
    convert: &impl Fn(&E) -> LTerm,
) -> Option<Status> {
    let ((var, rhs), rest) = match eqs.split_first() {
        None => return Some(Status::Unsolved),
        Some(x) => x,
    };
    let sol = force_solve(sig, var, &convert(rhs)).ok()?;
    for (var2, rhs2) in rest {
        let expected = occurrence(var2.depth, arities[m], &sol, var2);
        if !reduce::convertible(sig, expected, (*convert(rhs2)).clone()) {
            return None;
        }
    }
    Some(Status::Solved(sol))
}

/// Compute the substitution for a matching problem.
///
/// The equations of every variable are solved first;
/// their solutions seed the state of the AC search.
/// The result contains one lazy term per variable,
/// wrapped in as many lambdas as the variable's arity.
/// `None` means that the problem has no solution.
pub fn solve_problem<E, A>(
    sig: &Signature,
    convert: impl Fn(&E) -> LTerm,
    convert_ac: impl Fn(&A) -> Vec<LTerm>,
    pb: &MatchingProblem<E, A>,
) -> Option<Vec<LTerm>> {
    let mut status = Vector::new();
    for (m, eqs) in pb.eq_problems.iter().enumerate() {
        status.push_back(solve_slot(sig, &pb.arities, m, eqs, &convert)?);
    }

    let solver = Solver {
        sig,
        arities: &pb.arities,
    };

    if pb.ac_problems.is_empty() {
        // purely equational problem
        return Some(solver.substitution(&AcMatching {
            status,
            problems: Vec::new(),
        }));
    }

    let problems = pb
        .ac_problems
        .iter()
        .map(|p| AcProblem {
            depth: p.depth,
            ident: p.ident.clone(),
            jokers: p.jokers,
            vars: p.vars.clone(),
            terms: convert_ac(&p.terms),
        })
        .collect();

    let mut pb = solver.init_ac_problems(AcMatching { status, problems })?;
    Solver::rearrange(&mut pb.problems);
    solver.solve_next(&pb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{AcEquation, MatchingProblem};
    use crate::reduce::tests::process;
    use crate::scope::Symbols;

    fn setup() -> (Symbols, Signature) {
        let mut syms = Symbols::new();
        let mut sig = Signature::new();
        process(
            "nat : Type.
             a : nat.
             b : nat.
             c : nat.
             e : nat.
             f : ! _ : nat -> ! _ : nat -> nat.
             g : ! _ : nat -> nat.
             ac plus : ! _ : nat -> ! _ : nat -> nat.
             acu oplus e : ! _ : nat -> ! _ : nat -> nat.",
            &mut syms,
            &mut sig,
        );
        (syms, sig)
    }

    fn sym(syms: &Symbols, s: &str) -> Term {
        Term::Symb(syms.get(s).unwrap().clone())
    }

    fn lterm(tm: Term) -> LTerm {
        Rc::new(lazy!(tm))
    }

    fn ctx0() -> MillerCtx {
        MillerCtx::new(0, Vec::new())
    }

    fn solve(sig: &Signature, pb: &MatchingProblem<LTerm, Vec<LTerm>>) -> Option<Vec<Term>> {
        let subst = solve_problem(sig, LTerm::clone, Vec::clone, pb)?;
        Some(subst.iter().map(|tm| (**tm).clone()).collect())
    }

    fn eq_problem(eqs: Vec<Vec<(MillerCtx, Term)>>) -> MatchingProblem<LTerm, Vec<LTerm>> {
        let arities = eqs
            .iter()
            .map(|eq| eq.first().map_or(0, |(var, _)| var.arity()))
            .collect();
        let eqs = eqs
            .into_iter()
            .map(|eq| eq.into_iter().map(|(var, tm)| (var, lterm(tm))).collect())
            .collect();
        MatchingProblem {
            arities,
            eq_problems: eqs,
            ac_problems: Vec::new(),
        }
    }

    fn ac_problem(
        sig: &Signature,
        syms: &Symbols,
        op: &str,
        arities: Vec<usize>,
        jokers: usize,
        vars: Vec<Miller>,
        terms: Vec<Term>,
    ) -> MatchingProblem<LTerm, Vec<LTerm>> {
        let n = arities.len();
        MatchingProblem {
            arities,
            eq_problems: vec![Vec::new(); n],
            ac_problems: vec![AcEquation {
                depth: 0,
                ident: sig.ac_ident(syms.get(op).unwrap()).unwrap(),
                jokers,
                vars: vars.into_iter().map(|m| (m, ctx0())).collect(),
                terms: terms.into_iter().map(lterm).collect(),
            }],
        }
    }

    fn bvar(n: usize) -> RTerm {
        RTerm::new(Term::BVar(n))
    }

    fn lam(tm: Term) -> Term {
        Term::Abst(Arg { id: None, ty: None }, RTerm::new(tm))
    }

    #[test]
    fn miller_solve() {
        let (syms, sig) = setup();
        // λ x. X x  ≡  λ x. f x x   gives   X = λ x. f x x
        let var = MillerCtx::new(1, vec![0]);
        let rhs = sym(&syms, "f").apply(vec![bvar(0), bvar(0)]);
        let pb = eq_problem(vec![vec![(var, rhs.clone())]]);
        let subst = solve(&sig, &pb).unwrap();
        assert_eq!(subst[0], lam(rhs));
    }

    #[test]
    fn miller_unshift() {
        let (syms, sig) = setup();
        // λ x. X  ≡  λ x. a   gives   X = a
        let var = MillerCtx::new(1, Vec::new());
        let pb = eq_problem(vec![vec![(var, sym(&syms, "a"))]]);
        assert_eq!(solve(&sig, &pb).unwrap()[0], sym(&syms, "a"));
    }

    #[test]
    fn miller_uncaptured() {
        let (syms, sig) = setup();
        // λ x. X  ≡  λ x. g x   has no solution: X cannot capture x
        let var = MillerCtx::new(1, Vec::new());
        let rhs = sym(&syms, "g").apply(vec![bvar(0)]);
        let pb = eq_problem(vec![vec![(var, rhs)]]);
        assert!(solve(&sig, &pb).is_none());
    }

    #[test]
    fn nonlinear_eq() {
        let (syms, sig) = setup();
        let eqs = vec![vec![
            (ctx0(), sym(&syms, "a")),
            (ctx0(), sym(&syms, "a")),
        ]];
        assert_eq!(solve(&sig, &eq_problem(eqs)).unwrap()[0], sym(&syms, "a"));

        let eqs = vec![vec![
            (ctx0(), sym(&syms, "a")),
            (ctx0(), sym(&syms, "b")),
        ]];
        assert!(solve(&sig, &eq_problem(eqs)).is_none());
    }

    #[test]
    fn ac_two_variables() {
        let (syms, sig) = setup();
        // X + Y  ≡  a + b
        let terms = vec![sym(&syms, "a"), sym(&syms, "b")];
        let pb = ac_problem(&sig, &syms, "plus", vec![0, 0], 0, vec![0, 1], terms);
        let subst = solve(&sig, &pb).unwrap();
        assert_eq!(subst, vec![sym(&syms, "a"), sym(&syms, "b")]);

        // permuting the matched terms selects the other solution
        let terms = vec![sym(&syms, "b"), sym(&syms, "a")];
        let pb = ac_problem(&sig, &syms, "plus", vec![0, 0], 0, vec![0, 1], terms);
        let subst = solve(&sig, &pb).unwrap();
        assert_eq!(subst, vec![sym(&syms, "b"), sym(&syms, "a")]);
    }

    #[test]
    fn ac_joker_absorbs() {
        let (syms, sig) = setup();
        // X + _  ≡  a + b + c
        let terms = vec![sym(&syms, "a"), sym(&syms, "b"), sym(&syms, "c")];
        let pb = ac_problem(&sig, &syms, "plus", vec![0], 1, vec![0], terms);
        assert_eq!(solve(&sig, &pb).unwrap(), vec![sym(&syms, "a")]);
    }

    #[test]
    fn acu_neutral_solution() {
        let (syms, sig) = setup();
        // X ⊕ Y  ≡  a   gives   X = a, Y = e
        let terms = vec![sym(&syms, "a")];
        let pb = ac_problem(&sig, &syms, "oplus", vec![0, 0], 0, vec![0, 1], terms);
        let subst = solve(&sig, &pb).unwrap();
        assert_eq!(subst, vec![sym(&syms, "a"), sym(&syms, "e")]);
    }

    #[test]
    fn ac_partly_solved() {
        let (syms, sig) = setup();
        // X + X + Y  ≡  a + a + b + b + c
        let names = ["a", "a", "b", "b", "c"];
        let terms: Vec<_> = names.iter().map(|s| sym(&syms, s)).collect();
        let pb = ac_problem(&sig, &syms, "plus", vec![0, 0], 0, vec![0, 0, 1], terms.clone());
        let subst = solve(&sig, &pb).unwrap();

        // substituting the solution back yields the matched multiset
        let ident = sig.ac_ident(syms.get("plus").unwrap()).unwrap();
        let members = vec![subst[0].clone(), subst[0].clone(), subst[1].clone()];
        let lhs = ident.unflatten(members.into_iter().map(RTerm::new).collect());
        let rhs = ident.unflatten(terms.into_iter().map(RTerm::new).collect());
        let (lhs, rhs) = (lhs.unwrap(), rhs.unwrap());
        assert!(reduce::convertible(&sig, (*lhs).clone(), (*rhs).clone()));
    }

    #[test]
    fn ac_unsolvable() {
        let (syms, sig) = setup();
        // X + X  ≡  a + b
        let terms = vec![sym(&syms, "a"), sym(&syms, "b")];
        let pb = ac_problem(&sig, &syms, "plus", vec![0], 0, vec![0, 0], terms);
        assert!(solve(&sig, &pb).is_none());
    }

    #[test]
    fn ac_under_binder() {
        let (syms, sig) = setup();
        // λ x. X + Y x  ≡  λ x. a + g x
        let gx = sym(&syms, "g").apply(vec![bvar(0)]);
        let terms = vec![sym(&syms, "a"), gx.clone()];
        let pb = MatchingProblem {
            arities: vec![0, 1],
            eq_problems: vec![Vec::new(), Vec::new()],
            ac_problems: vec![AcEquation {
                depth: 1,
                ident: sig.ac_ident(syms.get("plus").unwrap()).unwrap(),
                jokers: 0,
                vars: vec![
                    (0, MillerCtx::new(1, Vec::new())),
                    (1, MillerCtx::new(1, vec![0])),
                ],
                terms: terms.into_iter().map(lterm).collect(),
            }],
        };
        let subst = solve(&sig, &pb).unwrap();
        assert_eq!(subst[0], sym(&syms, "a"));
        assert_eq!(subst[1], lam(gx));
    }

    #[test]
    fn eq_seeds_ac() {
        let (syms, sig) = setup();
        // f X (X + Y)  ≡  f a (a + b)
        let ident = sig.ac_ident(syms.get("plus").unwrap()).unwrap();
        let ac = |eq_tm: Term| MatchingProblem {
            arities: vec![0, 0],
            eq_problems: vec![vec![(ctx0(), lterm(eq_tm))], Vec::new()],
            ac_problems: vec![AcEquation {
                depth: 0,
                ident: ident.clone(),
                jokers: 0,
                vars: vec![(0, ctx0()), (1, ctx0())],
                terms: vec![lterm(sym(&syms, "a")), lterm(sym(&syms, "b"))],
            }],
        };
        let subst = solve(&sig, &ac(sym(&syms, "a"))).unwrap();
        assert_eq!(subst, vec![sym(&syms, "a"), sym(&syms, "b")]);

        // the equational solution contradicts the AC equation
        assert!(solve(&sig, &ac(sym(&syms, "c"))).is_none());
    }
}
