//! Reduction to weak head normal form (WHNF), including rewriting.

use crate::ac::AcIdent;
use crate::signature::Signature;
use crate::stack;
use crate::term::{Arg, RTerm, Term};
use lazy_st::{lazy, Lazy};
use std::rc::Rc;

/// A shared lazy term.
pub type LTerm = Rc<Lazy<Term>>;

/// Map from de Bruijn indices in the term of the abstract machine to lazy terms.
pub type Context = stack::Stack<LTerm>;

/// Arguments to the abstract machine term.
pub type Stack = stack::Stack<LTerm>;

/// An abstract machine representing arguments applied to a substituted term.
///
/// This representation allows for the lazy evaluation of terms.
///
/// See section 5.1 of the following reference:
/// Asperti, A.; Ricciotti, W.; Sacerdoti Coen, C.; Tassi, E. (2009).
/// "A compact kernel for the calculus of inductive constructions".
/// *Sadhana*. **34**: 71–144.
/// doi: [10.1007/s12046-009-0003-3](https://doi.org/10.1007%2Fs12046-009-0003-3).
pub struct State {
    pub ctx: Context,
    pub term: Term,
    pub stack: Stack,
}

impl State {
    /// Construct a new state from a term.
    ///
    /// This does not yet evaluate anything.
    pub fn new(term: Term) -> Self {
        Self {
            ctx: Context::new(),
            term,
            stack: Stack::new(),
        }
    }

    /// Evaluate the state to its weak head normal form.
    pub fn whnf(self, sig: &Signature) -> Self {
        use Term::*;
        let Self {
            mut ctx,
            mut term,
            mut stack,
        } = self;
        loop {
            trace!("whnf: {}", term);
            match term {
                Type | Kind | Prod(_, _) => break,
                BVar(x) => match ctx.get(x) {
                    Some(ctm) => {
                        term = (**ctm).clone();
                        ctx.clear()
                    }
                    None => {
                        if !ctx.is_empty() {
                            term = BVar(x - ctx.len());
                            ctx.clear();
                        }
                        break;
                    }
                },
                Abst(a, t) => match stack.pop() {
                    None => {
                        term = Abst(a, t);
                        break;
                    }
                    Some(p) => {
                        term = (*t).clone();
                        ctx.push(p);
                    }
                },
                Appl(head, tail) => {
                    for t in tail.into_iter().rev() {
                        let st = State {
                            ctx: ctx.clone(),
                            term: (*t).clone(),
                            stack: Stack::new(),
                        };
                        stack.push(Rc::new(lazy!(Term::from(st))));
                    }
                    term = (*head).clone();
                }
                Symb(s) => {
                    let rules = sig.get(&s).map(|info| info.rules.iter());
                    let rewrite = rules
                        .and_then(|mut rs| rs.find_map(|r| Some((r.matches(&stack, sig)?, r))));
                    match rewrite {
                        None => {
                            term = Symb(s);
                            break;
                        }
                        Some((subst, rule)) => {
                            trace!("rewrite: {} ... ⟶ {}", s, rule);
                            ctx = subst;
                            term = (*rule.rhs).clone();
                            stack.pop_many(rule.args_len);
                        }
                    }
                }
            }
        }
        Self { ctx, term, stack }
    }
}

impl From<State> for Term {
    fn from(st: State) -> Self {
        let term = if st.ctx.is_empty() {
            st.term
        } else {
            st.term.psubst(&st.ctx)
        };
        let args = st.stack.into_iter().map(|la| RTerm::new((*la).clone()));
        term.apply(args.collect())
    }
}

impl Term {
    fn psubst(self, args: &Context) -> Self {
        self.apply_subst(&psubst(args), 0)
    }

    /// Return the weak head normal form of the term.
    pub fn whnf(self, sig: &Signature) -> Self {
        trace!("whnf of {}", self);
        Term::from(State::new(self).whnf(sig))
    }

    /// Return the strong normal form of the term.
    pub fn snf(self, sig: &Signature) -> Self {
        match self.whnf(sig) {
            Self::Appl(head, args) => {
                let args = args.into_iter().map(|a| a.snf(sig)).collect();
                Self::Appl(head.snf(sig), args)
            }
            Self::Abst(arg, tm) => Self::Abst(arg.map_ty(|ty| ty.snf(sig)), tm.snf(sig)),
            Self::Prod(arg, tm) => Self::Prod(arg.map_ty(|ty| ty.snf(sig)), tm.snf(sig)),
            t => t,
        }
    }
}

impl RTerm {
    pub fn snf(self, sig: &Signature) -> Self {
        Self::new((*self).clone().snf(sig))
    }
}

fn psubst<'c>(args: &'c Context) -> impl Fn(usize, usize) -> Term + 'c {
    move |n: usize, k: usize| match args.get(n - k) {
        Some(arg) => (**arg).clone() << k,
        None => Term::BVar(n - args.len()),
    }
}

/// AC identifier of the head symbol of a binary application.
fn ac_head(sig: &Signature, t: &Term) -> Option<AcIdent> {
    match t {
        Term::Appl(head, args) if args.len() == 2 => match &**head {
            Term::Symb(s) => sig.ac_ident(s),
            _ => None,
        },
        _ => None,
    }
}

/// Return true if the given two terms are potentially convertible, and if so,
/// add convertibility constraints that have to be fulfilled.
fn conversion_step(sig: &Signature, cn: (Term, Term), cns: &mut Vec<(Term, Term)>) -> bool {
    use Term::*;

    // applications of an AC symbol are equal iff
    // their flattened components are equal as multisets
    if let Some(ident) = ac_head(sig, &cn.0).or_else(|| ac_head(sig, &cn.1)) {
        let comps1 = ident.force_flatten(sig, cn.0);
        let comps2 = ident.force_flatten(sig, cn.1);
        return ac_eq(sig, comps1, comps2);
    }

    match cn {
        (Kind, Kind) | (Type, Type) => true,
        (Symb(s1), Symb(s2)) => s1 == s2,
        (BVar(v1), BVar(v2)) => v1 == v2,
        (Abst(_, t1), Abst(_, t2)) => {
            cns.push(((*t1).clone(), (*t2).clone()));
            true
        }
        (Prod(Arg { ty: Some(ty1), .. }, tm1), Prod(Arg { ty: Some(ty2), .. }, tm2)) => {
            cns.push(((*ty1).clone(), (*ty2).clone()));
            cns.push(((*tm1).clone(), (*tm2).clone()));
            true
        }
        (a, Abst(_, b)) | (Abst(_, b), a) if sig.eta => {
            cns.push(((*b).clone(), (a << 1).apply(vec![RTerm::new(BVar(0))])));
            true
        }
        (Appl(f1, args1), Appl(f2, args2)) => {
            if args1.len() == args2.len() {
                cns.push(((*f1).clone(), (*f2).clone()));
                let args2 = args2.into_iter().map(|a| (*a).clone());
                cns.extend(args1.into_iter().map(|a| (*a).clone()).zip(args2));
                true
            } else {
                false
            }
        }
        _ => false,
    }
}

/// Multiset equality of AC components up to convertibility.
fn ac_eq(sig: &Signature, mut ls: Vec<RTerm>, rs: Vec<RTerm>) -> bool {
    if ls.len() != rs.len() {
        return false;
    }
    match ls.pop() {
        None => true,
        Some(l) => (0..rs.len()).any(|i| {
            if convertible(sig, (*l).clone(), (*rs[i]).clone()) {
                let mut rs = rs.clone();
                rs.remove(i);
                ac_eq(sig, ls.clone(), rs)
            } else {
                false
            }
        }),
    }
}

/// Return true if the given terms have a common redex.
pub fn convertible(sig: &Signature, tm1: Term, tm2: Term) -> bool {
    let mut cns = vec![(tm1, tm2)];
    loop {
        match cns.pop() {
            Some((tm1, tm2)) => {
                trace!("convertible: {} ~? {}", tm1, tm2);
                if tm1 != tm2 {
                    let cn = (tm1.whnf(sig), tm2.whnf(sig));
                    if !conversion_step(sig, cn, &mut cns) {
                        break false;
                    }
                }
            }
            None => break true,
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::command::Command;
    use crate::parse;
    use crate::precommand::Precommand;
    use crate::scope::Symbols;
    use crate::signature::{Entry, SymInfo};

    pub fn parse_all(mut i: &[u8]) -> Vec<Precommand> {
        let mut cmds = Vec::new();
        loop {
            match parse::parse_toplevel(i) {
                Ok((rest, cmd)) => {
                    if let Some(c) = cmd {
                        cmds.push(c);
                    }
                    if rest.is_empty() {
                        break;
                    }
                    i = rest;
                }
                Err(_) => break,
            }
        }
        cmds
    }

    /// Parse, scope and check a sequence of commands.
    pub fn process(cmds: &str, syms: &mut Symbols, sig: &mut Signature) {
        for cmd in parse_all(cmds.as_bytes()) {
            match cmd.scope(syms).unwrap() {
                Command::Intro(sym, it) => {
                    let entry = Entry::new(it, sig).unwrap().check(sig).unwrap();
                    sig.insert(sym.clone(), SymInfo::new(&sym, entry)).unwrap();
                }
                Command::Rule(rule) => sig.add_rule(rule).unwrap(),
            }
        }
    }

    pub fn term(s: &str, syms: &Symbols) -> Term {
        let mut cmds = parse_all(format!("def test_term := {}.", s).as_bytes());
        assert_eq!(cmds.len(), 1);
        match cmds.remove(0) {
            Precommand::DCmd(_, _, crate::precommand::GDCommand::Definition(_, Some(tm))) => {
                tm.scope_closed(syms).unwrap()
            }
            _ => panic!("not a term"),
        }
    }

    const NAT: &str = "
        nat : Type.
        z : nat.
        s : ! _ : nat -> nat.
        a : nat.
        b : nat.
        c : nat.
    ";

    #[test]
    fn beta_whnf() {
        let mut syms = Symbols::new();
        let mut sig = Signature::new();
        process(NAT, &mut syms, &mut sig);
        let tm = term(r"(\ x : nat => s x) a", &syms);
        assert_eq!(tm.whnf(&sig), term("s a", &syms));
    }

    #[test]
    fn rewrite_definition() {
        let mut syms = Symbols::new();
        let mut sig = Signature::new();
        process(NAT, &mut syms, &mut sig);
        process("def two : nat := s (s z).", &mut syms, &mut sig);
        assert_eq!(term("two", &syms).whnf(&sig), term("s (s z)", &syms));
    }

    #[test]
    fn rewrite_higher_order() {
        let mut syms = Symbols::new();
        let mut sig = Signature::new();
        process(NAT, &mut syms, &mut sig);
        process(
            "def diff : ! _ : (! _ : nat -> nat) -> ! _ : nat -> nat.
             [F] diff (\\ x => F x) --> F.",
            &mut syms,
            &mut sig,
        );
        let tm = term(r"diff (\ x => s x) a", &syms);
        assert_eq!(tm.whnf(&sig), term("s a", &syms));
    }

    const AC: &str = "
        ac plus : ! _ : nat -> ! _ : nat -> nat.
        [X] plus X X --> X.
    ";

    #[test]
    fn ac_convertible() {
        let mut syms = Symbols::new();
        let mut sig = Signature::new();
        process(NAT, &mut syms, &mut sig);
        process("ac plus : ! _ : nat -> ! _ : nat -> nat.", &mut syms, &mut sig);
        let tm1 = term("plus a (plus b c)", &syms);
        let tm2 = term("plus (plus c a) b", &syms);
        assert!(convertible(&sig, tm1, tm2));
        let tm1 = term("plus a b", &syms);
        let tm2 = term("plus a c", &syms);
        assert!(!convertible(&sig, tm1, tm2));
    }

    #[test]
    fn ac_rewrite() {
        let mut syms = Symbols::new();
        let mut sig = Signature::new();
        process(NAT, &mut syms, &mut sig);
        process(AC, &mut syms, &mut sig);
        // idempotence fires modulo AC
        assert_eq!(term("plus a a", &syms).whnf(&sig), term("a", &syms));
        // nested occurrence of the AC symbol
        let tm = term("plus a (plus b (plus a b))", &syms);
        let nf = tm.snf(&sig);
        assert!(convertible(&sig, nf, term("plus a b", &syms)));
        // no match: the two summands differ
        let tm = term("plus a b", &syms);
        assert_eq!(tm.clone().whnf(&sig), tm);
    }

    #[test]
    fn acu_rewrite() {
        let mut syms = Symbols::new();
        let mut sig = Signature::new();
        process(NAT, &mut syms, &mut sig);
        process(
            "e : nat.
             acu union e : ! _ : nat -> ! _ : nat -> nat.
             [X] union X X --> X.",
            &mut syms,
            &mut sig,
        );
        // the neutral element is invisible to matching
        assert!(convertible(
            &sig,
            term("union a e", &syms),
            term("a", &syms)
        ));
        assert_eq!(term("union a a", &syms).whnf(&sig), term("a", &syms));
        // union a e  does not match  union X X
        let tm = term("union a e", &syms);
        assert_eq!(tm.clone().whnf(&sig), tm);
    }
}
