use criterion::{criterion_group, criterion_main, Criterion};
use kongruo::command::Command;
use kongruo::parse;
use kongruo::precommand::Precommand;
use kongruo::scope::Symbols;
use kongruo::signature::{Entry, Signature, SymInfo};

// Typechecking the last theorem triggers AC matching:
// `prf (and p p)` and `prf p` are only convertible
// because idempotence rewrites `and p p` to `p`.
const CMDS: &str = "
    prop : Type.
    prf : ! _ : prop -> Type.
    p : prop.
    q : prop.
    ac and : ! _ : prop -> ! _ : prop -> prop.
    [X] and X X --> X.
    h : prf (and (and p q) (and q p)).
    thm t : prf (and p q) := h.
";

fn parse_all(mut i: &[u8]) -> Vec<Precommand> {
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

fn check(cmds: Vec<Precommand>) {
    let mut syms = Symbols::new();
    let mut sig = Signature::new();
    for cmd in cmds {
        match cmd.scope(&mut syms).unwrap() {
            Command::Intro(sym, it) => {
                let entry = Entry::new(it, &sig).unwrap().check(&sig).unwrap();
                sig.insert(sym.clone(), SymInfo::new(&sym, entry)).unwrap();
            }
            Command::Rule(rule) => sig.add_rule(rule).unwrap(),
        }
    }
}

fn bench_check(c: &mut Criterion) {
    c.bench_function("check ac", |b| b.iter(|| check(parse_all(CMDS.as_bytes()))));
}

criterion_group!(benches, bench_check);
criterion_main!(benches);
