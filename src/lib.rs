//! Type checking for the lambda-Pi calculus modulo AC rewriting.
//!
//! Rewrite rules may match modulo associativity and commutativity:
//! a symbol declared with `ac` (or `acu`, with a neutral element)
//! is treated as a multiset constructor, and
//! left-hand sides of rewrite rules may be higher-order patterns in the sense of Miller.
//! The heart of the library is the [`matching`] module, which
//! computes substitutions for such left-hand sides.

extern crate circular;
extern crate lazy_st;
extern crate nom;
#[macro_use]
extern crate log;

pub mod ac;
pub mod command;
pub mod matching;
pub mod parse;
pub mod parsebuffer;
pub mod pattern;
pub mod precommand;
pub mod prepattern;
pub mod prerule;
pub mod preterm;
pub mod problem;
pub mod reduce;
pub mod rule;
pub mod scope;
pub mod signature;
pub mod stack;
pub mod subst;
pub mod symbol;
pub mod term;
pub mod typing;

mod fmt;
