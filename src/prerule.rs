//! Unscoped rewrite rules.

use crate::preterm::Preterm;

#[derive(Clone)]
pub struct Prerule {
    /// variables bound by the rule
    pub ctx: Vec<String>,
    /// left-hand side (pattern to match with)
    pub lhs: Preterm,
    /// right-hand side (term to replace with)
    pub rhs: Preterm,
}
