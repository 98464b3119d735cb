//! Unscoped signature-changing commands.

use crate::prerule::Prerule;
use crate::preterm::{BPreterm, Prearg};

#[derive(Clone)]
pub enum Precommand {
    /// Introduce a new name
    DCmd(String, Vec<Prearg>, PreDCommand),
    /// Add a rewrite rule
    Rule(Prerule),
}

pub type PreDCommand = GDCommand<BPreterm, BPreterm>;

#[derive(Clone)]
pub enum GDCommand<Ty, Tm> {
    Definition(Option<Ty>, Option<Tm>),
    Theorem(Ty, Tm),
    Declaration(Ty),
    /// Declaration of an associative-commutative symbol,
    /// optionally with a neutral element.
    AcDeclaration(Option<Tm>, Ty),
}

impl<Ty, Tm> GDCommand<Ty, Tm> {
    pub fn map_type<F, U>(self, f: F) -> GDCommand<U, Tm>
    where
        F: FnOnce(Ty) -> U,
    {
        match self {
            Self::Definition(ty, tm) => GDCommand::Definition(ty.map(f), tm),
            Self::Theorem(ty, tm) => GDCommand::Theorem(f(ty), tm),
            Self::Declaration(ty) => GDCommand::Declaration(f(ty)),
            Self::AcDeclaration(neu, ty) => GDCommand::AcDeclaration(neu, f(ty)),
        }
    }

    pub fn map_type_err<F, U, E>(self, f: F) -> Result<GDCommand<U, Tm>, E>
    where
        F: FnOnce(Ty) -> Result<U, E>,
    {
        match self {
            Self::Definition(ty, tm) => Ok(GDCommand::Definition(ty.map(f).transpose()?, tm)),
            Self::Theorem(ty, tm) => Ok(GDCommand::Theorem(f(ty)?, tm)),
            Self::Declaration(ty) => Ok(GDCommand::Declaration(f(ty)?)),
            Self::AcDeclaration(neu, ty) => Ok(GDCommand::AcDeclaration(neu, f(ty)?)),
        }
    }

    pub fn map_term_err<F, U, E>(self, f: F) -> Result<GDCommand<Ty, U>, E>
    where
        F: FnOnce(Tm) -> Result<U, E>,
    {
        match self {
            Self::Definition(ty, tm) => Ok(GDCommand::Definition(ty, tm.map(f).transpose()?)),
            Self::Theorem(ty, tm) => Ok(GDCommand::Theorem(ty, f(tm)?)),
            Self::Declaration(ty) => Ok(GDCommand::Declaration(ty)),
            Self::AcDeclaration(neu, ty) => {
                Ok(GDCommand::AcDeclaration(neu.map(f).transpose()?, ty))
            }
        }
    }
}

impl PreDCommand {
    /// Move the parameters of a command into its types and terms.
    pub fn parametrise(self, args: Vec<Prearg>) -> Self {
        self.map_type(|ty| Box::new(ty.prods(args.clone())))
            .map_term(|tm| Box::new(tm.absts(args)))
    }

    pub fn map_term<F>(self, f: F) -> Self
    where
        F: FnOnce(BPreterm) -> BPreterm,
    {
        match self {
            Self::Definition(ty, tm) => Self::Definition(ty, tm.map(f)),
            Self::Theorem(ty, tm) => Self::Theorem(ty, f(tm)),
            Self::Declaration(ty) => Self::Declaration(ty),
            Self::AcDeclaration(neu, ty) => Self::AcDeclaration(neu.map(f), ty),
        }
    }
}
