//! A typechecker for the lambda-Pi calculus modulo AC rewriting.

extern crate pretty_env_logger;

use byte_unit::{Byte, ByteError};
use kongruo::command::Command;
use kongruo::scope::{self, Symbols};
use kongruo::signature::{self, Signature};
use kongruo::{parse, parsebuffer, typing};
use nom::error::VerboseError;
use std::convert::TryInto;
use std::path::PathBuf;
use std::{fmt, io};
use structopt::StructOpt;

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Parse(String),
    Scope(scope::Error),
    Type(typing::Error),
    Signature(signature::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(err) => err.fmt(f),
            Self::Parse(err) => err.fmt(f),
            Self::Scope(err) => err.fmt(f),
            Self::Type(err) => err.fmt(f),
            Self::Signature(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<scope::Error> for CliError {
    fn from(err: scope::Error) -> Self {
        Self::Scope(err)
    }
}

impl From<typing::Error> for CliError {
    fn from(err: typing::Error) -> Self {
        Self::Type(err)
    }
}

impl From<signature::Error> for CliError {
    fn from(err: signature::Error) -> Self {
        Self::Signature(err)
    }
}

#[derive(Debug)]
struct MyByteError(ByteError);

impl ToString for MyByteError {
    fn to_string(&self) -> String {
        match &self.0 {
            ByteError::ValueIncorrect(s) => "Incorrect byte value: ".to_owned() + &s.clone(),
            ByteError::UnitIncorrect(s) => "Incorrect byte unit: ".to_owned() + &s.clone(),
        }
    }
}

fn parse_byte<S: AsRef<str>>(s: S) -> Result<Byte, MyByteError> {
    Byte::from_str(s).map_err(MyByteError)
}

#[derive(Debug, StructOpt)]
/// A typechecker for the lambda-Pi calculus modulo AC rewriting
struct Opt {
    /// Reduce terms modulo eta
    #[structopt(long)]
    eta: bool,

    /// Only parse, neither scope nor typecheck
    #[structopt(long)]
    no_scope: bool,

    /// Only parse and scope, do not typecheck
    #[structopt(long)]
    no_check: bool,

    /// Size of the parse buffer
    #[structopt(long, default_value = "64MB", parse(try_from_str = parse_byte))]
    buffer: Byte,

    /// Files to process (cumulative)
    #[structopt(name = "FILE")]
    files: Vec<PathBuf>,
}

fn handle(cmd: Command, sig: &mut Signature) -> Result<(), CliError> {
    match cmd {
        Command::Intro(sym, it) => {
            println!("{}", sym);
            let entry = signature::Entry::new(it, &*sig)?.check(&*sig)?;
            let info = signature::SymInfo::new(&sym, entry);
            sig.insert(sym, info)?;
            Ok(())
        }
        Command::Rule(rule) => Ok(sig.add_rule(rule)?),
    }
}

fn run<R>(read: R, opt: &Opt, syms: &mut Symbols, sig: &mut Signature) -> Result<(), CliError>
where
    R: io::Read,
{
    let pb = parsebuffer::ParseBuffer {
        buf: circular::Buffer::with_capacity(opt.buffer.get_bytes().try_into().unwrap()),
        read,
        parse: parse::parse_toplevel,
        fail: |e: nom::Err<VerboseError<&[u8]>>| format!("{:#?}", e),
    };

    for entry in pb {
        let cmd = entry.map_err(CliError::Parse)?;
        if let Some(cmd) = cmd {
            if opt.no_scope {
                continue;
            }
            let cmd = cmd.scope(syms)?;
            if opt.no_check {
                continue;
            }
            handle(cmd, sig)?;
        }
    }
    Ok(())
}

fn main() -> Result<(), CliError> {
    pretty_env_logger::init();

    let opt = Opt::from_args();

    let mut syms: Symbols = Default::default();
    let mut sig: Signature = Default::default();
    sig.eta = opt.eta;

    if opt.files.is_empty() {
        run(io::stdin(), &opt, &mut syms, &mut sig)?;
    } else {
        for filename in &opt.files {
            let file = std::fs::File::open(filename)?;
            run(file, &opt, &mut syms, &mut sig)?;
        }
    }
    Ok(())
}
