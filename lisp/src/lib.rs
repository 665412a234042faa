#![allow(non_snake_case)]

//! Lexer, parser and tree-walking evaluator for a small parenthesized
//! language with numbers, strings, booleans, nil, cons cells and
//! callables.
//!
//! The pipeline is `tokenize` → `parse` → `interpret`. All bindings live
//! in one flat [`Environment`]. It is single-threaded: an environment
//! cannot be sent to or shared with another thread.

#[macro_use]
extern crate shared;

pub mod tokenizer;
pub mod parser;
pub mod value;
pub mod environment;
pub mod eval;
pub mod builtin;
pub mod runtime_env;
pub mod user_utils;

use shared::error::Error;

pub use crate::environment::Environment;
pub use crate::eval::{Evaluator, EvalResult};
pub use crate::parser::SyntaxTreeNode;
pub use crate::tokenizer::Token;
pub use crate::value::Value;

pub fn tokenize(src: &str) -> Result<Vec<Token>, Error>
{
    tokenizer::tokenize(src)
}

pub fn parse(tokens: Vec<Token>) -> Result<Vec<SyntaxTreeNode>, Error>
{
    SyntaxTreeNode::parse(tokens)
}

/// Evaluate `exprs` left to right against `env` and return the last
/// value (nil for no forms).
pub fn interpret(exprs: &[SyntaxTreeNode], env: &Environment) -> EvalResult
{
    Evaluator::withEnv(env.clone()).eval(exprs)
}
