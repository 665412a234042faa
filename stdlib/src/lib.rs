#![allow(non_snake_case)]

//! Standard-library extensions. Each module installs its bindings with
//! `register`; calling it again just rebinds the same names.

#[macro_use]
extern crate shared;

#[macro_use]
extern crate lisp;

pub mod builtin_list;
pub mod builtin_reflect;
pub mod builtin_str;
mod utils;

use lisp::environment::Environment;

pub fn registerAll(env: &Environment)
{
    builtin_list::register(env);
    builtin_reflect::register(env);
    builtin_str::register(env);
}
