#![allow(non_snake_case)]

#[macro_use]
extern crate shared;

mod repl;

use std::fs;
use std::io::{self, Read};
use std::process;

use clap;
use tracing_subscriber::EnvFilter;

use shared::error::Error;

use lisp::eval::Evaluator;
use lisp::parser::SyntaxTreeNode;
use lisp::user_utils::{self, Extension};

const LOG_VAR: &str = "DANLISP_LOG";

fn readStdin() -> Result<String, Error>
{
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(
        |_| error!(RuntimeError, "Failed to read stdin."))?;
    Ok(buffer)
}

fn readSource(filename: &str) -> Result<String, Error>
{
    if filename == "-"
    {
        readStdin()
    }
    else
    {
        fs::read_to_string(filename)
            .map_err(|e| rterr!("Failed to load file {}: {}", filename, e))
    }
}

fn initLogging()
{
    let filter = EnvFilter::try_from_env(LOG_VAR)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn getEval(extra_libs: &[&str], with_stdlib: bool) -> Result<Evaluator, Error>
{
    let extensions: Vec<Extension> = if with_stdlib
    {
        vec![stdlib::registerAll as Extension]
    }
    else
    {
        Vec::new()
    };
    user_utils::getEval(&extensions, extra_libs)
}

fn printDot(filename: &str) -> Result<(), Error>
{
    let src = readSource(filename)?;
    let roots = lisp::parse(lisp::tokenize(&src)?)?;
    println!("{}", SyntaxTreeNode::toDot(&roots));
    Ok(())
}

fn run() -> Result<(), Error>
{
    let opts = clap::App::new("danlisp")
        .version("0.1")
        .about("A small parenthesized-language interpreter")
        .arg(clap::Arg::with_name("FILE")
             .help("Source file to run; `-` reads stdin. Starts a REPL if not issued.")
             .required(false))
        .arg(clap::Arg::with_name("Lib")
             .long("lib")
             .short("l")
             .takes_value(true)
             .multiple(true)
             .number_of_values(1)
             .help("Evaluate this file before FILE or the REPL. Repeatable."))
        .arg(clap::Arg::with_name("ListEnv")
             .long("inspect-env")
             .help("List names in the default environment and exit."))
        .arg(clap::Arg::with_name("Dot")
             .long("dot")
             .requires("FILE")
             .help("Print the syntax tree of FILE as a Graphviz graph instead of running it."))
        .arg(clap::Arg::with_name("NoStdlib")
             .long("no-stdlib")
             .help("Do not register the standard library."))
        .get_matches();

    let libs: Vec<&str> = opts.values_of("Lib").map(|v| v.collect())
        .unwrap_or_else(Vec::new);
    let with_stdlib = !opts.is_present("NoStdlib");

    if opts.is_present("ListEnv")
    {
        let e = getEval(&libs, with_stdlib)?;
        let mut names = e.env().members();
        names.sort();
        for name in names
        {
            println!("{}", name);
        }
        return Ok(())
    }

    if let Some(filename) = opts.value_of("FILE")
    {
        if opts.is_present("Dot")
        {
            return printDot(filename);
        }

        let e = getEval(&libs, with_stdlib)?;
        tracing::debug!(file = filename, "running");
        if filename == "-"
        {
            user_utils::runSource(&e, &readStdin()?)?;
        }
        else
        {
            user_utils::runFile(&e, filename)?;
        }
        Ok(())
    }
    else
    {
        let e = getEval(&libs, with_stdlib)?;
        repl::run(&e)
    }
}

fn main()
{
    initLogging();
    if let Err(e) = run()
    {
        eprintln!("{}", e);
        process::exit(1);
    }
}
