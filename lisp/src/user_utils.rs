use std::fs;

use shared::error::Error;

use crate::environment::Environment;
use crate::eval::{Evaluator, EvalResult};
use crate::runtime_env::findPrelude;

/// Installs extra bindings into an environment, e.g. a standard-library
/// module’s `register`.
pub type Extension = fn(&Environment);

/// Evaluate each file into the evaluator’s environment, in order.
pub fn loadLibs(eval: &Evaluator, lib_files: &[&str]) -> Result<(), Error>
{
    for f in lib_files
    {
        tracing::info!(file = *f, "loading library");
        let lib_src = fs::read_to_string(f)
            .map_err(|e| rterr!("Failed to load file {}: {}", f, e))?;
        eval.evalSource(&lib_src)?;
    }
    Ok(())
}

/// Evaluate the configured prelude, if any.
pub fn loadPrelude(eval: &Evaluator) -> Result<(), Error>
{
    if let Some(path) = findPrelude()
    {
        loadLibs(eval, &[path.as_str()])?;
    }
    Ok(())
}

/// A builtin-seeded evaluator with `extensions` registered, then the
/// prelude and `lib_files` loaded.
pub fn getEval(extensions: &[Extension], lib_files: &[&str]) -> Result<Evaluator, Error>
{
    let eval = Evaluator::new();
    for register in extensions
    {
        register(&eval.env());
    }
    loadPrelude(&eval)?;
    loadLibs(&eval, lib_files)?;
    Ok(eval)
}

pub fn runSource(eval: &Evaluator, src: &str) -> EvalResult
{
    eval.evalSource(src)
}

pub fn runFile(eval: &Evaluator, filename: &str) -> EvalResult
{
    let src = fs::read_to_string(filename)
        .map_err(|e| rterr!("Failed to load file {}: {}", filename, e))?;
    runSource(eval, &src)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use std::io::Write;
    use crate::runtime_env::ENV_LOCK;
    use crate::value::Value;

    fn tempSource(name: &str, src: &str) -> std::path::PathBuf
    {
        let path = std::env::temp_dir().join(
            format!("lisp-{}-{}.dl", std::process::id(), name));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(src.as_bytes()).unwrap();
        path
    }

    #[test]
    fn load_libs_into_environment() -> Result<(), Error>
    {
        let lib = tempSource("lib", "(defn double (x) (* x 2))");
        let lib_str = lib.to_str().unwrap();
        let e = Evaluator::new();
        loadLibs(&e, &[lib_str])?;
        assert_eq!(runSource(&e, "(double 21)")?, Value::Number(42.0));
        fs::remove_file(lib).unwrap();
        Ok(())
    }

    fn registerAnswer(env: &Environment)
    {
        env.define("answer", Value::Number(42.0));
    }

    #[test]
    fn extensions_run_before_libs() -> Result<(), Error>
    {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let lib = tempSource("ext", "(set doubled (* answer 2))");
        let e = getEval(&[registerAnswer], &[lib.to_str().unwrap()])?;
        assert_eq!(e.env().find("doubled"), Some(Value::Number(84.0)));
        fs::remove_file(lib).unwrap();
        Ok(())
    }

    #[test]
    fn prelude_loads_before_libs() -> Result<(), Error>
    {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let prelude = tempSource("prelude", "(set base 10)");
        let lib = tempSource("after-prelude", "(set derived (+ base 1))");
        std::env::set_var("DANLISP_PRELUDE", &prelude);
        let result = getEval(&[], &[lib.to_str().unwrap()]);
        std::env::remove_var("DANLISP_PRELUDE");
        let e = result?;
        assert_eq!(e.env().find("base"), Some(Value::Number(10.0)));
        assert_eq!(e.env().find("derived"), Some(Value::Number(11.0)));
        fs::remove_file(prelude).unwrap();
        fs::remove_file(lib).unwrap();
        Ok(())
    }

    #[test]
    fn no_prelude_when_unset() -> Result<(), Error>
    {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::remove_var("DANLISP_PRELUDE");
        let e = getEval(&[], &[])?;
        assert_eq!(e.env().find("base"), None);
        Ok(())
    }

    #[test]
    fn unreadable_prelude()
    {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("DANLISP_PRELUDE", "/nonexistent/prelude.dl");
        let result = getEval(&[], &[]);
        std::env::remove_var("DANLISP_PRELUDE");
        match result
        {
            Err(Error::RuntimeError(msg)) => assert!(msg.contains("/nonexistent/prelude.dl")),
            Err(other) => panic!("Unexpected {:?}", other),
            Ok(_) => panic!("Missing prelude was ignored"),
        }
    }

    #[test]
    fn run_file() -> Result<(), Error>
    {
        let prog = tempSource("prog", "(set x 2)\n(+ x 1)\n");
        let e = Evaluator::new();
        assert_eq!(runFile(&e, prog.to_str().unwrap())?, Value::Number(3.0));
        fs::remove_file(prog).unwrap();
        Ok(())
    }

    #[test]
    fn missing_file()
    {
        let e = Evaluator::new();
        match runFile(&e, "/nonexistent/definitely/not/here.dl")
        {
            Err(Error::RuntimeError(msg)) => assert!(msg.contains("Failed to load file")),
            other => panic!("Unexpected {:?}", other),
        }
    }
}
