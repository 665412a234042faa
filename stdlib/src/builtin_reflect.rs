use shared::error::Error;

use lisp::value::Value;
use lisp::builtin::registerBuiltin;
use lisp::environment::Environment;

fn typeOf(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("type", args == 1);
    Ok(Value::String(args[0].typeName().to_owned()))
}

pub fn register(env: &Environment)
{
    registerBuiltin(env, "type", typeOf);
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::testing::getEval;

    #[test]
    fn type_names() -> Result<(), Error>
    {
        let e = getEval();
        let cases = [
            ("(set i 5) (type i)", "number"),
            (r#"(set s "foo") (type s)"#, "string"),
            ("(set l (list 1 2 3)) (type l)", "cons"),
            ("(type t)", "bool"),
            ("(type nil)", "nil"),
            ("(type +)", "builtin"),
            ("(defn f () 1) (type f)", "function"),
        ];
        for (src, expected) in &cases
        {
            assert_eq!(e.evalSource(src)?, Value::String((*expected).to_owned()));
        }
        Ok(())
    }
}
