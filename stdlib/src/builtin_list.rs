use shared::error::Error;

use lisp::value::{Value, Cons};
use lisp::builtin::registerBuiltin;
use lisp::environment::Environment;

fn cons(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("cons", args == 2);
    Ok(Value::List(Cons::new(args[0].clone(), args[1].clone())))
}

fn car(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("car", args == 1);
    match &args[0]
    {
        Value::List(cell) => Ok(cell.car()),
        Value::Null => Ok(Value::null()),
        other => Err(rterr!("can only car a cons cell, not {} ({})",
                            other, other.typeName())),
    }
}

fn cdr(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("cdr", args == 1);
    match &args[0]
    {
        Value::List(cell) => Ok(cell.cdr()),
        Value::Null => Ok(Value::null()),
        other => Err(rterr!("can only cdr a cons cell, not {} ({})",
                            other, other.typeName())),
    }
}

fn list(args: &[Value], _: Environment) -> Result<Value, Error>
{
    Ok(Value::from(args.to_vec()))
}

fn nth(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("nth", args == 2);
    let index: i64 = builtin_define_arg!("nth", args[1]: Int);
    if index < 0
    {
        return Err(rterr!("nth: negative index {}", index));
    }

    let mut current = args[0].clone();
    let mut remaining = index;
    loop
    {
        match current
        {
            Value::List(cell) =>
            {
                if remaining == 0
                {
                    return Ok(cell.car());
                }
                remaining -= 1;
                current = cell.cdr();
            },
            Value::Null => return Ok(Value::null()),
            other => return Err(rterr!("nth expects a list, reached {}", other)),
        }
    }
}

fn length(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("length", args == 1);
    match &args[0]
    {
        Value::Null => Ok(Value::Number(0.0)),
        Value::List(cell) if cell.isList() => Ok(Value::Number(cell.iter().count() as f64)),
        other => Err(rterr!("length: not a proper list: {}", other)),
    }
}

pub fn register(env: &Environment)
{
    registerBuiltin(env, "cons", cons);
    registerBuiltin(env, "car", car);
    registerBuiltin(env, "cdr", cdr);
    registerBuiltin(env, "list", list);
    registerBuiltin(env, "nth", nth);
    registerBuiltin(env, "length", length);
}
