use shared::error::Error;

use crate::value::{Value, Builtin};
use crate::environment::Environment;

/// Register a builtin to a environment.
///
/// Example: `registerBuiltin(&env, "+", add)` registers function
/// `add` as a builtin named `+` in environment `env`.
pub fn registerBuiltin(env: &Environment, name: &str,
                       f: fn(&[Value], Environment) -> Result<Value, Error>)
{
    env.define(name, Value::Builtin(Builtin::new(name, f)));
}

#[macro_export]
macro_rules! builtin_args_check
{
    ($name: literal, $args:ident == $count: literal) =>
    {
        if $args.len() != $count
        {
            return Err(shared::rterr!("{} expects {} argument(s), got {}",
                                      $name, $count, $args.len()));
        }
    };

    ($name: literal, $args:ident >= $count: literal) =>
    {
        if $args.len() < $count
        {
            return Err(shared::rterr!("{} expects at least {} argument(s), got {}",
                                      $name, $count, $args.len()));
        }
    };
}

#[macro_export]
macro_rules! builtin_define_arg
{
    ($func_name: literal, $args:ident[$index: literal]: String) =>
    {
        if let $crate::value::Value::String(x__) = &$args[$index]
        {
            x__
        }
        else
        {
            return Err(shared::rterr!("{}'s argument {} should be a String, got {}",
                                      $func_name, $index, $args[$index].typeName()));
        }
    };

    ($func_name: literal, $args:ident[$index: literal]: Int) =>
    {
        if let Some(x__) = $args[$index].asInt()
        {
            x__
        }
        else
        {
            return Err(shared::rterr!("{}'s argument {} should be a Number, got {}",
                                      $func_name, $index, $args[$index].typeName()));
        }
    };

    ($func_name: literal, $args:ident[$index: literal]: $variant: ident) =>
    {
        if let $crate::value::Value::$variant(x__) = $args[$index]
        {
            x__
        }
        else
        {
            return Err(shared::rterr!("{}'s argument {} should be a {}, got {}",
                                      $func_name, $index, stringify!($variant),
                                      $args[$index].typeName()));
        }
    };
}

macro_rules! make_arithm
{
    ($name:ident, $sym:literal, $op:tt) =>
    {
        fn $name(args: &[Value], _: Environment) -> Result<Value, Error>
        {
            builtin_args_check!($sym, args == 2);
            let lhs: f64 = builtin_define_arg!($sym, args[0]: Number);
            let rhs: f64 = builtin_define_arg!($sym, args[1]: Number);
            Ok(Value::Number(lhs $op rhs))
        }
    };
}

make_arithm!(add, "+", +);
make_arithm!(minus, "-", -);
make_arithm!(multiply, "*", *);
make_arithm!(divide, "/", /);

macro_rules! make_bitwise
{
    ($name:ident, $sym:literal, |$l:ident, $r:ident| $body:expr) =>
    {
        fn $name(args: &[Value], _: Environment) -> Result<Value, Error>
        {
            builtin_args_check!($sym, args == 2);
            let $l: i64 = builtin_define_arg!($sym, args[0]: Int);
            let $r: i64 = builtin_define_arg!($sym, args[1]: Int);
            Ok(Value::Number($body as f64))
        }
    };
}

make_bitwise!(bitAnd, "&", |l, r| l & r);
make_bitwise!(bitOr, "|", |l, r| l | r);
make_bitwise!(bitXor, "^", |l, r| l ^ r);
make_bitwise!(bitClear, "&^", |l, r| l & !r);

fn modulo(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("mod", args == 2);
    let lhs: i64 = builtin_define_arg!("mod", args[0]: Int);
    let rhs: i64 = builtin_define_arg!("mod", args[1]: Int);
    if rhs == 0
    {
        return Err(rterr!("mod by zero"));
    }
    Ok(Value::Number(lhs.wrapping_rem(rhs) as f64))
}

fn shiftCount(name: &str, n: i64) -> Result<u32, Error>
{
    if n < 0
    {
        Err(rterr!("{}: negative shift amount {}", name, n))
    }
    else
    {
        Ok(n.min(u32::MAX as i64) as u32)
    }
}

fn shiftLeft(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("<<", args == 2);
    let lhs: i64 = builtin_define_arg!("<<", args[0]: Int);
    let rhs: i64 = builtin_define_arg!("<<", args[1]: Int);
    let n = shiftCount("<<", rhs)?;
    Ok(Value::Number(lhs.checked_shl(n).unwrap_or(0) as f64))
}

fn shiftRight(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!(">>", args == 2);
    let lhs: i64 = builtin_define_arg!(">>", args[0]: Int);
    let rhs: i64 = builtin_define_arg!(">>", args[1]: Int);
    let n = shiftCount(">>", rhs)?;
    // Arithmetic shift saturates to the sign.
    let fill = if lhs < 0 { -1 } else { 0 };
    Ok(Value::Number(lhs.checked_shr(n).unwrap_or(fill) as f64))
}

fn equal(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("=", args == 2);
    Ok(Value::Bool(args[0] == args[1]))
}

fn and(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("and", args == 2);
    Ok(Value::Bool(args[0].toBool() && args[1].toBool()))
}

fn or(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("or", args == 2);
    Ok(Value::Bool(args[0].toBool() || args[1].toBool()))
}

fn not(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("not", args == 1);
    Ok(Value::Bool(!args[0].toBool()))
}

fn greaterThan(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("gt", args == 2);
    let lhs: f64 = builtin_define_arg!("gt", args[0]: Number);
    let rhs: f64 = builtin_define_arg!("gt", args[1]: Number);
    Ok(Value::Bool(lhs > rhs))
}

fn lessThan(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("lt", args == 2);
    let lhs: f64 = builtin_define_arg!("lt", args[0]: Number);
    let rhs: f64 = builtin_define_arg!("lt", args[1]: Number);
    Ok(Value::Bool(lhs < rhs))
}

/// Space-joined display form of `args`, as printed by `prn`.
pub fn joinDisplay(args: &[Value]) -> String
{
    args.iter().map(|v| v.to_string()).collect::<Vec<String>>().join(" ")
}

fn prn(args: &[Value], _: Environment) -> Result<Value, Error>
{
    println!("{}", joinDisplay(args));
    Ok(Value::null())
}

pub fn getBuiltinEnv() -> Environment
{
    let result = Environment::new();
    registerBuiltin(&result, "+", add);
    registerBuiltin(&result, "-", minus);
    registerBuiltin(&result, "*", multiply);
    registerBuiltin(&result, "/", divide);
    registerBuiltin(&result, "mod", modulo);
    registerBuiltin(&result, "&", bitAnd);
    registerBuiltin(&result, "|", bitOr);
    registerBuiltin(&result, "^", bitXor);
    registerBuiltin(&result, "&^", bitClear);
    registerBuiltin(&result, ">>", shiftRight);
    registerBuiltin(&result, "<<", shiftLeft);
    registerBuiltin(&result, "=", equal);
    registerBuiltin(&result, "and", and);
    registerBuiltin(&result, "or", or);
    registerBuiltin(&result, "not", not);
    registerBuiltin(&result, "gt", greaterThan);
    registerBuiltin(&result, "lt", lessThan);
    registerBuiltin(&result, "prn", prn);
    result.define("t", Value::Bool(true));
    result.define("nil", Value::null());
    result
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn call(name: &str, args: &[Value]) -> Result<Value, Error>
    {
        let env = getBuiltinEnv();
        match env.find(name)
        {
            Some(Value::Builtin(f)) => f.call(args, env),
            _ => panic!("{} is not a builtin", name),
        }
    }

    fn n(x: f64) -> Value
    {
        Value::Number(x)
    }

    #[test]
    fn arithmetic() -> Result<(), Error>
    {
        assert_eq!(call("+", &[n(2.0), n(7.0)])?, n(9.0));
        assert_eq!(call("-", &[n(2.0), n(7.0)])?, n(-5.0));
        assert_eq!(call("*", &[n(2.0), n(7.0)])?, n(14.0));
        assert_eq!(call("/", &[n(10.0), n(4.0)])?, n(2.5));
        assert_eq!(call("mod", &[n(10.0), n(4.0)])?, n(2.0));
        assert_eq!(call("mod", &[n(-7.0), n(3.0)])?, n(-1.0));
        assert_eq!(call("mod", &[n(10.9), n(4.2)])?, n(2.0));
        Ok(())
    }

    #[test]
    fn arithmetic_type_errors()
    {
        assert_eq!(call("+", &[n(1.0), Value::String("a".to_owned())]),
                   Err(rterr!("+'s argument 1 should be a Number, got string")));
        assert!(call("gt", &[Value::Null, n(1.0)]).is_err());
        assert!(call("&", &[Value::Bool(true), n(1.0)]).is_err());
    }

    #[test]
    fn arity_is_checked()
    {
        assert_eq!(call("+", &[n(1.0)]),
                   Err(rterr!("+ expects 2 argument(s), got 1")));
        assert!(call("=", &[]).is_err());
        assert!(call("not", &[n(1.0), n(2.0)]).is_err());
    }

    #[test]
    fn mod_by_zero()
    {
        assert_eq!(call("mod", &[n(1.0), n(0.0)]), Err(rterr!("mod by zero")));
    }

    #[test]
    fn bitwise() -> Result<(), Error>
    {
        assert_eq!(call("&", &[n(12.0), n(10.0)])?, n(8.0));
        assert_eq!(call("|", &[n(12.0), n(10.0)])?, n(14.0));
        assert_eq!(call("^", &[n(12.0), n(10.0)])?, n(6.0));
        assert_eq!(call("&^", &[n(12.0), n(10.0)])?, n(4.0));
        assert_eq!(call("<<", &[n(1.0), n(4.0)])?, n(16.0));
        assert_eq!(call(">>", &[n(17.9), n(2.0)])?, n(4.0));
        assert_eq!(call(">>", &[n(-8.0), n(1.0)])?, n(-4.0));
        assert_eq!(call("<<", &[n(1.0), n(64.0)])?, n(0.0));
        assert_eq!(call(">>", &[n(-1.0), n(100.0)])?, n(-1.0));
        assert!(call("<<", &[n(1.0), n(-1.0)]).is_err());
        Ok(())
    }

    #[test]
    fn comparison_and_logic() -> Result<(), Error>
    {
        assert_eq!(call("gt", &[n(3.0), n(2.0)])?, Value::Bool(true));
        assert_eq!(call("lt", &[n(3.0), n(2.0)])?, Value::Bool(false));
        assert_eq!(call("=", &[n(3.0), n(3.0)])?, Value::Bool(true));
        assert_eq!(call("=", &[n(3.0), Value::String("3".to_owned())])?,
                   Value::Bool(false));
        assert_eq!(call("and", &[n(0.0), Value::Bool(true)])?, Value::Bool(true));
        assert_eq!(call("and", &[Value::Null, Value::Bool(true)])?, Value::Bool(false));
        assert_eq!(call("or", &[Value::Bool(false), Value::Null])?, Value::Bool(false));
        assert_eq!(call("or", &[Value::Bool(false), n(1.0)])?, Value::Bool(true));
        assert_eq!(call("not", &[Value::Null])?, Value::Bool(true));
        Ok(())
    }

    #[test]
    fn prn_returns_nil() -> Result<(), Error>
    {
        assert_eq!(call("prn", &[n(1.0), Value::String("x".to_owned())])?,
                   Value::Null);
        assert_eq!(joinDisplay(&[n(1.0), Value::String("x y".to_owned()),
                                 Value::Bool(false), Value::Null]),
                   "1 x y false nil");
        Ok(())
    }

    #[test]
    fn seed_constants()
    {
        let env = getBuiltinEnv();
        assert_eq!(env.find("t"), Some(Value::Bool(true)));
        assert_eq!(env.find("nil"), Some(Value::Null));
    }
}
