use shared::error::Error;

use lisp::value::Value;
use lisp::builtin::registerBuiltin;
use lisp::environment::Environment;

use crate::utils::SimpleTemplate;

fn contains(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("strings/Contains", args == 2);
    let s: &str = builtin_define_arg!("strings/Contains", args[0]: String);
    let sub: &str = builtin_define_arg!("strings/Contains", args[1]: String);
    Ok(Value::Bool(s.contains(sub)))
}

fn hasPrefix(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("strings/HasPrefix", args == 2);
    let s: &str = builtin_define_arg!("strings/HasPrefix", args[0]: String);
    let prefix: &str = builtin_define_arg!("strings/HasPrefix", args[1]: String);
    Ok(Value::Bool(s.starts_with(prefix)))
}

fn hasSuffix(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("strings/HasSuffix", args == 2);
    let s: &str = builtin_define_arg!("strings/HasSuffix", args[0]: String);
    let suffix: &str = builtin_define_arg!("strings/HasSuffix", args[1]: String);
    Ok(Value::Bool(s.ends_with(suffix)))
}

fn join(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("strings/Join", args == 2);
    let sep: &str = builtin_define_arg!("strings/Join", args[1]: String);

    let items: Vec<Value> = match &args[0]
    {
        Value::Null => Vec::new(),
        Value::List(cell) if cell.isList() => cell.iter().collect(),
        other => return Err(rterr!("strings/Join expects a list of strings, got {}",
                                   other.typeName())),
    };

    let mut parts: Vec<String> = Vec::with_capacity(items.len());
    for item in items
    {
        match item
        {
            Value::String(s) => parts.push(s),
            other => return Err(rterr!("strings/Join expects a list of strings, found {}",
                                       other.typeName())),
        }
    }
    Ok(Value::String(parts.join(sep)))
}

fn split(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("strings/Split", args == 2);
    let s: &str = builtin_define_arg!("strings/Split", args[0]: String);
    let sep: &str = builtin_define_arg!("strings/Split", args[1]: String);

    let parts: Vec<Value> = if sep.is_empty()
    {
        s.chars().map(|c| Value::String(c.to_string())).collect()
    }
    else
    {
        s.split(sep).map(|p| Value::String(p.to_owned())).collect()
    };
    Ok(Value::from(parts))
}

fn replace(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("strings/Replace", args == 3);
    let s: &str = builtin_define_arg!("strings/Replace", args[0]: String);
    let old: &str = builtin_define_arg!("strings/Replace", args[1]: String);
    let new: &str = builtin_define_arg!("strings/Replace", args[2]: String);
    if old.is_empty()
    {
        return Ok(Value::String(s.to_owned()));
    }
    Ok(Value::String(s.replace(old, new)))
}

fn toUpper(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("strings/ToUpper", args == 1);
    let s: &str = builtin_define_arg!("strings/ToUpper", args[0]: String);
    Ok(Value::String(s.to_uppercase()))
}

fn toLower(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("strings/ToLower", args == 1);
    let s: &str = builtin_define_arg!("strings/ToLower", args[0]: String);
    Ok(Value::String(s.to_lowercase()))
}

fn concat(args: &[Value], _: Environment) -> Result<Value, Error>
{
    Ok(Value::String(args.iter().map(|v| v.to_string()).collect()))
}

fn format(args: &[Value], _: Environment) -> Result<Value, Error>
{
    builtin_args_check!("format", args >= 1);
    let template_str: &str = builtin_define_arg!("format", args[0]: String);

    let mut template = SimpleTemplate::new(&template_str);
    for kv_pair in &args[1..]
    {
        let cell = if let Value::List(c) = kv_pair
        {
            c
        }
        else
        {
            return Err(rterr!("Invalid key-value pair in format: {}", kv_pair));
        };

        let key = if let Value::String(s) = cell.car()
        {
            s
        }
        else
        {
            return Err(rterr!("Invalid key in format: {}", cell.car()));
        };

        template = template.apply(&key, cell.cdr());
    }
    Ok(Value::String(template.result()))
}

pub fn register(env: &Environment)
{
    registerBuiltin(env, "strings/Contains", contains);
    registerBuiltin(env, "strings/HasPrefix", hasPrefix);
    registerBuiltin(env, "strings/HasSuffix", hasSuffix);
    registerBuiltin(env, "strings/Join", join);
    registerBuiltin(env, "strings/Split", split);
    registerBuiltin(env, "strings/Replace", replace);
    registerBuiltin(env, "strings/ToUpper", toUpper);
    registerBuiltin(env, "strings/ToLower", toLower);
    registerBuiltin(env, "str", concat);
    registerBuiltin(env, "format", format);
}
