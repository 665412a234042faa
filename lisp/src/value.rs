use std::fmt;
use std::mem;
use std::rc::Rc;

use crate::parser::SyntaxTreeNode;
use crate::environment::Environment;
use shared::error::Error;

/// A function defined with `defn`. Parameters are bound by name in the
/// calling environment, which is the one and only environment.
#[derive(Clone)]
pub struct Procedure
{
    name: String,
    arguments: Vec<String>,
    body: Rc<Vec<SyntaxTreeNode>>,
}

impl Procedure
{
    pub fn named(name: &str, args: Vec<String>, body: Vec<SyntaxTreeNode>) -> Self
    {
        Self{ name: name.to_owned(), arguments: args, body: Rc::new(body) }
    }

    pub fn arguments(&self) -> &Vec<String>
    {
        &self.arguments
    }

    pub fn body(&self) -> &Vec<SyntaxTreeNode>
    {
        &self.body
    }

    pub fn name(&self) -> &str
    {
        &self.name
    }
}

impl fmt::Debug for Procedure
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "<fn {}>", self.name)
    }
}

impl fmt::Display for Procedure
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "<fn {}>", self.name)
    }
}

impl PartialEq for Procedure
{
    fn eq(&self, other: &Self) -> bool
    {
        self.arguments == other.arguments && self.body == other.body
    }
}

pub type Func = fn(&[Value], Environment) -> Result<Value, Error>;

#[derive(Clone)]
pub struct Builtin
{
    name: String,
    func: Func,
}

impl Builtin
{
    pub fn new(name: &str, func: Func) -> Self
    {
        Self{ name: name.to_owned(), func: func }
    }

    pub fn name(&self) -> &str
    {
        &self.name
    }

    pub fn call(&self, args: &[Value], env: Environment) -> Result<Value, Error>
    {
        (self.func)(args, env)
    }
}

impl PartialEq for Builtin
{
    fn eq(&self, other: &Self) -> bool
    {
        self.name == other.name
    }
}

impl fmt::Debug for Builtin
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "<builtin {}>", self.name)
    }
}

/// A pair. Chains of cells ending in `Value::Null` are lists. Cells are
/// never mutated after construction, so no chain can become cyclic.
///
/// Walking along the tail (drop, display, comparison) is iterative, so
/// chain length is bounded by memory rather than by the stack.
#[derive(Clone)]
pub struct Cons
{
    is_list: bool,
    head: Rc<Value>,
    tail: Rc<Value>,
}

impl Cons
{
    pub fn new(head: Value, tail: Value) -> Self
    {
        let is_list = match &tail
        {
            Value::Null => true,
            Value::List(c) => c.isList(),
            _ => false,
        };

        Self{ is_list: is_list,
              head: Rc::new(head),
              tail: Rc::new(tail),
        }
    }

    pub fn car(&self) -> Value
    {
        (*self.head).clone()
    }

    pub fn cdr(&self) -> Value
    {
        (*self.tail).clone()
    }

    /// Whether the chain starting here is nil-terminated.
    pub fn isList(&self) -> bool
    {
        self.is_list
    }

    pub fn iter(&self) -> ConsIter
    {
        ConsIter{ next: Some(self.clone()) }
    }

    fn takeTail(&mut self) -> Rc<Value>
    {
        mem::replace(&mut self.tail, Rc::new(Value::Null))
    }
}

impl Drop for Cons
{
    fn drop(&mut self)
    {
        // Unlink uniquely owned cells one at a time.
        let mut tail = self.takeTail();
        while let Ok(Value::List(mut cell)) = Rc::try_unwrap(tail)
        {
            tail = cell.takeTail();
        }
    }
}

impl PartialEq for Cons
{
    fn eq(&self, other: &Self) -> bool
    {
        let mut lhs = self;
        let mut rhs = other;
        loop
        {
            if lhs.head != rhs.head
            {
                return false;
            }
            if Rc::ptr_eq(&lhs.tail, &rhs.tail)
            {
                return true;
            }
            match (&*lhs.tail, &*rhs.tail)
            {
                (Value::List(l), Value::List(r)) =>
                {
                    lhs = l;
                    rhs = r;
                },
                (l, r) => return l == r,
            }
        }
    }
}

impl fmt::Display for Cons
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "(")?;
        let mut cell = self;
        loop
        {
            write!(f, "{}", cell.head)?;
            match &*cell.tail
            {
                Value::Null => return write!(f, ")"),
                Value::List(rest) =>
                {
                    write!(f, " ")?;
                    cell = rest;
                },
                other => return write!(f, " . {})", other),
            }
        }
    }
}

impl fmt::Debug for Cons
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "Cons{}", self)
    }
}

/// Walks the cars of a chain. Stops at the first tail that is not a
/// cell, whether nil or not.
pub struct ConsIter
{
    next: Option<Cons>,
}

impl Iterator for ConsIter
{
    type Item = Value;

    fn next(&mut self) -> Option<Value>
    {
        let cell = self.next.take()?;
        if let Value::List(rest) = &*cell.tail
        {
            self.next = Some(rest.clone());
        }
        Some(cell.car())
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Value
{
    Number(f64),
    String(String),
    Bool(bool),
    List(Cons),
    Builtin(Builtin),
    Procedure(Procedure),
    Null,
}

impl Value
{
    pub const fn null() -> Self
    {
        Self::Null
    }

    pub fn isNull(&self) -> bool
    {
        if let Self::Null = self
        {
            true
        }
        else
        {
            false
        }
    }

    pub fn asFloat(&self) -> Option<f64>
    {
        match self
        {
            Self::Number(x) => Some(*x),
            _ => None,
        }
    }

    /// Truncate toward zero, saturating at the i64 range.
    pub fn asInt(&self) -> Option<i64>
    {
        self.asFloat().map(|x| x as i64)
    }

    /// `false` and nil are false, everything else is true.
    pub fn toBool(&self) -> bool
    {
        match self
        {
            Self::Bool(b) => *b,
            Self::Null => false,
            _ => true,
        }
    }

    /// Name of the value’s kind, as reported by `type` and in operand
    /// errors.
    pub fn typeName(&self) -> &'static str
    {
        match self
        {
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::List(_) => "cons",
            Self::Builtin(_) => "builtin",
            Self::Procedure(_) => "function",
            Self::Null => "nil",
        }
    }
}

/// Shortest digits that read back as `x`, in exponent form (`1e+06`,
/// `2.5e-05`) when the decimal exponent is below -4 or at least 6.
pub fn formatNumber(x: f64) -> String
{
    if x.is_nan()
    {
        return "NaN".to_owned();
    }
    if x.is_infinite()
    {
        return String::from(if x > 0.0 { "+Inf" } else { "-Inf" });
    }
    if x == 0.0
    {
        return String::from(if x.is_sign_negative() { "-0" } else { "0" });
    }

    let sci = format!("{:e}", x);
    let (mantissa, exp) = match sci.split_once('e')
    {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => return x.to_string(),
    };
    if exp < -4 || exp >= 6
    {
        format!("{}e{}{:02}", mantissa, if exp < 0 { '-' } else { '+' }, exp.abs())
    }
    else
    {
        x.to_string()
    }
}

impl fmt::Display for Value
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self
        {
            Self::Number(x) => write!(f, "{}", formatNumber(*x)),
            Self::String(x) => write!(f, "{}", x),
            Self::Bool(x) => write!(f, "{}", x),
            Self::List(x) => write!(f, "{}", x),
            Self::Builtin(x) => write!(f, "{:?}", x),
            Self::Procedure(x) => write!(f, "{}", x),
            Self::Null => write!(f, "nil"),
        }
    }
}

impl From<Vec<Value>> for Value
{
    fn from(v: Vec<Value>) -> Self
    {
        let mut result = Self::null();
        for item in v.into_iter().rev()
        {
            result = Value::List(Cons::new(item, result));
        }
        result
    }
}
