use shared::error::Error;

use crate::parser::SyntaxTreeNode;
use crate::environment::{Environment, Value};
use crate::value::Procedure;
use crate::builtin;

pub type EvalResult = Result<Value, Error>;

/// Tree-walking evaluator over one shared environment.
pub struct Evaluator
{
    env: Environment,
}

impl Evaluator
{
    /// An evaluator over a fresh environment seeded with the builtins.
    pub fn new() -> Self
    {
        Self::withEnv(builtin::getBuiltinEnv())
    }

    pub fn withEnv(env: Environment) -> Self
    {
        Self{ env: env }
    }

    pub fn env(&self) -> Environment
    {
        self.env.clone()
    }

    fn evalSymbol(&self, name: &str) -> EvalResult
    {
        self.env.find(name).ok_or_else(
            || rterr!("could not find symbol '{}'", name))
    }

    /// Evaluate `nodes` in order, returning the last value, or nil if
    /// there are none.
    fn evalSequence(&self, nodes: &[SyntaxTreeNode]) -> EvalResult
    {
        let mut result = Value::null();
        for node in nodes
        {
            result = self.evalNode(node)?;
        }
        Ok(result)
    }

    fn evalEach(&self, nodes: &[SyntaxTreeNode]) -> Result<Vec<Value>, Error>
    {
        nodes.iter().map(|node| self.evalNode(node)).collect()
    }

    fn callProcedure(&self, f: &Procedure, args: Vec<Value>) -> EvalResult
    {
        if args.len() != f.arguments().len()
        {
            return Err(rterr!("{} expects {} argument(s), got {}",
                              f.name(), f.arguments().len(), args.len()));
        }
        tracing::trace!(name = f.name(), "calling");

        // Parameters go straight into the session environment and
        // outlive the call.
        for (name, value) in f.arguments().iter().zip(args.into_iter())
        {
            self.env.define(name, value);
        }
        self.evalSequence(f.body())
    }

    fn evalSeq(&self, nodes: &[SyntaxTreeNode]) -> EvalResult
    {
        let (head, rest) = nodes.split_first().ok_or_else(
            || rterr!("cannot apply an empty sequence"))?;

        let callee = self.evalNode(head)?;
        let args = self.evalEach(rest)?;
        match callee
        {
            Value::Builtin(f) => f.call(&args, self.env.clone()),
            Value::Procedure(f) => self.callProcedure(&f, args),
            other => Err(rterr!("{} is not callable: {}", head, other.typeName())),
        }
    }

    fn evalSet(&self, target: &str, value: &SyntaxTreeNode) -> EvalResult
    {
        let v = self.evalNode(value)?;
        self.env.define(target, v.clone());
        Ok(v)
    }

    fn evalIf(&self, cond: &SyntaxTreeNode, branch_true: &SyntaxTreeNode,
              branch_false: &SyntaxTreeNode) -> EvalResult
    {
        if self.evalNode(cond)?.toBool()
        {
            self.evalNode(branch_true)
        }
        else
        {
            self.evalNode(branch_false)
        }
    }

    fn evalWhile(&self, cond: &SyntaxTreeNode, body: &[SyntaxTreeNode]) -> EvalResult
    {
        let mut result = Value::null();
        while self.evalNode(cond)?.toBool()
        {
            for node in body
            {
                result = self.evalNode(node)?;
            }
        }
        Ok(result)
    }

    fn evalFor(&self, init: &SyntaxTreeNode, cond: &SyntaxTreeNode,
               step: &SyntaxTreeNode, body: &[SyntaxTreeNode]) -> EvalResult
    {
        let mut result = Value::null();
        self.evalNode(init)?;
        while self.evalNode(cond)?.toBool()
        {
            for node in body
            {
                result = self.evalNode(node)?;
            }
            self.evalNode(step)?;
        }
        Ok(result)
    }

    fn evalDefn(&self, name: &str, params: &[String],
                body: &[SyntaxTreeNode]) -> EvalResult
    {
        tracing::debug!(name, arity = params.len(), "defining function");
        let f = Procedure::named(name, params.to_vec(), body.to_vec());
        self.env.define(name, Value::Procedure(f));
        Ok(Value::null())
    }

    pub fn evalNode(&self, node: &SyntaxTreeNode) -> EvalResult
    {
        match node
        {
            SyntaxTreeNode::Atom(v) => Ok(v.clone()),
            SyntaxTreeNode::Symbol(name) => self.evalSymbol(name),
            SyntaxTreeNode::Seq(nodes) => self.evalSeq(nodes),
            SyntaxTreeNode::Set{ target, value } => self.evalSet(target, value),
            SyntaxTreeNode::If{ cond, branch_true, branch_false } =>
                self.evalIf(cond, branch_true, branch_false),
            SyntaxTreeNode::While{ cond, body } => self.evalWhile(cond, body),
            SyntaxTreeNode::For{ init, cond, step, body } =>
                self.evalFor(init, cond, step, body),
            SyntaxTreeNode::Defn{ name, params, body } =>
                self.evalDefn(name, params, body),
        }
    }

    /// Evaluate top-level forms in order and return the last result.
    /// The first failure aborts the remaining forms.
    pub fn eval(&self, roots: &[SyntaxTreeNode]) -> EvalResult
    {
        self.evalSequence(roots)
    }

    pub fn evalSource(&self, src: &str) -> EvalResult
    {
        let tokens = crate::tokenizer::tokenize(src)?;
        let roots = SyntaxTreeNode::parse(tokens)?;
        self.eval(&roots)
    }
}

impl Default for Evaluator
{
    fn default() -> Self
    {
        Self::new()
    }
}
