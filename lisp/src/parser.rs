use std::fmt;

use shared::error;
use shared::error::Error;

use crate::tokenizer::{Token, TokenValue};
use crate::value::Value;

/// One parsed form. Special forms get their own variants; every other
/// parenthesized form is a `Seq` (an application).
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxTreeNode
{
    Atom(Value),
    Symbol(String),
    Seq(Vec<SyntaxTreeNode>),
    Set{ target: String, value: Box<SyntaxTreeNode> },
    If
    {
        cond: Box<SyntaxTreeNode>,
        branch_true: Box<SyntaxTreeNode>,
        branch_false: Box<SyntaxTreeNode>,
    },
    While{ cond: Box<SyntaxTreeNode>, body: Vec<SyntaxTreeNode> },
    For
    {
        init: Box<SyntaxTreeNode>,
        cond: Box<SyntaxTreeNode>,
        step: Box<SyntaxTreeNode>,
        body: Vec<SyntaxTreeNode>,
    },
    Defn{ name: String, params: Vec<String>, body: Vec<SyntaxTreeNode> },
}

impl SyntaxTreeNode
{
    /// Parse a whole token stream into its top-level forms.
    pub fn parse(tokens: Vec<Token>) -> Result<Vec<Self>, Error>
    {
        let mut eater = TokenEater::new(tokens);
        let mut roots = Vec::new();
        while !eater.exhausted()
        {
            roots.push(eater.parse()?);
        }
        tracing::trace!(forms = roots.len(), "parsed");
        Ok(roots)
    }

    fn label(&self) -> String
    {
        match self
        {
            Self::Atom(Value::String(s)) => format!("\\\"{}\\\"", escape(s)),
            Self::Atom(v) => v.to_string(),
            Self::Symbol(name) => name.clone(),
            Self::Seq(_) => String::new(),
            Self::Set{ target, .. } => format!("set {}", target),
            Self::If{ .. } => String::from("if"),
            Self::While{ .. } => String::from("while"),
            Self::For{ .. } => String::from("for"),
            Self::Defn{ name, params, .. } =>
                format!("defn {} ({})", name, params.join(" ")),
        }
    }

    fn children(&self) -> Vec<&SyntaxTreeNode>
    {
        match self
        {
            Self::Atom(_) | Self::Symbol(_) => Vec::new(),
            Self::Seq(nodes) => nodes.iter().collect(),
            Self::Set{ value, .. } => vec![&**value],
            Self::If{ cond, branch_true, branch_false } =>
                vec![&**cond, &**branch_true, &**branch_false],
            Self::While{ cond, body } =>
                std::iter::once(&**cond).chain(body.iter()).collect(),
            Self::For{ init, cond, step, body } =>
                vec![&**init, &**cond, &**step].into_iter().chain(body.iter())
                .collect(),
            Self::Defn{ body, .. } => body.iter().collect(),
        }
    }

    fn toDotInner(&self, i: &mut usize) -> (Vec<String>, String)
    {
        let mut output = Vec::new();
        let self_name = format!("node{}", i);
        *i += 1;
        match self
        {
            Self::Seq(_) =>
            {
                output.push(format!(r#"{} [shape=circle, label="", height=.2, width=.2];"#, self_name));
            },
            Self::Atom(_) | Self::Symbol(_) =>
            {
                output.push(format!(r#"{} [label="{}"];"#, self_name, self.label()));
            },
            _ =>
            {
                output.push(format!(r#"{} [shape=box, label="{}"];"#, self_name, self.label()));
            },
        }
        for t in self.children()
        {
            let (mut lines, name) = t.toDotInner(i);
            output.append(&mut lines);
            output.push(format!("{} -> {};", self_name, name));
        }
        return (output, self_name);
    }

    /// Render a Graphviz digraph of the given forms.
    pub fn toDot(roots: &[SyntaxTreeNode]) -> String
    {
        let mut output = Vec::new();
        let mut i: usize = 0;
        output.push(String::from("digraph G {"));
        output.push(String::from(r#"
        graph [fontname = "monospace"];
        node [fontname = "monospace"];
        edge [fontname = "monospace"];"#));

        for root in roots
        {
            output.append(&mut root.toDotInner(&mut i).0);
        }
        output.push(String::from("}"));
        output.join("\n")
    }
}

fn escape(s: &str) -> String
{
    let mut result = String::with_capacity(s.len());
    for c in s.chars()
    {
        match c
        {
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            '\x07' => result.push_str("\\a"),
            '\x08' => result.push_str("\\b"),
            '\x0c' => result.push_str("\\f"),
            '\x0b' => result.push_str("\\v"),
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            c if c.is_ascii_control() => result.push_str(&format!("\\x{:02x}", c as u32)),
            _ => result.push(c),
        }
    }
    result
}

fn writeJoined(f: &mut fmt::Formatter<'_>, nodes: &[SyntaxTreeNode]) -> fmt::Result
{
    for node in nodes
    {
        write!(f, " {}", node)?;
    }
    Ok(())
}

/// Serialize back to surface syntax.
impl fmt::Display for SyntaxTreeNode
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self
        {
            Self::Atom(Value::String(s)) => write!(f, "\"{}\"", escape(s)),
            Self::Atom(v) => write!(f, "{}", v),
            Self::Symbol(name) => write!(f, "{}", name),
            Self::Seq(nodes) =>
            {
                write!(f, "(")?;
                for (i, node) in nodes.iter().enumerate()
                {
                    if i > 0
                    {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", node)?;
                }
                write!(f, ")")
            },
            Self::Set{ target, value } => write!(f, "(set {} {})", target, value),
            Self::If{ cond, branch_true, branch_false } =>
                write!(f, "(if {} {} {})", cond, branch_true, branch_false),
            Self::While{ cond, body } =>
            {
                write!(f, "(while {}", cond)?;
                writeJoined(f, body)?;
                write!(f, ")")
            },
            Self::For{ init, cond, step, body } =>
            {
                write!(f, "(for {} {} {}", init, cond, step)?;
                writeJoined(f, body)?;
                write!(f, ")")
            },
            Self::Defn{ name, params, body } =>
            {
                write!(f, "(defn {} ({})", name, params.join(" "))?;
                writeJoined(f, body)?;
                write!(f, ")")
            },
        }
    }
}

struct TokenEater
{
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenEater
{
    pub fn new(tokens: Vec<Token>) -> Self
    {
        Self{ tokens: tokens, pos: 0 }
    }

    fn exhausted(&self) -> bool
    {
        self.pos >= self.tokens.len()
    }

    fn advance(&mut self)
    {
        self.pos += 1;
    }

    fn current(&self) -> Option<&Token>
    {
        self.tokens.get(self.pos)
    }

    fn next(&self) -> Option<&Token>
    {
        self.tokens.get(self.pos + 1)
    }

    fn atRightParen(&self) -> bool
    {
        match self.current()
        {
            Some(t) => t.value() == &TokenValue::ParenRight,
            None => false,
        }
    }

    /// Consume a `)` closing `what`.
    fn expectRightParen(&mut self, what: &str) -> Result<(), Error>
    {
        match self.current().map(|t| t.value())
        {
            Some(TokenValue::ParenRight) =>
            {
                self.advance();
                Ok(())
            },
            Some(_) => Err(error!(ParseError, format!(
                "too many expressions in {}", what))),
            None => Err(error!(ParseError, format!(
                "missing ')' to close {}", what))),
        }
    }

    /// Consume an identifier token and return its name.
    fn expectIdentifier(&mut self, what: &str) -> Result<String, Error>
    {
        let token = self.current().cloned().ok_or_else(
            || error!(ParseError, format!("unexpected end of input in {}", what)))?;
        if let TokenValue::Ident(name) = token.value()
        {
            self.advance();
            Ok(name.clone())
        }
        else
        {
            Err(error!(ParseError, format!(
                "{} must be a symbol but got '{}' on line {}",
                what, token.src(), token.line())))
        }
    }

    /// Parse one expression that must be present inside `what`.
    fn parseIn(&mut self, what: &str) -> Result<SyntaxTreeNode, Error>
    {
        if self.exhausted()
        {
            return Err(error!(ParseError, format!(
                "unexpected end of input in {}", what)));
        }
        if self.atRightParen()
        {
            return Err(error!(ParseError, format!(
                "too few expressions in {}", what)));
        }
        self.parse()
    }

    /// Parse expressions up to, but not including, the closing `)`.
    fn parseBody(&mut self, what: &str) -> Result<Vec<SyntaxTreeNode>, Error>
    {
        let mut nodes = Vec::new();
        loop
        {
            if self.exhausted()
            {
                return Err(error!(ParseError, format!(
                    "missing ')' to close {}", what)));
            }
            if self.atRightParen()
            {
                return Ok(nodes);
            }
            nodes.push(self.parse()?);
        }
    }

    fn parse(&mut self) -> Result<SyntaxTreeNode, Error>
    {
        let current: Token = self.current().cloned().ok_or_else(
            || error!(ParseError, "unexpected end of input"))?;
        match current.value()
        {
            TokenValue::ParenLeft =>
            {
                let special = self.next().map(|t| t.value().clone());
                match special
                {
                    Some(TokenValue::Set) => self.consumeSet(),
                    Some(TokenValue::If) => self.consumeIf(),
                    Some(TokenValue::While) => self.consumeWhile(),
                    Some(TokenValue::For) => self.consumeFor(),
                    Some(TokenValue::Defn) => self.consumeDefn(),
                    _ => self.consumeSeq(),
                }
            },
            TokenValue::Ident(name) =>
            {
                self.advance();
                Ok(SyntaxTreeNode::Symbol(name.clone()))
            },
            TokenValue::Number(x) =>
            {
                self.advance();
                Ok(SyntaxTreeNode::Atom(Value::Number(*x)))
            },
            TokenValue::String(s) =>
            {
                self.advance();
                Ok(SyntaxTreeNode::Atom(Value::String(s.clone())))
            },
            TokenValue::ParenRight =>
            {
                Err(error!(ParseError, format!(
                    "unexpected ')' on line {}", current.line())))
            },
            TokenValue::Set | TokenValue::If | TokenValue::While |
            TokenValue::For | TokenValue::Defn =>
            {
                Err(error!(ParseError, format!(
                    "'{}' can only appear at the start of a form (line {})",
                    current.src(), current.line())))
            },
        }
    }

    fn consumeSeq(&mut self) -> Result<SyntaxTreeNode, Error>
    {
        self.advance();         // (
        let nodes = self.parseBody("sequence")?;
        self.expectRightParen("sequence")?;
        Ok(SyntaxTreeNode::Seq(nodes))
    }

    fn consumeSet(&mut self) -> Result<SyntaxTreeNode, Error>
    {
        self.advance();         // (
        self.advance();         // set
        let target = self.expectIdentifier("set target")?;
        let value = self.parseIn("set")?;
        self.expectRightParen("set")?;
        Ok(SyntaxTreeNode::Set{ target: target, value: Box::new(value) })
    }

    fn consumeIf(&mut self) -> Result<SyntaxTreeNode, Error>
    {
        self.advance();         // (
        self.advance();         // if
        let cond = self.parseIn("if")?;
        let branch_true = self.parseIn("if")?;
        let branch_false = self.parseIn("if")?;
        self.expectRightParen("if")?;
        Ok(SyntaxTreeNode::If{ cond: Box::new(cond),
                               branch_true: Box::new(branch_true),
                               branch_false: Box::new(branch_false) })
    }

    fn consumeWhile(&mut self) -> Result<SyntaxTreeNode, Error>
    {
        self.advance();         // (
        self.advance();         // while
        let cond = self.parseIn("while")?;
        let body = self.parseBody("while")?;
        self.expectRightParen("while")?;
        Ok(SyntaxTreeNode::While{ cond: Box::new(cond), body: body })
    }

    fn consumeFor(&mut self) -> Result<SyntaxTreeNode, Error>
    {
        self.advance();         // (
        self.advance();         // for
        let init = self.parseIn("for")?;
        let cond = self.parseIn("for")?;
        let step = self.parseIn("for")?;
        let body = self.parseBody("for")?;
        self.expectRightParen("for")?;
        Ok(SyntaxTreeNode::For{ init: Box::new(init), cond: Box::new(cond),
                                step: Box::new(step), body: body })
    }

    fn consumeDefn(&mut self) -> Result<SyntaxTreeNode, Error>
    {
        self.advance();         // (
        self.advance();         // defn
        let name = self.expectIdentifier("function name")?;

        match self.current().map(|t| t.value())
        {
            Some(TokenValue::ParenLeft) => self.advance(),
            _ => return Err(error!(ParseError, format!(
                "expected parameter list after defn {}", name))),
        }
        let mut params = Vec::new();
        loop
        {
            if self.exhausted()
            {
                return Err(error!(ParseError, "missing ')' to close parameter list"));
            }
            if self.atRightParen()
            {
                self.advance();
                break;
            }
            params.push(self.expectIdentifier("function parameter")?);
        }

        let body = self.parseBody("defn")?;
        self.expectRightParen("defn")?;
        Ok(SyntaxTreeNode::Defn{ name: name, params: params, body: body })
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::tokenizer::tokenize;

    fn parseSource(src: &str) -> Result<Vec<SyntaxTreeNode>, Error>
    {
        SyntaxTreeNode::parse(tokenize(src)?)
    }

    fn sym(name: &str) -> SyntaxTreeNode
    {
        SyntaxTreeNode::Symbol(name.to_owned())
    }

    fn num(x: f64) -> SyntaxTreeNode
    {
        SyntaxTreeNode::Atom(Value::Number(x))
    }

    #[test]
    fn simple_seq() -> Result<(), Error>
    {
        let roots = parseSource(r#"(+ 1 "two") x 3"#)?;
        assert_eq!(roots,
                   vec![SyntaxTreeNode::Seq(vec![
                       sym("+"), num(1.0),
                       SyntaxTreeNode::Atom(Value::String("two".to_owned()))]),
                        sym("x"),
                        num(3.0)]);
        Ok(())
    }

    #[test]
    fn empty_input() -> Result<(), Error>
    {
        assert!(parseSource("")?.is_empty());
        assert!(parseSource("  \n\t")?.is_empty());
        Ok(())
    }

    #[test]
    fn nested_seq() -> Result<(), Error>
    {
        let roots = parseSource("(f (g 1) ())")?;
        assert_eq!(roots,
                   vec![SyntaxTreeNode::Seq(vec![
                       sym("f"),
                       SyntaxTreeNode::Seq(vec![sym("g"), num(1.0)]),
                       SyntaxTreeNode::Seq(Vec::new())])]);
        Ok(())
    }

    #[test]
    fn unclosed_seq()
    {
        assert_eq!(parseSource("(+ 1 2"),
                   Err(error!(ParseError, "missing ')' to close sequence")));
        assert_eq!(parseSource("("),
                   Err(error!(ParseError, "missing ')' to close sequence")));
        assert_eq!(parseSource("(f (g 1)"),
                   Err(error!(ParseError, "missing ')' to close sequence")));
    }

    #[test]
    fn stray_right_paren()
    {
        assert!(parseSource(")").is_err());
        assert!(parseSource("(+ 1 2))").is_err());
    }

    #[test]
    fn set_form() -> Result<(), Error>
    {
        let roots = parseSource("(set foo (+ 1 2))")?;
        assert_eq!(roots,
                   vec![SyntaxTreeNode::Set{
                       target: "foo".to_owned(),
                       value: Box::new(SyntaxTreeNode::Seq(vec![
                           sym("+"), num(1.0), num(2.0)]))}]);
        Ok(())
    }

    #[test]
    fn set_needs_symbol_target()
    {
        match parseSource("(set 1 2)")
        {
            Err(Error::ParseError(msg)) => assert!(msg.contains("'1'")),
            other => panic!("Unexpected {:?}", other),
        }
        assert!(parseSource("(set (x) 2)").is_err());
        assert!(parseSource("(set x)").is_err());
        assert!(parseSource("(set x 1 2)").is_err());
        assert!(parseSource("(set x 1").is_err());
    }

    #[test]
    fn if_form() -> Result<(), Error>
    {
        let roots = parseSource(r#"(if c 1 2)"#)?;
        assert_eq!(roots,
                   vec![SyntaxTreeNode::If{ cond: Box::new(sym("c")),
                                            branch_true: Box::new(num(1.0)),
                                            branch_false: Box::new(num(2.0)) }]);
        assert!(parseSource("(if c 1)").is_err());
        assert!(parseSource("(if c 1 2 3)").is_err());
        assert!(parseSource("(if c 1 2").is_err());
        Ok(())
    }

    #[test]
    fn while_form() -> Result<(), Error>
    {
        let roots = parseSource("(while (gt x 0) (set x (- x 1)) x)")?;
        if let SyntaxTreeNode::While{ cond, body } = &roots[0]
        {
            assert_eq!(**cond, SyntaxTreeNode::Seq(vec![sym("gt"), sym("x"), num(0.0)]));
            assert_eq!(body.len(), 2);
            assert_eq!(body[1], sym("x"));
        }
        else
        {
            panic!("Not a while: {:?}", roots[0]);
        }

        let roots = parseSource("(while t)")?;
        assert_eq!(roots, vec![SyntaxTreeNode::While{ cond: Box::new(sym("t")),
                                                       body: Vec::new() }]);
        assert!(parseSource("(while)").is_err());
        assert!(parseSource("(while t (prn 1)").is_err());
        Ok(())
    }

    #[test]
    fn for_form() -> Result<(), Error>
    {
        let roots = parseSource("(for (set i 0) (lt i 3) (set i (+ i 1)) (prn i))")?;
        if let SyntaxTreeNode::For{ init, cond, step, body } = &roots[0]
        {
            assert!(matches!(**init, SyntaxTreeNode::Set{ .. }));
            assert!(matches!(**cond, SyntaxTreeNode::Seq(_)));
            assert!(matches!(**step, SyntaxTreeNode::Set{ .. }));
            assert_eq!(body.len(), 1);
        }
        else
        {
            panic!("Not a for: {:?}", roots[0]);
        }
        assert!(parseSource("(for (set i 0) (lt i 3))").is_err());
        Ok(())
    }

    #[test]
    fn defn_form() -> Result<(), Error>
    {
        let roots = parseSource("(defn adder (a b) (+ a b))")?;
        assert_eq!(roots,
                   vec![SyntaxTreeNode::Defn{
                       name: "adder".to_owned(),
                       params: vec!["a".to_owned(), "b".to_owned()],
                       body: vec![SyntaxTreeNode::Seq(vec![
                           sym("+"), sym("a"), sym("b")])]}]);

        let roots = parseSource("(defn nothing ())")?;
        assert_eq!(roots,
                   vec![SyntaxTreeNode::Defn{ name: "nothing".to_owned(),
                                              params: Vec::new(),
                                              body: Vec::new() }]);
        Ok(())
    }

    #[test]
    fn defn_malformed()
    {
        assert!(parseSource("(defn 1 (a) a)").is_err());
        assert!(parseSource("(defn f a a)").is_err());
        match parseSource("(defn f (a 2) a)")
        {
            Err(Error::ParseError(msg)) => assert!(msg.contains("parameter")),
            other => panic!("Unexpected {:?}", other),
        }
        assert!(parseSource("(defn f ((a)) a)").is_err());
        assert!(parseSource("(defn f (a").is_err());
        assert!(parseSource("(defn f (a) a").is_err());
    }

    #[test]
    fn reserved_word_outside_form_head()
    {
        assert!(parseSource("set").is_err());
        assert!(parseSource("(f if)").is_err());
    }

    #[test]
    fn display_round_trip() -> Result<(), Error>
    {
        let sources = [
            r#"(+ 2 7)"#,
            r#"(prn "a \"quoted\"\tline\n" 2.5 (f) ())"#,
            r#"(f (g (h 1 2) x) "y" 10)"#,
            "(set x 5) (while (gt x 0) (set x (- x 1)))",
            "(defn adder (a b) (+ a b)) (adder 2 3)",
            "(for (set i 0) (lt i 3) (set i (+ i 1)) (prn i) i)",
            r#"(if (= 2 2) "yes" "no")"#,
        ];
        for src in &sources
        {
            let roots = parseSource(src)?;
            let printed: Vec<String> = roots.iter().map(|r| r.to_string()).collect();
            let reparsed = parseSource(&printed.join(" "))?;
            assert_eq!(roots, reparsed);
        }
        Ok(())
    }

    #[test]
    fn to_dot() -> Result<(), Error>
    {
        let roots = parseSource(r#"(prn "hi") (set x 1)"#)?;
        let dot = SyntaxTreeNode::toDot(&roots);
        assert!(dot.starts_with("digraph G {"));
        assert!(dot.ends_with("}"));
        assert!(dot.contains(r#"node1 [label="prn"];"#));
        assert!(dot.contains("node0 -> node2;"));
        assert!(dot.contains(r#"[shape=box, label="set x"];"#));
        Ok(())
    }
}
