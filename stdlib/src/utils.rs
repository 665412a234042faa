use std::fmt;

use regex::{NoExpand, Regex};

/// `%{key}` substitution over a template string.
pub struct SimpleTemplate
{
    tplt: String,
}

impl SimpleTemplate
{
    pub fn new(s: &str) -> Self
    {
        Self {tplt: s.to_string()}
    }

    pub fn apply<ValueType: fmt::Display>(self, key: &str, value: ValueType)
                                          -> Self
    {
        let pattern = match Regex::new(&format!(r"%\{{{}\}}", regex::escape(key)))
        {
            Ok(p) => p,
            Err(_) => return self,
        };
        let replacement = format!("{}", value);
        Self::new(&pattern.replace_all(&self.tplt, NoExpand(&replacement))
                  .into_owned())
    }

    pub fn result(self) -> String
    {
        self.tplt
    }
}
