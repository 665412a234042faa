use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use shared::error::Error;

use lisp::eval::Evaluator;
use lisp::runtime_env::findHistory;

const PROMPT: &str = ">>> ";
const CONTINUE_PROMPT: &str = "... ";

/// Net count of unclosed `(` in `src`, ignoring string literals.
fn openDepth(src: &str) -> i64
{
    let mut depth = 0;
    let mut in_string = false;
    let mut escaped = false;
    for c in src.chars()
    {
        if in_string
        {
            if escaped
            {
                escaped = false;
            }
            else if c == '\\'
            {
                escaped = true;
            }
            else if c == '"' || c == '\n'
            {
                in_string = false;
            }
            continue;
        }

        match c
        {
            '(' => depth += 1,
            ')' => depth -= 1,
            '"' => in_string = true,
            _ => {},
        }
    }
    depth
}

fn evalAndPrint(e: &Evaluator, src: &str)
{
    match e.evalSource(src)
    {
        Ok(value) =>
        {
            if !value.isNull()
            {
                println!("{}", value);
            }
        },
        Err(err) => println!("{}", err),
    }
}

/// Read-eval-print until end of input. Input accumulates until its
/// parentheses balance or a blank line is entered.
pub fn run(e: &Evaluator) -> Result<(), Error>
{
    let mut rl = DefaultEditor::new()
        .map_err(|err| rterr!("Failed to start line editor: {}", err))?;
    let history = findHistory();
    if rl.load_history(&history).is_err()
    {
        tracing::debug!(path = %history.display(), "no history loaded");
    }

    let mut buffer = String::new();
    loop
    {
        let prompt = if buffer.is_empty() { PROMPT } else { CONTINUE_PROMPT };
        match rl.readline(prompt)
        {
            Ok(line) =>
            {
                if line.trim().is_empty()
                {
                    if !buffer.is_empty()
                    {
                        evalAndPrint(e, &buffer);
                        buffer.clear();
                    }
                    continue;
                }

                let _ = rl.add_history_entry(line.as_str());
                if !buffer.is_empty()
                {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                if openDepth(&buffer) <= 0
                {
                    evalAndPrint(e, &buffer);
                    buffer.clear();
                }
            },
            Err(ReadlineError::Interrupted) =>
            {
                buffer.clear();
            },
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(rterr!("Failed to read input: {}", err)),
        }
    }

    if let Err(err) = rl.save_history(&history)
    {
        tracing::warn!(path = %history.display(), error = %err, "failed to save history");
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn open_depth()
    {
        assert_eq!(openDepth("(+ 1 2)"), 0);
        assert_eq!(openDepth("(defn f (a)"), 1);
        assert_eq!(openDepth(r#"(prn "(((")"#), 0);
        assert_eq!(openDepth(r#"(prn "a\"(" "#), 1);
        assert_eq!(openDepth("x)"), -1);
        assert_eq!(openDepth(""), 0);
    }
}
