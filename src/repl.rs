use crate::object::Object;
use crate::parser::parse_expr;
use crate::scope::{Scope, ScopeRef};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const PROMPT: &str = "> ";

/// Runs the interactive loop. One top-level scope lives for the whole
/// session, so `def` and `defn` bindings accumulate across inputs. Errors
/// are printed and the session keeps going.
pub fn start(print_ast: bool) -> Result<(), ReadlineError> {
    let mut editor = DefaultEditor::new()?;
    let sc = Scope::new(None);

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "exit" || trimmed == "quit" {
                    return Ok(());
                }
                let _ = editor.add_history_entry(trimmed);
                if let Some(obj) = eval_line(line.as_bytes(), &sc, print_ast) {
                    println!("{}", obj);
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C drops the current line, not the session.
                continue;
            }
            Err(ReadlineError::Eof) => {
                return Ok(());
            }
            Err(err) => {
                return Err(err);
            }
        }
    }
}

/// Evaluates a whole source buffer line by line (one expression per line)
/// against one fresh scope and returns the last result. Parse and eval
/// errors are printed and evaluation continues with the next line.
pub fn run_source(src: &str, print_ast: bool) -> Object {
    let sc = Scope::new(None);
    let mut result = Object::Nil;
    for line in src.lines() {
        if let Some(obj) = eval_line(line.as_bytes(), &sc, print_ast) {
            result = obj;
        }
    }
    result
}

/// Parses and evaluates one expression, reporting any error to stderr.
fn eval_line(src: &[u8], sc: &ScopeRef, print_ast: bool) -> Option<Object> {
    let expr = match parse_expr(src) {
        Ok(expr) => expr,
        Err(err) => {
            eprintln!("syntax error: {}", err);
            return None;
        }
    };
    if print_ast {
        println!("{:#?}", expr);
    }
    match expr.eval(sc) {
        Ok(obj) => Some(obj),
        Err(err) => {
            eprintln!("error: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::run_source;
    use crate::object::Object;

    #[test]
    fn test_run_source_threads_one_scope() {
        let src = "(def x 5)\n(defn double [n] (* n 2))\n(double x)\n";
        assert_eq!(run_source(src, false), Object::Double(10.0));
    }

    #[test]
    fn test_run_source_tolerates_blank_lines() {
        let src = "(def x 1)\n\n(+ x 1)\n";
        assert_eq!(run_source(src, false), Object::Double(2.0));
    }

    #[test]
    fn test_run_source_continues_after_errors() {
        // The failing line is reported but must not stop the run.
        let src = "(def x 5)\nmissing\n(+ x 2)\n";
        assert_eq!(run_source(src, false), Object::Double(7.0));
    }
}
