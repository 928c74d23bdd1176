// ABOUTME: The single error-emission sink that renders §6.3 frames and terminates the process

use crate::error::CocktailError;

/// Render `err` in the
/// ```text
///   File "<path>", line <N>
///     <source line>
///     <padding>^
/// <Category>: <message>
/// ```
/// form, omitting only the caret line when the error is tagged
/// "line-only" (the source line itself is always shown), and return
/// the exit code the process should use.
pub fn format(err: &CocktailError) -> String {
    let info = err.info();
    let mut frame = String::new();

    if let Some(token) = err.token() {
        let lineno = token.pos.line;
        frame.push_str(&format!("  File \"{}\", line {}\n", info.path, lineno));
        let source_line = info.line(lineno);
        frame.push_str(&format!("    {}\n", source_line));
        if !err.line_only() {
            let padding = " ".repeat(token.pos.col.saturating_sub(1));
            frame.push_str(&format!("    {}^\n", padding));
        }
    } else {
        frame.push_str(&format!("  File \"{}\"\n", info.path));
    }

    frame.push_str(&format!("{}: {}", err.category(), err.message()));
    frame
}

/// Print the formatted diagnostic to stderr and return the process exit
/// code. Every fatal error in the interpreter funnels through this
/// function so the diagnostic format stays uniform end to end.
pub fn report(err: &CocktailError) -> i32 {
    eprintln!("{}", format(err));
    1
}
