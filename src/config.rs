// ABOUTME: Version and usage text for the Cocktail CLI

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const USAGE: &str = r#"cocktail [options] ... [-c cmd | <file>] [-o output]
  -a, --ast        Print AST instead of executing
  -c <cmd>         Execute a one-line program
  -l, --lex        Emit tokens instead of executing
  -o <path>        Redirect --ast / --lex output to file
  -h, --help       Show usage
  -v, --version    Show version"#;
