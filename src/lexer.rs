// ABOUTME: Regex-driven tokenizer over the fixed Cocktail token alphabet

use std::rc::Rc;

use regex::Regex;

use crate::error::{syntax_error, CocktailError};
use crate::module_info::ModuleInfo;
use crate::token::{SourcePos, Token, TokenKind};

/// One entry per token kind, in declaration order. Longest match wins;
/// ties are broken by earlier declaration, which is how `==` beats `=`
/// and a keyword like `break` beats the identical-length `NAME` match
/// without any separate word-boundary pass.
const TOKEN_DEFS: &[(TokenKind, &str)] = &[
    // Keywords (must precede NAME)
    (TokenKind::Break, r"break"),
    (TokenKind::Continue, r"continue"),
    (TokenKind::Elif, r"elif"),
    (TokenKind::Else, r"else"),
    (TokenKind::Func, r"func"),
    (TokenKind::For, r"for"),
    (TokenKind::If, r"if"),
    (TokenKind::In, r"in"),
    (TokenKind::Not, r"not"),
    (TokenKind::Of, r"of"),
    (TokenKind::While, r"while"),
    (TokenKind::Return, r"return"),
    (TokenKind::Global, r"global"),
    (TokenKind::Nonlocal, r"nonlocal"),
    (TokenKind::True, r"true"),
    (TokenKind::False, r"false"),
    (TokenKind::None_, r"none"),
    // Identifiers
    (TokenKind::Name, r"[A-Za-z_]\w*"),
    // Constants
    (TokenKind::Number, r"\d+(\.\d*)?([Ee][+\-]?\d+)?|\.\d+([Ee][+\-]?\d+)?"),
    (
        TokenKind::String,
        r#"[Rr]?"[^"\n\\]*((\\.)[^"\n\\]*)*"|[Rr]?'[^'\n\\]*((\\.)[^'\n\\]*)*'"#,
    ),
    // Parenthesis / brackets / braces
    (TokenKind::LPar, r"\("),
    (TokenKind::RPar, r"\)"),
    (TokenKind::LSqb, r"\["),
    (TokenKind::RSqb, r"\]"),
    (TokenKind::LBrace, r"\{"),
    (TokenKind::RBrace, r"\}"),
    // Punctuation
    (TokenKind::Comma, r","),
    (TokenKind::Dot, r"\."),
    (TokenKind::Colon, r":"),
    (TokenKind::Semi, r";"),
    // In-place ops (multi-char before their single/double-char prefixes)
    (TokenKind::DoubleSlashEqual, r"//="),
    (TokenKind::PlusEqual, r"\+="),
    (TokenKind::MinusEqual, r"-="),
    (TokenKind::StarEqual, r"\*="),
    (TokenKind::SlashEqual, r"/="),
    (TokenKind::PercentEqual, r"%="),
    (TokenKind::DoubleStarEqual, r"\*\*="),
    (TokenKind::LeftShiftEqual, r"<<="),
    (TokenKind::RightShiftEqual, r">>="),
    (TokenKind::AmperEqual, r"&="),
    (TokenKind::CircumflexEqual, r"\^="),
    (TokenKind::VbarEqual, r"\|="),
    // Comparisons (multi-char before shorter prefixes)
    (TokenKind::EqEqEqual, r"==="),
    (TokenKind::NotEqEqEqual, r"!=="),
    (TokenKind::LessEqual, r"<="),
    (TokenKind::EqEqual, r"=="),
    (TokenKind::NotEqual, r"!="),
    (TokenKind::GreaterEqual, r">="),
    // Increment/decrement (before PLUS/MINUS)
    (TokenKind::PlusPlus, r"\+\+"),
    (TokenKind::MinusMinus, r"--"),
    // Arithmetic / bitwise (multi-char before single-char)
    (TokenKind::DoubleSlash, r"//"),
    (TokenKind::DoubleStar, r"\*\*"),
    (TokenKind::LeftShift, r"<<"),
    (TokenKind::RightShift, r">>"),
    (TokenKind::Less, r"<"),
    (TokenKind::Greater, r">"),
    (TokenKind::Plus, r"\+"),
    (TokenKind::Minus, r"-"),
    (TokenKind::Star, r"\*"),
    (TokenKind::Slash, r"/"),
    (TokenKind::Percent, r"%"),
    (TokenKind::Amper, r"&"),
    (TokenKind::Circumflex, r"\^"),
    (TokenKind::Vbar, r"\|"),
    (TokenKind::Tilde, r"~"),
    (TokenKind::Equal, r"="),
];

struct CompiledDefs(Vec<(TokenKind, Regex)>);

fn compiled_defs() -> &'static CompiledDefs {
    use std::sync::OnceLock;
    static DEFS: OnceLock<CompiledDefs> = OnceLock::new();
    DEFS.get_or_init(|| {
        CompiledDefs(
            TOKEN_DEFS
                .iter()
                .map(|(kind, pat)| (*kind, Regex::new(&format!("^(?:{})", pat)).expect("static token pattern")))
                .collect(),
        )
    })
}

fn skip_regex() -> &'static Regex {
    use std::sync::OnceLock;
    static SKIP: OnceLock<Regex> = OnceLock::new();
    SKIP.get_or_init(|| Regex::new(r"^(?:\s+|#[^\n]*|/\*[\s\S]*?\*/)").expect("static skip pattern"))
}

pub struct Lexer {
    info: Rc<ModuleInfo>,
}

impl Lexer {
    pub fn new(info: Rc<ModuleInfo>) -> Self {
        Self { info }
    }

    /// Tokenize the whole source, returning the stream terminated by an
    /// `Eof` token, or the first `SyntaxError` encountered.
    pub fn tokenize(&self) -> Result<Vec<Token>, CocktailError> {
        let source = self.info.source.as_str();
        let defs = compiled_defs();
        let skip = skip_regex();

        let mut tokens = Vec::new();
        let mut idx = 0usize;
        let mut line = 1usize;
        let mut col = 1usize;

        let advance = |s: &str, line: &mut usize, col: &mut usize| {
            for ch in s.chars() {
                if ch == '\n' {
                    *line += 1;
                    *col = 1;
                } else {
                    *col += 1;
                }
            }
        };

        loop {
            let rest = &source[idx..];
            if rest.is_empty() {
                break;
            }

            if let Some(m) = skip.find(rest) {
                if !m.as_str().is_empty() {
                    advance(m.as_str(), &mut line, &mut col);
                    idx += m.end();
                    continue;
                }
            }

            let mut best: Option<(TokenKind, usize)> = None;
            for (kind, re) in &defs.0 {
                if let Some(m) = re.find(rest) {
                    let len = m.end();
                    if len == 0 {
                        continue;
                    }
                    match best {
                        Some((_, best_len)) if len <= best_len => {}
                        _ => best = Some((*kind, len)),
                    }
                }
            }

            match best {
                Some((kind, len)) => {
                    let lexeme = &rest[..len];
                    let pos = SourcePos { line, col, idx };
                    tokens.push(Token::new(kind, lexeme, pos, self.info.clone()));
                    advance(lexeme, &mut line, &mut col);
                    idx += len;
                }
                None => {
                    let pos = SourcePos { line, col, idx };
                    let bad = Token::new(TokenKind::Eof, "", pos, self.info.clone());
                    return Err(syntax_error(self.info.clone(), Some(bad), "invalid syntax"));
                }
            }
        }

        let eof_pos = SourcePos { line, col, idx };
        tokens.push(Token::new(TokenKind::Eof, "", eof_pos, self.info.clone()));
        Ok(tokens)
    }
}

pub fn tokenize(info: Rc<ModuleInfo>) -> Result<Vec<Token>, CocktailError> {
    Lexer::new(info).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let info = ModuleInfo::unknown(src);
        tokenize(info).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_beat_identical_length_names() {
        assert_eq!(kinds("break"), vec![TokenKind::Break, TokenKind::Eof]);
    }

    #[test]
    fn longest_match_disambiguates_compound_operators() {
        assert_eq!(kinds("=="), vec![TokenKind::EqEqual, TokenKind::Eof]);
        assert_eq!(kinds("="), vec![TokenKind::Equal, TokenKind::Eof]);
        assert_eq!(kinds("//="), vec![TokenKind::DoubleSlashEqual, TokenKind::Eof]);
        assert_eq!(kinds("//"), vec![TokenKind::DoubleSlash, TokenKind::Eof]);
        assert_eq!(kinds("/"), vec![TokenKind::Slash, TokenKind::Eof]);
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        assert_eq!(kinds("1 # comment\n+ 2"), vec![TokenKind::Number, TokenKind::Plus, TokenKind::Number, TokenKind::Eof]);
        assert_eq!(kinds("1 /* block\ncomment */ + 2"), vec![TokenKind::Number, TokenKind::Plus, TokenKind::Number, TokenKind::Eof]);
    }

    #[test]
    fn tracks_line_and_column() {
        let info = ModuleInfo::unknown("a\nbb");
        let tokens = tokenize(info).unwrap();
        assert_eq!(tokens[0].pos.line, 1);
        assert_eq!(tokens[1].pos.line, 2);
        assert_eq!(tokens[1].pos.col, 1);
    }

    #[test]
    fn invalid_character_is_a_syntax_error() {
        let info = ModuleInfo::unknown("1 $ 2");
        assert!(tokenize(info).is_err());
    }

    #[test]
    fn raw_string_prefix_is_part_of_the_string_token() {
        let info = ModuleInfo::unknown(r#"r"a\nb""#);
        let tokens = tokenize(info).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, r#"r"a\nb""#);
    }
}
