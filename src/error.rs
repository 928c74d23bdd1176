// ABOUTME: The CocktailError taxonomy and helper constructors for the single error-emission sink

use std::rc::Rc;

use thiserror::Error;

use crate::module_info::ModuleInfo;
use crate::token::Token;

/// One entry per error category. Every variant carries the position
/// context needed to render the diagnostic frame, plus `line_only`
/// which suppresses the caret line when set.
#[derive(Debug, Error)]
pub enum CocktailError {
    #[error("SyntaxError: {message}")]
    Syntax { message: String, info: Rc<ModuleInfo>, token: Option<Token>, line_only: bool },

    #[error("NameError: {message}")]
    Name { message: String, info: Rc<ModuleInfo>, token: Option<Token>, line_only: bool },

    #[error("TypeError: {message}")]
    Type { message: String, info: Rc<ModuleInfo>, token: Option<Token>, line_only: bool },

    #[error("ValueError: {message}")]
    Value { message: String, info: Rc<ModuleInfo>, token: Option<Token>, line_only: bool },

    #[error("IndexError: {message}")]
    Index { message: String, info: Rc<ModuleInfo>, token: Option<Token>, line_only: bool },

    #[error("RegexError: {message}")]
    Regex { message: String, info: Rc<ModuleInfo>, token: Option<Token>, line_only: bool },
}

impl CocktailError {
    pub fn category(&self) -> &'static str {
        match self {
            CocktailError::Syntax { .. } => "SyntaxError",
            CocktailError::Name { .. } => "NameError",
            CocktailError::Type { .. } => "TypeError",
            CocktailError::Value { .. } => "ValueError",
            CocktailError::Index { .. } => "IndexError",
            CocktailError::Regex { .. } => "RegexError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CocktailError::Syntax { message, .. }
            | CocktailError::Name { message, .. }
            | CocktailError::Type { message, .. }
            | CocktailError::Value { message, .. }
            | CocktailError::Index { message, .. }
            | CocktailError::Regex { message, .. } => message,
        }
    }

    pub fn info(&self) -> &Rc<ModuleInfo> {
        match self {
            CocktailError::Syntax { info, .. }
            | CocktailError::Name { info, .. }
            | CocktailError::Type { info, .. }
            | CocktailError::Value { info, .. }
            | CocktailError::Index { info, .. }
            | CocktailError::Regex { info, .. } => info,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            CocktailError::Syntax { token, .. }
            | CocktailError::Name { token, .. }
            | CocktailError::Type { token, .. }
            | CocktailError::Value { token, .. }
            | CocktailError::Index { token, .. }
            | CocktailError::Regex { token, .. } => token.as_ref(),
        }
    }

    pub fn line_only(&self) -> bool {
        match self {
            CocktailError::Syntax { line_only, .. }
            | CocktailError::Name { line_only, .. }
            | CocktailError::Type { line_only, .. }
            | CocktailError::Value { line_only, .. }
            | CocktailError::Index { line_only, .. }
            | CocktailError::Regex { line_only, .. } => *line_only,
        }
    }
}

pub fn syntax_error(info: Rc<ModuleInfo>, token: Option<Token>, message: impl Into<String>) -> CocktailError {
    CocktailError::Syntax { message: message.into(), info, token, line_only: false }
}

pub fn name_error(info: Rc<ModuleInfo>, token: Option<Token>, message: impl Into<String>) -> CocktailError {
    CocktailError::Name { message: message.into(), info, token, line_only: false }
}

pub fn type_error(info: Rc<ModuleInfo>, token: Option<Token>, message: impl Into<String>) -> CocktailError {
    CocktailError::Type { message: message.into(), info, token, line_only: true }
}

pub fn value_error(info: Rc<ModuleInfo>, token: Option<Token>, message: impl Into<String>) -> CocktailError {
    CocktailError::Value { message: message.into(), info, token, line_only: true }
}

pub fn index_error(info: Rc<ModuleInfo>, token: Option<Token>, message: impl Into<String>) -> CocktailError {
    CocktailError::Index { message: message.into(), info, token, line_only: true }
}

pub fn regex_error(info: Rc<ModuleInfo>, token: Option<Token>, message: impl Into<String>) -> CocktailError {
    CocktailError::Regex { message: message.into(), info, token, line_only: true }
}
