//! Restricted expression language for `expression` column filters
//!
//! A filter fragment such as `> 3`, `in [1, 2, 5]` or `>= 'b' and != 'c'` is
//! evaluated with the cell value placed in front of it. Only literals,
//! comparisons, membership tests and boolean operators are understood; there
//! are no names, calls or arithmetic.

use crate::data::DataValue;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // The cell under test
    Cell,

    // Literals
    Integer(i64),
    Float(f64),
    Str(String),
    True,
    False,
    None,

    // Keywords
    And,
    Or,
    Not,
    In,

    // Operators
    Equals,
    NotEquals,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
    Minus,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,

    Eof,
}

/// Value produced while evaluating an expression
#[derive(Debug, Clone, PartialEq)]
pub enum ExprValue {
    Integer(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    None,
    List(Vec<ExprValue>),
}

impl ExprValue {
    /// Literal used for the cell: raw form for basic scalars,
    /// display text otherwise
    pub fn from_cell(value: &DataValue, display: &str) -> Self {
        match value {
            DataValue::Integer(i) => ExprValue::Integer(*i),
            DataValue::Float(f) => ExprValue::Float(*f),
            DataValue::Text(s) => ExprValue::Str(s.clone()),
            DataValue::Boolean(b) => ExprValue::Bool(*b),
            _ => ExprValue::Str(display.to_string()),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            ExprValue::Integer(i) => *i != 0,
            ExprValue::Float(f) => *f != 0.0,
            ExprValue::Str(s) => !s.is_empty(),
            ExprValue::Bool(b) => *b,
            ExprValue::None => false,
            ExprValue::List(items) => !items.is_empty(),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            ExprValue::Integer(i) => Some(*i as f64),
            ExprValue::Float(f) => Some(*f),
            ExprValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ExprValue::Integer(_) => "int",
            ExprValue::Float(_) => "float",
            ExprValue::Str(_) => "str",
            ExprValue::Bool(_) => "bool",
            ExprValue::None => "NoneType",
            ExprValue::List(_) => "list",
        }
    }
}

impl fmt::Display for ExprValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprValue::Integer(i) => write!(f, "{}", i),
            ExprValue::Float(fl) => write!(f, "{}", fl),
            ExprValue::Str(s) => write!(f, "{:?}", s),
            ExprValue::Bool(true) => write!(f, "True"),
            ExprValue::Bool(false) => write!(f, "False"),
            ExprValue::None => write!(f, "None"),
            ExprValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|item| item.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Errors raised while compiling or evaluating an expression
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpressionError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unknown name '{0}'")]
    UnknownName(String),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("'{op}' not supported between '{left}' and '{right}'")]
    Type {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current = chars.first().copied();
        Self {
            input: chars,
            position: 0,
            current_char: current,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote_char: char) -> Result<String, ExpressionError> {
        let mut result = String::new();
        self.advance(); // skip opening quote

        while let Some(ch) = self.current_char {
            if ch == quote_char {
                self.advance();
                return Ok(result);
            }
            if ch == '\\' {
                self.advance();
                match self.current_char {
                    Some('n') => result.push('\n'),
                    Some('t') => result.push('\t'),
                    Some(other) => result.push(other),
                    None => break,
                }
                self.advance();
                continue;
            }
            result.push(ch);
            self.advance();
        }
        Err(ExpressionError::UnterminatedString)
    }

    fn read_number(&mut self) -> Result<Token, ExpressionError> {
        let mut result = String::new();
        let mut is_float = false;
        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() || ch == '_' {
                result.push(ch);
            } else if ch == '.' || ch == 'e' || ch == 'E' {
                is_float = true;
                result.push(ch);
            } else if (ch == '-' || ch == '+') && matches!(result.chars().last(), Some('e' | 'E')) {
                result.push(ch);
            } else {
                break;
            }
            self.advance();
        }

        let cleaned = result.replace('_', "");
        if is_float {
            cleaned
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| ExpressionError::InvalidNumber(result))
        } else {
            cleaned
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| ExpressionError::InvalidNumber(result))
        }
    }

    fn two_char(&mut self, token: Token) -> Token {
        self.advance();
        self.advance();
        token
    }

    fn one_char(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    pub fn next_token(&mut self) -> Result<Token, ExpressionError> {
        self.skip_whitespace();

        let ch = match self.current_char {
            None => return Ok(Token::Eof),
            Some(ch) => ch,
        };

        let token = match ch {
            '=' if self.peek(1) == Some('=') => self.two_char(Token::Equals),
            '!' if self.peek(1) == Some('=') => self.two_char(Token::NotEquals),
            '<' if self.peek(1) == Some('=') => self.two_char(Token::LessThanEquals),
            '>' if self.peek(1) == Some('=') => self.two_char(Token::GreaterThanEquals),
            '<' => self.one_char(Token::LessThan),
            '>' => self.one_char(Token::GreaterThan),
            '-' => self.one_char(Token::Minus),
            '(' => self.one_char(Token::LeftParen),
            ')' => self.one_char(Token::RightParen),
            '[' => self.one_char(Token::LeftBracket),
            ']' => self.one_char(Token::RightBracket),
            ',' => self.one_char(Token::Comma),
            '\'' | '"' => Token::Str(self.read_string(ch)?),
            c if c.is_ascii_digit() => self.read_number()?,
            '.' if self.peek(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number()?,
            c if c.is_alphabetic() || c == '_' => {
                let ident = self.read_identifier();
                match ident.as_str() {
                    "True" => Token::True,
                    "False" => Token::False,
                    "None" => Token::None,
                    _ => match ident.to_ascii_lowercase().as_str() {
                        "and" => Token::And,
                        "or" => Token::Or,
                        "not" => Token::Not,
                        "in" => Token::In,
                        _ => return Err(ExpressionError::UnknownName(ident)),
                    },
                }
            }
            other => return Err(ExpressionError::UnexpectedChar(other)),
        };
        Ok(token)
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, ExpressionError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    In,
    NotIn,
}

impl ComparisonOp {
    fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Equal => "==",
            ComparisonOp::NotEqual => "!=",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessThanOrEqual => "<=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterThanOrEqual => ">=",
            ComparisonOp::In => "in",
            ComparisonOp::NotIn => "not in",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Cell,
    Literal(ExprValue),
    List(Vec<Expr>),
    Negate(Box<Expr>),
    Not(Box<Expr>),
    /// Operands of an `and` chain, in source order
    And(Vec<Expr>),
    /// Operands of an `or` chain, in source order
    Or(Vec<Expr>),
    /// `a < b <= c` chains evaluate pairwise and short-circuit
    Compare(Box<Expr>, Vec<(ComparisonOp, Expr)>),
}

/// Deepest nesting of brackets, parentheses, `not` and unary minus
const MAX_NESTING: usize = 64;

struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ExpressionError>,
    ) -> Result<T, ExpressionError> {
        if self.depth >= MAX_NESTING {
            return Err(ExpressionError::Syntax(
                "expression nested too deeply".to_string(),
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.tokens.get(self.current + 1)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.current).cloned();
        self.current += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), ExpressionError> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(ExpressionError::Syntax(format!(
                "expected {:?}, found {:?}",
                expected, token
            ))),
            None => Err(ExpressionError::Syntax(format!(
                "expected {:?}, found end of input",
                expected
            ))),
        }
    }

    // Parse OR expressions (lowest precedence)
    fn parse_or_expr(&mut self) -> Result<Expr, ExpressionError> {
        let mut operands = vec![self.parse_and_expr()?];
        while let Some(Token::Or) = self.current_token() {
            self.advance();
            operands.push(self.parse_and_expr()?);
        }
        Ok(match operands.len() {
            1 => operands.remove(0),
            _ => Expr::Or(operands),
        })
    }

    fn parse_and_expr(&mut self) -> Result<Expr, ExpressionError> {
        let mut operands = vec![self.parse_not_expr()?];
        while let Some(Token::And) = self.current_token() {
            self.advance();
            operands.push(self.parse_not_expr()?);
        }
        Ok(match operands.len() {
            1 => operands.remove(0),
            _ => Expr::And(operands),
        })
    }

    fn parse_not_expr(&mut self) -> Result<Expr, ExpressionError> {
        if let Some(Token::Not) = self.current_token() {
            self.advance();
            let inner = self.nested(Self::parse_not_expr)?;
            Ok(Expr::Not(Box::new(inner)))
        } else {
            self.parse_comparison()
        }
    }

    fn comparison_op(&mut self) -> Option<ComparisonOp> {
        let token = self.current_token()?.clone();
        let op = match token {
            Token::Equals => ComparisonOp::Equal,
            Token::NotEquals => ComparisonOp::NotEqual,
            Token::LessThan => ComparisonOp::LessThan,
            Token::LessThanEquals => ComparisonOp::LessThanOrEqual,
            Token::GreaterThan => ComparisonOp::GreaterThan,
            Token::GreaterThanEquals => ComparisonOp::GreaterThanOrEqual,
            Token::In => ComparisonOp::In,
            Token::Not if self.peek_token() == Some(&Token::In) => {
                self.advance();
                ComparisonOp::NotIn
            }
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExpressionError> {
        let first = self.parse_operand()?;
        let mut rest = Vec::new();
        while let Some(op) = self.comparison_op() {
            rest.push((op, self.parse_operand()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare(Box::new(first), rest))
        }
    }

    fn parse_operand(&mut self) -> Result<Expr, ExpressionError> {
        match self.advance() {
            Some(Token::Cell) => Ok(Expr::Cell),
            Some(Token::Integer(i)) => Ok(Expr::Literal(ExprValue::Integer(i))),
            Some(Token::Float(f)) => Ok(Expr::Literal(ExprValue::Float(f))),
            Some(Token::Str(s)) => Ok(Expr::Literal(ExprValue::Str(s))),
            Some(Token::True) => Ok(Expr::Literal(ExprValue::Bool(true))),
            Some(Token::False) => Ok(Expr::Literal(ExprValue::Bool(false))),
            Some(Token::None) => Ok(Expr::Literal(ExprValue::None)),
            Some(Token::Minus) => {
                let inner = self.nested(Self::parse_operand)?;
                Ok(Expr::Negate(Box::new(inner)))
            }
            Some(Token::LeftParen) => self.nested(|parser| {
                let expr = parser.parse_or_expr()?;
                parser.expect(Token::RightParen)?;
                Ok(expr)
            }),
            Some(Token::LeftBracket) => self.nested(Self::parse_list),
            Some(token) => Err(ExpressionError::Syntax(format!(
                "unexpected token {:?}",
                token
            ))),
            None => Err(ExpressionError::Syntax("unexpected end of input".to_string())),
        }
    }

    // The opening bracket is already consumed
    fn parse_list(&mut self) -> Result<Expr, ExpressionError> {
        let mut items = Vec::new();
        if self.current_token() == Some(&Token::RightBracket) {
            self.advance();
            return Ok(Expr::List(items));
        }
        loop {
            items.push(self.parse_or_expr()?);
            match self.advance() {
                Some(Token::Comma) => {
                    // trailing comma
                    if self.current_token() == Some(&Token::RightBracket) {
                        self.advance();
                        break;
                    }
                }
                Some(Token::RightBracket) => break,
                other => {
                    return Err(ExpressionError::Syntax(format!(
                        "expected ',' or ']', found {:?}",
                        other
                    )))
                }
            }
        }
        Ok(Expr::List(items))
    }
}

fn type_error(op: &'static str, left: &ExprValue, right: &ExprValue) -> ExpressionError {
    ExpressionError::Type {
        op,
        left: left.type_name(),
        right: right.type_name(),
    }
}

fn values_equal(left: &ExprValue, right: &ExprValue) -> bool {
    match (left, right) {
        (ExprValue::Str(a), ExprValue::Str(b)) => a == b,
        (ExprValue::None, ExprValue::None) => true,
        (ExprValue::List(a), ExprValue::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        _ => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

fn order_values(
    op: &'static str,
    left: &ExprValue,
    right: &ExprValue,
) -> Result<Option<Ordering>, ExpressionError> {
    match (left, right) {
        (ExprValue::Str(a), ExprValue::Str(b)) => Ok(Some(a.cmp(b))),
        _ => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => Ok(a.partial_cmp(&b)),
            _ => Err(type_error(op, left, right)),
        },
    }
}

fn contains(container: &ExprValue, item: &ExprValue) -> Result<bool, ExpressionError> {
    match (container, item) {
        (ExprValue::List(items), _) => Ok(items.iter().any(|candidate| values_equal(candidate, item))),
        (ExprValue::Str(haystack), ExprValue::Str(needle)) => Ok(haystack.contains(needle.as_str())),
        _ => Err(type_error("in", item, container)),
    }
}

fn compare(op: ComparisonOp, left: &ExprValue, right: &ExprValue) -> Result<bool, ExpressionError> {
    let symbol = op.symbol();
    match op {
        ComparisonOp::Equal => Ok(values_equal(left, right)),
        ComparisonOp::NotEqual => Ok(!values_equal(left, right)),
        ComparisonOp::LessThan => {
            Ok(order_values(symbol, left, right)? == Some(Ordering::Less))
        }
        ComparisonOp::LessThanOrEqual => Ok(matches!(
            order_values(symbol, left, right)?,
            Some(Ordering::Less | Ordering::Equal)
        )),
        ComparisonOp::GreaterThan => {
            Ok(order_values(symbol, left, right)? == Some(Ordering::Greater))
        }
        ComparisonOp::GreaterThanOrEqual => Ok(matches!(
            order_values(symbol, left, right)?,
            Some(Ordering::Greater | Ordering::Equal)
        )),
        ComparisonOp::In => contains(right, left),
        ComparisonOp::NotIn => Ok(!contains(right, left)?),
    }
}

fn evaluate(expr: &Expr, cell: &ExprValue) -> Result<ExprValue, ExpressionError> {
    match expr {
        Expr::Cell => Ok(cell.clone()),
        Expr::Literal(value) => Ok(value.clone()),
        Expr::List(items) => items
            .iter()
            .map(|item| evaluate(item, cell))
            .collect::<Result<Vec<_>, _>>()
            .map(ExprValue::List),
        Expr::Negate(inner) => match evaluate(inner, cell)? {
            ExprValue::Integer(i) => Ok(ExprValue::Integer(-i)),
            ExprValue::Float(f) => Ok(ExprValue::Float(-f)),
            ExprValue::Bool(b) => Ok(ExprValue::Integer(-(b as i64))),
            other => Err(ExpressionError::Type {
                op: "-",
                left: other.type_name(),
                right: other.type_name(),
            }),
        },
        Expr::Not(inner) => Ok(ExprValue::Bool(!evaluate(inner, cell)?.is_truthy())),
        // `and`/`or` yield one of their operands, not a bool
        Expr::And(operands) => {
            let mut value = ExprValue::Bool(true);
            for operand in operands {
                value = evaluate(operand, cell)?;
                if !value.is_truthy() {
                    break;
                }
            }
            Ok(value)
        }
        Expr::Or(operands) => {
            let mut value = ExprValue::Bool(false);
            for operand in operands {
                value = evaluate(operand, cell)?;
                if value.is_truthy() {
                    break;
                }
            }
            Ok(value)
        }
        Expr::Compare(first, rest) => {
            let mut left = evaluate(first, cell)?;
            for (op, operand) in rest {
                let right = evaluate(operand, cell)?;
                if !compare(*op, &left, &right)? {
                    return Ok(ExprValue::Bool(false));
                }
                left = right;
            }
            Ok(ExprValue::Bool(true))
        }
    }
}

/// A filter fragment compiled once and evaluated against many cells
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    source: String,
    ast: Expr,
}

impl CompiledExpression {
    /// Compile `fragment` as the tail of `<cell> <fragment>`
    pub fn compile(fragment: &str) -> Result<Self, ExpressionError> {
        let mut tokens = vec![Token::Cell];
        tokens.extend(Lexer::new(fragment).tokenize()?);

        let mut parser = Parser::new(tokens);
        let ast = parser.parse_or_expr()?;
        if let Some(token) = parser.current_token() {
            return Err(ExpressionError::Syntax(format!(
                "unexpected trailing token {:?}",
                token
            )));
        }

        Ok(Self {
            source: fragment.to_string(),
            ast,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    /// Evaluate with `cell` bound to the leading operand
    pub fn evaluate(&self, cell: &ExprValue) -> Result<ExprValue, ExpressionError> {
        evaluate(&self.ast, cell)
    }

    /// Whether the cell passes: anything but an exact `False` passes
    pub fn passes(&self, cell: &ExprValue) -> Result<bool, ExpressionError> {
        Ok(self.evaluate(cell)? != ExprValue::Bool(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passes(cell: ExprValue, fragment: &str) -> Result<bool, ExpressionError> {
        CompiledExpression::compile(fragment)?.passes(&cell)
    }

    #[test]
    fn test_simple_comparisons() {
        assert!(passes(ExprValue::Integer(5), "> 3").unwrap());
        assert!(!passes(ExprValue::Integer(2), "> 3").unwrap());
        assert!(passes(ExprValue::Float(2.5), "<= 2.5").unwrap());
        assert!(passes(ExprValue::Str("abc".into()), "== 'abc'").unwrap());
        assert!(passes(ExprValue::Str("abc".into()), "!= \"abd\"").unwrap());
    }

    #[test]
    fn test_boolean_operators() {
        assert!(passes(ExprValue::Integer(5), "> 3 and 5 < 10").unwrap());
        assert!(!passes(ExprValue::Integer(5), "> 7 or False").unwrap());
        assert!(passes(ExprValue::Integer(5), "> 7 or True").unwrap());
    }

    #[test]
    fn test_chained_comparison() {
        assert!(passes(ExprValue::Integer(5), "< 7 < 9").unwrap());
        assert!(!passes(ExprValue::Integer(5), "< 7 < 6").unwrap());
    }

    #[test]
    fn test_membership() {
        assert!(passes(ExprValue::Integer(2), "in [1, 2, 3]").unwrap());
        assert!(passes(ExprValue::Integer(4), "not in [1, 2, 3]").unwrap());
        assert!(passes(ExprValue::Str("b".into()), "in 'abc'").unwrap());
    }

    #[test]
    fn test_negative_numbers() {
        assert!(passes(ExprValue::Integer(-4), "< -3").unwrap());
    }

    #[test]
    fn test_bool_cell_compares_numerically() {
        assert!(passes(ExprValue::Bool(true), "== 1").unwrap());
        assert!(passes(ExprValue::Bool(true), "== True").unwrap());
    }

    #[test]
    fn test_non_false_result_passes() {
        // `5 or 0` evaluates to 5, which is not the boolean False
        assert!(passes(ExprValue::Integer(5), "or 0").unwrap());
    }

    #[test]
    fn test_type_mismatch_is_error() {
        assert!(matches!(
            passes(ExprValue::Str("abc".into()), "> 3"),
            Err(ExpressionError::Type { .. })
        ));
    }

    #[test]
    fn test_arbitrary_code_is_rejected() {
        assert!(matches!(
            CompiledExpression::compile("== __import__('os')"),
            Err(ExpressionError::UnknownName(_))
        ));
        assert!(CompiledExpression::compile("> ").is_err());
        assert!(CompiledExpression::compile("> 3 3").is_err());
        assert!(CompiledExpression::compile("== 'open").is_err());
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let depth = 10_000;
        let fragment = format!("== {}1{}", "(".repeat(depth), ")".repeat(depth));
        assert!(matches!(
            CompiledExpression::compile(&fragment),
            Err(ExpressionError::Syntax(_))
        ));

        let nots = format!("and {}True", "not ".repeat(depth));
        assert!(CompiledExpression::compile(&nots).is_err());
        let minus = format!("== {}1", "-".repeat(depth));
        assert!(CompiledExpression::compile(&minus).is_err());
        let lists = format!("in {}1{}", "[".repeat(depth), "]".repeat(depth));
        assert!(CompiledExpression::compile(&lists).is_err());
    }

    #[test]
    fn test_nesting_within_limit() {
        let fragment = format!("== {}1{}", "(".repeat(32), ")".repeat(32));
        assert!(passes(ExprValue::Integer(1), &fragment).unwrap());
        assert!(passes(ExprValue::Integer(1), "== --1").unwrap());
    }

    #[test]
    fn test_long_boolean_chain() {
        let chain = format!("> 0{}", " and True".repeat(10_000));
        assert!(passes(ExprValue::Integer(1), &chain).unwrap());
        assert!(!passes(ExprValue::Integer(-1), &chain).unwrap());

        let alternatives = format!("< 0{}", " or False".repeat(10_000));
        assert!(!passes(ExprValue::Integer(1), &alternatives).unwrap());
    }
}
