//! A tiny calculator language with Python-like blocks
//!
//! ```text
//! x = 3
//! while x > 0:
//!     print(x)
//!     x = x - 1
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use consoline::error::ExecError;
use consoline::interpreter::{CompileMode, CompileOutcome, ExecContext, Interpreter};

pub const KEYWORDS: [&str; 3] = ["if", "else", "while"];
pub const BUILTINS: [&str; 4] = ["abs", "clear", "exit", "print"];

const LOOP_LIMIT: usize = 100_000;

/// Variables, shared with the completer
pub type Variables = Rc<RefCell<BTreeMap<String, f64>>>;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Op(&'static str),
    Colon,
}

const OPERATORS: [&str; 15] = [
    "==", "!=", "<=", ">=", "+", "-", "*", "/", "%", "(", ")", "=", "<", ">", ",",
];

fn tokenize(line: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut rest = line;

    while let Some(c) = rest.chars().next() {
        if c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
        } else if c == '#' {
            break;
        } else if c == ':' {
            tokens.push(Token::Colon);
            rest = &rest[1..];
        } else if c.is_ascii_digit() || c == '.' {
            let end = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(rest.len());
            let number = rest[..end]
                .parse()
                .map_err(|_| format!("invalid number literal '{}'", &rest[..end]))?;
            tokens.push(Token::Num(number));
            rest = &rest[end..];
        } else if c.is_alphabetic() || c == '_' {
            let end = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            tokens.push(Token::Ident(rest[..end].to_string()));
            rest = &rest[end..];
        } else if let Some(op) = OPERATORS.iter().copied().find(|op| rest.starts_with(op)) {
            tokens.push(Token::Op(op));
            rest = &rest[op.len()..];
        } else {
            return Err(format!("invalid character '{}'", c));
        }
    }

    Ok(tokens)
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Num(f64),
    Var(String),
    Neg(Box<Expr>),
    Binary(&'static str, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign(String, Expr),
    Expr(Expr),
    If(Expr, Vec<Stmt>, Vec<Stmt>),
    While(Expr, Vec<Stmt>),
}

struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> ExprParser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek_op(&self) -> Option<&'static str> {
        match self.tokens.get(self.pos) {
            Some(Token::Op(op)) => Some(op),
            _ => None,
        }
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if self.peek_op() == Some(op) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn binary(
        &mut self,
        ops: &[&'static str],
        next: fn(&mut Self) -> Result<Expr, String>,
    ) -> Result<Expr, String> {
        let mut lhs = next(self)?;

        while let Some(op) = self.peek_op().filter(|op| ops.contains(op)) {
            self.pos += 1;
            let rhs = next(self)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }

        Ok(lhs)
    }

    fn expr(&mut self) -> Result<Expr, String> {
        self.binary(&["==", "!=", "<", "<=", ">", ">="], Self::additive)
    }

    fn additive(&mut self) -> Result<Expr, String> {
        self.binary(&["+", "-"], Self::term)
    }

    fn term(&mut self) -> Result<Expr, String> {
        self.binary(&["*", "/", "%"], Self::unary)
    }

    fn unary(&mut self) -> Result<Expr, String> {
        if self.eat_op("-") {
            Ok(Expr::Neg(Box::new(self.unary()?)))
        } else {
            self.primary()
        }
    }

    fn primary(&mut self) -> Result<Expr, String> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;

        match token {
            Some(Token::Num(n)) => Ok(Expr::Num(n)),
            Some(Token::Ident(name)) if KEYWORDS.contains(&name.as_str()) => {
                Err("invalid syntax".to_string())
            }
            Some(Token::Ident(name)) => {
                if !self.eat_op("(") {
                    return Ok(Expr::Var(name));
                }

                let mut args = Vec::new();
                if !self.eat_op(")") {
                    loop {
                        args.push(self.expr()?);
                        if self.eat_op(")") {
                            break;
                        }
                        if !self.eat_op(",") {
                            return Err("expected ',' or ')'".to_string());
                        }
                    }
                }
                Ok(Expr::Call(name, args))
            }
            Some(Token::Op("(")) => {
                let inner = self.expr()?;
                if self.eat_op(")") {
                    Ok(inner)
                } else {
                    Err("expected ')'".to_string())
                }
            }
            _ => Err("invalid syntax".to_string()),
        }
    }

    fn finish(mut self) -> Result<Expr, String> {
        let expr = self.expr()?;

        if self.pos == self.tokens.len() {
            Ok(expr)
        } else {
            Err("invalid syntax".to_string())
        }
    }
}

fn parse_expr(tokens: &[Token]) -> Result<Expr, String> {
    ExprParser::new(tokens).finish()
}

fn bracket_depth(source: &str) -> isize {
    source
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::chars)
        .fold(0, |depth, c| match c {
            '(' => depth + 1,
            ')' => depth - 1,
            _ => depth,
        })
}

struct Line {
    indent: usize,
    tokens: Vec<Token>,
}

enum LineKind {
    If(Expr),
    Else,
    While(Expr),
    Simple(Stmt),
}

fn classify(tokens: &[Token]) -> Result<LineKind, String> {
    if let (Some(Token::Ident(keyword)), Some(Token::Colon)) = (tokens.first(), tokens.last()) {
        let condition = &tokens[1..tokens.len() - 1];

        return match keyword.as_str() {
            "if" => Ok(LineKind::If(parse_expr(condition)?)),
            "while" => Ok(LineKind::While(parse_expr(condition)?)),
            "else" if condition.is_empty() => Ok(LineKind::Else),
            _ => Err("invalid syntax".to_string()),
        };
    }

    simple_statement(tokens).map(LineKind::Simple)
}

fn simple_statement(tokens: &[Token]) -> Result<Stmt, String> {
    if tokens.contains(&Token::Colon) {
        return Err("invalid syntax".to_string());
    }

    match tokens {
        [Token::Ident(name), Token::Op("="), rest @ ..] => {
            if KEYWORDS.contains(&name.as_str()) || BUILTINS.contains(&name.as_str()) {
                return Err(format!("cannot assign to {}", name));
            }
            Ok(Stmt::Assign(name.clone(), parse_expr(rest)?))
        }
        _ => Ok(Stmt::Expr(parse_expr(tokens)?)),
    }
}

#[derive(Debug, PartialEq)]
enum ParseError {
    /// A block header is the last line, its body has not been typed yet
    Unfinished,
    Invalid(String),
}

impl From<String> for ParseError {
    fn from(message: String) -> Self {
        ParseError::Invalid(message)
    }
}

impl ParseError {
    fn into_message(self) -> String {
        match self {
            ParseError::Unfinished => "expected an indented block".to_string(),
            ParseError::Invalid(message) => message,
        }
    }
}

struct BlockParser {
    lines: Vec<Line>,
    pos: usize,
}

impl BlockParser {
    fn block(&mut self, indent: usize) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();

        while let Some(line) = self.lines.get(self.pos) {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err("unexpected indent".to_string().into());
            }
            let kind = classify(&line.tokens)?;
            self.pos += 1;

            let stmt = match kind {
                LineKind::If(condition) => {
                    let body = self.body(indent)?;
                    let orelse = if self.else_follows(indent)? {
                        self.pos += 1;
                        self.body(indent)?
                    } else {
                        Vec::new()
                    };
                    Stmt::If(condition, body, orelse)
                }
                LineKind::While(condition) => Stmt::While(condition, self.body(indent)?),
                LineKind::Else => return Err("'else' without 'if'".to_string().into()),
                LineKind::Simple(stmt) => stmt,
            };

            stmts.push(stmt);
        }

        Ok(stmts)
    }

    fn else_follows(&self, indent: usize) -> Result<bool, String> {
        match self.lines.get(self.pos) {
            Some(next) if next.indent == indent => {
                Ok(matches!(classify(&next.tokens)?, LineKind::Else))
            }
            _ => Ok(false),
        }
    }

    fn body(&mut self, outer: usize) -> Result<Vec<Stmt>, ParseError> {
        match self.lines.get(self.pos).map(|line| line.indent) {
            Some(indent) if indent > outer => self.block(indent),
            Some(_) => Err(ParseError::Invalid("expected an indented block".to_string())),
            None => Err(ParseError::Unfinished),
        }
    }
}

/// Parse a complete program
fn parse(source: &str) -> Result<Vec<Stmt>, ParseError> {
    let lines = source
        .lines()
        .map(|text| {
            let indent = text.chars().take_while(|c| c.is_whitespace()).count();
            tokenize(text).map(|tokens| Line { indent, tokens })
        })
        .filter(|line| !matches!(line, Ok(Line { tokens, .. }) if tokens.is_empty()))
        .collect::<Result<Vec<_>, _>>()?;

    let base = lines.first().map_or(0, |line| line.indent);
    let mut parser = BlockParser { lines, pos: 0 };
    let stmts = parser.block(base)?;

    if parser.pos == parser.lines.len() {
        Ok(stmts)
    } else {
        Err("unindent does not match any outer indentation level"
            .to_string()
            .into())
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Value {
    Num(f64),
    None,
}

impl Value {
    fn num(self, what: &str) -> Result<f64, ExecError> {
        match self {
            Value::Num(n) => Ok(n),
            Value::None => Err(ExecError::new(
                "TypeError",
                format!("unsupported operand for {}: 'None'", what),
            )),
        }
    }
}

fn truth(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Calculator interpreter
pub struct Calc {
    variables: Variables,
    quit: Rc<Cell<bool>>,
}

impl Calc {
    pub fn new(variables: Variables, quit: Rc<Cell<bool>>) -> Self {
        Self { variables, quit }
    }

    fn eval(&mut self, expr: &Expr, ctx: &mut ExecContext<'_>) -> Result<Value, ExecError> {
        Ok(match expr {
            Expr::Num(n) => Value::Num(*n),
            Expr::Var(name) => match self.variables.borrow().get(name) {
                Some(value) => Value::Num(*value),
                None => {
                    return Err(ExecError::new(
                        "NameError",
                        format!("name '{}' is not defined", name),
                    ))
                }
            },
            Expr::Neg(inner) => Value::Num(-self.eval(inner, ctx)?.num("-")?),
            Expr::Binary(op, lhs, rhs) => {
                let a = self.eval(lhs, ctx)?.num(op)?;
                let b = self.eval(rhs, ctx)?.num(op)?;

                Value::Num(match *op {
                    "+" => a + b,
                    "-" => a - b,
                    "*" => a * b,
                    "/" | "%" if b == 0.0 => {
                        return Err(ExecError::new("ZeroDivisionError", "division by zero"))
                    }
                    "/" => a / b,
                    "%" => a.rem_euclid(b),
                    "==" => truth(a == b),
                    "!=" => truth(a != b),
                    "<" => truth(a < b),
                    "<=" => truth(a <= b),
                    ">" => truth(a > b),
                    _ => truth(a >= b),
                })
            }
            Expr::Call(name, args) => self.call(name, args, ctx)?,
        })
    }

    fn call(
        &mut self,
        name: &str,
        args: &[Expr],
        ctx: &mut ExecContext<'_>,
    ) -> Result<Value, ExecError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg, ctx)?);
        }

        let arity = |n: usize| {
            if values.len() == n {
                Ok(())
            } else {
                Err(ExecError::new(
                    "TypeError",
                    format!("{}() takes {} arguments ({} given)", name, n, values.len()),
                ))
            }
        };

        match name {
            "print" => {
                let text = values
                    .iter()
                    .map(|value| match value {
                        Value::Num(n) => format_number(*n),
                        Value::None => "None".to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                ctx.write(&text)?;
                ctx.write("\n")?;
                Ok(Value::None)
            }
            "abs" => {
                arity(1)?;
                Ok(Value::Num(values[0].num("abs()")?.abs()))
            }
            "clear" => {
                arity(0)?;
                ctx.request_clear();
                Ok(Value::None)
            }
            "exit" => {
                arity(0)?;
                self.quit.set(true);
                Ok(Value::None)
            }
            _ => Err(ExecError::new(
                "NameError",
                format!("name '{}' is not defined", name),
            )),
        }
    }

    fn run_block(
        &mut self,
        stmts: &[Stmt],
        ctx: &mut ExecContext<'_>,
        top_level: bool,
    ) -> Result<(), ExecError> {
        for stmt in stmts {
            match stmt {
                Stmt::Assign(name, expr) => {
                    let value = self.eval(expr, ctx)?.num("=")?;
                    self.variables.borrow_mut().insert(name.clone(), value);
                }
                Stmt::Expr(expr) => {
                    if let Value::Num(n) = self.eval(expr, ctx)? {
                        if top_level {
                            ctx.display(&format_number(n))?;
                            self.variables.borrow_mut().insert("_".to_string(), n);
                        }
                    }
                }
                Stmt::If(condition, body, orelse) => {
                    if self.eval(condition, ctx)?.num("if")? != 0.0 {
                        self.run_block(body, ctx, false)?;
                    } else {
                        self.run_block(orelse, ctx, false)?;
                    }
                }
                Stmt::While(condition, body) => {
                    let mut iterations = 0;

                    while self.eval(condition, ctx)?.num("while")? != 0.0 {
                        iterations += 1;
                        if iterations > LOOP_LIMIT {
                            return Err(ExecError::new("RuntimeError", "loop limit exceeded"));
                        }
                        self.run_block(body, ctx, false)?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Interpreter for Calc {
    type Code = Vec<Stmt>;

    fn compile(&mut self, source: &str, mode: CompileMode) -> CompileOutcome<Vec<Stmt>> {
        match bracket_depth(source) {
            depth if depth < 0 => return CompileOutcome::SyntaxError("unmatched ')'".to_string()),
            depth if depth > 0 => return CompileOutcome::Incomplete,
            _ => (),
        }

        let opens_block = |line: &str| {
            let code = line.split('#').next().unwrap_or("");
            code.trim_end().ends_with(':')
        };

        let interactive = mode == CompileMode::Interactive;

        match parse(source) {
            // A block only ends with a blank line
            Ok(_) if interactive && source.lines().any(opens_block) => CompileOutcome::Incomplete,
            Ok(stmts) => CompileOutcome::Complete(stmts),
            Err(ParseError::Unfinished) if interactive => CompileOutcome::Incomplete,
            Err(err) => CompileOutcome::SyntaxError(err.into_message()),
        }
    }

    fn execute(&mut self, code: Vec<Stmt>, ctx: &mut ExecContext<'_>) -> Result<(), ExecError> {
        self.run_block(&code, ctx, true)
    }
}
