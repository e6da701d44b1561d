use pest::iterators::Pair;

use super::{
    AssignOp, Assignment, BinaryExpr, BinaryOp, Call, Float, Ident, Integer, Position, Rule, Str,
    UnaryExpr, UnaryOp,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Expression<T> {
    Ident(Ident<T>),
    Integer(Integer<T>),
    Float(Float<T>),
    Str(Str<T>),
    Assignment(Box<Assignment<T>>),
    Binary(Box<BinaryExpr<T>>),
    Unary(Box<UnaryExpr<T>>),
    Call(Box<Call<T>>),
    Comma(Comma<T>),
}

/// A comma sequence of expressions, evaluated left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Comma<T> {
    pub exprs: Vec<Expression<T>>,
    pub position: Position,
    pub info: T,
}

impl Expression<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Expression<()> {
        match pair.as_rule() {
            Rule::expression => Self::from_comma_chain(pair, file),
            Rule::assignment => Self::from_assignment(pair, file),
            Rule::logicalOr
            | Rule::logicalAnd
            | Rule::bitwiseOr
            | Rule::bitwiseXor
            | Rule::bitwiseAnd
            | Rule::equality
            | Rule::relational
            | Rule::shift
            | Rule::additive
            | Rule::multiplicative => Self::from_binary_chain(pair, file),
            Rule::unary => Self::from_unary(pair, file),
            Rule::postfix => Self::from_postfix(pair, file),
            Rule::ident => Expression::Ident(Ident::from_pair(pair, file)),
            Rule::integer => Expression::Integer(Integer::from_pair(pair, file)),
            Rule::float => Expression::Float(Float::from_pair(pair, file)),
            Rule::string => Expression::Str(Str::from_pair(pair, file)),
            rule => unreachable!("can not parse rule {rule:?} as an expression"),
        }
    }

    /// A comma sequence with a single element collapses to that element.
    fn from_comma_chain(pair: Pair<Rule>, file: &str) -> Expression<()> {
        let (line, col) = pair.line_col();

        let mut exprs = pair
            .into_inner()
            .map(|inner| Self::from_pair(inner, file))
            .collect::<Vec<_>>();

        if exprs.len() == 1 {
            exprs.remove(0)
        } else {
            Expression::Comma(Comma {
                exprs,
                position: (file.to_owned(), line, col),
                info: (),
            })
        }
    }

    fn from_assignment(pair: Pair<Rule>, file: &str) -> Expression<()> {
        let (line, col) = pair.line_col();

        let mut inner = pair.into_inner();

        let first = inner
            .next()
            .unwrap_or_else(|| panic!("expected expression at {line}:{col}"));

        // without an operator this is just the fall-through alternative
        let Some(op) = inner.next() else {
            return Self::from_pair(first, file);
        };

        let op = op
            .as_str()
            .parse::<AssignOp>()
            .unwrap_or_else(|_| panic!("invalid assignment operator at {line}:{col}"));

        let rhs = Self::from_pair(
            inner
                .next()
                .unwrap_or_else(|| panic!("expected rvalue in assignment at {line}:{col}")),
            file,
        );

        Expression::Assignment(Box::new(Assignment {
            lhs: Self::from_pair(first, file),
            op,
            rhs,
            position: (file.to_owned(), line, col),
            info: (),
        }))
    }

    /// Folds one precedence tier (`operand (op operand)*`) into a
    /// left-associative tree of binary expressions.
    fn from_binary_chain(pair: Pair<Rule>, file: &str) -> Expression<()> {
        let (line, col) = pair.line_col();

        let mut inner = pair.into_inner();

        let first = inner
            .next()
            .unwrap_or_else(|| panic!("expected operand at {line}:{col}"));
        let mut expr = Self::from_pair(first, file);

        while let Some(op) = inner.next() {
            let (line, col) = op.line_col();

            let op = op
                .as_str()
                .parse::<BinaryOp>()
                .unwrap_or_else(|_| panic!("invalid binary operator at {line}:{col}"));

            let rhs = Self::from_pair(
                inner
                    .next()
                    .unwrap_or_else(|| panic!("expected right operand at {line}:{col}")),
                file,
            );

            expr = Expression::Binary(Box::new(BinaryExpr {
                op,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
                position: (file.to_owned(), line, col),
                info: (),
            }));
        }

        expr
    }

    /// Prefix operators apply right to left: the last one written binds
    /// closest to the operand.
    fn from_unary(pair: Pair<Rule>, file: &str) -> Expression<()> {
        let (line, col) = pair.line_col();

        let mut ops = vec![];
        let mut operand = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::prefixOp => ops.push((inner.as_str().to_owned(), inner.line_col())),
                _ => operand = Some(Self::from_pair(inner, file)),
            }
        }

        let Some(mut expr) = operand else {
            unreachable!("unary expression without an operand at {line}:{col}")
        };

        for (op, (line, col)) in ops.into_iter().rev() {
            let op = op
                .parse::<UnaryOp>()
                .unwrap_or_else(|_| panic!("invalid unary operator at {line}:{col}"));

            expr = Expression::Unary(Box::new(UnaryExpr {
                op,
                operand: Box::new(expr),
                position: (file.to_owned(), line, col),
                info: (),
            }));
        }

        expr
    }

    fn from_postfix(pair: Pair<Rule>, file: &str) -> Expression<()> {
        let (line, col) = pair.line_col();

        let mut inner = pair.into_inner();

        let mut expr = Self::from_pair(
            inner
                .next()
                .unwrap_or_else(|| panic!("expected primary expression at {line}:{col}")),
            file,
        );

        for item in inner {
            let (line, col) = item.line_col();

            match item.as_rule() {
                Rule::argList => {
                    let args = item
                        .into_inner()
                        .map(|arg| Self::from_pair(arg, file))
                        .collect();

                    expr = Expression::Call(Box::new(Call {
                        callee: Box::new(expr),
                        args,
                        position: (file.to_owned(), line, col),
                        info: (),
                    }));
                }
                Rule::incDec => {
                    let op = match item.as_str() {
                        "++" => UnaryOp::PostInc,
                        "--" => UnaryOp::PostDec,
                        op => unreachable!("invalid postfix operator '{op}'"),
                    };

                    expr = Expression::Unary(Box::new(UnaryExpr {
                        op,
                        operand: Box::new(expr),
                        position: (file.to_owned(), line, col),
                        info: (),
                    }));
                }
                rule => unreachable!("unexpected rule {rule:?} in postfix expression"),
            }
        }

        expr
    }
}

impl<T> Expression<T> {
    pub fn position(&self) -> Position {
        match self {
            Expression::Ident(Ident { position, .. })
            | Expression::Integer(Integer { position, .. })
            | Expression::Float(Float { position, .. })
            | Expression::Str(Str { position, .. })
            | Expression::Comma(Comma { position, .. }) => position.to_owned(),
            Expression::Assignment(assignment) => assignment.position.to_owned(),
            Expression::Binary(binary) => binary.position.to_owned(),
            Expression::Unary(unary) => unary.position.to_owned(),
            Expression::Call(call) => call.position.to_owned(),
        }
    }
}

impl<T> Expression<T>
where
    T: Clone,
{
    pub fn info(&self) -> T {
        match self {
            Expression::Ident(Ident { info, .. })
            | Expression::Integer(Integer { info, .. })
            | Expression::Float(Float { info, .. })
            | Expression::Str(Str { info, .. })
            | Expression::Comma(Comma { info, .. }) => info.clone(),
            Expression::Assignment(assignment) => assignment.info.clone(),
            Expression::Binary(binary) => binary.info.clone(),
            Expression::Unary(unary) => unary.info.clone(),
            Expression::Call(call) => call.info.clone(),
        }
    }
}
