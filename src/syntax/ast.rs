//! Abstract Syntax Tree for Kaleido.

use std::fmt;

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    /// Operator for an arithmetic token lexeme.
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "+" => Some(BinOp::Add),
            "-" => Some(BinOp::Sub),
            "*" => Some(BinOp::Mul),
            "/" => Some(BinOp::Div),
            _ => None,
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
            BinOp::Mul => write!(f, "*"),
            BinOp::Div => write!(f, "/"),
        }
    }
}

/// Dense tensor literal: `[[1, 2], [3, 4]]`.
///
/// `values` holds the numerals in row-major order as raw text; `shape` is
/// outermost dimension first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorLiteral {
    pub values: Vec<String>,
    pub shape: Vec<usize>,
}

/// Nested view of a tensor literal's values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nested {
    Scalar(String),
    List(Vec<Nested>),
}

impl TensorLiteral {
    pub fn new(values: Vec<String>, shape: Vec<usize>) -> Self {
        Self { values, shape }
    }

    /// Number of elements implied by the shape.
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Rebuild the nested structure from the flat values and the shape.
    ///
    /// Returns `None` if the value count does not match the shape.
    pub fn nested(&self) -> Option<Nested> {
        if self.shape.is_empty() || self.values.len() != self.element_count() {
            return None;
        }
        let mut values = self.values.iter();
        Some(Self::build(&self.shape, &mut values))
    }

    fn build<'a>(shape: &[usize], values: &mut impl Iterator<Item = &'a String>) -> Nested {
        match shape.split_first() {
            Some((&len, [])) => Nested::List(
                values
                    .by_ref()
                    .take(len)
                    .map(|v| Nested::Scalar(v.clone()))
                    .collect(),
            ),
            Some((&len, inner)) => {
                Nested::List((0..len).map(|_| Self::build(inner, &mut *values)).collect())
            }
            None => Nested::List(Vec::new()),
        }
    }

    /// Render the literal back to source form, e.g. `[[1, 2], [3, 4]]`.
    pub fn to_source(&self) -> String {
        match self.nested() {
            Some(nested) => nested.to_string(),
            None => format!("[{}]", self.values.join(", ")),
        }
    }
}

impl fmt::Display for Nested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nested::Scalar(v) => write!(f, "{}", v),
            Nested::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Function call: `callee(arg, ...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub callee: String,
    pub args: Vec<Expr>,
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Raw numeral text. Only built by `Parser::parse_number_literal`.
    Number(String),

    /// A variable reference
    Variable(String),

    /// One binary operation: `a + b`
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// `if cond then a else b`. Only built by `Parser::parse_conditional`.
    Conditional {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    /// Function call
    Call(Call),

    /// Dense tensor literal
    Tensor(TensorLiteral),
}

/// A statement inside a function body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `var name<d1, d2> = expr`; shape and initializer are both optional
    VarDecl {
        name: String,
        init: Option<Expr>,
        shape: Option<Vec<usize>>,
    },

    /// `return expr`
    Return(Expr),

    /// `name = expr`
    Assign { target: String, value: Expr },

    /// A call evaluated for its effect: `print(x)`
    Call(Call),
}

/// Function name plus ordered parameter names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
}

impl Prototype {
    /// First parameter name that appears more than once.
    ///
    /// The parser accepts duplicates; callers decide what to do with them.
    pub fn duplicate_param(&self) -> Option<&str> {
        self.params
            .iter()
            .enumerate()
            .find(|&(i, p)| self.params[..i].contains(p))
            .map(|(_, p)| p.as_str())
    }
}

/// A function definition: `def name(params) { body }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub proto: Prototype,
    pub body: Vec<Statement>,
}

// Tree printing. Each node writes itself at `indent` and its children two
// columns deeper.

fn pad(f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
    write!(f, "{:indent$}", "", indent = indent)
}

impl Expr {
    fn write_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        pad(f, indent)?;
        match self {
            Expr::Number(text) => writeln!(f, "Number({})", text),
            Expr::Variable(name) => writeln!(f, "Variable({})", name),
            Expr::Binary { op, lhs, rhs } => {
                writeln!(f, "Binary({})", op)?;
                lhs.write_tree(f, indent + 2)?;
                rhs.write_tree(f, indent + 2)
            }
            Expr::Conditional {
                cond,
                then_branch,
                else_branch,
            } => {
                writeln!(f, "If")?;
                cond.write_tree(f, indent + 2)?;
                then_branch.write_tree(f, indent + 2)?;
                else_branch.write_tree(f, indent + 2)
            }
            Expr::Call(call) => call.write_tree(f, indent),
            Expr::Tensor(tensor) => {
                writeln!(f, "TensorLiteral({}, shape: {:?})", tensor.to_source(), tensor.shape)
            }
        }
    }
}

impl Call {
    // Caller has already written the indentation.
    fn write_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        writeln!(f, "Call({})", self.callee)?;
        for arg in &self.args {
            arg.write_tree(f, indent + 2)?;
        }
        Ok(())
    }
}

impl Statement {
    fn write_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        pad(f, indent)?;
        match self {
            Statement::VarDecl { name, init, shape } => {
                match shape {
                    Some(shape) => writeln!(f, "VarDecl({}, shape: {:?})", name, shape)?,
                    None => writeln!(f, "VarDecl({})", name)?,
                }
                if let Some(init) = init {
                    init.write_tree(f, indent + 2)?;
                }
                Ok(())
            }
            Statement::Return(expr) => {
                writeln!(f, "Return")?;
                expr.write_tree(f, indent + 2)
            }
            Statement::Assign { target, value } => {
                writeln!(f, "Assign({})", target)?;
                value.write_tree(f, indent + 2)
            }
            Statement::Call(call) => call.write_tree(f, indent),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prototype({}, args: {})", self.name, self.params.join(", "))
    }
}

impl fmt::Display for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Function")?;
        writeln!(f, "  {}", self.proto)?;
        for stmt in &self.body {
            stmt.write_tree(f, 2)?;
        }
        Ok(())
    }
}
