//! Nested-tuple program format.
//!
//! Every instruction becomes a tuple of symbols and qubit labels:
//!
//! ```text
//! [("h", "Q0"), ("cnot", ("Q0", "Q1")), (("rx", 0.5), "Q1"), (("Measure", 1), "Q1")]
//! ```

use std::fmt;

use qforge_ir::{Circuit, Gate, Instruction, QubitId};

use crate::error::{BackendError, BackendResult};

/// A node of a nested-tuple program.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Quoted symbol or label.
    Symbol(String),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// Parenthesized sequence.
    Tuple(Vec<Token>),
}

impl Token {
    fn symbol(s: impl Into<String>) -> Self {
        Token::Symbol(s.into())
    }

    /// Qubit label `Q<i>`.
    pub fn label(qubit: QubitId) -> Self {
        Token::Symbol(format!("Q{}", qubit.0))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Symbol(s) => write!(f, "\"{s}\""),
            Token::Int(n) => write!(f, "{n}"),
            Token::Float(x) => write!(f, "{x:?}"),
            Token::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A flat list of instruction tokens.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NestedProgram {
    pub tokens: Vec<Token>,
}

impl fmt::Display for NestedProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{token}")?;
        }
        f.write_str("]")
    }
}

fn operands(qubits: &[QubitId]) -> Token {
    match qubits {
        [q] => Token::label(*q),
        qubits => Token::Tuple(qubits.iter().copied().map(Token::label).collect()),
    }
}

/// Token for a single gate.
pub fn gate_token(gate: &Gate) -> Token {
    let head = if gate.params().is_empty() {
        Token::symbol(gate.name())
    } else {
        let mut items = vec![Token::symbol(gate.name())];
        items.extend(gate.params().iter().map(|p| Token::Float(*p)));
        Token::Tuple(items)
    };
    Token::Tuple(vec![head, operands(gate.qubits())])
}

/// Token for any instruction.
pub fn instruction_token(instruction: &Instruction) -> Token {
    match instruction {
        Instruction::Gate(gate) => gate_token(gate),
        Instruction::Barrier(barrier) => Token::Tuple(vec![
            Token::symbol("Barrier"),
            Token::Tuple(barrier.qubits().iter().copied().map(Token::label).collect()),
        ]),
    }
}

/// Measurement token `(("Measure", i), "Q<i>")`.
pub fn measure_token(qubit: QubitId) -> Token {
    Token::Tuple(vec![
        Token::Tuple(vec![Token::symbol("Measure"), Token::Int(i64::from(qubit.0))]),
        Token::label(qubit),
    ])
}

/// Serialize the flat instruction sequence followed by one measurement per measured qubit.
///
/// Fails with [`BackendError::NoMeasurement`] when nothing is measured.
pub fn serialize(circuit: &Circuit<'_>) -> BackendResult<NestedProgram> {
    let measured = &circuit.settings().measured;
    if measured.is_empty() {
        return Err(BackendError::NoMeasurement);
    }

    let mut tokens: Vec<Token> = circuit.instructions().iter().map(instruction_token).collect();
    tokens.extend(measured.iter().copied().map(measure_token));
    Ok(NestedProgram { tokens })
}
