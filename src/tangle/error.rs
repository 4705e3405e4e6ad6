use failure::Fail;
use std::io;

#[derive(Debug, Fail)]
pub enum TangleError {
    #[fail(display = "number of vertices must be nonnegative, got {}", _0)]
    NegativeVertexCount(i64),
    #[fail(display = "cannot allocate {} vertices", _0)]
    TooManyVertices(i64),
    #[fail(display = "vertex {} is not between 0 and {}", vertex, bound)]
    VertexOutOfRange { vertex: usize, bound: usize },
    #[fail(display = "transaction {} added out of order, expected {}", id, expected)]
    OutOfOrder { id: usize, expected: usize },
    #[fail(display = "transaction {} cannot reference future vertex {}", id, parent)]
    FutureRef { id: usize, parent: usize },
    #[fail(display = "expected {} transactions, found {}", expected, found)]
    MissingTransactions { expected: usize, found: usize },
    #[fail(display = "expected end of input at line {}", line)]
    TrailingInput { line: usize },
    #[fail(display = "failed to parse line {}: {}", line, reason)]
    Parse { line: usize, reason: String },
    #[fail(display = "read error: {}", _0)]
    Io(#[cause] io::Error),
    #[fail(display = "ledger has no transactions")]
    EmptyInput,
    #[fail(display = "{} is undefined: division by zero", _0)]
    DivisionUndefined(&'static str),
}

impl From<io::Error> for TangleError {
    fn from(err: io::Error) -> Self {
        TangleError::Io(err)
    }
}
