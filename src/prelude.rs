use thiserror::Error;

/// Error type for bpnet
#[derive(Debug, Error)]
pub enum Error {
    /// A pattern's input or output size disagrees with the network.
    #[error("pattern dimensions do not match the network")]
    DimensionErr,
    /// An input, output, layer or unit index is outside its valid range.
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// The network has no layers (or no units) to query.
    #[error("network topology is empty")]
    EmptyTopology,
    /// A connection was used before both endpoints were bound.
    #[error("connection {0} is not bound")]
    UnboundConnection(usize),
    /// Connections are bound exactly once.
    #[error("connection {0} is already bound")]
    AlreadyBound(usize),
    #[error("line {line}: expected {expected}, found {token:?}")]
    Parse {
        line: usize,
        token: String,
        expected: &'static str,
    },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },
    /// A count in a network header disagrees with the rebuilt topology.
    #[error("{field} mismatch: topology has {expected}, stream has {found}")]
    HeaderMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    /// The unit or connection count of these layer sizes does not fit in `usize`.
    #[error("layer sizes {0:?} overflow the unit or connection count")]
    TopologyOverflow(Vec<usize>),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The background training thread panicked or hung up.
    #[error("training thread failed")]
    ThreadErr,
}

pub type Result<T> = std::result::Result<T, Error>;
