use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RLPDecodeError {
    #[error("unexpected end of RLP input")]
    InvalidLength,
    #[error("malformed RLP length prefix")]
    MalformedLength,
    #[error("RLP payload length does not match declared length")]
    InvalidPayloadLength,
    #[error("expected a list, found a string")]
    ExpectedList,
    #[error("expected a string, found a list")]
    ExpectedString,
    #[error("RLP item exceeds the maximum accepted size")]
    TooLarge,
}
