use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::machine::error::{MachineError, MachineResult};

const STATUS_OK: u8 = 0;
const STATUS_ERROR: u8 = 1;

/// One-byte error identities for the wire. Every `MachineError` maps onto
/// exactly one code so the RPC layer can report failures without carrying
/// the full error value across the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    UnknownOperation = 1,
    UnknownCommand = 2,
    NotFilterable = 3,
    Application = 4,
}

impl ErrorCode {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<ErrorCode> {
        match id {
            1 => Some(ErrorCode::UnknownOperation),
            2 => Some(ErrorCode::UnknownCommand),
            3 => Some(ErrorCode::NotFilterable),
            4 => Some(ErrorCode::Application),
            _ => None,
        }
    }
}

impl From<&MachineError> for ErrorCode {
    fn from(err: &MachineError) -> Self {
        match err {
            MachineError::UnknownOperation(_) => ErrorCode::UnknownOperation,
            MachineError::UnknownCommand { .. } => ErrorCode::UnknownCommand,
            MachineError::NotFilterable(_) => ErrorCode::NotFilterable,
            MachineError::Application { .. } => ErrorCode::Application,
        }
    }
}

/// Errors produced while reading a response frame.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty response frame")]
    Empty,

    #[error("unknown status byte: {0}")]
    UnknownStatus(u8),

    #[error("error frame is missing its error code")]
    MissingErrorCode,

    #[error("unknown error code: {0}")]
    UnknownErrorCode(u8),
}

/// The value-level shape of an RPC response to an applied operation: one
/// status byte, followed by the raw result payload on success or a single
/// error-code byte on failure.
///
/// Payloads are `Bytes` handles: decoding slices the source buffer without
/// copying, and the storage is freed once the last handle is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Ok(Bytes),
    Error(ErrorCode),
}

impl Response {
    pub fn encode(&self) -> Bytes {
        match self {
            Response::Ok(payload) => {
                let mut buffer = BytesMut::with_capacity(1 + payload.len());
                buffer.put_u8(STATUS_OK);
                buffer.extend_from_slice(payload);
                buffer.freeze()
            }
            Response::Error(code) => {
                let mut buffer = BytesMut::with_capacity(2);
                buffer.put_u8(STATUS_ERROR);
                buffer.put_u8(code.id());
                buffer.freeze()
            }
        }
    }

    pub fn decode(buffer: &Bytes) -> Result<Response, DecodeError> {
        match buffer.first() {
            None => Err(DecodeError::Empty),
            Some(&STATUS_OK) => Ok(Response::Ok(buffer.slice(1..))),
            Some(&STATUS_ERROR) => {
                let id = buffer.get(1).ok_or(DecodeError::MissingErrorCode)?;
                let code = ErrorCode::from_id(*id).ok_or(DecodeError::UnknownErrorCode(*id))?;
                Ok(Response::Error(code))
            }
            Some(&status) => Err(DecodeError::UnknownStatus(status)),
        }
    }
}

impl From<MachineResult<Bytes>> for Response {
    fn from(result: MachineResult<Bytes>) -> Self {
        match result {
            Ok(payload) => Response::Ok(payload),
            Err(err) => Response::Error(ErrorCode::from(&err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_ok() {
        let response = Response::Ok(Bytes::from_static(b"payload"));
        let encoded = response.encode();

        assert_eq!(encoded[0], STATUS_OK);
        assert_eq!(&encoded[1..], b"payload");
    }

    #[test]
    fn test_encode_error() {
        let response = Response::Error(ErrorCode::UnknownOperation);
        let encoded = response.encode();

        assert_eq!(encoded.len(), 2);
        assert_eq!(encoded[0], STATUS_ERROR);
        assert_eq!(encoded[1], ErrorCode::UnknownOperation.id());
    }

    #[test]
    fn test_decode_ok_shares_the_source_buffer() {
        let encoded = Response::Ok(Bytes::from_static(b"shared")).encode();
        let decoded = Response::decode(&encoded).expect("decode");

        match decoded {
            Response::Ok(payload) => {
                assert_eq!(payload, Bytes::from_static(b"shared"));
                // The payload is a view over the frame, not a copy.
                assert_eq!(payload.as_ptr(), encoded[1..].as_ptr());
            }
            other => panic!("expected ok response, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_empty_payload() {
        let encoded = Response::Ok(Bytes::new()).encode();
        let decoded = Response::decode(&encoded).expect("decode");
        assert_eq!(decoded, Response::Ok(Bytes::new()));
    }

    #[test]
    fn test_decode_error_frame() {
        let encoded = Response::Error(ErrorCode::Application).encode();
        let decoded = Response::decode(&encoded).expect("decode");
        assert_eq!(decoded, Response::Error(ErrorCode::Application));
    }

    #[test]
    fn test_decode_malformed_frames() {
        assert_eq!(Response::decode(&Bytes::new()), Err(DecodeError::Empty));
        assert_eq!(
            Response::decode(&Bytes::from_static(&[7])),
            Err(DecodeError::UnknownStatus(7))
        );
        assert_eq!(
            Response::decode(&Bytes::from_static(&[STATUS_ERROR])),
            Err(DecodeError::MissingErrorCode)
        );
        assert_eq!(
            Response::decode(&Bytes::from_static(&[STATUS_ERROR, 99])),
            Err(DecodeError::UnknownErrorCode(99))
        );
    }

    #[test]
    fn test_from_apply_result() {
        let ok: MachineResult<Bytes> = Ok(Bytes::from_static(b"5"));
        assert_eq!(Response::from(ok), Response::Ok(Bytes::from_static(b"5")));

        let err: MachineResult<Bytes> = Err(MachineError::UnknownOperation("nope"));
        assert_eq!(
            Response::from(err),
            Response::Error(ErrorCode::UnknownOperation)
        );
    }
}
