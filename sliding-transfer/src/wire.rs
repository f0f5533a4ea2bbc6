//! On-the-wire framing for the toy file-transfer protocol.
//!
//! Reproduces `original_source/example/protocol.py`'s three commands
//! (`InitFile`, `PutData`, `Finalize`) and its `Request`/`Ack` envelope,
//! hand-rolled the way `minetest-protocol::wire` hand-rolls its framing
//! rather than reached for a derive macro, since the message set here is
//! three variants, not a few hundred packet kinds.

use std::str::Utf8Error;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("message ended before a complete frame was read")]
    Eof,
    #[error("unknown command tag {0}")]
    BadTag(u8),
    #[error("filename is not valid UTF-8: {0}")]
    InvalidFilename(#[from] Utf8Error),
}

type WireResult<T> = Result<T, WireError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    InitFile { filename: String },
    PutData { offset: u64, bytes: Vec<u8> },
    Finalize { digest: [u8; 32] },
}

impl Command {
    const TAG_INIT_FILE: u8 = 0;
    const TAG_PUT_DATA: u8 = 1;
    const TAG_FINALIZE: u8 = 2;

    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            Command::InitFile { filename } => {
                out.push(Self::TAG_INIT_FILE);
                write_bytes(out, filename.as_bytes());
            }
            Command::PutData { offset, bytes } => {
                out.push(Self::TAG_PUT_DATA);
                out.extend_from_slice(&offset.to_be_bytes());
                write_bytes(out, bytes);
            }
            Command::Finalize { digest } => {
                out.push(Self::TAG_FINALIZE);
                out.extend_from_slice(digest);
            }
        }
    }

    fn read_from(cur: &mut Cursor) -> WireResult<Self> {
        match cur.take_u8()? {
            Self::TAG_INIT_FILE => {
                let filename = std::str::from_utf8(cur.take_bytes()?)?.to_owned();
                Ok(Command::InitFile { filename })
            }
            Self::TAG_PUT_DATA => {
                let offset = cur.take_u64()?;
                let bytes = cur.take_bytes()?.to_vec();
                Ok(Command::PutData { offset, bytes })
            }
            Self::TAG_FINALIZE => {
                let digest = cur.take_array::<32>()?;
                Ok(Command::Finalize { digest })
            }
            other => Err(WireError::BadTag(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub id: u64,
    pub command: Command,
}

impl Request {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.id.to_be_bytes());
        self.command.write_to(&mut out);
        out
    }

    pub fn from_bytes(data: &[u8]) -> WireResult<Self> {
        let mut cur = Cursor::new(data);
        let id = cur.take_u64()?;
        let command = Command::read_from(&mut cur)?;
        Ok(Request { id, command })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub id: u64,
}

impl Ack {
    pub fn to_bytes(&self) -> Vec<u8> {
        self.id.to_be_bytes().to_vec()
    }

    pub fn from_bytes(data: &[u8]) -> WireResult<Self> {
        let mut cur = Cursor::new(data);
        Ok(Ack {
            id: cur.take_u64()?,
        })
    }
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

struct Cursor<'a> {
    data: &'a [u8],
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn take(&mut self, count: usize) -> WireResult<&'a [u8]> {
        if self.data.len() < count {
            return Err(WireError::Eof);
        }
        let (head, tail) = self.data.split_at(count);
        self.data = tail;
        Ok(head)
    }

    fn take_u8(&mut self) -> WireResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn take_u64(&mut self) -> WireResult<u64> {
        Ok(u64::from_be_bytes(self.take_array::<8>()?))
    }

    fn take_array<const N: usize>(&mut self) -> WireResult<[u8; N]> {
        self.take(N)?.try_into().map_err(|_| WireError::Eof)
    }

    fn take_bytes(&mut self) -> WireResult<&'a [u8]> {
        let len = u32::from_be_bytes(self.take_array::<4>()?) as usize;
        self.take(len)
    }
}
