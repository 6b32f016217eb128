//! Test receiver for the file copy stream.

#![allow(dead_code)]

use filecopy_agent::streaming::{EntryKind, FileHeader, ResultHeader, FILE_HEADER_SIZE};
use std::cell::RefCell;
use std::io::{self, Cursor, Read, Write};
use std::rc::Rc;

/// One entry as the receiver saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedEntry {
    pub header: FileHeader,
    pub name: String,
    pub content: Vec<u8>,
}

impl ReceivedEntry {
    pub fn is_dir(&self) -> bool {
        self.header.kind() == Some(EntryKind::Directory)
    }
}

/// Everything read up to and including the sentinel.
#[derive(Debug, Default)]
pub struct Received {
    pub entries: Vec<ReceivedEntry>,
    /// CRC-32 over every byte read, sentinel included.
    pub crc32: u32,
    pub sentinel_seen: bool,
}

impl Received {
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

/// Read entries until the sentinel or end of stream.
pub fn read_stream<R: Read>(input: &mut R) -> io::Result<Received> {
    let mut hasher = crc32fast::Hasher::new();
    let mut received = Received::default();

    loop {
        let mut raw = [0u8; FILE_HEADER_SIZE];
        match input.read_exact(&mut raw) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e),
        }
        hasher.update(&raw);
        let header = FileHeader::decode(&raw).map_err(io::Error::other)?;
        if header.is_sentinel() {
            received.sentinel_seen = true;
            break;
        }

        let mut name = vec![0u8; header.namelen as usize];
        input.read_exact(&mut name)?;
        hasher.update(&name);

        let mut content = Vec::new();
        if header.kind() == Some(EntryKind::Regular) {
            content.resize(header.filelen as usize, 0);
            input.read_exact(&mut content)?;
            hasher.update(&content);
        }

        received.entries.push(ReceivedEntry {
            header,
            name: String::from_utf8(name).map_err(io::Error::other)?,
            content,
        });
    }

    received.crc32 = hasher.finalize();
    Ok(received)
}

/// Output sink shared with a [`Responder`].
#[derive(Clone, Default)]
pub struct SharedSink(pub Rc<RefCell<Vec<u8>>>);

impl SharedSink {
    pub fn bytes(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Input side that answers once the sender starts waiting for its result.
///
/// The reply is computed from whatever the sink holds at that moment.
pub struct Responder {
    sent: SharedSink,
    reply: Box<dyn Fn(&Received) -> Option<ResultHeader>>,
    pending: Option<Cursor<Vec<u8>>>,
}

impl Responder {
    pub fn new(
        sent: &SharedSink,
        reply: impl Fn(&Received) -> Option<ResultHeader> + 'static,
    ) -> Self {
        Self {
            sent: sent.clone(),
            reply: Box::new(reply),
            pending: None,
        }
    }

    /// A well-behaved receiver: success with its own checksum.
    pub fn honest(sent: &SharedSink) -> Self {
        Self::new(sent, |received| {
            Some(ResultHeader {
                error_code: 0,
                crc32: received.crc32,
            })
        })
    }
}

impl Read for Responder {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_none() {
            let received = read_stream(&mut Cursor::new(self.sent.bytes()))?;
            let reply = (self.reply)(&received)
                .map(|r| r.encode().to_vec())
                .unwrap_or_default();
            self.pending = Some(Cursor::new(reply));
        }
        match self.pending.as_mut() {
            Some(pending) => pending.read(buf),
            None => Ok(0),
        }
    }
}

/// Sink that accepts `limit` bytes, then fails every write.
pub struct BrokenAfter {
    pub written: Vec<u8>,
    pub limit: usize,
}

impl Write for BrokenAfter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.limit - self.written.len();
        if room == 0 {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        let n = buf.len().min(room);
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
