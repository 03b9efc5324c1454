//! Request/reply channel to the observer.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};

use crate::error::TelemetryError;

/// Half-duplex channel: one message from the observer must be received
/// before each message sent to it.
pub trait TelemetryChannel {
    /// Block until the observer sends its next message.
    fn receive(&mut self) -> Result<String, TelemetryError>;

    /// Send one message.
    fn send(&mut self, message: &str) -> Result<(), TelemetryError>;
}

/// Newline-framed channel over a reader/writer pair.
#[derive(Debug)]
pub struct StreamChannel<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> StreamChannel<R, W> {
    /// Wrap a reader and a writer.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Give back the reader and the writer.
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl StreamChannel<BufReader<TcpStream>, TcpStream> {
    /// Accept one observer on `127.0.0.1:port`.
    pub fn listen(port: u16) -> Result<Self, TelemetryError> {
        let listener = TcpListener::bind(("127.0.0.1", port))?;
        log::info!("Waiting for telemetry observer on port {}", port);
        let (stream, peer) = listener.accept()?;
        log::info!("Telemetry observer connected from {}", peer);
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self::new(reader, stream))
    }
}

impl<R: BufRead, W: Write> TelemetryChannel for StreamChannel<R, W> {
    fn receive(&mut self) -> Result<String, TelemetryError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(TelemetryError::Closed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn send(&mut self, message: &str) -> Result<(), TelemetryError> {
        self.writer.write_all(message.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_newline_framing() {
        let input = Cursor::new(b"ready\r\nnext\n".to_vec());
        let mut channel = StreamChannel::new(input, Vec::new());

        assert_eq!(channel.receive().unwrap(), "ready");
        channel.send("{\"a\":1}").unwrap();
        assert_eq!(channel.receive().unwrap(), "next");
        channel.send("{\"b\":2}").unwrap();
        assert!(matches!(channel.receive(), Err(TelemetryError::Closed)));

        let (_, written) = channel.into_parts();
        assert_eq!(String::from_utf8(written).unwrap(), "{\"a\":1}\n{\"b\":2}\n");
    }
}
