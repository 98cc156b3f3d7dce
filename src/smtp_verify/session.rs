use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use native_tls::{HandshakeError, TlsConnector, TlsStream};
use tracing::trace;

use crate::smtp_verify::error::SessionError;
use crate::smtp_verify::options::TlsMode;

/// Longest reply, all lines included, we accept from a server.
const MAX_REPLY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn text(&self) -> String {
        self.lines.join(" ")
    }
}

#[derive(Debug)]
enum SmtpStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl SmtpStream {
    fn connect(
        addr: &SocketAddr,
        host: &str,
        tls: TlsMode,
        connect_timeout: Duration,
        session_timeout: Duration,
    ) -> Result<Self, SessionError> {
        let stream = TcpStream::connect_timeout(addr, connect_timeout)
            .map_err(|err| SessionError::connect(*addr, err))?;
        stream
            .set_read_timeout(Some(session_timeout))
            .map_err(SessionError::io)?;
        stream
            .set_write_timeout(Some(session_timeout))
            .map_err(SessionError::io)?;

        match tls {
            TlsMode::None => Ok(Self::Plain(stream)),
            TlsMode::Implicit => {
                // probing only: an invalid certificate does not change what RCPT answers
                let connector = TlsConnector::builder()
                    .danger_accept_invalid_certs(true)
                    .danger_accept_invalid_hostnames(true)
                    .build()
                    .map_err(SessionError::tls)?;
                let tls = complete_handshake(&connector, host, stream)?;
                Ok(Self::Tls(Box::new(tls)))
            }
        }
    }
}

impl SmtpStream {
    fn set_read_timeout(&self, timeout: Duration) -> io::Result<()> {
        match self {
            Self::Plain(stream) => stream.set_read_timeout(Some(timeout)),
            Self::Tls(stream) => stream.get_ref().set_read_timeout(Some(timeout)),
        }
    }
}

impl Read for SmtpStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(stream) => stream.read(buf),
            Self::Tls(stream) => stream.read(buf),
        }
    }
}

impl Write for SmtpStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(stream) => stream.write(buf),
            Self::Tls(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(stream) => stream.flush(),
            Self::Tls(stream) => stream.flush(),
        }
    }
}

fn complete_handshake(
    connector: &TlsConnector,
    host: &str,
    stream: TcpStream,
) -> Result<TlsStream<TcpStream>, SessionError> {
    match connector.connect(host, stream) {
        Ok(tls) => Ok(tls),
        Err(HandshakeError::Failure(err)) => Err(SessionError::tls(err)),
        // blocking socket: WouldBlock only surfaces when the read timeout fires
        Err(HandshakeError::WouldBlock(_)) => Err(SessionError::io(io::Error::new(
            io::ErrorKind::TimedOut,
            "TLS handshake timed out",
        ))),
    }
}

/// One SMTP conversation with one host on one port.
pub struct SmtpSession {
    host: String,
    port: u16,
    stream: SmtpStream,
    buffer: Vec<u8>,
    session_timeout: Duration,
}

impl SmtpSession {
    /// Connect to the first reachable address. The connect timeout applies
    /// per address; the session timeout bounds every later read and write.
    pub fn connect(
        host: &str,
        addresses: &[SocketAddr],
        tls: TlsMode,
        connect_timeout: Duration,
        session_timeout: Duration,
    ) -> Result<Self, SessionError> {
        let mut last_err = None;
        for addr in addresses {
            match SmtpStream::connect(addr, host, tls, connect_timeout, session_timeout) {
                Ok(stream) => {
                    return Ok(Self {
                        host: host.to_string(),
                        port: addr.port(),
                        stream,
                        buffer: Vec::new(),
                        session_timeout,
                    });
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or(SessionError::NoAddress))
    }

    pub fn read_greeting(&mut self) -> Result<SmtpReply, SessionError> {
        self.read_reply()
    }

    pub fn send_command(&mut self, command: &str) -> Result<SmtpReply, SessionError> {
        trace!(host = %self.host, port = self.port, "C: {command}");
        let mut data = command.as_bytes().to_vec();
        data.extend_from_slice(b"\r\n");
        self.stream.write_all(&data).map_err(SessionError::io)?;
        self.stream.flush().map_err(SessionError::io)?;
        self.read_reply()
    }

    /// Best effort: the outcome of the conversation is already decided.
    pub fn quit(&mut self) {
        if let Err(err) = self.send_command("QUIT") {
            trace!(host = %self.host, port = self.port, error = %err, "QUIT failed");
        }
    }

    /// One whole reply, continuation lines included, must arrive within the
    /// session timeout.
    fn read_reply(&mut self) -> Result<SmtpReply, SessionError> {
        let deadline = Instant::now() + self.session_timeout;
        let mut lines = Vec::new();
        let mut code: Option<u16> = None;
        let mut total = 0usize;
        loop {
            let line = self.read_line(deadline)?;
            total += line.len() + 2;
            if total > MAX_REPLY_BYTES {
                return Err(SessionError::Protocol("reply too long".into()));
            }
            let parsed_code = line
                .get(..3)
                .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|digits| digits.parse::<u16>().ok())
                .ok_or_else(|| SessionError::Protocol(format!("invalid reply: {line}")))?;
            if let Some(existing) = code {
                if existing != parsed_code {
                    return Err(SessionError::Protocol(format!(
                        "inconsistent reply codes: {existing} vs {parsed_code}"
                    )));
                }
            } else {
                code = Some(parsed_code);
            }
            let is_last = line.as_bytes().get(3) != Some(&b'-');
            lines.push(line.get(4..).unwrap_or_default().to_string());
            if is_last {
                break;
            }
        }
        let reply = SmtpReply {
            code: code.unwrap_or_default(),
            lines,
        };
        trace!(host = %self.host, port = self.port, "S: {} {}", reply.code, reply.text());
        Ok(reply)
    }

    fn read_line(&mut self, deadline: Instant) -> Result<String, SessionError> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') {
                let mut line = self.buffer.drain(..=pos).collect::<Vec<_>>();
                if line.ends_with(b"\r\n") {
                    line.truncate(line.len() - 2);
                } else {
                    line.truncate(line.len() - 1);
                }
                return Ok(String::from_utf8_lossy(&line).into_owned());
            }
            if self.buffer.len() > MAX_REPLY_BYTES {
                return Err(SessionError::Protocol("reply line too long".into()));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(SessionError::io(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "reply not complete within session timeout",
                )));
            }
            self.stream
                .set_read_timeout(remaining)
                .map_err(SessionError::io)?;

            let mut buf = [0u8; 512];
            let read = self.stream.read(&mut buf).map_err(SessionError::io)?;
            if read == 0 {
                return Err(SessionError::io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed",
                )));
            }
            self.buffer.extend_from_slice(&buf[..read]);
        }
    }
}
