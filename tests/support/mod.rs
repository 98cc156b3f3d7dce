//! Loopback SMTP server and a fixed lookup for end-to-end tests.

use std::io::{BufRead, BufReader, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use mailverify_lib::{LookupFailure, MailHostLookup, MxRecord};

/// Scripted replies. Each reply string is sent as-is plus CRLF, so a
/// multiline reply is written with embedded `\r\n`.
#[derive(Clone)]
pub struct MockSmtp {
    pub greeting: &'static str,
    pub ehlo: &'static str,
    pub helo: &'static str,
    pub mail_from: &'static str,
    /// Decides `RCPT TO` by address: 250 when true, 550 otherwise.
    pub accepts: fn(&str) -> bool,
    /// Close the socket on `QUIT` instead of answering 221.
    pub drop_on_quit: bool,
}

impl Default for MockSmtp {
    fn default() -> Self {
        Self {
            greeting: "220 mock.test ESMTP ready",
            ehlo: "250-mock.test greets you\r\n250-SIZE 10240000\r\n250 8BITMIME",
            helo: "250 mock.test",
            mail_from: "250 2.1.0 OK",
            accepts: |_| true,
            drop_on_quit: false,
        }
    }
}

/// Handle on a running mock: its address and every command it received.
pub struct RunningMock {
    pub addr: SocketAddr,
    pub transcript: Arc<Mutex<Vec<String>>>,
    pub connections: Arc<AtomicUsize>,
}

impl RunningMock {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn commands(&self) -> Vec<String> {
        self.transcript.lock().expect("transcript").clone()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn rcpt_count(&self) -> usize {
        self.commands()
            .iter()
            .filter(|c| c.starts_with("RCPT TO"))
            .count()
    }
}

impl MockSmtp {
    /// Serve connections on an ephemeral loopback port until the test ends.
    pub fn spawn(self) -> RunningMock {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock");
        let addr = listener.local_addr().expect("mock addr");
        let transcript = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&transcript);
        let connections = Arc::new(AtomicUsize::new(0));
        let accepted = Arc::clone(&connections);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                accepted.fetch_add(1, Ordering::SeqCst);
                let script = self.clone();
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    let _ = script.handle(stream, &log);
                });
            }
        });
        RunningMock {
            addr,
            transcript,
            connections,
        }
    }

    fn handle(&self, stream: TcpStream, log: &Mutex<Vec<String>>) -> std::io::Result<()> {
        stream.set_read_timeout(Some(Duration::from_secs(5)))?;
        let mut writer = stream.try_clone()?;
        let mut reader = BufReader::new(stream);
        reply(&mut writer, self.greeting)?;

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Ok(());
            }
            let command = line.trim_end().to_string();
            log.lock().expect("transcript").push(command.clone());
            let upper = command.to_ascii_uppercase();

            if upper.starts_with("EHLO") {
                reply(&mut writer, self.ehlo)?;
            } else if upper.starts_with("HELO") {
                reply(&mut writer, self.helo)?;
            } else if upper.starts_with("MAIL FROM") {
                reply(&mut writer, self.mail_from)?;
            } else if upper.starts_with("RCPT TO") {
                let address = command
                    .split_once('<')
                    .and_then(|(_, rest)| rest.split_once('>'))
                    .map(|(address, _)| address)
                    .unwrap_or("");
                if (self.accepts)(address) {
                    reply(&mut writer, "250 2.1.5 OK")?;
                } else {
                    reply(&mut writer, "550 5.1.1 User unknown")?;
                }
            } else if upper.starts_with("QUIT") {
                if !self.drop_on_quit {
                    reply(&mut writer, "221 2.0.0 Bye")?;
                }
                return Ok(());
            } else {
                reply(&mut writer, "500 5.5.2 Command unrecognized")?;
            }
        }
    }
}

fn reply(writer: &mut TcpStream, text: &str) -> std::io::Result<()> {
    writer.write_all(text.as_bytes())?;
    writer.write_all(b"\r\n")?;
    writer.flush()
}

/// A loopback port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    port
}

/// Knows MX records but cannot resolve any host name.
pub struct UnresolvableHosts;

impl MailHostLookup for UnresolvableHosts {
    fn lookup_mx(&self, _domain: &str) -> Result<Vec<MxRecord>, LookupFailure> {
        Ok(vec![MxRecord::new(10, "mx.example.com")])
    }

    fn lookup_addresses(&self, _host: &str) -> Result<Vec<IpAddr>, LookupFailure> {
        Err(LookupFailure::NxDomain)
    }
}

/// Answers every MX query with the same records and every address query
/// with loopback.
pub struct FixedLookup(pub Vec<MxRecord>);

impl FixedLookup {
    pub fn loopback_mx() -> Self {
        Self(vec![MxRecord::new(10, "127.0.0.1")])
    }
}

impl MailHostLookup for FixedLookup {
    fn lookup_mx(&self, _domain: &str) -> Result<Vec<MxRecord>, LookupFailure> {
        Ok(self.0.clone())
    }

    fn lookup_addresses(&self, _host: &str) -> Result<Vec<IpAddr>, LookupFailure> {
        Ok(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
    }
}
