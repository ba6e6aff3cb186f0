//! In-memory dialer for driving sessions in unit tests

use crate::socks::TargetAddr;
use crate::transport::Dialer;
use async_trait::async_trait;
use std::io;
use std::sync::Mutex;
use tokio::io::{duplex, DuplexStream};

#[derive(Debug)]
enum Mode {
    Echo,
    Refuse,
}

/// Records every dial; either refuses it or connects to an echo peer
#[derive(Debug)]
pub(crate) struct MockDialer {
    mode: Mode,
    dialed: Mutex<Vec<String>>,
}

impl MockDialer {
    pub(crate) fn echo() -> Self {
        MockDialer {
            mode: Mode::Echo,
            dialed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn refuse() -> Self {
        MockDialer {
            mode: Mode::Refuse,
            dialed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn dialed(&self) -> Vec<String> {
        self.dialed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dialer for MockDialer {
    type Stream = DuplexStream;

    async fn dial(&self, target: &TargetAddr) -> io::Result<Self::Stream> {
        self.dialed.lock().unwrap().push(target.to_string());

        match self.mode {
            Mode::Refuse => Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("{} refused", target),
            )),
            Mode::Echo => {
                let (local, remote) = duplex(1024);
                tokio::spawn(async move {
                    let (mut reader, mut writer) = tokio::io::split(remote);
                    let _ = tokio::io::copy(&mut reader, &mut writer).await;
                });
                Ok(local)
            }
        }
    }
}
