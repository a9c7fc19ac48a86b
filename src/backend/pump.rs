//! Pumps bridging blocking process I/O into async channels.
//!
//! PTY masters and child pipes only expose blocking `Read`/`Write`; the
//! pumps run their loops on blocking threads and exchange chunks through
//! mpsc channels. On the output side, dropping the sender when the loop
//! ends is what closes a session's data stream; on the input side, dropping
//! the sender is what stops the writer.

use std::io::{Read, Write};
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

/// Pumps raw output chunks from a process into a channel.
pub struct OutputPump<R: Read + Send + 'static> {
    reader: R,
    tx: mpsc::Sender<Vec<u8>>,
    buffer_size: usize,
}

impl<R: Read + Send + 'static> OutputPump<R> {
    /// Create a new OutputPump.
    ///
    /// # Arguments
    ///
    /// * `reader` - The process output reader (blocking).
    /// * `tx` - Channel sender for output data.
    pub fn new(reader: R, tx: mpsc::Sender<Vec<u8>>) -> Self {
        Self {
            reader,
            tx,
            buffer_size: 4096,
        }
    }

    /// Create with custom buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Run the pump loop on a blocking thread.
    ///
    /// Returns when:
    /// - The stream is closed (read returns 0 or EIO)
    /// - The channel is closed (receiver dropped)
    /// - An unrecoverable error occurs
    pub async fn run(self) {
        let buffer_size = self.buffer_size;
        let mut reader = self.reader;
        let tx = self.tx;

        let result = tokio::task::spawn_blocking(move || {
            let mut buf = vec![0u8; buffer_size];

            loop {
                match reader.read(&mut buf) {
                    Ok(0) => {
                        debug!("output pump: EOF");
                        break;
                    }
                    Ok(n) => {
                        trace!("output pump: read {} bytes", n);
                        if tx.blocking_send(buf[..n].to_vec()).is_err() {
                            debug!("output pump: channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        // EIO on Unix typically means the PTY slave was closed
                        #[cfg(unix)]
                        if e.raw_os_error() == Some(libc::EIO) {
                            debug!("output pump: PTY closed (EIO)");
                            break;
                        }

                        if e.kind() == std::io::ErrorKind::BrokenPipe {
                            debug!("output pump: broken pipe");
                            break;
                        }

                        error!("output pump error: {}", e);
                        break;
                    }
                }
            }
        })
        .await;

        if let Err(e) = result {
            error!("output pump task panicked: {}", e);
        }
    }
}

/// Pumps input chunks from a channel into a process.
///
/// The blocking `write_all`+`flush` happens on a blocking thread; callers
/// feed the channel and never touch the writer, so a stalled process (full
/// input pipe) stalls only this pump.
pub struct InputPump<W: Write + Send + 'static> {
    writer: W,
    rx: mpsc::Receiver<Vec<u8>>,
}

impl<W: Write + Send + 'static> InputPump<W> {
    /// Create a new InputPump.
    ///
    /// # Arguments
    ///
    /// * `writer` - The process input writer (blocking).
    /// * `rx` - Channel receiver for input data.
    pub fn new(writer: W, rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self { writer, rx }
    }

    /// Run the pump loop on a blocking thread.
    ///
    /// Returns when:
    /// - The channel is closed (all senders dropped)
    /// - The process input pipe is gone (broken pipe)
    /// - An unrecoverable error occurs
    pub async fn run(self) {
        let mut writer = self.writer;
        let mut rx = self.rx;

        let result = tokio::task::spawn_blocking(move || {
            while let Some(data) = rx.blocking_recv() {
                trace!("input pump: writing {} bytes", data.len());
                if let Err(e) = writer.write_all(&data).and_then(|_| writer.flush()) {
                    if e.kind() == std::io::ErrorKind::BrokenPipe {
                        debug!("input pump: broken pipe");
                    } else {
                        error!("input pump error: {}", e);
                    }
                    break;
                }
            }
            debug!("input pump: channel closed");
        })
        .await;

        if let Err(e) = result {
            error!("input pump task panicked: {}", e);
        }
    }
}
