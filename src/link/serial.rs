use super::frame::FrameDecoder;
use super::protocol::LinkMessage;
use crate::breakers::BreakerState;
use crate::bus::{CommandBus, TelemetryBus};
use crate::config::{PanelConfig, TopicConfig};
use crate::diagnostics::DiagnosticReport;
use crate::error::{CommandError, LinkError};
use crate::mode::OperatingMode;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serialport::{SerialPort, SerialPortType};
use std::collections::HashMap;
use std::io::{ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, error, info, trace, warn};

const READ_TIMEOUT: Duration = Duration::from_millis(100);
const REPORT_BACKLOG: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub ok: bool,
    pub detail: Option<String>,
}

/// State shared between the reader thread and callers.
struct LinkShared {
    topics: TopicConfig,
    pending: Mutex<HashMap<u32, oneshot::Sender<Reply>>>,
    /// Taken on disconnect so subscribers see the stream end.
    reports: Mutex<Option<broadcast::Sender<DiagnosticReport>>>,
    connected: AtomicBool,
}

impl LinkShared {
    fn new(topics: TopicConfig) -> Self {
        let (reports, _) = broadcast::channel(REPORT_BACKLOG);
        Self {
            topics,
            pending: Mutex::new(HashMap::new()),
            reports: Mutex::new(Some(reports)),
            connected: AtomicBool::new(true),
        }
    }

    fn handle_frame(&self, frame: &[u8]) {
        let message = match LinkMessage::from_payload(frame) {
            Ok(message) => message,
            Err(e) => {
                warn!("dropping unparsable link message: {}", e);
                return;
            }
        };

        match message {
            LinkMessage::Diagnostics { topic, report } => {
                if topic != self.topics.diagnostics {
                    trace!("ignoring report on topic {}", topic);
                    return;
                }
                if let Ok(reports) = self.reports.lock() {
                    if let Some(tx) = reports.as_ref() {
                        // no receivers is fine, nobody is subscribed yet
                        let _ = tx.send(report);
                    }
                }
            }
            LinkMessage::Reply { id, ok, detail } => {
                let waiter = match self.pending.lock() {
                    Ok(mut pending) => pending.remove(&id),
                    Err(_) => {
                        error!("pending reply table poisoned");
                        return;
                    }
                };
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(Reply { ok, detail });
                    }
                    None => debug!("reply {} has no waiter (timed out?)", id),
                }
            }
            other => trace!("ignoring outbound-only message {:?}", other),
        }
    }

    fn register(&self, id: u32) -> Result<oneshot::Receiver<Reply>, CommandError> {
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .map_err(|_| CommandError::Transport("pending reply table poisoned".into()))?
            .insert(id, tx);
        Ok(rx)
    }

    fn forget(&self, id: u32) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(&id);
        }
    }

    /// Drops every waiter and the report sender so callers and subscribers
    /// see the link as gone.
    fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        if let Ok(mut pending) = self.pending.lock() {
            pending.clear();
        }
        if let Ok(mut reports) = self.reports.lock() {
            reports.take();
        }
    }

    fn report_stream(&self) -> BoxStream<'static, DiagnosticReport> {
        let rx = match self.reports.lock() {
            Ok(reports) => reports.as_ref().map(|tx| tx.subscribe()),
            Err(_) => {
                error!("report sender lock poisoned");
                None
            }
        };
        let Some(rx) = rx else {
            return stream::empty().boxed();
        };
        stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(report) => return Some((report, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("telemetry subscriber skipped {} reports", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}

/// Telemetry and command transport over a serial line to the base bridge.
pub struct SerialLink {
    writer: Arc<Mutex<Box<dyn SerialPort>>>,
    shared: Arc<LinkShared>,
    next_id: AtomicU32,
    timeout: Duration,
}

impl SerialLink {
    pub fn open(port_name: &str, config: &PanelConfig) -> Result<Self, LinkError> {
        let port = serialport::new(port_name, config.link.baud_rate)
            .timeout(READ_TIMEOUT)
            .open()?;
        let reader = port.try_clone()?;
        info!("opened {} at {} baud", port_name, config.link.baud_rate);

        let shared = Arc::new(LinkShared::new(config.topics.clone()));
        spawn_reader(reader, Arc::clone(&shared));

        Ok(Self {
            writer: Arc::new(Mutex::new(port)),
            shared,
            next_id: AtomicU32::new(1),
            timeout: config.link.command_timeout(),
        })
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    pub fn list_available_ports() -> Vec<String> {
        match serialport::available_ports() {
            Ok(ports) => ports
                .into_iter()
                .map(|port| {
                    if let SerialPortType::UsbPort(usb) = &port.port_type {
                        debug!("{}: usb {:04x}:{:04x}", port.port_name, usb.vid, usb.pid);
                    }
                    port.port_name
                })
                .collect(),
            Err(e) => {
                warn!("failed to list serial ports: {}", e);
                Vec::new()
            }
        }
    }

    async fn call(&self, id: u32, message: LinkMessage) -> Result<(), CommandError> {
        if !self.is_connected() {
            return Err(CommandError::Disconnected);
        }
        let frame = message.to_frame()?;
        let rx = self.shared.register(id)?;

        let writer = Arc::clone(&self.writer);
        let written = tokio::task::spawn_blocking(move || -> Result<(), LinkError> {
            let mut port = writer.lock().map_err(|_| {
                std::io::Error::new(ErrorKind::Other, "serial writer lock poisoned")
            })?;
            port.write_all(&frame)?;
            port.flush()?;
            Ok(())
        })
        .await
        .map_err(|e| CommandError::Transport(e.to_string()))?;

        if let Err(e) = written {
            self.shared.forget(id);
            return Err(e.into());
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Err(_) => {
                self.shared.forget(id);
                Err(CommandError::Timeout(self.timeout))
            }
            Ok(Err(_)) => Err(CommandError::Disconnected),
            Ok(Ok(Reply { ok: true, .. })) => Ok(()),
            Ok(Ok(Reply { detail, .. })) => Err(CommandError::Rejected(
                detail.unwrap_or_else(|| "no detail given".into()),
            )),
        }
    }

    fn take_id(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

fn spawn_reader(mut port: Box<dyn SerialPort>, shared: Arc<LinkShared>) {
    thread::spawn(move || {
        let mut decoder = FrameDecoder::new();
        let mut buf = [0u8; 512];
        loop {
            match port.read(&mut buf) {
                Ok(0) => {
                    warn!("serial port reached end of stream, closing link");
                    shared.disconnect();
                    break;
                }
                Ok(n) => {
                    decoder.push(&buf[..n]);
                    while let Some(frame) = decoder.next_frame() {
                        match frame {
                            Ok(payload) => shared.handle_frame(&payload),
                            Err(e) => warn!("dropping frame: {}", e),
                        }
                    }
                }
                Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock => {}
                Err(e) => {
                    error!("serial read failed, closing link: {}", e);
                    shared.disconnect();
                    break;
                }
            }
        }
    });
}

impl TelemetryBus for SerialLink {
    fn subscribe(&self) -> BoxStream<'static, DiagnosticReport> {
        self.shared.report_stream()
    }
}

#[async_trait]
impl CommandBus for SerialLink {
    async fn set_digital_outputs(&self, outputs: BreakerState) -> Result<(), CommandError> {
        let id = self.take_id();
        let message = LinkMessage::SetDigitalOutputs {
            id,
            service: self.shared.topics.set_digital_outputs.clone(),
            outputs: outputs.outputs(),
        };
        self.call(id, message).await
    }

    async fn set_operation_mode(&self, mode: OperatingMode) -> Result<(), CommandError> {
        let id = self.take_id();
        let message = LinkMessage::SetOperationMode {
            id,
            service: self.shared.topics.set_operation_mode.clone(),
            mode: mode.code(),
        };
        self.call(id, message).await
    }
}
