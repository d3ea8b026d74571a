/*
 * Test utilities and fakes for pifan
 *
 * Sensor, output driver and stdout stand-ins shared by the unit test modules.
 */

use std::collections::VecDeque;
use std::future::Future;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use pifan_error::{PifanError, Result};
use tokio::sync::oneshot;

use crate::gpio::OutputDriver;
use crate::policy::FanState;
use crate::sensor::TemperatureSource;
use crate::shutdown::StopCause;

/// Always reads the same temperature
pub struct FixedSensor(pub f64);

impl TemperatureSource for FixedSensor {
    fn read_celsius(&self) -> Result<f64> {
        Ok(self.0)
    }
}

/// Always fails with an unparseable reading
pub struct FailingSensor;

impl TemperatureSource for FailingSensor {
    fn read_celsius(&self) -> Result<f64> {
        Err(PifanError::sensor_parse("temp=??'C"))
    }
}

#[derive(Default)]
struct Script {
    samples: VecDeque<f64>,
    last: f64,
    reads: usize,
    on_exhausted: Option<(oneshot::Sender<StopCause>, StopCause)>,
}

/// Plays back a list of samples, then keeps repeating the last one
#[derive(Clone)]
pub struct ScriptedSensor {
    script: Arc<Mutex<Script>>,
}

impl ScriptedSensor {
    pub fn new(samples: Vec<f64>) -> Self {
        let last = samples.last().copied().unwrap_or_default();
        Self {
            script: Arc::new(Mutex::new(Script {
                samples: samples.into(),
                last,
                ..Default::default()
            })),
        }
    }

    /// Resolve the returned future with `cause` on the first read past the script
    pub fn stop_when_exhausted(self, cause: StopCause) -> (Self, impl Future<Output = StopCause>) {
        let (tx, rx) = oneshot::channel();
        self.script.lock().unwrap().on_exhausted = Some((tx, cause));
        (self, async move { rx.await.unwrap_or(cause) })
    }

    pub fn reads(&self) -> usize {
        self.script.lock().unwrap().reads
    }
}

impl TemperatureSource for ScriptedSensor {
    fn read_celsius(&self) -> Result<f64> {
        let mut script = self.script.lock().unwrap();
        script.reads += 1;
        match script.samples.pop_front() {
            Some(sample) => Ok(sample),
            None => {
                if let Some((tx, cause)) = script.on_exhausted.take() {
                    let _ = tx.send(cause);
                }
                Ok(script.last)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverEvent {
    Drive(FanState),
    Release,
}

/// Records every driver call; clones share the same log
#[derive(Clone, Default)]
pub struct RecordingDriver {
    events: Arc<Mutex<Vec<DriverEvent>>>,
    fail_next: Arc<Mutex<bool>>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DriverEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Make the next `drive` call fail
    pub fn fail_next(&self) {
        *self.fail_next.lock().unwrap() = true;
    }
}

impl OutputDriver for RecordingDriver {
    fn drive(&mut self, state: FanState) -> Result<()> {
        let mut fail = self.fail_next.lock().unwrap();
        if *fail {
            *fail = false;
            return Err(PifanError::gpio(8, "simulated failure"));
        }
        self.events.lock().unwrap().push(DriverEvent::Drive(state));
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.events.lock().unwrap().push(DriverEvent::Release);
        Ok(())
    }
}

/// In-memory stdout; clones share the same buffer
#[derive(Clone, Default)]
pub struct SharedBuffer {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        let buf = self.buf.lock().unwrap();
        String::from_utf8_lossy(&buf).lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Stdout whose reader has gone away
pub struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _data: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }
}
