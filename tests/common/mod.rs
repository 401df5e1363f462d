//! Fake collaborators for controller tests
#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use radio_control::amplifier::{AmplifierController, StepDirection, VolumeDriver};
use radio_control::channels::{Channel, ChannelRegistry};
use radio_control::control::{
    HardwareClaim, InputGate, PowerControl, RadioController, ShutdownSequencer,
};
use radio_control::error::{HardwareError, PersistenceError, ProcessError};
use radio_control::persistence::{PersistedState, StateStore};
use radio_control::stream::{Announcer, StreamHandle, StreamLauncher, StreamSession};

pub const ANNOUNCE_VOLUME: u8 = 55;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Volume(u8),
    Step(StepDirection),
    Announce(String),
    Launch { pid: u32, url: String },
    Quit(u32),
    Kill(u32),
    Release(String),
    Halt,
}

#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    pub fn push(&self, event: Event) {
        self.0.lock().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    /// Amplifier writes recorded so far
    pub fn volume_writes(&self) -> usize {
        self.0
            .lock()
            .iter()
            .filter(|e| matches!(e, Event::Volume(_) | Event::Step(_)))
            .count()
    }

    pub fn launches(&self) -> Vec<String> {
        self.0
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Launch { url, .. } => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, event: &Event) -> Option<usize> {
        self.0.lock().iter().position(|e| e == event)
    }
}

pub struct FakeAmp {
    journal: Journal,
    fail: Arc<AtomicBool>,
    stepping: bool,
}

impl VolumeDriver for FakeAmp {
    fn set_absolute(&mut self, level: u8) -> Result<(), HardwareError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(HardwareError::I2cWrite {
                address: 0x4B,
                byte: level,
                reason: "bus error".into(),
            });
        }
        self.journal.push(Event::Volume(level));
        Ok(())
    }

    fn supports_step(&self) -> bool {
        self.stepping
    }

    fn step(&mut self, direction: StepDirection) -> Result<(), HardwareError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(HardwareError::I2cWrite {
                address: 0x4B,
                byte: 0xC4,
                reason: "bus error".into(),
            });
        }
        self.journal.push(Event::Step(direction));
        Ok(())
    }
}

/// Players currently alive, and the most ever alive at once
#[derive(Clone, Default)]
pub struct Liveness {
    live: Arc<Mutex<HashSet<u32>>>,
    peak: Arc<AtomicUsize>,
}

impl Liveness {
    fn started(&self, pid: u32) {
        let mut live = self.live.lock();
        live.insert(pid);
        self.peak.fetch_max(live.len(), Ordering::SeqCst);
    }

    fn stopped(&self, pid: u32) {
        self.live.lock().remove(&pid);
    }

    pub fn live(&self) -> usize {
        self.live.lock().len()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

struct FakeHandle {
    pid: u32,
    journal: Journal,
    liveness: Liveness,
    quits: bool,
}

impl StreamHandle for FakeHandle {
    fn id(&self) -> u32 {
        self.pid
    }

    fn terminate(&mut self, timeout: Duration) -> Result<(), ProcessError> {
        self.journal.push(Event::Quit(self.pid));
        if self.quits {
            self.liveness.stopped(self.pid);
            Ok(())
        } else {
            Err(ProcessError::TerminateTimeout {
                pid: self.pid,
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }

    fn force_kill(&mut self) -> Result<(), ProcessError> {
        self.journal.push(Event::Kill(self.pid));
        self.liveness.stopped(self.pid);
        Ok(())
    }
}

pub struct FakeLauncher {
    journal: Journal,
    liveness: Liveness,
    next_pid: Arc<AtomicU32>,
    player_quits: Arc<AtomicBool>,
    fail: Arc<AtomicBool>,
}

impl StreamLauncher for FakeLauncher {
    fn launch(&mut self, channel: &Channel) -> Result<Box<dyn StreamHandle>, ProcessError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProcessError::SpawnFailed {
                program: "player".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        self.liveness.started(pid);
        self.journal.push(Event::Launch {
            pid,
            url: channel.url.clone(),
        });
        Ok(Box::new(FakeHandle {
            pid,
            journal: self.journal.clone(),
            liveness: self.liveness.clone(),
            quits: self.player_quits.load(Ordering::SeqCst),
        }))
    }
}

pub struct FakeAnnouncer(Journal);

impl Announcer for FakeAnnouncer {
    fn announce(&mut self, text: &str) -> Result<(), ProcessError> {
        self.0.push(Event::Announce(text.to_string()));
        Ok(())
    }
}

/// In-memory store; `None` fields behave like missing files
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub volume: Arc<Mutex<Option<u8>>>,
    pub channel: Arc<Mutex<Option<usize>>>,
    pub fail: Arc<AtomicBool>,
    pub saves: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn with(volume: u8, channel: usize) -> Self {
        let store = Self::default();
        *store.volume.lock() = Some(volume);
        *store.channel.lock() = Some(channel);
        store
    }

    fn check(&self, name: &str) -> Result<(), PersistenceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PersistenceError::Write {
                path: name.into(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            });
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> PersistedState {
        let defaults = PersistedState::default();
        PersistedState {
            last_volume: self.volume.lock().unwrap_or(defaults.last_volume),
            last_channel_index: self.channel.lock().unwrap_or(defaults.last_channel_index),
        }
    }

    fn save_volume(&mut self, volume: u8) -> Result<(), PersistenceError> {
        self.check("last_volume")?;
        *self.volume.lock() = Some(volume);
        Ok(())
    }

    fn save_channel(&mut self, index: usize) -> Result<(), PersistenceError> {
        self.check("last_channel_index")?;
        *self.channel.lock() = Some(index);
        Ok(())
    }
}

pub struct FakeClaim(Journal);

impl HardwareClaim for FakeClaim {
    fn name(&self) -> &str {
        "fake-gpio"
    }

    fn release(&mut self) -> Result<(), HardwareError> {
        self.0.push(Event::Release(self.name().to_string()));
        Ok(())
    }
}

pub struct FakePower(Journal);

impl PowerControl for FakePower {
    fn halt(&mut self) -> Result<(), ProcessError> {
        self.0.push(Event::Halt);
        Ok(())
    }
}

/// Input side that can be switched off mid-test
#[derive(Clone)]
pub struct Gate(Arc<AtomicBool>);

impl Gate {
    pub fn open() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn close(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl InputGate for Gate {
    fn is_open(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handles for steering and inspecting a controller under test
#[derive(Clone)]
pub struct Rig {
    pub journal: Journal,
    pub liveness: Liveness,
    pub amp_fail: Arc<AtomicBool>,
    pub launch_fail: Arc<AtomicBool>,
    pub player_quits: Arc<AtomicBool>,
}

pub fn channels(count: usize) -> ChannelRegistry {
    let channels = (0..count)
        .map(|i| Channel::new(format!("Channel {}", i), format!("http://radio.test/{}", i)))
        .collect();
    ChannelRegistry::new(channels).unwrap()
}

pub fn url(index: usize) -> String {
    format!("http://radio.test/{}", index)
}

pub fn controller(count: usize, store: Box<dyn StateStore>) -> (RadioController, Rig) {
    controller_with(count, store, false)
}

pub fn controller_with(
    count: usize,
    store: Box<dyn StateStore>,
    stepping: bool,
) -> (RadioController, Rig) {
    let rig = Rig {
        journal: Journal::default(),
        liveness: Liveness::default(),
        amp_fail: Arc::new(AtomicBool::new(false)),
        launch_fail: Arc::new(AtomicBool::new(false)),
        player_quits: Arc::new(AtomicBool::new(true)),
    };

    let amplifier = AmplifierController::new(Box::new(FakeAmp {
        journal: rig.journal.clone(),
        fail: rig.amp_fail.clone(),
        stepping,
    }));
    let session = StreamSession::new(
        Box::new(FakeLauncher {
            journal: rig.journal.clone(),
            liveness: rig.liveness.clone(),
            next_pid: Arc::new(AtomicU32::new(1000)),
            player_quits: rig.player_quits.clone(),
            fail: rig.launch_fail.clone(),
        }),
        Box::new(FakeAnnouncer(rig.journal.clone())),
        Duration::from_millis(500),
        ANNOUNCE_VOLUME,
    );
    let mut shutdown = ShutdownSequencer::new(Box::new(FakePower(rig.journal.clone())));
    shutdown.claim(Box::new(FakeClaim(rig.journal.clone())));

    let controller = RadioController::new(channels(count), amplifier, session, store, shutdown);
    (controller, rig)
}
