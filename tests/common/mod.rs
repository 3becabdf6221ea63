//! Shared fakes for the integration suites: an in-memory storage medium,
//! a fixed clock, a scripted bus transport and a virtual delay that
//! advances time without sleeping.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use fieldlog::{
    BusTransport, CalendarDate, Clock, Delay, StorageError, StorageFile, StorageMedium,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[derive(Debug, Default)]
pub struct MediaState {
    pub dirs: HashSet<String>,
    pub files: HashMap<String, Vec<u8>>,
    pub closed: Vec<String>,
    pub sync_count: u32,
    pub fail_dir: bool,
    pub fail_create: bool,
    pub fail_close: bool,
    /// Accept at most this many bytes per write (simulates a failing card).
    pub short_write_limit: Option<usize>,
    /// Synthetic base added to every reported file position, for driving
    /// the rotation ceiling without writing gigabytes.
    pub position_offset: u64,
}

/// In-memory [`StorageMedium`]. Clones share state, so a test can keep a
/// handle for inspection after moving one into the logger.
#[derive(Clone, Default)]
pub struct MockStorage {
    pub state: Rc<RefCell<MediaState>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-creates an empty file, as if a previous run left it behind.
    pub fn touch(&self, name: &str) {
        self.state
            .borrow_mut()
            .files
            .insert(name.to_string(), Vec::new());
    }

    pub fn file_content(&self, name: &str) -> Option<String> {
        self.state
            .borrow()
            .files
            .get(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.borrow().files.keys().cloned().collect();
        names.sort();
        names
    }
}

pub struct MockFile {
    state: Rc<RefCell<MediaState>>,
    path: String,
}

impl StorageMedium for MockStorage {
    type File = MockFile;

    fn exists(&mut self, path: &str) -> bool {
        let state = self.state.borrow();
        state.dirs.contains(path) || state.files.contains_key(path)
    }

    fn create_dir(&mut self, path: &str) -> Result<(), StorageError> {
        let mut state = self.state.borrow_mut();
        if state.fail_dir {
            return Err(StorageError::Directory);
        }
        state.dirs.insert(path.to_string());
        Ok(())
    }

    fn create(&mut self, path: &str) -> Result<Self::File, StorageError> {
        let mut state = self.state.borrow_mut();
        if state.fail_create {
            return Err(StorageError::Create);
        }
        state.files.entry(path.to_string()).or_default();
        Ok(MockFile {
            state: Rc::clone(&self.state),
            path: path.to_string(),
        })
    }
}

impl StorageFile for MockFile {
    fn write(&mut self, data: &[u8]) -> Result<usize, StorageError> {
        let mut state = self.state.borrow_mut();
        let accepted = state
            .short_write_limit
            .map_or(data.len(), |limit| data.len().min(limit));
        state
            .files
            .entry(self.path.clone())
            .or_default()
            .extend_from_slice(&data[..accepted]);
        Ok(accepted)
    }

    fn sync(&mut self) -> Result<(), StorageError> {
        self.state.borrow_mut().sync_count += 1;
        Ok(())
    }

    fn position(&self) -> u64 {
        let state = self.state.borrow();
        state.position_offset + state.files.get(&self.path).map_or(0, Vec::len) as u64
    }

    fn close(self) -> Result<(), StorageError> {
        let mut state = self.state.borrow_mut();
        if state.fail_close {
            return Err(StorageError::Close);
        }
        state.closed.push(self.path.clone());
        Ok(())
    }
}

pub struct MockClock(pub CalendarDate);

impl Clock for MockClock {
    fn today(&mut self) -> CalendarDate {
        self.0
    }
}

pub fn fixed_clock() -> MockClock {
    MockClock(CalendarDate {
        year: 2024,
        month: 6,
        day: 15,
    })
}

#[derive(Debug, Default)]
pub struct BusState {
    pub started: bool,
    pub sent: Vec<String>,
    pub rx: VecDeque<u8>,
    /// Addresses that answer attention probes.
    pub responding: HashSet<char>,
    /// Reply loaded into the receive buffer for each measurement command.
    pub reply: Option<Vec<u8>>,
    pub clear_count: u32,
}

/// Scripted [`BusTransport`]. Clones share state, so a test can inspect
/// the frames a driver sent after handing one clone over.
#[derive(Clone, Default)]
pub struct MockBus {
    pub state: Rc<RefCell<BusState>>,
}

impl BusTransport for MockBus {
    fn start(&mut self) {
        self.state.borrow_mut().started = true;
    }

    fn send_command(&mut self, frame: &str) {
        let mut state = self.state.borrow_mut();
        state.sent.push(frame.to_string());
        if frame.len() == 2 && frame.ends_with('!') {
            // attention probe: a responding device sends something back
            if let Some(address) = frame.chars().next() {
                if state.responding.contains(&address) {
                    state.rx.push_back(address as u8);
                }
            }
        } else if let Some(reply) = state.reply.clone() {
            state.rx = reply.into_iter().collect();
        }
    }

    fn available(&mut self) -> bool {
        !self.state.borrow().rx.is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.state.borrow_mut().rx.pop_front()
    }

    fn clear_input(&mut self) {
        let mut state = self.state.borrow_mut();
        state.rx.clear();
        state.clear_count += 1;
    }
}

/// [`Delay`] that accumulates requested time instead of sleeping.
#[derive(Clone, Default)]
pub struct VirtualDelay {
    pub elapsed_ms: Rc<RefCell<u32>>,
}

impl VirtualDelay {
    pub fn elapsed(&self) -> u32 {
        *self.elapsed_ms.borrow()
    }
}

impl Delay for VirtualDelay {
    fn delay_ms(&mut self, ms: u32) {
        *self.elapsed_ms.borrow_mut() += ms;
    }
}
