//! In-memory fakes for the cache, the store, and the private channel.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vouch_common::{Challenge, IdentityId, Result, VerifiedIdentity, VouchError};

use crate::cache::ExistenceCache;
use crate::challenge::{CountdownDisplay, PrivateChannel, ReplyFilter};
use crate::store::IdentityStore;

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashSet<IdentityId>>,
    down: AtomicBool,
}

impl MemoryCache {
    pub fn with(ids: &[&str]) -> Self {
        let cache = Self::default();
        cache
            .entries
            .lock()
            .unwrap()
            .extend(ids.iter().map(|id| IdentityId::from(*id)));
        cache
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.lock().unwrap().contains(&IdentityId::from(id))
    }

    pub fn snapshot(&self) -> HashSet<IdentityId> {
        self.entries.lock().unwrap().clone()
    }

    pub fn go_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(VouchError::CacheUnavailable("connection refused".into()));
        }
        Ok(())
    }
}

impl ExistenceCache for MemoryCache {
    async fn exists(&self, id: &IdentityId) -> Result<bool> {
        self.check()?;
        Ok(self.entries.lock().unwrap().contains(id))
    }

    async fn add(&self, id: &IdentityId) -> Result<()> {
        self.check()?;
        self.entries.lock().unwrap().insert(id.clone());
        Ok(())
    }

    async fn remove(&self, id: &IdentityId) -> Result<()> {
        self.check()?;
        self.entries.lock().unwrap().remove(id);
        Ok(())
    }

    async fn members(&self) -> Result<Vec<IdentityId>> {
        self.check()?;
        Ok(self.entries.lock().unwrap().iter().cloned().collect())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<IdentityId, VerifiedIdentity>>,
    creates: AtomicUsize,
    deletes: AtomicUsize,
    down: AtomicBool,
}

impl MemoryStore {
    pub fn with(ids: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut records = store.records.lock().unwrap();
            for id in ids {
                let id = IdentityId::from(*id);
                records.insert(id.clone(), VerifiedIdentity::new(id));
            }
        }
        store
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.lock().unwrap().contains_key(&IdentityId::from(id))
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn go_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(VouchError::StoreUnavailable("pool timed out".into()));
        }
        Ok(())
    }
}

impl IdentityStore for MemoryStore {
    async fn create(&self, id: &IdentityId) -> Result<VerifiedIdentity> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut records = self.records.lock().unwrap();
        if records.contains_key(id) {
            return Err(VouchError::AlreadyExists(id.to_string()));
        }
        let record = VerifiedIdentity::new(id.clone());
        records.insert(id.clone(), record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &IdentityId) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        match self.records.lock().unwrap().remove(id) {
            Some(_) => Ok(()),
            None => Err(VouchError::NotFound(id.to_string())),
        }
    }

    async fn list_all(&self) -> Result<Vec<VerifiedIdentity>> {
        self.check()?;
        let mut all: Vec<_> = self.records.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|r| r.verified_at);
        Ok(all)
    }
}

/// What the scripted user does once the challenge arrives
#[derive(Debug, Clone)]
pub enum Reply {
    /// Never answers
    Silent,
    /// Sends back the issued code after a delay
    Echo(Duration),
    /// Sends the issued code with its last character changed
    Corrupt(Duration),
    /// Sends fixed text after a delay
    After(Duration, String),
}

pub struct ScriptedChannel {
    reply: Reply,
    undeliverable: bool,
    broken_display: bool,
    failing_ack: bool,
    issued: Mutex<Option<String>>,
    countdown: Arc<Mutex<Vec<Duration>>>,
}

impl ScriptedChannel {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            undeliverable: false,
            broken_display: false,
            failing_ack: false,
            issued: Mutex::new(None),
            countdown: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn undeliverable(mut self) -> Self {
        self.undeliverable = true;
        self
    }

    pub fn with_broken_display(mut self) -> Self {
        self.broken_display = true;
        self
    }

    pub fn with_failing_acknowledgement(mut self) -> Self {
        self.failing_ack = true;
        self
    }

    pub fn issued_code(&self) -> Option<String> {
        self.issued.lock().unwrap().clone()
    }

    pub fn countdown(&self) -> Vec<Duration> {
        self.countdown.lock().unwrap().clone()
    }
}

pub struct RecordingDisplay {
    shown: Arc<Mutex<Vec<Duration>>>,
    broken: bool,
}

impl CountdownDisplay for RecordingDisplay {
    async fn show_remaining(&mut self, remaining: Duration) -> Result<()> {
        if self.broken {
            return Err(VouchError::Delivery("unknown message".into()));
        }
        self.shown.lock().unwrap().push(remaining);
        Ok(())
    }
}

impl PrivateChannel for ScriptedChannel {
    type Display = RecordingDisplay;

    async fn deliver(&self, challenge: &Challenge) -> Result<RecordingDisplay> {
        if self.undeliverable {
            return Err(VouchError::Delivery("cannot send messages to this user".into()));
        }
        *self.issued.lock().unwrap() = Some(challenge.code.clone());
        Ok(RecordingDisplay {
            shown: self.countdown.clone(),
            broken: self.broken_display,
        })
    }

    async fn acknowledge(&self) -> Result<()> {
        if self.failing_ack {
            return Err(VouchError::Delivery("unknown interaction".into()));
        }
        Ok(())
    }

    async fn next_reply(&self, filter: ReplyFilter) -> Option<String> {
        let code = self.issued_code()?;
        let (delay, content) = match &self.reply {
            Reply::Silent => return std::future::pending().await,
            Reply::Echo(delay) => (*delay, code),
            Reply::Corrupt(delay) => {
                let mut corrupted = code;
                let last = corrupted.pop().unwrap_or('0');
                corrupted.push(if last == 'f' { '0' } else { 'f' });
                (*delay, corrupted)
            }
            Reply::After(delay, text) => (*delay, text.clone()),
        };

        tokio::time::sleep(delay).await;
        if filter.accepts(&content) {
            Some(content)
        } else {
            std::future::pending().await
        }
    }
}
