#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use dxobj::{Clock, PollPolicy, ProjectId, StateWaiter, Workspace};
use dxobj_core::ObjectKind;
use dxobj_remote::{KindClient, RemoteCall};
use dxobj_sim::{SimConfig, SimPlatform};

pub const HOME: &str = "project-home";
pub const OTHER: &str = "project-other";

pub struct Fixture {
    pub platform: Arc<SimPlatform>,
    pub workspace: Workspace,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    pub fn with_config(config: SimConfig) -> Self {
        let platform = Arc::new(SimPlatform::new(config));
        platform.add_project(ProjectId::new(HOME));
        platform.add_project(ProjectId::new(OTHER));
        Self {
            platform,
            workspace: Workspace::new(ProjectId::new(HOME)),
        }
    }

    pub fn generic(&self) -> Arc<dyn RemoteCall> {
        Arc::new(KindClient::generic(self.platform.clone()))
    }

    pub fn calls(&self, kind: ObjectKind) -> Arc<dyn RemoteCall> {
        Arc::new(KindClient::new(kind, self.platform.clone()))
    }
}

/// Clock that advances only when slept on.
#[derive(Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().expect("clock lock").clone()
    }

    pub fn elapsed(&self) -> Duration {
        *self.now.lock().expect("clock lock")
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().expect("clock lock")
    }

    fn sleep(&self, duration: Duration) {
        *self.now.lock().expect("clock lock") += duration;
        self.sleeps.lock().expect("clock lock").push(duration);
    }
}

pub fn manual_waiter() -> (Arc<ManualClock>, StateWaiter) {
    let clock = Arc::new(ManualClock::default());
    let waiter = StateWaiter::new(PollPolicy::default(), clock.clone());
    (clock, waiter)
}
