use std::{fmt::Display, sync::Arc, time::Duration};

use tokio::sync::watch;

use crate::errors::HeapError;

/// Slowest accepted speed factor; one step then lasts a hundred base delays.
pub const MIN_SPEED: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgoStatus {
    Stopped,
    Running,
    Paused,
}

impl Display for AlgoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlgoStatus::Stopped => write!(f, "stopped"),
            AlgoStatus::Running => write!(f, "running"),
            AlgoStatus::Paused => write!(f, "paused"),
        }
    }
}

/// Shared handle over the run status and the speed factor.
///
/// Clones observe and drive the same run, so one can sit with an animation
/// while another is handed to whatever reads the user's pause and speed
/// requests.
#[derive(Debug, Clone)]
pub struct Controls {
    status: Arc<watch::Sender<AlgoStatus>>,
    speed: Arc<watch::Sender<f64>>,
    base_delay: Duration,
}

impl Controls {
    pub fn new(base_delay: Duration, speed: f64) -> Result<Controls, HeapError> {
        check_speed(speed)?;
        let (status, _) = watch::channel(AlgoStatus::Stopped);
        let (speed, _) = watch::channel(speed);
        Ok(Controls {
            status: Arc::new(status),
            speed: Arc::new(speed),
            base_delay,
        })
    }

    pub fn status(&self) -> AlgoStatus {
        *self.status.borrow()
    }

    pub fn is_stopped(&self) -> bool {
        self.status() == AlgoStatus::Stopped
    }

    pub fn speed(&self) -> f64 {
        *self.speed.borrow()
    }

    /// Stopped -> Running. False if a run is already active.
    pub fn start(&self) -> bool {
        self.transition(AlgoStatus::Stopped, AlgoStatus::Running)
    }

    pub fn pause(&self) -> bool {
        self.transition(AlgoStatus::Running, AlgoStatus::Paused)
    }

    pub fn resume(&self) -> bool {
        self.transition(AlgoStatus::Paused, AlgoStatus::Running)
    }

    /// Pause when running, resume when paused. Returns the resulting status.
    pub fn toggle_pause(&self) -> AlgoStatus {
        self.status.send_modify(|s| {
            *s = match *s {
                AlgoStatus::Running => AlgoStatus::Paused,
                AlgoStatus::Paused => AlgoStatus::Running,
                AlgoStatus::Stopped => AlgoStatus::Stopped,
            }
        });
        self.status()
    }

    /// Any state -> Stopped. A paused run is released and abandons its remaining steps.
    pub fn stop(&self) {
        let previous = self.status.send_replace(AlgoStatus::Stopped);
        if previous != AlgoStatus::Stopped {
            log::debug!("stopping {} run", previous);
        }
    }

    pub fn set_speed(&self, speed: f64) -> Result<(), HeapError> {
        check_speed(speed)?;
        self.speed.send_replace(speed);
        Ok(())
    }

    /// The delay for one step, scaled by `scale` and the current speed.
    /// Saturates rather than overflowing for very long base delays.
    pub fn delay(&self, scale: f64) -> Duration {
        let secs = self.base_delay.as_secs_f64() * scale / self.speed();
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Sleep for one scaled step delay. The speed is read when the sleep starts.
    pub async fn wait(&self, scale: f64) {
        tokio::time::sleep(self.delay(scale)).await;
    }

    /// Suspend while paused. Returns false once the run has been stopped.
    pub async fn checkpoint(&self) -> bool {
        let mut rx = self.status.subscribe();
        match rx.wait_for(|s| *s != AlgoStatus::Paused).await {
            Ok(status) => *status == AlgoStatus::Running,
            Err(_) => false,
        }
    }

    /// Resets the status to Stopped when dropped, even if the run is abandoned mid-step.
    pub fn run_guard(&self) -> RunGuard {
        RunGuard {
            controls: self.clone(),
        }
    }

    fn transition(&self, from: AlgoStatus, to: AlgoStatus) -> bool {
        self.status.send_if_modified(|s| {
            if *s == from {
                *s = to;
                true
            } else {
                false
            }
        })
    }
}

pub struct RunGuard {
    controls: Controls,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.controls.stop();
    }
}

pub fn check_speed(speed: f64) -> Result<(), HeapError> {
    if speed.is_finite() && speed >= MIN_SPEED {
        Ok(())
    } else {
        Err(HeapError::BadSpeed(speed))
    }
}
