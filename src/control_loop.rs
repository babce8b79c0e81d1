// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains a minimal host which runs a controller against a hardware abstraction.
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::control_tools::{has_realtime_kernel, set_current_thread_to_highest_scheduler_priority};
use crate::controller::Controller;
use crate::exception::{ControllerException, ControllerResult};
use crate::hardware_interface::RobotHw;
use crate::params::ParameterStore;

/// Used to decide whether to enforce realtime mode for a control loop thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RealtimeConfig {
    Enforce,
    Ignore,
}

/// Drives one controller with a fixed period: read the hardware, update the controller,
/// write the hardware.
pub struct ControlLoop<H: RobotHw> {
    robot_hw: H,
    controller: Box<dyn Controller>,
    period: Duration,
    time: Duration,
    running: bool,
}

impl<H: RobotHw> ControlLoop<H> {
    /// Prepares the calling thread and initializes the controller.
    ///
    /// If this returns an error the controller was never started and will never be updated.
    /// # Errors
    /// * RealTimeException if `realtime_config` is `Enforce` and the thread cannot be made
    ///   realtime.
    /// * Any error of [`Controller::init`](`Controller::init`).
    pub fn new(
        mut robot_hw: H,
        mut controller: Box<dyn Controller>,
        params: &ParameterStore,
        period: Duration,
        realtime_config: RealtimeConfig,
    ) -> ControllerResult<Self> {
        if realtime_config == RealtimeConfig::Enforce {
            if !has_realtime_kernel() {
                return Err(ControllerException::RealTimeException {
                    message: "franka-hw-test: Running kernel does not have realtime capabilities."
                        .to_string(),
                });
            }
            set_current_thread_to_highest_scheduler_priority()?;
        }
        controller.init(&mut robot_hw, params)?;
        info!("Controller initialized, period {:?}", period);
        Ok(ControlLoop {
            robot_hw,
            controller,
            period,
            time: Duration::from_secs(0),
            running: false,
        })
    }

    /// Runs a single control cycle without waiting. Starts the controller on the first call.
    pub fn spin_once(&mut self) {
        if !self.running {
            self.controller.starting(&self.time);
            self.running = true;
        }
        self.robot_hw.read(&self.time, &self.period);
        self.controller.update(&self.time, &self.period);
        self.robot_hw.write(&self.time, &self.period);
        self.time += self.period;
    }

    /// Runs `cycles` control cycles, sleeping until the start of each cycle.
    pub fn run(&mut self, cycles: u32) {
        let start = Instant::now();
        for cycle in 0..cycles {
            self.spin_once();
            let next = start + self.period * (cycle + 1);
            let now = Instant::now();
            if next > now {
                std::thread::sleep(next - now);
            } else {
                debug!("cycle {} overran its period by {:?}", cycle, now - next);
            }
        }
    }

    /// Stops the controller. Spinning again restarts it.
    pub fn stop(&mut self) {
        if self.running {
            self.controller.stopping(&self.time);
            self.running = false;
            info!("Controller stopped after {:?}", self.time);
        }
    }

    /// Time the loop has advanced since it was created.
    pub fn time(&self) -> Duration {
        self.time
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn robot_hw(&self) -> &H {
        &self.robot_hw
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use crate::control_loop::{ControlLoop, RealtimeConfig};
    use crate::controller::Controller;
    use crate::exception::{ControllerException, ControllerResult};
    use crate::hardware_interface::RobotHw;
    use crate::mock_hw::MockFrankaHw;
    use crate::params::ParameterStore;

    #[derive(Default)]
    struct Calls {
        starting: usize,
        updates: Vec<(Duration, Duration)>,
        stopping: usize,
    }

    struct RecordingController {
        calls: Rc<RefCell<Calls>>,
        fail_init: bool,
    }

    impl Controller for RecordingController {
        fn init(&mut self, _: &mut dyn RobotHw, _: &ParameterStore) -> ControllerResult<()> {
            if self.fail_init {
                Err(ControllerException::InterfaceUnavailable {
                    message: "test".to_string(),
                })
            } else {
                Ok(())
            }
        }
        fn starting(&mut self, _time: &Duration) {
            self.calls.borrow_mut().starting += 1;
        }
        fn update(&mut self, time: &Duration, period: &Duration) {
            self.calls.borrow_mut().updates.push((*time, *period));
        }
        fn stopping(&mut self, _time: &Duration) {
            self.calls.borrow_mut().stopping += 1;
        }
    }

    #[test]
    fn lifecycle() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let controller = RecordingController {
            calls: calls.clone(),
            fail_init: false,
        };
        let period = Duration::from_millis(1);
        let mut control_loop = ControlLoop::new(
            MockFrankaHw::new(&["j1"]),
            Box::new(controller),
            &ParameterStore::new(),
            period,
            RealtimeConfig::Ignore,
        )
        .unwrap();
        assert!(!control_loop.is_running());
        control_loop.spin_once();
        control_loop.spin_once();
        control_loop.run(3);
        control_loop.stop();
        control_loop.stop();

        let calls = calls.borrow();
        assert_eq!(calls.starting, 1);
        assert_eq!(calls.stopping, 1);
        assert_eq!(calls.updates.len(), 5);
        assert_eq!(calls.updates[0], (Duration::from_millis(0), period));
        assert_eq!(calls.updates[4], (Duration::from_millis(4), period));
        assert_eq!(control_loop.time(), Duration::from_millis(5));
    }

    #[test]
    fn failed_init_never_updates() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let controller = RecordingController {
            calls: calls.clone(),
            fail_init: true,
        };
        let result = ControlLoop::new(
            MockFrankaHw::new(&["j1"]),
            Box::new(controller),
            &ParameterStore::new(),
            Duration::from_millis(1),
            RealtimeConfig::Ignore,
        );
        assert!(result.is_err());
        assert_eq!(calls.borrow().starting, 0);
        assert!(calls.borrow().updates.is_empty());
    }
}
