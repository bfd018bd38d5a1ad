use std::io::Write;
use std::time::Duration;

use axisbus_frame::{FrameWriter, SlaveAddress};
use tracing::info;

use crate::config::RobotConfig;
use crate::error::Result;
use crate::requests::{self, SetPoint};
use crate::session::Session;
use crate::velocity::{VelocitySnapshot, VelocityState};

/// Motor-control API over one serial line.
///
/// Methods take `&self`; wrap the robot in an `Arc` to issue commands from
/// several threads while a [`Poller`](crate::Poller) feeds telemetry into the
/// shared [`VelocityState`]. Every method blocks until its frames are written.
pub struct Robot<W> {
    session: Session<W>,
    velocity: VelocityState,
    set_to_settle: Duration,
}

impl<W: Write> Robot<W> {
    /// Build a robot writing to `inner`, with fresh velocity state.
    pub fn new(inner: W, config: &RobotConfig) -> Self {
        Self::from_parts(
            FrameWriter::with_config(inner, config.frame.clone()),
            VelocityState::new(),
            config,
        )
    }

    /// Build a robot from an existing writer and a velocity state shared with
    /// a poll loop.
    pub fn from_parts(
        writer: FrameWriter<W>,
        velocity: VelocityState,
        config: &RobotConfig,
    ) -> Self {
        Self {
            session: Session::new(writer),
            velocity,
            set_to_settle: config.set_to_settle,
        }
    }

    /// Switch the servo of every slave on or off.
    pub fn servo(&self, on: bool) -> Result<()> {
        info!(on, "servo");
        self.session.send(&requests::servo(on))
    }

    /// Clear latched alarms on every slave.
    pub fn alarm_reset(&self) -> Result<()> {
        info!("alarm reset");
        self.session.send_all(&requests::alarm_reset())
    }

    /// Pause (`true`) or resume (`false`) motion on every slave.
    pub fn pause(&self, flag: bool) -> Result<()> {
        info!(pause = flag, "pause");
        self.session.send(&requests::pause(flag))
    }

    /// Return every slave to its home position.
    pub fn home(&self) -> Result<()> {
        info!("home");
        self.session.send_all(&requests::home())
    }

    /// Start (`move_ = true`) or stop jogging one slave, then request positions.
    pub fn jog(&self, slave: SlaveAddress, positive_side: bool, move_: bool) -> Result<()> {
        info!(%slave, positive_side, move_, "jog");
        self.session.send(&requests::jog(slave, positive_side, move_))?;
        self.current_position()
    }

    /// Ask every slave for its position monitor.
    ///
    /// Replies arrive asynchronously and land in [`velocity_state`](Self::velocity_state)
    /// once the poll loop decodes them.
    pub fn current_position(&self) -> Result<()> {
        info!("read current position");
        self.session.send(&requests::current_position())
    }

    /// Move every slave to the position stored in a point table row.
    pub fn move_to(&self, row: u16) -> Result<()> {
        info!(row, "move to");
        self.session.send(&requests::move_to(row))
    }

    /// Store a target in one slave's point table row.
    ///
    /// Blocks for the configured settle time after the write so the controller
    /// can commit the row before the next command.
    pub fn set_to(&self, slave: SlaveAddress, row: u16, point: &SetPoint) -> Result<()> {
        let request = requests::set_to(slave, row, point)?;
        info!(%slave, row, ?point, "set point table row");
        self.session.send(&request)?;
        if !self.set_to_settle.is_zero() {
            std::thread::sleep(self.set_to_settle);
        }
        Ok(())
    }

    /// Snapshot of the last velocity reported by each slave.
    pub fn velocity_state(&self) -> VelocitySnapshot {
        self.velocity.snapshot()
    }

    /// Handle to the shared velocity state (for the poll loop).
    pub fn velocity(&self) -> &VelocityState {
        &self.velocity
    }

    pub fn session(&self) -> &Session<W> {
        &self.session
    }
}

impl<W> std::fmt::Debug for Robot<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Robot")
            .field("velocity", &self.velocity)
            .field("set_to_settle", &self.set_to_settle)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    use axisbus_frame::{checksum_ok, FrameConfig, Telemetry};

    use super::*;
    use crate::error::RobotError;

    /// Records each written frame with the instant the write began.
    #[derive(Clone, Default)]
    struct Wire {
        frames: Arc<Mutex<Vec<(Instant, String)>>>,
    }

    impl Wire {
        fn lines(&self) -> Vec<String> {
            self.frames
                .lock()
                .unwrap()
                .iter()
                .map(|(_, f)| f.trim_end().to_string())
                .collect()
        }
    }

    impl Write for Wire {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.frames
                .lock()
                .unwrap()
                .push((Instant::now(), String::from_utf8_lossy(buf).into_owned()));
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn robot(min_spacing: Duration) -> (Robot<Wire>, Wire) {
        let wire = Wire::default();
        let config = RobotConfig {
            frame: FrameConfig {
                min_spacing,
                ..FrameConfig::default()
            },
            set_to_settle: Duration::from_millis(5),
            ..RobotConfig::default()
        };
        (Robot::new(wire.clone(), &config), wire)
    }

    fn slave(id: u8) -> SlaveAddress {
        SlaveAddress::new(id).unwrap()
    }

    #[test]
    fn servo_on_sends_one_frame_per_slave() {
        let (robot, wire) = robot(Duration::ZERO);
        robot.servo(true).unwrap();
        let lines = wire.lines();
        assert_eq!(
            lines,
            [
                ":01050403FF00F4",
                ":02050403FF00F3",
                ":03050403FF00F2",
                ":04050403FF00F1"
            ]
        );
        assert!(lines.iter().all(|l| checksum_ok(l.as_bytes())));
    }

    #[test]
    fn alarm_reset_sets_then_clears() {
        let (robot, wire) = robot(Duration::ZERO);
        robot.alarm_reset().unwrap();
        let data: Vec<String> = wire.lines().iter().map(|l| l[9..13].to_string()).collect();
        assert_eq!(
            data,
            ["FF00", "FF00", "FF00", "FF00", "0000", "0000", "0000", "0000"]
        );
    }

    #[test]
    fn jog_follows_up_with_position_query() {
        let (robot, wire) = robot(Duration::ZERO);
        robot.jog(slave(2), false, true).unwrap();
        let lines = wire.lines();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with(":02050417FF00"));
        assert!(lines[1..].iter().all(|l| l[3..13] == *"0390000002"));
    }

    #[test]
    fn move_to_broadcasts_row() {
        let (robot, wire) = robot(Duration::ZERO);
        robot.move_to(8).unwrap();
        assert!(wire.lines().iter().all(|l| l[3..13] == *"0698000008"));
    }

    #[test]
    fn set_to_waits_for_settle_time() {
        let (robot, wire) = robot(Duration::ZERO);
        let point = SetPoint {
            position: 100.0,
            speed: 200.0,
            acc: 0.01,
            dec: 0.30,
        };
        let start = Instant::now();
        robot.set_to(slave(1), 0, &point).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(5));

        let lines = wire.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with(":01101000000F1E00002710"));
    }

    #[test]
    fn invalid_set_point_transmits_nothing() {
        let (robot, wire) = robot(Duration::ZERO);
        let point = SetPoint {
            position: 0.0,
            speed: -5.0,
            acc: 0.0,
            dec: 0.0,
        };
        let err = robot.set_to(slave(1), 0, &point).unwrap_err();
        assert!(matches!(err, RobotError::OutOfRange { field: "speed", .. }));
        assert!(wire.lines().is_empty());
    }

    #[test]
    fn transmissions_are_spaced_at_the_wire() {
        let (robot, wire) = robot(Duration::from_millis(20));
        robot.pause(true).unwrap();
        let frames = wire.frames.lock().unwrap().clone();
        assert_eq!(frames.len(), 4);
        for pair in frames.windows(2) {
            assert!(pair[1].0.duration_since(pair[0].0) >= Duration::from_millis(20));
        }
    }

    #[test]
    fn concurrent_callers_share_the_gate() {
        let (robot, wire) = robot(Duration::from_millis(5));
        let robot = Arc::new(robot);
        let handles: Vec<_> = (0..3)
            .map(|i| {
                let robot = Arc::clone(&robot);
                std::thread::spawn(move || robot.pause(i % 2 == 0).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let mut stamps: Vec<Instant> = wire.frames.lock().unwrap().iter().map(|f| f.0).collect();
        stamps.sort();
        assert_eq!(stamps.len(), 12);
        for pair in stamps.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(5));
        }
    }

    #[test]
    fn velocity_state_reflects_shared_updates() {
        let (robot, _wire) = robot(Duration::ZERO);
        robot.velocity().apply(&Telemetry {
            slave: slave(1),
            velocity: -2,
        });
        assert_eq!(robot.velocity_state().get(slave(1)), -2);
    }
}
