// SPDX-License-Identifier: MIT

//! Camera-derived rep counting.
//!
//! A best-effort heuristic over pose-estimation landmarks: the frontend
//! captures video, runs the pose model, and posts landmark frames here.
//! Counts and form quality live only in memory until the user finishes
//! the session, at which point they are committed through the recorder.
//!
//! Pushups are tracked through a two-state machine on the elbow angle
//! (law of cosines at the elbow, averaged over both arms). The other
//! exercise kinds are placeholders that only emit feedback.

use crate::error::{AppError, Result};
use crate::models::ExerciseKind;
use crate::services::generate_id;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Landmarks per frame in the 33-point pose topology.
pub const POSE_LANDMARK_COUNT: usize = 33;

// Landmark indices in the 33-point pose topology
const LEFT_SHOULDER: usize = 11;
const RIGHT_SHOULDER: usize = 12;
const LEFT_ELBOW: usize = 13;
const RIGHT_ELBOW: usize = 14;
const LEFT_WRIST: usize = 15;
const RIGHT_WRIST: usize = 16;
const LEFT_HIP: usize = 23;
const RIGHT_HIP: usize = 24;

/// Landmarks that must be visible for pushup tracking.
const TRACKED_LANDMARKS: [usize; 8] = [
    LEFT_SHOULDER,
    RIGHT_SHOULDER,
    LEFT_ELBOW,
    RIGHT_ELBOW,
    LEFT_WRIST,
    RIGHT_WRIST,
    LEFT_HIP,
    RIGHT_HIP,
];

/// Elbow angle above which the arms count as extended.
const ELBOW_UP_DEGREES: f64 = 160.0;
/// Elbow angle below which the body counts as lowered.
const ELBOW_DOWN_DEGREES: f64 = 95.0;
/// Minimum landmark visibility for state transitions.
const MIN_VISIBILITY: f64 = 0.6;

const FORM_INITIAL: f64 = 0.5;
const FORM_REP_BONUS: f64 = 0.05;
const FORM_HIP_PENALTY: f64 = 0.01;
const FORM_MIN: f64 = 0.1;
const FORM_MAX: f64 = 1.0;

/// How far (normalized y) the hips must descend below their up-phase
/// position for the down phase to count as a clean lowering.
const MIN_HIP_DROP: f64 = 0.03;

/// One pose landmark: normalized coordinates plus visibility confidence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub visibility: f64,
}

/// Pushup phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Up,
    Down,
}

/// Result of feeding one frame.
#[derive(Debug, Clone)]
pub struct FrameUpdate {
    pub reps: u32,
    pub form_quality: f64,
    pub rep_completed: bool,
    pub feedback: Option<String>,
}

/// A live counting session for one exercise set.
#[derive(Debug)]
pub struct RepSession {
    user_id: String,
    kind: ExerciseKind,
    phase: Phase,
    reps: u32,
    form_quality: f64,
    /// Most recent hip height seen while up, the drop baseline
    up_hip_y: Option<f64>,
    /// Whether the current down phase showed the hips actually dropping
    hips_dropped: bool,
}

impl RepSession {
    pub fn new(user_id: String, kind: ExerciseKind) -> Self {
        Self {
            user_id,
            kind,
            phase: Phase::Up,
            reps: 0,
            form_quality: FORM_INITIAL,
            up_hip_y: None,
            hips_dropped: false,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn kind(&self) -> ExerciseKind {
        self.kind
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn form_quality(&self) -> f64 {
        self.form_quality
    }

    /// Advance the state machine with one landmark frame.
    pub fn feed(&mut self, frame: &[Landmark]) -> Result<FrameUpdate> {
        if frame.len() != POSE_LANDMARK_COUNT {
            return Err(AppError::Validation(format!(
                "Expected {} landmarks per frame, got {}",
                POSE_LANDMARK_COUNT,
                frame.len()
            )));
        }

        if self.kind != ExerciseKind::Pushup {
            return Ok(self.update(
                false,
                Some(format!(
                    "Automatic counting for {}s is not available yet. Count manually and enter the result.",
                    self.kind.label()
                )),
            ));
        }

        // Low-visibility frames never drive transitions
        let hidden = TRACKED_LANDMARKS
            .iter()
            .any(|&i| frame[i].visibility < MIN_VISIBILITY);
        if hidden {
            return Ok(self.update(
                false,
                Some("Make sure your whole upper body and hips are visible to the camera".to_string()),
            ));
        }

        let left = joint_angle(frame[LEFT_SHOULDER], frame[LEFT_ELBOW], frame[LEFT_WRIST]);
        let right = joint_angle(frame[RIGHT_SHOULDER], frame[RIGHT_ELBOW], frame[RIGHT_WRIST]);
        let elbow_angle = (left + right) / 2.0;

        let hip_y = (frame[LEFT_HIP].y + frame[RIGHT_HIP].y) / 2.0;

        match self.phase {
            Phase::Up => {
                if elbow_angle < ELBOW_DOWN_DEGREES {
                    self.phase = Phase::Down;
                    self.hips_dropped = self
                        .up_hip_y
                        .is_some_and(|baseline| hip_y - baseline >= MIN_HIP_DROP);
                } else {
                    self.up_hip_y = Some(hip_y);
                }
                Ok(self.update(false, None))
            }
            Phase::Down => {
                if let Some(baseline) = self.up_hip_y {
                    if hip_y - baseline >= MIN_HIP_DROP {
                        self.hips_dropped = true;
                    }
                }

                if elbow_angle > ELBOW_UP_DEGREES {
                    self.phase = Phase::Up;
                    self.reps += 1;
                    self.form_quality = (self.form_quality + FORM_REP_BONUS).min(FORM_MAX);
                    if !self.hips_dropped {
                        self.form_quality = (self.form_quality - FORM_HIP_PENALTY).max(FORM_MIN);
                    }
                    return Ok(self.update(true, None));
                }
                Ok(self.update(false, None))
            }
        }
    }

    fn update(&self, rep_completed: bool, feedback: Option<String>) -> FrameUpdate {
        FrameUpdate {
            reps: self.reps,
            form_quality: self.form_quality,
            rep_completed,
            feedback,
        }
    }
}

/// Angle in degrees at joint `b` between segments `b-a` and `b-c`,
/// by the law of cosines over the 3D landmark positions.
fn joint_angle(a: Landmark, b: Landmark, c: Landmark) -> f64 {
    let ab = distance(a, b);
    let cb = distance(c, b);
    if ab == 0.0 || cb == 0.0 {
        return 180.0;
    }
    let ac = distance(a, c);
    let cos = ((ab * ab + cb * cb - ac * ac) / (2.0 * ab * cb)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

fn distance(a: Landmark, b: Landmark) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Summary of a batch of fed frames.
#[derive(Debug, Serialize)]
pub struct FeedSummary {
    pub reps: u32,
    pub form_quality: f64,
    /// Reps completed within this batch
    pub reps_completed: u32,
    /// Distinct feedback messages raised by this batch
    pub feedback: Vec<String>,
}

/// Result of finishing a session, ready for the recorder.
#[derive(Debug)]
pub struct FinishedSession {
    pub user_id: String,
    pub kind: ExerciseKind,
    pub reps: u32,
    pub form_quality: f64,
}

/// Registry of live counting sessions.
///
/// Sessions are not restartable: finish and abandon both remove the id,
/// and a new session must be created for the next set.
#[derive(Default)]
pub struct RepTracker {
    sessions: DashMap<String, RepSession>,
}

impl RepTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session; returns its id.
    pub fn start(&self, user_id: &str, kind: ExerciseKind, now: DateTime<Utc>) -> String {
        let session_id = generate_id(now);
        self.sessions.insert(
            session_id.clone(),
            RepSession::new(user_id.to_string(), kind),
        );
        tracing::debug!(user_id, session_id = %session_id, kind = kind.label(), "Rep session started");
        session_id
    }

    /// Feed a batch of frames in arrival order.
    pub fn feed(&self, session_id: &str, frames: &[Vec<Landmark>]) -> Result<FeedSummary> {
        let mut session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session_id)))?;

        let mut reps_completed = 0;
        let mut feedback: Vec<String> = Vec::new();

        for frame in frames {
            let updated = session.feed(frame)?;
            if updated.rep_completed {
                reps_completed += 1;
            }
            if let Some(message) = updated.feedback {
                if !feedback.contains(&message) {
                    feedback.push(message);
                }
            }
        }

        Ok(FeedSummary {
            reps: session.reps(),
            form_quality: session.form_quality(),
            reps_completed,
            feedback,
        })
    }

    /// Close a session and hand its totals to the caller for recording.
    ///
    /// A session with zero reps cannot be committed; it stays open so the
    /// user can keep going or abandon it.
    pub fn finish(&self, session_id: &str) -> Result<FinishedSession> {
        {
            let session = self
                .sessions
                .get(session_id)
                .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session_id)))?;
            if session.reps() == 0 {
                return Err(AppError::Validation(
                    "No repetitions counted in this session".to_string(),
                ));
            }
        }

        // Checked above; the single mutator cannot race itself
        let (_, session) = self
            .sessions
            .remove(session_id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session_id)))?;

        Ok(FinishedSession {
            user_id: session.user_id().to_string(),
            kind: session.kind(),
            reps: session.reps(),
            form_quality: session.form_quality(),
        })
    }

    /// Discard a session without recording anything.
    pub fn abandon(&self, session_id: &str) -> Result<()> {
        self.sessions
            .remove(session_id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session_id)))?;
        tracing::debug!(session_id, "Rep session abandoned");
        Ok(())
    }
}
