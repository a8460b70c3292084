pub mod doctor;
pub mod error;
pub mod id;
pub mod schedule;
pub mod status;
pub mod time;

pub use doctor::{Doctor, DoctorDraft};
pub use error::{CoreError, Result};
pub use id::generate_id;
pub use schedule::{Schedule, ScheduleDraft};
pub use status::{ScheduleStatus, TransitionEntry};
pub use time::{UtcDateTime, now_utc};
