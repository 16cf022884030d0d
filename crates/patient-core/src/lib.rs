pub mod clock;
pub mod error;
pub mod id;
pub mod patient;

pub use clock::{date_stamp, next_update_timestamp, now_utc, today_utc};
pub use error::{CoreError, Result};
pub use id::generate_id;
pub use patient::{BloodType, Gender, PatientPublicView, PatientRecord};
