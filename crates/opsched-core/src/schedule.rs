use crate::error::{CoreError, Result};
use crate::status::{ScheduleStatus, TransitionEntry};
use crate::time::UtcDateTime;
use serde::{Deserialize, Serialize};

/// An operation-request record tracked through its lifecycle.
///
/// Field names in the serialized form are the schema contract with the
/// document store and with reporting consumers; in particular `status`,
/// `statusHistory`, `doctorRemarks` and `updatedAt` must not be renamed.
///
/// `status` and `statusHistory` are owned by the lifecycle manager: they are
/// mutable only through the transition operation, and `statusHistory` is
/// append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schedule {
    /// Opaque identifier, assigned by the storage layer at creation.
    pub id: String,

    // Basic info
    #[serde(rename = "patientName")]
    pub patient_name: String,
    #[serde(rename = "operationType")]
    pub operation_type: String,
    /// ISO-8601 date or date-time string. Range filters compare the date
    /// component lexicographically.
    #[serde(rename = "operationDate")]
    pub operation_date: String,
    #[serde(rename = "doctorName")]
    pub doctor_name: String,
    #[serde(rename = "operatingTheater", default, skip_serializing_if = "Option::is_none")]
    pub operating_theater: Option<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    // Personnel details
    #[serde(rename = "anesthesiaType", default)]
    pub anesthesia_type: String,
    #[serde(rename = "anesthesiologistName", default)]
    pub anesthesiologist_name: String,
    #[serde(rename = "assistantSurgeons", default)]
    pub assistant_surgeons: Vec<String>,
    #[serde(rename = "otNurses", default)]
    pub ot_nurses: Vec<String>,

    // Medical and resource details
    #[serde(rename = "requiredDrugs", default)]
    pub required_drugs: Vec<String>,
    #[serde(rename = "requiredInstruments", default)]
    pub required_instruments: Vec<String>,
    #[serde(rename = "specialMaterials", default)]
    pub special_materials: Vec<String>,

    // Event tracking
    #[serde(rename = "preOperativeEvents", default)]
    pub pre_operative_events: Vec<String>,
    #[serde(rename = "postOperativeEvents", default)]
    pub post_operative_events: Vec<String>,

    // Doctor interaction
    #[serde(rename = "doctorRemarks", default)]
    pub doctor_remarks: String,

    // Surgical reports
    #[serde(default)]
    pub attachments: Vec<String>,

    // Status and metadata
    pub status: ScheduleStatus,
    #[serde(rename = "statusHistory", default)]
    pub status_history: Vec<TransitionEntry>,
    #[serde(rename = "createdAt")]
    pub created_at: UtcDateTime,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<UtcDateTime>,
}

impl Schedule {
    /// The day component of `operationDate`, used by range filters.
    pub fn operation_day(&self) -> &str {
        self.operation_date.split('T').next().unwrap_or("")
    }
}

/// Input payload for creating a schedule.
///
/// Only the four medical essentials are required; everything else defaults to
/// an empty structure. Every new record starts in `scheduled` status with an
/// empty history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleDraft {
    #[serde(rename = "patientName", default)]
    pub patient_name: String,
    #[serde(rename = "operationType", default)]
    pub operation_type: String,
    #[serde(rename = "operationDate", default)]
    pub operation_date: String,
    #[serde(rename = "doctorName", default)]
    pub doctor_name: String,
    #[serde(rename = "operatingTheater", default)]
    pub operating_theater: Option<String>,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(rename = "anesthesiaType", default)]
    pub anesthesia_type: String,
    #[serde(rename = "anesthesiologistName", default)]
    pub anesthesiologist_name: String,
    #[serde(rename = "assistantSurgeons", default)]
    pub assistant_surgeons: Vec<String>,
    #[serde(rename = "otNurses", default)]
    pub ot_nurses: Vec<String>,
    #[serde(rename = "requiredDrugs", default)]
    pub required_drugs: Vec<String>,
    #[serde(rename = "requiredInstruments", default)]
    pub required_instruments: Vec<String>,
    #[serde(rename = "specialMaterials", default)]
    pub special_materials: Vec<String>,
    #[serde(rename = "preOperativeEvents", default)]
    pub pre_operative_events: Vec<String>,
    #[serde(rename = "postOperativeEvents", default)]
    pub post_operative_events: Vec<String>,
    #[serde(rename = "doctorRemarks", default)]
    pub doctor_remarks: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl ScheduleDraft {
    /// Validates the required medical inputs.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("patientName", &self.patient_name),
            ("operationType", &self.operation_type),
            ("operationDate", &self.operation_date),
            ("doctorName", &self.doctor_name),
        ] {
            if value.is_empty() {
                return Err(CoreError::missing_field(field));
            }
        }
        Ok(())
    }

    /// Builds the initial record. The id is left empty; the storage layer
    /// assigns it at creation.
    pub fn build(self, created_at: UtcDateTime) -> Result<Schedule> {
        self.validate()?;
        Ok(Schedule {
            id: String::new(),
            patient_name: self.patient_name,
            operation_type: self.operation_type,
            operation_date: self.operation_date,
            doctor_name: self.doctor_name,
            operating_theater: self.operating_theater,
            user_id: self.user_id,
            anesthesia_type: self.anesthesia_type,
            anesthesiologist_name: self.anesthesiologist_name,
            assistant_surgeons: self.assistant_surgeons,
            ot_nurses: self.ot_nurses,
            required_drugs: self.required_drugs,
            required_instruments: self.required_instruments,
            special_materials: self.special_materials,
            pre_operative_events: self.pre_operative_events,
            post_operative_events: self.post_operative_events,
            doctor_remarks: self.doctor_remarks,
            attachments: self.attachments,
            status: ScheduleStatus::Scheduled,
            status_history: Vec::new(),
            created_at,
            updated_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now_utc;
    use serde_json::json;

    fn draft() -> ScheduleDraft {
        ScheduleDraft {
            patient_name: "Jane Doe".into(),
            operation_type: "Appendectomy".into(),
            operation_date: "2026-08-12T09:00".into(),
            doctor_name: "Dr. Patel".into(),
            ..ScheduleDraft::default()
        }
    }

    #[test]
    fn test_build_sets_initial_state() {
        let schedule = draft().build(now_utc()).unwrap();
        assert_eq!(schedule.status, ScheduleStatus::Scheduled);
        assert!(schedule.status_history.is_empty());
        assert!(schedule.id.is_empty());
        assert!(schedule.updated_at.is_none());
        assert_eq!(schedule.doctor_remarks, "");
    }

    #[test]
    fn test_build_rejects_missing_required_fields() {
        let mut missing = draft();
        missing.operation_type = String::new();
        match missing.build(now_utc()) {
            Err(CoreError::MissingField(field)) => assert_eq!(field, "operationType"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_operation_day() {
        let mut schedule = draft().build(now_utc()).unwrap();
        assert_eq!(schedule.operation_day(), "2026-08-12");

        schedule.operation_date = "2026-08-12".into();
        assert_eq!(schedule.operation_day(), "2026-08-12");
    }

    #[test]
    fn test_wire_field_names() {
        let schedule = draft().build(now_utc()).unwrap();
        let json = serde_json::to_value(&schedule).unwrap();

        assert_eq!(json["patientName"], "Jane Doe");
        assert_eq!(json["operationType"], "Appendectomy");
        assert_eq!(json["doctorName"], "Dr. Patel");
        assert_eq!(json["status"], "scheduled");
        assert!(json["statusHistory"].as_array().unwrap().is_empty());
        assert!(json["createdAt"].is_string());
        // updatedAt is omitted until the first write touches the record
        assert!(json.get("updatedAt").is_none());
    }

    #[test]
    fn test_schedule_rejects_unknown_fields() {
        let json = json!({
            "id": "abc",
            "patientName": "Jane Doe",
            "operationType": "Appendectomy",
            "operationDate": "2026-08-12",
            "doctorName": "Dr. Patel",
            "status": "scheduled",
            "createdAt": "2026-08-01T08:00:00Z",
            "bogusField": true
        });
        assert!(serde_json::from_value::<Schedule>(json).is_err());
    }

    #[test]
    fn test_schedule_roundtrip() {
        let mut schedule = draft().build(now_utc()).unwrap();
        schedule.id = "sched-1".into();
        schedule.status_history.push(TransitionEntry::new(
            ScheduleStatus::Scheduled,
            ScheduleStatus::Postponed,
            "admin",
            "theater conflict",
        ));

        let json = serde_json::to_value(&schedule).unwrap();
        let back: Schedule = serde_json::from_value(json).unwrap();
        assert_eq!(schedule, back);
    }

    #[test]
    fn test_draft_deserialize_defaults() {
        let draft: ScheduleDraft = serde_json::from_value(json!({
            "patientName": "John",
            "operationType": "Bypass",
            "operationDate": "2026-09-01T07:30",
            "doctorName": "Dr. Chen"
        }))
        .unwrap();
        assert!(draft.required_drugs.is_empty());
        assert!(draft.user_id.is_none());
        assert!(draft.validate().is_ok());
    }
}
