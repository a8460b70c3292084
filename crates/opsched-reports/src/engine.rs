use std::collections::BTreeMap;

use opsched_core::{Schedule, ScheduleStatus};
use opsched_storage::{DynScheduleStore, ScheduleStore};
use serde::Serialize;

use crate::error::ReportError;
use crate::range::{DateRange, day_component, iso_week_key};

const UNKNOWN_THEATER: &str = "Unknown OT";
const UNKNOWN_DOCTOR: &str = "Unknown Doctor";

/// Planned operating-theater utilization: surgeries per theater, bucketed by
/// day and by ISO week.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct OtUtilizationReport {
    pub daily: BTreeMap<String, BTreeMap<String, u32>>,
    pub weekly: BTreeMap<String, BTreeMap<String, u32>>,
    #[serde(rename = "totalSurgeriesPerOT")]
    pub total_per_theater: BTreeMap<String, u32>,
}

/// Total surgeries per day, doctor and theater.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct SurgeryDistributionReport {
    #[serde(rename = "perDay")]
    pub per_day: BTreeMap<String, u32>,
    #[serde(rename = "perDoctor")]
    pub per_doctor: BTreeMap<String, u32>,
    #[serde(rename = "perOT")]
    pub per_theater: BTreeMap<String, u32>,
}

/// Aggregate demand counts for drugs, instruments and special materials.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct ResourceDemandReport {
    pub drugs: BTreeMap<String, u32>,
    pub instruments: BTreeMap<String, u32>,
    #[serde(rename = "specialMaterials")]
    pub special_materials: BTreeMap<String, u32>,
}

/// Counts of cancelled, postponed and emergency surgeries.
///
/// The emergency counter is remarks-driven: the `[EMERGENCY]:` line the
/// lifecycle manager mirrors into `doctorRemarks` is what feeds it.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct ScheduleVolatilityReport {
    pub cancelled: u32,
    pub postponed: u32,
    pub emergency: u32,
}

fn theater_of(schedule: &Schedule) -> &str {
    match schedule.operating_theater.as_deref() {
        Some(theater) if !theater.is_empty() => theater,
        _ => UNKNOWN_THEATER,
    }
}

fn doctor_of(schedule: &Schedule) -> &str {
    if schedule.doctor_name.is_empty() {
        UNKNOWN_DOCTOR
    } else {
        &schedule.doctor_name
    }
}

/// Buckets schedules into the utilization report.
pub(crate) fn bucket_ot_utilization(schedules: &[Schedule]) -> OtUtilizationReport {
    let mut report = OtUtilizationReport::default();
    for schedule in schedules {
        let theater = theater_of(schedule).to_string();
        let day = day_component(&schedule.operation_date).to_string();

        *report
            .daily
            .entry(day.clone())
            .or_default()
            .entry(theater.clone())
            .or_default() += 1;

        if let Some(week) = iso_week_key(&day) {
            *report
                .weekly
                .entry(week)
                .or_default()
                .entry(theater.clone())
                .or_default() += 1;
        }

        *report.total_per_theater.entry(theater).or_default() += 1;
    }
    report
}

/// Buckets schedules into the distribution report.
pub(crate) fn bucket_surgery_distribution(schedules: &[Schedule]) -> SurgeryDistributionReport {
    let mut report = SurgeryDistributionReport::default();
    for schedule in schedules {
        let day = day_component(&schedule.operation_date).to_string();
        *report.per_day.entry(day).or_default() += 1;
        *report
            .per_doctor
            .entry(doctor_of(schedule).to_string())
            .or_default() += 1;
        *report
            .per_theater
            .entry(theater_of(schedule).to_string())
            .or_default() += 1;
    }
    report
}

/// Counts each requested drug, instrument and material occurrence.
pub(crate) fn bucket_resource_demand(schedules: &[Schedule]) -> ResourceDemandReport {
    let mut report = ResourceDemandReport::default();
    for schedule in schedules {
        for item in &schedule.required_drugs {
            *report.drugs.entry(item.clone()).or_default() += 1;
        }
        for item in &schedule.required_instruments {
            *report.instruments.entry(item.clone()).or_default() += 1;
        }
        for item in &schedule.special_materials {
            *report.special_materials.entry(item.clone()).or_default() += 1;
        }
    }
    report
}

/// Counts volatile schedules by status and remarks keywords.
pub(crate) fn bucket_schedule_volatility(schedules: &[Schedule]) -> ScheduleVolatilityReport {
    let mut report = ScheduleVolatilityReport::default();
    for schedule in schedules {
        let remarks = schedule.doctor_remarks.to_lowercase();

        if schedule.status == ScheduleStatus::Cancelled || remarks.contains("cancel") {
            report.cancelled += 1;
        }
        if schedule.status == ScheduleStatus::Postponed || remarks.contains("postpone") {
            report.postponed += 1;
        }
        if remarks.contains("emergency") || remarks.contains("urgent") {
            report.emergency += 1;
        }
    }
    report
}

/// Read-only report generator over a schedule store.
pub struct ReportEngine {
    store: DynScheduleStore,
}

impl ReportEngine {
    pub fn new(store: DynScheduleStore) -> Self {
        Self { store }
    }

    async fn schedules_in_range(&self, range: &DateRange) -> Result<Vec<Schedule>, ReportError> {
        let stored = self.store.list().await?;
        Ok(stored
            .into_iter()
            .map(|s| s.schedule)
            .filter(|s| range.contains(&s.operation_date))
            .collect())
    }

    pub async fn ot_utilization(
        &self,
        range: &DateRange,
    ) -> Result<OtUtilizationReport, ReportError> {
        tracing::info!(start = %range.start, end = %range.end, "generating OT utilization report");
        Ok(bucket_ot_utilization(&self.schedules_in_range(range).await?))
    }

    pub async fn surgery_distribution(
        &self,
        range: &DateRange,
    ) -> Result<SurgeryDistributionReport, ReportError> {
        tracing::info!(start = %range.start, end = %range.end, "generating surgery distribution report");
        Ok(bucket_surgery_distribution(
            &self.schedules_in_range(range).await?,
        ))
    }

    pub async fn resource_demand(
        &self,
        range: &DateRange,
    ) -> Result<ResourceDemandReport, ReportError> {
        tracing::info!(start = %range.start, end = %range.end, "generating resource demand report");
        Ok(bucket_resource_demand(
            &self.schedules_in_range(range).await?,
        ))
    }

    pub async fn schedule_volatility(
        &self,
        range: &DateRange,
    ) -> Result<ScheduleVolatilityReport, ReportError> {
        tracing::info!(start = %range.start, end = %range.end, "generating schedule volatility report");
        Ok(bucket_schedule_volatility(
            &self.schedules_in_range(range).await?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsched_core::{ScheduleDraft, now_utc};
    use opsched_db_memory::create_schedule_store;

    fn schedule(date: &str, theater: Option<&str>, doctor: &str) -> Schedule {
        ScheduleDraft {
            patient_name: "Test Patient".into(),
            operation_type: "Appendectomy".into(),
            operation_date: date.into(),
            doctor_name: doctor.into(),
            operating_theater: theater.map(String::from),
            ..ScheduleDraft::default()
        }
        .build(now_utc())
        .unwrap()
    }

    #[test]
    fn test_utilization_buckets_by_day_week_and_theater() {
        let schedules = vec![
            schedule("2026-08-10T08:00", Some("OT-1"), "Dr. A"),
            schedule("2026-08-10T12:00", Some("OT-1"), "Dr. B"),
            schedule("2026-08-11T08:00", Some("OT-2"), "Dr. A"),
            // Missing theater falls into the Unknown bucket.
            schedule("2026-08-11T09:00", None, "Dr. C"),
        ];

        let report = bucket_ot_utilization(&schedules);

        assert_eq!(report.daily["2026-08-10"]["OT-1"], 2);
        assert_eq!(report.daily["2026-08-11"]["OT-2"], 1);
        assert_eq!(report.daily["2026-08-11"][UNKNOWN_THEATER], 1);

        // 2026-08-10 and -11 are Monday and Tuesday of ISO week 33.
        assert_eq!(report.weekly["2026-W33"]["OT-1"], 2);
        assert_eq!(report.weekly["2026-W33"][UNKNOWN_THEATER], 1);

        assert_eq!(report.total_per_theater["OT-1"], 2);
        assert_eq!(report.total_per_theater["OT-2"], 1);
        assert_eq!(report.total_per_theater[UNKNOWN_THEATER], 1);
    }

    #[test]
    fn test_utilization_empty_theater_string_is_unknown() {
        let schedules = vec![schedule("2026-08-10", Some(""), "Dr. A")];
        let report = bucket_ot_utilization(&schedules);
        assert_eq!(report.total_per_theater[UNKNOWN_THEATER], 1);
    }

    #[test]
    fn test_unparsable_date_still_counts_daily() {
        let schedules = vec![schedule("soon", Some("OT-1"), "Dr. A")];
        let report = bucket_ot_utilization(&schedules);
        assert_eq!(report.daily["soon"]["OT-1"], 1);
        assert!(report.weekly.is_empty());
    }

    #[test]
    fn test_distribution_counts() {
        let schedules = vec![
            schedule("2026-08-10T08:00", Some("OT-1"), "Dr. A"),
            schedule("2026-08-10T12:00", Some("OT-2"), "Dr. A"),
            schedule("2026-08-11T08:00", Some("OT-1"), ""),
        ];

        let report = bucket_surgery_distribution(&schedules);

        assert_eq!(report.per_day["2026-08-10"], 2);
        assert_eq!(report.per_day["2026-08-11"], 1);
        assert_eq!(report.per_doctor["Dr. A"], 2);
        assert_eq!(report.per_doctor[UNKNOWN_DOCTOR], 1);
        assert_eq!(report.per_theater["OT-1"], 2);
        assert_eq!(report.per_theater["OT-2"], 1);
    }

    #[test]
    fn test_resource_demand_counts_occurrences() {
        let mut a = schedule("2026-08-10", Some("OT-1"), "Dr. A");
        a.required_drugs = vec!["propofol".into(), "fentanyl".into()];
        a.required_instruments = vec!["retractor".into()];
        let mut b = schedule("2026-08-11", Some("OT-1"), "Dr. B");
        b.required_drugs = vec!["propofol".into()];
        b.special_materials = vec!["bone graft".into()];

        let report = bucket_resource_demand(&[a, b]);

        assert_eq!(report.drugs["propofol"], 2);
        assert_eq!(report.drugs["fentanyl"], 1);
        assert_eq!(report.instruments["retractor"], 1);
        assert_eq!(report.special_materials["bone graft"], 1);
    }

    #[test]
    fn test_volatility_counts_status_and_remark_keywords() {
        let mut cancelled = schedule("2026-08-10", None, "Dr. A");
        cancelled.status = ScheduleStatus::Cancelled;

        let mut cancel_by_remark = schedule("2026-08-10", None, "Dr. A");
        cancel_by_remark.doctor_remarks = "family asked to CANCEL".into();

        let mut postponed = schedule("2026-08-10", None, "Dr. A");
        postponed.status = ScheduleStatus::Postponed;

        let mut emergency = schedule("2026-08-10", None, "Dr. A");
        emergency.doctor_remarks = "[EMERGENCY]: sudden deterioration".into();

        let mut urgent = schedule("2026-08-10", None, "Dr. A");
        urgent.doctor_remarks = "marked urgent by triage".into();

        let quiet = schedule("2026-08-10", None, "Dr. A");

        let report = bucket_schedule_volatility(&[
            cancelled,
            cancel_by_remark,
            postponed,
            emergency,
            urgent,
            quiet,
        ]);

        assert_eq!(report.cancelled, 2);
        assert_eq!(report.postponed, 1);
        assert_eq!(report.emergency, 2);
    }

    #[tokio::test]
    async fn test_engine_filters_by_range() {
        let store: DynScheduleStore = create_schedule_store();
        store
            .create(schedule("2026-08-10T08:00", Some("OT-1"), "Dr. A"))
            .await
            .unwrap();
        store
            .create(schedule("2026-09-10T08:00", Some("OT-1"), "Dr. A"))
            .await
            .unwrap();

        let engine = ReportEngine::new(store);
        let range = DateRange::new("2026-08-01", "2026-08-31").unwrap();
        let report = engine.ot_utilization(&range).await.unwrap();

        assert_eq!(report.total_per_theater["OT-1"], 1);
        assert_eq!(report.daily.len(), 1);
    }

    #[tokio::test]
    async fn test_engine_serializes_wire_names() {
        let store: DynScheduleStore = create_schedule_store();
        store
            .create(schedule("2026-08-10T08:00", Some("OT-1"), "Dr. A"))
            .await
            .unwrap();

        let engine = ReportEngine::new(store);
        let range = DateRange::new("2026-08-01", "2026-08-31").unwrap();

        let utilization = engine.ot_utilization(&range).await.unwrap();
        let json = serde_json::to_value(&utilization).unwrap();
        assert!(json.get("totalSurgeriesPerOT").is_some());

        let distribution = engine.surgery_distribution(&range).await.unwrap();
        let json = serde_json::to_value(&distribution).unwrap();
        assert!(json.get("perDay").is_some());
        assert!(json.get("perDoctor").is_some());
        assert!(json.get("perOT").is_some());
    }
}
