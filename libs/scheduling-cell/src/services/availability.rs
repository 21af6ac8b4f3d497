use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use tracing::debug;
use uuid::Uuid;

use appointment_cell::models::Appointment;
use appointment_cell::services::BookingService;
use doctor_cell::models::{DoctorError, WorkingHours, WorkingHoursTemplate};
use doctor_cell::services::{DoctorService, ScheduleConfigService};
use shared_config::AppConfig;

use crate::models::ScheduleError;

/// Every candidate slot start between the template's start (inclusive)
/// and end (exclusive), stepping by the configured granularity. A slot
/// is only emitted if its full duration fits before the end time.
pub fn slot_grid(template: &WorkingHoursTemplate) -> Vec<NaiveTime> {
    let step = Duration::minutes(i64::from(template.slot_minutes));
    let mut slots = Vec::new();
    let mut current = template.start_time;

    // NaiveTime addition wraps at midnight; a wrapped step means the
    // candidate runs past the end of the day.
    while current < template.end_time {
        let (slot_end, wrapped) = current.overflowing_add_signed(step);
        if wrapped != 0 || slot_end > template.end_time {
            break;
        }
        slots.push(current);
        current = slot_end;
    }

    slots
}

/// The template grid minus every candidate whose interval overlaps an
/// existing appointment's `[start, start + duration)` on `date`.
/// Ascending; read-only; past dates compute like any other.
pub fn free_slots(
    template: &WorkingHoursTemplate,
    date: NaiveDate,
    appointments: &[Appointment],
) -> Vec<NaiveTime> {
    let duration = Duration::minutes(i64::from(template.slot_minutes));

    slot_grid(template)
        .into_iter()
        .filter(|slot| {
            let start = date.and_time(*slot).and_utc();
            let end = start + duration;
            !appointments.iter().any(|a| a.overlaps_interval(start, end))
        })
        .collect()
}

/// Computes bookable slots for a (doctor, date) pair from the
/// working-hours templates and the day's booked appointments. Pure
/// read-and-compute: booking-time conflicts are enforced by the booking
/// service, not here.
pub struct AvailabilityService {
    doctors: DoctorService,
    schedules: ScheduleConfigService,
    bookings: BookingService,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            doctors: DoctorService::new(config),
            schedules: ScheduleConfigService::new(config),
            bookings: BookingService::new(config),
        }
    }

    pub async fn available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, ScheduleError> {
        debug!("Computing available slots for doctor {} on {}", doctor_id, date);

        self.doctors.get_doctor(doctor_id).await.map_err(|e| match e {
            DoctorError::NotFound => ScheduleError::DoctorNotFound,
            DoctorError::Database(msg) => ScheduleError::Database(msg),
        })?;

        let rows = self
            .schedules
            .templates_for(doctor_id)
            .await
            .map_err(|e| ScheduleError::Database(e.to_string()))?;

        if rows.is_empty() {
            return Err(ScheduleError::ConfigurationMissing);
        }

        let templates = applicable_templates(&rows, date);
        if templates.is_empty() {
            // The doctor has a schedule, just not on this weekday.
            debug!("Doctor {} does not work on {}", doctor_id, date.weekday());
            return Ok(Vec::new());
        }

        let appointments = self
            .bookings
            .appointments_for_day(doctor_id, date)
            .await
            .map_err(|e| ScheduleError::Database(e.to_string()))?;

        let mut slots: Vec<NaiveTime> = templates
            .iter()
            .flat_map(|t| free_slots(t, date, &appointments))
            .collect();
        slots.sort();
        slots.dedup();

        debug!("Found {} free slots for doctor {} on {}", slots.len(), doctor_id, date);
        Ok(slots)
    }
}

/// Weekday-pinned rows win over the doctor's unpinned default rows when
/// both exist for the requested day.
fn applicable_templates(rows: &[WorkingHours], date: NaiveDate) -> Vec<WorkingHoursTemplate> {
    let weekday = date.weekday();

    let pinned: Vec<WorkingHoursTemplate> = rows
        .iter()
        .filter(|r| r.day_of_week.is_some() && r.applies_on(weekday))
        .map(WorkingHours::template)
        .collect();

    if !pinned.is_empty() {
        return pinned;
    }

    rows.iter()
        .filter(|r| r.day_of_week.is_none())
        .map(WorkingHours::template)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use appointment_cell::models::AppointmentStatus;
    use chrono::TimeZone;
    use chrono::Utc;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn template(start: NaiveTime, end: NaiveTime, slot_minutes: u32) -> WorkingHoursTemplate {
        WorkingHoursTemplate {
            start_time: start,
            end_time: end,
            slot_minutes,
        }
    }

    fn booked(date: NaiveDate, h: u32, m: u32, minutes: i64) -> Appointment {
        let start = date.and_hms_opt(h, m, 0).unwrap().and_utc();
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            start_time: start,
            duration_minutes: minutes,
            status: AppointmentStatus::Scheduled,
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn grid_covers_full_template_in_order() {
        let grid = slot_grid(&template(t(9, 0), t(12, 0), 30));
        assert_eq!(
            grid,
            vec![t(9, 0), t(9, 30), t(10, 0), t(10, 30), t(11, 0), t(11, 30)]
        );
    }

    #[test]
    fn grid_drops_slot_that_does_not_fit() {
        // 09:00-10:15 at 30 minutes: 10:00 would run past the end.
        let grid = slot_grid(&template(t(9, 0), t(10, 15), 30));
        assert_eq!(grid, vec![t(9, 0), t(9, 30)]);
    }

    #[test]
    fn grid_stops_at_the_end_of_day() {
        // 23:30 + 30 minutes wraps to 00:00; the walk must stop, not
        // loop back around midnight.
        let grid = slot_grid(&template(t(23, 0), t(23, 59), 30));
        assert_eq!(grid, vec![t(23, 0)]);
    }

    #[test]
    fn empty_day_returns_whole_grid() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let slots = free_slots(&template(t(9, 0), t(12, 0), 30), date, &[]);
        assert_eq!(
            slots,
            vec![t(9, 0), t(9, 30), t(10, 0), t(10, 30), t(11, 0), t(11, 30)]
        );
    }

    #[test]
    fn booked_slot_is_excluded_others_remain() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let appointments = vec![booked(date, 10, 0, 30)];

        let slots = free_slots(&template(t(9, 0), t(12, 0), 30), date, &appointments);
        assert_eq!(slots, vec![t(9, 0), t(9, 30), t(10, 30), t(11, 0), t(11, 30)]);
    }

    #[test]
    fn long_appointment_blocks_every_slot_it_covers() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let appointments = vec![booked(date, 10, 0, 60)];

        let slots = free_slots(&template(t(9, 0), t(12, 0), 30), date, &appointments);
        assert_eq!(slots, vec![t(9, 0), t(9, 30), t(11, 0), t(11, 30)]);
    }

    #[test]
    fn off_grid_appointment_blocks_both_straddled_slots() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let appointments = vec![booked(date, 10, 15, 30)];

        let slots = free_slots(&template(t(9, 0), t(12, 0), 30), date, &appointments);
        assert_eq!(slots, vec![t(9, 0), t(9, 30), t(11, 0), t(11, 30)]);
    }

    #[test]
    fn computation_is_idempotent() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let tpl = template(t(9, 0), t(17, 0), 30);
        let appointments = vec![booked(date, 14, 0, 30)];

        let first = free_slots(&tpl, date, &appointments);
        let second = free_slots(&tpl, date, &appointments);
        assert_eq!(first, second);
    }

    #[test]
    fn past_dates_compute_like_any_other() {
        let date = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        let slots = free_slots(&template(t(9, 0), t(10, 0), 30), date, &[]);
        assert_eq!(slots, vec![t(9, 0), t(9, 30)]);
    }

    #[test]
    fn appointment_on_another_day_does_not_block() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let other_day = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        let appointments = vec![booked(other_day, 10, 0, 30)];

        let slots = free_slots(&template(t(9, 0), t(12, 0), 30), date, &appointments);
        assert_eq!(slots.len(), 6);
    }

    #[test]
    fn pinned_rows_take_precedence_over_default_rows() {
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let doctor_id = Uuid::new_v4();
        let row = |day: Option<i16>, start: NaiveTime, end: NaiveTime| WorkingHours {
            id: Uuid::new_v4(),
            doctor_id,
            day_of_week: day,
            start_time: start,
            end_time: end,
            slot_minutes: 30,
        };

        let rows = vec![row(None, t(9, 0), t(17, 0)), row(Some(1), t(10, 0), t(12, 0))];
        let templates = applicable_templates(&rows, monday);
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].start_time, t(10, 0));

        // Tuesday has no pinned row, so the default applies.
        let tuesday = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        let templates = applicable_templates(&rows, tuesday);
        assert_eq!(templates[0].start_time, t(9, 0));
    }

    #[test]
    fn day_without_any_applicable_row_yields_no_templates() {
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let rows = vec![WorkingHours {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            day_of_week: Some(1),
            start_time: t(9, 0),
            end_time: t(17, 0),
            slot_minutes: 30,
        }];

        assert!(applicable_templates(&rows, sunday).is_empty());
    }

    #[test]
    fn overlap_is_utc_interval_based() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let appointments = vec![Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            start_time: start,
            duration_minutes: 30,
            status: AppointmentStatus::Scheduled,
            notes: None,
            created_at: None,
        }];

        let slots = free_slots(&template(t(9, 0), t(10, 0), 30), date, &appointments);
        assert_eq!(slots, vec![t(9, 30)]);
    }
}
