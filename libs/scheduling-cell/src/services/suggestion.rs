use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use tracing::debug;
use uuid::Uuid;

use appointment_cell::models::Appointment;
use appointment_cell::services::BookingService;
use shared_config::AppConfig;

use crate::models::{ScheduleError, ScoringWeights, Suggestion};
use crate::services::availability::AvailabilityService;

/// How many ranked suggestions a request returns.
pub const SUGGESTION_LIMIT: usize = 5;

const MIDDAY_MINUTE: f64 = 12.0 * 60.0;
const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Scores each free slot with the documented weighted sum and returns
/// them best first, earlier slot winning ties, truncated to `limit`.
/// Only slots present in `free_slots` are ever emitted; an empty input
/// yields an empty output.
pub fn rank_suggestions(
    weights: &ScoringWeights,
    date: NaiveDate,
    now: DateTime<Utc>,
    free_slots: &[NaiveTime],
    booked: &[Appointment],
    limit: usize,
) -> Vec<Suggestion> {
    let hourly_counts = bookings_per_hour(booked);
    let busiest_hour = hourly_counts.values().copied().max().unwrap_or(0);
    let is_today = date == now.date_naive();

    let mut suggestions: Vec<Suggestion> = free_slots
        .iter()
        .map(|slot| {
            let midday = midday_component(*slot);
            let hour_load = hour_load_component(*slot, &hourly_counts, busiest_hour);
            let recency = recency_component(*slot, now, is_today);

            let weighted = [
                (weights.midday * midday, "popular mid-day time"),
                (weights.hour_load * hour_load, "doctor underbooked this hour"),
                (weights.recency * recency, "soonest opening today"),
            ];
            let score = weighted.iter().map(|(w, _)| w).sum();

            // The dominant component explains the rank; the recency
            // reason only makes sense for same-day requests.
            let reason = weighted
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != 2 || is_today)
                .max_by(|(_, a), (_, b)| a.0.total_cmp(&b.0))
                .map(|(_, (_, reason))| *reason)
                .unwrap_or("open slot")
                .to_string();

            Suggestion {
                time: date.and_time(*slot),
                time_display: slot.format("%H:%M").to_string(),
                score,
                reason,
            }
        })
        .collect();

    suggestions.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.time.cmp(&b.time)));
    suggestions.truncate(limit);
    suggestions
}

/// 1.0 at 12:00, falling linearly to 0.0 at midnight either side.
fn midday_component(slot: NaiveTime) -> f64 {
    let minute = f64::from(slot.hour() * 60 + slot.minute());
    1.0 - (minute - MIDDAY_MINUTE).abs() / MIDDAY_MINUTE
}

/// 1.0 when the slot's hour has no bookings, falling to 0.0 for the
/// doctor's busiest hour of the day.
fn hour_load_component(slot: NaiveTime, counts: &HashMap<u32, usize>, busiest: usize) -> f64 {
    if busiest == 0 {
        return 1.0;
    }
    let count = counts.get(&slot.hour()).copied().unwrap_or(0);
    1.0 - count as f64 / busiest as f64
}

/// For same-day requests, slots closer to now score higher; for other
/// dates every slot gets the same neutral value so the component never
/// reorders them.
fn recency_component(slot: NaiveTime, now: DateTime<Utc>, is_today: bool) -> f64 {
    if !is_today {
        return 0.5;
    }

    let slot_minute = f64::from(slot.hour() * 60 + slot.minute());
    let now_minute = f64::from(now.time().hour() * 60 + now.time().minute());
    let ahead = (slot_minute - now_minute).max(0.0);
    1.0 - ahead / MINUTES_PER_DAY
}

fn bookings_per_hour(booked: &[Appointment]) -> HashMap<u32, usize> {
    let mut counts = HashMap::new();
    for appointment in booked {
        *counts.entry(appointment.start_time.time().hour()).or_insert(0) += 1;
    }
    counts
}

/// Produces ranked, explained booking suggestions for a (doctor, date)
/// pair by feeding the availability engine's free slots through the
/// scoring function.
pub struct SuggestionService {
    availability: AvailabilityService,
    bookings: BookingService,
    weights: ScoringWeights,
}

impl SuggestionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            availability: AvailabilityService::new(config),
            bookings: BookingService::new(config),
            weights: ScoringWeights::default(),
        }
    }

    pub async fn suggest(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<Suggestion>, ScheduleError> {
        let free = self.availability.available_slots(doctor_id, date).await?;

        let booked = self
            .bookings
            .appointments_for_day(doctor_id, date)
            .await
            .map_err(|e| ScheduleError::Database(e.to_string()))?;

        let suggestions =
            rank_suggestions(&self.weights, date, now, &free, &booked, SUGGESTION_LIMIT);
        debug!(
            "Ranked {} suggestions for doctor {} on {}",
            suggestions.len(),
            doctor_id,
            date
        );

        Ok(suggestions)
    }
}
