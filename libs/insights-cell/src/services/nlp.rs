use chrono::{Duration, NaiveDate};
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::PostgrestClient;

use crate::models::{InsightsError, ParsedQuery, QueryIntent};

/// Pattern-based intent recognizer for the admin search box. Patterns
/// are matched against the lowercased query in a fixed priority order.
pub struct QueryParser {
    today_appointments: Vec<Regex>,
    doctor_appointments: Vec<Regex>,
    patient_search: Vec<Regex>,
    schedule_appointment: Vec<Regex>,
    doctor_schedule: Vec<Regex>,
}

impl QueryParser {
    pub fn new() -> Self {
        let compile = |patterns: &[&str]| {
            patterns
                .iter()
                .map(|p| Regex::new(p).expect("static pattern"))
                .collect()
        };

        Self {
            today_appointments: compile(&[
                r"show.*today.*appointments",
                r"today.*appointments",
                r"appointments.*today",
                r"what.*appointments.*today",
            ]),
            doctor_appointments: compile(&[
                r"show.*appointments.*(?:for|with).*dr\.?\s*(\w+)",
                r"appointments.*dr\.?\s*(\w+)",
                r"dr\.?\s*(\w+).*appointments",
            ]),
            patient_search: compile(&[
                r"find.*patient.*?(\w+)$",
                r"search.*patient.*?(\w+)$",
                r"patient.*named.*?(\w+)",
            ]),
            schedule_appointment: compile(&[
                r"schedule.*appointment",
                r"book.*appointment",
                r"create.*appointment",
            ]),
            doctor_schedule: compile(&[
                r"show.*schedule.*(?:for|of).*dr\.?\s*(\w+)",
                r"when.*dr\.?\s*(\w+).*available",
            ]),
        }
    }

    pub fn parse(&self, query: &str, today: NaiveDate) -> ParsedQuery {
        let lowered = query.to_lowercase();
        let lowered = lowered.trim();

        let mut parsed = ParsedQuery {
            intent: QueryIntent::Unknown,
            doctor_name: None,
            patient_name: None,
            date: None,
            original_query: query.to_string(),
        };

        if self.today_appointments.iter().any(|p| p.is_match(lowered)) {
            parsed.intent = QueryIntent::TodayAppointments;
            parsed.date = Some(today);
            return parsed;
        }

        if let Some(name) = first_capture(&self.doctor_appointments, lowered) {
            parsed.intent = QueryIntent::DoctorAppointments;
            parsed.doctor_name = Some(title_case(&name));
            if lowered.contains("today") {
                parsed.date = Some(today);
            } else if lowered.contains("tomorrow") {
                parsed.date = Some(today + Duration::days(1));
            }
            return parsed;
        }

        if let Some(name) = first_capture(&self.patient_search, lowered) {
            parsed.intent = QueryIntent::PatientSearch;
            parsed.patient_name = Some(title_case(&name));
            return parsed;
        }

        if self.schedule_appointment.iter().any(|p| p.is_match(lowered)) {
            parsed.intent = QueryIntent::ScheduleAppointment;
            return parsed;
        }

        if let Some(name) = first_capture(&self.doctor_schedule, lowered) {
            parsed.intent = QueryIntent::DoctorSchedule;
            parsed.doctor_name = Some(title_case(&name));
            return parsed;
        }

        parsed
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new()
    }
}

fn first_capture(patterns: &[Regex], query: &str) -> Option<String> {
    patterns.iter().find_map(|p| {
        p.captures(query)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    })
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Parses a free-text query and runs the matching lookups, returning the
/// intent, captured entities, and result rows.
pub struct NlpService {
    db: PostgrestClient,
    parser: QueryParser,
}

impl NlpService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
            parser: QueryParser::new(),
        }
    }

    pub async fn answer(&self, query: &str, today: NaiveDate) -> Result<Value, InsightsError> {
        let parsed = self.parser.parse(query, today);
        debug!("Query {:?} parsed as {:?}", query, parsed.intent);

        let results = match parsed.intent {
            QueryIntent::TodayAppointments => {
                self.appointments_with_names(None, parsed.date).await?
            }
            QueryIntent::DoctorAppointments => {
                let ids = self
                    .doctor_ids_by_name(parsed.doctor_name.as_deref().unwrap_or(""))
                    .await?;
                if ids.is_empty() {
                    Vec::new()
                } else {
                    self.appointments_with_names(Some(&ids), parsed.date).await?
                }
            }
            QueryIntent::PatientSearch => {
                let path = format!(
                    "/patients?name=ilike.*{}*",
                    parsed.patient_name.as_deref().unwrap_or("")
                );
                self.db
                    .get(&path)
                    .await
                    .map_err(|e| InsightsError::Database(e.to_string()))?
            }
            QueryIntent::DoctorSchedule => {
                self.doctor_schedules(parsed.doctor_name.as_deref().unwrap_or(""))
                    .await?
            }
            QueryIntent::ScheduleAppointment | QueryIntent::Unknown => Vec::new(),
        };

        let mut entities = Map::new();
        if let Some(name) = &parsed.doctor_name {
            entities.insert("doctor_name".to_string(), json!(name));
        }
        if let Some(name) = &parsed.patient_name {
            entities.insert("patient_name".to_string(), json!(name));
        }
        if let Some(date) = &parsed.date {
            entities.insert("date".to_string(), json!(date));
        }

        Ok(json!({
            "intent": parsed.intent,
            "entities": entities,
            "results": results,
        }))
    }

    async fn doctor_ids_by_name(&self, name: &str) -> Result<Vec<String>, InsightsError> {
        let path = format!("/doctors?name=ilike.*{}*&select=id", name);
        let rows: Vec<Value> = self
            .db
            .get(&path)
            .await
            .map_err(|e| InsightsError::Database(e.to_string()))?;

        Ok(rows
            .iter()
            .filter_map(|r| r.get("id").and_then(|v| v.as_str()).map(String::from))
            .collect())
    }

    async fn appointments_with_names(
        &self,
        doctor_ids: Option<&[String]>,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Value>, InsightsError> {
        let mut path = "/appointments?order=start_time.asc".to_string();
        if let Some(ids) = doctor_ids {
            path.push_str(&format!("&doctor_id=in.({})", ids.join(",")));
        }
        if let Some(date) = date {
            let day_start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
            let day_end = day_start + Duration::days(1);
            path.push_str(&format!(
                "&start_time=gte.{}&start_time=lt.{}",
                day_start.to_rfc3339(),
                day_end.to_rfc3339()
            ));
        }

        let appointments: Vec<Value> = self
            .db
            .get(&path)
            .await
            .map_err(|e| InsightsError::Database(e.to_string()))?;

        let patients = self.name_index("/patients?select=id,name").await?;
        let doctors = self.name_index("/doctors?select=id,name").await?;

        Ok(appointments
            .iter()
            .map(|a| {
                json!({
                    "patient": lookup_name(&patients, a.get("patient_id")),
                    "doctor": lookup_name(&doctors, a.get("doctor_id")),
                    "time": a.get("start_time"),
                    "status": a.get("status"),
                })
            })
            .collect())
    }

    async fn doctor_schedules(&self, name: &str) -> Result<Vec<Value>, InsightsError> {
        let path = format!("/doctors?name=ilike.*{}*", name);
        let doctors: Vec<Value> = self
            .db
            .get(&path)
            .await
            .map_err(|e| InsightsError::Database(e.to_string()))?;

        let patients = self.name_index("/patients?select=id,name").await?;

        let mut results = Vec::new();
        for doctor in doctors {
            let doctor_id = doctor.get("id").and_then(|v| v.as_str()).unwrap_or("");
            let path = format!(
                "/appointments?doctor_id=eq.{}&order=start_time.asc",
                doctor_id
            );
            let appointments: Vec<Value> = self
                .db
                .get(&path)
                .await
                .map_err(|e| InsightsError::Database(e.to_string()))?;

            let schedule: Vec<Value> = appointments
                .iter()
                .map(|a| {
                    json!({
                        "date": a.get("start_time"),
                        "patient": lookup_name(&patients, a.get("patient_id")),
                        "status": a.get("status"),
                    })
                })
                .collect();

            results.push(json!({
                "doctor": doctor.get("name"),
                "specialization": doctor.get("specialization"),
                "appointments": schedule,
            }));
        }

        Ok(results)
    }

    async fn name_index(&self, path: &str) -> Result<Vec<Value>, InsightsError> {
        self.db
            .get(path)
            .await
            .map_err(|e| InsightsError::Database(e.to_string()))
    }
}

fn lookup_name(rows: &[Value], id: Option<&Value>) -> Value {
    let id = id.and_then(|v| v.as_str());
    rows.iter()
        .find(|r| r.get("id").and_then(|v| v.as_str()) == id)
        .and_then(|r| r.get("name").cloned())
        .unwrap_or_else(|| json!("Unknown"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn recognizes_todays_appointments() {
        let parser = QueryParser::new();
        let parsed = parser.parse("show me today's appointments", today());

        assert_eq!(parsed.intent, QueryIntent::TodayAppointments);
        assert_eq!(parsed.date, Some(today()));
    }

    #[test]
    fn recognizes_doctor_appointments_with_name() {
        let parser = QueryParser::new();
        let parsed = parser.parse("appointments for Dr. Sharma", today());

        assert_eq!(parsed.intent, QueryIntent::DoctorAppointments);
        assert_eq!(parsed.doctor_name.as_deref(), Some("Sharma"));
        assert_eq!(parsed.date, None);
    }

    #[test]
    fn doctor_appointments_pick_up_date_keywords() {
        let parser = QueryParser::new();

        let parsed = parser.parse("appointments with dr mehta tomorrow", today());
        assert_eq!(parsed.intent, QueryIntent::DoctorAppointments);
        assert_eq!(parsed.doctor_name.as_deref(), Some("Mehta"));
        assert_eq!(parsed.date, Some(today() + Duration::days(1)));
    }

    #[test]
    fn today_keyword_outranks_doctor_patterns() {
        // "today" + "appointments" routes to the today intent even when
        // a doctor name is present; that intent is matched first.
        let parser = QueryParser::new();
        let parsed = parser.parse("appointments with dr mehta today", today());

        assert_eq!(parsed.intent, QueryIntent::TodayAppointments);
        assert_eq!(parsed.date, Some(today()));
    }

    #[test]
    fn recognizes_patient_search() {
        let parser = QueryParser::new();
        let parsed = parser.parse("find patient anjali", today());

        assert_eq!(parsed.intent, QueryIntent::PatientSearch);
        assert_eq!(parsed.patient_name.as_deref(), Some("Anjali"));
    }

    #[test]
    fn recognizes_booking_intent() {
        let parser = QueryParser::new();
        let parsed = parser.parse("book an appointment", today());

        assert_eq!(parsed.intent, QueryIntent::ScheduleAppointment);
    }

    #[test]
    fn recognizes_doctor_schedule() {
        let parser = QueryParser::new();
        let parsed = parser.parse("when is dr. rao available?", today());

        assert_eq!(parsed.intent, QueryIntent::DoctorSchedule);
        assert_eq!(parsed.doctor_name.as_deref(), Some("Rao"));
    }

    #[test]
    fn unmatched_text_is_unknown() {
        let parser = QueryParser::new();
        let parsed = parser.parse("what is the meaning of life", today());

        assert_eq!(parsed.intent, QueryIntent::Unknown);
        assert!(parsed.doctor_name.is_none());
        assert!(parsed.patient_name.is_none());
    }
}
