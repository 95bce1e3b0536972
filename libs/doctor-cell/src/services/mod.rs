pub mod availability;
pub mod calendar;
pub mod doctor;

pub use availability::{normalize_availability, resolve_weekday, weekday_index};
pub use calendar::{
    filter_events_for_doctor, project_calendar_events, sort_events_by_start, AvailabilitySource,
    LocalizedDoctor, RosterEntry,
};
pub use doctor::DoctorService;
