pub mod lifecycle;
pub mod planning_session;
pub mod subject_list;

pub use lifecycle::Lifecycle;
pub use planning_session::{CalendarEntry, PlanningSession};
pub use subject_list::{Progress, SubjectList};
