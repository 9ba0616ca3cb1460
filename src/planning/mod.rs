pub mod dates;
pub mod duplicates;
pub mod stepper;

pub use dates::{WeekRange, week_date_label, week_date_range};
pub use duplicates::{RepeatedContent, find_repeated_content};
pub use stepper::{ScrollCommand, ScrollDirection, ScrollMetrics, Span, StepView, Stepper};
