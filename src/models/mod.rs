pub mod resource;
pub mod subject;
pub mod week;

pub use resource::{CreateResourceRequest, Resource, UpdateResourceRequest};
pub use subject::{CreateSubjectRequest, Semester, Subject, UpdateSubjectRequest};
pub use week::{UpdateWeekRequest, Week};
