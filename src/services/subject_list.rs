use std::sync::Arc;

use tracing::{error, info};

use crate::client::PlanningApi;
use crate::error::{Action, AppError, Banner};
use crate::models::{CreateSubjectRequest, Subject, UpdateSubjectRequest};
use crate::services::lifecycle::Lifecycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: i32,
}

impl Progress {
    pub fn of(subject: &Subject) -> Self {
        Self {
            completed: subject.completed_week_count(),
            total: subject.total_weeks(),
        }
    }
}

/// The subject overview: list, create, rename, delete.
pub struct SubjectList {
    api: Arc<dyn PlanningApi>,
    subjects: Vec<Subject>,
    error: Option<Banner>,
    lifecycle: Lifecycle,
}

impl SubjectList {
    pub fn new(api: Arc<dyn PlanningApi>) -> Self {
        Self {
            api,
            subjects: Vec::new(),
            error: None,
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn error(&self) -> Option<&Banner> {
        self.error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.clone()
    }

    pub async fn load(&mut self) -> Result<(), AppError> {
        let result = self.lifecycle.run(self.api.list_subjects()).await;
        match result {
            Ok(subjects) => {
                info!("loaded {} subjects", subjects.len());
                self.subjects = subjects;
                self.error = None;
                Ok(())
            }
            Err(err) => Err(self.fail(Action::LoadSubjects, err)),
        }
    }

    /// Creates a subject. The list is not reloaded; callers move on to the
    /// new subject's planning session.
    pub async fn create(&mut self, req: CreateSubjectRequest) -> Result<Subject, AppError> {
        if req.name.trim().is_empty() {
            let err = AppError::Validation("Subject name is required".to_string());
            return Err(self.fail(Action::CreateSubject, err));
        }
        let result = self.lifecycle.run(self.api.create_subject(&req)).await;
        match result {
            Ok(subject) => {
                info!("created subject {} ({})", subject.id, subject.name);
                Ok(subject)
            }
            Err(err) => Err(self.fail(Action::CreateSubject, err)),
        }
    }

    pub async fn update(&mut self, id: i64, req: UpdateSubjectRequest) -> Result<(), AppError> {
        if req.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            let err = AppError::Validation("Subject name is required".to_string());
            return Err(self.fail(Action::UpdateSubject, err));
        }
        let result = self.lifecycle.run(self.api.update_subject(id, &req)).await;
        if let Err(err) = result {
            return Err(self.fail(Action::UpdateSubject, err));
        }
        self.load().await
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), AppError> {
        let result = self.lifecycle.run(self.api.delete_subject(id)).await;
        if let Err(err) = result {
            return Err(self.fail(Action::DeleteSubject, err));
        }
        self.load().await
    }

    fn fail(&mut self, action: Action, err: AppError) -> AppError {
        if !err.is_cancelled() {
            error!("{}: {}", action.failure_message(), err);
            self.error = Some(Banner::from_error(action, &err));
        }
        err
    }
}

impl Drop for SubjectList {
    fn drop(&mut self) {
        self.lifecycle.cancel();
    }
}
