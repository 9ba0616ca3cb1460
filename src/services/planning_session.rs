use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info};

use crate::client::PlanningApi;
use crate::editor::{ResourceForm, WeekEditor};
use crate::error::{Action, AppError, Banner};
use crate::export::write_export;
use crate::models::{Resource, Subject, UpdateWeekRequest, Week};
use crate::planning::{RepeatedContent, Stepper, find_repeated_content, week_date_range};
use crate::services::lifecycle::Lifecycle;

pub const CALENDAR_EXCERPT_LEN: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEntry {
    pub week_number: i32,
    pub date: NaiveDate,
    pub excerpt: String,
}

/// Everything the planning page for one subject needs.
///
/// Every mutation is followed by a full reload of the subject; nothing is
/// merged locally.
pub struct PlanningSession {
    api: Arc<dyn PlanningApi>,
    subject_id: i64,
    subject: Option<Subject>,
    current_week: Option<i32>,
    editor: Option<WeekEditor>,
    error: Option<Banner>,
    lifecycle: Lifecycle,
}

impl PlanningSession {
    pub fn new(api: Arc<dyn PlanningApi>, subject_id: i64) -> Self {
        Self {
            api,
            subject_id,
            subject: None,
            current_week: None,
            editor: None,
            error: None,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Handle that can cancel this session's requests from elsewhere.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.clone()
    }

    pub fn close(&self) {
        self.lifecycle.cancel();
    }

    pub fn subject(&self) -> Option<&Subject> {
        self.subject.as_ref()
    }

    pub fn error(&self) -> Option<&Banner> {
        self.error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn editor(&self) -> Option<&WeekEditor> {
        self.editor.as_ref()
    }

    pub fn current_week_number(&self) -> Option<i32> {
        self.current_week
    }

    pub fn current_week(&self) -> Option<&Week> {
        let number = self.current_week?;
        self.subject.as_ref()?.week_by_number(number)
    }

    pub async fn load(&mut self) -> Result<(), AppError> {
        let result = self.lifecycle.run(self.api.get_subject(self.subject_id)).await;
        match result {
            Ok(subject) => {
                self.apply_subject(subject);
                self.error = None;
                Ok(())
            }
            Err(err) => Err(self.fail(Action::LoadSubject, err)),
        }
    }

    fn apply_subject(&mut self, subject: Subject) {
        let keep = self
            .current_week
            .filter(|n| subject.week_by_number(*n).is_some());
        self.current_week = keep.or_else(|| initial_week(&subject));

        match self.current_week.and_then(|n| subject.week_by_number(n)) {
            Some(week) => match self.editor.as_mut() {
                Some(editor) => editor.reset_to(week),
                None => self.editor = Some(WeekEditor::for_week(week)),
            },
            None => self.editor = None,
        }

        info!(
            "loaded subject {} ({} weeks, {} complete)",
            subject.id,
            subject.weeks.len(),
            subject.completed_week_count()
        );
        self.subject = Some(subject);
    }

    /// Moves to `week_number`; unknown numbers are ignored.
    pub fn select_step(&mut self, week_number: i32) -> bool {
        let Some(week) = self
            .subject
            .as_ref()
            .and_then(|s| s.week_by_number(week_number))
        else {
            return false;
        };
        match self.editor.as_mut() {
            Some(editor) => editor.reset_to(week),
            None => self.editor = Some(WeekEditor::for_week(week)),
        }
        self.current_week = Some(week_number);
        true
    }

    /// Saves `content` for the current week. Returns `Ok(false)` without
    /// touching the network when it matches what was last saved.
    pub async fn save_week_content(&mut self, content: &str) -> Result<bool, AppError> {
        let Some(week_id) = self.current_week().map(|w| w.id) else {
            return Ok(false);
        };
        let Some(editor) = self.editor.as_mut() else {
            return Ok(false);
        };
        editor.draft = content.to_string();
        if !editor.needs_save() {
            return Ok(false);
        }

        let req = UpdateWeekRequest {
            content: content.to_string(),
        };
        let result = self.lifecycle.run(self.api.update_week(week_id, &req)).await;
        if let Err(err) = result {
            return Err(self.fail(Action::UpdateWeek, err));
        }
        self.load().await?;
        Ok(true)
    }

    /// Saves when changed, then advances to the next week by number.
    pub async fn save_and_continue(&mut self, content: &str) -> Result<Option<i32>, AppError> {
        let can_continue = match self.editor.as_mut() {
            Some(editor) => {
                editor.draft = content.to_string();
                editor.can_continue()
            }
            None => !content.trim().is_empty(),
        };
        if !can_continue {
            let err = AppError::Validation("Week content is required to continue".to_string());
            return Err(self.fail(Action::UpdateWeek, err));
        }
        self.save_week_content(content).await?;

        let next = self.next_week_number();
        if let Some(n) = next {
            self.select_step(n);
        }
        Ok(next)
    }

    pub async fn add_resource(&mut self, form: &ResourceForm) -> Result<Resource, AppError> {
        let Some(week_id) = self.current_week().map(|w| w.id) else {
            return Err(self.fail(Action::AddResource, AppError::NotFound));
        };
        let req = match form.submit() {
            Ok(req) => req,
            Err(err) => return Err(self.fail(Action::AddResource, err)),
        };

        let result = self.lifecycle.run(self.api.create_resource(week_id, &req)).await;
        let resource = match result {
            Ok(resource) => resource,
            Err(err) => return Err(self.fail(Action::AddResource, err)),
        };
        if let Some(editor) = self.editor.as_mut() {
            editor.resource_form.clear();
        }
        self.load().await?;
        Ok(resource)
    }

    pub async fn delete_resource(&mut self, resource_id: i64) -> Result<(), AppError> {
        let result = self.lifecycle.run(self.api.delete_resource(resource_id)).await;
        if let Err(err) = result {
            return Err(self.fail(Action::DeleteResource, err));
        }
        self.load().await
    }

    pub async fn export(&mut self, dir: &Path) -> Result<PathBuf, AppError> {
        let result = self.lifecycle.run(self.api.export_subject(self.subject_id)).await;
        let bytes = match result {
            Ok(bytes) => bytes,
            Err(err) => return Err(self.fail(Action::ExportSubject, err)),
        };
        let name = self
            .subject
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_default();
        match write_export(dir, &name, &bytes).await {
            Ok(path) => Ok(path),
            Err(err) => Err(self.fail(Action::ExportSubject, err)),
        }
    }

    fn fail(&mut self, action: Action, err: AppError) -> AppError {
        if !err.is_cancelled() {
            error!("{}: {}", action.failure_message(), err);
            self.error = Some(Banner::from_error(action, &err));
        }
        err
    }

    pub fn sorted_week_numbers(&self) -> Vec<i32> {
        let mut numbers: Vec<i32> = self
            .subject
            .iter()
            .flat_map(|s| s.weeks.iter().map(|w| w.week_number))
            .collect();
        numbers.sort_unstable();
        numbers
    }

    pub fn completed_weeks(&self) -> Vec<i32> {
        self.subject
            .iter()
            .flat_map(|s| s.weeks.iter())
            .filter(|w| w.is_complete())
            .map(|w| w.week_number)
            .collect()
    }

    pub fn next_week_number(&self) -> Option<i32> {
        let current = self.current_week?;
        self.sorted_week_numbers().into_iter().find(|&n| n > current)
    }

    pub fn is_last_week(&self) -> bool {
        match (self.current_week, self.sorted_week_numbers().last()) {
            (Some(current), Some(&last)) => current == last,
            _ => false,
        }
    }

    pub fn all_completed(&self) -> bool {
        self.subject.as_ref().is_some_and(|s| s.all_weeks_completed())
    }

    pub fn repeated_content(&self) -> Vec<RepeatedContent> {
        self.subject
            .as_ref()
            .map(|s| find_repeated_content(&s.weeks))
            .unwrap_or_default()
    }

    /// Stepper over the subject's weeks; attach a click callback with
    /// [`Stepper::with_on_step_click`] to make it interactive.
    pub fn stepper(&self) -> Stepper {
        let current = self
            .current_week
            .or_else(|| self.subject.as_ref().map(|s| s.start_week))
            .unwrap_or(1);
        Stepper::new(self.sorted_week_numbers(), current, self.completed_weeks())
    }

    pub fn date_label(&self, week_number: i32, reference: NaiveDate) -> String {
        let start = self.subject.as_ref().and_then(|s| s.semester_start_date);
        week_date_range(week_number, start, reference).to_string()
    }

    /// Calendar of completed weeks, available once every week is done.
    pub fn calendar_entries(&self, reference: NaiveDate) -> Option<Vec<CalendarEntry>> {
        let subject = self.subject.as_ref()?;
        if !subject.all_weeks_completed() {
            return None;
        }
        Some(
            subject
                .sorted_weeks()
                .into_iter()
                .filter(|w| w.is_complete())
                .map(|w| CalendarEntry {
                    week_number: w.week_number,
                    date: week_date_range(w.week_number, subject.semester_start_date, reference)
                        .start,
                    excerpt: w.content.chars().take(CALENDAR_EXCERPT_LEN).collect(),
                })
                .collect(),
        )
    }
}

impl Drop for PlanningSession {
    fn drop(&mut self) {
        self.lifecycle.cancel();
    }
}

/// First incomplete week by number, or the lowest week when all are done.
pub fn initial_week(subject: &Subject) -> Option<i32> {
    let sorted = subject.sorted_weeks();
    sorted
        .iter()
        .find(|w| !w.is_complete())
        .or_else(|| sorted.first())
        .map(|w| w.week_number)
}
