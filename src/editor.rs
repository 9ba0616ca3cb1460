use crate::error::AppError;
use crate::models::{CreateResourceRequest, Week};

/// Draft state for one week's content plus the add-resource form.
#[derive(Debug, Clone, Default)]
pub struct WeekEditor {
    pub week_id: i64,
    pub week_number: i32,
    pub draft: String,
    saved: String,
    pub resource_form: ResourceForm,
}

impl WeekEditor {
    pub fn for_week(week: &Week) -> Self {
        Self {
            week_id: week.id,
            week_number: week.week_number,
            draft: week.content.clone(),
            saved: week.content.clone(),
            resource_form: ResourceForm::default(),
        }
    }

    /// Picks up the server copy after a reload. A pending draft for the
    /// same week survives unless the saved content changed underneath it.
    pub fn reset_to(&mut self, week: &Week) {
        let same_week = self.week_id == week.id;
        if !same_week || self.saved != week.content {
            self.draft = week.content.clone();
        }
        if !same_week {
            self.resource_form = ResourceForm::default();
        }
        self.week_id = week.id;
        self.week_number = week.week_number;
        self.saved = week.content.clone();
    }

    pub fn needs_save(&self) -> bool {
        self.draft != self.saved
    }

    pub fn can_continue(&self) -> bool {
        !self.draft.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceForm {
    pub url: String,
    pub title: String,
    pub description: String,
}

impl ResourceForm {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn submit(&self) -> Result<CreateResourceRequest, AppError> {
        if self.url.trim().is_empty() {
            return Err(AppError::Validation("Resource URL is required".to_string()));
        }
        Ok(CreateResourceRequest {
            url: self.url.clone(),
            title: empty_as_none(&self.title),
            description: empty_as_none(&self.description),
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn empty_as_none(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
