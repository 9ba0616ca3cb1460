//! Horizontal week stepper, modelled as a small state machine.
//!
//! Layout measurements come in as plain numbers so the logic stays
//! independent of whatever draws it. Time is passed in by the caller.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use tracing::debug;

/// Pixels of slack before a scroll edge counts as reached.
pub const EDGE_THRESHOLD: f64 = 5.0;
pub const BUTTON_SCROLL_RATIO: f64 = 0.8;
pub const SCROLL_COOLDOWN: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_left: f64,
    pub scroll_width: f64,
    pub client_width: f64,
}

impl ScrollMetrics {
    pub fn can_scroll_left(&self) -> bool {
        self.scroll_left > EDGE_THRESHOLD
    }

    pub fn can_scroll_right(&self) -> bool {
        self.scroll_left < self.scroll_width - self.client_width - EDGE_THRESHOLD
    }
}

/// Horizontal extent of an element in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub left: f64,
    pub width: f64,
}

impl Span {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn center(&self) -> f64 {
        self.left + self.width / 2.0
    }

    pub fn is_within(&self, outer: &Span) -> bool {
        self.left >= outer.left && self.right() <= outer.right()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCommand {
    pub delta: f64,
    pub smooth: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollState {
    Idle,
    Scrolling { until: Instant },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub week_number: i32,
    pub is_current: bool,
    pub is_completed: bool,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub from: i32,
    pub to: i32,
    pub completed: bool,
}

type StepCallback = Box<dyn FnMut(i32) + Send>;

pub struct Stepper {
    steps: Vec<i32>,
    current: i32,
    completed: BTreeSet<i32>,
    on_step_click: Option<StepCallback>,
    can_scroll_left: bool,
    can_scroll_right: bool,
    state: ScrollState,
}

impl Stepper {
    pub fn new(
        steps: Vec<i32>,
        current: i32,
        completed: impl IntoIterator<Item = i32>,
    ) -> Self {
        Self {
            steps: non_empty(steps),
            current,
            completed: completed.into_iter().collect(),
            on_step_click: None,
            can_scroll_left: false,
            can_scroll_right: false,
            state: ScrollState::Idle,
        }
    }

    pub fn with_on_step_click(mut self, callback: impl FnMut(i32) + Send + 'static) -> Self {
        self.on_step_click = Some(Box::new(callback));
        self
    }

    pub fn steps(&self) -> &[i32] {
        &self.steps
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn is_clickable(&self) -> bool {
        self.on_step_click.is_some()
    }

    pub fn can_scroll_left(&self) -> bool {
        self.can_scroll_left
    }

    pub fn can_scroll_right(&self) -> bool {
        self.can_scroll_right
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// Called on mount, resize, scroll and list changes.
    pub fn on_layout(&mut self, metrics: ScrollMetrics) {
        self.can_scroll_left = metrics.can_scroll_left();
        self.can_scroll_right = metrics.can_scroll_right();
    }

    /// Returns the scroll that centers the current step, or `None` when it
    /// is already fully visible or not part of the sequence.
    pub fn scroll_to_current(&self, container: Span, step_spans: &[Span]) -> Option<ScrollCommand> {
        let index = self.steps.iter().position(|&s| s == self.current)?;
        let step = step_spans.get(index)?;
        if step.is_within(&container) {
            return None;
        }
        Some(ScrollCommand {
            delta: step.center() - container.center(),
            smooth: true,
        })
    }

    pub fn scroll_by_button(
        &mut self,
        direction: ScrollDirection,
        metrics: ScrollMetrics,
        now: Instant,
    ) -> Option<ScrollCommand> {
        self.tick(now);
        if let ScrollState::Scrolling { .. } = self.state {
            debug!("stepper scroll suppressed during cooldown");
            return None;
        }

        let amount = metrics.client_width * BUTTON_SCROLL_RATIO;
        self.state = ScrollState::Scrolling {
            until: now + SCROLL_COOLDOWN,
        };
        Some(ScrollCommand {
            delta: match direction {
                ScrollDirection::Left => -amount,
                ScrollDirection::Right => amount,
            },
            smooth: true,
        })
    }

    pub fn tick(&mut self, now: Instant) {
        if let ScrollState::Scrolling { until } = self.state {
            if now >= until {
                self.state = ScrollState::Idle;
            }
        }
    }

    /// Invokes the click callback with the week number at `index`.
    pub fn click_step(&mut self, index: usize) -> Option<i32> {
        let week_number = *self.steps.get(index)?;
        let callback = self.on_step_click.as_mut()?;
        callback(week_number);
        Some(week_number)
    }

    pub fn is_completed(&self, week_number: i32) -> bool {
        self.completed.contains(&week_number)
    }

    /// A connector is drawn completed when the step it leads to is completed
    /// or lies before the current week.
    pub fn connector_completed(&self, index: usize) -> bool {
        match self.steps.get(index + 1) {
            Some(&next) => self.completed.contains(&next) || next < self.current,
            None => false,
        }
    }

    pub fn connectors(&self) -> Vec<Connector> {
        self.steps
            .windows(2)
            .enumerate()
            .map(|(i, pair)| Connector {
                from: pair[0],
                to: pair[1],
                completed: self.connector_completed(i),
            })
            .collect()
    }

    pub fn views(&self) -> Vec<StepView> {
        self.steps
            .iter()
            .map(|&week_number| StepView {
                week_number,
                is_current: week_number == self.current,
                is_completed: self.completed.contains(&week_number),
                label: format!("Week {}", week_number),
            })
            .collect()
    }
}

fn non_empty(steps: Vec<i32>) -> Vec<i32> {
    if steps.is_empty() { vec![1] } else { steps }
}
