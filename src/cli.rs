use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use crate::client::{HttpPlanningClient, PlanningApi};
use crate::config::ApiConfig;
use crate::editor::ResourceForm;
use crate::error::{AppError, Banner};
use crate::models::{CreateSubjectRequest, Semester, Subject, UpdateSubjectRequest};
use crate::planning::duplicates::RepeatedContent;
use crate::planning::stepper::Stepper;
use crate::services::{CalendarEntry, Lifecycle, PlanningSession, Progress, SubjectList};

const REPEATED_EXCERPT_LEN: usize = 150;

#[derive(Parser)]
#[command(name = "autoplanning")]
#[command(about = "Plan your subjects week by week")]
#[command(
    after_help = "Environment:\n  PLANNING_API_URL            Base URL of the planning API\n  PLANNING_API_TIMEOUT_SECS   Request timeout in seconds"
)]
pub struct Cli {
    /// Overrides PLANNING_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List subjects with their progress.
    Subjects,
    /// Create a subject.
    New {
        name: String,
        #[arg(long, default_value = "1st")]
        semester: Semester,
    },
    /// Rename a subject or change its semester.
    Rename {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        semester: Option<Semester>,
    },
    Delete {
        id: i64,
    },
    /// Show the planning view for one subject.
    Show {
        id: i64,
        #[arg(long)]
        week: Option<i32>,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Save a week's content.
    Edit {
        id: i64,
        #[arg(long)]
        week: i32,
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        content: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        /// Move on to the following week after saving.
        #[arg(long = "continue")]
        and_continue: bool,
    },
    AddResource {
        id: i64,
        #[arg(long)]
        week: i32,
        #[arg(long)]
        url: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    RemoveResource {
        id: i64,
        resource_id: i64,
    },
    /// Calendar of completed weeks.
    Calendar {
        id: i64,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Download the subject's spreadsheet.
    Export {
        id: i64,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = ApiConfig::new_from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_base_url(url);
    }
    debug!("using planning API at {}", config.base_url);
    let api: Arc<dyn PlanningApi> = Arc::new(HttpPlanningClient::new(config)?);

    match cli.command {
        Command::Subjects => {
            let mut list = SubjectList::new(api);
            cancel_on_ctrl_c(list.lifecycle());
            list.load().await.map_err(|e| surfaced(list.error(), e))?;
            print!("{}", render_subjects(list.subjects()));
        }
        Command::New { name, semester } => {
            let mut list = SubjectList::new(api);
            let subject = list
                .create(CreateSubjectRequest { name, semester })
                .await
                .map_err(|e| surfaced(list.error(), e))?;
            println!("Created subject #{} {}", subject.id, subject.name);
        }
        Command::Rename { id, name, semester } => {
            let mut list = SubjectList::new(api);
            list.update(id, UpdateSubjectRequest { name, semester })
                .await
                .map_err(|e| surfaced(list.error(), e))?;
            println!("Updated subject #{}", id);
        }
        Command::Delete { id } => {
            let mut list = SubjectList::new(api);
            list.delete(id).await.map_err(|e| surfaced(list.error(), e))?;
            println!("Deleted subject #{}", id);
        }
        Command::Show { id, week, today } => {
            let session = open_session(api, id, week).await?;
            print!("{}", render_session(&session, today.unwrap_or_else(today_local)));
        }
        Command::Edit {
            id,
            week,
            content,
            file,
            and_continue,
        } => {
            let content = match (content, file) {
                (Some(content), _) => content,
                (None, Some(path)) => tokio::fs::read_to_string(path).await?,
                (None, None) => {
                    return Err(AppError::Validation("Provide --content or --file".to_string()));
                }
            };
            let mut session = open_session(api, id, Some(week)).await?;
            if and_continue {
                let next = session
                    .save_and_continue(&content)
                    .await
                    .map_err(|e| surfaced(session.error(), e))?;
                match next {
                    Some(n) => println!("Saved week {}; continue with week {}", week, n),
                    None => println!("Saved week {}; that was the last week", week),
                }
            } else {
                let saved = session
                    .save_week_content(&content)
                    .await
                    .map_err(|e| surfaced(session.error(), e))?;
                if saved {
                    println!("Saved week {}", week);
                } else {
                    println!("Week {} unchanged", week);
                }
            }
        }
        Command::AddResource {
            id,
            week,
            url,
            title,
            description,
        } => {
            let mut session = open_session(api, id, Some(week)).await?;
            let form = ResourceForm::new(url)
                .title(title.unwrap_or_default())
                .description(description.unwrap_or_default());
            let resource = session
                .add_resource(&form)
                .await
                .map_err(|e| surfaced(session.error(), e))?;
            println!("Added resource #{} to week {}", resource.id, week);
        }
        Command::RemoveResource { id, resource_id } => {
            let mut session = open_session(api, id, None).await?;
            session
                .delete_resource(resource_id)
                .await
                .map_err(|e| surfaced(session.error(), e))?;
            println!("Removed resource #{}", resource_id);
        }
        Command::Calendar { id, today } => {
            let session = open_session(api, id, None).await?;
            match session.calendar_entries(today.unwrap_or_else(today_local)) {
                Some(entries) => print!("{}", render_calendar(&entries)),
                None => {
                    return Err(AppError::Validation(
                        "The calendar is available once every week has content".to_string(),
                    ));
                }
            }
        }
        Command::Export { id, out } => {
            let mut session = open_session(api, id, None).await?;
            let path = session
                .export(&out)
                .await
                .map_err(|e| surfaced(session.error(), e))?;
            println!("Exported to {}", path.display());
        }
    }

    Ok(())
}

async fn open_session(
    api: Arc<dyn PlanningApi>,
    id: i64,
    week: Option<i32>,
) -> Result<PlanningSession, AppError> {
    let mut session = PlanningSession::new(api, id);
    cancel_on_ctrl_c(session.lifecycle());
    session
        .load()
        .await
        .map_err(|e| surfaced(session.error(), e))?;
    if let Some(n) = week {
        if !session.select_step(n) {
            return Err(AppError::Validation(format!("Subject has no week {}", n)));
        }
    }
    Ok(session)
}

fn cancel_on_ctrl_c(lifecycle: Lifecycle) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling pending requests");
            lifecycle.cancel();
        }
    });
}

fn surfaced(banner: Option<&Banner>, err: AppError) -> AppError {
    if let Some(banner) = banner {
        eprintln!("{}", banner);
    }
    err
}

fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

pub fn render_subjects(subjects: &[Subject]) -> String {
    if subjects.is_empty() {
        return "No subjects yet.\n".to_string();
    }
    let mut out = String::new();
    for subject in subjects {
        let progress = Progress::of(subject);
        out.push_str(&format!(
            "#{:<4} {:<30} {:<7} weeks {}-{}  {}/{} done\n",
            subject.id,
            subject.name,
            subject.semester,
            subject.start_week,
            subject.end_week,
            progress.completed,
            progress.total
        ));
    }
    out
}

/// One-line stepper: `[n]` is the current week, `✓n` a completed one.
/// Connectors are `==` when completed and `--` otherwise.
pub fn render_stepper(stepper: &Stepper) -> String {
    let views = stepper.views();
    let connectors = stepper.connectors();
    let mut out = String::new();
    for (i, view) in views.iter().enumerate() {
        let cell = if view.is_current {
            format!("[{}]", view.week_number)
        } else if view.is_completed {
            format!("✓{}", view.week_number)
        } else {
            view.week_number.to_string()
        };
        out.push_str(&cell);
        if let Some(connector) = connectors.get(i) {
            out.push_str(if connector.completed { " == " } else { " -- " });
        }
    }
    out
}

pub fn render_repeated(groups: &[RepeatedContent]) -> String {
    let mut out = String::new();
    if groups.is_empty() {
        return out;
    }
    out.push_str("Repeated content\n");
    for group in groups {
        let weeks: Vec<String> = group.week_numbers.iter().map(|n| n.to_string()).collect();
        out.push_str(&format!("  Found in weeks: {}\n", weeks.join(", ")));
        out.push_str(&format!("    {}...\n", group.excerpt(REPEATED_EXCERPT_LEN)));
    }
    out
}

pub fn render_calendar(entries: &[CalendarEntry]) -> String {
    let mut out = String::from("Completed weeks:\n");
    for entry in entries {
        out.push_str(&format!(
            "  Week {:<3} {}  {}\n",
            entry.week_number,
            entry.date.format("%B %-d, %Y"),
            entry.excerpt.replace('\n', " ")
        ));
    }
    out
}

pub fn render_session(session: &PlanningSession, reference: NaiveDate) -> String {
    let Some(subject) = session.subject() else {
        return "Subject not found\n".to_string();
    };
    let mut out = String::new();
    out.push_str(&format!(
        "{}  ({} semester, weeks {} - {})\n",
        subject.name,
        subject.semester.as_str().to_uppercase(),
        subject.start_week,
        subject.end_week
    ));
    out.push_str(&format!("{}\n\n", render_stepper(&session.stepper())));

    let current = session.current_week_number();
    for week in subject.sorted_weeks() {
        let marker = if week.is_complete() { "●" } else { "○" };
        out.push_str(&format!(
            "{} Week {:<3} {}",
            marker,
            week.week_number,
            session.date_label(week.week_number, reference)
        ));
        if Some(week.week_number) == current {
            out.push_str("  (current)");
        }
        out.push('\n');
        out.push_str(&format!(
            "    {}\n",
            week.content_preview(crate::models::week::DEFAULT_PREVIEW_LEN)
                .replace('\n', " ")
        ));
        if !week.resources.is_empty() {
            let plural = if week.resources.len() == 1 { "" } else { "s" };
            out.push_str(&format!("    {} resource{}\n", week.resources.len(), plural));
        }
    }

    let repeated = render_repeated(&session.repeated_content());
    if !repeated.is_empty() {
        out.push('\n');
        out.push_str(&repeated);
    }

    if let Some(week) = session.current_week() {
        out.push_str(&format!(
            "\nWeek {} Content  ({})\n",
            week.week_number,
            session.date_label(week.week_number, reference)
        ));
        if week.content.trim().is_empty() {
            out.push_str("  (empty)\n");
        } else {
            for line in week.content.lines() {
                out.push_str(&format!("  {}\n", line));
            }
        }
        if week.resources.is_empty() {
            out.push_str("Resources: none added yet.\n");
        } else {
            out.push_str("Resources:\n");
            for resource in &week.resources {
                let title = resource.title.as_deref().unwrap_or("");
                out.push_str(&format!("  #{} {} {}\n", resource.id, title, resource.url));
                if let Some(description) = &resource.description {
                    out.push_str(&format!("      {}\n", description));
                }
            }
        }
        if !session.is_last_week() {
            if let Some(next) = session.next_week_number() {
                out.push_str(&format!("Next: week {}\n", next));
            }
        }
    } else {
        out.push_str("\nNo weeks available\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepper_line_marks_current_and_completed() {
        let stepper = Stepper::new(vec![1, 2, 3], 2, [1]);
        assert_eq!(render_stepper(&stepper), "✓1 -- [2] -- 3");

        let stepper = Stepper::new(vec![1, 2, 3], 3, [1, 2]);
        assert_eq!(render_stepper(&stepper), "✓1 == ✓2 -- [3]");
    }

    #[test]
    fn repeated_block_lists_week_numbers() {
        let groups = vec![RepeatedContent {
            normalized_content: "a long repeated paragraph of notes".to_string(),
            week_numbers: vec![4, 9],
        }];
        let text = render_repeated(&groups);
        assert!(text.contains("Found in weeks: 4, 9"));
        assert!(render_repeated(&[]).is_empty());
    }

    #[test]
    fn calendar_lines_end_with_newline() {
        let entries = vec![CalendarEntry {
            week_number: 17,
            date: NaiveDate::from_ymd_opt(2025, 6, 23).unwrap(),
            excerpt: "Kinematics\nvectors".to_string(),
        }];
        assert_eq!(
            render_calendar(&entries),
            "Completed weeks:\n  Week 17  June 23, 2025  Kinematics vectors\n"
        );
        assert_eq!(render_subjects(&[]), "No subjects yet.\n");
    }

    #[test]
    fn parses_edit_command() {
        let cli = Cli::try_parse_from([
            "autoplanning",
            "edit",
            "3",
            "--week",
            "18",
            "--content",
            "Kinematics",
            "--continue",
        ])
        .unwrap();
        match cli.command {
            Command::Edit {
                id,
                week,
                content,
                and_continue,
                ..
            } => {
                assert_eq!((id, week), (3, 18));
                assert_eq!(content.as_deref(), Some("Kinematics"));
                assert!(and_continue);
            }
            _ => panic!("expected edit command"),
        }
    }

    #[test]
    fn edit_requires_content_or_file() {
        assert!(Cli::try_parse_from(["autoplanning", "edit", "3", "--week", "1"]).is_err());
    }

    #[test]
    fn new_parses_semester() {
        let cli =
            Cli::try_parse_from(["autoplanning", "new", "Physics", "--semester", "yearly"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::New {
                semester: Semester::Yearly,
                ..
            }
        ));
    }
}
