use std::{env, fs, path::Path};

use ts_rs::TS;

fn generate_types_content() -> String {
    const HEADER: &str = "// This file was generated by `crates/server/src/bin/generate_types.rs`.\n\n// Do not edit this file manually.";

    let decls = [
        utils::response::ApiResponse::<()>::decl(),
        services::services::comments::Page::<()>::decl(),
        server::routes::health::HealthStatus::decl(),
        server::routes::tasks::UpdateTaskStatus::decl(),
        server::routes::social_events::RsvpRequest::decl(),
        server::routes::comments::CommentBody::decl(),
        db::models::profile::ProfileRole::decl(),
        db::models::profile::Profile::decl(),
        db::models::profile::UpsertProfile::decl(),
        db::models::task::TaskStatus::decl(),
        db::models::task::Priority::decl(),
        db::models::task::Task::decl(),
        db::models::task::CreateTask::decl(),
        db::models::task::UpdateTask::decl(),
        db::models::garden::GardenTaskStatus::decl(),
        db::models::garden::GardenArea::decl(),
        db::models::garden::CreateGardenArea::decl(),
        db::models::garden::GardenTask::decl(),
        db::models::garden::CreateGardenTask::decl(),
        db::models::garden::UpdateGardenTask::decl(),
        db::models::maintenance::MaintenanceStatus::decl(),
        db::models::maintenance::MaintenanceRequest::decl(),
        db::models::maintenance::CreateMaintenanceRequest::decl(),
        db::models::maintenance::UpdateMaintenanceRequest::decl(),
        db::models::maintenance::MaintenanceVisit::decl(),
        db::models::maintenance::CreateMaintenanceVisit::decl(),
        db::models::maintenance::UpdateMaintenanceVisit::decl(),
        db::models::development::InitiativeCategory::decl(),
        db::models::development::InitiativeStatus::decl(),
        db::models::development::DevelopmentInitiative::decl(),
        db::models::development::CreateDevelopmentInitiative::decl(),
        db::models::development::UpdateDevelopmentInitiative::decl(),
        db::models::social_event::SocialEventStatus::decl(),
        db::models::social_event::RsvpStatus::decl(),
        db::models::social_event::SocialEvent::decl(),
        db::models::social_event::CreateSocialEvent::decl(),
        db::models::social_event::UpdateSocialEvent::decl(),
        db::models::social_event::SocialEventParticipant::decl(),
        db::models::calendar_event::CalendarEventType::decl(),
        db::models::calendar_event::CalendarEvent::decl(),
        db::models::calendar_event::CreateCalendarEvent::decl(),
        db::models::calendar_event::UpdateCalendarEvent::decl(),
        db::models::comment::CommentResource::decl(),
        db::models::comment::Comment::decl(),
    ];

    let body = decls
        .into_iter()
        .map(|d| {
            let trimmed = d.trim_start();
            if trimmed.starts_with("export") {
                trimmed.to_string()
            } else {
                format!("export {trimmed}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{HEADER}\n\n{body}\n")
}

fn main() {
    let check_mode = env::args().any(|arg| arg == "--check");

    let shared_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../shared");
    let types_path = shared_path.join("types.ts");
    let generated = generate_types_content();

    if check_mode {
        let current = fs::read_to_string(&types_path).unwrap_or_default();
        if current == generated {
            println!("shared/types.ts is up to date.");
            std::process::exit(0);
        } else {
            eprintln!("shared/types.ts is out of date. Run `cargo run --bin generate_types`.");
            std::process::exit(1);
        }
    }

    if let Err(e) =
        fs::create_dir_all(&shared_path).and_then(|_| fs::write(&types_path, generated))
    {
        eprintln!("Failed to write {}: {e}", types_path.display());
        std::process::exit(1);
    }
    println!("Wrote {}", types_path.display());
}
