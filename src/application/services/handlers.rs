//! Organization command handlers
//!
//! Each handler reads the current store snapshots, renders a text reply
//! and never mutates shared state. Registered once at startup.

use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;

use crate::application::services::digest;
use crate::application::services::search::SearchOutcome;
use crate::application::services::CommandService;
use crate::domain::entities::Command;
use crate::infrastructure::directory::DirectoryStore;
use crate::infrastructure::orgdata::OrgDataStore;

/// Longest /staff listing before truncation, same cap for /events.
const LIST_LIMIT: usize = 20;

/// Shared read-only context captured by every handler closure.
pub struct OrgContext {
    pub directory: Arc<DirectoryStore>,
    pub org: Arc<OrgDataStore>,
    pub timezone: Tz,
    pub digest_days: i64,
    pub top_k: usize,
}

/// Register the organization command set. `help` is rendered from the
/// registry after everything else is in, so it always reflects reality.
pub fn register_org_commands(commands: &mut CommandService, ctx: Arc<OrgContext>) {
    let c = Arc::clone(&ctx);
    commands.register(
        Command::new("start")
            .with_description("Greeting and a pointer to /help")
            .with_handler(move |update| {
                let greeting = match update.sender.as_deref() {
                    Some(name) => format!("Hello, {}!", name),
                    None => "Hello!".to_string(),
                };
                Ok(format!(
                    "{} I'm the {} assistant bot.\n\
                     I can tell you about the company, people, contacts and events.\n\
                     See /help for the full command list.",
                    greeting,
                    c.org.profile().company.name
                ))
            }),
    );

    let c = Arc::clone(&ctx);
    commands.register(
        Command::new("company")
            .with_description("Company information")
            .with_handler(move |_| {
                let company = &c.org.profile().company;
                Ok(format!("{}\nIndustry: {}", company.name, company.industry))
            }),
    );

    let c = Arc::clone(&ctx);
    commands.register(
        Command::new("team")
            .with_description("Team roster")
            .with_handler(move |_| {
                let team = &c.org.profile().team;
                if team.is_empty() {
                    return Ok("No team data available.".to_string());
                }
                let mut lines = vec!["Team:".to_string()];
                lines.extend(team.iter().map(|m| format!("- {} — {}", m.name, m.role)));
                Ok(lines.join("\n"))
            }),
    );

    let c = Arc::clone(&ctx);
    commands.register(
        Command::new("contacts")
            .with_description("Contact list")
            .with_handler(move |_| {
                let contacts = &c.org.profile().contacts;
                if contacts.is_empty() {
                    return Ok("No contacts available.".to_string());
                }
                let lines: Vec<String> = contacts
                    .iter()
                    .map(|e| format!("{}: {}", e.label, e.value))
                    .collect();
                Ok(lines.join("\n"))
            }),
    );

    let c = Arc::clone(&ctx);
    commands.register(
        Command::new("events")
            .with_description("Upcoming events")
            .with_handler(move |_| {
                let upcoming = digest::upcoming(c.org.events(), Utc::now());
                if upcoming.is_empty() {
                    return Ok("No upcoming events.".to_string());
                }
                let mut lines = vec!["Upcoming events:".to_string()];
                lines.extend(
                    upcoming
                        .iter()
                        .take(LIST_LIMIT)
                        .map(|e| e.display_line(c.timezone)),
                );
                if upcoming.len() > LIST_LIMIT {
                    lines.push(format!("...and {} more.", upcoming.len() - LIST_LIMIT));
                }
                Ok(lines.join("\n"))
            }),
    );

    let c = Arc::clone(&ctx);
    commands.register(
        Command::new("digest")
            .with_description("Event digest for the configured window")
            .with_handler(move |_| {
                let selected =
                    digest::select_digest(c.org.events(), Utc::now(), c.timezone, c.digest_days);
                if selected.is_empty() {
                    return Ok(format!(
                        "No events in the next {} day(s).",
                        c.digest_days
                    ));
                }
                let mut lines = vec![format!("Digest for the next {} day(s):", c.digest_days)];
                lines.extend(selected.iter().map(|e| e.display_line(c.timezone)));
                Ok(lines.join("\n"))
            }),
    );

    let c = Arc::clone(&ctx);
    commands.register(
        Command::new("departments")
            .with_description("Departments from the employee file")
            .with_handler(move |_| {
                let snapshot = c.directory.snapshot();
                if snapshot.departments.is_empty() {
                    return Ok("No departments found.".to_string());
                }
                let mut lines = vec!["Departments:".to_string()];
                lines.extend(snapshot.departments.iter().map(|d| format!("- {}", d)));
                Ok(lines.join("\n"))
            }),
    );

    let c = Arc::clone(&ctx);
    commands.register(
        Command::new("staff")
            .with_description("List employees, optionally by department")
            .with_usage("/staff [department]")
            .with_handler(move |update| {
                let snapshot = c.directory.snapshot();
                let filter = update.args.join(" ");
                let matching = snapshot.staff(&filter);
                if matching.is_empty() {
                    return Ok("No employees matched that filter.".to_string());
                }
                let mut lines = vec!["Employees:".to_string()];
                lines.extend(matching.iter().take(LIST_LIMIT).map(|e| e.display_line()));
                if matching.len() > LIST_LIMIT {
                    lines.push(format!("...and {} more.", matching.len() - LIST_LIMIT));
                }
                Ok(lines.join("\n"))
            }),
    );

    let c = Arc::clone(&ctx);
    commands.register(
        Command::new("find")
            .with_description("Search employees by name, position or department")
            .with_usage("/find <query>")
            .with_handler(move |update| {
                let snapshot = c.directory.snapshot();
                let query = update.args.join(" ");
                match snapshot.index.search(&query, c.top_k) {
                    SearchOutcome::EmptyQuery => {
                        Ok("Usage: /find <query> — give me a name, position or department.".to_string())
                    }
                    SearchOutcome::NoMatches => {
                        Ok("Nothing found. Try a shorter query or /departments.".to_string())
                    }
                    SearchOutcome::Matches { hits, remaining } => {
                        let mut lines = vec!["Found:".to_string()];
                        lines.extend(hits.iter().map(|h| h.employee.display_line()));
                        if remaining > 0 {
                            lines.push(format!(
                                "...and {} more match(es). Refine the query to narrow it down.",
                                remaining
                            ));
                        }
                        Ok(lines.join("\n"))
                    }
                }
            }),
    );

    let help_text = format!(
        "{}\n/help — This message",
        commands.render_help()
    );
    commands.register(
        Command::new("help")
            .with_description("This message")
            .with_handler(move |_| Ok(help_text.clone())),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Employee, Event, Update};
    use crate::infrastructure::orgdata::{CompanyInfo, ContactEntry, OrgProfile, TeamMember};
    use chrono_tz::Europe::Moscow;

    fn context() -> Arc<OrgContext> {
        context_with_events(vec![])
    }

    fn context_with_events(events: Vec<Event>) -> Arc<OrgContext> {
        let profile = OrgProfile {
            company: CompanyInfo {
                name: "Acme Logistics".to_string(),
                industry: "Freight".to_string(),
            },
            contacts: vec![ContactEntry {
                label: "Reception".to_string(),
                value: "+7 000 000-00-00".to_string(),
            }],
            team: vec![TeamMember {
                name: "Olga".to_string(),
                role: "COO".to_string(),
            }],
        };
        Arc::new(OrgContext {
            directory: Arc::new(DirectoryStore::from_employees(vec![
                Employee::new("Ivan Petrov", "Sales").with_position("Manager"),
                Employee::new("Irina Ivanova", "Marketing"),
            ])),
            org: Arc::new(OrgDataStore::from_parts(profile, events)),
            timezone: Moscow,
            digest_days: 7,
            top_k: 5,
        })
    }

    fn dispatch(command: &str, args: Vec<&str>) -> String {
        dispatch_with(context(), command, args)
    }

    fn dispatch_with(ctx: Arc<OrgContext>, command: &str, args: Vec<&str>) -> String {
        let mut commands = CommandService::new("/");
        register_org_commands(&mut commands, ctx);
        let update = Update::new(1, "1", format!("/{}", command))
            .with_command(command, args.into_iter().map(String::from).collect());
        commands.dispatch(&update)
    }

    #[test]
    fn find_orders_exact_match_first() {
        let reply = dispatch("find", vec!["ivan"]);
        let petrov = reply.find("Ivan Petrov").expect("Petrov in reply");
        let ivanova = reply.find("Irina Ivanova").expect("Ivanova in reply");
        assert!(petrov < ivanova);
    }

    #[test]
    fn find_without_args_asks_for_a_query() {
        let reply = dispatch("find", vec![]);
        assert!(reply.starts_with("Usage: /find"));
    }

    #[test]
    fn staff_filters_by_department() {
        let reply = dispatch("staff", vec!["sales"]);
        assert!(reply.contains("Ivan Petrov"));
        assert!(!reply.contains("Irina Ivanova"));
    }

    #[test]
    fn digest_with_no_events_is_not_an_error() {
        let reply = dispatch("digest", vec![]);
        assert!(reply.contains("No events in the next 7 day(s)."));
    }

    #[test]
    fn events_reports_how_many_were_cut() {
        let base = Utc::now() + chrono::Duration::days(1);
        let events = (0..22i64)
            .map(|i| Event::new(format!("event {:02}", i), base + chrono::Duration::minutes(i)))
            .collect();
        let reply = dispatch_with(context_with_events(events), "events", vec![]);
        assert!(reply.contains("...and 2 more."));
    }

    #[test]
    fn company_and_contacts_render_profile_data() {
        assert!(dispatch("company", vec![]).contains("Acme Logistics"));
        assert!(dispatch("contacts", vec![]).contains("Reception"));
    }

    #[test]
    fn help_lists_every_registered_command() {
        let help = dispatch("help", vec![]);
        for name in [
            "/start", "/company", "/team", "/contacts", "/events", "/digest",
            "/departments", "/staff", "/find", "/help",
        ] {
            assert!(help.contains(name), "missing {} in help", name);
        }
    }
}
