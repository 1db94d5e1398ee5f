use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use onboard_console::config::ConsoleConfig;
use onboard_console::record::{DocumentStatus, InterviewStatus};
use onboard_console::store::{FileUpload, HttpRecordStore, InterviewSchedule, PersonalFields};
use onboard_console::view::{OperatorContext, Shell, StagePanel, Toast, ToastLevel, View, ViewRouter};

/// Terminal implementation of the host shell.
struct TermShell;

impl Shell for TermShell {
    fn render(&self, view: &View) {
        match view {
            View::Denied => println!("\n⛔ Access denied: elevated operator role required.\n"),
            View::List(list) => {
                println!(
                    "\n── Onboarding records ({} total, page {}/{}) ──",
                    list.total,
                    list.page + 1,
                    list.page_count
                );
                for row in &list.rows {
                    println!(
                        "  {:<12} {:<24} {:<24} stage {} ({}%)",
                        row.id, row.name, row.email, row.stage, row.progress_percent
                    );
                }
                println!();
            }
            View::Detail(detail) => {
                println!("\n── {} ({}) ──", detail.name, detail.record_id);
                for step in &detail.stepper {
                    let lock = if step.accessible { " " } else { "🔒" };
                    println!("  {} {:?}: {} {}", step.stage, step.status, step.title, lock);
                }
                println!("  Progress: {}%\n", detail.progress_percent);
            }
            View::Stage(stage) => {
                println!("\n── Stage {} ──", stage.stage);
                match &stage.panel {
                    StagePanel::PersonalSummary { fields } => {
                        println!(
                            "  {} {} <{}> {} / {}",
                            fields.firstname,
                            fields.lastname,
                            fields.email,
                            fields.department,
                            fields.designation
                        );
                    }
                    StagePanel::PersonalForm { existing, .. } => {
                        println!(
                            "  Personal form ({})",
                            if *existing { "edit" } else { "new candidate" }
                        );
                        println!("  submit <first> <last> <email> <contact> <address> <dept> <desig>");
                    }
                    StagePanel::Interview {
                        scheduled,
                        interview_date,
                        interview_time,
                        interview_status,
                        ..
                    } => {
                        if *scheduled {
                            println!(
                                "  Interview {} {} {}",
                                interview_date.as_deref().unwrap_or("-"),
                                interview_time.as_deref().unwrap_or("-"),
                                interview_status
                            );
                        } else {
                            println!("  Not scheduled. schedule <date> <time> [meet-link]");
                        }
                    }
                    StagePanel::Offer {
                        mail_reply,
                        documents,
                        upload_enabled,
                        polling,
                    } => {
                        println!(
                            "  Reply: {:<8} documents: {}  upload {}  {}",
                            mail_reply.as_str(),
                            documents.len(),
                            if *upload_enabled { "enabled" } else { "locked" },
                            if *polling { "(polling for reply…)" } else { "" }
                        );
                    }
                    StagePanel::Onboarding {
                        doj,
                        employee_id,
                        converted_to_master,
                        documents,
                    } => {
                        println!(
                            "  doj: {:?}  employee: {:?}  converted: {}  documents: {}",
                            doj,
                            employee_id,
                            converted_to_master,
                            documents.len()
                        );
                    }
                    StagePanel::Verification {
                        document_status,
                        select_enabled,
                    } => {
                        println!(
                            "  Physical documents: {}  select {}",
                            document_status,
                            if *select_enabled { "enabled" } else { "locked" }
                        );
                    }
                }
                println!();
            }
        }
    }

    fn toast(&self, toast: Toast) {
        let mark = match toast.level {
            ToastLevel::Success => "✅",
            ToastLevel::Info => "ℹ️ ",
            ToastLevel::Warning => "⚠️ ",
            ToastLevel::Error => "❌",
        };
        eprintln!("{mark} {}", toast.message);
    }

    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

fn read_files(paths: &[&str]) -> anyhow::Result<Vec<FileUpload>> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)?;
            let name = std::path::Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string());
            Ok(FileUpload::new(name, "application/pdf", bytes))
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ConsoleConfig::from_env()?;
    let operator = OperatorContext {
        id: std::env::var("ONBOARD_OPERATOR_ID").unwrap_or_default(),
        email: std::env::var("ONBOARD_OPERATOR_EMAIL").unwrap_or_default(),
        role: std::env::var("ONBOARD_OPERATOR_ROLE").unwrap_or_else(|_| "hr".to_string()),
        designation: std::env::var("ONBOARD_OPERATOR_DESIGNATION").unwrap_or_default(),
    };

    eprintln!("🗂  Onboarding console v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.api_base);
    eprintln!("   Commands: list | search <q> | open <id> | stage <n> | new");
    eprintln!("             submit <7 fields> | schedule <date> <time> [link]");
    eprintln!("             result <passed|failed|noshow> | check | upload <files…>");
    eprintln!("             del-docs | policy <doj> <files…> | verify | docs-mail");
    eprintln!("             check-docs | save <verified|not-verified> | quit\n");

    let store = Arc::new(HttpRecordStore::new(&config)?);
    let shell = Arc::new(TermShell);
    let mut router = ViewRouter::new(store, shell, operator, config);

    router.open_list().await;

    let stdin = tokio::io::stdin();
    let reader = BufReader::new(stdin);
    let mut lines = reader.lines();

    eprint!("> ");
    while let Ok(Some(line)) = lines.next_line().await {
        router.pump_poll_events().await;
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => {}
            ["quit"] | ["q"] => break,
            ["list"] => router.open_list().await,
            ["search", rest @ ..] => router.search_input(&rest.join(" ")).await,
            ["open", id] => router.open_detail(id).await,
            ["stage", n] => match n.parse::<u8>() {
                Ok(n) => {
                    // The gate already reported via toast; nothing more to do.
                    let _ = router.open_stage(n).await;
                }
                Err(_) => eprintln!("stage: expected a number"),
            },
            ["new"] => router.open_new(),
            ["edit"] => router.toggle_personal_edit(),
            ["submit", first, last, email, contact, address, dept, desig] => {
                router
                    .submit_personal(PersonalFields {
                        firstname: first.to_string(),
                        lastname: last.to_string(),
                        email: email.to_string(),
                        contact: contact.to_string(),
                        address: address.to_string(),
                        department: dept.to_string(),
                        designation: desig.to_string(),
                    })
                    .await
            }
            ["schedule", date, time, rest @ ..] => {
                router
                    .schedule_interview(InterviewSchedule {
                        interview_date: date.to_string(),
                        interview_time: time.to_string(),
                        meet_link: rest.first().map(|s| s.to_string()),
                    })
                    .await
            }
            ["result", verdict] => {
                let status = match *verdict {
                    "passed" => InterviewStatus::Passed,
                    "failed" => InterviewStatus::Failed,
                    "noshow" => InterviewStatus::DidNotShowUp,
                    _ => {
                        eprintln!("result: expected passed|failed|noshow");
                        eprint!("> ");
                        continue;
                    }
                };
                router.finalize_interview(status).await
            }
            ["check"] => router.check_reply_now().await,
            ["upload", paths @ ..] if !paths.is_empty() => match read_files(paths) {
                Ok(files) => router.upload_documents(files).await,
                Err(e) => eprintln!("upload: {e}"),
            },
            ["del-docs"] => router.delete_documents().await,
            ["policy", doj, paths @ ..] if !paths.is_empty() => {
                match (doj.parse::<chrono::NaiveDate>(), read_files(paths)) {
                    (Ok(doj), Ok(files)) => router.send_policy_letter(doj, files).await,
                    (Err(e), _) => eprintln!("policy: bad date: {e}"),
                    (_, Err(e)) => eprintln!("policy: {e}"),
                }
            }
            ["verify"] => router.verify_employee().await,
            ["docs-mail"] => router.send_documents_mail().await,
            ["check-docs"] => router.check_documents_mail().await,
            ["save", verdict] => {
                let status = match *verdict {
                    "verified" => DocumentStatus::Verified,
                    "not-verified" => DocumentStatus::NotVerified,
                    _ => {
                        eprintln!("save: expected verified|not-verified");
                        eprint!("> ");
                        continue;
                    }
                };
                router.save_verification(status).await
            }
            other => eprintln!("unknown command: {}", other.join(" ")),
        }
        router.pump_poll_events().await;
        eprint!("> ");
    }

    router.unmount();
    Ok(())
}
