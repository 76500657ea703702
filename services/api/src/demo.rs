use std::sync::Arc;

use clap::Args;
use jobboard::applications::ApplicationSubmission;
use jobboard::auth::Principal;
use jobboard::config::NotificationConfig;
use jobboard::jobs::JobDraft;
use jobboard::notifications::InlineNotifier;
use jobboard::{AppError, Board, MemoryStore, ServiceError};

type DemoBoard = Board<MemoryStore, InlineNotifier<MemoryStore>>;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Extra seekers following the employer before the job is posted
    #[arg(long, default_value_t = 2)]
    pub(crate) followers: usize,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self { followers: 2 }
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Job board hiring workflow demo");
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(InlineNotifier::new(
        store.clone(),
        &NotificationConfig::default(),
    ));
    let board = Board::new(store.clone(), notifier);

    if let Err(err) = walkthrough(&board, &store, args.followers) {
        println!("  Demo halted: {err}");
    }
    Ok(())
}

fn walkthrough(
    board: &DemoBoard,
    store: &MemoryStore,
    followers: usize,
) -> Result<(), ServiceError> {
    let employer = Principal::employer("u2", "Acme Hiring");
    let seeker = Principal::seeker("u1", "Sam Seeker");
    store.register_principal(employer.clone())?;
    store.register_principal(seeker.clone())?;

    println!("\nFollowers");
    for index in 1..=followers {
        let follower = Principal::seeker(format!("f{index}"), format!("Follower {index}"));
        board.follows.follow(&follower, &employer.id)?;
        println!("- {} follows {}", follower.display_name, employer.display_name);
    }

    println!("\nPosting");
    let job = board.jobs.create_job(
        &employer,
        JobDraft {
            title: "Backend Engineer".to_string(),
            description: "Own the application workflow services".to_string(),
            location: "Remote".to_string(),
            job_type: "Full-time".to_string(),
            experience_level: "Mid".to_string(),
            ..JobDraft::default()
        },
    )?;
    println!(
        "- {} posted {} ({}, {})",
        employer.display_name,
        job.id,
        job.title,
        job.job_type.label()
    );
    if followers > 0 {
        let sample = Principal::seeker("f1", "Follower 1");
        let feed = board.notifications.list(&sample)?;
        println!(
            "  {} follower(s) notified; Follower 1 sees \"{}\"",
            followers,
            feed.notifications
                .first()
                .map(|notification| notification.message.as_str())
                .unwrap_or("nothing")
        );
    }

    println!("\nApplication lifecycle");
    let application = board.applications.submit(
        &seeker,
        ApplicationSubmission::new(&job.id).with_cover_letter("Hi"),
    )?;
    println!(
        "- {} applied -> {} ({}), applicants now {}",
        seeker.display_name,
        application.id,
        application.status,
        board.jobs.get_job(&job.id)?.applicant_count
    );
    let inbox = board.notifications.list(&employer)?;
    println!(
        "  Employer inbox: {} unread, latest \"{}\"",
        inbox.unread_count,
        inbox
            .notifications
            .first()
            .map(|notification| notification.message.as_str())
            .unwrap_or("nothing")
    );

    let application = board
        .applications
        .set_status(&employer, &application.id, "Interview")?;
    let inbox = board.notifications.list(&seeker)?;
    println!("- Status set to {}", application.status);
    println!(
        "  Seeker inbox: \"{}\"",
        inbox
            .notifications
            .first()
            .map(|notification| notification.message.as_str())
            .unwrap_or("nothing")
    );

    match board.applications.rate(&employer, &application.id, 6, None) {
        Err(err) => println!("- Rating 6 rejected: {err}"),
        Ok(_) => println!("- Rating 6 unexpectedly accepted"),
    }
    let rated = board.applications.rate(
        &employer,
        &application.id,
        3,
        Some("Great fit".to_string()),
    )?;
    println!(
        "- Rated {}/5: {}",
        rated.rating.map(|rating| rating.value()).unwrap_or_default(),
        rated.rating_comment.as_deref().unwrap_or("")
    );

    board.applications.withdraw(&seeker, &application.id)?;
    println!(
        "- {} withdrew, applicants now {}",
        seeker.display_name,
        board.jobs.get_job(&job.id)?.applicant_count
    );

    let cleared = board.notifications.mark_all_read(&employer)?;
    println!("\nEmployer marked {cleared} notification(s) read");
    Ok(())
}
