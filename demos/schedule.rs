use chrono::{Local, TimeDelta, Utc};
use noten_meister::{Rating, Scheduler, SchedulerConfig, StudyCard};

fn setup_logger() -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
        })
        .level(log::LevelFilter::Trace)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logger()?;

    let scheduler = Scheduler::new(SchedulerConfig::default())?;
    println!("Scheduler config: {:?}", scheduler.config());
    let mut card = StudyCard::new("c1", "das Eichhörnchen", "the squirrel");
    println!("New card due: {}", scheduler.due_date(&card, &Local::now()));

    // Preview what each answer button would do
    let preview = scheduler.next_states(&card, Utc::now());
    println!(
        "again: {} day(s), good: {} day(s), easy: {} day(s)",
        preview.again.interval, preview.good.interval, preview.easy.interval
    );

    let mut now = Utc::now();
    for rating in [Rating::Good, Rating::Good, Rating::Easy, Rating::Again, Rating::Good] {
        card = scheduler.review(&card, rating, now);
        let state = card.srs.as_ref().ok_or("card was not scheduled")?;
        println!(
            "{rating:>5}: interval {:>3} day(s), ease {:.2}, repetitions {}, due {}",
            state.interval,
            state.ease_factor,
            state.repetitions,
            scheduler.due_date(&card, &now.with_timezone(&Local))
        );
        now += TimeDelta::days(i64::from(state.interval));
    }
    Ok(())
}
