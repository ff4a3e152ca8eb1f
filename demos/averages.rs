use chrono::NaiveDate;
use noten_meister::{
    AverageSettings, Grade, GradeType, Subject, SubjectCategory, TargetGrade,
    grade_needed_for_target, overall_average, subject_averages,
};

fn setup_logger() -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
        })
        .level(log::LevelFilter::Debug)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logger()?;
    let day = |m, d| NaiveDate::from_ymd_opt(2024, m, d).ok_or("invalid date");

    let subjects = vec![
        Subject::new("de", "Deutsch", SubjectCategory::MainSubject, 7)?.with_tier_weights(2.0, 1.0)?,
        Subject::new("geo", "Geographie", SubjectCategory::MinorSubject, 7)?,
        Subject::new("ku", "Kunst", SubjectCategory::MinorSubject, 7)?,
    ];
    let grades = vec![
        Grade::new("1", "de", GradeType::WrittenExam, 2.0, 1.0, day(10, 8)?)?,
        Grade::new("2", "de", GradeType::OralGrade, 3.0, 1.0, day(11, 4)?)?,
        Grade::new("3", "geo", GradeType::OralGrade, 1.0, 1.0, day(10, 21)?)?,
        Grade::new("4", "geo", GradeType::WrittenExam, 2.0, 2.0, day(12, 2)?)?,
        Grade::planned("5", "de", GradeType::WrittenExam, 1.0, day(12, 16)?)?,
    ];

    for (id, average) in subject_averages(&subjects, &grades) {
        if average.is_none() {
            println!("{id}: no grades yet");
        } else {
            println!("{id}: {average}");
        }
    }
    let settings = AverageSettings::new(2.0, 1.0)?;
    println!("overall: {}", overall_average(&subjects, &grades, &settings));

    let deutsch = &subjects[0];
    let deutsch_grades = grades.iter().filter(|g| g.subject_id == deutsch.id);
    match grade_needed_for_target(deutsch_grades, deutsch, 2.0, 1.0, GradeType::WrittenExam)
        .map(TargetGrade::classify)
    {
        Some(TargetGrade::Needed(grade)) => println!("next Schulaufgabe needs {grade:.2}"),
        Some(TargetGrade::Secured) => println!("1.0 or better suffices"),
        Some(TargetGrade::Unreachable) => println!("target not achievable"),
        None => println!("cannot be computed"),
    }
    Ok(())
}
