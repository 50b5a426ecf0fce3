use clap::Parser;
use fake::{faker::internet::en::Username, faker::name::en::Name, Fake};
use quizcast::{
    config::Settings,
    domain::{CreateUserRequest, PostAnnouncementRequest, QuizRole, SaveQuizSettingsRequest},
    repository::{QuizRepository, UserRepository},
    service::{ServiceContext, SystemClock},
};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

/// Populate a database with a demo quiz, staff and students.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Database URL; defaults to the configured one.
    #[arg(long)]
    database_url: Option<String>,

    /// Number of students to enrol.
    #[arg(long, default_value_t = 10)]
    students: usize,

    /// Password given to every seeded account.
    #[arg(long, default_value = "password123")]
    password: String,

    /// Name of the demo quiz.
    #[arg(long, default_value = "Midterm exam")]
    quiz: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let settings = Settings::new().unwrap_or_default();
    let database_url = args
        .database_url
        .clone()
        .unwrap_or_else(|| settings.database.url.clone());

    println!("🌱 Seeding {}", database_url);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let services = ServiceContext::new(db_pool.clone(), &settings, Arc::new(SystemClock));

    let quiz = services.quiz_repo.create_quiz(&args.quiz).await?;
    println!("📝 Created quiz '{}' (id {})", quiz.name, quiz.id);

    let teacher = services.user_repo.create(CreateUserRequest {
        username: "teacher".to_string(),
        full_name: "Terry Teacher".to_string(),
        password: args.password.clone(),
    }).await?;
    services.quiz_repo.enrol(quiz.id, teacher.id, QuizRole::EditingTeacher).await?;
    println!("  ✅ Created teacher (teacher / {})", args.password);

    services.quiz_settings_service.save(quiz.id, teacher.id, SaveQuizSettingsRequest {
        use_announcements: true,
        check_interval: Some(settings.announcements.default_check_interval),
        header: None,
    }).await?;

    println!("👥 Enrolling {} students...", args.students);
    for i in 0..args.students {
        let base: String = Username().fake();
        let student = services.user_repo.create(CreateUserRequest {
            username: format!("{}{}", base, i),
            full_name: Name().fake(),
            password: args.password.clone(),
        }).await?;
        services.quiz_repo.enrol(quiz.id, student.id, QuizRole::Student).await?;
        println!("  ✅ {} ({})", student.full_name, student.username);
    }

    services.announcement_service.post_announcement(quiz.id, teacher.id, PostAnnouncementRequest {
        content: "<p>Welcome! Calculators are allowed for this exam.</p>".to_string(),
        attachments: Vec::new(),
    }).await?;
    println!("📢 Posted a welcome announcement");

    println!("🎉 Done");
    Ok(())
}
