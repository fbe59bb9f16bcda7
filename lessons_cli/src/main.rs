use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use lessons_core::*;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "lhub")]
#[command(about = "Lesson booking and timeline scheduling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List lesson types available for generic purchase
    Catalog,

    /// Advisory fitness check for a prospective timeline entry
    Check {
        /// Teacher id
        teacher: Uuid,

        /// Start, "YYYY-MM-DD HH:MM" (UTC)
        start: String,

        /// End, "YYYY-MM-DD HH:MM" (UTC)
        end: String,
    },

    /// Buy the generic lesson of a kind
    Buy {
        /// Customer id
        customer: Uuid,

        /// Lesson kind (ordinary, with_native, master_class, happy_hour, paired)
        kind: String,
    },

    /// Buy a product bundle, fanning out its lesson credits
    BuySubscription {
        /// Customer id
        customer: Uuid,

        /// Product id from the catalog
        product: String,

        /// Purchase price in minor currency units
        #[arg(long, default_value_t = 0)]
        price: i64,
    },

    /// Craft a timeline entry for a teacher
    CreateEntry {
        /// Teacher id
        teacher: Uuid,

        /// Lesson id from the catalog
        lesson: String,

        /// Start, "YYYY-MM-DD HH:MM" (UTC)
        start: String,

        /// End; defaults to start plus the lesson duration
        #[arg(long)]
        end: Option<String>,

        /// Allow the entry to overlap existing ones
        #[arg(long)]
        allow_overlap: bool,

        /// Allow the entry outside the teacher's working hours
        #[arg(long)]
        besides_hours: bool,
    },

    /// Schedule a class into an entry, or straight onto a teacher's calendar
    Schedule {
        /// Class id
        class: Uuid,

        /// Existing timeline entry to take a slot in
        #[arg(long, conflicts_with_all = ["teacher", "start"])]
        entry: Option<Uuid>,

        /// Teacher for an auto-created private entry
        #[arg(long, requires = "start")]
        teacher: Option<Uuid>,

        /// Start for an auto-created private entry, "YYYY-MM-DD HH:MM" (UTC)
        #[arg(long, requires = "teacher")]
        start: Option<String>,

        /// Allow the auto-created entry outside working hours
        #[arg(long)]
        besides_hours: bool,
    },

    /// Take a scheduled class off its entry
    Unschedule {
        /// Class id
        class: Uuid,
    },

    /// Show store counts
    Status,
}

fn main() -> Result<()> {
    // Initialize logging
    lessons_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Commands::Catalog => cmd_catalog(&data_dir, &config),
        Commands::Check {
            teacher,
            start,
            end,
        } => cmd_check(&data_dir, &config, teacher, &start, &end),
        Commands::Buy { customer, kind } => cmd_buy(&data_dir, &config, customer, &kind),
        Commands::BuySubscription {
            customer,
            product,
            price,
        } => cmd_buy_subscription(&data_dir, &config, customer, &product, price),
        Commands::CreateEntry {
            teacher,
            lesson,
            start,
            end,
            allow_overlap,
            besides_hours,
        } => cmd_create_entry(
            &data_dir,
            &config,
            teacher,
            &lesson,
            &start,
            end.as_deref(),
            allow_overlap,
            besides_hours,
        ),
        Commands::Schedule {
            class,
            entry,
            teacher,
            start,
            besides_hours,
        } => cmd_schedule(
            &data_dir,
            &config,
            class,
            entry,
            teacher,
            start.as_deref(),
            besides_hours,
        ),
        Commands::Unschedule { class } => cmd_unschedule(&data_dir, &config, class),
        Commands::Status => cmd_status(&data_dir, &config),
    }
}

fn store_path(data_dir: &Path) -> PathBuf {
    data_dir.join("store.json")
}

/// Load the store and sync the external teacher roster into it
fn load_store(data_dir: &Path, config: &Config) -> Result<BookingStore> {
    let path = store_path(data_dir);

    let mut store = if path.exists() {
        BookingStore::load(&path)?
    } else {
        let catalog = config.build_catalog();
        let errors = catalog.validate();
        if !errors.is_empty() {
            eprintln!("Catalog validation errors:");
            for error in errors {
                eprintln!("  - {}", error);
            }
            return Err(Error::CatalogValidation("Invalid catalog".into()));
        }
        BookingStore::from_catalog(catalog)
    };

    let roster = load_teacher_roster(&data_dir.join("teachers.json"))?;
    for teacher in roster {
        store.upsert_teacher(teacher);
    }

    Ok(store)
}

fn parse_kind(s: &str) -> Result<LessonKind> {
    match s.to_lowercase().as_str() {
        "ordinary" => Ok(LessonKind::Ordinary),
        "with_native" => Ok(LessonKind::WithNative),
        "master_class" => Ok(LessonKind::MasterClass),
        "happy_hour" => Ok(LessonKind::HappyHour),
        "paired" => Ok(LessonKind::Paired),
        other => Err(Error::Config(format!("Unknown lesson kind: {}", other))),
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
        .map(|naive| naive.and_utc())
        .map_err(|_| {
            Error::Config(format!(
                "Invalid datetime '{}', expected \"YYYY-MM-DD HH:MM\"",
                s
            ))
        })
}

fn cmd_catalog(data_dir: &Path, config: &Config) -> Result<()> {
    let store = load_store(data_dir, config)?;

    println!("Lesson types available for purchase:");
    for kind in store.catalog.purchasable_kinds() {
        match store.catalog.default_lesson(kind) {
            Ok(lesson) => {
                let summary = serde_json::to_string(&lesson.summary(None))?;
                println!("  {}", summary);
            }
            Err(Error::NotPurchasableDirectly(_)) => {
                // Hosted kinds are listed, but only concrete events are bookable
                println!("  {:?}: configured per event by its host", kind);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

fn cmd_check(
    data_dir: &Path,
    config: &Config,
    teacher: Uuid,
    start: &str,
    end: &str,
) -> Result<()> {
    let store = load_store(data_dir, config)?;
    let check = store.check_entry(teacher, parse_datetime(start)?, parse_datetime(end)?)?;
    println!("{}", serde_json::to_string(&check)?);
    Ok(())
}

fn cmd_buy(data_dir: &Path, config: &Config, customer: Uuid, kind: &str) -> Result<()> {
    let kind = parse_kind(kind)?;
    let mut store = load_store(data_dir, config)?;

    let class_id = store.buy_default_lesson(customer, kind)?;
    store.save(&store_path(data_dir))?;

    println!("✓ Bought {:?} lesson: class {}", kind, class_id);
    Ok(())
}

fn cmd_buy_subscription(
    data_dir: &Path,
    config: &Config,
    customer: Uuid,
    product: &str,
    price: i64,
) -> Result<()> {
    let mut store = load_store(data_dir, config)?;

    let sub_id = store.buy_subscription(customer, product, price)?;
    let count = store.classes_for_subscription(sub_id).len();
    store.save(&store_path(data_dir))?;

    println!("✓ Bought subscription {}: {} classes", sub_id, count);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_create_entry(
    data_dir: &Path,
    config: &Config,
    teacher: Uuid,
    lesson: &str,
    start: &str,
    end: Option<&str>,
    allow_overlap: bool,
    besides_hours: bool,
) -> Result<()> {
    let mut store = load_store(data_dir, config)?;

    let end = end.map(parse_datetime).transpose()?;
    let entry_id = store.create_entry(
        teacher,
        lesson,
        parse_datetime(start)?,
        end,
        EntryOptions {
            allow_overlap: allow_overlap || config.scheduling.allow_overlap,
            allow_besides_working_hours: besides_hours
                || config.scheduling.allow_besides_working_hours,
        },
    )?;
    store.save(&store_path(data_dir))?;

    println!(
        "✓ Created timeline entry {} ({})",
        entry_id,
        store.entry_title(entry_id)?
    );
    Ok(())
}

fn cmd_schedule(
    data_dir: &Path,
    config: &Config,
    class: Uuid,
    entry: Option<Uuid>,
    teacher: Option<Uuid>,
    start: Option<&str>,
    besides_hours: bool,
) -> Result<()> {
    let mut store = load_store(data_dir, config)?;

    match (entry, teacher, start) {
        (Some(entry_id), _, _) => store.schedule(class, entry_id)?,
        (None, Some(teacher_id), Some(start)) => store.schedule_on(
            class,
            teacher_id,
            parse_datetime(start)?,
            besides_hours || config.scheduling.allow_besides_working_hours,
        )?,
        _ => {
            return Err(Error::Config(
                "Pass either --entry, or --teacher with --start".into(),
            ))
        }
    }

    store.save(&store_path(data_dir))?;
    println!("✓ Scheduled class {}", class);
    Ok(())
}

fn cmd_unschedule(data_dir: &Path, config: &Config, class: Uuid) -> Result<()> {
    let mut store = load_store(data_dir, config)?;

    store.unschedule(class)?;
    store.save(&store_path(data_dir))?;

    println!("✓ Unscheduled class {}", class);
    Ok(())
}

fn cmd_status(data_dir: &Path, config: &Config) -> Result<()> {
    let store = load_store(data_dir, config)?;

    let scheduled = store.classes.values().filter(|c| c.is_scheduled()).count();

    println!("teachers: {}", store.teachers.len());
    println!("lessons: {}", store.catalog.lessons.len());
    println!("subscriptions: {}", store.subscriptions.len());
    println!("classes: {} ({} scheduled)", store.classes.len(), scheduled);
    println!("timeline entries: {}", store.entries.len());

    Ok(())
}
