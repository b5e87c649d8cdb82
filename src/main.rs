use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use fitlab::activity::{
    ActivityEntry, FoodPayload, MealType, NewActivityLog, SkillPayload, StrengthPayload, StrengthSet,
};
use fitlab::auth::{bearer_token, IdentityResolver};
use fitlab::config::AppConfig;
use fitlab::exercises::{performed_exercises, ActivityDayKind, Exercise, ExerciseCategory, MuscleGroup, NewExercise};
use fitlab::export::{export_heatmap, heatmap_to_json, ExportFormat};
use fitlab::heatmap::HeatmapColor;
use fitlab::logging::init_logging;
use fitlab::models::{ActivityLevel, Goal, Sex, UserProfile};
use fitlab::muscles::{MuscleId, EXERCISE_MUSCLE_MAP};
use fitlab::onboarding::OnboardingForm;
use fitlab::programs::{program_by_id, program_for_level, ProgramTemplate};
use fitlab::recipes::{recipes_for_goal, Recipe};
use fitlab::recovery::hours_since;
use fitlab::store::SqliteStore;
use fitlab::tracker::Tracker;
use fitlab::FitLabError;

/// FitLab - Strength and nutrition tracking CLI
///
/// Logs workouts and meals, shows which muscles are still recovering and
/// derives daily calorie and macro targets from an onboarding profile.
#[derive(Parser)]
#[command(name = "fitlab")]
#[command(version)]
#[command(about = "Strength, recovery and nutrition tracking CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Act as this user id
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Identity token, raw or as "Bearer <token>"
    #[arg(long, global = true, conflicts_with = "user")]
    token: Option<String>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the muscle catalog
    Muscles {
        /// Show the exercise-to-muscle table instead
        #[arg(short, long)]
        exercises: bool,
    },

    /// Record an activity
    Log {
        #[command(subcommand)]
        kind: LogCommand,
    },

    /// Browse the exercise library or add a custom exercise
    Exercises {
        #[command(subcommand)]
        action: Option<ExerciseCommand>,
    },

    /// Activity calendar and per-exercise history
    Progress {
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Show the sessions of this exercise or drill instead
        #[arg(short, long)]
        exercise: Option<String>,
    },

    /// Show the logs of one day
    Logs {
        /// Day to show (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Delete a log by id
    DeleteLog {
        id: String,
    },

    /// Show the muscle recovery heatmap
    Heatmap {
        /// Evaluate at this instant instead of now (RFC 3339)
        #[arg(long)]
        at: Option<DateTime<Utc>>,

        /// Write the heatmap to a .csv or .json file
        #[arg(short, long, value_name = "FILE")]
        export: Option<PathBuf>,

        /// Print the heatmap as JSON
        #[arg(long, conflicts_with = "export")]
        json: bool,
    },

    /// Complete onboarding and compute daily targets
    Onboard {
        #[arg(long)]
        sex: Sex,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: String,

        /// Height in centimeters
        #[arg(long)]
        height: Decimal,

        /// Weight in kilograms
        #[arg(long)]
        weight: Decimal,

        /// sedentary, lightly_active, moderately_active, very_active or extremely_active
        #[arg(long)]
        activity: ActivityLevel,

        /// cut, maintain or bulk
        #[arg(long)]
        goal: Goal,
    },

    /// Show the stored profile
    Profile,

    /// Show a workout program
    Program {
        /// Program chosen for this activity level
        #[arg(short, long, conflicts_with = "id")]
        level: Option<ActivityLevel>,

        /// Program template id
        #[arg(long)]
        id: Option<String>,
    },

    /// Recommend recipes
    Recipes {
        /// Goal to recommend for (default: profile goal)
        #[arg(short, long)]
        goal: Option<Goal>,
    },

    /// Nutrition summary for one day
    Summary {
        /// Day to summarize (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Remove every stored document of the current user
    DeleteUser {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Configure application settings
    Config {
        /// Write a default config file
        #[arg(long)]
        init: bool,

        /// Print the effective configuration
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
enum ExerciseCommand {
    /// Add a custom exercise to your library
    Add {
        name: String,

        /// strength, skill or food
        #[arg(long, default_value = "strength")]
        category: ExerciseCategory,

        /// chest, back, legs, core, cardio or skill
        #[arg(long)]
        group: Option<MuscleGroup>,
    },
}

#[derive(Subcommand)]
enum LogCommand {
    /// Weight training
    Strength {
        /// Exercise name, e.g. "Bench Press"
        exercise: String,

        /// Exercise id (defaults to the slugged name)
        #[arg(long)]
        exercise_id: Option<String>,

        /// Working set as WEIGHTxREPS, e.g. 80x5 (repeatable)
        #[arg(short, long = "set", value_parser = parse_set)]
        sets: Vec<StrengthSet>,

        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Skill drill such as free throws
    Skill {
        drill: String,

        #[arg(short, long)]
        attempts: u32,

        #[arg(short, long)]
        made: u32,

        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Food eaten
    Food {
        food: String,

        /// breakfast, lunch or dinner
        #[arg(long, value_parser = parse_meal)]
        meal: MealType,

        /// Portion weight in grams
        #[arg(short, long)]
        weight: Decimal,

        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

fn parse_set(raw: &str) -> std::result::Result<StrengthSet, String> {
    let (weight, reps) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WEIGHTxREPS, got '{}'", raw))?;
    let weight = weight
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("invalid weight '{}': {}", weight, e))?;
    let reps = reps
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid reps '{}': {}", reps, e))?;
    Ok(StrengthSet { weight, reps })
}

fn parse_meal(raw: &str) -> std::result::Result<MealType, String> {
    match raw.to_lowercase().as_str() {
        "breakfast" => Ok(MealType::Breakfast),
        "lunch" => Ok(MealType::Lunch),
        "dinner" => Ok(MealType::Dinner),
        _ => Err(format!("unknown meal '{}'", raw)),
    }
}

#[derive(Tabled)]
struct MuscleRow {
    #[tabled(rename = "Id")]
    id: &'static str,
    #[tabled(rename = "Muscle")]
    label: &'static str,
}

#[derive(Tabled)]
struct ExerciseRow {
    #[tabled(rename = "Exercise")]
    exercise: &'static str,
    #[tabled(rename = "Muscles")]
    muscles: String,
}

#[derive(Tabled)]
struct LibraryRow {
    #[tabled(rename = "Exercise")]
    name: String,
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Group")]
    group: &'static str,
    #[tabled(rename = "Owner")]
    owner: String,
}

#[derive(Tabled)]
struct ProgressRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Success %")]
    success_rate: String,
}

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Details")]
    details: String,
}

#[derive(Tabled)]
struct ProgramRow {
    #[tabled(rename = "Day")]
    day: &'static str,
    #[tabled(rename = "Exercise")]
    exercise: &'static str,
    #[tabled(rename = "Sets")]
    sets: u8,
    #[tabled(rename = "Reps")]
    reps: &'static str,
}

#[derive(Tabled)]
struct RecipeRow {
    #[tabled(rename = "Recipe")]
    name: &'static str,
    #[tabled(rename = "Meal")]
    meal: String,
    #[tabled(rename = "kcal")]
    calories: u32,
    #[tabled(rename = "P")]
    protein_g: u32,
    #[tabled(rename = "C")]
    carbs_g: u32,
    #[tabled(rename = "F")]
    fat_g: u32,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<FitLabError>() {
            Some(err) => eprintln!("{} {}", "✗".red().bold(), err.user_message()),
            None => eprintln!("{} {:#}", "✗".red().bold(), e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);
    let mut config = match (&cli.config, &cli.command) {
        (Some(path), Commands::Config { init: true, .. }) => AppConfig::load_for_init(path)?,
        (Some(path), _) => AppConfig::load_from_file(path)?,
        (None, _) => AppConfig::load_or_default(),
    };

    init_logging(&config.logging.clone().with_verbosity(cli.verbose))?;

    let uid = match (&cli.user, &cli.token) {
        (Some(user), _) => user.clone(),
        (None, Some(token)) => {
            let token = if token.contains(' ') { bearer_token(token)? } else { token.as_str() };
            config.token_resolver().resolve(token)?
        }
        (None, None) => config.settings.default_user.clone(),
    };
    tracing::debug!(user_id = %uid, "Resolved user");

    // Commands that never touch the store
    match &cli.command {
        Commands::Muscles { exercises } => {
            print_muscles(*exercises);
            return Ok(());
        }
        Commands::Config { init, show } => {
            if *init {
                config.save_to_file(&config_path)?;
                println!("{} Wrote {}", "✓".green(), config_path.display());
            }
            if *show || !*init {
                let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
                println!("{}", format!("# {}", config_path.display()).dimmed());
                println!("{}", rendered);
            }
            return Ok(());
        }
        Commands::Program { level: Some(level), .. } => {
            print_program(program_for_level(*level));
            return Ok(());
        }
        Commands::Program { id: Some(id), .. } => {
            let program = program_by_id(id).ok_or_else(|| FitLabError::NotFound(format!("program '{}'", id)))?;
            print_program(program);
            return Ok(());
        }
        Commands::Recipes { goal: Some(goal) } => {
            print_recipes(*goal, &recipes_for_goal(*goal));
            return Ok(());
        }
        _ => {}
    }

    let db_path = config.database_path();
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to open store at {}", db_path.display()))?;
    let tracker = Tracker::new(store).with_merge_policy(config.recovery.merge_policy);

    let now = Utc::now();
    let today = now.date_naive();

    match cli.command {
        Commands::Log { kind } => {
            let log = new_log(kind, today);
            let stored = tracker.create_log(&uid, log, now)?;
            println!("{} Logged {} ({})", "✓".green(), stored.entry.kind().bold(), stored.id.dimmed());

            if let Some(exercise) = stored.entry.trained_exercise() {
                let muscles = fitlab::muscles::muscles_for_exercise(exercise);
                if muscles.is_empty() {
                    println!("  {}", "No muscles tracked for this activity".dimmed());
                } else {
                    let labels: Vec<&str> = muscles.iter().map(|m| m.label()).collect();
                    println!("  Trained: {}", labels.join(", ").red());
                }
            }
        }

        Commands::Exercises { action: None } => {
            let exercises = tracker.list_exercises(&uid)?;
            print_library(&exercises);
        }

        Commands::Exercises {
            action: Some(ExerciseCommand::Add { name, category, group }),
        } => {
            let exercise = tracker.create_exercise(
                &uid,
                NewExercise {
                    name,
                    category,
                    muscle_group: group,
                },
            )?;
            println!("{} Added {} ({})", "✓".green(), exercise.name.bold(), exercise.id.dimmed());
        }

        Commands::Progress { from, to, exercise: Some(exercise) } => {
            let mut points = tracker.performance(&uid, &exercise)?;
            points.retain(|p| from.map_or(true, |from| p.date >= from) && to.map_or(true, |to| p.date <= to));
            println!("{}", format!("{} sessions", exercise).bold());
            if points.is_empty() {
                println!("  {}", "No sessions logged".dimmed());
                let logged = performed_exercises(&tracker.all_logs(&uid)?);
                if !logged.is_empty() {
                    println!("  Logged so far: {}", logged.join(", "));
                }
            } else {
                let rows: Vec<ProgressRow> = points
                    .iter()
                    .map(|point| ProgressRow {
                        date: point.date.to_string(),
                        volume: point.volume.normalize().to_string(),
                        success_rate: point.success_rate.map(|rate| format!("{}%", rate)).unwrap_or_default(),
                    })
                    .collect();
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
        }

        Commands::Progress { from, to, exercise: None } => {
            let progress = tracker.progress(&uid, from, to)?;
            println!("{}", "Activity calendar".bold());
            for (date, kind) in &progress.days {
                let label = match kind {
                    ActivityDayKind::Both => "workout + skill".yellow(),
                    ActivityDayKind::WorkoutOnly => "workout".blue(),
                    ActivityDayKind::SkillOnly => "skill".purple(),
                };
                println!("  {}  {}", date, label);
            }
            println!(
                "\n  {} workouts, {} skill sessions, {} active days",
                progress.total_workouts.to_string().bold(),
                progress.total_skills.to_string().bold(),
                progress.active_days().to_string().bold()
            );
        }

        Commands::Logs { date } => {
            let date = date.unwrap_or(today);
            let logs = tracker.logs_for_date(&uid, date)?;
            println!("{}", format!("Logs for {}", date).bold());
            if logs.is_empty() {
                println!("  {}", "Nothing logged".dimmed());
            } else {
                let rows: Vec<LogRow> = logs
                    .iter()
                    .map(|log| LogRow {
                        id: log.id.clone(),
                        time: log.created_at.format("%H:%M").to_string(),
                        kind: log.entry.kind(),
                        details: describe_entry(&log.entry),
                    })
                    .collect();
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
        }

        Commands::DeleteLog { id } => {
            tracker.delete_log(&uid, &id)?;
            println!("{} Deleted log {}", "✓".green(), id);
        }

        Commands::Heatmap { at, export, json } => {
            let at = at.unwrap_or(now);
            let heatmap = tracker.heatmap(&uid, at)?;
            if let Some(path) = export {
                let format = ExportFormat::from_path(&path)?;
                export_heatmap(&heatmap, format, &path)?;
                println!("{} Exported heatmap to {}", "✓".green(), path.display());
            } else if json {
                println!("{}", heatmap_to_json(&heatmap));
            } else {
                let recovery = tracker.muscle_recovery(&uid)?;
                println!("{}", "Muscle recovery".bold());
                for (muscle, color) in heatmap.iter() {
                    let since = match hours_since(muscle, &recovery, at) {
                        Some(hours) if hours < 0.0 => "trained in the future".to_string(),
                        Some(hours) => format!("trained {:.0}h ago", hours),
                        None => String::new(),
                    };
                    println!("  {:<12} {} {}", muscle.label(), paint(color), since.dimmed());
                }
                let counts = heatmap.counts();
                println!(
                    "\n  {} sore, {} recovering, {} ready",
                    counts.red.to_string().red(),
                    counts.yellow.to_string().yellow(),
                    counts.green.to_string().green()
                );
            }
        }

        Commands::Onboard { sex, dob, height, weight, activity, goal } => {
            let form = OnboardingForm {
                sex,
                dob,
                height_cm: height,
                weight_kg: weight,
                activity_level: activity,
                goal,
            };
            let profile = tracker.complete_onboarding(&uid, &form, today)?;
            println!("{}", "✓ Onboarding complete".green().bold());
            print_profile(&profile);
        }

        Commands::Profile => match tracker.profile(&uid)? {
            Some(profile) => print_profile(&profile),
            None => println!("{}", "No profile yet. Run `fitlab onboard` first.".yellow()),
        },

        Commands::Program { .. } => print_program(tracker.program(&uid)?),

        Commands::Recipes { .. } => {
            let profile = tracker.profile(&uid)?;
            let recipes = tracker.recommended_recipes(&uid)?;
            if let Some(profile) = profile {
                print_recipes(profile.goal, &recipes);
            }
        }

        Commands::Summary { date } => {
            let summary = tracker.daily_summary(&uid, date.unwrap_or(today))?;
            println!("{}", format!("Nutrition for {}", summary.date).bold());
            println!(
                "  Consumed: {} kcal, {}g protein, {}g carbs, {}g fat ({} entries)",
                summary.consumed.calories.normalize(),
                summary.consumed.protein_g,
                summary.consumed.carbs_g,
                summary.consumed.fat_g,
                summary.food_logs
            );
            match (summary.target, summary.remaining_calories) {
                (Some(target), Some(remaining)) => {
                    println!(
                        "  Target:   {} kcal, {}g protein, {}g carbs, {}g fat",
                        target.daily_calories, target.protein_g, target.carbs_g, target.fat_g
                    );
                    let remaining_text = format!("{} kcal remaining", remaining);
                    if remaining < 0 {
                        println!("  {}", remaining_text.red());
                    } else {
                        println!("  {}", remaining_text.green());
                    }
                }
                _ => println!("  {}", "No targets yet. Run `fitlab onboard` first.".dimmed()),
            }
        }

        Commands::DeleteUser { yes } => {
            if !yes {
                println!("{}", format!("Pass --yes to delete all data of '{}'", uid).yellow());
            } else {
                let removed = tracker.delete_user(&uid)?;
                println!("{} Removed {} documents", "✓".green(), removed);
            }
        }

        Commands::Muscles { .. } | Commands::Config { .. } => {}
    }

    Ok(())
}

fn new_log(kind: LogCommand, today: NaiveDate) -> NewActivityLog {
    match kind {
        LogCommand::Strength { exercise, exercise_id, sets, date } => {
            let exercise_id =
                exercise_id.unwrap_or_else(|| exercise.to_lowercase().replace(' ', "_"));
            NewActivityLog::new(
                date.unwrap_or(today),
                ActivityEntry::Strength(StrengthPayload {
                    exercise_id,
                    exercise_name: exercise,
                    sets,
                }),
            )
        }
        LogCommand::Skill { drill, attempts, made, date } => NewActivityLog::new(
            date.unwrap_or(today),
            ActivityEntry::Skill(SkillPayload {
                drill_name: drill,
                attempts,
                made,
            }),
        ),
        LogCommand::Food { food, meal, weight, date } => NewActivityLog::new(
            date.unwrap_or(today),
            ActivityEntry::Food(FoodPayload {
                meal_type: meal,
                food_name: food,
                weight,
            }),
        ),
    }
}

fn describe_entry(entry: &ActivityEntry) -> String {
    match entry {
        ActivityEntry::Strength(payload) => {
            let sets: Vec<String> = payload
                .sets
                .iter()
                .map(|set| format!("{}x{}", set.weight.normalize(), set.reps))
                .collect();
            format!("{} [{}]", payload.exercise_name, sets.join(", "))
        }
        ActivityEntry::Skill(payload) => {
            format!("{} {}/{}", payload.drill_name, payload.made, payload.attempts)
        }
        ActivityEntry::Food(payload) => {
            format!("{:?}: {} {}g", payload.meal_type, payload.food_name, payload.weight.normalize())
        }
    }
}

fn paint(color: HeatmapColor) -> ColoredString {
    let text = format!("{} ({})", color.status(), color.hex());
    match color {
        HeatmapColor::Red => text.red(),
        HeatmapColor::Yellow => text.yellow(),
        HeatmapColor::Green => text.green(),
    }
}

fn print_muscles(exercises: bool) {
    if exercises {
        let rows: Vec<ExerciseRow> = EXERCISE_MUSCLE_MAP
            .iter()
            .map(|(exercise, muscles)| ExerciseRow {
                exercise: *exercise,
                muscles: muscles.iter().map(|m| m.label()).collect::<Vec<_>>().join(", "),
            })
            .collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
    } else {
        let rows: Vec<MuscleRow> = MuscleId::ALL
            .iter()
            .map(|m| MuscleRow {
                id: m.id(),
                label: m.label(),
            })
            .collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
    }
}

fn print_library(exercises: &[Exercise]) {
    let rows: Vec<LibraryRow> = exercises
        .iter()
        .map(|exercise| LibraryRow {
            name: exercise.name.clone(),
            category: exercise.category.as_str(),
            group: exercise.muscle_group.map(|group| group.as_str()).unwrap_or("-"),
            owner: if exercise.is_system() { "system".to_string() } else { "you".to_string() },
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn print_profile(profile: &UserProfile) {
    println!("  Sex:       {}", profile.sex);
    println!("  Born:      {}", profile.dob);
    println!("  Height:    {} cm", profile.height_cm.normalize());
    println!("  Weight:    {} kg", profile.weight_kg.normalize());
    println!("  Activity:  {}", profile.activity_level);
    println!("  Goal:      {}", profile.goal);
    println!("  BMR:       {} kcal", profile.bmr);
    println!("  TDEE:      {} kcal", profile.tdee);
    let target = profile.macros_target;
    println!(
        "  Target:    {} kcal ({}g protein, {}g carbs, {}g fat)",
        target.daily_calories.to_string().bold(),
        target.protein_g,
        target.carbs_g,
        target.fat_g
    );
    println!("  Program:   {}", profile.program_id.cyan());
}

fn print_program(program: &ProgramTemplate) {
    println!("{} {}", program.name.bold(), format!("({})", program.level).dimmed());
    println!("{}", program.description);
    let rows: Vec<ProgramRow> = program
        .days
        .iter()
        .flat_map(|day| {
            day.exercises.iter().map(move |exercise| ProgramRow {
                day: day.day_name,
                exercise: exercise.exercise_name,
                sets: exercise.sets,
                reps: exercise.reps,
            })
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
    println!("{}", format!("{} sets per week", program.total_sets()).dimmed());
}

fn print_recipes(goal: Goal, recipes: &[&Recipe]) {
    println!("{}", format!("Recipes for {}", goal).bold());
    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|recipe| RecipeRow {
            name: recipe.name,
            meal: format!("{:?}", recipe.meal_type).to_lowercase(),
            calories: recipe.calories,
            protein_g: recipe.protein_g,
            carbs_g: recipe.carbs_g,
            fat_g: recipe.fat_g,
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
}
