mod batch;
mod display;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use obesity_ai::{InferenceContext, PipelineConfig, UnknownPolicy};
use obesity_core::{CategoricalAttribute, InputRecord, NumericAttribute};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "obesity")]
#[command(about = "Predict an obesity category from lifestyle and physical answers")]
#[command(version)]
struct Cli {
    /// Trained classifier (.json linear model or .onnx)
    #[arg(long, global = true, env = "OBESITY_MODEL")]
    model: Option<PathBuf>,

    /// Fitted scaler parameters (.json)
    #[arg(long, global = true, env = "OBESITY_SCALER")]
    scaler: Option<PathBuf>,

    /// Handling of categorical answers outside their domain: warn or reject
    #[arg(
        long,
        global = true,
        env = "OBESITY_ON_UNKNOWN",
        default_value_t = UnknownPolicy::Warn
    )]
    on_unknown: UnknownPolicy,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the category for one person
    Predict(PredictArgs),

    /// Predict every row of a CSV file with the dataset's column names
    PredictBatch {
        /// CSV file to read
        #[arg(long)]
        input: PathBuf,
    },

    /// Load and validate the artifacts
    Check,

    /// Print the encoding tables and the feature order
    Tables,
}

/// One record's answers. Unset flags take the form's defaults.
#[derive(Args)]
struct PredictArgs {
    /// Read the record from a JSON file; the answer flags are ignored
    #[arg(long)]
    input: Option<PathBuf>,

    /// Years, 1-120
    #[arg(long, default_value_t = NumericAttribute::Age.default_value())]
    age: f64,
    #[arg(long, default_value_t = first_option(CategoricalAttribute::Gender))]
    gender: String,
    /// Metres, 0.5-2.5
    #[arg(long, default_value_t = NumericAttribute::Height.default_value())]
    height: f64,
    /// Kilograms, 20-200
    #[arg(long, default_value_t = NumericAttribute::Weight.default_value())]
    weight: f64,
    /// Alcohol consumption (CALC)
    #[arg(long, default_value_t = first_option(CategoricalAttribute::AlcoholFrequency))]
    alcohol_frequency: String,
    /// Frequent high-calorie food (FAVC)
    #[arg(long, default_value_t = first_option(CategoricalAttribute::HighCalorieFood))]
    high_calorie_food: String,
    /// Vegetables in meals, 0-10 (FCVC)
    #[arg(long, default_value_t = NumericAttribute::VegetableFrequency.default_value())]
    vegetable_frequency: f64,
    /// Main meals per day, 1-10 (NCP)
    #[arg(long, default_value_t = NumericAttribute::MealsPerDay.default_value())]
    meals_per_day: f64,
    /// Calorie monitoring (SCC)
    #[arg(long, default_value_t = first_option(CategoricalAttribute::CalorieTracking))]
    calorie_tracking: String,
    #[arg(long, default_value_t = first_option(CategoricalAttribute::Smoker))]
    smoker: String,
    /// Litres of water per day, 0-5 (CH2O)
    #[arg(long, default_value_t = NumericAttribute::WaterIntake.default_value())]
    water_intake: f64,
    /// Family history of overweight
    #[arg(long, default_value_t = first_option(CategoricalAttribute::FamilyHistory))]
    family_history: String,
    /// Days of physical activity per week, 0-7 (FAF)
    #[arg(long, default_value_t = NumericAttribute::PhysicalActivity.default_value())]
    physical_activity: f64,
    /// Hours of device use per day, 0-5 (TUE)
    #[arg(long, default_value_t = NumericAttribute::ScreenTime.default_value())]
    screen_time: f64,
    /// Eating between meals (CAEC)
    #[arg(long, default_value_t = first_option(CategoricalAttribute::SnackingFrequency))]
    snacking_frequency: String,
    /// Main transportation (MTRANS)
    #[arg(long, default_value_t = first_option(CategoricalAttribute::Transportation))]
    transportation: String,
}

impl PredictArgs {
    fn record(&self) -> anyhow::Result<InputRecord> {
        if let Some(path) = &self.input {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            return serde_json::from_str(&text)
                .with_context(|| format!("parsing record from {}", path.display()));
        }

        Ok(InputRecord {
            age: self.age,
            gender: self.gender.clone(),
            height: self.height,
            weight: self.weight,
            alcohol_frequency: self.alcohol_frequency.clone(),
            high_calorie_food: self.high_calorie_food.clone(),
            vegetable_frequency: self.vegetable_frequency,
            meals_per_day: self.meals_per_day,
            calorie_tracking: self.calorie_tracking.clone(),
            smoker: self.smoker.clone(),
            water_intake: self.water_intake,
            family_history: self.family_history.clone(),
            physical_activity: self.physical_activity,
            screen_time: self.screen_time,
            snacking_frequency: self.snacking_frequency.clone(),
            transportation: self.transportation.clone(),
        })
    }
}

fn first_option(attribute: CategoricalAttribute) -> String {
    attribute.domain()[0].to_string()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("obesity v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();

    match &cli.command {
        Commands::Predict(args) => cmd_predict(&cli, args),
        Commands::PredictBatch { input } => cmd_predict_batch(&cli, input),
        Commands::Check => cmd_check(&cli),
        Commands::Tables => cmd_tables(&cli),
    }
}

/// Build the inference context once, before any input is read.
fn load_context(cli: &Cli) -> anyhow::Result<InferenceContext> {
    let model = cli
        .model
        .as_deref()
        .context("no model given (use --model or OBESITY_MODEL)")?;
    let scaler = cli
        .scaler
        .as_deref()
        .context("no scaler given (use --scaler or OBESITY_SCALER)")?;
    let config = PipelineConfig {
        on_unknown: cli.on_unknown,
    };
    InferenceContext::load(model, scaler, config).context("loading artifacts")
}

fn cmd_predict(cli: &Cli, args: &PredictArgs) -> anyhow::Result<()> {
    let ctx = load_context(cli)?;
    let record = args.record()?;

    // The pipeline trusts numeric ranges; the form enforced them, so we do too.
    let violations = record.range_violations();
    if !violations.is_empty() {
        bail!("{}", display::format_range_violations(&violations));
    }

    let result = ctx.predict(&record).context("prediction failed")?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", display::format_prediction(&result));
    }
    Ok(())
}

fn cmd_predict_batch(cli: &Cli, input: &Path) -> anyhow::Result<()> {
    let ctx = load_context(cli)?;
    let batches = batch::read_csv(input)?;
    let output = batch::predict_batches(&ctx, &batches)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output.rows_json())?);
    } else {
        println!("{}", batch::format_table(&output.batch)?);
    }
    eprintln!(
        "  {} rows, {} failed, {} unreliable in {:.2}s",
        output.stats.total_rows,
        output.stats.failed,
        output.stats.unreliable,
        output.stats.elapsed_secs
    );
    Ok(())
}

fn cmd_check(cli: &Cli) -> anyhow::Result<()> {
    let ctx = load_context(cli)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&display::check_json(&ctx))?);
    } else {
        print!("{}", display::format_check(&ctx));
    }
    Ok(())
}

fn cmd_tables(cli: &Cli) -> anyhow::Result<()> {
    let registry = obesity_core::EncodingRegistry::new().context("validating encoding tables")?;
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&display::tables_json(&registry))?
        );
    } else {
        print!("{}", display::format_tables(&registry));
    }
    Ok(())
}
