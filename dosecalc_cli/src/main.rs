use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use dosecalc_core::engine::schedule_name;
use dosecalc_core::*;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dosecalc")]
#[command(about = "Peptide reconstitution and dosing calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate units or dose, supply and reorder date
    Calc {
        #[command(flatten)]
        form: FormArgs,

        /// Print the full snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export a calendar reminder for the reorder date
    Remind {
        #[command(flatten)]
        form: FormArgs,

        /// Write the reminder to this file instead of the configured directory
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List quick-pick vial, water, dose and syringe values
    Presets,

    /// Print the config file location
    ConfigPath,
}

#[derive(Args)]
struct FormArgs {
    /// Calculation mode: "units" (dose -> units) or "dose" (units -> dose)
    #[arg(long, default_value = "units")]
    mode: CalculationMode,

    /// Vial mass in mg
    #[arg(long = "vial")]
    vial_mg: Option<f64>,

    /// Bacteriostatic water added, in ml
    #[arg(long = "water")]
    water_ml: Option<f64>,

    /// Syringe size in ml (0.3, 0.5 or 1.0)
    #[arg(long)]
    syringe: Option<SyringeSize>,

    /// Desired dose in mcg
    #[arg(long = "dose")]
    dose_mcg: Option<f64>,

    /// Compute the dose from body weight and mcg/kg
    #[arg(long)]
    weight_based: bool,

    /// Body weight in kg (weight-based dosing)
    #[arg(long = "body-weight")]
    body_weight_kg: Option<f64>,

    /// Dose rate in mcg per kg (weight-based dosing)
    #[arg(long)]
    mcg_per_kg: Option<f64>,

    /// Syringe units drawn (dose mode)
    #[arg(long)]
    units: Option<f64>,

    /// Cycle length in days, for the total mass needed
    #[arg(long)]
    cycle_days: Option<u32>,

    /// Dosing schedule: once-daily, twice-daily, once-daily-5days,
    /// 2-3x-week, every-other-day, custom
    #[arg(long)]
    schedule: Option<DosingSchedule>,

    /// Custom schedule: doses per week
    #[arg(long, conflicts_with = "days_between")]
    doses_per_week: Option<f64>,

    /// Custom schedule: days between doses
    #[arg(long)]
    days_between: Option<f64>,

    /// Doses already taken from this vial
    #[arg(long)]
    doses_used: Option<f64>,

    /// Current body weight in kg (tracking only)
    #[arg(long)]
    current_weight: Option<f64>,

    /// Target dose in mcg (tracking only)
    #[arg(long)]
    target_dose: Option<f64>,

    /// Project from this date instead of today (YYYY-MM-DD)
    #[arg(long, hide = true)]
    today: Option<NaiveDate>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        dosecalc_core::logging::init_with_level("debug");
    } else {
        dosecalc_core::logging::init_with_level("warn");
    }

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::debug!(
        "Defaults: syringe {} ml, schedule {}",
        config.defaults.syringe_ml,
        config.defaults.schedule.key()
    );

    match cli.command {
        Some(Commands::Calc { form, json }) => cmd_calc(form, json, &config),
        Some(Commands::Remind { form, out }) => cmd_remind(form, out, &config),
        Some(Commands::Presets) => {
            cmd_presets();
            Ok(())
        }
        Some(Commands::ConfigPath) => {
            let path = cli.config.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
            Ok(())
        }
        None => {
            println!("Nothing to do. Try `dosecalc calc --vial 10 --water 2 --dose 250`.");
            println!("Run `dosecalc --help` for all commands.");
            Ok(())
        }
    }
}

fn build_calculator(args: FormArgs, config: &Config) -> Result<Calculator> {
    let syringe = match args.syringe {
        Some(size) => size,
        None => config.defaults.syringe()?,
    };

    let mut custom = CustomFrequency::default();
    if let Some(per_week) = args.doses_per_week {
        custom.set_doses_per_week(per_week);
    }
    if let Some(days) = args.days_between {
        custom.set_days_between_doses(days);
    }

    // A custom rate without an explicit schedule means the custom schedule
    let schedule = match args.schedule {
        Some(schedule) => schedule,
        None if args.doses_per_week.is_some() || args.days_between.is_some() => {
            DosingSchedule::Custom
        }
        None => config.defaults.schedule,
    };

    let defaults = DoseForm::default();
    let form = DoseForm {
        mode: args.mode,
        vial_mg: args.vial_mg.unwrap_or(defaults.vial_mg),
        water_ml: args.water_ml.unwrap_or(defaults.water_ml),
        syringe,
        weight_based: args.weight_based,
        body_weight_kg: args.body_weight_kg.unwrap_or(defaults.body_weight_kg),
        mcg_per_kg: args.mcg_per_kg.unwrap_or(defaults.mcg_per_kg),
        desired_dose_mcg: args.dose_mcg.unwrap_or(defaults.desired_dose_mcg),
        syringe_units: args.units.unwrap_or(defaults.syringe_units),
        cycle_days: args.cycle_days.unwrap_or(defaults.cycle_days),
        schedule,
        custom,
        doses_used: args.doses_used.unwrap_or(defaults.doses_used).max(0.0),
        current_weight_kg: args.current_weight.unwrap_or(defaults.current_weight_kg),
        target_dose_mcg: args.target_dose.unwrap_or(defaults.target_dose_mcg),
    };

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    tracing::debug!("Form from flags: {:?}, projecting from {}", form, today);
    Ok(Calculator::new(form, today))
}

fn cmd_calc(args: FormArgs, json: bool, config: &Config) -> Result<()> {
    let calc = build_calculator(args, config)?;

    if json {
        let output = serde_json::json!({
            "form": calc.form(),
            "snapshot": calc.snapshot(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    display_report(calc.form(), calc.snapshot());
    Ok(())
}

fn cmd_remind(args: FormArgs, out: Option<PathBuf>, config: &Config) -> Result<()> {
    let calc = build_calculator(args, config)?;

    let event = match calc.reminder_event() {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Reminder export refused: {}", e);
            eprintln!(
                "No reminder to export: reorder date is '{}'.",
                calc.snapshot().projection.reorder.display_text()
            );
            return Err(e);
        }
    };

    print!("Generating calendar reminder...");
    io::stdout().flush()?;

    let pending = schedule_export(event, Utc::now(), &config.export);
    tracing::debug!("Waiting {} ms for export", config.export.delay_ms);
    let file = pending.wait()?;
    println!(" done");

    let path = match out {
        Some(path) => {
            file.write_to(&path)?;
            path
        }
        None => file.write_to_dir(&config.export.output_dir)?,
    };

    println!(
        "✓ Reminder for {} saved to {}",
        calc.snapshot().projection.reorder.display_text(),
        path.display()
    );
    Ok(())
}

fn cmd_presets() {
    let join = |values: &[f64], suffix: &str| {
        values
            .iter()
            .map(|v| format!("{}{}", v, suffix))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("Vial sizes:     {}", join(&presets::VIAL_SIZES_MG, "mg"));
    println!("Water volumes:  {}", join(&presets::WATER_VOLUMES_ML, "ml"));
    println!("Doses:          {}", join(&presets::DOSES_MCG, "mcg"));
    println!(
        "Syringes:       {}",
        presets::SYRINGES
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("  ")
    );
    println!(
        "Schedules:      {}",
        DosingSchedule::ALL
            .iter()
            .map(|s| s.key())
            .collect::<Vec<_>>()
            .join("  ")
    );
}

fn display_report(form: &DoseForm, snap: &Snapshot) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  PEPTIDE CALCULATOR");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", snap.result.label);
    println!("  {}", snap.result.main_text());

    if snap.result.capacity_exceeded {
        println!("  ⚠ Warning: Dose exceeds syringe capacity!");
    }
    if form.cycle_days > 0 && snap.result.total_mass_for_cycle_mg > 0.0 {
        println!(
            "  Total for {}-day cycle: {:.2} mg",
            form.cycle_days, snap.result.total_mass_for_cycle_mg
        );
    }

    println!();
    println!(
        "  Syringe {}  [{}] {:.1} Units",
        form.syringe,
        fill_bar(snap.syringe_fill_percent),
        snap.result.units
    );
    println!(
        "  Marks: {}",
        form.syringe
            .markers()
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    );

    if let Some(conc) = snap.concentration {
        println!();
        println!("  Concentration: {:.2} mg/ml", conc.mg_per_ml);
        println!("  Mcg per Unit: {:.2}", conc.mcg_per_unit);
    }

    let supply = &snap.supply;
    if supply.doses_in_vial > 0.0 {
        println!();
        println!("  Supply");
        if supply.depleted {
            println!("  ⚠ Supply depleted - time to reorder!");
        }
        println!(
            "  {:.1} / {:.1} doses ({:.1}% Remaining)",
            supply.doses_remaining, supply.doses_in_vial, supply.percent_remaining
        );
        println!(
            "  Current weight: {} kg   Target dose: {} mcg",
            form.current_weight_kg, form.target_dose_mcg
        );
    }

    let projection = &snap.projection;
    println!();
    println!(
        "  Schedule: {} ({} doses/week)",
        schedule_name(form),
        projection.doses_per_week
    );
    if form.schedule == DosingSchedule::Custom {
        println!(
            "  Every {} days",
            form.custom.days_between_doses()
        );
    }
    // Depletion replaces the reorder suggestion
    if projection.days_of_supply > 0.0 && !supply.depleted {
        println!("  Days of supply: {:.1} days", projection.days_of_supply);
        println!("  Reorder date: {}", projection.reorder.display_text());
    }

    if !snap.validation.is_valid() {
        println!();
        println!("  Check inputs:");
        for (field, message) in snap.validation.iter() {
            println!("    - {}: {}", field, message);
        }
    }

    println!();
}

fn fill_bar(percent: f64) -> String {
    const WIDTH: usize = 20;
    let filled = ((percent / 100.0) * WIDTH as f64).round() as usize;
    let filled = filled.min(WIDTH);
    format!("{}{}", "█".repeat(filled), "·".repeat(WIDTH - filled))
}
