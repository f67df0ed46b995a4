use crate::infra::load_catalog;
use clap::Args;
use rengas_guru::catalog::{
    analyze_metric, brand_report, metric_distribution, validate_catalog, CatalogMetric,
    CatalogQuery, ProductRecord, RawField, Season,
};
use rengas_guru::config::{AppConfig, RoundingPolicy};
use rengas_guru::error::AppError;
use rengas_guru::scoring::{
    rank_catalog, renormalize, Criterion, PreferenceSet, RankedCatalog, SortColumn, SortState,
};
use rengas_guru::telemetry;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Catalog CSV export to rank
    #[arg(long)]
    pub(crate) catalog: PathBuf,
    #[command(flatten)]
    pub(crate) weights: WeightArgs,
    #[command(flatten)]
    pub(crate) filters: FilterArgs,
    /// Column to sort by; repeat a column to flip its direction
    #[arg(long = "sort")]
    pub(crate) sort: Vec<SortColumn>,
    /// Skip scoring and keep catalog order
    #[arg(long)]
    pub(crate) unscored: bool,
    /// Emit the ranked catalog as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

/// Slider positions. Unset sliders count as 0 when any is given; none given means equal weights.
#[derive(Args, Debug, Default)]
pub(crate) struct WeightArgs {
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub(crate) price: Option<u8>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub(crate) wet_grip: Option<u8>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub(crate) fuel_efficiency: Option<u8>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub(crate) satisfaction: Option<u8>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub(crate) noise: Option<u8>,
}

impl WeightArgs {
    pub(crate) fn preferences(&self, rounding: RoundingPolicy) -> PreferenceSet {
        let sliders = [
            self.price,
            self.wet_grip,
            self.fuel_efficiency,
            self.satisfaction,
            self.noise,
        ];
        if sliders.iter().all(Option::is_none) {
            return PreferenceSet::default();
        }

        let candidate = PreferenceSet::from_weights(sliders.map(|weight| weight.unwrap_or(0)));
        renormalize(&candidate, rounding)
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct FilterArgs {
    /// Only compare tires of this season (summer/So/Su or winter/Wi/Ta)
    #[arg(long)]
    pub(crate) season: Option<Season>,
    #[arg(long)]
    pub(crate) rim_size: Option<f64>,
    #[arg(long)]
    pub(crate) width: Option<f64>,
    #[arg(long)]
    pub(crate) profile: Option<f64>,
}

impl FilterArgs {
    pub(crate) fn query(&self) -> CatalogQuery {
        CatalogQuery {
            season: self.season,
            rim_size: self.rim_size,
            width: self.width,
            profile: self.profile,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Catalog CSV export to inspect
    #[arg(long)]
    pub(crate) catalog: PathBuf,
    /// price, noise_level, width, profile or rim_size
    #[arg(long)]
    pub(crate) metric: CatalogMetric,
    #[arg(long)]
    pub(crate) season: Option<Season>,
}

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Catalog CSV export to check
    #[arg(long)]
    pub(crate) catalog: PathBuf,
}

/// Configuration for a one-shot command, with the log subscriber installed.
fn command_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let config = command_config()?;
    let records = load_catalog(&args.catalog, &args.filters.query())?;

    let preferences =
        (!args.unscored).then(|| args.weights.preferences(config.scoring.rounding));
    let sort = sort_from_selections(&args.sort);
    let ranked = rank_catalog(&records, preferences.as_ref(), &config.scoring, sort);

    if args.json {
        match serde_json::to_string_pretty(&ranked) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Ranked catalog unavailable as JSON: {err}"),
        }
        return Ok(());
    }

    render_ranking(&ranked, preferences.as_ref());
    Ok(())
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = command_config()?;
    let query = CatalogQuery {
        season: args.season,
        ..CatalogQuery::default()
    };
    let records = load_catalog(&args.catalog, &query)?;

    let summary = analyze_metric(&records, args.metric, &config.scoring);
    println!("Catalog metric: {}", summary.metric);
    println!("- {} of {} records carry a value", summary.total, records.len());
    match (summary.min, summary.max, summary.average) {
        (Some(min), Some(max), Some(average)) => {
            println!("- min {min:.1} | max {max:.1} | average {average:.1}");
        }
        _ => println!("- no numeric values found"),
    }
    println!(
        "- season mix: {} summer / {} winter",
        summary.season_breakdown.summer, summary.season_breakdown.winter
    );

    let distribution = metric_distribution(&records, args.metric, &config.scoring);
    if !distribution.is_empty() {
        println!("Distribution:");
        for bucket in distribution {
            println!("  {:>6} {}", bucket.value, "#".repeat(bucket.count));
        }
    }

    println!("Brands:");
    for brand in brand_report(&records) {
        println!(
            "  - {}: {} ({} summer / {} winter)",
            brand.brand, brand.total, brand.seasons.summer, brand.seasons.winter
        );
    }

    Ok(())
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let config = command_config()?;
    let records = load_catalog(&args.catalog, &CatalogQuery::default())?;
    let report = validate_catalog(&records);

    if report.is_empty() {
        println!("All {} records passed validation", records.len());
        return Ok(());
    }

    println!(
        "{} of {} records need attention",
        report.len(),
        records.len()
    );
    for entry in report {
        let issues: Vec<String> = entry.issues.iter().map(ToString::to_string).collect();
        println!("- {}: {}", entry.id, issues.join("; "));
    }
    Ok(())
}

/// Replays header clicks on top of the default ordering.
pub(crate) fn sort_from_selections(columns: &[SortColumn]) -> SortState {
    columns
        .iter()
        .fold(SortState::default(), |state, column| state.select(*column))
}

fn render_ranking(ranked: &RankedCatalog, preferences: Option<&PreferenceSet>) {
    match preferences {
        Some(preferences) => {
            let weights: Vec<String> = Criterion::ALL
                .iter()
                .map(|criterion| format!("{} {}", criterion.label(), preferences.get(*criterion)))
                .collect();
            println!("Preferences: {}", weights.join(" | "));
        }
        None => println!("Preferences: none (unscored)"),
    }
    println!(
        "Sorted by {:?} ({:?}), {} tires",
        ranked.sort.column,
        ranked.sort.direction,
        ranked.entries.len()
    );

    for entry in &ranked.entries {
        let record = &entry.record;
        println!(
            "{:>3}. [{:>3}] {} | {} | price {} | wet {} | fuel {} | noise {} | rating {}",
            entry.rank,
            entry.attractiveness,
            product_name(record),
            record.size_label().unwrap_or_else(|| "-".to_string()),
            raw_or_dash(record.price.as_ref()),
            record.wet_grip.as_deref().unwrap_or("-"),
            record.fuel_efficiency.as_deref().unwrap_or("-"),
            raw_or_dash(record.noise_level.as_ref()),
            raw_or_dash(record.user_rating.as_ref()),
        );
    }
}

fn product_name(record: &ProductRecord) -> String {
    match (record.brand.as_deref(), record.model.as_deref()) {
        (Some(brand), Some(model)) => format!("{brand} {model}"),
        (Some(name), None) | (None, Some(name)) => name.to_string(),
        (None, None) => record.id.clone(),
    }
}

fn raw_or_dash(raw: Option<&RawField>) -> String {
    raw.map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rengas_guru::scoring::SortDirection;

    #[test]
    fn commands_install_the_log_subscriber() {
        let config = command_config().expect("config loads and logging starts");
        assert!(tracing::dispatcher::has_been_set());
        assert!(!config.telemetry.log_level.is_empty());
    }

    #[test]
    fn no_sliders_means_equal_weights() {
        let weights = WeightArgs::default();
        assert_eq!(
            weights.preferences(RoundingPolicy::LargestRemainder),
            PreferenceSet::default()
        );
    }

    #[test]
    fn partial_sliders_are_rescaled_to_one_hundred() {
        let weights = WeightArgs {
            price: Some(60),
            noise: Some(20),
            ..WeightArgs::default()
        };
        let preferences = weights.preferences(RoundingPolicy::LargestRemainder);
        assert_eq!(preferences.weights(), [75, 0, 0, 0, 25]);
    }

    #[test]
    fn repeated_sort_selection_flips_direction() {
        assert_eq!(sort_from_selections(&[]), SortState::default());
        let sort = sort_from_selections(&[SortColumn::Price, SortColumn::Price]);
        assert_eq!(sort, SortState::new(SortColumn::Price, SortDirection::Descending));
        let sort = sort_from_selections(&[SortColumn::Price, SortColumn::Brand]);
        assert_eq!(sort, SortState::new(SortColumn::Brand, SortDirection::Ascending));
    }

    #[test]
    fn filters_become_a_catalog_query() {
        let filters = FilterArgs {
            season: Some(Season::Winter),
            width: Some(205.0),
            ..FilterArgs::default()
        };
        let query = filters.query();
        assert_eq!(query.season, Some(Season::Winter));
        assert_eq!(query.width, Some(205.0));
        assert!(query.rim_size.is_none());
    }

    #[test]
    fn product_names_fall_back_to_id() {
        let mut record = ProductRecord::new("sku-9");
        assert_eq!(product_name(&record), "sku-9");
        record.brand = Some("Nokian".to_string());
        record.model = Some("Hakka Green 3".to_string());
        assert_eq!(product_name(&record), "Nokian Hakka Green 3");
    }
}
