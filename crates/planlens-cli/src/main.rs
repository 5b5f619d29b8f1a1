//! CLI entry point: loads the mention table and renders the engine views.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use planlens_core::aggregate::{self, DictionaryFilter, DictionaryScope, PriorityFilter};
use planlens_core::drilldown;
use planlens_core::filter::FilterParams;
use planlens_core::page::{PAGE_SIZE, Pager, ViewKey, ViewLevel};
use planlens_core::session::AnalysisSession;

mod display;

#[derive(Parser)]
#[command(name = "planlens", version, about = "Development-plan recommendation analysis")]
struct Cli {
    /// Path to the mention table Parquet file.
    #[arg(long, env = "PLANLENS_DATA")]
    data: PathBuf,

    /// Restrict the analysis to one department.
    #[arg(long)]
    department: Option<String>,

    /// Restrict the analysis to one municipality.
    #[arg(long)]
    municipality: Option<String>,

    /// Minimum sentence similarity for a mention to qualify.
    #[arg(long, default_value_t = 0.6)]
    threshold: f64,

    /// Include sentences classified as non-policy content.
    #[arg(long)]
    all_classes: bool,

    /// Emit JSON instead of formatted output.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Comparative summary over the current filters.
    Summary,
    /// Municipality profile card with implementation metrics.
    Profile,
    /// Global municipality ranking.
    Ranking {
        /// Number of entries to show.
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
    /// Most frequently mentioned recommendations.
    Frequent {
        #[arg(long, default_value_t = 5)]
        k: usize,
    },
    /// Distinct implemented recommendations per topic.
    Topics,
    /// Recommendation dictionary with optional refinement.
    Dictionary {
        /// Case-insensitive search over code and text.
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        topic: Option<String>,
        #[arg(long, value_enum, default_value_t = PriorityArg::All)]
        priority: PriorityArg,
    },
    /// Recommendations with at least one qualifying mention.
    Recommendations,
    /// Paragraph drilldown for one recommendation.
    Paragraphs {
        code: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Sentence drilldown for one recommendation.
    Sentences {
        code: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PriorityArg {
    All,
    Prioritized,
    NotPrioritized,
}

impl From<PriorityArg> for PriorityFilter {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::All => Self::All,
            PriorityArg::Prioritized => Self::Prioritized,
            PriorityArg::NotPrioritized => Self::NotPrioritized,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::debug!("planlens v{}", env!("CARGO_PKG_VERSION"));
    let cli = Cli::parse();

    if !(0.0..=1.0).contains(&cli.threshold) {
        anyhow::bail!("threshold must lie in [0, 1], got {}", cli.threshold);
    }

    let table = planlens_store::load_mentions(&cli.data)
        .with_context(|| format!("loading mention table from {}", cli.data.display()))?;

    let params = FilterParams {
        policy_only: !cli.all_classes,
        department: cli.department.clone(),
        municipality: cli.municipality.clone(),
        threshold: cli.threshold,
    };
    let session = AnalysisSession::new(&table, params);
    let views = session.views();

    match &cli.command {
        Command::Summary => {
            let summary = session.summary();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                display::print_summary(&summary, session.params());
            }
        }
        Command::Profile => {
            if session.params().municipality.is_none() {
                anyhow::bail!("profile requires --municipality");
            }
            let profile = session.profile();
            let metrics = session.metrics();
            if cli.json {
                let value = serde_json::json!({ "profile": profile, "metrics": metrics });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                display::print_profile(profile.as_ref(), &metrics);
            }
        }
        Command::Ranking { top } => {
            let ranking = session.ranking();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(ranking.top(*top))?);
            } else {
                display::print_ranking(&ranking, *top, session.params().municipality.as_deref());
            }
        }
        Command::Frequent { k } => {
            let entries = aggregate::top_frequent(&views.qualifying, *k);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                display::print_frequency(&entries);
            }
        }
        Command::Topics => {
            let topics = aggregate::by_topic(&views.qualifying);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&topics)?);
            } else {
                display::print_topics(&topics);
            }
        }
        Command::Dictionary {
            search,
            topic,
            priority,
        } => {
            let scope = match session.params().municipality {
                Some(_) => DictionaryScope::Municipality,
                None => DictionaryScope::Global,
            };
            let filter = DictionaryFilter {
                search: search.clone(),
                topic: topic.clone(),
                priority: (*priority).into(),
            };
            let all = aggregate::dictionary(&views.base, scope);
            let total = all.len();
            let entries = aggregate::refine(all, &filter);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                display::print_dictionary(&entries, total);
            }
        }
        Command::Recommendations => {
            let refs = drilldown::available_recommendations(&views.qualifying);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&refs)?);
            } else {
                display::print_recommendations(&refs);
            }
        }
        Command::Paragraphs { code, page } => {
            let rows = drilldown::paragraph_view(&views.qualifying, code);
            let text = drilldown::recommendation_text(&views.qualifying, code);
            let mut pager = Pager::new(PAGE_SIZE);
            let key = ViewKey::new(code.clone(), ViewLevel::Paragraphs);
            pager.jump(&key, *page, rows.len());
            let window = pager.window(&key, rows.len());
            if cli.json {
                let value = serde_json::json!({
                    "window": window,
                    "rows": window.slice(&rows),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                display::print_paragraph_page(code, text, &window, window.slice(&rows));
            }
        }
        Command::Sentences { code, page } => {
            let rows = drilldown::sentence_view(&views.qualifying, code);
            let text = drilldown::recommendation_text(&views.qualifying, code);
            let mut pager = Pager::new(PAGE_SIZE);
            let key = ViewKey::new(code.clone(), ViewLevel::Sentences);
            pager.jump(&key, *page, rows.len());
            let window = pager.window(&key, rows.len());
            if cli.json {
                let value = serde_json::json!({
                    "window": window,
                    "rows": window.slice(&rows),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                display::print_sentence_page(code, text, &window, window.slice(&rows));
            }
        }
    }

    Ok(())
}
