//! Terminal rendering for the engine views.
//!
//! Vertical cards and aligned tables; every list states how much of the
//! underlying view it shows.

use planlens_core::aggregate::{Coverage, DictionaryEntry, FrequencyEntry, TopicEntry};
use planlens_core::drilldown::{ParagraphRow, RecommendationRef, SentenceRow};
use planlens_core::filter::FilterParams;
use planlens_core::page::PageWindow;
use planlens_core::rank::Ranking;
use planlens_core::session::{ComparativeSummary, ImplementationMetrics, MunicipalityProfile};

const MAX_TEXT_WIDTH: usize = 76;

pub fn print_summary(summary: &ComparativeSummary, params: &FilterParams) {
    println!("=== Comparative summary ===");
    match params.department.as_deref() {
        Some(department) => println!("Department: {department}"),
        None => println!("All departments"),
    }
    println!();
    println!("  {:<26} {}", "municipalities", summary.municipalities);
    println!("  {:<26} {}", "departments", summary.departments);
    println!("  {:<26} {}", "recommendations", summary.recommendations);
    match summary.mean_similarity {
        Some(mean) => println!("  {:<26} {:.3}", "mean similarity", mean),
        None => println!("  {:<26} N/A", "mean similarity"),
    }
}

pub fn print_profile(profile: Option<&MunicipalityProfile>, metrics: &ImplementationMetrics) {
    match profile {
        Some(p) => {
            println!("=== {} ===", p.municipality);
            println!("{}, Colombia", p.department);
            println!();
            println!("  {:<26} {}", "poverty index", fmt_opt_f64(p.poverty_index));
            println!("  {:<26} {}", "PDET", fmt_opt_flag(p.pdet_flag));
            println!(
                "  {:<26} {}",
                "conflict category",
                p.conflict_category.as_deref().unwrap_or("N/A")
            );
            println!(
                "  {:<26} {}",
                "capacity group",
                p.capacity_group.as_deref().unwrap_or("N/A")
            );
        }
        None => println!("No rows survive the current filters."),
    }

    println!();
    println!("Implementation");
    let position = match metrics.ranking_position {
        Some(rank) => format!("#{}/{}", rank, metrics.ranked_municipalities),
        None => "N/A".to_string(),
    };
    println!("  {:<26} {}", "ranking", position);
    println!(
        "  {:<26} {}/{}",
        "recommendations", metrics.implemented, metrics.total_recommendations
    );
    println!(
        "  {:<26} {}/{}",
        "prioritized", metrics.priority_implemented, metrics.priority_total
    );
}

pub fn print_ranking(ranking: &Ranking, top: usize, highlight: Option<&str>) {
    println!("=== Municipality ranking ===");
    println!(
        "Showing {} of {} municipalities",
        ranking.top(top).len(),
        ranking.len()
    );
    println!();
    for entry in ranking.top(top) {
        let marker = if highlight == Some(entry.municipality.as_str()) {
            ">"
        } else {
            " "
        };
        println!(
            "{} {:>4}  {:<30} {:<20} {:>4}",
            marker, entry.rank, entry.municipality, entry.department, entry.implemented
        );
    }
}

pub fn print_frequency(entries: &[FrequencyEntry]) {
    println!("=== Most mentioned recommendations ===");
    if entries.is_empty() {
        println!("No qualifying mentions under the current filters.");
        return;
    }
    for entry in entries {
        println!(
            "  {:<8} {:>5}  {}",
            entry.recommendation_code,
            entry.mentions,
            truncate(&entry.recommendation_text, 60)
        );
    }
}

pub fn print_topics(topics: &[TopicEntry]) {
    println!("=== Implementation by topic ===");
    if topics.is_empty() {
        println!("No qualifying mentions under the current filters.");
        return;
    }
    for topic in topics {
        println!("  {:<40} {:>4}", topic.topic, topic.recommendations);
    }
}

pub fn print_dictionary(entries: &[DictionaryEntry], total: usize) {
    println!("=== Recommendation dictionary ===");
    println!("Showing {} of {} recommendations", entries.len(), total);
    for entry in entries {
        println!();
        println!(
            "--- {} - {}",
            entry.recommendation_code,
            truncate(&entry.recommendation_text, 60)
        );
        println!("  {:<26} {}", "topic", entry.recommendation_topic);
        println!(
            "  {:<26} {}",
            "prioritized",
            if entry.recommendation_priority {
                "yes"
            } else {
                "no"
            }
        );
        println!("  {:<26} {}", "mentions", entry.mentions);
        println!("  {:<26} {:.3}", "mean similarity", entry.mean_similarity);
        println!("  {:<26} {:.3}", "max similarity", entry.max_similarity);
        match &entry.coverage {
            Coverage::Municipalities(n) => {
                println!("  {:<26} {}", "implementing municipalities", n);
            }
            Coverage::Municipality(name) => println!("  {:<26} {}", "municipality", name),
        }
    }
}

pub fn print_recommendations(refs: &[RecommendationRef]) {
    println!("=== Available recommendations ===");
    if refs.is_empty() {
        println!("No qualifying mentions under the current filters.");
        return;
    }
    for r in refs {
        println!("  {:<8} {}", r.code, truncate(&r.text, 60));
    }
}

pub fn print_paragraph_page(
    code: &str,
    text: Option<&str>,
    window: &PageWindow,
    rows: &[ParagraphRow],
) {
    print_drilldown_header(code, text);
    println!(
        "Showing {} of {} paragraphs (page {} of {})",
        rows.len(),
        window.total_items,
        window.current,
        window.total_pages
    );
    for row in rows {
        println!();
        println!(
            "--- Paragraph {} - mean similarity {:.3}",
            row.paragraph_id, row.mean_similarity
        );
        println!("{}", truncate(&row.paragraph_text, MAX_TEXT_WIDTH * 3));
        println!("  {:<26} {}", "page", row.page_number);
        println!("  {:<26} {}", "sentences", row.sentences);
        println!("  {:<26} {:.3}", "max similarity", row.max_similarity);
        println!(
            "  {:<26} {:.3}",
            "paragraph similarity", row.paragraph_similarity
        );
        println!("  {:<26} {}", "classification", row.modal_class.as_str());
    }
    print_page_controls(window);
}

pub fn print_sentence_page(
    code: &str,
    text: Option<&str>,
    window: &PageWindow,
    rows: &[SentenceRow],
) {
    print_drilldown_header(code, text);
    println!(
        "Showing {} of {} sentences (page {} of {})",
        rows.len(),
        window.total_items,
        window.current,
        window.total_pages
    );
    for row in rows {
        println!();
        let label = match row.sentence_id_paragraph {
            Some(id) => format!("Sentence {id}"),
            None => "Sentence".to_string(),
        };
        println!(
            "--- {} - similarity {:.3}",
            label, row.sentence_similarity
        );
        println!("{}", truncate(&row.sentence_text, MAX_TEXT_WIDTH * 2));
        if let Some(id) = row.sentence_id {
            println!("  {:<26} {}", "sentence id", id);
        }
        println!("  {:<26} {}", "page", row.page_number);
        println!("  {:<26} {}", "paragraph", row.paragraph_id);
        println!("  {:<26} {}", "classification", row.predicted_class.as_str());
    }
    print_page_controls(window);
}

fn print_drilldown_header(code: &str, text: Option<&str>) {
    println!("=== {code} ===");
    if let Some(text) = text {
        println!("{}", truncate(text, MAX_TEXT_WIDTH * 2));
    }
    println!();
}

fn print_page_controls(window: &PageWindow) {
    if window.total_pages <= 1 {
        return;
    }
    println!();
    let numbers: Vec<String> = window
        .numbers
        .iter()
        .map(|&n| {
            if n == window.current {
                format!("[{n}]")
            } else {
                n.to_string()
            }
        })
        .collect();
    let prev = if window.has_previous { "◀" } else { " " };
    let next = if window.has_next { "▶" } else { " " };
    println!("  {} {} {}", prev, numbers.join(" "), next);
}

// ── Helpers ──

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

fn fmt_opt_f64(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}"),
        None => "N/A".to_string(),
    }
}

fn fmt_opt_flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "N/A",
    }
}
